//! Download sink: the single consumer of discovered attachment links.
//!
//! Runs until the link channel closes. Each link is resolved under the portal
//! origin, fetched with the session, named from its last two path segments
//! and persisted in the run's output folder. A failed link is recorded and
//! the sink moves on to the next one.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::checksum;
use crate::config::ReportSelection;
use crate::page::DownloadLink;
use crate::storage::{self, PersistenceError};
use crate::transport::{fetch_blocking, Transport, TransportError};
use crate::url_model::{report_file_name, LinkError};

/// Why one attachment was not saved.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub link: DownloadLink,
    pub url: String,
    pub path: PathBuf,
    pub bytes: u64,
    /// Lowercase hex SHA-256, when checksums are enabled.
    pub sha256: Option<String>,
}

#[derive(Debug)]
pub struct FailedDownload {
    pub link: DownloadLink,
    pub error: SinkError,
}

/// Per-file results of one sink run.
#[derive(Debug, Default)]
pub struct SinkReport {
    pub saved: Vec<SavedFile>,
    pub failed: Vec<FailedDownload>,
}

pub struct DownloadSink {
    transport: Arc<dyn Transport>,
    folder: PathBuf,
    report: String,
    verify_checksums: bool,
}

impl DownloadSink {
    /// `folder` must exist; the orchestrator creates it before the run starts.
    pub fn new(
        transport: Arc<dyn Transport>,
        folder: PathBuf,
        selection: &ReportSelection,
        verify_checksums: bool,
    ) -> Self {
        Self {
            transport,
            folder,
            report: selection.report.clone(),
            verify_checksums,
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Consume `links` until every sender is gone.
    pub async fn run(self, mut links: mpsc::Receiver<DownloadLink>) -> SinkReport {
        let mut report = SinkReport::default();
        while let Some(link) = links.recv().await {
            match self.save(&link).await {
                Ok(saved) => {
                    tracing::info!(
                        url = %saved.url,
                        path = %saved.path.display(),
                        bytes = saved.bytes,
                        sha256 = saved.sha256.as_deref().unwrap_or("-"),
                        "saved attachment"
                    );
                    report.saved.push(saved);
                }
                Err(error) => {
                    tracing::warn!(link = %link, error = %error, "failed to save attachment");
                    report.failed.push(FailedDownload { link, error });
                }
            }
        }
        tracing::debug!(
            saved = report.saved.len(),
            failed = report.failed.len(),
            "download sink finished"
        );
        report
    }

    /// Fetch and persist one attachment.
    pub async fn save(&self, link: &DownloadLink) -> Result<SavedFile, SinkError> {
        let url = self.transport.resolve(link.as_str())?;
        let name = report_file_name(&url, &self.report)?;
        let body = fetch_blocking(Arc::clone(&self.transport), url.to_string()).await?;
        let bytes = body.len() as u64;

        let path = self.folder.join(name);
        let target = path.clone();
        tokio::task::spawn_blocking(move || storage::write_file(&target, &body))
            .await
            .map_err(|e| PersistenceError {
                path: path.clone(),
                source: io::Error::other(e.to_string()),
            })??;

        let sha256 = if self.verify_checksums {
            self.checksum(&path).await
        } else {
            None
        };

        Ok(SavedFile {
            link: link.clone(),
            url: url.to_string(),
            path,
            bytes,
            sha256,
        })
    }

    async fn checksum(&self, path: &Path) -> Option<String> {
        let target = path.to_path_buf();
        match tokio::task::spawn_blocking(move || checksum::sha256_path(&target)).await {
            Ok(Ok(digest)) => Some(digest),
            Ok(Err(e)) => {
                tracing::warn!(path = %path.display(), error = %format!("{e:#}"), "checksum failed");
                None
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "checksum task aborted");
                None
            }
        }
    }
}
