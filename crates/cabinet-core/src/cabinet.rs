//! Orchestrator: one full discovery-and-download run for a report selection.
//!
//! Loads the report page, starts the sink, spawns one traversal task per
//! expandable root row, waits for the whole tree, then closes the link
//! channel so the sink drains and returns.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::{CabinetConfig, ReportSelection};
use crate::control::CancelFlag;
use crate::page::{PageBanner, PortalMarkup};
use crate::sink::{DownloadSink, SinkReport};
use crate::transport::{fetch_blocking, Session, SessionCookies, Transport, TransportError};
use crate::walker::{TreeWalker, WalkSnapshot};

/// Report listing page, relative to the origin.
pub const ROOT_PATH: &str = "/object";

/// Outcome of [`Cabinet::run`].
#[derive(Debug)]
pub struct RunSummary {
    pub banner: PageBanner,
    /// Expandable rows found on the report page.
    pub root_rows: usize,
    pub walk: WalkSnapshot,
    pub sink: SinkReport,
    pub cancelled: bool,
}

impl RunSummary {
    /// No expandable rows on the report page. The portal answers an expired or
    /// rejected session with an ordinary page, so this is the only hint.
    pub fn looks_unauthenticated(&self) -> bool {
        self.root_rows == 0
    }
}

pub struct Cabinet {
    config: CabinetConfig,
    selection: ReportSelection,
    transport: Arc<dyn Transport>,
    markup: Arc<PortalMarkup>,
}

impl Cabinet {
    /// Session-backed cabinet. Fails on an invalid origin instead of exiting.
    pub fn new(
        config: CabinetConfig,
        selection: ReportSelection,
        cookies: SessionCookies,
    ) -> Result<Self> {
        let session = Session::from_config(&config, cookies)?;
        Self::with_transport(config, selection, Arc::new(session))
    }

    /// Cabinet over any transport (used by tests and alternative sessions).
    pub fn with_transport(
        config: CabinetConfig,
        selection: ReportSelection,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let markup = PortalMarkup::new().context("portal selectors")?;
        Ok(Self {
            config,
            selection,
            transport,
            markup: Arc::new(markup),
        })
    }

    pub fn selection(&self) -> &ReportSelection {
        &self.selection
    }

    /// `{output_dir}/{report}_{year}`.
    pub fn output_folder(&self) -> PathBuf {
        self.config.output_folder(&self.selection)
    }

    /// Fetch the report listing page.
    pub async fn load_report_page(&self) -> Result<Vec<u8>, TransportError> {
        fetch_blocking(Arc::clone(&self.transport), ROOT_PATH.to_string()).await
    }

    /// Discover and download every attachment reachable from the report page.
    ///
    /// Only setup failures (output folder, report page) are errors; failed
    /// branches and downloads are logged and counted in the summary.
    pub async fn run(&self, cancel: CancelFlag) -> Result<RunSummary> {
        let folder = self.output_folder();
        tokio::fs::create_dir_all(&folder)
            .await
            .with_context(|| format!("failed to create output folder {}", folder.display()))?;

        let root = self
            .load_report_page()
            .await
            .context("failed to load report page")?;
        let banner = self.markup.banner(&root);
        tracing::info!(heading = %banner.heading, status = %banner.status, "report page loaded");

        let (links_tx, links_rx) = mpsc::channel(self.config.link_buffer.max(1));
        let sink = DownloadSink::new(
            Arc::clone(&self.transport),
            folder.clone(),
            &self.selection,
            self.config.verify_checksums,
        );
        let sink_task = tokio::spawn(sink.run(links_rx));

        let walker = TreeWalker::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.markup),
            links_tx,
            cancel.clone(),
        );
        let root_rows = walker.expand_page(&root);
        if root_rows == 0 {
            tracing::warn!(
                "report page has no expandable rows; the session may have expired or the credentials were rejected"
            );
        } else {
            tracing::info!(rows = root_rows, folder = %folder.display(), "traversal started");
        }

        walker.wait().await;
        let walk = walker.stats();
        // Last sender handle: the sink sees the channel close once it is gone.
        drop(walker);

        let sink = sink_task.await.context("download sink task failed")?;

        let summary = RunSummary {
            banner,
            root_rows,
            walk,
            sink,
            cancelled: cancel.is_cancelled(),
        };
        tracing::info!(
            pages = summary.walk.pages_fetched,
            branch_failures = summary.walk.transport_failures,
            malformed = summary.walk.malformed_handlers,
            saved = summary.sink.saved.len(),
            failed = summary.sink.failed.len(),
            cancelled = summary.cancelled,
            "run finished"
        );
        Ok(summary)
    }
}
