//! Recursive drill-down traversal.
//!
//! Each task fetches one [`NavigationRequest`], classifies it by the request's
//! container marker and then either spawns one child per expandable row,
//! sends the listing's download link to the sink, or stops. Tasks never wait
//! for their children; the shared [`TaskJoin`] tracks the whole tree.
//!
//! Failures stay inside their branch: a transport error or a malformed handler
//! is logged with its URL and the rest of the tree proceeds.

mod stats;

pub use stats::{WalkSnapshot, WalkStats};

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::control::CancelFlag;
use crate::handler::{MalformedHandlerError, NavigationRequest};
use crate::join::TaskJoin;
use crate::page::{ContainerKind, DownloadLink, PortalMarkup};
use crate::transport::{fetch_blocking, Transport};

use stats::bump;

/// How one task ended. Every variant is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskOutcome {
    /// Row list: this many children were spawned.
    Expanded(usize),
    /// Download listing: the link was handed to the sink.
    Emitted,
    /// Download listing without an attachment.
    NoLink,
    /// Unknown container marker.
    Idle,
    /// Fetch failed; the subtree is lost for this run.
    Failed,
    /// Run cancelled before the fetch.
    Cancelled,
    /// The sink is gone; the link could not be delivered.
    SinkClosed,
}

struct WalkerInner {
    transport: Arc<dyn Transport>,
    markup: Arc<PortalMarkup>,
    links: mpsc::Sender<DownloadLink>,
    join: TaskJoin,
    cancel: CancelFlag,
    stats: WalkStats,
}

/// Handle to one traversal. Clones share the same join, channel and counters.
///
/// The link channel closes once every clone is dropped; callers should
/// [`wait`](TreeWalker::wait) and then drop their handle.
#[derive(Clone)]
pub struct TreeWalker {
    inner: Arc<WalkerInner>,
}

impl TreeWalker {
    pub fn new(
        transport: Arc<dyn Transport>,
        markup: Arc<PortalMarkup>,
        links: mpsc::Sender<DownloadLink>,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            inner: Arc::new(WalkerInner {
                transport,
                markup,
                links,
                join: TaskJoin::new(),
                cancel,
                stats: WalkStats::default(),
            }),
        }
    }

    /// Register and start one traversal task. Must be called inside a Tokio runtime.
    pub fn spawn(&self, request: NavigationRequest) {
        let ticket = self.inner.join.register();
        let walker = self.clone();
        tokio::spawn(async move {
            let _ticket = ticket;
            // Declared after the ticket so the link sender is released first.
            let walker = walker;
            let url = request.to_string();
            let outcome = walker.visit(request).await;
            tracing::debug!(url = %url, ?outcome, "task finished");
        });
    }

    /// Parse a row's drill handler and spawn the task for the page it opens.
    pub fn spawn_handler(&self, handler: &str) -> Result<(), MalformedHandlerError> {
        let request = NavigationRequest::from_handler(self.inner.transport.origin(), handler)?;
        bump(&self.inner.stats.children_spawned);
        self.spawn(request);
        Ok(())
    }

    /// Spawn one task per drillable row of a row-list page. Returns the number spawned.
    ///
    /// Rows whose handler does not parse are logged and skipped.
    pub fn expand_page(&self, body: &[u8]) -> usize {
        let mut spawned = 0;
        for handler in self.inner.markup.drill_handlers(body) {
            match self.spawn_handler(&handler) {
                Ok(()) => spawned += 1,
                Err(e) => {
                    bump(&self.inner.stats.malformed_handlers);
                    tracing::warn!(error = %e, "skipping row with malformed drill handler");
                }
            }
        }
        spawned
    }

    /// Resolves once every task registered so far, and all their descendants, returned.
    pub async fn wait(&self) {
        self.inner.join.wait().await;
    }

    /// Tasks registered and not yet returned.
    pub fn pending(&self) -> usize {
        self.inner.join.pending()
    }

    pub fn stats(&self) -> WalkSnapshot {
        self.inner.stats.snapshot()
    }

    async fn visit(&self, request: NavigationRequest) -> TaskOutcome {
        let inner = &self.inner;
        if inner.cancel.is_cancelled() {
            bump(&inner.stats.cancelled);
            return TaskOutcome::Cancelled;
        }

        let body = match fetch_blocking(Arc::clone(&inner.transport), request.to_string()).await {
            Ok(body) => body,
            Err(e) => {
                bump(&inner.stats.transport_failures);
                tracing::warn!(url = %e.url, error = %e, "branch fetch failed");
                return TaskOutcome::Failed;
            }
        };
        bump(&inner.stats.pages_fetched);

        match ContainerKind::of(&request) {
            ContainerKind::RowList => TaskOutcome::Expanded(self.expand_page(&body)),
            ContainerKind::DownloadListing => self.emit(&request, &body).await,
            ContainerKind::Unknown => {
                bump(&inner.stats.idle_pages);
                TaskOutcome::Idle
            }
        }
    }

    async fn emit(&self, request: &NavigationRequest, body: &[u8]) -> TaskOutcome {
        let Some(link) = self.inner.markup.download_link(body) else {
            bump(&self.inner.stats.empty_listings);
            tracing::debug!(url = %request, "download listing has no attachment");
            return TaskOutcome::NoLink;
        };

        tracing::debug!(url = %request, link = %link, "found attachment");
        // Blocks while the sink is busy; discovery slows down instead of dropping links.
        match self.inner.links.send(link).await {
            Ok(()) => {
                bump(&self.inner.stats.links_emitted);
                TaskOutcome::Emitted
            }
            Err(mpsc::error::SendError(link)) => {
                tracing::warn!(url = %request, link = %link, "download sink closed; link dropped");
                TaskOutcome::SinkClosed
            }
        }
    }
}
