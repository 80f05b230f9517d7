//! Counters for one traversal.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by every task of a walk.
#[derive(Debug, Default)]
pub struct WalkStats {
    pub(crate) pages_fetched: AtomicU64,
    pub(crate) transport_failures: AtomicU64,
    pub(crate) malformed_handlers: AtomicU64,
    pub(crate) children_spawned: AtomicU64,
    pub(crate) links_emitted: AtomicU64,
    pub(crate) empty_listings: AtomicU64,
    pub(crate) idle_pages: AtomicU64,
    pub(crate) cancelled: AtomicU64,
}

/// Point-in-time copy of [`WalkStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSnapshot {
    pub pages_fetched: u64,
    pub transport_failures: u64,
    pub malformed_handlers: u64,
    pub children_spawned: u64,
    pub links_emitted: u64,
    /// Download listings without an attachment yet.
    pub empty_listings: u64,
    /// Pages whose container marker was neither a row list nor a download listing.
    pub idle_pages: u64,
    /// Tasks skipped because the run was cancelled before they fetched.
    pub cancelled: u64,
}

/// Add one to a counter.
pub(crate) fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl WalkStats {
    pub fn snapshot(&self) -> WalkSnapshot {
        WalkSnapshot {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
            malformed_handlers: self.malformed_handlers.load(Ordering::Relaxed),
            children_spawned: self.children_spawned.load(Ordering::Relaxed),
            links_emitted: self.links_emitted.load(Ordering::Relaxed),
            empty_listings: self.empty_listings.load(Ordering::Relaxed),
            idle_pages: self.idle_pages.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
        }
    }
}
