//! Run cancellation: a shared flag every traversal task checks before fetching.
//!
//! Setting the flag does not interrupt in-flight requests. Tasks that have not
//! fetched yet terminate immediately, so the completion join still drains and
//! the sink flushes what it already received.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable handle to one cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation (e.g. on Ctrl-C). Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
