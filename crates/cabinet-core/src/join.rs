//! Completion join for a dynamically growing set of tasks.
//!
//! A task is registered *before* it is spawned and holds a [`TaskTicket`] for
//! its whole life; dropping the ticket marks it returned. [`TaskJoin::wait`]
//! resolves once every ticket ever issued has been dropped, so children
//! registered by still-running parents always keep the join open.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct JoinState {
    pending: AtomicUsize,
    done: Notify,
}

/// Shared counter of live tasks plus a zero signal.
#[derive(Debug, Clone, Default)]
pub struct TaskJoin {
    state: Arc<JoinState>,
}

/// Proof of one registered task. Decrements the join when dropped.
#[derive(Debug)]
#[must_use = "dropping the ticket immediately marks the task as returned"]
pub struct TaskTicket {
    state: Arc<JoinState>,
}

impl TaskJoin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more task. Call before spawning it and move the ticket into it.
    pub fn register(&self) -> TaskTicket {
        self.state.pending.fetch_add(1, Ordering::AcqRel);
        TaskTicket {
            state: Arc::clone(&self.state),
        }
    }

    /// Tasks registered and not yet returned.
    pub fn pending(&self) -> usize {
        self.state.pending.load(Ordering::Acquire)
    }

    /// Resolves when no registered task is left. Returns at once if none were registered.
    pub async fn wait(&self) {
        loop {
            let notified = self.state.done.notified();
            tokio::pin!(notified);
            // Register interest before checking so a concurrent last drop is not missed.
            notified.as_mut().enable();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl Drop for TaskTicket {
    fn drop(&mut self) {
        if self.state.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.state.done.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn wait_without_tasks_returns_immediately() {
        let join = TaskJoin::new();
        tokio::time::timeout(Duration::from_secs(1), join.wait())
            .await
            .expect("empty join must not block");
    }

    #[tokio::test]
    async fn tickets_count_up_and_down() {
        let join = TaskJoin::new();
        let a = join.register();
        let b = join.register();
        assert_eq!(join.pending(), 2);
        drop(a);
        assert_eq!(join.pending(), 1);
        drop(b);
        assert_eq!(join.pending(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn wait_covers_children_registered_by_running_tasks() {
        let join = TaskJoin::new();
        let finished = Arc::new(AtomicUsize::new(0));

        fn spawn_tree(join: TaskJoin, depth: u32, finished: Arc<AtomicUsize>) {
            let ticket = join.register();
            tokio::spawn(async move {
                let _ticket = ticket;
                tokio::time::sleep(Duration::from_millis(2)).await;
                if depth > 0 {
                    for _ in 0..3 {
                        spawn_tree(join.clone(), depth - 1, Arc::clone(&finished));
                    }
                }
                finished.fetch_add(1, Ordering::SeqCst);
            });
        }

        spawn_tree(join.clone(), 3, Arc::clone(&finished));
        tokio::time::timeout(Duration::from_secs(10), join.wait())
            .await
            .expect("join must drain");
        // 1 + 3 + 9 + 27 tasks
        assert_eq!(finished.load(Ordering::SeqCst), 40);
        assert_eq!(join.pending(), 0);
    }

    #[tokio::test]
    async fn panicking_task_still_returns_its_ticket() {
        let join = TaskJoin::new();
        let ticket = join.register();
        let handle = tokio::spawn(async move {
            let _ticket = ticket;
            panic!("branch failed");
        });
        assert!(handle.await.is_err());
        tokio::time::timeout(Duration::from_secs(1), join.wait())
            .await
            .expect("panicked task must not hold the join");
    }
}
