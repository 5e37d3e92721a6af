use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::warn;

/// Bounded fire-and-forget dispatcher for per-event background work.
///
/// The webhook handler must acknowledge immediately, so each command runs on
/// its own spawned task. The semaphore caps how many may be in flight at
/// once; a burst beyond the cap is shed rather than queued, since a webhook
/// answered minutes late is worse than no answer. Nothing is joined and no
/// ordering exists between tasks, even for the same sender.
pub struct Dispatcher {
    semaphore: Arc<Semaphore>,
    max_in_flight: usize,
}

impl Dispatcher {
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
        }
    }

    /// Spawn `task` if capacity allows. Returns false when the dispatch was
    /// shed. The permit is held until the task finishes, whatever its
    /// outcome; the task itself is responsible for converting every failure
    /// into a user-facing send.
    pub fn try_dispatch<F>(&self, sender_id: &str, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match self.semaphore.clone().try_acquire_owned() {
            Ok(permit) => {
                tokio::spawn(async move {
                    let _permit = permit;
                    task.await;
                });
                true
            }
            Err(_) => {
                warn!(
                    "Dispatch shed for sender {}: {} tasks already in flight",
                    sender_id, self.max_in_flight
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_dispatch_runs_task() {
        let dispatcher = Dispatcher::new(4);
        let (tx, rx) = oneshot::channel();

        let accepted = dispatcher.try_dispatch("u1", async move {
            tx.send(42).ok();
        });
        assert!(accepted);
        assert_eq!(rx.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_sheds_above_bound() {
        let dispatcher = Dispatcher::new(2);
        let (release_tx, release_rx) = tokio::sync::watch::channel(false);

        // Two tasks occupy both permits until released.
        for _ in 0..2 {
            let mut rx = release_rx.clone();
            let accepted = dispatcher.try_dispatch("u1", async move {
                while !*rx.borrow() {
                    if rx.changed().await.is_err() {
                        break;
                    }
                }
            });
            assert!(accepted);
        }

        // Third dispatch is shed, not queued.
        let shed_counter = Arc::new(AtomicUsize::new(0));
        let counter = shed_counter.clone();
        let accepted = dispatcher.try_dispatch("u2", async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(!accepted);

        release_tx.send(true).unwrap();
        tokio::task::yield_now().await;
        assert_eq!(shed_counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_permit_released_after_completion() {
        let dispatcher = Dispatcher::new(1);

        let (tx, rx) = oneshot::channel();
        assert!(dispatcher.try_dispatch("u1", async move {
            tx.send(()).ok();
        }));
        rx.await.unwrap();

        // The finished task must give its permit back; poll briefly since
        // spawn completion and permit return race with this assertion.
        for _ in 0..100 {
            if dispatcher.semaphore.available_permits() == 1 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(dispatcher.try_dispatch("u2", async {}));
    }
}
