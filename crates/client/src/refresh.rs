//! Refresh coalescing.
//!
//! Change notices arrive in bursts (one per written row). Each notice
//! (re)arms a quiet-period timer; the refresh runs once the timer expires
//! without a newer notice, so a burst costs exactly one recomputation timed
//! from its last notice.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

use materials_infra::ChangeFeed;

/// Trailing-edge debounce state. Time is passed in by the caller.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Cancel any pending deadline and schedule a new one from `now`.
    pub fn notify(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the pending deadline if it has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// Drives a refresh callback from a change feed with at most one pending run.
#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    quiet: Duration,
    shutdown: Arc<Notify>,
}

impl RefreshScheduler {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Stop a running [`run`](Self::run) loop; a pending refresh is dropped.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Run until the feed closes or [`shutdown`](Self::shutdown) is called.
    ///
    /// When the feed closes with a refresh pending, that refresh still runs
    /// at its deadline. Returns the number of refreshes performed.
    pub async fn run<F, R, Fut>(&self, mut feed: F, mut refresh: R) -> usize
    where
        F: ChangeFeed,
        R: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut debouncer = Debouncer::new(self.quiet);
        let mut runs = 0usize;

        tracing::debug!(quiet_ms = self.quiet.as_millis() as u64, "refresh scheduler started");

        loop {
            let deadline = debouncer.deadline();
            tokio::select! {
                _ = self.shutdown.notified() => {
                    tracing::debug!(pending = debouncer.is_pending(), "refresh scheduler shutting down");
                    break;
                }
                notice = feed.next() => match notice {
                    Some(notice) => {
                        tracing::trace!(?notice, "change notice; rescheduling refresh");
                        debouncer.notify(Instant::now());
                    }
                    None => {
                        tracing::debug!(pending = debouncer.is_pending(), "change feed closed");
                        if let Some(deadline) = debouncer.deadline() {
                            tokio::select! {
                                _ = self.shutdown.notified() => {
                                    tracing::debug!("refresh scheduler shutting down; pending refresh dropped");
                                }
                                _ = tokio::time::sleep_until(deadline) => {
                                    debouncer.cancel();
                                    refresh().await;
                                    runs += 1;
                                }
                            }
                        }
                        break;
                    }
                },
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if debouncer.fire_if_due(Instant::now()) {
                        refresh().await;
                        runs += 1;
                    }
                }
            }
        }

        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use materials_infra::{channel, ChangeNotice};

    const QUIET: Duration = Duration::from_millis(450);

    #[test]
    fn each_notice_reschedules_from_itself() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);
        assert!(!debouncer.fire_if_due(start));

        debouncer.notify(start);
        debouncer.notify(start + Duration::from_millis(300));
        assert!(!debouncer.fire_if_due(start + Duration::from_millis(500)));
        assert_eq!(debouncer.deadline(), Some(start + Duration::from_millis(750)));

        assert!(debouncer.fire_if_due(start + Duration::from_millis(750)));
        assert!(!debouncer.is_pending());
        assert!(!debouncer.fire_if_due(start + Duration::from_secs(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn bursts_coalesce_into_one_refresh_after_the_last_notice() {
        let (tx, feed) = channel();
        let start = Instant::now();
        let fired: Arc<Mutex<Vec<Duration>>> = Arc::default();

        let producer = tokio::spawn(async move {
            for _ in 0..5 {
                tx.notify(ChangeNotice::Movements);
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            tokio::time::sleep(Duration::from_millis(1000)).await;
            tx.notify(ChangeNotice::Items);
        });

        let scheduler = RefreshScheduler::new(QUIET);
        let log = Arc::clone(&fired);
        let runs = scheduler
            .run(feed, || {
                let log = Arc::clone(&log);
                async move {
                    log.lock().unwrap().push(start.elapsed());
                }
            })
            .await;
        producer.await.unwrap();

        assert_eq!(runs, 2);
        assert_eq!(
            *fired.lock().unwrap(),
            vec![Duration::from_millis(850), Duration::from_millis(1950)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_drops_pending_refresh() {
        let (tx, feed) = channel();
        let scheduler = RefreshScheduler::new(QUIET);
        tx.notify(ChangeNotice::Movements);

        let stopper = scheduler.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            stopper.shutdown();
        });

        let mut count = 0;
        let runs = scheduler
            .run(feed, || {
                count += 1;
                async {}
            })
            .await;
        assert_eq!(runs, 0);
        assert_eq!(count, 0);
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_interrupts_the_final_flush() {
        let (tx, feed) = channel();
        let scheduler = RefreshScheduler::new(QUIET);
        let start = Instant::now();
        tx.notify(ChangeNotice::Items);
        drop(tx);

        let stopper = scheduler.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            stopper.shutdown();
        });

        let runs = scheduler.run(feed, || async {}).await;
        assert_eq!(runs, 0);
        assert!(start.elapsed() < QUIET);
    }
}
