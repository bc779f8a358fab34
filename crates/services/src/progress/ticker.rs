use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use training_core::progress::{ProgressSnapshot, ProgressTracker};

/// Cadence of the progress ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickerConfig {
    pub period: Duration,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
        }
    }
}

/// Repeating task that ticks a shared tracker and publishes its snapshot.
///
/// The task is aborted when the ticker is stopped or dropped, so a viewer
/// that owns one cannot leak it past its own lifetime.
pub struct ProgressTicker {
    tracker: Arc<Mutex<ProgressTracker>>,
    snapshots: watch::Receiver<ProgressSnapshot>,
    handle: JoinHandle<()>,
}

fn lock(tracker: &Mutex<ProgressTracker>) -> MutexGuard<'_, ProgressTracker> {
    tracker.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ProgressTicker {
    /// Spawn the ticker on the current tokio runtime.
    ///
    /// The first tick fires one period after spawning.
    #[must_use]
    pub fn spawn(tracker: Arc<Mutex<ProgressTracker>>, config: TickerConfig) -> Self {
        let initial = lock(&tracker).snapshot();
        let (tx, snapshots) = watch::channel(initial);
        let period = config.period;
        let shared = Arc::clone(&tracker);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let snapshot = {
                    let mut tracker = lock(&shared);
                    tracker.tick();
                    tracker.snapshot()
                };
                if tx.send(snapshot).is_err() {
                    break;
                }
            }
        });
        tracing::debug!(period_ms = period.as_millis(), "progress ticker started");

        Self {
            tracker,
            snapshots,
            handle,
        }
    }

    /// Run `f` against the shared tracker (position updates, start, restart).
    pub fn with_tracker<R>(&self, f: impl FnOnce(&mut ProgressTracker) -> R) -> R {
        f(&mut lock(&self.tracker))
    }

    /// Snapshot of the tracker right now, without waiting for the next tick.
    #[must_use]
    pub fn current(&self) -> ProgressSnapshot {
        lock(&self.tracker).snapshot()
    }

    /// Last snapshot published by the task.
    #[must_use]
    pub fn latest(&self) -> ProgressSnapshot {
        *self.snapshots.borrow()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.snapshots.clone()
    }

    #[must_use]
    pub fn tracker(&self) -> Arc<Mutex<ProgressTracker>> {
        Arc::clone(&self.tracker)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Cancel the task and return the tracker's final snapshot.
    pub fn stop(self) -> ProgressSnapshot {
        self.handle.abort();
        tracing::debug!("progress ticker stopped");
        self.current()
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use training_core::progress::ProgressUnit;

    fn shared(total: f64) -> Arc<Mutex<ProgressTracker>> {
        Arc::new(Mutex::new(
            ProgressTracker::new(total, ProgressUnit::Page).unwrap(),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn publishes_one_snapshot_per_period() {
        let tracker = shared(10.0);
        let ticker = ProgressTicker::spawn(Arc::clone(&tracker), TickerConfig::default());
        ticker.with_tracker(|t| {
            t.start();
            t.set_position(9.0).unwrap();
        });

        let mut rx = ticker.subscribe();
        for _ in 0..3 {
            rx.changed().await.unwrap();
        }

        let latest = ticker.latest();
        assert_eq!(latest.time_spent_secs, 3);
        assert!((latest.progress - 90.0).abs() < 1e-9);
        assert!(latest.completed);
    }

    #[tokio::test(start_paused = true)]
    async fn time_does_not_move_before_start() {
        let ticker = ProgressTicker::spawn(shared(5.0), TickerConfig::default());
        let mut rx = ticker.subscribe();
        rx.changed().await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(ticker.latest().time_spent_secs, 0);
        assert!(ticker.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_ticker_cancels_the_task() {
        let ticker = ProgressTicker::spawn(shared(5.0), TickerConfig::default());
        let mut rx = ticker.subscribe();
        drop(ticker);
        assert!(rx.changed().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_returns_the_final_snapshot() {
        let tracker = shared(4.0);
        let ticker = ProgressTicker::spawn(Arc::clone(&tracker), TickerConfig::default());
        ticker.with_tracker(ProgressTracker::start);
        let mut rx = ticker.subscribe();
        rx.changed().await.unwrap();
        rx.changed().await.unwrap();

        let last = ticker.stop();
        assert_eq!(last.time_spent_secs, 2);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(lock(&tracker).snapshot().time_spent_secs, 2);
    }
}
