//! # Keepalive watchdog.
//!
//! Every running task registers with the [`Watchdog`] when it starts and must
//! acknowledge (`feed`) at least once per `keepalive_timeout`. If any registered
//! task stays silent longer than that, the watchdog publishes
//! [`EventKind::WatchdogExpired`] and [`Watchdog::watch`] returns
//! [`RuntimeError::WatchdogExpired`]: the whole process is expected to restart.
//!
//! Entries are keyed by task kind and tagged with the incarnation generation, so
//! a stale incarnation cannot unregister or feed on behalf of its successor.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::core::TaskKind;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};

#[derive(Debug, Clone, Copy)]
struct Entry {
    generation: u64,
    last_fed: Instant,
}

/// Per-task keepalive tracker.
#[derive(Debug)]
pub struct Watchdog {
    timeout: Duration,
    entries: Mutex<HashMap<TaskKind, Entry>>,
}

impl Watchdog {
    /// Creates a watchdog with the given keepalive window.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Starts watching an incarnation; counts as a first keepalive.
    pub fn register(&self, task: TaskKind, generation: u64) {
        self.entries.lock().insert(
            task,
            Entry {
                generation,
                last_fed: Instant::now(),
            },
        );
    }

    /// Stops watching an incarnation (no-op for a stale generation).
    pub fn unregister(&self, task: TaskKind, generation: u64) {
        let mut entries = self.entries.lock();
        if entries.get(&task).is_some_and(|e| e.generation == generation) {
            entries.remove(&task);
        }
    }

    /// Acknowledges the keepalive for an incarnation.
    pub fn feed(&self, task: TaskKind, generation: u64) {
        if let Some(entry) = self.entries.lock().get_mut(&task) {
            if entry.generation == generation {
                entry.last_fed = Instant::now();
            }
        }
    }

    /// Returns the first (by kind) task whose silence exceeds the window.
    pub fn overdue(&self) -> Option<TaskKind> {
        let now = Instant::now();
        let entries = self.entries.lock();
        let mut late: Vec<TaskKind> = entries
            .iter()
            .filter(|(_, e)| now.saturating_duration_since(e.last_fed) > self.timeout)
            .map(|(task, _)| *task)
            .collect();
        late.sort_unstable();
        late.first().copied()
    }

    /// Checks keepalives until `token` is cancelled or a task expires.
    pub async fn watch(&self, bus: &Bus, token: &CancellationToken) -> Result<(), RuntimeError> {
        let tick = (self.timeout / 4).max(Duration::from_millis(1));
        let mut interval = time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => return Ok(()),
                _ = interval.tick() => {
                    if let Some(task) = self.overdue() {
                        bus.publish(
                            Event::new(EventKind::WatchdogExpired)
                                .with_task(task)
                                .with_reason(format!("no keepalive within {:?}", self.timeout)),
                        );
                        return Err(RuntimeError::WatchdogExpired {
                            task,
                            timeout: self.timeout,
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn feeding_keeps_task_in_time() {
        let wd = Watchdog::new(Duration::from_millis(100));
        wd.register(TaskKind::Producer, 1);
        for _ in 0..5 {
            time::advance(Duration::from_millis(80)).await;
            wd.feed(TaskKind::Producer, 1);
            assert_eq!(wd.overdue(), None);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn silent_task_is_overdue() {
        let wd = Watchdog::new(Duration::from_millis(100));
        wd.register(TaskKind::Consumer, 1);
        time::advance(Duration::from_millis(101)).await;
        assert_eq!(wd.overdue(), Some(TaskKind::Consumer));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_generation_neither_feeds_nor_unregisters() {
        let wd = Watchdog::new(Duration::from_millis(100));
        wd.register(TaskKind::Consumer, 2);
        wd.unregister(TaskKind::Consumer, 1);

        time::advance(Duration::from_millis(90)).await;
        wd.feed(TaskKind::Consumer, 1);
        time::advance(Duration::from_millis(20)).await;
        assert_eq!(wd.overdue(), Some(TaskKind::Consumer));

        wd.unregister(TaskKind::Consumer, 2);
        assert_eq!(wd.overdue(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn watch_reports_expiry() {
        let wd = Watchdog::new(Duration::from_millis(100));
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let token = CancellationToken::new();
        wd.register(TaskKind::Monitor, 7);

        let err = wd.watch(&bus, &token).await.unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::WatchdogExpired {
                task: TaskKind::Monitor,
                ..
            }
        ));
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::WatchdogExpired);
        assert_eq!(ev.task, Some(TaskKind::Monitor));
    }

    #[tokio::test(start_paused = true)]
    async fn watch_returns_on_cancel() {
        let wd = Watchdog::new(Duration::from_millis(100));
        let token = CancellationToken::new();
        token.cancel();
        assert!(wd.watch(&Bus::new(1), &token).await.is_ok());
    }
}
