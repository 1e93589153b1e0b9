//! # LogWriter: events as tracing records.
//!
//! Levels:
//! - `info` for per-value traffic (generated, sent, received), lifecycle and healthy reports
//! - `warn` for empty polls, dropped values, advisory and recovery escalation, degraded health
//! - `error` for terminal escalation, failed restarts, critical health, watchdog expiry
//!
//! ## Example output
//! ```text
//! INFO  pipevisor: task starting task=producer generation=1
//! INFO  pipevisor: value sent task=producer value=7
//! WARN  pipevisor: channel empty task=consumer empty_polls=3
//! WARN  pipevisor: consumer starvation task=consumer level=LV2 empty_polls=10
//! WARN  pipevisor: channel reset dropped=0
//! ERROR pipevisor: consumer starvation task=consumer level=LV3 empty_polls=15
//! INFO  pipevisor: restart succeeded task=consumer generation=4
//! ```

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use crate::tasks::{EscalationLevel, HealthStatus};

const TARGET: &str = "pipevisor";

/// Writes every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.map_or("-", |t| t.as_str());
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::ValueGenerated => {
                info!(target: TARGET, seq = e.seq, task, value = e.value, "value generated")
            }
            EventKind::ValueSent => {
                info!(target: TARGET, seq = e.seq, task, value = e.value, "value sent")
            }
            EventKind::ValueDropped => {
                warn!(target: TARGET, seq = e.seq, task, value = e.value, "channel full, value dropped")
            }
            EventKind::ValueReceived => {
                info!(target: TARGET, seq = e.seq, task, value = e.value, "value received")
            }
            EventKind::AllocationFailed => {
                warn!(target: TARGET, seq = e.seq, task, value = e.value, reason, "allocation failed, value discarded")
            }
            EventKind::ChannelEmpty => {
                warn!(target: TARGET, seq = e.seq, task, empty_polls = e.empty_polls, "channel empty")
            }
            EventKind::TimeoutEscalated => {
                let level = e.level.map(|l| l.to_string());
                let level = level.as_deref().unwrap_or("-");
                if e.level == Some(EscalationLevel::Terminal) {
                    error!(target: TARGET, seq = e.seq, task, level, empty_polls = e.empty_polls, "consumer starvation, terminating")
                } else {
                    warn!(target: TARGET, seq = e.seq, task, level, empty_polls = e.empty_polls, "consumer starvation")
                }
            }
            EventKind::ChannelReset => {
                warn!(target: TARGET, seq = e.seq, task, dropped = e.dropped, "channel reset")
            }
            EventKind::TaskStarting => {
                info!(target: TARGET, seq = e.seq, task, generation = e.generation, "task starting")
            }
            EventKind::TaskStopped => {
                info!(target: TARGET, seq = e.seq, task, generation = e.generation, reason, "task stopped")
            }
            EventKind::RestartRequested => {
                warn!(target: TARGET, seq = e.seq, task, "task dead, restarting")
            }
            EventKind::RestartSucceeded => {
                info!(target: TARGET, seq = e.seq, task, generation = e.generation, "restart succeeded")
            }
            EventKind::RestartFailed => {
                error!(target: TARGET, seq = e.seq, task, reason, "restart failed")
            }
            EventKind::HealthReport => {
                let status = e.status.map_or("-", |s| s.as_label());
                match e.status {
                    Some(HealthStatus::Healthy) => {
                        info!(target: TARGET, seq = e.seq, status, "health")
                    }
                    Some(HealthStatus::Critical) => {
                        error!(target: TARGET, seq = e.seq, status, "health")
                    }
                    _ => warn!(target: TARGET, seq = e.seq, status, "health"),
                }
            }
            EventKind::WatchdogExpired => {
                error!(target: TARGET, seq = e.seq, task, reason, "watchdog expired")
            }
            EventKind::ShutdownRequested => {
                info!(target: TARGET, seq = e.seq, "shutdown requested")
            }
            EventKind::SubscriberPanicked => {
                let subscriber = e.subscriber.unwrap_or("-");
                error!(target: TARGET, seq = e.seq, subscriber, reason, "subscriber panicked")
            }
            EventKind::SubscriberOverflow => {
                let subscriber = e.subscriber.unwrap_or("-");
                warn!(target: TARGET, seq = e.seq, subscriber, reason, "subscriber overflow")
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }

    fn queue_capacity(&self) -> usize {
        2048
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tracing_subscriber::EnvFilter;

    use crate::core::TaskKind;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn render_at_info(events: &[Event]) -> Vec<String> {
        let buf = Buffer::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("info"))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            for ev in events {
                futures::executor::block_on(LogWriter.on_event(ev));
            }
        });
        let out = String::from_utf8_lossy(&buf.0.lock()).into_owned();
        out.lines().map(str::to_owned).collect()
    }

    #[test]
    fn data_traffic_is_visible_at_default_filter() {
        let lines = render_at_info(&[
            Event::new(EventKind::ValueGenerated)
                .with_task(TaskKind::Producer)
                .with_value(7),
            Event::new(EventKind::ValueSent)
                .with_task(TaskKind::Producer)
                .with_value(7),
            Event::new(EventKind::ChannelEmpty)
                .with_task(TaskKind::Consumer)
                .with_empty_polls(3),
        ]);

        assert_eq!(lines.len(), 3, "{lines:?}");
        assert!(lines[0].contains("INFO") && lines[0].contains("value generated"));
        assert!(lines[1].contains("INFO") && lines[1].contains("value sent"));
        assert!(lines[2].contains("WARN") && lines[2].contains("channel empty"));
        assert!(lines[2].contains("empty_polls=3"));
    }

    #[test]
    fn terminal_escalation_is_an_error() {
        let lines = render_at_info(&[Event::new(EventKind::TimeoutEscalated)
            .with_task(TaskKind::Consumer)
            .with_level(EscalationLevel::Terminal)
            .with_empty_polls(15)]);

        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("ERROR"));
        assert!(lines[0].contains("LV3"));
    }
}
