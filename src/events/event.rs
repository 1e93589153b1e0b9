//! # Runtime events emitted by the pipeline tasks and runtime.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Data events**: values generated, sent, dropped and received
//! - **Escalation events**: empty polls, timeout levels, channel reset
//! - **Supervision events**: task lifecycle, resurrection, health, watchdog
//! - **Subscriber events**: overflow and panics of event subscribers
//!
//! The [`Event`] struct carries the metadata relevant to its kind.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use pipevisor::{Event, EventKind, TaskKind};
//!
//! let ev = Event::new(EventKind::ChannelEmpty)
//!     .with_task(TaskKind::Consumer)
//!     .with_empty_polls(3);
//!
//! assert_eq!(ev.kind, EventKind::ChannelEmpty);
//! assert_eq!(ev.task, Some(TaskKind::Consumer));
//! assert_eq!(ev.empty_polls, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::core::TaskKind;
use crate::primitives::Value;
use crate::tasks::{EscalationLevel, HealthStatus};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Data events ===
    /// Producer generated a new value.
    ///
    /// Sets: `task`, `value`
    ValueGenerated,

    /// Producer enqueued a value.
    ///
    /// Sets: `task`, `value`
    ValueSent,

    /// Producer found the channel full; the value is discarded.
    ///
    /// Sets: `task`, `value`
    ValueDropped,

    /// Consumer received and processed a value.
    ///
    /// Sets: `task`, `value`
    ValueReceived,

    /// Consumer could not allocate scratch storage for a received value.
    ///
    /// Sets: `task`, `value`, `reason`
    AllocationFailed,

    // === Escalation events ===
    /// Consumer polled an empty channel.
    ///
    /// Sets: `task`, `empty_polls` (post-increment count)
    ChannelEmpty,

    /// Consumer reached an escalation threshold.
    ///
    /// Sets: `task`, `level`, `empty_polls`
    TimeoutEscalated,

    /// Channel was flushed as level 2 recovery.
    ///
    /// Sets: `task`, `dropped` (number of discarded values)
    ChannelReset,

    // === Supervision events ===
    /// Task incarnation is starting its loop.
    ///
    /// Sets: `task`, `generation`
    TaskStarting,

    /// Task incarnation left its loop.
    ///
    /// Sets: `task`, `generation`, `reason` (`terminated`, `canceled`, `aborted`)
    TaskStopped,

    /// Monitor found the consumer dead and is recreating it.
    ///
    /// Sets: `task` (task being restarted)
    RestartRequested,

    /// Monitor recreated the task.
    ///
    /// Sets: `task`, `generation`
    RestartSucceeded,

    /// Monitor failed to recreate the task; retried next cycle.
    ///
    /// Sets: `task`, `reason`
    RestartFailed,

    /// Per-cycle health classification.
    ///
    /// Sets: `task` (monitor), `status`
    HealthReport,

    /// A task missed its keepalive window; the process is going down.
    ///
    /// Sets: `task`, `reason`
    WatchdogExpired,

    /// Shutdown requested (OS signal or explicit cancel).
    ShutdownRequested,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `subscriber`, `reason` (panic message)
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `subscriber`, `reason` (`full` or `closed`)
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Task the event is about.
    pub task: Option<TaskKind>,
    /// Data value, for data events.
    pub value: Option<Value>,
    /// Consecutive empty polls of the consumer.
    pub empty_polls: Option<u32>,
    /// Escalation level reached.
    pub level: Option<EscalationLevel>,
    /// Health classification of a monitor cycle.
    pub status: Option<HealthStatus>,
    /// Registry generation of a task incarnation.
    pub generation: Option<u64>,
    /// Number of values discarded by a channel reset.
    pub dropped: Option<usize>,
    /// Subscriber name, for subscriber events.
    pub subscriber: Option<&'static str>,
    /// Human-readable reason (errors, exit reasons, overflow details).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            value: None,
            empty_polls: None,
            level: None,
            status: None,
            generation: None,
            dropped: None,
            subscriber: None,
            reason: None,
        }
    }

    /// Attaches the task the event is about.
    #[inline]
    pub fn with_task(mut self, task: TaskKind) -> Self {
        self.task = Some(task);
        self
    }

    /// Attaches a data value.
    #[inline]
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Attaches the consumer's empty-poll count.
    #[inline]
    pub fn with_empty_polls(mut self, n: u32) -> Self {
        self.empty_polls = Some(n);
        self
    }

    /// Attaches an escalation level.
    #[inline]
    pub fn with_level(mut self, level: EscalationLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// Attaches a health classification.
    #[inline]
    pub fn with_status(mut self, status: HealthStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches a task generation.
    #[inline]
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Attaches the number of values discarded by a reset.
    #[inline]
    pub fn with_dropped(mut self, dropped: usize) -> Self {
        self.dropped = Some(dropped);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        let mut ev = Event::new(EventKind::SubscriberOverflow).with_reason(reason);
        ev.subscriber = Some(subscriber);
        ev
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        let mut ev = Event::new(EventKind::SubscriberPanicked).with_reason(info);
        ev.subscriber = Some(subscriber);
        ev
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
