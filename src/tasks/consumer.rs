//! # Consumer: drains the channel, escalates on starvation.
//!
//! ## Cycle
//! ```text
//! loop {
//!   ├─► channel.try_receive()
//!   │     ├─ hit  → stage value in scratch storage
//!   │     │          ├─ alloc fails → AllocationFailed, counter untouched
//!   │     │          └─ ok → ValueReceived, counter = 0, set(CONSUMER), keepalive
//!   │     └─ miss → counter += 1, ChannelEmpty{count}
//!   │               ├─ == advisory → TimeoutEscalated{LV1}
//!   │               ├─ == recovery → TimeoutEscalated{LV2}, channel.reset(), ChannelReset
//!   │               └─ >= terminal → TimeoutEscalated{LV3}, release slot, exit
//!   └─► delay(consumer_period)       (same cadence on every branch)
//! }
//! ```
//!
//! Terminating is deliberate: the consumer clears its own registry slot and
//! leaves the loop, and the monitor creates a fresh incarnation (count 0) on
//! its next cycle.

use std::collections::TryReserveError;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{SupervisionContext, TaskContext, TaskKind};
use crate::events::{Event, EventKind};
use crate::primitives::{Liveness, Value};
use crate::tasks::{EscalationLevel, StarvationTracker, Task, TaskExit, TaskRef};

/// Drains the channel under the escalating starvation policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Consumer;

impl Consumer {
    /// Shared handle, ready for [`PipelineBuilder::with_tasks`](crate::PipelineBuilder::with_tasks).
    pub fn arc() -> TaskRef {
        Arc::new(Consumer)
    }
}

/// Outcome of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Poll {
    /// A value was processed.
    Received(Value),
    /// A value was taken but could not be processed.
    Skipped(Value),
    /// The channel was empty; carries the level reached, if any.
    Empty(Option<EscalationLevel>),
}

/// Processing step applied to every received value.
pub(crate) type Stage = fn(Value) -> Result<Value, TryReserveError>;

/// Copies `value` through freshly allocated scratch storage.
fn stage(value: Value) -> Result<Value, TryReserveError> {
    let mut scratch: Vec<Value> = Vec::new();
    scratch.try_reserve_exact(1)?;
    scratch.push(value);
    Ok(scratch.first().copied().unwrap_or(value))
}

/// One receive attempt plus escalation, without the delay.
pub(crate) fn poll_once(
    shared: &SupervisionContext,
    tracker: &mut StarvationTracker,
    stage: Stage,
) -> Poll {
    let bus = shared.bus();

    let Some(value) = shared.channel().try_receive() else {
        let level = tracker.on_miss();
        let count = tracker.empty_polls();
        bus.publish(
            Event::new(EventKind::ChannelEmpty)
                .with_task(TaskKind::Consumer)
                .with_empty_polls(count),
        );
        if let Some(level) = level {
            bus.publish(
                Event::new(EventKind::TimeoutEscalated)
                    .with_task(TaskKind::Consumer)
                    .with_level(level)
                    .with_empty_polls(count),
            );
            if level == EscalationLevel::Recovery {
                let dropped = shared.channel().reset();
                bus.publish(
                    Event::new(EventKind::ChannelReset)
                        .with_task(TaskKind::Consumer)
                        .with_dropped(dropped),
                );
            }
        }
        return Poll::Empty(level);
    };

    match stage(value) {
        Ok(value) => {
            tracker.on_hit();
            bus.publish(
                Event::new(EventKind::ValueReceived)
                    .with_task(TaskKind::Consumer)
                    .with_value(value),
            );
            shared.signals().set(Liveness::CONSUMER);
            Poll::Received(value)
        }
        Err(e) => {
            bus.publish(
                Event::new(EventKind::AllocationFailed)
                    .with_task(TaskKind::Consumer)
                    .with_value(value)
                    .with_reason(e.to_string()),
            );
            Poll::Skipped(value)
        }
    }
}

#[async_trait]
impl Task for Consumer {
    fn kind(&self) -> TaskKind {
        TaskKind::Consumer
    }

    async fn run(&self, cx: &TaskContext) -> TaskExit {
        let shared = cx.shared();
        let mut tracker = StarvationTracker::new(shared.cfg().thresholds);

        loop {
            match poll_once(shared, &mut tracker, stage) {
                Poll::Received(_) => cx.keepalive(),
                Poll::Empty(Some(EscalationLevel::Terminal)) => {
                    cx.release();
                    return TaskExit::Terminated;
                }
                Poll::Skipped(_) | Poll::Empty(_) => {}
            }
            if !cx.delay(shared.cfg().consumer_period).await {
                return TaskExit::Canceled;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Config, TokioSpawner};
    use crate::events::Bus;
    use crate::primitives::BoundedChannel;

    fn context() -> SupervisionContext {
        let cfg = Config::default();
        let channel = BoundedChannel::new(cfg.channel_capacity).unwrap();
        SupervisionContext::new(
            cfg,
            Bus::new(256),
            channel,
            Arc::new(TokioSpawner::new(None)),
        )
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn hit_resets_counter_and_sets_flag() {
        let ctx = context();
        let mut tracker = StarvationTracker::new(ctx.cfg().thresholds);
        for _ in 0..3 {
            poll_once(&ctx, &mut tracker, stage);
        }
        assert_eq!(tracker.empty_polls(), 3);

        ctx.channel().try_send(7);
        assert_eq!(poll_once(&ctx, &mut tracker, stage), Poll::Received(7));
        assert_eq!(tracker.empty_polls(), 0);
        assert!(ctx.signals().snapshot().contains(Liveness::CONSUMER));
    }

    #[test]
    fn miss_does_not_set_flag() {
        let ctx = context();
        let mut tracker = StarvationTracker::new(ctx.cfg().thresholds);
        assert_eq!(poll_once(&ctx, &mut tracker, stage), Poll::Empty(None));
        assert!(ctx.signals().snapshot().is_empty());
    }

    #[test]
    fn starvation_escalates_once_per_level() {
        let ctx = context();
        let mut rx = ctx.bus().subscribe();
        let mut tracker = StarvationTracker::new(ctx.cfg().thresholds);

        let outcomes: Vec<Poll> = (0..15)
            .map(|_| poll_once(&ctx, &mut tracker, stage))
            .collect();
        assert_eq!(outcomes[4], Poll::Empty(Some(EscalationLevel::Advisory)));
        assert_eq!(outcomes[9], Poll::Empty(Some(EscalationLevel::Recovery)));
        assert_eq!(outcomes[14], Poll::Empty(Some(EscalationLevel::Terminal)));

        let events = drain(&mut rx);
        let levels: Vec<EscalationLevel> = events
            .iter()
            .filter(|e| e.kind == EventKind::TimeoutEscalated)
            .filter_map(|e| e.level)
            .collect();
        assert_eq!(
            levels,
            vec![
                EscalationLevel::Advisory,
                EscalationLevel::Recovery,
                EscalationLevel::Terminal
            ]
        );
        let counts: Vec<u32> = events
            .iter()
            .filter(|e| e.kind == EventKind::ChannelEmpty)
            .filter_map(|e| e.empty_polls)
            .collect();
        assert_eq!(counts, (1..=15).collect::<Vec<_>>());
    }

    #[test]
    fn recovery_flushes_channel() {
        let ctx = context();
        let mut rx = ctx.bus().subscribe();
        let mut tracker = StarvationTracker::new(ctx.cfg().thresholds);
        for _ in 0..9 {
            poll_once(&ctx, &mut tracker, stage);
        }

        let outcome = poll_once(&ctx, &mut tracker, stage);
        assert_eq!(outcome, Poll::Empty(Some(EscalationLevel::Recovery)));
        assert!(ctx.channel().is_empty());

        let reset = drain(&mut rx)
            .into_iter()
            .find(|e| e.kind == EventKind::ChannelReset)
            .expect("channel reset event");
        assert_eq!(reset.dropped, Some(0));
    }

    fn out_of_memory(_: Value) -> Result<Value, TryReserveError> {
        Err(Vec::<u8>::new().try_reserve(usize::MAX).unwrap_err())
    }

    #[test]
    fn allocation_failure_leaves_counter_and_flags_untouched() {
        let ctx = context();
        let mut rx = ctx.bus().subscribe();
        let mut tracker = StarvationTracker::new(ctx.cfg().thresholds);
        for _ in 0..3 {
            poll_once(&ctx, &mut tracker, stage);
        }

        ctx.channel().try_send(9);
        assert_eq!(
            poll_once(&ctx, &mut tracker, out_of_memory),
            Poll::Skipped(9)
        );
        assert_eq!(tracker.empty_polls(), 3);
        assert!(ctx.signals().snapshot().is_empty());
        assert!(ctx.channel().is_empty());

        let events = drain(&mut rx);
        let failed: Vec<&Event> = events
            .iter()
            .filter(|e| e.kind == EventKind::AllocationFailed)
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].value, Some(9));
        assert!(failed[0].reason.is_some());
        assert!(events.iter().all(|e| e.kind != EventKind::ValueReceived));

        // The next miss continues the same episode.
        assert_eq!(poll_once(&ctx, &mut tracker, stage), Poll::Empty(None));
        assert_eq!(tracker.empty_polls(), 4);
    }

    #[test]
    fn staging_returns_the_value() {
        assert_eq!(stage(41).unwrap(), 41);
    }
}
