//! # Monitor: consumer resurrection and health aggregation.
//!
//! Runs at a coarser period than the workers.
//!
//! ```text
//! loop {
//!   ├─► registry.is_alive(Consumer)?
//!   │     └─ no → RestartRequested
//!   │             launch(Consumer) ─┬─ ok  → RestartSucceeded{generation}
//!   │                               └─ err → RestartFailed{reason}   (retried next cycle)
//!   ├─► seen = signals.wait_and_clear(ALL, any, 0)
//!   │     └─ HealthReport{classify(seen)}
//!   ├─► keepalive
//!   └─► delay(monitor_period)
//! }
//! ```
//!
//! The monitor never cancels a running task and never ends on its own; its own
//! failure is covered by the watchdog.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::core::{SupervisionContext, TaskContext, TaskKind};
use crate::error::SpawnError;
use crate::events::{Event, EventKind};
use crate::primitives::Liveness;
use crate::tasks::{Consumer, HealthStatus, Task, TaskExit, TaskRef};

/// Supervises the consumer and reports pipeline health.
#[derive(Debug, Clone, Copy, Default)]
pub struct Monitor;

impl Monitor {
    /// Shared handle, ready for [`PipelineBuilder::with_tasks`](crate::PipelineBuilder::with_tasks).
    pub fn arc() -> TaskRef {
        Arc::new(Monitor)
    }
}

/// Recreates the consumer if its slot reads as terminated.
///
/// Returns `None` when the consumer is alive and nothing was attempted.
pub(crate) fn resurrect(shared: &Arc<SupervisionContext>) -> Option<Result<u64, SpawnError>> {
    if shared.registry().is_alive(TaskKind::Consumer) {
        return None;
    }

    let bus = shared.bus();
    bus.publish(Event::new(EventKind::RestartRequested).with_task(TaskKind::Consumer));

    let res = shared.launch(Consumer::arc());
    match &res {
        Ok(generation) => bus.publish(
            Event::new(EventKind::RestartSucceeded)
                .with_task(TaskKind::Consumer)
                .with_generation(*generation),
        ),
        Err(e) => bus.publish(
            Event::new(EventKind::RestartFailed)
                .with_task(TaskKind::Consumer)
                .with_reason(e.to_string()),
        ),
    }
    Some(res)
}

/// Reads and clears the liveness flags and publishes the classification.
pub(crate) async fn report(shared: &SupervisionContext) -> HealthStatus {
    let seen = shared
        .signals()
        .wait_and_clear(Liveness::ALL, true, Duration::ZERO)
        .await;
    let status = HealthStatus::classify(seen);
    shared.bus().publish(
        Event::new(EventKind::HealthReport)
            .with_task(TaskKind::Monitor)
            .with_status(status),
    );
    status
}

#[async_trait]
impl Task for Monitor {
    fn kind(&self) -> TaskKind {
        TaskKind::Monitor
    }

    async fn run(&self, cx: &TaskContext) -> TaskExit {
        let shared = cx.shared();
        loop {
            resurrect(shared);
            report(shared).await;
            cx.keepalive();
            if !cx.delay(shared.cfg().monitor_period).await {
                return TaskExit::Canceled;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Config, Spawn, TaskFuture, TaskState, TokioSpawner};
    use crate::events::Bus;
    use crate::primitives::BoundedChannel;
    use tokio::task::JoinHandle;

    struct Refusing;

    impl Spawn for Refusing {
        fn spawn(&self, task: TaskKind, _fut: TaskFuture) -> Result<JoinHandle<()>, SpawnError> {
            Err(SpawnError::Rejected {
                task,
                reason: "no memory".into(),
            })
        }
    }

    fn context(spawner: Arc<dyn Spawn>) -> Arc<SupervisionContext> {
        let cfg = Config::default();
        let channel = BoundedChannel::new(cfg.channel_capacity).unwrap();
        Arc::new(SupervisionContext::new(cfg, Bus::new(64), channel, spawner))
    }

    #[tokio::test]
    async fn dead_consumer_is_recreated_once() {
        let ctx = context(Arc::new(TokioSpawner::new(None)));
        let generation = resurrect(&ctx)
            .expect("attempted")
            .expect("spawned");
        assert_eq!(
            ctx.registry().state(TaskKind::Consumer),
            TaskState::Running { generation }
        );
        assert!(resurrect(&ctx).is_none());
        ctx.runtime_token().cancel();
    }

    #[tokio::test]
    async fn failed_creation_leaves_slot_terminated() {
        let ctx = context(Arc::new(Refusing));
        let mut rx = ctx.bus().subscribe();

        let err = resurrect(&ctx).expect("attempted").unwrap_err();
        assert_eq!(err.as_label(), "spawn_rejected");
        assert_eq!(ctx.registry().state(TaskKind::Consumer), TaskState::Terminated);

        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.kind)
            .collect();
        assert_eq!(kinds, vec![EventKind::RestartRequested, EventKind::RestartFailed]);

        // Still dead, so the next cycle tries again.
        assert!(resurrect(&ctx).is_some());
    }

    #[tokio::test]
    async fn report_classifies_and_clears() {
        let ctx = context(Arc::new(TokioSpawner::new(None)));
        ctx.signals().set(Liveness::CONSUMER);
        assert_eq!(report(&ctx).await, HealthStatus::DegradedProducerSilent);
        assert!(ctx.signals().snapshot().is_empty());
        assert_eq!(report(&ctx).await, HealthStatus::Critical);

        ctx.signals().set(Liveness::PRODUCER);
        ctx.signals().set(Liveness::CONSUMER);
        assert_eq!(report(&ctx).await, HealthStatus::Healthy);
    }
}
