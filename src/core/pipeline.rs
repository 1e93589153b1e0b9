//! # Pipeline: boots the tasks, fans out events, and watches keepalives.
//!
//! The [`Pipeline`] owns the [`SupervisionContext`] and drives the process
//! lifetime. It starts the boot tasks (producer, consumer, monitor by default),
//! forwards every bus event to the configured subscribers, and runs the
//! watchdog until the process is reset.
//!
//! ## High-level architecture
//! ```text
//! Pipeline::builder(cfg).build()
//!   └─► SupervisionContext { channel, signals, registry, watchdog, bus, spawner }
//!
//! run_until(stop):
//!   - subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!   - boot: launch(task) for every boot task (failure is fatal)
//!   - select:
//!       ├─ watchdog.watch() ─► Err(WatchdogExpired)   (process must restart)
//!       └─ stop.cancelled() ─► ShutdownRequested
//!   - cancel runtime token, join every incarnation, flush subscribers
//!
//! Tasks at runtime:
//!   Producer ──try_send──► BoundedChannel ──try_receive──► Consumer
//!      │                                                      │
//!      └──set(PRODUCER)──► SignalBoard ◄──set(CONSUMER)───────┘
//!                              │ wait_and_clear
//!                              ▼
//!                           Monitor ──is_alive(Consumer)? ──► launch(Consumer)
//! ```

use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{Config, PipelineBuilder, SupervisionContext, shutdown};
use crate::error::{RuntimeError, SpawnError};
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::TaskRef;

/// Supervised producer/consumer pipeline.
pub struct Pipeline {
    ctx: Arc<SupervisionContext>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    tasks: Vec<TaskRef>,
}

impl Pipeline {
    /// Creates a builder with the given configuration.
    pub fn builder(cfg: Config) -> PipelineBuilder {
        PipelineBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        ctx: Arc<SupervisionContext>,
        subscribers: Vec<Arc<dyn Subscribe>>,
        tasks: Vec<TaskRef>,
    ) -> Self {
        Self {
            ctx,
            subscribers,
            tasks,
        }
    }

    /// Shared resources (channel, signals, registry, ...).
    pub fn context(&self) -> &Arc<SupervisionContext> {
        &self.ctx
    }

    /// Event bus; subscribe before `run` to observe boot events.
    pub fn bus(&self) -> &Bus {
        self.ctx.bus()
    }

    /// Runs until an OS termination signal or a watchdog expiry.
    pub async fn run(self) -> Result<(), RuntimeError> {
        let stop = CancellationToken::new();
        let trigger = stop.clone();
        let signals = tokio::spawn(async move {
            let res = shutdown::external_reset().await;
            trigger.cancel();
            res
        });

        let res = self.run_until(stop).await;

        if signals.is_finished() {
            if let Ok(Err(e)) = signals.await {
                return Err(RuntimeError::Signal(e));
            }
        } else {
            signals.abort();
        }
        res
    }

    /// Runs until `stop` is cancelled or a watchdog expiry.
    ///
    /// Every task is cancelled and joined before this returns, and subscribers
    /// have processed every event published up to that point.
    pub async fn run_until(self, stop: CancellationToken) -> Result<(), RuntimeError> {
        let Pipeline {
            ctx,
            subscribers,
            tasks,
        } = self;

        let subs = Arc::new(SubscriberSet::new(subscribers, ctx.bus().clone()));
        let drained = CancellationToken::new();
        let listener = subscriber_listener(ctx.bus(), Arc::clone(&subs), drained.clone());

        let res = match boot(&ctx, tasks) {
            Err(e) => Err(RuntimeError::Boot(e)),
            Ok(()) => tokio::select! {
                res = ctx.watchdog().watch(ctx.bus(), ctx.runtime_token()) => res,
                _ = stop.cancelled() => {
                    ctx.bus().publish(Event::new(EventKind::ShutdownRequested));
                    Ok(())
                }
            },
        };

        ctx.runtime_token().cancel();
        loop {
            let joins = ctx.registry().cancel_all();
            if joins.is_empty() {
                break;
            }
            for join in joins {
                let _ = join.await;
            }
        }

        drained.cancel();
        let _ = listener.await;
        if let Ok(set) = Arc::try_unwrap(subs) {
            set.shutdown().await;
        }
        res
    }
}

/// Launches the boot tasks in order.
fn boot(ctx: &Arc<SupervisionContext>, tasks: Vec<TaskRef>) -> Result<(), SpawnError> {
    for task in tasks {
        ctx.launch(task)?;
    }
    Ok(())
}

/// Forwards bus events to the subscriber set until `drained`, then flushes.
fn subscriber_listener(
    bus: &Bus,
    set: Arc<SubscriberSet>,
    drained: CancellationToken,
) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
                _ = drained.cancelled() => {
                    loop {
                        match rx.try_recv() {
                            Ok(ev) => set.emit(&ev),
                            Err(TryRecvError::Lagged(_)) => continue,
                            Err(_) => break,
                        }
                    }
                    break;
                }
            }
        }
    })
}
