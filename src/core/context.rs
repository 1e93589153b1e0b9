//! # Shared supervision context.
//!
//! [`SupervisionContext`] replaces process-wide globals: it owns the data
//! channel, the liveness board, the task registry and the watchdog, and is
//! handed to every task by `Arc` when it is created.
//!
//! [`TaskContext`] is the per-incarnation view a task receives: the shared
//! context plus its own kind, generation and cancellation token.
//!
//! ## Launch protocol
//! ```text
//! launch(task)
//!   ├─► gen   = registry.next_generation()
//!   ├─► join  = spawner.spawn(run_task(.., gate))   fails → SpawnError, nothing published
//!   ├─► registry.publish(kind, gen, token, join)
//!   └─► gate.open()                                 task loop may start now
//! ```
//! The task cannot observe or clear its slot before it is published.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::core::{Config, Registry, Spawn, TaskKind, Watchdog, runner};
use crate::error::SpawnError;
use crate::events::Bus;
use crate::primitives::{BoundedChannel, SignalBoard};
use crate::tasks::TaskRef;

/// Resources shared by every task of the pipeline.
pub struct SupervisionContext {
    cfg: Config,
    bus: Bus,
    channel: BoundedChannel,
    signals: SignalBoard,
    registry: Registry,
    watchdog: Watchdog,
    spawner: Arc<dyn Spawn>,
    runtime_token: CancellationToken,
}

impl SupervisionContext {
    pub(crate) fn new(
        cfg: Config,
        bus: Bus,
        channel: BoundedChannel,
        spawner: Arc<dyn Spawn>,
    ) -> Self {
        let watchdog = Watchdog::new(cfg.keepalive_timeout);
        Self {
            cfg,
            bus,
            channel,
            signals: SignalBoard::new(),
            registry: Registry::new(),
            watchdog,
            spawner,
            runtime_token: CancellationToken::new(),
        }
    }

    /// Pipeline configuration.
    pub fn cfg(&self) -> &Config {
        &self.cfg
    }

    /// Event bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Data channel between producer and consumer.
    pub fn channel(&self) -> &BoundedChannel {
        &self.channel
    }

    /// Liveness flags.
    pub fn signals(&self) -> &SignalBoard {
        &self.signals
    }

    /// Task registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Keepalive watchdog.
    pub fn watchdog(&self) -> &Watchdog {
        &self.watchdog
    }

    /// Parent token of every task.
    pub fn runtime_token(&self) -> &CancellationToken {
        &self.runtime_token
    }

    /// Creates a new incarnation of `task` and publishes it in the registry.
    ///
    /// Returns the generation of the new incarnation. On failure nothing is
    /// published and the slot keeps its previous state.
    pub fn launch(self: &Arc<Self>, task: TaskRef) -> Result<u64, SpawnError> {
        let kind = task.kind();
        let generation = self.registry.next_generation();
        let token = self.runtime_token.child_token();
        let cx = TaskContext {
            shared: Arc::clone(self),
            kind,
            generation,
            token: token.clone(),
        };

        let (open, gate) = oneshot::channel();
        let join = self
            .spawner
            .spawn(kind, Box::pin(runner::run_task(task, cx, gate)))?;
        self.registry.publish(kind, generation, token, join);
        let _ = open.send(());
        Ok(generation)
    }
}

/// What one task incarnation sees of the pipeline.
pub struct TaskContext {
    shared: Arc<SupervisionContext>,
    kind: TaskKind,
    generation: u64,
    token: CancellationToken,
}

impl TaskContext {
    /// Shared pipeline resources.
    pub fn shared(&self) -> &Arc<SupervisionContext> {
        &self.shared
    }

    /// Kind of this incarnation.
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Registry generation of this incarnation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Acknowledges the watchdog keepalive.
    pub fn keepalive(&self) {
        self.shared.watchdog.feed(self.kind, self.generation);
    }

    /// Clears this incarnation's registry slot and watchdog entry.
    ///
    /// After this returns the monitor reads the task as dead. Idempotent.
    pub fn release(&self) -> bool {
        self.shared.watchdog.unregister(self.kind, self.generation);
        self.shared.registry.release(self.kind, self.generation)
    }

    /// Sleeps for `period`; returns `false` if cancelled meanwhile.
    pub async fn delay(&self, period: Duration) -> bool {
        tokio::select! {
            _ = time::sleep(period) => true,
            _ = self.token.cancelled() => false,
        }
    }
}
