use std::sync::Arc;

use super::{Config, Pipeline, Spawn, SupervisionContext, TokioSpawner};
use crate::error::RuntimeError;
use crate::events::Bus;
use crate::primitives::BoundedChannel;
use crate::subscribers::Subscribe;
use crate::tasks::{Consumer, Monitor, Producer, TaskRef};

/// Builder for constructing a [`Pipeline`].
pub struct PipelineBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    spawner: Option<Arc<dyn Spawn>>,
    tasks: Option<Vec<TaskRef>>,
}

impl PipelineBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            spawner: None,
            tasks: None,
        }
    }

    /// Sets event subscribers (logging, metrics, ...).
    ///
    /// Each subscriber gets a dedicated worker with a bounded queue.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Replaces the default [`TokioSpawner`].
    ///
    /// `Config::max_tasks` only applies to the default spawner.
    pub fn with_spawner(mut self, spawner: Arc<dyn Spawn>) -> Self {
        self.spawner = Some(spawner);
        self
    }

    /// Sets the tasks started at boot, in order.
    ///
    /// Default: producer, consumer, monitor.
    pub fn with_tasks(mut self, tasks: Vec<TaskRef>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    /// Validates the configuration and allocates the shared resources.
    ///
    /// Fails if the configuration is invalid or the channel cannot be created;
    /// both are fatal to the process. Does not need a running runtime.
    pub fn build(self) -> Result<Pipeline, RuntimeError> {
        self.cfg.validate()?;

        let channel = BoundedChannel::new(self.cfg.channel_capacity)?;
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let spawner = self
            .spawner
            .unwrap_or_else(|| Arc::new(TokioSpawner::new(self.cfg.task_limit())));
        let tasks = self
            .tasks
            .unwrap_or_else(|| vec![Producer::arc(), Consumer::arc(), Monitor::arc()]);

        let ctx = Arc::new(SupervisionContext::new(self.cfg, bus, channel, spawner));
        Ok(Pipeline::new_internal(ctx, self.subscribers, tasks))
    }
}
