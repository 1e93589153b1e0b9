//! Runtime core: shared context, task lifecycle and process supervision.
//!
//! The public API from this module is [`Pipeline`] (and its builder), the
//! [`SupervisionContext`] handed to tasks, the [`Registry`] of task slots,
//! the [`Watchdog`], and the [`Spawn`] seam.
//!
//! Internal modules:
//! - [`pipeline`]: boots tasks, fans out events, watches keepalives;
//! - [`context`]: shared resources and the gated launch protocol;
//! - [`runner`]: runs one incarnation and releases its slot on exit;
//! - [`registry`]: task slots with generation-checked release;
//! - [`watchdog`]: per-task keepalive window;
//! - [`spawner`]: task creation seam with an optional budget;
//! - [`shutdown`]: OS signal treated as external reset.

mod builder;
mod config;
mod context;
mod pipeline;
mod registry;
mod runner;
mod shutdown;
mod spawner;
mod watchdog;

pub use builder::PipelineBuilder;
pub use config::{Config, Thresholds};
pub use context::{SupervisionContext, TaskContext};
pub use pipeline::Pipeline;
pub use registry::{Registry, TaskKind, TaskState};
pub use spawner::{Spawn, TaskFuture, TokioSpawner};
pub use watchdog::Watchdog;
