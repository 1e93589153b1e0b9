//! # Task abstraction.
//!
//! A [`Task`] is one of the pipeline's periodic loops. The runtime creates an
//! incarnation by calling [`Task::run`] with a fresh [`TaskContext`]; all
//! per-run state lives inside `run`, so every incarnation starts clean.
//!
//! # Example
//! ```
//! use async_trait::async_trait;
//! use pipevisor::{Task, TaskContext, TaskExit, TaskKind};
//!
//! struct Idle;
//!
//! #[async_trait]
//! impl Task for Idle {
//!     fn kind(&self) -> TaskKind { TaskKind::Producer }
//!
//!     async fn run(&self, cx: &TaskContext) -> TaskExit {
//!         loop {
//!             cx.keepalive();
//!             if !cx.delay(cx.shared().cfg().producer_period).await {
//!                 return TaskExit::Canceled;
//!             }
//!         }
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{TaskContext, TaskKind};

/// Why an incarnation left its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskExit {
    /// The task ended itself on purpose (consumer terminal timeout).
    Terminated,
    /// The runtime cancelled the task.
    Canceled,
}

impl TaskExit {
    /// Stable label used as the `reason` of `TaskStopped`.
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskExit::Terminated => "terminated",
            TaskExit::Canceled => "canceled",
        }
    }
}

/// Periodic, cancelable pipeline loop.
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Registry identity of this task.
    fn kind(&self) -> TaskKind;

    /// Runs one incarnation until it terminates itself or is cancelled.
    async fn run(&self, cx: &TaskContext) -> TaskExit;
}

/// Shared handle to a task.
pub type TaskRef = Arc<dyn Task>;
