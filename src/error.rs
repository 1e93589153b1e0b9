//! Error types used by the pipevisor runtime.
//!
//! This module defines the error enums of the crate:
//!
//! - [`RuntimeError`]: conditions fatal to the whole process (bad config,
//!   primitives or boot tasks that cannot be created, watchdog expiry).
//! - [`SpawnError`]: a task could not be created by the scheduler.
//! - [`ChannelError`]: the bounded channel could not be allocated.
//!
//! Errors never cross task boundaries: tasks handle their own transient failures
//! and report them as events. Each type provides `as_label` / `as_message`
//! helpers for logs.

use std::time::Duration;
use thiserror::Error;

use crate::core::TaskKind;

/// # Errors produced by the pipeline runtime itself.
///
/// Every variant is fatal to the process: the bootstrap is expected to exit
/// and let the outer reset mechanism start it again.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration rejected by [`Config::validate`](crate::Config::validate).
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong.
        reason: String,
    },

    /// The data channel could not be created at startup.
    #[error("failed to create data channel: {0}")]
    ChannelInit(#[from] ChannelError),

    /// A boot task could not be created.
    #[error("failed to start boot task: {0}")]
    Boot(#[from] SpawnError),

    /// A task stopped acknowledging the keepalive within the configured window.
    #[error("watchdog expired: task {task} silent for more than {timeout:?}")]
    WatchdogExpired {
        /// Task that missed its keepalive.
        task: TaskKind,
        /// Configured keepalive window.
        timeout: Duration,
    },

    /// OS signal listeners could not be installed.
    #[error("failed to install signal handlers: {0}")]
    Signal(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pipevisor::RuntimeError;
    ///
    /// let err = RuntimeError::InvalidConfig { reason: "capacity is zero".into() };
    /// assert_eq!(err.as_label(), "runtime_invalid_config");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::InvalidConfig { .. } => "runtime_invalid_config",
            RuntimeError::ChannelInit(_) => "runtime_channel_init",
            RuntimeError::Boot(_) => "runtime_boot",
            RuntimeError::WatchdogExpired { .. } => "runtime_watchdog_expired",
            RuntimeError::Signal(_) => "runtime_signal",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::InvalidConfig { reason } => format!("invalid config: {reason}"),
            RuntimeError::ChannelInit(e) => format!("channel init: {e}"),
            RuntimeError::Boot(e) => format!("boot: {e}"),
            RuntimeError::WatchdogExpired { task, timeout } => {
                format!("watchdog expired after {timeout:?}; task={task}")
            }
            RuntimeError::Signal(e) => format!("signal handlers: {e}"),
        }
    }
}

/// # Errors produced when creating a task.
///
/// Creation failures are never fatal: the supervisor logs them and tries
/// again on its next cycle.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpawnError {
    /// No async runtime is available on the calling thread.
    #[error("no runtime available to spawn {task}")]
    NoRuntime {
        /// Task that could not be created.
        task: TaskKind,
    },

    /// The task budget of the spawner is used up.
    #[error("task budget of {limit} exhausted while spawning {task}")]
    Exhausted {
        /// Task that could not be created.
        task: TaskKind,
        /// Configured budget.
        limit: usize,
    },

    /// Creation rejected for another reason (custom spawners).
    #[error("spawn of {task} rejected: {reason}")]
    Rejected {
        /// Task that could not be created.
        task: TaskKind,
        /// Rejection reason.
        reason: String,
    },
}

impl SpawnError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SpawnError::NoRuntime { .. } => "spawn_no_runtime",
            SpawnError::Exhausted { .. } => "spawn_exhausted",
            SpawnError::Rejected { .. } => "spawn_rejected",
        }
    }

    /// Task that failed to start.
    pub fn task(&self) -> TaskKind {
        match self {
            SpawnError::NoRuntime { task }
            | SpawnError::Exhausted { task, .. }
            | SpawnError::Rejected { task, .. } => *task,
        }
    }
}

/// # Errors produced when allocating the bounded channel.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// A channel must hold at least one value.
    #[error("capacity must be at least 1")]
    ZeroCapacity,

    /// Backing storage could not be reserved.
    #[error("could not reserve storage for {capacity} values")]
    OutOfMemory {
        /// Requested capacity.
        capacity: usize,
    },
}
