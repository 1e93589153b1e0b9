//! # Pipeline tasks.
//!
//! - [`Task`] - trait for the periodic, cancelable loops the runtime supervises
//! - [`Producer`] - generates sequential values into the channel
//! - [`Consumer`] - drains the channel with escalating starvation recovery
//! - [`Monitor`] - resurrects the consumer and classifies pipeline health
//! - [`StarvationTracker`], [`EscalationLevel`] - consumer escalation state machine
//! - [`HealthStatus`] - four-way health classification

mod consumer;
mod escalation;
mod health;
mod monitor;
mod producer;
mod task;

pub use consumer::Consumer;
pub use escalation::{EscalationLevel, StarvationTracker};
pub use health::HealthStatus;
pub use monitor::Monitor;
pub use producer::Producer;
pub use task::{Task, TaskExit, TaskRef};
