//! # pipevisor
//!
//! A supervised producer/consumer pipeline for long-running processes that
//! must recover on their own.
//!
//! Three periodic tasks share a small bounded channel and a set of liveness
//! flags:
//! - the **producer** pushes sequential values and drops them when the channel is full;
//! - the **consumer** drains the channel and escalates when it stays empty
//!   (advisory, then a channel reset, then self-termination);
//! - the **monitor** recreates a terminated consumer and classifies health
//!   from the flags it reads and clears each cycle.
//!
//! Every task acknowledges a keepalive; a task that stops acknowledging
//! within the window ends the process, leaving recovery to whatever restarts it.
//!
//! ## Architecture
//! ```text
//!  ┌──────────┐ try_send ┌────────────────┐ try_receive ┌──────────┐
//!  │ Producer ├─────────►│ BoundedChannel ├────────────►│ Consumer │
//!  └────┬─────┘          └───────▲────────┘             └────┬─────┘
//!       │ set(PRODUCER)          │ reset (LV2)               │ set(CONSUMER)
//!       ▼                        └───────────────────────────┤
//!  ┌──────────────────────────────────────────┐              │ release slot (LV3)
//!  │ SignalBoard (clear-on-read liveness)     │◄─────────────┘
//!  └─────────────────────┬────────────────────┘
//!                        │ wait_and_clear(ALL, any, 0)
//!                   ┌────▼────┐  is_alive(Consumer)?  ┌──────────┐
//!                   │ Monitor ├──────────────────────►│ Registry │
//!                   └────┬────┘  launch(Consumer)     └──────────┘
//!                        ▼
//!                   HealthReport
//!
//!  every task ── keepalive ──► Watchdog ── expiry ──► RuntimeError::WatchdogExpired
//!  every action ── Event ──► Bus ──► SubscriberSet ──► LogWriter / custom
//! ```
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use pipevisor::{Config, LogWriter, Pipeline, Subscribe};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pipevisor::RuntimeError> {
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     Pipeline::builder(Config::default())
//!         .with_subscribers(subs)
//!         .build()?
//!         .run()
//!         .await
//! }
//! ```

mod core;
mod error;
mod events;
mod primitives;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use core::{
    Config, Pipeline, PipelineBuilder, Registry, Spawn, SupervisionContext, TaskContext,
    TaskFuture, TaskKind, TaskState, Thresholds, TokioSpawner, Watchdog,
};
pub use error::{ChannelError, RuntimeError, SpawnError};
pub use events::{Bus, Event, EventKind};
pub use primitives::{BoundedChannel, Liveness, SignalBoard, Value};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use tasks::{
    Consumer, EscalationLevel, HealthStatus, Monitor, Producer, StarvationTracker, Task,
    TaskExit, TaskRef,
};
