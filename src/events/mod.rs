//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to everything the pipeline does.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Producer`, `Consumer`, `Monitor`, the task runner,
//!   the watchdog, `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the pipeline's subscriber listener (fans out to
//!   `SubscriberSet`) and anything that calls [`Bus::subscribe`] directly.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
