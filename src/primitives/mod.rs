//! Synchronization building blocks shared by the pipeline tasks.
//!
//! - [`BoundedChannel`] fixed-capacity FIFO with non-blocking send/receive and reset
//! - [`SignalBoard`] liveness flags with clear-on-read semantics
//!
//! Both carry their own internal mutual exclusion; every operation is
//! individually atomic and never suspends a task indefinitely.

mod channel;
mod signals;

pub use channel::BoundedChannel;
pub use signals::{Liveness, SignalBoard};

/// Data carried through the channel.
pub type Value = u64;
