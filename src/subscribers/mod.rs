//! # Event subscribers.
//!
//! Everything the pipeline does is published on the [`Bus`](crate::Bus). The
//! pipeline forwards those events to the [`Subscribe`] implementations given
//! to [`PipelineBuilder::with_subscribers`](crate::PipelineBuilder::with_subscribers).
//!
//! ```text
//! Producer / Consumer / Monitor / runtime
//!        └─ publish(Event) ─► Bus ─► listener ─► SubscriberSet::emit
//!                                                   ├─► [queue] ─► LogWriter
//!                                                   └─► [queue] ─► custom ...
//! ```
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use pipevisor::{Event, EventKind, Subscribe};
//!
//! struct RestartCounter(std::sync::atomic::AtomicUsize);
//!
//! #[async_trait]
//! impl Subscribe for RestartCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::RestartSucceeded {
//!             self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "restarts" }
//! }
//! ```

mod embedded;
mod subscriber;
mod subscriber_set;

pub use embedded::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
