//! # Event subscriber trait.
//!
//! Each subscriber gets its own bounded queue and worker task inside the
//! [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Rules
//! - A slow subscriber only fills its own queue; publishers never wait on it.
//! - On overflow the event is dropped for that subscriber only and
//!   `EventKind::SubscriberOverflow` is published.
//! - Events are processed sequentially (FIFO) per subscriber.
//! - Panics are caught and published as `EventKind::SubscriberPanicked`.

use async_trait::async_trait;

use crate::events::Event;

/// Event handler plugged into the pipeline.
///
/// Implementations should use async I/O and handle their own errors.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from the subscriber's worker task, never in the publisher context.
    async fn on_event(&self, event: &Event);

    /// Name used in overflow and panic events.
    ///
    /// The default is `type_name::<Self>()`; override it with something short.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred queue capacity, clamped to at least 1.
    ///
    /// Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
