//! # Built-in subscribers
//!
//! - [`LogWriter`]: renders every event as one `tracing` record.

mod log;

pub use log::LogWriter;
