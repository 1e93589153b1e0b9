//! # Bounded, non-blocking FIFO of values.
//!
//! [`BoundedChannel`] is the data path between producer and consumer.
//!
//! ## Rules
//! - `len() <= capacity()` always
//! - a failed `try_send` leaves the contents untouched
//! - `reset()` drops every pending value in one step

use std::collections::VecDeque;

use parking_lot::Mutex;

use super::Value;
use crate::error::ChannelError;

/// Fixed-capacity FIFO queue shared by the producer and the consumer.
#[derive(Debug)]
pub struct BoundedChannel {
    inner: Mutex<VecDeque<Value>>,
    capacity: usize,
}

impl BoundedChannel {
    /// Allocates a channel able to hold `capacity` values.
    ///
    /// Storage is reserved up front; the channel never grows afterwards.
    pub fn new(capacity: usize) -> Result<Self, ChannelError> {
        if capacity == 0 {
            return Err(ChannelError::ZeroCapacity);
        }
        let mut buf = VecDeque::new();
        buf.try_reserve_exact(capacity)
            .map_err(|_| ChannelError::OutOfMemory { capacity })?;
        Ok(Self {
            inner: Mutex::new(buf),
            capacity,
        })
    }

    /// Enqueues `value` if there is room. Returns `false` when full.
    pub fn try_send(&self, value: Value) -> bool {
        let mut q = self.inner.lock();
        if q.len() >= self.capacity {
            return false;
        }
        q.push_back(value);
        true
    }

    /// Dequeues the oldest value, if any.
    pub fn try_receive(&self) -> Option<Value> {
        self.inner.lock().pop_front()
    }

    /// Drops all pending values and returns how many were discarded.
    pub fn reset(&self) -> usize {
        let mut q = self.inner.lock();
        let dropped = q.len();
        q.clear();
        dropped
    }

    /// Number of pending values.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of pending values.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
