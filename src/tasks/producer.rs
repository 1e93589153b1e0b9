//! # Producer: sequential value generator.
//!
//! Each cycle the producer takes the next value, offers it to the channel
//! without blocking, and acknowledges the keepalive.
//!
//! ```text
//! loop {
//!   ├─► value = next                           ValueGenerated
//!   ├─► channel.try_send(value)
//!   │     ├─ ok   → signals.set(PRODUCER)      ValueSent
//!   │     └─ full → value discarded            ValueDropped
//!   ├─► keepalive
//!   └─► delay(producer_period)
//! }
//! ```
//!
//! Values start at 1 and wrap back to 1 after `Value::MAX`; 0 is never produced.
//! A dropped value is never retried.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{TaskContext, TaskKind};
use crate::events::{Event, EventKind};
use crate::primitives::{Liveness, Value};
use crate::tasks::{Task, TaskExit, TaskRef};

/// Generates sequential values into the channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Producer;

impl Producer {
    /// Shared handle to a producer starting at 1.
    pub fn arc() -> TaskRef {
        Arc::new(Producer)
    }
}

/// Successor in the sequence, wrapping to 1.
pub(crate) fn successor(value: Value) -> Value {
    value.checked_add(1).unwrap_or(1)
}

#[async_trait]
impl Task for Producer {
    fn kind(&self) -> TaskKind {
        TaskKind::Producer
    }

    async fn run(&self, cx: &TaskContext) -> TaskExit {
        let shared = cx.shared();
        let bus = shared.bus();
        let mut next: Value = 1;

        loop {
            let value = next;
            next = successor(next);
            bus.publish(
                Event::new(EventKind::ValueGenerated)
                    .with_task(TaskKind::Producer)
                    .with_value(value),
            );

            if shared.channel().try_send(value) {
                bus.publish(
                    Event::new(EventKind::ValueSent)
                        .with_task(TaskKind::Producer)
                        .with_value(value),
                );
                shared.signals().set(Liveness::PRODUCER);
            } else {
                bus.publish(
                    Event::new(EventKind::ValueDropped)
                        .with_task(TaskKind::Producer)
                        .with_value(value),
                );
            }

            cx.keepalive();
            if !cx.delay(shared.cfg().producer_period).await {
                return TaskExit::Canceled;
            }
        }
    }
}
