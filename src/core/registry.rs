//! # Task registry - single source of truth for task liveness.
//!
//! The registry holds one slot per [`TaskKind`]. A slot is either occupied by
//! a running incarnation (identified by its generation) or empty, which reads
//! as [`TaskState::Terminated`].
//!
//! ## Architecture
//! ```text
//! SupervisionContext::launch(task)
//!     ├─► spawner.spawn(gated future)      (task cannot run yet)
//!     ├─► Registry::publish(kind, gen, …)   (slot → Running{gen})
//!     └─► open gate                         (task loop starts)
//!
//! Task exit (terminal path, cancel, panic)
//!     └─► Registry::release(kind, gen)      (slot → Terminated, only if gen matches)
//!
//! Monitor
//!     └─► Registry::is_alive(Consumer)      (atomic read under lock)
//! ```
//!
//! ## Rules
//! - A slot is published only after the task is fully spawned
//! - Only the incarnation that owns a slot can clear it (generation check)
//! - Reads never observe a half-written slot (single `RwLock`)

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Identity of a pipeline task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    /// Generates values.
    Producer,
    /// Drains values, escalates on starvation.
    Consumer,
    /// Resurrects the consumer and reports health.
    Monitor,
}

impl TaskKind {
    /// Stable lowercase name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Producer => "producer",
            TaskKind::Consumer => "consumer",
            TaskKind::Monitor => "monitor",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable state of a registry slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// An incarnation is scheduled.
    Running {
        /// Generation of the running incarnation.
        generation: u64,
    },
    /// No incarnation is scheduled (never started, or exited).
    Terminated,
}

/// Occupied slot.
struct Slot {
    generation: u64,
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

/// Registry of running task incarnations.
pub struct Registry {
    slots: RwLock<HashMap<TaskKind, Slot>>,
    generations: AtomicU64,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            generations: AtomicU64::new(0),
        }
    }

    /// Returns the current state of `kind`'s slot.
    pub fn state(&self, kind: TaskKind) -> TaskState {
        match self.slots.read().get(&kind) {
            Some(slot) => TaskState::Running {
                generation: slot.generation,
            },
            None => TaskState::Terminated,
        }
    }

    /// Returns true if an incarnation of `kind` is scheduled.
    pub fn is_alive(&self, kind: TaskKind) -> bool {
        self.slots.read().contains_key(&kind)
    }

    /// Returns sorted list of tasks with a running incarnation.
    pub fn alive(&self) -> Vec<TaskKind> {
        let mut kinds: Vec<TaskKind> = self.slots.read().keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }

    /// Allocates a fresh generation (starting at 1).
    pub(crate) fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Publishes a fully spawned incarnation.
    ///
    /// Returns the generation of a displaced incarnation, which is cancelled.
    pub(crate) fn publish(
        &self,
        kind: TaskKind,
        generation: u64,
        cancel: CancellationToken,
        join: JoinHandle<()>,
    ) -> Option<u64> {
        let prev = self.slots.write().insert(
            kind,
            Slot {
                generation,
                cancel,
                join,
            },
        );
        prev.map(|slot| {
            slot.cancel.cancel();
            slot.generation
        })
    }

    /// Clears `kind`'s slot if it still belongs to `generation`.
    ///
    /// Returns true if the slot was cleared by this call.
    pub(crate) fn release(&self, kind: TaskKind, generation: u64) -> bool {
        let mut slots = self.slots.write();
        match slots.get(&kind) {
            Some(slot) if slot.generation == generation => {
                slots.remove(&kind);
                true
            }
            _ => false,
        }
    }

    /// Cancels every running incarnation and hands back their join handles.
    pub(crate) fn cancel_all(&self) -> Vec<JoinHandle<()>> {
        let drained: Vec<Slot> = {
            let mut slots = self.slots.write();
            slots.drain().map(|(_, slot)| slot).collect()
        };
        drained
            .into_iter()
            .map(|slot| {
                slot.cancel.cancel();
                slot.join
            })
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
