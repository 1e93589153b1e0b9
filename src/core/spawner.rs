//! # Task creation seam.
//!
//! [`Spawn`] is the narrow interface through which the pipeline creates tasks.
//! Creation may fail; the caller decides what a failure means (fatal at boot,
//! retried next cycle by the monitor).
//!
//! [`TokioSpawner`] is the default implementation. It can carry a task budget
//! that bounds how many tasks are alive at once, like a fixed pool of task
//! control blocks on an embedded scheduler.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::core::TaskKind;
use crate::error::SpawnError;

/// Boxed future of one task incarnation.
pub type TaskFuture = BoxFuture<'static, ()>;

/// Creates scheduled tasks.
pub trait Spawn: Send + Sync + 'static {
    /// Schedules `fut` as a new task for `task`.
    ///
    /// On success the future is already owned by the scheduler.
    fn spawn(&self, task: TaskKind, fut: TaskFuture) -> Result<JoinHandle<()>, SpawnError>;
}

/// Spawns onto the current tokio runtime, optionally bounded by a task budget.
pub struct TokioSpawner {
    budget: Option<(usize, Arc<Semaphore>)>,
}

impl TokioSpawner {
    /// Creates a spawner; `limit = None` means unlimited.
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            budget: limit.map(|n| (n, Arc::new(Semaphore::new(n)))),
        }
    }
}

impl Spawn for TokioSpawner {
    fn spawn(&self, task: TaskKind, fut: TaskFuture) -> Result<JoinHandle<()>, SpawnError> {
        let rt = Handle::try_current().map_err(|_| SpawnError::NoRuntime { task })?;

        let permit = match &self.budget {
            Some((limit, sem)) => Some(
                Arc::clone(sem)
                    .try_acquire_owned()
                    .map_err(|_| SpawnError::Exhausted {
                        task,
                        limit: *limit,
                    })?,
            ),
            None => None,
        };

        Ok(rt.spawn(async move {
            let _permit = permit;
            fut.await;
        }))
    }
}
