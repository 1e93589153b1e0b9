//! # Run one task incarnation.
//!
//! Wraps a [`Task`]'s loop with the bookkeeping every incarnation needs:
//! wait for the launch gate, register with the watchdog, publish lifecycle
//! events, and release the registry slot whichever way the loop ends.
//!
//! ## Event flow
//! ```text
//! gate opened → register watchdog → TaskStarting
//!             → task.run()
//!                 ├─ Terminated → release → TaskStopped{reason=terminated}
//!                 ├─ Canceled   → release → TaskStopped{reason=canceled}
//!                 └─ (panic)    → release → TaskStopped{reason=aborted}   (drop guard)
//! ```
//!
//! ## Rules
//! - The loop never starts before the slot is published (gate)
//! - The slot is always released before `TaskStopped` is published
//! - A gate dropped unopened means the launch was abandoned: nothing runs

use tokio::sync::oneshot;

use crate::core::TaskContext;
use crate::events::{Event, EventKind};
use crate::tasks::{TaskExit, TaskRef};

/// Releases the slot on every exit path, including unwinding.
struct SlotGuard<'a> {
    cx: &'a TaskContext,
    exit: Option<TaskExit>,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.cx.release();
        let reason = self.exit.map_or("aborted", |exit| exit.as_label());
        self.cx.shared().bus().publish(
            Event::new(EventKind::TaskStopped)
                .with_task(self.cx.kind())
                .with_generation(self.cx.generation())
                .with_reason(reason),
        );
    }
}

/// Executes one incarnation of `task` to completion.
pub(crate) async fn run_task(task: TaskRef, cx: TaskContext, gate: oneshot::Receiver<()>) {
    if gate.await.is_err() {
        return;
    }

    let mut guard = SlotGuard {
        cx: &cx,
        exit: None,
    };
    cx.shared().watchdog().register(cx.kind(), cx.generation());
    cx.shared().bus().publish(
        Event::new(EventKind::TaskStarting)
            .with_task(cx.kind())
            .with_generation(cx.generation()),
    );

    guard.exit = Some(task.run(&cx).await);
}
