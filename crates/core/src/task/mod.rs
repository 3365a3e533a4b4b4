//! Control tasks and their composition
//!
//! A [`ControlTask`] is the atomic schedulable behavior. It reads the
//! [`OperationStateMap`] and writes interrupt overrides through an
//! [`OperationWriter`]; it never touches actuators directly.
//!
//! # Lifecycle
//!
//! ```text
//! NotStarted --begin--> Running --stop--> Stopped
//!                          |
//!                          +--has_completed, end--> Ended
//! ```
//!
//! Exactly one of `stop()` / `end()` follows every `begin()`. Composites and
//! the scheduler hold tasks in a [`TaskSlot`] which enforces this.
//!
//! # Composition
//!
//! - [`SequentialTask`]: one child at a time, in order, begun lazily
//! - [`ConcurrentTask`]: every child every tick, completing on
//!   [`CompletionMode::Any`] or [`CompletionMode::All`]
//! - [`WaitTask`] / [`WaitForeverTask`]: timed pass-through and the
//!   never-completing filler

use alloc::boxed::Box;

use crate::error::TaskResult;
use crate::operation::{OperationStateMap, OperationWriter};

mod concurrent;
#[cfg(test)]
pub(crate) mod probe;
mod sequential;
mod slot;
mod timed;

pub use concurrent::{CompletionMode, ConcurrentTask};
pub use sequential::SequentialTask;
pub use slot::{TaskSlot, TaskState};
pub use timed::{TaskTimer, WaitForeverTask, WaitTask};

/// Boxed task borrowing collaborators for `'a`
pub type BoxedTask<'a> = Box<dyn ControlTask + 'a>;

/// Schedulable unit of behavior.
///
/// `update` runs once per tick while the task is running and must return
/// promptly. `has_completed` and `should_cancel` are predicates: they may
/// read the clock, sensors and the map but do not change task state.
pub trait ControlTask {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// One-time setup for this activation.
    fn begin(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult;

    /// Per-tick work.
    fn update(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult;

    /// Whether the scheduler may advance past this task.
    fn has_completed(&self, ops: &OperationStateMap) -> bool;

    /// Externally detected failure forcing early termination.
    fn should_cancel(&self, _ops: &OperationStateMap) -> bool {
        false
    }

    /// Cancelled termination. Leaves owned operations neutral.
    fn stop(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult;

    /// Normal termination after completion. Leaves owned operations neutral.
    fn end(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.stop(ops)
    }
}

impl<T: ControlTask + ?Sized> ControlTask for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn begin(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        (**self).begin(ops)
    }

    fn update(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        (**self).update(ops)
    }

    fn has_completed(&self, ops: &OperationStateMap) -> bool {
        (**self).has_completed(ops)
    }

    fn should_cancel(&self, ops: &OperationStateMap) -> bool {
        (**self).should_cancel(ops)
    }

    fn stop(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        (**self).stop(ops)
    }

    fn end(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        (**self).end(ops)
    }
}
