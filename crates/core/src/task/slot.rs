//! Lifecycle guard around a boxed task.

use super::{BoxedTask, ControlTask};
use crate::error::TaskResult;
use crate::operation::{OperationStateMap, OperationWriter};

/// Lifecycle state of a task activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskState {
    NotStarted,
    Running,
    /// Terminated through `stop()`
    Stopped,
    /// Terminated through `end()`
    Ended,
}

impl TaskState {
    /// True once `stop()` or `end()` has run
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Stopped | TaskState::Ended)
    }
}

/// A task together with its lifecycle state.
///
/// Calls that do not fit the current state are ignored with a warning,
/// so a task sees at most one `begin()` and at most one terminal call.
pub struct TaskSlot<'a> {
    task: BoxedTask<'a>,
    state: TaskState,
}

impl<'a> TaskSlot<'a> {
    pub fn new(task: BoxedTask<'a>) -> Self {
        Self {
            task,
            state: TaskState::NotStarted,
        }
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn name(&self) -> &'static str {
        self.task.name()
    }

    pub fn is_running(&self) -> bool {
        self.state == TaskState::Running
    }

    pub fn begin(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        if self.state != TaskState::NotStarted {
            crate::log_warn!("{}: begin ignored in state {:?}", self.task.name(), self.state);
            return Ok(());
        }
        // Running before the call so a failed begin still gets a terminal call
        self.state = TaskState::Running;
        self.task.begin(ops)
    }

    pub fn update(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        if self.state != TaskState::Running {
            crate::log_warn!("{}: update ignored in state {:?}", self.task.name(), self.state);
            return Ok(());
        }
        self.task.update(ops)
    }

    /// Completed while running, or already ended normally.
    pub fn has_completed(&self, ops: &OperationStateMap) -> bool {
        match self.state {
            TaskState::Running => self.task.has_completed(ops),
            TaskState::Ended => true,
            TaskState::NotStarted | TaskState::Stopped => false,
        }
    }

    pub fn should_cancel(&self, ops: &OperationStateMap) -> bool {
        self.state == TaskState::Running && self.task.should_cancel(ops)
    }

    pub fn stop(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        if self.state != TaskState::Running {
            return Ok(());
        }
        self.state = TaskState::Stopped;
        self.task.stop(ops)
    }

    pub fn end(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        if self.state != TaskState::Running {
            return Ok(());
        }
        self.state = TaskState::Ended;
        self.task.end(ops)
    }
}

impl core::fmt::Debug for TaskSlot<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TaskSlot")
            .field("task", &self.task.name())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::probe::{Event, ProbeLog, ProbeTask};
    use crate::operation::OperationStateMap;
    use alloc::boxed::Box;

    #[test]
    fn test_lifecycle_transitions() {
        let log = ProbeLog::new();
        let mut map = OperationStateMap::with_all();
        let mut slot = TaskSlot::new(Box::new(ProbeTask::new(&log, 0, 1)));
        assert_eq!(slot.state(), TaskState::NotStarted);
        assert!(!slot.has_completed(&map));

        slot.begin(&mut map.writer()).unwrap();
        assert_eq!(slot.state(), TaskState::Running);
        slot.update(&mut map.writer()).unwrap();
        assert!(slot.has_completed(&map));

        slot.end(&mut map.writer()).unwrap();
        assert_eq!(slot.state(), TaskState::Ended);
        assert!(slot.state().is_terminal());
        assert!(slot.has_completed(&map));
    }

    #[test]
    fn test_repeated_calls_are_ignored() {
        let log = ProbeLog::new();
        let mut map = OperationStateMap::with_all();
        let mut slot = TaskSlot::new(Box::new(ProbeTask::new(&log, 0, 1)));

        // Terminal calls before begin do nothing
        slot.stop(&mut map.writer()).unwrap();
        slot.end(&mut map.writer()).unwrap();
        assert_eq!(slot.state(), TaskState::NotStarted);

        slot.begin(&mut map.writer()).unwrap();
        slot.begin(&mut map.writer()).unwrap();
        slot.stop(&mut map.writer()).unwrap();
        slot.end(&mut map.writer()).unwrap();
        slot.update(&mut map.writer()).unwrap();

        assert_eq!(log.events(), alloc::vec![Event::Begin(0), Event::Stop(0)]);
        assert_eq!(slot.state(), TaskState::Stopped);
        assert!(!slot.has_completed(&map));
    }
}
