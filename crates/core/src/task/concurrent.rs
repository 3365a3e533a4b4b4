//! Concurrent composite with Any/All completion.

use alloc::boxed::Box;
use alloc::vec::Vec;

use super::{BoxedTask, ControlTask, TaskSlot};
use crate::error::{CompositionError, TaskResult};
use crate::operation::{OperationStateMap, OperationWriter};

/// When a concurrent composite reports completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompletionMode {
    /// First child to complete finishes the composite
    Any,
    /// Every child must complete
    All,
}

/// Runs every child every tick.
///
/// Children are visited in list order for every lifecycle call. If two
/// children write the same operation in one tick, the later child in the
/// list wins.
///
/// Children keep receiving `update` after completing individually, and
/// when the composite terminates every still-running child receives the
/// same terminal call.
///
/// With no children, [`CompletionMode::All`] completes immediately and
/// [`CompletionMode::Any`] never completes; use [`ConcurrentTask::try_any`]
/// to reject the latter at construction.
pub struct ConcurrentTask<'a> {
    mode: CompletionMode,
    children: Vec<TaskSlot<'a>>,
}

impl<'a> ConcurrentTask<'a> {
    pub fn new(mode: CompletionMode, children: Vec<BoxedTask<'a>>) -> Self {
        Self {
            mode,
            children: children.into_iter().map(TaskSlot::new).collect(),
        }
    }

    /// AnyTasks composite
    pub fn any(children: Vec<BoxedTask<'a>>) -> Self {
        Self::new(CompletionMode::Any, children)
    }

    /// AllTasks composite
    pub fn all(children: Vec<BoxedTask<'a>>) -> Self {
        Self::new(CompletionMode::All, children)
    }

    /// AnyTasks composite, rejecting an empty child list.
    pub fn try_any(children: Vec<BoxedTask<'a>>) -> Result<Self, CompositionError> {
        if children.is_empty() {
            return Err(CompositionError::EmptyAnyTasks);
        }
        Ok(Self::any(children))
    }

    /// Append a child.
    pub fn with(mut self, task: impl ControlTask + 'a) -> Self {
        self.children.push(TaskSlot::new(Box::new(task)));
        self
    }

    pub fn mode(&self) -> CompletionMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    // Visits every child even after a failure; reports the first error.
    fn terminate_all(
        &mut self,
        ops: &mut OperationWriter<'_>,
        call: fn(&mut TaskSlot<'a>, &mut OperationWriter<'_>) -> TaskResult,
    ) -> TaskResult {
        let mut result = Ok(());
        for child in self.children.iter_mut() {
            let outcome = call(child, ops);
            if result.is_ok() {
                result = outcome;
            }
        }
        result
    }
}

impl ControlTask for ConcurrentTask<'_> {
    fn name(&self) -> &'static str {
        match self.mode {
            CompletionMode::Any => "AnyTasks",
            CompletionMode::All => "AllTasks",
        }
    }

    fn begin(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        for child in self.children.iter_mut() {
            child.begin(ops)?;
        }
        Ok(())
    }

    fn update(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        for child in self.children.iter_mut() {
            child.update(ops)?;
        }
        Ok(())
    }

    fn has_completed(&self, ops: &OperationStateMap) -> bool {
        match self.mode {
            CompletionMode::Any => self.children.iter().any(|c| c.has_completed(ops)),
            CompletionMode::All => self.children.iter().all(|c| c.has_completed(ops)),
        }
    }

    fn should_cancel(&self, ops: &OperationStateMap) -> bool {
        self.children.iter().any(|c| c.should_cancel(ops))
    }

    fn stop(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.terminate_all(ops, TaskSlot::stop)
    }

    fn end(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.terminate_all(ops, TaskSlot::end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Operation;
    use crate::task::probe::{Event, ProbeLog, ProbeTask};
    use alloc::vec;

    fn probes<'a>(log: &'a ProbeLog, completions: &[usize]) -> Vec<BoxedTask<'a>> {
        completions
            .iter()
            .enumerate()
            .map(|(id, &n)| Box::new(ProbeTask::new(log, id, n)) as BoxedTask<'a>)
            .collect()
    }

    /// Tick until complete, then end. Returns the completing tick.
    fn completion_tick(task: &mut ConcurrentTask<'_>, map: &mut OperationStateMap) -> usize {
        task.begin(&mut map.writer()).unwrap();
        for tick in 1..=100 {
            task.update(&mut map.writer()).unwrap();
            if task.has_completed(map) {
                task.end(&mut map.writer()).unwrap();
                return tick;
            }
        }
        panic!("composite never completed");
    }

    // ========== Completion Semantics ==========

    #[test]
    fn test_all_tasks_completes_at_slowest_child() {
        let log = ProbeLog::new();
        let mut map = OperationStateMap::with_all();
        let mut all = ConcurrentTask::all(probes(&log, &[3, 5, 2]));

        assert_eq!(completion_tick(&mut all, &mut map), 5);
        for id in 0..3 {
            assert_eq!(
                log.count(|e| *e == Event::Update(id)),
                5,
                "child {} should update through tick 5",
                id
            );
        }
    }

    #[test]
    fn test_any_tasks_completes_at_fastest_child() {
        let log = ProbeLog::new();
        let mut map = OperationStateMap::with_all();
        let mut any = ConcurrentTask::any(probes(&log, &[3, 5, 2]));

        assert_eq!(completion_tick(&mut any, &mut map), 2);
        for id in 0..3 {
            assert_eq!(log.count(|e| *e == Event::Begin(id)), 1);
            assert_eq!(log.count(|e| *e == Event::End(id)), 1, "child {} not ended", id);
        }
    }

    #[test]
    fn test_stop_visits_every_child_once() {
        let log = ProbeLog::new();
        let mut map = OperationStateMap::with_all();
        let mut any = ConcurrentTask::any(probes(&log, &[3, 5, 2]));

        any.begin(&mut map.writer()).unwrap();
        any.update(&mut map.writer()).unwrap();
        any.stop(&mut map.writer()).unwrap();
        any.stop(&mut map.writer()).unwrap();

        for id in 0..3 {
            assert_eq!(log.count(|e| *e == Event::Stop(id)), 1);
        }
    }

    #[test]
    fn test_cancel_if_any_child_cancels() {
        let log = ProbeLog::new();
        let mut map = OperationStateMap::with_all();
        let mut all = ConcurrentTask::all(vec![])
            .with(ProbeTask::new(&log, 0, 10))
            .with(ProbeTask::new(&log, 1, 10).cancel_after(2));

        all.begin(&mut map.writer()).unwrap();
        all.update(&mut map.writer()).unwrap();
        assert!(!all.should_cancel(&map));
        all.update(&mut map.writer()).unwrap();
        assert!(all.should_cancel(&map));
    }

    // ========== Edge Cases ==========

    #[test]
    fn test_empty_all_is_vacuously_complete() {
        let map = OperationStateMap::with_all();
        let all = ConcurrentTask::all(Vec::new());
        assert!(all.has_completed(&map));
    }

    #[test]
    fn test_empty_any_never_completes() {
        let mut map = OperationStateMap::with_all();
        let mut any = ConcurrentTask::any(Vec::new());
        any.begin(&mut map.writer()).unwrap();
        for _ in 0..10 {
            any.update(&mut map.writer()).unwrap();
            assert!(!any.has_completed(&map));
        }
    }

    #[test]
    fn test_try_any_rejects_empty() {
        assert_eq!(
            ConcurrentTask::try_any(Vec::new()).err(),
            Some(CompositionError::EmptyAnyTasks)
        );
        let log = ProbeLog::new();
        assert!(ConcurrentTask::try_any(probes(&log, &[1])).is_ok());
    }

    #[test]
    fn test_last_writer_in_list_order_wins() {
        let log = ProbeLog::new();
        let mut map = OperationStateMap::with_all();
        let mut all = ConcurrentTask::all(vec![])
            .with(ProbeTask::new(&log, 1, 5).writing(Operation::ShooterSpeed))
            .with(ProbeTask::new(&log, 2, 5).writing(Operation::ShooterSpeed));

        all.begin(&mut map.writer()).unwrap();
        all.update(&mut map.writer()).unwrap();
        assert_eq!(map.get_analog(Operation::ShooterSpeed), Ok(2.0));
    }
}
