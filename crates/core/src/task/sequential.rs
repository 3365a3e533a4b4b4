//! Sequential composite: children run one at a time, in order.

use alloc::boxed::Box;
use alloc::vec::Vec;

use super::{BoxedTask, ControlTask, TaskSlot};
use crate::error::TaskResult;
use crate::operation::{OperationStateMap, OperationWriter};

/// Runs children in order.
///
/// Only the child under the cursor is ever begun; later children stay
/// untouched until reached. When the active child reports completion (and
/// is not cancelling) it is ended and the next child is begun and updated in
/// the same tick. The sequence completes once the cursor has moved past the
/// last child.
pub struct SequentialTask<'a> {
    children: Vec<TaskSlot<'a>>,
    cursor: usize,
}

impl<'a> SequentialTask<'a> {
    pub fn new(children: Vec<BoxedTask<'a>>) -> Self {
        Self {
            children: children.into_iter().map(TaskSlot::new).collect(),
            cursor: 0,
        }
    }

    /// Empty sequence, completes immediately
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Append a child.
    pub fn then(mut self, task: impl ControlTask + 'a) -> Self {
        self.children.push(TaskSlot::new(Box::new(task)));
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Index of the active child (equals `len()` once finished)
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn active(&self) -> Option<&TaskSlot<'a>> {
        self.children.get(self.cursor)
    }
}

impl ControlTask for SequentialTask<'_> {
    fn name(&self) -> &'static str {
        "Sequence"
    }

    fn begin(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.cursor = 0;
        match self.children.first_mut() {
            Some(first) => first.begin(ops),
            None => Ok(()),
        }
    }

    fn update(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        let advance = match self.active() {
            Some(current) => !current.should_cancel(ops.map()) && current.has_completed(ops.map()),
            None => return Ok(()),
        };

        if advance {
            if let Some(current) = self.children.get_mut(self.cursor) {
                current.end(ops)?;
            }
            self.cursor += 1;
            match self.children.get_mut(self.cursor) {
                Some(next) => {
                    crate::log_debug!("sequence: advancing to {} ({})", self.cursor, next.name());
                    next.begin(ops)?;
                }
                None => return Ok(()),
            }
        }

        match self.children.get_mut(self.cursor) {
            Some(current) => current.update(ops),
            None => Ok(()),
        }
    }

    fn has_completed(&self, _ops: &OperationStateMap) -> bool {
        self.cursor >= self.children.len()
    }

    fn should_cancel(&self, ops: &OperationStateMap) -> bool {
        self.active().is_some_and(|current| current.should_cancel(ops))
    }

    fn stop(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        match self.children.get_mut(self.cursor) {
            Some(current) => current.stop(ops),
            None => Ok(()),
        }
    }

    fn end(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        // Reached early when an enclosing AnyTasks finishes first
        match self.children.get_mut(self.cursor) {
            Some(current) => current.end(ops),
            None => Ok(()),
        }
    }
}
