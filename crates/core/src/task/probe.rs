//! Lifecycle-recording task for unit tests.

use alloc::vec::Vec;
use core::cell::RefCell;

use super::ControlTask;
use crate::error::TaskResult;
use crate::operation::{Operation, OperationStateMap, OperationWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    Begin(usize),
    Update(usize),
    Stop(usize),
    End(usize),
}

#[derive(Debug, Default)]
pub(crate) struct ProbeLog {
    events: RefCell<Vec<Event>>,
}

impl ProbeLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Events of one probe, in order
    pub(crate) fn events_of(&self, id: usize) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| match *e {
                Event::Begin(i) | Event::Update(i) | Event::Stop(i) | Event::End(i) => i == id,
            })
            .collect()
    }

    pub(crate) fn position(&self, event: Event) -> Option<usize> {
        self.events.borrow().iter().position(|e| *e == event)
    }

    pub(crate) fn count(&self, matches: impl Fn(&Event) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| matches(e)).count()
    }

    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}

/// Completes after a fixed number of updates.
pub(crate) struct ProbeTask<'a> {
    log: &'a ProbeLog,
    id: usize,
    complete_after: usize,
    cancel_after: Option<usize>,
    writes: Option<Operation>,
    updates: usize,
}

impl<'a> ProbeTask<'a> {
    pub(crate) fn new(log: &'a ProbeLog, id: usize, complete_after: usize) -> Self {
        Self {
            log,
            id,
            complete_after,
            cancel_after: None,
            writes: None,
            updates: 0,
        }
    }

    /// Request cancellation once `updates` updates have run
    pub(crate) fn cancel_after(mut self, updates: usize) -> Self {
        self.cancel_after = Some(updates);
        self
    }

    /// Write `id` to an analog operation on every update
    pub(crate) fn writing(mut self, operation: Operation) -> Self {
        self.writes = Some(operation);
        self
    }
}

impl ControlTask for ProbeTask<'_> {
    fn name(&self) -> &'static str {
        "Probe"
    }

    fn begin(&mut self, _ops: &mut OperationWriter<'_>) -> TaskResult {
        self.updates = 0;
        self.log.record(Event::Begin(self.id));
        Ok(())
    }

    fn update(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.updates += 1;
        self.log.record(Event::Update(self.id));
        if let Some(operation) = self.writes {
            ops.set_analog(operation, self.id as f64)?;
        }
        Ok(())
    }

    fn has_completed(&self, _ops: &OperationStateMap) -> bool {
        self.updates >= self.complete_after
    }

    fn should_cancel(&self, _ops: &OperationStateMap) -> bool {
        self.cancel_after.is_some_and(|n| self.updates >= n)
    }

    fn stop(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.log.record(Event::Stop(self.id));
        if let Some(operation) = self.writes {
            ops.clear(operation)?;
        }
        Ok(())
    }

    fn end(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.log.record(Event::End(self.id));
        if let Some(operation) = self.writes {
            ops.clear(operation)?;
        }
        Ok(())
    }
}
