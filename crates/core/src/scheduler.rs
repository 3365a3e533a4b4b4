//! Task Scheduler
//!
//! Drives at most one routine (a task tree) once per control-loop tick.
//!
//! ## Tick order
//!
//! 1. Refresh supplied operation values from the input collaborator
//! 2. `update()` the active routine
//! 3. `should_cancel()` → `stop()`
//! 4. `has_completed()` → `end()`
//!
//! When a routine terminates, every interrupt is released so actuators fall
//! back to the supplied values. With no routine active, interrupts are
//! cleared on every refresh.
//!
//! ## Errors
//!
//! A contract violation raised by the routine (wrong operation kind,
//! undeclared operation) stops the routine, releases all interrupts and is
//! returned from [`TaskScheduler::tick`].

use crate::error::{OperationError, TaskResult};
use crate::operation::{OperationInput, OperationStateMap};
use crate::task::{BoxedTask, TaskSlot, TaskState};

/// Result of one scheduler tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// No routine active
    Idle,
    /// Routine still running
    Running,
    /// Routine completed this tick and was ended
    Completed,
    /// Routine requested cancellation this tick and was stopped
    Cancelled,
}

/// Scheduler
///
/// Owns the operation-state map and the active routine.
pub struct TaskScheduler<'a> {
    map: OperationStateMap,
    routine: Option<TaskSlot<'a>>,
    ticks: u64,
}

impl<'a> TaskScheduler<'a> {
    pub fn new(map: OperationStateMap) -> Self {
        Self {
            map,
            routine: None,
            ticks: 0,
        }
    }

    /// Scheduler over a map declaring every operation
    pub fn with_all_operations() -> Self {
        Self::new(OperationStateMap::with_all())
    }

    /// Read-only view of the operation-state map (for actuator wiring)
    pub fn map(&self) -> &OperationStateMap {
        &self.map
    }

    pub fn is_active(&self) -> bool {
        self.routine.is_some()
    }

    /// Name of the active routine's root task
    pub fn active_name(&self) -> Option<&'static str> {
        self.routine.as_ref().map(TaskSlot::name)
    }

    /// Number of ticks run since construction
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Start a routine
    ///
    /// Any active routine is cancelled first. If the new routine fails to
    /// begin it is stopped and the error returned.
    pub fn start(&mut self, routine: BoxedTask<'a>) -> TaskResult {
        self.cancel()?;

        let mut slot = TaskSlot::new(routine);
        crate::log_info!("Routine start: {}", slot.name());
        let result = slot.begin(&mut self.map.writer());
        self.routine = Some(slot);
        result.map_err(|e| self.abort(e))
    }

    /// External cancellation (e.g. autonomous period ended)
    ///
    /// Stops the active subtree and releases all interrupts.
    pub fn cancel(&mut self) -> TaskResult {
        let Some(mut slot) = self.routine.take() else {
            return Ok(());
        };
        crate::log_info!("Routine cancelled: {}", slot.name());
        let result = slot.stop(&mut self.map.writer());
        self.map.clear_all_interrupts();
        result
    }

    /// Run one tick
    pub fn tick<I: OperationInput + ?Sized>(
        &mut self,
        input: &I,
    ) -> Result<TickOutcome, OperationError> {
        self.ticks = self.ticks.wrapping_add(1);
        self.map.refresh(input);

        let Some(slot) = self.routine.as_mut() else {
            self.map.clear_all_interrupts();
            return Ok(TickOutcome::Idle);
        };

        crate::log_trace!("tick {}: {}", self.ticks, slot.name());
        if let Err(e) = slot.update(&mut self.map.writer()) {
            return Err(self.abort(e));
        }

        let outcome = if slot.should_cancel(&self.map) {
            crate::log_warn!("Routine {} requested cancel", slot.name());
            slot.stop(&mut self.map.writer())
                .map(|()| TickOutcome::Cancelled)
        } else if slot.has_completed(&self.map) {
            crate::log_info!("Routine complete: {}", slot.name());
            slot.end(&mut self.map.writer())
                .map(|()| TickOutcome::Completed)
        } else {
            return Ok(TickOutcome::Running);
        };

        self.routine = None;
        self.map.clear_all_interrupts();
        outcome
    }

    /// Stop the active routine after a contract violation.
    fn abort(&mut self, error: OperationError) -> OperationError {
        crate::log_error!("Routine aborted: {}", error);
        if let Some(mut slot) = self.routine.take() {
            if slot.state() == TaskState::Running {
                if let Err(_e) = slot.stop(&mut self.map.writer()) {
                    crate::log_error!("Stop after abort failed: {}", _e);
                }
            }
        }
        self.map.clear_all_interrupts();
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{ManualInput, Operation, OperationValue};
    use crate::task::probe::{Event, ProbeLog, ProbeTask};
    use crate::task::{ControlTask, SequentialTask, WaitTask};
    use crate::traits::MockTime;
    use alloc::boxed::Box;

    /// Writes to an operation the map does not declare
    struct Misbehaving;

    impl ControlTask for Misbehaving {
        fn name(&self) -> &'static str {
            "Misbehaving"
        }

        fn begin(&mut self, _ops: &mut crate::operation::OperationWriter<'_>) -> TaskResult {
            Ok(())
        }

        fn update(&mut self, ops: &mut crate::operation::OperationWriter<'_>) -> TaskResult {
            ops.set_digital(Operation::ShooterSpeed, true)
        }

        fn has_completed(&self, _ops: &OperationStateMap) -> bool {
            false
        }

        fn stop(&mut self, _ops: &mut crate::operation::OperationWriter<'_>) -> TaskResult {
            Ok(())
        }
    }

    // ========== Idle ==========

    #[test]
    fn test_idle_tick_refreshes_and_clears() {
        let mut scheduler = TaskScheduler::with_all_operations();
        let mut input = ManualInput::new();
        input.set_analog(Operation::DriveTrainMoveForward, 0.5);

        assert_eq!(scheduler.tick(&input), Ok(TickOutcome::Idle));
        assert_eq!(
            scheduler.map().get_analog(Operation::DriveTrainMoveForward),
            Ok(0.5)
        );
        assert_eq!(scheduler.ticks(), 1);
    }

    // ========== Completion ==========

    #[test]
    fn test_routine_runs_to_completion_and_releases_interrupts() {
        let log = ProbeLog::new();
        let input = ManualInput::new();
        let mut scheduler = TaskScheduler::with_all_operations();
        scheduler
            .start(Box::new(
                ProbeTask::new(&log, 0, 3).writing(Operation::ShooterSpeed),
            ))
            .unwrap();
        assert!(scheduler.is_active());

        assert_eq!(scheduler.tick(&input), Ok(TickOutcome::Running));
        assert_eq!(
            scheduler.map().get(Operation::ShooterSpeed),
            Ok(OperationValue::Analog(0.0))
        );
        assert!(scheduler.map().has_interrupts());
        assert_eq!(scheduler.tick(&input), Ok(TickOutcome::Running));
        assert_eq!(scheduler.tick(&input), Ok(TickOutcome::Completed));

        assert!(!scheduler.is_active());
        assert!(!scheduler.map().has_interrupts());
        assert_eq!(log.events_of(0).last(), Some(&Event::End(0)));
        assert_eq!(scheduler.tick(&input), Ok(TickOutcome::Idle));
    }

    #[test]
    fn test_interrupts_persist_across_refresh_while_active() {
        let clock = MockTime::new();
        let log = ProbeLog::new();
        let mut scheduler = TaskScheduler::with_all_operations();
        let routine = SequentialTask::empty()
            .then(ProbeTask::new(&log, 7, 1).writing(Operation::DriveTrainTurn))
            .then(WaitTask::new(&clock, 10.0));
        scheduler.start(Box::new(routine)).unwrap();

        let mut input = ManualInput::new();
        input.set_analog(Operation::DriveTrainTurn, -0.25);
        scheduler.tick(&input).unwrap();
        assert_eq!(scheduler.map().get_analog(Operation::DriveTrainTurn), Ok(7.0));
        // Probe ended and released its operation; supplied value shows through
        scheduler.tick(&input).unwrap();
        assert_eq!(
            scheduler.map().get_analog(Operation::DriveTrainTurn),
            Ok(-0.25)
        );
    }

    // ========== Cancellation ==========

    #[test]
    fn test_should_cancel_stops_routine() {
        let log = ProbeLog::new();
        let input = ManualInput::new();
        let mut scheduler = TaskScheduler::with_all_operations();
        scheduler
            .start(Box::new(ProbeTask::new(&log, 0, 10).cancel_after(2)))
            .unwrap();

        assert_eq!(scheduler.tick(&input), Ok(TickOutcome::Running));
        assert_eq!(scheduler.tick(&input), Ok(TickOutcome::Cancelled));
        assert_eq!(log.events_of(0).last(), Some(&Event::Stop(0)));
        assert!(!scheduler.is_active());
    }

    #[test]
    fn test_external_cancel() {
        let log = ProbeLog::new();
        let input = ManualInput::new();
        let mut scheduler = TaskScheduler::with_all_operations();
        scheduler
            .start(Box::new(ProbeTask::new(&log, 0, 10).writing(Operation::ShooterSpeed)))
            .unwrap();
        scheduler.tick(&input).unwrap();

        scheduler.cancel().unwrap();
        assert!(!scheduler.is_active());
        assert!(!scheduler.map().has_interrupts());
        assert_eq!(log.count(|e| *e == Event::Stop(0)), 1);

        // Second cancel is a no-op
        scheduler.cancel().unwrap();
        assert_eq!(log.count(|e| *e == Event::Stop(0)), 1);
    }

    #[test]
    fn test_start_replaces_active_routine() {
        let log = ProbeLog::new();
        let mut scheduler = TaskScheduler::with_all_operations();
        scheduler.start(Box::new(ProbeTask::new(&log, 0, 10))).unwrap();
        scheduler.start(Box::new(ProbeTask::new(&log, 1, 10))).unwrap();

        assert_eq!(
            log.events(),
            alloc::vec![Event::Begin(0), Event::Stop(0), Event::Begin(1)]
        );
        assert_eq!(scheduler.active_name(), Some("Probe"));
    }

    // ========== Contract Violations ==========

    #[test]
    fn test_contract_violation_aborts_routine() {
        let input = ManualInput::new();
        let mut scheduler = TaskScheduler::with_all_operations();
        scheduler.start(Box::new(Misbehaving)).unwrap();

        let result = scheduler.tick(&input);
        assert!(matches!(
            result,
            Err(OperationError::TypeMismatch {
                operation: Operation::ShooterSpeed,
                ..
            })
        ));
        assert!(!scheduler.is_active());
    }

    #[test]
    fn test_undeclared_operation_aborts_routine() {
        let log = ProbeLog::new();
        let input = ManualInput::new();
        let mut scheduler = TaskScheduler::new(OperationStateMap::new(&[Operation::IntakeIn]));
        scheduler
            .start(Box::new(ProbeTask::new(&log, 0, 5).writing(Operation::ShooterSpeed)))
            .unwrap();

        assert_eq!(
            scheduler.tick(&input),
            Err(OperationError::UnknownOperation(Operation::ShooterSpeed))
        );
        assert_eq!(log.count(|e| *e == Event::Stop(0)), 1);
    }
}
