//! Intake tasks.

use crate::error::TaskResult;
use crate::operation::{Operation, OperationStateMap, OperationWriter};
use crate::task::{ControlTask, TaskTimer};
use crate::traits::TimeSource;

/// Spins the intake in or out for a duration.
#[derive(Debug)]
pub struct IntakeSpinTask<'a, T: TimeSource + ?Sized> {
    timer: TaskTimer<'a, T>,
    spin_in: bool,
}

impl<'a, T: TimeSource + ?Sized> IntakeSpinTask<'a, T> {
    pub fn new(clock: &'a T, spin_in: bool, duration: f64) -> Self {
        Self {
            timer: TaskTimer::new(clock, duration),
            spin_in,
        }
    }

    fn apply(ops: &mut OperationWriter<'_>, intake_in: bool, intake_out: bool) -> TaskResult {
        ops.set_digital(Operation::IntakeIn, intake_in)?;
        ops.set_digital(Operation::IntakeOut, intake_out)
    }
}

impl<T: TimeSource + ?Sized> ControlTask for IntakeSpinTask<'_, T> {
    fn name(&self) -> &'static str {
        "IntakeSpin"
    }

    fn begin(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.timer.start();
        Self::apply(ops, self.spin_in, !self.spin_in)
    }

    fn update(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        Self::apply(ops, self.spin_in, !self.spin_in)
    }

    fn has_completed(&self, _ops: &OperationStateMap) -> bool {
        self.timer.is_elapsed()
    }

    fn stop(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        Self::apply(ops, false, false)
    }
}

/// Extends or retracts the intake arm.
///
/// The arm is a latching solenoid: after a normal end the commanded
/// position is kept until the routine terminates. A cancelled task releases
/// the arm back to its supplied value.
#[derive(Debug)]
pub struct IntakeExtendTask<'a, T: TimeSource + ?Sized> {
    timer: TaskTimer<'a, T>,
    extend: bool,
}

impl<'a, T: TimeSource + ?Sized> IntakeExtendTask<'a, T> {
    pub fn new(clock: &'a T, extend: bool, duration: f64) -> Self {
        Self {
            timer: TaskTimer::new(clock, duration),
            extend,
        }
    }
}

impl<T: TimeSource + ?Sized> ControlTask for IntakeExtendTask<'_, T> {
    fn name(&self) -> &'static str {
        "IntakeExtend"
    }

    fn begin(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.timer.start();
        ops.set_digital(Operation::IntakeExtendArm, self.extend)
    }

    fn update(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        ops.set_digital(Operation::IntakeExtendArm, self.extend)
    }

    fn has_completed(&self, _ops: &OperationStateMap) -> bool {
        self.timer.is_elapsed()
    }

    fn stop(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        ops.clear(Operation::IntakeExtendArm)
    }

    fn end(&mut self, _ops: &mut OperationWriter<'_>) -> TaskResult {
        Ok(())
    }
}
