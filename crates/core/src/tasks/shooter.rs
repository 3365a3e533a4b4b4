//! Shooter tasks: kicker, flywheel and feeder.
//!
//! The kicker and the flywheel keep their commanded state after a normal
//! `end()` so a fire sequence can lower the kicker, spin up, then raise
//! the kicker into the spinning wheel. Cancellation always returns them to
//! neutral.

use crate::error::TaskResult;
use crate::operation::{Operation, OperationStateMap, OperationWriter};
use crate::task::{ControlTask, TaskTimer};
use crate::traits::TimeSource;

/// Lowers or raises the kicker, then waits for it to settle.
#[derive(Debug)]
pub struct ShooterKickerTask<'a, T: TimeSource + ?Sized> {
    timer: TaskTimer<'a, T>,
    lower: bool,
}

impl<'a, T: TimeSource + ?Sized> ShooterKickerTask<'a, T> {
    pub fn new(clock: &'a T, lower: bool, duration: f64) -> Self {
        Self {
            timer: TaskTimer::new(clock, duration),
            lower,
        }
    }
}

impl<T: TimeSource + ?Sized> ControlTask for ShooterKickerTask<'_, T> {
    fn name(&self) -> &'static str {
        "ShooterKicker"
    }

    fn begin(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.timer.start();
        ops.set_digital(Operation::ShooterLowerKicker, self.lower)
    }

    fn update(&mut self, _ops: &mut OperationWriter<'_>) -> TaskResult {
        Ok(())
    }

    fn has_completed(&self, _ops: &OperationStateMap) -> bool {
        self.timer.is_elapsed()
    }

    fn stop(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        ops.set_digital(Operation::ShooterLowerKicker, false)
    }

    fn end(&mut self, _ops: &mut OperationWriter<'_>) -> TaskResult {
        Ok(())
    }
}

/// Spins the flywheel up to a speed with the hood set.
#[derive(Debug)]
pub struct ShooterSpinUpTask<'a, T: TimeSource + ?Sized> {
    timer: TaskTimer<'a, T>,
    extend_hood: bool,
    speed: f64,
}

impl<'a, T: TimeSource + ?Sized> ShooterSpinUpTask<'a, T> {
    pub fn new(clock: &'a T, extend_hood: bool, speed: f64, duration: f64) -> Self {
        Self {
            timer: TaskTimer::new(clock, duration),
            extend_hood,
            speed,
        }
    }

    fn apply(&self, ops: &mut OperationWriter<'_>) -> TaskResult {
        ops.set_digital(Operation::ShooterExtendHood, self.extend_hood)?;
        ops.set_analog(Operation::ShooterSpeed, self.speed)
    }
}

impl<T: TimeSource + ?Sized> ControlTask for ShooterSpinUpTask<'_, T> {
    fn name(&self) -> &'static str {
        "ShooterSpinUp"
    }

    fn begin(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.timer.start();
        self.apply(ops)
    }

    fn update(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.apply(ops)
    }

    fn has_completed(&self, _ops: &OperationStateMap) -> bool {
        self.timer.is_elapsed()
    }

    fn stop(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        ops.set_digital(Operation::ShooterExtendHood, false)?;
        ops.set_analog(Operation::ShooterSpeed, 0.0)
    }

    fn end(&mut self, _ops: &mut OperationWriter<'_>) -> TaskResult {
        Ok(())
    }
}

/// Cuts flywheel power and waits for it to wind down.
#[derive(Debug)]
pub struct ShooterSpinDownTask<'a, T: TimeSource + ?Sized> {
    timer: TaskTimer<'a, T>,
}

impl<'a, T: TimeSource + ?Sized> ShooterSpinDownTask<'a, T> {
    pub fn new(clock: &'a T, duration: f64) -> Self {
        Self {
            timer: TaskTimer::new(clock, duration),
        }
    }
}

impl<T: TimeSource + ?Sized> ControlTask for ShooterSpinDownTask<'_, T> {
    fn name(&self) -> &'static str {
        "ShooterSpinDown"
    }

    fn begin(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.timer.start();
        ops.set_analog(Operation::ShooterSpeed, 0.0)
    }

    fn update(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        ops.set_analog(Operation::ShooterSpeed, 0.0)
    }

    fn has_completed(&self, _ops: &OperationStateMap) -> bool {
        self.timer.is_elapsed()
    }

    fn stop(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        ops.set_digital(Operation::ShooterExtendHood, false)?;
        ops.set_analog(Operation::ShooterSpeed, 0.0)
    }
}

/// Runs the feeder for a duration.
#[derive(Debug)]
pub struct ShooterFeedTask<'a, T: TimeSource + ?Sized> {
    timer: TaskTimer<'a, T>,
}

impl<'a, T: TimeSource + ?Sized> ShooterFeedTask<'a, T> {
    pub fn new(clock: &'a T, duration: f64) -> Self {
        Self {
            timer: TaskTimer::new(clock, duration),
        }
    }
}

impl<T: TimeSource + ?Sized> ControlTask for ShooterFeedTask<'_, T> {
    fn name(&self) -> &'static str {
        "ShooterFeed"
    }

    fn begin(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.timer.start();
        ops.set_digital(Operation::ShooterFeed, true)
    }

    fn update(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        ops.set_digital(Operation::ShooterFeed, true)
    }

    fn has_completed(&self, _ops: &OperationStateMap) -> bool {
        self.timer.is_elapsed()
    }

    fn stop(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        ops.set_digital(Operation::ShooterFeed, false)
    }
}
