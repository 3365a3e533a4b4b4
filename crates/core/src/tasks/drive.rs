//! Drivetrain tasks: timed open-loop driving and positional routes.

use alloc::boxed::Box;
use core::f64::consts::PI;

use crate::error::TaskResult;
use crate::operation::{Operation, OperationStateMap, OperationWriter};
use crate::task::{ControlTask, TaskTimer};
use crate::traits::TimeSource;

/// Fraction of a ramped route spent ramping before holding the target
pub const RAMP_FRACTION: f64 = 0.9;

/// Drives at fixed turn/forward values for a duration (simple mode).
#[derive(Debug)]
pub struct DriveTimedTask<'a, T: TimeSource + ?Sized> {
    timer: TaskTimer<'a, T>,
    turn: f64,
    forward: f64,
}

impl<'a, T: TimeSource + ?Sized> DriveTimedTask<'a, T> {
    pub fn new(clock: &'a T, duration: f64, turn: f64, forward: f64) -> Self {
        Self {
            timer: TaskTimer::new(clock, duration),
            turn,
            forward,
        }
    }

    fn apply(&self, ops: &mut OperationWriter<'_>, turn: f64, forward: f64) -> TaskResult {
        ops.set_digital(Operation::DriveTrainUsePositionalMode, false)?;
        ops.set_analog(Operation::DriveTrainTurn, turn)?;
        ops.set_analog(Operation::DriveTrainMoveForward, forward)
    }
}

impl<T: TimeSource + ?Sized> ControlTask for DriveTimedTask<'_, T> {
    fn name(&self) -> &'static str {
        "DriveTimed"
    }

    fn begin(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.timer.start();
        self.apply(ops, self.turn, self.forward)
    }

    fn update(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.apply(ops, self.turn, self.forward)
    }

    fn has_completed(&self, _ops: &OperationStateMap) -> bool {
        self.timer.is_elapsed()
    }

    fn stop(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.apply(ops, 0.0, 0.0)
    }
}

/// Position offset as a function of elapsed-time ratio in `[0, 1]`
pub type RouteFn<'a> = Box<dyn Fn(f64) -> f64 + 'a>;

/// Linear ramp to `target` over [`RAMP_FRACTION`] of the duration, then hold.
pub fn ramp_profile(target: f64) -> impl Fn(f64) -> f64 {
    move |ratio| {
        if ratio < RAMP_FRACTION {
            ratio / RAMP_FRACTION * target
        } else {
            target
        }
    }
}

/// Follows left/right position profiles in positional mode.
///
/// Targets are offsets from the supplied wheel positions captured at
/// `begin`. Completes when the duration has elapsed.
pub struct DriveRouteTask<'a, T: TimeSource + ?Sized> {
    timer: TaskTimer<'a, T>,
    left: RouteFn<'a>,
    right: RouteFn<'a>,
    start_left: f64,
    start_right: f64,
}

/// Turn-by-angle is a route with opposite wheel arcs
pub type TurnTask<'a, T> = DriveRouteTask<'a, T>;

impl<'a, T: TimeSource + ?Sized> DriveRouteTask<'a, T> {
    pub fn new(
        clock: &'a T,
        left: impl Fn(f64) -> f64 + 'a,
        right: impl Fn(f64) -> f64 + 'a,
        duration: f64,
    ) -> Self {
        Self {
            timer: TaskTimer::new(clock, duration),
            left: Box::new(left),
            right: Box::new(right),
            start_left: 0.0,
            start_right: 0.0,
        }
    }

    /// Ramped straight or curved move by the given wheel distances.
    pub fn ramp(clock: &'a T, left_distance: f64, right_distance: f64, duration: f64) -> Self {
        Self::new(
            clock,
            ramp_profile(left_distance),
            ramp_profile(right_distance),
            duration,
        )
    }

    /// In-place turn; positive degrees turn clockwise.
    ///
    /// Each wheel travels an arc of `pi * wheel_base * degrees / 360`.
    pub fn by_angle(clock: &'a T, degrees: f64, wheel_base: f64, duration: f64) -> Self {
        let arc = PI * wheel_base * degrees / 360.0;
        Self::ramp(clock, arc, -arc, duration)
    }

    fn write_targets(&self, ops: &mut OperationWriter<'_>) -> TaskResult {
        let ratio = self.timer.ratio();
        ops.set_digital(Operation::DriveTrainUsePositionalMode, true)?;
        ops.set_analog(
            Operation::DriveTrainLeftPosition,
            self.start_left + (self.left)(ratio),
        )?;
        ops.set_analog(
            Operation::DriveTrainRightPosition,
            self.start_right + (self.right)(ratio),
        )
    }
}

impl<T: TimeSource + ?Sized> ControlTask for DriveRouteTask<'_, T> {
    fn name(&self) -> &'static str {
        "DriveRoute"
    }

    fn begin(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.start_left = ops.supplied_analog(Operation::DriveTrainLeftPosition)?;
        self.start_right = ops.supplied_analog(Operation::DriveTrainRightPosition)?;
        self.timer.start();
        self.write_targets(ops)
    }

    fn update(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.write_targets(ops)
    }

    fn has_completed(&self, _ops: &OperationStateMap) -> bool {
        self.timer.is_elapsed()
    }

    fn stop(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        ops.set_digital(Operation::DriveTrainUsePositionalMode, false)?;
        ops.set_analog(Operation::DriveTrainLeftPosition, 0.0)?;
        ops.set_analog(Operation::DriveTrainRightPosition, 0.0)
    }
}
