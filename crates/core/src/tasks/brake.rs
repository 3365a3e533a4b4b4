//! Positional hold.

use crate::error::TaskResult;
use crate::operation::{Operation, OperationStateMap, OperationWriter};
use crate::task::ControlTask;

/// Holds both wheels at the positions they had when the task began.
///
/// Never completes; race it against the work it protects inside AnyTasks.
#[derive(Debug, Default)]
pub struct PidBrakeTask {
    left: f64,
    right: f64,
}

impl PidBrakeTask {
    pub fn new() -> Self {
        Self::default()
    }

    fn hold(&self, ops: &mut OperationWriter<'_>) -> TaskResult {
        ops.set_digital(Operation::DriveTrainUsePositionalMode, true)?;
        ops.set_analog(Operation::DriveTrainLeftPosition, self.left)?;
        ops.set_analog(Operation::DriveTrainRightPosition, self.right)
    }
}

impl ControlTask for PidBrakeTask {
    fn name(&self) -> &'static str {
        "PidBrake"
    }

    fn begin(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.left = ops.supplied_analog(Operation::DriveTrainLeftPosition)?;
        self.right = ops.supplied_analog(Operation::DriveTrainRightPosition)?;
        self.hold(ops)
    }

    fn update(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.hold(ops)
    }

    fn has_completed(&self, _ops: &OperationStateMap) -> bool {
        false
    }

    fn stop(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        ops.set_digital(Operation::DriveTrainUsePositionalMode, false)?;
        ops.set_analog(Operation::DriveTrainLeftPosition, 0.0)?;
        ops.set_analog(Operation::DriveTrainRightPosition, 0.0)
    }
}
