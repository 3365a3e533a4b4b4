//! Operations: named, typed control points between task logic and actuators.
//!
//! An [`Operation`] is drawn from a closed enumeration and tagged with its
//! [`OperationKind`]. The [`OperationStateMap`] holds the current value for
//! every declared operation, refreshed from an [`OperationInput`] once per
//! tick and optionally overridden by the running task.

mod map;
mod state;

pub use map::{ManualInput, OperationInput, OperationStateMap, OperationWriter, MAX_OPERATIONS};
pub use state::{AnalogOperationState, DigitalOperationState, OperationState};

use core::fmt;

/// Value kind of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperationKind {
    /// Boolean control point (solenoid, mode switch, button)
    Digital,
    /// Continuous control point (motor power, position target)
    Analog,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Digital => write!(f, "digital"),
            OperationKind::Analog => write!(f, "analog"),
        }
    }
}

/// Value of an operation, tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperationValue {
    Digital(bool),
    Analog(f64),
}

impl OperationValue {
    /// Kind of the carried value.
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationValue::Digital(_) => OperationKind::Digital,
            OperationValue::Analog(_) => OperationKind::Analog,
        }
    }
}

/// Every control point known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation {
    // Drivetrain
    DriveTrainMoveForward,
    DriveTrainTurn,
    DriveTrainSimpleMode,
    DriveTrainUsePositionalMode,
    DriveTrainLeftPosition,
    DriveTrainRightPosition,
    DriveTrainSwapFrontOrientation,

    // Intake
    IntakeIn,
    IntakeOut,
    IntakeExtendArm,

    // Shooter
    ShooterSpeed,
    ShooterFeed,
    ShooterLowerKicker,
    ShooterExtendHood,

    // General
    EnablePid,
    DisablePid,
}

impl Operation {
    /// All declared operations, in declaration order.
    pub const ALL: [Operation; 16] = [
        Operation::DriveTrainMoveForward,
        Operation::DriveTrainTurn,
        Operation::DriveTrainSimpleMode,
        Operation::DriveTrainUsePositionalMode,
        Operation::DriveTrainLeftPosition,
        Operation::DriveTrainRightPosition,
        Operation::DriveTrainSwapFrontOrientation,
        Operation::IntakeIn,
        Operation::IntakeOut,
        Operation::IntakeExtendArm,
        Operation::ShooterSpeed,
        Operation::ShooterFeed,
        Operation::ShooterLowerKicker,
        Operation::ShooterExtendHood,
        Operation::EnablePid,
        Operation::DisablePid,
    ];

    /// Declared kind of this operation.
    pub const fn kind(self) -> OperationKind {
        match self {
            Operation::DriveTrainMoveForward
            | Operation::DriveTrainTurn
            | Operation::DriveTrainLeftPosition
            | Operation::DriveTrainRightPosition
            | Operation::ShooterSpeed => OperationKind::Analog,
            Operation::DriveTrainSimpleMode
            | Operation::DriveTrainUsePositionalMode
            | Operation::DriveTrainSwapFrontOrientation
            | Operation::IntakeIn
            | Operation::IntakeOut
            | Operation::IntakeExtendArm
            | Operation::ShooterFeed
            | Operation::ShooterLowerKicker
            | Operation::ShooterExtendHood
            | Operation::EnablePid
            | Operation::DisablePid => OperationKind::Digital,
        }
    }

    /// Short name for logs.
    pub const fn name(self) -> &'static str {
        match self {
            Operation::DriveTrainMoveForward => "DriveTrainMoveForward",
            Operation::DriveTrainTurn => "DriveTrainTurn",
            Operation::DriveTrainSimpleMode => "DriveTrainSimpleMode",
            Operation::DriveTrainUsePositionalMode => "DriveTrainUsePositionalMode",
            Operation::DriveTrainLeftPosition => "DriveTrainLeftPosition",
            Operation::DriveTrainRightPosition => "DriveTrainRightPosition",
            Operation::DriveTrainSwapFrontOrientation => "DriveTrainSwapFrontOrientation",
            Operation::IntakeIn => "IntakeIn",
            Operation::IntakeOut => "IntakeOut",
            Operation::IntakeExtendArm => "IntakeExtendArm",
            Operation::ShooterSpeed => "ShooterSpeed",
            Operation::ShooterFeed => "ShooterFeed",
            Operation::ShooterLowerKicker => "ShooterLowerKicker",
            Operation::ShooterExtendHood => "ShooterExtendHood",
            Operation::EnablePid => "EnablePid",
            Operation::DisablePid => "DisablePid",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_lists_each_operation_once() {
        for (i, a) in Operation::ALL.iter().enumerate() {
            for b in Operation::ALL.iter().skip(i + 1) {
                assert_ne!(a, b, "duplicate operation {}", a);
            }
        }
    }

    #[test]
    fn kinds_match_value_types() {
        assert_eq!(Operation::DriveTrainTurn.kind(), OperationKind::Analog);
        assert_eq!(Operation::ShooterSpeed.kind(), OperationKind::Analog);
        assert_eq!(Operation::IntakeIn.kind(), OperationKind::Digital);
        assert_eq!(Operation::ShooterFeed.kind(), OperationKind::Digital);
    }

    #[test]
    fn value_kind() {
        assert_eq!(OperationValue::Digital(true).kind(), OperationKind::Digital);
        assert_eq!(OperationValue::Analog(0.5).kind(), OperationKind::Analog);
    }
}
