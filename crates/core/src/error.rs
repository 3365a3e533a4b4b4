//! Engine error types
//!
//! Contract violations (wrong kind, undeclared operation) are programmer
//! errors and surface through `Result` all the way out of
//! [`TaskScheduler::tick`](crate::scheduler::TaskScheduler::tick).
//! Missing vision data and PID numeric edge cases are not errors.

use core::fmt;

use crate::operation::{Operation, OperationKind};

/// Errors raised at the operation-state map boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperationError {
    /// Operation was not declared when the map was created
    UnknownOperation(Operation),
    /// Operation was accessed as the wrong kind
    TypeMismatch {
        /// Operation that was accessed
        operation: Operation,
        /// Kind the caller asked for
        expected: OperationKind,
        /// Kind the operation is declared as
        actual: OperationKind,
    },
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationError::UnknownOperation(operation) => {
                write!(f, "operation {} is not declared", operation)
            }
            OperationError::TypeMismatch {
                operation,
                expected,
                actual,
            } => write!(
                f,
                "operation {} accessed as {} but is declared {}",
                operation, expected, actual
            ),
        }
    }
}

/// Result of a task lifecycle call
pub type TaskResult = Result<(), OperationError>;

/// Errors detected while assembling a task tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompositionError {
    /// AnyTasks with no children can never complete
    EmptyAnyTasks,
}

impl fmt::Display for CompositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositionError::EmptyAnyTasks => {
                write!(f, "AnyTasks composite needs at least one child")
            }
        }
    }
}
