//! Operation-state map, its input source and the task-side writer.

use heapless::index_map::FnvIndexMap;

use super::state::OperationState;
use super::{Operation, OperationKind, OperationValue};
use crate::error::OperationError;

/// Capacity of the operation-state map (power of two, at least `Operation::ALL.len()`)
pub const MAX_OPERATIONS: usize = 32;

const _: () = assert!(Operation::ALL.len() <= MAX_OPERATIONS);

/// Source of externally supplied operation values (driver input, defaults).
///
/// Consumed once per tick by [`OperationStateMap::refresh`]. Only the
/// accessor matching the operation's declared kind is called.
pub trait OperationInput {
    /// Supplied value for a digital operation
    fn digital(&self, operation: Operation) -> bool;

    /// Supplied value for an analog operation
    fn analog(&self, operation: Operation) -> f64;
}

impl<T: OperationInput + ?Sized> OperationInput for &T {
    fn digital(&self, operation: Operation) -> bool {
        (**self).digital(operation)
    }

    fn analog(&self, operation: Operation) -> f64 {
        (**self).analog(operation)
    }
}

/// Table-backed input snapshot.
///
/// Every operation reads `false` / `0.0` until set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualInput {
    digital: [bool; Operation::ALL.len()],
    analog: [f64; Operation::ALL.len()],
}

impl ManualInput {
    pub fn new() -> Self {
        Self {
            digital: [false; Operation::ALL.len()],
            analog: [0.0; Operation::ALL.len()],
        }
    }

    pub fn set_digital(&mut self, operation: Operation, value: bool) -> &mut Self {
        self.digital[operation as usize] = value;
        self
    }

    pub fn set_analog(&mut self, operation: Operation, value: f64) -> &mut Self {
        self.analog[operation as usize] = value;
        self
    }
}

impl Default for ManualInput {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationInput for ManualInput {
    fn digital(&self, operation: Operation) -> bool {
        self.digital[operation as usize]
    }

    fn analog(&self, operation: Operation) -> f64 {
        self.analog[operation as usize]
    }
}

/// Current state of every declared operation.
///
/// Owned by the scheduler. Tasks read it through `&OperationStateMap` and
/// write interrupts through an [`OperationWriter`].
#[derive(Debug, Clone)]
pub struct OperationStateMap {
    states: FnvIndexMap<Operation, OperationState, MAX_OPERATIONS>,
}

impl OperationStateMap {
    /// Create a map declaring exactly `operations`. Duplicates are ignored.
    pub fn new(operations: &[Operation]) -> Self {
        let mut states = FnvIndexMap::new();
        for &operation in operations {
            if !states.contains_key(&operation) {
                // Cannot fail: capacity covers every distinct operation
                let _ = states.insert(operation, OperationState::new(operation.kind()));
            }
        }
        Self { states }
    }

    /// Create a map declaring every known operation.
    pub fn with_all() -> Self {
        Self::new(&Operation::ALL)
    }

    pub fn is_declared(&self, operation: Operation) -> bool {
        self.states.contains_key(&operation)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Declared operations in declaration order
    pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
        self.states.keys().copied()
    }

    /// Raw state of an operation
    pub fn state(&self, operation: Operation) -> Result<&OperationState, OperationError> {
        self.states
            .get(&operation)
            .ok_or(OperationError::UnknownOperation(operation))
    }

    fn state_of_kind(
        &self,
        operation: Operation,
        expected: OperationKind,
    ) -> Result<&OperationState, OperationError> {
        let state = self.state(operation)?;
        check_kind(operation, expected, state.kind())?;
        Ok(state)
    }

    /// Effective value, interrupt first.
    pub fn get(&self, operation: Operation) -> Result<OperationValue, OperationError> {
        Ok(self.state(operation)?.effective())
    }

    pub fn get_digital(&self, operation: Operation) -> Result<bool, OperationError> {
        match self.state_of_kind(operation, OperationKind::Digital)? {
            OperationState::Digital(s) => Ok(s.effective()),
            OperationState::Analog(_) => Err(mismatch(operation, OperationKind::Digital)),
        }
    }

    pub fn get_analog(&self, operation: Operation) -> Result<f64, OperationError> {
        match self.state_of_kind(operation, OperationKind::Analog)? {
            OperationState::Analog(s) => Ok(s.effective()),
            OperationState::Digital(_) => Err(mismatch(operation, OperationKind::Analog)),
        }
    }

    /// Supplied (non-interrupt) value of a digital operation
    pub fn supplied_digital(&self, operation: Operation) -> Result<bool, OperationError> {
        match self.state_of_kind(operation, OperationKind::Digital)? {
            OperationState::Digital(s) => Ok(s.supplied()),
            OperationState::Analog(_) => Err(mismatch(operation, OperationKind::Digital)),
        }
    }

    /// Supplied (non-interrupt) value of an analog operation
    pub fn supplied_analog(&self, operation: Operation) -> Result<f64, OperationError> {
        match self.state_of_kind(operation, OperationKind::Analog)? {
            OperationState::Analog(s) => Ok(s.supplied()),
            OperationState::Digital(_) => Err(mismatch(operation, OperationKind::Analog)),
        }
    }

    /// Override the effective value until cleared.
    pub fn set_interrupt(
        &mut self,
        operation: Operation,
        value: OperationValue,
    ) -> Result<(), OperationError> {
        let state = self
            .states
            .get_mut(&operation)
            .ok_or(OperationError::UnknownOperation(operation))?;
        check_kind(operation, value.kind(), state.kind())?;
        state.interrupt_with(value);
        Ok(())
    }

    pub fn clear_interrupt(&mut self, operation: Operation) -> Result<(), OperationError> {
        self.states
            .get_mut(&operation)
            .ok_or(OperationError::UnknownOperation(operation))?
            .clear_interrupt();
        Ok(())
    }

    pub fn clear_all_interrupts(&mut self) {
        for state in self.states.values_mut() {
            state.clear_interrupt();
        }
    }

    /// True if any operation currently carries an interrupt
    pub fn has_interrupts(&self) -> bool {
        self.states.values().any(OperationState::is_interrupted)
    }

    /// Replace the supplied layer of every declared operation from `input`.
    ///
    /// Interrupts are left untouched; the scheduler decides when they are
    /// released.
    pub fn refresh<I: OperationInput + ?Sized>(&mut self, input: &I) {
        for (&operation, state) in self.states.iter_mut() {
            let value = match state.kind() {
                OperationKind::Digital => OperationValue::Digital(input.digital(operation)),
                OperationKind::Analog => OperationValue::Analog(input.analog(operation)),
            };
            state.supply(value);
        }
    }

    /// Borrow the map for one task lifecycle call.
    pub fn writer(&mut self) -> OperationWriter<'_> {
        OperationWriter { map: self }
    }
}

fn check_kind(
    operation: Operation,
    expected: OperationKind,
    actual: OperationKind,
) -> Result<(), OperationError> {
    if expected == actual {
        Ok(())
    } else {
        Err(OperationError::TypeMismatch {
            operation,
            expected,
            actual,
        })
    }
}

fn mismatch(operation: Operation, expected: OperationKind) -> OperationError {
    OperationError::TypeMismatch {
        operation,
        expected,
        actual: operation.kind(),
    }
}

/// Write access to the operation-state map for the duration of one
/// lifecycle call.
pub struct OperationWriter<'m> {
    map: &'m mut OperationStateMap,
}

impl<'m> OperationWriter<'m> {
    pub fn set_digital(&mut self, operation: Operation, value: bool) -> Result<(), OperationError> {
        self.map
            .set_interrupt(operation, OperationValue::Digital(value))
    }

    pub fn set_analog(&mut self, operation: Operation, value: f64) -> Result<(), OperationError> {
        self.map.set_interrupt(operation, OperationValue::Analog(value))
    }

    /// Release this operation back to its supplied value.
    pub fn clear(&mut self, operation: Operation) -> Result<(), OperationError> {
        self.map.clear_interrupt(operation)
    }

    pub fn digital(&self, operation: Operation) -> Result<bool, OperationError> {
        self.map.get_digital(operation)
    }

    pub fn analog(&self, operation: Operation) -> Result<f64, OperationError> {
        self.map.get_analog(operation)
    }

    pub fn supplied_analog(&self, operation: Operation) -> Result<f64, OperationError> {
        self.map.supplied_analog(operation)
    }

    /// Read-only view of the whole map
    pub fn map(&self) -> &OperationStateMap {
        self.map
    }
}
