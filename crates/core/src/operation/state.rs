//! Per-operation state: supplied value plus optional task interrupt.

use super::{OperationKind, OperationValue};

/// State of a digital operation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DigitalOperationState {
    /// Latest value supplied by the input layer
    supplied: bool,
    /// Override set by the running task
    interrupt: Option<bool>,
}

impl DigitalOperationState {
    pub fn supplied(&self) -> bool {
        self.supplied
    }

    pub fn interrupt(&self) -> Option<bool> {
        self.interrupt
    }

    /// Interrupt value if present, else the supplied value.
    pub fn effective(&self) -> bool {
        self.interrupt.unwrap_or(self.supplied)
    }
}

/// State of an analog operation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnalogOperationState {
    /// Latest value supplied by the input layer
    supplied: f64,
    /// Override set by the running task
    interrupt: Option<f64>,
}

impl AnalogOperationState {
    pub fn supplied(&self) -> f64 {
        self.supplied
    }

    pub fn interrupt(&self) -> Option<f64> {
        self.interrupt
    }

    /// Interrupt value if present, else the supplied value.
    pub fn effective(&self) -> f64 {
        self.interrupt.unwrap_or(self.supplied)
    }
}

/// State of one operation, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperationState {
    Digital(DigitalOperationState),
    Analog(AnalogOperationState),
}

impl OperationState {
    /// Fresh state for an operation of the given kind (false / 0.0, no interrupt).
    pub fn new(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Digital => OperationState::Digital(DigitalOperationState::default()),
            OperationKind::Analog => OperationState::Analog(AnalogOperationState::default()),
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            OperationState::Digital(_) => OperationKind::Digital,
            OperationState::Analog(_) => OperationKind::Analog,
        }
    }

    /// Effective value (interrupt if present, else supplied).
    pub fn effective(&self) -> OperationValue {
        match self {
            OperationState::Digital(s) => OperationValue::Digital(s.effective()),
            OperationState::Analog(s) => OperationValue::Analog(s.effective()),
        }
    }

    pub fn is_interrupted(&self) -> bool {
        match self {
            OperationState::Digital(s) => s.interrupt.is_some(),
            OperationState::Analog(s) => s.interrupt.is_some(),
        }
    }

    /// Replace the supplied layer. Returns false if the value kind does not match.
    pub(crate) fn supply(&mut self, value: OperationValue) -> bool {
        match (self, value) {
            (OperationState::Digital(s), OperationValue::Digital(v)) => {
                s.supplied = v;
                true
            }
            (OperationState::Analog(s), OperationValue::Analog(v)) => {
                s.supplied = v;
                true
            }
            _ => false,
        }
    }

    /// Set the interrupt layer. Returns false if the value kind does not match.
    pub(crate) fn interrupt_with(&mut self, value: OperationValue) -> bool {
        match (self, value) {
            (OperationState::Digital(s), OperationValue::Digital(v)) => {
                s.interrupt = Some(v);
                true
            }
            (OperationState::Analog(s), OperationValue::Analog(v)) => {
                s.interrupt = Some(v);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn clear_interrupt(&mut self) {
        match self {
            OperationState::Digital(s) => s.interrupt = None,
            OperationState::Analog(s) => s.interrupt = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_takes_precedence() {
        let mut state = OperationState::new(OperationKind::Analog);
        assert!(state.supply(OperationValue::Analog(0.4)));
        assert_eq!(state.effective(), OperationValue::Analog(0.4));

        assert!(state.interrupt_with(OperationValue::Analog(-1.0)));
        assert!(state.is_interrupted());
        assert_eq!(state.effective(), OperationValue::Analog(-1.0));

        state.clear_interrupt();
        assert!(!state.is_interrupted());
        assert_eq!(state.effective(), OperationValue::Analog(0.4));
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let mut state = OperationState::new(OperationKind::Digital);
        assert!(!state.supply(OperationValue::Analog(1.0)));
        assert!(!state.interrupt_with(OperationValue::Analog(1.0)));
        assert_eq!(state.effective(), OperationValue::Digital(false));
    }
}
