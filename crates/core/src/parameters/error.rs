//! Parameter store errors

use core::fmt;

/// Why a parameter could not be registered or written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParameterError {
    /// Name does not fit in `PARAM_NAME_LEN` bytes
    NameTooLong,
    /// Write to a name that was never registered
    Unknown,
    /// No slot left for another parameter
    StoreFull,
    /// Parameter is flagged read-only
    ReadOnly,
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameTooLong => write!(f, "parameter name too long"),
            Self::Unknown => write!(f, "parameter not registered"),
            Self::StoreFull => write!(f, "parameter store full"),
            Self::ReadOnly => write!(f, "parameter is read-only"),
        }
    }
}
