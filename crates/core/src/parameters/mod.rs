//! Parameter management
//!
//! A bounded [`ParameterStore`] plus the [`TuningParams`] view that the
//! routine builder consumes. Persistence of the store is left to the
//! embedding application.

pub mod error;
pub mod storage;
pub mod tuning;

pub use error::ParameterError;
pub use storage::{ParamFlags, ParamValue, ParameterStore, MAX_PARAMS, PARAM_NAME_LEN};
pub use tuning::{PidParams, TuningParams};
