//! taskloop_core - Cooperative, tick-driven control-task engine
//!
//! Complex multi-phase robot behaviors are expressed as trees of composable
//! control tasks that read and override named, typed operations instead of
//! touching actuators directly.
//!
//! # Design Principles
//!
//! - **Host-testable**: `no_std` + `alloc`, no platform dependencies
//! - **Trait abstractions**: clock, vision and driver input are injected
//! - **Single writer**: one active routine holds write access to the
//!   operation-state map per tick
//!
//! # Modules
//!
//! - [`operation`]: Operations, the operation-state map and its writer
//! - [`task`]: Control-task trait, lifecycle guard, Sequential/Concurrent composites
//! - [`tasks`]: Drive, intake, shooter, brake and vision-feedback tasks
//! - [`pid`]: PID controller
//! - [`scheduler`]: Tick driver owning the map and the active routine
//! - [`routine`]: Autonomous routine selector
//! - [`parameters`]: Parameter store and tuning constants
//! - [`traits`]: Time and vision collaborators
//! - [`error`]: Error types

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod logging;

pub mod error;
pub mod operation;
pub mod parameters;
pub mod pid;
pub mod routine;
pub mod scheduler;
pub mod task;
pub mod tasks;
pub mod traits;

pub use error::{CompositionError, OperationError, TaskResult};
pub use operation::{Operation, OperationKind, OperationStateMap, OperationValue, OperationWriter};
pub use scheduler::{TaskScheduler, TickOutcome};
pub use task::{BoxedTask, ControlTask};
