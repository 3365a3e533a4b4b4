//! Collaborator traits for the control-task engine.
//!
//! Tasks never reach hardware directly. Clocks and vision measurements are
//! injected through these traits at construction time.
//!
//! # Design
//!
//! - Trait definitions are pure and have no feature gates
//! - Mock implementations are always available for host testing

pub mod time;
pub mod vision;

pub use time::{MockTime, TimeSource};
pub use vision::{MockVision, VisionSource};
