//! Concrete control tasks used by the autonomous routines.

mod brake;
mod drive;
mod intake;
mod shooter;
mod vision;

pub use brake::PidBrakeTask;
pub use drive::{ramp_profile, DriveRouteTask, DriveTimedTask, RouteFn, TurnTask, RAMP_FRACTION};
pub use intake::{IntakeExtendTask, IntakeSpinTask};
pub use shooter::{ShooterFeedTask, ShooterKickerTask, ShooterSpinDownTask, ShooterSpinUpTask};
pub use vision::{CenteringConfig, VisionAdvanceAndCenterTask, VisionCenteringTask};
