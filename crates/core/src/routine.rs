//! Autonomous Routine Selector
//!
//! Maps the 3-bit dip-switch code read at the start of the autonomous
//! period to a pre-built task tree. Unknown codes fall back to a
//! zero-duration filler, so selection never fails.
//!
//! | code | routine |
//! |------|---------|
//! | 0 | filler |
//! | 1 | delay, extend intake while driving slowly |
//! | 2 | delay, extend intake while driving fast |
//! | 3 | drive slowly, center on the target, fire |
//! | 4 | straight, turn, straight, fire |
//! | 5 | advance on the target while centering, spin intake out |
//! | 6 | straight, curve, approach, fire |
//! | 7 | straight, pivot, re-approach, pause, short approach, fire |

use alloc::boxed::Box;
use alloc::vec;
use core::fmt;

use crate::parameters::TuningParams;
use crate::task::{BoxedTask, ConcurrentTask, SequentialTask, WaitTask};
use crate::tasks::{
    DriveRouteTask, DriveTimedTask, IntakeExtendTask, IntakeSpinTask, PidBrakeTask,
    ShooterKickerTask, ShooterSpinDownTask, ShooterSpinUpTask, TurnTask,
    VisionAdvanceAndCenterTask, VisionCenteringTask,
};
use crate::traits::{TimeSource, VisionSource};

/// Turn used by the straight-turn-straight routine (degrees, clockwise)
const TURN_TOWARD_GOAL_DEGREES: f64 = 75.0;

/// Seconds the intake spins out after advancing on the target
const PLACE_DURATION: f64 = 1.0;

/// Selector switch reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SwitchCode(u8);

impl SwitchCode {
    pub const fn new(code: u8) -> Self {
        Self(code)
    }

    /// Code from the three selector inputs.
    ///
    /// The switches pull their input low when flipped, so an input reading
    /// `false` contributes its bit (A = 1, B = 2, C = 4).
    pub const fn from_switches(a: bool, b: bool, c: bool) -> Self {
        let mut code = 0;
        if !a {
            code += 1;
        }
        if !b {
            code += 2;
        }
        if !c {
            code += 4;
        }
        Self(code)
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for SwitchCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Collaborators the routines are built against
pub struct RoutineContext<'a, T: TimeSource + ?Sized, V: VisionSource + ?Sized> {
    pub clock: &'a T,
    pub vision: &'a V,
    pub params: &'a TuningParams,
}

impl<'a, T: TimeSource + ?Sized, V: VisionSource + ?Sized> RoutineContext<'a, T, V> {
    pub fn new(clock: &'a T, vision: &'a V, params: &'a TuningParams) -> Self {
        Self {
            clock,
            vision,
            params,
        }
    }
}

/// Build the routine for a switch code.
pub fn select_routine<'a, T, V>(code: SwitchCode, ctx: &RoutineContext<'a, T, V>) -> BoxedTask<'a>
where
    T: TimeSource + ?Sized,
    V: VisionSource + ?Sized,
{
    crate::log_info!("Autonomous routine selection: {}", code.value());
    let p = ctx.params;

    match code.value() {
        0 => filler(ctx),
        1 => drive_timed(ctx, f64::from(p.drive_time_slow), f64::from(p.drive_velocity_slow)),
        2 => drive_timed(ctx, f64::from(p.drive_time_fast), f64::from(p.drive_velocity_fast)),
        3 => drive_center_and_fire(ctx),
        4 => straight_turn_and_fire(ctx),
        5 => advance_and_place(ctx),
        6 => straight_curve_and_fire(ctx),
        7 => straight_turn_reapproach_and_fire(ctx),
        _ => {
            crate::log_warn!("Unknown routine code {}, using filler", code.value());
            filler(ctx)
        }
    }
}

/// Shot from close range while holding position.
///
/// Lower the kicker, spin up, raise the kicker into the wheel, spin down;
/// raced against a brake so the composite completes with the sequence.
pub fn fire_sequence<'a, T, V>(ctx: &RoutineContext<'a, T, V>) -> ConcurrentTask<'a>
where
    T: TimeSource + ?Sized,
    V: VisionSource + ?Sized,
{
    let p = ctx.params;
    let clock = ctx.clock;
    let shot = SequentialTask::empty()
        .then(ShooterKickerTask::new(clock, true, f64::from(p.kicker_duration)))
        .then(ShooterSpinUpTask::new(
            clock,
            false,
            f64::from(p.close_shot_velocity),
            f64::from(p.spin_up_duration),
        ))
        .then(ShooterKickerTask::new(clock, false, f64::from(p.fire_duration)))
        .then(ShooterSpinDownTask::new(clock, f64::from(p.spin_down_duration)));

    ConcurrentTask::any(vec![]).with(shot).with(PidBrakeTask::new())
}

fn filler<'a, T, V>(ctx: &RoutineContext<'a, T, V>) -> BoxedTask<'a>
where
    T: TimeSource + ?Sized,
    V: VisionSource + ?Sized,
{
    Box::new(WaitTask::new(ctx.clock, 0.0))
}

fn drive_timed<'a, T, V>(ctx: &RoutineContext<'a, T, V>, time: f64, velocity: f64) -> BoxedTask<'a>
where
    T: TimeSource + ?Sized,
    V: VisionSource + ?Sized,
{
    let p = ctx.params;
    Box::new(
        SequentialTask::empty()
            .then(WaitTask::new(ctx.clock, f64::from(p.start_delay)))
            .then(
                ConcurrentTask::all(vec![])
                    .with(IntakeExtendTask::new(
                        ctx.clock,
                        true,
                        f64::from(p.intake_extend_duration),
                    ))
                    .with(DriveTimedTask::new(ctx.clock, time, 0.0, velocity)),
            ),
    )
}

fn drive_center_and_fire<'a, T, V>(ctx: &RoutineContext<'a, T, V>) -> BoxedTask<'a>
where
    T: TimeSource + ?Sized,
    V: VisionSource + ?Sized,
{
    let p = ctx.params;
    Box::new(
        SequentialTask::empty()
            .then(DriveTimedTask::new(
                ctx.clock,
                f64::from(p.drive_time_slow),
                0.0,
                f64::from(p.drive_velocity_slow),
            ))
            .then(VisionCenteringTask::from_params(ctx.clock, ctx.vision, p))
            .then(fire_sequence(ctx)),
    )
}

/// Extend the intake arm while running a ramped straight route
fn extend_and_drive<'a, T, V>(
    ctx: &RoutineContext<'a, T, V>,
    distance: f64,
    duration: f64,
) -> ConcurrentTask<'a>
where
    T: TimeSource + ?Sized,
    V: VisionSource + ?Sized,
{
    ConcurrentTask::all(vec![])
        .with(IntakeExtendTask::new(
            ctx.clock,
            true,
            f64::from(ctx.params.kicker_duration),
        ))
        .with(DriveRouteTask::ramp(ctx.clock, distance, distance, duration))
}

fn straight_turn_and_fire<'a, T, V>(ctx: &RoutineContext<'a, T, V>) -> BoxedTask<'a>
where
    T: TimeSource + ?Sized,
    V: VisionSource + ?Sized,
{
    let p = ctx.params;
    Box::new(
        SequentialTask::empty()
            .then(extend_and_drive(ctx, 585.0, 7.25))
            .then(
                ConcurrentTask::all(vec![])
                    .with(
                        SequentialTask::empty()
                            .then(TurnTask::by_angle(
                                ctx.clock,
                                TURN_TOWARD_GOAL_DEGREES,
                                f64::from(p.wheel_base),
                                1.0,
                            ))
                            .then(WaitTask::new(ctx.clock, 0.5)),
                    )
                    .with(IntakeExtendTask::new(
                        ctx.clock,
                        false,
                        f64::from(p.kicker_duration),
                    )),
            )
            .then(DriveRouteTask::ramp(ctx.clock, 400.0, 400.0, 3.25))
            .then(fire_sequence(ctx)),
    )
}

fn advance_and_place<'a, T, V>(ctx: &RoutineContext<'a, T, V>) -> BoxedTask<'a>
where
    T: TimeSource + ?Sized,
    V: VisionSource + ?Sized,
{
    Box::new(
        SequentialTask::empty()
            .then(VisionAdvanceAndCenterTask::from_params(
                ctx.clock, ctx.vision, ctx.params,
            ))
            .then(IntakeSpinTask::new(ctx.clock, false, PLACE_DURATION)),
    )
}

fn straight_curve_and_fire<'a, T, V>(ctx: &RoutineContext<'a, T, V>) -> BoxedTask<'a>
where
    T: TimeSource + ?Sized,
    V: VisionSource + ?Sized,
{
    Box::new(
        SequentialTask::empty()
            .then(extend_and_drive(ctx, 175.0, 4.0))
            .then(DriveRouteTask::ramp(ctx.clock, 500.0, 420.0, 4.0))
            .then(DriveRouteTask::ramp(ctx.clock, 200.0, 200.0, 3.0))
            .then(fire_sequence(ctx)),
    )
}

fn straight_turn_reapproach_and_fire<'a, T, V>(ctx: &RoutineContext<'a, T, V>) -> BoxedTask<'a>
where
    T: TimeSource + ?Sized,
    V: VisionSource + ?Sized,
{
    let p = ctx.params;
    Box::new(
        SequentialTask::empty()
            .then(extend_and_drive(ctx, 585.0, 7.0))
            .then(
                ConcurrentTask::all(vec![])
                    .with(
                        SequentialTask::empty()
                            // Pivot on the right wheel
                            .then(DriveRouteTask::ramp(ctx.clock, 95.0, 0.0, 0.75))
                            .then(WaitTask::new(ctx.clock, 0.3)),
                    )
                    .with(IntakeExtendTask::new(
                        ctx.clock,
                        false,
                        f64::from(p.kicker_duration),
                    )),
            )
            .then(DriveRouteTask::ramp(ctx.clock, 400.0, 400.0, 3.1))
            .then(WaitTask::new(ctx.clock, 0.7))
            .then(DriveRouteTask::ramp(ctx.clock, 100.0, 100.0, 0.7))
            .then(fire_sequence(ctx)),
    )
}
