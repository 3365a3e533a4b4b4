//! Vision-feedback tasks
//!
//! Both tasks read optional measurements from a [`VisionSource`]. A missing
//! measurement is a normal condition: nothing is written for that tick and
//! completion stays false. Losing the detection entirely cancels the task.

use crate::error::TaskResult;
use crate::operation::{Operation, OperationStateMap, OperationWriter};
use crate::parameters::TuningParams;
use crate::pid::{PidController, PidGains};
use crate::task::ControlTask;
use crate::traits::{TimeSource, VisionSource};

/// Turning loop and settle criteria for vision centering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenteringConfig {
    /// Turn PID (desired angle vs measured angle)
    pub gains: PidGains,
    /// Largest angle difference (degrees) counted as centered
    pub tolerance: f64,
    /// Seconds the angle must stay centered before completing
    pub dwell: f64,
}

/// Turns in place until the target is centered and stays centered.
pub struct VisionCenteringTask<'a, T: TimeSource + ?Sized, V: VisionSource + ?Sized> {
    clock: &'a T,
    vision: &'a V,
    config: CenteringConfig,
    turn_pid: Option<PidController<'a, T>>,
    settled_since: Option<f64>,
}

impl<'a, T: TimeSource + ?Sized, V: VisionSource + ?Sized> VisionCenteringTask<'a, T, V> {
    pub fn new(clock: &'a T, vision: &'a V, config: CenteringConfig) -> Self {
        Self {
            clock,
            vision,
            config,
            turn_pid: None,
            settled_since: None,
        }
    }

    /// In-place centering using the tuned centering loop.
    pub fn from_params(clock: &'a T, vision: &'a V, params: &TuningParams) -> Self {
        Self::new(clock, vision, params.centering_config())
    }

    /// (measured, desired) when both are available
    fn angles(&self) -> Option<(f64, f64)> {
        Some((self.vision.measured_angle()?, self.vision.desired_angle()?))
    }

    fn is_centered(&self, measured: f64, desired: f64) -> bool {
        libm::fabs(measured - desired) <= self.config.tolerance
    }

    fn neutralize(ops: &mut OperationWriter<'_>) -> TaskResult {
        ops.set_digital(Operation::DriveTrainUsePositionalMode, false)?;
        ops.set_analog(Operation::DriveTrainTurn, 0.0)
    }
}

impl<T: TimeSource + ?Sized, V: VisionSource + ?Sized> ControlTask
    for VisionCenteringTask<'_, T, V>
{
    fn name(&self) -> &'static str {
        "VisionCentering"
    }

    fn begin(&mut self, _ops: &mut OperationWriter<'_>) -> TaskResult {
        self.turn_pid = Some(PidController::new(self.clock, self.config.gains));
        self.settled_since = None;
        Ok(())
    }

    fn update(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        ops.set_digital(Operation::DriveTrainUsePositionalMode, false)?;

        let Some((measured, desired)) = self.angles() else {
            self.settled_since = None;
            return Ok(());
        };

        if let Some(pid) = self.turn_pid.as_mut() {
            let turn = -pid.calculate_position(desired, measured);
            ops.set_analog(Operation::DriveTrainTurn, turn)?;
        }

        if self.is_centered(measured, desired) {
            if self.settled_since.is_none() {
                self.settled_since = Some(self.clock.now_secs());
            }
        } else {
            self.settled_since = None;
        }
        Ok(())
    }

    fn has_completed(&self, _ops: &OperationStateMap) -> bool {
        let Some((measured, desired)) = self.angles() else {
            return false;
        };
        if !self.is_centered(measured, desired) {
            return false;
        }
        self.settled_since
            .is_some_and(|since| self.clock.now_secs() - since >= self.config.dwell)
    }

    fn should_cancel(&self, _ops: &OperationStateMap) -> bool {
        let lost = !self.vision.detection_present();
        if lost {
            crate::log_warn!("vision centering: target lost");
        }
        lost
    }

    fn stop(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.turn_pid = None;
        Self::neutralize(ops)
    }
}

/// Drives toward the target while centering on it.
///
/// Completes as soon as the measured distance is within the acceptable
/// forward distance, whether or not the centering loop has settled.
pub struct VisionAdvanceAndCenterTask<'a, T: TimeSource + ?Sized, V: VisionSource + ?Sized> {
    centering: VisionCenteringTask<'a, T, V>,
    clock: &'a T,
    vision: &'a V,
    forward_gains: PidGains,
    max_distance: f64,
    forward_pid: Option<PidController<'a, T>>,
}

impl<'a, T: TimeSource + ?Sized, V: VisionSource + ?Sized> VisionAdvanceAndCenterTask<'a, T, V> {
    pub fn new(
        clock: &'a T,
        vision: &'a V,
        centering: CenteringConfig,
        forward_gains: PidGains,
        max_distance: f64,
    ) -> Self {
        Self {
            centering: VisionCenteringTask::new(clock, vision, centering),
            clock,
            vision,
            forward_gains,
            max_distance,
            forward_pid: None,
        }
    }

    /// Moving-centering loop plus the advancing loop.
    pub fn from_params(clock: &'a T, vision: &'a V, params: &TuningParams) -> Self {
        Self::new(
            clock,
            vision,
            params.moving_centering_config(),
            params.advancing_gains(),
            f64::from(params.max_forward_distance),
        )
    }
}

impl<T: TimeSource + ?Sized, V: VisionSource + ?Sized> ControlTask
    for VisionAdvanceAndCenterTask<'_, T, V>
{
    fn name(&self) -> &'static str {
        "VisionAdvanceAndCenter"
    }

    fn begin(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.centering.begin(ops)?;
        self.forward_pid = Some(PidController::new(self.clock, self.forward_gains));
        Ok(())
    }

    fn update(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.centering.update(ops)?;

        if let (Some(distance), Some(pid)) =
            (self.vision.measured_distance(), self.forward_pid.as_mut())
        {
            let forward = pid.calculate_position(0.0, -distance);
            ops.set_analog(Operation::DriveTrainMoveForward, forward)?;
        }
        Ok(())
    }

    fn has_completed(&self, _ops: &OperationStateMap) -> bool {
        self.vision
            .measured_distance()
            .is_some_and(|distance| distance <= self.max_distance)
    }

    fn should_cancel(&self, ops: &OperationStateMap) -> bool {
        self.centering.should_cancel(ops)
    }

    fn stop(&mut self, ops: &mut OperationWriter<'_>) -> TaskResult {
        self.forward_pid = None;
        self.centering.stop(ops)?;
        ops.set_analog(Operation::DriveTrainMoveForward, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockTime, MockVision};

    fn config() -> CenteringConfig {
        CenteringConfig {
            gains: PidGains::new(0.065, 0.0, 0.0, 0.0, 1.0, -0.3, 0.3),
            tolerance: 2.0,
            dwell: 1.0,
        }
    }

    /// One scheduler-style tick: update then advance the clock
    fn tick(task: &mut impl ControlTask, map: &mut OperationStateMap, clock: &MockTime, ms: u64) {
        task.update(&mut map.writer()).unwrap();
        clock.advance_ms(ms);
    }

    // ========== Centering Output ==========

    #[test]
    fn test_turn_command_opposes_angle_error() {
        let clock = MockTime::new();
        let vision = MockVision::new();
        let mut map = OperationStateMap::with_all();
        let mut task = VisionCenteringTask::new(&clock, &vision, config());

        vision.see(10.0, 0.0, None);
        task.begin(&mut map.writer()).unwrap();
        task.update(&mut map.writer()).unwrap();
        // -(0.065 * (0 - 10)) = 0.65, clamped
        assert_eq!(map.get_analog(Operation::DriveTrainTurn), Ok(0.3));

        vision.see(1.0, 0.0, None);
        task.update(&mut map.writer()).unwrap();
        let turn = map.get_analog(Operation::DriveTrainTurn).unwrap();
        assert!((turn - 0.065).abs() < 1e-9);
    }

    #[test]
    fn test_absent_angles_write_nothing() {
        let clock = MockTime::new();
        let vision = MockVision::new();
        let mut map = OperationStateMap::with_all();
        let mut task = VisionCenteringTask::new(&clock, &vision, config());

        vision.see(10.0, 0.0, None);
        task.begin(&mut map.writer()).unwrap();
        task.update(&mut map.writer()).unwrap();

        vision.set_measured_angle(None);
        task.update(&mut map.writer()).unwrap();
        assert_eq!(map.get_analog(Operation::DriveTrainTurn), Ok(0.3));
        assert!(!task.has_completed(&map));
    }

    // ========== Settle / Dwell ==========

    #[test]
    fn test_completes_only_after_dwell() {
        let clock = MockTime::new();
        let vision = MockVision::new();
        let mut map = OperationStateMap::with_all();
        let mut task = VisionCenteringTask::new(&clock, &vision, config());

        vision.see(1.0, 0.0, None);
        task.begin(&mut map.writer()).unwrap();

        for _ in 0..49 {
            tick(&mut task, &mut map, &clock, 20);
            assert!(!task.has_completed(&map), "completed before dwell");
        }
        tick(&mut task, &mut map, &clock, 20);
        assert!(task.has_completed(&map));
    }

    #[test]
    fn test_settle_resets_when_leaving_tolerance() {
        let clock = MockTime::new();
        let vision = MockVision::new();
        let mut map = OperationStateMap::with_all();
        let mut task = VisionCenteringTask::new(&clock, &vision, config());

        vision.see(0.5, 0.0, None);
        task.begin(&mut map.writer()).unwrap();
        tick(&mut task, &mut map, &clock, 800);

        // Drifts out, then back
        vision.see(5.0, 0.0, None);
        tick(&mut task, &mut map, &clock, 20);
        vision.see(0.5, 0.0, None);
        tick(&mut task, &mut map, &clock, 500);
        assert!(!task.has_completed(&map));

        clock.advance_ms(600);
        assert!(task.has_completed(&map));
    }

    #[test]
    fn test_settle_resets_when_data_absent() {
        let clock = MockTime::new();
        let vision = MockVision::new();
        let mut map = OperationStateMap::with_all();
        let mut task = VisionCenteringTask::new(&clock, &vision, config());

        vision.see(0.0, 0.0, None);
        task.begin(&mut map.writer()).unwrap();
        tick(&mut task, &mut map, &clock, 900);
        vision.set_desired_angle(None);
        tick(&mut task, &mut map, &clock, 200);
        vision.set_desired_angle(Some(0.0));
        assert!(!task.has_completed(&map));
    }

    // ========== Cancellation ==========

    #[test]
    fn test_cancel_when_detection_missing() {
        let clock = MockTime::new();
        let vision = MockVision::new();
        let map = OperationStateMap::with_all();
        let task = VisionCenteringTask::new(&clock, &vision, config());

        vision.see(0.0, 0.0, Some(10.0));
        assert!(!task.should_cancel(&map));

        // Angles still reported but no detection
        vision.set_detection_present(false);
        assert!(task.should_cancel(&map));
    }

    #[test]
    fn test_cancel_when_target_never_seen() {
        let clock = MockTime::new();
        let vision = MockVision::new();
        let mut map = OperationStateMap::with_all();
        let mut task = VisionCenteringTask::new(&clock, &vision, config());

        task.begin(&mut map.writer()).unwrap();
        tick(&mut task, &mut map, &clock, 20);
        assert!(task.should_cancel(&map));
        assert!(!task.has_completed(&map));

        // Target appears later: no stale state keeps the cancel latched
        vision.see(0.0, 0.0, None);
        tick(&mut task, &mut map, &clock, 20);
        assert!(!task.should_cancel(&map));
    }

    #[test]
    fn test_stop_neutralizes_turn() {
        let clock = MockTime::new();
        let vision = MockVision::new();
        let mut map = OperationStateMap::with_all();
        let mut task = VisionCenteringTask::new(&clock, &vision, config());

        vision.see(10.0, 0.0, None);
        task.begin(&mut map.writer()).unwrap();
        task.update(&mut map.writer()).unwrap();
        task.stop(&mut map.writer()).unwrap();
        assert_eq!(map.get_analog(Operation::DriveTrainTurn), Ok(0.0));
        assert_eq!(
            map.get_digital(Operation::DriveTrainUsePositionalMode),
            Ok(false)
        );
    }

    // ========== Advance And Center ==========

    fn advance_task<'a>(
        clock: &'a MockTime,
        vision: &'a MockVision,
    ) -> VisionAdvanceAndCenterTask<'a, MockTime, MockVision> {
        VisionAdvanceAndCenterTask::new(
            clock,
            vision,
            config(),
            PidGains::new(0.01, 0.0, 0.0, 0.0, 1.0, -0.4, 0.4),
            24.0,
        )
    }

    #[test]
    fn test_advance_drives_forward_and_turns() {
        let clock = MockTime::new();
        let vision = MockVision::new();
        let mut map = OperationStateMap::with_all();
        let mut task = advance_task(&clock, &vision);

        vision.see(-3.0, 0.0, Some(30.0));
        task.begin(&mut map.writer()).unwrap();
        task.update(&mut map.writer()).unwrap();

        let forward = map.get_analog(Operation::DriveTrainMoveForward).unwrap();
        assert!((forward - 0.3).abs() < 1e-9, "forward {}", forward);
        assert!(map.get_analog(Operation::DriveTrainTurn).unwrap() < 0.0);
        assert!(!task.has_completed(&map));
    }

    #[test]
    fn test_advance_completes_on_distance_alone() {
        let clock = MockTime::new();
        let vision = MockVision::new();
        let mut map = OperationStateMap::with_all();
        let mut task = advance_task(&clock, &vision);

        // Far off-center, but close enough
        vision.see(15.0, 0.0, Some(20.0));
        task.begin(&mut map.writer()).unwrap();
        task.update(&mut map.writer()).unwrap();
        assert!(task.has_completed(&map));

        vision.set_measured_distance(None);
        assert!(!task.has_completed(&map));
    }

    #[test]
    fn test_advance_stop_neutralizes_both_axes() {
        let clock = MockTime::new();
        let vision = MockVision::new();
        let mut map = OperationStateMap::with_all();
        let mut task = advance_task(&clock, &vision);

        vision.see(5.0, 0.0, Some(60.0));
        task.begin(&mut map.writer()).unwrap();
        task.update(&mut map.writer()).unwrap();
        vision.lose_target();
        assert!(task.should_cancel(&map));
        task.stop(&mut map.writer()).unwrap();

        assert_eq!(map.get_analog(Operation::DriveTrainMoveForward), Ok(0.0));
        assert_eq!(map.get_analog(Operation::DriveTrainTurn), Ok(0.0));
    }
}
