//! Vision measurement abstraction.
//!
//! The vision pipeline is consumed purely as a source of optional numeric
//! measurements. A missing value means "no target this frame", which is a
//! normal condition and never an error.

use core::cell::Cell;

/// Source of optional vision measurements, read once or more per tick.
pub trait VisionSource {
    /// Angle to the detected target, in degrees.
    fn measured_angle(&self) -> Option<f64>;

    /// Angle the robot should hold relative to the target, in degrees.
    fn desired_angle(&self) -> Option<f64>;

    /// Distance to the detected target.
    fn measured_distance(&self) -> Option<f64>;

    /// Whether the pipeline currently sees a target center at all.
    fn detection_present(&self) -> bool;
}

/// Mock vision source with settable measurements.
///
/// Fields are `Cell`s so a test can change what the camera "sees" while a
/// task holds a shared reference.
#[derive(Debug, Default)]
pub struct MockVision {
    measured_angle: Cell<Option<f64>>,
    desired_angle: Cell<Option<f64>>,
    measured_distance: Cell<Option<f64>>,
    detection_present: Cell<bool>,
}

impl MockVision {
    /// Creates a mock with no target in view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts a target in view with the given angles and distance.
    pub fn see(&self, measured_angle: f64, desired_angle: f64, distance: Option<f64>) {
        self.measured_angle.set(Some(measured_angle));
        self.desired_angle.set(Some(desired_angle));
        self.measured_distance.set(distance);
        self.detection_present.set(true);
    }

    /// Removes the target from view.
    pub fn lose_target(&self) {
        self.measured_angle.set(None);
        self.desired_angle.set(None);
        self.measured_distance.set(None);
        self.detection_present.set(false);
    }

    pub fn set_measured_angle(&self, angle: Option<f64>) {
        self.measured_angle.set(angle);
    }

    pub fn set_desired_angle(&self, angle: Option<f64>) {
        self.desired_angle.set(angle);
    }

    pub fn set_measured_distance(&self, distance: Option<f64>) {
        self.measured_distance.set(distance);
    }

    pub fn set_detection_present(&self, present: bool) {
        self.detection_present.set(present);
    }
}

impl VisionSource for MockVision {
    fn measured_angle(&self) -> Option<f64> {
        self.measured_angle.get()
    }

    fn desired_angle(&self) -> Option<f64> {
        self.desired_angle.get()
    }

    fn measured_distance(&self) -> Option<f64> {
        self.measured_distance.get()
    }

    fn detection_present(&self) -> bool {
        self.detection_present.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_vision_starts_without_target() {
        let vision = MockVision::new();
        assert!(!vision.detection_present());
        assert!(vision.measured_angle().is_none());
        assert!(vision.measured_distance().is_none());
    }

    #[test]
    fn mock_vision_see_and_lose() {
        let vision = MockVision::new();
        vision.see(3.0, 1.0, Some(40.0));
        assert!(vision.detection_present());
        assert_eq!(vision.measured_angle(), Some(3.0));
        assert_eq!(vision.desired_angle(), Some(1.0));
        assert_eq!(vision.measured_distance(), Some(40.0));

        vision.lose_target();
        assert!(!vision.detection_present());
        assert!(vision.desired_angle().is_none());
    }
}
