//! PID feedback controller
//!
//! Converts a desired/current pair (position mode) or a desired-rate /
//! encoder-ticks pair (velocity mode) into a bounded output. Time comes from
//! an injected [`TimeSource`]; dt is measured between consecutive calls.
//!
//! # Numeric edge cases
//!
//! - First call after construction: no previous sample, so the integral and
//!   derivative terms are skipped for that call.
//! - Zero or near-zero dt: same as the first call (no accumulation, no
//!   derivative).
//! - NaN output sanitizes to 0.0. Infinite output saturates at the clamp
//!   bound of its sign.

use crate::traits::TimeSource;

/// Smallest dt (seconds) accepted for integral/derivative updates
pub const MIN_DT: f64 = 1e-6;

/// Reference interval (seconds) that velocity-mode tick deltas are normalized to
pub const REFERENCE_INTERVAL: f64 = 0.02;

/// PID gains and output clamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    /// Proportional gain
    pub kp: f64,
    /// Integral gain
    pub ki: f64,
    /// Derivative gain
    pub kd: f64,
    /// Feed-forward gain (multiplies the desired value)
    pub kf: f64,
    /// Velocity-mode scale: ticks per reference interval at 100% rate (0 disables)
    pub ks: f64,
    /// Lower output bound
    pub min: f64,
    /// Upper output bound
    pub max: f64,
}

impl PidGains {
    /// Gains with the clamp range normalized so `min <= max`.
    pub fn new(kp: f64, ki: f64, kd: f64, kf: f64, ks: f64, min: f64, max: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            kp,
            ki,
            kd,
            kf,
            ks,
            min,
            max,
        }
    }

    /// Proportional-only gains with a symmetric clamp `[-limit, limit]`
    pub fn proportional(kp: f64, limit: f64) -> Self {
        let limit = libm::fabs(limit);
        Self::new(kp, 0.0, 0.0, 0.0, 0.0, -limit, limit)
    }
}

/// PID controller instance
///
/// Create one per task activation so integral state never carries over
/// between unrelated tasks.
#[derive(Debug)]
pub struct PidController<'a, T: TimeSource + ?Sized> {
    clock: &'a T,
    gains: PidGains,
    integral: f64,
    previous_error: f64,
    previous_time: Option<f64>,
    previous_ticks: Option<f64>,
    previous_rate: f64,
}

impl<'a, T: TimeSource + ?Sized> PidController<'a, T> {
    pub fn new(clock: &'a T, gains: PidGains) -> Self {
        let gains = PidGains::new(
            gains.kp, gains.ki, gains.kd, gains.kf, gains.ks, gains.min, gains.max,
        );
        Self {
            clock,
            gains,
            integral: 0.0,
            previous_error: 0.0,
            previous_time: None,
            previous_ticks: None,
            previous_rate: 0.0,
        }
    }

    pub fn gains(&self) -> &PidGains {
        &self.gains
    }

    /// Accumulated integral (error x seconds)
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Forget integral, derivative and velocity history.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = 0.0;
        self.previous_time = None;
        self.previous_ticks = None;
        self.previous_rate = 0.0;
    }

    /// Position-mode output for `desired` against `current`.
    pub fn calculate_position(&mut self, desired: f64, current: f64) -> f64 {
        let now = self.clock.now_secs();
        let dt = self.dt_since_last(now);
        let output = self.step(desired, current, dt);
        self.previous_time = Some(now);
        output
    }

    /// Velocity-mode output.
    ///
    /// The measured rate is the tick delta since the previous call, scaled to
    /// [`REFERENCE_INTERVAL`] and divided by `ks` when `ks` is non-zero. With
    /// no previous sample the measured rate is taken as 0.
    pub fn calculate_velocity(&mut self, desired_rate: f64, current_ticks: f64) -> f64 {
        let now = self.clock.now_secs();
        let dt = self.dt_since_last(now);

        let rate = match (dt, self.previous_ticks) {
            (Some(dt), Some(previous)) => {
                let per_interval = (current_ticks - previous) * (REFERENCE_INTERVAL / dt);
                if self.gains.ks != 0.0 {
                    per_interval / self.gains.ks
                } else {
                    per_interval
                }
            }
            // Same-instant resample
            (None, Some(_)) => self.previous_rate,
            _ => 0.0,
        };
        self.previous_rate = rate;

        let output = self.step(desired_rate, rate, dt);
        self.previous_time = Some(now);
        self.previous_ticks = Some(current_ticks);
        output
    }

    fn dt_since_last(&self, now: f64) -> Option<f64> {
        self.previous_time
            .map(|previous| now - previous)
            .filter(|dt| *dt > MIN_DT)
    }

    fn step(&mut self, desired: f64, current: f64, dt: Option<f64>) -> f64 {
        let error = desired - current;
        let g = self.gains;

        let mut output = term(g.kp, error) + term(g.kf, desired);
        if let Some(dt) = dt {
            self.integral += error * dt;
            let derivative = (error - self.previous_error) / dt;
            output += term(g.ki, self.integral) + term(g.kd, derivative);
        } else {
            output += term(g.ki, self.integral);
        }
        if !self.integral.is_finite() {
            self.integral = 0.0;
        }
        self.previous_error = error;

        sanitize_output(output, g.min, g.max)
    }
}

/// `gain * value`, with a disabled (zero) gain contributing nothing even
/// for an infinite value.
fn term(gain: f64, value: f64) -> f64 {
    if gain == 0.0 {
        0.0
    } else {
        gain * value
    }
}

/// Replace NaN with 0.0, then clamp. Infinities saturate.
fn sanitize_output(value: f64, min: f64, max: f64) -> f64 {
    let value = if value.is_nan() { 0.0 } else { value };
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}
