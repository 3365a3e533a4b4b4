//! Tuning Parameter Definitions
//!
//! Every tunable constant used by the control tasks and the autonomous
//! routines, registered in a [`ParameterStore`] so a robot profile can
//! override them without rebuilding.
//!
//! # Parameters
//!
//! - `VIS_CTR_*` - In-place vision centering PID (P, I, D, F, MIN, MAX)
//! - `VIS_MCTR_*` - Centering PID used while advancing
//! - `VIS_ADV_*` - Forward PID used while advancing
//! - `VIS_CTR_TOL` / `VIS_CTR_DWELL` - Centered band (degrees) and dwell (s)
//! - `VIS_ADV_DIST` - Acceptable forward distance to the target
//! - `AUTO_*` - Start delay, drive durations and velocities
//! - `INTK_EXT_T` - Intake arm actuation time
//! - `SHOT_*` - Fire-sequence durations and close-shot flywheel speed
//! - `DRV_WHEELBASE` - Wheel base used for turn-by-angle arcs

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};
use crate::pid::PidGains;
use crate::tasks::CenteringConfig;

/// Velocity-mode scale for every PID loop built from these params
const PID_KS: f64 = 1.0;

/// Gain range accepted for P/I/D/F
const GAIN_RANGE: (f32, f32) = (0.0, 10.0);
/// Range accepted for PID lower bounds
const OUTPUT_MIN_RANGE: (f32, f32) = (-1.0, 0.0);
/// Range accepted for PID upper bounds
const OUTPUT_MAX_RANGE: (f32, f32) = (0.0, 1.0);
/// Any duration must fit in the autonomous period
const DURATION_RANGE: (f32, f32) = (0.0, 15.0);
/// Motor power range
const POWER_RANGE: (f32, f32) = (-1.0, 1.0);
const TOLERANCE_RANGE: (f32, f32) = (0.1, 45.0);
const DWELL_RANGE: (f32, f32) = (0.0, 5.0);
const DISTANCE_RANGE: (f32, f32) = (0.0, 500.0);
const WHEEL_BASE_RANGE: (f32, f32) = (1.0, 500.0);

/// Gains and clamp for one PID loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidParams {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    pub kf: f32,
    pub min: f32,
    pub max: f32,
}

impl PidParams {
    const fn new(kp: f32, ki: f32, kd: f32, kf: f32, min: f32, max: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            kf,
            min,
            max,
        }
    }

    pub fn gains(&self) -> PidGains {
        PidGains::new(
            f64::from(self.kp),
            f64::from(self.ki),
            f64::from(self.kd),
            f64::from(self.kf),
            PID_KS,
            f64::from(self.min),
            f64::from(self.max),
        )
    }

    fn is_valid(&self) -> bool {
        [self.kp, self.ki, self.kd, self.kf]
            .iter()
            .all(|g| in_range(*g, GAIN_RANGE))
            && in_range(self.min, OUTPUT_MIN_RANGE)
            && in_range(self.max, OUTPUT_MAX_RANGE)
            && self.min < self.max
    }
}

/// Store names for one PID loop
struct PidNames {
    p: &'static str,
    i: &'static str,
    d: &'static str,
    f: &'static str,
    min: &'static str,
    max: &'static str,
}

const CENTERING_NAMES: PidNames = PidNames {
    p: "VIS_CTR_P",
    i: "VIS_CTR_I",
    d: "VIS_CTR_D",
    f: "VIS_CTR_F",
    min: "VIS_CTR_MIN",
    max: "VIS_CTR_MAX",
};

const MOVING_CENTERING_NAMES: PidNames = PidNames {
    p: "VIS_MCTR_P",
    i: "VIS_MCTR_I",
    d: "VIS_MCTR_D",
    f: "VIS_MCTR_F",
    min: "VIS_MCTR_MIN",
    max: "VIS_MCTR_MAX",
};

const ADVANCING_NAMES: PidNames = PidNames {
    p: "VIS_ADV_P",
    i: "VIS_ADV_I",
    d: "VIS_ADV_D",
    f: "VIS_ADV_F",
    min: "VIS_ADV_MIN",
    max: "VIS_ADV_MAX",
};

const DEFAULT_CENTERING: PidParams = PidParams::new(0.065, 0.0, 0.0, 0.0, -0.3, 0.3);
const DEFAULT_MOVING_CENTERING: PidParams = PidParams::new(0.04, 0.0, 0.0, 0.0, -0.2, 0.2);
const DEFAULT_ADVANCING: PidParams = PidParams::new(0.015, 0.0, 0.0, 0.0, -0.2, 0.4);

const DEFAULT_TOLERANCE: f32 = 2.0;
const DEFAULT_DWELL: f32 = 1.0;
const DEFAULT_MAX_DISTANCE: f32 = 24.0;
const DEFAULT_START_DELAY: f32 = 8.0;
const DEFAULT_TIME_SLOW: f32 = 4.0;
const DEFAULT_TIME_FAST: f32 = 2.0;
const DEFAULT_VELOCITY_SLOW: f32 = 0.4;
const DEFAULT_VELOCITY_FAST: f32 = 0.8;
const DEFAULT_INTAKE_EXTEND: f32 = 0.5;
const DEFAULT_KICKER: f32 = 0.25;
const DEFAULT_SPIN_UP: f32 = 1.5;
const DEFAULT_FIRE: f32 = 0.5;
const DEFAULT_SPIN_DOWN: f32 = 0.5;
const DEFAULT_CLOSE_SHOT: f32 = 0.7;
const DEFAULT_WHEEL_BASE: f32 = 58.0;

/// Tunable constants loaded from the parameter store
#[derive(Debug, Clone, PartialEq)]
pub struct TuningParams {
    /// In-place vision centering loop
    pub centering: PidParams,
    /// Centering loop used while advancing
    pub moving_centering: PidParams,
    /// Forward loop used while advancing
    pub advancing: PidParams,
    /// Degrees
    pub centering_tolerance: f32,
    /// Seconds
    pub centering_dwell: f32,
    pub max_forward_distance: f32,
    pub start_delay: f32,
    pub drive_time_slow: f32,
    pub drive_time_fast: f32,
    pub drive_velocity_slow: f32,
    pub drive_velocity_fast: f32,
    pub intake_extend_duration: f32,
    pub kicker_duration: f32,
    pub spin_up_duration: f32,
    pub fire_duration: f32,
    pub spin_down_duration: f32,
    pub close_shot_velocity: f32,
    pub wheel_base: f32,
}

impl Default for TuningParams {
    fn default() -> Self {
        Self {
            centering: DEFAULT_CENTERING,
            moving_centering: DEFAULT_MOVING_CENTERING,
            advancing: DEFAULT_ADVANCING,
            centering_tolerance: DEFAULT_TOLERANCE,
            centering_dwell: DEFAULT_DWELL,
            max_forward_distance: DEFAULT_MAX_DISTANCE,
            start_delay: DEFAULT_START_DELAY,
            drive_time_slow: DEFAULT_TIME_SLOW,
            drive_time_fast: DEFAULT_TIME_FAST,
            drive_velocity_slow: DEFAULT_VELOCITY_SLOW,
            drive_velocity_fast: DEFAULT_VELOCITY_FAST,
            intake_extend_duration: DEFAULT_INTAKE_EXTEND,
            kicker_duration: DEFAULT_KICKER,
            spin_up_duration: DEFAULT_SPIN_UP,
            fire_duration: DEFAULT_FIRE,
            spin_down_duration: DEFAULT_SPIN_DOWN,
            close_shot_velocity: DEFAULT_CLOSE_SHOT,
            wheel_base: DEFAULT_WHEEL_BASE,
        }
    }
}

const SCALARS: [(&str, f32); 15] = [
    ("VIS_CTR_TOL", DEFAULT_TOLERANCE),
    ("VIS_CTR_DWELL", DEFAULT_DWELL),
    ("VIS_ADV_DIST", DEFAULT_MAX_DISTANCE),
    ("AUTO_DELAY", DEFAULT_START_DELAY),
    ("AUTO_T_SLOW", DEFAULT_TIME_SLOW),
    ("AUTO_T_FAST", DEFAULT_TIME_FAST),
    ("AUTO_V_SLOW", DEFAULT_VELOCITY_SLOW),
    ("AUTO_V_FAST", DEFAULT_VELOCITY_FAST),
    ("INTK_EXT_T", DEFAULT_INTAKE_EXTEND),
    ("SHOT_KICK_T", DEFAULT_KICKER),
    ("SHOT_SPIN_T", DEFAULT_SPIN_UP),
    ("SHOT_FIRE_T", DEFAULT_FIRE),
    ("SHOT_REV_T", DEFAULT_SPIN_DOWN),
    ("SHOT_CLOSE_V", DEFAULT_CLOSE_SHOT),
    ("DRV_WHEELBASE", DEFAULT_WHEEL_BASE),
];

impl TuningParams {
    /// Register tuning parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        register_pid(store, &CENTERING_NAMES, &DEFAULT_CENTERING)?;
        register_pid(store, &MOVING_CENTERING_NAMES, &DEFAULT_MOVING_CENTERING)?;
        register_pid(store, &ADVANCING_NAMES, &DEFAULT_ADVANCING)?;

        for (name, default) in SCALARS {
            store.register(name, ParamValue::Float(default), ParamFlags::empty())?;
        }
        Ok(())
    }

    /// Load tuning parameters from the store
    ///
    /// Missing or mistyped entries fall back to defaults; out-of-range
    /// values are clamped.
    pub fn from_store(store: &ParameterStore) -> Self {
        let f = |name, default, range| read_float(store, name, default, range);

        Self {
            centering: load_pid(store, &CENTERING_NAMES, &DEFAULT_CENTERING),
            moving_centering: load_pid(store, &MOVING_CENTERING_NAMES, &DEFAULT_MOVING_CENTERING),
            advancing: load_pid(store, &ADVANCING_NAMES, &DEFAULT_ADVANCING),
            centering_tolerance: f("VIS_CTR_TOL", DEFAULT_TOLERANCE, TOLERANCE_RANGE),
            centering_dwell: f("VIS_CTR_DWELL", DEFAULT_DWELL, DWELL_RANGE),
            max_forward_distance: f("VIS_ADV_DIST", DEFAULT_MAX_DISTANCE, DISTANCE_RANGE),
            start_delay: f("AUTO_DELAY", DEFAULT_START_DELAY, DURATION_RANGE),
            drive_time_slow: f("AUTO_T_SLOW", DEFAULT_TIME_SLOW, DURATION_RANGE),
            drive_time_fast: f("AUTO_T_FAST", DEFAULT_TIME_FAST, DURATION_RANGE),
            drive_velocity_slow: f("AUTO_V_SLOW", DEFAULT_VELOCITY_SLOW, POWER_RANGE),
            drive_velocity_fast: f("AUTO_V_FAST", DEFAULT_VELOCITY_FAST, POWER_RANGE),
            intake_extend_duration: f("INTK_EXT_T", DEFAULT_INTAKE_EXTEND, DURATION_RANGE),
            kicker_duration: f("SHOT_KICK_T", DEFAULT_KICKER, DURATION_RANGE),
            spin_up_duration: f("SHOT_SPIN_T", DEFAULT_SPIN_UP, DURATION_RANGE),
            fire_duration: f("SHOT_FIRE_T", DEFAULT_FIRE, DURATION_RANGE),
            spin_down_duration: f("SHOT_REV_T", DEFAULT_SPIN_DOWN, DURATION_RANGE),
            close_shot_velocity: f("SHOT_CLOSE_V", DEFAULT_CLOSE_SHOT, POWER_RANGE),
            wheel_base: f("DRV_WHEELBASE", DEFAULT_WHEEL_BASE, WHEEL_BASE_RANGE),
        }
    }

    /// Validate tuning parameters
    pub fn is_valid(&self) -> bool {
        let durations = [
            self.start_delay,
            self.drive_time_slow,
            self.drive_time_fast,
            self.intake_extend_duration,
            self.kicker_duration,
            self.spin_up_duration,
            self.fire_duration,
            self.spin_down_duration,
        ];
        let powers = [
            self.drive_velocity_slow,
            self.drive_velocity_fast,
            self.close_shot_velocity,
        ];

        self.centering.is_valid()
            && self.moving_centering.is_valid()
            && self.advancing.is_valid()
            && in_range(self.centering_tolerance, TOLERANCE_RANGE)
            && in_range(self.centering_dwell, DWELL_RANGE)
            && in_range(self.max_forward_distance, DISTANCE_RANGE)
            && durations.iter().all(|d| in_range(*d, DURATION_RANGE))
            && powers.iter().all(|p| in_range(*p, POWER_RANGE))
            && in_range(self.wheel_base, WHEEL_BASE_RANGE)
    }

    /// In-place centering loop and settle criteria
    pub fn centering_config(&self) -> CenteringConfig {
        CenteringConfig {
            gains: self.centering.gains(),
            tolerance: f64::from(self.centering_tolerance),
            dwell: f64::from(self.centering_dwell),
        }
    }

    /// Centering loop used while advancing
    pub fn moving_centering_config(&self) -> CenteringConfig {
        CenteringConfig {
            gains: self.moving_centering.gains(),
            ..self.centering_config()
        }
    }

    pub fn advancing_gains(&self) -> PidGains {
        self.advancing.gains()
    }
}

fn in_range(value: f32, (min, max): (f32, f32)) -> bool {
    value >= min && value <= max
}

fn register_pid(
    store: &mut ParameterStore,
    names: &PidNames,
    defaults: &PidParams,
) -> Result<(), ParameterError> {
    let entries = [
        (names.p, defaults.kp),
        (names.i, defaults.ki),
        (names.d, defaults.kd),
        (names.f, defaults.kf),
        (names.min, defaults.min),
        (names.max, defaults.max),
    ];
    for (name, value) in entries {
        store.register(name, ParamValue::Float(value), ParamFlags::empty())?;
    }
    Ok(())
}

fn load_pid(store: &ParameterStore, names: &PidNames, defaults: &PidParams) -> PidParams {
    let mut params = PidParams {
        kp: read_float(store, names.p, defaults.kp, GAIN_RANGE),
        ki: read_float(store, names.i, defaults.ki, GAIN_RANGE),
        kd: read_float(store, names.d, defaults.kd, GAIN_RANGE),
        kf: read_float(store, names.f, defaults.kf, GAIN_RANGE),
        min: read_float(store, names.min, defaults.min, OUTPUT_MIN_RANGE),
        max: read_float(store, names.max, defaults.max, OUTPUT_MAX_RANGE),
    };
    // A collapsed clamp would pin the output; keep the default band instead
    if params.min >= params.max {
        crate::log_warn!("{}: empty output range, using defaults", names.p);
        params.min = defaults.min;
        params.max = defaults.max;
    }
    params
}

fn read_float(store: &ParameterStore, name: &str, default: f32, range: (f32, f32)) -> f32 {
    let value = match store.get(name) {
        Some(ParamValue::Float(v)) => *v,
        Some(ParamValue::Int(v)) => *v as f32,
        _ => return default,
    };
    if !value.is_finite() {
        return default;
    }
    let clamped = value.clamp(range.0, range.1);
    if clamped != value {
        crate::log_warn!("{} = {} out of range, clamped to {}", name, value, clamped);
    }
    clamped
}
