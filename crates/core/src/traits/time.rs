//! Time abstraction for tick-driven control tasks.
//!
//! The scheduler, timed tasks and PID controllers never read a hardware
//! clock directly. They borrow a [`TimeSource`] so the same task tree runs
//! against the robot's monotonic timer or against [`MockTime`] in tests.

use core::cell::Cell;

/// Monotonic clock used by timed tasks and PID controllers.
///
/// Only monotonicity and stable units matter; there is no wall-clock
/// meaning attached to the readings.
///
/// # Example
///
/// ```
/// use taskloop_core::traits::{MockTime, TimeSource};
///
/// fn elapsed_secs<T: TimeSource>(time: &T, start_s: f64) -> f64 {
///     time.now_secs() - start_s
/// }
///
/// let time = MockTime::new();
/// let start = time.now_secs();
/// time.advance_ms(250);
/// assert!((elapsed_secs(&time, start) - 0.25).abs() < 1e-9);
/// ```
pub trait TimeSource {
    /// Returns current time in microseconds since system start.
    fn now_us(&self) -> u64;

    /// Returns current time in seconds as a float.
    fn now_secs(&self) -> f64 {
        self.now_us() as f64 / 1_000_000.0
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock time source for testing with controllable time advancement.
///
/// Tasks borrow the clock, so a test keeps its own reference and advances
/// time between scheduler ticks.
///
/// # Example
///
/// ```
/// use taskloop_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// assert_eq!(time.now_us(), 0);
///
/// time.advance(1000); // Advance 1ms
/// assert_eq!(time.now_us(), 1000);
/// assert!((time.now_secs() - 0.001).abs() < 1e-12);
/// ```
#[derive(Debug, Default)]
pub struct MockTime {
    current_us: Cell<u64>,
}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub fn new() -> Self {
        Self {
            current_us: Cell::new(0),
        }
    }

    /// Creates a new `MockTime` starting at the specified time.
    pub fn with_initial(us: u64) -> Self {
        Self {
            current_us: Cell::new(us),
        }
    }

    /// Sets the current time to an absolute value.
    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }

    /// Advances the current time by the specified amount of microseconds.
    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get() + us);
    }

    /// Advances the current time by the specified amount of milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(ms * 1000);
    }
}

impl TimeSource for MockTime {
    fn now_us(&self) -> u64 {
        self.current_us.get()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
