//! Timed tasks and the shared duration timer.

use super::ControlTask;
use crate::error::TaskResult;
use crate::operation::{OperationStateMap, OperationWriter};
use crate::traits::TimeSource;

/// Elapsed-time tracker for duration-bounded tasks.
///
/// Armed by [`TaskTimer::start`] from a task's `begin`. An unarmed timer
/// reports no elapsed time and never expires.
#[derive(Debug)]
pub struct TaskTimer<'a, T: TimeSource + ?Sized> {
    clock: &'a T,
    duration: f64,
    started_at: Option<f64>,
}

impl<'a, T: TimeSource + ?Sized> TaskTimer<'a, T> {
    /// Timer for `duration` seconds. Negative durations count as zero.
    pub fn new(clock: &'a T, duration: f64) -> Self {
        Self {
            clock,
            duration: if duration > 0.0 { duration } else { 0.0 },
            started_at: None,
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(self.clock.now_secs());
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Seconds since `start`
    pub fn elapsed(&self) -> f64 {
        match self.started_at {
            Some(start) => self.clock.now_secs() - start,
            None => 0.0,
        }
    }

    /// Elapsed fraction of the duration in `[0, 1]` (1 for a zero duration)
    pub fn ratio(&self) -> f64 {
        if self.started_at.is_none() {
            return 0.0;
        }
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed() / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_elapsed(&self) -> bool {
        self.started_at.is_some() && self.elapsed() >= self.duration
    }
}

/// Does nothing for a fixed duration.
///
/// Used as a start delay, a pause between moves and, with a zero
/// duration, as the pass-through filler routine.
#[derive(Debug)]
pub struct WaitTask<'a, T: TimeSource + ?Sized> {
    timer: TaskTimer<'a, T>,
}

impl<'a, T: TimeSource + ?Sized> WaitTask<'a, T> {
    pub fn new(clock: &'a T, duration: f64) -> Self {
        Self {
            timer: TaskTimer::new(clock, duration),
        }
    }
}

impl<T: TimeSource + ?Sized> ControlTask for WaitTask<'_, T> {
    fn name(&self) -> &'static str {
        "Wait"
    }

    fn begin(&mut self, _ops: &mut OperationWriter<'_>) -> TaskResult {
        self.timer.start();
        Ok(())
    }

    fn update(&mut self, _ops: &mut OperationWriter<'_>) -> TaskResult {
        Ok(())
    }

    fn has_completed(&self, _ops: &OperationStateMap) -> bool {
        self.timer.is_elapsed()
    }

    fn stop(&mut self, _ops: &mut OperationWriter<'_>) -> TaskResult {
        Ok(())
    }
}

/// Never completes. Paired with a real task inside AnyTasks.
#[derive(Debug, Default, Clone, Copy)]
pub struct WaitForeverTask;

impl ControlTask for WaitForeverTask {
    fn name(&self) -> &'static str {
        "WaitForever"
    }

    fn begin(&mut self, _ops: &mut OperationWriter<'_>) -> TaskResult {
        Ok(())
    }

    fn update(&mut self, _ops: &mut OperationWriter<'_>) -> TaskResult {
        Ok(())
    }

    fn has_completed(&self, _ops: &OperationStateMap) -> bool {
        false
    }

    fn stop(&mut self, _ops: &mut OperationWriter<'_>) -> TaskResult {
        Ok(())
    }
}
