//! Fixed-timestep frame clock implementing the "Fix Your Timestep" pattern.
//!
//! Decouples simulation (fixed 60 Hz ticks) from rendering (variable rate)
//! using an accumulator. The per-tick motion increments are constants, so
//! perceived orbital speed is independent of the display's refresh rate.

use std::time::Instant;
use tracing::warn;

/// Fixed simulation timestep: 60 Hz.
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Maximum frame time clamp to prevent spiral of death.
/// If a frame takes longer than this, we clamp and accept slowdown
/// rather than trying to catch up with dozens of simulation steps.
pub const MAX_FRAME_TIME: f64 = 0.25; // 250ms = 4 FPS minimum

/// Fixed-timestep frame clock.
///
/// Call [`advance`](Self::advance) once per rendered frame; it measures the
/// elapsed wall-clock time and runs the update function once per elapsed
/// fixed step, returning the number of steps run.
pub struct FrameClock {
    previous_time: Instant,
    accumulator: f64,
    frame_count: u64,
    tick_count: u64,
}

impl FrameClock {
    /// Creates a new `FrameClock` starting from the current instant.
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            accumulator: 0.0,
            frame_count: 0,
            tick_count: 0,
        }
    }

    /// Measures elapsed time and runs zero or more fixed-rate simulation
    /// steps. Counts one rendered frame per call.
    pub fn advance(&mut self, update_fn: impl FnMut()) -> u32 {
        let current_time = Instant::now();
        let mut frame_time = current_time
            .duration_since(self.previous_time)
            .as_secs_f64();
        self.previous_time = current_time;

        // Clamp frame time to prevent spiral of death
        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            frame_time = MAX_FRAME_TIME;
        }

        self.advance_by(frame_time, update_fn)
    }

    /// Accumulate an explicit frame time and run the due simulation steps.
    /// Split out from [`advance`](Self::advance) for deterministic tests.
    fn advance_by(&mut self, frame_time: f64, mut update_fn: impl FnMut()) -> u32 {
        self.accumulator += frame_time;

        let mut steps = 0u32;
        while self.accumulator >= FIXED_DT {
            update_fn();
            self.accumulator -= FIXED_DT;
            self.tick_count += 1;
            steps += 1;
        }

        self.frame_count += 1;
        steps
    }

    /// Returns the total number of frames rendered.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Returns the total number of simulation ticks executed.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
