//! Frame clock
//!
//! The host drives time explicitly by calling [`FrameClock::advance`] once per
//! frame. Velocity tracking and tweens read from this clock so behavior is
//! deterministic under test.

/// Monotonic per-viewport clock
#[derive(Clone, Debug)]
pub struct FrameClock {
    elapsed: f64,
    frame: u64,
    target_fps: u32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            frame: 0,
            target_fps: 60,
        }
    }

    pub fn set_target_fps(&mut self, fps: u32) {
        self.target_fps = fps.max(1);
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Advance by `dt` seconds. Negative deltas are ignored.
    pub fn advance(&mut self, dt: f64) {
        if dt > 0.0 && dt.is_finite() {
            self.elapsed += dt;
        } else if dt < 0.0 {
            tracing::trace!("ignoring negative frame delta {dt}");
        }
        self.frame += 1;
    }

    /// Seconds since the clock was created
    pub fn now(&self) -> f64 {
        self.elapsed
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Nominal seconds between frames
    pub fn frame_interval(&self) -> f64 {
        1.0 / self.target_fps as f64
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
