//! Release velocity to glide target
//!
//! Velocity decays by `deceleration_rate` every tick until it drops to the
//! terminal speed. The glide duration is the time that takes, and the glide
//! distance is the integral scaled by an empirical energy-loss factor.

use crate::config::{DeviceProfile, ScrollConfig, ScrollTuning};

/// Result of solving one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glide {
    pub target: f64,
    pub duration: f64,
    /// Velocity after dead-zone scaling
    pub velocity: f64,
}

/// Exponential-decay inertia model
#[derive(Debug, Clone, Copy)]
pub struct InertialSolver {
    deceleration_rate: f64,
    page_mode: bool,
    device: DeviceProfile,
    tuning: ScrollTuning,
}

impl InertialSolver {
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            deceleration_rate: config.deceleration_rate,
            page_mode: config.page_mode,
            device: config.device,
            tuning: config.tuning,
        }
    }

    pub fn min_duration(&self) -> f64 {
        self.tuning.min_tween_duration
    }

    fn dead_zone(&self) -> f64 {
        if self.page_mode || !self.device.touch_screen {
            self.tuning.mouse_dead_zone
        } else {
            self.tuning.touch_dead_zone
        }
    }

    /// Device-normalized speed
    fn normalized_speed(&self, velocity: f64, correction: f64) -> f64 {
        let mut speed = velocity.abs() * correction;
        if self.device.touch_screen {
            let screen = self.device.screen_width.max(self.device.screen_height);
            if screen > 0.0 {
                speed *= self.tuning.reference_resolution / screen;
            }
        }
        speed
    }

    /// Glide target and duration for a release at `release` on an axis with
    /// scrollable range `[0, overlap]`. An in-range release yields an
    /// unclamped target so a loop axis can wrap it first.
    pub fn solve_axis(&self, release: f64, velocity: f64, correction: f64, overlap: f64) -> Glide {
        let min = self.min_duration();
        if release < 0.0 {
            return Glide {
                target: 0.0,
                duration: min,
                velocity,
            };
        }
        if release > overlap {
            return Glide {
                target: overlap,
                duration: min,
                velocity,
            };
        }

        let mut speed = self.normalized_speed(velocity, correction);
        let threshold = self.dead_zone();
        let ratio = if speed > threshold {
            ((speed - threshold) / threshold).powi(2).min(1.0)
        } else {
            0.0
        };
        if ratio == 0.0 {
            return Glide {
                target: release,
                duration: min,
                velocity,
            };
        }

        speed *= ratio;
        let velocity = velocity * ratio;
        if speed <= self.tuning.terminal_speed {
            return Glide {
                target: release,
                duration: min,
                velocity,
            };
        }
        let duration = (self.tuning.terminal_speed / speed).ln()
            / self.deceleration_rate.ln()
            / self.tuning.tick_rate;
        let change = (velocity * duration * self.tuning.energy_loss).trunc();

        tracing::trace!(
            "inertia: speed {speed:.1} ratio {ratio:.3} change {change} over {duration:.3}s"
        );

        Glide {
            target: release + change,
            duration: duration.max(min),
            velocity,
        }
    }

    /// Shorten a glide proportionally when alignment reduced its distance
    pub fn fix_duration(&self, duration: f64, old_change: f64, new_change: f64) -> f64 {
        if new_change == 0.0 || new_change.abs() >= old_change.abs() {
            return duration;
        }
        ((new_change / old_change).abs() * duration).max(self.min_duration())
    }
}
