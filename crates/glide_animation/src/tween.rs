//! Single-axis tweens
//!
//! A tween moves a value from `start` by `change` over `duration` seconds.
//! The scroll runtime rewrites `start` and `change` while a tween is running
//! (bounce restarts, content-size compensation), so all four fields are public.

use crate::easing::Easing;

/// Tween state for one axis
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AxisTween {
    pub start: f64,
    pub change: f64,
    pub duration: f64,
    pub elapsed: f64,
}

impl AxisTween {
    pub fn new(start: f64, change: f64, duration: f64) -> Self {
        Self {
            start,
            change,
            duration,
            elapsed: 0.0,
        }
    }

    /// An axis with no change does not move
    pub fn is_settled(&self) -> bool {
        self.change == 0.0
    }

    pub fn target(&self) -> f64 {
        self.start + self.change
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Value at the current elapsed time
    pub fn sample(&self, easing: Easing) -> f64 {
        if self.is_settled() {
            return self.start;
        }
        self.start + self.change * easing.ease(self.elapsed, self.duration)
    }

    /// Advance by `dt` seconds and return the new value
    pub fn advance(&mut self, dt: f64, easing: Easing) -> f64 {
        self.elapsed = (self.elapsed + dt).min(self.duration.max(0.0));
        self.sample(easing)
    }

    /// Replace start and change but keep the elapsed time
    pub fn retarget(&mut self, start: f64, change: f64) {
        self.start = start;
        self.change = change;
    }

    /// Start a fresh tween from `from` to `to`
    pub fn restart(&mut self, from: f64, to: f64, duration: f64) {
        *self = AxisTween::new(from, to - from, duration);
    }

    /// Stop moving. The caller decides where the value lands.
    pub fn settle(&mut self) {
        self.change = 0.0;
        self.elapsed = self.duration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_reaches_target() {
        let mut tween = AxisTween::new(100.0, 200.0, 0.5);
        let mut value = tween.start;
        for _ in 0..60 {
            value = tween.advance(1.0 / 60.0, Easing::CubicOut);
        }
        assert!(tween.is_finished());
        assert!((value - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_retarget_keeps_elapsed() {
        let mut tween = AxisTween::new(0.0, 100.0, 1.0);
        tween.advance(0.5, Easing::Linear);
        tween.retarget(50.0, 100.0);
        assert_eq!(tween.elapsed, 0.5);
        assert!((tween.sample(Easing::Linear) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_settle() {
        let mut tween = AxisTween::new(10.0, 5.0, 1.0);
        tween.settle();
        assert!(tween.is_settled());
        assert_eq!(tween.sample(Easing::CubicOut), 10.0);
    }
}
