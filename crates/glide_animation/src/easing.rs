//! Easing functions for tweens

use serde::{Deserialize, Serialize};

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    QuadOut,
    /// `(t - 1)^3 + 1`, the standard scroll deceleration curve
    #[default]
    CubicOut,
    CubicInOut,
    QuartOut,
    Smoothstep,
}

impl Easing {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::CubicOut => {
                let p = t - 1.0;
                p * p * p + 1.0
            }
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::QuartOut => 1.0 - (1.0 - t).powi(4),
            Easing::Smoothstep => t * t * (3.0 - 2.0 * t),
        }
    }

    /// Eased progress for `elapsed` seconds into a `duration`-second tween.
    /// A non-positive duration is already complete.
    pub fn ease(&self, elapsed: f64, duration: f64) -> f64 {
        if duration <= 0.0 {
            return 1.0;
        }
        self.apply(elapsed / duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 6] = [
        Easing::Linear,
        Easing::QuadOut,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::QuartOut,
        Easing::Smoothstep,
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-12, "{easing:?}");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-12, "{easing:?}");
        }
    }

    #[test]
    fn test_cubic_out_midpoint() {
        assert!((Easing::CubicOut.apply(0.5) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn test_ease_zero_duration() {
        assert_eq!(Easing::CubicOut.ease(0.0, 0.0), 1.0);
        assert!((Easing::Linear.ease(0.25, 0.5) - 0.5).abs() < 1e-12);
    }
}
