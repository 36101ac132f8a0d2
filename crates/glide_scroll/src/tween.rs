//! Two-axis scroll tween with edge bounce

use glide_animation::{AxisTween, Easing};
use glide_core::{Axis, Vec2};

/// Kind of motion a tween represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TweenMode {
    #[default]
    None,
    /// Returning an overscrolled release to the edge; kill completes it
    SettleToEdge,
    /// Inertial glide after release; kill freezes it
    ReleaseGlide,
    /// Programmatic scroll to a caller target; kill completes it
    Locked,
}

impl TweenMode {
    /// Release tweens may be redirected into a bounce
    pub fn is_release(self) -> bool {
        matches!(self, TweenMode::SettleToEdge | TweenMode::ReleaseGlide)
    }
}

/// Range the display may settle in, per axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenBounds {
    pub lo: Vec2,
    pub hi: Vec2,
}

/// Bounce behavior at the bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceParams {
    pub enabled: bool,
    /// Overshoot that triggers a restart while still moving outward
    pub threshold: f64,
    pub duration: f64,
}

/// Drives the display offset toward a target
#[derive(Debug, Clone, Default)]
pub struct ScrollTween {
    mode: TweenMode,
    x: AxisTween,
    y: AxisTween,
    easing: Easing,
}

impl ScrollTween {
    pub fn new(easing: Easing) -> Self {
        Self {
            easing,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> TweenMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode != TweenMode::None
    }

    pub fn axis(&self, axis: Axis) -> &AxisTween {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    pub fn axis_mut(&mut self, axis: Axis) -> &mut AxisTween {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }

    pub fn start_pos(&self) -> Vec2 {
        Vec2::new(self.x.start, self.y.start)
    }

    pub fn target(&self) -> Vec2 {
        Vec2::new(self.x.target(), self.y.target())
    }

    pub fn change(&self) -> Vec2 {
        Vec2::new(self.x.change, self.y.change)
    }

    /// Begin a tween. Axes whose start equals the target stay settled.
    pub fn start(&mut self, mode: TweenMode, start: Vec2, target: Vec2, duration: Vec2) {
        self.mode = mode;
        for axis in Axis::BOTH {
            *self.axis_mut(axis) = AxisTween::new(start[axis], target[axis] - start[axis], duration[axis]);
        }
        tracing::debug!("tween {:?}: {:?} -> {:?}", mode, start, target);
    }

    /// Both axes have stopped moving
    pub fn is_settled(&self) -> bool {
        self.x.is_settled() && self.y.is_settled()
    }

    /// Advance one tick and return the new display offset. `display` is
    /// used for axes that are already settled.
    pub fn advance(&mut self, dt: f64, display: Vec2, bounds: TweenBounds, bounce: BounceParams) -> Vec2 {
        let mut out = display;
        if !self.is_active() {
            return out;
        }
        let bounce_enabled = bounce.enabled && self.mode.is_release();
        let easing = self.easing;
        for axis in Axis::BOTH {
            let (lo, hi) = (bounds.lo[axis], bounds.hi[axis]);
            let tween = self.axis_mut(axis);
            if tween.is_settled() {
                continue;
            }

            let mut value = tween.advance(dt, easing);
            if tween.is_finished() {
                value = tween.target();
                tween.start = value;
                tween.change = 0.0;
            }

            if bounce_enabled {
                let change = tween.change;
                if (value < lo - bounce.threshold && change < 0.0) || (value < lo && change == 0.0) {
                    *tween = AxisTween::new(value, lo - value, bounce.duration);
                    tracing::trace!("bounce back toward {lo} on {:?}", axis);
                } else if (value > hi + bounce.threshold && change > 0.0)
                    || (value > hi && change == 0.0)
                {
                    *tween = AxisTween::new(value, hi - value, bounce.duration);
                    tracing::trace!("bounce back toward {hi} on {:?}", axis);
                }
            } else if value < lo || value > hi {
                value = value.clamp(lo, hi);
                tween.start = value;
                tween.change = 0.0;
            }
            out[axis] = value;
        }
        out
    }

    /// Mark the tween finished once both axes settled. Returns true when
    /// this call ended it.
    pub fn finish_if_settled(&mut self) -> bool {
        if self.is_active() && self.is_settled() {
            self.mode = TweenMode::None;
            return true;
        }
        false
    }

    /// Stop immediately. Returns where the display should land, if it moves.
    pub fn kill(&mut self) -> Option<Vec2> {
        let mode = std::mem::take(&mut self.mode);
        let landing = match mode {
            TweenMode::None => None,
            TweenMode::Locked | TweenMode::SettleToEdge => Some(self.target()),
            TweenMode::ReleaseGlide => None,
        };
        self.x.settle();
        self.y.settle();
        if mode != TweenMode::None {
            tracing::debug!("tween {:?} killed", mode);
        }
        landing
    }
}
