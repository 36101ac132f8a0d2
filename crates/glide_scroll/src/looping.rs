//! Offset wrapping for looped content
//!
//! Looped content is the logical content repeated [`LOOP_REPLICAS`] times.
//! Jumping by half the replicated size lands on an identical frame, so the
//! offset can be pulled back toward the middle whenever it nears an edge.

use glide_core::Axis;

/// Number of times a loop list repeats its items
pub const LOOP_REPLICAS: usize = 6;

/// Wraps offsets on the loop axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopWrapper {
    axis: Option<Axis>,
    epsilon: f64,
}

/// Replicated content along the loop axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSpan {
    /// Full replicated content size
    pub content: f64,
    /// Gap between items along the axis
    pub gap: f64,
    pub overlap: f64,
}

impl LoopSpan {
    /// `(content + gap) / division`
    pub fn part(&self, division: f64) -> f64 {
        (self.content + self.gap) / division
    }

    pub fn half(&self) -> f64 {
        self.part(2.0)
    }

    /// Size of one logical copy of the content
    pub fn period(&self) -> f64 {
        self.part(LOOP_REPLICAS as f64)
    }
}

impl LoopWrapper {
    pub fn new(axis: Option<Axis>, epsilon: f64) -> Self {
        Self { axis, epsilon }
    }

    pub fn axis(&self) -> Option<Axis> {
        self.axis
    }

    pub fn set_axis(&mut self, axis: Option<Axis>) {
        self.axis = axis;
    }

    pub fn applies_to(&self, axis: Axis) -> bool {
        self.axis == Some(axis)
    }

    /// Jump a resting offset away from the edges. Returns the new offset if
    /// it wrapped.
    pub fn check_current(&self, axis: Axis, offset: f64, span: LoopSpan) -> Option<f64> {
        if !self.applies_to(axis) || span.overlap <= 0.0 {
            return None;
        }
        if offset < self.epsilon {
            Some(offset + span.half())
        } else if offset > span.overlap - self.epsilon {
            Some(offset - span.half())
        } else {
            None
        }
    }

    /// Shift a tween's start and target together when the target would
    /// leave the range. Returns the adjusted `(start, target)`.
    pub fn check_target(&self, axis: Axis, start: f64, target: f64, span: LoopSpan) -> (f64, f64) {
        if !self.applies_to(axis) {
            return (start, target);
        }
        let half = span.half();
        let in_range = |v: f64| (0.0..=span.overlap).contains(&v);
        if target < 0.0 && in_range(start + half) {
            (start + half, target + half)
        } else if target > span.overlap && in_range(start - half) {
            (start - half, target - half)
        } else {
            (start, target)
        }
    }

    /// Wrap a requested offset. When the request wraps, the current offset
    /// is moved by whole periods toward it so an animation takes the short
    /// way. Returns `(value, moved_current)`.
    pub fn wrap_new_pos(
        &self,
        axis: Axis,
        value: f64,
        current: f64,
        span: LoopSpan,
    ) -> (f64, Option<f64>) {
        if !self.applies_to(axis) || span.overlap <= 0.0 {
            return (value, None);
        }
        let period = span.period();
        if value < self.epsilon {
            let value = value + span.half();
            if value > current && period > 0.0 {
                let jump = ((value - current) / period).ceil() * period;
                return (value, Some((current + jump).clamp(0.0, span.overlap)));
            }
            (value, None)
        } else if value > span.overlap - self.epsilon {
            let value = value - span.half();
            if value < current && period > 0.0 {
                let jump = ((current - value) / period).ceil() * period;
                return (value, Some((current - jump).clamp(0.0, span.overlap)));
            }
            (value, None)
        } else {
            (value, None)
        }
    }
}
