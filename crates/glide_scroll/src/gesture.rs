//! Pointer stream to drag offsets and release velocity
//!
//! The tracker owns the touch id it follows and ignores everything else, so a
//! noisy event source (an `End` without a `Begin`, a second finger) produces
//! no-ops rather than errors.

use glide_core::events::event_types::*;
use glide_core::{
    Axis, EventType, GestureArbiter, PointerEvent, PointerSource, StateTransitions, Vec2,
    ViewportId,
};

use crate::config::{ScrollConfig, ScrollDirection};
use crate::position::PositionState;

/// Gesture state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GesturePhase {
    #[default]
    Idle,
    /// Pointer down, movement still inside the sensitivity threshold
    Tracking,
    Dragging,
    /// Pointer released, inertia or alignment still running
    Releasing,
}

impl StateTransitions for GesturePhase {
    fn on_event(&self, event: EventType) -> Option<Self> {
        use GesturePhase::*;
        match (self, event) {
            (Idle, POINTER_DOWN) | (Releasing, POINTER_DOWN) => Some(Tracking),
            (Tracking, DRAG) => Some(Dragging),
            (Tracking, POINTER_UP) => Some(Idle),
            (Dragging, POINTER_UP) => Some(Releasing),
            (Tracking, POINTER_CANCEL) | (Dragging, POINTER_CANCEL) => Some(Idle),
            (Releasing, SETTLED) => Some(Idle),
            _ => None,
        }
    }
}

/// Per-gesture samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureState {
    pub tracking_touch_id: Option<u32>,
    pub start_pos: Vec2,
    pub last_pos: Vec2,
    pub last_global_pos: Vec2,
    pub last_timestamp: f64,
    /// Smoothed velocity in offset space (units/sec)
    pub velocity: Vec2,
    /// Ratio of global to local displacement
    pub velocity_scale_correction: f64,
    /// Movement crossed the sensitivity threshold
    pub hold_confirmed: bool,
    /// Display offset when the touch began
    pub drag_origin: Vec2,
    /// Axes another scroller was watching before a two-axis gesture
    /// marked its own, indexed by `Axis as usize`
    pub foreign_axes: Option<[bool; 2]>,
}

impl Default for GestureState {
    fn default() -> Self {
        Self {
            tracking_touch_id: None,
            start_pos: Vec2::ZERO,
            last_pos: Vec2::ZERO,
            last_global_pos: Vec2::ZERO,
            last_timestamp: 0.0,
            velocity: Vec2::ZERO,
            velocity_scale_correction: 1.0,
            hold_confirmed: false,
            drag_origin: Vec2::ZERO,
            foreign_axes: None,
        }
    }
}

/// Everything a move event needs to compute the new display offset
pub struct DragContext<'a> {
    pub config: &'a ScrollConfig,
    pub position: &'a PositionState,
    pub arbiter: &'a GestureArbiter,
    pub viewport: ViewportId,
    /// Header pull limit on the refresh axis (0 = view-based limit)
    pub header_reveal: f64,
    /// Footer pull limit on the refresh axis (0 = view-based limit)
    pub footer_reveal: f64,
}

/// Release hand-off to inertia
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Release {
    pub velocity: Vec2,
    pub velocity_scale_correction: f64,
    pub drag_origin: Vec2,
}

/// Converts pointer events into drag offsets and a release velocity
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    phase: GesturePhase,
    state: GestureState,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == GesturePhase::Dragging
    }

    /// Whether `id` is the touch being followed
    pub fn tracks(&self, id: u32) -> bool {
        self.state.tracking_touch_id == Some(id)
            && matches!(self.phase, GesturePhase::Tracking | GesturePhase::Dragging)
    }

    /// Start following a touch. Returns false if another touch is active.
    pub fn begin(&mut self, ev: &PointerEvent, display: Vec2, now: f64) -> bool {
        if matches!(self.phase, GesturePhase::Tracking | GesturePhase::Dragging) {
            return false;
        }
        self.state = GestureState {
            tracking_touch_id: Some(ev.id),
            start_pos: ev.local,
            last_pos: ev.local,
            last_global_pos: ev.position,
            last_timestamp: now,
            drag_origin: display,
            ..GestureState::default()
        };
        self.phase.transition(POINTER_DOWN);
        tracing::debug!("gesture begin: touch {} at {:?}", ev.id, ev.local);
        true
    }

    /// Process a move. Returns the new display offset once dragging.
    pub fn drag(&mut self, ev: &PointerEvent, now: f64, ctx: &DragContext<'_>) -> Option<Vec2> {
        if !self.tracks(ev.id) {
            return None;
        }
        if ctx.arbiter.is_claimed_by_other(ctx.viewport) {
            return None;
        }

        let pt = ev.local;
        let moved = pt - self.state.start_pos;
        let direction = ctx.config.direction;

        if !self.state.hold_confirmed {
            let sensitivity = match ev.source {
                PointerSource::Touch => ctx.config.tuning.touch_sensitivity,
                PointerSource::Mouse => ctx.config.tuning.mouse_sensitivity,
            };
            let foreign = &mut self.state.foreign_axes;
            if !Self::passes_threshold(direction, moved, sensitivity, ctx.arbiter, foreign) {
                return None;
            }
            if !ctx.arbiter.try_claim(ctx.viewport) {
                return None;
            }
            self.state.hold_confirmed = true;
            self.phase.transition(DRAG);
            tracing::debug!("gesture became drag after {:?}", moved);
        }

        let mut display = ctx.position.display;
        for axis in Axis::BOTH {
            if direction.allows(axis) {
                let raw = self.state.drag_origin[axis] - moved[axis];
                display[axis] = Self::rubber_band(axis, raw, ctx);
            }
        }

        self.track_velocity(ev, now, direction, ctx.config);
        Some(display)
    }

    /// Sensitivity and axis ownership test
    fn passes_threshold(
        direction: ScrollDirection,
        moved: Vec2,
        sensitivity: f64,
        arbiter: &GestureArbiter,
        foreign: &mut Option<[bool; 2]>,
    ) -> bool {
        let single = |main: Axis| {
            arbiter.mark_axis(main);
            let along = moved[main].abs();
            if along < sensitivity {
                return false;
            }
            // A nested scroller already watches the cross axis
            !(arbiter.is_axis_marked(main.cross()) && along < moved[main.cross()].abs())
        };
        match direction {
            ScrollDirection::None => false,
            ScrollDirection::Vertical => single(Axis::Y),
            ScrollDirection::Horizontal => single(Axis::X),
            ScrollDirection::Both => {
                let watched =
                    *foreign.get_or_insert_with(|| Axis::BOTH.map(|axis| arbiter.is_axis_marked(axis)));
                arbiter.mark_axis(Axis::X);
                arbiter.mark_axis(Axis::Y);
                let (x, y) = (moved.x.abs(), moved.y.abs());
                if x < sensitivity && y < sensitivity {
                    return false;
                }
                // The dominant axis belongs to a nested scroller already watching it
                let dominant = if y > x { Axis::Y } else { Axis::X };
                !watched[dominant as usize]
            }
        }
    }

    /// Damp displacement past an edge
    fn rubber_band(axis: Axis, raw: f64, ctx: &DragContext<'_>) -> f64 {
        let position = ctx.position;
        let overlap = position.overlap()[axis];
        let bounce = ctx.config.bounce_back;
        let pull_limit = ctx.config.tuning.pull_ratio * position.view_size()[axis];
        let on_refresh_axis = axis == position.refresh_axis();

        if raw < 0.0 {
            if !bounce {
                return 0.0;
            }
            let limit = if on_refresh_axis && ctx.header_reveal > 0.0 {
                ctx.header_reveal
            } else {
                pull_limit
            };
            (raw * 0.5).max(-limit)
        } else if raw > overlap {
            if !bounce {
                return overlap;
            }
            let limit = if on_refresh_axis && ctx.footer_reveal > 0.0 {
                ctx.footer_reveal
            } else {
                pull_limit
            };
            overlap + ((raw - overlap) * 0.5).min(limit)
        } else {
            raw
        }
    }

    fn track_velocity(
        &mut self,
        ev: &PointerEvent,
        now: f64,
        direction: ScrollDirection,
        config: &ScrollConfig,
    ) {
        let tuning = &config.tuning;
        let dt = (now - self.state.last_timestamp).max(1.0 / tuning.tick_rate);
        let mut delta = ev.local - self.state.last_pos;
        let mut global_delta = ev.position - self.state.last_global_pos;
        for axis in Axis::BOTH {
            if !direction.allows(axis) {
                delta[axis] = 0.0;
                global_delta[axis] = 0.0;
            }
        }

        let skipped = dt * tuning.tick_rate - 1.0;
        if skipped > 1.0 {
            self.state.velocity = self.state.velocity * tuning.velocity_decay.powf(skipped);
        }
        let lerp = (dt * 10.0).clamp(0.0, 1.0);
        // Finger motion and offset motion have opposite signs
        let sample = -delta * (1.0 / dt);
        self.state.velocity = self.state.velocity + (sample - self.state.velocity) * lerp;

        if delta.x != 0.0 {
            self.state.velocity_scale_correction = (global_delta.x / delta.x).abs();
        } else if delta.y != 0.0 {
            self.state.velocity_scale_correction = (global_delta.y / delta.y).abs();
        }

        self.state.last_pos = ev.local;
        self.state.last_global_pos = ev.position;
        self.state.last_timestamp = now;
    }

    /// Pointer up. Returns the release when a drag was in progress.
    pub fn release(&mut self, id: u32, now: f64, config: &ScrollConfig) -> Option<Release> {
        if !self.tracks(id) {
            return None;
        }
        let was_dragging = self.is_dragging();
        self.phase.transition(POINTER_UP);
        self.state.tracking_touch_id = None;
        if !was_dragging {
            return None;
        }

        let tuning = &config.tuning;
        let skipped = (now - self.state.last_timestamp) * tuning.tick_rate - 1.0;
        if skipped > 1.0 {
            self.state.velocity = self.state.velocity * tuning.velocity_decay.powf(skipped);
        }
        tracing::debug!("gesture release: velocity {:?}", self.state.velocity);

        Some(Release {
            velocity: self.state.velocity,
            velocity_scale_correction: self.state.velocity_scale_correction,
            drag_origin: self.state.drag_origin,
        })
    }

    /// Abort the gesture. Returns true if a touch was being followed.
    pub fn cancel(&mut self) -> bool {
        let active = matches!(self.phase, GesturePhase::Tracking | GesturePhase::Dragging);
        if active {
            self.phase.transition(POINTER_CANCEL);
        }
        self.state.tracking_touch_id = None;
        self.state.velocity = Vec2::ZERO;
        active
    }

    /// Motion started on release has finished
    pub fn settle(&mut self) {
        self.phase.transition(SETTLED);
    }

    /// Move the drag anchor (content resized under the finger)
    pub fn shift_origin(&mut self, delta: Vec2) {
        self.state.drag_origin += delta;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
