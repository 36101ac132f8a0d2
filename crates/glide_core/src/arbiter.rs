//! Gesture arbitration between viewports
//!
//! Only one viewport may be actively dragged at a time, and nested scrollers
//! need to know which axes are already being watched for a gesture. Both live
//! in a single `GestureArbiter` created at startup and injected into every
//! viewport (usually behind an `Arc`).

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use crate::geometry::Axis;

/// Identity of a viewport registered with the arbiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewportId(NonZeroU64);

impl ViewportId {
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

const AXIS_X: u8 = 0b10;
const AXIS_Y: u8 = 0b01;

fn axis_bit(axis: Axis) -> u8 {
    match axis {
        Axis::X => AXIS_X,
        Axis::Y => AXIS_Y,
    }
}

/// Process-wide drag ownership state
#[derive(Debug)]
pub struct GestureArbiter {
    next_id: AtomicU64,
    /// Viewport currently dragging (0 = none)
    active: AtomicU64,
    /// Axes on which some viewport is watching for a gesture
    axis_flags: AtomicU8,
}

impl GestureArbiter {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            active: AtomicU64::new(0),
            axis_flags: AtomicU8::new(0),
        }
    }

    /// Allocate an id for a new viewport
    pub fn register(&self) -> ViewportId {
        let raw = self.next_id.fetch_add(1, Ordering::Relaxed);
        // next_id starts at 1 and only grows
        ViewportId(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    /// Claim the drag for `id`. Succeeds if nobody else holds it.
    pub fn try_claim(&self, id: ViewportId) -> bool {
        match self
            .active
            .compare_exchange(0, id.get(), Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                tracing::trace!("viewport {} claimed drag", id.get());
                true
            }
            Err(current) => current == id.get(),
        }
    }

    /// Whether a different viewport currently owns the drag
    pub fn is_claimed_by_other(&self, id: ViewportId) -> bool {
        let current = self.active.load(Ordering::Acquire);
        current != 0 && current != id.get()
    }

    /// Release the drag if `id` owns it
    pub fn release(&self, id: ViewportId) {
        let _ = self
            .active
            .compare_exchange(id.get(), 0, Ordering::AcqRel, Ordering::Acquire);
    }

    pub fn active(&self) -> Option<ViewportId> {
        NonZeroU64::new(self.active.load(Ordering::Acquire)).map(ViewportId)
    }

    /// Record that some viewport is watching `axis` for a gesture
    pub fn mark_axis(&self, axis: Axis) {
        self.axis_flags.fetch_or(axis_bit(axis), Ordering::AcqRel);
    }

    pub fn is_axis_marked(&self, axis: Axis) -> bool {
        self.axis_flags.load(Ordering::Acquire) & axis_bit(axis) != 0
    }

    pub fn clear_axes(&self) {
        self.axis_flags.store(0, Ordering::Release);
    }

    /// Drop all drag state (shutdown or test isolation)
    pub fn reset(&self) {
        self.active.store(0, Ordering::Release);
        self.clear_axes();
    }
}

impl Default for GestureArbiter {
    fn default() -> Self {
        Self::new()
    }
}
