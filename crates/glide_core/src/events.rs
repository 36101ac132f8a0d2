//! Pointer events and event-type identifiers
//!
//! The scroller consumes a phase-ordered stream of pointer events per id and
//! emits scroll notifications identified by the constants in [`event_types`].

use crate::geometry::Vec2;

/// Event type identifier
pub type EventType = u32;

/// Common event types
pub mod event_types {
    use super::EventType;

    pub const POINTER_DOWN: EventType = 1;
    pub const POINTER_UP: EventType = 2;
    pub const POINTER_MOVE: EventType = 3;
    pub const POINTER_CANCEL: EventType = 4;
    /// Movement crossed the drag sensitivity threshold
    pub const DRAG: EventType = 6;
    /// Release handed over to inertia/alignment has finished
    pub const SETTLED: EventType = 7;

    pub const SCROLL: EventType = 30;
    pub const SCROLL_END: EventType = 31;
    pub const PULL_DOWN_RELEASE: EventType = 32;
    pub const PULL_UP_RELEASE: EventType = 33;
    pub const PAGE_CHANGED: EventType = 34;
    pub const DRAG_CANCEL: EventType = 35;
}

/// Phase of a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    Begin,
    Move,
    End,
    Cancel,
}

impl PointerPhase {
    /// Event type fed to state machines for this phase
    pub fn event_type(self) -> EventType {
        match self {
            PointerPhase::Begin => event_types::POINTER_DOWN,
            PointerPhase::Move => event_types::POINTER_MOVE,
            PointerPhase::End => event_types::POINTER_UP,
            PointerPhase::Cancel => event_types::POINTER_CANCEL,
        }
    }
}

/// Device that produced a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerSource {
    #[default]
    Mouse,
    Touch,
}

/// A single touch/mouse sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Touch id (mouse uses 0)
    pub id: u32,
    pub phase: PointerPhase,
    /// Position in global (screen) coordinates
    pub position: Vec2,
    /// Position in the viewport's local coordinates
    pub local: Vec2,
    /// Button index, 0 = primary
    pub button: u8,
    pub source: PointerSource,
}

impl PointerEvent {
    /// Create an event whose local and global positions coincide
    pub fn new(id: u32, phase: PointerPhase, position: Vec2) -> Self {
        Self {
            id,
            phase,
            position,
            local: position,
            button: 0,
            source: PointerSource::Mouse,
        }
    }

    pub fn touch(id: u32, phase: PointerPhase, position: Vec2) -> Self {
        Self {
            source: PointerSource::Touch,
            ..Self::new(id, phase, position)
        }
    }

    /// Override the local position (transformed or curved viewports)
    pub fn with_local(mut self, local: Vec2) -> Self {
        self.local = local;
        self
    }

    pub fn with_button(mut self, button: u8) -> Self {
        self.button = button;
        self
    }
}
