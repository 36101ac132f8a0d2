//! Event-driven state enums
//!
//! Interaction states are plain enums that map an incoming event type to the
//! next state:
//!
//! ```ignore
//! use glide_core::events::event_types::*;
//!
//! impl StateTransitions for DragState {
//!     fn on_event(&self, event: u32) -> Option<Self> {
//!         match (self, event) {
//!             (DragState::Idle, POINTER_DOWN) => Some(DragState::Pressed),
//!             (DragState::Pressed, POINTER_UP) => Some(DragState::Idle),
//!             _ => None,
//!         }
//!     }
//! }
//! ```

use std::hash::Hash;

use crate::events::EventType;

/// Trait for state types that transition on events
pub trait StateTransitions: Clone + Copy + PartialEq + Eq + Hash + std::fmt::Debug + 'static {
    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: EventType) -> Option<Self>;

    /// Apply an event in place. Returns true if the state changed.
    fn transition(&mut self, event: EventType) -> bool {
        match self.on_event(event) {
            Some(next) if next != *self => {
                *self = next;
                true
            }
            _ => false,
        }
    }
}
