//! Glide Core Runtime
//!
//! Foundational primitives shared by the Glide scrolling runtime:
//!
//! - **Geometry**: axis-indexed vectors and rectangles in `f64`
//! - **Pointer Events**: the phase-ordered touch/mouse stream the scroller consumes
//! - **Listeners**: ordered callback sets with explicit add/remove handles
//! - **Gesture Arbitration**: process-wide "who owns the drag" state
//! - **State Transitions**: event-driven state enums
//!
//! # Example
//!
//! ```rust
//! use glide_core::{Axis, ListenerSet, Vec2};
//!
//! let mut offset = Vec2::new(0.0, 120.0);
//! offset[Axis::X] = 40.0;
//! assert_eq!(offset.x, 40.0);
//!
//! let mut listeners: ListenerSet<f64> = ListenerSet::new();
//! let id = listeners.add(|value| *value += 1.0);
//! let mut value = 1.0;
//! listeners.emit(&mut value);
//! assert_eq!(value, 2.0);
//! assert!(listeners.remove(id));
//! ```

pub mod arbiter;
pub mod events;
pub mod geometry;
pub mod listeners;
pub mod state;

pub use arbiter::{GestureArbiter, ViewportId};
pub use events::{EventType, PointerEvent, PointerPhase, PointerSource};
pub use geometry::{Axis, Rect, Vec2};
pub use listeners::{ListenerId, ListenerSet};
pub use state::StateTransitions;
