//! Glide Scroll
//!
//! Touch and mouse scrolling for retained-mode UI trees.
//!
//! # Features
//!
//! - **Scroll Pane**: drag tracking with rubber-banding, inertial release, bounce-back
//! - **Paging and Snapping**: page-mode alignment and snap-to-item targets
//! - **Pull to Refresh**: header/footer locks driven from release events
//! - **Looping**: endless scrolling over replicated content
//! - **Virtual Lists**: widget recycling over large item counts
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use glide_core::{GestureArbiter, Vec2};
//! use glide_scroll::{ScrollConfig, ScrollPane};
//!
//! let arbiter = Arc::new(GestureArbiter::new());
//! let mut pane = ScrollPane::new(ScrollConfig::default(), arbiter).unwrap();
//! pane.set_view_size(Vec2::new(300.0, 300.0));
//! pane.set_content_size(Vec2::new(300.0, 1000.0));
//! pane.set_pos_y(400.0, false);
//! pane.tick(1.0 / 60.0);
//! assert_eq!(pane.display().y, 400.0);
//! ```

pub mod align;
pub mod config;
pub mod error;
pub mod event;
pub mod gesture;
pub mod inertia;
pub mod list;
pub mod looping;
pub mod pane;
pub mod position;
pub mod scrollbar;
pub mod tween;

pub use config::{
    DeviceProfile, LoopMode, ScrollConfig, ScrollDirection, ScrollTuning, ScrollbarConfig,
    ScrollbarVisibility,
};
pub use error::{Result, ScrollError};
pub use event::{NoHost, ScrollEvent, ScrollEventKind, ScrollHost, ScrollRequest};
pub use gesture::GesturePhase;
pub use list::{
    ItemFactory, ListItem, ListLayout, Positionable, RecyclerStats, Resizable, ResourceId,
    SelectionChange, SelectionMode, VirtualList, WidgetKind,
};
pub use pane::ScrollPane;
pub use position::PositionState;
pub use scrollbar::{PageIndicator, ScrollBar};
pub use tween::TweenMode;
