//! Virtualized lists
//!
//! A [`VirtualList`] keeps one [`VirtualItemSlot`] per item but binds
//! widgets only to the items that intersect the view. Widgets leaving the
//! window are rebound to entering items or returned to the
//! [`ItemRecycler`] pool keyed by [`ResourceId`].

mod content;
mod item;
mod layout;
mod recycler;
mod virtual_list;

pub use content::{ItemProvider, ItemRenderer, MAX_FILL_ATTEMPTS};
pub use item::{ItemFactory, ListItem, Positionable, Resizable, ResourceId, WidgetKind};
pub use layout::{ListLayout, VirtualItemSlot, VirtualLayoutEngine};
pub use recycler::{ItemRecycler, RecyclerStats, WidgetId};
pub use virtual_list::{loop_mode_for, SelectionChange, SelectionMode, VirtualList};
