//! List item capabilities
//!
//! The list never inspects concrete widget types. It sizes and positions
//! items through [`Resizable`] and [`Positionable`], and asks
//! [`WidgetKind::is_selectable`] whether selection state applies.

use std::fmt;
use std::sync::Arc;

use glide_core::Vec2;

/// Identity of the resource a widget was created from
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(Arc<str>);

impl ResourceId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Something with a size
pub trait Resizable {
    fn size(&self) -> Vec2;

    fn set_size(&mut self, size: Vec2);
}

/// Something placed in content coordinates
pub trait Positionable {
    fn position(&self) -> Vec2;

    fn set_position(&mut self, position: Vec2);
}

/// Kind of widget an item is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WidgetKind {
    #[default]
    Plain,
    Label,
    Image,
    Button,
    Toggle,
    Container,
}

impl WidgetKind {
    /// Whether list selection is reflected on the widget
    pub fn is_selectable(self) -> bool {
        matches!(self, WidgetKind::Button | WidgetKind::Toggle)
    }
}

/// A widget the list can host
pub trait ListItem: Resizable + Positionable {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Plain
    }

    fn is_selected(&self) -> bool {
        false
    }

    fn set_selected(&mut self, _selected: bool) {}

    /// Pooled widgets are hidden, live ones shown
    fn set_visible(&mut self, _visible: bool) {}
}

/// Creates and destroys list widgets
pub trait ItemFactory {
    type Item: ListItem;

    fn create(&mut self, resource: &ResourceId) -> Self::Item;

    fn destroy(&mut self, _resource: &ResourceId, _item: Self::Item) {}
}
