//! Canonical scroll position of a viewport
//!
//! Two offsets are tracked per axis. `offset` is the logical position and is
//! always inside `[0, overlap]`. `display` is where the content is actually
//! drawn; it leaves that range while a drag rubber-bands past an edge or a
//! release bounces back, and lags behind `offset` while a tween runs.

use glide_core::{Axis, Vec2};

use crate::config::ScrollDirection;

/// Offsets, sizes, and edge locks for one viewport
#[derive(Debug, Clone, PartialEq)]
pub struct PositionState {
    direction: ScrollDirection,
    content_size: Vec2,
    view_size: Vec2,
    overlap: Vec2,
    fixed_page_size: Option<Vec2>,
    /// Logical position, clamped to `[0, overlap]`
    pub offset: Vec2,
    /// Rendered position
    pub display: Vec2,
    pub loop_axis: Option<Axis>,
    /// Header kept revealed above the content (pull-to-refresh)
    pub header_locked: f64,
    /// Footer kept revealed below the content (pull-to-refresh)
    pub footer_locked: f64,
}

impl PositionState {
    pub fn new(direction: ScrollDirection) -> Self {
        Self {
            direction,
            content_size: Vec2::ZERO,
            view_size: Vec2::ZERO,
            overlap: Vec2::ZERO,
            fixed_page_size: None,
            offset: Vec2::ZERO,
            display: Vec2::ZERO,
            loop_axis: None,
            header_locked: 0.0,
            footer_locked: 0.0,
        }
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    pub fn content_size(&self) -> Vec2 {
        self.content_size
    }

    pub fn view_size(&self) -> Vec2 {
        self.view_size
    }

    pub fn overlap(&self) -> Vec2 {
        self.overlap
    }

    /// Axis pull-to-refresh headers and footers live on
    pub fn refresh_axis(&self) -> Axis {
        match self.direction {
            ScrollDirection::Horizontal => Axis::X,
            _ => Axis::Y,
        }
    }

    pub fn set_fixed_page_size(&mut self, size: Option<Vec2>) {
        self.fixed_page_size = size;
    }

    /// Size of one page: the view size unless a fixed unit is configured
    pub fn page_size(&self) -> Vec2 {
        self.fixed_page_size.unwrap_or(self.view_size)
    }

    /// Clamp a logical offset into `[0, overlap]`
    pub fn clamp(&self, axis: Axis, value: f64) -> f64 {
        value.clamp(0.0, self.overlap[axis])
    }

    /// Set the logical offset. Returns true if it changed.
    pub fn set_offset(&mut self, axis: Axis, value: f64) -> bool {
        let value = self.clamp(axis, value);
        if value == self.offset[axis] {
            return false;
        }
        self.offset[axis] = value;
        true
    }

    /// Whether the offset rests on the far edge of a scrollable axis
    pub fn is_pinned_end(&self, axis: Axis) -> bool {
        self.overlap[axis] > 0.0 && self.offset[axis] == self.overlap[axis]
    }

    /// Update content size. A viewport pinned to the far edge stays pinned.
    pub fn set_content_size(&mut self, size: Vec2) {
        self.resize_content(size, true);
    }

    /// Update content size, optionally keeping a far-edge pin
    pub fn resize_content(&mut self, size: Vec2, keep_pin: bool) {
        let pinned = Axis::BOTH.map(|axis| keep_pin && self.is_pinned_end(axis));
        self.content_size = size;
        self.recompute_overlap();
        for (axis, pinned) in Axis::BOTH.into_iter().zip(pinned) {
            self.offset[axis] = if pinned {
                self.overlap[axis]
            } else {
                self.clamp(axis, self.offset[axis])
            };
        }
    }

    /// Update view size and reclamp
    pub fn set_view_size(&mut self, size: Vec2) {
        self.view_size = size;
        self.recompute_overlap();
        for axis in Axis::BOTH {
            self.offset[axis] = self.clamp(axis, self.offset[axis]);
        }
    }

    fn recompute_overlap(&mut self) {
        for axis in Axis::BOTH {
            self.overlap[axis] = if self.direction.allows(axis) {
                (self.content_size[axis] - self.view_size[axis]).max(0.0)
            } else {
                0.0
            };
        }
    }

    /// Scroll progress in `[0, 1]`
    pub fn percent(&self, axis: Axis) -> f64 {
        if self.overlap[axis] == 0.0 {
            0.0
        } else {
            (self.offset[axis] / self.overlap[axis]).clamp(0.0, 1.0)
        }
    }

    /// Signed distance the display sits outside `[0, overlap]`
    pub fn overscroll(&self, axis: Axis) -> f64 {
        let d = self.display[axis];
        if d < 0.0 {
            d
        } else if d > self.overlap[axis] {
            d - self.overlap[axis]
        } else {
            0.0
        }
    }

    /// Farthest display offset past the end, honoring a locked footer
    pub fn footer_max(&self, axis: Axis) -> f64 {
        if self.footer_locked > 0.0 && axis == self.refresh_axis() {
            (self.content_size[axis] + self.footer_locked - self.view_size[axis]).max(0.0)
        } else {
            self.overlap[axis]
        }
    }

    /// Range a settled display may rest in
    pub fn display_bounds(&self, axis: Axis) -> (f64, f64) {
        let lo = if axis == self.refresh_axis() {
            -self.header_locked
        } else {
            0.0
        };
        (lo, self.footer_max(axis))
    }

    pub fn clamp_display(&self, axis: Axis, value: f64) -> f64 {
        let (lo, hi) = self.display_bounds(axis);
        value.clamp(lo, hi)
    }

    /// Whether the display rests outside the plain `[0, overlap]` range
    pub fn is_overscrolled(&self) -> bool {
        Axis::BOTH.iter().any(|&axis| self.overscroll(axis) != 0.0)
    }
}
