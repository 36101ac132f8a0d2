//! Scrollbar and page-indicator projection
//!
//! The pane owns no drawing. Scrollbars and page indicators are collaborator
//! widgets that receive percentages, visibility, and page indices.

use glide_core::Axis;

use crate::config::{ScrollbarConfig, ScrollbarVisibility};
use crate::position::PositionState;

/// A scrollbar widget
pub trait ScrollBar {
    /// Thumb position in `[0, 1]`
    fn set_percent(&mut self, percent: f64);

    fn set_visible(&mut self, visible: bool);

    /// Thumb size as a fraction of the track
    fn set_display_percent(&mut self, _fraction: f64) {}
}

/// Receives the current page in page mode
pub trait PageIndicator {
    fn set_selected_index(&mut self, page: usize);
}

/// Projects a [`PositionState`] onto attached scrollbars
pub struct ScrollBarSync {
    config: ScrollbarConfig,
    vertical: Option<Box<dyn ScrollBar>>,
    horizontal: Option<Box<dyn ScrollBar>>,
    page_indicator: Option<Box<dyn PageIndicator>>,
    last_page: Option<usize>,
}

impl ScrollBarSync {
    pub fn new(config: ScrollbarConfig) -> Self {
        Self {
            config,
            vertical: None,
            horizontal: None,
            page_indicator: None,
            last_page: None,
        }
    }

    pub fn config(&self) -> &ScrollbarConfig {
        &self.config
    }

    pub fn set_scrollbar(&mut self, axis: Axis, bar: Option<Box<dyn ScrollBar>>) {
        match axis {
            Axis::X => self.horizontal = bar,
            Axis::Y => self.vertical = bar,
        }
    }

    pub fn set_page_indicator(&mut self, indicator: Option<Box<dyn PageIndicator>>) {
        self.page_indicator = indicator;
        self.last_page = None;
    }

    fn bars_mut(&mut self) -> impl Iterator<Item = (Axis, &mut Box<dyn ScrollBar>)> {
        self.horizontal
            .as_mut()
            .map(|bar| (Axis::X, bar))
            .into_iter()
            .chain(self.vertical.as_mut().map(|bar| (Axis::Y, bar)))
    }

    /// Thumb size after a content or view size change
    pub fn sync_size(&mut self, position: &PositionState) {
        let content = position.content_size();
        let view = position.view_size();
        for (axis, bar) in self.bars_mut() {
            if content[axis] > 0.0 {
                bar.set_display_percent((view[axis] / content[axis]).min(1.0));
            }
        }
    }

    /// Thumb position follows the rendered offset
    pub fn sync_pos(&mut self, position: &PositionState) {
        for (axis, bar) in self.bars_mut() {
            bar.set_percent(Self::display_percent(position, axis));
        }
    }

    pub fn display_percent(position: &PositionState, axis: Axis) -> f64 {
        let overlap = position.overlap()[axis];
        if overlap == 0.0 {
            0.0
        } else {
            position.display[axis].clamp(0.0, overlap) / overlap
        }
    }

    /// Whether the bar on `axis` should show. `active` is true while
    /// dragging or tweening.
    pub fn should_show(&self, position: &PositionState, axis: Axis, active: bool) -> bool {
        let scrollable = position.overlap()[axis] > 0.0;
        match self.config.visibility {
            ScrollbarVisibility::Always => !self.config.display_on_demand || scrollable,
            ScrollbarVisibility::Never => false,
            ScrollbarVisibility::Auto => active && scrollable,
        }
    }

    pub fn sync_visibility(&mut self, position: &PositionState, active: bool) {
        let show = Axis::BOTH.map(|axis| self.should_show(position, axis, active));
        for (axis, bar) in self.bars_mut() {
            bar.set_visible(show[axis as usize]);
        }
    }

    /// Forward a page change to the indicator. Returns true if it changed.
    pub fn sync_page(&mut self, page: usize) -> bool {
        if self.last_page == Some(page) {
            return false;
        }
        self.last_page = Some(page);
        if let Some(indicator) = self.page_indicator.as_mut() {
            indicator.set_selected_index(page);
        }
        true
    }

    /// Thumb length and leading position along `axis`, in view units
    pub fn thumb_dimensions(&self, position: &PositionState, axis: Axis) -> (f64, f64) {
        let viewport = position.view_size()[axis];
        let content = position.content_size()[axis].max(viewport);
        if viewport <= 0.0 {
            return (0.0, 0.0);
        }
        let padding = self.config.edge_padding;
        let track = (viewport - padding * 2.0).max(0.0);

        let thumb = (viewport / content * viewport)
            .max(self.config.min_thumb_length)
            .min(track);

        let progress = Self::display_percent(position, axis);
        (thumb, padding + progress * (track - thumb))
    }
}
