//! Virtual item geometry
//!
//! Every logical item has a [`VirtualItemSlot`] holding its last measured
//! size, its selection flag, and the widget currently bound to it if it is
//! inside the visible window. Positions are never stored; they are
//! accumulated from slot sizes and gaps line by line.

use glide_core::{Axis, Rect, Vec2};
use serde::{Deserialize, Serialize};

use super::recycler::WidgetId;
use crate::align::should_snap_to_next;

/// How items are arranged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListLayout {
    /// One item per row, scrolling vertically
    #[default]
    SingleColumn,
    /// One item per column, scrolling horizontally
    SingleRow,
    /// Rows of several items, scrolling vertically
    FlowHorizontal,
    /// Columns of several items, scrolling horizontally
    FlowVertical,
    /// Pages of rows, one view wide each, scrolling horizontally
    Pagination,
}

impl ListLayout {
    /// Axis the list scrolls along
    pub fn main_axis(self) -> Axis {
        match self {
            ListLayout::SingleColumn | ListLayout::FlowHorizontal => Axis::Y,
            ListLayout::SingleRow | ListLayout::FlowVertical | ListLayout::Pagination => Axis::X,
        }
    }

    pub fn is_flow(self) -> bool {
        matches!(self, ListLayout::FlowHorizontal | ListLayout::FlowVertical)
    }

    pub fn is_single(self) -> bool {
        matches!(self, ListLayout::SingleColumn | ListLayout::SingleRow)
    }
}

/// Per-item record of a virtual list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualItemSlot {
    pub widget: Option<WidgetId>,
    /// Last measured size, rounded up
    pub size: Vec2,
    pub selected: bool,
    /// Refresh pass that last touched this slot
    pub generation: u32,
}

impl VirtualItemSlot {
    fn new(size: Vec2) -> Self {
        Self {
            widget: None,
            size,
            selected: false,
            generation: 0,
        }
    }
}

fn fit_count(view: f64, item: f64, gap: f64) -> usize {
    let unit = item + gap;
    if unit <= 0.0 {
        return 1;
    }
    ((view + gap) / unit).floor().max(1.0) as usize
}

/// Slot storage plus the arithmetic that maps offsets to items
#[derive(Debug, Clone)]
pub struct VirtualLayoutEngine {
    layout: ListLayout,
    item_size: Vec2,
    line_gap: f64,
    column_gap: f64,
    column_count: usize,
    line_count: usize,
    auto_resize: bool,
    slots: Vec<VirtualItemSlot>,
    real_count: usize,
    logical_count: usize,
    /// Items per line
    line_items: usize,
    /// Lines per page (pagination only)
    page_lines: usize,
    first_index: usize,
    first_pos: f64,
    live: Vec<usize>,
    generation: u32,
}

impl VirtualLayoutEngine {
    pub fn new(layout: ListLayout, item_size: Vec2) -> Self {
        Self {
            layout,
            item_size,
            line_gap: 0.0,
            column_gap: 0.0,
            column_count: 0,
            line_count: 0,
            auto_resize: true,
            slots: Vec::new(),
            real_count: 0,
            logical_count: 0,
            line_items: 1,
            page_lines: 1,
            first_index: 0,
            first_pos: 0.0,
            live: Vec::new(),
            generation: 0,
        }
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    pub fn layout(&self) -> ListLayout {
        self.layout
    }

    pub fn set_layout(&mut self, layout: ListLayout) {
        self.layout = layout;
    }

    pub fn item_size(&self) -> Vec2 {
        self.item_size
    }

    /// Default size of items that were never measured
    pub fn set_item_size(&mut self, size: Vec2) {
        self.item_size = size;
    }

    pub fn line_gap(&self) -> f64 {
        self.line_gap
    }

    pub fn set_line_gap(&mut self, gap: f64) {
        self.line_gap = gap;
    }

    pub fn column_gap(&self) -> f64 {
        self.column_gap
    }

    pub fn set_column_gap(&mut self, gap: f64) {
        self.column_gap = gap;
    }

    /// Fixed columns per row (0 = fit to view)
    pub fn set_column_count(&mut self, count: usize) {
        self.column_count = count;
    }

    /// Fixed lines per column or page (0 = fit to view)
    pub fn set_line_count(&mut self, count: usize) {
        self.line_count = count;
    }

    pub fn auto_resize(&self) -> bool {
        self.auto_resize
    }

    /// Stretch items across the cross axis when the line count is known
    pub fn set_auto_resize(&mut self, enabled: bool) {
        self.auto_resize = enabled;
    }

    /// Gap between consecutive lines along the scroll axis
    pub fn main_gap(&self) -> f64 {
        match self.layout.main_axis() {
            Axis::Y => self.line_gap,
            Axis::X => self.column_gap,
        }
    }

    /// Gap between items within a line
    pub fn cross_gap(&self) -> f64 {
        match self.layout.main_axis() {
            Axis::Y => self.column_gap,
            Axis::X => self.line_gap,
        }
    }

    // =========================================================================
    // Slots
    // =========================================================================

    /// Resize to `real` slots (`logical` distinct items). Slots are never
    /// dropped; selection beyond the new count is cleared.
    pub fn set_item_count(&mut self, real: usize, logical: usize) {
        if real > self.slots.len() {
            let size = self.item_size;
            self.slots.resize_with(real, || VirtualItemSlot::new(size));
        } else {
            for slot in &mut self.slots[real..] {
                slot.selected = false;
            }
        }
        self.real_count = real;
        self.logical_count = logical;
    }

    pub fn real_count(&self) -> usize {
        self.real_count
    }

    pub fn logical_count(&self) -> usize {
        self.logical_count
    }

    pub fn logical_index(&self, real: usize) -> usize {
        if self.logical_count == 0 {
            real
        } else {
            real % self.logical_count
        }
    }

    pub fn slot(&self, index: usize) -> Option<&VirtualItemSlot> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut VirtualItemSlot> {
        self.slots.get_mut(index)
    }

    /// Real indices of every replica of a logical item
    pub fn replicas(&self, logical: usize) -> impl Iterator<Item = usize> {
        let step = self.logical_count.max(1);
        (logical..self.real_count).step_by(step)
    }

    pub fn next_generation(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    // =========================================================================
    // Visible window
    // =========================================================================

    pub fn first_index(&self) -> usize {
        self.first_index
    }

    /// Main-axis position of the first live line
    pub fn first_pos(&self) -> f64 {
        self.first_pos
    }

    /// Real indices that currently hold a widget, ascending
    pub fn live(&self) -> &[usize] {
        &self.live
    }

    pub fn take_live(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.live)
    }

    pub fn set_window(&mut self, first_index: usize, first_pos: f64, live: Vec<usize>) {
        self.first_index = first_index;
        self.first_pos = first_pos;
        self.live = live;
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    pub fn line_items(&self) -> usize {
        self.line_items
    }

    pub fn page_lines(&self) -> usize {
        self.page_lines
    }

    /// Recompute items per line (and lines per page) for a view size
    pub fn update_line_items(&mut self, view: Vec2) {
        let item = self.item_size;
        match self.layout {
            ListLayout::SingleColumn | ListLayout::SingleRow => {
                self.line_items = 1;
                self.page_lines = 1;
            }
            ListLayout::FlowHorizontal => {
                self.line_items = if self.column_count > 0 {
                    self.column_count
                } else {
                    fit_count(view.x, item.x, self.column_gap)
                };
            }
            ListLayout::FlowVertical => {
                self.line_items = if self.line_count > 0 {
                    self.line_count
                } else {
                    fit_count(view.y, item.y, self.line_gap)
                };
            }
            ListLayout::Pagination => {
                self.line_items = if self.column_count > 0 {
                    self.column_count
                } else {
                    fit_count(view.x, item.x, self.column_gap)
                };
                self.page_lines = if self.line_count > 0 {
                    self.line_count
                } else {
                    fit_count(view.y, item.y, self.line_gap)
                };
            }
        }
    }

    /// Cross-axis size of a stretched item in a line layout
    pub fn part_size(&self, view: Vec2) -> f64 {
        let cross = self.layout.main_axis().cross();
        let n = self.line_items as f64;
        ((view[cross] - self.cross_gap() * (n - 1.0)) / n).trunc()
    }

    /// Cell size of a stretched item on a page
    pub fn page_part_size(&self, view: Vec2) -> Vec2 {
        let cols = self.line_items as f64;
        let lines = self.page_lines as f64;
        Vec2::new(
            ((view.x - self.column_gap * (cols - 1.0)) / cols).trunc(),
            ((view.y - self.line_gap * (lines - 1.0)) / lines).trunc(),
        )
    }

    /// Whether items of a line layout are stretched to the part size
    pub fn stretches_lines(&self) -> bool {
        if !self.auto_resize {
            return false;
        }
        match self.layout {
            ListLayout::SingleColumn | ListLayout::SingleRow => true,
            ListLayout::FlowHorizontal => self.column_count > 0,
            ListLayout::FlowVertical => self.line_count > 0,
            ListLayout::Pagination => false,
        }
    }

    /// Which axes of a page cell are stretched
    pub fn stretches_page(&self) -> (bool, bool) {
        if !self.auto_resize || self.layout != ListLayout::Pagination {
            return (false, false);
        }
        (self.column_count > 0, self.line_count > 0)
    }

    /// Content size implied by the measured slots
    pub fn content_size(&self, view: Vec2) -> Vec2 {
        if self.real_count == 0 {
            return Vec2::ZERO;
        }
        let n = self.line_items;
        let real = self.real_count;

        if self.layout == ListLayout::Pagination {
            let per_page = n * self.page_lines;
            let pages = real.div_ceil(per_page);
            return Vec2::new(pages as f64 * view.x, view.y);
        }

        let axis = self.layout.main_axis();
        let cross = axis.cross();
        let mut main: f64 = (0..real)
            .step_by(n)
            .map(|i| self.slots[i].size[axis] + self.main_gap())
            .sum();
        if main > 0.0 {
            main -= self.main_gap();
        }

        let cross_size = if self.auto_resize {
            view[cross]
        } else {
            let mut c: f64 = self.slots[..n.min(real)]
                .iter()
                .map(|slot| slot.size[cross] + self.cross_gap())
                .sum();
            if c > 0.0 {
                c -= self.cross_gap();
            }
            c
        };
        Vec2::from_axes(axis, main, cross_size)
    }

    /// First line start at or before `pos` on the main axis and that line's
    /// position. Without `force` the scan starts from the current window.
    pub fn index_on_pos(&self, pos: f64, force: bool) -> (usize, f64) {
        let n = self.line_items;
        let real = self.real_count;
        if real < n || real == 0 {
            return (0, 0.0);
        }
        let axis = self.layout.main_axis();
        let gap = self.main_gap();
        let last_line = (real - 1) / n * n;

        if !self.live.is_empty() && !force {
            let mut pos2 = self.first_pos;
            if pos2 + (if gap > 0.0 { 0.0 } else { -gap }) > pos {
                let mut i = self.first_index;
                while i >= n {
                    i -= n;
                    pos2 -= self.slots[i].size[axis] + gap;
                    if pos2 <= pos {
                        return (i, pos2);
                    }
                }
                return (0, 0.0);
            }
            return self.scan_forward(self.first_index.min(last_line), pos2, pos);
        }
        self.scan_forward(0, 0.0, pos)
    }

    fn scan_forward(&self, from: usize, mut pos2: f64, pos: f64) -> (usize, f64) {
        let n = self.line_items;
        let axis = self.layout.main_axis();
        let gap = self.main_gap();
        let test_gap = gap.max(0.0);
        let mut last = (from, pos2);
        let mut i = from;
        while i < self.real_count {
            let pos3 = pos2 + self.slots[i].size[axis];
            if pos3 + test_gap > pos {
                return (i, pos2);
            }
            last = (i, pos2);
            pos2 = pos3 + gap;
            i += n;
        }
        last
    }

    /// First item of the page column at or before `pos` (pagination)
    pub fn index_on_pos_paged(&self, pos: f64, view_width: f64) -> (usize, f64) {
        let n = self.line_items;
        if self.real_count < n || self.real_count == 0 || view_width <= 0.0 {
            return (0, 0.0);
        }
        let page = (pos / view_width).floor().max(0.0) as usize;
        let start = page * n * self.page_lines;
        let mut pos2 = page as f64 * view_width;
        let mut last = start.min(self.real_count - 1);
        for i in start..(start + n).min(self.real_count) {
            let pos3 = pos2 + self.slots[i].size.x;
            if pos3 > pos {
                return (i, pos2);
            }
            last = i;
            pos2 = pos3 + self.column_gap;
        }
        (last, pos2)
    }

    /// Rect of a real index in content coordinates
    pub fn item_rect(&self, index: usize, view: Vec2) -> Rect {
        let n = self.line_items;
        let size = self.slots.get(index).map_or(self.item_size, |slot| slot.size);
        match self.layout {
            ListLayout::SingleColumn
            | ListLayout::FlowHorizontal
            | ListLayout::SingleRow
            | ListLayout::FlowVertical => {
                let axis = self.layout.main_axis();
                let cross = axis.cross();
                let main_pos: f64 = (n - 1..index)
                    .step_by(n)
                    .map(|i| self.slots[i].size[axis] + self.main_gap())
                    .sum();
                let line_start = index - index % n;
                let cross_pos: f64 = (line_start..index)
                    .filter_map(|i| self.slots.get(i))
                    .map(|slot| slot.size[cross] + self.cross_gap())
                    .sum();
                let cross_size = if self.stretches_lines() {
                    self.part_size(view)
                } else {
                    size[cross]
                };
                let origin = Vec2::from_axes(axis, main_pos, cross_pos);
                let extent = Vec2::from_axes(axis, size[axis], cross_size);
                Rect::new(origin.x, origin.y, extent.x, extent.y)
            }
            ListLayout::Pagination => {
                let per_page = n * self.page_lines;
                let page = index / per_page;
                Rect::new(
                    page as f64 * view.x + (index % n) as f64 * (size.x + self.column_gap),
                    ((index / n) % self.page_lines) as f64 * (size.y + self.line_gap),
                    size.x,
                    size.y,
                )
            }
        }
    }

    /// Item boundary a snapping list should come to rest on
    pub fn snapping_position(&self, pos: Vec2, direction: Vec2, threshold: f64, view: Vec2) -> Vec2 {
        let mut out = pos;
        let axis = self.layout.main_axis();
        let (index, start) = if self.layout == ListLayout::Pagination {
            self.index_on_pos_paged(pos.x, view.x)
        } else {
            self.index_on_pos(pos[axis], false)
        };
        out[axis] = start;
        if index < self.real_count {
            let size = self.slots[index].size[axis];
            if should_snap_to_next(direction[axis], pos[axis] - start, size, threshold) {
                out[axis] += size + self.main_gap();
            }
        } else {
            out[axis] = pos[axis];
        }
        out
    }

    /// Replica of a logical index nearest the current window
    pub fn nearest_replica(&self, logical: usize) -> usize {
        let n = self.logical_count;
        if n == 0 || self.real_count <= n {
            return logical;
        }
        let base = self.first_index / n;
        (base.saturating_sub(1)..=base + 1)
            .map(|b| b * n + logical)
            .filter(|&i| i < self.real_count)
            .min_by_key(|&i| i.abs_diff(self.first_index))
            .unwrap_or(logical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(count: usize) -> VirtualLayoutEngine {
        let mut engine = VirtualLayoutEngine::new(ListLayout::SingleColumn, Vec2::new(300.0, 50.0));
        engine.set_item_count(count, count);
        engine.update_line_items(Vec2::new(300.0, 300.0));
        engine
    }

    #[test]
    fn test_content_size_single_column() {
        let mut engine = column(100);
        assert_eq!(engine.content_size(Vec2::new(300.0, 300.0)), Vec2::new(300.0, 5000.0));

        engine.set_line_gap(10.0);
        assert_eq!(engine.content_size(Vec2::new(300.0, 300.0)).y, 5990.0);
    }

    #[test]
    fn test_flow_line_items_fit_view() {
        let mut engine = VirtualLayoutEngine::new(ListLayout::FlowHorizontal, Vec2::new(100.0, 50.0));
        engine.set_column_gap(10.0);
        engine.set_item_count(10, 10);
        engine.update_line_items(Vec2::new(320.0, 300.0));
        assert_eq!(engine.line_items(), 3);

        engine.set_column_count(4);
        engine.update_line_items(Vec2::new(320.0, 300.0));
        assert_eq!(engine.line_items(), 4);
        // 3 lines of 50
        assert_eq!(engine.content_size(Vec2::new(320.0, 300.0)).y, 150.0);
    }

    #[test]
    fn test_index_on_pos_full_scan() {
        let engine = column(100);
        assert_eq!(engine.index_on_pos(0.0, true), (0, 0.0));
        assert_eq!(engine.index_on_pos(2300.0, true), (46, 2300.0));
        assert_eq!(engine.index_on_pos(2325.0, true), (46, 2300.0));
        assert_eq!(engine.index_on_pos(1e9, true).0, 99);
    }

    #[test]
    fn test_index_on_pos_incremental_matches_full() {
        let mut engine = column(100);
        engine.set_window(40, 2000.0, vec![40, 41, 42]);
        for pos in [0.0, 1234.0, 1999.0, 2000.0, 2051.0, 4700.0] {
            assert_eq!(engine.index_on_pos(pos, false), engine.index_on_pos(pos, true));
        }
    }

    #[test]
    fn test_item_rect() {
        let engine = column(100);
        let rect = engine.item_rect(50, Vec2::new(300.0, 300.0));
        assert_eq!(rect, Rect::new(0.0, 2500.0, 300.0, 50.0));
    }

    #[test]
    fn test_item_rect_follows_stretching() {
        let view = Vec2::new(300.0, 300.0);
        let mut engine = VirtualLayoutEngine::new(ListLayout::SingleColumn, Vec2::new(120.0, 50.0));
        engine.set_item_count(10, 10);
        engine.update_line_items(view);
        assert_eq!(engine.item_rect(2, view), Rect::new(0.0, 100.0, 300.0, 50.0));

        engine.set_auto_resize(false);
        assert_eq!(engine.item_rect(2, view), Rect::new(0.0, 100.0, 120.0, 50.0));
    }

    #[test]
    fn test_item_rect_in_flow_line() {
        let view = Vec2::new(320.0, 300.0);
        let mut engine = VirtualLayoutEngine::new(ListLayout::FlowHorizontal, Vec2::new(100.0, 50.0));
        engine.set_column_gap(10.0);
        engine.set_item_count(10, 10);
        engine.update_line_items(view);
        assert_eq!(engine.line_items(), 3);
        assert_eq!(engine.item_rect(4, view), Rect::new(110.0, 50.0, 100.0, 50.0));
    }

    #[test]
    fn test_pagination_index_and_size() {
        let mut engine = VirtualLayoutEngine::new(ListLayout::Pagination, Vec2::new(100.0, 100.0));
        engine.set_item_count(20, 20);
        let view = Vec2::new(300.0, 200.0);
        engine.update_line_items(view);
        assert_eq!((engine.line_items(), engine.page_lines()), (3, 2));
        // 20 items at 6 per page
        assert_eq!(engine.content_size(view), Vec2::new(1200.0, 200.0));
        assert_eq!(engine.index_on_pos_paged(350.0, 300.0), (6, 300.0));
        assert_eq!(engine.index_on_pos_paged(450.0, 300.0), (7, 400.0));
    }

    #[test]
    fn test_snapping_position() {
        let engine = column(100);
        let view = Vec2::new(300.0, 300.0);
        assert_eq!(engine.snapping_position(Vec2::new(0.0, 110.0), Vec2::ZERO, 0.5, view).y, 100.0);
        assert_eq!(engine.snapping_position(Vec2::new(0.0, 130.0), Vec2::ZERO, 0.5, view).y, 150.0);
        assert_eq!(
            engine.snapping_position(Vec2::new(0.0, 130.0), Vec2::new(0.0, -1.0), 0.3, view).y,
            100.0
        );
    }

    #[test]
    fn test_selection_cleared_beyond_count() {
        let mut engine = column(10);
        engine.slot_mut(8).unwrap().selected = true;
        engine.set_item_count(5, 5);
        assert!(!engine.slot(8).unwrap().selected);
        engine.set_item_count(10, 10);
        assert!(!engine.slot(8).unwrap().selected);
    }

    #[test]
    fn test_nearest_replica() {
        let mut engine = column(60);
        engine.set_item_count(60, 10);
        engine.set_window(25, 0.0, Vec::new());
        assert_eq!(engine.nearest_replica(2), 22);
        assert_eq!(engine.nearest_replica(9), 29);
        assert_eq!(engine.replicas(3).collect::<Vec<_>>(), vec![3, 13, 23, 33, 43, 53]);
    }
}
