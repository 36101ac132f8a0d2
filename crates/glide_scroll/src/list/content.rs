//! Visible-window resolution of a virtual list
//!
//! [`ListContent`] is the [`ScrollHost`] of a virtual list's pane. Every
//! scroll re-resolves which items intersect the view, binds widgets to
//! them (stealing widgets from items that just left the window before
//! asking the pool), renders newly bound items, and reports measured size
//! changes back to the pane so visible items stay put.

use glide_core::Vec2;

use super::item::{ItemFactory, ListItem, Positionable, Resizable, ResourceId};
use super::layout::{ListLayout, VirtualLayoutEngine};
use super::recycler::{ItemRecycler, WidgetId};
use crate::error::{Result, ScrollError};
use crate::event::ScrollHost;
use crate::pane::ScrollPane;

/// Passes a line layout may take to fill the view
pub const MAX_FILL_ATTEMPTS: u32 = 20;

/// Renders logical item `index` into a widget
pub type ItemRenderer<T> = Box<dyn FnMut(usize, &mut T)>;

/// Picks the resource for logical item `index` (`None` = default)
pub type ItemProvider = Box<dyn FnMut(usize) -> Option<ResourceId>>;

pub(crate) struct ListContent<F: ItemFactory> {
    pub(crate) engine: VirtualLayoutEngine,
    pub(crate) recycler: ItemRecycler<F>,
    pub(crate) renderer: Option<ItemRenderer<F::Item>>,
    pub(crate) provider: Option<ItemProvider>,
    pub(crate) default_resource: ResourceId,
    /// Geometry changed; rebuild on the next tick
    pub(crate) dirty: bool,
    error: Option<ScrollError>,
}

impl<F: ItemFactory> ListContent<F> {
    pub(crate) fn new(
        engine: VirtualLayoutEngine,
        factory: F,
        default_resource: ResourceId,
    ) -> Self {
        Self {
            engine,
            recycler: ItemRecycler::new(factory),
            renderer: None,
            provider: None,
            default_resource,
            dirty: false,
            error: None,
        }
    }

    pub(crate) fn take_error(&mut self) -> Result<()> {
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn record(&mut self, result: Result<()>) {
        if let Err(err) = result {
            tracing::warn!("virtual list refresh failed: {err}");
            self.error.get_or_insert(err);
        }
    }

    fn resource_for(&mut self, real: usize) -> ResourceId {
        let logical = self.engine.logical_index(real);
        self.provider
            .as_mut()
            .and_then(|provider| provider(logical))
            .unwrap_or_else(|| self.default_resource.clone())
    }

    fn render(&mut self, real: usize, id: WidgetId) {
        let logical = self.engine.logical_index(real);
        if let (Some(renderer), Some(item)) = (self.renderer.as_mut(), self.recycler.get_mut(id)) {
            renderer(logical, item);
        }
    }

    fn measure(&self, id: WidgetId) -> Vec2 {
        self.recycler
            .get(id)
            .map_or(self.engine.item_size(), |item| item.size().map(f64::ceil))
    }

    /// Copy a widget's own selection state back to its slot
    fn save_selection(&mut self, real: usize) {
        let Some(slot) = self.engine.slot_mut(real) else {
            return;
        };
        let Some(item) = slot.widget.and_then(|id| self.recycler.get(id)) else {
            return;
        };
        if item.kind().is_selectable() {
            slot.selected = item.is_selected();
        }
    }

    fn apply_selection(&mut self, real: usize) {
        let Some(slot) = self.engine.slot(real) else {
            return;
        };
        let selected = slot.selected;
        if let Some(item) = slot.widget.and_then(|id| self.recycler.get_mut(id)) {
            if item.kind().is_selectable() {
                item.set_selected(selected);
            }
        }
    }

    /// Unbind the widget of `real` and return it to the pool
    fn unbind(&mut self, real: usize) {
        self.save_selection(real);
        if let Some(id) = self.engine.slot_mut(real).and_then(|slot| slot.widget.take()) {
            self.recycler.release(id);
        }
    }

    /// Move the widget of `from` onto `to`
    fn rebind(&mut self, from: usize, to: usize) {
        self.save_selection(from);
        let widget = self.engine.slot_mut(from).and_then(|slot| slot.widget.take());
        if let Some(slot) = self.engine.slot_mut(to) {
            slot.widget = widget;
        }
    }

    fn is_stealable(&self, real: usize, generation: u32, resource: &ResourceId) -> bool {
        self.engine.slot(real).is_some_and(|slot| {
            slot.generation != generation
                && slot
                    .widget
                    .is_some_and(|id| self.recycler.resource(id) == Some(resource))
        })
    }

    fn widget_of(&self, real: usize) -> Option<WidgetId> {
        self.engine.slot(real).and_then(|slot| slot.widget)
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Recompute line counts and content size, then rebind every visible item
    pub(crate) fn refresh(&mut self, pane: &mut ScrollPane) -> Result<()> {
        self.dirty = false;
        let view = pane.view_size();
        self.engine.update_line_items(view);
        let axis = self.engine.layout().main_axis();
        pane.set_loop_gap(Vec2::ZERO.with(axis, self.engine.main_gap()));
        pane.set_content_size(self.engine.content_size(view));
        self.handle_scroll(pane, true)
    }

    /// Re-resolve the visible window for the pane's current display
    pub(crate) fn handle_scroll(&mut self, pane: &mut ScrollPane, force: bool) -> Result<()> {
        if self.engine.layout() == ListLayout::Pagination {
            self.scroll_paged(pane, force);
            return Ok(());
        }

        let mut force = force;
        let mut attempts = 0;
        while self.scroll_lines(pane, force) {
            attempts += 1;
            force = false;
            if attempts >= MAX_FILL_ATTEMPTS {
                tracing::warn!(
                    "virtual list never filled the view after {attempts} passes; \
                     the renderer keeps returning different sizes"
                );
                return Err(ScrollError::RefreshDiverged { attempts });
            }
        }
        Ok(())
    }

    /// One pass over a line layout. Returns true if the view is left with
    /// a gap before the first item and another pass is needed.
    fn scroll_lines(&mut self, pane: &mut ScrollPane, force: bool) -> bool {
        let axis = self.engine.layout().main_axis();
        let cross = axis.cross();
        let view = pane.view_size();
        let pos = pane.display()[axis].clamp(0.0, pane.overlap()[axis]);
        let mut max = pos + view[axis];
        let at_end = max == pane.content_size()[axis];

        let (new_first, line_pos) = self.engine.index_on_pos(pos, force);
        if new_first == self.engine.first_index() && !force {
            return false;
        }

        let old_first = self.engine.first_index();
        let old_live = self.engine.take_live();
        let moving_back = old_first > new_first;
        let mut reuse = if moving_back {
            old_live.len() as isize - 1
        } else {
            0
        };

        let generation = self.engine.next_generation();
        let n = self.engine.line_items();
        let real = self.engine.real_count();
        let main_gap = self.engine.main_gap();
        let cross_gap = self.engine.cross_gap();
        let part = self.engine.part_size(view);
        let stretch = self.engine.stretches_lines();

        let mut live = Vec::new();
        let mut cur = new_first;
        let mut cross_pos = 0.0;
        let mut main_pos = line_pos;
        let mut delta_size = 0.0;
        let mut first_delta = 0.0;

        while cur < real && (at_end || main_pos < max) {
            let mut resource = None;
            if self.widget_of(cur).is_none() || force {
                let wanted = self.resource_for(cur);
                if let Some(id) = self.widget_of(cur) {
                    if self.recycler.resource(id) != Some(&wanted) {
                        self.unbind(cur);
                    }
                }
                resource = Some(wanted);
            }

            let needs_render = if self.widget_of(cur).is_none() {
                let wanted = match resource {
                    Some(wanted) => wanted,
                    None => self.resource_for(cur),
                };
                if let Some(from) = self.steal(&old_live, &mut reuse, moving_back, generation, &wanted) {
                    self.rebind(from, cur);
                } else {
                    let id = self.recycler.acquire(&wanted);
                    if let Some(slot) = self.engine.slot_mut(cur) {
                        slot.widget = Some(id);
                    }
                }
                self.apply_selection(cur);
                true
            } else {
                force
            };

            let Some(id) = self.widget_of(cur) else {
                break;
            };

            if needs_render {
                if stretch {
                    if let Some(item) = self.recycler.get_mut(id) {
                        let size = item.size().with(cross, part);
                        item.set_size(size);
                    }
                }
                self.render(cur, id);
                let measured = self.measure(id);
                let old = self.engine.slot(cur).map_or(measured, |slot| slot.size);
                if cur % n == 0 {
                    delta_size += measured[axis] - old[axis];
                    if cur == new_first && moving_back {
                        first_delta = measured[axis] - old[axis];
                    }
                }
                if let Some(slot) = self.engine.slot_mut(cur) {
                    slot.size = measured;
                }
            }

            let size = match self.engine.slot_mut(cur) {
                Some(slot) => {
                    slot.generation = generation;
                    slot.size
                }
                None => break,
            };
            if let Some(item) = self.recycler.get_mut(id) {
                item.set_position(Vec2::from_axes(axis, main_pos, cross_pos));
            }
            if cur == new_first {
                // one extra line so the trailing edge never shows a gap
                max += size[axis];
            }
            cross_pos += size[cross] + cross_gap;
            if cur % n == n - 1 {
                cross_pos = 0.0;
                main_pos += size[axis] + main_gap;
            }
            live.push(cur);
            cur += 1;
        }

        for &index in &old_live {
            let stale = self
                .engine
                .slot(index)
                .is_some_and(|slot| slot.generation != generation);
            if stale {
                self.unbind(index);
            }
        }

        let first_live_pos = live.first().map(|_| line_pos);
        self.engine.set_window(new_first, line_pos, live);

        if delta_size != 0.0 || first_delta != 0.0 {
            pane.change_content_size_on_scrolling(
                Vec2::ZERO.with(axis, delta_size),
                Vec2::ZERO.with(axis, first_delta),
            );
        }

        let display = pane.display()[axis];
        cur > 0 && first_live_pos.is_some_and(|first| display >= 0.0 && first > display)
    }

    /// Search the previous window for a widget of `resource` not yet bound
    /// this pass, walking away from the direction of travel
    fn steal(
        &self,
        old_live: &[usize],
        cursor: &mut isize,
        moving_back: bool,
        generation: u32,
        resource: &ResourceId,
    ) -> Option<usize> {
        if moving_back {
            let mut j = *cursor;
            while j >= 0 {
                let index = old_live[j as usize];
                if self.is_stealable(index, generation, resource) {
                    if j == *cursor {
                        *cursor -= 1;
                    }
                    return Some(index);
                }
                j -= 1;
            }
        } else {
            let mut j = (*cursor).max(0) as usize;
            while j < old_live.len() {
                let index = old_live[j];
                if self.is_stealable(index, generation, resource) {
                    if j as isize == *cursor {
                        *cursor += 1;
                    }
                    return Some(index);
                }
                j += 1;
            }
        }
        None
    }

    /// Pagination: bind the current page and the next column, positioned
    /// page by page
    fn scroll_paged(&mut self, pane: &mut ScrollPane, force: bool) {
        let view = pane.view_size();
        let pos = pane.display().x.clamp(0.0, pane.overlap().x);
        let (new_first, _) = self.engine.index_on_pos_paged(pos, view.x);
        if new_first == self.engine.first_index() && !force {
            return;
        }

        let old_live = self.engine.take_live();
        let generation = self.engine.next_generation();
        let n = self.engine.line_items();
        let per_page = n * self.engine.page_lines();
        let real = self.engine.real_count();
        let start_col = new_first % n;
        let page = new_first / per_page;
        let start = page * per_page;
        let last = (start + per_page * 2).min(real);
        let part = self.engine.page_part_size(view);
        let (stretch_x, stretch_y) = self.engine.stretches_page();

        // Columns from `start_col` on this page, up to it on the next
        let wanted: Vec<usize> = (start..last)
            .filter(|&i| {
                let col = i % n;
                if i - start < per_page {
                    col >= start_col
                } else {
                    col <= start_col
                }
            })
            .collect();
        for &i in &wanted {
            if let Some(slot) = self.engine.slot_mut(i) {
                slot.generation = generation;
            }
        }

        for &i in &wanted {
            if force {
                if let Some(id) = self.widget_of(i) {
                    let resource = self.resource_for(i);
                    if self.recycler.resource(id) != Some(&resource) {
                        self.unbind(i);
                    }
                }
            }

            let needs_render = if self.widget_of(i).is_none() {
                let resource = self.resource_for(i);
                let from = old_live
                    .iter()
                    .copied()
                    .find(|&j| self.is_stealable(j, generation, &resource));
                match from {
                    Some(from) => self.rebind(from, i),
                    None => {
                        let id = self.recycler.acquire(&resource);
                        if let Some(slot) = self.engine.slot_mut(i) {
                            slot.widget = Some(id);
                        }
                    }
                }
                self.apply_selection(i);
                true
            } else {
                force
            };

            let Some(id) = self.widget_of(i) else {
                continue;
            };
            if needs_render {
                if let Some(item) = self.recycler.get_mut(id) {
                    let mut size = item.size();
                    if stretch_x {
                        size.x = part.x;
                    }
                    if stretch_y {
                        size.y = part.y;
                    }
                    if stretch_x || stretch_y {
                        item.set_size(size);
                    }
                }
                self.render(i, id);
                let measured = self.measure(id);
                if let Some(slot) = self.engine.slot_mut(i) {
                    slot.size = measured;
                }
            }
        }

        let mut border = page as f64 * view.x;
        let mut x = border;
        let mut y = 0.0;
        let mut line_height: f64 = 0.0;
        for i in start..last {
            let Some(slot) = self.engine.slot(i).copied() else {
                break;
            };
            if slot.generation == generation {
                if let Some(item) = slot.widget.and_then(|id| self.recycler.get_mut(id)) {
                    item.set_position(Vec2::new(x, y));
                }
            }
            line_height = line_height.max(slot.size.y);
            if i % n == n - 1 {
                x = border;
                y += line_height + self.engine.line_gap();
                line_height = 0.0;
                if i == start + per_page - 1 {
                    border += view.x;
                    x = border;
                    y = 0.0;
                }
            } else {
                x += slot.size.x + self.engine.column_gap();
            }
        }

        for &index in &old_live {
            let stale = self
                .engine
                .slot(index)
                .is_some_and(|slot| slot.generation != generation);
            if stale {
                self.unbind(index);
            }
        }
        self.engine
            .set_window(new_first, page as f64 * view.x, wanted);
    }
}

impl<F: ItemFactory> ScrollHost for ListContent<F> {
    fn on_scroll(&mut self, pane: &mut ScrollPane) {
        let result = self.handle_scroll(pane, false);
        self.record(result);
    }

    fn on_deferred_refresh(&mut self, pane: &mut ScrollPane) {
        if self.dirty {
            let result = self.refresh(pane);
            self.record(result);
        }
    }

    fn snap_position(&mut self, pane: &ScrollPane, pos: Vec2, direction: Vec2) -> Option<Vec2> {
        if self.engine.real_count() == 0 {
            return None;
        }
        let threshold = pane.config().tuning.snapping_threshold;
        let snapped = self
            .engine
            .snapping_position(pos, direction, threshold, pane.view_size());
        // Only the scroll axis is item-aligned
        let axis = self.engine.layout().main_axis();
        Some(pos.with(axis, snapped[axis]))
    }
}
