//! Virtual list controller

use std::ops::Range;
use std::sync::Arc;

use glide_core::{Axis, GestureArbiter, ListenerId, ListenerSet, PointerEvent, Vec2};

use super::content::ListContent;
use super::item::{ItemFactory, ListItem, ResourceId};
use super::layout::{ListLayout, VirtualLayoutEngine};
use super::recycler::{ItemRecycler, RecyclerStats};
use crate::config::{LoopMode, ScrollConfig};
use crate::error::{Result, ScrollError};
use crate::looping::LOOP_REPLICAS;
use crate::pane::ScrollPane;

/// How clicks change the selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// At most one selected item
    #[default]
    Single,
    /// Clicks toggle items independently
    Multiple,
    None,
}

/// Delivered to selection listeners for each item that changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChange {
    pub index: usize,
    pub selected: bool,
}

/// A scroll pane that binds widgets only to the items in view
pub struct VirtualList<F: ItemFactory> {
    pane: ScrollPane,
    content: ListContent<F>,
    item_count: usize,
    looping: bool,
    /// Bounce setting to restore when looping is turned off
    bounce_back: bool,
    selection_mode: SelectionMode,
    selection_listeners: ListenerSet<SelectionChange>,
}

impl<F: ItemFactory> VirtualList<F> {
    /// Create a list. A loop configured on `config` must run along the
    /// layout's scroll axis and is rejected for flow layouts.
    pub fn new(
        config: ScrollConfig,
        arbiter: Arc<GestureArbiter>,
        layout: ListLayout,
        factory: F,
        default_resource: impl Into<ResourceId>,
    ) -> Result<Self> {
        let looping = match config.loop_mode.axis() {
            None => false,
            Some(axis) => {
                check_loop(layout)?;
                if axis != layout.main_axis() {
                    return Err(ScrollError::UnsupportedCombination(format!(
                        "loop axis {axis:?} does not match the {layout:?} scroll axis"
                    )));
                }
                true
            }
        };

        let bounce_back = config.bounce_back;
        let mut pane = ScrollPane::new(config, arbiter)?;
        if looping {
            pane.set_bounce_back(false);
        }
        let resource = default_resource.into();
        let engine = VirtualLayoutEngine::new(layout, Vec2::new(100.0, 100.0));
        tracing::debug!("virtual list on pane {} with {:?}", pane.id().get(), layout);

        Ok(Self {
            pane,
            content: ListContent::new(engine, factory, resource),
            item_count: 0,
            looping,
            bounce_back,
            selection_mode: SelectionMode::default(),
            selection_listeners: ListenerSet::new(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn pane(&self) -> &ScrollPane {
        &self.pane
    }

    /// The underlying pane. Size changes made through it are picked up on
    /// the next [`VirtualList::invalidate`].
    pub fn pane_mut(&mut self) -> &mut ScrollPane {
        &mut self.pane
    }

    pub fn layout(&self) -> ListLayout {
        self.content.engine.layout()
    }

    pub fn engine(&self) -> &VirtualLayoutEngine {
        &self.content.engine
    }

    pub fn recycler(&self) -> &ItemRecycler<F> {
        &self.content.recycler
    }

    pub fn recycler_stats(&self) -> RecyclerStats {
        self.content.recycler.stats()
    }

    /// Logical item count
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub fn set_layout(&mut self, layout: ListLayout) -> Result<()> {
        if self.looping {
            check_loop(layout)?;
            self.pane.set_loop_axis(Some(layout.main_axis()));
        }
        self.content.engine.set_layout(layout);
        self.invalidate();
        Ok(())
    }

    /// Loop the items along the scroll axis. Bounce is disabled while
    /// looping and restored from the config afterwards.
    pub fn set_loop(&mut self, enabled: bool) -> Result<()> {
        if enabled == self.looping {
            return Ok(());
        }
        let layout = self.layout();
        if enabled {
            check_loop(layout)?;
        }
        self.looping = enabled;
        self.pane.set_bounce_back(!enabled && self.bounce_back);
        self.pane
            .set_loop_axis(enabled.then(|| layout.main_axis()));
        self.apply_item_count();
        self.refresh_now()?;
        self.recenter_loop();
        self.flush()
    }

    /// Size used for items that were never measured
    pub fn set_item_size(&mut self, size: Vec2) {
        self.content.engine.set_item_size(size);
        self.invalidate();
    }

    pub fn set_line_gap(&mut self, gap: f64) {
        self.content.engine.set_line_gap(gap);
        self.invalidate();
    }

    pub fn set_column_gap(&mut self, gap: f64) {
        self.content.engine.set_column_gap(gap);
        self.invalidate();
    }

    pub fn set_column_count(&mut self, count: usize) {
        self.content.engine.set_column_count(count);
        self.invalidate();
    }

    pub fn set_line_count(&mut self, count: usize) {
        self.content.engine.set_line_count(count);
        self.invalidate();
    }

    pub fn set_auto_resize_item(&mut self, enabled: bool) {
        self.content.engine.set_auto_resize(enabled);
        self.invalidate();
    }

    pub fn set_item_renderer<R>(&mut self, renderer: R)
    where
        R: FnMut(usize, &mut F::Item) + 'static,
    {
        self.content.renderer = Some(Box::new(renderer));
    }

    pub fn set_item_provider<P>(&mut self, provider: P)
    where
        P: FnMut(usize) -> Option<ResourceId> + 'static,
    {
        self.content.provider = Some(Box::new(provider));
        self.invalidate();
    }

    pub fn set_view_size(&mut self, size: Vec2) {
        self.pane.set_view_size(size);
        self.invalidate();
    }

    /// Rebuild geometry on the next tick
    pub fn invalidate(&mut self) {
        self.content.dirty = true;
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Set the logical item count and rebuild the visible window now
    pub fn set_item_count(&mut self, count: usize) -> Result<()> {
        if self.content.renderer.is_none() {
            return Err(ScrollError::Configuration(
                "an item renderer must be set before the item count".into(),
            ));
        }
        self.item_count = count;
        self.apply_item_count();
        self.refresh_now()?;
        self.recenter_loop();
        self.flush()
    }

    fn apply_item_count(&mut self) {
        let real = if self.looping {
            self.item_count * LOOP_REPLICAS
        } else {
            self.item_count
        };
        self.content.engine.set_item_count(real, self.item_count);
    }

    /// Move a looped list off its leading edge
    fn recenter_loop(&mut self) {
        if !self.looping || self.item_count == 0 {
            return;
        }
        let axis = self.layout().main_axis();
        let offset = self.pane.offset()[axis];
        self.pane.set_pos(axis, offset, false);
    }

    /// Rebuild geometry and re-render every visible item now. Returns the
    /// pool churn the rebuild caused.
    pub fn refresh(&mut self) -> Result<RecyclerStats> {
        let before = self.content.recycler.stats();
        self.refresh_now()?;
        self.flush()?;
        Ok(self.content.recycler.stats().since(&before))
    }

    fn refresh_now(&mut self) -> Result<()> {
        let result = self.content.refresh(&mut self.pane);
        self.content.take_error()?;
        result
    }

    fn flush(&mut self) -> Result<()> {
        self.pane.flush(&mut self.content);
        self.content.take_error()
    }

    /// Advance one frame
    pub fn tick(&mut self, dt: f64) -> Result<()> {
        self.pane.tick_with(dt, &mut self.content);
        self.content.take_error()
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.pane.handle_pointer(event);
    }

    /// Scroll logical item `index` into view
    pub fn scroll_to_view(&mut self, index: usize, animated: bool, set_first: bool) -> Result<()> {
        self.check_index(index)?;
        if self.content.dirty {
            self.refresh_now()?;
        }
        let real = if self.looping {
            self.content.engine.nearest_replica(index)
        } else {
            index
        };
        let rect = self.content.engine.item_rect(real, self.pane.view_size());
        self.pane.scroll_to_view(rect, animated, set_first);
        self.flush()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.item_count {
            return Err(ScrollError::IndexOutOfRange {
                index,
                len: self.item_count,
            });
        }
        Ok(())
    }

    /// Real indices currently bound to widgets
    pub fn visible_range(&self) -> Range<usize> {
        let live = self.content.engine.live();
        match (live.first(), live.last()) {
            (Some(&first), Some(&last)) => first..last + 1,
            _ => 0..0,
        }
    }

    /// Logical index of the first item in view
    pub fn first_visible_index(&self) -> usize {
        let engine = &self.content.engine;
        engine.logical_index(engine.first_index())
    }

    /// Logical indices bound to widgets, in layout order
    pub fn visible_items(&self) -> impl Iterator<Item = (usize, &F::Item)> + '_ {
        let engine = &self.content.engine;
        let recycler = &self.content.recycler;
        engine.live().iter().filter_map(move |&real| {
            let id = engine.slot(real)?.widget?;
            Some((engine.logical_index(real), recycler.get(id)?))
        })
    }

    /// Widget bound to logical item `index`, if it is in view
    pub fn item(&self, index: usize) -> Option<&F::Item> {
        self.visible_items()
            .find(|&(logical, _)| logical == index)
            .map(|(_, item)| item)
    }

    /// Logical item shown by the `child`-th bound widget
    pub fn child_index_to_item_index(&self, child: usize) -> Option<usize> {
        let engine = &self.content.engine;
        engine.live().get(child).map(|&real| engine.logical_index(real))
    }

    /// Position of logical item `index` among the bound widgets
    pub fn item_index_to_child_index(&self, index: usize) -> Option<usize> {
        let engine = &self.content.engine;
        engine
            .live()
            .iter()
            .position(|&real| engine.logical_index(real) == index)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn selection_mode(&self) -> SelectionMode {
        self.selection_mode
    }

    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.selection_mode = mode;
        if mode == SelectionMode::None {
            self.clear_selection();
        }
    }

    pub fn on_selection_changed<L>(&mut self, listener: L) -> ListenerId
    where
        L: FnMut(&mut SelectionChange) + 'static,
    {
        self.selection_listeners.add(listener)
    }

    pub fn remove_selection_listener(&mut self, id: ListenerId) -> bool {
        self.selection_listeners.remove(id)
    }

    /// Whether any replica of `index` is selected. A bound selectable
    /// widget's own state wins over the stored flag.
    pub fn is_selected(&self, index: usize) -> bool {
        let engine = &self.content.engine;
        engine.replicas(index).any(|real| {
            let Some(slot) = engine.slot(real) else {
                return false;
            };
            match slot.widget.and_then(|id| self.content.recycler.get(id)) {
                Some(item) if item.kind().is_selectable() => item.is_selected(),
                _ => slot.selected,
            }
        })
    }

    /// First selected logical index
    pub fn selected_index(&self) -> Option<usize> {
        (0..self.item_count).find(|&index| self.is_selected(index))
    }

    /// Every selected logical index, ascending
    pub fn selection(&self) -> Vec<usize> {
        (0..self.item_count)
            .filter(|&index| self.is_selected(index))
            .collect()
    }

    /// Select `index`, clearing others in single mode
    pub fn add_selection(&mut self, index: usize, scroll_into_view: bool) -> Result<()> {
        self.check_index(index)?;
        if self.selection_mode == SelectionMode::None {
            return Ok(());
        }
        if self.selection_mode == SelectionMode::Single {
            for other in self.selection() {
                if other != index {
                    self.set_selected(other, false);
                }
            }
        }
        self.set_selected(index, true);
        if scroll_into_view {
            self.scroll_to_view(index, false, false)?;
        }
        Ok(())
    }

    pub fn remove_selection(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.set_selected(index, false);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        for index in self.selection() {
            self.set_selected(index, false);
        }
    }

    /// Select everything (multiple mode only)
    pub fn select_all(&mut self) {
        if self.selection_mode != SelectionMode::Multiple {
            return;
        }
        for index in 0..self.item_count {
            self.set_selected(index, true);
        }
    }

    /// Apply a click on logical item `index` per the selection mode
    pub fn click_item(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        match self.selection_mode {
            SelectionMode::None => {}
            SelectionMode::Single => {
                if !self.is_selected(index) {
                    self.add_selection(index, false)?;
                }
            }
            SelectionMode::Multiple => {
                let selected = self.is_selected(index);
                self.set_selected(index, !selected);
            }
        }
        Ok(())
    }

    /// Mark every replica of `index` and its bound widgets
    fn set_selected(&mut self, index: usize, selected: bool) {
        if self.is_selected(index) == selected {
            return;
        }
        let replicas: Vec<usize> = self.content.engine.replicas(index).collect();
        for real in replicas {
            let Some(slot) = self.content.engine.slot_mut(real) else {
                continue;
            };
            slot.selected = selected;
            if let Some(item) = slot.widget.and_then(|id| self.content.recycler.get_mut(id)) {
                if item.kind().is_selectable() {
                    item.set_selected(selected);
                }
            }
        }
        let mut change = SelectionChange { index, selected };
        self.selection_listeners.emit(&mut change);
    }
}

fn check_loop(layout: ListLayout) -> Result<()> {
    if layout.is_flow() {
        return Err(ScrollError::UnsupportedCombination(format!(
            "looping is not supported for the {layout:?} layout"
        )));
    }
    Ok(())
}

impl<F: ItemFactory> std::fmt::Debug for VirtualList<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualList")
            .field("layout", &self.layout())
            .field("item_count", &self.item_count)
            .field("looping", &self.looping)
            .field("visible", &self.visible_range())
            .finish()
    }
}

/// Loop mode matching a layout's scroll axis
pub fn loop_mode_for(layout: ListLayout) -> LoopMode {
    match layout.main_axis() {
        Axis::X => LoopMode::Horizontal,
        Axis::Y => LoopMode::Vertical,
    }
}
