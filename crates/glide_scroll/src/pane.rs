//! Scroll pane
//!
//! The viewport orchestrator. Pointer input is queued and processed at the
//! start of [`ScrollPane::tick_with`], followed by the deferred refresh, the
//! tween step, and the final scrollbar sync.

use std::collections::VecDeque;
use std::sync::Arc;

use glide_animation::FrameClock;
use glide_core::{
    Axis, GestureArbiter, ListenerId, ListenerSet, PointerEvent, PointerPhase, Rect, Vec2,
    ViewportId,
};
use rustc_hash::FxHashMap;

use crate::align::{AlignMotion, AlignmentResolver};
use crate::config::ScrollConfig;
use crate::error::Result;
use crate::event::{NoHost, ScrollEvent, ScrollEventKind, ScrollHost, ScrollRequest};
use crate::gesture::{DragContext, GesturePhase, GestureTracker, Release};
use crate::inertia::InertialSolver;
use crate::looping::{LoopSpan, LoopWrapper};
use crate::position::PositionState;
use crate::scrollbar::{PageIndicator, ScrollBar, ScrollBarSync};
use crate::tween::{BounceParams, ScrollTween, TweenBounds, TweenMode};

/// Upper bound on events drained by one dispatch
const MAX_DISPATCH: usize = 64;

/// How the pending refresh should move the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnimFlag {
    Unset,
    Animated,
    Immediate,
}

/// A scrollable viewport
pub struct ScrollPane {
    id: ViewportId,
    arbiter: Arc<GestureArbiter>,
    config: ScrollConfig,
    position: PositionState,
    gesture: GestureTracker,
    tween: ScrollTween,
    solver: InertialSolver,
    aligner: AlignmentResolver,
    looper: LoopWrapper,
    scrollbars: ScrollBarSync,
    clock: FrameClock,
    listeners: FxHashMap<ScrollEventKind, ListenerSet<ScrollEvent>>,
    pending_input: VecDeque<PointerEvent>,
    pending_events: VecDeque<ScrollEventKind>,
    needs_refresh: bool,
    anim_flag: AnimFlag,
    /// A drag or tween interruption happened during the current touch
    dragged: bool,
    dispatching: bool,
    dispatching_pull: bool,
    header_reveal: f64,
    footer_reveal: f64,
    loop_gap: Vec2,
}

impl ScrollPane {
    pub fn new(config: ScrollConfig, arbiter: Arc<GestureArbiter>) -> Result<Self> {
        config.validate()?;
        let id = arbiter.register();
        let mut position = PositionState::new(config.direction);
        position.set_fixed_page_size(config.fixed_page_size.map(|[w, h]| Vec2::new(w, h)));
        position.loop_axis = config.loop_mode.axis();
        let mut clock = FrameClock::new();
        clock.set_target_fps(config.tuning.tick_rate.round() as u32);

        tracing::debug!("scroll pane {} created: {:?}", id.get(), config.direction);
        Ok(Self {
            id,
            arbiter,
            gesture: GestureTracker::new(),
            tween: ScrollTween::new(config.easing),
            solver: InertialSolver::new(&config),
            aligner: AlignmentResolver::new(&config),
            looper: LoopWrapper::new(config.loop_mode.axis(), config.tuning.loop_epsilon),
            scrollbars: ScrollBarSync::new(config.scrollbar),
            position,
            clock,
            listeners: FxHashMap::default(),
            pending_input: VecDeque::new(),
            pending_events: VecDeque::new(),
            needs_refresh: false,
            anim_flag: AnimFlag::Unset,
            dragged: false,
            dispatching: false,
            dispatching_pull: false,
            header_reveal: 0.0,
            footer_reveal: 0.0,
            loop_gap: Vec2::ZERO,
            config,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> ViewportId {
        self.id
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    pub fn position(&self) -> &PositionState {
        &self.position
    }

    pub fn offset(&self) -> Vec2 {
        self.position.offset
    }

    pub fn display(&self) -> Vec2 {
        self.position.display
    }

    pub fn overlap(&self) -> Vec2 {
        self.position.overlap()
    }

    pub fn view_size(&self) -> Vec2 {
        self.position.view_size()
    }

    pub fn content_size(&self) -> Vec2 {
        self.position.content_size()
    }

    pub fn page_size(&self) -> Vec2 {
        self.position.page_size()
    }

    pub fn percent(&self, axis: Axis) -> f64 {
        self.position.percent(axis)
    }

    pub fn gesture_phase(&self) -> GesturePhase {
        self.gesture.phase()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_dragging()
    }

    pub fn is_tweening(&self) -> bool {
        self.tween.is_active()
    }

    pub fn tween_mode(&self) -> TweenMode {
        self.tween.mode()
    }

    /// Where the running tween will stop
    pub fn tween_target(&self) -> Option<Vec2> {
        self.tween.is_active().then(|| self.tween.target())
    }

    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn scrollbars(&self) -> &ScrollBarSync {
        &self.scrollbars
    }

    pub fn is_bottom_most(&self) -> bool {
        self.is_end_most(Axis::Y)
    }

    pub fn is_right_most(&self) -> bool {
        self.is_end_most(Axis::X)
    }

    fn is_end_most(&self, axis: Axis) -> bool {
        let overlap = self.position.overlap()[axis];
        overlap == 0.0 || self.position.offset[axis] >= overlap
    }

    pub fn header_locked(&self) -> f64 {
        self.position.header_locked
    }

    pub fn footer_locked(&self) -> f64 {
        self.position.footer_locked
    }

    // =========================================================================
    // Collaborators
    // =========================================================================

    pub fn set_scrollbar(&mut self, axis: Axis, bar: Option<Box<dyn ScrollBar>>) {
        self.scrollbars.set_scrollbar(axis, bar);
        self.scrollbars.sync_size(&self.position);
        self.scrollbars.sync_pos(&self.position);
    }

    pub fn set_page_indicator(&mut self, indicator: Option<Box<dyn PageIndicator>>) {
        self.scrollbars.set_page_indicator(indicator);
        self.sync_page();
    }

    /// Register a listener for `kind`
    pub fn add_listener<F>(&mut self, kind: ScrollEventKind, listener: F) -> ListenerId
    where
        F: FnMut(&mut ScrollEvent) + 'static,
    {
        self.listeners.entry(kind).or_default().add(listener)
    }

    pub fn remove_listener(&mut self, kind: ScrollEventKind, id: ListenerId) -> bool {
        self.listeners
            .get_mut(&kind)
            .is_some_and(|set| set.remove(id))
    }

    /// Maximum header pull on the refresh axis (0 = half the view)
    pub fn set_header_reveal(&mut self, size: f64) {
        self.header_reveal = size.max(0.0);
    }

    /// Maximum footer pull on the refresh axis (0 = half the view)
    pub fn set_footer_reveal(&mut self, size: f64) {
        self.footer_reveal = size.max(0.0);
    }

    /// Gap added to the content when computing loop periods
    pub fn set_loop_gap(&mut self, gap: Vec2) {
        self.loop_gap = gap;
    }

    pub(crate) fn set_loop_axis(&mut self, axis: Option<Axis>) {
        self.looper.set_axis(axis);
        self.position.loop_axis = axis;
    }

    pub(crate) fn set_bounce_back(&mut self, enabled: bool) {
        self.config.bounce_back = enabled;
    }

    fn loop_span(&self, axis: Axis) -> LoopSpan {
        LoopSpan {
            content: self.position.content_size()[axis],
            gap: self.loop_gap[axis],
            overlap: self.position.overlap()[axis],
        }
    }

    // =========================================================================
    // Sizes
    // =========================================================================

    pub fn set_view_size(&mut self, size: Vec2) {
        if size == self.position.view_size() {
            return;
        }
        self.position.set_view_size(size);
        self.on_size_changed();
    }

    /// Update content size. A viewport resting on the far edge stays there.
    pub fn set_content_size(&mut self, size: Vec2) {
        if size == self.position.content_size() {
            return;
        }
        self.position.set_content_size(size);
        self.on_size_changed();
    }

    fn on_size_changed(&mut self) {
        self.scrollbars.sync_size(&self.position);
        if !self.tween.is_active() && !self.gesture.is_dragging() {
            self.pos_changed(false);
        }
    }

    /// Content size changed while items were being laid out during a
    /// scroll. `delta_pos` is how far the content before the visible items
    /// moved; the anchor follows it so visible items stay put.
    pub fn change_content_size_on_scrolling(&mut self, delta_size: Vec2, delta_pos: Vec2) {
        let pinned = Axis::BOTH.map(|axis| self.position.is_pinned_end(axis));
        let size = self.position.content_size() + delta_size;
        self.position.resize_content(size, false);
        self.scrollbars.sync_size(&self.position);

        for axis in Axis::BOTH {
            let idx = axis as usize;
            match self.tween.mode() {
                TweenMode::Locked => {
                    let tween = self.tween.axis_mut(axis);
                    if delta_size[axis] != 0.0 && pinned[idx] && tween.change > 0.0 {
                        let overlap = self.position.overlap()[axis];
                        self.position.offset[axis] = overlap;
                        tween.change = overlap - tween.start;
                    }
                }
                TweenMode::SettleToEdge | TweenMode::ReleaseGlide => {
                    if delta_pos[axis] != 0.0 {
                        self.position.display[axis] += delta_pos[axis];
                        self.tween.axis_mut(axis).start += delta_pos[axis];
                        self.position.offset[axis] =
                            self.position.clamp(axis, self.position.display[axis]);
                    }
                }
                TweenMode::None if self.dragged => {
                    if delta_pos[axis] != 0.0 {
                        self.position.display[axis] += delta_pos[axis];
                        self.gesture.shift_origin(Vec2::ZERO.with(axis, delta_pos[axis]));
                        self.position.offset[axis] =
                            self.position.clamp(axis, self.position.display[axis]);
                    }
                }
                TweenMode::None => {
                    if delta_size[axis] != 0.0 && pinned[idx] {
                        let overlap = self.position.overlap()[axis];
                        self.position.offset[axis] = overlap;
                        self.position.display[axis] = overlap;
                    }
                }
            }
        }
        self.sync_page();
    }

    // =========================================================================
    // Programmatic positioning
    // =========================================================================

    pub fn set_pos(&mut self, axis: Axis, value: f64, animated: bool) {
        let mut value = value;
        if self.looper.applies_to(axis) {
            let (wrapped, moved) =
                self.looper
                    .wrap_new_pos(axis, value, self.position.offset[axis], self.loop_span(axis));
            value = wrapped;
            if let Some(current) = moved {
                self.position.display[axis] = current;
            }
        }
        if self.position.set_offset(axis, value) {
            self.pos_changed(animated);
        }
    }

    pub fn set_pos_x(&mut self, value: f64, animated: bool) {
        self.set_pos(Axis::X, value, animated);
    }

    pub fn set_pos_y(&mut self, value: f64, animated: bool) {
        self.set_pos(Axis::Y, value, animated);
    }

    pub fn set_percent(&mut self, axis: Axis, percent: f64, animated: bool) {
        let value = self.position.overlap()[axis] * percent.clamp(0.0, 1.0);
        self.set_pos(axis, value, animated);
    }

    pub fn set_percent_x(&mut self, percent: f64, animated: bool) {
        self.set_percent(Axis::X, percent, animated);
    }

    pub fn set_percent_y(&mut self, percent: f64, animated: bool) {
        self.set_percent(Axis::Y, percent, animated);
    }

    fn step(&self, axis: Axis) -> f64 {
        if self.config.page_mode {
            self.position.page_size()[axis]
        } else {
            self.config.scroll_step
        }
    }

    /// Scroll back by `ratio` steps (pages in page mode)
    pub fn scroll_up(&mut self, ratio: f64, animated: bool) {
        let value = self.position.offset.y - self.step(Axis::Y) * ratio;
        self.set_pos(Axis::Y, value, animated);
    }

    pub fn scroll_down(&mut self, ratio: f64, animated: bool) {
        let value = self.position.offset.y + self.step(Axis::Y) * ratio;
        self.set_pos(Axis::Y, value, animated);
    }

    pub fn scroll_left(&mut self, ratio: f64, animated: bool) {
        let value = self.position.offset.x - self.step(Axis::X) * ratio;
        self.set_pos(Axis::X, value, animated);
    }

    pub fn scroll_right(&mut self, ratio: f64, animated: bool) {
        let value = self.position.offset.x + self.step(Axis::X) * ratio;
        self.set_pos(Axis::X, value, animated);
    }

    pub fn scroll_top(&mut self, animated: bool) {
        self.set_percent(Axis::Y, 0.0, animated);
    }

    pub fn scroll_bottom(&mut self, animated: bool) {
        self.set_percent(Axis::Y, 1.0, animated);
    }

    pub fn scroll_left_edge(&mut self, animated: bool) {
        self.set_percent(Axis::X, 0.0, animated);
    }

    pub fn scroll_right_edge(&mut self, animated: bool) {
        self.set_percent(Axis::X, 1.0, animated);
    }

    /// Bring `rect` (content coordinates) into view. With `set_first` the
    /// rect is aligned to the leading edge.
    pub fn scroll_to_view(&mut self, rect: Rect, animated: bool, set_first: bool) {
        for axis in Axis::BOTH {
            if self.position.overlap()[axis] <= 0.0 {
                continue;
            }
            if let Some(target) = self.view_target(axis, rect, set_first) {
                self.set_pos(axis, target, animated);
            }
        }
    }

    fn view_target(&self, axis: Axis, rect: Rect, set_first: bool) -> Option<f64> {
        let start = self.position.offset[axis];
        let view = self.position.view_size()[axis];
        let end = start + view;
        let page = self.position.page_size()[axis];
        let page_floor = |v: f64| {
            if page > 0.0 {
                (v / page).floor() * page
            } else {
                v
            }
        };

        if set_first || rect.min(axis) <= start || rect.extent(axis) >= view {
            if self.config.page_mode {
                Some(page_floor(rect.min(axis)))
            } else {
                Some(rect.min(axis))
            }
        } else if rect.max(axis) > end {
            if self.config.page_mode {
                Some(page_floor(rect.min(axis)))
            } else if rect.extent(axis) <= view / 2.0 {
                Some(rect.min(axis) + rect.extent(axis) * 2.0 - view)
            } else {
                Some(rect.max(axis) - view)
            }
        } else {
            None
        }
    }

    /// Whether any part of `rect` is inside the view
    pub fn is_child_in_view(&self, rect: Rect) -> bool {
        Axis::BOTH.iter().all(|&axis| {
            if self.position.overlap()[axis] <= 0.0 {
                return true;
            }
            let start = self.position.offset[axis];
            let end = start + self.position.view_size()[axis];
            rect.max(axis) > start && rect.min(axis) < end
        })
    }

    /// Current page along `axis`, rounding past half a page
    pub fn current_page(&self, axis: Axis) -> usize {
        if !self.config.page_mode {
            return 0;
        }
        let size = self.position.page_size()[axis];
        if size <= 0.0 {
            return 0;
        }
        let offset = self.position.offset[axis];
        let mut page = (offset / size).floor();
        if offset - page * size > size * 0.5 {
            page += 1.0;
        }
        page.max(0.0) as usize
    }

    pub fn set_current_page(&mut self, axis: Axis, page: usize, animated: bool) {
        if !self.config.page_mode || self.position.overlap()[axis] <= 0.0 {
            return;
        }
        let value = page as f64 * self.position.page_size()[axis];
        self.set_pos(axis, value, animated);
    }

    pub fn current_page_x(&self) -> usize {
        self.current_page(Axis::X)
    }

    pub fn current_page_y(&self) -> usize {
        self.current_page(Axis::Y)
    }

    pub fn set_current_page_x(&mut self, page: usize, animated: bool) {
        self.set_current_page(Axis::X, page, animated);
    }

    pub fn set_current_page_y(&mut self, page: usize, animated: bool) {
        self.set_current_page(Axis::Y, page, animated);
    }

    /// One mouse-wheel step. Positive deltas scroll forward.
    pub fn wheel(&mut self, delta: f64) {
        if !self.config.mouse_wheel || delta == 0.0 {
            return;
        }
        let mut delta = delta;
        if self.config.snap_to_item && delta.abs() < 1.0 {
            delta = delta.signum();
        }
        let overlap = self.position.overlap();
        let axis = if overlap.x > 0.0 && overlap.y == 0.0 {
            Axis::X
        } else {
            Axis::Y
        };
        let step = if self.config.page_mode {
            self.position.page_size()[axis]
        } else {
            self.config.scroll_step * 2.0
        };
        let value = self.position.offset[axis] + step * delta;
        self.set_pos(axis, value, false);
    }

    fn pos_changed(&mut self, animated: bool) {
        self.anim_flag = match (self.anim_flag, animated) {
            (AnimFlag::Unset, true) => AnimFlag::Animated,
            (AnimFlag::Unset, false) => AnimFlag::Immediate,
            (AnimFlag::Animated, false) => AnimFlag::Immediate,
            (flag, _) => flag,
        };
        self.needs_refresh = true;
    }

    // =========================================================================
    // Edge locks and cancellation
    // =========================================================================

    /// Keep `size` units of the header revealed (0 releases it)
    pub fn lock_header(&mut self, size: f64) {
        let size = size.max(0.0);
        if self.position.header_locked == size {
            return;
        }
        self.position.header_locked = size;
        let axis = self.position.refresh_axis();
        if !self.dispatching_pull && self.position.display[axis] <= 0.0 {
            self.start_edge_tween(axis, -size);
        }
    }

    /// Keep `size` units of the footer revealed (0 releases it)
    pub fn lock_footer(&mut self, size: f64) {
        let size = size.max(0.0);
        if self.position.footer_locked == size {
            return;
        }
        self.position.footer_locked = size;
        let axis = self.position.refresh_axis();
        if !self.dispatching_pull && self.position.display[axis] >= self.position.overlap()[axis] {
            let target = self.position.footer_max(axis);
            self.start_edge_tween(axis, target);
        }
    }

    fn start_edge_tween(&mut self, axis: Axis, target: f64) {
        let start = self.position.display;
        let end = start.with(axis, target);
        let duration = Vec2::splat(self.solver.min_duration());
        self.tween.start(TweenMode::SettleToEdge, start, end, duration);
        self.sync_scrollbar_visibility();
    }

    /// Abort an in-progress drag
    pub fn cancel_dragging(&mut self) {
        self.arbiter.release(self.id);
        self.arbiter.clear_axes();
        let was_active = self.gesture.cancel();
        self.dragged = false;
        if !was_active {
            return;
        }
        tracing::debug!("pane {} drag cancelled", self.id.get());
        self.emit(ScrollEventKind::DragCancel);
        if self.position.is_overscrolled() {
            self.settle_overscroll();
        }
        self.sync_scrollbar_visibility();
    }

    /// Tween an overscrolled display back inside its bounds
    fn settle_overscroll(&mut self) {
        let start = self.position.display;
        let mut target = start;
        for axis in Axis::BOTH {
            target[axis] = self.position.clamp_display(axis, start[axis]);
        }
        if target == start {
            return;
        }
        let duration = Vec2::splat(self.solver.min_duration());
        self.tween.start(TweenMode::SettleToEdge, start, target, duration);
    }

    /// Stop the running tween, completing or freezing it by kind
    pub fn kill_tween(&mut self) {
        self.kill_tween_inner(true);
    }

    fn kill_tween_inner(&mut self, clamp_frozen: bool) {
        if !self.tween.is_active() {
            return;
        }
        let mode = self.tween.mode();
        match self.tween.kill() {
            Some(target) => {
                self.position.display = target;
                self.emit(ScrollEventKind::Scroll);
            }
            None if clamp_frozen => {
                let display = self.position.display;
                for axis in Axis::BOTH {
                    self.position.display[axis] = self.position.clamp_display(axis, display[axis]);
                }
                if display != self.position.display {
                    self.emit(ScrollEventKind::Scroll);
                }
            }
            None => {}
        }
        if mode.is_release() {
            self.sync_offset_from_display();
        }
        self.gesture.settle();
        self.emit(ScrollEventKind::ScrollEnd);
    }

    fn sync_offset_from_display(&mut self) {
        for axis in Axis::BOTH {
            if self.position.overlap()[axis] > 0.0 {
                self.position.offset[axis] = self.position.clamp(axis, self.position.display[axis]);
            }
        }
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    /// Queue a pointer event for the next tick
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.pending_input.push_back(event);
    }

    fn process_pointer(&mut self, ev: PointerEvent, host: &mut dyn ScrollHost) {
        match ev.phase {
            PointerPhase::Begin => self.touch_begin(&ev),
            PointerPhase::Move => self.touch_move(&ev),
            PointerPhase::End => self.touch_end(&ev, host),
            PointerPhase::Cancel => {
                if self.gesture.tracks(ev.id) {
                    self.cancel_dragging();
                }
            }
        }
    }

    fn touch_begin(&mut self, ev: &PointerEvent) {
        if !self.config.touch_drag {
            return;
        }
        if self.tween.is_active() {
            self.kill_tween_inner(false);
            self.dragged = true;
        } else {
            self.dragged = false;
        }
        let now = self.clock.now();
        self.gesture.begin(ev, self.position.display, now);
    }

    fn touch_move(&mut self, ev: &PointerEvent) {
        if !self.config.touch_drag {
            return;
        }
        let now = self.clock.now();
        let ctx = DragContext {
            config: &self.config,
            position: &self.position,
            arbiter: &self.arbiter,
            viewport: self.id,
            header_reveal: self.header_reveal,
            footer_reveal: self.footer_reveal,
        };
        let Some(display) = self.gesture.drag(ev, now, &ctx) else {
            return;
        };

        self.dragged = true;
        self.position.display = display;
        self.sync_offset_from_display();

        if let Some(axis) = self.looper.axis() {
            let before = self.position.display;
            if self.loop_check_current(axis) {
                self.gesture.shift_origin(self.position.display - before);
            }
        }

        self.scrollbars.sync_pos(&self.position);
        self.sync_scrollbar_visibility();
        self.sync_page();
        self.emit(ScrollEventKind::Scroll);
    }

    fn touch_end(&mut self, ev: &PointerEvent, host: &mut dyn ScrollHost) {
        let now = self.clock.now();
        let release = self.gesture.release(ev.id, now, &self.config);
        self.arbiter.release(self.id);
        self.arbiter.clear_axes();
        self.dragged = false;
        let Some(release) = release else {
            // A tap that interrupted a bounce
            if !self.tween.is_active() && self.position.is_overscrolled() {
                self.settle_overscroll();
            }
            return;
        };
        if !self.config.touch_drag {
            self.gesture.settle();
            return;
        }

        let start = self.position.display;
        let mut end = start;
        let mut out_of_range = false;
        for axis in Axis::BOTH {
            let overlap = self.position.overlap()[axis];
            if start[axis] < 0.0 {
                end[axis] = 0.0;
                out_of_range = true;
            } else if start[axis] > overlap {
                end[axis] = overlap;
                out_of_range = true;
            }
        }

        if out_of_range {
            self.release_to_edge(start, end, host);
        } else {
            self.release_glide(start, release, host);
        }
    }

    /// Release while overscrolled: fire pull events, then settle to the edge
    /// or the locked header/footer
    fn release_to_edge(&mut self, start: Vec2, mut end: Vec2, host: &mut dyn ScrollHost) {
        let change = end - start;
        let sensitivity = self.config.tuning.pull_release_sensitivity;
        let pull = if change.x > sensitivity || change.y > sensitivity {
            Some(ScrollEventKind::PullDownRelease)
        } else if change.x < -sensitivity || change.y < -sensitivity {
            Some(ScrollEventKind::PullUpRelease)
        } else {
            None
        };
        if let Some(kind) = pull {
            // Listeners lock the header/footer synchronously
            self.dispatching_pull = true;
            self.emit(kind);
            self.dispatch(host);
            self.dispatching_pull = false;
        }

        let axis = self.position.refresh_axis();
        let header = self.position.header_locked;
        let footer = self.position.footer_locked;
        if header > 0.0 && end[axis] == 0.0 {
            end[axis] = -header;
        } else if footer > 0.0 && end[axis] == self.position.overlap()[axis] {
            end[axis] = self.position.footer_max(axis);
        }

        let duration = Vec2::splat(self.solver.min_duration());
        self.tween.start(TweenMode::SettleToEdge, start, end, duration);
        self.sync_scrollbar_visibility();
    }

    fn release_glide(&mut self, start: Vec2, release: Release, host: &mut dyn ScrollHost) {
        let mut end = start;
        let mut duration = Vec2::splat(self.solver.min_duration());
        if self.config.inertia {
            for axis in Axis::BOTH {
                let glide = self.solver.solve_axis(
                    start[axis],
                    release.velocity[axis],
                    release.velocity_scale_correction,
                    self.position.overlap()[axis],
                );
                end[axis] = glide.target;
                duration[axis] = glide.duration;
            }
        }
        let old_change = end - start;

        let mut tween_start = start;
        if let Some(axis) = self.looper.axis() {
            let (s, t) = self
                .looper
                .check_target(axis, start[axis], end[axis], self.loop_span(axis));
            tween_start[axis] = s;
            end[axis] = t;
        }

        // Inertia seeks the edge instead of carrying past it
        for axis in Axis::BOTH {
            end[axis] = end[axis].clamp(0.0, self.position.overlap()[axis]);
        }

        if self.aligner.is_active() {
            let motion = AlignMotion::Inertial {
                drag_origin: release.drag_origin,
                release: tween_start,
            };
            end = self.align_with(end, motion, host);
        }

        let change = end - tween_start;
        if change.is_zero() {
            self.gesture.settle();
            self.sync_scrollbar_visibility();
            return;
        }
        for axis in Axis::BOTH {
            duration[axis] = self
                .solver
                .fix_duration(duration[axis], old_change[axis], change[axis]);
        }

        if tween_start != start {
            // Loop shift: identical frame, different backing offset
            self.position.display = tween_start;
            self.sync_offset_from_display();
        }
        self.tween.start(TweenMode::ReleaseGlide, tween_start, end, duration);
        self.sync_scrollbar_visibility();
    }

    fn align_with(&self, pos: Vec2, motion: AlignMotion, host: &mut dyn ScrollHost) -> Vec2 {
        let aligner = self.aligner;
        aligner.align(pos, &self.position, motion, |p, dir| host.snap_position(self, p, dir))
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advance a pane with static content
    pub fn tick(&mut self, dt: f64) {
        self.tick_with(dt, &mut NoHost);
    }

    /// Advance one frame: input, deferred refresh, tween, scrollbar sync
    pub fn tick_with(&mut self, dt: f64, host: &mut dyn ScrollHost) {
        self.clock.advance(dt);

        while let Some(ev) = self.pending_input.pop_front() {
            self.process_pointer(ev, host);
        }
        self.dispatch(host);

        host.on_deferred_refresh(self);
        self.flush(host);

        if self.tween.is_active() {
            self.tween_update(dt, host);
        }

        self.scrollbars.sync_pos(&self.position);
        self.sync_scrollbar_visibility();
        self.sync_page();
        self.dispatch(host);

        // A listener moved the pane during the tween step
        if self.needs_refresh {
            self.refresh(host);
        }
    }

    /// Run a pending refresh now and deliver queued notifications
    pub fn flush(&mut self, host: &mut dyn ScrollHost) {
        if self.needs_refresh {
            self.refresh(host);
        }
        self.dispatch(host);
    }

    fn refresh(&mut self, host: &mut dyn ScrollHost) {
        self.refresh_pass(host);
        // Listeners may have moved the pane again; honor it once more now
        if self.needs_refresh {
            self.refresh_pass(host);
        }
        self.scrollbars.sync_pos(&self.position);
        self.anim_flag = AnimFlag::Unset;
    }

    fn refresh_pass(&mut self, host: &mut dyn ScrollHost) {
        self.needs_refresh = false;
        if self.aligner.is_active() {
            let motion = AlignMotion::Settled {
                display: self.position.display,
            };
            let aligned = self.align_with(self.position.offset, motion, host);
            for axis in Axis::BOTH {
                self.position.offset[axis] = self.position.clamp(axis, aligned[axis]);
            }
        }
        self.refresh_display();
        self.emit(ScrollEventKind::Scroll);
        self.dispatch(host);
    }

    fn refresh_display(&mut self) {
        let mut target = self.position.offset;
        for axis in Axis::BOTH {
            if self.position.overlap()[axis] <= 0.0 {
                target[axis] = 0.0;
                self.position.display[axis] = 0.0;
            }
        }

        if self.anim_flag == AnimFlag::Animated && !self.dragged {
            if target != self.position.display {
                let duration = Vec2::splat(self.config.tuning.go_tween_duration);
                self.tween
                    .start(TweenMode::Locked, self.position.display, target, duration);
                self.sync_scrollbar_visibility();
            } else if self.tween.is_active() {
                self.kill_tween_inner(true);
            }
        } else {
            if self.tween.is_active() {
                self.kill_tween_inner(false);
            }
            self.position.display = target;
            if let Some(axis) = self.looper.axis() {
                self.loop_check_current(axis);
            }
        }
        self.sync_page();
    }

    /// Wrap a resting loop offset. Returns true if it jumped.
    fn loop_check_current(&mut self, axis: Axis) -> bool {
        let span = self.loop_span(axis);
        match self.looper.check_current(axis, self.position.offset[axis], span) {
            Some(wrapped) => {
                self.position.offset[axis] = self.position.clamp(axis, wrapped);
                self.position.display = self.position.offset;
                tracing::trace!("loop wrap on {:?} to {}", axis, wrapped);
                true
            }
            None => false,
        }
    }

    fn tween_bounds(&self) -> TweenBounds {
        let mut lo = Vec2::ZERO;
        let mut hi = Vec2::ZERO;
        for axis in Axis::BOTH {
            let (l, h) = self.position.display_bounds(axis);
            lo[axis] = l;
            hi[axis] = h;
        }
        TweenBounds { lo, hi }
    }

    fn tween_update(&mut self, dt: f64, host: &mut dyn ScrollHost) {
        let bounce = BounceParams {
            enabled: self.config.bounce_back,
            threshold: self.config.tuning.bounce_threshold,
            duration: self.config.tuning.min_tween_duration,
        };
        let bounds = self.tween_bounds();
        let mode = self.tween.mode();
        self.position.display = self.tween.advance(dt, self.position.display, bounds, bounce);
        if mode.is_release() {
            self.sync_offset_from_display();
        }

        if self.tween.finish_if_settled() {
            if let Some(axis) = self.looper.axis() {
                self.loop_check_current(axis);
            }
            self.gesture.settle();
            self.sync_scrollbar_visibility();
            self.sync_page();
            self.emit(ScrollEventKind::Scroll);
            self.emit(ScrollEventKind::ScrollEnd);
        } else {
            self.scrollbars.sync_pos(&self.position);
            self.sync_page();
            self.emit(ScrollEventKind::Scroll);
        }
        self.dispatch(host);
    }

    fn sync_scrollbar_visibility(&mut self) {
        let active = self.tween.is_active() || self.gesture.is_dragging();
        self.scrollbars.sync_visibility(&self.position, active);
    }

    fn sync_page(&mut self) {
        if !self.config.page_mode {
            return;
        }
        let axis = if self.position.overlap().x > 0.0 {
            Axis::X
        } else {
            Axis::Y
        };
        let page = self.current_page(axis);
        if self.scrollbars.sync_page(page) {
            self.emit(ScrollEventKind::PageChanged);
        }
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    fn emit(&mut self, kind: ScrollEventKind) {
        self.pending_events.push_back(kind);
    }

    /// Deliver queued notifications: host first for scrolls, then listeners,
    /// then any mutations listeners requested. Past `MAX_DISPATCH` deliveries
    /// the rest is coalesced so every pending kind still arrives once.
    fn dispatch(&mut self, host: &mut dyn ScrollHost) {
        if self.dispatching {
            return;
        }
        self.dispatching = true;
        let mut delivered = 0;
        while let Some(kind) = self.pending_events.pop_front() {
            if delivered == MAX_DISPATCH {
                self.pending_events.push_front(kind);
                self.deliver_coalesced(host);
                break;
            }
            delivered += 1;
            self.deliver(kind, host);
        }
        self.dispatching = false;
    }

    fn deliver(&mut self, kind: ScrollEventKind, host: &mut dyn ScrollHost) {
        if kind == ScrollEventKind::Scroll {
            host.on_scroll(self);
        }
        let mut event = ScrollEvent::new(kind, self);
        if let Some(set) = self.listeners.get_mut(&kind) {
            set.emit(&mut event);
        }
        for request in event.take_requests() {
            self.apply_request(request);
        }
    }

    /// Coalesce what is still pending into one delivery per kind, keeping
    /// first-seen order
    fn deliver_coalesced(&mut self, host: &mut dyn ScrollHost) {
        let pending: Vec<ScrollEventKind> = self.pending_events.drain(..).collect();
        let mut kinds: Vec<ScrollEventKind> = Vec::new();
        for kind in &pending {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }
        tracing::warn!(
            "pane {} coalesced {} notifications into {} after {} deliveries",
            self.id.get(),
            pending.len(),
            kinds.len(),
            MAX_DISPATCH
        );
        for kind in kinds {
            self.deliver(kind, host);
        }
        // Anything queued by these deliveries waits for the next dispatch
    }

    fn apply_request(&mut self, request: ScrollRequest) {
        match request {
            ScrollRequest::SetPos {
                axis,
                value,
                animated,
            } => self.set_pos(axis, value, animated),
            ScrollRequest::SetPercent {
                axis,
                value,
                animated,
            } => self.set_percent(axis, value, animated),
            ScrollRequest::LockHeader(size) => self.lock_header(size),
            ScrollRequest::LockFooter(size) => self.lock_footer(size),
            ScrollRequest::KillTween => self.kill_tween(),
            ScrollRequest::CancelDragging => self.cancel_dragging(),
        }
    }
}

impl Drop for ScrollPane {
    fn drop(&mut self) {
        self.arbiter.release(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DT: f64 = 1.0 / 60.0;

    fn vertical_pane() -> ScrollPane {
        let mut pane = ScrollPane::new(ScrollConfig::default(), Arc::new(GestureArbiter::new()))
            .expect("default config is valid");
        pane.set_view_size(Vec2::new(300.0, 300.0));
        pane.set_content_size(Vec2::new(300.0, 1000.0));
        pane.tick(DT);
        pane
    }

    fn run_until_idle(pane: &mut ScrollPane) {
        for _ in 0..600 {
            pane.tick(DT);
            if !pane.is_tweening() && !pane.needs_refresh() {
                return;
            }
        }
        panic!("pane never settled");
    }

    #[test]
    fn test_immediate_set_pos_applies_on_tick() {
        let mut pane = vertical_pane();
        pane.set_pos_y(400.0, false);
        assert_eq!(pane.offset().y, 400.0);
        assert_eq!(pane.display().y, 0.0);
        assert!(pane.needs_refresh());

        pane.tick(DT);
        assert_eq!(pane.display().y, 400.0);
        assert!(!pane.is_tweening());
    }

    #[test]
    fn test_animated_set_pos_tweens() {
        let mut pane = vertical_pane();
        pane.set_pos_y(400.0, true);
        pane.tick(DT);
        assert_eq!(pane.tween_mode(), TweenMode::Locked);
        assert!(pane.display().y > 0.0 && pane.display().y < 400.0);

        run_until_idle(&mut pane);
        assert_eq!(pane.display().y, 400.0);
    }

    #[test]
    fn test_immediate_wins_over_animated_in_same_tick() {
        let mut pane = vertical_pane();
        pane.set_pos_y(200.0, true);
        pane.set_pos_y(300.0, false);
        pane.tick(DT);
        assert!(!pane.is_tweening());
        assert_eq!(pane.display().y, 300.0);
    }

    #[test]
    fn test_wheel_steps() {
        let mut pane = vertical_pane();
        pane.wheel(1.0);
        assert_eq!(pane.offset().y, pane.config().scroll_step * 2.0);
        pane.wheel(-5.0);
        assert_eq!(pane.offset().y, 0.0);
    }

    #[test]
    fn test_scroll_end_after_tween() {
        let mut pane = vertical_pane();
        let ends = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&ends);
        pane.add_listener(ScrollEventKind::ScrollEnd, move |_| *counter.borrow_mut() += 1);

        pane.set_pos_y(100.0, true);
        run_until_idle(&mut pane);
        assert_eq!(*ends.borrow(), 1);
    }

    #[test]
    fn test_listener_requests_apply_after_dispatch() {
        let mut pane = vertical_pane();
        let fired = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&fired);
        pane.add_listener(ScrollEventKind::Scroll, move |ev| {
            if ev.offset.y == 100.0 && !*flag.borrow() {
                *flag.borrow_mut() = true;
                ev.set_pos(Axis::Y, 500.0, false);
            }
        });

        pane.set_pos_y(100.0, false);
        pane.tick(DT);
        assert!(*fired.borrow());
        assert_eq!(pane.offset().y, 500.0);
        assert_eq!(pane.display().y, 500.0);
    }

    #[test]
    fn test_removed_listener_is_silent() {
        let mut pane = vertical_pane();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        let id = pane.add_listener(ScrollEventKind::Scroll, move |_| *counter.borrow_mut() += 1);
        pane.set_pos_y(50.0, false);
        pane.tick(DT);
        let seen = *count.borrow();
        assert!(seen > 0);

        assert!(pane.remove_listener(ScrollEventKind::Scroll, id));
        pane.set_pos_y(60.0, false);
        pane.tick(DT);
        assert_eq!(*count.borrow(), seen);
    }

    #[test]
    fn test_cancel_dragging_settles_overscroll() {
        let mut pane = vertical_pane();
        let cancels = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&cancels);
        pane.add_listener(ScrollEventKind::DragCancel, move |_| *counter.borrow_mut() += 1);

        pane.handle_pointer(PointerEvent::touch(1, PointerPhase::Begin, Vec2::new(150.0, 100.0)));
        pane.tick(DT);
        pane.handle_pointer(PointerEvent::touch(1, PointerPhase::Move, Vec2::new(150.0, 200.0)));
        pane.tick(DT);
        assert!(pane.is_dragging());
        assert!(pane.display().y < 0.0);

        pane.cancel_dragging();
        pane.tick(DT);
        assert!(!pane.is_dragging());
        assert_eq!(*cancels.borrow(), 1);
        assert_eq!(pane.tween_mode(), TweenMode::SettleToEdge);

        run_until_idle(&mut pane);
        assert_eq!(pane.display().y, 0.0);
    }

    #[test]
    fn test_page_changed_fires_on_page_move() {
        let mut pane = ScrollPane::new(ScrollConfig::paged(), Arc::new(GestureArbiter::new()))
            .expect("paged config is valid");
        pane.set_view_size(Vec2::new(300.0, 300.0));
        pane.set_content_size(Vec2::new(1500.0, 300.0));
        pane.tick(DT);

        let pages = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&pages);
        pane.add_listener(ScrollEventKind::PageChanged, move |ev| sink.borrow_mut().push(ev.page_x));

        pane.set_current_page(Axis::X, 2, false);
        pane.tick(DT);
        assert_eq!(pane.current_page(Axis::X), 2);
        assert_eq!(pages.borrow().as_slice(), &[2]);
    }

    #[test]
    fn test_dropping_pane_releases_arbiter() {
        let arbiter = Arc::new(GestureArbiter::new());
        let mut pane = ScrollPane::new(ScrollConfig::default(), Arc::clone(&arbiter))
            .expect("default config is valid");
        pane.set_view_size(Vec2::new(300.0, 300.0));
        pane.set_content_size(Vec2::new(300.0, 1000.0));
        pane.handle_pointer(PointerEvent::touch(1, PointerPhase::Begin, Vec2::new(150.0, 200.0)));
        pane.tick(DT);
        pane.handle_pointer(PointerEvent::touch(1, PointerPhase::Move, Vec2::new(150.0, 100.0)));
        pane.tick(DT);
        assert_eq!(arbiter.active(), Some(pane.id()));

        drop(pane);
        assert_eq!(arbiter.active(), None);
    }
}
