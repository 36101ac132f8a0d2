//! Virtual list windowing, recycling, and selection

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use glide_core::{Axis, GestureArbiter, PointerEvent, PointerPhase, Vec2};
use glide_scroll::list::loop_mode_for;
use glide_scroll::{
    ItemFactory, ListItem, ListLayout, Positionable, Resizable, ResourceId, ScrollConfig,
    ScrollError, SelectionChange, SelectionMode, VirtualList, WidgetKind,
};

const DT: f64 = 1.0 / 60.0;

#[derive(Debug)]
struct Row {
    size: Vec2,
    pos: Vec2,
    kind: WidgetKind,
    selected: bool,
    visible: bool,
    label: Option<usize>,
}

impl Resizable for Row {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }
}

impl Positionable for Row {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn set_position(&mut self, position: Vec2) {
        self.pos = position;
    }
}

impl ListItem for Row {
    fn kind(&self) -> WidgetKind {
        self.kind
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

struct RowFactory {
    size: Vec2,
    kind: WidgetKind,
}

impl ItemFactory for RowFactory {
    type Item = Row;

    fn create(&mut self, _resource: &ResourceId) -> Row {
        Row {
            size: self.size,
            pos: Vec2::ZERO,
            kind: self.kind,
            selected: false,
            visible: false,
            label: None,
        }
    }
}

fn build(
    config: ScrollConfig,
    layout: ListLayout,
    view: Vec2,
    item: Vec2,
) -> VirtualList<RowFactory> {
    let factory = RowFactory {
        size: item,
        kind: WidgetKind::Button,
    };
    let mut list = VirtualList::new(
        config,
        Arc::new(GestureArbiter::new()),
        layout,
        factory,
        "row",
    )
    .unwrap();
    list.set_view_size(view);
    list.set_item_size(item);
    list.set_item_renderer(|index, row: &mut Row| row.label = Some(index));
    list
}

/// 300x300 vertical list of 50-high rows
fn column(count: usize) -> VirtualList<RowFactory> {
    let mut list = build(
        ScrollConfig::default(),
        ListLayout::SingleColumn,
        Vec2::new(300.0, 300.0),
        Vec2::new(300.0, 50.0),
    );
    list.set_item_count(count).unwrap();
    list
}

fn labels(list: &VirtualList<RowFactory>) -> Vec<usize> {
    list.visible_items()
        .map(|(index, row)| {
            assert_eq!(row.label, Some(index));
            index
        })
        .collect()
}

#[test]
fn test_initial_window_covers_view_plus_one() {
    let list = column(100);
    assert_eq!(list.visible_range(), 0..7);
    assert_eq!(labels(&list), (0..7).collect::<Vec<_>>());
    assert_eq!(list.pane().content_size().y, 5000.0);
    assert_eq!(list.recycler_stats().created, 7);
    assert!(list.visible_items().all(|(_, row)| row.visible));
}

#[test]
fn test_scroll_to_view_middle_item() {
    let mut list = column(100);
    list.scroll_to_view(50, false, false).unwrap();

    let range = list.visible_range();
    assert!(range.contains(&50), "window {range:?}");
    assert!(range.end <= 56, "window {range:?}");
    let row = list.item(50).unwrap();
    assert_eq!(row.pos, Vec2::new(0.0, 2500.0));
    assert_eq!(list.recycler_stats().created, 7);
}

#[test]
fn test_scroll_to_view_set_first() {
    let mut list = column(100);
    list.scroll_to_view(30, false, true).unwrap();
    assert_eq!(list.pane().offset().y, 1500.0);
    assert_eq!(list.first_visible_index(), 30);
}

#[test]
fn test_scrolling_reuses_leaving_widgets() {
    let mut list = column(100);
    list.pane_mut().set_pos_y(1000.0, false);
    list.tick(DT).unwrap();

    assert_eq!(list.visible_range(), 20..27);
    assert_eq!(labels(&list), (20..27).collect::<Vec<_>>());
    let stats = list.recycler_stats();
    assert_eq!(stats.created, 7);
    assert_eq!(stats.released, 0);
}

#[test]
fn test_refresh_is_idempotent() {
    let mut list = column(100);
    list.pane_mut().set_pos_y(730.0, false);
    list.tick(DT).unwrap();

    list.refresh().unwrap();
    let second = list.refresh().unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.destroyed, 0);
    assert_eq!(second.released, 0);
}

#[test]
fn test_shrinking_count_releases_widgets() {
    let mut list = column(100);
    list.set_item_count(3).unwrap();
    assert_eq!(list.visible_range(), 0..3);
    assert_eq!(list.recycler().live_count(), 3);
    assert_eq!(list.recycler().pooled_count(), 4);
    assert!(list.pane().content_size().y == 150.0);

    list.set_item_count(100).unwrap();
    assert_eq!(list.recycler_stats().created, 7);
}

#[test]
fn test_variable_heights_adjust_content() {
    let mut list = build(
        ScrollConfig::default(),
        ListLayout::SingleColumn,
        Vec2::new(300.0, 300.0),
        Vec2::new(300.0, 50.0),
    );
    list.set_item_renderer(|index, row: &mut Row| {
        row.label = Some(index);
        row.size.y = if index % 2 == 0 { 80.0 } else { 50.0 };
    });
    list.set_item_count(100).unwrap();

    assert_eq!(list.visible_range(), 0..6);
    assert_eq!(list.pane().content_size().y, 5090.0);
    assert_eq!(list.item(3).unwrap().pos.y, 210.0);
    assert_eq!(list.pane().offset().y, 0.0);
}

#[test]
fn test_auto_resize_stretches_rows() {
    let mut list = build(
        ScrollConfig::default(),
        ListLayout::SingleColumn,
        Vec2::new(300.0, 300.0),
        Vec2::new(120.0, 50.0),
    );
    list.set_item_count(10).unwrap();
    assert!(list.visible_items().all(|(_, row)| row.size.x == 300.0));
}

#[test]
fn test_provider_keeps_resources_apart() {
    let mut list = build(
        ScrollConfig::default(),
        ListLayout::SingleColumn,
        Vec2::new(300.0, 300.0),
        Vec2::new(300.0, 50.0),
    );
    list.set_item_provider(|index| (index % 10 == 0).then(|| ResourceId::from("header")));
    list.set_item_count(100).unwrap();
    assert_eq!(list.recycler_stats().created, 7);

    list.pane_mut().set_pos_y(1000.0, false);
    list.tick(DT).unwrap();
    assert_eq!(list.recycler_stats().created, 7);

    list.pane_mut().set_pos_y(1250.0, false);
    list.tick(DT).unwrap();
    // Header 30 takes over the widget header 20 gave up
    assert!(list.item(30).is_some());
    assert_eq!(list.recycler().live_count(), 7);
}

#[test]
fn test_flow_layout_positions() {
    let mut list = build(
        ScrollConfig::default(),
        ListLayout::FlowHorizontal,
        Vec2::new(300.0, 300.0),
        Vec2::new(100.0, 50.0),
    );
    list.set_item_count(10).unwrap();

    assert_eq!(list.engine().line_items(), 3);
    assert_eq!(list.pane().content_size(), Vec2::new(300.0, 200.0));
    assert_eq!(list.item(4).unwrap().pos, Vec2::new(100.0, 50.0));
    assert_eq!(list.item(9).unwrap().pos, Vec2::new(0.0, 150.0));
}

#[test]
fn test_pagination_positions() {
    let mut list = build(
        ScrollConfig::paged(),
        ListLayout::Pagination,
        Vec2::new(300.0, 200.0),
        Vec2::new(100.0, 100.0),
    );
    list.set_item_count(20).unwrap();

    assert_eq!(list.pane().content_size(), Vec2::new(1200.0, 200.0));
    assert_eq!(list.item(5).unwrap().pos, Vec2::new(200.0, 100.0));
    assert_eq!(list.item(9).unwrap().pos, Vec2::new(300.0, 100.0));
    assert!(list.item(7).is_none());

    list.pane_mut().set_current_page(Axis::X, 1, false);
    list.tick(DT).unwrap();
    assert_eq!(list.item(7).unwrap().pos, Vec2::new(400.0, 0.0));
    assert_eq!(list.item(12).unwrap().pos, Vec2::new(600.0, 0.0));
    assert!(list.item(0).is_none());
}

#[test]
fn test_loop_starts_mid_content() {
    let config = ScrollConfig {
        loop_mode: loop_mode_for(ListLayout::SingleColumn),
        ..Default::default()
    };
    let mut list = build(
        config,
        ListLayout::SingleColumn,
        Vec2::new(300.0, 300.0),
        Vec2::new(300.0, 50.0),
    );
    list.set_item_count(10).unwrap();

    assert!(list.is_looping());
    assert!(!list.pane().config().bounce_back);
    assert_eq!(list.pane().content_size().y, 3000.0);
    assert_eq!(list.pane().offset().y, 1500.0);
    assert_eq!(list.first_visible_index(), 0);
    assert_eq!(labels(&list), vec![0, 1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_loop_wraps_past_start() {
    let config = ScrollConfig {
        loop_mode: loop_mode_for(ListLayout::SingleColumn),
        ..Default::default()
    };
    let mut list = build(
        config,
        ListLayout::SingleColumn,
        Vec2::new(300.0, 300.0),
        Vec2::new(300.0, 50.0),
    );
    list.set_item_count(10).unwrap();

    list.pane_mut().set_pos_y(0.0, false);
    list.tick(DT).unwrap();
    let offset = list.pane().offset().y;
    assert!(offset > 0.0 && offset < list.pane().overlap().y);
    assert_eq!(list.first_visible_index(), 0);

    list.scroll_to_view(3, false, false).unwrap();
    assert!(list.item(3).is_some());
}

#[test]
fn test_toggling_loop_restores_bounce() {
    let mut list = column(10);
    assert!(list.pane().config().bounce_back);

    list.set_loop(true).unwrap();
    assert!(!list.pane().config().bounce_back);
    assert_eq!(list.pane().content_size().y, 3000.0);

    list.set_loop(false).unwrap();
    assert!(list.pane().config().bounce_back);
    assert_eq!(list.pane().content_size().y, 500.0);
}

#[test]
fn test_loop_rejected_for_flow() {
    let config = ScrollConfig {
        loop_mode: loop_mode_for(ListLayout::FlowHorizontal),
        ..Default::default()
    };
    let result = VirtualList::new(
        config,
        Arc::new(GestureArbiter::new()),
        ListLayout::FlowHorizontal,
        RowFactory {
            size: Vec2::new(100.0, 50.0),
            kind: WidgetKind::Plain,
        },
        "row",
    );
    assert!(matches!(result, Err(ScrollError::UnsupportedCombination(_))));

    let mut list = column(10);
    list.set_layout(ListLayout::FlowHorizontal).unwrap();
    assert!(matches!(
        list.set_loop(true),
        Err(ScrollError::UnsupportedCombination(_))
    ));
}

#[test]
fn test_count_requires_renderer() {
    let mut list = VirtualList::new(
        ScrollConfig::default(),
        Arc::new(GestureArbiter::new()),
        ListLayout::SingleColumn,
        RowFactory {
            size: Vec2::new(300.0, 50.0),
            kind: WidgetKind::Plain,
        },
        "row",
    )
    .unwrap();
    assert!(matches!(
        list.set_item_count(10),
        Err(ScrollError::Configuration(_))
    ));
}

#[test]
fn test_index_out_of_range() {
    let mut list = column(100);
    let err = list.scroll_to_view(100, false, false).unwrap_err();
    assert!(matches!(err, ScrollError::IndexOutOfRange { index: 100, len: 100 }));
    assert!(list.add_selection(200, false).is_err());
}

#[test]
fn test_child_index_translation() {
    let mut list = column(100);
    assert_eq!(list.child_index_to_item_index(0), Some(0));
    assert_eq!(list.item_index_to_child_index(3), Some(3));

    list.pane_mut().set_pos_y(1000.0, false);
    list.tick(DT).unwrap();
    assert_eq!(list.child_index_to_item_index(0), Some(20));
    assert_eq!(list.item_index_to_child_index(22), Some(2));
    assert_eq!(list.item_index_to_child_index(3), None);
}

#[test]
fn test_single_selection_replaces() {
    let mut list = column(100);
    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    list.on_selection_changed(move |change: &mut SelectionChange| sink.borrow_mut().push(*change));

    list.add_selection(2, false).unwrap();
    list.add_selection(4, false).unwrap();
    assert_eq!(list.selection(), vec![4]);
    assert_eq!(list.selected_index(), Some(4));
    assert!(list.item(4).unwrap().selected);
    assert!(!list.item(2).unwrap().selected);
    assert_eq!(
        changes.borrow().as_slice(),
        &[
            SelectionChange { index: 2, selected: true },
            SelectionChange { index: 2, selected: false },
            SelectionChange { index: 4, selected: true },
        ]
    );
}

#[test]
fn test_multiple_selection_toggles() {
    let mut list = column(100);
    list.set_selection_mode(SelectionMode::Multiple);
    list.click_item(1).unwrap();
    list.click_item(3).unwrap();
    list.click_item(1).unwrap();
    assert_eq!(list.selection(), vec![3]);

    list.select_all();
    assert_eq!(list.selection().len(), 100);
    list.clear_selection();
    assert!(list.selection().is_empty());
}

#[test]
fn test_no_selection_mode_ignores_clicks() {
    let mut list = column(100);
    list.set_selection_mode(SelectionMode::None);
    list.click_item(1).unwrap();
    list.add_selection(2, false).unwrap();
    assert!(list.selection().is_empty());
}

#[test]
fn test_selection_survives_recycling() {
    let mut list = column(100);
    list.add_selection(2, false).unwrap();

    list.pane_mut().set_pos_y(1000.0, false);
    list.tick(DT).unwrap();
    assert!(list.is_selected(2));
    assert!(list.visible_items().all(|(_, row)| !row.selected));

    list.pane_mut().set_pos_y(0.0, false);
    list.tick(DT).unwrap();
    assert!(list.item(2).unwrap().selected);
    assert_eq!(list.selection(), vec![2]);
}

#[test]
fn test_add_selection_scrolls_into_view() {
    let mut list = column(100);
    list.add_selection(60, true).unwrap();
    assert!(list.item(60).is_some_and(|row| row.selected));
}

#[test]
fn test_refresh_gives_up_when_rows_collapse() {
    let mut list = column(200);
    list.pane_mut().set_pos_y(5000.0, false);
    list.tick(DT).unwrap();
    assert_eq!(list.visible_range().start, 100);

    // Every newly bound row measures zero, so the gap above the window
    // never closes while the drag keeps pulling the view back
    list.set_item_renderer(|index, row: &mut Row| {
        row.label = Some(index);
        row.size.y = 0.0;
    });
    list.handle_pointer(PointerEvent::touch(1, PointerPhase::Begin, Vec2::new(150.0, 100.0)));
    list.tick(DT).unwrap();
    list.handle_pointer(PointerEvent::touch(1, PointerPhase::Move, Vec2::new(150.0, 200.0)));
    let result = list.tick(DT);
    assert!(
        matches!(result, Err(ScrollError::RefreshDiverged { attempts: 20 })),
        "{result:?}"
    );

    let range = list.visible_range();
    assert_eq!(labels(&list), range.clone().collect::<Vec<_>>());
    assert_eq!(list.recycler().live_count(), range.len());
    assert!(list.pane().display().y >= 0.0);
}

fn snap_height(index: usize) -> f64 {
    if index % 2 == 0 {
        80.0
    } else {
        50.0
    }
}

/// Snap-to-item column of alternating 80/50 rows, every row measured
fn snapping_column() -> VirtualList<RowFactory> {
    let config = ScrollConfig {
        snap_to_item: true,
        ..Default::default()
    };
    let mut list = build(
        config,
        ListLayout::SingleColumn,
        Vec2::new(300.0, 300.0),
        Vec2::new(300.0, 50.0),
    );
    list.set_item_renderer(|index, row: &mut Row| {
        row.label = Some(index);
        row.size.y = snap_height(index);
    });
    list.set_item_count(60).unwrap();
    for _ in 0..40 {
        let next = list.pane().offset().y + 250.0;
        list.pane_mut().set_pos_y(next, false);
        list.tick(DT).unwrap();
    }
    list.pane_mut().set_pos_y(0.0, false);
    list.tick(DT).unwrap();
    assert_eq!(list.pane().content_size().y, 3900.0);
    list
}

fn item_starts() -> Vec<f64> {
    (0..60)
        .scan(0.0, |pos, index| {
            let start = *pos;
            *pos += snap_height(index);
            Some(start)
        })
        .collect()
}

fn flick(list: &mut VirtualList<RowFactory>, ys: &[f64]) {
    let points: Vec<Vec2> = ys.iter().map(|&y| Vec2::new(150.0, y)).collect();
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    list.handle_pointer(PointerEvent::touch(1, PointerPhase::Begin, *first));
    list.tick(DT).unwrap();
    for &point in rest {
        list.handle_pointer(PointerEvent::touch(1, PointerPhase::Move, point));
        list.tick(DT).unwrap();
    }
    let end = rest.last().copied().unwrap_or(*first);
    list.handle_pointer(PointerEvent::touch(1, PointerPhase::End, end));
    list.tick(DT).unwrap();
    assert!(list.pane().is_tweening());
    for _ in 0..600 {
        list.tick(DT).unwrap();
        if !list.pane().is_tweening() {
            return;
        }
    }
    panic!("list never settled");
}

fn assert_rests_on_item(list: &VirtualList<RowFactory>) {
    let offset = list.pane().offset().y;
    assert!(item_starts().contains(&offset), "resting at {offset}");
    assert_eq!(list.pane().display().y, offset);
    let top = list.visible_items().next().map(|(_, row)| row.pos.y);
    assert_eq!(top, Some(offset));
}

#[test]
fn test_forward_flick_snaps_to_item() {
    let mut list = snapping_column();
    flick(&mut list, &[280.0, 200.0, 120.0, 40.0]);
    assert!(list.pane().offset().y > 240.0);
    assert_rests_on_item(&list);
}

#[test]
fn test_backward_flick_snaps_to_item() {
    let mut list = snapping_column();
    list.pane_mut().set_pos_y(2000.0, false);
    list.tick(DT).unwrap();
    let start = list.pane().offset().y;

    flick(&mut list, &[40.0, 120.0, 200.0, 280.0]);
    assert!(list.pane().offset().y < start - 240.0);
    assert_rests_on_item(&list);
}
