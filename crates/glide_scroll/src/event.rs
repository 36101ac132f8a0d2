//! Scroll notifications and the host seam
//!
//! Listeners receive a snapshot of the pane in a [`ScrollEvent`] and cannot
//! touch the pane directly. Mutations they want are queued on the event as
//! [`ScrollRequest`]s and applied right after dispatch, which is how a
//! re-entrant change gets honored inside the same tick.

use glide_core::events::event_types;
use glide_core::{Axis, EventType, Vec2, ViewportId};

use crate::pane::ScrollPane;

/// Observable events of a scroll pane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollEventKind {
    /// The rendered position changed
    Scroll,
    /// A tween finished or was killed
    ScrollEnd,
    /// Released while pulled past the leading edge
    PullDownRelease,
    /// Released while pulled past the trailing edge
    PullUpRelease,
    /// The current page changed in page mode
    PageChanged,
    /// A drag was cancelled externally
    DragCancel,
}

impl ScrollEventKind {
    pub fn event_type(self) -> EventType {
        match self {
            ScrollEventKind::Scroll => event_types::SCROLL,
            ScrollEventKind::ScrollEnd => event_types::SCROLL_END,
            ScrollEventKind::PullDownRelease => event_types::PULL_DOWN_RELEASE,
            ScrollEventKind::PullUpRelease => event_types::PULL_UP_RELEASE,
            ScrollEventKind::PageChanged => event_types::PAGE_CHANGED,
            ScrollEventKind::DragCancel => event_types::DRAG_CANCEL,
        }
    }
}

/// A mutation requested from inside a listener
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollRequest {
    SetPos { axis: Axis, value: f64, animated: bool },
    SetPercent { axis: Axis, value: f64, animated: bool },
    LockHeader(f64),
    LockFooter(f64),
    KillTween,
    CancelDragging,
}

/// Snapshot delivered to listeners
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollEvent {
    pub kind: ScrollEventKind,
    pub viewport: ViewportId,
    pub offset: Vec2,
    pub display: Vec2,
    pub percent: Vec2,
    pub page_x: usize,
    pub page_y: usize,
    requests: Vec<ScrollRequest>,
}

impl ScrollEvent {
    pub(crate) fn new(kind: ScrollEventKind, pane: &ScrollPane) -> Self {
        Self {
            kind,
            viewport: pane.id(),
            offset: pane.offset(),
            display: pane.display(),
            percent: Vec2::new(pane.percent(Axis::X), pane.percent(Axis::Y)),
            page_x: pane.current_page(Axis::X),
            page_y: pane.current_page(Axis::Y),
            requests: Vec::new(),
        }
    }

    pub fn set_pos(&mut self, axis: Axis, value: f64, animated: bool) {
        self.requests.push(ScrollRequest::SetPos {
            axis,
            value,
            animated,
        });
    }

    pub fn set_percent(&mut self, axis: Axis, value: f64, animated: bool) {
        self.requests.push(ScrollRequest::SetPercent {
            axis,
            value,
            animated,
        });
    }

    /// Keep `size` units of header revealed (0 releases it)
    pub fn lock_header(&mut self, size: f64) {
        self.requests.push(ScrollRequest::LockHeader(size));
    }

    /// Keep `size` units of footer revealed (0 releases it)
    pub fn lock_footer(&mut self, size: f64) {
        self.requests.push(ScrollRequest::LockFooter(size));
    }

    pub fn kill_tween(&mut self) {
        self.requests.push(ScrollRequest::KillTween);
    }

    pub fn cancel_dragging(&mut self) {
        self.requests.push(ScrollRequest::CancelDragging);
    }

    pub fn requests(&self) -> &[ScrollRequest] {
        &self.requests
    }

    pub(crate) fn take_requests(&mut self) -> Vec<ScrollRequest> {
        std::mem::take(&mut self.requests)
    }
}

/// Owner-side hooks of a scroll pane
///
/// A plain scrolling container uses [`NoHost`]. A virtual list implements
/// this to re-resolve its visible window whenever the pane scrolls.
pub trait ScrollHost {
    /// The rendered position changed. Runs before user listeners.
    fn on_scroll(&mut self, _pane: &mut ScrollPane) {}

    /// Start-of-tick refresh, after input and before tweens
    fn on_deferred_refresh(&mut self, _pane: &mut ScrollPane) {}

    /// Nearest item boundary to `pos` given a motion direction
    fn snap_position(&mut self, _pane: &ScrollPane, _pos: Vec2, _direction: Vec2) -> Option<Vec2> {
        None
    }
}

/// Host for panes with static content
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHost;

impl ScrollHost for NoHost {}
