//! Page and item alignment of glide targets

use glide_core::{Axis, Vec2};

use crate::config::ScrollConfig;
use crate::position::PositionState;

/// How the candidate target was produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlignMotion {
    /// Release of a drag: `drag_origin` is the display at touch-begin and
    /// `release` the display when the finger lifted
    Inertial { drag_origin: Vec2, release: Vec2 },
    /// Programmatic scroll or refresh, measured from the current display
    Settled { display: Vec2 },
}

/// Whether a position `delta` units into an item of `size` should snap to
/// the following item. `direction > 0` means the offset is increasing.
pub fn should_snap_to_next(direction: f64, delta: f64, size: f64, threshold: f64) -> bool {
    if direction > 0.0 {
        delta > threshold * size
    } else if direction < 0.0 {
        delta > (1.0 - threshold) * size
    } else {
        delta > size / 2.0
    }
}

/// Page mode and snap-to-item alignment
#[derive(Debug, Clone, Copy)]
pub struct AlignmentResolver {
    page_mode: bool,
    snap_to_item: bool,
    paging_threshold: f64,
    snapping_threshold: f64,
}

impl AlignmentResolver {
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            page_mode: config.page_mode,
            snap_to_item: config.snap_to_item,
            paging_threshold: config.tuning.paging_threshold,
            snapping_threshold: config.tuning.snapping_threshold,
        }
    }

    pub fn is_active(&self) -> bool {
        self.page_mode || self.snap_to_item
    }

    pub fn snapping_threshold(&self) -> f64 {
        self.snapping_threshold
    }

    /// Align a candidate target. `snap` maps a position and motion direction
    /// to the nearest item boundary and is only consulted in snap mode.
    pub fn align<S>(&self, pos: Vec2, position: &PositionState, motion: AlignMotion, snap: S) -> Vec2
    where
        S: FnOnce(Vec2, Vec2) -> Option<Vec2>,
    {
        if self.page_mode {
            let mut out = pos;
            for axis in Axis::BOTH {
                out[axis] = self.align_by_page(pos[axis], axis, position, motion);
            }
            out
        } else if self.snap_to_item {
            let direction = match motion {
                AlignMotion::Inertial { drag_origin, .. } => pos - drag_origin,
                AlignMotion::Settled { .. } => Vec2::ZERO,
            };
            let Some(snapped) = snap(pos, direction) else {
                return pos;
            };
            let overlap = position.overlap();
            let mut out = pos;
            for axis in Axis::BOTH {
                if pos[axis] > 0.0 && pos[axis] < overlap[axis] {
                    out[axis] = snapped[axis];
                }
            }
            out
        } else {
            pos
        }
    }

    fn last_page(content: f64, page_size: f64) -> i64 {
        ((content / page_size).ceil() as i64 - 1).max(0)
    }

    fn page_at(pos: f64, overlap: f64, content: f64, page_size: f64) -> i64 {
        if pos < 0.0 {
            0
        } else if pos > overlap {
            Self::last_page(content, page_size)
        } else {
            (pos / page_size).floor() as i64
        }
    }

    fn align_by_page(&self, pos: f64, axis: Axis, position: &PositionState, motion: AlignMotion) -> f64 {
        let page_size = position.page_size()[axis];
        let overlap = position.overlap()[axis];
        let content = position.content_size()[axis];
        if page_size <= 0.0 || overlap <= 0.0 {
            return pos;
        }

        let mut out = pos;
        let mut page = Self::page_at(pos, overlap, content, page_size);
        if pos < 0.0 {
            out = 0.0;
        } else if pos <= overlap {
            let reference = match motion {
                AlignMotion::Inertial { drag_origin, .. } => drag_origin[axis],
                AlignMotion::Settled { display } => display[axis],
            };
            let change = pos - reference;
            let test_size = page_size.min(content - (page + 1) as f64 * page_size);
            let delta = pos - page as f64 * page_size;

            let advance = if change.abs() > page_size {
                delta > test_size * 0.5
            } else if change > 0.0 {
                delta > test_size * self.paging_threshold
            } else {
                delta > test_size * (1.0 - self.paging_threshold)
            };
            if advance {
                page += 1;
            }
            out = (page as f64 * page_size).min(overlap);
        }

        // Never skip more than one page from the one visible at drag start
        if let AlignMotion::Inertial { drag_origin, release } = motion {
            let old_page = Self::page_at(release[axis], overlap, content, page_size);
            let start_page = (drag_origin[axis] / page_size).floor() as i64;
            if (page - start_page).abs() > 1 && (old_page - start_page).abs() <= 1 {
                page = if page > start_page {
                    start_page + 1
                } else {
                    start_page - 1
                };
                out = (page as f64 * page_size).clamp(0.0, overlap);
                tracing::debug!("page guard limited release to page {page}");
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScrollDirection;

    fn pager(pages: f64) -> (AlignmentResolver, PositionState) {
        let config = ScrollConfig::paged();
        let mut position = PositionState::new(ScrollDirection::Horizontal);
        position.set_view_size(Vec2::new(300.0, 300.0));
        position.set_content_size(Vec2::new(300.0 * pages, 300.0));
        (AlignmentResolver::new(&config), position)
    }

    #[test]
    fn test_short_forward_flick_advances() {
        let (resolver, position) = pager(5.0);
        let motion = AlignMotion::Inertial {
            drag_origin: Vec2::ZERO,
            release: Vec2::new(40.0, 0.0),
        };
        // 50 units into page 0 while moving forward crosses 10%
        let out = resolver.align(Vec2::new(50.0, 0.0), &position, motion, |_, _| None);
        assert_eq!(out.x, 300.0);
    }

    #[test]
    fn test_short_backward_drag_returns() {
        let (resolver, position) = pager(5.0);
        let motion = AlignMotion::Inertial {
            drag_origin: Vec2::new(300.0, 0.0),
            release: Vec2::new(260.0, 0.0),
        };
        // Moving back from page 1, 250 units into page 0 is under 90%
        let out = resolver.align(Vec2::new(250.0, 0.0), &position, motion, |_, _| None);
        assert_eq!(out.x, 0.0);
    }

    #[test]
    fn test_long_drag_uses_half_page() {
        let (resolver, position) = pager(5.0);
        let motion = AlignMotion::Settled {
            display: Vec2::ZERO,
        };
        let out = resolver.align(Vec2::new(640.0, 0.0), &position, motion, |_, _| None);
        assert_eq!(out.x, 600.0);
        let out = resolver.align(Vec2::new(760.0, 0.0), &position, motion, |_, _| None);
        assert_eq!(out.x, 900.0);
    }

    #[test]
    fn test_guard_limits_to_one_page() {
        let (resolver, position) = pager(10.0);
        let motion = AlignMotion::Inertial {
            drag_origin: Vec2::ZERO,
            release: Vec2::new(80.0, 0.0),
        };
        let out = resolver.align(Vec2::new(1500.0, 0.0), &position, motion, |_, _| None);
        assert_eq!(out.x, 300.0);
    }

    #[test]
    fn test_should_snap_to_next() {
        assert!(should_snap_to_next(1.0, 6.0, 50.0, 0.1));
        assert!(!should_snap_to_next(-1.0, 40.0, 50.0, 0.1));
        assert!(should_snap_to_next(-1.0, 46.0, 50.0, 0.1));
        assert!(should_snap_to_next(0.0, 26.0, 50.0, 0.1));
        assert!(!should_snap_to_next(0.0, 24.0, 50.0, 0.1));
    }

    #[test]
    fn test_snap_only_inside_range() {
        let config = ScrollConfig {
            snap_to_item: true,
            ..Default::default()
        };
        let resolver = AlignmentResolver::new(&config);
        let mut position = PositionState::new(ScrollDirection::Vertical);
        position.set_view_size(Vec2::new(100.0, 100.0));
        position.set_content_size(Vec2::new(100.0, 500.0));

        let motion = AlignMotion::Settled {
            display: Vec2::ZERO,
        };
        let snap = |p: Vec2, _dir: Vec2| Some(Vec2::new(p.x, (p.y / 50.0).round() * 50.0));
        assert_eq!(resolver.align(Vec2::new(0.0, 130.0), &position, motion, snap).y, 150.0);
        assert_eq!(resolver.align(Vec2::new(0.0, 420.0), &position, motion, snap).y, 420.0);
    }
}
