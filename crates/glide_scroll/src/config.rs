//! Scroll configuration
//!
//! `ScrollConfig` is plain data: build it with `Default`, a preset, struct
//! update syntax, or load it from TOML. Every field has a default so partial
//! TOML documents are accepted.
//!
//! ```toml
//! direction = "horizontal"
//! page_mode = true
//! deceleration_rate = 0.95
//!
//! [scrollbar]
//! visibility = "always"
//! ```

use glide_animation::Easing;
use glide_core::Axis;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrollError};

// ============================================================================
// Direction & loop mode
// ============================================================================

/// Axes the viewport may scroll along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    None,
    Horizontal,
    #[default]
    Vertical,
    Both,
}

impl ScrollDirection {
    pub fn allows(self, axis: Axis) -> bool {
        matches!(
            (self, axis),
            (ScrollDirection::Both, _)
                | (ScrollDirection::Horizontal, Axis::X)
                | (ScrollDirection::Vertical, Axis::Y)
        )
    }
}

/// Axis on which content wraps around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    #[default]
    None,
    Horizontal,
    Vertical,
}

impl LoopMode {
    pub fn axis(self) -> Option<Axis> {
        match self {
            LoopMode::None => None,
            LoopMode::Horizontal => Some(Axis::X),
            LoopMode::Vertical => Some(Axis::Y),
        }
    }
}

// ============================================================================
// Scrollbar
// ============================================================================

/// Scrollbar visibility behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollbarVisibility {
    /// Always visible
    Always,
    /// Visible only while dragging or animating
    #[default]
    Auto,
    /// Never visible
    Never,
}

/// Scrollbar behavior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollbarConfig {
    pub visibility: ScrollbarVisibility,
    /// With `Always`, hide the bar while there is nothing to scroll
    pub display_on_demand: bool,
    /// Minimum thumb length in content units
    pub min_thumb_length: f64,
    /// Padding between the track ends and the viewport edges
    pub edge_padding: f64,
}

impl Default for ScrollbarConfig {
    fn default() -> Self {
        Self {
            visibility: ScrollbarVisibility::Auto,
            display_on_demand: false,
            min_thumb_length: 30.0,
            edge_padding: 2.0,
        }
    }
}

impl ScrollbarConfig {
    pub fn always_visible() -> Self {
        Self {
            visibility: ScrollbarVisibility::Always,
            ..Default::default()
        }
    }

    pub fn hidden() -> Self {
        Self {
            visibility: ScrollbarVisibility::Never,
            ..Default::default()
        }
    }
}

// ============================================================================
// Device & tuning
// ============================================================================

/// Properties of the device the viewport runs on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    /// Touch devices normalize fling velocity by screen size
    pub touch_screen: bool,
    pub screen_width: f64,
    pub screen_height: f64,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            touch_screen: false,
            screen_width: 1920.0,
            screen_height: 1080.0,
        }
    }
}

impl DeviceProfile {
    pub fn touch(screen_width: f64, screen_height: f64) -> Self {
        Self {
            touch_screen: true,
            screen_width,
            screen_height,
        }
    }
}

/// Empirical constants of the gesture, inertia, and tween models
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollTuning {
    /// Ticks per second the deceleration rate is expressed against
    pub tick_rate: f64,
    /// Screen size the touch velocity is normalized to
    pub reference_resolution: f64,
    /// Fling dead zone for mouse input or page mode
    pub mouse_dead_zone: f64,
    /// Fling dead zone for touch free-scroll
    pub touch_dead_zone: f64,
    /// Speed at which an inertial glide is considered stopped
    pub terminal_speed: f64,
    /// Fraction of the ideal glide distance actually travelled
    pub energy_loss: f64,
    /// Shortest release tween, also the bounce-back duration
    pub min_tween_duration: f64,
    /// Duration of animated programmatic scrolls
    pub go_tween_duration: f64,
    /// Rubber-band limit as a fraction of the view size
    pub pull_ratio: f64,
    /// Overshoot past an edge that triggers a bounce restart
    pub bounce_threshold: f64,
    /// Per-frame velocity decay applied across skipped frames
    pub velocity_decay: f64,
    pub touch_sensitivity: f64,
    pub mouse_sensitivity: f64,
    /// Overscroll needed to fire a pull-release event
    pub pull_release_sensitivity: f64,
    /// Fraction of a page a short flick must cross to advance
    pub paging_threshold: f64,
    /// Fraction of an item a forward glide must cross to snap ahead
    pub snapping_threshold: f64,
    /// Distance from an edge at which a loop list wraps
    pub loop_epsilon: f64,
}

impl Default for ScrollTuning {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            reference_resolution: 1136.0,
            mouse_dead_zone: 500.0,
            touch_dead_zone: 1000.0,
            terminal_speed: 60.0,
            energy_loss: 0.4,
            min_tween_duration: 0.3,
            go_tween_duration: 0.5,
            pull_ratio: 0.5,
            bounce_threshold: 20.0,
            velocity_decay: 0.833,
            touch_sensitivity: 20.0,
            mouse_sensitivity: 8.0,
            pull_release_sensitivity: 10.0,
            paging_threshold: 0.1,
            snapping_threshold: 0.1,
            loop_epsilon: 0.001,
        }
    }
}

// ============================================================================
// Scroll configuration
// ============================================================================

/// Configuration for scroll behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub direction: ScrollDirection,
    /// Dragging the content moves it
    pub touch_drag: bool,
    /// Allow rubber-band overscroll and bounce back
    pub bounce_back: bool,
    /// Keep gliding after release
    pub inertia: bool,
    /// Align to whole pages
    pub page_mode: bool,
    /// Page size override; the view size is used when absent
    pub fixed_page_size: Option<[f64; 2]>,
    /// Align to item boundaries reported by the host
    pub snap_to_item: bool,
    pub loop_mode: LoopMode,
    /// Per-tick velocity multiplier for inertial glides
    pub deceleration_rate: f64,
    /// Distance of one scroll step (wheel notch is two steps)
    pub scroll_step: f64,
    pub mouse_wheel: bool,
    pub scrollbar: ScrollbarConfig,
    pub easing: Easing,
    pub device: DeviceProfile,
    pub tuning: ScrollTuning,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            direction: ScrollDirection::Vertical,
            touch_drag: true,
            bounce_back: true,
            inertia: true,
            page_mode: false,
            fixed_page_size: None,
            snap_to_item: false,
            loop_mode: LoopMode::None,
            deceleration_rate: 0.967,
            scroll_step: 25.0,
            mouse_wheel: true,
            scrollbar: ScrollbarConfig::default(),
            easing: Easing::CubicOut,
            device: DeviceProfile::default(),
            tuning: ScrollTuning::default(),
        }
    }
}

impl ScrollConfig {
    /// Create config with bounce disabled
    pub fn no_bounce() -> Self {
        Self {
            bounce_back: false,
            ..Default::default()
        }
    }

    /// Horizontal pager, one view per page
    pub fn paged() -> Self {
        Self {
            direction: ScrollDirection::Horizontal,
            page_mode: true,
            ..Default::default()
        }
    }

    pub fn horizontal() -> Self {
        Self {
            direction: ScrollDirection::Horizontal,
            ..Default::default()
        }
    }

    /// Parse a configuration from TOML and validate it
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: ScrollConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject option combinations the runtime cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.page_mode && self.snap_to_item {
            return Err(ScrollError::UnsupportedCombination(
                "page mode and snap-to-item are mutually exclusive".into(),
            ));
        }
        if !(self.deceleration_rate > 0.0 && self.deceleration_rate < 1.0) {
            return Err(ScrollError::Configuration(format!(
                "deceleration rate must be in (0, 1), got {}",
                self.deceleration_rate
            )));
        }
        if self.scroll_step < 0.0 {
            return Err(ScrollError::Configuration(format!(
                "scroll step must not be negative, got {}",
                self.scroll_step
            )));
        }
        if let Some([w, h]) = self.fixed_page_size {
            if w <= 0.0 || h <= 0.0 {
                return Err(ScrollError::Configuration(format!(
                    "fixed page size must be positive, got {w}x{h}"
                )));
            }
        }
        if self.tuning.tick_rate <= 0.0 {
            return Err(ScrollError::Configuration(
                "tick rate must be positive".into(),
            ));
        }
        Ok(())
    }
}
