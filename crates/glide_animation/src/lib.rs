//! Glide Animation
//!
//! Time-based primitives that drive scroll motion.
//!
//! # Features
//!
//! - **Easing**: normalized curves, cubic ease-out by default
//! - **Axis Tweens**: start/change/duration/elapsed tweens that can be retargeted mid-flight
//! - **Frame Clock**: a monotonically advancing clock fed by the host's frame ticks

pub mod clock;
pub mod easing;
pub mod tween;

pub use clock::FrameClock;
pub use easing::Easing;
pub use tween::AxisTween;
