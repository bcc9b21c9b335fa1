//! Midnight Core - Shared clocks and timing primitives for Midnight Walk
//!
//! This crate provides the foundational pieces used by the narrative layer:
//! - Dual-clock game time (gameplay time that can pause, presentation time that never does)
//! - Cancellable timed sequences (fades, letter reveals, bounces, delays)
//! - Color type for tints and overlays

pub mod sequence;
pub mod time;
pub mod types;

pub use glam::{Vec2, Vec3};
pub use sequence::{Bounce, Delay, Fade, Reveal, Sequence, SequenceState, Track};
pub use time::{GameTime, TimeConfig};
pub use types::Color;
