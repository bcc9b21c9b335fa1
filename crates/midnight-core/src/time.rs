//! Time system for Midnight Walk
//!
//! Two clocks advance from the same raw frame delta:
//! - **gameplay** time, which is scaled and stops entirely while paused
//!   (dialogue freezes the world this way)
//! - **presentation** time, which is unscaled and keeps running while paused
//!   so fades and letter reveals still animate

use serde::{Deserialize, Serialize};

/// Configuration for game time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// How many gameplay seconds pass per real second
    pub time_scale: f32,
    /// Maximum delta time to prevent huge steps after a hitch
    pub max_delta_time: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            max_delta_time: 0.25,
        }
    }
}

/// Game time tracking
#[derive(Debug, Clone)]
pub struct GameTime {
    /// Configuration
    pub config: TimeConfig,
    /// Gameplay time since level start in seconds (stops while paused)
    pub total_time: f64,
    /// Presentation time since level start in seconds (never stops)
    pub unscaled_total_time: f64,
    /// Gameplay delta for this frame (0 while paused)
    pub delta_time: f32,
    /// Presentation delta for this frame (clamped, unscaled)
    pub unscaled_delta_time: f32,
    /// Frame counter
    pub frame_count: u64,
    /// Whether gameplay time is paused
    paused: bool,
}

impl Default for GameTime {
    fn default() -> Self {
        Self {
            config: TimeConfig::default(),
            total_time: 0.0,
            unscaled_total_time: 0.0,
            delta_time: 0.0,
            unscaled_delta_time: 0.0,
            frame_count: 0,
            paused: false,
        }
    }
}

impl GameTime {
    /// Create a new game time with custom config
    pub fn new(config: TimeConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Update both clocks with the raw delta from the previous frame
    pub fn update(&mut self, raw_delta: f32) {
        self.unscaled_delta_time = raw_delta.clamp(0.0, self.config.max_delta_time);
        self.unscaled_total_time += self.unscaled_delta_time as f64;
        self.frame_count += 1;

        if self.paused {
            self.delta_time = 0.0;
            return;
        }

        self.delta_time = self.unscaled_delta_time * self.config.time_scale;
        self.total_time += self.delta_time as f64;
    }

    /// Gameplay delta for this frame
    pub fn gameplay_delta(&self) -> f32 {
        self.delta_time
    }

    /// Presentation delta for this frame
    pub fn presentation_delta(&self) -> f32 {
        self.unscaled_delta_time
    }

    /// Pause gameplay time. Presentation time keeps running.
    pub fn pause(&mut self) {
        self.paused = true;
        self.delta_time = 0.0;
    }

    /// Resume gameplay time
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Whether gameplay time is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Set the time scale (0.0 = frozen, 1.0 = normal, 2.0 = double speed)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.config.time_scale = scale.max(0.0);
    }
}
