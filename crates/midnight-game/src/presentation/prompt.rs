//! "Press F to interact" prompt shown above nearby NPCs

use midnight_core::{Bounce, Track};
use serde::{Deserialize, Serialize};

use super::PresentationSurface;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub message: String,
    pub bounce_speed: f32,
    pub bounce_height: f32,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            message: "Press F to interact".to_string(),
            bounce_speed: 2.0,
            bounce_height: 0.1,
        }
    }
}

/// Bouncing interaction prompt
#[derive(Debug, Default)]
pub struct InteractionPrompt {
    pub config: PromptConfig,
    visible: bool,
    bounce: Track<Bounce>,
}

impl InteractionPrompt {
    pub fn new(config: PromptConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn message(&self) -> &str {
        &self.config.message
    }

    /// Vertical offset from the resting position
    pub fn offset(&self) -> f32 {
        self.bounce.get().map_or(0.0, Bounce::offset)
    }
}

impl PresentationSurface for InteractionPrompt {
    fn show(&mut self, _title: &str, _portrait: Option<&str>) {
        if self.visible {
            return;
        }
        self.visible = true;
        self.bounce
            .start(Bounce::new(self.config.bounce_speed, self.config.bounce_height));
    }

    fn set_text(&mut self, line: &str) {
        self.config.message = line.to_string();
    }

    fn hide(&mut self) {
        self.visible = false;
        self.bounce.cancel();
    }

    fn update(&mut self, dt: f32) {
        self.bounce.advance(dt);
    }
}
