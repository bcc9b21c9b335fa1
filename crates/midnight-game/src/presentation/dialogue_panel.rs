//! Dialogue panel with fade and typewriter reveal

use midnight_core::{Fade, Reveal, Track};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::PresentationSurface;

/// Dialogue panel timings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialoguePanelConfig {
    /// Characters revealed per second, 0 shows lines instantly
    pub chars_per_second: f32,
    /// Panel fade in/out duration in seconds
    pub fade_duration: f32,
}

impl Default for DialoguePanelConfig {
    fn default() -> Self {
        Self {
            chars_per_second: 30.0,
            fade_duration: 0.3,
        }
    }
}

/// Panel showing the speaker, portrait and the current line
#[derive(Debug, Default)]
pub struct DialoguePanel {
    pub config: DialoguePanelConfig,
    visible: bool,
    title: String,
    portrait: Option<String>,
    fade: Track<Fade>,
    reveal: Track<Reveal>,
}

impl DialoguePanel {
    pub fn new(config: DialoguePanelConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn portrait(&self) -> Option<&str> {
        self.portrait.as_deref()
    }

    /// Panel opacity, 0 when never shown
    pub fn alpha(&self) -> f32 {
        self.fade.get().map_or(0.0, Fade::value)
    }

    /// The part of the line revealed so far
    pub fn visible_text(&self) -> &str {
        self.reveal.get().map_or("", Reveal::visible_text)
    }

    pub fn is_revealing(&self) -> bool {
        self.reveal.is_running()
    }

    /// Shown once the whole line is on screen
    pub fn continue_indicator(&self) -> bool {
        self.visible
            && !self.reveal.is_running()
            && self.reveal.get().is_some_and(|r| !r.full_text().is_empty())
    }

    /// Show the full line immediately
    pub fn skip_reveal(&mut self) {
        self.reveal.cancel();
    }

    fn fade_to(&mut self, target: f32) {
        let from = self.alpha();
        self.fade.start(Fade::new(from, target, self.config.fade_duration));
    }
}

impl PresentationSurface for DialoguePanel {
    fn show(&mut self, title: &str, portrait: Option<&str>) {
        self.title = title.to_string();
        self.portrait = portrait.map(str::to_string);
        if !self.visible {
            self.visible = true;
            self.fade_to(1.0);
            debug!("Dialogue panel shown: {}", title);
        }
    }

    fn set_text(&mut self, line: &str) {
        self.reveal
            .start(Reveal::new(line, self.config.chars_per_second));
    }

    fn hide(&mut self) {
        if self.visible {
            self.visible = false;
            self.reveal.clear();
            self.fade_to(0.0);
            debug!("Dialogue panel hidden");
        }
    }

    fn update(&mut self, dt: f32) {
        self.fade.advance(dt);
        self.reveal.advance(dt);
    }
}
