//! Corner panel describing the item the player carries

use midnight_core::{Fade, Track};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::PresentationSurface;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemInfoConfig {
    pub fade_duration: f32,
    /// How far the panel slides in from the screen edge
    pub slide_distance: f32,
}

impl Default for ItemInfoConfig {
    fn default() -> Self {
        Self {
            fade_duration: 0.3,
            slide_distance: 50.0,
        }
    }
}

#[derive(Debug, Default)]
pub struct ItemInfoPanel {
    pub config: ItemInfoConfig,
    visible: bool,
    name: String,
    description: String,
    fade: Track<Fade>,
}

impl ItemInfoPanel {
    pub fn new(config: ItemInfoConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn alpha(&self) -> f32 {
        self.fade.get().map_or(0.0, Fade::value)
    }

    /// Horizontal offset from the shown position, 0 when fully in
    pub fn slide(&self) -> f32 {
        (1.0 - self.alpha()) * self.config.slide_distance
    }

    fn fade_to(&mut self, target: f32) {
        let from = self.alpha();
        self.fade.start(Fade::new(from, target, self.config.fade_duration));
    }
}

impl PresentationSurface for ItemInfoPanel {
    fn show(&mut self, title: &str, _portrait: Option<&str>) {
        self.name = title.to_string();
        self.description.clear();
        if !self.visible {
            self.visible = true;
            self.fade_to(1.0);
        }
        debug!("Item info shown: {}", title);
    }

    fn set_text(&mut self, line: &str) {
        self.description = line.to_string();
    }

    fn hide(&mut self) {
        if self.visible {
            self.visible = false;
            self.fade_to(0.0);
        }
    }

    fn update(&mut self, dt: f32) {
        self.fade.advance(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shows_name_and_description() {
        let mut panel = ItemInfoPanel::default();
        panel.show("Matchbox", None);
        panel.set_text("Three matches left.");

        assert!(panel.is_visible());
        assert_eq!(panel.name(), "Matchbox");
        assert_eq!(panel.description(), "Three matches left.");
        assert_eq!(panel.slide(), 50.0);

        panel.update(0.3);
        assert_eq!(panel.alpha(), 1.0);
        assert_eq!(panel.slide(), 0.0);
    }

    #[test]
    fn test_hide_slides_out() {
        let mut panel = ItemInfoPanel::default();
        panel.show("Paper Flower", None);
        panel.update(0.3);
        panel.hide();
        panel.update(0.15);
        assert!(panel.slide() > 0.0 && panel.slide() < 50.0);
        panel.update(0.15);
        assert_eq!(panel.alpha(), 0.0);
        assert!(!panel.is_visible());
    }
}
