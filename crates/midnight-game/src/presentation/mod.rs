//! Presentation collaborators
//!
//! The narrative core only talks to UI through these traits. Implementations
//! advance their own animations on the unscaled presentation clock, so they
//! keep moving while gameplay is paused for dialogue.

pub mod dialogue_panel;
pub mod ending_screen;
pub mod item_info;
pub mod mask_hud;
pub mod prompt;

pub use dialogue_panel::{DialoguePanel, DialoguePanelConfig};
pub use ending_screen::{EndingPhase, EndingScreen, EndingScreenConfig};
pub use item_info::{ItemInfoConfig, ItemInfoPanel};
pub use mask_hud::{MaskHud, MaskHudConfig, MaskIcon};
pub use prompt::{InteractionPrompt, PromptConfig};

use crate::ledger::EndingType;

/// A panel that can show a title and a line of text.
///
/// Every call is idempotent: showing a visible surface or hiding a hidden
/// one is harmless.
pub trait PresentationSurface {
    fn show(&mut self, title: &str, portrait: Option<&str>);
    fn set_text(&mut self, line: &str);
    fn hide(&mut self);

    /// Advance animations by the presentation delta
    fn update(&mut self, _dt: f32) {}
}

/// Plays the closing sequence for an ending
pub trait EndingPresenter {
    fn present(&mut self, ending: EndingType);

    fn update(&mut self, _dt: f32) {}
}
