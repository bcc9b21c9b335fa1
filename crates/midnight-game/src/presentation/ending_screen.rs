//! Closing sequence: fade to black, pause, then fade in the ending text

use midnight_core::{Color, Delay, Fade, Sequence, SequenceState};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::EndingPresenter;
use crate::ledger::EndingType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndingScreenConfig {
    pub fade_to_black: f32,
    pub text_delay: f32,
    pub text_fade: f32,
    pub good_text: String,
    pub neutral_text: String,
    pub bad_text: String,
}

impl Default for EndingScreenConfig {
    fn default() -> Self {
        Self {
            fade_to_black: 2.0,
            text_delay: 1.0,
            text_fade: 1.5,
            good_text: "On an empty night,\na little gentleness\nis enough to be remembered.".to_string(),
            neutral_text: "You said true things.\nBut not every night\nneeds the truth.".to_string(),
            bad_text: "You walked the whole road.\nBut nobody remembers\nthat you passed by.".to_string(),
        }
    }
}

impl EndingScreenConfig {
    pub fn text_for(&self, ending: EndingType) -> &str {
        match ending {
            EndingType::Good => &self.good_text,
            EndingType::Neutral => &self.neutral_text,
            EndingType::Bad => &self.bad_text,
        }
    }
}

/// Where the closing sequence is
#[derive(Debug, Clone, PartialEq)]
pub enum EndingPhase {
    Hidden,
    FadingToBlack(Fade),
    Waiting(Delay),
    RevealingText(Fade),
    Done,
}

/// Full-screen ending presenter
#[derive(Debug)]
pub struct EndingScreen {
    pub config: EndingScreenConfig,
    ending: Option<EndingType>,
    phase: EndingPhase,
    overlay_alpha: f32,
    text_alpha: f32,
}

impl EndingScreen {
    pub fn new(config: EndingScreenConfig) -> Self {
        Self {
            config,
            ending: None,
            phase: EndingPhase::Hidden,
            overlay_alpha: 0.0,
            text_alpha: 0.0,
        }
    }

    pub fn ending(&self) -> Option<EndingType> {
        self.ending
    }

    pub fn phase(&self) -> &EndingPhase {
        &self.phase
    }

    /// Color of the full-screen overlay
    pub fn overlay(&self) -> Color {
        Color::BLACK.with_alpha(self.overlay_alpha)
    }

    pub fn text_alpha(&self) -> f32 {
        self.text_alpha
    }

    /// Closing text for the presented ending
    pub fn text(&self) -> Option<&str> {
        self.ending.map(|e| self.config.text_for(e))
    }

    /// The replay option appears once the sequence has finished
    pub fn play_again_available(&self) -> bool {
        self.phase == EndingPhase::Done
    }

    /// Jump to the end of the sequence
    pub fn skip(&mut self) {
        if self.phase != EndingPhase::Hidden {
            self.finish();
        }
    }

    /// Back to hidden, ready for another playthrough
    pub fn reset(&mut self) {
        self.ending = None;
        self.phase = EndingPhase::Hidden;
        self.overlay_alpha = 0.0;
        self.text_alpha = 0.0;
    }

    fn finish(&mut self) {
        self.overlay_alpha = 1.0;
        self.text_alpha = 1.0;
        self.phase = EndingPhase::Done;
        debug!("Ending sequence finished");
    }
}

impl Default for EndingScreen {
    fn default() -> Self {
        Self::new(EndingScreenConfig::default())
    }
}

impl EndingPresenter for EndingScreen {
    fn present(&mut self, ending: EndingType) {
        info!("Presenting {} ending", ending);
        self.ending = Some(ending);
        self.text_alpha = 0.0;
        self.phase = EndingPhase::FadingToBlack(Fade::new(
            self.overlay_alpha,
            1.0,
            self.config.fade_to_black,
        ));
    }

    fn update(&mut self, dt: f32) {
        let next = match &mut self.phase {
            EndingPhase::Hidden | EndingPhase::Done => None,
            EndingPhase::FadingToBlack(fade) => {
                let state = fade.advance(dt);
                self.overlay_alpha = fade.value();
                (state != SequenceState::Running)
                    .then(|| EndingPhase::Waiting(Delay::new(self.config.text_delay)))
            }
            EndingPhase::Waiting(delay) => (delay.advance(dt) != SequenceState::Running)
                .then(|| EndingPhase::RevealingText(Fade::new(0.0, 1.0, self.config.text_fade))),
            EndingPhase::RevealingText(fade) => {
                let state = fade.advance(dt);
                self.text_alpha = fade.value();
                (state != SequenceState::Running).then_some(EndingPhase::Done)
            }
        };

        if let Some(phase) = next {
            if phase == EndingPhase::Done {
                self.finish();
            } else {
                self.phase = phase;
            }
        }
    }
}
