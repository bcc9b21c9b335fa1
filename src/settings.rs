//! Game settings with persistence
//!
//! Settings are saved to `~/.config/midnight-walk/settings.toml`

use std::fs;
use std::path::PathBuf;

use midnight_core::TimeConfig;
use midnight_game::{
    DialoguePanelConfig, EndingScreenConfig, ItemInfoConfig, MaskHudConfig, MaskType, PromptConfig,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All game settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub gameplay: GameplaySettings,
    pub presentation: PresentationSettings,
    pub demo: DemoSettings,
}

impl GameSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("midnight-walk"))
    }

    /// Get the settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match Self::parse(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        let path = dir.join("settings.toml");

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}

/// Gameplay clock settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    /// Time scale multiplier (affects gameplay speed, not UI)
    pub time_scale: f32,
    /// Longest frame step the clock accepts, in seconds
    pub max_delta_time: f32,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            max_delta_time: 0.25,
        }
    }
}

impl GameplaySettings {
    pub fn time_config(&self) -> TimeConfig {
        TimeConfig {
            time_scale: self.time_scale.max(0.0),
            max_delta_time: self.max_delta_time,
        }
    }
}

/// UI timings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationSettings {
    pub dialogue: DialoguePanelConfig,
    pub prompt: PromptConfig,
    pub ending: EndingScreenConfig,
    pub item_info: ItemInfoConfig,
    pub mask_hud: MaskHudConfig,
}

/// One stop on the scripted walk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub npc: String,
    /// Mask to wear when talking
    #[serde(default)]
    pub mask: MaskType,
    /// Walk up without a mask first
    #[serde(default)]
    pub confront_unmasked: bool,
    /// Pick up whatever the NPC left behind
    #[serde(default)]
    pub pick_up: bool,
}

impl RouteStep {
    fn new(npc: &str, mask: MaskType) -> Self {
        Self {
            npc: npc.to_string(),
            mask,
            confront_unmasked: false,
            pick_up: false,
        }
    }
}

/// Headless demo settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    /// Level file to load instead of the built-in level
    pub level_path: Option<PathBuf>,
    /// Simulated frames per second
    pub frame_rate: f32,
    /// Distance at which the player is near an NPC
    pub interaction_radius: f32,
    /// Seed for item drops; random when unset
    pub seed: Option<u64>,
    pub route: Vec<RouteStep>,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            level_path: None,
            frame_rate: 60.0,
            interaction_radius: 1.0,
            seed: None,
            route: vec![
                RouteStep {
                    pick_up: true,
                    ..RouteStep::new("lamp_keeper", MaskType::None)
                },
                RouteStep::new("old_man", MaskType::Kindness),
                RouteStep {
                    confront_unmasked: true,
                    ..RouteStep::new("stranger", MaskType::Honesty)
                },
                RouteStep::new("child", MaskType::Kindness),
            ],
        }
    }
}
