//! The personas the player can wear

use std::fmt;
use std::str::FromStr;

use midnight_core::Color;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::NarrativeError;
use crate::events::EventBus;

/// Persona worn by the player. `None` means no mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskType {
    #[default]
    None,
    Honesty,
    Kindness,
    Indifference,
}

impl MaskType {
    /// The three wearable masks, in slot order (keys 1, 2, 3)
    pub const WEARABLE: [MaskType; 3] = [MaskType::Honesty, MaskType::Kindness, MaskType::Indifference];

    /// Whether this is an actual mask (not `None`)
    pub fn is_worn(&self) -> bool {
        *self != MaskType::None
    }

    pub fn name(&self) -> &'static str {
        match self {
            MaskType::None => "None",
            MaskType::Honesty => "Honesty",
            MaskType::Kindness => "Kindness",
            MaskType::Indifference => "Indifference",
        }
    }

    /// Tint used when the mask is shown in the HUD
    pub fn color(&self) -> Color {
        match self {
            MaskType::None => Color::TRANSPARENT,
            MaskType::Honesty => Color::from_hex(0xD8D8D8),      // white/gray
            MaskType::Kindness => Color::from_hex(0xF2C14E),     // warm yellow
            MaskType::Indifference => Color::from_hex(0x3B3A6E), // dark blue/purple
        }
    }
}

impl fmt::Display for MaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(MaskType::None),
            "honesty" | "honest" => Ok(MaskType::Honesty),
            "kindness" | "kind" => Ok(MaskType::Kindness),
            "indifference" | "indifferent" => Ok(MaskType::Indifference),
            other => Err(format!("unknown mask '{other}'")),
        }
    }
}

/// Published whenever the worn mask changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskChanged {
    pub previous: MaskType,
    pub current: MaskType,
}

/// The player's mask inventory and the mask currently worn
pub struct MaskWearer {
    available: Vec<MaskType>,
    worn: MaskType,
    pub changed: EventBus<MaskChanged>,
}

impl MaskWearer {
    /// A wearer owning all three masks, wearing none
    pub fn new() -> Self {
        Self::with_masks(MaskType::WEARABLE.to_vec())
    }

    pub fn with_masks(available: Vec<MaskType>) -> Self {
        Self {
            available: available.into_iter().filter(MaskType::is_worn).collect(),
            worn: MaskType::None,
            changed: EventBus::new(),
        }
    }

    pub fn worn(&self) -> MaskType {
        self.worn
    }

    pub fn available(&self) -> &[MaskType] {
        &self.available
    }

    /// Wear the mask in the given inventory slot (0-based)
    pub fn select_slot(&mut self, slot: usize) -> Result<MaskType, NarrativeError> {
        let Some(&mask) = self.available.get(slot) else {
            warn!("Invalid mask slot: {}", slot);
            return Err(NarrativeError::InvalidMaskSlot(slot));
        };
        self.set_worn(mask);
        Ok(mask)
    }

    /// Wear a specific mask if it is in the inventory. `MaskType::None` removes the mask.
    pub fn wear(&mut self, mask: MaskType) -> bool {
        if mask.is_worn() && !self.available.contains(&mask) {
            warn!("Cannot wear {}: not in inventory", mask);
            return false;
        }
        self.set_worn(mask);
        true
    }

    pub fn remove(&mut self) {
        self.set_worn(MaskType::None);
    }

    /// Add a mask to the inventory
    pub fn add(&mut self, mask: MaskType) {
        if mask.is_worn() && !self.available.contains(&mask) {
            self.available.push(mask);
            debug!("Mask added: {}", mask);
        }
    }

    fn set_worn(&mut self, mask: MaskType) {
        if mask == self.worn {
            return;
        }
        let previous = self.worn;
        self.worn = mask;
        debug!("Mask changed: {} -> {}", previous, mask);
        self.changed.publish(&MaskChanged {
            previous,
            current: mask,
        });
    }
}

impl Default for MaskWearer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MaskWearer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaskWearer")
            .field("available", &self.available)
            .field("worn", &self.worn)
            .finish()
    }
}
