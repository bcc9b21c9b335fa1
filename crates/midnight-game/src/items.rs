//! Item drops left behind by NPCs after a conversation

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::NarrativeError;

fn default_chance() -> f32 {
    100.0
}

fn default_quantity() -> (u32, u32) {
    (1, 1)
}

/// One entry in an NPC's drop list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDrop {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Drop chance in percent (0-100)
    #[serde(default = "default_chance")]
    pub chance: f32,
    /// Inclusive quantity range
    #[serde(default = "default_quantity")]
    pub quantity: (u32, u32),
    /// Offset from the NPC where items land
    #[serde(default)]
    pub spawn_offset: Vec2,
    /// Random scatter radius around the offset
    #[serde(default)]
    pub spawn_radius: f32,
}

impl ItemDrop {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            chance: default_chance(),
            quantity: default_quantity(),
            spawn_offset: Vec2::ZERO,
            spawn_radius: 0.0,
        }
    }

    pub fn with_chance(mut self, chance: f32) -> Self {
        self.chance = chance.clamp(0.0, 100.0);
        self
    }

    pub fn with_quantity(mut self, min: u32, max: u32) -> Self {
        self.quantity = (min, max.max(min));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Reject numbers the drop rolls cannot work with
    pub fn validate(&self) -> Result<(), NarrativeError> {
        let invalid = |what: &str| {
            Err(NarrativeError::InvalidConfig(format!(
                "item drop '{}': {}",
                self.name, what
            )))
        };
        if !self.chance.is_finite() {
            return invalid("chance must be a finite number");
        }
        if !self.spawn_offset.is_finite() {
            return invalid("spawn_offset must be finite");
        }
        if !self.spawn_radius.is_finite() || self.spawn_radius < 0.0 {
            return invalid("spawn_radius must be finite and not negative");
        }
        Ok(())
    }

    /// Roll the drop chance
    pub fn should_drop<R: Rng>(&self, rng: &mut R) -> bool {
        if self.chance >= 100.0 {
            return true;
        }
        if self.chance <= 0.0 {
            return false;
        }
        rng.gen_range(0.0..100.0) < self.chance
    }

    /// Roll a quantity within the range
    pub fn roll_quantity<R: Rng>(&self, rng: &mut R) -> u32 {
        let (min, max) = self.quantity;
        if max <= min {
            return min;
        }
        rng.gen_range(min..=max)
    }

    /// Where an item lands relative to the NPC
    pub fn roll_offset<R: Rng>(&self, rng: &mut R) -> Vec3 {
        let mut offset = self.spawn_offset;
        if self.spawn_radius > 0.0 && self.spawn_radius.is_finite() {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let distance = rng.gen_range(0.0..=self.spawn_radius);
            offset += Vec2::new(angle.cos(), angle.sin()) * distance;
        }
        Vec3::new(offset.x, offset.y, 0.0)
    }
}

/// Fire-and-forget drop request from an NPC
pub trait ItemDropService {
    fn drop_items(&mut self, origin: Vec3, drops: &[ItemDrop]);

    /// Hand over the items placed since the last call
    fn take_spawned(&mut self) -> Vec<DroppedItem> {
        Vec::new()
    }
}

/// An item that has been placed in the world
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedItem {
    pub name: String,
    pub description: String,
    pub position: Vec3,
}

/// Rolls drops and places the resulting items around the origin
pub struct ItemScatter<R: Rng> {
    rng: R,
    spawned: Vec<DroppedItem>,
}

impl<R: Rng> ItemScatter<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            spawned: Vec::new(),
        }
    }

    pub fn spawned(&self) -> &[DroppedItem] {
        &self.spawned
    }

    pub fn clear(&mut self) {
        self.spawned.clear();
    }
}

impl<R: Rng> ItemDropService for ItemScatter<R> {
    fn drop_items(&mut self, origin: Vec3, drops: &[ItemDrop]) {
        for drop in drops {
            if !drop.is_valid() {
                warn!("Skipping unnamed item drop");
                continue;
            }
            if !drop.should_drop(&mut self.rng) {
                debug!("{} did not drop", drop.name);
                continue;
            }
            let quantity = drop.roll_quantity(&mut self.rng);
            for _ in 0..quantity {
                let position = origin + drop.roll_offset(&mut self.rng);
                self.spawned.push(DroppedItem {
                    name: drop.name.clone(),
                    description: drop.description.clone(),
                    position,
                });
            }
            info!("Dropped {}x {} at {:?}", quantity, drop.name, origin);
        }
    }

    fn take_spawned(&mut self) -> Vec<DroppedItem> {
        std::mem::take(&mut self.spawned)
    }
}
