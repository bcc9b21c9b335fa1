//! Combat fallback: what a mask NPC does when confronted by an unmasked player

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::NarrativeError;
use crate::player::PlayerState;

/// Chase and attack settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub damage: f32,
    pub attack_range: f32,
    /// Seconds between attacks; also the delay before the first one
    pub attack_cooldown: f32,
    pub chase: bool,
    pub chase_speed: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            damage: 10.0,
            attack_range: 1.5,
            attack_cooldown: 1.0,
            chase: true,
            chase_speed: 3.0,
        }
    }
}

impl CombatConfig {
    /// The first attack must wait, so the cooldown has to be positive
    pub fn validate(&self) -> Result<(), NarrativeError> {
        if !self.attack_cooldown.is_finite() || self.attack_cooldown <= 0.0 {
            return Err(NarrativeError::InvalidConfig(format!(
                "attack_cooldown must be a positive number, got {}",
                self.attack_cooldown
            )));
        }
        let fields = [
            ("damage", self.damage),
            ("attack_range", self.attack_range),
            ("chase_speed", self.chase_speed),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(NarrativeError::InvalidConfig(format!(
                    "{} must be finite and not negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatPhase {
    Passive,
    Active,
}

/// Why combat ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatExit {
    PlayerDefeated,
    MaskWorn,
    Stopped,
}

/// Per-NPC chase/attack state
#[derive(Debug, Clone)]
pub struct CombatFallback {
    pub config: CombatConfig,
    phase: CombatPhase,
    cooldown: f32,
    position: Vec3,
}

impl CombatFallback {
    pub fn new(config: CombatConfig, position: Vec3) -> Self {
        Self {
            config,
            phase: CombatPhase::Passive,
            cooldown: 0.0,
            position,
        }
    }

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == CombatPhase::Active
    }

    /// NPC position, moved while chasing
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown
    }

    /// Start fighting. The first attack waits a full cooldown.
    pub fn enter(&mut self) {
        if self.is_active() {
            return;
        }
        self.phase = CombatPhase::Active;
        self.cooldown = self.config.attack_cooldown;
        info!("Combat started");
    }

    pub fn exit(&mut self) {
        if self.is_active() {
            self.phase = CombatPhase::Passive;
            self.cooldown = 0.0;
            debug!("Combat ended");
        }
    }

    /// One gameplay step. Returns why combat ended, if it did.
    pub fn update(&mut self, player: &mut dyn PlayerState, dt: f32) -> Option<CombatExit> {
        if !self.is_active() {
            return None;
        }

        if !player.is_alive() {
            self.exit();
            return Some(CombatExit::PlayerDefeated);
        }
        if player.worn_mask().is_worn() {
            info!("Player put on {}, combat stops", player.worn_mask());
            self.exit();
            return Some(CombatExit::MaskWorn);
        }

        self.cooldown = (self.cooldown - dt).max(0.0);

        let target = player.position();
        let distance = self.position.distance(target);

        if self.config.chase && distance > self.config.attack_range {
            let step = (self.config.chase_speed * dt).min(distance - self.config.attack_range);
            if step > 0.0 {
                self.position += (target - self.position).normalize_or_zero() * step;
            }
        }

        let in_range = self.position.distance(target) <= self.config.attack_range;
        if in_range && self.cooldown <= 0.0 {
            let dealt = player.take_damage(self.config.damage);
            debug!("NPC attack dealt {:.1}", dealt);
            self.cooldown = self.config.attack_cooldown;

            if !player.is_alive() {
                self.exit();
                return Some(CombatExit::PlayerDefeated);
            }
        }

        None
    }
}
