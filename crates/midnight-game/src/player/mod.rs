//! Player state: health, masks, and walking
//!
//! NPCs only see the player through [`PlayerState`].

mod movement;

pub use movement::MovementConfig;

use glam::Vec3;
use tracing::{debug, info, warn};

use crate::events::EventBus;
use crate::input::{InputAction, InputState};
use crate::mask::{MaskChanged, MaskType, MaskWearer};

/// What the narrative core needs from the player
pub trait PlayerState {
    fn worn_mask(&self) -> MaskType;
    fn is_alive(&self) -> bool;
    /// Apply damage, returns the damage actually taken
    fn take_damage(&mut self, amount: f32) -> f32;
    fn disable_controls(&mut self);
    fn position(&self) -> Vec3;

    fn controls_enabled(&self) -> bool {
        true
    }

    /// React to this tick's input. Implementations consume what they use.
    fn handle_input(&mut self, _input: &mut InputState, _dt: f32) {}

    /// Mask change notifications, for players that publish them
    fn mask_events(&mut self) -> Option<&mut EventBus<MaskChanged>> {
        None
    }
}

/// Published whenever health changes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthChanged {
    pub current: f32,
    pub max: f32,
}

pub const DEFAULT_MAX_HEALTH: f32 = 100.0;

/// The walking, mask-wearing player
pub struct Player {
    pub movement: MovementConfig,
    pub masks: MaskWearer,
    pub health_changed: EventBus<HealthChanged>,
    position: Vec3,
    velocity: f32,
    health: f32,
    max_health: f32,
    controls_enabled: bool,
}

impl Player {
    pub fn new() -> Self {
        Self::with_health(DEFAULT_MAX_HEALTH)
    }

    pub fn with_health(max_health: f32) -> Self {
        Self {
            movement: MovementConfig::default(),
            masks: MaskWearer::new(),
            health_changed: EventBus::new(),
            position: Vec3::ZERO,
            velocity: 0.0,
            health: max_health,
            max_health,
            controls_enabled: true,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Health as a 0.0-1.0 fraction
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        self.health / self.max_health
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn enable_controls(&mut self) {
        self.controls_enabled = true;
    }

    /// Full health, no mask, controls back on
    pub fn respawn(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = 0.0;
        self.health = self.max_health;
        self.controls_enabled = true;
        self.masks.remove();
        self.publish_health();
    }

    fn publish_health(&mut self) {
        self.health_changed.publish(&HealthChanged {
            current: self.health,
            max: self.max_health,
        });
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerState for Player {
    fn worn_mask(&self) -> MaskType {
        self.masks.worn()
    }

    fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    fn take_damage(&mut self, amount: f32) -> f32 {
        if amount <= 0.0 || !self.is_alive() {
            return 0.0;
        }
        let taken = amount.min(self.health);
        self.health -= taken;
        info!("Player took {:.1} damage ({:.1}/{:.1})", taken, self.health, self.max_health);
        self.publish_health();
        if !self.is_alive() {
            warn!("Player died");
        }
        taken
    }

    fn disable_controls(&mut self) {
        if self.controls_enabled {
            self.controls_enabled = false;
            self.velocity = 0.0;
            debug!("Player controls disabled");
        }
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    fn handle_input(&mut self, input: &mut InputState, dt: f32) {
        if !self.controls_enabled {
            return;
        }

        for action in [InputAction::Mask1, InputAction::Mask2, InputAction::Mask3] {
            if let Some(slot) = action.mask_slot() {
                if input.consume(action) {
                    if let Err(e) = self.masks.select_slot(slot) {
                        debug!("Mask key ignored: {}", e);
                    }
                }
            }
        }
        if input.consume(InputAction::RemoveMask) {
            self.masks.remove();
        }

        let mut direction = 0.0;
        if input.is_held(InputAction::MoveLeft) {
            direction -= 1.0;
        }
        if input.is_held(InputAction::MoveRight) {
            direction += 1.0;
        }
        let target = direction * self.movement.walk_speed;
        self.velocity = self.movement.approach(self.velocity, target, dt);
        self.position.x += self.velocity * dt;
    }

    fn mask_events(&mut self) -> Option<&mut EventBus<MaskChanged>> {
        Some(&mut self.masks.changed)
    }
}
