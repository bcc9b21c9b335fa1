//! Corner HUD with one tinted icon per mask. The worn mask is dimmed.
//!
//! The HUD listens to [`MaskChanged`] events. It is shared through
//! `Rc<RefCell<_>>` so the owner can draw it while the wearer's event bus
//! holds the listener; the listener only keeps a weak reference.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use midnight_core::Color;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::{EventBus, SubscriptionId};
use crate::mask::{MaskChanged, MaskType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskHudConfig {
    /// Alpha of the worn mask's icon
    pub active_alpha: f32,
    /// Alpha of the other icons
    pub inactive_alpha: f32,
    /// Color blend rate per second, 0 switches instantly
    pub switch_speed: f32,
}

impl Default for MaskHudConfig {
    fn default() -> Self {
        Self {
            active_alpha: 0.4,
            inactive_alpha: 1.0,
            switch_speed: 5.0,
        }
    }
}

/// One icon in the HUD
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskIcon {
    pub mask: MaskType,
    pub color: Color,
    target: Color,
}

#[derive(Debug)]
pub struct MaskHud {
    pub config: MaskHudConfig,
    icons: Vec<MaskIcon>,
    active: MaskType,
}

impl MaskHud {
    pub fn new(config: MaskHudConfig, masks: &[MaskType]) -> Self {
        let mut hud = Self {
            config,
            icons: masks
                .iter()
                .filter(|m| m.is_worn())
                .map(|&mask| MaskIcon {
                    mask,
                    color: mask.color(),
                    target: mask.color(),
                })
                .collect(),
            active: MaskType::None,
        };
        hud.sync(MaskType::None);
        hud
    }

    pub fn active(&self) -> MaskType {
        self.active
    }

    pub fn icons(&self) -> &[MaskIcon] {
        &self.icons
    }

    /// Displayed color of a mask's icon
    pub fn icon_color(&self, mask: MaskType) -> Option<Color> {
        self.icons.iter().find(|i| i.mask == mask).map(|i| i.color)
    }

    pub fn on_mask_changed(&mut self, event: &MaskChanged) {
        self.set_active(event.current);
    }

    /// Dim the new mask and brighten the rest, blending over time
    pub fn set_active(&mut self, mask: MaskType) {
        self.active = mask;
        for icon in &mut self.icons {
            let alpha = if icon.mask == mask {
                self.config.active_alpha
            } else {
                self.config.inactive_alpha
            };
            icon.target = icon.mask.color().with_alpha(alpha);
            if self.config.switch_speed <= 0.0 {
                icon.color = icon.target;
            }
        }
        debug!("Mask HUD shows {}", mask);
    }

    /// Jump straight to the colors for `mask`
    pub fn sync(&mut self, mask: MaskType) {
        self.set_active(mask);
        for icon in &mut self.icons {
            icon.color = icon.target;
        }
    }

    /// Blend icons toward their targets on the presentation delta
    pub fn update(&mut self, dt: f32) {
        let t = (dt * self.config.switch_speed).clamp(0.0, 1.0);
        for icon in &mut self.icons {
            icon.color = if t >= 1.0 {
                icon.target
            } else {
                Color::lerp(&icon.color, &icon.target, t)
            };
        }
    }

    /// Listen for mask changes on `bus`
    pub fn subscribe(hud: &Rc<RefCell<Self>>, bus: &mut EventBus<MaskChanged>) -> SubscriptionId {
        let weak: Weak<RefCell<Self>> = Rc::downgrade(hud);
        bus.subscribe(move |event| {
            if let Some(hud) = weak.upgrade() {
                hud.borrow_mut().on_mask_changed(event);
            }
        })
    }
}

impl Default for MaskHud {
    fn default() -> Self {
        Self::new(MaskHudConfig::default(), &MaskType::WEARABLE)
    }
}
