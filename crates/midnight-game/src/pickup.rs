//! Picking up and carrying items left on the ground
//!
//! The player carries at most one item. The pickup key grabs the nearest
//! item within reach, or puts the carried one back down at the player's feet.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::NarrativeError;
use crate::items::DroppedItem;
use crate::presentation::PresentationSurface;

/// Pickup reach and prompt texts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupConfig {
    /// How close an item must be to be picked up
    pub radius: f32,
    /// Where a put-down item lands relative to the player
    pub drop_offset: Vec3,
    /// Where the carried item sits relative to the player
    pub hold_offset: Vec3,
    pub pickup_message: String,
    pub drop_message: String,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            radius: 2.0,
            drop_offset: Vec3::new(0.0, -0.3, 0.0),
            hold_offset: Vec3::new(0.0, 0.5, 0.0),
            pickup_message: "Press G to pickup".to_string(),
            drop_message: "Press G to drop".to_string(),
        }
    }
}

impl PickupConfig {
    pub fn validate(&self) -> Result<(), NarrativeError> {
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(NarrativeError::InvalidConfig(
                "pickup radius must be finite and not negative".to_string(),
            ));
        }
        if !self.drop_offset.is_finite() || !self.hold_offset.is_finite() {
            return Err(NarrativeError::InvalidConfig(
                "pickup offsets must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of pressing the pickup key
#[derive(Debug, Clone, PartialEq)]
pub enum PickupOutcome {
    PickedUp(String),
    Dropped(String),
}

/// Items lying in the level plus the one the player carries
pub struct ItemPickup {
    pub config: PickupConfig,
    ground: Vec<DroppedItem>,
    held: Option<DroppedItem>,
    prompt: Option<Box<dyn PresentationSurface>>,
    info: Option<Box<dyn PresentationSurface>>,
    prompt_text: Option<String>,
}

impl ItemPickup {
    pub fn new(config: PickupConfig) -> Self {
        Self {
            config,
            ground: Vec::new(),
            held: None,
            prompt: None,
            info: None,
            prompt_text: None,
        }
    }

    pub fn set_prompt(&mut self, prompt: Box<dyn PresentationSurface>) {
        self.prompt = Some(prompt);
    }

    /// Panel showing the carried item's name and description
    pub fn set_info_panel(&mut self, info: Box<dyn PresentationSurface>) {
        self.info = Some(info);
    }

    pub fn ground(&self) -> &[DroppedItem] {
        &self.ground
    }

    pub fn held(&self) -> Option<&DroppedItem> {
        self.held.as_ref()
    }

    pub fn is_holding(&self) -> bool {
        self.held.is_some()
    }

    /// The prompt message currently shown, if any
    pub fn prompt_text(&self) -> Option<&str> {
        self.prompt_text.as_deref()
    }

    /// Put newly spawned items on the ground
    pub fn add_items(&mut self, items: impl IntoIterator<Item = DroppedItem>) {
        let before = self.ground.len();
        self.ground.extend(items);
        if self.ground.len() > before {
            debug!("{} items on the ground", self.ground.len());
        }
    }

    /// Index of the closest ground item within reach
    pub fn nearest(&self, position: Vec3) -> Option<usize> {
        self.ground
            .iter()
            .enumerate()
            .map(|(i, item)| (i, item.position.distance(position)))
            .filter(|(_, distance)| *distance <= self.config.radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Pickup key: drop what is carried, otherwise grab the nearest item
    pub fn toggle(&mut self, position: Vec3) -> Option<PickupOutcome> {
        if self.is_holding() {
            return self.drop_held(position).map(|item| PickupOutcome::Dropped(item.name));
        }
        match self.pick_up(position) {
            Ok(item) => Some(PickupOutcome::PickedUp(item.name.clone())),
            Err(e) => {
                debug!("Nothing picked up: {}", e);
                None
            }
        }
    }

    pub fn pick_up(&mut self, position: Vec3) -> Result<&DroppedItem, NarrativeError> {
        if let Some(held) = &self.held {
            return Err(NarrativeError::AlreadyHolding(held.name.clone()));
        }
        let index = self.nearest(position).ok_or(NarrativeError::NothingInReach)?;
        let mut item = self.ground.swap_remove(index);
        item.position = position + self.config.hold_offset;

        if let Some(info) = self.info.as_mut() {
            info.show(&item.name, None);
            info.set_text(&item.description);
        }
        info!("Picked up {}", item.name);
        let held: &DroppedItem = self.held.insert(item);
        Ok(held)
    }

    /// Put the carried item down at the player's feet
    pub fn drop_held(&mut self, position: Vec3) -> Option<DroppedItem> {
        let mut item = self.held.take()?;
        item.position = position + self.config.drop_offset;
        self.ground.push(item.clone());

        if let Some(info) = self.info.as_mut() {
            info.hide();
        }
        info!("Dropped {}", item.name);
        Some(item)
    }

    /// Carry the held item along and refresh the prompt
    pub fn follow(&mut self, position: Vec3) {
        if let Some(held) = self.held.as_mut() {
            held.position = position + self.config.hold_offset;
        }

        let message = if self.is_holding() {
            Some(self.config.drop_message.clone())
        } else if self.nearest(position).is_some() {
            Some(self.config.pickup_message.clone())
        } else {
            None
        };
        if message == self.prompt_text {
            return;
        }

        if let Some(prompt) = self.prompt.as_mut() {
            match &message {
                Some(text) => {
                    prompt.show("", None);
                    prompt.set_text(text);
                }
                None => prompt.hide(),
            }
        }
        self.prompt_text = message;
    }

    /// Advance the prompt and info panel on the presentation delta
    pub fn update(&mut self, dt: f32) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.update(dt);
        }
        if let Some(info) = self.info.as_mut() {
            info.update(dt);
        }
    }

    /// Clear the ground and empty the player's hands
    pub fn reset(&mut self) {
        self.ground.clear();
        self.held = None;
        self.prompt_text = None;
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.hide();
        }
        if let Some(info) = self.info.as_mut() {
            info.hide();
        }
    }
}

impl Default for ItemPickup {
    fn default() -> Self {
        Self::new(PickupConfig::default())
    }
}

impl std::fmt::Debug for ItemPickup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemPickup")
            .field("ground", &self.ground.len())
            .field("held", &self.held.as_ref().map(|i| &i.name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn item(name: &str, x: f32) -> DroppedItem {
        DroppedItem {
            name: name.to_string(),
            description: format!("About the {}", name.to_lowercase()),
            position: Vec3::new(x, 0.0, 0.0),
        }
    }

    struct Calls(Rc<RefCell<Vec<String>>>);

    impl PresentationSurface for Calls {
        fn show(&mut self, title: &str, _portrait: Option<&str>) {
            self.0.borrow_mut().push(format!("show {}", title));
        }
        fn set_text(&mut self, line: &str) {
            self.0.borrow_mut().push(format!("text {}", line));
        }
        fn hide(&mut self) {
            self.0.borrow_mut().push("hide".to_string());
        }
    }

    #[test]
    fn test_picks_nearest_within_radius() {
        let mut pickup = ItemPickup::default();
        pickup.add_items([item("Matchbox", 1.5), item("Flower", 0.4), item("Photo", -0.9)]);

        assert_eq!(
            pickup.toggle(Vec3::ZERO),
            Some(PickupOutcome::PickedUp("Flower".to_string()))
        );
        assert_eq!(pickup.held().map(|i| i.name.as_str()), Some("Flower"));
        assert_eq!(pickup.ground().len(), 2);
    }

    #[test]
    fn test_out_of_radius_is_ignored() {
        let mut pickup = ItemPickup::default();
        pickup.add_items([item("Matchbox", 2.5)]);

        assert_eq!(pickup.nearest(Vec3::ZERO), None);
        assert_eq!(pickup.toggle(Vec3::ZERO), None);
        assert!(matches!(pickup.pick_up(Vec3::ZERO), Err(NarrativeError::NothingInReach)));
        assert!(!pickup.is_holding());
        assert_eq!(pickup.ground().len(), 1);
    }

    #[test]
    fn test_drop_puts_item_at_feet() {
        let mut pickup = ItemPickup::default();
        pickup.add_items([item("Matchbox", 1.0)]);
        pickup.toggle(Vec3::ZERO);

        let at = Vec3::new(5.0, 0.0, 0.0);
        pickup.follow(at);
        assert_eq!(pickup.held().map(|i| i.position), Some(at + pickup.config.hold_offset));

        assert_eq!(
            pickup.toggle(at),
            Some(PickupOutcome::Dropped("Matchbox".to_string()))
        );
        assert!(!pickup.is_holding());
        assert_eq!(pickup.ground()[0].position, at + pickup.config.drop_offset);

        // Close enough to grab again
        assert_eq!(pickup.nearest(at), Some(0));
    }

    #[test]
    fn test_holds_one_item_at_a_time() {
        let mut pickup = ItemPickup::default();
        pickup.add_items([item("Matchbox", 0.5), item("Flower", 0.6)]);
        assert!(pickup.pick_up(Vec3::ZERO).is_ok());
        assert!(matches!(
            pickup.pick_up(Vec3::ZERO),
            Err(NarrativeError::AlreadyHolding(_))
        ));
        assert_eq!(pickup.ground().len(), 1);
    }

    #[test]
    fn test_prompt_messages_follow_state() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut pickup = ItemPickup::default();
        pickup.set_prompt(Box::new(Calls(calls.clone())));

        pickup.follow(Vec3::ZERO);
        assert_eq!(pickup.prompt_text(), None);

        pickup.add_items([item("Matchbox", 1.0)]);
        pickup.follow(Vec3::ZERO);
        pickup.follow(Vec3::ZERO);
        assert_eq!(pickup.prompt_text(), Some("Press G to pickup"));

        pickup.toggle(Vec3::ZERO);
        pickup.follow(Vec3::ZERO);
        assert_eq!(pickup.prompt_text(), Some("Press G to drop"));

        pickup.reset();
        assert_eq!(
            *calls.borrow(),
            vec![
                "show ",
                "text Press G to pickup",
                "show ",
                "text Press G to drop",
                "hide",
            ]
        );
    }

    #[test]
    fn test_info_panel_shows_description() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut pickup = ItemPickup::default();
        pickup.set_info_panel(Box::new(Calls(calls.clone())));
        pickup.add_items([item("Matchbox", 0.5)]);

        pickup.toggle(Vec3::ZERO);
        pickup.toggle(Vec3::ZERO);
        assert_eq!(
            *calls.borrow(),
            vec!["show Matchbox", "text About the matchbox", "hide"]
        );
    }

    #[test]
    fn test_unbounded_radius_rejected() {
        let config = PickupConfig {
            radius: f32::INFINITY,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(PickupConfig::default().validate().is_ok());
    }
}
