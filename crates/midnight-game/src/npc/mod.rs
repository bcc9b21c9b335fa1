//! NPCs: identity, authored data, and the per-NPC interaction state machine

pub mod combat;
pub mod controller;

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::dialogue::{DialogueScript, MaskDialogueSet};
use crate::items::ItemDrop;

pub use combat::{CombatConfig, CombatExit, CombatFallback, CombatPhase};
pub use controller::{Engagement, InteractionContext, InteractionOutcome, InteractionState, NpcController};

/// Stable per-level NPC identity, used as the ledger key.
/// Uniqueness within a level is up to whoever authors the level.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NpcId(String);

impl NpcId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for NpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NpcId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

fn default_drop_after_dialogue() -> bool {
    true
}

/// Authored definition of an NPC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcData {
    pub id: NpcId,
    /// Display name, used in logs
    pub name: String,
    #[serde(default)]
    pub position: Vec3,
    /// Mask NPCs pick their script by the worn mask and fight the unmasked
    #[serde(default)]
    pub requires_mask: bool,
    /// Script for NPCs that do not require a mask
    #[serde(default)]
    pub dialogue: Option<DialogueScript>,
    #[serde(default)]
    pub mask_dialogue: Option<MaskDialogueSet>,
    #[serde(default)]
    pub drops: Vec<ItemDrop>,
    #[serde(default = "default_drop_after_dialogue")]
    pub drop_after_dialogue: bool,
    /// Combat fallback settings; mask NPCs without it never fight
    #[serde(default)]
    pub combat: Option<CombatConfig>,
}

impl NpcData {
    /// A plain NPC with a single script
    pub fn talker(id: impl Into<String>, name: impl Into<String>, dialogue: DialogueScript) -> Self {
        Self {
            id: NpcId::new(id),
            name: name.into(),
            position: Vec3::ZERO,
            requires_mask: false,
            dialogue: Some(dialogue),
            mask_dialogue: None,
            drops: Vec::new(),
            drop_after_dialogue: true,
            combat: None,
        }
    }

    /// An NPC that reacts to the worn mask
    pub fn masked(id: impl Into<String>, name: impl Into<String>, set: MaskDialogueSet) -> Self {
        Self {
            id: NpcId::new(id),
            name: name.into(),
            position: Vec3::ZERO,
            requires_mask: true,
            dialogue: None,
            mask_dialogue: Some(set),
            drops: Vec::new(),
            drop_after_dialogue: true,
            combat: Some(CombatConfig::default()),
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_drops(mut self, drops: Vec<ItemDrop>) -> Self {
        self.drops = drops;
        self
    }

    pub fn with_combat(mut self, combat: Option<CombatConfig>) -> Self {
        self.combat = combat;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_npc_id_display_and_empty() {
        let id = NpcId::new("old_man");
        assert_eq!(id.to_string(), "old_man");
        assert!(!id.is_empty());
        assert!(NpcId::new(" ").is_empty());
    }

    #[test]
    fn test_npc_data_from_toml() {
        let src = r#"
            id = "child"
            name = "Child"
            position = [4.0, 0.0, 0.0]
            requires_mask = true

            [mask_dialogue.honesty]
            speaker = "Child"
            lines = ["You look funny."]

            [mask_dialogue.kindness]
            speaker = "Child"
            lines = ["Will you play with me?"]

            [mask_dialogue.indifference]
            speaker = "Child"
            lines = ["...okay."]
            repeatable = false
        "#;
        let data: NpcData = toml::from_str(src).unwrap();
        assert_eq!(data.id, NpcId::new("child"));
        assert_eq!(data.position, Vec3::new(4.0, 0.0, 0.0));
        assert!(data.drop_after_dialogue);
        assert!(data.combat.is_none());
        let set = data.mask_dialogue.unwrap();
        assert!(set.is_complete());
        assert!(!set.indifference.unwrap().repeatable);
    }
}
