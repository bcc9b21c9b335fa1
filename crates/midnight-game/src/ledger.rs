//! Mask choice ledger: which mask was shown to which NPC, and the ending it implies

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::NarrativeError;
use crate::events::EventBus;
use crate::mask::MaskType;
use crate::npc::NpcId;

/// Kindness choices needed for the good ending
pub const GOOD_ENDING_THRESHOLD: usize = 2;
/// Indifference choices needed for the bad ending
pub const BAD_ENDING_THRESHOLD: usize = 2;

/// Narrative outcome of the level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndingType {
    Good,
    Neutral,
    Bad,
}

impl EndingType {
    pub fn name(&self) -> &'static str {
        match self {
            EndingType::Good => "Good",
            EndingType::Neutral => "Neutral",
            EndingType::Bad => "Bad",
        }
    }
}

impl fmt::Display for EndingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Published on every recorded choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceRecorded {
    pub npc: NpcId,
    pub mask: MaskType,
    /// The choice this one replaced, if any
    pub previous: Option<MaskType>,
}

/// One mask choice per NPC identity
#[derive(Default)]
pub struct ChoiceLedger {
    choices: HashMap<NpcId, MaskType>,
    pub recorded: EventBus<ChoiceRecorded>,
}

impl ChoiceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the mask shown to an NPC, replacing any earlier choice for it.
    /// Returns the replaced choice.
    pub fn record_choice(
        &mut self,
        npc: &NpcId,
        mask: MaskType,
    ) -> Result<Option<MaskType>, NarrativeError> {
        if npc.is_empty() {
            warn!("Refusing to record {} for an empty NPC id", mask);
            return Err(NarrativeError::EmptyNpcId);
        }

        let previous = self.choices.insert(npc.clone(), mask);
        if let Some(old) = previous {
            warn!("Overwriting choice for {}: {} -> {}", npc, old, mask);
        }

        self.recorded.publish(&ChoiceRecorded {
            npc: npc.clone(),
            mask,
            previous,
        });
        info!("Recorded {} for {}", mask, npc);
        Ok(previous)
    }

    /// The recorded choice, or `MaskType::None` if there is none
    pub fn choice(&self, npc: &NpcId) -> MaskType {
        self.choices.get(npc).copied().unwrap_or_default()
    }

    pub fn has_choice(&self, npc: &NpcId) -> bool {
        self.choices.contains_key(npc)
    }

    /// How many NPCs were shown the given mask
    pub fn count_of(&self, mask: MaskType) -> usize {
        self.choices.values().filter(|m| **m == mask).count()
    }

    /// Number of NPCs with a recorded choice
    pub fn total(&self) -> usize {
        self.choices.len()
    }

    /// Classify the ending from the current choices.
    ///
    /// Kindness is checked before indifference, so a ledger that meets both
    /// thresholds is a good ending.
    pub fn classify_ending(&self) -> EndingType {
        if self.count_of(MaskType::Kindness) >= GOOD_ENDING_THRESHOLD {
            EndingType::Good
        } else if self.count_of(MaskType::Indifference) >= BAD_ENDING_THRESHOLD {
            EndingType::Bad
        } else {
            EndingType::Neutral
        }
    }

    /// Forget every choice (new game / replay)
    pub fn reset(&mut self) {
        self.choices.clear();
        debug!("Mask choices reset");
    }

    /// All choices, sorted by NPC id
    pub fn snapshot(&self) -> Vec<(NpcId, MaskType)> {
        let mut entries: Vec<_> = self.choices.iter().map(|(k, v)| (k.clone(), *v)).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Log counts and the predicted ending
    pub fn log_state(&self) {
        info!(
            "Mask choices: total={} honesty={} kindness={} indifference={} predicted={}",
            self.total(),
            self.count_of(MaskType::Honesty),
            self.count_of(MaskType::Kindness),
            self.count_of(MaskType::Indifference),
            self.classify_ending()
        );
        for (npc, mask) in self.snapshot() {
            debug!("  {} -> {}", npc, mask);
        }
    }
}

impl fmt::Debug for ChoiceLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChoiceLedger")
            .field("choices", &self.snapshot())
            .finish()
    }
}
