//! Midnight Game - Interaction and narrative progression
//!
//! Masks, dialogue, per-NPC interaction state machines, the mask choice
//! ledger, level progress, item pickup and the ending gate, composed by
//! [`Level`].

pub mod dialogue;
pub mod ending;
pub mod error;
pub mod events;
pub mod input;
pub mod items;
pub mod ledger;
pub mod level;
pub mod mask;
pub mod npc;
pub mod pickup;
pub mod player;
pub mod presentation;
pub mod progress;

pub use dialogue::{
    DialogueCompleted, DialogueEngine, DialogueEvent, DialogueScript, DialogueSession,
    MaskDialogueSet,
};
pub use ending::EndingGate;
pub use error::NarrativeError;
pub use events::{EventBus, SubscriptionId};
pub use input::{InputAction, InputState};
pub use items::{DroppedItem, ItemDrop, ItemDropService, ItemScatter};
pub use ledger::{ChoiceLedger, ChoiceRecorded, EndingType};
pub use level::{Level, LevelConfig, LevelDefinition};
pub use mask::{MaskChanged, MaskType, MaskWearer};
pub use npc::{
    CombatConfig, CombatExit, CombatFallback, CombatPhase, Engagement, InteractionContext,
    InteractionOutcome, InteractionState, NpcController, NpcData, NpcId,
};
pub use pickup::{ItemPickup, PickupConfig, PickupOutcome};
pub use player::{HealthChanged, MovementConfig, Player, PlayerState};
pub use presentation::{
    DialoguePanel, DialoguePanelConfig, EndingPhase, EndingPresenter, EndingScreen,
    EndingScreenConfig, InteractionPrompt, ItemInfoConfig, ItemInfoPanel, MaskHud, MaskHudConfig,
    MaskIcon, PresentationSurface, PromptConfig,
};
pub use progress::{CountingPolicy, LevelProgress, ProgressEvent};
