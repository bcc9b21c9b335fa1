use crate::mask::MaskType;
use crate::npc::NpcId;

/// Errors raised by the interaction and narrative systems.
///
/// None of these are fatal: the caller logs them and the request simply
/// does not happen.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NarrativeError {
    #[error("a dialogue with {0} is already active")]
    DialogueAlreadyActive(NpcId),

    #[error("dialogue script for '{speaker}' is invalid: {reason}")]
    InvalidScript { speaker: String, reason: &'static str },

    #[error("no dialogue variant for mask {0}")]
    MissingVariant(MaskType),

    #[error("mask dialogue set for {0} is incomplete")]
    IncompleteMaskSet(NpcId),

    #[error("{0} has no dialogue configured")]
    NoDialogue(NpcId),

    #[error("{0} has already been talked to and cannot repeat")]
    AlreadyInteracted(NpcId),

    #[error("{0} is not available for interaction")]
    NotAvailable(NpcId),

    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("ending already triggered")]
    EndingAlreadyTriggered,

    #[error("NPC id must not be empty")]
    EmptyNpcId,

    #[error("invalid mask slot: {0}")]
    InvalidMaskSlot(usize),

    #[error("already holding {0}")]
    AlreadyHolding(String),

    #[error("no item within reach")]
    NothingInReach,

    #[error("invalid level config: {0}")]
    InvalidConfig(String),
}
