//! Per-NPC interaction state machine
//!
//! ```text
//! Idle <-> Available --interact--> Engaged(Dialogue) --complete--> Available | Idle | Exhausted
//!                    \-- no mask --> Engaged(Combat)  --mask worn--> Available | Idle
//! ```
//!
//! Proximity changes never interrupt an engagement.

use glam::Vec3;
use midnight_core::GameTime;
use tracing::{debug, info, warn};

use super::combat::{CombatExit, CombatFallback};
use super::{NpcData, NpcId};
use crate::dialogue::{DialogueEngine, DialogueScript};
use crate::error::NarrativeError;
use crate::items::ItemDropService;
use crate::ledger::ChoiceLedger;
use crate::mask::MaskType;
use crate::player::PlayerState;
use crate::presentation::PresentationSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engagement {
    Dialogue,
    Combat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    /// Player out of range
    Idle,
    /// Player in range, prompt visible
    Available,
    Engaged(Engagement),
    /// Non-repeatable dialogue finished
    Exhausted,
}

/// Shared level state an NPC needs to handle an interaction
pub struct InteractionContext<'a> {
    pub dialogue: &'a mut DialogueEngine,
    pub ledger: &'a mut ChoiceLedger,
    pub clock: &'a mut GameTime,
    pub player: &'a dyn PlayerState,
}

/// What an accepted interaction turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// Dialogue opened; `mask` is the mask it was chosen for, if any
    DialogueStarted { mask: MaskType },
    CombatStarted,
}

pub struct NpcController {
    data: NpcData,
    state: InteractionState,
    in_range: bool,
    has_interacted: bool,
    /// Repeatability of the script most recently started
    current_repeatable: bool,
    combat: Option<CombatFallback>,
    prompt: Option<Box<dyn PresentationSurface>>,
}

impl NpcController {
    pub fn new(data: NpcData) -> Self {
        let combat = data
            .combat
            .clone()
            .map(|config| CombatFallback::new(config, data.position));
        Self {
            data,
            state: InteractionState::Idle,
            in_range: false,
            has_interacted: false,
            current_repeatable: true,
            combat,
            prompt: None,
        }
    }

    pub fn with_prompt(mut self, prompt: Box<dyn PresentationSurface>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn set_prompt(&mut self, prompt: Box<dyn PresentationSurface>) {
        self.prompt = Some(prompt);
    }

    pub fn id(&self) -> &NpcId {
        &self.data.id
    }

    pub fn data(&self) -> &NpcData {
        &self.data
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn in_range(&self) -> bool {
        self.in_range
    }

    pub fn has_interacted(&self) -> bool {
        self.has_interacted
    }

    pub fn combat(&self) -> Option<&CombatFallback> {
        self.combat.as_ref()
    }

    /// Current position; follows the NPC while it chases
    pub fn position(&self) -> Vec3 {
        self.combat
            .as_ref()
            .map_or(self.data.position, CombatFallback::position)
    }

    pub fn accepts_interaction(&self) -> bool {
        self.state == InteractionState::Available
    }

    pub fn on_proximity_enter(&mut self) {
        self.in_range = true;
        if self.state == InteractionState::Idle {
            self.become_available();
        }
    }

    pub fn on_proximity_exit(&mut self) {
        self.in_range = false;
        if self.state == InteractionState::Available {
            self.state = InteractionState::Idle;
            self.hide_prompt();
            debug!("{} idle", self.data.id);
        }
    }

    /// Handle the interact input. Rejections leave the state unchanged.
    pub fn interact(
        &mut self,
        ctx: InteractionContext<'_>,
    ) -> Result<InteractionOutcome, NarrativeError> {
        if !self.accepts_interaction() {
            warn!("{} ignored interaction in state {:?}", self.data.id, self.state);
            return Err(NarrativeError::NotAvailable(self.data.id.clone()));
        }

        if !self.data.requires_mask {
            return self.start_plain_dialogue(ctx);
        }

        let mask = ctx.player.worn_mask();
        if !mask.is_worn() {
            return self.start_combat();
        }
        self.start_mask_dialogue(mask, ctx)
    }

    fn start_plain_dialogue(
        &mut self,
        ctx: InteractionContext<'_>,
    ) -> Result<InteractionOutcome, NarrativeError> {
        let Some(script) = self.data.dialogue.as_ref() else {
            warn!("{} has no dialogue", self.data.id);
            return Err(NarrativeError::NoDialogue(self.data.id.clone()));
        };
        if self.has_interacted && !script.repeatable {
            warn!("{} already talked to", self.data.id);
            return Err(NarrativeError::AlreadyInteracted(self.data.id.clone()));
        }

        let repeatable = script.repeatable;
        ctx.dialogue.start_dialogue(script, &self.data.id, ctx.clock)?;
        self.engage_dialogue(repeatable);
        Ok(InteractionOutcome::DialogueStarted {
            mask: MaskType::None,
        })
    }

    fn start_mask_dialogue(
        &mut self,
        mask: MaskType,
        ctx: InteractionContext<'_>,
    ) -> Result<InteractionOutcome, NarrativeError> {
        let script = self.select_script(mask).inspect_err(|e| {
            warn!("{} cannot respond to {}: {}", self.data.id, mask, e);
        })?;

        let repeatable = script.repeatable;
        ctx.dialogue.start_dialogue(script, &self.data.id, ctx.clock)?;
        if let Err(e) = ctx.ledger.record_choice(&self.data.id, mask) {
            warn!("Choice for {} not recorded: {}", self.data.id, e);
        }
        self.engage_dialogue(repeatable);
        Ok(InteractionOutcome::DialogueStarted { mask })
    }

    fn select_script(&self, mask: MaskType) -> Result<&DialogueScript, NarrativeError> {
        let set = self
            .data
            .mask_dialogue
            .as_ref()
            .ok_or_else(|| NarrativeError::NoDialogue(self.data.id.clone()))?;
        if !set.is_complete() {
            return Err(NarrativeError::IncompleteMaskSet(self.data.id.clone()));
        }
        set.script_for(mask)
    }

    fn start_combat(&mut self) -> Result<InteractionOutcome, NarrativeError> {
        let Some(combat) = self.combat.as_mut() else {
            warn!("{} has no combat config, ignoring unmasked player", self.data.id);
            return Err(NarrativeError::MissingCollaborator("combat config"));
        };
        combat.enter();
        self.state = InteractionState::Engaged(Engagement::Combat);
        self.hide_prompt();
        info!("{} confronts the unmasked player", self.data.id);
        Ok(InteractionOutcome::CombatStarted)
    }

    fn engage_dialogue(&mut self, repeatable: bool) {
        self.current_repeatable = repeatable;
        self.has_interacted = true;
        self.state = InteractionState::Engaged(Engagement::Dialogue);
        self.hide_prompt();
    }

    /// Called when this NPC's dialogue closes. Returns false if the NPC was
    /// not in a dialogue.
    pub fn on_dialogue_complete(&mut self, drops: Option<&mut dyn ItemDropService>) -> bool {
        if self.state != InteractionState::Engaged(Engagement::Dialogue) {
            debug!("{} got a dialogue completion while {:?}", self.data.id, self.state);
            return false;
        }

        if self.data.drop_after_dialogue && !self.data.drops.is_empty() {
            match drops {
                Some(service) => service.drop_items(self.position(), &self.data.drops),
                None => warn!("No item drop service, {} drops nothing", self.data.id),
            }
        }

        if !self.current_repeatable {
            self.state = InteractionState::Exhausted;
            debug!("{} exhausted", self.data.id);
        } else if self.in_range {
            self.become_available();
        } else {
            self.state = InteractionState::Idle;
        }
        true
    }

    /// Advance the combat fallback on the gameplay delta
    pub fn update_combat(&mut self, player: &mut dyn PlayerState, dt: f32) -> Option<CombatExit> {
        if self.state != InteractionState::Engaged(Engagement::Combat) {
            return None;
        }
        let exit = self.combat.as_mut()?.update(player, dt)?;

        info!("{} stops fighting: {:?}", self.data.id, exit);
        if self.in_range {
            self.become_available();
        } else {
            self.state = InteractionState::Idle;
        }
        Some(exit)
    }

    /// Advance the prompt on the presentation delta
    pub fn update_presentation(&mut self, dt: f32) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.update(dt);
        }
    }

    /// Back to the freshly loaded state
    pub fn reset(&mut self) {
        self.hide_prompt();
        self.state = InteractionState::Idle;
        self.in_range = false;
        self.has_interacted = false;
        self.current_repeatable = true;
        if let Some(combat) = self.combat.as_mut() {
            combat.exit();
            combat.set_position(self.data.position);
        }
    }

    fn become_available(&mut self) {
        self.state = InteractionState::Available;
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.show(&self.data.name, None);
        }
        debug!("{} available", self.data.id);
    }

    fn hide_prompt(&mut self) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.hide();
        }
    }
}

impl std::fmt::Debug for NpcController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NpcController")
            .field("id", &self.data.id)
            .field("state", &self.state)
            .field("in_range", &self.in_range)
            .field("has_interacted", &self.has_interacted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::MaskDialogueSet;
    use crate::items::ItemDrop;
    use crate::npc::CombatConfig;
    use crate::player::Player;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Shared {
        dialogue: DialogueEngine,
        ledger: ChoiceLedger,
        clock: GameTime,
        player: Player,
    }

    impl Shared {
        fn new() -> Self {
            Self {
                dialogue: DialogueEngine::new(true),
                ledger: ChoiceLedger::new(),
                clock: GameTime::default(),
                player: Player::new(),
            }
        }

        fn ctx(&mut self) -> InteractionContext<'_> {
            InteractionContext {
                dialogue: &mut self.dialogue,
                ledger: &mut self.ledger,
                clock: &mut self.clock,
                player: &self.player,
            }
        }

        fn finish_dialogue(&mut self) -> NpcId {
            loop {
                if let Some(done) = self.dialogue.advance_line(&mut self.clock) {
                    return done.requester;
                }
            }
        }
    }

    fn line(text: &str) -> Vec<String> {
        vec![text.to_string()]
    }

    fn mask_set() -> MaskDialogueSet {
        MaskDialogueSet::new(
            DialogueScript::new("Child", line("You look strange.")),
            DialogueScript::new("Child", line("Thank you!")),
            DialogueScript::new("Child", line("...")).once(),
        )
    }

    #[derive(Default)]
    struct PromptLog {
        visible: bool,
        shows: u32,
    }

    struct TestPrompt(Rc<RefCell<PromptLog>>);

    impl PresentationSurface for TestPrompt {
        fn show(&mut self, _title: &str, _portrait: Option<&str>) {
            let mut log = self.0.borrow_mut();
            log.visible = true;
            log.shows += 1;
        }
        fn set_text(&mut self, _line: &str) {}
        fn hide(&mut self) {
            self.0.borrow_mut().visible = false;
        }
    }

    #[derive(Default)]
    struct DropLog {
        calls: Vec<(Vec3, usize)>,
    }

    impl ItemDropService for DropLog {
        fn drop_items(&mut self, origin: Vec3, drops: &[ItemDrop]) {
            self.calls.push((origin, drops.len()));
        }
    }

    #[test]
    fn test_proximity_toggles_prompt() {
        let log = Rc::new(RefCell::new(PromptLog::default()));
        let script = DialogueScript::new("Lamp Keeper", line("Evening."));
        let mut npc = NpcController::new(NpcData::talker("keeper", "Lamp Keeper", script))
            .with_prompt(Box::new(TestPrompt(log.clone())));

        npc.on_proximity_enter();
        assert_eq!(npc.state(), InteractionState::Available);
        assert!(log.borrow().visible);

        npc.on_proximity_exit();
        assert_eq!(npc.state(), InteractionState::Idle);
        assert!(!log.borrow().visible);
    }

    #[test]
    fn test_plain_dialogue_and_return_to_available() {
        let mut shared = Shared::new();
        let script = DialogueScript::new("Lamp Keeper", line("Evening."));
        let mut npc = NpcController::new(NpcData::talker("keeper", "Lamp Keeper", script));
        npc.on_proximity_enter();

        let outcome = npc.interact(shared.ctx()).unwrap();
        assert_eq!(outcome, InteractionOutcome::DialogueStarted { mask: MaskType::None });
        assert_eq!(npc.state(), InteractionState::Engaged(Engagement::Dialogue));
        assert_eq!(shared.ledger.total(), 0);

        assert_eq!(&shared.finish_dialogue(), npc.id());
        assert!(npc.on_dialogue_complete(None));
        assert_eq!(npc.state(), InteractionState::Available);
    }

    #[test]
    fn test_non_repeatable_dialogue_exhausts() {
        let mut shared = Shared::new();
        let script = DialogueScript::new("Lamp Keeper", line("Only once.")).once();
        let mut npc = NpcController::new(NpcData::talker("keeper", "Lamp Keeper", script));
        npc.on_proximity_enter();

        npc.interact(shared.ctx()).unwrap();
        shared.finish_dialogue();
        npc.on_dialogue_complete(None);
        assert_eq!(npc.state(), InteractionState::Exhausted);

        npc.on_proximity_exit();
        npc.on_proximity_enter();
        assert_eq!(npc.state(), InteractionState::Exhausted);
        assert!(matches!(
            npc.interact(shared.ctx()),
            Err(NarrativeError::NotAvailable(_))
        ));
    }

    #[test]
    fn test_masked_interaction_records_choice() {
        let mut shared = Shared::new();
        shared.player.masks.wear(MaskType::Kindness);
        let mut npc = NpcController::new(NpcData::masked("child", "Child", mask_set()));
        npc.on_proximity_enter();

        let outcome = npc.interact(shared.ctx()).unwrap();
        assert_eq!(outcome, InteractionOutcome::DialogueStarted { mask: MaskType::Kindness });
        assert_eq!(shared.ledger.choice(npc.id()), MaskType::Kindness);
        assert_eq!(
            shared.dialogue.session().unwrap().current_line(),
            Some("Thank you!")
        );
    }

    #[test]
    fn test_repeatability_follows_played_variant() {
        let mut shared = Shared::new();
        shared.player.masks.wear(MaskType::Indifference);
        let mut npc = NpcController::new(NpcData::masked("child", "Child", mask_set()));
        npc.on_proximity_enter();

        npc.interact(shared.ctx()).unwrap();
        shared.finish_dialogue();
        npc.on_dialogue_complete(None);
        assert_eq!(npc.state(), InteractionState::Exhausted);
    }

    #[test]
    fn test_unmasked_player_triggers_combat() {
        let log = Rc::new(RefCell::new(PromptLog::default()));
        let mut shared = Shared::new();
        let mut npc = NpcController::new(NpcData::masked("stranger", "Stranger", mask_set()))
            .with_prompt(Box::new(TestPrompt(log.clone())));
        npc.on_proximity_enter();

        assert_eq!(npc.interact(shared.ctx()), Ok(InteractionOutcome::CombatStarted));
        assert_eq!(npc.state(), InteractionState::Engaged(Engagement::Combat));
        assert!(!log.borrow().visible);
        assert!(!shared.dialogue.is_active());
        assert_eq!(shared.ledger.total(), 0);

        // Leaving range does not interrupt the fight
        npc.on_proximity_exit();
        assert_eq!(npc.state(), InteractionState::Engaged(Engagement::Combat));
        npc.on_proximity_enter();

        shared.player.masks.wear(MaskType::Honesty);
        assert_eq!(
            npc.update_combat(&mut shared.player, 0.1),
            Some(CombatExit::MaskWorn)
        );
        assert_eq!(npc.state(), InteractionState::Available);
        assert!(log.borrow().visible);
        assert_eq!(shared.player.health(), 100.0);
    }

    #[test]
    fn test_missing_combat_config_stays_available() {
        let mut shared = Shared::new();
        let data = NpcData::masked("stranger", "Stranger", mask_set()).with_combat(None);
        let mut npc = NpcController::new(data);
        npc.on_proximity_enter();

        assert!(npc.interact(shared.ctx()).is_err());
        assert_eq!(npc.state(), InteractionState::Available);
    }

    #[test]
    fn test_incomplete_mask_set_rejected() {
        let mut shared = Shared::new();
        shared.player.masks.wear(MaskType::Honesty);
        let mut set = mask_set();
        set.kindness = None;
        let mut npc = NpcController::new(NpcData::masked("child", "Child", set));
        npc.on_proximity_enter();

        assert_eq!(
            npc.interact(shared.ctx()),
            Err(NarrativeError::IncompleteMaskSet(NpcId::new("child")))
        );
        assert_eq!(npc.state(), InteractionState::Available);
        assert_eq!(shared.ledger.total(), 0);
        assert!(!shared.dialogue.is_active());
    }

    #[test]
    fn test_rejected_while_other_dialogue_active() {
        let mut shared = Shared::new();
        let mut first = NpcController::new(NpcData::talker(
            "keeper",
            "Lamp Keeper",
            DialogueScript::new("Lamp Keeper", line("Evening.")),
        ));
        shared.player.masks.wear(MaskType::Honesty);
        let mut second = NpcController::new(NpcData::masked("child", "Child", mask_set()));
        first.on_proximity_enter();
        second.on_proximity_enter();

        first.interact(shared.ctx()).unwrap();
        assert!(matches!(
            second.interact(shared.ctx()),
            Err(NarrativeError::DialogueAlreadyActive(_))
        ));
        assert_eq!(second.state(), InteractionState::Available);
        assert_eq!(shared.ledger.total(), 0);
    }

    #[test]
    fn test_drops_after_dialogue() {
        let mut shared = Shared::new();
        let data = NpcData::talker(
            "keeper",
            "Lamp Keeper",
            DialogueScript::new("Lamp Keeper", line("Take this.")),
        )
        .at(Vec3::new(3.0, 0.0, 0.0))
        .with_drops(vec![ItemDrop::new("Lantern")]);
        let mut npc = NpcController::new(data);
        npc.on_proximity_enter();
        npc.interact(shared.ctx()).unwrap();
        shared.finish_dialogue();

        let mut drops = DropLog::default();
        npc.on_dialogue_complete(Some(&mut drops));
        assert_eq!(drops.calls, vec![(Vec3::new(3.0, 0.0, 0.0), 1)]);
    }

    #[test]
    fn test_completion_out_of_range_goes_idle() {
        let mut shared = Shared::new();
        let script = DialogueScript::new("Lamp Keeper", line("Evening."));
        let mut npc = NpcController::new(NpcData::talker("keeper", "Lamp Keeper", script));
        npc.on_proximity_enter();
        npc.interact(shared.ctx()).unwrap();
        npc.on_proximity_exit();
        assert_eq!(npc.state(), InteractionState::Engaged(Engagement::Dialogue));

        shared.finish_dialogue();
        npc.on_dialogue_complete(None);
        assert_eq!(npc.state(), InteractionState::Idle);
    }

    #[test]
    fn test_reset() {
        let mut shared = Shared::new();
        let data = NpcData::masked("stranger", "Stranger", mask_set()).with_combat(Some(CombatConfig {
            chase_speed: 10.0,
            ..Default::default()
        }));
        let mut npc = NpcController::new(data);
        npc.on_proximity_enter();
        npc.interact(shared.ctx()).unwrap();
        shared.player.set_position(Vec3::new(20.0, 0.0, 0.0));
        npc.update_combat(&mut shared.player, 1.0);
        assert!(npc.position().x > 0.0);

        npc.reset();
        assert_eq!(npc.state(), InteractionState::Idle);
        assert!(!npc.has_interacted());
        assert_eq!(npc.position(), Vec3::ZERO);
        assert!(!npc.combat().unwrap().is_active());
    }
}
