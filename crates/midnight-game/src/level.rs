//! Level composition root
//!
//! The level owns every shared piece of narrative state and lends it to NPC
//! controllers for the duration of a call. One `tick` runs the systems in a
//! fixed order so an input press is handled by at most one state machine:
//!
//! 1. clocks
//! 2. dialogue confirm
//! 3. player input (masks, walking, item pickup)
//! 4. NPC interact
//! 5. combat on the gameplay delta
//! 6. presentation on the unscaled delta
//! 7. clear per-frame input

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use midnight_core::{GameTime, TimeConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dialogue::{DialogueCompleted, DialogueEngine};
use crate::ending::EndingGate;
use crate::error::NarrativeError;
use crate::events::SubscriptionId;
use crate::input::{InputAction, InputState};
use crate::items::ItemDropService;
use crate::ledger::{ChoiceLedger, EndingType};
use crate::npc::{
    Engagement, InteractionContext, InteractionState, NpcController, NpcData, NpcId,
};
use crate::pickup::{ItemPickup, PickupConfig};
use crate::player::PlayerState;
use crate::presentation::{EndingPresenter, MaskHud, PresentationSurface};
use crate::progress::{CountingPolicy, LevelProgress};

fn default_required_interactions() -> u32 {
    3
}

fn default_true() -> bool {
    true
}

/// Level rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Completed interactions needed to finish the level
    #[serde(default = "default_required_interactions")]
    pub required_interactions: u32,
    #[serde(default)]
    pub counting: CountingPolicy,
    #[serde(default = "default_true")]
    pub pause_during_dialogue: bool,
    /// Trigger the ending as soon as the level completes
    #[serde(default = "default_true")]
    pub auto_trigger_ending: bool,
    #[serde(default = "default_true")]
    pub disable_player_on_ending: bool,
    #[serde(default)]
    pub pickup: PickupConfig,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            required_interactions: default_required_interactions(),
            counting: CountingPolicy::default(),
            pause_during_dialogue: true,
            auto_trigger_ending: true,
            disable_player_on_ending: true,
            pickup: PickupConfig::default(),
        }
    }
}

impl LevelConfig {
    pub fn validate(&self) -> Result<(), NarrativeError> {
        if self.required_interactions == 0 {
            return Err(NarrativeError::InvalidConfig(
                "required_interactions must be at least 1".to_string(),
            ));
        }
        self.pickup.validate()
    }
}

/// A level as authored on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    #[serde(default)]
    pub level: LevelConfig,
    #[serde(default, rename = "npc")]
    pub npcs: Vec<NpcData>,
}

impl LevelDefinition {
    /// Reject bad rules; warn about authoring mistakes the level survives
    pub fn validate(&self) -> Result<(), NarrativeError> {
        self.level.validate()?;

        let mut seen = HashSet::new();
        for npc in &self.npcs {
            if npc.id.is_empty() {
                return Err(NarrativeError::EmptyNpcId);
            }
            if let Some(combat) = &npc.combat {
                combat.validate()?;
            }
            for drop in &npc.drops {
                drop.validate()?;
            }
            if !seen.insert(&npc.id) {
                warn!("Duplicate NPC id '{}': choices will overwrite each other", npc.id);
            }
            if npc.requires_mask && !npc.mask_dialogue.as_ref().is_some_and(|s| s.is_complete()) {
                warn!("{} requires a mask but its mask dialogue is incomplete", npc.id);
            }
            if !npc.requires_mask && npc.dialogue.is_none() {
                warn!("{} has no dialogue", npc.id);
            }
        }

        let mask_npcs = self.npcs.iter().filter(|n| n.requires_mask).count() as u32;
        if self.level.counting == CountingPolicy::FirstCompletionPerNpc
            && (self.npcs.len() as u32) < self.level.required_interactions
        {
            warn!(
                "Level needs {} interactions but only has {} NPCs ({} with masks)",
                self.level.required_interactions,
                self.npcs.len(),
                mask_npcs
            );
        }
        Ok(())
    }
}

/// A mask HUD listening to the player's mask changes
struct MaskHudLink {
    hud: Rc<RefCell<MaskHud>>,
    subscription: SubscriptionId,
}

/// Owns the narrative state of one level instance
pub struct Level<P: PlayerState> {
    config: LevelConfig,
    clock: GameTime,
    input: InputState,
    dialogue: DialogueEngine,
    ledger: ChoiceLedger,
    progress: LevelProgress,
    ending: EndingGate,
    npcs: Vec<NpcController>,
    player: P,
    drops: Option<Box<dyn ItemDropService>>,
    pickup: ItemPickup,
    mask_hud: Option<MaskHudLink>,
}

impl<P: PlayerState> Level<P> {
    pub fn new(config: LevelConfig, player: P) -> Result<Self, NarrativeError> {
        config.validate()?;
        Ok(Self {
            clock: GameTime::default(),
            input: InputState::new(),
            dialogue: DialogueEngine::new(config.pause_during_dialogue),
            ledger: ChoiceLedger::new(),
            progress: LevelProgress::new(config.required_interactions, config.counting),
            ending: EndingGate::new(config.disable_player_on_ending),
            npcs: Vec::new(),
            player,
            drops: None,
            pickup: ItemPickup::new(config.pickup.clone()),
            mask_hud: None,
            config,
        })
    }

    /// Build a level and its NPCs from an authored definition
    pub fn from_definition(definition: LevelDefinition, player: P) -> Result<Self, NarrativeError> {
        definition.validate()?;
        let mut level = Self::new(definition.level, player)?;
        for data in definition.npcs {
            level.add_npc(NpcController::new(data));
        }
        info!("Level loaded with {} NPCs", level.npcs.len());
        Ok(level)
    }

    pub fn with_time(mut self, config: TimeConfig) -> Self {
        self.clock = GameTime::new(config);
        self
    }

    pub fn with_dialogue_surface(mut self, surface: Box<dyn PresentationSurface>) -> Self {
        self.dialogue.set_surface(surface);
        self
    }

    pub fn with_ending_presenter(mut self, presenter: Box<dyn EndingPresenter>) -> Self {
        self.ending.set_presenter(presenter);
        self
    }

    pub fn with_item_drops(mut self, drops: Box<dyn ItemDropService>) -> Self {
        self.drops = Some(drops);
        self
    }

    /// Prompt shown near items that can be picked up
    pub fn with_pickup_prompt(mut self, prompt: Box<dyn PresentationSurface>) -> Self {
        self.pickup.set_prompt(prompt);
        self
    }

    /// Panel describing the carried item
    pub fn with_item_info(mut self, info: Box<dyn PresentationSurface>) -> Self {
        self.pickup.set_info_panel(info);
        self
    }

    pub fn with_mask_hud(mut self, hud: Rc<RefCell<MaskHud>>) -> Self {
        self.attach_mask_hud(hud);
        self
    }

    /// Subscribe a HUD to the player's mask changes. Replaces any attached HUD.
    pub fn attach_mask_hud(&mut self, hud: Rc<RefCell<MaskHud>>) -> bool {
        self.detach_mask_hud();
        let Some(bus) = self.player.mask_events() else {
            warn!("Player publishes no mask changes, HUD not attached");
            return false;
        };
        let subscription = MaskHud::subscribe(&hud, bus);
        hud.borrow_mut().sync(self.player.worn_mask());
        self.mask_hud = Some(MaskHudLink { hud, subscription });
        debug!("Mask HUD attached");
        true
    }

    /// Unsubscribe the HUD. It receives no further mask changes.
    pub fn detach_mask_hud(&mut self) -> Option<Rc<RefCell<MaskHud>>> {
        let link = self.mask_hud.take()?;
        if let Some(bus) = self.player.mask_events() {
            bus.unsubscribe(link.subscription);
        }
        debug!("Mask HUD detached");
        Some(link.hud)
    }

    pub fn mask_hud(&self) -> Option<&Rc<RefCell<MaskHud>>> {
        self.mask_hud.as_ref().map(|link| &link.hud)
    }

    pub fn add_npc(&mut self, npc: NpcController) {
        debug!("Added NPC {}", npc.id());
        self.npcs.push(npc);
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn clock(&self) -> &GameTime {
        &self.clock
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn dialogue(&self) -> &DialogueEngine {
        &self.dialogue
    }

    pub fn dialogue_mut(&mut self) -> &mut DialogueEngine {
        &mut self.dialogue
    }

    pub fn ledger(&self) -> &ChoiceLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut ChoiceLedger {
        &mut self.ledger
    }

    pub fn progress(&self) -> &LevelProgress {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut LevelProgress {
        &mut self.progress
    }

    pub fn ending(&self) -> &EndingGate {
        &self.ending
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn pickup(&self) -> &ItemPickup {
        &self.pickup
    }

    pub fn pickup_mut(&mut self) -> &mut ItemPickup {
        &mut self.pickup
    }

    pub fn npcs(&self) -> &[NpcController] {
        &self.npcs
    }

    pub fn npc(&self, id: &NpcId) -> Option<&NpcController> {
        self.npcs.iter().find(|n| n.id() == id)
    }

    pub fn npc_mut(&mut self, id: &NpcId) -> Option<&mut NpcController> {
        self.npcs.iter_mut().find(|n| n.id() == id)
    }

    /// Proximity signal: the player entered an NPC's trigger. Every NPC
    /// sharing the id is notified.
    pub fn proximity_enter(&mut self, id: &NpcId) -> bool {
        let mut found = false;
        for npc in self.npcs.iter_mut().filter(|n| n.id() == id) {
            npc.on_proximity_enter();
            found = true;
        }
        if !found {
            warn!("Proximity enter for unknown NPC {}", id);
        }
        found
    }

    /// Proximity signal: the player left an NPC's trigger
    pub fn proximity_exit(&mut self, id: &NpcId) -> bool {
        let mut found = false;
        for npc in self.npcs.iter_mut().filter(|n| n.id() == id) {
            npc.on_proximity_exit();
            found = true;
        }
        if !found {
            warn!("Proximity exit for unknown NPC {}", id);
        }
        found
    }

    /// Run one frame
    pub fn tick(&mut self, raw_delta: f32) {
        self.clock.update(raw_delta);

        if let Some(done) = self.dialogue.handle_input(&mut self.input, &mut self.clock) {
            self.complete_dialogue(done);
        }

        let gameplay_dt = self.clock.gameplay_delta();
        self.player.handle_input(&mut self.input, gameplay_dt);
        self.handle_pickup();

        self.handle_interact();

        let gameplay_dt = self.clock.gameplay_delta();
        for npc in &mut self.npcs {
            npc.update_combat(&mut self.player, gameplay_dt);
        }

        let presentation_dt = self.clock.presentation_delta();
        self.dialogue.update(presentation_dt);
        for npc in &mut self.npcs {
            npc.update_presentation(presentation_dt);
        }
        self.pickup.update(presentation_dt);
        if let Some(link) = &self.mask_hud {
            link.hud.borrow_mut().update(presentation_dt);
        }
        self.ending.update(presentation_dt);

        self.input.clear_frame();
    }

    fn handle_pickup(&mut self) {
        let position = self.player.position();
        if !self.dialogue.is_active()
            && self.player.controls_enabled()
            && self.input.consume(InputAction::Pickup)
        {
            if let Some(outcome) = self.pickup.toggle(position) {
                debug!("Pickup: {:?}", outcome);
            }
        }
        self.pickup.follow(position);
    }

    fn handle_interact(&mut self) {
        if self.dialogue.is_active() || !self.input.is_just_pressed(InputAction::Interact) {
            return;
        }
        let Some(npc) = self.npcs.iter_mut().find(|n| n.accepts_interaction()) else {
            return;
        };
        self.input.consume(InputAction::Interact);

        let ctx = InteractionContext {
            dialogue: &mut self.dialogue,
            ledger: &mut self.ledger,
            clock: &mut self.clock,
            player: &self.player,
        };
        match npc.interact(ctx) {
            Ok(outcome) => debug!("Interaction with {}: {:?}", npc.id(), outcome),
            Err(e) => debug!("Interaction with {} rejected: {}", npc.id(), e),
        }
    }

    /// Close the active dialogue early
    pub fn end_dialogue(&mut self) {
        if let Some(done) = self.dialogue.end_dialogue(&mut self.clock) {
            self.complete_dialogue(done);
        }
    }

    fn complete_dialogue(&mut self, done: DialogueCompleted) {
        let engaged = InteractionState::Engaged(Engagement::Dialogue);
        let npc = self
            .npcs
            .iter_mut()
            .find(|n| n.id() == &done.requester && n.state() == engaged);
        match npc {
            Some(npc) => match self.drops.as_mut() {
                Some(service) => {
                    npc.on_dialogue_complete(Some(service.as_mut()));
                    self.pickup.add_items(service.take_spawned());
                }
                None => {
                    npc.on_dialogue_complete(None);
                }
            },
            None => warn!("Dialogue completed for {} but no such NPC is talking", done.requester),
        }

        if self.progress.register_completion(&done.requester) && self.config.auto_trigger_ending {
            if let Err(e) = self.trigger_ending() {
                warn!("Ending not triggered: {}", e);
            }
        }
    }

    /// Classify and present the ending now
    pub fn trigger_ending(&mut self) -> Result<EndingType, NarrativeError> {
        self.ending.trigger_ending(&self.ledger, &mut self.player)
    }

    /// Reinitialize the narrative state for a replay. The player is left to
    /// the caller.
    pub fn reset(&mut self) {
        self.dialogue.end_dialogue(&mut self.clock);
        self.clock.resume();
        self.ledger.reset();
        self.progress.reset();
        self.ending.reset();
        for npc in &mut self.npcs {
            npc.reset();
        }
        self.pickup.reset();
        if let Some(link) = &self.mask_hud {
            link.hud.borrow_mut().sync(self.player.worn_mask());
        }
        self.input.clear_all();
        info!("Level reset");
    }
}

impl<P: PlayerState> Drop for Level<P> {
    fn drop(&mut self) {
        self.detach_mask_hud();
    }
}
