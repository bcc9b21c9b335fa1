//! Scripted, headless walk through a level

use anyhow::{bail, Context, Result};
use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;

use midnight_game::{
    DialoguePanel, EndingScreen, EndingType, InputAction, InteractionPrompt, ItemInfoPanel,
    ItemScatter, Level, LevelDefinition, MaskHud, MaskType, NpcId, Player, PlayerState,
    PromptConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::settings::{DemoSettings, GameSettings, RouteStep};

/// Give up walking after this many frames
const MAX_WALK_FRAMES: u32 = 60 * 60;
/// Give up on a conversation after this many lines
const MAX_LINES: u32 = 64;
/// How long the unmasked player stands their ground
const CONFRONT_SECONDS: f32 = 2.0;
/// Time spent reading each line before confirming
const READ_SECONDS: f32 = 0.5;

/// How the walk went
#[derive(Debug, Clone, PartialEq)]
pub struct DemoReport {
    pub ending: Option<EndingType>,
    pub choices: Vec<(NpcId, MaskType)>,
    pub health: f32,
    pub frames: u64,
    /// Item in the player's hands at the end
    pub held_item: Option<String>,
}

/// Wire a level with the UI and item collaborators from settings
pub fn build_level(settings: &GameSettings, definition: LevelDefinition) -> Result<Level<Player>> {
    let rng = match settings.demo.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let presentation = &settings.presentation;

    let mut level = Level::from_definition(definition, Player::new())
        .context("Failed to build level")?
        .with_time(settings.gameplay.time_config())
        .with_dialogue_surface(Box::new(DialoguePanel::new(presentation.dialogue.clone())))
        .with_ending_presenter(Box::new(EndingScreen::new(presentation.ending.clone())))
        .with_item_drops(Box::new(ItemScatter::new(rng)))
        .with_item_info(Box::new(ItemInfoPanel::new(presentation.item_info.clone())))
        .with_mask_hud(Rc::new(RefCell::new(MaskHud::new(
            presentation.mask_hud.clone(),
            &MaskType::WEARABLE,
        ))));

    let pickup_prompt = PromptConfig {
        message: level.pickup().config.pickup_message.clone(),
        ..presentation.prompt.clone()
    };
    level = level.with_pickup_prompt(Box::new(InteractionPrompt::new(pickup_prompt)));

    let ids: Vec<NpcId> = level.npcs().iter().map(|n| n.id().clone()).collect();
    for id in &ids {
        if let Some(npc) = level.npc_mut(id) {
            npc.set_prompt(Box::new(InteractionPrompt::new(presentation.prompt.clone())));
        }
    }
    Ok(level)
}

/// Drives a level by feeding it input, one frame at a time
pub struct DemoWalk<'a> {
    level: &'a mut Level<Player>,
    settings: &'a DemoSettings,
    dt: f32,
}

impl<'a> DemoWalk<'a> {
    pub fn new(level: &'a mut Level<Player>, settings: &'a DemoSettings) -> Self {
        let dt = 1.0 / settings.frame_rate.max(1.0);
        Self { level, settings, dt }
    }

    /// Visit every stop on the route, then let the ending play out
    pub fn run(mut self, ending_seconds: f32) -> Result<DemoReport> {
        let settings = self.settings;
        for step in &settings.route {
            if self.level.ending().is_triggered() {
                info!("Ending reached, skipping the rest of the route");
                break;
            }
            self.visit(step)?;
        }

        if self.level.ending().is_triggered() {
            self.wait(ending_seconds);
        } else {
            warn!(
                "Route finished without an ending ({}/{} interactions)",
                self.level.progress().count(),
                self.level.progress().required()
            );
        }

        Ok(self.report())
    }

    fn report(&self) -> DemoReport {
        DemoReport {
            ending: self.level.ending().ending(),
            choices: self.level.ledger().snapshot(),
            health: self.level.player().health(),
            frames: self.level.clock().frame_count,
            held_item: self.level.pickup().held().map(|item| item.name.clone()),
        }
    }

    fn visit(&mut self, step: &RouteStep) -> Result<()> {
        let id = NpcId::new(step.npc.as_str());
        let target = self
            .level
            .npc(&id)
            .map(|n| n.position())
            .with_context(|| format!("Route visits unknown NPC '{}'", step.npc))?;

        info!("Walking to {}", id);
        self.walk_to(target)?;
        self.level.proximity_enter(&id);

        if step.confront_unmasked {
            self.wear(MaskType::None);
            self.tap(InputAction::Interact);
            self.wait(CONFRONT_SECONDS);
            info!("Health after confronting {}: {:.0}", id, self.level.player().health());
        }

        self.wear(step.mask);
        self.tap(InputAction::Interact);
        if !self.level.dialogue().is_active() {
            warn!("{} did not start a conversation", id);
        }

        let mut lines = 0;
        while self.level.dialogue().is_active() {
            if lines >= MAX_LINES {
                bail!("Conversation with {} never ended", id);
            }
            self.wait(READ_SECONDS);
            self.tap(InputAction::Confirm);
            lines += 1;
        }

        if step.pick_up {
            self.tap(InputAction::Pickup);
            match self.level.pickup().held() {
                Some(item) => info!("Carrying {}", item.name),
                None => warn!("Nothing to pick up near {}", id),
            }
        }

        self.level.proximity_exit(&id);
        Ok(())
    }

    fn walk_to(&mut self, target: Vec3) -> Result<()> {
        let radius = self.settings.interaction_radius;
        let mut frames = 0;
        loop {
            let dx = target.x - self.level.player().position().x;
            if dx.abs() <= radius {
                break;
            }
            if frames >= MAX_WALK_FRAMES || !self.level.player().controls_enabled() {
                bail!("Could not reach x = {:.1}", target.x);
            }

            let (hold, other) = if dx > 0.0 {
                (InputAction::MoveRight, InputAction::MoveLeft)
            } else {
                (InputAction::MoveLeft, InputAction::MoveRight)
            };
            let input = self.level.input_mut();
            input.release(other);
            input.press(hold);
            self.level.tick(self.dt);
            frames += 1;
        }

        let input = self.level.input_mut();
        input.release(InputAction::MoveLeft);
        input.release(InputAction::MoveRight);
        self.level.tick(self.dt);
        debug!("Arrived after {} frames", frames);
        Ok(())
    }

    fn wear(&mut self, mask: MaskType) {
        let action = match MaskType::WEARABLE.iter().position(|m| *m == mask) {
            Some(0) => InputAction::Mask1,
            Some(1) => InputAction::Mask2,
            Some(_) => InputAction::Mask3,
            None => InputAction::RemoveMask,
        };
        self.tap(action);
    }

    fn tap(&mut self, action: InputAction) {
        self.level.input_mut().tap(action);
        self.level.tick(self.dt);
    }

    fn wait(&mut self, seconds: f32) {
        let frames = (seconds / self.dt).ceil() as u32;
        for _ in 0..frames {
            self.level.tick(self.dt);
        }
    }
}
