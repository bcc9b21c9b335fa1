//! Dialogue scripts and the single active dialogue session

use midnight_core::GameTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::NarrativeError;
use crate::events::EventBus;
use crate::input::{InputAction, InputState};
use crate::mask::MaskType;
use crate::npc::NpcId;
use crate::presentation::PresentationSurface;

fn default_repeatable() -> bool {
    true
}

/// An authored sequence of lines spoken by one NPC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueScript {
    /// Display name shown as the dialogue title
    pub speaker: String,
    /// Portrait reference handed to the presentation surface
    #[serde(default)]
    pub portrait: Option<String>,
    pub lines: Vec<String>,
    /// Whether the NPC can be talked to again after this script ends
    #[serde(default = "default_repeatable")]
    pub repeatable: bool,
}

impl DialogueScript {
    pub fn new(speaker: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            speaker: speaker.into(),
            portrait: None,
            lines,
            repeatable: true,
        }
    }

    pub fn once(mut self) -> Self {
        self.repeatable = false;
        self
    }

    pub fn with_portrait(mut self, portrait: impl Into<String>) -> Self {
        self.portrait = Some(portrait.into());
        self
    }

    /// A script needs at least one line and a display name
    pub fn validate(&self) -> Result<(), NarrativeError> {
        if self.lines.is_empty() {
            return Err(NarrativeError::InvalidScript {
                speaker: self.speaker.clone(),
                reason: "no lines",
            });
        }
        if self.speaker.trim().is_empty() {
            return Err(NarrativeError::InvalidScript {
                speaker: self.speaker.clone(),
                reason: "missing display name",
            });
        }
        Ok(())
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// One script per wearable mask
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskDialogueSet {
    pub honesty: Option<DialogueScript>,
    pub kindness: Option<DialogueScript>,
    pub indifference: Option<DialogueScript>,
}

impl MaskDialogueSet {
    pub fn new(honesty: DialogueScript, kindness: DialogueScript, indifference: DialogueScript) -> Self {
        Self {
            honesty: Some(honesty),
            kindness: Some(kindness),
            indifference: Some(indifference),
        }
    }

    /// Valid only when all three variants are present
    pub fn is_complete(&self) -> bool {
        self.honesty.is_some() && self.kindness.is_some() && self.indifference.is_some()
    }

    pub fn variant_count(&self) -> usize {
        [&self.honesty, &self.kindness, &self.indifference]
            .iter()
            .filter(|v| v.is_some())
            .count()
    }

    /// The script for the given mask
    pub fn script_for(&self, mask: MaskType) -> Result<&DialogueScript, NarrativeError> {
        let variant = match mask {
            MaskType::Honesty => self.honesty.as_ref(),
            MaskType::Kindness => self.kindness.as_ref(),
            MaskType::Indifference => self.indifference.as_ref(),
            MaskType::None => None,
        };
        variant.ok_or(NarrativeError::MissingVariant(mask))
    }
}

/// Lifecycle notifications for observers of the dialogue engine
#[derive(Debug, Clone, PartialEq)]
pub enum DialogueEvent {
    Started { requester: NpcId, speaker: String },
    LineChanged { line: String, index: usize, total: usize },
    Ended { requester: NpcId },
}

/// Returned when a session closes; the requester must be told
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueCompleted {
    pub requester: NpcId,
}

/// The active traversal of a script
#[derive(Debug, Clone)]
pub struct DialogueSession {
    script: DialogueScript,
    line_index: usize,
    requester: NpcId,
}

impl DialogueSession {
    pub fn script(&self) -> &DialogueScript {
        &self.script
    }

    pub fn line_index(&self) -> usize {
        self.line_index
    }

    pub fn requester(&self) -> &NpcId {
        &self.requester
    }

    pub fn current_line(&self) -> Option<&str> {
        self.script.line(self.line_index)
    }
}

/// Owns the one dialogue session that may exist at a time
pub struct DialogueEngine {
    session: Option<DialogueSession>,
    surface: Option<Box<dyn PresentationSurface>>,
    /// Pause gameplay time while a session is open
    pause_gameplay: bool,
    pub events: EventBus<DialogueEvent>,
}

impl DialogueEngine {
    pub fn new(pause_gameplay: bool) -> Self {
        Self {
            session: None,
            surface: None,
            pause_gameplay,
            events: EventBus::new(),
        }
    }

    /// Attach the dialogue UI
    pub fn with_surface(mut self, surface: Box<dyn PresentationSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn set_surface(&mut self, surface: Box<dyn PresentationSurface>) {
        self.surface = Some(surface);
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DialogueSession> {
        self.session.as_ref()
    }

    /// Open a session at line 0. Rejected while another session is open.
    pub fn start_dialogue(
        &mut self,
        script: &DialogueScript,
        requester: &NpcId,
        clock: &mut GameTime,
    ) -> Result<(), NarrativeError> {
        if let Err(e) = script.validate() {
            warn!("Rejected dialogue for {}: {}", requester, e);
            return Err(e);
        }
        if let Some(active) = &self.session {
            warn!(
                "Rejected dialogue for {}: dialogue with {} already active",
                requester, active.requester
            );
            return Err(NarrativeError::DialogueAlreadyActive(active.requester.clone()));
        }

        self.session = Some(DialogueSession {
            script: script.clone(),
            line_index: 0,
            requester: requester.clone(),
        });

        if self.pause_gameplay {
            clock.pause();
        }

        match self.surface.as_mut() {
            Some(surface) => surface.show(&script.speaker, script.portrait.as_deref()),
            None => warn!("No dialogue surface attached; dialogue will run without UI"),
        }

        self.events.publish(&DialogueEvent::Started {
            requester: requester.clone(),
            speaker: script.speaker.clone(),
        });
        self.display_current_line();

        info!("Started dialogue with {} ({})", script.speaker, requester);
        Ok(())
    }

    /// Move to the next line, closing the session after the last one
    pub fn advance_line(&mut self, clock: &mut GameTime) -> Option<DialogueCompleted> {
        let session = self.session.as_mut()?;
        session.line_index += 1;

        if session.line_index >= session.script.len() {
            return self.end_dialogue(clock);
        }

        self.display_current_line();
        None
    }

    /// Close the session. Returns the requester to notify.
    pub fn end_dialogue(&mut self, clock: &mut GameTime) -> Option<DialogueCompleted> {
        let session = self.session.take()?;

        if self.pause_gameplay {
            clock.resume();
        }

        if let Some(surface) = self.surface.as_mut() {
            surface.hide();
        }

        self.events.publish(&DialogueEvent::Ended {
            requester: session.requester.clone(),
        });
        info!("Dialogue with {} ended", session.requester);

        Some(DialogueCompleted {
            requester: session.requester,
        })
    }

    /// Consume the confirm input, at most once per tick, while a session is open
    pub fn handle_input(
        &mut self,
        input: &mut InputState,
        clock: &mut GameTime,
    ) -> Option<DialogueCompleted> {
        if !self.is_active() || !input.consume(InputAction::Confirm) {
            return None;
        }
        self.advance_line(clock)
    }

    /// Advance UI effects on the presentation clock
    pub fn update(&mut self, presentation_dt: f32) {
        if let Some(surface) = self.surface.as_mut() {
            surface.update(presentation_dt);
        }
    }

    fn display_current_line(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        let index = session.line_index;
        let total = session.script.len();
        let line = session.script.line(index).unwrap_or_default().to_string();

        if let Some(surface) = self.surface.as_mut() {
            surface.set_text(&line);
        }
        debug!("Dialogue line {}/{}: {}", index + 1, total, line);
        self.events.publish(&DialogueEvent::LineChanged { line, index, total });
    }
}

impl Default for DialogueEngine {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn three_lines() -> DialogueScript {
        DialogueScript::new(
            "Old Man",
            vec!["Evening.".into(), "Cold night.".into(), "Walk safe.".into()],
        )
    }

    fn record_events(engine: &mut DialogueEngine) -> Rc<RefCell<Vec<DialogueEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        engine.events.subscribe(move |e| l.borrow_mut().push(e.clone()));
        log
    }

    #[derive(Default)]
    struct SurfaceLog {
        calls: Vec<String>,
    }

    struct RecordingSurface(Rc<RefCell<SurfaceLog>>);

    impl PresentationSurface for RecordingSurface {
        fn show(&mut self, title: &str, portrait: Option<&str>) {
            self.0.borrow_mut().calls.push(format!("show:{}:{:?}", title, portrait));
        }
        fn set_text(&mut self, line: &str) {
            self.0.borrow_mut().calls.push(format!("text:{}", line));
        }
        fn hide(&mut self) {
            self.0.borrow_mut().calls.push("hide".into());
        }
    }

    #[test]
    fn test_start_opens_session_and_pauses_gameplay() {
        let mut engine = DialogueEngine::new(true);
        let mut clock = GameTime::default();
        let log = record_events(&mut engine);

        engine.start_dialogue(&three_lines(), &NpcId::new("old_man"), &mut clock).unwrap();

        assert!(engine.is_active());
        assert!(clock.is_paused());
        let session = engine.session().unwrap();
        assert_eq!(session.line_index(), 0);
        assert_eq!(session.current_line(), Some("Evening."));
        assert!(matches!(log.borrow()[0], DialogueEvent::Started { .. }));
    }

    #[test]
    fn test_presentation_clock_runs_during_dialogue() {
        let mut engine = DialogueEngine::new(true);
        let mut clock = GameTime::default();
        engine.start_dialogue(&three_lines(), &NpcId::new("old_man"), &mut clock).unwrap();

        clock.update(0.1);
        assert_eq!(clock.gameplay_delta(), 0.0);
        assert!(clock.presentation_delta() > 0.0);

        engine.end_dialogue(&mut clock);
        clock.update(0.1);
        assert!(clock.gameplay_delta() > 0.0);
    }

    #[test]
    fn test_second_start_is_rejected() {
        let mut engine = DialogueEngine::new(true);
        let mut clock = GameTime::default();
        let first = NpcId::new("old_man");
        engine.start_dialogue(&three_lines(), &first, &mut clock).unwrap();
        engine.advance_line(&mut clock);

        let other = DialogueScript::new("Child", vec!["Hi!".into()]);
        let result = engine.start_dialogue(&other, &NpcId::new("child"), &mut clock);

        assert_eq!(result, Err(NarrativeError::DialogueAlreadyActive(first.clone())));
        let session = engine.session().unwrap();
        assert_eq!(session.requester(), &first);
        assert_eq!(session.line_index(), 1);
        assert_eq!(session.script().speaker, "Old Man");
    }

    #[test]
    fn test_invalid_scripts_are_rejected() {
        let mut engine = DialogueEngine::new(true);
        let mut clock = GameTime::default();
        let npc = NpcId::new("ghost");

        let empty = DialogueScript::new("Ghost", Vec::new());
        assert!(engine.start_dialogue(&empty, &npc, &mut clock).is_err());

        let nameless = DialogueScript::new("  ", vec!["...".into()]);
        assert!(engine.start_dialogue(&nameless, &npc, &mut clock).is_err());

        assert!(!engine.is_active());
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_advance_through_three_lines() {
        let mut engine = DialogueEngine::new(true);
        let mut clock = GameTime::default();
        let npc = NpcId::new("old_man");
        engine.start_dialogue(&three_lines(), &npc, &mut clock).unwrap();
        let log = record_events(&mut engine);

        assert_eq!(engine.advance_line(&mut clock), None);
        assert_eq!(engine.advance_line(&mut clock), None);
        assert_eq!(
            engine.advance_line(&mut clock),
            Some(DialogueCompleted { requester: npc.clone() })
        );

        let events = log.borrow();
        assert_eq!(
            *events,
            vec![
                DialogueEvent::LineChanged { line: "Cold night.".into(), index: 1, total: 3 },
                DialogueEvent::LineChanged { line: "Walk safe.".into(), index: 2, total: 3 },
                DialogueEvent::Ended { requester: npc },
            ]
        );
        assert!(!engine.is_active());
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_advance_and_end_without_session_are_noops() {
        let mut engine = DialogueEngine::new(true);
        let mut clock = GameTime::default();
        let log = record_events(&mut engine);

        assert_eq!(engine.advance_line(&mut clock), None);
        assert_eq!(engine.end_dialogue(&mut clock), None);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_confirm_consumed_once_per_tick() {
        let mut engine = DialogueEngine::new(true);
        let mut clock = GameTime::default();
        engine.start_dialogue(&three_lines(), &NpcId::new("old_man"), &mut clock).unwrap();

        let mut input = InputState::new();
        input.press(InputAction::Confirm);
        engine.handle_input(&mut input, &mut clock);
        engine.handle_input(&mut input, &mut clock);

        assert_eq!(engine.session().map(|s| s.line_index()), Some(1));
    }

    #[test]
    fn test_confirm_ignored_without_session() {
        let mut engine = DialogueEngine::new(true);
        let mut clock = GameTime::default();
        let mut input = InputState::new();
        input.press(InputAction::Confirm);

        assert_eq!(engine.handle_input(&mut input, &mut clock), None);
        // Not consumed, so other systems still see it
        assert!(input.is_just_pressed(InputAction::Confirm));
    }

    #[test]
    fn test_surface_calls() {
        let log = Rc::new(RefCell::new(SurfaceLog::default()));
        let mut engine = DialogueEngine::new(true).with_surface(Box::new(RecordingSurface(log.clone())));
        let mut clock = GameTime::default();
        let script = DialogueScript::new("Child", vec!["Hi!".into()]).with_portrait("child.png");

        engine.start_dialogue(&script, &NpcId::new("child"), &mut clock).unwrap();
        engine.advance_line(&mut clock);

        assert_eq!(
            log.borrow().calls,
            vec!["show:Child:Some(\"child.png\")", "text:Hi!", "hide"]
        );
    }

    #[test]
    fn test_no_pause_when_disabled() {
        let mut engine = DialogueEngine::new(false);
        let mut clock = GameTime::default();
        engine.start_dialogue(&three_lines(), &NpcId::new("old_man"), &mut clock).unwrap();
        assert!(!clock.is_paused());
    }

    #[test]
    fn test_mask_set_lookup() {
        let set = MaskDialogueSet {
            honesty: Some(DialogueScript::new("A", vec!["h".into()])),
            kindness: None,
            indifference: Some(DialogueScript::new("A", vec!["i".into()])),
        };
        assert!(!set.is_complete());
        assert_eq!(set.variant_count(), 2);
        assert_eq!(set.script_for(MaskType::Honesty).unwrap().lines[0], "h");
        assert_eq!(
            set.script_for(MaskType::Kindness),
            Err(NarrativeError::MissingVariant(MaskType::Kindness))
        );
        assert!(set.script_for(MaskType::None).is_err());
    }
}
