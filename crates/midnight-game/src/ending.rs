//! Single-fire ending trigger

use tracing::{error, info, warn};

use crate::error::NarrativeError;
use crate::ledger::{ChoiceLedger, EndingType};
use crate::player::PlayerState;
use crate::presentation::EndingPresenter;

/// Classifies and presents the ending at most once per level
pub struct EndingGate {
    triggered: Option<EndingType>,
    presenter: Option<Box<dyn EndingPresenter>>,
    disable_player: bool,
}

impl EndingGate {
    pub fn new(disable_player: bool) -> Self {
        Self {
            triggered: None,
            presenter: None,
            disable_player,
        }
    }

    pub fn with_presenter(mut self, presenter: Box<dyn EndingPresenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    pub fn set_presenter(&mut self, presenter: Box<dyn EndingPresenter>) {
        self.presenter = Some(presenter);
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.is_some()
    }

    /// The ending that was presented, if any
    pub fn ending(&self) -> Option<EndingType> {
        self.triggered
    }

    /// Classify the ledger and hand the result to the presenter.
    ///
    /// A missing presenter aborts without latching so the call can be retried.
    pub fn trigger_ending(
        &mut self,
        ledger: &ChoiceLedger,
        player: &mut dyn PlayerState,
    ) -> Result<EndingType, NarrativeError> {
        if let Some(ending) = self.triggered {
            warn!("Ending already triggered ({})", ending);
            return Err(NarrativeError::EndingAlreadyTriggered);
        }
        let Some(presenter) = self.presenter.as_mut() else {
            error!("Cannot trigger ending: no ending presenter");
            return Err(NarrativeError::MissingCollaborator("ending presenter"));
        };

        ledger.log_state();
        let ending = ledger.classify_ending();
        if self.disable_player {
            player.disable_controls();
        }
        presenter.present(ending);
        self.triggered = Some(ending);
        info!("Ending triggered: {}", ending);
        Ok(ending)
    }

    pub fn update(&mut self, presentation_dt: f32) {
        if let Some(presenter) = self.presenter.as_mut() {
            presenter.update(presentation_dt);
        }
    }

    /// Clear the latch for a level reload
    pub fn reset(&mut self) {
        self.triggered = None;
    }
}

impl Default for EndingGate {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::MaskType;
    use crate::npc::NpcId;
    use crate::player::Player;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<EndingType>>>);

    impl EndingPresenter for Recorder {
        fn present(&mut self, ending: EndingType) {
            self.0.borrow_mut().push(ending);
        }
    }

    fn kind_ledger() -> ChoiceLedger {
        let mut ledger = ChoiceLedger::new();
        ledger.record_choice(&NpcId::new("a"), MaskType::Kindness).unwrap();
        ledger.record_choice(&NpcId::new("b"), MaskType::Kindness).unwrap();
        ledger
    }

    #[test]
    fn test_presents_once() {
        let presented = Rc::new(RefCell::new(Vec::new()));
        let mut gate = EndingGate::new(true).with_presenter(Box::new(Recorder(presented.clone())));
        let mut player = Player::new();
        let ledger = kind_ledger();

        assert_eq!(gate.trigger_ending(&ledger, &mut player), Ok(EndingType::Good));
        assert_eq!(
            gate.trigger_ending(&ledger, &mut player),
            Err(NarrativeError::EndingAlreadyTriggered)
        );
        assert_eq!(*presented.borrow(), vec![EndingType::Good]);
        assert!(!player.controls_enabled());
    }

    #[test]
    fn test_missing_presenter_allows_retry() {
        let mut gate = EndingGate::new(true);
        let mut player = Player::new();
        let ledger = ChoiceLedger::new();

        assert!(matches!(
            gate.trigger_ending(&ledger, &mut player),
            Err(NarrativeError::MissingCollaborator(_))
        ));
        assert!(!gate.is_triggered());
        assert!(player.controls_enabled());

        let presented = Rc::new(RefCell::new(Vec::new()));
        gate.set_presenter(Box::new(Recorder(presented.clone())));
        assert_eq!(gate.trigger_ending(&ledger, &mut player), Ok(EndingType::Neutral));
        assert_eq!(presented.borrow().len(), 1);
    }

    #[test]
    fn test_player_left_enabled_when_configured() {
        let presented = Rc::new(RefCell::new(Vec::new()));
        let mut gate = EndingGate::new(false).with_presenter(Box::new(Recorder(presented)));
        let mut player = Player::new();
        gate.trigger_ending(&ChoiceLedger::new(), &mut player).unwrap();
        assert!(player.controls_enabled());
    }

    #[test]
    fn test_reset_allows_new_ending() {
        let presented = Rc::new(RefCell::new(Vec::new()));
        let mut gate = EndingGate::default().with_presenter(Box::new(Recorder(presented.clone())));
        let mut player = Player::new();
        gate.trigger_ending(&kind_ledger(), &mut player).unwrap();

        gate.reset();
        assert_eq!(gate.ending(), None);
        gate.trigger_ending(&ChoiceLedger::new(), &mut player).unwrap();
        assert_eq!(*presented.borrow(), vec![EndingType::Good, EndingType::Neutral]);
    }
}
