//! Level progress: completed interactions against a target

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::events::EventBus;
use crate::npc::NpcId;

/// Which dialogue completions count towards the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingPolicy {
    /// Every completed dialogue counts, including repeats with the same NPC
    EveryCompletion,
    /// Only the first completed dialogue per NPC counts
    #[default]
    FirstCompletionPerNpc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    Interaction { count: u32, required: u32 },
    Completed,
}

/// Counts completions and latches once the target is reached
#[derive(Debug)]
pub struct LevelProgress {
    required: u32,
    count: u32,
    complete: bool,
    policy: CountingPolicy,
    counted: HashSet<NpcId>,
    pub events: EventBus<ProgressEvent>,
}

impl LevelProgress {
    pub fn new(required: u32, policy: CountingPolicy) -> Self {
        Self {
            required: required.max(1),
            count: 0,
            complete: false,
            policy,
            counted: HashSet::new(),
            events: EventBus::new(),
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn required(&self) -> u32 {
        self.required
    }

    pub fn policy(&self) -> CountingPolicy {
        self.policy
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Progress in 0..=1
    pub fn fraction(&self) -> f32 {
        (self.count as f32 / self.required as f32).min(1.0)
    }

    /// Count a completed dialogue. Returns true exactly once, on the call
    /// that reaches the target.
    pub fn register_completion(&mut self, npc: &NpcId) -> bool {
        if self.complete {
            debug!("Level already complete, ignoring completion from {}", npc);
            return false;
        }

        if self.policy == CountingPolicy::FirstCompletionPerNpc && !self.counted.insert(npc.clone()) {
            debug!("{} already counted towards level progress", npc);
            return false;
        }

        self.count += 1;
        info!("Interactions: {}/{}", self.count, self.required);
        self.events.publish(&ProgressEvent::Interaction {
            count: self.count,
            required: self.required,
        });

        if self.count >= self.required {
            self.complete = true;
            info!("Level complete");
            self.events.publish(&ProgressEvent::Completed);
            return true;
        }
        false
    }

    /// Back to zero for a level reload
    pub fn reset(&mut self) {
        self.count = 0;
        self.complete = false;
        self.counted.clear();
    }
}

impl Default for LevelProgress {
    fn default() -> Self {
        Self::new(3, CountingPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_completion_fires_once() {
        let completed = Rc::new(RefCell::new(0));
        let mut progress = LevelProgress::new(2, CountingPolicy::EveryCompletion);
        let c = completed.clone();
        progress.events.subscribe(move |e| {
            if *e == ProgressEvent::Completed {
                *c.borrow_mut() += 1;
            }
        });

        let npc = NpcId::new("a");
        assert!(!progress.register_completion(&npc));
        assert!(progress.register_completion(&npc));
        assert!(!progress.register_completion(&npc));
        assert!(!progress.register_completion(&NpcId::new("b")));

        assert_eq!(*completed.borrow(), 1);
        assert_eq!(progress.count(), 2);
        assert!(progress.is_complete());
    }

    #[test]
    fn test_first_completion_per_npc() {
        let mut progress = LevelProgress::new(2, CountingPolicy::FirstCompletionPerNpc);
        let a = NpcId::new("a");
        progress.register_completion(&a);
        progress.register_completion(&a);
        assert_eq!(progress.count(), 1);
        assert!(!progress.is_complete());

        assert!(progress.register_completion(&NpcId::new("b")));
    }

    #[test]
    fn test_fraction_and_reset() {
        let mut progress = LevelProgress::new(4, CountingPolicy::EveryCompletion);
        progress.register_completion(&NpcId::new("a"));
        assert_eq!(progress.fraction(), 0.25);

        progress.reset();
        assert_eq!(progress.count(), 0);
        assert_eq!(progress.fraction(), 0.0);
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_interaction_events() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut progress = LevelProgress::new(1, CountingPolicy::default());
        let s = seen.clone();
        progress.events.subscribe(move |e| s.borrow_mut().push(*e));

        progress.register_completion(&NpcId::new("a"));
        assert_eq!(
            *seen.borrow(),
            vec![
                ProgressEvent::Interaction { count: 1, required: 1 },
                ProgressEvent::Completed,
            ]
        );
    }
}
