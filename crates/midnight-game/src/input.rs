//! Input system with action-based mapping
//!
//! Device mapping happens outside the core; the core only sees actions.
//! An action pressed this frame can be consumed once, so two state machines
//! never react to the same press in the same tick.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Game actions that can be triggered by input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    /// Walk left (A by default)
    MoveLeft,
    /// Walk right (D by default)
    MoveRight,
    /// Talk to a nearby NPC (F by default)
    Interact,
    /// Advance dialogue (Space by default)
    Confirm,
    /// Wear the Honesty mask (1)
    Mask1,
    /// Wear the Kindness mask (2)
    Mask2,
    /// Wear the Indifference mask (3)
    Mask3,
    /// Take the mask off (0)
    RemoveMask,
    /// Pick up or put down an item (G by default)
    Pickup,
}

impl InputAction {
    /// Mask slot selected by this action, if it is a mask key
    pub fn mask_slot(&self) -> Option<usize> {
        match self {
            InputAction::Mask1 => Some(0),
            InputAction::Mask2 => Some(1),
            InputAction::Mask3 => Some(2),
            _ => None,
        }
    }
}

/// Current state of all inputs for a frame
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Actions currently held down
    pub held: HashSet<InputAction>,
    /// Actions that were just pressed this frame
    pub just_pressed: HashSet<InputAction>,
    /// Actions that were just released this frame
    pub just_released: HashSet<InputAction>,
}

impl InputState {
    /// Create a new empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press
    pub fn press(&mut self, action: InputAction) {
        if !self.held.contains(&action) {
            self.just_pressed.insert(action);
        }
        self.held.insert(action);
    }

    /// Record a release
    pub fn release(&mut self, action: InputAction) {
        self.held.remove(&action);
        self.just_released.insert(action);
    }

    /// Press and release within the same frame
    pub fn tap(&mut self, action: InputAction) {
        self.press(action);
        self.release(action);
    }

    /// Check if an action is currently held
    pub fn is_held(&self, action: InputAction) -> bool {
        self.held.contains(&action)
    }

    /// Check if an action was just pressed this frame
    pub fn is_just_pressed(&self, action: InputAction) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Check if an action was just released this frame
    pub fn is_just_released(&self, action: InputAction) -> bool {
        self.just_released.contains(&action)
    }

    /// Take a just-pressed action. Returns true only for the first caller this frame.
    pub fn consume(&mut self, action: InputAction) -> bool {
        self.just_pressed.remove(&action)
    }

    /// Clear frame-specific data (call at end of frame)
    pub fn clear_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }

    /// Clear all input state
    pub fn clear_all(&mut self) {
        self.held.clear();
        self.just_pressed.clear();
        self.just_released.clear();
    }
}
