//! Walking configuration

use serde::{Deserialize, Serialize};

/// Side-scrolling walk settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Walking speed in meters per second
    pub walk_speed: f32,
    /// How fast the walk reaches full speed
    pub acceleration: f32,
    /// How fast the walk stops once input is released
    pub deceleration: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 2.5,
            acceleration: 20.0,
            deceleration: 30.0,
        }
    }
}

impl MovementConfig {
    /// Move `current` towards `target` velocity for one step
    pub fn approach(&self, current: f32, target: f32, dt: f32) -> f32 {
        let rate = if target.abs() > current.abs() || target.signum() != current.signum() {
            self.acceleration
        } else {
            self.deceleration
        };
        let max_step = rate * dt;
        let diff = target - current;
        if diff.abs() <= max_step {
            target
        } else {
            current + diff.signum() * max_step
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approach_clamps_to_target() {
        let config = MovementConfig::default();
        assert_eq!(config.approach(0.0, 2.5, 1.0), 2.5);
        assert_eq!(config.approach(0.0, 2.5, 0.05), 1.0);
        assert_eq!(config.approach(2.5, 0.0, 0.05), 1.0);
    }
}
