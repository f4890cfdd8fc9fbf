//! # Drive channel and actuation types
//!
//! The robot has six drive channels. The rear pair is actuated directly by
//! the master node, the front and center pairs are relayed to the front node
//! over the serial link.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Maximum magnitude of a signed drive speed.
pub const MAX_SPEED: i16 = 255;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Signed target speeds for all six drive channels, in the range
/// `-MAX_SPEED..=MAX_SPEED`.
///
/// Owned exclusively by the master node. The front/center fields are relayed
/// to, and exclusively consumed by, the front node's actuation layer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpeeds {
    pub front_left: i16,
    pub front_right: i16,
    pub center_left: i16,
    pub center_right: i16,
    pub rear_left: i16,
    pub rear_right: i16,
}

/// A single motor actuation: a direction pair plus an unsigned magnitude.
///
/// Zero speed is expressed as magnitude zero, in which case the direction
/// setting is irrelevant to the driver hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorSetting {
    pub direction: MotorDir,
    pub magnitude: u8,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The direction pin pair setting of a motor driver channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotorDir {
    Forward,
    Reverse,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TargetSpeeds {
    /// Set every channel to the same signed speed.
    pub fn set_all(&mut self, speed: i16) {
        self.front_left = speed;
        self.front_right = speed;
        self.center_left = speed;
        self.center_right = speed;
        self.rear_left = speed;
        self.rear_right = speed;
    }

    /// Set a tank turn: one signed speed on the left side channels, another
    /// on the right side channels.
    pub fn set_tank(&mut self, left: i16, right: i16) {
        self.front_left = left;
        self.center_left = left;
        self.rear_left = left;
        self.front_right = right;
        self.center_right = right;
        self.rear_right = right;
    }

    /// Zero every channel.
    pub fn zero(&mut self) {
        self.set_all(0);
    }

    /// True if every channel is zero.
    pub fn is_zero(&self) -> bool {
        *self == TargetSpeeds::default()
    }
}

impl MotorSetting {
    /// Convert a signed speed into a direction plus magnitude, clamping to
    /// the actuator's valid range.
    pub fn from_speed(speed: i16) -> Self {
        let clamped = speed.max(-MAX_SPEED).min(MAX_SPEED);

        if clamped >= 0 {
            MotorSetting {
                direction: MotorDir::Forward,
                magnitude: clamped as u8,
            }
        } else {
            MotorSetting {
                direction: MotorDir::Reverse,
                magnitude: (-clamped) as u8,
            }
        }
    }

    /// A stopped motor.
    pub fn stop() -> Self {
        MotorSetting {
            direction: MotorDir::Forward,
            magnitude: 0,
        }
    }

    /// True if the motor is stopped, regardless of the direction setting.
    pub fn is_stopped(&self) -> bool {
        self.magnitude == 0
    }
}

impl Default for MotorSetting {
    fn default() -> Self {
        MotorSetting::stop()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_from_signed_speed() {
        let fwd = MotorSetting::from_speed(100);
        assert_eq!(fwd.direction, MotorDir::Forward);
        assert_eq!(fwd.magnitude, 100);

        let rev = MotorSetting::from_speed(-100);
        assert_eq!(rev.direction, MotorDir::Reverse);
        assert_eq!(rev.magnitude, 100);

        assert!(MotorSetting::from_speed(0).is_stopped());
    }

    #[test]
    fn setting_clamps_to_actuator_range() {
        assert_eq!(MotorSetting::from_speed(1000).magnitude, 255);
        assert_eq!(MotorSetting::from_speed(-1000).magnitude, 255);
        assert_eq!(MotorSetting::from_speed(-1000).direction, MotorDir::Reverse);
    }

    #[test]
    fn tank_turn_splits_sides() {
        let mut t = TargetSpeeds::default();
        t.set_tank(-160, 160);

        assert_eq!(t.front_left, -160);
        assert_eq!(t.center_left, -160);
        assert_eq!(t.rear_left, -160);
        assert_eq!(t.front_right, 160);
        assert_eq!(t.center_right, 160);
        assert_eq!(t.rear_right, 160);
    }

    #[test]
    fn zeroed_speeds_are_zero() {
        let mut t = TargetSpeeds::default();
        t.set_all(180);
        assert!(!t.is_zero());
        t.zero();
        assert!(t.is_zero());
    }
}
