//! # Rear motor drive
//!
//! Applies the rear pair of target speeds to the motor driver attached to
//! this node. The front and center pairs never pass through here, they go
//! over the serial relay instead.
//!
//! The driver hardware sits behind [`MotorBackend`]. The default backend
//! only logs the demands, which is all an off-target run can do.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;

use comms_if::drive::{MotorSetting, TargetSpeeds};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Access to the rear motor driver channels.
pub trait MotorBackend {
    fn apply(&mut self, rear_left: MotorSetting, rear_right: MotorSetting);
}

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// The rear motor drive module.
pub struct MotorDrive<B: MotorBackend> {
    backend: B,
    last_applied: (MotorSetting, MotorSetting),
}

/// A backend which logs the demands instead of actuating hardware.
pub struct LogBackend;

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl<B: MotorBackend> MotorDrive<B> {
    pub fn new(backend: B) -> Self {
        MotorDrive {
            backend,
            last_applied: (MotorSetting::stop(), MotorSetting::stop()),
        }
    }

    /// Convert the rear pair of target speeds into motor settings and apply
    /// them.
    pub fn step(&mut self, targets: &TargetSpeeds) {
        let rear_left = MotorSetting::from_speed(targets.rear_left);
        let rear_right = MotorSetting::from_speed(targets.rear_right);

        self.backend.apply(rear_left, rear_right);
        self.last_applied = (rear_left, rear_right);
    }

    /// The settings applied on the last step.
    pub fn last_applied(&self) -> (MotorSetting, MotorSetting) {
        self.last_applied
    }
}

impl MotorBackend for LogBackend {
    fn apply(&mut self, rear_left: MotorSetting, rear_right: MotorSetting) {
        trace!(
            "Actuating rear motors: left {:?} {}, right {:?} {}",
            rear_left.direction,
            rear_left.magnitude,
            rear_right.direction,
            rear_right.magnitude
        );
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use comms_if::drive::MotorDir;

    #[derive(Default)]
    struct Recorder {
        applied: Vec<(MotorSetting, MotorSetting)>,
    }

    impl MotorBackend for Recorder {
        fn apply(&mut self, rear_left: MotorSetting, rear_right: MotorSetting) {
            self.applied.push((rear_left, rear_right));
        }
    }

    #[test]
    fn rear_pair_reaches_the_backend() {
        let mut drive = MotorDrive::new(Recorder::default());

        let mut targets = TargetSpeeds::default();
        targets.set_tank(-180, 180);
        drive.step(&targets);

        let (left, right) = drive.last_applied();
        assert_eq!(left.direction, MotorDir::Reverse);
        assert_eq!(left.magnitude, 180);
        assert_eq!(right.direction, MotorDir::Forward);
        assert_eq!(right.magnitude, 180);

        assert_eq!(drive.backend.applied.len(), 1);
    }

    #[test]
    fn zero_targets_stop_both_channels() {
        let mut drive = MotorDrive::new(Recorder::default());

        drive.step(&TargetSpeeds::default());

        let (left, right) = drive.last_applied();
        assert!(left.is_stopped());
        assert!(right.is_stopped());
    }
}
