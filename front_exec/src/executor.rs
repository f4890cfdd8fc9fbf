//! # Demand executor
//!
//! Tracks the most recent demand line from the master and converts it into
//! motor settings for the four channels this node drives. If demand lines
//! stop arriving the executor engages its fail-safe: all channels are held
//! at zero until a fresh demand arrives.
//!
//! The fail-safe is the only protection this node has, it cannot see the
//! master's safety interlocks. Time is an explicit input so the timeout is
//! testable without waiting on a wall clock.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::{Duration, Instant};

use log::{info, warn};

use comms_if::drive::{MotorSetting, MAX_SPEED};
use comms_if::relay::RelayMsg;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Motor settings for the four channels driven by this node.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrontDems {
    pub left: MotorSetting,
    pub right: MotorSetting,
    pub center_left: MotorSetting,
    pub center_right: MotorSetting,
}

/// The demand executor.
pub struct Executor {
    targets: RelayMsg,
    last_msg_at: Option<Instant>,
    failsafe_engaged: bool,
    failsafe_timeout: Duration,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl FrontDems {
    /// All channels stopped.
    pub fn stopped() -> Self {
        FrontDems::default()
    }

    pub fn is_stopped(&self) -> bool {
        self.left.is_stopped()
            && self.right.is_stopped()
            && self.center_left.is_stopped()
            && self.center_right.is_stopped()
    }
}

impl Executor {
    pub fn new(failsafe_timeout: Duration) -> Self {
        Executor {
            targets: RelayMsg::default(),
            last_msg_at: None,
            failsafe_engaged: true,
            failsafe_timeout,
        }
    }

    /// Accept a demand line from the master.
    ///
    /// Out-of-range speeds are constrained rather than rejected, the master
    /// never legitimately sends them but a clamped demand is safer than a
    /// dropped one.
    pub fn on_msg(&mut self, msg: &RelayMsg, now: Instant) {
        self.targets = RelayMsg {
            left: constrain(msg.left),
            right: constrain(msg.right),
            center_left: constrain(msg.center_left),
            center_right: constrain(msg.center_right),
        };
        self.last_msg_at = Some(now);

        if self.failsafe_engaged {
            info!("Demand received, fail-safe disengaged");
            self.failsafe_engaged = false;
        }
    }

    /// Produce the motor settings for this cycle.
    pub fn step(&mut self, now: Instant) -> FrontDems {
        let timed_out = match self.last_msg_at {
            Some(t) => now.duration_since(t) > self.failsafe_timeout,
            None => true,
        };

        if timed_out && !self.failsafe_engaged {
            warn!("No demand within the timeout, fail-safe engaged");
            self.failsafe_engaged = true;
        }

        if self.failsafe_engaged {
            FrontDems::stopped()
        } else {
            FrontDems {
                left: MotorSetting::from_speed(self.targets.left),
                right: MotorSetting::from_speed(self.targets.right),
                center_left: MotorSetting::from_speed(self.targets.center_left),
                center_right: MotorSetting::from_speed(self.targets.center_right),
            }
        }
    }

    /// The speeds currently being applied, for the liveness line. Zero while
    /// the fail-safe is engaged.
    pub fn applied(&self) -> RelayMsg {
        if self.failsafe_engaged {
            RelayMsg::default()
        } else {
            self.targets
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn constrain(speed: i16) -> i16 {
    speed.max(-MAX_SPEED).min(MAX_SPEED)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use comms_if::drive::MotorDir;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn msg(left: i16, right: i16, center_left: i16, center_right: i16) -> RelayMsg {
        RelayMsg {
            left,
            right,
            center_left,
            center_right,
        }
    }

    #[test]
    fn stopped_until_first_demand() {
        let mut exec = Executor::new(ms(1000));
        assert!(exec.step(Instant::now()).is_stopped());
    }

    #[test]
    fn demand_line_maps_to_motor_settings() {
        let mut exec = Executor::new(ms(1000));
        let t0 = Instant::now();

        let line = RelayMsg::from_json("{\"L\":100,\"R\":-100,\"CL\":0,\"CR\":0}").unwrap();
        exec.on_msg(&line, t0);

        let dems = exec.step(t0);
        assert_eq!(dems.left.direction, MotorDir::Forward);
        assert_eq!(dems.left.magnitude, 100);
        assert_eq!(dems.right.direction, MotorDir::Reverse);
        assert_eq!(dems.right.magnitude, 100);
        assert!(dems.center_left.is_stopped());
        assert!(dems.center_right.is_stopped());
    }

    #[test]
    fn failsafe_engages_after_timeout() {
        let mut exec = Executor::new(ms(1000));
        let t0 = Instant::now();

        exec.on_msg(&msg(150, 150, 150, 150), t0);

        // Inside the window the demand holds
        assert!(!exec.step(t0 + ms(1000)).is_stopped());

        // Past it everything stops
        assert!(exec.step(t0 + ms(1001)).is_stopped());
        assert_eq!(exec.applied(), RelayMsg::default());
    }

    #[test]
    fn fresh_demand_disengages_failsafe() {
        let mut exec = Executor::new(ms(1000));
        let t0 = Instant::now();

        exec.on_msg(&msg(150, 150, 150, 150), t0);
        assert!(exec.step(t0 + ms(2000)).is_stopped());

        exec.on_msg(&msg(100, 100, 100, 100), t0 + ms(2500));
        let dems = exec.step(t0 + ms(2500));
        assert_eq!(dems.left.magnitude, 100);
    }

    #[test]
    fn steady_demand_stream_never_trips() {
        let mut exec = Executor::new(ms(1000));
        let t0 = Instant::now();

        // One demand per nominal relay period
        for i in 0..100u64 {
            let now = t0 + ms(i * 50);
            exec.on_msg(&msg(160, 160, 160, 160), now);
            assert!(!exec.step(now).is_stopped());
        }
    }

    #[test]
    fn out_of_range_demands_are_constrained() {
        let mut exec = Executor::new(ms(1000));
        let t0 = Instant::now();

        exec.on_msg(&msg(1000, -1000, 0, 0), t0);

        let dems = exec.step(t0);
        assert_eq!(dems.left.magnitude, 255);
        assert_eq!(dems.right.magnitude, 255);
        assert_eq!(dems.right.direction, MotorDir::Reverse);
        assert_eq!(exec.applied().left, 255);
    }
}
