//! # Autonomous navigation module
//!
//! A small obstacle-avoidance state machine which owns the target speeds
//! while autonomous mode is enabled:
//!
//! - `Forward`: drive ahead until a valid range reading closes inside the
//!   avoid distance
//! - `Backing`: reverse for a fixed duration
//! - `Turning`: tank turn in place for a fixed duration, then resume
//!   `Forward`
//!
//! The module is purely reactive: it holds no map or pose estimate, only the
//! current state and when it was entered. Time is an explicit input so the
//! sequencing is testable without waiting on a wall clock.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;

use comms_if::drive::TargetSpeeds;
use util::{module::State, params, session::Session};

use crate::sensors::SensorReading;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Autonomous navigation module state.
#[derive(Default)]
pub struct AutoNav {
    params: AutoNavParams,
    nav_state: NavState,
    entered_at: Option<Instant>,
}

/// Autonomous navigation parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct AutoNavParams {
    /// Signed speed applied to all channels in `Forward`.
    pub forward_speed: i16,

    /// Signed speed applied to all channels in `Backing`.
    pub backing_speed: i16,

    /// Magnitude of the tank turn speeds in `Turning`. The left side runs
    /// reversed, the right side forward.
    pub turn_speed: i16,

    /// A valid range reading below this distance starts an avoidance
    /// manoeuvre, centimeters.
    pub avoid_distance_cm: f32,

    /// How long to reverse for.
    pub backing_duration_ms: u64,

    /// How long to turn for.
    pub turning_duration_ms: u64,
}

/// Input data for [`AutoNav::proc`].
pub struct AutoNavInput {
    /// Most recent sensor snapshot.
    pub reading: SensorReading,

    /// True while the executive has autonomous mode enabled. Stepping the
    /// module while disabled is a processing error.
    pub auto_enabled: bool,

    /// Cycle timestamp.
    pub now: Instant,
}

/// Status report from [`AutoNav::proc`].
pub struct StatusReport {
    /// The state after this cycle.
    pub nav_state: NavState,

    /// True if the state changed during this cycle.
    pub transitioned: bool,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Navigation state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Forward,
    Backing,
    Turning,
}

/// Errors which can occur during autonomous navigation processing.
#[derive(Debug, Error)]
pub enum AutoNavError {
    #[error("Module stepped while autonomous mode is disabled")]
    NotEnabled,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl Default for NavState {
    fn default() -> Self {
        NavState::Forward
    }
}

impl Default for AutoNavParams {
    fn default() -> Self {
        AutoNavParams {
            forward_speed: 160,
            backing_speed: -150,
            turn_speed: 160,
            avoid_distance_cm: 30.0,
            backing_duration_ms: 800,
            turning_duration_ms: 600,
        }
    }
}

impl AutoNav {
    /// Reset the state machine to `Forward`.
    ///
    /// Called by the executive whenever autonomous mode is toggled, so a
    /// fresh enable never resumes a half-finished manoeuvre.
    pub fn reset(&mut self, now: Instant) {
        self.nav_state = NavState::Forward;
        self.entered_at = Some(now);
    }

    /// Time spent in the current state.
    fn elapsed(&self, now: Instant) -> Duration {
        match self.entered_at {
            Some(t) => now.duration_since(t),
            None => Duration::from_secs(0),
        }
    }
}

impl State for AutoNav {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = AutoNavInput;
    type OutputData = TargetSpeeds;
    type StatusReport = StatusReport;
    type ProcError = AutoNavError;

    /// Initialise the autonomous navigation module.
    ///
    /// Expected init data: path to the module's parameter file.
    fn init(&mut self, init_data: Self::InitData, _session: &Session) -> Result<(), Self::InitError> {
        self.params = params::load(init_data)?;
        self.nav_state = NavState::Forward;
        self.entered_at = None;

        Ok(())
    }

    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        if !input_data.auto_enabled {
            return Err(AutoNavError::NotEnabled);
        }

        let now = input_data.now;
        let entry_state = self.nav_state;

        // First proc after an enable without an explicit reset
        if self.entered_at.is_none() {
            self.entered_at = Some(now);
        }

        // Expire the timed states before producing output, so the state they
        // hand over to acts on this very cycle.
        match self.nav_state {
            NavState::Backing
                if self.elapsed(now) >= Duration::from_millis(self.params.backing_duration_ms) =>
            {
                self.nav_state = NavState::Turning;
                self.entered_at = Some(now);
            }
            NavState::Turning
                if self.elapsed(now) >= Duration::from_millis(self.params.turning_duration_ms) =>
            {
                self.nav_state = NavState::Forward;
                self.entered_at = Some(now);
            }
            _ => (),
        }

        let mut output = TargetSpeeds::default();

        match self.nav_state {
            NavState::Forward => {
                let obstacle = input_data.reading.distance_valid
                    && input_data.reading.distance_cm < self.params.avoid_distance_cm;

                if obstacle {
                    // Hold zero for the transition cycle, reverse starts on
                    // the next one
                    self.nav_state = NavState::Backing;
                    self.entered_at = Some(now);
                } else {
                    output.set_all(self.params.forward_speed);
                }
            }
            NavState::Backing => output.set_all(self.params.backing_speed),
            NavState::Turning => {
                output.set_tank(-self.params.turn_speed, self.params.turn_speed)
            }
        }

        let report = StatusReport {
            nav_state: self.nav_state,
            transitioned: self.nav_state != entry_state,
        };

        Ok((output, report))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn input(distance_cm: f32, now: Instant) -> AutoNavInput {
        AutoNavInput {
            reading: SensorReading {
                distance_cm,
                distance_valid: true,
                gas_level: 120,
            },
            auto_enabled: true,
            now,
        }
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn clear_path_drives_forward() {
        let mut nav = AutoNav::default();
        let t0 = Instant::now();
        nav.reset(t0);

        let (out, report) = nav.proc(&input(120.0, t0)).unwrap();
        assert_eq!(report.nav_state, NavState::Forward);
        assert!(!report.transitioned);
        assert_eq!(out.front_left, 160);
        assert_eq!(out.rear_right, 160);
    }

    #[test]
    fn avoidance_sequence_runs_to_completion() {
        let mut nav = AutoNav::default();
        let t0 = Instant::now();
        nav.reset(t0);

        // Obstacle inside the avoid distance: transition cycle holds zero
        let (out, report) = nav.proc(&input(25.0, t0)).unwrap();
        assert_eq!(report.nav_state, NavState::Backing);
        assert!(report.transitioned);
        assert!(out.is_zero());

        // Reversing until the backing duration expires
        let (out, report) = nav.proc(&input(25.0, t0 + ms(50))).unwrap();
        assert_eq!(report.nav_state, NavState::Backing);
        assert_eq!(out.front_left, -150);
        assert_eq!(out.rear_right, -150);

        // Backing expires: turning output starts on the same cycle
        let (out, report) = nav.proc(&input(25.0, t0 + ms(800))).unwrap();
        assert_eq!(report.nav_state, NavState::Turning);
        assert!(report.transitioned);
        assert_eq!(out.front_left, -160);
        assert_eq!(out.front_right, 160);

        // Turning expires with a clear path: forward resumes immediately
        let (out, report) = nav.proc(&input(120.0, t0 + ms(1400))).unwrap();
        assert_eq!(report.nav_state, NavState::Forward);
        assert!(report.transitioned);
        assert_eq!(out.front_left, 160);
    }

    #[test]
    fn turning_into_another_obstacle_backs_again() {
        let mut nav = AutoNav::default();
        let t0 = Instant::now();
        nav.reset(t0);

        nav.proc(&input(25.0, t0)).unwrap();
        nav.proc(&input(25.0, t0 + ms(800))).unwrap();

        // Turn expires but the path ahead is still blocked
        let (out, report) = nav.proc(&input(25.0, t0 + ms(1400))).unwrap();
        assert_eq!(report.nav_state, NavState::Backing);
        assert!(out.is_zero());
    }

    #[test]
    fn invalid_reading_does_not_start_avoidance() {
        let mut nav = AutoNav::default();
        let t0 = Instant::now();
        nav.reset(t0);

        let mut inp = input(5.0, t0);
        inp.reading.distance_valid = false;

        let (out, report) = nav.proc(&inp).unwrap();
        assert_eq!(report.nav_state, NavState::Forward);
        assert_eq!(out.front_left, 160);
    }

    #[test]
    fn reset_abandons_a_manoeuvre() {
        let mut nav = AutoNav::default();
        let t0 = Instant::now();
        nav.reset(t0);

        nav.proc(&input(25.0, t0)).unwrap();

        nav.reset(t0 + ms(100));
        let (_, report) = nav.proc(&input(120.0, t0 + ms(150))).unwrap();
        assert_eq!(report.nav_state, NavState::Forward);
    }

    #[test]
    fn stepping_while_disabled_is_an_error() {
        let mut nav = AutoNav::default();
        let t0 = Instant::now();
        nav.reset(t0);

        let mut inp = input(120.0, t0);
        inp.auto_enabled = false;
        assert!(nav.proc(&inp).is_err());
    }
}
