//! Emergency buzzer pattern.
//!
//! While the latch buzzer is active the output toggles on a fixed half
//! period, and falls silent a fixed time after the latch was set even if the
//! latch itself is still held.
//!
//! The output pin sits behind [`BuzzerBackend`], driven once per level
//! change. The default backend logs the edges, which is all an off-target
//! run can do.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::{Duration, Instant};

use log::trace;

use crate::data_store::SafetyState;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Half period of the buzzer square wave.
const TOGGLE_PERIOD: Duration = Duration::from_millis(200);

/// The buzzer falls silent this long after the latch was set.
const SILENCE_AFTER: Duration = Duration::from_millis(5000);

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Access to the buzzer output pin.
pub trait BuzzerBackend {
    fn set(&mut self, on: bool);
}

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Buzzer pattern generator. Each level change is pushed to the backend.
pub struct Buzzer<B: BuzzerBackend> {
    backend: B,
    output: bool,
    last_toggle: Option<Instant>,
}

/// A backend which logs the output edges instead of driving a pin.
pub struct LogBuzzer;

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl<B: BuzzerBackend> Buzzer<B> {
    pub fn new(backend: B) -> Self {
        Buzzer {
            backend,
            output: false,
            last_toggle: None,
        }
    }

    /// Advance the pattern and return the current output level.
    ///
    /// Clears `safety.buzzer_active` itself once the silence window expires.
    pub fn update(&mut self, safety: &mut SafetyState, now: Instant) -> bool {
        if !safety.buzzer_active {
            self.set_level(false);
            self.last_toggle = None;
            return false;
        }

        if let Some(latched_at) = safety.latched_at {
            if now.duration_since(latched_at) >= SILENCE_AFTER {
                safety.buzzer_active = false;
                self.set_level(false);
                self.last_toggle = None;
                return false;
            }
        }

        match self.last_toggle {
            None => {
                self.set_level(true);
                self.last_toggle = Some(now);
            }
            Some(t) if now.duration_since(t) >= TOGGLE_PERIOD => {
                let next = !self.output;
                self.set_level(next);
                self.last_toggle = Some(now);
            }
            Some(_) => (),
        }

        self.output
    }

    /// Push a level to the backend, but only on change.
    fn set_level(&mut self, level: bool) {
        if level != self.output {
            self.backend.set(level);
            self.output = level;
        }
    }
}

impl BuzzerBackend for LogBuzzer {
    fn set(&mut self, on: bool) {
        trace!("Buzzer {}", if on { "on" } else { "off" });
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        edges: Vec<bool>,
    }

    impl BuzzerBackend for Recorder {
        fn set(&mut self, on: bool) {
            self.edges.push(on);
        }
    }

    fn latched_state(at: Instant) -> SafetyState {
        SafetyState {
            latched: true,
            latched_at: Some(at),
            buzzer_active: true,
        }
    }

    #[test]
    fn inactive_buzzer_stays_low() {
        let mut buzzer = Buzzer::new(Recorder::default());
        let mut safety = SafetyState::default();

        assert!(!buzzer.update(&mut safety, Instant::now()));
        assert!(buzzer.backend.edges.is_empty());
    }

    #[test]
    fn pattern_toggles_on_half_period() {
        let mut buzzer = Buzzer::new(LogBuzzer);
        let t0 = Instant::now();
        let mut safety = latched_state(t0);

        assert!(buzzer.update(&mut safety, t0));
        // Within the half period the level holds
        assert!(buzzer.update(&mut safety, t0 + Duration::from_millis(100)));
        // After it the level flips
        assert!(!buzzer.update(&mut safety, t0 + Duration::from_millis(200)));
        assert!(buzzer.update(&mut safety, t0 + Duration::from_millis(400)));
    }

    #[test]
    fn falls_silent_after_window() {
        let mut buzzer = Buzzer::new(LogBuzzer);
        let t0 = Instant::now();
        let mut safety = latched_state(t0);

        assert!(buzzer.update(&mut safety, t0));
        assert!(!buzzer.update(&mut safety, t0 + Duration::from_millis(5000)));
        assert!(!safety.buzzer_active);
        // The latch itself is untouched
        assert!(safety.latched);
    }

    #[test]
    fn clearing_the_latch_silences_immediately() {
        let mut buzzer = Buzzer::new(LogBuzzer);
        let t0 = Instant::now();
        let mut safety = latched_state(t0);

        assert!(buzzer.update(&mut safety, t0));

        safety.buzzer_active = false;
        assert!(!buzzer.update(&mut safety, t0 + Duration::from_millis(300)));
    }

    #[test]
    fn backend_sees_each_edge_once() {
        let mut buzzer = Buzzer::new(Recorder::default());
        let t0 = Instant::now();
        let mut safety = latched_state(t0);

        buzzer.update(&mut safety, t0);
        // Held level produces no new edge
        buzzer.update(&mut safety, t0 + Duration::from_millis(100));
        buzzer.update(&mut safety, t0 + Duration::from_millis(200));
        buzzer.update(&mut safety, t0 + Duration::from_millis(400));
        // Silence window drives the final falling edge
        buzzer.update(&mut safety, t0 + Duration::from_millis(5000));

        assert_eq!(buzzer.backend.edges, vec![true, false, true, false]);
    }
}
