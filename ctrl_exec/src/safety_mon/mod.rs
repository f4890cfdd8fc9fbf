//! # Safety monitor module
//!
//! Evaluates each new sensor snapshot against the safety interlocks:
//!
//! - proximity: a valid range reading below the hard-stop distance
//! - gas: a raw gas level above the hazardous threshold
//!
//! The monitor only decides whether an interlock has tripped. Latching,
//! zeroing the drive and disabling autonomy are the executive's job, acting
//! through [`crate::data_store::DataStore::latch_emergency`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use util::{module::State, params, session::Session};

use crate::sensors::SensorReading;

// Internal
mod buzzer;

pub use buzzer::{Buzzer, BuzzerBackend, LogBuzzer};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Safety monitor module state.
#[derive(Default)]
pub struct SafetyMon {
    params: SafetyMonParams,
}

/// Safety monitor parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SafetyMonParams {
    /// A valid range reading below this distance trips the proximity
    /// interlock, centimeters.
    pub hard_stop_distance_cm: f32,

    /// A raw gas level above this trips the gas interlock, ADC counts.
    pub gas_threshold: i32,
}

/// Input data for [`SafetyMon::proc`].
pub struct SafetyMonInput {
    pub reading: SensorReading,
}

/// Output data from [`SafetyMon::proc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyMonOutput {
    pub proximity_trip: bool,
    pub gas_trip: bool,
}

/// Status report from [`SafetyMon::proc`]. Empty for now.
pub struct StatusReport;

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Errors which can occur during safety monitor processing.
#[derive(Debug, Error)]
pub enum SafetyMonError {
    #[error("Range reading is not a finite number: {0}")]
    NonFiniteRange(f32),
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl Default for SafetyMonParams {
    fn default() -> Self {
        SafetyMonParams {
            hard_stop_distance_cm: 10.0,
            gas_threshold: 2000,
        }
    }
}

impl State for SafetyMon {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = SafetyMonInput;
    type OutputData = SafetyMonOutput;
    type StatusReport = StatusReport;
    type ProcError = SafetyMonError;

    /// Initialise the safety monitor.
    ///
    /// Expected init data: path to the module's parameter file.
    fn init(&mut self, init_data: Self::InitData, _session: &Session) -> Result<(), Self::InitError> {
        self.params = params::load(init_data)?;

        Ok(())
    }

    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let reading = &input_data.reading;

        if !reading.distance_cm.is_finite() {
            return Err(SafetyMonError::NonFiniteRange(reading.distance_cm));
        }

        let output = SafetyMonOutput {
            proximity_trip: reading.distance_valid
                && reading.distance_cm < self.params.hard_stop_distance_cm,
            gas_trip: reading.gas_level > self.params.gas_threshold,
        };

        Ok((output, StatusReport))
    }
}

impl SafetyMonOutput {
    /// True if any interlock has tripped.
    pub fn is_trip(&self) -> bool {
        self.proximity_trip || self.gas_trip
    }
}

impl fmt::Display for SafetyMonOutput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.proximity_trip, self.gas_trip) {
            (true, true) => write!(f, "proximity and gas interlocks tripped"),
            (true, false) => write!(f, "proximity interlock tripped"),
            (false, true) => write!(f, "gas interlock tripped"),
            (false, false) => write!(f, "no interlock tripped"),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> SafetyMon {
        SafetyMon::default()
    }

    fn reading(distance_cm: f32, distance_valid: bool, gas_level: i32) -> SafetyMonInput {
        SafetyMonInput {
            reading: SensorReading {
                distance_cm,
                distance_valid,
                gas_level,
            },
        }
    }

    #[test]
    fn close_valid_obstacle_trips() {
        let (out, _) = monitor().proc(&reading(5.0, true, 120)).unwrap();
        assert!(out.proximity_trip);
        assert!(!out.gas_trip);
        assert!(out.is_trip());
    }

    #[test]
    fn invalid_reading_never_trips_proximity() {
        let (out, _) = monitor().proc(&reading(5.0, false, 120)).unwrap();
        assert!(!out.proximity_trip);
        assert!(!out.is_trip());
    }

    #[test]
    fn threshold_is_exclusive() {
        // Exactly at the limits must not trip
        let (out, _) = monitor().proc(&reading(10.0, true, 2000)).unwrap();
        assert!(!out.is_trip());

        let (out, _) = monitor().proc(&reading(9.9, true, 2001)).unwrap();
        assert!(out.proximity_trip);
        assert!(out.gas_trip);
    }

    #[test]
    fn gas_trips_independently_of_range() {
        let (out, _) = monitor().proc(&reading(400.0, false, 2500)).unwrap();
        assert!(out.gas_trip);
        assert!(!out.proximity_trip);
    }

    #[test]
    fn non_finite_range_is_an_error() {
        assert!(monitor().proc(&reading(f32::NAN, true, 120)).is_err());
    }
}
