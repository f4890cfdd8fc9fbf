//! Simulation backends for off-target runs.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Duration;

use super::{GasBackend, RangeBackend};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// A simulated ranger presenting a fixed obstacle.
pub struct SimRange {
    distance_cm: f32,
    max_range_cm: f32,
}

/// A simulated gas sensor presenting a fixed level.
pub struct SimGas {
    level: i32,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl SimRange {
    pub fn new(distance_cm: f32, max_range_cm: f32) -> Self {
        SimRange {
            distance_cm,
            max_range_cm,
        }
    }
}

impl RangeBackend for SimRange {
    fn measure_echo(&mut self, _timeout: Duration) -> Option<Duration> {
        // An obstacle at or beyond max range produces no echo at all
        if self.distance_cm >= self.max_range_cm {
            return None;
        }

        let echo_us = (self.distance_cm * 2.0 / super::CM_PER_US) as f64;
        Some(Duration::from_secs_f64(echo_us * 1.0e-6))
    }
}

impl SimGas {
    pub fn new(level: i32) -> Self {
        SimGas { level }
    }
}

impl GasBackend for SimGas {
    fn read_raw(&mut self) -> i32 {
        self.level
    }
}
