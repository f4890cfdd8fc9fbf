//! # Sensor acquisition
//!
//! Reads the forward-facing ultrasonic ranger and the raw gas sensor channel
//! once per sensor tick and produces a single [`SensorReading`] snapshot.
//!
//! The hardware access sits behind the [`RangeBackend`] and [`GasBackend`]
//! traits so that the processing path (echo conversion, validity, clamping)
//! is testable off-target. The default backends are simulations configured
//! from the parameter file.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Duration;

use serde::Deserialize;

// Internal
mod sim;

pub use sim::{SimGas, SimRange};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Centimeters of one-way travel per microsecond of echo time. The echo
/// covers the out-and-back path so the conversion halves it.
const CM_PER_US: f32 = 0.0343;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// A snapshot of the environment sensors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Range to the nearest forward obstacle, centimeters. Holds the
    /// max-range sentinel when `distance_valid` is false.
    pub distance_cm: f32,

    /// False when the ranger timed out or returned a value outside the
    /// usable band. An invalid reading never trips the proximity interlock.
    pub distance_valid: bool,

    /// Raw gas sensor level, ADC counts.
    pub gas_level: i32,
}

/// Sensor acquisition parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SensorParams {
    /// How long to wait for an echo before declaring the reading invalid,
    /// milliseconds. The default corresponds to the max range round trip.
    pub pulse_timeout_ms: f64,

    /// Upper end of the usable range band, centimeters. Also the sentinel
    /// reported for invalid readings.
    pub max_range_cm: f32,

    /// Lower end of the usable range band, centimeters. Echoes below this
    /// are ringing artefacts, not obstacles.
    pub min_range_cm: f32,

    /// Obstacle distance presented by the simulation backend.
    pub sim_distance_cm: f32,

    /// Gas level presented by the simulation backend.
    pub sim_gas_level: i32,
}

/// The sensor acquisition module.
pub struct Sensors {
    params: SensorParams,
    range: Box<dyn RangeBackend>,
    gas: Box<dyn GasBackend>,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Access to the ultrasonic ranger.
pub trait RangeBackend {
    /// Trigger a pulse and wait for the echo, up to `timeout`. `None` means
    /// no echo arrived in time.
    fn measure_echo(&mut self, timeout: Duration) -> Option<Duration>;
}

/// Access to the raw gas sensor channel.
pub trait GasBackend {
    fn read_raw(&mut self) -> i32;
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl Default for SensorReading {
    fn default() -> Self {
        SensorReading {
            distance_cm: 400.0,
            distance_valid: false,
            gas_level: 0,
        }
    }
}

impl Default for SensorParams {
    fn default() -> Self {
        SensorParams {
            pulse_timeout_ms: 23.5,
            max_range_cm: 400.0,
            min_range_cm: 2.0,
            sim_distance_cm: 400.0,
            sim_gas_level: 120,
        }
    }
}

impl Sensors {
    /// Create the module with the default simulation backends.
    pub fn new(params: SensorParams) -> Self {
        let range = Box::new(SimRange::new(params.sim_distance_cm, params.max_range_cm));
        let gas = Box::new(SimGas::new(params.sim_gas_level));

        Self::with_backends(params, range, gas)
    }

    /// Create the module with explicit backends.
    pub fn with_backends(
        params: SensorParams,
        range: Box<dyn RangeBackend>,
        gas: Box<dyn GasBackend>,
    ) -> Self {
        Sensors { params, range, gas }
    }

    /// Acquire one snapshot of all sensors.
    pub fn read(&mut self) -> SensorReading {
        let timeout = Duration::from_micros((self.params.pulse_timeout_ms * 1000.0) as u64);

        let (distance_cm, distance_valid) = match self.range.measure_echo(timeout) {
            Some(echo) => self.convert_echo(echo),
            None => (self.params.max_range_cm, false),
        };

        SensorReading {
            distance_cm,
            distance_valid,
            gas_level: self.gas.read_raw(),
        }
    }

    /// Convert an echo round-trip time into a validated range.
    fn convert_echo(&self, echo: Duration) -> (f32, bool) {
        let distance_cm = echo.as_secs_f32() * 1.0e6 * CM_PER_US / 2.0;

        if distance_cm < self.params.min_range_cm {
            // Transducer ringing, not a real obstacle
            (self.params.max_range_cm, false)
        } else if distance_cm > self.params.max_range_cm {
            (self.params.max_range_cm, true)
        } else {
            (distance_cm, true)
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Echo time in microseconds corresponding to a given range.
    fn echo_for_cm(cm: f32) -> Duration {
        Duration::from_secs_f64((cm * 2.0 / CM_PER_US) as f64 * 1.0e-6)
    }

    struct FixedEcho(Option<Duration>);

    impl RangeBackend for FixedEcho {
        fn measure_echo(&mut self, _timeout: Duration) -> Option<Duration> {
            self.0
        }
    }

    struct FixedGas(i32);

    impl GasBackend for FixedGas {
        fn read_raw(&mut self) -> i32 {
            self.0
        }
    }

    fn sensors_with_echo(echo: Option<Duration>, gas: i32) -> Sensors {
        Sensors::with_backends(
            SensorParams::default(),
            Box::new(FixedEcho(echo)),
            Box::new(FixedGas(gas)),
        )
    }

    #[test]
    fn echo_converts_to_range() {
        let mut sensors = sensors_with_echo(Some(echo_for_cm(100.0)), 120);

        let reading = sensors.read();
        assert!(reading.distance_valid);
        assert!((reading.distance_cm - 100.0).abs() < 0.5);
        assert_eq!(reading.gas_level, 120);
    }

    #[test]
    fn timeout_yields_invalid_sentinel() {
        let mut sensors = sensors_with_echo(None, 120);

        let reading = sensors.read();
        assert!(!reading.distance_valid);
        assert_eq!(reading.distance_cm, 400.0);
    }

    #[test]
    fn overlong_echo_clamps_to_max_range() {
        let mut sensors = sensors_with_echo(Some(echo_for_cm(550.0)), 120);

        let reading = sensors.read();
        assert!(reading.distance_valid);
        assert_eq!(reading.distance_cm, 400.0);
    }

    #[test]
    fn ringing_echo_is_invalid() {
        let mut sensors = sensors_with_echo(Some(echo_for_cm(1.0)), 120);

        let reading = sensors.read();
        assert!(!reading.distance_valid);
        assert_eq!(reading.distance_cm, 400.0);
    }

    #[test]
    fn sim_backends_report_configured_values() {
        let params = SensorParams {
            sim_distance_cm: 25.0,
            sim_gas_level: 2500,
            ..Default::default()
        };
        let mut sensors = Sensors::new(params);

        let reading = sensors.read();
        assert!(reading.distance_valid);
        assert!((reading.distance_cm - 25.0).abs() < 0.5);
        assert_eq!(reading.gas_level, 2500);
    }
}
