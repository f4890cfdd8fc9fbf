//! # Periodic tick bodies
//!
//! The bodies of the main loop's drive and sensor ticks live here rather
//! than inline in `main`, so the arbitration between the emergency latch,
//! autonomous navigation and held manual targets can be driven through
//! multi-tick sequences in tests.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Instant;

use log::{info, warn};

use util::module::State;

use crate::auto_nav::{AutoNav, AutoNavInput};
use crate::data_store::DataStore;
use crate::safety_mon::{SafetyMon, SafetyMonInput};
use crate::sensors::Sensors;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Drive tick body: decide who owns the target speeds this tick.
///
/// The latch always wins and forces zero. Otherwise autonomous navigation
/// owns the targets while enabled, and the last manual targets stand while
/// it is not.
pub fn drive_tick(ds: &mut DataStore, auto_nav: &mut AutoNav, now: Instant) {
    if ds.safety.latched {
        ds.targets.zero();
        return;
    }

    if ds.auto_enabled {
        let input = AutoNavInput {
            reading: ds.last_reading,
            auto_enabled: true,
            now,
        };

        match auto_nav.proc(&input) {
            Ok((targets, report)) => {
                ds.targets = targets;
                if report.transitioned {
                    info!("AutoNav state is now {:?}", report.nav_state);
                }
            }
            Err(e) => warn!("AutoNav processing error: {}", e),
        }
    }
}

/// Sensor tick body: acquire a snapshot and run the safety interlocks on it.
pub fn sensor_tick(
    ds: &mut DataStore,
    safety_mon: &mut SafetyMon,
    sensors: &mut Sensors,
    now: Instant,
) {
    ds.last_reading = sensors.read();

    let input = SafetyMonInput {
        reading: ds.last_reading,
    };

    match safety_mon.proc(&input) {
        Ok((output, _)) => {
            if output.is_trip() && !ds.safety.latched {
                let cause = format!(
                    "{} (distance {:.1} cm, gas {})",
                    output, ds.last_reading.distance_cm, ds.last_reading.gas_level
                );
                ds.latch_emergency(&cause, now);
            }
        }
        Err(e) => warn!("SafetyMon processing error: {}", e),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
