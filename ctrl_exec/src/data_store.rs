//! # Executable data store
//!
//! The data store holds all data which must persist between cycles of the
//! main loop. It is the single aggregate handed to the command processor and
//! the telemetry builder, so there is no shared mutable state outside it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Instant;

use log::{info, warn};

use comms_if::drive::TargetSpeeds;

use crate::params::CtrlExecParams;
use crate::relay_client::LinkHealth;
use crate::sensors::SensorReading;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// The emergency latch.
#[derive(Debug, Default, Clone, Copy)]
pub struct SafetyState {
    /// True while the emergency latch is set. Drive output is forced to zero
    /// for as long as this holds.
    pub latched: bool,

    /// When the latch was last set. Drives the buzzer silence window.
    pub latched_at: Option<Instant>,

    /// True while the buzzer pattern is running.
    pub buzzer_active: bool,
}

/// Ctrl exec data store
///
/// Data which is stored and valid over executions of the main loop.
pub struct DataStore {
    /// Number of cycles of the main loop so far.
    pub num_cycles: u128,

    /// Target speeds for all six drive channels.
    pub targets: TargetSpeeds,

    /// Most recent sensor snapshot.
    pub last_reading: SensorReading,

    /// The emergency latch state.
    pub safety: SafetyState,

    /// True while autonomous navigation owns the target speeds.
    pub auto_enabled: bool,

    /// Health of the serial link to the front node.
    pub link_health: LinkHealth,

    /// Signed speed applied on manual drive commands.
    pub manual_drive_speed: i16,

    /// Reported battery bus voltage.
    pub battery_voltage: f32,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    pub fn new(params: &CtrlExecParams) -> Self {
        DataStore {
            num_cycles: 0,
            targets: TargetSpeeds::default(),
            last_reading: SensorReading::default(),
            safety: SafetyState::default(),
            auto_enabled: false,
            link_health: LinkHealth::Unknown,
            manual_drive_speed: params.manual_drive_speed,
            battery_voltage: params.battery_voltage,
        }
    }

    /// Set the emergency latch.
    ///
    /// Zeroes all target speeds, disables autonomous mode and starts the
    /// buzzer pattern. Setting an already set latch has no effect.
    pub fn latch_emergency(&mut self, cause: &str, now: Instant) {
        if self.safety.latched {
            return;
        }

        warn!("EMERGENCY LATCH SET: {}", cause);

        self.safety.latched = true;
        self.safety.latched_at = Some(now);
        self.safety.buzzer_active = true;
        self.auto_enabled = false;
        self.targets.zero();
    }

    /// Clear the emergency latch.
    ///
    /// Only the latch and buzzer are cleared. Target speeds stay at zero
    /// until a new command arrives, there is no implicit resume of whatever
    /// motion was interrupted.
    pub fn clear_emergency(&mut self) {
        if !self.safety.latched {
            return;
        }

        info!("Emergency latch cleared by operator");

        self.safety.latched = false;
        self.safety.latched_at = None;
        self.safety.buzzer_active = false;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
