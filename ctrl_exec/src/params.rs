//! Executable-level parameters for `ctrl_exec`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Parameters governing the executable itself: endpoints, the serial link to
/// the front node, and the manual drive behaviour.
///
/// Every field has a default so the executable (and the test suite) can run
/// without a parameter file overriding anything.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CtrlExecParams {
    /// Endpoint the operator command intake binds to (SUB).
    pub cmd_endpoint: String,

    /// Endpoint the telemetry publisher binds to (PUB).
    pub tm_endpoint: String,

    /// Endpoint the status responder binds to (REP).
    pub status_endpoint: String,

    /// Serial device of the link to the front node.
    pub serial_device: String,

    /// Baud rate of the serial link.
    pub serial_baud: u32,

    /// Signed speed applied on manual drive commands.
    pub manual_drive_speed: i16,

    /// Link is declared stale when no liveness line has arrived within this
    /// window.
    pub link_stale_timeout_ms: u64,

    /// Reported battery bus voltage. There is no battery monitor fitted, the
    /// value is a static figure for the operator console.
    pub battery_voltage: f32,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl Default for CtrlExecParams {
    fn default() -> Self {
        CtrlExecParams {
            cmd_endpoint: String::from("tcp://*:5030"),
            tm_endpoint: String::from("tcp://*:5031"),
            status_endpoint: String::from("tcp://*:5032"),
            serial_device: String::from("/dev/ttyAMA0"),
            serial_baud: 115200,
            manual_drive_speed: 180,
            link_stale_timeout_ms: 3000,
            battery_voltage: 14.8,
        }
    }
}
