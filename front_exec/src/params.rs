//! Parameters for the front node executable.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Front node executable parameters. Every field has a default so the
/// executable can run without a parameter file overriding anything.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FrontExecParams {
    /// Serial device of the link to the master node.
    pub serial_device: String,

    /// Baud rate of the serial link.
    pub serial_baud: u32,

    /// The fail-safe engages when no demand line has arrived within this
    /// window.
    pub failsafe_timeout_ms: u64,

    /// Period of the liveness line sent back to the master.
    pub liveness_interval_ms: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl Default for FrontExecParams {
    fn default() -> Self {
        FrontExecParams {
            serial_device: String::from("/dev/ttyS0"),
            serial_baud: 115200,
            failsafe_timeout_ms: 1000,
            liveness_interval_ms: 500,
        }
    }
}
