//! # Telemetry packet
//!
//! One packet is published on the wireless channel every telemetry tick,
//! unconditionally, so an operator console always has a recent snapshot even
//! when nothing has changed.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telemetry packet sent from the master to the operator channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TmPacket {
    /// Last range reading, centimeters
    #[serde(rename = "d")]
    pub distance_cm: f32,

    /// Last raw gas level, ADC counts
    #[serde(rename = "g")]
    pub gas_level: i32,

    /// Battery voltage, volts
    #[serde(rename = "v")]
    pub battery_voltage: f32,

    /// Emergency latch state
    #[serde(rename = "e")]
    pub emergency: bool,

    /// True only when the front node link health is OK
    #[serde(rename = "fo")]
    pub front_link_ok: bool,

    /// Autonomous mode enabled
    #[serde(rename = "auto")]
    pub auto_enabled: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TmPacket {
    /// Serialise into the wire format.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("TmPacket serialisation failed")
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_field_names() {
        let packet = TmPacket {
            distance_cm: 42.5,
            gas_level: 120,
            battery_voltage: 14.8,
            emergency: false,
            front_link_ok: true,
            auto_enabled: false,
        };

        let val: serde_json::Value = serde_json::from_str(&packet.to_json()).unwrap();

        assert_eq!(val["d"].as_f64().unwrap(), 42.5);
        assert_eq!(val["g"].as_i64().unwrap(), 120);
        assert_eq!(val["v"].as_f64().unwrap() as f32, 14.8);
        assert_eq!(val["e"].as_bool().unwrap(), false);
        assert_eq!(val["fo"].as_bool().unwrap(), true);
        assert_eq!(val["auto"].as_bool().unwrap(), false);
    }
}
