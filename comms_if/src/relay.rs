//! # Serial relay messages
//!
//! The master relays the front-node subset of the target speeds over the
//! point-to-point serial link as one newline-terminated JSON object per
//! control tick. The front node answers with a periodic liveness line.
//!
//! Both streams are one-way and fire-and-forget: there is no acknowledgement
//! or retry, message loss is tolerated by the front node's own command
//! timeout rather than remediated by the master.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::drive::TargetSpeeds;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Marker substring identifying a liveness line from the front node. The
/// master only checks for this substring, it does not parse the rest of the
/// payload.
pub const LIVENESS_MARKER: &str = "\"type\":\"heartbeat\"";

/// Bytes retained while waiting for a line terminator. A relay line is some
/// tens of bytes, so anything beyond a few frames without a `\n` means
/// framing has been lost and the oldest bytes are noise.
pub const MAX_PENDING_BYTES: usize = 256;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Speed demands relayed from the master to the front node, signed
/// magnitudes in `-255..=255`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayMsg {
    /// Front left channel
    #[serde(rename = "L")]
    pub left: i16,

    /// Front right channel
    #[serde(rename = "R")]
    pub right: i16,

    /// Center left channel
    #[serde(rename = "CL")]
    pub center_left: i16,

    /// Center right channel
    #[serde(rename = "CR")]
    pub center_right: i16,
}

/// Reassembles newline-delimited lines from raw serial chunks.
///
/// Bounded: if the stream stops carrying terminators only the newest
/// [`MAX_PENDING_BYTES`] are kept, so lost framing cannot grow the buffer
/// without limit. Framing recovers at the next terminator.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: Vec<u8>,
}

/// Liveness message emitted by the front node on a fixed period, carrying
/// the speeds it is currently applying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessMsg {
    /// Always `"heartbeat"`, the marker the master looks for.
    #[serde(rename = "type")]
    pub msg_type: String,

    #[serde(rename = "L")]
    pub left: i16,

    #[serde(rename = "R")]
    pub right: i16,

    #[serde(rename = "CL")]
    pub center_left: i16,

    #[serde(rename = "CR")]
    pub center_right: i16,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible relay message parsing errors.
#[derive(Debug, Error)]
pub enum RelayParseError {
    #[error("Relay message contains invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RelayMsg {
    /// Build the relay message from the front-node subset of the target
    /// speeds.
    pub fn from_targets(targets: &TargetSpeeds) -> Self {
        RelayMsg {
            left: targets.front_left,
            right: targets.front_right,
            center_left: targets.center_left,
            center_right: targets.center_right,
        }
    }

    /// Parse a relay message from a received line.
    pub fn from_json(json_str: &str) -> Result<Self, RelayParseError> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Serialise into the wire format (no trailing newline).
    pub fn to_json(&self) -> String {
        // Serialisation of a plain struct of integers cannot fail
        serde_json::to_string(self).expect("RelayMsg serialisation failed")
    }
}

impl LineBuffer {
    pub fn new() -> Self {
        LineBuffer::default()
    }

    /// Append a raw chunk from the port.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);

        // No terminator in sight: framing is lost, keep only the tail
        if self.buffer.len() > MAX_PENDING_BYTES && !self.buffer.contains(&b'\n') {
            let excess = self.buffer.len() - MAX_PENDING_BYTES;
            self.buffer.drain(..excess);
        }
    }

    /// Take the next complete non-empty line, without its terminator.
    pub fn next_line(&mut self) -> Option<String> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim();

            if !line.is_empty() {
                return Some(line.to_string());
            }
        }

        None
    }

    /// Number of bytes waiting for a terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

impl LivenessMsg {
    pub fn new(left: i16, right: i16, center_left: i16, center_right: i16) -> Self {
        LivenessMsg {
            msg_type: String::from("heartbeat"),
            left,
            right,
            center_left,
            center_right,
        }
    }

    /// Serialise into the wire format (no trailing newline).
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("LivenessMsg serialisation failed")
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_wire_format() {
        let msg = RelayMsg {
            left: 100,
            right: -100,
            center_left: 0,
            center_right: 0,
        };

        let json = msg.to_json();
        assert_eq!(json, "{\"L\":100,\"R\":-100,\"CL\":0,\"CR\":0}");
        assert_eq!(RelayMsg::from_json(&json).unwrap(), msg);
    }

    #[test]
    fn relay_from_targets_takes_front_subset() {
        let mut targets = TargetSpeeds::default();
        targets.set_tank(-160, 160);

        let msg = RelayMsg::from_targets(&targets);
        assert_eq!(msg.left, -160);
        assert_eq!(msg.right, 160);
        assert_eq!(msg.center_left, -160);
        assert_eq!(msg.center_right, 160);
    }

    #[test]
    fn malformed_relay_line_is_an_error() {
        assert!(RelayMsg::from_json("{\"L\": garbage").is_err());
    }

    #[test]
    fn liveness_line_contains_marker() {
        let line = LivenessMsg::new(150, 150, 150, 150).to_json();
        assert!(line.contains(LIVENESS_MARKER));
    }

    #[test]
    fn split_line_reassembles() {
        let mut buf = LineBuffer::new();

        buf.push_bytes(b"{\"L\":100,\"R\":-100,");
        assert!(buf.next_line().is_none());

        buf.push_bytes(b"\"CL\":0,\"CR\":0}\n");
        let line = buf.next_line().unwrap();
        assert_eq!(RelayMsg::from_json(&line).unwrap().left, 100);
        assert!(buf.next_line().is_none());
    }

    #[test]
    fn two_lines_in_one_chunk() {
        let mut buf = LineBuffer::new();

        buf.push_bytes(b"{\"L\":1,\"R\":1,\"CL\":1,\"CR\":1}\n{\"L\":2,\"R\":2,\"CL\":2,\"CR\":2}\n");
        assert_eq!(RelayMsg::from_json(&buf.next_line().unwrap()).unwrap().left, 1);
        assert_eq!(RelayMsg::from_json(&buf.next_line().unwrap()).unwrap().left, 2);
        assert!(buf.next_line().is_none());
    }

    #[test]
    fn unterminated_noise_is_bounded() {
        let mut buf = LineBuffer::new();

        // Framing lost: a long stream of bytes with no terminator
        for _ in 0..100 {
            buf.push_bytes(&[b'x'; 100]);
        }
        assert!(buf.next_line().is_none());
        assert!(buf.pending() <= MAX_PENDING_BYTES);

        // The next terminator flushes the residue as one (malformed) line
        buf.push_bytes(b"\n");
        assert!(buf.next_line().is_some());

        // And framing is recovered
        buf.push_bytes(b"{\"L\":1,\"R\":2,\"CL\":3,\"CR\":4}\n");
        assert_eq!(
            RelayMsg::from_json(&buf.next_line().unwrap()).unwrap().right,
            2
        );
        assert_eq!(buf.pending(), 0);
    }
}
