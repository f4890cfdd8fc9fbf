//! # Operator command module
//!
//! Commands arrive on the wireless channel as small JSON packets of the form
//! `{"command": "<name>"}`. The set of names is closed; anything else is
//! dropped by the receiver without a response.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use serde_json::{self, Value};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An operator command.
///
/// Commands are transient - each one is consumed exactly once on arrival and
/// never persisted.
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Copy, Clone)]
pub enum Cmd {
    /// Drive all channels forward at the manual drive speed
    Forward,
    /// Drive all channels backward at the manual drive speed
    Backward,
    /// Tank turn to the left
    Left,
    /// Tank turn to the right
    Right,
    /// Zero all drive channels
    Stop,
    /// Toggle autonomous mode on or off
    AutoToggle,
    /// Toggle the emergency latch
    Emergency,
}

/// Possible command parsing errors.
#[derive(Debug, Error)]
pub enum CmdParseError {
    #[error("Command packet contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Command packet has no \"command\" string field")]
    MissingCommandField,

    #[error("\"{0}\" is not a recognised command")]
    UnknownCommand(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Cmd {
    /// Parse a command from a JSON packet.
    ///
    /// All three error variants are treated as a silent drop by the receiving
    /// end, but `UnknownCommand` is documented behaviour (forward
    /// compatibility with newer operator consoles) rather than a fault.
    pub fn from_json(json_str: &str) -> Result<Self, CmdParseError> {
        // Parse the JSON string into a value
        let val: Value = match serde_json::from_str(json_str) {
            Ok(v) => v,
            Err(e) => return Err(CmdParseError::InvalidJson(e)),
        };

        // Get the command name
        let name = match val["command"].as_str() {
            Some(s) => s,
            None => return Err(CmdParseError::MissingCommandField),
        };

        match Cmd::from_str(name) {
            Some(c) => Ok(c),
            None => Err(CmdParseError::UnknownCommand(String::from(name))),
        }
    }

    /// Serialise the command into the wire format, for use by test consoles.
    pub fn to_json(&self) -> String {
        format!("{{\"command\":\"{}\"}}", self.as_str())
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "forward" => Some(Cmd::Forward),
            "backward" => Some(Cmd::Backward),
            "left" => Some(Cmd::Left),
            "right" => Some(Cmd::Right),
            "stop" => Some(Cmd::Stop),
            "auto_toggle" => Some(Cmd::AutoToggle),
            "emergency" => Some(Cmd::Emergency),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Cmd::Forward => "forward",
            Cmd::Backward => "backward",
            Cmd::Left => "left",
            Cmd::Right => "right",
            Cmd::Stop => "stop",
            Cmd::AutoToggle => "auto_toggle",
            Cmd::Emergency => "emergency",
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_all_commands() {
        let cases = [
            ("forward", Cmd::Forward),
            ("backward", Cmd::Backward),
            ("left", Cmd::Left),
            ("right", Cmd::Right),
            ("stop", Cmd::Stop),
            ("auto_toggle", Cmd::AutoToggle),
            ("emergency", Cmd::Emergency),
        ];

        for (name, expected) in cases.iter() {
            let json = format!("{{\"command\": \"{}\"}}", name);
            assert_eq!(Cmd::from_json(&json).unwrap(), *expected);
        }
    }

    #[test]
    fn round_trip() {
        assert_eq!(
            Cmd::from_json(&Cmd::AutoToggle.to_json()).unwrap(),
            Cmd::AutoToggle
        );
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(
            Cmd::from_json("{not json"),
            Err(CmdParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn missing_field_is_an_error() {
        assert!(matches!(
            Cmd::from_json("{\"speed\": 100}"),
            Err(CmdParseError::MissingCommandField)
        ));
        // A non-string command field counts as missing too
        assert!(matches!(
            Cmd::from_json("{\"command\": 42}"),
            Err(CmdParseError::MissingCommandField)
        ));
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(matches!(
            Cmd::from_json("{\"command\": \"dance\"}"),
            Err(CmdParseError::UnknownCommand(_))
        ));
    }
}
