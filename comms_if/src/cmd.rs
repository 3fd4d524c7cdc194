//! # Operator command module
//!
//! This module defines the commands sent to the vehicle by the operator, and
//! the responses returned for them.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Serialize, Deserialize};
use serde_json::{self, Value};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An operator command, i.e. an instruction sent to the vehicle by the person
/// driving it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpCmd {
    /// Set the commanded throttle, a normalised value in [-1, 1].
    Drive {
        throttle_norm: f64
    },

    /// Bring the vehicle to a stop and end the session.
    Stop,
}

/// Response to an operator command.
#[derive(Debug, Serialize, Deserialize)]
pub enum OpCmdResponse {
    /// Command was accepted
    Ok,

    /// Command was valid but cannot be executed right now
    CannotExecute,

    /// Command was invalid
    Invalid,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum OpCmdParseError {
    #[error("Command contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Command has an invalid type ({0})")]
    InvalidType(String),

    #[error("Command of type {0} is expected to have a payload but it doesn't")]
    MissingPayload(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl OpCmd {

    /// Parse a new command from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, OpCmdParseError> {
        // Parse the JSON string into a value
        let val: Value = match serde_json::from_str(json_str) {
            Ok(v) => v,
            Err(e) => return Err(OpCmdParseError::InvalidJson(e))
        };

        // Get the type of the command
        let cmd_type = match val["type"].as_str() {
            Some(s) => s,
            None => return Err(OpCmdParseError::InvalidType(String::from(
                "Expected \"type\" to be a string"
            )))
        };

        match cmd_type {
            "DRIVE" => {
                let throttle_norm = match val["payload"]["throttle_norm"].as_f64() {
                    Some(t) => t,
                    None => return Err(OpCmdParseError::MissingPayload(
                        String::from("DRIVE")
                    ))
                };

                Ok(OpCmd::Drive { throttle_norm })
            },
            "STOP" => Ok(OpCmd::Stop),
            t => Err(OpCmdParseError::InvalidType(
                format!("{} is not a recognised command type", t)
            ))
        }
    }

    /// Determine if the command is valid (i.e. contains data in range).
    pub fn is_valid(&self) -> bool {
        match self {
            OpCmd::Drive { throttle_norm } =>
                throttle_norm.is_finite()
                && *throttle_norm >= -1.0
                && *throttle_norm <= 1.0,
            OpCmd::Stop => true,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_drive() {
        let cmd = OpCmd::from_json(
            r#"{"type": "DRIVE", "payload": {"throttle_norm": 0.5}}"#
        ).unwrap();

        assert_eq!(cmd, OpCmd::Drive { throttle_norm: 0.5 });
        assert!(cmd.is_valid());
    }

    #[test]
    fn test_parse_stop() {
        let cmd = OpCmd::from_json(r#"{"type": "STOP"}"#).unwrap();
        assert_eq!(cmd, OpCmd::Stop);
    }

    #[test]
    fn test_drive_out_of_range_is_invalid() {
        let cmd = OpCmd::from_json(
            r#"{"type": "DRIVE", "payload": {"throttle_norm": 1.5}}"#
        ).unwrap();

        assert!(!cmd.is_valid());
    }

    #[test]
    fn test_drive_without_payload_is_error() {
        assert!(matches!(
            OpCmd::from_json(r#"{"type": "DRIVE"}"#),
            Err(OpCmdParseError::MissingPayload(_))
        ));
    }
}
