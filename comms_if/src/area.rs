//! # Area event module
//!
//! This module defines the wire format for the polygonal areas pushed to the
//! vehicle by the remote controller, and the events which mutate the area set.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Serialize, Deserialize, Deserializer};
use serde_json::{self, Value};
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An area definition as recieved from the controller.
///
/// The boundary is an ordered ring of `[lon, lat]` pairs in decimal degrees,
/// implicitly closed (the last point connects back to the first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaData {
    /// Unique identifier of the area
    pub id: String,

    /// Display label
    pub label: String,

    /// Display-only kind tag, e.g. "StopArea"
    #[serde(rename = "type", default)]
    pub kind: String,

    /// The boundary ring
    pub boundary: Vec<[f64; 2]>,

    /// Behavioural effect properties
    #[serde(default)]
    pub props: AreaProps,
}

/// Behavioural effect properties attached to an area.
///
/// Controllers are loose with the value types here, booleans and integers may
/// arrive as strings, so each field tolerates both forms. Missing fields take
/// their inert defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AreaProps {
    /// Flips the inside/outside sense of the area's effect
    #[serde(default, deserialize_with = "de_flag")]
    pub reversed: bool,

    /// Bound on how far the gear may be throttled while affected. Zero means
    /// no slowing effect.
    #[serde(default, deserialize_with = "de_count")]
    pub slowing_factor: u32,

    /// If set the operator's inputs are disabled while affected
    #[serde(default, deserialize_with = "de_flag")]
    pub disables_inputs: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An inbound area event, i.e. an instruction from the controller to mutate
/// the vehicle's area set.
#[derive(Debug, Clone)]
pub enum AreaEvent {
    /// Add a single area, fully replacing any existing area with the same id
    Boundary(AreaData),

    /// Add a batch of areas, each replacing as for `Boundary`
    BoundaryAll(Vec<AreaData>),

    /// Remove the area with the given id
    BoundaryRemove(String),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum AreaEventParseError {
    #[error("Event contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Event has an invalid type ({0})")]
    InvalidType(String),

    #[error("Event payload could not be read: {0}")]
    InvalidPayload(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AreaEvent {

    /// Parse a new area event from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, AreaEventParseError> {
        // Parse the JSON string into a value
        let val: Value = match serde_json::from_str(json_str) {
            Ok(v) => v,
            Err(e) => return Err(AreaEventParseError::InvalidJson(e))
        };

        // Get the type of the event
        let event_type = match val["event"].as_str() {
            Some(s) => s,
            None => return Err(AreaEventParseError::InvalidType(String::from(
                "Expected \"event\" to be a string"
            )))
        };

        // Deserialise the payload based on the event type
        match event_type {
            "BOUNDARY" => {
                let data: AreaData = serde_json::from_value(val["payload"].clone())
                    .map_err(AreaEventParseError::InvalidPayload)?;
                Ok(AreaEvent::Boundary(data))
            },
            "BOUNDARY_ALL" => {
                let data: Vec<AreaData> = serde_json::from_value(val["payload"].clone())
                    .map_err(AreaEventParseError::InvalidPayload)?;
                Ok(AreaEvent::BoundaryAll(data))
            },
            "BOUNDARY_REMOVE" => {
                let id: String = serde_json::from_value(val["payload"].clone())
                    .map_err(AreaEventParseError::InvalidPayload)?;
                Ok(AreaEvent::BoundaryRemove(id))
            },
            t => Err(AreaEventParseError::InvalidType(
                format!("{} is not a recognised area event", t)
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Deserialise a boolean which may arrive as a bool or as a string such as
/// `"true"` or `"True"`.
fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String)
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => Ok(matches!(
            s.to_ascii_lowercase().as_str(),
            "true" | "1"
        ))
    }
}

/// Deserialise a non-negative count which may arrive as an integer or as a
/// string such as `"3"`.
fn de_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Num(u32),
        Text(String)
    }

    match Count::deserialize(deserializer)? {
        Count::Num(n) => Ok(n),
        Count::Text(s) => s.trim().parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_boundary_event() {
        let json = r#"{
            "event": "BOUNDARY",
            "payload": {
                "id": "1",
                "label": "test_area",
                "type": "StopArea",
                "boundary": [[0, 0], [0, 10], [10, 10], [10, 0]],
                "props": {"prop1": "empty", "reversed": "True"}
            }
        }"#;

        match AreaEvent::from_json(json).unwrap() {
            AreaEvent::Boundary(data) => {
                assert_eq!(data.id, "1");
                assert_eq!(data.label, "test_area");
                assert_eq!(data.kind, "StopArea");
                assert_eq!(data.boundary.len(), 4);
                assert!(data.props.reversed);
                assert_eq!(data.props.slowing_factor, 0);
                assert!(!data.props.disables_inputs);
            },
            e => panic!("Unexpected event: {:?}", e)
        }
    }

    #[test]
    fn test_parse_boundary_all_event() {
        let json = r#"{
            "event": "BOUNDARY_ALL",
            "payload": [
                {
                    "id": "1",
                    "label": "a",
                    "boundary": [[0, 0], [0, 5], [5, 5], [5, 0]],
                    "props": {"slowing_factor": "3"}
                },
                {
                    "id": "2",
                    "label": "b",
                    "boundary": [[-10, -10], [-10, 10], [10, 10], [10, -10]],
                    "props": {"slowing_factor": 2, "reversed": true}
                }
            ]
        }"#;

        match AreaEvent::from_json(json).unwrap() {
            AreaEvent::BoundaryAll(data) => {
                assert_eq!(data.len(), 2);
                assert_eq!(data[0].props.slowing_factor, 3);
                assert_eq!(data[1].props.slowing_factor, 2);
                assert!(data[1].props.reversed);
            },
            e => panic!("Unexpected event: {:?}", e)
        }
    }

    #[test]
    fn test_parse_remove_event() {
        let json = r#"{"event": "BOUNDARY_REMOVE", "payload": "42"}"#;

        match AreaEvent::from_json(json).unwrap() {
            AreaEvent::BoundaryRemove(id) => assert_eq!(id, "42"),
            e => panic!("Unexpected event: {:?}", e)
        }
    }

    #[test]
    fn test_missing_props_default() {
        let json = r#"{
            "event": "BOUNDARY",
            "payload": {
                "id": "3",
                "label": "bare",
                "boundary": [[0, 0], [1, 0], [1, 1]]
            }
        }"#;

        match AreaEvent::from_json(json).unwrap() {
            AreaEvent::Boundary(data) => {
                assert!(!data.props.reversed);
                assert_eq!(data.props.slowing_factor, 0);
                assert!(!data.props.disables_inputs);
            },
            e => panic!("Unexpected event: {:?}", e)
        }
    }

    #[test]
    fn test_unknown_event_is_error() {
        let json = r#"{"event": "NOT_AN_EVENT", "payload": null}"#;
        assert!(matches!(
            AreaEvent::from_json(json),
            Err(AreaEventParseError::InvalidType(_))
        ));
    }
}
