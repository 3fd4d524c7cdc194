//! # Input Dispatch Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Command sent to the input dispatch collaborator to gate operator inputs.
///
/// The protocol is idempotent, commanding the state the gate is already in is
/// accepted and has no effect.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputGateCmd {
    /// Allow operator inputs through to the vehicle
    Enable,

    /// Block operator inputs
    Disable,
}

/// Response from the input dispatch collaborator.
#[derive(Serialize, Deserialize, Debug)]
pub enum InputGateResponse {
    /// Command was applied (or was already in effect)
    GateOk,

    /// Command could not be understood
    GateInvalid,
}
