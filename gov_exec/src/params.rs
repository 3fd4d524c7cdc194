//! # Governor Executable Parameters
//!
//! This module provide parameters for the governor executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
pub struct GovExecParams {

    /// Identifier of this vehicle, included in outbound position reports
    pub robot_id: String,

    /// Network endpoint publishing raw receiver sentences
    pub gps_endpoint: String,

    /// Read timeout on the receiver socket in milliseconds. Reading the
    /// receiver is the control loop's only long-blocking step, so this bounds
    /// the cycle duration.
    pub gps_recv_timeout_ms: i32,

    /// Network endpoint for inbound area events
    pub area_events_endpoint: String,

    /// Network endpoint for the operator command socket
    pub op_cmd_endpoint: String,

    /// Network endpoint for the drive demands socket
    pub drive_dems_endpoint: String,

    /// Network endpoint for the input gate socket
    pub input_gate_endpoint: String,

    /// Network endpoint for outbound position reports
    pub pos_report_endpoint: String
}
