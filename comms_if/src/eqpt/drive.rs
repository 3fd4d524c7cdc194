//! # Drive Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands that are sent from the DriveClient to the drive actuator server.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct DriveDems {
    /// The demanded throttle, a normalised value in [-1, 1]. The server is
    /// responsible for converting this to its hardware signal.
    pub throttle_norm: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Response from the drive server based on the demands sent by the client.
#[derive(Serialize, Deserialize, Debug)]
pub enum DriveDemsResponse {
    /// Demands were valid and will be executed
    DemsOk,

    /// Demands were invalid and have been rejected
    DemsInvalid,

    /// Equipment is invalid so demands cannot be actuated
    EqptInvalid,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveDems {
    /// A demand bringing the vehicle to a full stop.
    pub const STOP: DriveDems = DriveDems { throttle_norm: 0.0 };

    /// Determine if the demand is valid.
    pub fn is_valid(&self) -> bool {
        self.throttle_norm.is_finite()
            && self.throttle_norm >= -1.0
            && self.throttle_norm <= 1.0
    }
}
