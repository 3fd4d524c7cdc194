//! Parameters structure for the gear shift module

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the gear shift module.
#[derive(Debug, Default, Deserialize)]
pub struct Params {

    /// Maximum pulse-width deflection of the drive actuator from its centre
    /// position. The effective drive multiplier is the current deflection
    /// over this value.
    ///
    /// Units: microseconds
    pub delta_max: f64,

    /// Pulse-width change applied by one gear step.
    ///
    /// Units: microseconds
    pub delta_step: f64,
}
