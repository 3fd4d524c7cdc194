//! Parameters structure for area evaluation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for area effect evaluation.
#[derive(Debug, Default, Deserialize)]
pub struct Params {

    /// Factor applied once to the commanded drive on the cycle the vehicle
    /// first enters an affecting area, the one-shot throttle pulse.
    ///
    /// Units: none (drive multiplier)
    pub entry_pulse_factor: f64,
}
