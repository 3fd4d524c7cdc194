//! Gear shift module
//!
//! Converts the discrete slow/restore requests issued by area evaluation into
//! a bounded, gradually-changing drive multiplier, using the same
//! pulse-width-delta model as the wrapped actuator.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A request to move the gear state, issued by area evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum SpeedRequest {
    /// Throttle one step down (more negative gear)
    StepDown,

    /// Restore one step up towards full speed
    StepUp,

    /// No change
    Hold,
}

/// Possible errors that can occur during GearCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum GearCtrlError {
    #[error("Failed to load the parameter file: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}
