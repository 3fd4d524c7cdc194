//! Area effect evaluation module
//!
//! Classifies the vehicle against every area in the registry snapshot each
//! cycle, aggregates their slowing and input-disabling effects, and tracks
//! per-area entry edges.

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

/// Possible errors that can occur during area evaluation.
#[derive(Debug, thiserror::Error)]
pub enum AreaEvalError {
    #[error("Evaluation requested while the fix is lost")]
    FixLost,
}
