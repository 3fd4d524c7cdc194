//! GPS receiver module
//!
//! Converts raw receiver sentences into validated position fixes, tolerating
//! receiver noise and brief fix loss without destabilising the rest of the
//! loop.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod parser;
mod source;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use parser::*;
pub use source::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of consecutive parse failures tolerated before the fix is declared
/// lost.
pub const MAX_CONSEC_PARSE_ERRORS: u32 = 5;
