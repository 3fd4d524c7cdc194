//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Inbound area event definitions
pub mod area;

/// Operator command definitions
pub mod cmd;

/// Command and response definitions for equipment (like the drive actuators)
pub mod eqpt;

/// Network module
pub mod net;
