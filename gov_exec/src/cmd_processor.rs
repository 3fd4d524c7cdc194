//! # Operator command processor module
//!
//! The command processor handles operator commands coming from the command
//! client.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
use comms_if::cmd::OpCmd;
use gov_lib::data_store::DataStore;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute an operator command.
///
/// Mutates the datastore to pass the command's effect on to the modules.
pub(crate) fn exec(ds: &mut DataStore, cmd: &OpCmd) {

    // Handle different commands
    match cmd {
        OpCmd::Drive { throttle_norm } => {
            debug!("Recieved drive command: {}", throttle_norm);
            ds.op_throttle_norm = *throttle_norm;
        },
        OpCmd::Stop => {
            debug!("Recieved stop command");
            ds.request_stop("operator stop command");
        }
    }

}
