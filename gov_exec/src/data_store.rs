//! # Data Store

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::info;

use crate::{area_eval, gear_ctrl, input_gate::InputGate};
use comms_if::eqpt::gps::GpsFix;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Global data store for the executable.
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    // Operator command state
    /// Latest commanded throttle from the operator, normalised in [-1, 1]
    pub op_throttle_norm: f64,

    /// Set once a stop has been requested, by the operator or by the host
    pub stop_requested: bool,

    // GPS state
    /// Latest fix, which may be the fix-lost sentinel
    pub latest_fix: GpsFix,

    /// True while the fix is lost
    pub fix_lost: bool,

    // Area evaluation
    pub area_eval: area_eval::AreaEval,
    pub area_eval_output: area_eval::OutputData,
    pub area_eval_status_rpt: area_eval::StatusReport,

    // Gear shifting
    pub gear_ctrl: gear_ctrl::GearCtrl,
    pub gear_ctrl_output: gear_ctrl::OutputData,
    pub gear_ctrl_status_rpt: gear_ctrl::StatusReport,

    // Input gating
    pub input_gate: InputGate,

    // Monitoring counters
    /// True while the drive server link is believed healthy, used to log the
    /// loss only once
    pub drive_connected: bool,

    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Number of consecutive drive client recieve errors
    pub num_consec_drive_recv_errors: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for DataStore {
    fn default() -> Self {
        Self {
            num_cycles: 0,
            op_throttle_norm: 0.0,
            stop_requested: false,
            // No fix is valid until the receiver produces one
            latest_fix: GpsFix::FIX_LOST,
            fix_lost: true,
            area_eval: Default::default(),
            area_eval_output: Default::default(),
            area_eval_status_rpt: Default::default(),
            gear_ctrl: Default::default(),
            gear_ctrl_output: Default::default(),
            gear_ctrl_status_rpt: Default::default(),
            input_gate: Default::default(),
            drive_connected: true,
            num_consec_cycle_overruns: 0,
            num_consec_drive_recv_errors: 0,
        }
    }
}

impl DataStore {
    /// Request a cooperative stop of the control loop, giving the reason.
    ///
    /// The loop finishes the current cycle, issues a stop drive command and
    /// disables inputs before terminating.
    pub fn request_stop(&mut self, reason: &str) {
        if !self.stop_requested {
            info!("Stop requested: {}", reason);
            self.stop_requested = true;
        }
    }
}
