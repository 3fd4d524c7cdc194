//! # Input gate module
//!
//! Latch controlling whether operator inputs reach the vehicle. The gate is
//! closed while any inhibit cause is raised and reopens only once every
//! cause has cleared.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{info, warn};

// Internal
use comms_if::eqpt::input::InputGateCmd;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Independent causes for the gate being closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateInhibit {
    /// An affecting area disables inputs
    AreaEffect,

    /// No valid GPS fix is available
    FixLost,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Binary input-enable latch.
///
/// Transitions are emitted as commands from [`InputGate::update`], repeating
/// the current state produces no command, keeping the outward protocol
/// idempotent.
#[derive(Debug)]
pub struct InputGate {
    enabled: bool,
    area_inhibit: bool,
    fix_inhibit: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for InputGate {
    fn default() -> Self {
        // The latch starts enabled, matching the input dispatch's startup
        // state, with the fix inhibit raised. The first update therefore
        // commands a disable until a valid fix arrives.
        Self {
            enabled: true,
            area_inhibit: false,
            fix_inhibit: true,
        }
    }
}

impl InputGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise or clear an inhibit cause.
    pub fn set_inhibit(&mut self, cause: GateInhibit, raised: bool) {
        match cause {
            GateInhibit::AreaEffect => self.area_inhibit = raised,
            GateInhibit::FixLost => self.fix_inhibit = raised,
        }
    }

    /// True if operator inputs are currently allowed through.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Recompute the latch, returning the command to send to the input
    /// dispatch if the state changed.
    pub fn update(&mut self) -> Option<InputGateCmd> {
        let desired = !self.area_inhibit && !self.fix_inhibit;

        if desired == self.enabled {
            return None;
        }

        self.enabled = desired;

        if desired {
            info!("Input gate opened");
            Some(InputGateCmd::Enable)
        }
        else {
            warn!(
                "Input gate closed (area inhibit: {}, fix inhibit: {})",
                self.area_inhibit, self.fix_inhibit
            );
            Some(InputGateCmd::Disable)
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// A gate as it looks once the first good fix has arrived.
    fn open_gate() -> InputGate {
        let mut gate = InputGate::new();
        assert_eq!(gate.update(), Some(InputGateCmd::Disable));
        gate.set_inhibit(GateInhibit::FixLost, false);
        assert_eq!(gate.update(), Some(InputGateCmd::Enable));
        gate
    }

    #[test]
    fn test_disables_until_first_fix() {
        let mut gate = InputGate::new();

        // No fix yet, the first update closes the gate
        assert_eq!(gate.update(), Some(InputGateCmd::Disable));
        assert!(!gate.enabled());
        assert_eq!(gate.update(), None);

        gate.set_inhibit(GateInhibit::FixLost, false);
        assert_eq!(gate.update(), Some(InputGateCmd::Enable));
        assert!(gate.enabled());
    }

    #[test]
    fn test_transitions_are_idempotent() {
        let mut gate = open_gate();

        gate.set_inhibit(GateInhibit::AreaEffect, true);
        assert_eq!(gate.update(), Some(InputGateCmd::Disable));

        // Raising the same cause again produces no new command
        gate.set_inhibit(GateInhibit::AreaEffect, true);
        assert_eq!(gate.update(), None);

        gate.set_inhibit(GateInhibit::AreaEffect, false);
        assert_eq!(gate.update(), Some(InputGateCmd::Enable));
        assert_eq!(gate.update(), None);
    }

    #[test]
    fn test_reopens_only_when_every_cause_clears() {
        let mut gate = open_gate();

        gate.set_inhibit(GateInhibit::AreaEffect, true);
        gate.set_inhibit(GateInhibit::FixLost, true);
        assert_eq!(gate.update(), Some(InputGateCmd::Disable));

        // One cause clearing is not enough
        gate.set_inhibit(GateInhibit::AreaEffect, false);
        assert_eq!(gate.update(), None);
        assert!(!gate.enabled());

        gate.set_inhibit(GateInhibit::FixLost, false);
        assert_eq!(gate.update(), Some(InputGateCmd::Enable));
    }
}
