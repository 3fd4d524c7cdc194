//! Implementations for the GearCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use serde::Serialize;

// Internal
use super::{GearCtrlError, Params, SpeedRequest};
use util::{
    archive::{Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gear shift module state
#[derive(Default)]
pub struct GearCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    /// Gear counter, 0 is full speed, negative is throttled. Never positive.
    gear: i64,

    /// Current pulse-width deflection driving the actuator.
    ///
    /// Units: microseconds
    current_delta: f64,

    pub(crate) output: Option<OutputData>,
    arch_output: Archiver,
}

/// Input data to the gear shift module.
#[derive(Clone, Copy)]
pub struct InputData {
    /// The request to execute this cycle
    pub request: SpeedRequest,

    /// Largest slowing factor over currently-affecting areas, which bounds
    /// how far down the gear may step
    pub max_active_slowing: u32,
}

/// Output from the gear shift module.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct OutputData {
    /// Gear counter after this cycle
    pub gear: i64,

    /// Drive multiplier in (0, 1], the current deflection over the maximum
    /// deflection
    pub ratio: f64,
}

/// Status report for gear shift processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if a step request was clamped at the deflection limit
    pub delta_limited: bool,

    /// True if a step down was refused at the slowing-factor bound
    pub gear_limited: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for OutputData {
    fn default() -> Self {
        OutputData {
            gear: 0,
            ratio: 0.5,
        }
    }
}

impl State for GearCtrl {
    type InitData = &'static str;
    type InitError = GearCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = std::convert::Infallible;

    /// Initialise the GearCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters
        self.params = match params::load(init_data) {
            Ok(p) => p,
            Err(e) => return Err(GearCtrlError::ParamLoadError(e))
        };

        if self.params.delta_max <= 0.0 {
            return Err(GearCtrlError::InvalidParams(format!(
                "delta_max must be positive, got {}", self.params.delta_max
            )));
        }
        if self.params.delta_step <= 0.0 {
            return Err(GearCtrlError::InvalidParams(format!(
                "delta_step must be positive, got {}", self.params.delta_step
            )));
        }

        // Start at the centred deflection, gear zero
        self.current_delta = self.params.delta_max / 2.0;
        self.gear = 0;

        // Create the arch folder for gear_ctrl
        let mut arch_path = session.arch_root.clone();
        arch_path.push("gear_ctrl");
        std::fs::create_dir_all(arch_path).unwrap();

        // Initialise the archivers
        self.arch_report = Archiver::from_path(
            session, "gear_ctrl/status_report.csv"
        ).unwrap();
        self.arch_output = Archiver::from_path(
            session, "gear_ctrl/output.csv"
        ).unwrap();

        Ok(())
    }

    /// Perform cyclic processing of the gear shift module.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        match input_data.request {
            SpeedRequest::StepDown => {
                // The gear is bounded below by the largest active slowing
                // factor, further step downs are refused, not errors
                if self.gear > -(input_data.max_active_slowing as i64) {
                    self.gear -= 1;
                    self.reduce_delta();
                }
                else {
                    self.report.gear_limited = true;
                }
            },
            SpeedRequest::StepUp => {
                if self.gear < 0 {
                    self.gear += 1;
                    self.increase_delta();
                }
            },
            SpeedRequest::Hold => ()
        }

        let output = OutputData {
            gear: self.gear,
            ratio: self.current_delta / self.params.delta_max,
        };

        trace!(
            "GearCtrl output:\n    gear: {}\n    ratio: {:.3}",
            output.gear,
            output.ratio
        );

        // Update the output in self
        self.output = Some(output);

        Ok((output, self.report))
    }
}

impl Archived for GearCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Write each one individually
        self.arch_report.serialise(self.report)?;
        self.arch_output.serialise(self.output.unwrap_or_default())?;

        Ok(())
    }
}

impl GearCtrl {
    /// Current gear counter.
    pub fn gear(&self) -> i64 {
        self.gear
    }

    /// Reduce the deflection by one step.
    ///
    /// Stepping to zero or below is clamped to a no-op so the multiplier
    /// stays strictly positive.
    fn reduce_delta(&mut self) {
        if self.current_delta - self.params.delta_step > 0.0 {
            self.current_delta -= self.params.delta_step;
            info!(
                "current gear ratio {}",
                self.current_delta / self.params.delta_max
            );
        }
        else {
            self.report.delta_limited = true;
        }
    }

    /// Increase the deflection by one step.
    ///
    /// Stepping past the maximum deflection is clamped to a no-op.
    fn increase_delta(&mut self) {
        if self.current_delta + self.params.delta_step <= self.params.delta_max {
            self.current_delta += self.params.delta_step;
            info!(
                "current gear ratio {}",
                self.current_delta / self.params.delta_max
            );
        }
        else {
            self.report.delta_limited = true;
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// A GearCtrl as it looks after init with the default parameter file,
    /// without touching the filesystem.
    fn gear_ctrl() -> GearCtrl {
        let params = Params {
            delta_max: 250.0,
            delta_step: 10.0,
        };
        GearCtrl {
            current_delta: params.delta_max / 2.0,
            params,
            ..Default::default()
        }
    }

    fn step(ctrl: &mut GearCtrl, request: SpeedRequest, bound: u32) -> OutputData {
        let (output, _) = ctrl
            .proc(&InputData {
                request,
                max_active_slowing: bound,
            })
            .unwrap();
        output
    }

    #[test]
    fn test_step_down_bounded_by_slowing_factor() {
        let mut ctrl = gear_ctrl();

        for _ in 0..10 {
            step(&mut ctrl, SpeedRequest::StepDown, 3);
        }

        assert_eq!(ctrl.gear(), -3);
        assert!(ctrl.report.gear_limited);
    }

    #[test]
    fn test_step_up_never_goes_positive() {
        let mut ctrl = gear_ctrl();

        step(&mut ctrl, SpeedRequest::StepDown, 2);
        step(&mut ctrl, SpeedRequest::StepDown, 2);

        for _ in 0..5 {
            step(&mut ctrl, SpeedRequest::StepUp, 0);
        }

        assert_eq!(ctrl.gear(), 0);
    }

    #[test]
    fn test_step_up_count_matches_gear() {
        let mut ctrl = gear_ctrl();

        for _ in 0..4 {
            step(&mut ctrl, SpeedRequest::StepDown, 4);
        }
        assert_eq!(ctrl.gear(), -4);

        // Exactly |gear| step ups bring the gear back to zero
        for i in 1..=4 {
            let output = step(&mut ctrl, SpeedRequest::StepUp, 0);
            assert_eq!(output.gear, -4 + i);
        }
        assert_eq!(ctrl.gear(), 0);
    }

    #[test]
    fn test_ratio_follows_gear() {
        let mut ctrl = gear_ctrl();

        // Centred deflection at gear zero
        let output = step(&mut ctrl, SpeedRequest::Hold, 0);
        assert!((output.ratio - 0.5).abs() < 1e-12);

        // One step down drops the ratio by delta_step / delta_max
        let output = step(&mut ctrl, SpeedRequest::StepDown, 3);
        assert!((output.ratio - (115.0 / 250.0)).abs() < 1e-12);

        // Stepping back up restores it
        let output = step(&mut ctrl, SpeedRequest::StepUp, 0);
        assert!((output.ratio - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_delta_clamped_at_zero() {
        let mut ctrl = gear_ctrl();

        // With a huge bound the gear keeps counting down but the deflection
        // clamps above zero
        for _ in 0..50 {
            step(&mut ctrl, SpeedRequest::StepDown, 100);
        }

        assert_eq!(ctrl.gear(), -50);
        assert!(ctrl.report.delta_limited);

        let output = ctrl.output.unwrap();
        assert!(output.ratio > 0.0);
    }

    #[test]
    fn test_hold_is_noop() {
        let mut ctrl = gear_ctrl();

        step(&mut ctrl, SpeedRequest::StepDown, 1);
        let before = ctrl.output.unwrap();

        let after = step(&mut ctrl, SpeedRequest::Hold, 1);
        assert_eq!(before.gear, after.gear);
        assert!((before.ratio - after.ratio).abs() < 1e-12);
    }
}
