//! Implementations for the AreaEval state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{trace, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

// Internal
use super::{AreaEvalError, Params};
use crate::areas::Area;
use crate::gear_ctrl::SpeedRequest;
use crate::geometry;
use comms_if::eqpt::gps::GpsFix;
use util::{
    archive::{Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Area evaluation module state
#[derive(Default)]
pub struct AreaEval {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    /// Ids of areas the vehicle is currently inside the effect of. An id
    /// appears here from the first affected cycle until the first unaffected
    /// one, which is what makes the entry edge detectable.
    inside: HashSet<String>,

    pub(crate) output: Option<OutputData>,
    arch_output: Archiver,
}

/// Input data to area evaluation.
#[derive(Clone)]
pub struct InputData {
    /// The fix to evaluate against. Must not be the fix-lost sentinel, the
    /// control loop skips evaluation entirely while the fix is lost.
    pub fix: GpsFix,

    /// Registry snapshot for this cycle
    pub areas: Vec<Arc<Area>>,

    /// Current gear of the gear shift module, zero or negative
    pub gear: i64,
}

/// Output decisions from one evaluation cycle.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct OutputData {
    /// The request to pass to the gear shift module
    pub speed_request: SpeedRequest,

    /// True if any currently-affecting area disables operator inputs
    pub inputs_inhibited: bool,

    /// Factor to apply to the drive command this cycle. Unity except on the
    /// cycle the vehicle first enters an affecting area, when it carries the
    /// one-shot pulse factor.
    pub entry_pulse_scale: f64,

    /// Largest slowing factor over all currently-affecting areas
    pub max_active_slowing: u32,
}

/// Status report for area evaluation processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Number of areas evaluated this cycle
    pub num_areas: usize,

    /// Number of areas currently affecting the vehicle
    pub num_affecting: usize,

    /// Number of areas skipped due to geometry errors
    pub num_skipped: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for OutputData {
    fn default() -> Self {
        OutputData {
            speed_request: SpeedRequest::Hold,
            inputs_inhibited: false,
            entry_pulse_scale: 1.0,
            max_active_slowing: 0,
        }
    }
}

impl State for AreaEval {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = AreaEvalError;

    /// Initialise the AreaEval module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters
        self.params = match params::load(init_data) {
            Ok(p) => p,
            Err(e) => return Err(e)
        };

        // Create the arch folder for area_eval
        let mut arch_path = session.arch_root.clone();
        arch_path.push("area_eval");
        std::fs::create_dir_all(arch_path).unwrap();

        // Initialise the archivers
        self.arch_report = Archiver::from_path(
            session, "area_eval/status_report.csv"
        ).unwrap();
        self.arch_output = Archiver::from_path(
            session, "area_eval/output.csv"
        ).unwrap();

        Ok(())
    }

    /// Perform cyclic processing of area evaluation.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        // Evaluating the sentinel would classify the vehicle at a nonsense
        // position, the loop must not request it
        if input_data.fix.is_fix_lost() {
            return Err(AreaEvalError::FixLost);
        }

        self.report.num_areas = input_data.areas.len();

        let mut slow_requested = false;
        let mut inputs_inhibited = false;
        let mut entry_edge = false;
        let mut max_active_slowing = 0u32;

        for area in input_data.areas.iter() {
            let affected = match geometry::affects(area, &input_data.fix) {
                Ok(a) => a,
                Err(e) => {
                    // A malformed area never fails the cycle, it is skipped
                    // and kept in the registry for future correction
                    warn!("Skipping area in evaluation: {}", e);
                    self.report.num_skipped += 1;
                    continue;
                }
            };

            if affected {
                self.report.num_affecting += 1;

                if area.slowing_factor > 0 {
                    slow_requested = true;

                    if area.slowing_factor > max_active_slowing {
                        max_active_slowing = area.slowing_factor;
                    }
                }

                if area.disables_inputs {
                    inputs_inhibited = true;
                }

                // Entry edge, the first affected cycle since being clear
                if self.inside.insert(area.id.clone()) {
                    trace!("Entered area {} ({})", area.id, area.label);
                    entry_edge = true;
                }
            }
            else {
                // Clear the flag so a future entry counts as a fresh edge
                self.inside.remove(&area.id);
            }
        }

        // Drop hysteresis entries for areas no longer in the registry
        let current_ids: HashSet<&String> =
            input_data.areas.iter().map(|a| &a.id).collect();
        self.inside.retain(|id| current_ids.contains(id));

        // Aggregate the speed decision. While no area requests slowing the
        // gear is stepped back towards zero, one step per cycle.
        let speed_request = if slow_requested {
            SpeedRequest::StepDown
        }
        else if input_data.gear < 0 {
            SpeedRequest::StepUp
        }
        else {
            SpeedRequest::Hold
        };

        let output = OutputData {
            speed_request,
            inputs_inhibited,
            entry_pulse_scale: match entry_edge {
                true => self.params.entry_pulse_factor,
                false => 1.0,
            },
            max_active_slowing,
        };

        trace!(
            "AreaEval output:\n    request: {:?}\n    inhibited: {}\n    max slowing: {}",
            output.speed_request,
            output.inputs_inhibited,
            output.max_active_slowing
        );

        // Update the output in self
        self.output = Some(output);

        Ok((output, self.report))
    }
}

impl Archived for AreaEval {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Write each one individually
        self.arch_report.serialise(self.report)?;
        self.arch_output.serialise(self.output.unwrap_or_default())?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Point2;

    fn eval_with_pulse(factor: f64) -> AreaEval {
        AreaEval {
            params: Params {
                entry_pulse_factor: factor,
            },
            ..Default::default()
        }
    }

    fn square(
        id: &str,
        half_size: f64,
        reversed: bool,
        slowing_factor: u32,
        disables_inputs: bool,
    ) -> Arc<Area> {
        Arc::new(Area {
            id: String::from(id),
            label: format!("test_{}", id),
            kind: String::new(),
            boundary: vec![
                Point2::new(-half_size, -half_size),
                Point2::new(-half_size, half_size),
                Point2::new(half_size, half_size),
                Point2::new(half_size, -half_size),
            ],
            reversed,
            slowing_factor,
            disables_inputs,
        })
    }

    fn fix(lon_deg: f64, lat_deg: f64) -> GpsFix {
        GpsFix {
            lat_deg,
            lon_deg,
            alt: 0.0,
        }
    }

    #[test]
    fn test_entry_pulse_fires_once() {
        let mut eval = eval_with_pulse(0.75);
        let areas = vec![square("1", 5.0, false, 3, false)];

        let inside = InputData {
            fix: fix(1.0, 1.0),
            areas: areas.clone(),
            gear: 0,
        };

        // First affected cycle carries the pulse
        let (out, rpt) = eval.proc(&inside).unwrap();
        assert_eq!(out.entry_pulse_scale, 0.75);
        assert_eq!(out.speed_request, SpeedRequest::StepDown);
        assert_eq!(out.max_active_slowing, 3);
        assert_eq!(rpt.num_affecting, 1);

        // Still inside, no pulse
        let (out, _) = eval.proc(&inside).unwrap();
        assert_eq!(out.entry_pulse_scale, 1.0);
        assert_eq!(out.speed_request, SpeedRequest::StepDown);

        // Leave, then re-enter, the pulse fires again
        let outside = InputData {
            fix: fix(50.0, 50.0),
            areas: areas.clone(),
            gear: 0,
        };
        let (out, _) = eval.proc(&outside).unwrap();
        assert_eq!(out.entry_pulse_scale, 1.0);
        assert_eq!(out.speed_request, SpeedRequest::Hold);

        let (out, _) = eval.proc(&inside).unwrap();
        assert_eq!(out.entry_pulse_scale, 0.75);
    }

    #[test]
    fn test_step_up_while_clear_and_throttled() {
        let mut eval = eval_with_pulse(0.75);
        let areas = vec![square("1", 5.0, false, 3, false)];

        let input = InputData {
            fix: fix(50.0, 50.0),
            areas,
            gear: -2,
        };

        let (out, _) = eval.proc(&input).unwrap();
        assert_eq!(out.speed_request, SpeedRequest::StepUp);
        assert_eq!(out.max_active_slowing, 0);
    }

    #[test]
    fn test_aggregation_over_multiple_areas() {
        let mut eval = eval_with_pulse(0.75);

        // Point (1, 1) is inside both squares, the reversed area affects only
        // outside so it contributes nothing here
        let areas = vec![
            square("slow", 5.0, false, 2, false),
            square("slower", 10.0, false, 4, false),
            square("stop_outside", 20.0, true, 0, true),
        ];

        let input = InputData {
            fix: fix(1.0, 1.0),
            areas: areas.clone(),
            gear: 0,
        };

        let (out, rpt) = eval.proc(&input).unwrap();
        assert_eq!(out.speed_request, SpeedRequest::StepDown);
        assert_eq!(out.max_active_slowing, 4);
        assert!(!out.inputs_inhibited);
        assert_eq!(rpt.num_affecting, 2);

        // Far outside, only the reversed stop area affects, disabling inputs
        let input = InputData {
            fix: fix(100.0, 0.0),
            areas,
            gear: 0,
        };

        let (out, rpt) = eval.proc(&input).unwrap();
        assert_eq!(out.speed_request, SpeedRequest::Hold);
        assert!(out.inputs_inhibited);
        assert_eq!(rpt.num_affecting, 1);
    }

    #[test]
    fn test_degenerate_area_is_skipped_not_fatal() {
        let mut eval = eval_with_pulse(0.75);

        let degenerate = Arc::new(Area {
            id: String::from("bad"),
            label: String::from("test_bad"),
            kind: String::new(),
            boundary: vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)],
            reversed: false,
            slowing_factor: 5,
            disables_inputs: true,
        });

        let input = InputData {
            fix: fix(1.0, 1.0),
            areas: vec![degenerate, square("1", 5.0, false, 2, false)],
            gear: 0,
        };

        let (out, rpt) = eval.proc(&input).unwrap();
        assert_eq!(rpt.num_skipped, 1);
        assert_eq!(rpt.num_affecting, 1);
        assert_eq!(out.speed_request, SpeedRequest::StepDown);
        assert_eq!(out.max_active_slowing, 2);
        assert!(!out.inputs_inhibited);
    }

    #[test]
    fn test_removed_area_forgets_hysteresis() {
        let mut eval = eval_with_pulse(0.5);
        let areas = vec![square("1", 5.0, false, 1, false)];

        let inside = InputData {
            fix: fix(1.0, 1.0),
            areas: areas.clone(),
            gear: 0,
        };

        let (out, _) = eval.proc(&inside).unwrap();
        assert_eq!(out.entry_pulse_scale, 0.5);

        // Registry empties while we are inside
        let empty = InputData {
            fix: fix(1.0, 1.0),
            areas: vec![],
            gear: 0,
        };
        eval.proc(&empty).unwrap();

        // The area comes back, this counts as a fresh entry
        let (out, _) = eval.proc(&inside).unwrap();
        assert_eq!(out.entry_pulse_scale, 0.5);
    }

    #[test]
    fn test_fix_lost_input_is_error() {
        let mut eval = eval_with_pulse(0.75);

        let input = InputData {
            fix: GpsFix::FIX_LOST,
            areas: vec![],
            gear: 0,
        };

        assert!(matches!(eval.proc(&input), Err(AreaEvalError::FixLost)));
    }
}
