//! Main governor executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Operator command processing and handling
//!         - Receiver sentence acquisition and fix parsing
//!         - Area effect evaluation
//!         - Gear shift processing
//!         - Input gate and drive command output
//!         - Position report broadcast
//!
//! # Modules
//!
//! All cyclic modules (e.g. `area_eval`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use gov_lib::{
    area_client::AreaClient,
    area_eval,
    areas::AreaRegistry,
    cmd_client::{CmdClient, CmdClientError},
    data_store::DataStore,
    drive_client::{DriveClient, DriveClientError},
    gear_ctrl,
    gps::{NetSource, PositionParser, ReplaySource, SentenceSource, SourceData},
    input_client::InputClient,
    input_gate::GateInhibit,
    params::GovExecParams,
    pos_server::PosServer,
};

mod cmd_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::{
    cmd::OpCmdResponse,
    eqpt::drive::{DriveDems, DriveDemsResponse},
    eqpt::gps::PosReport,
    eqpt::input::{InputGateCmd, InputGateResponse},
};
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    maths::clamp,
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 1.0;

/// Limit of the number of times recieve errors from the drive server can be created consecutively
/// before the loss is reported.
const MAX_DRIVE_RECV_ERROR_LIMIT: u64 = 5;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Summary of the run written into the session directory on shutdown.
#[derive(Serialize)]
struct RunSummary {
    end_time_utc: String,
    num_cycles: u128,
    final_gear: i64,
    num_areas: usize,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "gov_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Sisu Governor Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: GovExecParams = util::params::load(
        "gov_exec.toml"
    ).wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE GPS SOURCE ----

    // The source determines whether sentences come from the receiver daemon
    // or from a replay file.
    let mut use_net_source = false;
    let mut sentence_source: Option<Box<dyn SentenceSource>> = None;

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    // If we have a single argument use it as the replay path
    if args.len() == 2 {
        info!("Loading sentence replay from \"{}\"", &args[1]);

        let replay = ReplaySource::new(&args[1])
            .wrap_err("Failed to load the sentence replay")?;

        sentence_source = Some(Box::new(replay));
    }
    // If no arguments then the receiver daemon will be used
    else if args.len() == 1 {
        info!("No replay provided, the receiver daemon will be used\n");
        use_net_source = true;
    }
    else {
        return Err(color_eyre::eyre::eyre!(
            "Expected either zero or one argument, found {}", args.len() - 1)
        );
    }

    // ---- INITIALISE STOP HANDLER ----

    // A host interrupt requests the same cooperative stop as the operator's
    // stop command.
    let interrupt = Arc::new(AtomicBool::new(false));
    let interrupt_clone = interrupt.clone();

    ctrlc::set_handler(move || {
        interrupt_clone.store(true, Ordering::Relaxed);
    }).wrap_err("Failed to set the interrupt handler")?;

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.area_eval.init("area_eval.toml", &session)
        .wrap_err("Failed to initialise AreaEval")?;
    info!("AreaEval init complete");

    ds.gear_ctrl.init("gear_ctrl.toml", &session)
        .wrap_err("Failed to initialise GearCtrl")?;
    info!("GearCtrl init complete");

    let mut parser = PositionParser::new();

    info!("Module initialisation complete\n");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let registry = AreaRegistry::new();

    let area_client = AreaClient::start(&zmq_ctx, &exec_params, registry.clone())
        .wrap_err("Failed to initialise the AreaClient")?;
    info!("AreaClient initialised");

    let cmd_client = CmdClient::new(&zmq_ctx, &exec_params)
        .wrap_err("Failed to initialise the CmdClient")?;
    info!("CmdClient initialised");

    let mut drive_client = DriveClient::new(&zmq_ctx, &exec_params)
        .wrap_err("Failed to initialise the DriveClient")?;
    info!("DriveClient initialised");

    let mut input_client = InputClient::new(&zmq_ctx, &exec_params)
        .wrap_err("Failed to initialise the InputClient")?;
    info!("InputClient initialised");

    let mut pos_server = PosServer::new(&zmq_ctx, &exec_params)
        .wrap_err("Failed to initialise the PosServer")?;
    info!("PosServer initialised");

    if use_net_source {
        let source = NetSource::new(
            &zmq_ctx,
            &exec_params.gps_endpoint,
            exec_params.gps_recv_timeout_ms,
        ).wrap_err("Failed to initialise the receiver source")?;

        sentence_source = Some(Box::new(source));
        info!("Receiver source initialised");
    }

    // The argument parsing above guarantees one of the two branches set the
    // source.
    let mut sentence_source = match sentence_source {
        Some(s) => s,
        None => util::raise_error!("No sentence source present"),
    };

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let loop_result: Result<(), Report> = loop {

        // Check for a cooperative stop before starting the cycle
        if interrupt.load(Ordering::Relaxed) {
            ds.request_stop("host interrupt");
        }
        if ds.stop_requested {
            break Ok(());
        }

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // ---- OPERATOR COMMAND PROCESSING ----

        // Get commands until none remain
        loop {
            match cmd_client.recieve_cmd() {
                Ok(Some(cmd)) => {
                    let response_result = match cmd.is_valid() {
                        true => {
                            // Process the command
                            cmd_processor::exec(&mut ds, &cmd);

                            // Send response
                            cmd_client.send_response(OpCmdResponse::Ok)
                        },
                        false => {
                            warn!("Recieved an out of range command: {:?}", cmd);
                            cmd_client.send_response(OpCmdResponse::Invalid)
                        }
                    };

                    // Print warning if couldn't send the response
                    match response_result {
                        Ok(_) => (),
                        Err(e) => warn!("Could not respond to command: {}", e)
                    }
                },
                Ok(None) => break,
                // The operator being away is not an error, the last throttle
                // command stays in force
                Err(CmdClientError::NotConnected) => break,
                Err(CmdClientError::CmdParseError(e)) => {
                    warn!("Could not parse recieved command: {}", e);
                    break;
                },
                Err(e) => {
                    warn!("Error recieving operator commands: {}", e);
                    break;
                }
            }
        }

        // ---- RECEIVER READ AND FIX PARSING ----

        // Reading the receiver is the only long-blocking step of the cycle,
        // bounded by the source's timeout.
        match sentence_source.read_sentence() {
            Ok(SourceData::Sentence(sentence)) => {
                if let Some(fix) = parser.feed(&sentence) {
                    ds.latest_fix = fix;
                }
            },
            Ok(SourceData::None) => (),
            Ok(SourceData::EndOfStream) => {
                info!("End of sentence replay reached, stopping");
                break Ok(());
            },
            // Receiver faults are fatal to the loop. The stop drive command
            // and input disable are issued by the shutdown handling below
            // before the error propagates.
            Err(e) => {
                error!("Fatal receiver error: {}", e);
                break Err(e).wrap_err("An error occured while reading the receiver");
            }
        }

        ds.fix_lost = ds.latest_fix.is_fix_lost();

        // ---- AREA EVALUATION AND GEAR PROCESSING ----

        if ds.fix_lost {
            // No valid position, skip evaluation and close the gate
            ds.input_gate.set_inhibit(GateInhibit::FixLost, true);
        }
        else {
            ds.input_gate.set_inhibit(GateInhibit::FixLost, false);

            // AreaEval processing
            let area_eval_input = area_eval::InputData {
                fix: ds.latest_fix,
                areas: registry.snapshot(),
                gear: ds.gear_ctrl.gear(),
            };
            match ds.area_eval.proc(&area_eval_input) {
                Ok((o, r)) => {
                    ds.area_eval_output = o;
                    ds.area_eval_status_rpt = r;
                },
                Err(e) => warn!("Error during AreaEval processing: {}", e)
            }

            ds.input_gate.set_inhibit(
                GateInhibit::AreaEffect,
                ds.area_eval_output.inputs_inhibited,
            );

            // GearCtrl processing
            let gear_ctrl_input = gear_ctrl::InputData {
                request: ds.area_eval_output.speed_request,
                max_active_slowing: ds.area_eval_output.max_active_slowing,
            };
            match ds.gear_ctrl.proc(&gear_ctrl_input) {
                Ok((o, r)) => {
                    ds.gear_ctrl_output = o;
                    ds.gear_ctrl_status_rpt = r;
                },
                Err(e) => warn!("Error during GearCtrl processing: {}", e)
            }
        }

        // ---- INPUT GATE OUTPUT ----

        if let Some(gate_cmd) = ds.input_gate.update() {
            match input_client.send_cmd(gate_cmd) {
                Ok(InputGateResponse::GateOk) => (),
                Ok(r) => warn!(
                    "Recieved non-nominal response from the input dispatch: {:?}",
                    r
                ),
                Err(e) => warn!("InputClient processing error: {}", e)
            }
        }

        // ---- DRIVE COMMAND OUTPUT ----

        // The drive demand is the operator's last command scaled by the gear
        // ratio, with the one-shot entry pulse on entry cycles. A closed gate
        // or lost fix forces a stop.
        let throttle_norm = match ds.fix_lost || !ds.input_gate.enabled() {
            true => 0.0,
            false => clamp(
                &(ds.op_throttle_norm
                    * ds.gear_ctrl_output.ratio
                    * ds.area_eval_output.entry_pulse_scale),
                &-1.0,
                &1.0,
            ),
        };

        match drive_client.send_demands(&DriveDems { throttle_norm }) {
            Ok(DriveDemsResponse::DemsOk) => {
                ds.drive_connected = true;

                // Reset the recieve error counter
                ds.num_consec_drive_recv_errors = 0;
            },
            Ok(r) => warn!(
                "Recieved non-nominal response from the drive server: {:?}",
                r
            ),
            Err(DriveClientError::NotConnected) => {
                if ds.drive_connected {
                    error!("Connection to the drive server lost");
                }
                ds.drive_connected = false;
            },
            Err(DriveClientError::RecvError(_)) => {
                ds.num_consec_drive_recv_errors += 1;

                // If over the limit print error once
                if ds.num_consec_drive_recv_errors > MAX_DRIVE_RECV_ERROR_LIMIT {
                    if ds.drive_connected {
                        error!(
                            "Maximum number of DriveClient Recieve Errors ({}) has been exceeded",
                            MAX_DRIVE_RECV_ERROR_LIMIT
                        );
                    }
                    ds.drive_connected = false;
                }
            },
            Err(e) => warn!("DriveClient processing error: {}", e)
        }

        // ---- POSITION REPORT ----

        // The report goes out every cycle, carrying the sentinel while the
        // fix is lost.
        let report = PosReport::from_fix(&exec_params.robot_id, &ds.latest_fix);
        match pos_server.send(&report) {
            Ok(_) => (),
            Err(e) => warn!("PosServer error: {}", e)
        };

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.area_eval.write() {
            warn!("Could not write AreaEval archives: {}", e);
        }
        if let Err(e) = ds.gear_ctrl.write() {
            warn!("Could not write GearCtrl archives: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S)
            .checked_sub(cycle_dur)
        {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            },
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64()
                        - Duration::from_secs_f64(CYCLE_PERIOD_S).as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    };

    // ---- SHUTDOWN ----

    // Whatever ended the loop, the vehicle must not be left driving
    info!("Bringing the vehicle to a stop and disabling inputs");
    stop_and_disable(&mut drive_client, &mut input_client);

    area_client.stop();

    session.save("run_summary.json", RunSummary {
        end_time_utc: chrono::Utc::now().to_rfc3339(),
        num_cycles: ds.num_cycles,
        final_gear: ds.gear_ctrl.gear(),
        num_areas: registry.len(),
    });

    session.exit();

    info!("End of execution");

    loop_result
}

/// Bring the vehicle to a stop and close the input gate.
///
/// Both outputs are attempted whatever the individual results, losing the
/// loop must never leave the vehicle in a last-commanded nonzero-speed state.
fn stop_and_disable(drive_client: &mut DriveClient, input_client: &mut InputClient) {
    match drive_client.send_demands(&DriveDems::STOP) {
        Ok(_) => info!("Stop drive command sent"),
        Err(e) => warn!("Could not send the stop drive command: {}", e)
    }

    match input_client.send_cmd(InputGateCmd::Disable) {
        Ok(_) => info!("Inputs disabled"),
        Err(e) => warn!("Could not disable inputs: {}", e)
    }
}
