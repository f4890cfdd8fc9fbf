//! Main master-node executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Operator command draining and processing
//!         - Drive tick: autonomous navigation or held manual targets,
//!           rear motor actuation and serial relay to the front node
//!         - Sensor tick: sensor acquisition and safety monitoring
//!         - Telemetry tick: publication on the wireless channel
//!         - Link liveness and buzzer housekeeping
//!
//! All cyclic modules provide a public struct implementing the
//! `util::module::State` trait.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use ctrl_lib::{
    auto_nav::AutoNav,
    cycle,
    data_store::DataStore,
    motor_drive::{LogBackend, MotorDrive},
    params::CtrlExecParams,
    relay_client::RelayClient,
    safety_mon::{Buzzer, LogBuzzer, SafetyMon},
    sensors::{SensorParams, Sensors},
    status_server::StatusServer,
    tc_processor,
    tc_server::TcServer,
    tm_server::TmServer,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Period of the drive tick: navigation, actuation and serial relay.
const DRIVE_PERIOD: Duration = Duration::from_millis(50);

/// Period of the sensor tick: acquisition and safety monitoring.
const SENSOR_PERIOD: Duration = Duration::from_millis(100);

/// Period of the telemetry tick.
const TELEM_PERIOD: Duration = Duration::from_millis(200);

/// Idle sleep between main loop passes.
const IDLE_SLEEP: Duration = Duration::from_millis(5);

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    // Initialise session
    let session = Session::new("ctrl_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Ember Master Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: CtrlExecParams =
        util::params::load("ctrl_exec.toml").wrap_err("Could not load exec params")?;

    let sensor_params: SensorParams =
        util::params::load("sensors.toml").wrap_err("Could not load sensor params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::new(&exec_params);

    // ---- INITIALISE MODULES ----

    let mut auto_nav = AutoNav::default();
    auto_nav
        .init("auto_nav.toml", &session)
        .wrap_err("Failed to initialise AutoNav")?;
    info!("AutoNav init complete");

    let mut safety_mon = SafetyMon::default();
    safety_mon
        .init("safety_mon.toml", &session)
        .wrap_err("Failed to initialise SafetyMon")?;
    info!("SafetyMon init complete");

    let mut sensors = Sensors::new(sensor_params);
    let mut motor_drive = MotorDrive::new(LogBackend);
    let mut buzzer = Buzzer::new(LogBuzzer);

    info!("Module initialisation complete\n");

    // ---- INITIALISE NETWORK AND SERIAL ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let tc_server =
        TcServer::new(&zmq_ctx, &exec_params).wrap_err("Failed to initialise TcServer")?;
    info!("TcServer initialised");

    let tm_server =
        TmServer::new(&zmq_ctx, &exec_params).wrap_err("Failed to initialise TmServer")?;
    info!("TmServer initialised");

    let status_server =
        StatusServer::new(&zmq_ctx, &exec_params).wrap_err("Failed to initialise StatusServer")?;
    info!("StatusServer initialised");

    let mut relay_client =
        RelayClient::new(&exec_params).wrap_err("Failed to open the front node serial link")?;
    info!("RelayClient initialised");

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let start = Instant::now();
    let mut next_drive = start;
    let mut next_sensor = start;
    let mut next_telem = start;
    let mut last_link_health = ds.link_health;

    loop {
        let now = Instant::now();

        // ---- STATUS REQUESTS ----

        if let Err(e) = status_server.poll() {
            warn!("Status server error: {}", e);
        }

        // ---- COMMAND PROCESSING ----

        // Get commands until none remain
        loop {
            match tc_server.recv_cmd() {
                Ok(Some(cmd)) => tc_processor::exec(&mut ds, &mut auto_nav, &cmd, now),
                Ok(None) => break,
                Err(e) => {
                    warn!("Could not receive commands: {}", e);
                    break;
                }
            }
        }

        // ---- DRIVE TICK ----

        if now >= next_drive {
            cycle::drive_tick(&mut ds, &mut auto_nav, now);

            motor_drive.step(&ds.targets);

            if let Err(e) = relay_client.send_speeds(&ds.targets) {
                warn!("Could not relay speeds to the front node: {}", e);
            }

            next_drive = now + DRIVE_PERIOD;
        }

        // ---- SENSOR TICK ----

        if now >= next_sensor {
            cycle::sensor_tick(&mut ds, &mut safety_mon, &mut sensors, now);

            next_sensor = now + SENSOR_PERIOD;
        }

        // ---- TELEMETRY TICK ----

        if now >= next_telem {
            if let Err(e) = tm_server.send(&ds) {
                warn!("Could not publish telemetry: {}", e);
            }

            next_telem = now + TELEM_PERIOD;
        }

        // ---- HOUSEKEEPING ----

        relay_client.poll_liveness(now);
        ds.link_health = relay_client.health(now);

        if ds.link_health != last_link_health {
            info!("Front node link is now {:?}", ds.link_health);
            last_link_health = ds.link_health;
        }

        buzzer.update(&mut ds.safety, now);

        ds.num_cycles += 1;

        thread::sleep(IDLE_SLEEP);
    }
}
