//! # Front Node Executable
//!
//! This executable drives the front and center motor pairs of the robot on
//! demand lines relayed from the master over the serial link. It holds no
//! navigation or safety logic of its own beyond one rule: if demand lines
//! stop arriving, stop the motors.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Demand tracking and the command fail-safe.
mod executor;

/// Motor driver abstraction.
mod motors;

/// Parameters for the front node executable.
mod params;

/// Serial link to the master node.
mod relay_server;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use log::{info, warn};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::relay::LivenessMsg;
use executor::Executor;
use motors::{LogBackend, MotorBackend};
use params::FrontExecParams;
use relay_server::RelayServer;
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Idle sleep between main loop passes.
const IDLE_SLEEP: Duration = Duration::from_millis(10);

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    // Initialise session
    let session = Session::new("front_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Ember Front Node Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    info!("Initialising...");

    // ---- LOAD PARAMETERS ----

    let params: FrontExecParams = util::params::load("front_exec.toml")?;

    info!("Parameters loaded");

    // ---- SERVER INITIALISATION ----

    let mut server = RelayServer::new(&params).wrap_err("Failed to open the serial link")?;

    info!("Server initialised");

    let mut executor = Executor::new(Duration::from_millis(params.failsafe_timeout_ms));
    let mut motors = LogBackend::default();

    let liveness_interval = Duration::from_millis(params.liveness_interval_ms);
    let mut next_liveness = Instant::now();

    // ---- MAIN LOOP ----

    info!("Initialisation complete, entering main loop with the fail-safe engaged");

    loop {
        let now = Instant::now();

        // Get demands from the master until none remain
        while let Some(msg) = server.recv_msg() {
            executor.on_msg(&msg, now);
        }

        // Produce and actuate this cycle's settings, zero when the
        // fail-safe is engaged
        let dems = executor.step(now);
        motors.apply(&dems);

        // Periodic liveness line carrying the applied speeds
        if now >= next_liveness {
            let applied = executor.applied();
            let liveness = LivenessMsg::new(
                applied.left,
                applied.right,
                applied.center_left,
                applied.center_right,
            );

            if let Err(e) = server.send_liveness(&liveness) {
                warn!("Could not send the liveness line: {}", e);
            }

            next_liveness = now + liveness_interval;
        }

        thread::sleep(IDLE_SLEEP);
    }
}
