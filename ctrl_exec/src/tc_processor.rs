//! # Command processor
//!
//! Executes operator commands against the data store. Commands are consumed
//! exactly once on arrival and never queued across cycles.
//!
//! Precedence rules, in order:
//!
//! 1. Any command other than `AutoToggle` or `Emergency` expresses manual
//!    intent and disables autonomous mode before anything else happens.
//! 2. `Emergency` always executes, toggling the latch.
//! 3. While the latch is set every other command is ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::time::Instant;

use log::{debug, info};

use comms_if::cmd::Cmd;

use crate::auto_nav::AutoNav;
use crate::data_store::DataStore;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a command on the data store.
pub fn exec(ds: &mut DataStore, auto_nav: &mut AutoNav, cmd: &Cmd, now: Instant) {
    debug!("Executing command: {:?}", cmd);

    // Manual intent overrides autonomy
    if !matches!(cmd, Cmd::AutoToggle | Cmd::Emergency) && ds.auto_enabled {
        info!("Manual command received, autonomous mode disabled");
        ds.auto_enabled = false;
    }

    if let Cmd::Emergency = cmd {
        if ds.safety.latched {
            ds.clear_emergency();
        } else {
            ds.latch_emergency("operator emergency stop", now);
        }
        return;
    }

    if ds.safety.latched {
        debug!("Emergency latch is set, ignoring {:?}", cmd);
        return;
    }

    let drive = ds.manual_drive_speed;

    match cmd {
        Cmd::Forward => ds.targets.set_all(drive),
        Cmd::Backward => ds.targets.set_all(-drive),
        Cmd::Left => ds.targets.set_tank(-drive, drive),
        Cmd::Right => ds.targets.set_tank(drive, -drive),
        Cmd::Stop => ds.targets.zero(),
        Cmd::AutoToggle => {
            ds.auto_enabled = !ds.auto_enabled;
            auto_nav.reset(now);

            if ds.auto_enabled {
                info!("Autonomous mode enabled");
            } else {
                info!("Autonomous mode disabled");
                ds.targets.zero();
            }
        }
        Cmd::Emergency => unreachable!("handled above"),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::CtrlExecParams;

    fn setup() -> (DataStore, AutoNav, Instant) {
        let mut auto_nav = AutoNav::default();
        let now = Instant::now();
        auto_nav.reset(now);

        (DataStore::new(&CtrlExecParams::default()), auto_nav, now)
    }

    #[test]
    fn manual_drive_commands_set_targets() {
        let (mut ds, mut nav, now) = setup();

        exec(&mut ds, &mut nav, &Cmd::Forward, now);
        assert_eq!(ds.targets.front_left, 180);
        assert_eq!(ds.targets.rear_right, 180);

        exec(&mut ds, &mut nav, &Cmd::Backward, now);
        assert_eq!(ds.targets.rear_left, -180);

        exec(&mut ds, &mut nav, &Cmd::Left, now);
        assert_eq!(ds.targets.front_left, -180);
        assert_eq!(ds.targets.front_right, 180);

        exec(&mut ds, &mut nav, &Cmd::Right, now);
        assert_eq!(ds.targets.front_left, 180);
        assert_eq!(ds.targets.front_right, -180);

        exec(&mut ds, &mut nav, &Cmd::Stop, now);
        assert!(ds.targets.is_zero());
    }

    #[test]
    fn manual_command_disables_autonomy() {
        let (mut ds, mut nav, now) = setup();
        ds.auto_enabled = true;

        exec(&mut ds, &mut nav, &Cmd::Forward, now);
        assert!(!ds.auto_enabled);
        assert_eq!(ds.targets.front_left, 180);
    }

    #[test]
    fn auto_toggle_flips_and_zeroes_on_disable() {
        let (mut ds, mut nav, now) = setup();

        exec(&mut ds, &mut nav, &Cmd::AutoToggle, now);
        assert!(ds.auto_enabled);

        // Targets set by the navigation layer while enabled
        ds.targets.set_all(160);

        exec(&mut ds, &mut nav, &Cmd::AutoToggle, now);
        assert!(!ds.auto_enabled);
        assert!(ds.targets.is_zero());
    }

    #[test]
    fn emergency_toggles_the_latch() {
        let (mut ds, mut nav, now) = setup();
        ds.targets.set_all(180);

        exec(&mut ds, &mut nav, &Cmd::Emergency, now);
        assert!(ds.safety.latched);
        assert!(ds.targets.is_zero());

        exec(&mut ds, &mut nav, &Cmd::Emergency, now);
        assert!(!ds.safety.latched);
        // No implicit resume of the interrupted motion
        assert!(ds.targets.is_zero());
    }

    #[test]
    fn latched_store_ignores_drive_commands() {
        let (mut ds, mut nav, now) = setup();

        exec(&mut ds, &mut nav, &Cmd::Emergency, now);

        exec(&mut ds, &mut nav, &Cmd::Forward, now);
        assert!(ds.targets.is_zero());

        exec(&mut ds, &mut nav, &Cmd::AutoToggle, now);
        assert!(!ds.auto_enabled);
    }

    #[test]
    fn emergency_during_autonomy_stops_everything() {
        let (mut ds, mut nav, now) = setup();
        ds.auto_enabled = true;
        ds.targets.set_all(160);

        exec(&mut ds, &mut nav, &Cmd::Emergency, now);
        assert!(ds.safety.latched);
        assert!(!ds.auto_enabled);
        assert!(ds.targets.is_zero());
    }
}
