//! Motor actuation for the four channels driven by this node.
//!
//! The driver hardware sits behind [`MotorBackend`]. The default backend
//! logs the demands, which is all an off-target run can do. Demands are only
//! logged on change to keep the trace readable at the loop rate.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;

use crate::executor::FrontDems;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Access to the front motor driver channels.
pub trait MotorBackend {
    fn apply(&mut self, dems: &FrontDems);
}

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// A backend which logs the demands instead of actuating hardware.
#[derive(Default)]
pub struct LogBackend {
    last: Option<FrontDems>,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl MotorBackend for LogBackend {
    fn apply(&mut self, dems: &FrontDems) {
        if self.last.as_ref() != Some(dems) {
            trace!("Actuating {:?}", dems);
            self.last = Some(*dems);
        }
    }
}
