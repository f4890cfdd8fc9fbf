//! # Master control node library
//!
//! Everything used by the `ctrl_exec` executable lives here so the cyclic
//! modules can be tested without the main loop.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod auto_nav;
pub mod cycle;
pub mod data_store;
pub mod motor_drive;
pub mod params;
pub mod relay_client;
pub mod safety_mon;
pub mod sensors;
pub mod status_server;
pub mod tc_processor;
pub mod tc_server;
pub mod tm_server;
