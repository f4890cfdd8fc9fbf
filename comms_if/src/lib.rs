//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software: the
//! operator command set, the telemetry packet, the serial relay and liveness
//! messages exchanged between the two control nodes, and the drive types
//! shared by both motor layers.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Operator (wireless) command definitions
pub mod cmd;

/// Drive channel and actuation types
pub mod drive;

/// Serial relay and liveness messages between the control nodes
pub mod relay;

/// Telemetry packet sent to the operator
pub mod telem;

/// Network module
pub mod net;
