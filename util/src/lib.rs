//! Utility library for the Ember rescue robot software

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod logger;
pub mod module;
pub mod params;
pub mod session;
