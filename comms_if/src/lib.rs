//! # Communications interface crate.
//!
//! Provides the command protocol shared by the claw executable and its clients.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Text commands, their parser and the responses sent back to clients
pub mod tc;

/// Joint identifiers and state snapshots
pub mod eqpt;
