//! # Activation Gate
//!
//! The claw ignores every command until SDK mode has been enabled with `wakeup`. Once enabled it
//! stays enabled until the executable restarts.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::Command;
use log::info;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ActivationGate {
    activated: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("SDK mode is not enabled, send `wakeup` first")]
    NotActivated,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ActivationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Check whether the command may be executed.
    ///
    /// `Activate` is always allowed, everything else requires SDK mode.
    pub fn authorize(&self, cmd: &Command) -> Result<(), AuthError> {
        match (self.activated, cmd) {
            (true, _) | (false, Command::Activate) => Ok(()),
            (false, _) => Err(AuthError::NotActivated),
        }
    }

    /// Enable SDK mode.
    ///
    /// Returns `true` if this call enabled it, `false` if it was already enabled.
    pub fn activate(&mut self) -> bool {
        if self.activated {
            return false;
        }

        self.activated = true;
        info!("SDK mode enabled, claw will respond to commands");

        true
    }
}
