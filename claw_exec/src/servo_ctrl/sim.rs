//! [`ServoDriver`] implementation which keeps the demanded duty cycles in memory

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use std::collections::HashMap;

use super::{ActuationError, ServoDriver};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Simulated driver board, used when running without servo hardware.
#[derive(Debug, Default)]
pub struct SimDriver {
    duty_cycles: HashMap<u8, f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last duty cycle demanded on the channel.
    pub fn duty_cycle(&self, channel: u8) -> Option<f64> {
        self.duty_cycles.get(&channel).copied()
    }
}

impl ServoDriver for SimDriver {
    type Channel = u8;

    fn set_duty_cycle(
        &mut self,
        channel: Self::Channel,
        duty_cycle: f64,
    ) -> Result<(), ActuationError> {
        if !(0.0..=1.0).contains(&duty_cycle) {
            return Err(ActuationError::InvalidDutyCycle);
        }

        debug!("[sim] channel {} duty cycle {:.4}", channel, duty_cycle);
        self.duty_cycles.insert(channel, duty_cycle);

        Ok(())
    }
}
