//! # Servo Controller Module
//!
//! This module provides a unified servo control interface which can abstract over different types
//! of servo driver boards. The [`Actuator`] trait is the capability the joint registry uses to move
//! a joint, [`ServoCtrl`] implements it on top of any [`ServoDriver`].

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// [`ServoDriver`] implementation for the Adafruit PCA9685 16 channel servo driver board.
pub mod pca9685;

/// In-memory [`ServoDriver`] used when no hardware is attached.
pub mod sim;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{JointId, MAX_ANGLE_DEG};
use log::trace;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt::Debug};

pub use sim::SimDriver;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for accessing servo driver boards.
pub trait ServoDriver {
    /// The type that the underlying driver uses for channel identification
    type Channel: Copy + Debug;

    /// Set the duty cycle of a channel.
    ///
    /// ## Arguments
    /// - `id` - The channel ID to set the duty cycle for
    /// - `duty_cycle` - The duty cycle to set. Must be a value between 0.0 and 1.0. Values outside
    ///   this range will be rejected.
    fn set_duty_cycle(
        &mut self,
        channel: Self::Channel,
        duty_cycle: f64,
    ) -> Result<(), ActuationError>;
}

/// Capability to move and read back the joints of the arm.
pub trait Actuator {
    /// Drive the given joint to an angle in degrees.
    fn set_angle(&mut self, joint: JointId, angle_deg: u8) -> Result<(), ActuationError>;

    /// The last angle the joint was driven to, or `None` if it has not been driven yet.
    fn read_angle(&self, joint: JointId) -> Option<u8>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Positional servo controller mapping joints onto the channels of a single driver board.
pub struct ServoCtrl<D>
where
    D: ServoDriver,
{
    driver: D,

    /// PWM period of the driver.
    ///
    /// Units: microseconds
    period_us: f64,

    servo_config_map: HashMap<JointId, ServoConfig<D::Channel>>,

    last_angle_deg: HashMap<JointId, u8>,
}

/// Configuration of a single positional servo.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ServoConfig<C> {
    /// Channel on the driver board the servo is connected to.
    pub channel: C,

    /// Pulse width at 0 degrees.
    ///
    /// Units: microseconds
    pub min_pulse_us: f64,

    /// Pulse width at 180 degrees.
    ///
    /// Units: microseconds
    pub max_pulse_us: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ActuationError {
    #[error("An I2C error occured")]
    I2c,

    #[error("Duty cycle must be between 0.0 and 1.0")]
    InvalidDutyCycle,

    #[error("Angle {0} is out of range, must be between 0 and 180")]
    InvalidAngle(u8),

    #[error("No servo is configured for joint {0}")]
    UnknownJoint(JointId),

    #[error("Invalid servo configuration: {0}")]
    InvalidConfig(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<D> ServoCtrl<D>
where
    D: ServoDriver,
{
    /// Create a new servo controller.
    ///
    /// ## Arguments
    /// - `driver` - An initialised [`ServoDriver`] board
    /// - `pwm_frequency_hz` - The PWM frequency the board has been configured with
    /// - `servo_config_map` - A configuration for the servos managed by this controller
    pub fn new(
        driver: D,
        pwm_frequency_hz: f64,
        servo_config_map: HashMap<JointId, ServoConfig<D::Channel>>,
    ) -> Result<Self, ActuationError> {
        if !(pwm_frequency_hz > 0.0) {
            return Err(ActuationError::InvalidConfig(format!(
                "PWM frequency must be positive, found {}",
                pwm_frequency_hz
            )));
        }

        let period_us = 1e6 / pwm_frequency_hz;

        // Check the config is valid
        for (joint, config) in servo_config_map.iter() {
            if !(config.min_pulse_us >= 0.0
                && config.min_pulse_us < config.max_pulse_us
                && config.max_pulse_us <= period_us)
            {
                return Err(ActuationError::InvalidConfig(format!(
                    "pulse range of {} must satisfy 0 <= min < max <= {} us, found {}..{}",
                    joint, period_us, config.min_pulse_us, config.max_pulse_us
                )));
            }
        }

        Ok(Self {
            driver,
            period_us,
            servo_config_map,
            last_angle_deg: HashMap::new(),
        })
    }

    #[cfg(test)]
    fn driver(&self) -> &D {
        &self.driver
    }

    /// Duty cycle which positions the servo at the given angle.
    fn duty_cycle(&self, config: &ServoConfig<D::Channel>, angle_deg: u8) -> f64 {
        let pulse_us = config.min_pulse_us
            + (config.max_pulse_us - config.min_pulse_us) * (angle_deg as f64)
                / (MAX_ANGLE_DEG as f64);

        pulse_us / self.period_us
    }
}

impl<D> Actuator for ServoCtrl<D>
where
    D: ServoDriver,
{
    fn set_angle(&mut self, joint: JointId, angle_deg: u8) -> Result<(), ActuationError> {
        if angle_deg > MAX_ANGLE_DEG {
            return Err(ActuationError::InvalidAngle(angle_deg));
        }

        let config = *self
            .servo_config_map
            .get(&joint)
            .ok_or(ActuationError::UnknownJoint(joint))?;

        let duty_cycle = self.duty_cycle(&config, angle_deg);

        trace!(
            "{} -> {} deg (channel {:?}, duty cycle {:.4})",
            joint,
            angle_deg,
            config.channel,
            duty_cycle
        );

        self.driver.set_duty_cycle(config.channel, duty_cycle)?;
        self.last_angle_deg.insert(joint, angle_deg);

        Ok(())
    }

    fn read_angle(&self, joint: JointId) -> Option<u8> {
        self.last_angle_deg.get(&joint).copied()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
