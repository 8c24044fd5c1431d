//! # Claw library.
//!
//! Command handling for the claw arm: the joint registry, activation gate and executor, plus the
//! servo drivers and the UDP server used by the `claw_exec` binary.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Activation gate - blocks commands until SDK mode is enabled
pub mod activation;

/// Claw server - recieves commands over UDP and sends the responses back
pub mod claw_server;

/// Claw control - parses, authorises and executes commands
pub mod executor;

/// Parameters for the claw executable
pub mod params;

/// Joint registry - the joints of the arm and their commanded angles
pub mod registry;

/// Driver used to control servos
pub mod servo_ctrl;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::HashMap;

use comms_if::eqpt::JointId;
use servo_ctrl::{ActuationError, ServoConfig, ServoCtrl, ServoDriver};

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build a servo controller for the joints declared in the parameters.
///
/// `to_channel` converts the channel index of each joint into the driver's channel type.
pub fn build_servo_ctrl<D, F>(
    driver: D,
    params: &params::ClawExecParams,
    to_channel: F,
) -> Result<ServoCtrl<D>, ActuationError>
where
    D: ServoDriver,
    F: Fn(u8) -> Option<D::Channel>,
{
    let mut config_map: HashMap<JointId, ServoConfig<D::Channel>> = HashMap::new();

    for joint in params.joints.iter() {
        let channel = to_channel(joint.channel).ok_or_else(|| {
            ActuationError::InvalidConfig(format!(
                "channel {} of {} does not exist on the driver",
                joint.channel, joint.id
            ))
        })?;

        config_map.insert(
            joint.id,
            ServoConfig {
                channel,
                min_pulse_us: joint.min_pulse_us,
                max_pulse_us: joint.max_pulse_us,
            },
        );
    }

    ServoCtrl::new(driver, params.pwm_frequency_hz, config_map)
}
