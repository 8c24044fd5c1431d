//! # Claw Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::JointId;
use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone)]
pub struct ClawExecParams {

    /// Address the command socket binds to, for example `0.0.0.0:8889`
    pub bind_address: String,

    /// Maximum time a receive blocks for before the main loop wakes up.
    ///
    /// Units: milliseconds
    #[serde(default = "default_recv_timeout_ms")]
    pub recv_timeout_ms: u64,

    /// Size of the receive buffer, longer datagrams are truncated.
    ///
    /// Units: bytes
    #[serde(default = "default_max_datagram_len")]
    pub max_datagram_len: usize,

    /// Move the arm to the home position when SDK mode is first enabled.
    #[serde(default = "default_home_on_activate")]
    pub home_on_activate: bool,

    /// Minimum level of log messages, one of `info`, `debug` or `trace`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// PWM frequency of the servo driver.
    ///
    /// Units: Hertz
    #[serde(default = "default_pwm_frequency_hz")]
    pub pwm_frequency_hz: f64,

    /// Servo driver board.
    pub driver: DriverParams,

    /// Joints of the arm, in the order they are reported in the state.
    pub joints: Vec<JointParams>,
}

/// Parameters of a single joint's servo.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct JointParams {
    pub id: JointId,

    /// Channel index on the driver board
    pub channel: u8,

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

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DriverParams {
    /// No hardware, duty cycles are only logged
    Sim,

    /// Adafruit PCA9685 board on the I2C bus
    Pca9685 {
        /// 7-bit I2C address of the board
        i2c_address: u8,
    },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ClawExecParams {
    /// Joint IDs in declaration order.
    pub fn joint_order(&self) -> Vec<JointId> {
        self.joints.iter().map(|j| j.id).collect()
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_recv_timeout_ms() -> u64 {
    200
}

fn default_max_datagram_len() -> usize {
    1024
}

fn default_home_on_activate() -> bool {
    true
}

fn default_log_level() -> String {
    "info".into()
}

fn default_pwm_frequency_hz() -> f64 {
    50.0
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
