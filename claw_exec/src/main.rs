//! # Claw Control Executable
//!
//! This executable is responsible for controlling the claw arm:
//! - Recieves text commands over UDP
//! - Drives the base, arm, wrist and claw servos
//! - Reports the state of every joint back to clients

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::{eyre, WrapErr}, Result};
use log::{info, warn};
use structopt::StructOpt;

// Internal
use claw_lib::{
    build_servo_ctrl,
    claw_server::{ClawServer, ClawServerError},
    executor::ClawCtrl,
    params::{ClawExecParams, DriverParams},
    registry::JointRegistry,
    servo_ctrl::{Actuator, SimDriver},
};
use util::{
    logger::{level_from_str, logger_init},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "claw_exec", about = "Claw arm control executable")]
struct Opt {
    /// Parameter file, relative to the params directory of the software root
    #[structopt(long, default_value = "claw_exec.toml")]
    params: String,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {

    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    let opt = Opt::from_args();

    // Initialise session
    let session = Session::new(
        "claw_exec", 
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // ---- LOAD PARAMETERS ----

    let params: ClawExecParams = util::params::load(&opt.params)
        .wrap_err_with(|| format!("Failed to load parameters from {}", opt.params))?;

    // Initialise logger
    let log_level = level_from_str(&params.log_level)
        .ok_or_else(|| eyre!("Invalid log level {:?}", params.log_level))?;
    logger_init(log_level, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Claw Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    info!("Parameters loaded from {}", opt.params);

    info!("Initialising...");

    // ---- HARDWARE INITIALISATION ----

    let actuator = build_actuator(&params)
        .wrap_err("Failed to initialise the servo driver")?;

    let registry = JointRegistry::new(&params.joint_order(), actuator)
        .wrap_err("Invalid joint configuration")?;

    let mut ctrl = ClawCtrl::new(registry, params.home_on_activate);

    info!("Servos initialised");

    // ---- SERVER INITIALISATION ----

    let mut server = ClawServer::new(&params)
        .wrap_err("Failed to initialise server")?;
    
    info!("Listening for commands on {}", server.local_addr()?);

    // ---- MAIN LOOP ----

    info!("Initialisation complete, waiting for `wakeup`");

    loop {
        match server.serve_one(&mut ctrl) {
            Ok(_) => (),
            // A bad datagram or unreachable client never stops the claw
            Err(e @ ClawServerError::NonUtf8Command(_)) 
            | Err(e @ ClawServerError::SendError(..)) => {
                warn!("{}", e);
            }
            Err(e) => return Err(e).wrap_err("Command socket failed"),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Create the actuator for the configured driver board.
fn build_actuator(params: &ClawExecParams) -> Result<Box<dyn Actuator>> {
    match params.driver {
        DriverParams::Sim => {
            info!("Using simulated servo driver");
            Ok(Box::new(build_servo_ctrl(SimDriver::new(), params, Some)?))
        }
        DriverParams::Pca9685 { i2c_address } => pca9685_actuator(params, i2c_address),
    }
}

#[cfg(all(target_arch = "arm", target_os = "linux"))]
fn pca9685_actuator(params: &ClawExecParams, i2c_address: u8) -> Result<Box<dyn Actuator>> {
    use claw_lib::servo_ctrl::pca9685::{channel_from_index, prescale_for};
    use pwm_pca9685::{Address, Pca9685};

    info!("Using PCA9685 servo driver at I2C address {:#04x}", i2c_address);

    let i2c = rppal::i2c::I2c::new().wrap_err("Failed to open the I2C bus")?;

    let mut pwm = Pca9685::new(i2c, Address::from(i2c_address))
        .map_err(|e| eyre!("Failed to create the PCA9685 driver: {:?}", e))?;
    pwm.set_prescale(prescale_for(params.pwm_frequency_hz))
        .map_err(|e| eyre!("Failed to set the PWM frequency: {:?}", e))?;
    pwm.enable()
        .map_err(|e| eyre!("Failed to enable the PCA9685: {:?}", e))?;

    Ok(Box::new(build_servo_ctrl(pwm, params, channel_from_index)?))
}

#[cfg(not(all(target_arch = "arm", target_os = "linux")))]
fn pca9685_actuator(_params: &ClawExecParams, _i2c_address: u8) -> Result<Box<dyn Actuator>> {
    Err(eyre!("The PCA9685 driver is only available on Raspberry Pi targets"))
}
