//! # Claw Control
//!
//! Executes commands against the joint registry. Every request goes through the same pipeline:
//! the text is parsed, the command is checked against the activation gate, and only then executed.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use comms_if::{
    eqpt::{MAX_ANGLE_DEG, MIN_ANGLE_DEG},
    tc::{AdjustDirection, Command, ParseError, Response, OK_PAYLOAD},
};
use log::{debug, info, warn};

// Internal
use crate::{
    activation::{ActivationGate, AuthError},
    registry::JointRegistry,
    servo_ctrl::ActuationError,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// State of the claw: the activation gate and the joints it guards.
///
/// Owned by the request loop, which hands it one request at a time.
pub struct ClawCtrl {
    gate: ActivationGate,

    registry: JointRegistry,

    /// If true the arm is moved to the neutral pose when SDK mode is first enabled.
    home_on_activate: bool,

    /// Set once the arm has reached the neutral pose. Until then every `wakeup` retries homing.
    homed: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Any error which rejects a request.
///
/// The message of each variant is that of its cause.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ExecError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Actuation(#[from] ActuationError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ClawCtrl {
    pub fn new(registry: JointRegistry, home_on_activate: bool) -> Self {
        Self {
            gate: ActivationGate::new(),
            registry,
            home_on_activate,
            homed: false,
        }
    }

    pub fn is_activated(&self) -> bool {
        self.gate.is_activated()
    }

    pub fn registry(&self) -> &JointRegistry {
        &self.registry
    }

    /// Handle one line of text from a client and build the response to send back.
    pub fn handle(&mut self, raw: &str) -> Response {
        match self.process(raw) {
            Ok(payload) => {
                debug!("{:?} -> {}", raw.trim(), payload);
                Response::Ok(payload)
            }
            Err(e) => {
                warn!("Rejected {:?}: {}", raw.trim(), e);
                Response::err(e)
            }
        }
    }

    /// Parse, authorise then execute a line of text.
    pub fn process(&mut self, raw: &str) -> Result<String, ExecError> {
        let cmd = Command::parse(raw)?;

        self.gate.authorize(&cmd)?;

        self.apply(cmd)
    }

    /// Execute an already authorised command.
    pub fn execute(&mut self, cmd: Command) -> Response {
        match self.apply(cmd) {
            Ok(payload) => Response::Ok(payload),
            Err(e) => Response::err(e),
        }
    }

    fn apply(&mut self, cmd: Command) -> Result<String, ExecError> {
        match cmd {
            Command::Activate => {
                self.gate.activate();

                if self.home_on_activate && !self.homed {
                    info!("Moving to home position");
                    self.registry.home()?;
                    self.homed = true;
                }
            }
            Command::Home => {
                self.registry.home()?;
                self.homed = true;
                info!("All joints moved to home position");
            }
            Command::QueryState => return Ok(self.registry.snapshot().to_string()),
            Command::SetAngle { joint, value } => self.registry.set_angle(joint, value)?,
            Command::AdjustAngle {
                joint,
                direction,
                magnitude,
            } => {
                let current = self
                    .registry
                    .angle(joint)
                    .ok_or(ActuationError::UnknownJoint(joint))?;

                self.registry
                    .set_angle(joint, adjusted_angle(current, direction, magnitude))?;
            }
        }

        Ok(OK_PAYLOAD.into())
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Apply a relative adjustment, saturating at the ends of the angle range.
fn adjusted_angle(current: u8, direction: AdjustDirection, magnitude: u8) -> u8 {
    match direction {
        AdjustDirection::Increase => current.saturating_add(magnitude).min(MAX_ANGLE_DEG),
        AdjustDirection::Decrease => current.saturating_sub(magnitude).max(MIN_ANGLE_DEG),
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
