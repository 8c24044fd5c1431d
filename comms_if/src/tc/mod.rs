//! # Telecommand module
//!
//! This module provides the text command protocol used to drive the claw arm. A command is a
//! single line of whitespace separated tokens, for example `arm1 inc 15` or `claw open`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod response;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal
use crate::eqpt::{JointId, MAX_ANGLE_DEG, MIN_ANGLE_DEG};
pub use response::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Human readable description of the accepted grammars, used in syntax errors.
pub const GRAMMAR_HELP: &str = "expected `wakeup`, `home`, `state`, `claw open`, `claw close` \
    or `<joint> <set|inc|dec> <0-180>`";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A command sent to the claw by a client.
///
/// Angle values carried by a command are always within `[0, 180]`, anything outside that range is
/// rejected by [`Command::parse`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Command {
    /// Enable SDK mode, allowing all other commands to be executed.
    Activate,

    /// Move every joint to its neutral angle.
    Home,

    /// Report the angle of every joint.
    QueryState,

    /// Move a joint to an absolute angle.
    SetAngle { joint: JointId, value: u8 },

    /// Move a joint relative to its current angle, saturating at the ends of the range.
    AdjustAngle {
        joint: JointId,
        direction: AdjustDirection,
        magnitude: u8,
    },
}

/// Direction of a relative angle adjustment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AdjustDirection {
    Increase,
    Decrease,
}

/// Possible parsing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command: empty input")]
    Empty,

    #[error("Unknown command or component: {0}")]
    UnknownComponent(String),

    #[error("Invalid angle value: {0}")]
    InvalidAngleValue(String),

    #[error("Angle {0} is out of range, must be between 0 and 180")]
    AngleOutOfRange(i64),

    #[error("Invalid syntax: {0}")]
    Syntax(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Command {
    /// Parse a command from a line of text.
    ///
    /// The input is trimmed and lower-cased before being split into tokens. This function never
    /// touches the hardware, and every malformed input is reported as a [`ParseError`].
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let normalised = raw.trim().to_lowercase();
        let tokens: Vec<&str> = normalised.split_whitespace().collect();

        let (&first, args) = match tokens.split_first() {
            Some(t) => t,
            None => return Err(ParseError::Empty),
        };

        match first {
            "wakeup" => no_args(Command::Activate, args),
            "home" => no_args(Command::Home, args),
            "state" => no_args(Command::QueryState, args),

            // Verbs from the earlier command set
            "rotate" => single_angle(JointId::Base, first, args),
            "raise" | "lower" => single_angle(JointId::Arm1, first, args),
            "grab" => no_args(claw_max(), args),
            "release" => no_args(claw_min(), args),

            name => {
                let joint = JointId::from_name(name)
                    .ok_or_else(|| ParseError::UnknownComponent(name.into()))?;

                parse_joint_cmd(joint, args)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Parse the arguments following a joint name.
fn parse_joint_cmd(joint: JointId, args: &[&str]) -> Result<Command, ParseError> {
    match (joint, args) {
        (JointId::Claw, ["open"]) => Ok(claw_max()),
        (JointId::Claw, ["close"]) => Ok(claw_min()),
        (_, [action, value]) => {
            let direction = match *action {
                "set" => None,
                "inc" => Some(AdjustDirection::Increase),
                "dec" => Some(AdjustDirection::Decrease),
                _ => return Err(syntax_error()),
            };

            let value = parse_angle(value)?;

            Ok(match direction {
                None => Command::SetAngle { joint, value },
                Some(direction) => Command::AdjustAngle {
                    joint,
                    direction,
                    magnitude: value,
                },
            })
        }
        _ => Err(syntax_error()),
    }
}

/// Parse `<verb> <angle>` commands which set one fixed joint.
fn single_angle(joint: JointId, verb: &str, args: &[&str]) -> Result<Command, ParseError> {
    match args {
        [value] => Ok(Command::SetAngle {
            joint,
            value: parse_angle(value)?,
        }),
        _ => Err(ParseError::Syntax(format!("expected `{} <0-180>`", verb))),
    }
}

/// Accept a command only if it has no arguments.
fn no_args(cmd: Command, args: &[&str]) -> Result<Command, ParseError> {
    if args.is_empty() {
        Ok(cmd)
    } else {
        Err(syntax_error())
    }
}

/// Parse an angle token, which must be an integer in `[0, 180]`.
fn parse_angle(token: &str) -> Result<u8, ParseError> {
    let value: i64 = token
        .parse()
        .map_err(|_| ParseError::InvalidAngleValue(token.into()))?;

    if value < MIN_ANGLE_DEG as i64 || value > MAX_ANGLE_DEG as i64 {
        return Err(ParseError::AngleOutOfRange(value));
    }

    Ok(value as u8)
}

/// The claw at its maximum angle (`claw open`, `grab`).
fn claw_max() -> Command {
    Command::SetAngle {
        joint: JointId::Claw,
        value: MAX_ANGLE_DEG,
    }
}

/// The claw at its minimum angle (`claw close`, `release`).
fn claw_min() -> Command {
    Command::SetAngle {
        joint: JointId::Claw,
        value: MIN_ANGLE_DEG,
    }
}

fn syntax_error() -> ParseError {
    ParseError::Syntax(GRAMMAR_HELP.into())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(Command::parse("wakeup"), Ok(Command::Activate));
        assert_eq!(Command::parse("  HOME \n"), Ok(Command::Home));
        assert_eq!(Command::parse("State"), Ok(Command::QueryState));
        assert_eq!(
            Command::parse("state now"),
            Err(ParseError::Syntax(GRAMMAR_HELP.into()))
        );
    }

    #[test]
    fn test_parse_joint_commands() {
        assert_eq!(
            Command::parse("base set 45"),
            Ok(Command::SetAngle {
                joint: JointId::Base,
                value: 45
            })
        );
        assert_eq!(
            Command::parse("ARM1   inc 200").unwrap_err(),
            ParseError::AngleOutOfRange(200)
        );
        assert_eq!(
            Command::parse("arm2 dec 0"),
            Ok(Command::AdjustAngle {
                joint: JointId::Arm2,
                direction: AdjustDirection::Decrease,
                magnitude: 0
            })
        );
        assert_eq!(
            Command::parse("wrist inc 180"),
            Ok(Command::AdjustAngle {
                joint: JointId::Wrist,
                direction: AdjustDirection::Increase,
                magnitude: 180
            })
        );
    }

    #[test]
    fn test_parse_claw() {
        assert_eq!(
            Command::parse("claw open"),
            Ok(Command::SetAngle {
                joint: JointId::Claw,
                value: 180
            })
        );
        assert_eq!(
            Command::parse("Claw Close"),
            Ok(Command::SetAngle {
                joint: JointId::Claw,
                value: 0
            })
        );
        assert_eq!(
            Command::parse("claw set 30"),
            Ok(Command::SetAngle {
                joint: JointId::Claw,
                value: 30
            })
        );
        // Open/close are only valid for the claw
        assert_eq!(
            Command::parse("wrist open"),
            Err(ParseError::Syntax(GRAMMAR_HELP.into()))
        );
    }

    #[test]
    fn test_parse_angle_errors() {
        assert_eq!(
            Command::parse("base set ninety"),
            Err(ParseError::InvalidAngleValue("ninety".into()))
        );
        assert_eq!(
            Command::parse("base set 12.5"),
            Err(ParseError::InvalidAngleValue("12.5".into()))
        );
        assert_eq!(
            Command::parse("base set -1"),
            Err(ParseError::AngleOutOfRange(-1))
        );
        assert_eq!(
            Command::parse("base set 181"),
            Err(ParseError::AngleOutOfRange(181))
        );
        assert_eq!(
            Command::parse("base set 99999999999999999999"),
            Err(ParseError::InvalidAngleValue("99999999999999999999".into()))
        );
    }

    #[test]
    fn test_parse_unknown_and_empty() {
        assert_eq!(Command::parse(""), Err(ParseError::Empty));
        assert_eq!(Command::parse("   \t "), Err(ParseError::Empty));
        assert_eq!(
            Command::parse("frobnicate"),
            Err(ParseError::UnknownComponent("frobnicate".into()))
        );
        assert!(Command::parse("")
            .unwrap_err()
            .to_string()
            .contains("Unknown command"));
        assert!(Command::parse("frobnicate")
            .unwrap_err()
            .to_string()
            .contains("Unknown command"));
    }

    #[test]
    fn test_parse_syntax_errors() {
        for line in &["base", "base set", "base move 10", "base set 10 20", "claw open wide"] {
            assert_eq!(
                Command::parse(line),
                Err(ParseError::Syntax(GRAMMAR_HELP.into())),
                "line: {}",
                line
            );
        }
    }

    #[test]
    fn test_parse_legacy_verbs() {
        assert_eq!(
            Command::parse("rotate 30"),
            Ok(Command::SetAngle {
                joint: JointId::Base,
                value: 30
            })
        );
        assert_eq!(
            Command::parse("lower 10"),
            Ok(Command::SetAngle {
                joint: JointId::Arm1,
                value: 10
            })
        );
        assert_eq!(
            Command::parse("grab"),
            Ok(Command::SetAngle {
                joint: JointId::Claw,
                value: 180
            })
        );
        assert_eq!(
            Command::parse("release"),
            Ok(Command::SetAngle {
                joint: JointId::Claw,
                value: 0
            })
        );
        // Out of range angles are never clamped
        assert_eq!(
            Command::parse("rotate 400"),
            Err(ParseError::AngleOutOfRange(400))
        );
        assert_eq!(
            Command::parse("raise"),
            Err(ParseError::Syntax("expected `raise <0-180>`".into()))
        );
    }
}
