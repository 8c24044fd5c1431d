//! # Equipment Interface
//!
//! This module defines the joints of the claw arm and the state snapshot which is reported back to
//! clients.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Minimum angle any joint can be commanded to.
///
/// Units: degrees
pub const MIN_ANGLE_DEG: u8 = 0;

/// Maximum angle any joint can be commanded to.
///
/// Units: degrees
pub const MAX_ANGLE_DEG: u8 = 180;

/// Separator placed between `name:angle` pairs in a state snapshot. A separator is always written
/// after the last pair as well.
pub const STATE_PAIR_SEPARATOR: char = ';';

/// Separator between the joint name and its angle in a state snapshot.
pub const STATE_VALUE_SEPARATOR: char = ':';

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Snapshot of the commanded angle of every joint, in registry order.
///
/// The text form is `base:90;arm1:90;arm2:90;wrist:90;claw:0;`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct JointState {
    pub angles_deg: Vec<(JointId, u8)>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of all joints on the claw arm.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
#[serde(rename_all = "lowercase")]
pub enum JointId {
    Base,
    Arm1,
    Arm2,
    Wrist,
    Claw,
}

/// Errors which can occur when reading a state snapshot back from text.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum StateParseError {
    #[error("State entry `{0}` is not of the form `name:angle`")]
    MalformedEntry(String),

    #[error("Unknown joint `{0}` in state")]
    UnknownJoint(String),

    #[error("Invalid angle `{0}` in state")]
    InvalidAngle(String),

    #[error("State does not end with `{}`", STATE_PAIR_SEPARATOR)]
    MissingTerminator,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl JointId {
    /// All joints in their default declaration order.
    pub const ALL: [JointId; 5] = [
        JointId::Base,
        JointId::Arm1,
        JointId::Arm2,
        JointId::Wrist,
        JointId::Claw,
    ];

    /// The name of the joint as used in commands and state snapshots.
    pub fn name(&self) -> &'static str {
        match self {
            JointId::Base => "base",
            JointId::Arm1 => "arm1",
            JointId::Arm2 => "arm2",
            JointId::Wrist => "wrist",
            JointId::Claw => "claw",
        }
    }

    /// Find the joint with the given (lower case) name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|j| j.name() == name)
    }

    /// Angle of the joint in the neutral (home) pose.
    ///
    /// The claw's neutral is released (0), all other joints sit at the middle of their range.
    pub fn neutral_deg(&self) -> u8 {
        match self {
            JointId::Claw => MIN_ANGLE_DEG,
            _ => 90,
        }
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl JointState {
    /// Get the angle of the given joint, if it is part of the snapshot.
    pub fn get(&self, joint: JointId) -> Option<u8> {
        self.angles_deg
            .iter()
            .find(|(id, _)| *id == joint)
            .map(|(_, angle)| *angle)
    }
}

impl fmt::Display for JointState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, angle) in self.angles_deg.iter() {
            write!(
                f,
                "{}{}{}{}",
                id, STATE_VALUE_SEPARATOR, angle, STATE_PAIR_SEPARATOR
            )?;
        }
        Ok(())
    }
}

impl FromStr for JointState {
    type Err = StateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        // An empty registry produces an empty snapshot
        if s.is_empty() {
            return Ok(Self::default());
        }

        let body = s
            .strip_suffix(STATE_PAIR_SEPARATOR)
            .ok_or(StateParseError::MissingTerminator)?;

        let mut angles_deg = Vec::new();

        for entry in body.split(STATE_PAIR_SEPARATOR) {
            let mut parts = entry.splitn(2, STATE_VALUE_SEPARATOR);

            let (name, angle) = match (parts.next(), parts.next()) {
                (Some(n), Some(a)) => (n, a),
                _ => return Err(StateParseError::MalformedEntry(entry.into())),
            };

            let id = JointId::from_name(name)
                .ok_or_else(|| StateParseError::UnknownJoint(name.into()))?;

            let angle: u8 = match angle.parse() {
                Ok(a) if a <= MAX_ANGLE_DEG => a,
                _ => return Err(StateParseError::InvalidAngle(angle.into())),
            };

            angles_deg.push((id, angle));
        }

        Ok(Self { angles_deg })
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
