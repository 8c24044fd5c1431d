//! # Command responses

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Payload returned by every successful command which does not query state.
pub const OK_PAYLOAD: &str = "OK";

/// Prefix placed before the message of an error response.
pub const ERROR_PREFIX: &str = "Error: ";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The response sent back to a client for each command.
///
/// On the wire `Ok(payload)` is sent as the bare payload, `Err(message)` as `Error: <message>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Response {
    Ok(String),
    Err(String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Response {
    /// The plain `OK` response.
    pub fn ok() -> Self {
        Response::Ok(OK_PAYLOAD.into())
    }

    /// Build an error response from anything which can be displayed, usually an error type.
    pub fn err<E: fmt::Display>(e: E) -> Self {
        Response::Err(e.to_string())
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok(_))
    }

    /// Encode the response into the bytes sent to the client.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// Decode a response received from the server.
    ///
    /// Any text starting with the error prefix is an error, everything else is a success payload.
    pub fn from_text(text: &str) -> Self {
        match text.strip_prefix(ERROR_PREFIX) {
            Some(msg) => Response::Err(msg.into()),
            None => Response::Ok(text.into()),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Ok(payload) => f.write_str(payload),
            Response::Err(msg) => write!(f, "{}{}", ERROR_PREFIX, msg),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
