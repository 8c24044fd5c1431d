//! # Claw Server Module
//!
//! This module abstracts over the networking side of the claw executable. Each UDP datagram holds
//! one text command, and the response is sent back to the address the datagram came from.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::Response;
use log::debug;
use std::{
    io,
    net::{SocketAddr, UdpSocket},
    time::Duration,
};

use crate::{executor::ClawCtrl, params::ClawExecParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An abstraction over the command socket of the claw executable.
pub struct ClawServer {
    socket: UdpSocket,

    recv_buf: Vec<u8>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur in the [`ClawServer`]
#[derive(thiserror::Error, Debug)]
pub enum ClawServerError {
    #[error("Could not bind the socket to {0}: {1}")]
    BindError(String, io::Error),

    #[error("Could not set socket option: {0}")]
    SocketOptionError(io::Error),

    #[error("Could not recieve a command: {0}")]
    RecvError(io::Error),

    #[error("Could not send the response to {0}: {1}")]
    SendError(SocketAddr, io::Error),

    #[error("{0} sent a command which was not valid UTF-8")]
    NonUtf8Command(SocketAddr),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ClawServer {
    /// Create a new instance of the claw server from the executable parameters.
    pub fn new(params: &ClawExecParams) -> Result<Self, ClawServerError> {
        Self::bind(
            &params.bind_address,
            Some(Duration::from_millis(params.recv_timeout_ms)),
            params.max_datagram_len,
        )
    }

    /// Bind the command socket.
    ///
    /// ## Arguments
    /// - `address` - Local address to bind to
    /// - `recv_timeout` - Maximum time [`ClawServer::recv_command`] blocks for, `None` blocks
    ///   forever
    /// - `max_datagram_len` - Size of the receive buffer
    pub fn bind(
        address: &str,
        recv_timeout: Option<Duration>,
        max_datagram_len: usize,
    ) -> Result<Self, ClawServerError> {
        let socket = UdpSocket::bind(address)
            .map_err(|e| ClawServerError::BindError(address.into(), e))?;

        socket
            .set_read_timeout(recv_timeout.filter(|t| !t.is_zero()))
            .map_err(ClawServerError::SocketOptionError)?;

        Ok(Self {
            socket,
            recv_buf: vec![0; max_datagram_len.max(1)],
        })
    }

    /// Address the server is listening on.
    pub fn local_addr(&self) -> Result<SocketAddr, ClawServerError> {
        self.socket
            .local_addr()
            .map_err(ClawServerError::SocketOptionError)
    }

    /// Receive a single command.
    ///
    /// `Ok(None)` is returned if nothing arrived within the receive timeout. If the datagram is not
    /// valid UTF-8 the error response is sent by this function and an error returned.
    pub fn recv_command(&mut self) -> Result<Option<(String, SocketAddr)>, ClawServerError> {
        let (len, source) = match self.socket.recv_from(&mut self.recv_buf) {
            Ok(r) => r,
            Err(e) if is_timeout(&e) => return Ok(None),
            Err(e) => return Err(ClawServerError::RecvError(e)),
        };

        match std::str::from_utf8(&self.recv_buf[..len]) {
            Ok(s) => Ok(Some((s.to_string(), source))),
            Err(_) => {
                let err = ClawServerError::NonUtf8Command(source);
                self.send_response(&Response::err(&err), source)?;
                Err(err)
            }
        }
    }

    /// Send the response to a command back to its source.
    pub fn send_response(
        &self,
        response: &Response,
        dest: SocketAddr,
    ) -> Result<(), ClawServerError> {
        self.socket
            .send_to(&response.to_bytes(), dest)
            .map(|_| ())
            .map_err(|e| ClawServerError::SendError(dest, e))
    }

    /// Receive one command, execute it and reply.
    ///
    /// Returns `Ok(false)` if no command arrived within the receive timeout.
    pub fn serve_one(&mut self, ctrl: &mut ClawCtrl) -> Result<bool, ClawServerError> {
        let (cmd, source) = match self.recv_command()? {
            Some(c) => c,
            None => return Ok(false),
        };

        debug!("Recieved {:?} from {}", cmd, source);

        let response = ctrl.handle(&cmd);

        self.send_response(&response, source)?;

        Ok(true)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Read timeouts are reported as `WouldBlock` on unix and `TimedOut` on windows.
fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
