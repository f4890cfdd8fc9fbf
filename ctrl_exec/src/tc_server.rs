//! # Operator command intake
//!
//! Binds a SUB socket on the wireless channel and drains any commands the
//! operator console has published. Malformed packets are dropped without a
//! response, commands carry no acknowledgement.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use thiserror::Error;

use comms_if::cmd::Cmd;
use comms_if::net::{self, zmq, NetError, SocketOptions};

use crate::params::CtrlExecParams;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// The operator command intake.
pub struct TcServer {
    socket: zmq::Socket,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Errors which can occur in the command intake.
#[derive(Debug, Error)]
pub enum TcServerError {
    #[error("Could not create the command socket: {0}")]
    SocketError(NetError),

    #[error("Could not receive on the command socket: {0}")]
    RecvError(zmq::Error),
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl TcServer {
    pub fn new(ctx: &zmq::Context, params: &CtrlExecParams) -> Result<Self, TcServerError> {
        let socket = net::new_socket(
            ctx,
            zmq::SUB,
            SocketOptions {
                bind: true,
                // Return EAGAIN immediately when there is nothing pending
                recv_timeout: 0,
                subscribe: Some(String::new()),
                ..Default::default()
            },
            &params.cmd_endpoint,
        )
        .map_err(TcServerError::SocketError)?;

        Ok(TcServer { socket })
    }

    /// Receive the next pending command, or `None` if there is nothing
    /// pending. Malformed packets are skipped.
    pub fn recv_cmd(&self) -> Result<Option<Cmd>, TcServerError> {
        loop {
            match self.socket.recv_string(0) {
                Ok(Ok(packet)) => match Cmd::from_json(&packet) {
                    Ok(cmd) => return Ok(Some(cmd)),
                    Err(e) => {
                        debug!("Dropping malformed command packet: {}", e);
                        continue;
                    }
                },
                Ok(Err(_)) => {
                    debug!("Dropping non-UTF8 command packet");
                    continue;
                }
                Err(zmq::Error::EAGAIN) => return Ok(None),
                Err(e) => return Err(TcServerError::RecvError(e)),
            }
        }
    }
}
