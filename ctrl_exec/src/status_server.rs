//! # Status server
//!
//! Answers status requests on a REP socket with a fixed identification
//! payload. The reply content does not depend on the request, any request
//! line counts as a ping.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use thiserror::Error;

use comms_if::net::{self, zmq, NetError, SocketOptions};
use util::session;

use crate::params::CtrlExecParams;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// The status server.
pub struct StatusServer {
    socket: zmq::Socket,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Errors which can occur in the status server.
#[derive(Debug, Error)]
pub enum StatusServerError {
    #[error("Could not create the status socket: {0}")]
    SocketError(NetError),

    #[error("Could not reply to the status request: {0}")]
    SendError(zmq::Error),

    #[error("Could not receive on the status socket: {0}")]
    RecvError(zmq::Error),
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl StatusServer {
    pub fn new(ctx: &zmq::Context, params: &CtrlExecParams) -> Result<Self, StatusServerError> {
        let socket = net::new_socket(
            ctx,
            zmq::REP,
            SocketOptions {
                bind: true,
                recv_timeout: 0,
                send_timeout: 0,
                ..Default::default()
            },
            &params.status_endpoint,
        )
        .map_err(StatusServerError::SocketError)?;

        Ok(StatusServer { socket })
    }

    /// Answer a pending status request, if there is one.
    pub fn poll(&self) -> Result<(), StatusServerError> {
        match self.socket.recv_string(0) {
            Ok(_) => {
                let reply = format!(
                    "{{\"status\":\"online\",\"version\":\"{}\",\"uptime_s\":{:.1}}}",
                    env!("CARGO_PKG_VERSION"),
                    session::get_elapsed_seconds()
                );

                self.socket
                    .send(&reply, 0)
                    .map_err(StatusServerError::SendError)
            }
            Err(zmq::Error::EAGAIN) => Ok(()),
            Err(e) => Err(StatusServerError::RecvError(e)),
        }
    }
}
