//! # Telemetry server
//!
//! Publishes one telemetry packet per telemetry tick on the wireless
//! channel, whether or not anything changed and whether or not any console
//! is listening.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use thiserror::Error;

use comms_if::net::{self, zmq, NetError, SocketOptions};
use comms_if::telem::TmPacket;

use crate::data_store::DataStore;
use crate::params::CtrlExecParams;
use crate::relay_client::LinkHealth;

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// The telemetry server.
pub struct TmServer {
    socket: zmq::Socket,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Errors which can occur in the telemetry server.
#[derive(Debug, Error)]
pub enum TmServerError {
    #[error("Could not create the telemetry socket: {0}")]
    SocketError(NetError),

    #[error("Could not send the telemetry packet: {0}")]
    SendError(zmq::Error),
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl TmServer {
    pub fn new(ctx: &zmq::Context, params: &CtrlExecParams) -> Result<Self, TmServerError> {
        let socket = net::new_socket(
            ctx,
            zmq::PUB,
            SocketOptions {
                bind: true,
                send_timeout: 0,
                ..Default::default()
            },
            &params.tm_endpoint,
        )
        .map_err(TmServerError::SocketError)?;

        Ok(TmServer { socket })
    }

    /// Build a packet from the data store and publish it.
    pub fn send(&self, ds: &DataStore) -> Result<(), TmServerError> {
        let packet = TmPacket {
            distance_cm: ds.last_reading.distance_cm,
            gas_level: ds.last_reading.gas_level,
            battery_voltage: ds.battery_voltage,
            emergency: ds.safety.latched,
            front_link_ok: ds.link_health == LinkHealth::Ok,
            auto_enabled: ds.auto_enabled,
        };

        self.socket
            .send(&packet.to_json(), 0)
            .map_err(TmServerError::SendError)
    }
}
