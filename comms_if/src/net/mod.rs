//! # Network Module
//!
//! This module provides networking abstractions over ZMQ, the library used
//! for the wireless operator channel (command intake, telemetry publication
//! and the status endpoint).

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use zmq::{Context, Socket, SocketType};

// Export zmq
pub use zmq;

// ------------------------------------------------------------------------------------------------
// MACROS
// ------------------------------------------------------------------------------------------------

macro_rules! set_sockopts {
    ($socket:expr, $(($opt:ident, $val:expr)),+) => {
        $(
            $socket.$opt($val)
                .map_err(|e| NetError::SocketOptionError(stringify!($opt).into(), e))?;
        )+
    };
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Represents options which can be set on a socket.
///
/// Most options here correspond to those found in the
/// [`zmq_setsockopt`](http://api.zeromq.org/4-2:zmq-setsockopt) documentation.
pub struct SocketOptions {
    /// Indicates if the socket should bind itself to the endpoint. Servers
    /// should have this value set as `true`, clients should have it set as
    /// `false`.
    ///
    /// The default value is `false`.
    pub bind: bool,

    /// `ZMQ_LINGER`: Set linger period for socket shutdown
    pub linger: i32,

    /// `ZMQ_RCVTIMEO`: Maximum time before a recv operation returns with `EAGAIN`
    pub recv_timeout: i32,

    /// `ZMQ_SNDTIMEO`: Maximum time before a send operation returns with `EAGAIN`
    pub send_timeout: i32,

    /// Subscription prefix, applied to SUB sockets only. An empty string
    /// subscribes to everything.
    pub subscribe: Option<String>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum NetError {
    #[error("Error creating the socket: {0}")]
    CreateSocketError(zmq::Error),

    #[error("Could not connect the socket: {0}")]
    CouldNotConnect(zmq::Error),

    #[error("Could not set the {0} socket option: {1}")]
    SocketOptionError(String, zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Create a new socket of the given type, apply the options and connect or
/// bind it to its endpoint.
///
/// ## Arguments
/// - `ctx`: the zmq context which will be used to create the socket
/// - `socket_type`: the type of zmq socket to create
/// - `socket_options`: a [`SocketOptions`] struct specifying how to configure
///   the socket
/// - `endpoint`: a zmq endpoint string, such as `"tcp://*:5021"`
pub fn new_socket(
    ctx: &Context,
    socket_type: SocketType,
    socket_options: SocketOptions,
    endpoint: &str,
) -> Result<Socket, NetError> {
    // Create socket
    let socket = ctx
        .socket(socket_type)
        .map_err(NetError::CreateSocketError)?;

    // Set the options on the socket
    set_sockopts!(
        socket,
        (set_linger, socket_options.linger),
        (set_rcvtimeo, socket_options.recv_timeout),
        (set_sndtimeo, socket_options.send_timeout)
    );

    // Apply the subscription if this is a SUB socket
    if let (SocketType::SUB, Some(prefix)) = (socket_type, &socket_options.subscribe) {
        socket
            .set_subscribe(prefix.as_bytes())
            .map_err(|e| NetError::SocketOptionError("set_subscribe".into(), e))?;
    }

    // Connect or bind the socket to its endpoint
    match socket_options.bind {
        false => socket.connect(endpoint),
        true => socket.bind(endpoint),
    }
    .map_err(NetError::CouldNotConnect)?;

    Ok(socket)
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SocketOptions {
    fn default() -> Self {
        // Defaults for sockopts taken from http://api.zeromq.org/4-2:zmq-setsockopt
        Self {
            bind: false,
            linger: 30_000,
            recv_timeout: -1,
            send_timeout: 0,
            subscribe: None,
        }
    }
}
