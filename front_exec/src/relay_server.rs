//! # Serial relay server
//!
//! The front node's end of the point-to-point serial link: receives demand
//! lines from the master and sends the periodic liveness line back.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::io::{Read, Write};
use std::time::Duration;

use log::{debug, warn};
use serialport::SerialPort;
use thiserror::Error;

use comms_if::relay::{LineBuffer, LivenessMsg, RelayMsg};

use crate::params::FrontExecParams;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Serial read timeout. Short so the main loop never stalls on the port.
const READ_TIMEOUT: Duration = Duration::from_millis(10);

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// The serial relay server.
pub struct RelayServer {
    port: Box<dyn SerialPort>,
    lines: LineBuffer,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Errors which can occur on the relay link.
#[derive(Debug, Error)]
pub enum RelayServerError {
    #[error("Could not open the serial device: {0}")]
    OpenError(serialport::Error),

    #[error("Could not write to the serial device: {0}")]
    SendError(std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl RelayServer {
    /// Open the serial device named in the parameters.
    pub fn new(params: &FrontExecParams) -> Result<Self, RelayServerError> {
        let port = serialport::new(&params.serial_device, params.serial_baud)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(RelayServerError::OpenError)?;

        Ok(RelayServer {
            port,
            lines: LineBuffer::new(),
        })
    }

    /// Receive the next pending demand line, or `None` if there is nothing
    /// pending. Malformed lines are dropped with a debug log.
    pub fn recv_msg(&mut self) -> Option<RelayMsg> {
        self.fill_buffer();

        while let Some(line) = self.lines.next_line() {
            match RelayMsg::from_json(&line) {
                Ok(msg) => return Some(msg),
                Err(e) => debug!("Dropping malformed demand line: {}", e),
            }
        }

        None
    }

    /// Send the liveness line to the master.
    pub fn send_liveness(&mut self, msg: &LivenessMsg) -> Result<(), RelayServerError> {
        let mut line = msg.to_json();
        line.push('\n');

        self.port
            .write_all(line.as_bytes())
            .map_err(RelayServerError::SendError)
    }

    /// Pull whatever the port has pending into the line buffer.
    fn fill_buffer(&mut self) {
        let available = match self.port.bytes_to_read() {
            Ok(n) => n as usize,
            Err(e) => {
                warn!("Could not query the serial device: {}", e);
                return;
            }
        };

        if available == 0 {
            return;
        }

        let mut chunk = vec![0u8; available];
        match self.port.read(&mut chunk) {
            Ok(n) => self.lines.push_bytes(&chunk[..n]),
            Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => (),
            Err(e) => warn!("Could not read from the serial device: {}", e),
        }
    }
}
