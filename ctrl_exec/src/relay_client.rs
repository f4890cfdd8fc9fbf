//! # Serial relay client
//!
//! Drives the point-to-point serial link to the front node: sends one speed
//! demand line per control tick and watches the returning liveness lines to
//! judge link health.
//!
//! The link carries newline-delimited JSON in both directions. Outbound
//! lines are fire-and-forget, the front node's own command timeout covers
//! loss. Inbound lines are only scanned for the liveness marker.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::io::{Read, Write};
use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use serialport::SerialPort;
use thiserror::Error;

use comms_if::drive::TargetSpeeds;
use comms_if::relay::{LineBuffer, RelayMsg, LIVENESS_MARKER};

use crate::params::CtrlExecParams;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Serial read timeout. Short so the main loop never stalls on the port.
const READ_TIMEOUT: Duration = Duration::from_millis(10);

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Health of the serial link to the front node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkHealth {
    /// No liveness line has ever arrived.
    Unknown,

    /// A liveness line arrived within the stale window.
    Ok,

    /// Liveness lines have stopped arriving.
    Stale,
}

/// Errors which can occur on the relay link.
#[derive(Debug, Error)]
pub enum RelayClientError {
    #[error("Could not open the serial device: {0}")]
    OpenError(serialport::Error),

    #[error("Could not write to the serial device: {0}")]
    SendError(std::io::Error),
}

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Tracks when the last liveness line arrived and classifies the link.
///
/// Kept separate from the port handling so the staleness logic is testable
/// without a serial device.
pub struct LinkMonitor {
    last_liveness: Option<Instant>,
    stale_after: Duration,
}

/// The serial relay client.
pub struct RelayClient {
    port: Box<dyn SerialPort>,
    lines: LineBuffer,
    monitor: LinkMonitor,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl LinkMonitor {
    pub fn new(stale_after: Duration) -> Self {
        LinkMonitor {
            last_liveness: None,
            stale_after,
        }
    }

    /// Record a liveness line arriving now.
    pub fn on_liveness(&mut self, now: Instant) {
        self.last_liveness = Some(now);
    }

    /// Classify the link at the given time.
    pub fn health(&self, now: Instant) -> LinkHealth {
        match self.last_liveness {
            None => LinkHealth::Unknown,
            Some(t) if now.duration_since(t) > self.stale_after => LinkHealth::Stale,
            Some(_) => LinkHealth::Ok,
        }
    }
}

impl RelayClient {
    /// Open the serial device named in the parameters.
    pub fn new(params: &CtrlExecParams) -> Result<Self, RelayClientError> {
        let port = serialport::new(&params.serial_device, params.serial_baud)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(RelayClientError::OpenError)?;

        Ok(RelayClient {
            port,
            lines: LineBuffer::new(),
            monitor: LinkMonitor::new(Duration::from_millis(params.link_stale_timeout_ms)),
        })
    }

    /// Send the front-node subset of the target speeds as one line.
    pub fn send_speeds(&mut self, targets: &TargetSpeeds) -> Result<(), RelayClientError> {
        let mut line = RelayMsg::from_targets(targets).to_json();
        line.push('\n');

        self.port
            .write_all(line.as_bytes())
            .map_err(RelayClientError::SendError)
    }

    /// Drain the inbound side of the link and record any liveness lines.
    ///
    /// Anything that is not a liveness line is dropped with a debug log, the
    /// front node sends nothing else the master acts on.
    pub fn poll_liveness(&mut self, now: Instant) {
        let available = match self.port.bytes_to_read() {
            Ok(n) => n as usize,
            Err(e) => {
                warn!("Could not query the serial device: {}", e);
                return;
            }
        };

        if available > 0 {
            let mut chunk = vec![0u8; available];
            match self.port.read(&mut chunk) {
                Ok(n) => self.lines.push_bytes(&chunk[..n]),
                Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => (),
                Err(e) => warn!("Could not read from the serial device: {}", e),
            }
        }

        while let Some(line) = self.lines.next_line() {
            if line.contains(LIVENESS_MARKER) {
                trace!("Liveness line from front node: {}", line);
                self.monitor.on_liveness(now);
            } else {
                debug!("Dropping unrecognised line from front node: {}", line);
            }
        }
    }

    /// Classify the link at the given time.
    pub fn health(&self, now: Instant) -> LinkHealth {
        self.monitor.health(now)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_is_unknown_before_first_liveness() {
        let monitor = LinkMonitor::new(Duration::from_millis(3000));
        assert_eq!(monitor.health(Instant::now()), LinkHealth::Unknown);
    }

    #[test]
    fn link_goes_stale_after_the_window() {
        let mut monitor = LinkMonitor::new(Duration::from_millis(3000));
        let t0 = Instant::now();

        monitor.on_liveness(t0);
        assert_eq!(monitor.health(t0), LinkHealth::Ok);
        assert_eq!(
            monitor.health(t0 + Duration::from_millis(3000)),
            LinkHealth::Ok
        );
        assert_eq!(
            monitor.health(t0 + Duration::from_millis(3001)),
            LinkHealth::Stale
        );
    }

    #[test]
    fn liveness_recovers_a_stale_link() {
        let mut monitor = LinkMonitor::new(Duration::from_millis(3000));
        let t0 = Instant::now();

        monitor.on_liveness(t0);
        let later = t0 + Duration::from_millis(5000);
        assert_eq!(monitor.health(later), LinkHealth::Stale);

        monitor.on_liveness(later);
        assert_eq!(monitor.health(later), LinkHealth::Ok);
    }
}
