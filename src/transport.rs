//! Card transport abstraction
//!
//! The crate never talks to a reader directly. All card communication goes
//! through [`CardTransport`], a synchronous exchange of one command frame for
//! one response frame (payload plus 2-byte status trailer). Reader and
//! connection management live behind this boundary.

use bytes::Bytes;
use thiserror::Error;
use tracing::trace;

/// Result type for transport operations
pub type TransportResult = Result<Bytes, TransportError>;

/// Error type for transport operations
#[derive(Debug, Error)]
pub enum TransportError {
    /// The command could not be transmitted
    #[error("failed to transmit command to the card")]
    Transmission,

    /// The card or reader connection was lost
    #[error("card connection lost")]
    Connection,

    /// Device-specific error
    #[error("transport device error: {0}")]
    Device(&'static str),
}

/// Synchronous command-response exchange with a physically present card
///
/// Implementations exchange exactly one command at a time; the card has no
/// pipelining. The returned bytes must include the 2-byte status trailer.
pub trait CardTransport {
    /// Perform the raw exchange
    fn do_transmit(&mut self, command: &[u8]) -> TransportResult;

    /// Transmit a command, tracing the frames on the wire
    fn transmit(&mut self, command: &[u8]) -> TransportResult {
        trace!(command = %hex::encode(command), "transmit");
        let response = self.do_transmit(command)?;
        trace!(response = %hex::encode(&response), "response");
        Ok(response)
    }
}
