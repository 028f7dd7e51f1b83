//! Error types for FeliCa Lite-S operations

use bytes::Bytes;
use thiserror::Error;

use crate::{command::Block, crypto::KeyVersion, response::StatusWord, transport::TransportError};

/// Result type for FeliCa Lite-S operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for FeliCa Lite-S operations
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-related errors, fatal to the current operation
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The card returned the empty/NAK status; the caller may retry after
    /// re-presenting the card
    #[error("no response from card")]
    NoResponse,

    /// The card returned an unexpected status word
    #[error("unknown card status {status}: {}", hex::encode(.response))]
    UnknownStatus {
        /// Status word from the response trailer
        status: StatusWord,
        /// Raw response payload preceding the trailer
        response: Bytes,
    },

    /// A response had the wrong length
    #[error("invalid response length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected number of bytes
        expected: usize,
        /// Number of bytes received
        actual: usize,
    },

    /// Too many block addresses for a MAC-protected read
    #[error("MAC-protected reads cover 1 to 3 blocks, got {0}")]
    TooManyBlocks(usize),

    /// The key lookup declined the card's key version; the session halts
    /// before any key derivation
    #[error("no master key for key version {}", hex::encode(.ckv))]
    MasterKeyNotFound {
        /// Key version read from the card
        ckv: KeyVersion,
    },

    /// The computed MAC did not match the one returned by the card
    ///
    /// Carries the blocks that were read so the caller can decide whether to
    /// use the untrusted data.
    #[error("MAC verification failed")]
    MacMismatch {
        /// The blocks returned by the card, unverified
        blocks: Vec<Block>,
    },

    /// An authenticated operation was attempted without an established session
    #[error("card is not authenticated")]
    NotAuthenticated,
}
