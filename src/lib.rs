//! FeliCa Lite-S mutual authentication and block integrity
//!
//! This crate implements the authentication protocol of the FeliCa Lite-S
//! contactless card family: per-card key diversification from a master key
//! and the card's factory identity, per-session key derivation from a fresh
//! random challenge, and MAC computation and verification over block reads
//! and writes.
//!
//! Card communication goes through the [`CardTransport`] trait, a synchronous
//! command-response exchange; reader discovery, connection lifecycle and
//! card-presence polling belong to the transport implementation, not to this
//! crate. Master keys are supplied per session through [`MasterKeyProvider`],
//! keyed by the 2-byte key version read from the card.
//!
//! ```no_run
//! use felica_lite::{Bytes, CardTransport, FelicaCard, TransportError, constants::block};
//! use felica_lite::crypto::{KeyVersion, MasterKey};
//! # struct Reader;
//! # impl CardTransport for Reader {
//! #     fn do_transmit(&mut self, _command: &[u8]) -> Result<Bytes, TransportError> {
//! #         Err(TransportError::Connection)
//! #     }
//! # }
//!
//! let mut card = FelicaCard::new(Reader);
//! card.authenticate(&|ckv: KeyVersion| -> Option<MasterKey> {
//!     (ckv == [0x00, 0x00]).then_some(*b"xNhAMv2J4bAW86Nddq8WDizc")
//! })?;
//!
//! let blocks = card.read_with_mac(&[block::S_PAD0])?;
//! # Ok::<(), felica_lite::Error>(())
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

pub mod card;
pub mod command;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod response;
pub mod session;
pub mod transport;

pub use card::FelicaCard;
pub use command::{Block, BlockData, Command};
pub use error::{Error, Result};
pub use response::{Response, StatusWord};
pub use session::{MasterKeyProvider, SessionKeys, SessionState};
pub use transport::{CardTransport, TransportError};
