//! FeliCa Lite-S card session
//!
//! [`FelicaCard`] drives the protocol over a [`CardTransport`]: service
//! selection, challenge issuance, identity read, key derivation and MAC
//! verification, then authenticated block reads and writes. One session owns
//! one card exclusively; no two commands are ever in flight at once.

use std::fmt;

use bytes::Bytes;
use rand::RngCore;
use tracing::{debug, trace, warn};

use crate::{
    command::{Block, Command},
    constants::{BLOCK_SIZE, MAX_MAC_READ_BLOCKS, block, service},
    crypto::{self, CardId, WriteCounter},
    error::{Error, Result},
    response::Response,
    session::{MasterKeyProvider, SessionKeys, SessionState},
    transport::CardTransport,
};

/// A FeliCa Lite-S card behind a command-response transport
pub struct FelicaCard<T: CardTransport> {
    transport: T,
    state: SessionState,
    id: Option<CardId>,
    keys: Option<SessionKeys>,
}

impl<T: CardTransport> fmt::Debug for FelicaCard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FelicaCard")
            .field("state", &self.state)
            .finish()
    }
}

impl<T: CardTransport> FelicaCard<T> {
    /// Create a new session over the given transport
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            state: SessionState::Unauthenticated,
            id: None,
            keys: None,
        }
    }

    /// Current authentication state
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// The card identity, available once the identity block has been read
    pub const fn id(&self) -> Option<&CardId> {
        self.id.as_ref()
    }

    /// The session key material, available once authenticated
    pub const fn keys(&self) -> Option<&SessionKeys> {
        self.keys.as_ref()
    }

    /// Consume the session, returning the transport
    ///
    /// Key material is zeroized on the way out.
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn execute(&mut self, command: &Command) -> Result<Bytes> {
        let response = self.transport.transmit(&command.to_bytes())?;
        Response::from_bytes(&response)?.into_payload()
    }

    /// Read a reader-level data object (UID, card type, ...)
    pub fn get_data(&mut self, tag: u8) -> Result<Bytes> {
        self.execute(&Command::get_data(tag))
    }

    /// Select the service code to use for subsequent block access
    pub fn select_service(&mut self, service: u16) -> Result<()> {
        self.execute(&Command::select_service(service))?;
        Ok(())
    }

    /// Send a raw FeliCa command through the transparent exchange
    pub fn transparent(&mut self, payload: &[u8]) -> Result<Bytes> {
        self.execute(&Command::transparent(payload))
    }

    /// Plain (unauthenticated) read of the given block addresses
    pub fn read(&mut self, addresses: &[u8]) -> Result<Vec<Block>> {
        let payload = self.execute(&Command::read_blocks(addresses))?;

        let expected = addresses.len() * BLOCK_SIZE;
        if payload.len() != expected {
            return Err(Error::InvalidLength {
                expected,
                actual: payload.len(),
            });
        }

        Ok(addresses
            .iter()
            .zip(payload.chunks_exact(BLOCK_SIZE))
            .map(|(&address, chunk)| {
                let mut data = [0u8; BLOCK_SIZE];
                data.copy_from_slice(chunk);
                Block::new(address, data)
            })
            .collect())
    }

    /// Plain (unauthenticated) write of the given blocks
    pub fn write(&mut self, blocks: &[Block]) -> Result<()> {
        self.execute(&Command::write_blocks(blocks))?;
        Ok(())
    }

    /// Perform mutual authentication with the card
    ///
    /// Selects the read-write service, writes a fresh random challenge,
    /// reads the identity, key version and MAC blocks, derives the card and
    /// session keys from the master key the provider returns, and verifies
    /// the card's MAC over the identity read.
    ///
    /// On [`Error::MasterKeyNotFound`] the card identity remains available
    /// through [`id`](Self::id) for identification-only use. A fresh
    /// challenge is generated on every call, retries included.
    pub fn authenticate<P: MasterKeyProvider>(&mut self, provider: &P) -> Result<()> {
        self.state = SessionState::Unauthenticated;
        self.keys = None;

        self.select_service(service::READ_WRITE)?;
        self.state = SessionState::ServiceSelected;
        trace!("read-write service selected");

        let mut rc = [0u8; 16];
        rand::rng().fill_bytes(&mut rc);
        self.write(&[Block::new(block::RC, rc)])?;
        self.state = SessionState::ChallengeIssued;
        trace!("challenge written to card");

        let blocks = self.read(&[block::ID, block::CKV, block::MAC_A])?;
        let id = blocks[0].data;
        self.id = Some(id);
        self.state = SessionState::IdentityRead;
        debug!(id = %hex::encode(id), "card identity read");

        let ckv = [blocks[1].data[0], blocks[1].data[1]];
        let Some(master_key) = provider.lookup(ckv) else {
            return Err(Error::MasterKeyNotFound { ckv });
        };

        let ck = crypto::derive_card_key(&master_key, &id);
        let sk = crypto::derive_session_key(&ck, &rc);

        let mac = crypto::read_mac(&sk, &rc, &blocks);
        if mac[..] != blocks[2].data[..8] {
            self.state = SessionState::AuthenticationFailed;
            warn!("card MAC did not match derived session key");
            return Err(Error::MacMismatch { blocks });
        }

        self.keys = Some(SessionKeys::new(ck, sk, rc));
        self.state = SessionState::Authenticated;
        debug!("card authenticated");
        Ok(())
    }

    /// Authenticated read of 1 to 3 block addresses
    ///
    /// Reads the given addresses plus the MAC register and verifies the
    /// card's MAC over the returned data. On a mismatch the blocks are
    /// returned inside [`Error::MacMismatch`] so the caller can decide
    /// whether to trust them.
    ///
    /// MAC comparison is a plain byte equality; the threat model is a
    /// physically presented card, not a remote timing adversary.
    pub fn read_with_mac(&mut self, addresses: &[u8]) -> Result<Vec<Block>> {
        if addresses.is_empty() || addresses.len() > MAX_MAC_READ_BLOCKS {
            return Err(Error::TooManyBlocks(addresses.len()));
        }
        if self.keys.is_none() {
            return Err(Error::NotAuthenticated);
        }

        let mut all = Vec::with_capacity(addresses.len() + 1);
        all.extend_from_slice(addresses);
        all.push(block::MAC_A);

        let blocks = self.read(&all)?;
        let keys = self.keys.as_ref().ok_or(Error::NotAuthenticated)?;

        let mac = crypto::read_mac(keys.session_key(), keys.challenge(), &blocks);
        let reported = &blocks[blocks.len() - 1].data[..8];
        if mac[..] == *reported {
            Ok(blocks)
        } else {
            warn!("MAC mismatch on authenticated read");
            Err(Error::MacMismatch { blocks })
        }
    }

    /// Authenticated write of a single block
    ///
    /// Reads the current write counter (MAC-verified), computes the write MAC
    /// binding the counter and target address to the data, and issues one
    /// write carrying the block together with the MAC register. The card
    /// validates the MAC and advances the counter itself; the counter is
    /// re-read before every write, so none is tracked locally.
    pub fn write_with_mac(&mut self, b: Block) -> Result<()> {
        let counter_blocks = self.read_with_mac(&[block::WCNT])?;
        let mut wcnt = WriteCounter::default();
        wcnt.copy_from_slice(&counter_blocks[0].data[..3]);

        let keys = self.keys.as_ref().ok_or(Error::NotAuthenticated)?;
        let mac = crypto::write_mac(keys.session_key(), keys.challenge(), &wcnt, &b);

        let mut mac_data = [0u8; BLOCK_SIZE];
        mac_data[..8].copy_from_slice(&mac);

        trace!(address = b.address, "authenticated write");
        self.write(&[b, Block::new(block::MAC_A, mac_data)])
    }
}
