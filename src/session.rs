//! Session state and key material
//!
//! A session exclusively owns its challenge and derived keys; they are
//! zeroized on drop and never reused across sessions.

use zeroize::Zeroize;

use crate::crypto::{CardKey, Challenge, KeyVersion, MasterKey, SessionKey};

/// Authentication state of a card session
///
/// States advance in order during [`authenticate`](crate::FelicaCard::authenticate);
/// any failure aborts the sequence where it stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No exchange has taken place yet
    Unauthenticated,
    /// The access service has been selected
    ServiceSelected,
    /// The random challenge has been written to the card
    ChallengeIssued,
    /// The identity, key version and MAC blocks have been read
    IdentityRead,
    /// The card's MAC matched the derived session key
    Authenticated,
    /// The card's MAC did not match the derived session key
    AuthenticationFailed,
}

/// Key material of an authenticated session
///
/// Holds the diversified card key, the session key and the challenge they
/// were derived from. Dropped (and zeroized) when the session ends or a new
/// authentication starts.
#[derive(Debug, Clone, Zeroize)]
#[zeroize(drop)]
pub struct SessionKeys {
    ck: CardKey,
    sk: SessionKey,
    rc: Challenge,
}

impl SessionKeys {
    pub(crate) const fn new(ck: CardKey, sk: SessionKey, rc: Challenge) -> Self {
        Self { ck, sk, rc }
    }

    /// The per-card diversified key
    pub const fn card_key(&self) -> &CardKey {
        &self.ck
    }

    /// The per-session key
    pub const fn session_key(&self) -> &SessionKey {
        &self.sk
    }

    /// The challenge this session was established with
    pub const fn challenge(&self) -> &Challenge {
        &self.rc
    }
}

/// Lookup of the master key for a card's key version
///
/// Receives the 2-byte key version tag read from the card and returns the
/// 24-byte master key, or `None` to decline — never a silent default. The
/// trait is implemented for closures, so a key table can be passed inline.
pub trait MasterKeyProvider {
    /// Return the master key for the given key version, if known
    fn lookup(&self, ckv: KeyVersion) -> Option<MasterKey>;
}

impl<F> MasterKeyProvider for F
where
    F: Fn(KeyVersion) -> Option<MasterKey>,
{
    fn lookup(&self, ckv: KeyVersion) -> Option<MasterKey> {
        self(ckv)
    }
}
