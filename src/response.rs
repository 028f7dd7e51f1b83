//! Response parsing and status word classification
//!
//! Every exchange ends with a 2-byte status trailer. Interpretation is
//! centralized here: `90 00` is success, `64 01` means the card did not
//! respond, anything else is surfaced as an unknown status together with the
//! raw payload.

use std::fmt;

use bytes::Bytes;

use crate::{
    constants::status,
    error::{Error, Result},
};

/// 2-byte status word from a response trailer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusWord {
    /// First status byte
    pub sw1: u8,
    /// Second status byte
    pub sw2: u8,
}

impl StatusWord {
    /// Create a new status word
    pub const fn new(sw1: u8, sw2: u8) -> Self {
        Self { sw1, sw2 }
    }

    /// Whether this status word indicates success
    pub fn is_success(self) -> bool {
        self == status::SUCCESS
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}", self.sw1, self.sw2)
    }
}

/// A parsed card response: payload plus status word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    payload: Bytes,
    status: StatusWord,
}

impl Response {
    /// Split raw response bytes into payload and status trailer
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 2 {
            return Err(Error::InvalidLength {
                expected: 2,
                actual: bytes.len(),
            });
        }

        let (payload, trailer) = bytes.split_at(bytes.len() - 2);
        Ok(Self {
            payload: Bytes::copy_from_slice(payload),
            status: StatusWord::new(trailer[0], trailer[1]),
        })
    }

    /// The status word
    pub const fn status(&self) -> StatusWord {
        self.status
    }

    /// The response payload (without the status trailer)
    pub const fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Consume the response, classifying the status
    ///
    /// Returns the payload on success, [`Error::NoResponse`] on the empty/NAK
    /// status and [`Error::UnknownStatus`] otherwise.
    pub fn into_payload(self) -> Result<Bytes> {
        if self.status == status::SUCCESS {
            Ok(self.payload)
        } else if self.status == status::NO_RESPONSE {
            Err(Error::NoResponse)
        } else {
            Err(Error::UnknownStatus {
                status: self.status,
                response: self.payload,
            })
        }
    }
}
