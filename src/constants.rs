//! Constants used by the FeliCa Lite-S protocol
//!
//! This module contains the pseudo-APDU class and instruction bytes used by
//! PC/SC readers to tunnel FeliCa operations, the card's block address map,
//! the service codes and status words.

/// Command classes
pub mod cla {
    /// PC/SC pseudo-APDU class used for contactless storage card operations
    pub const PSEUDO_APDU: u8 = 0xFF;
}

/// Instruction codes
pub mod ins {
    /// GET DATA (reader-level data objects such as the UID)
    pub const GET_DATA: u8 = 0xCA;
    /// READ BINARY (block read)
    pub const READ_BINARY: u8 = 0xB0;
    /// UPDATE BINARY (block write)
    pub const UPDATE_BINARY: u8 = 0xD6;
    /// SELECT (service selection)
    pub const SELECT: u8 = 0xA4;
    /// Transparent exchange (raw FeliCa command encapsulation)
    pub const TRANSPARENT: u8 = 0xFE;
}

/// Block addresses of the FeliCa Lite-S register map
pub mod block {
    /// Scratch pad block 0
    pub const S_PAD0: u8 = 0x00;
    /// Scratch pad block 1
    pub const S_PAD1: u8 = 0x01;
    /// Scratch pad block 2
    pub const S_PAD2: u8 = 0x02;
    /// Scratch pad block 3
    pub const S_PAD3: u8 = 0x03;
    /// Scratch pad block 4
    pub const S_PAD4: u8 = 0x04;
    /// Scratch pad block 5
    pub const S_PAD5: u8 = 0x05;
    /// Scratch pad block 6
    pub const S_PAD6: u8 = 0x06;
    /// Scratch pad block 7
    pub const S_PAD7: u8 = 0x07;
    /// Scratch pad block 8
    pub const S_PAD8: u8 = 0x08;
    /// Scratch pad block 9
    pub const S_PAD9: u8 = 0x09;
    /// Scratch pad block 10
    pub const S_PAD10: u8 = 0x0A;
    /// Scratch pad block 11
    pub const S_PAD11: u8 = 0x0B;
    /// Scratch pad block 12
    pub const S_PAD12: u8 = 0x0C;
    /// Scratch pad block 13
    pub const S_PAD13: u8 = 0x0D;
    /// Increment/decrement register
    pub const REG: u8 = 0x0E;
    /// Random challenge register
    pub const RC: u8 = 0x80;
    /// MAC register (MAC over plain reads)
    pub const MAC: u8 = 0x81;
    /// Card identity block
    pub const ID: u8 = 0x82;
    /// Device identity block
    pub const D_ID: u8 = 0x83;
    /// Service code block
    pub const SER_C: u8 = 0x84;
    /// System code block
    pub const SYS_C: u8 = 0x85;
    /// Card key version block
    pub const CKV: u8 = 0x86;
    /// Card key block (write-only on the card)
    pub const CK: u8 = 0x87;
    /// Memory configuration block
    pub const MC: u8 = 0x88;
    /// Write counter block
    pub const WCNT: u8 = 0x90;
    /// MAC register for authenticated reads and writes
    pub const MAC_A: u8 = 0x91;
    /// State register (external authentication status)
    pub const STATE: u8 = 0x92;
    /// CRC check block
    pub const CRC_CHECK: u8 = 0xA0;
}

/// Service codes selecting the access mode
pub mod service {
    /// Read-write service
    pub const READ_WRITE: u16 = 0x0009;
    /// Read-only service
    pub const READ_ONLY: u16 = 0x000B;
}

/// Data object tags for the GET DATA instruction
pub mod data_tag {
    /// Card UID (IDm)
    pub const UID: u8 = 0x00;
    /// Card identity
    pub const ID: u8 = 0xF0;
    /// Card name
    pub const CARD_NAME: u8 = 0xF1;
    /// Card type
    pub const CARD_TYPE: u8 = 0xF3;
    /// Card type name
    pub const CARD_TYPE_NAME: u8 = 0xF4;
}

/// Status words returned in the 2-byte response trailer
pub mod status {
    use crate::response::StatusWord;

    /// Success
    pub const SUCCESS: StatusWord = StatusWord::new(0x90, 0x00);
    /// No response from the card (empty / NAK)
    pub const NO_RESPONSE: StatusWord = StatusWord::new(0x64, 0x01);
}

/// Size of a card block payload in bytes
pub const BLOCK_SIZE: usize = 16;

/// Maximum number of data blocks per MAC-protected read
///
/// The MAC address descriptor holds four 2-byte slots and one is taken by the
/// MAC register itself.
pub const MAX_MAC_READ_BLOCKS: usize = 3;
