//! Command framing for FeliCa Lite-S operations
//!
//! Commands are framed as PC/SC pseudo-APDUs:
//! `[class, instruction, p1, p2, length, payload..., le]`. The constructors
//! on [`Command`] build the exact frames the protocol uses; [`Block`] is the
//! 16-byte addressed unit of card memory they carry.

use bytes::{BufMut, Bytes, BytesMut};

use crate::constants::{BLOCK_SIZE, cla, ins};

/// Payload of a single card block
pub type BlockData = [u8; BLOCK_SIZE];

/// An addressed 16-byte block of card memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Block address in the card's register map
    pub address: u8,
    /// Block payload
    pub data: BlockData,
}

impl Block {
    /// Create a new block
    pub const fn new(address: u8, data: BlockData) -> Self {
        Self { address, data }
    }
}

/// A pseudo-APDU command frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// Parameter 1
    pub p1: u8,
    /// Parameter 2
    pub p2: u8,
    /// Command data (optional)
    pub data: Option<Bytes>,
    /// Expected length (optional)
    pub le: Option<u8>,
}

impl Command {
    /// Create a new command with just the header bytes
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: None,
        }
    }

    /// Create a new command with data payload
    pub fn new_with_data<T: Into<Bytes>>(cla: u8, ins: u8, p1: u8, p2: u8, data: T) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Some(data.into()),
            le: None,
        }
    }

    /// Set the expected length field
    pub const fn with_le(mut self, le: u8) -> Self {
        self.le = Some(le);
        self
    }

    /// Serialize to raw frame bytes
    pub fn to_bytes(&self) -> Bytes {
        let data_len = self.data.as_ref().map_or(0, Bytes::len);
        let mut buffer = BytesMut::with_capacity(4 + 1 + data_len + 1);

        buffer.put_u8(self.cla);
        buffer.put_u8(self.ins);
        buffer.put_u8(self.p1);
        buffer.put_u8(self.p2);

        if let Some(data) = &self.data {
            buffer.put_u8(data.len() as u8);
            buffer.put_slice(data);
        }

        if let Some(le) = self.le {
            buffer.put_u8(le);
        }

        buffer.freeze()
    }

    /// SELECT of a service code (read-write or read-only access)
    ///
    /// The service code is transmitted little-endian.
    pub fn select_service(service: u16) -> Self {
        Self::new_with_data(
            cla::PSEUDO_APDU,
            ins::SELECT,
            0x00,
            0x01,
            service.to_le_bytes().to_vec(),
        )
    }

    /// READ BINARY of the given block addresses
    ///
    /// Each address becomes a 2-byte block list element; the leading `0x80`
    /// marks a 2-byte element addressing service index 0.
    pub fn read_blocks(addresses: &[u8]) -> Self {
        let mut list = BytesMut::with_capacity(addresses.len() * 2);
        for &address in addresses {
            list.put_u8(0x80);
            list.put_u8(address);
        }

        Self::new_with_data(
            cla::PSEUDO_APDU,
            ins::READ_BINARY,
            0x80,
            addresses.len() as u8,
            list.freeze(),
        )
        .with_le(0x00)
    }

    /// UPDATE BINARY of the given blocks
    ///
    /// The frame carries the full block list first, then all block payloads
    /// in the same order.
    pub fn write_blocks(blocks: &[Block]) -> Self {
        let mut data = BytesMut::with_capacity(blocks.len() * (2 + BLOCK_SIZE));
        for block in blocks {
            data.put_u8(0x80);
            data.put_u8(block.address);
        }
        for block in blocks {
            data.put_slice(&block.data);
        }

        Self::new_with_data(
            cla::PSEUDO_APDU,
            ins::UPDATE_BINARY,
            0x80,
            blocks.len() as u8,
            data.freeze(),
        )
        .with_le(0x00)
    }

    /// GET DATA for a reader-level data object
    pub fn get_data(tag: u8) -> Self {
        Self::new(cla::PSEUDO_APDU, ins::GET_DATA, tag, 0x00).with_le(0x00)
    }

    /// Transparent exchange encapsulating a raw FeliCa command
    pub fn transparent(payload: &[u8]) -> Self {
        Self::new_with_data(
            cla::PSEUDO_APDU,
            ins::TRANSPARENT,
            0x00,
            0x00,
            payload.to_vec(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{block, service};
    use hex_literal::hex;

    #[test]
    fn test_select_service_frame() {
        let cmd = Command::select_service(service::READ_WRITE);
        assert_eq!(cmd.to_bytes().as_ref(), hex!("ffa4000102 0900"));

        let cmd = Command::select_service(service::READ_ONLY);
        assert_eq!(cmd.to_bytes().as_ref(), hex!("ffa4000102 0b00"));
    }

    #[test]
    fn test_read_blocks_frame() {
        let cmd = Command::read_blocks(&[block::ID, block::CKV, block::MAC_A]);
        assert_eq!(
            cmd.to_bytes().as_ref(),
            hex!("ffb0800306 808280868091 00")
        );
    }

    #[test]
    fn test_write_blocks_frame() {
        let data = hex!("000102030405060708090a0b0c0d0e0f");
        let cmd = Command::write_blocks(&[Block::new(block::RC, data)]);
        assert_eq!(
            cmd.to_bytes().as_ref(),
            hex!("ffd6800112 8080 000102030405060708090a0b0c0d0e0f 00")
        );
    }

    #[test]
    fn test_write_blocks_frame_two_blocks() {
        let first = Block::new(block::S_PAD1, [0x11; 16]);
        let second = Block::new(block::MAC_A, [0x22; 16]);
        let cmd = Command::write_blocks(&[first, second]);
        let bytes = cmd.to_bytes();

        // list first, payloads after
        assert_eq!(&bytes[..5], hex!("ffd6800224"));
        assert_eq!(&bytes[5..9], hex!("80018091"));
        assert_eq!(&bytes[9..25], [0x11; 16]);
        assert_eq!(&bytes[25..41], [0x22; 16]);
        assert_eq!(bytes[41], 0x00);
    }

    #[test]
    fn test_get_data_frame() {
        let cmd = Command::get_data(crate::constants::data_tag::UID);
        assert_eq!(cmd.to_bytes().as_ref(), hex!("ffca000000"));
    }

    #[test]
    fn test_transparent_frame() {
        let cmd = Command::transparent(&hex!("06001122334455667788"));
        assert_eq!(
            cmd.to_bytes().as_ref(),
            hex!("fffe00000a 06001122334455667788")
        );
    }
}
