//! Cryptographic operations for the FeliCa Lite-S protocol
//!
//! This module implements key diversification, session key derivation and the
//! MAC computation used for authenticated block access. The card encrypts in
//! the opposite byte order to the one it transmits in, so buffers are
//! reversed on the way into and out of every cipher operation.
//!
//! All helpers are pure: they take fixed-size buffers and return new ones.

use cipher::{BlockEncrypt, Key, KeyInit, generic_array::GenericArray};
use des::TdesEde3;

use crate::{command::Block, constants::block};

/// A 24-byte master key, selected by the card's key version
pub type MasterKey = [u8; 24];
/// The card's 16-byte factory identity
pub type CardId = [u8; 16];
/// The 2-byte key version tag stored on the card
pub type KeyVersion = [u8; 2];
/// The per-card diversified key
pub type CardKey = [u8; 16];
/// The per-session key
pub type SessionKey = [u8; 16];
/// The 16-byte random challenge written to the card at session start
pub type Challenge = [u8; 16];
/// The card's 3-byte write counter
pub type WriteCounter = [u8; 3];
/// An 8-byte message authentication code
pub type Mac = [u8; 8];

/// Return a buffer with its byte order reversed
pub fn reversed<const N: usize>(mut buf: [u8; N]) -> [u8; N] {
    buf.reverse();
    buf
}

/// Element-wise XOR of two 8-byte buffers
pub fn xor(a: [u8; 8], b: [u8; 8]) -> [u8; 8] {
    let mut out = [0u8; 8];
    for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b.iter())) {
        *o = x ^ y;
    }
    out
}

/// Subkey doubling step used by card key diversification
///
/// Shifts the buffer left by one bit and, if the top bit was set, folds the
/// reduction constant `0x1B` into the last byte. The carry bit from each
/// following byte is combined with AND rather than OR; the card derives its
/// own key the same way, so switching this to textbook CMAC doubling breaks
/// authentication against real cards.
pub fn double(mut l: [u8; 8]) -> [u8; 8] {
    let msb = l[0] & 0x80;
    for i in 0..7 {
        l[i] = (l[i] << 1) & (l[i + 1] >> 7);
    }
    l[7] <<= 1;
    if msb != 0 {
        l[7] ^= 0x1B;
    }
    l
}

/// Expand a 16-byte key into the 24-byte triple-cipher form
///
/// The key is byte-reversed, then laid out as second half, first half,
/// second half again (a two-key triple cipher in three-key form).
pub fn expand_key(key: &CardKey) -> Key<TdesEde3> {
    let k = reversed(*key);
    let mut out = Key::<TdesEde3>::default();
    out[..8].copy_from_slice(&k[8..16]);
    out[8..16].copy_from_slice(&k[..8]);
    out[16..].copy_from_slice(&k[8..16]);
    out
}

/// Encrypt a single 8-byte block under a 24-byte triple-cipher key
///
/// No chaining mode; callers supply chaining externally. Decryption is never
/// needed by this protocol.
pub fn encrypt_block(key: &MasterKey, block: [u8; 8]) -> [u8; 8] {
    let cipher = TdesEde3::new(&Key::<TdesEde3>::from(*key));
    encrypt_with(&cipher, block)
}

fn encrypt_with(cipher: &TdesEde3, block: [u8; 8]) -> [u8; 8] {
    let mut block = GenericArray::from(block);
    cipher.encrypt_block(&mut block);
    block.into()
}

/// Derive the per-card key from a master key and the card identity
///
/// Deterministic and pure; the result must equal the key the card derives
/// from the same master key and its stored identity. A mismatch downstream is
/// an authentication failure, not a computation bug.
pub fn derive_card_key(master_key: &MasterKey, id: &CardId) -> CardKey {
    let cipher = TdesEde3::new(&Key::<TdesEde3>::from(*master_key));

    let l = double(encrypt_with(&cipher, [0u8; 8]));

    let mut m1 = [0u8; 8];
    m1.copy_from_slice(&id[..8]);
    let mut m2 = [0u8; 8];
    m2.copy_from_slice(&id[8..]);
    let m2 = xor(m2, l);

    let t1 = encrypt_with(&cipher, m1);
    m1[0] ^= 0x80;
    let c2 = encrypt_with(&cipher, m1);
    let t2 = encrypt_with(&cipher, xor(c2, m2));

    let mut ck = [0u8; 16];
    ck[..8].copy_from_slice(&t1);
    ck[8..].copy_from_slice(&t2);
    ck
}

/// Derive the session key from the card key and the random challenge
pub fn derive_session_key(ck: &CardKey, rc: &Challenge) -> SessionKey {
    let cipher = TdesEde3::new(&expand_key(ck));

    let mut rc1 = [0u8; 8];
    rc1.copy_from_slice(&rc[..8]);
    let mut rc2 = [0u8; 8];
    rc2.copy_from_slice(&rc[8..]);

    let e1 = encrypt_with(&cipher, reversed(rc1));
    let e2 = encrypt_with(&cipher, xor(e1, reversed(rc2)));

    let mut sk = [0u8; 16];
    sk[..8].copy_from_slice(&reversed(e1));
    sk[8..].copy_from_slice(&reversed(e2));
    sk
}

/// Compute the MAC over a sequence of 8-byte chunks
///
/// CBC-style chain seeded with the reversed first challenge half; every chunk
/// is byte-reversed before entering the chain, and the final chain value is
/// reversed back into transmission order.
pub fn compute_mac(sk: &SessionKey, rc: &Challenge, chunks: &[[u8; 8]]) -> Mac {
    let cipher = TdesEde3::new(&expand_key(sk));

    let mut chain = [0u8; 8];
    chain.copy_from_slice(&rc[..8]);
    let mut chain = reversed(chain);
    for &chunk in chunks {
        chain = encrypt_with(&cipher, xor(chain, reversed(chunk)));
    }
    reversed(chain)
}

/// Compute the MAC for a block read
///
/// The first chunk is the address descriptor: one `(address, 0x00)` pair per
/// block read (the MAC register included), unused slots filled with `0xFF`.
/// The block payloads follow in read order, two chunks each, stopping before
/// the MAC register block; its content is the value the card asserts, not
/// MAC input.
pub fn read_mac(sk: &SessionKey, rc: &Challenge, blocks: &[Block]) -> Mac {
    let mut descriptor = [0xFF; 8];
    for (i, b) in blocks.iter().take(4).enumerate() {
        descriptor[2 * i] = b.address;
        descriptor[2 * i + 1] = 0x00;
    }

    let mut chunks = Vec::with_capacity(1 + blocks.len() * 2);
    chunks.push(descriptor);
    for b in blocks {
        if b.address == block::MAC_A {
            break;
        }
        let mut half = [0u8; 8];
        half.copy_from_slice(&b.data[..8]);
        chunks.push(half);
        half.copy_from_slice(&b.data[8..]);
        chunks.push(half);
    }

    compute_mac(sk, rc, &chunks)
}

/// Compute the MAC for a block write
///
/// Binds the write to the card's current write counter and the target
/// address, followed by the two halves of the value being written.
pub fn write_mac(sk: &SessionKey, rc: &Challenge, wcnt: &WriteCounter, b: &Block) -> Mac {
    let mut chunks = [[0u8; 8]; 3];
    chunks[0] = [
        wcnt[0],
        wcnt[1],
        wcnt[2],
        0x00,
        b.address,
        0x00,
        block::MAC_A,
        0x00,
    ];
    chunks[1].copy_from_slice(&b.data[..8]);
    chunks[2].copy_from_slice(&b.data[8..]);

    compute_mac(sk, rc, &chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const MASTER_KEY: MasterKey = *b"xNhAMv2J4bAW86Nddq8WDizc";
    const CARD_ID: CardId = hex!("00112233445566778899aabbccddeeff");
    const RC: Challenge = hex!("a0a1a2a3a4a5a6a7a8a9aaabacadaeaf");
    const CK: CardKey = hex!("b1a19a368fa5a3e4a8d8fba8c6bb8dc4");
    const SK: SessionKey = hex!("78e7346b9bc4c1b6f5b5ddf101b39380");

    #[test]
    fn test_encrypt_block_classic_vector() {
        // Single-DES degenerate key: all three subkeys equal
        let key = hex!("0123456789abcdef0123456789abcdef0123456789abcdef");
        let ciphertext = encrypt_block(&key, hex!("4e6f772069732074"));
        assert_eq!(ciphertext, hex!("3fa40e8a984d4815"));
    }

    #[test]
    fn test_encrypt_block_master_key() {
        assert_eq!(
            encrypt_block(&MASTER_KEY, [0u8; 8]),
            hex!("27f10bf4d544de87")
        );
        assert_eq!(
            encrypt_block(&MASTER_KEY, hex!("0001020304050607")),
            hex!("7b124bdb395b671b")
        );
    }

    #[test]
    fn test_expand_key() {
        let expanded = expand_key(&hex!("000102030405060708090a0b0c0d0e0f"));
        assert_eq!(
            expanded.as_slice(),
            hex!("07060504030201000f0e0d0c0b0a09080706050403020100")
        );
    }

    #[test]
    fn test_double_vectors() {
        assert_eq!(double([0u8; 8]), [0u8; 8]);
        assert_eq!(double(hex!("27f10bf4d544de87")), hex!("000000000000000e"));
        assert_eq!(double(hex!("ffffffffffffffff")), hex!("00000000000000e5"));
        assert_eq!(double(hex!("0101010101010101")), hex!("0000000000000002"));
    }

    #[test]
    fn test_xor() {
        assert_eq!(
            xor(hex!("ff00ff00ff00ff00"), hex!("0f0f0f0f0f0f0f0f")),
            hex!("f00ff00ff00ff00f")
        );
    }

    #[test]
    fn test_reversed() {
        assert_eq!(reversed(hex!("0102030405060708")), hex!("0807060504030201"));
    }

    #[test]
    fn test_derive_card_key_golden() {
        assert_eq!(derive_card_key(&MASTER_KEY, &CARD_ID), CK);
        // deterministic
        assert_eq!(derive_card_key(&MASTER_KEY, &CARD_ID), CK);
    }

    #[test]
    fn test_derive_session_key_golden() {
        assert_eq!(derive_session_key(&CK, &RC), SK);
    }

    #[test]
    fn test_session_key_depends_on_challenge() {
        for byte in 0..16 {
            for bit in 0..8 {
                let mut rc = RC;
                rc[byte] ^= 1 << bit;
                assert_ne!(derive_session_key(&CK, &rc), SK);
            }
        }
    }

    #[test]
    fn test_read_mac_golden() {
        let blocks = [
            Block::new(block::ID, CARD_ID),
            Block::new(block::CKV, [0u8; 16]),
            Block::new(block::MAC_A, [0u8; 16]),
        ];
        assert_eq!(read_mac(&SK, &RC, &blocks), hex!("175a6e1baea0e829"));
    }

    #[test]
    fn test_read_mac_excludes_mac_block_payload() {
        let mut blocks = [
            Block::new(block::ID, CARD_ID),
            Block::new(block::CKV, [0u8; 16]),
            Block::new(block::MAC_A, [0u8; 16]),
        ];
        let mac = read_mac(&SK, &RC, &blocks);
        blocks[2].data = [0xAB; 16];
        assert_eq!(read_mac(&SK, &RC, &blocks), mac);
    }

    #[test]
    fn test_write_mac_golden() {
        let b = Block::new(block::S_PAD1, *b"This is 16 byte.");
        assert_eq!(
            write_mac(&SK, &RC, &hex!("123456"), &b),
            hex!("8e1fb1205da88f2e")
        );
    }

    #[test]
    fn test_compute_mac_single_chunk() {
        assert_eq!(
            compute_mac(&SK, &RC, &[hex!("0011223344556677")]),
            hex!("6fa2e3e72f13f963")
        );
    }

    #[test]
    fn test_mac_sensitive_to_every_input_bit() {
        let chunks = [
            hex!("8200860091000000"),
            hex!("0011223344556677"),
            hex!("8899aabbccddeeff"),
        ];
        let reference = compute_mac(&SK, &RC, &chunks);
        for chunk in 0..chunks.len() {
            for byte in 0..8 {
                for bit in 0..8 {
                    let mut flipped = chunks;
                    flipped[chunk][byte] ^= 1 << bit;
                    assert_ne!(compute_mac(&SK, &RC, &flipped), reference);
                }
            }
        }
    }

    #[test]
    fn test_write_mac_depends_on_counter() {
        let b = Block::new(block::S_PAD1, *b"This is 16 byte.");
        assert_ne!(
            write_mac(&SK, &RC, &hex!("123457"), &b),
            write_mac(&SK, &RC, &hex!("123456"), &b)
        );
    }
}
