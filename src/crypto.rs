//! AES-128-based MAC/keystream derivation shared by the uplink and downlink
//! codecs.
//!
//! Both the frame MAC and the obfuscation/encryption keystream are derived
//! by running one AES-128 block encryption over a 16-byte input block built
//! from `(devid, seqnum, context)`. Per §9 Open Question 3, the source does
//! not separate the two derivations; this implementation keeps them sharing
//! the same block-construction routine and differs only in the context
//! bytes fed in and how much of the output is kept (see module docs in
//! `uplink.rs`/`downlink.rs` for the frame-type-dependent MAC widths).

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes128;

/// Device shared secret length, in bytes.
pub const KEY_LEN: usize = 16;

fn mac_input_block(devid: u32, seqnum: u16, context: &[u8]) -> [u8; 16] {
    let mut block = [0u8; 16];
    block[0..4].copy_from_slice(&devid.to_le_bytes());
    block[4..6].copy_from_slice(&seqnum.to_le_bytes());

    let n = context.len().min(block.len() - 6);
    block[6..6 + n].copy_from_slice(&context[..n]);
    block
}

fn aes128_encrypt_block(key: &[u8; KEY_LEN], block: [u8; 16]) -> [u8; 16] {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut ga = GenericArray::clone_from_slice(&block);
    cipher.encrypt_block(&mut ga);
    ga.as_slice().try_into().unwrap()
}

/// Computes the full 16-byte AES output for the MAC derivation; callers
/// truncate to the frame-type-dependent MAC width `k`.
pub fn compute_mac(key: &[u8; KEY_LEN], devid: u32, seqnum: u16, bytes: &[u8]) -> [u8; 16] {
    aes128_encrypt_block(key, mac_input_block(devid, seqnum, bytes))
}

/// XORs `buf` in place with an AES-derived keystream. Calling this twice
/// with the same `(key, devid, seqnum)` is the identity.
pub fn apply_keystream(key: &[u8; KEY_LEN], devid: u32, seqnum: u16, buf: &mut [u8]) {
    let pad = aes128_encrypt_block(key, mac_input_block(devid, seqnum, &[]));
    for (i, byte) in buf.iter_mut().enumerate() {
        *byte ^= pad[i % pad.len()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; KEY_LEN] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E,
        0x0F,
    ];

    #[test]
    fn keystream_is_its_own_inverse() {
        let mut buf = *b"Hello, Sigfox!!!";
        let original = buf;
        apply_keystream(&KEY, 0xFEDCBA98, 0x123, &mut buf);
        assert_ne!(buf, original);
        apply_keystream(&KEY, 0xFEDCBA98, 0x123, &mut buf);
        assert_eq!(buf, original);
    }

    #[test]
    fn mac_depends_on_every_input() {
        let base = compute_mac(&KEY, 1, 1, b"abc");
        assert_ne!(base, compute_mac(&KEY, 2, 1, b"abc"));
        assert_ne!(base, compute_mac(&KEY, 1, 2, b"abc"));
        assert_ne!(base, compute_mac(&KEY, 1, 1, b"abd"));

        let mut other_key = KEY;
        other_key[0] ^= 0xFF;
        assert_ne!(base, compute_mac(&other_key, 1, 1, b"abc"));
    }

    #[test]
    fn mac_is_deterministic() {
        assert_eq!(compute_mac(&KEY, 1, 1, b"abc"), compute_mac(&KEY, 1, 1, b"abc"));
    }
}
