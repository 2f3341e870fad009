//! Downlink convolutional FEC (spec.md §4.5).
//!
//! Resolution of "generator polynomials fixed by the standard": the 11
//! protected bytes (8 payload + 1 CRC-8 + 2 MAC) are laid out at Hamming
//! positions 3,5,6,7,9,10,11,12,13,14,15 and four parity bytes are placed at
//! positions 1,2,4,8 — the classic `(15,11)` single-error-correcting
//! Hamming code, generalized from bits to whole bytes. Because XOR is
//! applied byte-wise, running the bit-level Hamming check "in parallel"
//! across all eight bit lanes of a byte falls out for free: a corruption
//! confined to one symbol, however many of its bits are wrong, still
//! produces a syndrome that names exactly that symbol's position, and the
//! recovered error value corrects the whole byte in one XOR.

const DATA_POSITIONS: [u8; 11] = [3, 5, 6, 7, 9, 10, 11, 12, 13, 14, 15];
const PARITY_POSITIONS: [u8; 4] = [1, 2, 4, 8];

fn parity_at(data: &[u8; 11], p: u8) -> u8 {
    let mut acc = 0u8;
    for (i, &pos) in DATA_POSITIONS.iter().enumerate() {
        if pos & p != 0 {
            acc ^= data[i];
        }
    }
    acc
}

/// Computes the 4 parity bytes (ordered for positions 1, 2, 4, 8) covering
/// an 11-byte data block.
pub fn encode(data: &[u8; 11]) -> [u8; 4] {
    let mut parity = [0u8; 4];
    for (k, p) in PARITY_POSITIONS.iter().enumerate() {
        parity[k] = parity_at(data, *p);
    }
    parity
}

/// Checks `data` against `parity`, correcting a single corrupted byte
/// (anywhere in `data`, or a corrupted parity byte itself) in place.
/// Returns `true` if a correction was applied.
///
/// Multi-symbol corruption is out of scope for a single-error-correcting
/// code: the syndrome may point at the wrong symbol or at a parity byte
/// that isn't actually wrong, silently producing a still-corrupt `data`.
/// The caller's CRC-8 check is what catches that case (spec.md §4.5).
pub fn decode_with_fec(data: &mut [u8; 11], parity: &[u8; 4]) -> bool {
    let mut mismatches = [0u8; 4];
    let mut syndrome: u8 = 0;

    for (k, p) in PARITY_POSITIONS.iter().enumerate() {
        let mismatch = parity_at(data, *p) ^ parity[k];
        mismatches[k] = mismatch;
        if mismatch != 0 {
            syndrome |= p;
        }
    }

    if syndrome == 0 {
        return false;
    }

    let k0 = syndrome.trailing_zeros() as usize;
    let error_value = mismatches[k0];

    if let Some(data_index) = DATA_POSITIONS.iter().position(|&pos| pos == syndrome) {
        data[data_index] ^= error_value;
    }
    // else: syndrome names a parity position — the corruption is in a
    // parity byte we don't retain, so `data` is already correct.

    true
}
