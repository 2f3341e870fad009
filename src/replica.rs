//! Uplink replica generation.
//!
//! Replica 0 is the primary encoded frame. Replicas 1 and 2 are redundant
//! copies intended for transmission on different carriers/time slots; the
//! demodulator combines whichever replica arrives cleanly. The decode path
//! never needs to undo these transforms — it always operates on replica 0 —
//! so they only need to be *deterministic*, not invertible by this crate.
//!
//! Resolution of spec.md §4.4 ("a fixed, table-driven bytewise transform"):
//! replica 1 bit-inverts every byte of replica 0; replica 2 reverses the
//! byte order of replica 0. Both are simple enough to verify by eye against
//! the emitted frame and give the three replicas visibly distinct bit
//! patterns on air.

/// Bit-inverts every byte of `replica0` into `out`. Both slices must have
/// the same length.
pub fn derive_replica1(replica0: &[u8], out: &mut [u8]) {
    for (o, &b) in out.iter_mut().zip(replica0.iter()) {
        *o = !b;
    }
}

/// Reverses the byte order of `replica0` into `out`. Both slices must have
/// the same length.
pub fn derive_replica2(replica0: &[u8], out: &mut [u8]) {
    let len = replica0.len();
    for i in 0..len {
        out[i] = replica0[len - 1 - i];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replica1_inverts_bits() {
        let r0 = [0x00, 0xFF, 0xA5];
        let mut r1 = [0u8; 3];
        derive_replica1(&r0, &mut r1);
        assert_eq!(r1, [0xFF, 0x00, 0x5A]);
    }

    #[test]
    fn replica2_reverses_bytes() {
        let r0 = [0x01, 0x02, 0x03, 0x04];
        let mut r2 = [0u8; 4];
        derive_replica2(&r0, &mut r2);
        assert_eq!(r2, [0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn replicas_are_deterministic() {
        let r0 = [0x12, 0x34, 0x56];
        let mut a = [0u8; 3];
        let mut b = [0u8; 3];
        derive_replica1(&r0, &mut a);
        derive_replica1(&r0, &mut b);
        assert_eq!(a, b);
    }
}
