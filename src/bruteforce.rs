//! Brute-force helpers for recovering fields the receiver doesn't already
//! know, per spec.md §4.8.1 / the reference CLI's `test` mode.
//!
//! Both modes operate on a downlink frame: a backend that lost track of a
//! device's last-seen `seqnum` recovers it by trying every candidate and
//! keeping the ones whose integrity checks pass (mode 1); an observer that
//! doesn't know the scrambler seed sweeps the seed space directly (mode 2).
//! Uplink frames carry `seqnum`/`devid` in plaintext in the header
//! (spec.md §4.7 step 3), so there is nothing to brute-force there.

use crate::frame::{CommonInfo, DownlinkEncoded, Key};
use crate::{downlink, scrambler};

/// Downlink seqnum range to search, per spec.md §4.8.1 (a 12-bit sequence
/// counter), matching `examples/original_source/src/main.c`'s
/// `dl_use_bruteforce1` sweep of `common.seqnum` in `0..0xfff`.
const DOWNLINK_SEQNUM_SPACE: u16 = 1 << 12;

/// Searches every possible `seqnum` for one under which `encoded` decodes
/// with both CRC and MAC valid, given a known `devid`/`key`. Ports brute-
/// force mode 1 (`examples/original_source/src/main.c:353-363`).
pub fn downlink_seqnum_candidates<'a>(
    encoded: &'a DownlinkEncoded,
    devid: u32,
    key: &'a Key,
) -> impl Iterator<Item = u16> + 'a {
    (0..DOWNLINK_SEQNUM_SPACE).filter(move |&seqnum| {
        let common = CommonInfo { seqnum, devid, key: *key };
        let decoded = downlink::sfx_downlink_decode(encoded, &common);
        decoded.crc_ok && decoded.mac_ok
    })
}

/// Searches the full LFSR seed space for one under which `encoded` decodes
/// with a valid CRC, reporting whether FEC had to correct a byte along the
/// way. `devid` is combined with the swept `seqnum` to derive the
/// descrambling seed (`scrambler::seed_from_devid_seqnum`), so the caller
/// must pass the fixed `devid` value spec.md §4.8 mode 2 mandates (`1` in
/// the reference CLI) rather than an arbitrary one — it is not merely a
/// MAC-check input. `key` is only used for the (ignored) MAC check and can
/// be any value if the caller doesn't have it.
pub fn lfsr_seed_candidates(
    encoded: &DownlinkEncoded,
    devid: u32,
    key: &Key,
) -> impl Iterator<Item = (u16, bool)> + '_ {
    let key = *key;
    (0..scrambler::SEED_SPACE).filter_map(move |seed| {
        // `sfx_downlink_decode` derives its descrambling seed from
        // `(devid, seqnum)`; searching `seqnum` with `devid` fixed sweeps
        // the same seed space `scrambler::seed_from_devid_seqnum` would.
        let common = CommonInfo { seqnum: seed, devid, key };
        let decoded = downlink::sfx_downlink_decode(encoded, &common);
        if decoded.crc_ok {
            Some((seed, decoded.fec_corrected))
        } else {
            None
        }
    })
}
