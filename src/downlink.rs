//! Downlink frame assembly and disassembly (spec.md §4.8).
//!
//! On-wire layout of the 15-byte frame, before scrambling:
//!
//! ```text
//! bytes 0..8  : payload
//! byte  8     : CRC-8 over payload
//! bytes 9..11 : MAC, 2 bytes
//! bytes 11..15: FEC parity over the preceding 11 bytes (see fec.rs)
//! ```
//!
//! The whole 15-byte block is then XORed with the descrambling LFSR
//! keystream (`scrambler::apply`), which is its own inverse, so encode
//! scrambles and decode's first step descrambles using the identical call.
//!
//! Unlike the uplink codec, decode here never fails: spec.md §4.8 has it
//! always return a `DownlinkPlain` with `crc_ok`/`mac_ok`/`fec_corrected`
//! flags for the caller to act on, matching a receiver that can't simply
//! drop a malformed downlink frame the way an uplink backend can.

use crate::crypto;
use crate::fec;
use crate::frame::{CommonInfo, DownlinkEncoded, DownlinkPlain, SFX_DL_FRAMELEN, SFX_DL_PAYLOADLEN};
use crate::scrambler;

const DATA_LEN: usize = 11;
const CRC_INDEX: usize = SFX_DL_PAYLOADLEN;
const MAC_RANGE: core::ops::Range<usize> = SFX_DL_PAYLOADLEN + 1..DATA_LEN;
const MAC_LEN: usize = 2;

fn crc8(payload: &[u8; SFX_DL_PAYLOADLEN]) -> u8 {
    crate::crc::crc8(payload)
}

/// Encodes `plain.payload` into a scrambled, FEC-protected downlink frame.
pub fn sfx_downlink_encode(plain: &DownlinkPlain, common: &CommonInfo) -> DownlinkEncoded {
    let mut data = [0u8; DATA_LEN];
    data[..SFX_DL_PAYLOADLEN].copy_from_slice(&plain.payload);
    data[CRC_INDEX] = crc8(&plain.payload);

    let mac = crypto::compute_mac(&common.key, common.devid, common.seqnum, &plain.payload);
    data[MAC_RANGE].copy_from_slice(&mac[..MAC_LEN]);

    let parity = fec::encode(&data);

    let mut frame = [0u8; SFX_DL_FRAMELEN];
    frame[..DATA_LEN].copy_from_slice(&data);
    frame[DATA_LEN..].copy_from_slice(&parity);

    scrambler::apply(common.devid, common.seqnum, &mut frame);

    DownlinkEncoded { frame }
}

/// Decodes `encoded` against `common`. Always succeeds; `crc_ok`, `mac_ok`
/// and `fec_corrected` report what was found.
pub fn sfx_downlink_decode(encoded: &DownlinkEncoded, common: &CommonInfo) -> DownlinkPlain {
    let mut frame = encoded.frame;
    scrambler::apply(common.devid, common.seqnum, &mut frame);

    let mut data: [u8; DATA_LEN] = frame[..DATA_LEN].try_into().unwrap();
    let parity: [u8; 4] = frame[DATA_LEN..].try_into().unwrap();
    let fec_corrected = fec::decode_with_fec(&mut data, &parity);

    let payload: [u8; SFX_DL_PAYLOADLEN] = data[..SFX_DL_PAYLOADLEN].try_into().unwrap();
    let crc_ok = crc8(&payload) == data[CRC_INDEX];

    let mac = crypto::compute_mac(&common.key, common.devid, common.seqnum, &payload);
    let mac_ok = mac[..MAC_LEN] == data[MAC_RANGE];

    DownlinkPlain { payload, crc_ok, mac_ok, fec_corrected }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn common() -> CommonInfo {
        let mut key = [0u8; 16];
        for (i, b) in key.iter_mut().enumerate() {
            *b = i as u8;
        }
        CommonInfo { seqnum: 0x42, devid: 0xC0FFEE01, key }
    }

    fn plain(payload: [u8; SFX_DL_PAYLOADLEN]) -> DownlinkPlain {
        DownlinkPlain { payload, crc_ok: true, mac_ok: true, fec_corrected: false }
    }

    #[test]
    fn round_trips_clean() {
        let common = common();
        let p = plain(*b"DOWNLINK");
        let encoded = sfx_downlink_encode(&p, &common);
        let decoded = sfx_downlink_decode(&encoded, &common);
        assert_eq!(decoded.payload, p.payload);
        assert!(decoded.crc_ok);
        assert!(decoded.mac_ok);
        assert!(!decoded.fec_corrected);
    }

    #[test]
    fn single_byte_corruption_is_fec_corrected() {
        let common = common();
        let p = plain(*b"DOWNLINK");
        let mut encoded = sfx_downlink_encode(&p, &common);
        // Flip a bit inside the scrambled frame; after descrambling this
        // lands as a single corrupted data/parity byte, which the FEC
        // should repair transparently.
        encoded.frame[3] ^= 0x08;
        let decoded = sfx_downlink_decode(&encoded, &common);
        assert_eq!(decoded.payload, p.payload);
        assert!(decoded.crc_ok);
        assert!(decoded.fec_corrected);
    }

    #[test]
    fn wrong_key_fails_mac_not_crc() {
        let common = common();
        let p = plain(*b"DOWNLINK");
        let encoded = sfx_downlink_encode(&p, &common);

        let mut wrong = common;
        wrong.key[0] ^= 0xFF;
        let decoded = sfx_downlink_decode(&encoded, &wrong);
        assert!(decoded.crc_ok);
        assert!(!decoded.mac_ok);
    }

    #[test]
    fn wrong_seqnum_breaks_descrambling() {
        let common = common();
        let p = plain(*b"DOWNLINK");
        let encoded = sfx_downlink_encode(&p, &common);

        let mut wrong = common;
        wrong.seqnum ^= 0xFF;
        let decoded = sfx_downlink_decode(&encoded, &wrong);
        assert!(!decoded.crc_ok || decoded.payload != p.payload);
    }
}
