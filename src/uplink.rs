//! Uplink frame assembly and disassembly (spec.md §4.7).
//!
//! On-wire layout of replica 0 (every other replica is a deterministic
//! transform of this, see `replica.rs`, and is never consumed by decode):
//!
//! ```text
//! byte 0       : ftype(3) | request_downlink(1) | seqnum[11:8](4)
//! byte 1       : seqnum[7:0]
//! byte 2       : payloadlen (0..=12)
//! bytes 3..7   : devid, little-endian
//! bytes 7..N   : payload, zero-padded to the frame type's capacity
//! bytes N..N+2 : CRC-16, big-endian
//! bytes N+2..  : MAC, width `k` given by `UplinkFrameType::mac_len`
//! ```
//!
//! Obfuscation (spec.md §4.3, Open Question 3 resolution): only the MAC
//! field is XORed with the AES keystream. This is what makes the scenario
//! in spec.md §8 ("decode with wrong key: CRC passes, MAC fails") hold
//! unconditionally — CRC is computed over header+payload bytes that the
//! keystream never touches.

use crate::bits::{get_bits, set_bits};
use crate::crc::crc16;
use crate::crypto;
use crate::frame::{
    CommonInfo, Key, UplinkDecodeError, UplinkEncodeError, UplinkEncoded, UplinkFrameType,
    UplinkPlain, UL_CRC_LEN, UL_HEADER_LEN, UL_MAX_FRAMELEN, UL_MAX_PAYLOADLEN,
};
use crate::replica;

fn write_header(buf: &mut [u8], ftype: UplinkFrameType, request_downlink: bool, seqnum: u16, devid: u32, payloadlen: u8) {
    set_bits(buf, 0, ftype.type_bits(), 3).unwrap();
    set_bits(buf, 3, request_downlink as u32, 1).unwrap();
    set_bits(buf, 4, seqnum as u32, 12).unwrap();
    buf[2] = payloadlen;
    buf[3..7].copy_from_slice(&devid.to_le_bytes());
}

struct Header {
    ftype_bits: u32,
    request_downlink: bool,
    seqnum: u16,
    devid: u32,
    payloadlen: u8,
}

fn read_header(buf: &[u8]) -> Header {
    Header {
        ftype_bits: get_bits(buf, 0, 3).unwrap(),
        request_downlink: get_bits(buf, 3, 1).unwrap() != 0,
        seqnum: get_bits(buf, 4, 12).unwrap() as u16,
        payloadlen: buf[2],
        devid: u32::from_le_bytes(buf[3..7].try_into().unwrap()),
    }
}

/// Encodes `plain` into replica 0 (and, if `plain.replicas`, replicas 1/2).
pub fn sfx_uplink_encode(plain: &UplinkPlain, common: &CommonInfo) -> Result<UplinkEncoded, UplinkEncodeError> {
    if plain.payloadlen as usize > UL_MAX_PAYLOADLEN {
        return Err(UplinkEncodeError::PayloadTooLong);
    }

    let ftype = UplinkFrameType::select(plain.singlebit, plain.payloadlen)
        .ok_or(UplinkEncodeError::PayloadTooLong)?;
    let frame_len = ftype.frame_len();
    let capacity = ftype.payload_capacity();
    let mac_len = ftype.mac_len();

    let mut buf = [0u8; UL_MAX_FRAMELEN];
    write_header(&mut buf, ftype, plain.request_downlink, common.seqnum, common.devid, plain.payloadlen);

    if plain.singlebit {
        buf[UL_HEADER_LEN] = plain.payload[0];
    } else {
        let n = plain.payloadlen as usize;
        buf[UL_HEADER_LEN..UL_HEADER_LEN + n].copy_from_slice(&plain.payload[..n]);
    }

    let crc_offset = UL_HEADER_LEN + capacity;
    let crc = crc16(&buf[..crc_offset]);
    buf[crc_offset..crc_offset + UL_CRC_LEN].copy_from_slice(&crc.to_be_bytes());

    let mac_offset = crc_offset + UL_CRC_LEN;
    let mac = crypto::compute_mac(&common.key, common.devid, common.seqnum, &buf[..crc_offset + UL_CRC_LEN]);
    buf[mac_offset..mac_offset + mac_len].copy_from_slice(&mac[..mac_len]);

    crypto::apply_keystream(&common.key, common.devid, common.seqnum, &mut buf[mac_offset..mac_offset + mac_len]);

    let mut encoded = UplinkEncoded {
        frame: [[0u8; UL_MAX_FRAMELEN]; 3],
        framelen_nibbles: UplinkEncoded::nibbles_for_bytes(frame_len),
        replica_count: 1,
    };
    encoded.frame[0][..frame_len].copy_from_slice(&buf[..frame_len]);

    if plain.replicas {
        let mut r1 = [0u8; UL_MAX_FRAMELEN];
        let mut r2 = [0u8; UL_MAX_FRAMELEN];
        replica::derive_replica1(&buf[..frame_len], &mut r1[..frame_len]);
        replica::derive_replica2(&buf[..frame_len], &mut r2[..frame_len]);
        encoded.frame[1] = r1;
        encoded.frame[2] = r2;
        encoded.replica_count = 3;
    }

    Ok(encoded)
}

/// Decodes replica 0 of `encoded`. `key_present` controls whether MAC
/// verification (and MAC-field de-obfuscation) is attempted; CRC is always
/// checked.
pub fn sfx_uplink_decode(
    encoded: &UplinkEncoded,
    key: Option<&Key>,
    common: &mut CommonInfo,
) -> Result<UplinkPlain, UplinkDecodeError> {
    let frame_len = encoded
        .frame_len_bytes()
        .ok_or(UplinkDecodeError::FramelenEven)?;

    let observed_ftype = UplinkFrameType::from_frame_len(frame_len).ok_or(UplinkDecodeError::FtypeMismatch)?;

    let mut buf = [0u8; UL_MAX_FRAMELEN];
    buf[..frame_len].copy_from_slice(&encoded.frame[0][..frame_len]);

    let header = read_header(&buf);
    let embedded_ftype =
        UplinkFrameType::from_type_bits(header.ftype_bits).ok_or(UplinkDecodeError::FtypeMismatch)?;
    if embedded_ftype != observed_ftype {
        return Err(UplinkDecodeError::FtypeMismatch);
    }

    common.seqnum = header.seqnum;
    common.devid = header.devid;

    let capacity = observed_ftype.payload_capacity();
    let mac_len = observed_ftype.mac_len();
    let crc_offset = UL_HEADER_LEN + capacity;
    let mac_offset = crc_offset + UL_CRC_LEN;

    if let Some(key) = key {
        crypto::apply_keystream(key, header.devid, header.seqnum, &mut buf[mac_offset..mac_offset + mac_len]);
    }

    let stored_crc = u16::from_be_bytes(buf[crc_offset..crc_offset + UL_CRC_LEN].try_into().unwrap());
    if crc16(&buf[..crc_offset]) != stored_crc {
        return Err(UplinkDecodeError::CrcInvalid);
    }

    if let Some(key) = key {
        let expected_mac = crypto::compute_mac(key, header.devid, header.seqnum, &buf[..crc_offset + UL_CRC_LEN]);
        if expected_mac[..mac_len] != buf[mac_offset..mac_offset + mac_len] {
            return Err(UplinkDecodeError::MacInvalid);
        }
    }

    let singlebit = matches!(observed_ftype, UplinkFrameType::SingleBit);
    let mut payload = [0u8; UL_MAX_PAYLOADLEN];
    let payloadlen = if singlebit {
        payload[0] = buf[UL_HEADER_LEN];
        0
    } else {
        let n = (header.payloadlen as usize).min(capacity);
        payload[..n].copy_from_slice(&buf[UL_HEADER_LEN..UL_HEADER_LEN + n]);
        header.payloadlen
    };

    Ok(UplinkPlain {
        singlebit,
        request_downlink: header.request_downlink,
        replicas: encoded.replica_count > 1,
        payload,
        payloadlen,
    })
}
