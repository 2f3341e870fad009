//! Sigfox uplink/downlink frame codec core.
//!
//! Implements the on-air frame formats described in the Sigfox RC1 device
//! spec: uplink encode/decode with CRC-16 integrity, AES-128-derived MAC
//! and MAC-field obfuscation, and replica generation; downlink encode/
//! decode with CRC-8, AES-128 MAC, Hamming-style single-byte FEC and LFSR
//! descrambling. See `SPEC_FULL.md` and `DESIGN.md` in the repository root
//! for the full module-by-module design rationale.
//!
//! Supports `no_std`; unit tests (`#[cfg(test)]`) build against `std` so
//! they can use the standard test harness and `alloc`-requiring helpers
//! like `vec!` without pulling an allocator into the library itself.
#![cfg_attr(not(test), no_std)]

pub mod bits;
pub mod bruteforce;
pub mod crc;
pub mod crypto;
pub mod downlink;
pub mod fec;
pub mod frame;
pub mod replica;
pub mod scrambler;
pub mod uplink;

pub use downlink::{sfx_downlink_decode, sfx_downlink_encode};
pub use frame::{
    CommonInfo, DownlinkEncoded, DownlinkPlain, Key, UplinkDecodeError, UplinkEncodeError,
    UplinkEncoded, UplinkFrameType, UplinkPlain, KEY_LEN, SFX_DL_FRAMELEN, SFX_DL_PAYLOADLEN,
    SFX_DL_PREAMBLE, SFX_UL_PREAMBLE, UL_MAX_FRAMELEN, UL_MAX_PAYLOADLEN,
};
pub use uplink::{sfx_uplink_decode, sfx_uplink_encode};
