//! Fixed block header and footer layouts
//!
//! Every AOKV block opens with a `MagicHeader` and closes with a `Footer`;
//! KVP blocks additionally carry a `KEY_SIZE` field right after the magic
//! header. Every field here is a fixed 4-byte `u32` in host byte order —
//! there is no varint framing to get wrong, but callers must still
//! bounds-check `BLOCK_SIZE` against the remaining file length before
//! trusting it.

use crate::constants::{
    FOOTER_LEN, INDEX_HEADER_LEN, KVP_HEADER_LEN, MAGIC0, MAGIC_HEADER_LEN, RESERVED_WINDOW_MAX,
};
use crate::error::AokvError;

/// The shared three-word prefix of every block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagicHeader {
    /// Format brand, always [`MAGIC0`].
    pub magic0: u32,
    /// Block-type-and-fileId word (`KVP_BASE + fileId` or `INDEX_BASE + fileId`).
    pub magic1: u32,
    /// Total block size in bytes, headers and footer included.
    pub block_size: u32,
}

impl MagicHeader {
    /// Encode to the fixed 12-byte wire representation.
    pub fn encode(&self) -> [u8; MAGIC_HEADER_LEN] {
        let mut out = [0u8; MAGIC_HEADER_LEN];
        out[0..4].copy_from_slice(&self.magic0.to_ne_bytes());
        out[4..8].copy_from_slice(&self.magic1.to_ne_bytes());
        out[8..12].copy_from_slice(&self.block_size.to_ne_bytes());
        out
    }

    /// Decode from a buffer of at least [`MAGIC_HEADER_LEN`] bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, AokvError> {
        if bytes.len() < MAGIC_HEADER_LEN {
            return Err(AokvError::UnexpectedEof);
        }
        Ok(Self {
            magic0: u32::from_ne_bytes(bytes[0..4].try_into().unwrap()),
            magic1: u32::from_ne_bytes(bytes[4..8].try_into().unwrap()),
            block_size: u32::from_ne_bytes(bytes[8..12].try_into().unwrap()),
        })
    }

    /// Whether `magic0` matches the AOKV brand and `magic1` falls inside the
    /// reserved fileId window (the forward-compatible skip rule applied
    /// during forward scanning).
    pub fn in_reserved_window(&self) -> bool {
        self.magic0 == MAGIC0 && self.magic1 <= RESERVED_WINDOW_MAX
    }
}

/// `MagicHeader` plus the KVP-specific `KEY_SIZE` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KvpHeader {
    /// Shared magic prefix.
    pub magic: MagicHeader,
    /// Length of the key, in bytes.
    pub key_size: u32,
}

impl KvpHeader {
    /// Encode to the fixed 16-byte wire representation.
    pub fn encode(&self) -> [u8; KVP_HEADER_LEN] {
        let mut out = [0u8; KVP_HEADER_LEN];
        out[0..12].copy_from_slice(&self.magic.encode());
        out[12..16].copy_from_slice(&self.key_size.to_ne_bytes());
        out
    }

    /// Decode from a buffer of at least [`KVP_HEADER_LEN`] bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, AokvError> {
        if bytes.len() < KVP_HEADER_LEN {
            return Err(AokvError::UnexpectedEof);
        }
        let magic = MagicHeader::decode(bytes)?;
        let key_size = u32::from_ne_bytes(bytes[12..16].try_into().unwrap());
        Ok(Self { magic, key_size })
    }
}

/// An Index block's header is just the shared magic prefix.
pub type IndexHeader = MagicHeader;

/// Trailing back-pointer footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    /// Distance, in bytes, from the start of this footer back to the start
    /// of the nearest earlier Index block (or to file start if none).
    pub back_distance: u32,
}

impl Footer {
    /// Encode to the fixed 4-byte wire representation.
    pub fn encode(&self) -> [u8; FOOTER_LEN] {
        self.back_distance.to_ne_bytes()
    }

    /// Decode from a buffer of at least [`FOOTER_LEN`] bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, AokvError> {
        if bytes.len() < FOOTER_LEN {
            return Err(AokvError::UnexpectedEof);
        }
        Ok(Self {
            back_distance: u32::from_ne_bytes(bytes[0..4].try_into().unwrap()),
        })
    }
}

// Sanity that `IndexHeader` is exactly `INDEX_HEADER_LEN` bytes on the wire.
const _: () = assert!(INDEX_HEADER_LEN == MAGIC_HEADER_LEN);
