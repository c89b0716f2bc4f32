//! Compression collaborators
//!
//! The wire format treats compression as an opaque, externally supplied
//! byte-buffer transform (`compress(bytes) -> bytes` and its inverse) and
//! relies only on the probe-byte rule to detect which form is stored — no
//! compression-specific framing is part of the wire format. `Compressor` and
//! `Decompressor` are the seams applications plug their transform into;
//! [`ZstdCodec`] is the one concrete implementation this crate ships, without
//! hard-wiring it into the block layout.

use aokv_format::{AokvError, Result};

/// A pure, reentrancy-safe compression function.
pub trait Compressor {
    /// Compress `bytes`, returning the compressed form.
    fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>>;
}

/// A pure, reentrancy-safe decompression function.
pub trait Decompressor {
    /// Decompress `bytes`, returning the original form.
    fn decompress(&self, bytes: &[u8]) -> Result<Vec<u8>>;
}

/// Zstandard-backed compressor/decompressor pair.
#[derive(Debug, Clone, Copy)]
pub struct ZstdCodec {
    level: i32,
}

impl ZstdCodec {
    /// Build a codec at the given zstd compression level.
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Default for ZstdCodec {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Compressor for ZstdCodec {
    fn compress(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        zstd::bulk::compress(bytes, self.level)
            .map_err(|e| AokvError::Internal(format!("zstd compress failed: {e}")))
    }
}

impl Decompressor for ZstdCodec {
    fn decompress(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        // Bodies and index content are bounded by `Limits::max_body_len`
        // upstream; zstd needs an a-priori capacity so we pick a generous
        // multiple of the input and let the caller's own limit checks catch
        // anything that still comes back oversized.
        let capacity = bytes.len().saturating_mul(20).max(1 << 16);
        zstd::bulk::decompress(bytes, capacity)
            .map_err(|e| AokvError::Internal(format!("zstd decompress failed: {e}")))
    }
}
