//! Security limits guarding against malformed or adversarial files
//!
//! AOKV performs no integrity checking, so a reader walking an untrusted
//! file must bound every length it reads off the wire *before* acting on
//! it — otherwise a single corrupt `u32` could force an unbounded
//! allocation or an out-of-bounds read. `Limits` centralizes those bounds
//! across the two quantities a block can claim: key length and body
//! length.

/// Limits enforced while decoding blocks and values.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum key length in bytes.
    pub max_key_len: usize,
    /// Maximum body length in bytes (post-decompression).
    pub max_body_len: usize,
    /// Maximum size of a single block, including headers and footer.
    pub max_block_size: usize,
    /// Maximum number of entries accepted out of a single Index block.
    pub max_index_entries: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_key_len: 1024 * 1024,
            max_body_len: 64 * 1024 * 1024,
            max_block_size: 128 * 1024 * 1024,
            max_index_entries: 16 * 1024 * 1024,
        }
    }
}
