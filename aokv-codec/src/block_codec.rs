//! KVP and Index block framing
//!
//! Wraps an already-encoded body (see [`crate::value`]) or index content in
//! the magic header / footer envelope, and parses that envelope back out of
//! a fully-read block buffer. Positioned reads themselves — deciding how
//! many bytes to read and from where — belong to the reader engine in
//! `aokv-io`; this module only shapes bytes already in memory.

use aokv_format::constants::{
    FOOTER_LEN, INDEX_BASE, INDEX_HEADER_LEN, INDEX_PROBE_OFFSET, KVP_BASE, KVP_HEADER_LEN,
    MAGIC0, UNCOMPRESSED_PROBE_BYTE,
};
use aokv_format::{AokvError, Footer, KvpHeader, Limits, MagicHeader, Result};

use crate::compress::{Compressor, Decompressor};

/// Outcome of inspecting a block's leading magic header.
#[derive(Debug, Clone)]
pub enum Identified {
    /// A KVP block belonging to the configured `fileId`.
    Kvp(KvpHeader),
    /// An Index block belonging to the configured `fileId`.
    Index(MagicHeader),
    /// Parsed magics but not a recognized block for this `fileId`.
    Unrecognized,
}

/// Inspect up to [`KVP_HEADER_LEN`] leading bytes of a block and classify it.
///
/// Callers that only have [`INDEX_HEADER_LEN`] bytes available should pad
/// with zeroes or otherwise ensure the buffer is at least that long; a
/// buffer shorter than the magic header is always an `UnexpectedEof`.
pub fn identify_header(bytes: &[u8], file_id: u32) -> Result<Identified> {
    let magic = MagicHeader::decode(bytes)?;
    if magic.magic0 != MAGIC0 {
        return Ok(Identified::Unrecognized);
    }
    if magic.magic1 == KVP_BASE.wrapping_add(file_id) {
        if bytes.len() < KVP_HEADER_LEN {
            return Err(AokvError::UnexpectedEof);
        }
        return Ok(Identified::Kvp(KvpHeader::decode(bytes)?));
    }
    if magic.magic1 == INDEX_BASE.wrapping_add(file_id) {
        return Ok(Identified::Index(magic));
    }
    Ok(Identified::Unrecognized)
}

/// Encode a complete KVP block: header, key, body, and footer.
///
/// `back_distance` is the writer's running byte count since the most recent
/// Index block (or since file start), plus this block's own header and
/// content — the writer engine, not this function, tracks that count.
pub fn encode_kvp(file_id: u32, key: &[u8], body: &[u8], back_distance: u32) -> Vec<u8> {
    let block_size = (KVP_HEADER_LEN + key.len() + body.len() + FOOTER_LEN) as u32;
    let header = KvpHeader {
        magic: MagicHeader {
            magic0: MAGIC0,
            magic1: KVP_BASE.wrapping_add(file_id),
            block_size,
        },
        key_size: key.len() as u32,
    };
    let mut out = Vec::with_capacity(block_size as usize);
    out.extend_from_slice(&header.encode());
    out.extend_from_slice(key);
    out.extend_from_slice(body);
    out.extend_from_slice(&Footer { back_distance }.encode());
    out
}

/// Decode a fully-read KVP block buffer into its key and body.
pub fn decode_kvp<'a>(bytes: &'a [u8], file_id: u32, limits: &Limits) -> Result<(&'a [u8], &'a [u8])> {
    if bytes.len() < KVP_HEADER_LEN + FOOTER_LEN {
        return Err(AokvError::UnexpectedEof);
    }
    let header = match identify_header(bytes, file_id)? {
        Identified::Kvp(header) => header,
        _ => return Err(AokvError::CorruptBlock),
    };
    let block_size = header.magic.block_size as usize;
    if block_size > limits.max_block_size || block_size != bytes.len() {
        return Err(AokvError::CorruptBlock);
    }
    let key_size = header.key_size as usize;
    if key_size > limits.max_key_len {
        return Err(AokvError::LimitExceeded(format!(
            "key size {key_size} exceeds max_key_len {}",
            limits.max_key_len
        )));
    }
    let key_start = KVP_HEADER_LEN;
    let key_end = key_start
        .checked_add(key_size)
        .ok_or(AokvError::CorruptBlock)?;
    let body_end = block_size
        .checked_sub(FOOTER_LEN)
        .ok_or(AokvError::CorruptBlock)?;
    if key_end > body_end || body_end > bytes.len() {
        return Err(AokvError::CorruptBlock);
    }
    Ok((&bytes[key_start..key_end], &bytes[key_end..body_end]))
}

/// Encode a complete Index block: header, content, and self-pointing footer.
///
/// The footer's `back_distance` is measured from the footer's own start back
/// to the block's start, the same convention `encode_kvp` uses — not the
/// full block size, which would overshoot by [`FOOTER_LEN`] bytes and land
/// the tail-walk's `footer_offset - back_distance` short of the header.
pub fn encode_index(file_id: u32, content: &[u8]) -> Vec<u8> {
    let block_size = (INDEX_HEADER_LEN + content.len() + FOOTER_LEN) as u32;
    let header = MagicHeader {
        magic0: MAGIC0,
        magic1: INDEX_BASE.wrapping_add(file_id),
        block_size,
    };
    let mut out = Vec::with_capacity(block_size as usize);
    out.extend_from_slice(&header.encode());
    out.extend_from_slice(content);
    out.extend_from_slice(
        &Footer {
            back_distance: block_size - FOOTER_LEN as u32,
        }
        .encode(),
    );
    out
}

/// Decode a fully-read Index block buffer into its content bytes.
pub fn decode_index<'a>(bytes: &'a [u8], file_id: u32, limits: &Limits) -> Result<&'a [u8]> {
    if bytes.len() < INDEX_HEADER_LEN + FOOTER_LEN {
        return Err(AokvError::UnexpectedEof);
    }
    let header = match identify_header(bytes, file_id)? {
        Identified::Index(header) => header,
        _ => return Err(AokvError::CorruptBlock),
    };
    let block_size = header.block_size as usize;
    if block_size > limits.max_block_size || block_size != bytes.len() {
        return Err(AokvError::CorruptBlock);
    }
    let content_end = block_size
        .checked_sub(FOOTER_LEN)
        .ok_or(AokvError::CorruptBlock)?;
    Ok(&bytes[INDEX_HEADER_LEN..content_end])
}

/// Encode index content (the key -> `[size, offset]` map), applying
/// `compressor` under the byte-0 probe rule.
pub fn encode_index_content(
    entries: &serde_json::Map<String, serde_json::Value>,
    compressor: Option<&dyn Compressor>,
) -> Result<Vec<u8>> {
    let content = serde_json::to_vec(&serde_json::Value::Object(entries.clone()))?;
    if let Some(compressor) = compressor {
        let compressed = compressor.compress(&content)?;
        let probe_is_uncompressed_marker = compressed
            .get(INDEX_PROBE_OFFSET)
            .is_some_and(|&b| b == UNCOMPRESSED_PROBE_BYTE);
        if compressed.len() < content.len() && !probe_is_uncompressed_marker {
            return Ok(compressed);
        }
    }
    Ok(content)
}

/// Decode index content back into the key -> `[size, offset]` map.
pub fn decode_index_content(
    content: &[u8],
    decompressor: Option<&dyn Decompressor>,
) -> Result<serde_json::Map<String, serde_json::Value>> {
    let decompressed;
    let bytes: &[u8] = match decompressor {
        Some(decompressor)
            if content.len() > INDEX_PROBE_OFFSET
                && content[INDEX_PROBE_OFFSET] != UNCOMPRESSED_PROBE_BYTE =>
        {
            decompressed = decompressor.decompress(content)?;
            &decompressed
        }
        _ => content,
    };
    match serde_json::from_slice(bytes)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(AokvError::CorruptBlock),
    }
}
