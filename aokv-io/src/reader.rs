//! Tail-walk + forward-scan reader engine
//!
//! There is exactly one back-pointer chase to the latest Index block (never
//! a full resync scan for a lost magic), and any short read during the
//! subsequent forward scan ends the scan cleanly instead of searching for a
//! resync point — the partial index is the correct answer, not a
//! best-effort recovery.

use std::collections::HashMap;

use aokv_codec::{decode_index_content, decode_value, identify_header, Decompressor, Identified, Value};
use aokv_format::constants::{
    FOOTER_LEN, INDEX_BASE, INDEX_HEADER_LEN, KVP_HEADER_LEN, MAGIC0,
};
use aokv_format::{AokvError, Limits, MagicHeader, Result};

use crate::pread::ByteSource;

/// Controls over how strictly `index()` validates block headers.
#[derive(Debug, Clone, Copy)]
pub struct IndexOptions {
    /// Verify the first block's magics identify this as an AOKV file for
    /// the configured `fileId` before doing anything else.
    pub check_first_header: bool,
    /// When `true`, an unrecognized-but-in-window magic during forward scan
    /// stops the scan instead of being skipped for forward compatibility.
    pub check_headers: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            check_first_header: true,
            check_headers: false,
        }
    }
}

/// Reader construction options.
pub struct ReaderOptions {
    /// Small integer offsetting the block-type magics for this file.
    pub file_id: u32,
    /// Optional decompression function applied to bodies and index content.
    pub decompressor: Option<Box<dyn Decompressor>>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            file_id: 0,
            decompressor: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct IndexEntry {
    size: u64,
    offset: u64,
}

/// Locates the latest index snapshot and completes it by forward-scanning,
/// then serves point lookups via positioned reads.
pub struct AokvReader<S: ByteSource> {
    source: S,
    file_size: u64,
    file_id: u32,
    decompressor: Option<Box<dyn Decompressor>>,
    limits: Limits,
    keys_order: Vec<String>,
    entries: HashMap<String, IndexEntry>,
    indexed: bool,
}

impl<S: ByteSource> AokvReader<S> {
    /// Construct a fresh, unindexed reader over `source`.
    pub fn new(source: S, opts: ReaderOptions) -> Self {
        let file_size = source.len();
        Self {
            source,
            file_size,
            file_id: opts.file_id,
            decompressor: opts.decompressor,
            limits: Limits::default(),
            keys_order: Vec::new(),
            entries: HashMap::new(),
            indexed: false,
        }
    }

    /// Override the default security limits used while decoding.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Build the in-memory key index: tail-walk to the latest Index
    /// snapshot, then forward-scan newer blocks to complete it.
    pub fn index(&mut self, opts: IndexOptions) -> Result<()> {
        if opts.check_first_header {
            self.check_first_header()?;
        }
        let resume_offset = self.tail_walk();
        self.forward_scan(resume_offset, opts.check_headers);
        self.indexed = true;
        Ok(())
    }

    fn check_first_header(&self) -> Result<()> {
        let header = self
            .source
            .pread(KVP_HEADER_LEN, 0)
            .filter(|b| b.len() == KVP_HEADER_LEN)
            .ok_or(AokvError::NotAokv)?;
        match identify_header(&header, self.file_id) {
            Ok(Identified::Kvp(_)) => Ok(()),
            _ => Err(AokvError::NotAokv),
        }
    }

    /// Chase back-pointers from the file tail to the latest Index block,
    /// merging its entries and returning the offset forward scanning
    /// should resume from. Any failure along the way simply abandons the
    /// tail walk and resumes forward scanning from file start; this is not
    /// a fatal condition, only a slower recovery path.
    fn tail_walk(&mut self) -> u64 {
        if self.file_size < FOOTER_LEN as u64 {
            return 0;
        }
        let footer_offset = self.file_size - FOOTER_LEN as u64;
        let Some(back_bytes) = self
            .source
            .pread(FOOTER_LEN, footer_offset)
            .filter(|b| b.len() == FOOTER_LEN)
        else {
            return 0;
        };
        let back_distance = u32::from_ne_bytes(back_bytes.try_into().unwrap()) as u64;

        let Some(candidate) = footer_offset.checked_sub(back_distance) else {
            return 0;
        };

        let Some(header_bytes) = self
            .source
            .pread(INDEX_HEADER_LEN, candidate)
            .filter(|b| b.len() == INDEX_HEADER_LEN)
        else {
            return 0;
        };
        let Ok(magic) = MagicHeader::decode(&header_bytes) else {
            return 0;
        };
        if magic.magic0 != MAGIC0 || magic.magic1 != INDEX_BASE.wrapping_add(self.file_id) {
            return 0;
        }
        let block_size = magic.block_size as u64;
        let min_size = (INDEX_HEADER_LEN + FOOTER_LEN) as u64;
        if block_size < min_size || block_size as usize > self.limits.max_block_size {
            return 0;
        }
        let content_len = (block_size - min_size) as usize;
        let Some(content) = self
            .source
            .pread(content_len, candidate + INDEX_HEADER_LEN as u64)
            .filter(|b| b.len() == content_len)
        else {
            return 0;
        };
        let Ok(map) = decode_index_content(&content, self.decompressor.as_deref()) else {
            return 0;
        };
        for (key, entry) in map {
            if let Some((size, offset)) = parse_index_entry(&entry) {
                self.merge_entry(key, IndexEntry { size, offset });
            }
        }
        candidate + block_size
    }

    /// Forward-scan from `off` to `file_size`, completing the index with
    /// any KVP blocks newer than the snapshot found by `tail_walk`.
    fn forward_scan(&mut self, mut off: u64, check_headers: bool) {
        while off < self.file_size {
            let Some(header) = self
                .source
                .pread(KVP_HEADER_LEN, off)
                .filter(|b| b.len() == KVP_HEADER_LEN)
            else {
                break;
            };
            let identified = match identify_header(&header, self.file_id) {
                Ok(identified) => identified,
                Err(_) => break,
            };
            match identified {
                Identified::Kvp(kvp_header) => {
                    let block_size = kvp_header.magic.block_size as u64;
                    let key_size = kvp_header.key_size as u64;
                    if block_size as usize > self.limits.max_block_size
                        || key_size as usize > self.limits.max_key_len
                    {
                        break;
                    }
                    let min_size = (KVP_HEADER_LEN as u64) + key_size + FOOTER_LEN as u64;
                    if block_size < min_size {
                        break;
                    }
                    let Some(key_bytes) = self
                        .source
                        .pread(key_size as usize, off + KVP_HEADER_LEN as u64)
                        .filter(|b| b.len() as u64 == key_size)
                    else {
                        break;
                    };
                    let Ok(key) = String::from_utf8(key_bytes) else {
                        break;
                    };
                    let body_size = block_size - min_size;
                    let offset = off + KVP_HEADER_LEN as u64 + key_size;
                    self.merge_entry(
                        key,
                        IndexEntry {
                            size: body_size,
                            offset,
                        },
                    );
                    off += block_size;
                }
                Identified::Index(magic) => {
                    if magic.block_size as usize > self.limits.max_block_size {
                        break;
                    }
                    off += magic.block_size as u64;
                }
                Identified::Unrecognized => {
                    let Ok(magic) = MagicHeader::decode(&header) else {
                        break;
                    };
                    if !check_headers && magic.in_reserved_window() {
                        off += magic.block_size as u64;
                    } else {
                        break;
                    }
                }
            }
        }
    }

    fn merge_entry(&mut self, key: String, entry: IndexEntry) {
        if !self.entries.contains_key(&key) {
            self.keys_order.push(key.clone());
        }
        self.entries.insert(key, entry);
    }

    /// All known keys, in first-occurrence order.
    pub fn keys(&self) -> &[String] {
        &self.keys_order
    }

    /// Look up `key`, decoding and returning its current value.
    ///
    /// Returns `Ok(None)` if the key is unknown or its stored body was
    /// truncated (truncation is treated as absence, not error, per the
    /// prefix-validity invariant). A JSON-null value decodes successfully
    /// and is returned as `Some(Value::Json(Null))`, distinct from absence.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        if !self.indexed {
            return Err(AokvError::NotIndexed);
        }
        let Some(entry) = self.entries.get(key) else {
            return Ok(None);
        };
        if entry.size as usize > self.limits.max_block_size {
            return Ok(None);
        }
        let Some(body) = self
            .source
            .pread(entry.size as usize, entry.offset)
            .filter(|b| b.len() as u64 == entry.size)
        else {
            return Ok(None);
        };
        let value = decode_value(&body, self.decompressor.as_deref(), &self.limits)?;
        Ok(Some(value))
    }
}

fn parse_index_entry(value: &serde_json::Value) -> Option<(u64, u64)> {
    let array = value.as_array()?;
    let size = array.first()?.as_u64()?;
    let offset = array.get(1)?.as_u64()?;
    Some((size, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pread::SliceSource;
    use crate::writer::{AokvWriter, WriterOptions};

    fn build_file(sets: &[(&str, Value)]) -> Vec<u8> {
        let mut writer = AokvWriter::new(WriterOptions::default());
        for (key, value) in sets {
            writer.set(key, value).unwrap();
        }
        let finish = writer.end().unwrap();
        finish.stream.drain_to_vec()
    }

    #[test]
    fn get_before_index_is_error() {
        let bytes = build_file(&[("a", Value::Json(serde_json::json!(1)))]);
        let reader = AokvReader::new(SliceSource::new(bytes), ReaderOptions::default());
        assert!(matches!(reader.get("a"), Err(AokvError::NotIndexed)));
    }

    #[test]
    fn round_trip_single_key() {
        let bytes = build_file(&[("a", Value::Json(serde_json::json!({"n": 1})))]);
        let mut reader = AokvReader::new(SliceSource::new(bytes), ReaderOptions::default());
        reader.index(IndexOptions::default()).unwrap();
        assert_eq!(reader.keys(), &["a".to_string()]);
        assert_eq!(
            reader.get("a").unwrap(),
            Some(Value::Json(serde_json::json!({"n": 1})))
        );
        assert_eq!(reader.get("missing").unwrap(), None);
    }

    #[test]
    fn later_write_shadows_earlier_one() {
        let bytes = build_file(&[
            ("a", Value::Json(serde_json::json!(1))),
            ("a", Value::Json(serde_json::json!(2))),
        ]);
        let mut reader = AokvReader::new(SliceSource::new(bytes), ReaderOptions::default());
        reader.index(IndexOptions::default()).unwrap();
        assert_eq!(reader.keys(), &["a".to_string()]);
        assert_eq!(reader.get("a").unwrap(), Some(Value::Json(serde_json::json!(2))));
    }

    #[test]
    fn remove_is_a_null_tombstone() {
        let mut writer = AokvWriter::new(WriterOptions::default());
        writer.set("a", &Value::Json(serde_json::json!(1))).unwrap();
        writer.remove("a").unwrap();
        let finish = writer.end().unwrap();
        let bytes = finish.stream.drain_to_vec();
        let mut reader = AokvReader::new(SliceSource::new(bytes), ReaderOptions::default());
        reader.index(IndexOptions::default()).unwrap();
        assert_eq!(reader.get("a").unwrap(), Some(Value::Json(serde_json::Value::Null)));
    }

    #[test]
    fn wrong_file_id_fails_not_aokv() {
        let bytes = build_file(&[("a", Value::Json(serde_json::json!(1)))]);
        let mut reader = AokvReader::new(
            SliceSource::new(bytes),
            ReaderOptions {
                file_id: 7,
                decompressor: None,
            },
        );
        assert!(matches!(
            reader.index(IndexOptions::default()),
            Err(AokvError::NotAokv)
        ));
    }

    #[test]
    fn truncated_tail_yields_partial_index() {
        let bytes = build_file(&[
            ("a", Value::Json(serde_json::json!(1))),
            ("b", Value::Json(serde_json::json!(2))),
            ("c", Value::Json(serde_json::json!(3))),
        ]);
        let cut = bytes.len() * 9 / 10;
        let truncated = bytes[..cut].to_vec();
        let mut reader = AokvReader::new(SliceSource::new(truncated), ReaderOptions::default());
        reader.index(IndexOptions::default()).unwrap();
        assert!(!reader.keys().is_empty());
        assert!(reader.keys().len() <= 3);
    }
}
