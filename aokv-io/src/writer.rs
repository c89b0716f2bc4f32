//! Streaming writer engine
//!
//! Accumulates key-value state, emits framed blocks, tracks metrics, and
//! warns on drop-without-finish, targeting a pull-based [`ChunkStream`]
//! instead of a `Write` sink: the writer is a producer with no opinion on
//! how its bytes eventually reach durable storage.

use std::collections::HashMap;

use aokv_codec::{encode_index, encode_index_content, encode_kvp, encode_value, Compressor, Value};
use aokv_format::constants::{
    FORCE_SNAPSHOT_DISTANCE, KVP_HEADER_LEN, SNAPSHOT_AMORTIZATION_FACTOR, SNAPSHOT_MIN_KVP_BYTES,
};
use aokv_format::Result;

use crate::stream::ChunkStream;

/// Writer construction options.
pub struct WriterOptions {
    /// Small integer offsetting the block-type magics for this file.
    pub file_id: u32,
    /// Optional compression function applied to bodies and index content.
    pub compressor: Option<Box<dyn Compressor>>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            file_id: 0,
            compressor: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct IndexEntry {
    size: u64,
    offset: u64,
}

/// Drives serialization of key/value writes into framed AOKV blocks.
pub struct AokvWriter {
    file_id: u32,
    compressor: Option<Box<dyn Compressor>>,
    stream: ChunkStream,
    total_size: u64,
    keys_order: Vec<String>,
    entries: HashMap<String, IndexEntry>,
    since_last_index: u64,
    kvp_bytes_since_index: u64,
    total_index_bytes: u64,
    ended: bool,
    metrics: WriterMetrics,
}

impl AokvWriter {
    /// Construct a fresh writer; call [`AokvWriter::stream`] to obtain the
    /// consumer-side handle before writing anything, since blocks are
    /// enqueued as soon as `set`/`remove`/`end` are called.
    pub fn new(opts: WriterOptions) -> Self {
        Self {
            file_id: opts.file_id,
            compressor: opts.compressor,
            stream: ChunkStream::new(),
            total_size: 0,
            keys_order: Vec::new(),
            entries: HashMap::new(),
            since_last_index: 0,
            kvp_bytes_since_index: 0,
            total_index_bytes: 0,
            ended: false,
            metrics: WriterMetrics::default(),
        }
    }

    /// The consumer-side handle that drains emitted blocks.
    pub fn stream(&self) -> ChunkStream {
        self.stream.clone()
    }

    /// Total bytes produced so far.
    pub fn size(&self) -> u64 {
        self.total_size
    }

    /// Snapshot of writer metrics, useful for progress reporting.
    pub fn metrics(&self) -> WriterMetrics {
        self.metrics
    }

    /// Record `key -> value`, superseding any prior value for `key`.
    pub fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        let body = encode_value(value, self.compressor.as_deref())?;
        let key_bytes = key.as_bytes();
        let unfootered_len = (KVP_HEADER_LEN + key_bytes.len() + body.len()) as u64;
        let back_distance = self.since_last_index + unfootered_len;
        let block = encode_kvp(
            self.file_id,
            key_bytes,
            &body,
            u32::try_from(back_distance).unwrap_or(u32::MAX),
        );
        let block_len = block.len() as u64;

        let body_offset = self.total_size + KVP_HEADER_LEN as u64 + key_bytes.len() as u64;
        if !self.entries.contains_key(key) {
            self.keys_order.push(key.to_string());
        }
        self.entries.insert(
            key.to_string(),
            IndexEntry {
                size: body.len() as u64,
                offset: body_offset,
            },
        );

        self.total_size += block_len;
        self.since_last_index += block_len;
        self.kvp_bytes_since_index += block_len;
        self.metrics.kvps_written += 1;
        self.metrics.bytes_written += block_len;

        self.stream.push(block);

        if self.should_snapshot() {
            self.write_index_block()?;
        }
        Ok(())
    }

    /// Remove `key`, modeled as writing a JSON-null tombstone value (the
    /// append-only invariant forbids real deletion).
    pub fn remove(&mut self, key: &str) -> Result<()> {
        self.set(key, &Value::tombstone())
    }

    fn should_snapshot(&self) -> bool {
        self.since_last_index >= FORCE_SNAPSHOT_DISTANCE
            || (self.kvp_bytes_since_index >= SNAPSHOT_MIN_KVP_BYTES
                && self.kvp_bytes_since_index >= SNAPSHOT_AMORTIZATION_FACTOR * self.total_index_bytes)
    }

    fn write_index_block(&mut self) -> Result<()> {
        let mut map = serde_json::Map::with_capacity(self.keys_order.len());
        for key in &self.keys_order {
            if let Some(entry) = self.entries.get(key) {
                map.insert(
                    key.clone(),
                    serde_json::json!([entry.size, entry.offset]),
                );
            }
        }
        let content = encode_index_content(&map, self.compressor.as_deref())?;
        let block = encode_index(self.file_id, &content);
        let block_len = block.len() as u64;

        self.total_size += block_len;
        self.since_last_index = 0;
        self.kvp_bytes_since_index = 0;
        self.total_index_bytes = block_len;
        self.metrics.index_blocks_written += 1;
        self.metrics.bytes_written += block_len;

        self.stream.push(block);
        Ok(())
    }

    /// Finish the writer: always emit a final index snapshot, then close
    /// the stream. No further writes are accepted afterward.
    pub fn end(mut self) -> Result<WriterFinish> {
        self.write_index_block()?;
        self.stream.close();
        self.ended = true;
        Ok(WriterFinish {
            stream: self.stream.clone(),
            metrics: self.metrics,
        })
    }
}

impl Drop for AokvWriter {
    fn drop(&mut self) {
        if !self.ended {
            log::warn!("AokvWriter dropped without calling end() - data may be lost");
        }
    }
}

/// Result of [`AokvWriter::end`]: the closed stream plus final metrics.
pub struct WriterFinish {
    /// The now-closed stream; further `pull`s return `Closed` once drained.
    pub stream: ChunkStream,
    /// Accumulated metrics describing the write session.
    pub metrics: WriterMetrics,
}

/// Metrics describing a write session, useful for progress reporting.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriterMetrics {
    /// Number of KVP blocks written (including tombstones).
    pub kvps_written: u64,
    /// Number of Index snapshot blocks written.
    pub index_blocks_written: u64,
    /// Total bytes enqueued onto the stream.
    pub bytes_written: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::Pull;

    #[test]
    fn set_enqueues_a_kvp_block() {
        let mut writer = AokvWriter::new(WriterOptions::default());
        writer.set("a", &Value::Json(serde_json::json!(1))).unwrap();
        match writer.stream().pull() {
            Pull::Chunk(chunk) => assert!(!chunk.is_empty()),
            other => panic!("expected a chunk, got {other:?}"),
        }
    }

    #[test]
    fn end_always_emits_a_final_index() {
        let mut writer = AokvWriter::new(WriterOptions::default());
        writer.set("a", &Value::Json(serde_json::json!(1))).unwrap();
        let stream = writer.stream();
        let _ = stream.pull(); // drain the kvp block
        let finish = writer.end().unwrap();
        assert_eq!(finish.metrics.index_blocks_written, 1);
        assert!(matches!(finish.stream.pull(), Pull::Chunk(_)));
        assert!(matches!(finish.stream.pull(), Pull::Closed));
    }

    #[test]
    fn size_grows_monotonically() {
        let mut writer = AokvWriter::new(WriterOptions::default());
        assert_eq!(writer.size(), 0);
        writer.set("a", &Value::RawBytes(vec![0; 64])).unwrap();
        let after_one = writer.size();
        assert!(after_one > 0);
        writer.set("b", &Value::RawBytes(vec![0; 64])).unwrap();
        assert!(writer.size() > after_one);
    }
}
