//! Writer and reader engines for the AOKV append-only key-value container.
//!
//! This crate owns the two stateful engines that turn a key-value store into
//! a framed byte stream and back:
//! [`AokvWriter`] drives serialization into framed blocks and feeds a
//! pull-based [`stream::ChunkStream`]; [`AokvReader`] locates the latest
//! index snapshot by chasing back-pointers from the file tail, then
//! forward-scans to complete it before serving point lookups through a
//! [`pread::ByteSource`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod pread;
pub mod reader;
pub mod stream;
pub mod writer;

pub use aokv_codec::{Compressor, Decompressor, ElementKind, Value, ZstdCodec};
pub use aokv_format::{AokvError, Limits, Result};
pub use pread::{ByteSource, FileSource, SliceSource};
pub use reader::{AokvReader, IndexOptions, ReaderOptions};
pub use stream::{ChunkStream, Pull};
pub use writer::{AokvWriter, WriterFinish, WriterMetrics, WriterOptions};
