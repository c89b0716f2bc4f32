//! Value and block encoding for the AOKV append-only key-value container.
//!
//! Builds on `aokv-format`'s layout primitives to provide:
//!
//! - Value descriptor encode/decode with the compression probe-byte rule
//! - KVP and Index block framing and parsing
//! - A pluggable compressor/decompressor seam, with a zstd implementation

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod block_codec;
pub mod compress;
pub mod value;

pub use aokv_format::{AokvError, ElementKind, Limits, Result};
pub use block_codec::{
    decode_index, decode_index_content, decode_kvp, encode_index, encode_index_content,
    encode_kvp, identify_header, Identified,
};
pub use compress::{Compressor, Decompressor, ZstdCodec};
pub use value::{decode_value, encode_value, Value};
