//! Value descriptor and body encode/decode
//!
//! A body is `u32 descSz | descriptor:json[descSz] | post:bytes[*]`, optionally
//! replaced wholesale by its compressed form when that form is both strictly
//! shorter and does not collide with the in-band probe byte.

use aokv_format::constants::{BODY_PROBE_OFFSET, UNCOMPRESSED_PROBE_BYTE};
use aokv_format::{AokvError, ElementKind, Limits, Result};
use serde::{Deserialize, Serialize};

use crate::compress::{Compressor, Decompressor};

/// The small JSON object persisted at the head of every body.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Descriptor {
    t: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    a: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    d: Option<serde_json::Value>,
}

/// A decoded AOKV value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A JSON scalar or object, stored inline in the descriptor.
    Json(serde_json::Value),
    /// A typed numeric array, stored as raw element bytes in the post.
    TypedArray {
        /// Element interpretation of the array.
        kind: ElementKind,
        /// Raw little-endian element bytes.
        bytes: Vec<u8>,
    },
    /// An opaque byte buffer with no further interpretation.
    RawBytes(Vec<u8>),
}

impl Value {
    /// Construct a JSON-tombstone value (used to model logical removal,
    /// since the append-only invariant forbids deletion).
    pub fn tombstone() -> Self {
        Value::Json(serde_json::Value::Null)
    }
}

/// Encode a value to its body form, applying `compressor` under the probe rule.
pub fn encode_value(value: &Value, compressor: Option<&dyn Compressor>) -> Result<Vec<u8>> {
    let (descriptor, post): (Descriptor, &[u8]) = match value {
        Value::Json(json) => (
            Descriptor {
                t: 0,
                a: None,
                d: Some(json.clone()),
            },
            &[][..],
        ),
        Value::TypedArray { kind, bytes } => (
            Descriptor {
                t: 1,
                a: Some(kind.tag().to_string()),
                d: None,
            },
            bytes.as_slice(),
        ),
        Value::RawBytes(bytes) => (
            Descriptor {
                t: 2,
                a: None,
                d: None,
            },
            bytes.as_slice(),
        ),
    };

    let descriptor_json = serde_json::to_vec(&descriptor)?;
    let mut body = Vec::with_capacity(4 + descriptor_json.len() + post.len());
    body.extend_from_slice(&(descriptor_json.len() as u32).to_ne_bytes());
    body.extend_from_slice(&descriptor_json);
    body.extend_from_slice(post);

    if let Some(compressor) = compressor {
        let compressed = compressor.compress(&body)?;
        let probe_is_uncompressed_marker = compressed
            .get(BODY_PROBE_OFFSET)
            .is_some_and(|&b| b == UNCOMPRESSED_PROBE_BYTE);
        if compressed.len() < body.len() && !probe_is_uncompressed_marker {
            return Ok(compressed);
        }
    }
    Ok(body)
}

/// Decode a body back into a value, consulting `decompressor` under the probe rule.
pub fn decode_value(
    body: &[u8],
    decompressor: Option<&dyn Decompressor>,
    limits: &Limits,
) -> Result<Value> {
    let decompressed;
    let bytes: &[u8] = match decompressor {
        Some(decompressor)
            if body.len() > BODY_PROBE_OFFSET
                && body[BODY_PROBE_OFFSET] != UNCOMPRESSED_PROBE_BYTE =>
        {
            decompressed = decompressor.decompress(body)?;
            &decompressed
        }
        _ => body,
    };

    if bytes.len() < 4 {
        return Err(AokvError::UnexpectedEof);
    }
    let desc_size = u32::from_ne_bytes(bytes[0..4].try_into().unwrap()) as usize;
    if desc_size > limits.max_body_len {
        return Err(AokvError::LimitExceeded(format!(
            "descriptor size {desc_size} exceeds max_body_len {}",
            limits.max_body_len
        )));
    }
    let descriptor_end = 4usize
        .checked_add(desc_size)
        .ok_or(AokvError::CorruptBlock)?;
    if descriptor_end > bytes.len() {
        return Err(AokvError::UnexpectedEof);
    }

    let descriptor: Descriptor = serde_json::from_slice(&bytes[4..descriptor_end])?;
    let post = &bytes[descriptor_end..];
    if post.len() > limits.max_body_len {
        return Err(AokvError::LimitExceeded(format!(
            "post size {} exceeds max_body_len {}",
            post.len(),
            limits.max_body_len
        )));
    }

    match descriptor.t {
        0 => Ok(Value::Json(descriptor.d.unwrap_or(serde_json::Value::Null))),
        1 => {
            let tag = descriptor.a.ok_or(AokvError::BadVariant)?;
            let kind = ElementKind::from_tag(&tag)?;
            Ok(Value::TypedArray {
                kind,
                bytes: post.to_vec(),
            })
        }
        2 => Ok(Value::RawBytes(post.to_vec())),
        _ => Err(AokvError::BadVariant),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::ZstdCodec;

    #[test]
    fn json_roundtrip_uncompressed() {
        let value = Value::Json(serde_json::json!({"a": 1, "b": "two"}));
        let body = encode_value(&value, None).unwrap();
        assert_eq!(body[BODY_PROBE_OFFSET], UNCOMPRESSED_PROBE_BYTE);
        let decoded = decode_value(&body, None, &Limits::default()).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn typed_array_roundtrip() {
        let value = Value::TypedArray {
            kind: ElementKind::F64,
            bytes: 3.5f64.to_ne_bytes().to_vec(),
        };
        let body = encode_value(&value, None).unwrap();
        let decoded = decode_value(&body, None, &Limits::default()).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn raw_bytes_roundtrip() {
        let value = Value::RawBytes(vec![1, 2, 3, 4, 5]);
        let body = encode_value(&value, None).unwrap();
        let decoded = decode_value(&body, None, &Limits::default()).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn tombstone_is_json_null() {
        let body = encode_value(&Value::tombstone(), None).unwrap();
        assert_eq!(
            decode_value(&body, None, &Limits::default()).unwrap(),
            Value::Json(serde_json::Value::Null)
        );
    }

    #[test]
    fn compressed_roundtrip_large_repetitive_value() {
        let payload = "x".repeat(10_000);
        let value = Value::Json(serde_json::json!({"payload": payload}));
        let codec = ZstdCodec::default();
        let body = encode_value(&value, Some(&codec)).unwrap();
        assert!(body.len() < 10_000, "compressed body should shrink");
        let decoded = decode_value(&body, Some(&codec), &Limits::default()).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn non_finite_float_is_silently_dropped_to_null() {
        // `serde_json::Value::from(f64::NAN)` already collapses to `Null`
        // before it ever reaches the descriptor encoder — this is the host
        // JSON encoder's dialect, not a behavior this crate adds.
        let nan_as_json = serde_json::Value::from(f64::NAN);
        assert_eq!(nan_as_json, serde_json::Value::Null);

        let value = Value::Json(nan_as_json);
        let body = encode_value(&value, None).unwrap();
        assert_eq!(
            decode_value(&body, None, &Limits::default()).unwrap(),
            Value::Json(serde_json::Value::Null)
        );
    }

    #[test]
    fn unrecognized_typed_array_tag_rejected() {
        let descriptor = Descriptor {
            t: 1,
            a: Some("i64".to_string()),
            d: None,
        };
        let descriptor_json = serde_json::to_vec(&descriptor).unwrap();
        let mut body = Vec::new();
        body.extend_from_slice(&(descriptor_json.len() as u32).to_ne_bytes());
        body.extend_from_slice(&descriptor_json);
        assert!(matches!(
            decode_value(&body, None, &Limits::default()),
            Err(AokvError::BadTypedArray(_))
        ));
    }
}
