//! Property-based coverage for the value and block codecs.

use aokv_codec::{
    decode_index_content, decode_kvp, decode_value, encode_index_content, encode_kvp,
    encode_value, ElementKind, Limits, Value,
};
use proptest::prelude::*;

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(|n| Value::Json(serde_json::json!(n))),
        ".*".prop_map(|s| Value::Json(serde_json::json!(s))),
        prop::collection::vec(any::<u8>(), 0..256).prop_map(Value::RawBytes),
        prop::collection::vec(any::<u8>(), 0..256).prop_map(|bytes| Value::TypedArray {
            kind: ElementKind::U8,
            bytes,
        }),
    ]
}

proptest! {
    #[test]
    fn value_encode_decode_roundtrip(value in arb_value()) {
        let body = encode_value(&value, None).unwrap();
        let decoded = decode_value(&body, None, &Limits::default()).unwrap();
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn kvp_block_roundtrip(
        key in "[a-zA-Z0-9_-]{0,64}",
        body in prop::collection::vec(any::<u8>(), 0..512),
        back_distance in any::<u32>(),
        file_id in any::<u32>(),
    ) {
        let block = encode_kvp(file_id, key.as_bytes(), &body, back_distance);
        let (decoded_key, decoded_body) = decode_kvp(&block, file_id, &Limits::default()).unwrap();
        prop_assert_eq!(decoded_key, key.as_bytes());
        prop_assert_eq!(decoded_body, body.as_slice());
    }

    #[test]
    fn index_content_roundtrip(
        keys in prop::collection::vec("[a-z]{1,12}", 0..20),
    ) {
        let mut map = serde_json::Map::new();
        for (i, key) in keys.iter().enumerate() {
            map.insert(key.clone(), serde_json::json!([i as u64, (i * 2) as u64]));
        }
        let content = encode_index_content(&map, None).unwrap();
        let decoded = decode_index_content(&content, None).unwrap();
        prop_assert_eq!(decoded, map);
    }
}
