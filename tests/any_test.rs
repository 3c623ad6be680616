use anycodec::*;
use std::collections::BTreeMap;

fn round_trip(value: &Value) -> Value {
    decode(&encode(value)).unwrap()
}

fn map(entries: &[(&str, Value)]) -> Value {
    entries.iter().map(|(k, v)| (*k, v.clone())).collect()
}

#[test]
fn test_tag_table() {
    assert_eq!(TAG_UNDEFINED, 127);
    assert_eq!(TAG_BINARY, 116);
    assert_eq!(Tag::from_u8(119), Some(Tag::String));
    assert_eq!(Tag::from_u8(115), None);
    assert_eq!(Tag::from_u8(128), None);
    assert_eq!(Tag::Undefined.index(), 0);
    assert_eq!(Tag::Binary.index(), 11);
    assert!(matches!(Tag::try_from(3), Err(DecodeError::UnknownTag(3))));
}

#[test]
fn test_constant_tags() {
    assert_eq!(&encode(&Value::Undefined)[..], &[127]);
    assert_eq!(&encode(&Value::Null)[..], &[126]);
    assert_eq!(&encode(&Value::Bool(false))[..], &[121]);
    assert_eq!(&encode(&Value::Bool(true))[..], &[120]);
}

#[test]
fn test_binary_blob() {
    let value = Value::Bytes(Bytes::from_static(&[1, 9, 0, 255]));
    let bytes = encode(&value);
    assert_eq!(&bytes[..], &[116, 4, 1, 9, 0, 255]);
    assert_eq!(decode(&bytes).unwrap(), value);
}

#[test]
fn test_decode_bytes_shares_blob_storage() {
    let bytes = encode(&Value::Bytes(Bytes::from_static(b"blob")));
    let value = decode_bytes(bytes.clone()).unwrap();
    let blob = value.as_bytes().unwrap();
    assert_eq!(&blob[..], b"blob");
    assert_eq!(blob.as_ptr(), bytes[2..].as_ptr());
}

#[test]
fn test_small_integers_use_varint() {
    assert_eq!(&encode(&Value::Int(0))[..], &[125, 0x00]);
    assert_eq!(&encode(&Value::Int(300))[..], &[125, 0xAC, 0x04]);
    assert_eq!(&encode(&Value::Int(-1))[..], &[125, 0x41]);
    // integral floats are written the same way
    assert_eq!(&encode(&Value::F64(300.0))[..], &[125, 0xAC, 0x04]);
    assert_eq!(round_trip(&Value::F64(3.0)), Value::Int(3));
    assert!(matches!(round_trip(&Value::F64(3.0)), Value::Int(3)));
}

#[test]
fn test_int32_limits() {
    let max = Value::Int(i32::MAX as i64);
    assert_eq!(encode(&max)[0], TAG_INTEGER);
    assert_eq!(round_trip(&max), max);

    let min = Value::Int(-(i32::MAX as i64));
    assert_eq!(encode(&min)[0], TAG_INTEGER);
    assert_eq!(round_trip(&min), min);

    // one past the varint range falls through to a float
    let beyond = Value::Int(i32::MAX as i64 + 1);
    assert_eq!(encode(&beyond)[0], TAG_FLOAT32);
    assert_eq!(round_trip(&beyond), beyond);

    let beyond = Value::Int(i32::MAX as i64 + 2);
    assert_eq!(encode(&beyond)[0], TAG_FLOAT64);
    assert_eq!(round_trip(&beyond), beyond);
}

#[test]
fn test_large_integers() {
    let safe = Value::Int(MAX_SAFE_INTEGER as i64);
    assert_eq!(encode(&safe)[0], TAG_FLOAT64);
    assert_eq!(round_trip(&safe), safe);

    let big = Value::Int(i64::MAX);
    let bytes = encode(&big);
    assert_eq!(&bytes[..], &[122, 0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    assert!(matches!(decode(&bytes).unwrap(), Value::BigInt(i64::MAX)));

    let negative = Value::BigInt(-5);
    let bytes = encode(&negative);
    assert_eq!(&bytes[..], &[122, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFB]);
    assert_eq!(round_trip(&negative), Value::Int(-5));
}

#[test]
fn test_float_width_selection() {
    let half = encode(&Value::F64(1.5));
    assert_eq!(&half[..], &[124, 0x3F, 0xC0, 0x00, 0x00]);
    assert!(matches!(decode(&half).unwrap(), Value::F32(f) if f == 1.5));

    let tenth = encode(&Value::F64(0.1));
    assert_eq!(tenth[0], TAG_FLOAT64);
    assert_eq!(&tenth[1..], &0.1f64.to_be_bytes());
    assert!(matches!(decode(&tenth).unwrap(), Value::F64(f) if f == 0.1));

    // an f32 value widens exactly, so it stays 4 bytes
    let single = encode(&Value::F32(0.1));
    assert_eq!(single.len(), 5);
    assert_eq!(round_trip(&Value::F32(0.1)), Value::F32(0.1));
}

#[test]
fn test_non_finite_floats() {
    for f in [f64::INFINITY, f64::NEG_INFINITY] {
        let bytes = encode(&Value::F64(f));
        assert_eq!(bytes[0], TAG_FLOAT32);
        assert_eq!(round_trip(&Value::F64(f)), Value::F64(f));
    }
    let nan = round_trip(&Value::F64(f64::NAN));
    assert!(nan.as_f64().unwrap().is_nan());
}

#[test]
fn test_negative_zero() {
    let bytes = encode(&Value::F64(-0.0));
    assert_eq!(&bytes[..], &[125, 0x40]);
    match decode(&bytes).unwrap() {
        Value::F64(f) => {
            assert_eq!(f, 0.0);
            assert!(f.is_sign_negative());
        }
        other => panic!("expected F64, got {:?}", other),
    }
    assert_eq!(&encode(&Value::F64(0.0))[..], &[125, 0x00]);
}

#[test]
fn test_strings() {
    assert_eq!(&encode(&Value::from("hi"))[..], &[119, 2, b'h', b'i']);
    let text = Value::from("héllo wörld 😀");
    assert_eq!(round_trip(&text), text);
}

#[test]
fn test_object_keys_are_sorted() {
    let value = map(&[("b", Value::Int(1)), ("a", Value::Int(2))]);
    let bytes = encode(&value);
    assert_eq!(
        &bytes[..],
        &[118, 2, 1, b'a', 125, 2, 1, b'b', 125, 1]
    );
    assert_eq!(decode(&bytes).unwrap(), value);
}

#[test]
fn test_object_keys_use_utf16_order() {
    // U+1F600 is a surrogate pair (0xD83D ..) and sorts before U+FF61 in UTF-16,
    // the reverse of their UTF-8 order
    let value = map(&[("\u{FF61}", Value::Null), ("\u{1F600}", Value::Null)]);
    let bytes = encode(&value);
    assert_eq!(&bytes[..3], &[118, 2, 4]);
    assert_eq!(&bytes[3..7], "\u{1F600}".as_bytes());
    assert_eq!(decode(&bytes).unwrap(), value);
}

#[test]
fn test_equal_maps_encode_identically() {
    let mut first = BTreeMap::new();
    let mut second = BTreeMap::new();
    for i in 0..50 {
        first.insert(format!("k{}", i), Value::Int(i));
    }
    for i in (0..50).rev() {
        second.insert(format!("k{}", i), Value::Int(i));
    }
    assert_eq!(encode(&Value::Map(first)), encode(&Value::Map(second)));
}

#[test]
fn test_nested_round_trip() {
    let value = map(&[
        ("undefined", Value::Undefined),
        ("null", Value::Null),
        ("int", Value::Int(-123_456)),
        ("float", Value::F64(3.25)),
        ("double", Value::F64(std::f64::consts::PI)),
        ("flag", Value::Bool(true)),
        ("name", Value::from("anycodec")),
        ("blob", Value::Bytes(Bytes::from_static(&[0, 1, 2]))),
        (
            "list",
            Value::Array(vec![
                Value::Int(1),
                Value::from("two"),
                Value::Array(vec![]),
                map(&[]),
                map(&[("deep", Value::Array(vec![Value::Bool(false)]))]),
            ]),
        ),
    ]);
    let decoded = round_trip(&value);
    assert_eq!(decoded, value);
    assert_eq!(decoded.get("name").and_then(Value::as_str), Some("anycodec"));
    assert_eq!(decoded.get("list").and_then(Value::as_array).map(Vec::len), Some(5));
}

#[test]
fn test_numeric_equality_across_variants() {
    assert_eq!(Value::Int(3), Value::F64(3.0));
    assert_eq!(Value::F32(1.5), Value::F64(1.5));
    assert_eq!(Value::BigInt(7), Value::Int(7));
    assert_ne!(Value::Int(3), Value::F64(3.5));
    assert_ne!(Value::Int(1), Value::Bool(true));
    assert_ne!(Value::Null, Value::Undefined);
}

#[test]
fn test_unknown_tag() {
    for tag in [0u8, 100, 115, 128, 255] {
        let err = decode(&[tag]).unwrap_err();
        assert!(
            matches!(err, EncoderError::Decode(DecodeError::UnknownTag(t)) if t == tag),
            "{:?}",
            err
        );
    }
}

#[test]
fn test_empty_and_truncated_input() {
    assert!(matches!(
        decode(&[]),
        Err(EncoderError::Decode(DecodeError::UnexpectedEndOfData { offset: 0, needed: 1 }))
    ));
    assert!(matches!(
        decode(&[117, 3, 126]),
        Err(EncoderError::Decode(DecodeError::UnexpectedEndOfData { .. }))
    ));
    assert!(matches!(
        decode(&[123, 0, 0]),
        Err(EncoderError::Decode(DecodeError::UnexpectedEndOfData { offset: 1, needed: 6 }))
    ));
    assert!(matches!(
        decode(&[118, 1, 1, b'k']),
        Err(EncoderError::Decode(DecodeError::UnexpectedEndOfData { .. }))
    ));
}

#[test]
fn test_huge_declared_length_does_not_allocate() {
    let err = decode(&[117, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F]).unwrap_err();
    assert!(matches!(
        err,
        EncoderError::Decode(DecodeError::UnexpectedEndOfData { .. })
    ));
}

#[test]
fn test_nesting_limit() {
    let mut ok = vec![];
    for _ in 0..MAX_DEPTH {
        ok.extend_from_slice(&[117, 1]);
    }
    ok.push(126);
    assert!(decode(&ok).is_ok());

    let mut too_deep = vec![];
    for _ in 0..=MAX_DEPTH {
        too_deep.extend_from_slice(&[117, 1]);
    }
    too_deep.push(126);
    assert!(matches!(
        decode(&too_deep),
        Err(EncoderError::Decode(DecodeError::DepthLimitExceeded(MAX_DEPTH)))
    ));
}

#[test]
fn test_deep_values_encode_but_do_not_decode() {
    let mut deep = Value::Null;
    for _ in 0..600 {
        deep = Value::Array(vec![deep]);
    }
    let bytes = encode(&deep);
    assert_eq!(bytes.len(), 600 * 2 + 1);
    assert!(matches!(
        decode(&bytes),
        Err(EncoderError::Decode(DecodeError::DepthLimitExceeded(MAX_DEPTH)))
    ));
}

#[test]
fn test_trailing_bytes_are_left_alone() {
    assert_eq!(decode(&[126, 1, 2, 3]).unwrap(), Value::Null);

    let mut encoder = BinEncoder::new();
    encoder.write_any(&Value::Int(1));
    encoder.write_any(&Value::from("two"));
    let mut decoder = BinDecoder::new(encoder.to_bytes());
    assert_eq!(decoder.read_any().unwrap(), Value::Int(1));
    assert_eq!(decoder.read_any().unwrap(), Value::from("two"));
    assert!(!decoder.has_content());
}

#[test]
fn test_many_values_span_chunks() {
    let value: Value = (0..1000).map(|i| Value::from(format!("item {}", i))).collect();
    let bytes = encode(&value);
    assert!(bytes.len() > DEFAULT_CHUNK_CAPACITY * 10);
    assert_eq!(decode(&bytes).unwrap(), value);
}
