use anycodec::string::DEFAULT_CHUNK_LEN;
use anycodec::{utf8_byte_length, BinDecoder, BinEncoder, Bytes, DecodeError, EncoderError, Utf8Codec};

fn encode_with(codec: &Utf8Codec, s: &str) -> Bytes {
    let mut encoder = BinEncoder::new();
    encoder.write_var_string_with(codec, s);
    encoder.to_bytes()
}

fn decode_with(codec: &Utf8Codec, bytes: Bytes) -> anycodec::Result<String> {
    BinDecoder::new(bytes).read_var_string_with(codec)
}

fn codecs() -> Vec<Utf8Codec> {
    vec![
        Utf8Codec::Native,
        Utf8Codec::chunked(0),
        Utf8Codec::chunked(1),
        Utf8Codec::chunked(3),
        Utf8Codec::chunked(7),
    ]
}

#[test]
fn test_byte_length() {
    assert_eq!(utf8_byte_length(""), 0);
    assert_eq!(utf8_byte_length("abc"), 3);
    assert_eq!(utf8_byte_length("é"), 2);
    assert_eq!(utf8_byte_length("€"), 3);
    assert_eq!(utf8_byte_length("😀"), 4);
}

#[test]
fn test_known_encoding() {
    let bytes = encode_with(&Utf8Codec::Native, "Hello world!");
    assert_eq!(bytes[0], 12);
    assert_eq!(&bytes[1..], b"Hello world!");
}

#[test]
fn test_empty_string() {
    for codec in codecs() {
        let bytes = encode_with(&codec, "");
        assert_eq!(&bytes[..], &[0]);
        assert_eq!(decode_with(&codec, bytes).unwrap(), "");
    }
}

#[test]
fn test_chunked_default_length() {
    assert_eq!(
        Utf8Codec::chunked(0),
        Utf8Codec::Chunked {
            chunk_len: DEFAULT_CHUNK_LEN
        }
    );
    assert_eq!(Utf8Codec::default(), Utf8Codec::Native);
    assert_eq!(*Utf8Codec::shared(), Utf8Codec::Native);
}

#[test]
fn test_long_ascii_through_every_codec() {
    let s = "a".repeat(15_000);
    let expected = encode_with(&Utf8Codec::Native, &s);
    // 15000 needs a two-byte length prefix
    assert_eq!(expected.len(), 15_002);

    for codec in codecs() {
        let bytes = encode_with(&codec, &s);
        assert_eq!(bytes, expected, "{:?}", codec);
        for decode_codec in codecs() {
            assert_eq!(decode_with(&decode_codec, bytes.clone()).unwrap(), s);
        }
    }
}

#[test]
fn test_long_multibyte_across_chunk_boundaries() {
    // 9 bytes per repetition, so default-sized chunks cut sequences in half
    let s = "é€😀".repeat(2_000);
    assert_eq!(utf8_byte_length(&s), 18_000);

    let expected = encode_with(&Utf8Codec::Native, &s);
    for codec in codecs() {
        let bytes = encode_with(&codec, &s);
        assert_eq!(bytes, expected, "{:?}", codec);
        for decode_codec in codecs() {
            assert_eq!(
                decode_with(&decode_codec, bytes.clone()).unwrap(),
                s,
                "{:?}",
                decode_codec
            );
        }
    }
}

#[test]
fn test_invalid_byte_reports_offset() {
    // offset is absolute within the decoder's buffer
    for codec in codecs() {
        let err = decode_with(&codec, Bytes::from_static(&[2, b'a', 0xFF])).unwrap_err();
        assert!(
            matches!(err, EncoderError::Decode(DecodeError::InvalidUtf8 { offset: 2 })),
            "{:?}: {:?}",
            codec,
            err
        );
    }
}

#[test]
fn test_truncated_sequence_reports_its_start() {
    for codec in codecs() {
        let err = decode_with(&codec, Bytes::from_static(&[3, b'a', 0xE2, 0x82])).unwrap_err();
        assert!(
            matches!(err, EncoderError::Decode(DecodeError::InvalidUtf8 { offset: 2 })),
            "{:?}: {:?}",
            codec,
            err
        );
    }
}

#[test]
fn test_decode_slice_directly() {
    assert_eq!(Utf8Codec::Native.decode("ü".as_bytes()).unwrap(), "ü");
    assert_eq!(Utf8Codec::chunked(1).decode("ü".as_bytes()).unwrap(), "ü");
    assert!(matches!(
        Utf8Codec::Native.decode(&[0xC3]),
        Err(EncoderError::Decode(DecodeError::InvalidUtf8 { offset: 0 }))
    ));
}

#[test]
fn test_string_length_beyond_input() {
    let err = BinDecoder::new(Bytes::from_static(&[5, b'a'])).read_var_string().unwrap_err();
    assert!(matches!(
        err,
        EncoderError::Decode(DecodeError::UnexpectedEndOfData { .. })
    ));
}

#[test]
fn test_peek_var_string() {
    let mut encoder = BinEncoder::new();
    encoder.write_var_string("peek");
    encoder.write_var_string("next");
    let mut decoder = BinDecoder::new(encoder.to_bytes());
    assert_eq!(decoder.peek_var_string().unwrap(), "peek");
    assert_eq!(decoder.read_var_string().unwrap(), "peek");
    assert_eq!(decoder.read_var_string().unwrap(), "next");
}
