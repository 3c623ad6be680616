use anycodec::{BinEncoder, DEFAULT_CHUNK_CAPACITY};

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[test]
fn test_new_encoder_is_empty() {
    let encoder = BinEncoder::new();
    assert!(encoder.is_empty());
    assert_eq!(encoder.byte_len(), 0);
    assert_eq!(encoder.chunk_count(), 1);
    assert!(encoder.to_bytes().is_empty());

    let encoder = BinEncoder::default();
    assert!(encoder.is_empty());
}

#[test]
fn test_byte_at_a_time_rolls_over_doubling_chunks() {
    let data = payload(350);
    let mut encoder = BinEncoder::new();
    for b in &data {
        encoder.write(*b);
    }
    // 100 + 200 retired, 50 bytes in a 400-byte live chunk
    assert_eq!(encoder.chunk_count(), 3);
    assert_eq!(encoder.byte_len(), 350);
    assert_eq!(&encoder.to_bytes()[..], &data[..]);
}

#[test]
fn test_mixed_write_sizes_produce_the_same_stream() {
    let data = payload(350);

    let mut single = BinEncoder::new();
    for b in &data {
        single.write(*b);
    }

    let mut bulk = BinEncoder::new();
    bulk.write_bytes(&data);

    let mut mixed = BinEncoder::new();
    mixed.write_bytes(&data[..50]);
    mixed.write_bytes(&data[50..250]);
    mixed.write(data[250]);
    mixed.write_bytes(&data[251..]);

    let mut tiny = BinEncoder::with_capacity(1);
    for part in data.chunks(7) {
        tiny.write_bytes(part);
    }

    let expected = single.to_bytes();
    assert_eq!(bulk.to_bytes(), expected);
    assert_eq!(mixed.to_bytes(), expected);
    assert_eq!(tiny.to_bytes(), expected);
    assert_eq!(bulk.byte_len(), 350);
}

#[test]
fn test_large_write_bytes_goes_to_one_chunk() {
    let data = payload(1000);
    let mut encoder = BinEncoder::new();
    encoder.write_bytes(&data);
    // 100 bytes fill the first chunk, the other 900 land in one new chunk
    assert_eq!(encoder.chunk_count(), 2);
    assert_eq!(&encoder.to_bytes()[..], &data[..]);
}

#[test]
fn test_zero_capacity_still_makes_progress() {
    let mut encoder = BinEncoder::with_capacity(0);
    for i in 0..10u8 {
        encoder.write(i);
    }
    assert_eq!(&encoder.to_bytes()[..], &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
}

#[test]
fn test_to_bytes_is_a_snapshot() {
    let mut encoder = BinEncoder::new();
    encoder.write_bytes(b"abc");
    let first = encoder.to_bytes();
    encoder.write_bytes(b"def");
    let second = encoder.to_bytes();

    assert_eq!(&first[..], b"abc");
    assert_eq!(&second[..], b"abcdef");
    assert_eq!(encoder.to_bytes(), second);
}

#[test]
fn test_set_byte_at_across_chunks() {
    let mut encoder = BinEncoder::new();
    for _ in 0..150 {
        encoder.write(0);
    }
    encoder.set_byte_at(5, 0xDD);
    encoder.set_byte_at(120, 0xEE);
    encoder.set_byte_at(149, 0xFF);

    let bytes = encoder.to_bytes();
    assert_eq!(bytes.len(), 150);
    assert_eq!(bytes[5], 0xDD);
    assert_eq!(bytes[120], 0xEE);
    assert_eq!(bytes[149], 0xFF);
    assert_eq!(bytes.iter().filter(|b| **b != 0).count(), 3);
}

#[test]
fn test_set_u32_spanning_a_chunk_boundary() {
    let mut encoder = BinEncoder::new();
    for _ in 0..DEFAULT_CHUNK_CAPACITY + 10 {
        encoder.write(0);
    }
    encoder.set_u32(98, 0x0403_0201);
    encoder.set_u16(0, 0xBBAA);

    let bytes = encoder.to_bytes();
    assert_eq!(&bytes[98..102], &[1, 2, 3, 4]);
    assert_eq!(&bytes[0..2], &[0xAA, 0xBB]);
}

#[test]
#[should_panic]
fn test_set_byte_at_unwritten_position_panics() {
    let mut encoder = BinEncoder::new();
    encoder.write(1);
    encoder.set_byte_at(10, 0xFF);
}

#[test]
fn test_reserve_keeps_fixed_width_values_contiguous() {
    let mut encoder = BinEncoder::with_capacity(10);
    encoder.write_bytes(&[0; 8]);
    encoder.write_f64(1.0);

    assert_eq!(encoder.chunk_count(), 2);
    let bytes = encoder.to_bytes();
    assert_eq!(&bytes[..8], &[0; 8]);
    assert_eq!(&bytes[8..], &1.0f64.to_be_bytes());
}

#[test]
fn test_fixed_width_byte_order() {
    let mut encoder = BinEncoder::new();
    encoder.write_u16(0x0102);
    encoder.write_u32(0x0102_0304);
    encoder.write_u32_be(0x0102_0304);
    encoder.write_f32(1.5);
    encoder.write_i64(-2);
    encoder.write_u64(258);

    let mut expected = vec![0x02, 0x01, 0x04, 0x03, 0x02, 0x01, 0x01, 0x02, 0x03, 0x04];
    expected.extend_from_slice(&[0x3F, 0xC0, 0x00, 0x00]);
    expected.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE]);
    expected.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0x01, 0x02]);
    assert_eq!(&encoder.to_bytes()[..], &expected[..]);
}

#[test]
fn test_var_bytes_and_var_string() {
    let mut encoder = BinEncoder::new();
    encoder.write_var_bytes(&[1, 9, 0, 255]);
    encoder.write_var_string("hi");
    assert_eq!(&encoder.to_bytes()[..], &[4, 1, 9, 0, 255, 2, b'h', b'i']);
}

#[test]
fn test_from_initial_and_write_encoder() {
    let mut inner = BinEncoder::with_capacity(2);
    inner.write_bytes(b"world");

    let mut outer = BinEncoder::from_initial(b"hello ");
    outer.write_encoder(&inner);
    assert_eq!(&outer.to_bytes()[..], b"hello world");
    // the appended encoder is untouched
    assert_eq!(&inner.to_bytes()[..], b"world");
}
