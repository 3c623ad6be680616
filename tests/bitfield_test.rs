use anycodec::bitfield::BitField;

#[test]
fn test_set_and_get() {
    let mut flags = BitField::default();
    assert_eq!(flags.set_bit(1, true), 0b10);
    assert_eq!(flags.set_bit(4, true), 0b1_0010);
    assert!(flags.get_bit(1));
    assert!(flags.get_bit(4));
    assert!(!flags.get_bit(0));
    assert_eq!(flags.set_bit(1, false), 0b1_0000);
}

#[test]
fn test_unset_only_clears_the_given_bit() {
    let mut flags = BitField::new(0b1111);
    assert_eq!(flags.unset_bit(2), 0b1011);
    assert_eq!(flags.unset_bit(2), 0b1011);
    assert_eq!(flags.value(), 0b1011);
}

#[test]
fn test_toggle() {
    let mut flags = BitField::from(0b0101);
    assert_eq!(flags.toggle_bit(0), 0b0100);
    assert_eq!(flags.toggle_bit(1), 0b0110);
    assert_eq!(u32::from(flags), 0b0110);
}

#[test]
fn test_high_bits() {
    let mut flags = BitField::default();
    flags.set_bit(31, true);
    assert_eq!(flags.value(), 0x8000_0000);
    // indices wrap like the shift they are built on
    assert!(flags.get_bit(63));
}
