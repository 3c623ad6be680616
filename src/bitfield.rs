//! Packed boolean flags.

/// Up to 32 boolean flags packed into a `u32`.
///
/// Bit indices wrap modulo 32, like the shift operators they are built on.
///
/// # Example
/// ```rust
/// use anycodec::bitfield::BitField;
///
/// let mut flags = BitField::default();
/// flags.set_bit(0, true);
/// flags.set_bit(3, true);
/// assert_eq!(flags.value(), 0b1001);
/// flags.unset_bit(0);
/// assert!(!flags.get_bit(0));
/// assert!(flags.get_bit(3));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BitField(u32);

impl BitField {
    pub fn new(bits: u32) -> Self {
        Self(bits)
    }

    #[inline]
    fn mask(bit: u32) -> u32 {
        1u32.wrapping_shl(bit)
    }

    /// Sets `bit` to `value` and returns the new bits.
    pub fn set_bit(&mut self, bit: u32, value: bool) -> u32 {
        if value {
            self.0 |= Self::mask(bit);
        } else {
            self.0 &= !Self::mask(bit);
        }
        self.0
    }

    /// Clears `bit` and returns the new bits.
    pub fn unset_bit(&mut self, bit: u32) -> u32 {
        self.set_bit(bit, false)
    }

    /// Flips `bit` and returns the new bits.
    pub fn toggle_bit(&mut self, bit: u32) -> u32 {
        self.0 ^= Self::mask(bit);
        self.0
    }

    pub fn get_bit(&self, bit: u32) -> bool {
        self.0 & Self::mask(bit) != 0
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for BitField {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl From<BitField> for u32 {
    fn from(field: BitField) -> Self {
        field.0
    }
}
