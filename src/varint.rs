//! Variable-length integers.
//!
//! Unsigned varints store 7 payload bits per byte, least significant group
//! first; the high bit of each byte says whether another byte follows.
//!
//! ```txt
//! 300 = 0b10_0101100  ->  [1_0101100, 0_0000010]  ->  [0xAC, 0x02]
//! ```
//!
//! Signed varints use the same scheme except for the first byte, which carries
//! only 6 payload bits plus a sign bit:
//!
//! ```txt
//! first byte: [continue:1][negative:1][bits 0-5]
//! next bytes: [continue:1][7 bits]
//! ```
//!
//! The sign is stored separately from the magnitude, so negative zero has its
//! own encoding (`0x40`).
//!
//! Decoding rejects any magnitude above [`MAX_SAFE_INTEGER`] (2^53 - 1), the
//! largest integer a float64-backed peer can hold exactly.

use crate::{BinDecoder, BinEncoder, DecodeError, Result};

/// Largest magnitude a varint may decode to.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

pub(crate) const BIT7: u8 = 0b0100_0000;
pub(crate) const BIT8: u8 = 0b1000_0000;
pub(crate) const BITS6: u8 = 0b0011_1111;
pub(crate) const BITS7: u8 = 0b0111_1111;

/// Adds a 7-bit group at `shift` to `num`, rejecting anything beyond [`MAX_SAFE_INTEGER`].
#[inline]
fn accumulate(num: u64, group: u8, shift: u32) -> Result<u64> {
    if group == 0 {
        return Ok(num);
    }
    if shift >= 53 {
        return Err(DecodeError::IntegerOutOfRange.into());
    }
    let num = num + ((group as u64) << shift);
    if num > MAX_SAFE_INTEGER {
        return Err(DecodeError::IntegerOutOfRange.into());
    }
    Ok(num)
}

impl BinEncoder {
    /// Writes an unsigned varint.
    ///
    /// Any `u64` can be written, but readers reject values above [`MAX_SAFE_INTEGER`].
    pub fn write_var_uint(&mut self, value: u64) {
        let mut num = value;
        while num > BITS7 as u64 {
            self.write(BIT8 | (num as u8 & BITS7));
            num >>= 7;
        }
        self.write(num as u8 & BITS7);
    }

    /// Writes a signed varint.
    pub fn write_var_int(&mut self, value: i64) {
        self.write_var_int_parts(value < 0, value.unsigned_abs());
    }

    /// Writes a signed varint from an explicit sign and magnitude.
    ///
    /// This is the only way to produce negative zero, which [`write_var_int`]
    /// cannot express.
    ///
    /// [`write_var_int`]: BinEncoder::write_var_int
    pub fn write_var_int_parts(&mut self, negative: bool, magnitude: u64) {
        let mut num = magnitude;
        let cont = if num > BITS6 as u64 { BIT8 } else { 0 };
        let sign = if negative { BIT7 } else { 0 };
        self.write(cont | sign | (num as u8 & BITS6));
        num >>= 6;
        while num > 0 {
            let cont = if num > BITS7 as u64 { BIT8 } else { 0 };
            self.write(cont | (num as u8 & BITS7));
            num >>= 7;
        }
    }
}

impl BinDecoder {
    /// Reads an unsigned varint.
    ///
    /// # Errors
    /// `IntegerOutOfRange` if the value exceeds [`MAX_SAFE_INTEGER`];
    /// `UnexpectedEndOfData` if the input ends mid-number.
    pub fn read_var_uint(&mut self) -> Result<u64> {
        let mut num = 0u64;
        let mut shift = 0u32;
        loop {
            let r = self.read_u8()?;
            num = accumulate(num, r & BITS7, shift)?;
            if r < BIT8 {
                return Ok(num);
            }
            shift = shift.saturating_add(7);
        }
    }

    /// Reads a signed varint as `(negative, magnitude)`.
    ///
    /// Negative zero comes back as `(true, 0)`.
    pub fn read_var_int_parts(&mut self) -> Result<(bool, u64)> {
        let r = self.read_u8()?;
        let negative = r & BIT7 != 0;
        let mut num = (r & BITS6) as u64;
        if r & BIT8 == 0 {
            return Ok((negative, num));
        }
        let mut shift = 6u32;
        loop {
            let r = self.read_u8()?;
            num = accumulate(num, r & BITS7, shift)?;
            if r < BIT8 {
                return Ok((negative, num));
            }
            shift = shift.saturating_add(7);
        }
    }

    /// Reads a signed varint.
    ///
    /// Negative zero collapses to `0`; use [`read_var_int_parts`] to tell them apart.
    ///
    /// [`read_var_int_parts`]: BinDecoder::read_var_int_parts
    pub fn read_var_int(&mut self) -> Result<i64> {
        let (negative, magnitude) = self.read_var_int_parts()?;
        // magnitude <= MAX_SAFE_INTEGER, so it always fits
        let value = magnitude as i64;
        Ok(if negative { -value } else { value })
    }

    /// Returns the next unsigned varint without consuming it.
    pub fn peek_var_uint(&mut self) -> Result<u64> {
        self.peek(Self::read_var_uint)
    }

    /// Returns the next signed varint without consuming it.
    pub fn peek_var_int(&mut self) -> Result<i64> {
        self.peek(Self::read_var_int)
    }
}
