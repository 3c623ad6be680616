//! Cursor reader over an immutable byte buffer.

use crate::{DecodeError, Result};
use bytes::Bytes;

/// Sequential reader over a shared [`Bytes`] buffer.
///
/// Every read is bounds-checked and fails with
/// [`DecodeError::UnexpectedEndOfData`] instead of reading past the end.
/// Cloning is cheap (the buffer is reference counted), which makes it easy to
/// fork a read position for speculative parsing.
///
/// # Example
/// ```rust
/// use anycodec::{BinDecoder, Bytes};
///
/// let mut decoder = BinDecoder::new(Bytes::from_static(&[0x80, 0x02, 5, b'h', b'e', b'l', b'l', b'o']));
/// assert_eq!(decoder.read_var_uint().unwrap(), 256);
/// assert_eq!(decoder.read_var_string().unwrap(), "hello");
/// assert!(!decoder.has_content());
/// ```
#[derive(Debug, Clone)]
pub struct BinDecoder {
    buf: Bytes,
    pos: usize,
}

impl BinDecoder {
    /// Wraps `buf` without copying it; the cursor starts at 0.
    pub fn new(buf: Bytes) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current cursor offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Moves the cursor to an absolute offset.
    ///
    /// # Errors
    /// Fails if `pos` is past the end of the buffer.
    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        if pos > self.buf.len() {
            return Err(DecodeError::UnexpectedEndOfData {
                offset: self.buf.len(),
                needed: pos - self.buf.len(),
            }
            .into());
        }
        self.pos = pos;
        Ok(())
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns `true` while the cursor has not reached the end.
    pub fn has_content(&self) -> bool {
        self.pos != self.buf.len()
    }

    /// The whole underlying buffer, independent of the cursor.
    pub fn buffer(&self) -> &Bytes {
        &self.buf
    }

    /// Returns a reader over the same buffer positioned at `pos`.
    ///
    /// # Errors
    /// Fails if `pos` is past the end of the buffer.
    pub fn fork_at(&self, pos: usize) -> Result<Self> {
        let mut forked = self.clone();
        forked.set_position(pos)?;
        Ok(forked)
    }

    /// Checks that `len` more bytes are available.
    #[inline]
    fn ensure(&self, len: usize) -> Result<()> {
        let remaining = self.remaining();
        if remaining < len {
            return Err(DecodeError::UnexpectedEndOfData {
                offset: self.pos,
                needed: len - remaining,
            }
            .into());
        }
        Ok(())
    }

    /// Runs `read` and rewinds the cursor afterwards, whether it succeeded or not.
    pub fn peek<T>(&mut self, read: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let pos = self.pos;
        let result = read(self);
        self.pos = pos;
        result
    }

    /// Reads one byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(b)
    }

    /// Returns the next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8> {
        self.ensure(1)?;
        Ok(self.buf[self.pos])
    }

    /// Skips one byte.
    pub fn skip8(&mut self) -> Result<()> {
        self.ensure(1)?;
        self.pos += 1;
        Ok(())
    }

    /// Returns the next `len` bytes as a view into the underlying buffer.
    ///
    /// The view shares storage with the decoder's buffer; call
    /// `.to_vec()` on it if an independent copy is required.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        self.ensure(len)?;
        let view = self.buf.slice(self.pos..self.pos + len);
        self.pos += len;
        Ok(view)
    }

    /// Returns everything from the cursor to the end and moves the cursor there.
    pub fn read_tail(&mut self) -> Bytes {
        let view = self.buf.slice(self.pos..);
        self.pos = self.buf.len();
        view
    }

    /// Reads a fixed number of bytes into an array.
    #[inline]
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    /// Reads a little-endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Reads a big-endian `u32`.
    pub fn read_u32_be(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Returns the next little-endian `u16` without consuming it.
    pub fn peek_u16(&mut self) -> Result<u16> {
        self.peek(Self::read_u16)
    }

    /// Returns the next little-endian `u32` without consuming it.
    pub fn peek_u32(&mut self) -> Result<u32> {
        self.peek(Self::read_u32)
    }

    /// Reads a big-endian IEEE-754 single.
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_be_bytes(self.read_array()?))
    }

    /// Reads a big-endian IEEE-754 double.
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_be_bytes(self.read_array()?))
    }

    /// Reads a big-endian two's complement 64-bit integer.
    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    /// Reads a big-endian unsigned 64-bit integer.
    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Reads a varint length followed by that many bytes (zero-copy).
    pub fn read_var_bytes(&mut self) -> Result<Bytes> {
        let len = self.read_var_len()?;
        self.read_bytes(len)
    }

    /// Reads a varint and converts it to a `usize` length.
    pub(crate) fn read_var_len(&mut self) -> Result<usize> {
        let len = self.read_var_uint()?;
        usize::try_from(len).map_err(|_| DecodeError::IntegerOutOfRange.into())
    }
}
