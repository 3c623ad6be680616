//! Growable, chunked byte sink.
//!
//! [`BinEncoder`] keeps a list of already-filled chunks plus one live chunk.
//! Writes go to the live chunk; when it is full it is retired to the list and a
//! new chunk of twice the capacity takes its place, so no byte is ever copied
//! twice while encoding. [`BinEncoder::to_bytes`] flattens everything into one
//! contiguous buffer at the end.

use bytes::{BufMut, Bytes, BytesMut};

/// Capacity of the first chunk of a new encoder.
pub const DEFAULT_CHUNK_CAPACITY: usize = 100;

/// An append-only byte buffer with amortized O(1) writes and back-patching.
///
/// The logical stream is every retired chunk in order, followed by the written
/// prefix of the live chunk.
///
/// # Example
/// ```rust
/// use anycodec::BinEncoder;
///
/// let mut encoder = BinEncoder::new();
/// encoder.write_var_uint(256);
/// encoder.write_var_string("Hello world!");
/// assert_eq!(encoder.byte_len(), 15);
/// ```
#[derive(Debug, Clone)]
pub struct BinEncoder {
    /// Live chunk; its length is the write cursor.
    cbuf: BytesMut,
    /// Logical capacity of `cbuf`. `BytesMut` may over-allocate, so this is tracked explicitly.
    ccap: usize,
    /// Retired chunks, oldest first.
    bufs: Vec<BytesMut>,
}

impl Default for BinEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BinEncoder {
    /// Creates an empty encoder with a [`DEFAULT_CHUNK_CAPACITY`]-byte first chunk.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHUNK_CAPACITY)
    }

    /// Creates an empty encoder whose first chunk holds `capacity` bytes.
    ///
    /// A capacity of zero is rounded up to one so that doubling makes progress.
    pub fn with_capacity(capacity: usize) -> Self {
        let ccap = capacity.max(1);
        Self {
            cbuf: BytesMut::with_capacity(ccap),
            ccap,
            bufs: Vec::new(),
        }
    }

    /// Creates an encoder that already contains `initial`.
    ///
    /// Useful for continuing a stream that was partially produced elsewhere.
    pub fn from_initial(initial: &[u8]) -> Self {
        let mut encoder = Self::new();
        encoder.write_bytes(initial);
        encoder
    }

    /// Number of bytes written so far.
    ///
    /// This walks the chunk list, so it is O(number of chunks).
    pub fn byte_len(&self) -> usize {
        self.bufs.iter().map(|b| b.len()).sum::<usize>() + self.cbuf.len()
    }

    /// Returns `true` if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.cbuf.is_empty() && self.bufs.iter().all(|b| b.is_empty())
    }

    /// Number of chunks currently holding data, including the live one.
    pub fn chunk_count(&self) -> usize {
        self.bufs.len() + 1
    }

    /// Copies the whole stream into one contiguous buffer.
    ///
    /// The encoder is left untouched and can keep being written to; calling this
    /// repeatedly yields successive snapshots.
    pub fn to_bytes(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.byte_len());
        for chunk in &self.bufs {
            out.put_slice(chunk);
        }
        out.put_slice(&self.cbuf);
        out.freeze()
    }

    /// Retires the live chunk and starts a new one of `capacity` bytes.
    fn roll_over(&mut self, capacity: usize) {
        let full = std::mem::replace(&mut self.cbuf, BytesMut::with_capacity(capacity));
        if !full.is_empty() {
            self.bufs.push(full);
        }
        self.ccap = capacity;
    }

    /// Appends one byte.
    #[inline]
    pub fn write(&mut self, byte: u8) {
        if self.cbuf.len() == self.ccap {
            self.roll_over(self.ccap * 2);
        }
        self.cbuf.put_u8(byte);
    }

    /// Appends a byte slice.
    ///
    /// Whatever fits is copied into the live chunk; the rest goes into a new chunk
    /// sized `max(2 * capacity, rest)`, so every byte is stored exactly once.
    pub fn write_bytes(&mut self, data: &[u8]) {
        let left = (self.ccap - self.cbuf.len()).min(data.len());
        self.cbuf.put_slice(&data[..left]);
        let rest = &data[left..];
        if !rest.is_empty() {
            self.roll_over((self.ccap * 2).max(rest.len()));
            self.cbuf.put_slice(rest);
        }
    }

    /// Ensures the next `len` bytes land contiguously in the live chunk.
    ///
    /// If they would not fit, the live chunk is retired early and a new chunk of
    /// `2 * max(capacity, len)` bytes is started.
    pub fn reserve(&mut self, len: usize) {
        if self.ccap - self.cbuf.len() < len {
            self.roll_over(self.ccap.max(len) * 2);
        }
    }

    /// Writes a fixed-width field contiguously.
    fn write_contiguous(&mut self, data: &[u8]) {
        self.reserve(data.len());
        self.cbuf.put_slice(data);
    }

    /// Overwrites an already-written byte at absolute offset `pos`.
    ///
    /// # Panics
    /// Panics if `pos >= self.byte_len()`.
    pub fn set_byte_at(&mut self, pos: usize, byte: u8) {
        let mut pos = pos;
        for chunk in self.bufs.iter_mut() {
            if pos < chunk.len() {
                chunk[pos] = byte;
                return;
            }
            pos -= chunk.len();
        }
        self.cbuf[pos] = byte;
    }

    /// Writes a `u16` in little-endian order.
    pub fn write_u16(&mut self, value: u16) {
        for b in value.to_le_bytes() {
            self.write(b);
        }
    }

    /// Writes a `u32` in little-endian order.
    pub fn write_u32(&mut self, value: u32) {
        for b in value.to_le_bytes() {
            self.write(b);
        }
    }

    /// Writes a `u32` in big-endian order (most significant byte first).
    pub fn write_u32_be(&mut self, value: u32) {
        for b in value.to_be_bytes() {
            self.write(b);
        }
    }

    /// Overwrites two already-written bytes at `pos` with a little-endian `u16`.
    ///
    /// # Panics
    /// Panics if `pos + 2 > self.byte_len()`.
    pub fn set_u16(&mut self, pos: usize, value: u16) {
        for (i, b) in value.to_le_bytes().into_iter().enumerate() {
            self.set_byte_at(pos + i, b);
        }
    }

    /// Overwrites four already-written bytes at `pos` with a little-endian `u32`.
    ///
    /// # Panics
    /// Panics if `pos + 4 > self.byte_len()`.
    pub fn set_u32(&mut self, pos: usize, value: u32) {
        for (i, b) in value.to_le_bytes().into_iter().enumerate() {
            self.set_byte_at(pos + i, b);
        }
    }

    /// Writes an IEEE-754 single as 4 big-endian bytes.
    pub fn write_f32(&mut self, value: f32) {
        self.write_contiguous(&value.to_be_bytes());
    }

    /// Writes an IEEE-754 double as 8 big-endian bytes.
    pub fn write_f64(&mut self, value: f64) {
        self.write_contiguous(&value.to_be_bytes());
    }

    /// Writes a signed 64-bit integer as 8 big-endian bytes (two's complement).
    pub fn write_i64(&mut self, value: i64) {
        self.write_contiguous(&value.to_be_bytes());
    }

    /// Writes an unsigned 64-bit integer as 8 big-endian bytes.
    pub fn write_u64(&mut self, value: u64) {
        self.write_contiguous(&value.to_be_bytes());
    }

    /// Writes a varint length prefix followed by `data`.
    pub fn write_var_bytes(&mut self, data: &[u8]) {
        self.write_var_uint(data.len() as u64);
        self.write_bytes(data);
    }

    /// Appends everything another encoder has written so far.
    pub fn write_encoder(&mut self, other: &BinEncoder) {
        for chunk in &other.bufs {
            self.write_bytes(chunk);
        }
        self.write_bytes(&other.cbuf);
    }
}
