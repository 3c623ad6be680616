//! Length-prefixed UTF-8 strings.
//!
//! Strings are written as an unsigned varint byte length followed by the UTF-8
//! bytes. Two interchangeable strategies produce and consume that format:
//!
//! - [`Utf8Codec::Native`] hands whole slices to the standard library.
//! - [`Utf8Codec::Chunked`] emits bytes one scalar at a time and validates input
//!   in bounded chunks, carrying incomplete sequences across chunk boundaries.
//!
//! Both agree byte-for-byte on the wire; the choice only affects how work is
//! split up locally.

use crate::{BinDecoder, BinEncoder, DecodeError, Result};
use std::sync::OnceLock;

/// Default chunk size of [`Utf8Codec::Chunked`].
pub const DEFAULT_CHUNK_LEN: usize = 10_000;

static SHARED: OnceLock<Utf8Codec> = OnceLock::new();

/// Number of bytes `s` occupies once encoded.
pub fn utf8_byte_length(s: &str) -> usize {
    s.chars().map(char::len_utf8).sum()
}

/// Strategy used to move strings in and out of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Utf8Codec {
    #[default]
    Native,
    Chunked { chunk_len: usize },
}

impl Utf8Codec {
    /// The process-wide codec used by [`BinEncoder::write_var_string`] and
    /// [`BinDecoder::read_var_string`]. Initialized once on first use.
    pub fn shared() -> &'static Utf8Codec {
        SHARED.get_or_init(Utf8Codec::default)
    }

    /// A chunked codec; a `chunk_len` of zero falls back to [`DEFAULT_CHUNK_LEN`].
    pub fn chunked(chunk_len: usize) -> Self {
        let chunk_len = if chunk_len == 0 {
            DEFAULT_CHUNK_LEN
        } else {
            chunk_len
        };
        Utf8Codec::Chunked { chunk_len }
    }

    /// Writes `s` as varint length + UTF-8 bytes.
    pub fn encode_into(&self, encoder: &mut BinEncoder, s: &str) {
        match self {
            Utf8Codec::Native => {
                encoder.write_var_uint(s.len() as u64);
                encoder.write_bytes(s.as_bytes());
            }
            Utf8Codec::Chunked { .. } => {
                encoder.write_var_uint(utf8_byte_length(s) as u64);
                let mut scratch = [0u8; 4];
                for c in s.chars() {
                    for b in c.encode_utf8(&mut scratch).as_bytes() {
                        encoder.write(*b);
                    }
                }
            }
        }
    }

    /// Decodes a complete UTF-8 byte sequence.
    ///
    /// # Errors
    /// `InvalidUtf8` with the offset of the first bad byte (relative to `bytes`).
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        self.decode_at(bytes, 0)
    }

    /// Like [`decode`](Self::decode), reporting error offsets relative to `base`.
    fn decode_at(&self, bytes: &[u8], base: usize) -> Result<String> {
        match self {
            Utf8Codec::Native => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|e| invalid(base + e.valid_up_to())),
            Utf8Codec::Chunked { chunk_len } => decode_chunked(bytes, (*chunk_len).max(1), base),
        }
    }
}

fn invalid(offset: usize) -> crate::EncoderError {
    DecodeError::InvalidUtf8 { offset }.into()
}

/// Validates `bytes` `chunk_len` bytes at a time.
///
/// A multi-byte sequence cut by a chunk boundary is held back and prepended to
/// the next chunk, so the result is identical to decoding in one go.
fn decode_chunked(bytes: &[u8], chunk_len: usize, base: usize) -> Result<String> {
    let mut out = String::with_capacity(bytes.len());
    let mut pending: Vec<u8> = Vec::new();
    let mut consumed = 0;

    for chunk in bytes.chunks(chunk_len) {
        let mut joined = std::mem::take(&mut pending);
        let start = consumed - joined.len();
        let input: &[u8] = if joined.is_empty() {
            chunk
        } else {
            joined.extend_from_slice(chunk);
            &joined
        };
        consumed += chunk.len();

        match std::str::from_utf8(input) {
            Ok(s) => out.push_str(s),
            Err(e) => {
                let valid = e.valid_up_to();
                let head = std::str::from_utf8(&input[..valid])
                    .map_err(|_| invalid(base + start))?;
                out.push_str(head);
                if e.error_len().is_some() {
                    return Err(invalid(base + start + valid));
                }
                pending = input[valid..].to_vec();
            }
        }
    }

    if !pending.is_empty() {
        return Err(invalid(base + bytes.len() - pending.len()));
    }
    Ok(out)
}

impl BinEncoder {
    /// Writes a length-prefixed string using [`Utf8Codec::shared`].
    pub fn write_var_string(&mut self, s: &str) {
        Utf8Codec::shared().encode_into(self, s);
    }

    /// Writes a length-prefixed string with an explicit codec.
    pub fn write_var_string_with(&mut self, codec: &Utf8Codec, s: &str) {
        codec.encode_into(self, s);
    }
}

impl BinDecoder {
    /// Reads a length-prefixed string using [`Utf8Codec::shared`].
    pub fn read_var_string(&mut self) -> Result<String> {
        self.read_var_string_with(Utf8Codec::shared())
    }

    /// Reads a length-prefixed string with an explicit codec.
    pub fn read_var_string_with(&mut self, codec: &Utf8Codec) -> Result<String> {
        let len = self.read_var_len()?;
        let start = self.position();
        let bytes = self.read_bytes(len)?;
        codec.decode_at(&bytes, start)
    }

    /// Returns the next string without consuming it.
    pub fn peek_var_string(&mut self) -> Result<String> {
        self.peek(Self::read_var_string)
    }
}
