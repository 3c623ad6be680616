//! # anycodec
//!
//! A compact, self-describing binary encoding for dynamically shaped values.
//!
//! - Every value starts with a single tag byte (127 down to 116), so no schema is needed to decode
//! - Integers use a 7-bits-per-byte varint; floats pick the smallest exact representation
//! - Object keys are written in sorted order, so equal maps always encode to equal bytes
//! - A growable chunked [`BinEncoder`] and a zero-copy [`BinDecoder`] are exposed for custom framing
//! - Custom derive macros convert your own types to and from [`Value`]
//!
//! ## Wire Format
//!
//! | Tag | Kind | Payload |
//! |---|---|---|
//! | 127 | undefined | none |
//! | 126 | null | none |
//! | 125 | integer | signed varint |
//! | 124 | float32 | 4 bytes, big-endian |
//! | 123 | float64 | 8 bytes, big-endian |
//! | 122 | 64-bit integer | 8 bytes, big-endian two's complement |
//! | 121 | false | none |
//! | 120 | true | none |
//! | 119 | string | varint length + UTF-8 |
//! | 118 | object | varint count, then (key, value) pairs |
//! | 117 | array | varint length, then values |
//! | 116 | binary | varint length + raw bytes |
//!
//! Tags 0-115 are never produced and are left to callers that embed this format
//! inside their own protocol.
//!
//! ## Attribute Macros
//!
//! - `#[anycodec(rename = "name")]` — Use the given string as the object key (or enum variant name).
//! - `#[anycodec(default)]` — If a field is missing during conversion, use `Default::default()`.
//! - `#[anycodec(skip)]` — Never written; always `Default::default()` when read back.
//!
//! ## Feature Flags
//!
//! - `serde_json` — Conversions to/from `serde_json::Value` and the [`message::JsonCodec`].
//! - `indexmap` — Conversions for `IndexMap<String, T>`.
//! - `smol_str` — Conversions for `smol_str::SmolStr`.
//! - `uuid` — Conversions for `uuid::Uuid` (as a 16-byte binary value).

pub mod bitfield;
pub mod buffer;
mod convert;
pub mod core;
pub mod decoder;
mod features;
pub mod message;
pub mod string;
pub mod varint;

pub use crate::buffer::{BinEncoder, DEFAULT_CHUNK_CAPACITY};
pub use crate::core::*;
pub use crate::decoder::BinDecoder;
pub use crate::string::{utf8_byte_length, Utf8Codec};
pub use crate::varint::MAX_SAFE_INTEGER;
pub use anycodec_derive::{FromAny, ToAny};
pub use bytes::Bytes;

/// Errors that can occur while encoding, decoding or converting values.
#[derive(Debug, thiserror::Error)]
pub enum EncoderError {
    /// The byte stream could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// A decoded [`Value`] did not have the shape the target type expects.
    #[error(transparent)]
    Convert(#[from] ConvertError),
    /// The JSON message codec failed.
    #[cfg(feature = "serde_json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The result type used throughout this crate.
pub type Result<T> = std::result::Result<T, EncoderError>;

/// Errors raised by [`BinDecoder`] and [`read_any`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Unexpected end of data at offset {offset}: {needed} more byte(s) required")]
    UnexpectedEndOfData { offset: usize, needed: usize },
    #[error("Integer out of range")]
    IntegerOutOfRange,
    #[error("Unknown tag: {0}")]
    UnknownTag(u8),
    #[error("Invalid UTF-8 at offset {offset}")]
    InvalidUtf8 { offset: usize },
    #[error("Nesting deeper than {0} levels")]
    DepthLimitExceeded(usize),
}

/// Errors raised by [`FromAny`] implementations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    #[error("Expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("Required field '{field}' not found for {type_name}")]
    MissingField {
        field: &'static str,
        type_name: &'static str,
    },
    #[error("Unknown variant '{variant}' for enum {enum_name}")]
    UnknownVariant {
        variant: String,
        enum_name: &'static str,
    },
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("Value {value} does not fit in {target}")]
    OutOfRange { value: String, target: &'static str },
    #[error("{0}")]
    Custom(String),
}

impl ConvertError {
    /// Shorthand for a [`ConvertError::TypeMismatch`] against the given value.
    pub fn mismatch(expected: &'static str, found: &Value) -> Self {
        ConvertError::TypeMismatch {
            expected,
            found: found.kind_name(),
        }
    }
}

/// Trait for types that can be turned into a [`Value`].
///
/// Most users should use `#[derive(ToAny)]` instead of manual implementation.
pub trait ToAny {
    /// Builds the dynamic representation of `self`.
    fn to_any(&self) -> Value;
}

/// Trait for types that can be rebuilt from a [`Value`].
///
/// Most users should use `#[derive(FromAny)]` instead of manual implementation.
///
/// # Errors
/// Returns `ConvertError` if the value does not have the expected shape.
pub trait FromAny: Sized {
    /// Consumes a dynamic value and converts it into `Self`.
    fn from_any(value: Value) -> std::result::Result<Self, ConvertError>;
}

/// Encodes a value into a freshly allocated byte buffer.
///
/// Encoding never fails: every [`Value`] has a wire representation.
/// Values nested deeper than [`MAX_DEPTH`] still encode, but [`decode`] rejects
/// them with [`DecodeError::DepthLimitExceeded`].
///
/// # Example
/// ```rust
/// use anycodec::{encode, decode, Value};
///
/// let value = Value::from(vec![Value::from(1), Value::from("two")]);
/// let bytes = encode(&value);
/// assert_eq!(decode(&bytes).unwrap(), value);
/// ```
pub fn encode(value: &Value) -> Bytes {
    let mut encoder = BinEncoder::new();
    encoder.write_any(value);
    let bytes = encoder.to_bytes();
    tracing::trace!(len = bytes.len(), "encoded value");
    bytes
}

/// Decodes one value from the start of `data`.
///
/// The input is copied once; use [`decode_bytes`] to decode without copying.
/// Trailing bytes after the first value are ignored.
///
/// # Errors
/// Returns `EncoderError::Decode` if the data is truncated, malformed, or
/// contains an integer beyond [`MAX_SAFE_INTEGER`].
pub fn decode(data: &[u8]) -> Result<Value> {
    decode_bytes(Bytes::copy_from_slice(data))
}

/// Decodes one value from a shared buffer.
///
/// Binary values in the result are zero-copy views into `data`.
pub fn decode_bytes(data: Bytes) -> Result<Value> {
    let len = data.len();
    let mut decoder = BinDecoder::new(data);
    match decoder.read_any() {
        Ok(value) => {
            tracing::trace!(len, consumed = decoder.position(), "decoded value");
            Ok(value)
        }
        Err(err) => {
            tracing::debug!(len, offset = decoder.position(), error = %err, "failed to decode value");
            Err(err)
        }
    }
}

/// Converts a value with [`ToAny`] and encodes it.
///
/// # Example
/// ```rust
/// use anycodec::{pack, unpack, FromAny, ToAny};
///
/// #[derive(ToAny, FromAny, PartialEq, Debug)]
/// struct MyStruct {
///     id: u32,
///     name: String,
/// }
///
/// let value = MyStruct { id: 42, name: "hello".to_string() };
/// let bytes = pack(&value);
/// let decoded: MyStruct = unpack(&bytes).unwrap();
/// assert_eq!(value, decoded);
/// ```
pub fn pack<T: ToAny + ?Sized>(value: &T) -> Bytes {
    encode(&value.to_any())
}

/// Decodes a value and converts it with [`FromAny`].
///
/// # Errors
/// Returns `EncoderError::Decode` for malformed bytes and
/// `EncoderError::Convert` when the decoded value has the wrong shape.
pub fn unpack<T: FromAny>(data: &[u8]) -> Result<T> {
    let value = decode(data)?;
    Ok(T::from_any(value)?)
}
