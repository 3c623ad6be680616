//! Pluggable message codecs.
//!
//! A transport that ships [`Value`]s around only needs something that turns a
//! value into bytes and back. [`BinaryCodec`] uses this crate's wire format;
//! [`JsonCodec`] (feature `serde_json`) produces JSON text for peers that
//! cannot speak binary.

use crate::*;

/// Converts whole messages to and from bytes.
pub trait MessageCodec {
    /// Serializes one message.
    fn encode(&self, value: &Value) -> Result<Bytes>;
    /// Deserializes one message.
    fn decode(&self, data: &[u8]) -> Result<Value>;
}

/// The tagged binary format of this crate.
///
/// # Example
/// ```rust
/// use anycodec::message::{BinaryCodec, MessageCodec};
/// use anycodec::Value;
///
/// let codec = BinaryCodec;
/// let bytes = codec.encode(&Value::from("ping")).unwrap();
/// assert_eq!(&bytes[..], &[119, 4, b'p', b'i', b'n', b'g']);
/// assert_eq!(codec.decode(&bytes).unwrap(), Value::from("ping"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl MessageCodec for BinaryCodec {
    fn encode(&self, value: &Value) -> Result<Bytes> {
        let bytes = crate::encode(value);
        tracing::trace!(len = bytes.len(), "binary message encoded");
        Ok(bytes)
    }

    fn decode(&self, data: &[u8]) -> Result<Value> {
        tracing::trace!(len = data.len(), "binary message received");
        crate::decode(data)
    }
}

/// JSON text.
///
/// JSON is narrower than [`Value`]: `undefined` and non-finite numbers are
/// sent as `null`, and binary values as arrays of byte values. Those do not
/// come back as what was sent.
#[cfg(feature = "serde_json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "serde_json")]
impl MessageCodec for JsonCodec {
    fn encode(&self, value: &Value) -> Result<Bytes> {
        let json = serde_json::Value::from_any(value.clone())?;
        let text = serde_json::to_vec(&json)?;
        tracing::trace!(len = text.len(), "json message encoded");
        Ok(Bytes::from(text))
    }

    fn decode(&self, data: &[u8]) -> Result<Value> {
        tracing::trace!(len = data.len(), "json message received");
        let json: serde_json::Value = serde_json::from_slice(data)?;
        Ok(json.to_any())
    }
}
