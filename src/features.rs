#[cfg(feature = "indexmap")]
use indexmap::IndexMap;
#[cfg(feature = "smol_str")]
use smol_str::SmolStr;
#[cfg(feature = "uuid")]
use uuid::Uuid;

#[allow(unused_imports)]
use crate::*;

// --- IndexMap ---
/// Entries come back in wire order, which is sorted by key.
#[cfg(feature = "indexmap")]
impl<T: ToAny, S: std::hash::BuildHasher> ToAny for IndexMap<String, T, S> {
    fn to_any(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.clone(), v.to_any())).collect())
    }
}
#[cfg(feature = "indexmap")]
impl<T: FromAny, S: std::hash::BuildHasher + Default> FromAny for IndexMap<String, T, S> {
    fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
        crate::convert::map_from_any(value)
    }
}

// --- UUID ---
/// Encodes a `uuid::Uuid` as a 16-byte binary value.
#[cfg(feature = "uuid")]
impl ToAny for Uuid {
    fn to_any(&self) -> Value {
        Value::Bytes(Bytes::copy_from_slice(self.as_bytes()))
    }
}
/// Accepts the 16-byte binary form, or a hyphenated string.
#[cfg(feature = "uuid")]
impl FromAny for Uuid {
    fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
        match value {
            Value::Bytes(b) => Uuid::from_slice(&b).map_err(|_| ConvertError::LengthMismatch {
                expected: 16,
                actual: b.len(),
            }),
            Value::Str(s) => {
                Uuid::parse_str(&s).map_err(|e| ConvertError::Custom(format!("Invalid UUID: {e}")))
            }
            other => Err(ConvertError::mismatch("uuid", &other)),
        }
    }
}

// --- serde_json::Value ---
/// Numbers keep their integer-ness where possible; everything else maps one to one.
#[cfg(feature = "serde_json")]
impl ToAny for serde_json::Value {
    fn to_any(&self) -> Value {
        match self {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    u.to_any()
                } else {
                    Value::F64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(arr) => arr.iter().map(ToAny::to_any).collect(),
            serde_json::Value::Object(obj) => Value::Map(
                obj.iter()
                    .map(|(k, v)| (k.clone(), v.to_any()))
                    .collect(),
            ),
        }
    }
}

/// JSON has no undefined, binary or non-finite numbers:
/// `undefined` and NaN/infinity become `null`, binary becomes an array of byte values.
#[cfg(feature = "serde_json")]
impl FromAny for serde_json::Value {
    fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
        use serde_json::{Map, Number};
        Ok(match value {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) | Value::BigInt(i) => serde_json::Value::Number(Number::from(i)),
            Value::F32(f) => Number::from_f64(f as f64)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::F64(f) => Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s),
            Value::Bytes(b) => serde_json::Value::Array(
                b.iter()
                    .map(|byte| serde_json::Value::Number(Number::from(*byte)))
                    .collect(),
            ),
            Value::Array(items) => serde_json::Value::Array(
                items
                    .into_iter()
                    .map(serde_json::Value::from_any)
                    .collect::<std::result::Result<_, _>>()?,
            ),
            Value::Map(map) => {
                let mut obj = Map::with_capacity(map.len());
                for (k, v) in map {
                    obj.insert(k, serde_json::Value::from_any(v)?);
                }
                serde_json::Value::Object(obj)
            }
        })
    }
}

// --- SmolStr ---
#[cfg(feature = "smol_str")]
impl ToAny for SmolStr {
    fn to_any(&self) -> Value {
        Value::Str(self.to_string())
    }
}
#[cfg(feature = "smol_str")]
impl FromAny for SmolStr {
    fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
        match value {
            Value::Str(s) => Ok(SmolStr::from(s)),
            other => Err(ConvertError::mismatch("string", &other)),
        }
    }
}
