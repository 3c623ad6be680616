use crate::varint::MAX_SAFE_INTEGER;
use crate::*;
use std::collections::BTreeMap;

/// Type tags used in the anycodec binary format.
///
/// Each encoded value starts with one of these bytes. Tags are assigned from 127
/// downwards; 0-115 are never produced so that callers can use them for their
/// own framing. Tags are stable and part of the wire format.
pub const TAG_UNDEFINED: u8 = 127;
pub const TAG_NULL: u8 = 126;
///< Signed varint, only for integers with `|n| <= 2^31 - 1`
pub const TAG_INTEGER: u8 = 125;
pub const TAG_FLOAT32: u8 = 124;
pub const TAG_FLOAT64: u8 = 123;
///< 8 bytes, big-endian two's complement
pub const TAG_BIGINT: u8 = 122;
pub const TAG_FALSE: u8 = 121;
///< `0b0111_1000`; the low bit tells true and false apart
pub const TAG_TRUE: u8 = 120;
pub const TAG_STRING: u8 = 119;
///< String-keyed map, keys sorted
pub const TAG_OBJECT: u8 = 118;
pub const TAG_ARRAY: u8 = 117;
pub const TAG_BINARY: u8 = 116;

/// Largest integer written with [`TAG_INTEGER`].
pub const HIGHEST_INT32: i64 = 0x7FFF_FFFF;

/// Maximum nesting of arrays and objects accepted by [`read_any`].
pub const MAX_DEPTH: usize = 512;

/// The twelve value kinds of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Undefined = TAG_UNDEFINED,
    Null = TAG_NULL,
    Integer = TAG_INTEGER,
    Float32 = TAG_FLOAT32,
    Float64 = TAG_FLOAT64,
    BigInt = TAG_BIGINT,
    False = TAG_FALSE,
    True = TAG_TRUE,
    String = TAG_STRING,
    Object = TAG_OBJECT,
    Array = TAG_ARRAY,
    Binary = TAG_BINARY,
}

impl Tag {
    /// Looks up a tag byte; `None` for bytes outside 116..=127.
    pub fn from_u8(byte: u8) -> Option<Tag> {
        Some(match byte {
            TAG_UNDEFINED => Tag::Undefined,
            TAG_NULL => Tag::Null,
            TAG_INTEGER => Tag::Integer,
            TAG_FLOAT32 => Tag::Float32,
            TAG_FLOAT64 => Tag::Float64,
            TAG_BIGINT => Tag::BigInt,
            TAG_FALSE => Tag::False,
            TAG_TRUE => Tag::True,
            TAG_STRING => Tag::String,
            TAG_OBJECT => Tag::Object,
            TAG_ARRAY => Tag::Array,
            TAG_BINARY => Tag::Binary,
            _ => return None,
        })
    }

    /// Position in the dispatch order, `127 - tag`.
    pub fn index(self) -> usize {
        (TAG_UNDEFINED - self as u8) as usize
    }
}

impl TryFrom<u8> for Tag {
    type Error = DecodeError;

    fn try_from(byte: u8) -> std::result::Result<Self, Self::Error> {
        Tag::from_u8(byte).ok_or(DecodeError::UnknownTag(byte))
    }
}

/// A dynamically shaped value.
///
/// Numbers are compared by numeric value across `Int`, `F32`, `F64` and
/// `BigInt`, because the encoder picks the smallest exact wire form and the
/// decoder may hand back a different variant than the one that was written
/// (`F64(3.0)` comes back as `Int(3)`).
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Int(i64),
    F32(f32),
    F64(f64),
    BigInt(i64),
    Bool(bool),
    Str(String),
    Bytes(Bytes),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Human-readable kind, used in conversion errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Int(_) => "integer",
            Value::F32(_) => "float32",
            Value::F64(_) => "float64",
            Value::BigInt(_) => "bigint",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::Bytes(_) => "binary",
            Value::Array(_) => "array",
            Value::Map(_) => "object",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `true` for any of the numeric variants.
    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Value::Int(_) | Value::F32(_) | Value::F64(_) | Value::BigInt(_)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The value as an `i64`, if it is an integer or an integral float that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(i) | Value::BigInt(i) => Some(i),
            Value::F32(f) => float_to_i64(f as f64),
            Value::F64(f) => float_to_i64(f),
            _ => None,
        }
    }

    /// The value as an `f64`; large integers may lose precision.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(i) | Value::BigInt(i) => Some(i as f64),
            Value::F32(f) => Some(f as f64),
            Value::F64(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Looks up a key of an object; `None` for missing keys and non-objects.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }
}

fn float_to_i64(f: f64) -> Option<i64> {
    // 2^63 is exactly representable; anything at or above it does not fit
    if f.fract() == 0.0 && f >= -9_223_372_036_854_775_808.0 && f < 9_223_372_036_854_775_808.0 {
        Some(f as i64)
    } else {
        None
    }
}

fn int_eq_float(i: i64, f: f64) -> bool {
    float_to_i64(f) == Some(i)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Undefined, Undefined) | (Null, Null) => true,
            (Int(a) | BigInt(a), Int(b) | BigInt(b)) => a == b,
            (Int(a) | BigInt(a), F32(b)) | (F32(b), Int(a) | BigInt(a)) => int_eq_float(*a, *b as f64),
            (Int(a) | BigInt(a), F64(b)) | (F64(b), Int(a) | BigInt(a)) => int_eq_float(*a, *b),
            (F32(a), F32(b)) => a == b,
            (F64(a), F64(b)) => a == b,
            (F32(a), F64(b)) | (F64(b), F32(a)) => *a as f64 == *b,
            (Bool(a), Bool(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::Array(iter.into_iter().collect())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// --- encoding ---

/// Checks whether `n` survives a round trip through `f32` unchanged.
#[inline]
fn is_float32(n: f64) -> bool {
    (n as f32) as f64 == n
}

/// Writes a number in the smallest exact form: varint, then float32, then float64.
fn write_number(encoder: &mut BinEncoder, n: f64) {
    if n.fract() == 0.0 && n.abs() <= HIGHEST_INT32 as f64 {
        encoder.write(TAG_INTEGER);
        // the sign bit is taken from the float so that -0.0 stays negative
        encoder.write_var_int_parts(n.is_sign_negative(), n.abs() as u64);
    } else if is_float32(n) {
        encoder.write(TAG_FLOAT32);
        encoder.write_f32(n as f32);
    } else {
        encoder.write(TAG_FLOAT64);
        encoder.write_f64(n);
    }
}

fn write_int(encoder: &mut BinEncoder, i: i64) {
    let magnitude = i.unsigned_abs();
    if magnitude <= HIGHEST_INT32 as u64 {
        encoder.write(TAG_INTEGER);
        encoder.write_var_int_parts(i < 0, magnitude);
    } else if magnitude <= MAX_SAFE_INTEGER {
        write_number(encoder, i as f64);
    } else {
        encoder.write(TAG_BIGINT);
        encoder.write_i64(i);
    }
}

/// Orders keys by UTF-16 code units, matching how string keys are sorted by
/// peers whose strings are UTF-16.
fn sorted_keys(map: &BTreeMap<String, Value>) -> Vec<&String> {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort_by(|a, b| a.encode_utf16().cmp(b.encode_utf16()));
    keys
}

/// Writes `value` and everything nested inside it.
///
/// | Value | Tag |
/// |---|---|
/// | `Undefined` | 127 |
/// | `Null` | 126 |
/// | `Int`, `F32`, `F64` | 125 if integral and within ±(2^31 - 1), else 124 if exact as `f32`, else 123 |
/// | `Int` beyond ±(2^53 - 1), `BigInt` | 122 |
/// | `Bool` | 120 / 121 |
/// | `Str` | 119 |
/// | `Map` | 118, keys sorted |
/// | `Array` | 117 |
/// | `Bytes` | 116 |
///
/// No depth limit applies here. Output nested deeper than [`MAX_DEPTH`] is
/// refused by [`read_any`].
pub fn write_any(encoder: &mut BinEncoder, value: &Value) {
    match value {
        Value::Undefined => encoder.write(TAG_UNDEFINED),
        Value::Null => encoder.write(TAG_NULL),
        Value::Int(i) => write_int(encoder, *i),
        Value::F32(f) => write_number(encoder, *f as f64),
        Value::F64(f) => write_number(encoder, *f),
        Value::BigInt(i) => {
            encoder.write(TAG_BIGINT);
            encoder.write_i64(*i);
        }
        Value::Bool(b) => encoder.write(if *b { TAG_TRUE } else { TAG_FALSE }),
        Value::Str(s) => {
            encoder.write(TAG_STRING);
            encoder.write_var_string(s);
        }
        Value::Map(map) => {
            encoder.write(TAG_OBJECT);
            encoder.write_var_uint(map.len() as u64);
            for key in sorted_keys(map) {
                encoder.write_var_string(key);
                write_any(encoder, &map[key]);
            }
        }
        Value::Array(items) => {
            encoder.write(TAG_ARRAY);
            encoder.write_var_uint(items.len() as u64);
            for item in items {
                write_any(encoder, item);
            }
        }
        Value::Bytes(bytes) => {
            encoder.write(TAG_BINARY);
            encoder.write_var_bytes(bytes);
        }
    }
}

// --- decoding ---

/// Reads one value and everything nested inside it.
///
/// # Errors
/// `UnknownTag` for a byte outside 116..=127, plus any error of the
/// underlying primitive readers.
pub fn read_any(decoder: &mut BinDecoder) -> Result<Value> {
    read_nested(decoder, 0)
}

fn read_nested(decoder: &mut BinDecoder, depth: usize) -> Result<Value> {
    let byte = decoder.read_u8()?;
    let tag = Tag::try_from(byte).inspect_err(|_| {
        tracing::debug!(tag = byte, offset = decoder.position() - 1, "unknown tag byte");
    })?;
    Ok(match tag {
        Tag::Undefined => Value::Undefined,
        Tag::Null => Value::Null,
        Tag::Integer => {
            let (negative, magnitude) = decoder.read_var_int_parts()?;
            match (negative, magnitude) {
                (true, 0) => Value::F64(-0.0),
                (true, m) => Value::Int(-(m as i64)),
                (false, m) => Value::Int(m as i64),
            }
        }
        Tag::Float32 => Value::F32(decoder.read_f32()?),
        Tag::Float64 => Value::F64(decoder.read_f64()?),
        Tag::BigInt => Value::BigInt(decoder.read_i64()?),
        Tag::False => Value::Bool(false),
        Tag::True => Value::Bool(true),
        Tag::String => Value::Str(decoder.read_var_string()?),
        Tag::Object => {
            let depth = enter(depth)?;
            let len = decoder.read_var_len()?;
            let mut map = BTreeMap::new();
            for _ in 0..len {
                let key = decoder.read_var_string()?;
                let value = read_nested(decoder, depth)?;
                map.insert(key, value);
            }
            Value::Map(map)
        }
        Tag::Array => {
            let depth = enter(depth)?;
            let len = decoder.read_var_len()?;
            // every element takes at least one byte
            let mut items = Vec::with_capacity(len.min(decoder.remaining()));
            for _ in 0..len {
                items.push(read_nested(decoder, depth)?);
            }
            Value::Array(items)
        }
        Tag::Binary => Value::Bytes(decoder.read_var_bytes()?),
    })
}

fn enter(depth: usize) -> Result<usize> {
    if depth >= MAX_DEPTH {
        return Err(DecodeError::DepthLimitExceeded(MAX_DEPTH).into());
    }
    Ok(depth + 1)
}

impl BinEncoder {
    /// Writes a self-describing value. See [`write_any`].
    pub fn write_any(&mut self, value: &Value) {
        write_any(self, value);
    }
}

impl BinDecoder {
    /// Reads a self-describing value. See [`read_any`].
    pub fn read_any(&mut self) -> Result<Value> {
        read_any(self)
    }
}
