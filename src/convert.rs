use crate::varint::MAX_SAFE_INTEGER;
use crate::*;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::Arc;

/// 2^64, the first float no `u64` can hold.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;
/// Largest integer magnitude an `f32` holds exactly.
const F32_EXACT_INT: u64 = 1 << 24;

// --- Value ---
impl ToAny for Value {
    fn to_any(&self) -> Value {
        self.clone()
    }
}
impl FromAny for Value {
    fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
        Ok(value)
    }
}

// --- unit ---
/// `()` is `undefined`.
impl ToAny for () {
    fn to_any(&self) -> Value {
        Value::Undefined
    }
}
impl FromAny for () {
    fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
        match value {
            Value::Undefined | Value::Null => Ok(()),
            other => Err(ConvertError::mismatch("undefined", &other)),
        }
    }
}

// --- bool ---
impl ToAny for bool {
    fn to_any(&self) -> Value {
        Value::Bool(*self)
    }
}
impl FromAny for bool {
    fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
        value
            .as_bool()
            .ok_or_else(|| ConvertError::mismatch("boolean", &value))
    }
}

// --- integers ---
/// Integers become `Value::Int`; unsigned values above `i64::MAX` fall back to `F64`.
/// Decoding accepts any numeric variant holding an integral value in range.
macro_rules! impl_int {
    ($($t:ty),*) => {
        $(
            impl ToAny for $t {
                #[allow(irrefutable_let_patterns)]
                fn to_any(&self) -> Value {
                    if let Ok(i) = i64::try_from(*self) {
                        Value::Int(i)
                    } else {
                        Value::F64(*self as f64)
                    }
                }
            }
            impl FromAny for $t {
                fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
                    let i = value
                        .as_i64()
                        .ok_or_else(|| ConvertError::mismatch(stringify!($t), &value))?;
                    <$t>::try_from(i).map_err(|_| ConvertError::OutOfRange {
                        value: i.to_string(),
                        target: stringify!($t),
                    })
                }
            }
        )*
    };
}

impl_int!(i8, i16, i32, i64, isize, u8, u16, u32, usize);

/// Values above `i64::MAX` are stored as floats, so above 2^53 they round to
/// the nearest representable double. `u64::MAX` rounds to 2^64 and does not
/// convert back.
impl ToAny for u64 {
    fn to_any(&self) -> Value {
        match i64::try_from(*self) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::F64(*self as f64),
        }
    }
}
impl FromAny for u64 {
    fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
        if let Value::F32(_) | Value::F64(_) = value {
            let f = value.as_f64().unwrap_or(f64::NAN);
            if f.fract() == 0.0 && f >= 0.0 {
                if f < U64_LIMIT {
                    return Ok(f as u64);
                }
                return Err(ConvertError::OutOfRange {
                    value: f.to_string(),
                    target: "u64",
                });
            }
        }
        let i = value
            .as_i64()
            .ok_or_else(|| ConvertError::mismatch("u64", &value))?;
        u64::try_from(i).map_err(|_| ConvertError::OutOfRange {
            value: i.to_string(),
            target: "u64",
        })
    }
}

// --- f32/f64 ---
impl ToAny for f32 {
    fn to_any(&self) -> Value {
        Value::F32(*self)
    }
}
/// Integers beyond ±2^24 and finite doubles beyond the `f32` range are
/// rejected; other doubles are rounded to the nearest `f32`.
impl FromAny for f32 {
    fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
        let out_of_range = match value {
            Value::Int(i) | Value::BigInt(i) => i.unsigned_abs() > F32_EXACT_INT,
            Value::F64(f) => f.is_finite() && f.abs() > f32::MAX as f64,
            _ => false,
        };
        if out_of_range {
            let shown = match value {
                Value::F64(f) => f.to_string(),
                _ => value.as_i64().unwrap_or_default().to_string(),
            };
            return Err(ConvertError::OutOfRange {
                value: shown,
                target: "f32",
            });
        }
        value
            .as_f64()
            .map(|f| f as f32)
            .ok_or_else(|| ConvertError::mismatch("f32", &value))
    }
}
impl ToAny for f64 {
    fn to_any(&self) -> Value {
        Value::F64(*self)
    }
}
impl FromAny for f64 {
    fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
        if let Value::Int(i) | Value::BigInt(i) = value {
            if i.unsigned_abs() > MAX_SAFE_INTEGER {
                return Err(ConvertError::OutOfRange {
                    value: i.to_string(),
                    target: "f64",
                });
            }
        }
        value
            .as_f64()
            .ok_or_else(|| ConvertError::mismatch("f64", &value))
    }
}

// --- String ---
impl ToAny for String {
    fn to_any(&self) -> Value {
        Value::Str(self.clone())
    }
}
impl ToAny for str {
    fn to_any(&self) -> Value {
        Value::Str(self.to_owned())
    }
}
impl FromAny for String {
    fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(ConvertError::mismatch("string", &other)),
        }
    }
}

// --- Bytes ---
impl ToAny for Bytes {
    fn to_any(&self) -> Value {
        Value::Bytes(self.clone())
    }
}
impl FromAny for Bytes {
    fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
        match value {
            Value::Bytes(b) => Ok(b),
            other => Err(ConvertError::mismatch("binary", &other)),
        }
    }
}

// --- Option ---
/// `None` is `null`; both `null` and `undefined` decode to `None`.
impl<T: ToAny> ToAny for Option<T> {
    fn to_any(&self) -> Value {
        match self {
            Some(v) => v.to_any(),
            None => Value::Null,
        }
    }
}
impl<T: FromAny> FromAny for Option<T> {
    fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
        match value {
            Value::Null | Value::Undefined => Ok(None),
            other => T::from_any(other).map(Some),
        }
    }
}

// --- Vec<T> / slices / arrays ---
impl<T: ToAny> ToAny for [T] {
    fn to_any(&self) -> Value {
        Value::Array(self.iter().map(ToAny::to_any).collect())
    }
}
impl<T: ToAny> ToAny for Vec<T> {
    fn to_any(&self) -> Value {
        self.as_slice().to_any()
    }
}
impl<T: FromAny> FromAny for Vec<T> {
    fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
        match value {
            Value::Array(items) => items.into_iter().map(T::from_any).collect(),
            other => Err(ConvertError::mismatch("array", &other)),
        }
    }
}
impl<T: ToAny, const N: usize> ToAny for [T; N] {
    fn to_any(&self) -> Value {
        self.as_slice().to_any()
    }
}
impl<T: FromAny, const N: usize> FromAny for [T; N] {
    fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
        let items = Vec::<T>::from_any(value)?;
        let actual = items.len();
        items.try_into().map_err(|_| ConvertError::LengthMismatch {
            expected: N,
            actual,
        })
    }
}

// --- Tuple ---
/// Tuples are arrays of fixed length.
macro_rules! impl_tuple {
    ($len:expr => $($T:ident : $idx:tt),+) => {
        impl<$($T: ToAny),+> ToAny for ($($T,)+) {
            fn to_any(&self) -> Value {
                Value::Array(vec![$(self.$idx.to_any()),+])
            }
        }
        impl<$($T: FromAny),+> FromAny for ($($T,)+) {
            fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
                let items = match value {
                    Value::Array(items) => items,
                    other => return Err(ConvertError::mismatch("array", &other)),
                };
                if items.len() != $len {
                    return Err(ConvertError::LengthMismatch {
                        expected: $len,
                        actual: items.len(),
                    });
                }
                let mut items = items.into_iter();
                Ok(($(
                    $T::from_any(items.next().unwrap_or_default())?,
                )+))
            }
        }
    };
}

impl_tuple!(1 => T0: 0);
impl_tuple!(2 => T0: 0, T1: 1);
impl_tuple!(3 => T0: 0, T1: 1, T2: 2);
impl_tuple!(4 => T0: 0, T1: 1, T2: 2, T3: 3);
impl_tuple!(5 => T0: 0, T1: 1, T2: 2, T3: 3, T4: 4);
impl_tuple!(6 => T0: 0, T1: 1, T2: 2, T3: 3, T4: 4, T5: 5);

// --- Map (HashMap) ---
impl<T: ToAny, S: BuildHasher> ToAny for HashMap<String, T, S> {
    fn to_any(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.clone(), v.to_any())).collect())
    }
}
impl<T: FromAny, S: BuildHasher + Default> FromAny for HashMap<String, T, S> {
    fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
        map_from_any(value)
    }
}

// --- BTreeMap ---
impl<T: ToAny> ToAny for BTreeMap<String, T> {
    fn to_any(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.clone(), v.to_any())).collect())
    }
}
impl<T: FromAny> FromAny for BTreeMap<String, T> {
    fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
        map_from_any(value)
    }
}

/// Collects map entries into any string-keyed collection.
pub(crate) fn map_from_any<M, T>(value: Value) -> std::result::Result<M, ConvertError>
where
    M: FromIterator<(String, T)>,
    T: FromAny,
{
    match value {
        Value::Map(map) => map
            .into_iter()
            .map(|(k, v)| Ok((k, T::from_any(v)?)))
            .collect(),
        other => Err(ConvertError::mismatch("object", &other)),
    }
}

// --- Box<T> / Arc<T> / &T ---
impl<T: ToAny + ?Sized> ToAny for Box<T> {
    fn to_any(&self) -> Value {
        (**self).to_any()
    }
}
impl<T: FromAny> FromAny for Box<T> {
    fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
        Ok(Box::new(T::from_any(value)?))
    }
}
impl<T: ToAny + ?Sized> ToAny for Arc<T> {
    fn to_any(&self) -> Value {
        (**self).to_any()
    }
}
impl<T: FromAny> FromAny for Arc<T> {
    fn from_any(value: Value) -> std::result::Result<Self, ConvertError> {
        Ok(Arc::new(T::from_any(value)?))
    }
}
impl<T: ToAny + ?Sized> ToAny for &T {
    fn to_any(&self) -> Value {
        (**self).to_any()
    }
}
