use std::any::{Any, TypeId, type_name};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::decimal::Decimal;
use crate::enumeration::{self, EnumType};

/// Dynamically typed input to the coercer.
///
/// Strategy by kind:
/// - Scalars (Bool, Char, Int64, UInt64, Float32, Float64, Decimal): stored as-is
/// - String, Bytes: `Cow` (zero-copy when borrowed)
/// - Enum: member of a concrete enumeration, keeps its type identity
/// - Array, Map: recursive, never convertible to a scalar
/// - Object: foreign Rust value, reachable only by direct cast
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// No value at all.
    Null,
    /// Database null sentinel. Treated exactly like `Null`.
    DbNull,

    Bool(bool),
    Char(char),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Decimal(Decimal),

    String(Cow<'a, str>),
    /// Opaque binary data.
    Bytes(Cow<'a, [u8]>),

    Enum(EnumValue),

    Array(Vec<Value<'a>>),
    Map(Vec<(Value<'a>, Value<'a>)>),

    Object(Object),
}

/// Enumeration member captured by [`Value::from_enum`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub type_id: TypeId,
    pub type_name: &'static str,
    /// Underlying integer value.
    pub bits: i128,
    /// Member name, `", "`-joined names for flags, or the number.
    pub text: String,
}

/// Shared handle to an arbitrary Rust value.
#[derive(Clone)]
pub struct Object {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Object {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self { inner: Arc::new(value), type_name: type_name::<T>() }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.inner).downcast_ref::<T>()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.type_name)
    }
}

/// Identity, not structural equality.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<'a> Value<'a> {
    pub fn from_enum<E: EnumType>(member: E) -> Value<'static> {
        let bits = member.bits();
        Value::Enum(EnumValue {
            type_id: TypeId::of::<E>(),
            type_name: type_name::<E>(),
            bits,
            text: enumeration::format_bits::<E>(bits),
        })
    }

    pub fn object<T: Any + Send + Sync>(value: T) -> Value<'static> {
        Value::Object(Object::new(value))
    }

    /// `Null` or `DbNull`.
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Null | Value::DbNull)
    }

    /// Short name of the runtime kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::DbNull => "db_null",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Int64(_) => "i64",
            Value::UInt64(_) => "u64",
            Value::Float32(_) => "f32",
            Value::Float64(_) => "f64",
            Value::Decimal(_) => "Decimal",
            Value::String(_) => "String",
            Value::Bytes(_) => "bytes",
            Value::Enum(e) => e.type_name,
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Object(o) => o.type_name(),
        }
    }

    /// Textual form used when an enumeration is parsed from this value.
    ///
    /// `None` for kinds without a meaningful text (bytes, containers,
    /// foreign objects).
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        let text = match self {
            Value::Null | Value::DbNull => Cow::Borrowed(""),
            Value::Bool(true) => Cow::Borrowed("True"),
            Value::Bool(false) => Cow::Borrowed("False"),
            Value::Char(c) => Cow::Owned(c.to_string()),
            Value::Int64(v) => Cow::Owned(v.to_string()),
            Value::UInt64(v) => Cow::Owned(v.to_string()),
            Value::Float32(v) => Cow::Owned(v.to_string()),
            Value::Float64(v) => Cow::Owned(v.to_string()),
            Value::Decimal(d) => Cow::Owned(d.to_string()),
            Value::String(s) => Cow::Borrowed(&s[..]),
            Value::Enum(e) => Cow::Borrowed(e.text.as_str()),
            Value::Bytes(_) | Value::Array(_) | Value::Map(_) | Value::Object(_) => return None,
        };
        Some(text)
    }

    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Null => Value::Null,
            Value::DbNull => Value::DbNull,
            Value::Bool(v) => Value::Bool(v),
            Value::Char(v) => Value::Char(v),
            Value::Int64(v) => Value::Int64(v),
            Value::UInt64(v) => Value::UInt64(v),
            Value::Float32(v) => Value::Float32(v),
            Value::Float64(v) => Value::Float64(v),
            Value::Decimal(v) => Value::Decimal(v),
            Value::String(s) => Value::String(Cow::Owned(s.into_owned())),
            Value::Bytes(b) => Value::Bytes(Cow::Owned(b.into_owned())),
            Value::Enum(e) => Value::Enum(e),
            Value::Array(items) => Value::Array(items.into_iter().map(Value::into_owned).collect()),
            Value::Map(entries) => Value::Map(
                entries.into_iter().map(|(k, v)| (k.into_owned(), v.into_owned())).collect(),
            ),
            Value::Object(o) => Value::Object(o),
        }
    }
}

// ---------------------------------------------------------------------------
// From impls: Rust values → Value
// ---------------------------------------------------------------------------

macro_rules! from_signed {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Value<'_> {
            fn from(v: $ty) -> Self {
                Value::Int64(v as i64)
            }
        }
    )*};
}

macro_rules! from_unsigned {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Value<'_> {
            fn from(v: $ty) -> Self {
                Value::UInt64(v as u64)
            }
        }
    )*};
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<bool> for Value<'_> {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<char> for Value<'_> {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<f32> for Value<'_> {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value<'_> {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<Decimal> for Value<'_> {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(v: &'a str) -> Self {
        Value::String(Cow::Borrowed(v))
    }
}

impl From<String> for Value<'_> {
    fn from(v: String) -> Self {
        Value::String(Cow::Owned(v))
    }
}

impl<'a> From<Cow<'a, str>> for Value<'a> {
    fn from(v: Cow<'a, str>) -> Self {
        Value::String(v)
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(v: &'a [u8]) -> Self {
        Value::Bytes(Cow::Borrowed(v))
    }
}

impl From<Vec<u8>> for Value<'_> {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Cow::Owned(v))
    }
}

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value<'static> {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int64(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt64(u)
                } else {
                    n.as_f64().map_or(Value::Null, Value::Float64)
                }
            }
            serde_json::Value::String(s) => Value::String(Cow::Owned(s)),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (Value::String(Cow::Owned(k)), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl<'a> From<&'a serde_json::Value> for Value<'a> {
    fn from(v: &'a serde_json::Value) -> Self {
        match v {
            serde_json::Value::String(s) => Value::String(Cow::Borrowed(s.as_str())),
            serde_json::Value::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (Value::String(Cow::Borrowed(k.as_str())), Value::from(v)))
                    .collect(),
            ),
            scalar => Value::from(scalar.clone()),
        }
    }
}
