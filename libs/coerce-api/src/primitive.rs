//! Value-to-value conversion for primitive targets.
//!
//! Rules per source kind:
//! - bool → numbers as 1/0, text as `True`/`False`; never a char
//! - char → integers as code point; never bool/float/decimal
//! - integers → range checked
//! - floats/decimals → integers round half to even, then range checked
//! - text → parsed with the format context
//! - enumeration members → their underlying integer (text for `String`)
//! - bytes, containers, objects → invalid cast

use std::any::type_name;
use std::str::FromStr;

use crate::class::{Coerce, PrimitiveKind, TypeClass};
use crate::decimal::Decimal;
use crate::error::CoerceError;
use crate::format::{FormatContext, NumberStyle};
use crate::value::Value;

/// 2^127 as `f64`; floats at or beyond it cannot become an `i128`.
const I128_BOUND: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

/// A type with a built-in conversion from any scalar [`Value`].
pub trait Primitive: Sized {
    const KIND: PrimitiveKind;

    fn change_type(input: &Value<'_>, ctx: &FormatContext) -> Result<Self, CoerceError>;
}

macro_rules! integer_primitive {
    ($($ty:ty => $kind:ident),* $(,)?) => {$(
        impl Primitive for $ty {
            const KIND: PrimitiveKind = PrimitiveKind::$kind;

            fn change_type(input: &Value<'_>, ctx: &FormatContext) -> Result<Self, CoerceError> {
                to_integer(input, ctx)
            }
        }
    )*};
}

integer_primitive!(
    i8 => I8, i16 => I16, i32 => I32, i64 => I64, i128 => I128, isize => Isize,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64, u128 => U128, usize => Usize,
);

fn to_integer<T>(input: &Value<'_>, ctx: &FormatContext) -> Result<T, CoerceError>
where
    T: TryFrom<i128> + FromStr,
{
    let target = type_name::<T>();
    let wide: i128 = match input {
        Value::Bool(b) => i128::from(*b),
        Value::Char(c) => i128::from(u32::from(*c)),
        Value::Int64(v) => i128::from(*v),
        Value::UInt64(v) => i128::from(*v),
        Value::Float32(v) => round_float(f64::from(*v), target)?,
        Value::Float64(v) => round_float(*v, target)?,
        Value::Decimal(d) => d.round_ties_even(),
        Value::Enum(e) => e.bits,
        Value::String(s) => {
            let text = ctx
                .normalize(s, NumberStyle::Integer)
                .ok_or_else(|| CoerceError::format(s.to_string(), target))?;
            match text.parse::<i128>() {
                Ok(v) => v,
                // Beyond i128 only an unsigned 128-bit target can still succeed.
                Err(_) => {
                    return text.parse::<T>().map_err(|_| CoerceError::overflow(target));
                }
            }
        }
        other => return Err(CoerceError::invalid_cast(other.kind_name(), target)),
    };
    T::try_from(wide).map_err(|_| CoerceError::overflow(target))
}

fn round_float(value: f64, target: &'static str) -> Result<i128, CoerceError> {
    let rounded = value.round_ties_even();
    if !rounded.is_finite() || rounded < -I128_BOUND || rounded >= I128_BOUND {
        return Err(CoerceError::overflow(target));
    }
    Ok(rounded as i128)
}

impl Primitive for bool {
    const KIND: PrimitiveKind = PrimitiveKind::Bool;

    fn change_type(input: &Value<'_>, _ctx: &FormatContext) -> Result<Self, CoerceError> {
        match input {
            Value::Bool(b) => Ok(*b),
            Value::Int64(v) => Ok(*v != 0),
            Value::UInt64(v) => Ok(*v != 0),
            Value::Float32(v) => Ok(*v != 0.0),
            Value::Float64(v) => Ok(*v != 0.0),
            Value::Decimal(d) => Ok(!d.is_zero()),
            Value::Enum(e) => Ok(e.bits != 0),
            Value::String(s) => {
                let text = s.trim();
                if text.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if text.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    Err(CoerceError::format(s.to_string(), "bool"))
                }
            }
            other => Err(CoerceError::invalid_cast(other.kind_name(), "bool")),
        }
    }
}

impl Primitive for char {
    const KIND: PrimitiveKind = PrimitiveKind::Char;

    fn change_type(input: &Value<'_>, _ctx: &FormatContext) -> Result<Self, CoerceError> {
        match input {
            Value::Char(c) => Ok(*c),
            Value::Int64(v) => code_point(i128::from(*v)),
            Value::UInt64(v) => code_point(i128::from(*v)),
            Value::Enum(e) => code_point(e.bits),
            Value::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(CoerceError::format(s.to_string(), "char")),
                }
            }
            other => Err(CoerceError::invalid_cast(other.kind_name(), "char")),
        }
    }
}

/// Code points are limited to the 16-bit range; surrogates are not chars.
fn code_point(value: i128) -> Result<char, CoerceError> {
    let unit = u16::try_from(value).map_err(|_| CoerceError::overflow("char"))?;
    char::from_u32(u32::from(unit)).ok_or_else(|| CoerceError::invalid_cast("surrogate", "char"))
}

fn to_f64(input: &Value<'_>, ctx: &FormatContext) -> Result<f64, CoerceError> {
    match input {
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Int64(v) => Ok(*v as f64),
        Value::UInt64(v) => Ok(*v as f64),
        Value::Float32(v) => Ok(f64::from(*v)),
        Value::Float64(v) => Ok(*v),
        Value::Decimal(d) => Ok(d.to_f64()),
        Value::Enum(e) => Ok(e.bits as f64),
        Value::String(s) => parse_float::<f64>(s, ctx),
        other => Err(CoerceError::invalid_cast(other.kind_name(), "f64")),
    }
}

fn parse_float<F>(text: &str, ctx: &FormatContext) -> Result<F, CoerceError>
where
    F: FromStr + From<f32>,
{
    let target = type_name::<F>();
    if let Some(special) = ctx.float_special(text) {
        return Ok(F::from(special));
    }
    ctx.normalize(text, NumberStyle::Float)
        .and_then(|normalized| normalized.parse::<F>().ok())
        .ok_or_else(|| CoerceError::format(text, target))
}

impl Primitive for f64 {
    const KIND: PrimitiveKind = PrimitiveKind::F64;

    fn change_type(input: &Value<'_>, ctx: &FormatContext) -> Result<Self, CoerceError> {
        to_f64(input, ctx)
    }
}

impl Primitive for f32 {
    const KIND: PrimitiveKind = PrimitiveKind::F32;

    fn change_type(input: &Value<'_>, ctx: &FormatContext) -> Result<Self, CoerceError> {
        match input {
            Value::Float32(v) => Ok(*v),
            // Parsed directly so that `f32` text round-trips without double rounding.
            Value::String(s) => parse_float::<f32>(s, ctx),
            other => to_f64(other, ctx).map(|v| v as f32).map_err(|e| e.retarget("f32")),
        }
    }
}

impl Primitive for Decimal {
    const KIND: PrimitiveKind = PrimitiveKind::Decimal;

    fn change_type(input: &Value<'_>, ctx: &FormatContext) -> Result<Self, CoerceError> {
        let from_int = |v: i128| Decimal::from_i128(v).ok_or_else(|| CoerceError::overflow("Decimal"));
        match input {
            Value::Bool(b) => from_int(i128::from(*b)),
            Value::Int64(v) => from_int(i128::from(*v)),
            Value::UInt64(v) => from_int(i128::from(*v)),
            Value::Enum(e) => from_int(e.bits),
            Value::Float32(v) => Decimal::try_from_f32(*v),
            Value::Float64(v) => Decimal::try_from_f64(*v),
            Value::Decimal(d) => Ok(*d),
            Value::String(s) => {
                let text = ctx
                    .normalize(s, NumberStyle::Number)
                    .ok_or_else(|| CoerceError::format(s.to_string(), "Decimal"))?;
                text.parse::<Decimal>().map_err(|e| match e {
                    CoerceError::Format { .. } => CoerceError::format(s.to_string(), "Decimal"),
                    other => other,
                })
            }
            other => Err(CoerceError::invalid_cast(other.kind_name(), "Decimal")),
        }
    }
}

impl Primitive for String {
    const KIND: PrimitiveKind = PrimitiveKind::String;

    fn change_type(input: &Value<'_>, ctx: &FormatContext) -> Result<Self, CoerceError> {
        match input {
            Value::Bool(true) => Ok("True".to_string()),
            Value::Bool(false) => Ok("False".to_string()),
            Value::Char(c) => Ok(c.to_string()),
            Value::Int64(v) => Ok(ctx.format_number(&v.to_string())),
            Value::UInt64(v) => Ok(ctx.format_number(&v.to_string())),
            Value::Float32(v) => Ok(ctx.format_float(f64::from(*v), &v.to_string())),
            Value::Float64(v) => Ok(ctx.format_float(*v, &v.to_string())),
            Value::Decimal(d) => Ok(ctx.format_number(&d.to_string())),
            Value::String(s) => Ok(s.to_string()),
            Value::Enum(e) => Ok(e.text.clone()),
            other => Err(CoerceError::invalid_cast(other.kind_name(), "String")),
        }
    }
}

macro_rules! coerce_primitive {
    ($($ty:ty),* $(,)?) => {$(
        impl Coerce for $ty {
            fn type_class() -> TypeClass {
                TypeClass::Primitive(<$ty as Primitive>::KIND)
            }

            fn zero() -> Self {
                <$ty>::default()
            }

            fn coerce(input: &Value<'_>, ctx: &FormatContext) -> Result<Self, CoerceError> {
                <$ty as Primitive>::change_type(input, ctx)
            }
        }
    )*};
}

coerce_primitive!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    Decimal, String,
);
