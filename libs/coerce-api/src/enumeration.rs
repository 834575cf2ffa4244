//! Enumeration metadata, member lookup and name/number parsing.
//!
//! Two shapes are supported:
//! - ordinary enumerations: a closed set of named members, each with an
//!   integer value;
//! - flags enumerations: members are bits meant to be OR-combined, and any
//!   combination (even an undeclared number) is a valid value.
//!
//! Both are usually implemented with `#[derive(Coerce)]`.

use std::any::{TypeId, type_name};

use crate::error::CoerceError;
use crate::value::Value;

/// A declared member: name and underlying value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumMember {
    pub name: &'static str,
    pub value: i128,
}

pub trait EnumType: Sized + 'static {
    /// Members are bits to be OR-combined.
    const FLAGS: bool;

    /// Declared members, in declaration order.
    const MEMBERS: &'static [EnumMember];

    /// Build a value from its underlying integer. For ordinary enumerations
    /// only declared values succeed; for flags any value the storage type
    /// can hold succeeds.
    fn from_bits(bits: i128) -> Option<Self>;

    fn bits(&self) -> i128;
}

/// Whether the raw input is a declared member of `E`.
///
/// Strings match by exact (case-sensitive) name, integers and members of
/// `E` itself by value. Every other kind is undefined.
pub fn is_defined<E: EnumType>(input: &Value<'_>) -> bool {
    let by_value = |v: i128| E::MEMBERS.iter().any(|m| m.value == v);
    match input {
        Value::String(s) => E::MEMBERS.iter().any(|m| m.name == &s[..]),
        Value::Int64(v) => by_value(i128::from(*v)),
        Value::UInt64(v) => by_value(i128::from(*v)),
        Value::Enum(e) if e.type_id == TypeId::of::<E>() => by_value(e.bits),
        _ => false,
    }
}

/// Parse member text: a number, or one or more comma-separated member
/// names whose values are OR-ed together. Surrounding whitespace is ignored,
/// names are case-sensitive.
pub fn parse<E: EnumType>(text: &str) -> Result<E, CoerceError> {
    let target = type_name::<E>();
    let trimmed = text.trim();
    let Some(first) = trimmed.chars().next() else {
        return Err(CoerceError::parse(text, target));
    };

    let bits = if first.is_ascii_digit() || first == '-' || first == '+' {
        trimmed.parse::<i128>().map_err(|_| CoerceError::parse(text, target))?
    } else {
        let mut bits = 0i128;
        for part in trimmed.split(',') {
            let name = part.trim();
            let member = E::MEMBERS
                .iter()
                .find(|m| m.name == name)
                .ok_or_else(|| CoerceError::parse(text, target))?;
            bits |= member.value;
        }
        bits
    };

    E::from_bits(bits).ok_or_else(|| CoerceError::undefined(bits, target))
}

/// Text of an underlying value.
///
/// An exact member match yields its name. For flags, a combination of
/// members yields their names in ascending value order joined by `", "`.
/// Anything else is rendered as the number.
pub fn format_bits<E: EnumType>(bits: i128) -> String {
    if let Some(member) = E::MEMBERS.iter().find(|m| m.value == bits) {
        return member.name.to_string();
    }
    if !E::FLAGS || bits == 0 {
        return bits.to_string();
    }

    let mut members: Vec<&EnumMember> = E::MEMBERS.iter().filter(|m| m.value != 0).collect();
    members.sort_by(|a, b| b.value.cmp(&a.value));

    let mut remaining = bits;
    let mut names = Vec::new();
    for member in members {
        if remaining & member.value == member.value {
            names.push(member.name);
            remaining &= !member.value;
        }
    }
    if remaining != 0 || names.is_empty() {
        return bits.to_string();
    }
    names.reverse();
    names.join(", ")
}

/// Enumeration branch of the coercer.
///
/// Flags parse the input's text directly. Ordinary enumerations first
/// require the raw input to be a defined member and only then parse.
pub fn coerce_enum<E: EnumType>(input: &Value<'_>) -> Result<E, CoerceError> {
    let target = type_name::<E>();
    if !E::FLAGS && !is_defined::<E>(input) {
        let shown = input.to_text().map_or_else(|| input.kind_name().into(), |t| t.into_owned());
        return Err(CoerceError::undefined(shown, target));
    }
    let text = input
        .to_text()
        .ok_or_else(|| CoerceError::invalid_cast(input.kind_name(), target))?;
    parse::<E>(&text)
}
