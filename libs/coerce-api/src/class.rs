use std::any::type_name;

use crate::error::CoerceError;
use crate::format::FormatContext;
use crate::value::Value;

/// Scalar kinds with a built-in conversion path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    I128,
    Isize,
    U8,
    U16,
    U32,
    U64,
    U128,
    Usize,
    F32,
    F64,
    Decimal,
    String,
}

impl PrimitiveKind {
    pub fn is_integer(self) -> bool {
        use PrimitiveKind::*;
        matches!(self, I8 | I16 | I32 | I64 | I128 | Isize | U8 | U16 | U32 | U64 | U128 | Usize)
    }

    pub fn is_float(self) -> bool {
        matches!(self, PrimitiveKind::F32 | PrimitiveKind::F64)
    }
}

/// Closed classification of a target type, resolved once per type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeClass {
    /// `Option<U>`; carries the class of `U`.
    Optional(Box<TypeClass>),
    Enum { flags: bool },
    Primitive(PrimitiveKind),
    /// Reachable only by direct cast.
    Other,
}

impl TypeClass {
    pub fn is_optional(&self) -> bool {
        matches!(self, TypeClass::Optional(_))
    }

    /// Class after unwrapping one optional layer.
    pub fn effective(&self) -> &TypeClass {
        match self {
            TypeClass::Optional(inner) => inner.as_ref(),
            other => other,
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, TypeClass::Enum { .. })
    }

    pub fn is_flags(&self) -> bool {
        matches!(self, TypeClass::Enum { flags: true })
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            TypeClass::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// A target type the coercer can produce.
///
/// Implemented for every primitive kind, for `Option<T>`, for
/// [`Value`] itself, and via `#[derive(Coerce)]` for user enumerations,
/// flags types and cast-only types.
pub trait Coerce: Sized + 'static {
    fn type_class() -> TypeClass;

    /// Value returned when no fallback is given.
    fn zero() -> Self;

    /// Convert a non-absent input. Each implementation runs the branch
    /// matching its class.
    fn coerce(input: &Value<'_>, ctx: &FormatContext) -> Result<Self, CoerceError>;
}

/// One optional layer: absent by default, and a converted `T` is wrapped
/// in `Some`.
impl<T: Coerce> Coerce for Option<T> {
    fn type_class() -> TypeClass {
        TypeClass::Optional(Box::new(T::type_class()))
    }

    fn zero() -> Self {
        None
    }

    fn coerce(input: &Value<'_>, ctx: &FormatContext) -> Result<Self, CoerceError> {
        T::coerce(input, ctx).map(Some)
    }
}

/// Runtime handle for a target type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    name: &'static str,
    class: TypeClass,
}

impl TypeDescriptor {
    pub fn of<T: Coerce>() -> Self {
        Self { name: type_name::<T>(), class: T::type_class() }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn class(&self) -> &TypeClass {
        &self.class
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Decimal;

    #[test]
    fn optional_unwraps_one_level() {
        let class = <Option<i32>>::type_class();
        assert!(class.is_optional());
        assert_eq!(class.effective(), &TypeClass::Primitive(PrimitiveKind::I32));

        let nested = <Option<Option<u8>>>::type_class();
        assert!(nested.effective().is_optional());
    }

    #[test]
    fn descriptor_names_the_type() {
        let ty = TypeDescriptor::of::<Decimal>();
        assert!(ty.name().ends_with("Decimal"));
        assert_eq!(ty.class().primitive_kind(), Some(PrimitiveKind::Decimal));
    }

    #[test]
    fn kind_groups() {
        assert!(PrimitiveKind::Usize.is_integer());
        assert!(!PrimitiveKind::Char.is_integer());
        assert!(PrimitiveKind::F32.is_float());
        assert!(!TypeClass::Other.is_enum());
        assert!(TypeClass::Enum { flags: true }.is_flags());
    }
}
