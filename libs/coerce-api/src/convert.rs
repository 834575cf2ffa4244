//! Convert-or-default entry points.
//!
//! Every call resolves in this order:
//! 1. absent input (`Null`, `DbNull`) → fallback, nothing attempted;
//! 2. `Option<U>` targets are unwrapped one level;
//! 3. enumerations: flags parse the input text, ordinary enumerations
//!    require a defined raw value before parsing;
//! 4. primitive targets: value-to-value conversion with the format context;
//! 5. anything else: direct cast;
//! 6. success under an `Option<U>` target is wrapped in `Some`.
//!
//! Steps 2–6 are dispatched by the target's [`Coerce`] impl. Any failure
//! yields the fallback; nothing is raised to the caller.

use std::any::type_name;

use crate::class::{Coerce, TypeDescriptor};
use crate::error::CoerceError;
use crate::format::FormatContext;
use crate::value::Value;

/// Convert `input` to `T`, or `T::zero()` on any failure.
pub fn convert_or_default<T: Coerce>(input: &Value<'_>) -> T {
    convert_or_default_with(input, T::zero(), None)
}

/// As [`convert_or_default`], with explicit formatting rules.
pub fn convert_or_default_in<T: Coerce>(input: &Value<'_>, ctx: &FormatContext) -> T {
    convert_or_default_with(input, T::zero(), Some(ctx))
}

/// Convert `input` to `T`, or `fallback` on any failure.
pub fn convert_or_default_or<T: Coerce>(input: &Value<'_>, fallback: T) -> T {
    convert_or_default_with(input, fallback, None)
}

/// Full form. `ctx` defaults to [`FormatContext::invariant`].
pub fn convert_or_default_with<T: Coerce>(
    input: &Value<'_>,
    fallback: T,
    ctx: Option<&FormatContext>,
) -> T {
    match try_convert::<T>(input, ctx) {
        Ok(value) => value,
        Err(e) => {
            tracing::trace!(
                target_type = type_name::<T>(),
                input = input.kind_name(),
                reason = %e,
                "coercion fell back"
            );
            fallback
        }
    }
}

/// The conversion without the fallback fold.
pub fn try_convert<T: Coerce>(
    input: &Value<'_>,
    ctx: Option<&FormatContext>,
) -> Result<T, CoerceError> {
    if input.is_absent() {
        return Err(CoerceError::Absent);
    }
    let ctx = match ctx {
        Some(ctx) => ctx,
        None => FormatContext::invariant(),
    };
    T::coerce(input, ctx)
}

/// `true` iff the type is `Option<U>`.
pub fn is_optional_type(ty: &TypeDescriptor) -> bool {
    ty.class().is_optional()
}

/// `true` iff the type has a built-in primitive conversion.
///
/// Looks at the type itself, not through an `Option` layer.
pub fn is_primitive_convertible(ty: &TypeDescriptor) -> bool {
    ty.class().primitive_kind().is_some()
}

pub fn is_optional<T: Coerce>() -> bool {
    is_optional_type(&TypeDescriptor::of::<T>())
}

pub fn is_convertible<T: Coerce>() -> bool {
    is_primitive_convertible(&TypeDescriptor::of::<T>())
}

/// Method-call form of the entry points, for `Value` and anything that
/// converts into one.
///
/// ```ignore
/// let retries: u32 = settings.get("retries").copied().convert_or(3);
/// ```
pub trait ConvertExt {
    fn convert_or_default<T: Coerce>(&self) -> T;

    fn convert_or<T: Coerce>(&self, fallback: T) -> T;

    fn convert_or_in<T: Coerce>(&self, fallback: T, ctx: &FormatContext) -> T;
}

impl<'a, S> ConvertExt for S
where
    S: Clone + Into<Value<'a>>,
{
    fn convert_or_default<T: Coerce>(&self) -> T {
        convert_or_default(&self.clone().into())
    }

    fn convert_or<T: Coerce>(&self, fallback: T) -> T {
        convert_or_default_or(&self.clone().into(), fallback)
    }

    fn convert_or_in<T: Coerce>(&self, fallback: T, ctx: &FormatContext) -> T {
        convert_or_default_with(&self.clone().into(), fallback, Some(ctx))
    }
}
