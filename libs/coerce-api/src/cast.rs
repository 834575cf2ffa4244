use std::any::{Any, type_name};

use crate::class::{Coerce, TypeClass};
use crate::error::CoerceError;
use crate::format::FormatContext;
use crate::value::Value;

/// Direct cast: succeeds only when the input is an [`Object`](crate::value::Object)
/// holding exactly a `T`.
pub fn downcast<T: Any + Clone>(input: &Value<'_>) -> Result<T, CoerceError> {
    match input {
        Value::Object(object) => object
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| CoerceError::invalid_cast(object.type_name(), type_name::<T>())),
        other => Err(CoerceError::invalid_cast(other.kind_name(), type_name::<T>())),
    }
}

/// `Value` is the "any object" target: every non-absent input casts to it.
impl Coerce for Value<'static> {
    fn type_class() -> TypeClass {
        TypeClass::Other
    }

    fn zero() -> Self {
        Value::Null
    }

    fn coerce(input: &Value<'_>, _ctx: &FormatContext) -> Result<Self, CoerceError> {
        Ok(input.clone().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Session {
        user: String,
    }

    #[test]
    fn downcast_requires_exact_type() {
        let value = Value::object(Session { user: "ada".into() });
        assert_eq!(downcast::<Session>(&value), Ok(Session { user: "ada".into() }));
        assert_eq!(
            downcast::<String>(&value),
            Err(CoerceError::invalid_cast(type_name::<Session>(), type_name::<String>()))
        );
    }

    #[test]
    fn scalars_do_not_downcast() {
        assert!(downcast::<i32>(&Value::from(5)).is_err());
        assert!(downcast::<String>(&Value::from("text")).is_err());
    }

    #[test]
    fn value_target_keeps_input() {
        let input = Value::from(vec![1u8, 2]);
        let cast = <Value<'static>>::coerce(&input, FormatContext::invariant());
        assert_eq!(cast, Ok(input.into_owned()));
    }
}
