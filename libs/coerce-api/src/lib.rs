// Lets `#[derive(Coerce)]` output (`::coerce_api::...`) resolve inside this crate too.
extern crate self as coerce_api;

pub mod cast;
pub mod class;
pub mod config;
pub mod convert;
pub mod decimal;
pub mod enumeration;
pub mod error;
pub mod format;
pub mod primitive;
pub mod value;

pub use coerce_api_derive::Coerce;

pub use class::{Coerce, PrimitiveKind, TypeClass, TypeDescriptor};
pub use convert::{
    ConvertExt, convert_or_default, convert_or_default_in, convert_or_default_or,
    convert_or_default_with, is_convertible, is_optional, is_optional_type,
    is_primitive_convertible, try_convert,
};
pub use decimal::Decimal;
pub use enumeration::{EnumMember, EnumType};
pub use error::{CoerceError, ConfigError};
pub use format::FormatContext;
pub use value::Value;
