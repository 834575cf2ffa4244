use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    BinOp, Data, DataEnum, DeriveInput, Expr, Fields, Ident, Lit, Type, UnOp, parse_macro_input,
};

/// Derive macro for coercion targets.
///
/// Three shapes are supported:
///
/// - A fieldless enum becomes an ordinary enumeration. Variant names are
///   member names; explicit or implicit discriminants are member values.
///   The type must implement `Default` (the value used when no fallback is given).
/// - A tuple struct over one integer, marked `#[coerce(flags)]`, becomes a
///   flags enumeration. Members are declared with `member(Name = value)`.
/// - Any type marked `#[coerce(cast)]` is reachable only by direct cast from
///   an object value. Requires `Clone + Default`.
///
/// Enumerations also get `From<T> for Value<'static>`.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone, Copy, Default, Coerce)]
/// enum Level {
///     #[default]
///     Low = 1,
///     High = 2,
/// }
///
/// #[derive(Clone, Copy, Default, Coerce)]
/// #[coerce(flags, member(Read = 1), member(Write = 2), member(Exec = 1 << 2))]
/// struct Access(u8);
///
/// #[derive(Clone, Default, Coerce)]
/// #[coerce(cast)]
/// struct Session {
///     user: String,
/// }
/// ```
#[proc_macro_derive(Coerce, attributes(coerce))]
pub fn derive_coerce(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// Parsed `#[coerce(...)]` options.
#[derive(Default)]
struct CoerceAttrs {
    flags: bool,
    cast: bool,
    members: Vec<(Ident, i128)>,
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;
    let attrs = parse_attrs(input)?;

    if attrs.cast {
        if attrs.flags || !attrs.members.is_empty() {
            return Err(syn::Error::new_spanned(
                name,
                "#[coerce(cast)] cannot be combined with flags or members",
            ));
        }
        return Ok(cast_impl(input));
    }

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Coerce enumerations cannot be generic",
        ));
    }

    match &input.data {
        Data::Enum(data) => {
            if attrs.flags || !attrs.members.is_empty() {
                return Err(syn::Error::new_spanned(
                    name,
                    "flags types must be tuple structs over an integer, e.g. `struct Access(u8)`",
                ));
            }
            let members = enum_members(name, data)?;
            Ok(enum_impl(name, &members))
        }
        Data::Struct(data) if attrs.flags => {
            let field_ty = match &data.fields {
                Fields::Unnamed(fields) if fields.unnamed.len() == 1 => &fields.unnamed[0].ty,
                _ => {
                    return Err(syn::Error::new_spanned(
                        name,
                        "flags types must be tuple structs with exactly one integer field",
                    ));
                }
            };
            if !is_integer_type(field_ty) {
                return Err(syn::Error::new_spanned(
                    field_ty,
                    "flags storage must be a primitive integer type",
                ));
            }
            if attrs.members.is_empty() {
                return Err(syn::Error::new_spanned(
                    name,
                    "flags types need at least one #[coerce(member(Name = value))]",
                ));
            }
            Ok(flags_impl(name, field_ty, &attrs.members))
        }
        Data::Struct(_) => Err(syn::Error::new_spanned(
            name,
            "structs need #[coerce(flags)] or #[coerce(cast)]",
        )),
        Data::Union(_) => Err(syn::Error::new_spanned(
            name,
            "Coerce does not support unions",
        )),
    }
}

fn parse_attrs(input: &DeriveInput) -> Result<CoerceAttrs, syn::Error> {
    let mut attrs = CoerceAttrs::default();
    for attr in &input.attrs {
        if !attr.path().is_ident("coerce") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("flags") {
                attrs.flags = true;
            } else if meta.path.is_ident("cast") {
                attrs.cast = true;
            } else if meta.path.is_ident("member") {
                meta.parse_nested_meta(|member| {
                    let ident = member
                        .path
                        .get_ident()
                        .cloned()
                        .ok_or_else(|| member.error("expected a member name"))?;
                    let expr: Expr = member.value()?.parse()?;
                    let value = eval_int(&expr)?;
                    if attrs.members.iter().any(|(existing, _)| *existing == ident) {
                        return Err(member.error(format!("duplicate member '{ident}'")));
                    }
                    attrs.members.push((ident, value));
                    Ok(())
                })?;
            } else {
                return Err(meta.error("unknown coerce option (expected flags, cast or member)"));
            }
            Ok(())
        })?;
    }
    Ok(attrs)
}

/// Variant names and values, assigning implicit discriminants like rustc does.
fn enum_members(name: &Ident, data: &DataEnum) -> Result<Vec<(Ident, i128)>, syn::Error> {
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(name, "Coerce enums need at least one variant"));
    }
    let mut members = Vec::with_capacity(data.variants.len());
    let mut next: i128 = 0;
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Coerce enums must be fieldless",
            ));
        }
        let value = match &variant.discriminant {
            Some((_, expr)) => eval_int(expr)?,
            None => next,
        };
        next = value.wrapping_add(1);
        members.push((variant.ident.clone(), value));
    }
    Ok(members)
}

/// Evaluate an integer constant: literals, negation, `<<` and `|`.
fn eval_int(expr: &Expr) -> Result<i128, syn::Error> {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Int(int) => int.base10_parse::<i128>(),
            other => Err(syn::Error::new_spanned(other, "expected an integer literal")),
        },
        Expr::Unary(unary) if matches!(unary.op, UnOp::Neg(_)) => {
            Ok(eval_int(&unary.expr)?.wrapping_neg())
        }
        Expr::Binary(binary) => {
            let left = eval_int(&binary.left)?;
            let right = eval_int(&binary.right)?;
            match binary.op {
                BinOp::Shl(_) => u32::try_from(right)
                    .ok()
                    .and_then(|shift| left.checked_shl(shift))
                    .ok_or_else(|| syn::Error::new_spanned(binary, "shift out of range")),
                BinOp::BitOr(_) => Ok(left | right),
                _ => Err(syn::Error::new_spanned(binary, "only `<<` and `|` are supported")),
            }
        }
        Expr::Paren(paren) => eval_int(&paren.expr),
        Expr::Group(group) => eval_int(&group.expr),
        other => Err(syn::Error::new_spanned(
            other,
            "expected an integer constant expression",
        )),
    }
}

/// Storage types whose every value fits the `i128` underlying value.
fn is_integer_type(ty: &Type) -> bool {
    const INTEGERS: &[&str] = &[
        "i8", "i16", "i32", "i64", "isize", "u8", "u16", "u32", "u64", "usize",
    ];
    match ty {
        Type::Path(type_path) => type_path
            .path
            .get_ident()
            .is_some_and(|ident| INTEGERS.iter().any(|i| ident == i)),
        _ => false,
    }
}

fn member_table(members: &[(Ident, i128)]) -> TokenStream2 {
    let entries = members.iter().map(|(ident, value)| {
        let name = ident.to_string();
        quote! {
            ::coerce_api::enumeration::EnumMember { name: #name, value: #value }
        }
    });
    quote! { &[#(#entries),*] }
}

fn coerce_enum_tokens(name: &Ident, flags: bool) -> TokenStream2 {
    quote! {
        impl ::coerce_api::Coerce for #name {
            fn type_class() -> ::coerce_api::TypeClass {
                ::coerce_api::TypeClass::Enum { flags: #flags }
            }

            fn zero() -> Self {
                <Self as ::core::default::Default>::default()
            }

            fn coerce(
                input: &::coerce_api::Value<'_>,
                _ctx: &::coerce_api::FormatContext,
            ) -> ::core::result::Result<Self, ::coerce_api::CoerceError> {
                ::coerce_api::enumeration::coerce_enum::<Self>(input)
            }
        }

        impl ::core::convert::From<#name> for ::coerce_api::Value<'static> {
            fn from(member: #name) -> Self {
                ::coerce_api::Value::from_enum(member)
            }
        }
    }
}

fn enum_impl(name: &Ident, members: &[(Ident, i128)]) -> TokenStream2 {
    let table = member_table(members);
    let from_arms = members.iter().map(|(ident, value)| {
        quote! { #value => ::core::option::Option::Some(Self::#ident), }
    });
    let bits_arms = members.iter().map(|(ident, value)| {
        quote! { Self::#ident => #value, }
    });
    let coerce = coerce_enum_tokens(name, false);

    quote! {
        impl ::coerce_api::enumeration::EnumType for #name {
            const FLAGS: bool = false;
            const MEMBERS: &'static [::coerce_api::enumeration::EnumMember] = #table;

            fn from_bits(bits: i128) -> ::core::option::Option<Self> {
                match bits {
                    #(#from_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn bits(&self) -> i128 {
                match self {
                    #(#bits_arms)*
                }
            }
        }

        #coerce
    }
}

fn flags_impl(name: &Ident, field_ty: &Type, members: &[(Ident, i128)]) -> TokenStream2 {
    let table = member_table(members);
    let coerce = coerce_enum_tokens(name, true);

    quote! {
        impl ::coerce_api::enumeration::EnumType for #name {
            const FLAGS: bool = true;
            const MEMBERS: &'static [::coerce_api::enumeration::EnumMember] = #table;

            fn from_bits(bits: i128) -> ::core::option::Option<Self> {
                <#field_ty as ::core::convert::TryFrom<i128>>::try_from(bits).ok().map(Self)
            }

            fn bits(&self) -> i128 {
                self.0 as i128
            }
        }

        #coerce
    }
}

fn cast_impl(input: &DeriveInput) -> TokenStream2 {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    quote! {
        impl #impl_generics ::coerce_api::Coerce for #name #ty_generics #where_clause {
            fn type_class() -> ::coerce_api::TypeClass {
                ::coerce_api::TypeClass::Other
            }

            fn zero() -> Self {
                <Self as ::core::default::Default>::default()
            }

            fn coerce(
                input: &::coerce_api::Value<'_>,
                _ctx: &::coerce_api::FormatContext,
            ) -> ::core::result::Result<Self, ::coerce_api::CoerceError> {
                ::coerce_api::cast::downcast::<Self>(input)
            }
        }
    }
}
