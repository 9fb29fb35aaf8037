//! Scalar kind inference from Rust field types.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{GenericArgument, PathArguments, Type};

/// Infer the `ScalarKind` for a field type, returning the constructing
/// tokens. `Option<T>` unwraps to its inner type first; unknown types fall
/// back to `Text` (they are virtual anyway, see [`is_composite`]).
pub fn scalar_kind(ty: &Type) -> TokenStream {
    let inner = unwrap_option(ty).unwrap_or(ty);
    match type_to_string(inner).as_str() {
        "bool" => quote! { rowmap_core::ScalarKind::Boolean },
        "i8" => quote! { rowmap_core::ScalarKind::TinyInt },
        "i16" | "u8" => quote! { rowmap_core::ScalarKind::SmallInt },
        "i32" | "u16" => quote! { rowmap_core::ScalarKind::Integer },
        "i64" | "u32" | "u64" => quote! { rowmap_core::ScalarKind::BigInt },
        "f32" => quote! { rowmap_core::ScalarKind::Real },
        "f64" => quote! { rowmap_core::ScalarKind::Double },
        "String" | "str" => quote! { rowmap_core::ScalarKind::Text },
        "Vec<u8>" => quote! { rowmap_core::ScalarKind::Blob },
        "serde_json::Value" | "Value" => quote! { rowmap_core::ScalarKind::Json },
        _ => quote! { rowmap_core::ScalarKind::Text },
    }
}

/// Whether a type cannot be a single SQL column value: sequences other than
/// `Vec<u8>`, and composite (non-scalar) types, optionally behind `Option`.
/// Such fields are virtual by inference.
pub fn is_composite(ty: &Type) -> bool {
    let inner = unwrap_option(ty).unwrap_or(ty);
    if let Some(elem) = unwrap_vec(inner) {
        return type_to_string(elem) != "u8";
    }
    !is_known_scalar(&type_to_string(inner))
}

/// Whether a field type is `Option<...>` of a scalar, i.e. a nullable column.
pub fn is_nullable_scalar(ty: &Type) -> bool {
    match unwrap_option(ty) {
        Some(inner) => is_known_scalar(&type_to_string(inner)),
        None => false,
    }
}

/// The inner type of `Option<T>` / `Vec<T>` for relation fields.
pub fn relation_inner(ty: &Type) -> Option<&Type> {
    unwrap_option(ty).or_else(|| unwrap_vec(ty))
}

/// Whether the field is `Option<T>`-shaped (a single related record slot).
pub fn is_option(ty: &Type) -> bool {
    unwrap_option(ty).is_some()
}

/// Whether the field is `Vec<T>`-shaped (a related record sequence).
pub fn is_vec(ty: &Type) -> bool {
    unwrap_vec(ty).is_some()
}

fn is_known_scalar(name: &str) -> bool {
    matches!(
        name,
        "bool"
            | "i8"
            | "i16"
            | "i32"
            | "i64"
            | "u8"
            | "u16"
            | "u32"
            | "u64"
            | "f32"
            | "f64"
            | "String"
            | "str"
            | "Vec<u8>"
            | "serde_json::Value"
            | "Value"
    )
}

fn unwrap_option(ty: &Type) -> Option<&Type> {
    unwrap_generic(ty, "Option")
}

fn unwrap_vec(ty: &Type) -> Option<&Type> {
    unwrap_generic(ty, "Vec")
}

fn unwrap_generic<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    })
}

/// Render a type to a compact string for matching (`Vec < u8 >` becomes
/// `Vec<u8>`).
fn type_to_string(ty: &Type) -> String {
    quote!(#ty).to_string().replace(' ', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(tokens: TokenStream) -> Type {
        syn::parse2(tokens).unwrap()
    }

    #[test]
    fn test_scalar_kind_inference() {
        assert_eq!(
            scalar_kind(&ty(quote!(i64))).to_string(),
            quote!(rowmap_core::ScalarKind::BigInt).to_string()
        );
        assert_eq!(
            scalar_kind(&ty(quote!(Option<String>))).to_string(),
            quote!(rowmap_core::ScalarKind::Text).to_string()
        );
        assert_eq!(
            scalar_kind(&ty(quote!(Vec<u8>))).to_string(),
            quote!(rowmap_core::ScalarKind::Blob).to_string()
        );
    }

    #[test]
    fn test_composite_detection() {
        assert!(!is_composite(&ty(quote!(i64))));
        assert!(!is_composite(&ty(quote!(Option<i32>))));
        assert!(!is_composite(&ty(quote!(Vec<u8>))));
        assert!(is_composite(&ty(quote!(Vec<Comment>))));
        assert!(is_composite(&ty(quote!(Option<Address>))));
        assert!(is_composite(&ty(quote!(Metadata))));
    }

    #[test]
    fn test_nullable_scalar() {
        assert!(is_nullable_scalar(&ty(quote!(Option<i32>))));
        assert!(!is_nullable_scalar(&ty(quote!(i32))));
        assert!(!is_nullable_scalar(&ty(quote!(Option<Address>))));
    }

    #[test]
    fn test_relation_inner() {
        let vec_ty = ty(quote!(Vec<Comment>));
        assert_eq!(
            type_to_string(relation_inner(&vec_ty).unwrap()),
            "Comment"
        );
        let opt_ty = ty(quote!(Option<Address>));
        assert_eq!(
            type_to_string(relation_inner(&opt_ty).unwrap()),
            "Address"
        );
        assert!(relation_inner(&ty(quote!(i64))).is_none());
    }
}
