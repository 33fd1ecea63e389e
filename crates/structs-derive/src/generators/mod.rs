//! Code generators for the `Struct` derive macro.
//!
//! - `reflect`: the `Reflect` impl (kind, deep equality, zero value, assignment, debug)
//! - `structs`: the `Struct` impl (static field table and per-field borrows)

mod reflect;
mod structs;

pub use reflect::generate_reflect;
pub use structs::generate_struct;

use syn::parse_quote;

use crate::attrs::StructAttrs;

/// The struct's generics with a `Reflect` bound added for every type parameter.
pub(crate) fn bounded_generics(attrs: &StructAttrs, runtime: &syn::Path) -> syn::Generics {
    let mut generics = attrs.generics.clone();
    let params: Vec<syn::Ident> = generics.type_params().map(|param| param.ident.clone()).collect();
    if !params.is_empty() {
        let where_clause = generics.make_where_clause();
        for ident in params {
            where_clause
                .predicates
                .push(parse_quote!(#ident: #runtime::Reflect));
        }
    }
    generics
}

/// Field identifiers in declaration order.
pub(crate) fn field_idents(attrs: &StructAttrs) -> Vec<&syn::Ident> {
    attrs
        .fields()
        .filter_map(|field| field.ident.as_ref())
        .collect()
}
