use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::Span;

use crate::attrs::StructAttrs;

/// Path to the runtime crate the generated impls refer to.
///
/// An explicit `#[structs(crate = "...")]` wins over lookup in the caller's
/// manifest.
pub(crate) fn resolve_structs_core_path(attrs: &StructAttrs) -> syn::Result<syn::Path> {
    if let Some(path) = &attrs.crate_path {
        return Ok(path.clone());
    }

    match crate_name("structs-core") {
        // Inside structs-core itself `crate` would point at its tests or
        // doctests, so go through the `extern crate self as structs_core` alias.
        Ok(FoundCrate::Itself) => Ok(syn::parse_quote!(::structs_core)),
        Ok(FoundCrate::Name(name)) => {
            let ident = syn::Ident::new(&name.replace('-', "_"), Span::call_site());
            Ok(syn::parse_quote!(::#ident))
        }
        Err(_) => Err(syn::Error::new(
            Span::call_site(),
            "could not resolve `structs-core`; add it as a dependency \
             (renamed dependencies are supported)",
        )),
    }
}
