//! Derive macro for `structs-core` record introspection.
//!
//! `#[derive(Struct)]` implements `Reflect` and `Struct` for a struct with
//! named fields, emitting a static field table plus per-field borrows.
//!
//! # Container Attributes
//!
//! - `#[structs(crate = "path")]` - Path to `structs-core` when it is re-exported
//!
//! # Field Attributes
//!
//! - `#[structs(tag = "json:\"id\" db:\"user_id\"")]` - Raw `key:"value"` tag
//! - `#[structs(tag(json = "id", db = "user_id"))]` - Tag as key/value pairs
//! - `#[structs(embedded)]` - Mark the field as embedded
//! - `#[structs(skip)]` - Shorthand for the `structs:"-"` skip marker
//!
//! Only `pub` fields are exported. Type parameters must implement `Reflect`;
//! lifetime parameters are rejected.
//!
//! # Example
//!
//! ```ignore
//! use structs_core::Struct;
//!
//! #[derive(Struct)]
//! pub struct User {
//!     #[structs(tag(json = "id"))]
//!     pub id: u64,
//!     #[structs(skip)]
//!     pub password_hash: String,
//!     login_attempts: u32,
//! }
//! ```

use darling::FromDeriveInput;
use proc_macro::TokenStream;
use syn::parse_macro_input;

mod attrs;
mod generators;
mod runtime_path;

#[proc_macro_derive(Struct, attributes(structs))]
pub fn derive_struct(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as syn::DeriveInput);

    match expand_derive_struct(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_derive_struct(input: &syn::DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let attrs = attrs::StructAttrs::from_derive_input(input)
        .map_err(|e| syn::Error::new_spanned(input, e.to_string()))?;

    let validation_errors = attrs.validate();
    if !validation_errors.is_empty() {
        return Err(syn::Error::new_spanned(input, validation_errors.join("; ")));
    }

    let runtime = runtime_path::resolve_structs_core_path(&attrs)?;

    let mut output = generators::generate_reflect(&attrs, &runtime);
    output.extend(generators::generate_struct(&attrs, &runtime));
    Ok(output)
}
