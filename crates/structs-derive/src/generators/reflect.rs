//! `Reflect` impl generation for `#[derive(Struct)]`.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::ext::IdentExt;

use super::{bounded_generics, field_idents};
use crate::attrs::StructAttrs;

pub fn generate_reflect(attrs: &StructAttrs, runtime: &syn::Path) -> TokenStream {
    let struct_name = &attrs.ident;
    let generics = bounded_generics(attrs, runtime);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let name_lit = syn::LitStr::new(&struct_name.unraw().to_string(), Span::call_site());

    let idents = field_idents(attrs);
    let types: Vec<&syn::Type> = attrs.fields().map(|field| &field.ty).collect();
    let name_lits: Vec<syn::LitStr> = attrs
        .fields()
        .map(|field| syn::LitStr::new(&field.name(), Span::call_site()))
        .collect();

    let reflect_eq = if idents.is_empty() {
        quote! {
            #runtime::Reflect::as_any(other).is::<Self>()
        }
    } else {
        quote! {
            match #runtime::Reflect::as_any(other).downcast_ref::<Self>() {
                ::core::option::Option::Some(other) => {
                    #(#runtime::Reflect::reflect_eq(&self.#idents, &other.#idents))&&*
                }
                ::core::option::Option::None => false,
            }
        }
    };

    quote! {
        impl #impl_generics #runtime::Reflect for #struct_name #ty_generics #where_clause {
            #runtime::__reflect_any_methods!();

            fn kind(&self) -> #runtime::Kind {
                #runtime::Kind::Struct
            }

            fn reflect_eq(&self, other: &dyn #runtime::Reflect) -> bool {
                #reflect_eq
            }

            fn zero() -> Self {
                Self {
                    #(#idents: <#types as #runtime::Reflect>::zero()),*
                }
            }

            fn zero_value(&self) -> ::std::boxed::Box<dyn #runtime::Reflect> {
                ::std::boxed::Box::new(<Self as #runtime::Reflect>::zero())
            }

            fn try_assign(
                &mut self,
                value: ::std::boxed::Box<dyn #runtime::Reflect>,
            ) -> ::core::result::Result<(), ::std::boxed::Box<dyn #runtime::Reflect>> {
                #runtime::reflect::assign_exact(self, value)
            }

            fn as_struct(&self) -> ::core::option::Option<&dyn #runtime::Struct> {
                ::core::option::Option::Some(self)
            }

            fn as_struct_mut(&mut self) -> ::core::option::Option<&mut dyn #runtime::Struct> {
                ::core::option::Option::Some(self)
            }

            fn reflect_debug(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.debug_struct(#name_lit)
                    #(.field(#name_lits, &(&self.#idents as &dyn #runtime::Reflect)))*
                    .finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use darling::FromDeriveInput;
    use syn::parse_quote;

    fn expand(input: syn::DeriveInput) -> String {
        let attrs = StructAttrs::from_derive_input(&input).unwrap();
        generate_reflect(&attrs, &parse_quote!(::structs_core)).to_string()
    }

    #[test]
    fn compares_and_zeroes_field_by_field() {
        let tokens = expand(parse_quote! {
            pub struct Point {
                pub x: i32,
                pub y: i32,
            }
        });

        assert!(tokens.contains("Reflect :: reflect_eq (& self . x , & other . x) &&"));
        assert!(tokens.contains("x : < i32 as :: structs_core :: Reflect > :: zero ()"));
        assert!(tokens.contains("debug_struct (\"Point\")"));
    }

    #[test]
    fn empty_record_compares_by_type() {
        let tokens = expand(parse_quote! {
            pub struct Marker {}
        });

        assert!(tokens.contains("is :: < Self > ()"));
        assert!(!tokens.contains("downcast_ref"));
    }

    #[test]
    fn type_parameters_get_reflect_bounds() {
        let tokens = expand(parse_quote! {
            pub struct Wrapper<T> {
                pub inner: T,
            }
        });

        assert!(tokens.contains("where T : :: structs_core :: Reflect"));
    }
}
