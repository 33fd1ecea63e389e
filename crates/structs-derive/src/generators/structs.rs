//! `Struct` impl generation: the static field table and per-field borrows.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::ext::IdentExt;

use super::{bounded_generics, field_idents};
use crate::attrs::{FieldAttrs, StructAttrs};

pub fn generate_struct(attrs: &StructAttrs, runtime: &syn::Path) -> TokenStream {
    let struct_name = &attrs.ident;
    let generics = bounded_generics(attrs, runtime);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let name_lit = syn::LitStr::new(&struct_name.unraw().to_string(), Span::call_site());

    let infos: Vec<TokenStream> = attrs
        .fields()
        .map(|field| generate_field_info(field, runtime))
        .collect();
    let idents = field_idents(attrs);
    let indices: Vec<usize> = (0..idents.len()).collect();
    let some = quote! { ::core::option::Option::Some };
    let none = quote! { ::core::option::Option::None };

    quote! {
        impl #impl_generics #runtime::Struct for #struct_name #ty_generics #where_clause {
            fn struct_name(&self) -> &'static str {
                #name_lit
            }

            fn field_infos(&self) -> &'static [#runtime::FieldInfo] {
                const FIELDS: &[#runtime::FieldInfo] = &[
                    #(#infos),*
                ];
                FIELDS
            }

            fn field_at(&self, index: usize) -> ::core::option::Option<&dyn #runtime::Reflect> {
                match index {
                    #(#indices => #some(&self.#idents as &dyn #runtime::Reflect),)*
                    _ => #none,
                }
            }

            fn field_at_mut(
                &mut self,
                index: usize,
            ) -> ::core::option::Option<&mut dyn #runtime::Reflect> {
                match index {
                    #(#indices => #some(&mut self.#idents as &mut dyn #runtime::Reflect),)*
                    _ => #none,
                }
            }

            fn fields_ref(&self) -> ::std::vec::Vec<&dyn #runtime::Reflect> {
                ::std::vec![
                    #(&self.#idents as &dyn #runtime::Reflect),*
                ]
            }

            fn fields_mut(&mut self) -> ::std::vec::Vec<&mut dyn #runtime::Reflect> {
                let Self { #(#idents),* } = self;
                ::std::vec![
                    #(#idents as &mut dyn #runtime::Reflect),*
                ]
            }
        }
    }
}

fn generate_field_info(field: &FieldAttrs, runtime: &syn::Path) -> TokenStream {
    let name = syn::LitStr::new(&field.name(), Span::call_site());
    let ty = &field.ty;

    let exported = field.is_exported().then(|| quote! { .exported() });
    let embedded = field.embedded.then(|| quote! { .embedded() });
    let tag = field.rendered_tag();
    let with_tag = (!tag.is_empty()).then(|| {
        let tag = syn::LitStr::new(&tag, Span::call_site());
        quote! { .with_tag(#tag) }
    });

    quote! {
        #runtime::FieldInfo::new(#name, ::core::stringify!(#ty))
            #exported
            #embedded
            #with_tag
    }
}
