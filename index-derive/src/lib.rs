extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

/// Derive `IndexBase` for a struct wrapping a single integer field
///
/// Both `struct Site(usize)` and `struct Site { value: usize }` are accepted.
#[proc_macro_derive(IndexBase)]
pub fn derive_index_base(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    match expand(&ast) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn expand(ast: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &ast.ident;
    let fields = match &ast.data {
        Data::Struct(data) => &data.fields,
        _ => return Err(syn::Error::new_spanned(name, "IndexBase can only be derived for structs")),
    };

    let (accessor, field_type) = match fields {
        Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
            let index = syn::Index::from(0);
            (quote! { #index }, &unnamed.unnamed[0].ty)
        },
        Fields::Named(named) if named.named.len() == 1 => {
            let field = &named.named[0];
            let ident = &field.ident;
            (quote! { #ident }, &field.ty)
        },
        _ => return Err(syn::Error::new_spanned(fields, "IndexBase needs exactly one field")),
    };

    let (impl_generics, type_generics, where_clause) = ast.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics crate::strong::IndexBase for #name #type_generics #where_clause {
            type Type = #field_type;

            fn get(&self) -> #field_type {
                self.#accessor
            }
        }
    })
}
