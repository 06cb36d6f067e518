use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, LitStr};

/// Derives `from_bytes` for a response payload.
///
/// The generated constructor decodes a JSON body into the annotated type and
/// reports failures as `crate::Error::Decode`, tagged with the type name.
#[proc_macro_derive(FromBytes)]
pub fn derive_from_bytes(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let target = LitStr::new(&name.to_string(), Span::call_site());
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            pub fn from_bytes(bytes: impl AsRef<[u8]>) -> crate::Result<Self> {
                ::serde_json::from_slice(bytes.as_ref()).map_err(|source| crate::Error::Decode {
                    target: #target,
                    source,
                })
            }
        }
    };
    TokenStream::from(expanded)
}
