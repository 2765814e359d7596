//! Procedural macro derives for `wirebson`.

#![deny(clippy::all)]
#![deny(missing_docs)]

extern crate proc_macro;

mod attrs;
mod case;
mod decode;
mod encode;
mod types;
mod util;

use proc_macro::TokenStream;
use syn::{parse_macro_input, spanned::Spanned, Data, DeriveInput};

use crate::attrs::parse_bson_container_attrs;
use crate::decode::{decode_enum, decode_struct};
use crate::encode::{encode_enum, encode_struct};

#[proc_macro_derive(ToBson, attributes(bson))]
/// Derive `ToBson` and `ToBsonDocument` for a record or sum type.
pub fn derive_to_bson(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let out = (|| -> syn::Result<proc_macro2::TokenStream> {
        let container = parse_bson_container_attrs(&input.attrs)?;
        match &input.data {
            Data::Struct(data) => {
                container.reject_enum_only(input.ident.span())?;
                encode_struct(&input.ident, &input.generics, data, &container)
            }
            Data::Enum(data) => encode_enum(&input.ident, &input.generics, data, &container),
            Data::Union(u) => Err(syn::Error::new(
                u.union_token.span(),
                "ToBson is not supported for unions",
            )),
        }
    })();

    match out {
        Ok(ts) => TokenStream::from(ts),
        Err(e) => TokenStream::from(e.to_compile_error()),
    }
}

#[proc_macro_derive(FromBson, attributes(bson))]
/// Derive `FromBson` and `FromBsonDocument` for a record or sum type.
pub fn derive_from_bson(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let out = (|| -> syn::Result<proc_macro2::TokenStream> {
        let container = parse_bson_container_attrs(&input.attrs)?;
        match &input.data {
            Data::Struct(data) => {
                container.reject_enum_only(input.ident.span())?;
                decode_struct(&input.ident, &input.generics, data, &container)
            }
            Data::Enum(data) => decode_enum(&input.ident, &input.generics, data, &container),
            Data::Union(u) => Err(syn::Error::new(
                u.union_token.span(),
                "FromBson is not supported for unions",
            )),
        }
    })();

    match out {
        Ok(ts) => TokenStream::from(ts),
        Err(e) => TokenStream::from(e.to_compile_error()),
    }
}
