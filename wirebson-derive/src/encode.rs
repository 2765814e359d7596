use std::collections::HashSet;

use quote::quote;
use syn::{spanned::Spanned, DataEnum, DataStruct, Fields, Generics, Ident, LitStr};

use crate::attrs::{parse_bson_field_attrs, parse_bson_variant_attrs, BsonContainerAttr};
use crate::case::RenameRule;
use crate::types::{is_option_type, option_inner_type, type_mentions_self};
use crate::util::{add_where_bound, empty_where_clause};

/// The wire key for a field: explicit rename, else the container naming
/// policy applied to the field identifier.
pub(crate) fn field_key(
    ident: &Ident,
    rename: Option<&LitStr>,
    rule: Option<RenameRule>,
) -> LitStr {
    rename.cloned().unwrap_or_else(|| {
        let name = ident.to_string();
        let mapped = rule.map_or(name.clone(), |r| r.apply(&name));
        LitStr::new(&mapped, ident.span())
    })
}

/// Per-field write statements for named fields. `access` renders an
/// expression of type `&FieldTy` for a field identifier.
fn named_field_writes<F>(
    name: &Ident,
    fields: &syn::FieldsNamed,
    rule: Option<RenameRule>,
    wc: &mut syn::WhereClause,
    access: F,
) -> syn::Result<(Vec<Ident>, Vec<proc_macro2::TokenStream>)>
where
    F: Fn(&Ident) -> proc_macro2::TokenStream,
{
    let mut pats = Vec::new();
    let mut writes = Vec::new();

    for field in &fields.named {
        let attr = parse_bson_field_attrs(&field.attrs)?;
        let f_ident = field.ident.as_ref().unwrap();
        pats.push(f_ident.clone());

        if attr.skip {
            continue;
        }

        let value = access(f_ident);

        if attr.flatten {
            if is_option_type(&field.ty) {
                return Err(syn::Error::new(
                    field.span(),
                    "`bson(flatten)` requires a record field, not an Option",
                ));
            }
            if type_mentions_self(&field.ty, name) {
                return Err(syn::Error::new(
                    field.span(),
                    "`bson(flatten)` cannot be applied to a self-referential field",
                ));
            }
            add_where_bound(wc, &field.ty, quote!(::wirebson::ToBsonDocument));
            let context = LitStr::new(&f_ident.to_string(), f_ident.span());
            writes.push(quote! {
                let __sub = ::wirebson::ToBsonDocument::to_bson_document(#value)
                    .map_err(|e| e.in_field(#context))?;
                __doc.extend(__sub);
            });
            continue;
        }

        let key = field_key(f_ident, attr.rename.as_ref(), rule);

        if let Some(inner) = option_inner_type(&field.ty) {
            if !type_mentions_self(inner, name) {
                add_where_bound(wc, inner, quote!(::wirebson::ToBson));
            }
            if attr.none_as_null {
                writes.push(quote! {
                    match #value {
                        ::core::option::Option::Some(__v) => __doc.push(
                            #key,
                            ::wirebson::ToBson::to_bson(__v).map_err(|e| e.in_field(#key))?,
                        ),
                        ::core::option::Option::None => {
                            __doc.push(#key, ::wirebson::BsonValue::Null);
                        }
                    }
                });
            } else {
                writes.push(quote! {
                    if let ::core::option::Option::Some(__v) = #value {
                        __doc.push(
                            #key,
                            ::wirebson::ToBson::to_bson(__v).map_err(|e| e.in_field(#key))?,
                        );
                    }
                });
            }
            continue;
        }

        if attr.none_as_null {
            return Err(syn::Error::new(
                field.span(),
                "`bson(none_as_null)` requires an Option field",
            ));
        }
        if !type_mentions_self(&field.ty, name) {
            add_where_bound(wc, &field.ty, quote!(::wirebson::ToBson));
        }
        writes.push(quote! {
            __doc.push(
                #key,
                ::wirebson::ToBson::to_bson(#value).map_err(|e| e.in_field(#key))?,
            );
        });
    }

    Ok((pats, writes))
}

fn to_bson_impl(
    name: &Ident,
    generics: &Generics,
    where_clause: &syn::WhereClause,
) -> proc_macro2::TokenStream {
    let (impl_generics, ty_generics, _) = generics.split_for_impl();
    quote! {
        impl #impl_generics ::wirebson::ToBson for #name #ty_generics #where_clause {
            fn to_bson(
                &self,
            ) -> ::core::result::Result<::wirebson::BsonValue, ::wirebson::BsonError> {
                ::core::result::Result::Ok(::wirebson::BsonValue::Document(
                    ::wirebson::ToBsonDocument::to_bson_document(self)?,
                ))
            }
        }
    }
}

pub(crate) fn encode_struct(
    name: &Ident,
    generics: &Generics,
    data: &DataStruct,
    container: &BsonContainerAttr,
) -> syn::Result<proc_macro2::TokenStream> {
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new(
            name.span(),
            "ToBson derivation supports structs with named fields and enums",
        ));
    };

    let (impl_generics, ty_generics, base_where) = generics.split_for_impl();
    let mut where_clause = base_where.cloned().unwrap_or_else(empty_where_clause);

    let (_, writes) = named_field_writes(
        name,
        fields,
        container.rename_all,
        &mut where_clause,
        |ident| quote!(&self.#ident),
    )?;

    let to_bson = to_bson_impl(name, generics, &where_clause);
    Ok(quote! {
        impl #impl_generics ::wirebson::ToBsonDocument for #name #ty_generics #where_clause {
            fn to_bson_document(
                &self,
            ) -> ::core::result::Result<::wirebson::BsonDocument, ::wirebson::BsonError> {
                let mut __doc = ::wirebson::BsonDocument::new();
                #(#writes)*
                ::core::result::Result::Ok(__doc)
            }
        }

        #to_bson
    })
}

/// The discriminator value for a variant: explicit rename, else the
/// container naming policy applied to the variant identifier.
pub(crate) fn variant_name(
    variant: &syn::Variant,
    rename: Option<&LitStr>,
    rule: Option<RenameRule>,
) -> LitStr {
    rename.cloned().unwrap_or_else(|| {
        let name = variant.ident.to_string();
        let mapped = rule.map_or(name.clone(), |r| r.apply(&name));
        LitStr::new(&mapped, variant.ident.span())
    })
}

/// Reject two variants mapping to the same discriminator under the
/// chosen naming policy.
pub(crate) fn check_discriminator_collisions(
    data: &DataEnum,
    rule: Option<RenameRule>,
) -> syn::Result<Vec<LitStr>> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for variant in &data.variants {
        let attr = parse_bson_variant_attrs(&variant.attrs)?;
        let vname = variant_name(variant, attr.rename.as_ref(), rule);
        if !seen.insert(vname.value()) {
            return Err(syn::Error::new(
                variant.span(),
                format!(
                    "discriminator value `{}` is produced by more than one variant",
                    vname.value()
                ),
            ));
        }
        names.push(vname);
    }
    Ok(names)
}

pub(crate) fn encode_enum(
    name: &Ident,
    generics: &Generics,
    data: &DataEnum,
    container: &BsonContainerAttr,
) -> syn::Result<proc_macro2::TokenStream> {
    let (impl_generics, ty_generics, base_where) = generics.split_for_impl();
    let mut where_clause = base_where.cloned().unwrap_or_else(empty_where_clause);

    let tag = container.tag_name();
    let tag_key = LitStr::new(&tag, proc_macro2::Span::call_site());
    let names = check_discriminator_collisions(data, container.rename_all)?;

    let mut arms = Vec::new();
    for (variant, vname) in data.variants.iter().zip(&names) {
        let ident = &variant.ident;
        match &variant.fields {
            Fields::Unit => {
                arms.push(quote! {
                    Self::#ident => {
                        let mut __doc = ::wirebson::BsonDocument::new();
                        __doc.push(#tag_key, ::wirebson::BsonValue::from(#vname));
                        ::core::result::Result::Ok(__doc)
                    }
                });
            }

            Fields::Unnamed(fields) => {
                if fields.unnamed.len() != 1 {
                    return Err(syn::Error::new(
                        variant.span(),
                        "sum variants must be records, singletons, or single-payload wrappers",
                    ));
                }
                let field = fields.unnamed.first().unwrap();
                if !type_mentions_self(&field.ty, name) {
                    add_where_bound(
                        &mut where_clause,
                        &field.ty,
                        quote!(::wirebson::ToBsonDocument),
                    );
                }
                arms.push(quote! {
                    Self::#ident(__payload) => {
                        let mut __doc = ::wirebson::BsonDocument::new();
                        __doc.push(#tag_key, ::wirebson::BsonValue::from(#vname));
                        let __sub = ::wirebson::ToBsonDocument::to_bson_document(__payload)?;
                        __doc.extend(__sub);
                        ::core::result::Result::Ok(__doc)
                    }
                });
            }

            Fields::Named(fields) => {
                let (pats, writes) = named_field_writes(
                    name,
                    fields,
                    None,
                    &mut where_clause,
                    |ident| quote!(#ident),
                )?;
                arms.push(quote! {
                    Self::#ident { #(#pats),* } => {
                        let mut __doc = ::wirebson::BsonDocument::new();
                        __doc.push(#tag_key, ::wirebson::BsonValue::from(#vname));
                        #(#writes)*
                        ::core::result::Result::Ok(__doc)
                    }
                });
            }
        }
    }

    let to_bson = to_bson_impl(name, generics, &where_clause);
    Ok(quote! {
        impl #impl_generics ::wirebson::ToBsonDocument for #name #ty_generics #where_clause {
            fn to_bson_document(
                &self,
            ) -> ::core::result::Result<::wirebson::BsonDocument, ::wirebson::BsonError> {
                match self {
                    #(#arms)*
                }
            }
        }

        #to_bson
    })
}
