use quote::{format_ident, quote};
use syn::{spanned::Spanned, DataEnum, DataStruct, Fields, Generics, Ident, LitStr};

use crate::attrs::{parse_bson_field_attrs, BsonContainerAttr};
use crate::case::RenameRule;
use crate::encode::{check_discriminator_collisions, field_key};
use crate::types::{is_option_type, option_inner_type, type_mentions_self};
use crate::util::{add_where_bound, empty_where_clause};

/// Per-field read statements for named fields, one `let` binding each,
/// followed by construction of `target`.
fn named_field_reads(
    name: &Ident,
    fields: &syn::FieldsNamed,
    rule: Option<RenameRule>,
    wc: &mut syn::WhereClause,
    target: proc_macro2::TokenStream,
) -> syn::Result<proc_macro2::TokenStream> {
    let mut reads = Vec::new();
    let mut inits: Vec<proc_macro2::TokenStream> = Vec::new();

    for field in &fields.named {
        let attr = parse_bson_field_attrs(&field.attrs)?;
        let f_ident = field.ident.as_ref().unwrap();
        let var = format_ident!("__{}", f_ident);
        let ty = &field.ty;
        inits.push(quote! { #f_ident: #var });

        if attr.skip {
            add_where_bound(wc, ty, quote!(::core::default::Default));
            reads.push(quote! {
                let #var: #ty = ::core::default::Default::default();
            });
            continue;
        }

        if attr.flatten {
            if is_option_type(ty) {
                return Err(syn::Error::new(
                    field.span(),
                    "`bson(flatten)` requires a record field, not an Option",
                ));
            }
            if type_mentions_self(ty, name) {
                return Err(syn::Error::new(
                    field.span(),
                    "`bson(flatten)` cannot be applied to a self-referential field",
                ));
            }
            add_where_bound(wc, ty, quote!(::wirebson::FromBsonDocument));
            let context = LitStr::new(&f_ident.to_string(), f_ident.span());
            reads.push(quote! {
                let #var: #ty = ::wirebson::FromBsonDocument::from_bson_document(__doc)
                    .map_err(|e| e.in_field(#context))?;
            });
            continue;
        }

        let key = field_key(f_ident, attr.rename.as_ref(), rule);

        if let Some(inner) = option_inner_type(ty) {
            if !type_mentions_self(inner, name) {
                add_where_bound(wc, inner, quote!(::wirebson::FromBson));
            }
            reads.push(quote! {
                let #var: #ty = match __doc.get(#key) {
                    ::core::option::Option::None => ::core::option::Option::None,
                    ::core::option::Option::Some(__v) => {
                        <#ty as ::wirebson::FromBson>::from_bson(__v)
                            .map_err(|e| e.in_field(#key))?
                    }
                };
            });
            continue;
        }

        if !type_mentions_self(ty, name) {
            add_where_bound(wc, ty, quote!(::wirebson::FromBson));
        }

        if attr.default {
            add_where_bound(wc, ty, quote!(::core::default::Default));
            reads.push(quote! {
                let #var: #ty = match __doc.get(#key) {
                    ::core::option::Option::None
                    | ::core::option::Option::Some(::wirebson::BsonValue::Null) => {
                        ::core::default::Default::default()
                    }
                    ::core::option::Option::Some(__v) => {
                        ::wirebson::FromBson::from_bson(__v).map_err(|e| e.in_field(#key))?
                    }
                };
            });
        } else {
            reads.push(quote! {
                let #var: #ty = match __doc.get(#key) {
                    ::core::option::Option::None
                    | ::core::option::Option::Some(::wirebson::BsonValue::Null) => {
                        return ::core::result::Result::Err(
                            ::wirebson::BsonError::value_not_found(#key),
                        );
                    }
                    ::core::option::Option::Some(__v) => {
                        ::wirebson::FromBson::from_bson(__v).map_err(|e| e.in_field(#key))?
                    }
                };
            });
        }
    }

    Ok(quote! {
        #(#reads)*
        ::core::result::Result::Ok(#target { #(#inits),* })
    })
}

fn from_bson_impl(
    name: &Ident,
    generics: &Generics,
    where_clause: &syn::WhereClause,
) -> proc_macro2::TokenStream {
    let (impl_generics, ty_generics, _) = generics.split_for_impl();
    quote! {
        impl #impl_generics ::wirebson::FromBson for #name #ty_generics #where_clause {
            fn from_bson(
                value: &::wirebson::BsonValue,
            ) -> ::core::result::Result<Self, ::wirebson::BsonError> {
                match value {
                    ::wirebson::BsonValue::Document(doc) => {
                        <Self as ::wirebson::FromBsonDocument>::from_bson_document(doc)
                    }
                    other => ::core::result::Result::Err(
                        ::wirebson::BsonError::type_mismatch("Document", other.kind_name()),
                    ),
                }
            }
        }
    }
}

pub(crate) fn decode_struct(
    name: &Ident,
    generics: &Generics,
    data: &DataStruct,
    container: &BsonContainerAttr,
) -> syn::Result<proc_macro2::TokenStream> {
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new(
            name.span(),
            "FromBson derivation supports structs with named fields and enums",
        ));
    };

    let (impl_generics, ty_generics, base_where) = generics.split_for_impl();
    let mut where_clause = base_where.cloned().unwrap_or_else(empty_where_clause);

    let body = named_field_reads(
        name,
        fields,
        container.rename_all,
        &mut where_clause,
        quote!(Self),
    )?;

    let from_bson = from_bson_impl(name, generics, &where_clause);
    Ok(quote! {
        impl #impl_generics ::wirebson::FromBsonDocument for #name #ty_generics #where_clause {
            fn from_bson_document(
                __doc: &::wirebson::BsonDocument,
            ) -> ::core::result::Result<Self, ::wirebson::BsonError> {
                #body
            }
        }

        #from_bson
    })
}

pub(crate) fn decode_enum(
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

    let missing_tag = LitStr::new(
        &format!("document with a '{tag}' discriminator"),
        proc_macro2::Span::call_site(),
    );
    let known = names
        .iter()
        .map(|n| format!("'{}'", n.value()))
        .collect::<Vec<_>>()
        .join(", ");
    let known_tags = LitStr::new(
        &format!("one of {known}"),
        proc_macro2::Span::call_site(),
    );

    let mut arms = Vec::new();
    for (variant, vname) in data.variants.iter().zip(&names) {
        let ident = &variant.ident;
        match &variant.fields {
            Fields::Unit => {
                arms.push(quote! {
                    #vname => ::core::result::Result::Ok(Self::#ident),
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
                let ty = &field.ty;
                if !type_mentions_self(ty, name) {
                    add_where_bound(
                        &mut where_clause,
                        ty,
                        quote!(::wirebson::FromBsonDocument),
                    );
                }
                arms.push(quote! {
                    #vname => <#ty as ::wirebson::FromBsonDocument>::from_bson_document(__doc)
                        .map(Self::#ident),
                });
            }

            Fields::Named(fields) => {
                let body = named_field_reads(
                    name,
                    fields,
                    None,
                    &mut where_clause,
                    quote!(Self::#ident),
                )?;
                arms.push(quote! {
                    #vname => { #body }
                });
            }
        }
    }

    let from_bson = from_bson_impl(name, generics, &where_clause);
    Ok(quote! {
        impl #impl_generics ::wirebson::FromBsonDocument for #name #ty_generics #where_clause {
            fn from_bson_document(
                __doc: &::wirebson::BsonDocument,
            ) -> ::core::result::Result<Self, ::wirebson::BsonError> {
                let __tag = match __doc.get(#tag_key) {
                    ::core::option::Option::Some(::wirebson::BsonValue::String(__s)) => {
                        __s.as_str()
                    }
                    ::core::option::Option::Some(__other) => {
                        return ::core::result::Result::Err(
                            ::wirebson::BsonError::type_mismatch(
                                "String",
                                __other.kind_name(),
                            )
                            .in_field(#tag_key),
                        );
                    }
                    ::core::option::Option::None => {
                        return ::core::result::Result::Err(
                            ::wirebson::BsonError::type_mismatch(#missing_tag, "Document"),
                        );
                    }
                };
                match __tag {
                    #(#arms)*
                    __unknown => ::core::result::Result::Err(
                        ::wirebson::BsonError::type_mismatch(#known_tags, __unknown),
                    ),
                }
            }
        }

        #from_bson
    })
}
