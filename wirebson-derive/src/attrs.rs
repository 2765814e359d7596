use proc_macro2::Span;
use syn::{Attribute, LitStr};

use crate::case::RenameRule;

#[derive(Default, Clone)]
pub(crate) struct BsonFieldAttr {
    pub(crate) rename: Option<LitStr>,
    pub(crate) flatten: bool,
    pub(crate) skip: bool,
    pub(crate) none_as_null: bool,
    pub(crate) default: bool,
}

#[derive(Default, Clone)]
pub(crate) struct BsonVariantAttr {
    pub(crate) rename: Option<LitStr>,
}

#[derive(Default, Clone)]
pub(crate) struct BsonContainerAttr {
    pub(crate) rename_all: Option<RenameRule>,
    pub(crate) tag: Option<LitStr>,
}

impl BsonContainerAttr {
    /// The discriminator field name for sum types.
    pub(crate) fn tag_name(&self) -> String {
        self.tag
            .as_ref()
            .map_or_else(|| "className".to_owned(), LitStr::value)
    }

    pub(crate) fn reject_enum_only(&self, span: Span) -> syn::Result<()> {
        if self.tag.is_some() {
            return Err(syn::Error::new(
                span,
                "`bson(tag = ...)` applies to enums only",
            ));
        }
        Ok(())
    }
}

pub(crate) fn parse_bson_field_attrs(attrs: &[Attribute]) -> syn::Result<BsonFieldAttr> {
    let mut out = BsonFieldAttr::default();
    for attr in attrs {
        if !attr.path().is_ident("bson") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if out.rename.is_some() {
                    return Err(meta.error("duplicate `bson(rename=...)`"));
                }
                let lit: LitStr = meta.value()?.parse()?;
                out.rename = Some(lit);
                return Ok(());
            }
            for (name, slot) in [
                ("flatten", &mut out.flatten),
                ("skip", &mut out.skip),
                ("none_as_null", &mut out.none_as_null),
                ("default", &mut out.default),
            ] {
                if meta.path.is_ident(name) {
                    if *slot {
                        return Err(meta.error(format!("duplicate `bson({name})`")));
                    }
                    *slot = true;
                    return Ok(());
                }
            }
            Err(meta.error(
                "unsupported `bson(...)` field attribute \
                 (allowed: rename, flatten, skip, none_as_null, default)",
            ))
        })?;
    }

    if out.skip && (out.rename.is_some() || out.flatten || out.none_as_null || out.default) {
        return Err(syn::Error::new(
            Span::call_site(),
            "`bson(skip)` cannot be combined with other field attributes",
        ));
    }
    if out.flatten && (out.rename.is_some() || out.none_as_null || out.default) {
        return Err(syn::Error::new(
            Span::call_site(),
            "`bson(flatten)` cannot be combined with rename, none_as_null, or default",
        ));
    }

    Ok(out)
}

pub(crate) fn parse_bson_variant_attrs(attrs: &[Attribute]) -> syn::Result<BsonVariantAttr> {
    let mut out = BsonVariantAttr::default();
    for attr in attrs {
        if !attr.path().is_ident("bson") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if out.rename.is_some() {
                    return Err(meta.error("duplicate `bson(rename=...)` on variant"));
                }
                let lit: LitStr = meta.value()?.parse()?;
                out.rename = Some(lit);
                return Ok(());
            }
            Err(meta.error("unsupported `bson(...)` variant attribute (allowed: rename)"))
        })?;
    }
    Ok(out)
}

pub(crate) fn parse_bson_container_attrs(attrs: &[Attribute]) -> syn::Result<BsonContainerAttr> {
    let mut out = BsonContainerAttr::default();
    for attr in attrs {
        if !attr.path().is_ident("bson") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                if out.rename_all.is_some() {
                    return Err(meta.error("duplicate `bson(rename_all=...)`"));
                }
                let lit: LitStr = meta.value()?.parse()?;
                out.rename_all = Some(RenameRule::from_lit(&lit)?);
                return Ok(());
            }
            if meta.path.is_ident("tag") {
                if out.tag.is_some() {
                    return Err(meta.error("duplicate `bson(tag=...)`"));
                }
                let lit: LitStr = meta.value()?.parse()?;
                out.tag = Some(lit);
                return Ok(());
            }
            Err(meta.error(
                "unsupported `bson(...)` container attribute (allowed: rename_all, tag)",
            ))
        })?;
    }
    Ok(out)
}
