//! Parsing of `#[patch(...)]` attributes and the annotated struct.

use syn::{
    Attribute, Data, DeriveInput, Fields, Generics, Ident, LitStr, Type, ext::IdentExt,
    meta::ParseNestedMeta, spanned::Spanned,
};

use super::type_utils::{option_inner, optional_value_inner, vec_inner};

/// Struct-level attributes recognised by `#[derive(PartialRecord)]`.
#[derive(Default)]
struct StructAttrs {
    target: Option<Type>,
    crate_path: Option<syn::Path>,
}

/// Field-level attributes recognised by `#[derive(PartialRecord)]`.
#[derive(Default)]
struct FieldAttrs {
    required: bool,
    nested: bool,
    collection: bool,
    key: bool,
    create: Option<syn::Path>,
    rename: Option<String>,
}

/// Merge rule selected for a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FieldKind {
    Nullable,
    Required,
    Nested,
    Association,
    Collection,
}

pub(crate) struct PatchField {
    pub ident: Ident,
    /// Segment rendered in field paths.
    pub name: String,
    pub kind: FieldKind,
    /// The `T` of `OptionalValue<T>`.
    pub inner: Type,
    pub key: bool,
    pub create: Option<syn::Path>,
}

pub(crate) struct Record {
    pub ident: Ident,
    pub generics: Generics,
    pub target: Type,
    pub crate_path: Option<syn::Path>,
    pub fields: Vec<PatchField>,
}

impl Record {
    pub(crate) fn key_field(&self) -> Option<&PatchField> {
        self.fields.iter().find(|field| field.key)
    }
}

/// Iterate all `#[patch(...)]` attributes once and apply a callback.
fn parse_patch_attrs<F>(attrs: &[Attribute], mut f: F) -> syn::Result<()>
where
    F: FnMut(&ParseNestedMeta) -> syn::Result<()>,
{
    for attr in attrs.iter().filter(|a| a.path().is_ident("patch")) {
        attr.parse_nested_meta(|meta| f(&meta))?;
    }
    Ok(())
}

fn parse_path_literal(meta: &ParseNestedMeta, key: &str) -> syn::Result<syn::Path> {
    let lit = meta.value()?.parse::<LitStr>().map_err(|err| {
        syn::Error::new(err.span(), format!("{key} must be a string literal"))
    })?;
    lit.parse::<syn::Path>()
        .map_err(|err| syn::Error::new(lit.span(), err))
}

fn parse_struct_attrs(attrs: &[Attribute]) -> syn::Result<StructAttrs> {
    let mut out = StructAttrs::default();
    parse_patch_attrs(attrs, |meta| {
        match meta.path.get_ident().map(ToString::to_string).as_deref() {
            Some("target") => {
                out.target = Some(meta.value()?.parse::<Type>()?);
                Ok(())
            }
            Some("crate") => {
                out.crate_path = Some(parse_path_literal(meta, "crate")?);
                Ok(())
            }
            _ => Err(meta.error("unknown struct attribute; expected `target` or `crate`")),
        }
    })?;
    Ok(out)
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    parse_patch_attrs(attrs, |meta| {
        match meta.path.get_ident().map(ToString::to_string).as_deref() {
            Some("required") => out.required = true,
            Some("nested") => out.nested = true,
            Some("collection") => out.collection = true,
            Some("key") => out.key = true,
            Some("create") => out.create = Some(parse_path_literal(meta, "create")?),
            Some("rename") => out.rename = Some(meta.value()?.parse::<LitStr>()?.value()),
            _ => {
                return Err(meta.error(
                    "unknown field attribute; expected one of `required`, `nested`, \
                     `collection`, `key`, `create` or `rename`",
                ));
            }
        }
        Ok(())
    })?;
    Ok(out)
}

fn classify(attrs: &FieldAttrs, inner: &Type, span: proc_macro2::Span) -> syn::Result<FieldKind> {
    if option_inner(inner).is_some() || optional_value_inner(inner).is_some() {
        return Err(syn::Error::new(
            span,
            "optional wrappers must not be stacked; use `OptionalValue<T>` directly",
        ));
    }
    if attrs.nested && attrs.collection {
        return Err(syn::Error::new(
            span,
            "`nested` and `collection` are mutually exclusive",
        ));
    }
    if attrs.key && (attrs.nested || attrs.collection) {
        return Err(syn::Error::new(span, "`key` must mark a scalar field"));
    }
    if attrs.collection {
        if attrs.required {
            return Err(syn::Error::new(span, "collections cannot be `required`"));
        }
        if vec_inner(inner).is_none() {
            return Err(syn::Error::new(
                span,
                "`collection` fields must be `OptionalValue<Vec<T>>`",
            ));
        }
        return Ok(FieldKind::Collection);
    }
    let kind = match (attrs.nested, attrs.required) {
        (true, true) => FieldKind::Association,
        (true, false) => FieldKind::Nested,
        (false, true) => FieldKind::Required,
        (false, false) => FieldKind::Nullable,
    };
    if attrs.create.is_some() && !matches!(kind, FieldKind::Nested) {
        return Err(syn::Error::new(
            span,
            "`create` applies to detachable `nested` and `collection` fields",
        ));
    }
    Ok(kind)
}

fn parse_field(field: &syn::Field) -> syn::Result<PatchField> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new(field.span(), "PartialRecord requires named fields"))?;
    let inner = optional_value_inner(&field.ty).cloned().ok_or_else(|| {
        syn::Error::new_spanned(
            &field.ty,
            "PartialRecord fields must be `OptionalValue<T>`",
        )
    })?;
    let attrs = parse_field_attrs(&field.attrs)?;
    let kind = classify(&attrs, &inner, field.ty.span())?;
    let name = attrs
        .rename
        .clone()
        .unwrap_or_else(|| ident.unraw().to_string());
    Ok(PatchField {
        ident,
        name,
        kind,
        inner,
        key: attrs.key,
        create: attrs.create,
    })
}

/// Gathers information from the user-provided struct.
///
/// Invalid input is rejected eagerly so expansion can fail fast with an
/// error spanned on the offending attribute or field.
pub(crate) fn parse_input(input: &DeriveInput) -> syn::Result<Record> {
    let struct_attrs = parse_struct_attrs(&input.attrs)?;
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named
                .named
                .iter()
                .map(parse_field)
                .collect::<syn::Result<Vec<_>>>()?,
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    data.struct_token,
                    "PartialRecord requires named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "PartialRecord can only be derived for structs",
            ));
        }
    };
    let target = struct_attrs.target.ok_or_else(|| {
        syn::Error::new_spanned(
            &input.ident,
            "missing `#[patch(target = Type)]` naming the entity being patched",
        )
    })?;
    let mut keys = fields.iter().filter(|field| field.key);
    if let (Some(_), Some(second)) = (keys.next(), keys.next()) {
        return Err(syn::Error::new_spanned(
            &second.ident,
            "only one field may be marked `key`",
        ));
    }
    Ok(Record {
        ident: input.ident.clone(),
        generics: input.generics.clone(),
        target,
        crate_path: struct_attrs.crate_path,
        fields,
    })
}
