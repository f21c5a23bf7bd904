//! Token generation for the `PartialRecord` derive.

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};

use super::parse::{FieldKind, PatchField, Record};

// `#[patch(crate = "...")]` replaces the `::patchwise` prefix for callers
// that depend on the runtime under another name.
fn crate_root(record: &Record) -> TokenStream {
    record
        .crate_path
        .as_ref()
        .map_or_else(|| quote! { ::patchwise }, ToTokens::to_token_stream)
}

/// Engine call resolving one field inside `merge_into`.
fn merge_call(field: &PatchField, krate: &TokenStream) -> TokenStream {
    let ident = &field.ident;
    let create = field.create.as_ref().map_or_else(
        || quote! { #krate::engine::default_factory },
        |path| quote! { #path },
    );
    match field.kind {
        FieldKind::Nullable => {
            quote! { #krate::engine::merge_nullable(&mut target.#ident, #ident, scope) }
        }
        FieldKind::Required => {
            quote! { #krate::engine::merge_required(&mut target.#ident, #ident, scope) }
        }
        FieldKind::Nested => {
            quote! { #krate::engine::merge_nested(&mut target.#ident, #ident, scope, #create) }
        }
        FieldKind::Association => {
            quote! { #krate::engine::merge_association(&mut target.#ident, #ident, scope) }
        }
        FieldKind::Collection => {
            quote! { #krate::engine::merge_collection(&mut target.#ident, #ident, scope, #create) }
        }
    }
}

/// Statement recording the present paths of one field.
fn present_call(field: &PatchField, krate: &TokenStream) -> TokenStream {
    let ident = &field.ident;
    let name = &field.name;
    let helper = match field.kind {
        FieldKind::Nullable | FieldKind::Required => quote! { present_leaf },
        FieldKind::Nested | FieldKind::Association => quote! { present_nested },
        FieldKind::Collection => quote! { present_collection },
    };
    quote! { #krate::record::#helper(&self.#ident, base.child(#name), out); }
}

/// Associated key type and the two identity methods.
fn identity_items(record: &Record, krate: &TokenStream) -> TokenStream {
    let Some(field) = record.key_field() else {
        return quote! { type Key = #krate::NoIdentity; };
    };
    let ident = &field.ident;
    let inner = &field.inner;
    let from_target = if matches!(field.kind, FieldKind::Required) {
        quote! { ::core::option::Option::Some(::core::clone::Clone::clone(&target.#ident)) }
    } else {
        quote! { ::core::clone::Clone::clone(&target.#ident) }
    };
    quote! {
        type Key = #inner;

        fn identity(&self) -> ::core::option::Option<Self::Key> {
            self.#ident.as_present().cloned()
        }

        fn target_identity(target: &Self::Target) -> ::core::option::Option<Self::Key> {
            #from_target
        }
    }
}

/// Generate the `PartialRecord` and `NullMarker` impls for `record`.
pub(crate) fn record_impl(record: &Record) -> TokenStream {
    let krate = crate_root(record);
    let ident = &record.ident;
    let target_ty = &record.target;
    let (impl_generics, ty_generics, where_clause) = record.generics.split_for_impl();
    let idents: Vec<_> = record.fields.iter().map(|field| &field.ident).collect();
    let names = record.fields.iter().map(|field| &field.name);
    let calls = record
        .fields
        .iter()
        .map(|field| merge_call(field, &krate));
    let present = record
        .fields
        .iter()
        .map(|field| present_call(field, &krate));
    let identity = identity_items(record, &krate);
    // Field-less records never touch their parameters.
    let unused = record.fields.is_empty().then(|| quote! { let _ = (target, cx); });
    let unused_paths = record.fields.is_empty().then(|| quote! { let _ = (base, out); });

    quote! {
        impl #impl_generics #krate::PartialRecord for #ident #ty_generics #where_clause {
            type Target = #target_ty;
            #identity

            fn merge_into(
                self,
                target: &mut Self::Target,
                cx: &mut #krate::MergeContext<'_>,
            ) -> #krate::PatchResult<()> {
                #unused
                let Self { #( #idents, )* } = self;
                #( cx.field(#names, |scope| #calls)?; )*
                ::core::result::Result::Ok(())
            }

            fn is_unset(&self) -> bool {
                true #( && self.#idents.is_unset() )*
            }

            fn collect_present_paths(
                &self,
                base: &#krate::FieldPath,
                out: &mut ::std::vec::Vec<#krate::FieldPath>,
            ) {
                #unused_paths
                #( #present )*
            }
        }

        impl #impl_generics #krate::NullMarker for #ident #ty_generics #where_clause {}
    }
}
