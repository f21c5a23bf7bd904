//! Procedural macros for `patchwise`.
//!
//! The [`PartialRecord`] derive turns a struct of `OptionalValue` fields into
//! a partial-update record for a named target entity. Each field is resolved
//! by one of the engine's per-field rules, chosen from `#[patch(...)]`
//! attributes:
//!
//! - no attribute: nullable scalar (`Option<T>` on the target);
//! - `required`: scalar that rejects `null` (`T` on the target);
//! - `nested`: detachable nested record (`Option<E>` on the target);
//! - `nested, required`: association that must always exist (`E`);
//! - `collection`: `Vec` of nested records merged by a configured strategy;
//! - `key`: identity used to match collection elements;
//! - `create = "path::to::factory"`: factory for missing nested records;
//! - `rename = "wireName"`: name used in field paths.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod derive;

/// Derive macro for `patchwise::PartialRecord`.
///
/// The struct must name its target entity with `#[patch(target = Type)]`
/// and every field must be an `OptionalValue`.
#[proc_macro_derive(PartialRecord, attributes(patch))]
pub fn derive_partial_record(input: TokenStream) -> TokenStream {
    let parsed = parse_macro_input!(input as DeriveInput);
    derive::expand(&parsed)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
