//! Implementation of the `PartialRecord` derive.
//!
//! Parsing validates the struct shape and attributes up front so expansion
//! fails fast with spanned errors; generation then emits one engine call per
//! field.

use proc_macro2::TokenStream;
use syn::DeriveInput;

mod generate;
mod parse;
#[cfg(test)]
mod tests;
mod type_utils;

pub(crate) fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let record = parse::parse_input(input)?;
    Ok(generate::record_impl(&record))
}
