//! Unit tests for `PartialRecord` parsing and token generation.

use super::{
    generate::record_impl,
    parse::{FieldKind, parse_input},
};
use anyhow::{Result, anyhow, ensure};
use rstest::rstest;
use syn::{DeriveInput, parse_quote};

fn kinds(input: &DeriveInput) -> Result<Vec<FieldKind>> {
    let record = parse_input(input).map_err(|err| anyhow!(err.to_string()))?;
    Ok(record.fields.iter().map(|field| field.kind).collect())
}

fn parse_error(input: &DeriveInput) -> Result<String> {
    match parse_input(input) {
        Ok(_) => Err(anyhow!("expected parse error")),
        Err(err) => Ok(err.to_string()),
    }
}

#[rstest]
fn attributes_select_merge_rules() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        #[patch(target = Customer)]
        struct CustomerPatch {
            nickname: OptionalValue<String>,
            #[patch(required)]
            email: OptionalValue<String>,
            #[patch(nested)]
            address: OptionalValue<AddressPatch>,
            #[patch(nested, required)]
            account: OptionalValue<AccountPatch>,
            #[patch(collection, create = "new_line")]
            lines: OptionalValue<Vec<LinePatch>>,
        }
    };
    let found = kinds(&input)?;
    ensure!(
        found
            == [
                FieldKind::Nullable,
                FieldKind::Required,
                FieldKind::Nested,
                FieldKind::Association,
                FieldKind::Collection,
            ],
        "unexpected kinds: {found:?}"
    );
    Ok(())
}

#[rstest]
#[case::missing_target(
    parse_quote! { struct P { a: OptionalValue<u8> } },
    "missing `#[patch(target = Type)]`"
)]
#[case::plain_field(
    parse_quote! { #[patch(target = T)] struct P { a: u8 } },
    "must be `OptionalValue<T>`"
)]
#[case::stacked(
    parse_quote! { #[patch(target = T)] struct P { a: OptionalValue<Option<u8>> } },
    "must not be stacked"
)]
#[case::collection_not_vec(
    parse_quote! { #[patch(target = T)] struct P { #[patch(collection)] a: OptionalValue<u8> } },
    "`OptionalValue<Vec<T>>`"
)]
#[case::two_keys(
    parse_quote! {
        #[patch(target = T)]
        struct P {
            #[patch(key)] a: OptionalValue<u8>,
            #[patch(key)] b: OptionalValue<u8>,
        }
    },
    "only one field"
)]
#[case::unknown_attr(
    parse_quote! { #[patch(target = T)] struct P { #[patch(sometimes)] a: OptionalValue<u8> } },
    "unknown field attribute"
)]
#[case::tuple_struct(
    parse_quote! { #[patch(target = T)] struct P(OptionalValue<u8>); },
    "named fields"
)]
fn invalid_input_is_rejected(#[case] input: DeriveInput, #[case] expected: &str) -> Result<()> {
    let message = parse_error(&input)?;
    ensure!(
        message.contains(expected),
        "error `{message}` does not mention `{expected}`"
    );
    Ok(())
}

#[rstest]
fn rename_changes_reported_path() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        #[patch(target = Person)]
        struct PersonPatch {
            #[patch(rename = "dateOfBirth")]
            date_of_birth: OptionalValue<String>,
        }
    };
    let tokens = record_impl(&parse_input(&input)?).to_string();
    ensure!(
        tokens.contains("cx . field (\"dateOfBirth\""),
        "field path not renamed: {tokens}"
    );
    ensure!(
        tokens.contains("target . date_of_birth"),
        "target field must keep its Rust name: {tokens}"
    );
    Ok(())
}

#[rstest]
fn key_fields_drive_identity() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        #[patch(target = Line)]
        struct LinePatch {
            #[patch(key, required)]
            sku: OptionalValue<String>,
            quantity: OptionalValue<u32>,
        }
    };
    let tokens = record_impl(&parse_input(&input)?).to_string();
    ensure!(tokens.contains("type Key = String"), "key type missing: {tokens}");
    ensure!(
        tokens.contains("Option :: Some (:: core :: clone :: Clone :: clone (& target . sku))"),
        "required key must wrap the target value: {tokens}"
    );
    Ok(())
}

#[rstest]
fn records_without_key_use_no_identity() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        #[patch(target = Address, crate = "deps::patchwise")]
        struct AddressPatch {
            city: OptionalValue<String>,
        }
    };
    let tokens = record_impl(&parse_input(&input)?).to_string();
    ensure!(
        tokens.contains("type Key = deps :: patchwise :: NoIdentity"),
        "aliased crate path not used: {tokens}"
    );
    Ok(())
}

#[rstest]
fn generated_calls_use_the_absolute_runtime_path() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        #[patch(target = Address)]
        struct AddressPatch {
            city: OptionalValue<String>,
        }
    };
    let tokens = record_impl(&parse_input(&input)?).to_string();
    ensure!(
        tokens.contains(":: patchwise :: engine :: merge_nullable"),
        "default runtime path missing: {tokens}"
    );
    Ok(())
}
