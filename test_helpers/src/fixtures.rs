//! Sample customer domain shared by integration and behavioural tests.
//!
//! Entities follow the shapes the merge engine expects: nullable scalars are
//! `Option<T>`, required scalars are plain values, the address is a
//! detachable nested record, the account is a required association and
//! order lines form a keyed collection.

use anyhow::{Context, Result};
use patchwise::{OptionalValue, PartialRecord};
use serde::Deserialize;
use serde_json::Value;

/// Postal address attached to a customer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Address {
    /// Street line.
    pub street: Option<String>,
    /// City name.
    pub city: Option<String>,
    /// Postal code.
    pub zipcode: Option<String>,
}

/// Billing account every customer must have.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Account {
    /// Plan name.
    pub tier: String,
    /// Optional credit limit.
    pub credit: Option<u32>,
}

/// One line of a standing order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderLine {
    /// Stock keeping unit identifying the line.
    pub sku: String,
    /// Ordered quantity.
    pub quantity: u32,
    /// Free-form note.
    pub note: Option<String>,
}

/// Persisted customer record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Customer {
    /// Display name; never null.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// ISO-8601 date of birth.
    pub date_of_birth: Option<String>,
    /// Postal address.
    pub address: Option<Address>,
    /// Billing account.
    pub account: Account,
    /// Standing order lines.
    pub lines: Vec<OrderLine>,
}

/// Partial update for [`Address`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize, PartialRecord)]
#[serde(default)]
#[patch(target = Address)]
pub struct AddressPatch {
    /// Street update.
    pub street: OptionalValue<String>,
    /// City update.
    pub city: OptionalValue<String>,
    /// Postal code update.
    pub zipcode: OptionalValue<String>,
}

/// Partial update for [`Account`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize, PartialRecord)]
#[serde(default)]
#[patch(target = Account)]
pub struct AccountPatch {
    /// Plan update.
    #[patch(required)]
    pub tier: OptionalValue<String>,
    /// Credit limit update.
    pub credit: OptionalValue<u32>,
}

/// Partial update for one [`OrderLine`], matched by SKU.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, PartialRecord)]
#[serde(default)]
#[patch(target = OrderLine)]
pub struct OrderLinePatch {
    /// Identity of the line.
    #[patch(key, required)]
    pub sku: OptionalValue<String>,
    /// Quantity update.
    #[patch(required)]
    pub quantity: OptionalValue<u32>,
    /// Note update.
    pub note: OptionalValue<String>,
}

/// Partial update for [`Customer`].
///
/// Wire names are camel case, so the date of birth travels as
/// `dateOfBirth` and is reported under that name in field paths.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, PartialRecord)]
#[serde(default, rename_all = "camelCase")]
#[patch(target = Customer)]
pub struct CustomerPatch {
    /// Name update.
    #[patch(required)]
    pub name: OptionalValue<String>,
    /// Email update.
    pub email: OptionalValue<String>,
    /// Date of birth update.
    #[patch(rename = "dateOfBirth")]
    pub date_of_birth: OptionalValue<String>,
    /// Address update.
    #[patch(nested, create = "new_address")]
    pub address: OptionalValue<AddressPatch>,
    /// Account update.
    #[patch(nested, required)]
    pub account: OptionalValue<AccountPatch>,
    /// Order line updates.
    #[patch(collection)]
    pub lines: OptionalValue<Vec<OrderLinePatch>>,
}

/// Factory for addresses created by a patch; new addresses start empty.
///
/// # Errors
///
/// Never fails.
pub fn new_address(_path: &patchwise::FieldPath) -> patchwise::PatchResult<Address> {
    Ok(Address::default())
}

/// A line with the given SKU and quantity.
#[must_use]
pub fn line(sku: &str, quantity: u32) -> OrderLine {
    OrderLine {
        sku: sku.to_owned(),
        quantity,
        note: None,
    }
}

/// The customer used by most scenarios.
///
/// `{name: "Ada", email: "a@x.com", dateOfBirth: null,
/// address: {street: "Main", city: "X"}, account: {tier: "basic"},
/// lines: [A1 x1, B2 x2]}`
#[must_use]
pub fn sample_customer() -> Customer {
    Customer {
        name: "Ada".to_owned(),
        email: Some("a@x.com".to_owned()),
        date_of_birth: None,
        address: Some(Address {
            street: Some("Main".to_owned()),
            city: Some("X".to_owned()),
            zipcode: None,
        }),
        account: Account {
            tier: "basic".to_owned(),
            credit: None,
        },
        lines: vec![line("A1", 1), line("B2", 2)],
    }
}

/// Deserialize a [`CustomerPatch`] from a JSON merge document.
///
/// # Errors
///
/// Returns an error when the document does not fit the patch shape.
pub fn customer_patch(document: Value) -> Result<CustomerPatch> {
    serde_json::from_value(document).context("deserialize customer patch")
}

/// A patch that only touches the given order lines.
#[must_use]
pub fn lines_patch(lines: Vec<OrderLinePatch>) -> CustomerPatch {
    CustomerPatch {
        lines: OptionalValue::Present(lines),
        ..CustomerPatch::default()
    }
}

/// A line patch identified by `sku` that sets the quantity.
#[must_use]
pub fn line_patch(sku: &str, quantity: u32) -> OrderLinePatch {
    OrderLinePatch {
        sku: OptionalValue::Present(sku.to_owned()),
        quantity: OptionalValue::Present(quantity),
        note: OptionalValue::Unset,
    }
}
