//! Step definitions for the customer merge scenarios.

use super::fixtures::MergeWorld;
use anyhow::{Result, anyhow, ensure};
use patchwise::{CollectionStrategy, Merger};
use rstest_bdd_macros::{given, then, when};
use serde_json::{Map, Value, json};
use test_helpers::{
    collaborators::{RecordingHooks, customer_rules},
    fixtures::{Customer, customer_patch, sample_customer},
    text::{json_scalar, optional_text, unquote},
};

fn set_dotted(document: &mut Map<String, Value>, dotted: &str, value: Value) {
    match dotted.split_once('.') {
        None => {
            document.insert(dotted.to_owned(), value);
        }
        Some((head, rest)) => {
            let slot = document
                .entry(head.to_owned())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(nested) = slot {
                set_dotted(nested, rest, value);
            }
        }
    }
}

fn customer_field(customer: &Customer, field: &str) -> Result<Option<String>> {
    let address = customer.address.as_ref();
    Ok(match field {
        "name" => Some(customer.name.clone()),
        "email" => customer.email.clone(),
        "dateOfBirth" => customer.date_of_birth.clone(),
        "account.tier" => Some(customer.account.tier.clone()),
        "address.street" => address.and_then(|found| found.street.clone()),
        "address.city" => address.and_then(|found| found.city.clone()),
        "address.zipcode" => address.and_then(|found| found.zipcode.clone()),
        other => return Err(anyhow!("unknown customer field '{other}'")),
    })
}

fn strategy_named(name: &str) -> Result<CollectionStrategy> {
    match name {
        "replace" => Ok(CollectionStrategy::Replace),
        "append" => Ok(CollectionStrategy::Append),
        "positional" => Ok(CollectionStrategy::Positional),
        "keyed" => Ok(CollectionStrategy::keyed()),
        "exclusive keyed" => Ok(CollectionStrategy::keyed_exclusive()),
        other => Err(anyhow!("unknown collection strategy '{other}'")),
    }
}

fn customer_of(merge_world: &MergeWorld) -> Result<Customer> {
    merge_world
        .customer
        .with_ref(Clone::clone)
        .ok_or_else(|| anyhow!("customer missing"))
}

#[given("the sample customer")]
fn sample(merge_world: &MergeWorld) {
    merge_world.customer.set(sample_customer());
}

#[given("the customer has no address")]
fn without_address(merge_world: &MergeWorld) -> Result<()> {
    let mut customer = customer_of(merge_world)?;
    customer.address = None;
    merge_world.customer.set(customer);
    Ok(())
}

#[given("the patch sets {field} to {value}")]
fn patch_field(merge_world: &MergeWorld, field: String, value: String) -> Result<()> {
    let scalar = json_scalar(&value).ok_or_else(|| anyhow!("use a field-free patch for unset"))?;
    let mut document = merge_world.document.take().unwrap_or_default();
    set_dotted(&mut document, &field, scalar);
    merge_world.document.set(document);
    Ok(())
}

#[given("the patch lists line {sku} with quantity {quantity:u32}")]
fn patch_line(merge_world: &MergeWorld, sku: String, quantity: u32) -> Result<()> {
    let mut document = merge_world.document.take().unwrap_or_default();
    let lines = document
        .entry("lines".to_owned())
        .or_insert_with(|| Value::Array(Vec::new()));
    let Value::Array(entries) = lines else {
        return Err(anyhow!("lines already set to a non-list value"));
    };
    entries.push(json!({ "sku": unquote(&sku), "quantity": quantity }));
    merge_world.document.set(document);
    Ok(())
}

#[given("lines are merged with the {strategy} strategy")]
fn lines_strategy(merge_world: &MergeWorld, strategy: String) -> Result<()> {
    let options = merge_world
        .take_options()
        .with_collection("lines", strategy_named(&strategy)?);
    merge_world.options.set(options);
    Ok(())
}

#[given("the customer rules are enforced")]
fn enforce_rules(merge_world: &MergeWorld) {
    merge_world.validated.set(true);
}

#[given("detaching {path} is refused")]
fn refuse_detach(merge_world: &MergeWorld, path: String) {
    let mut refused = merge_world.refused.take().unwrap_or_default();
    refused.push(unquote(&path).to_owned());
    merge_world.refused.set(refused);
}

#[given("errors are collected")]
fn collect_errors(merge_world: &MergeWorld) {
    merge_world.collect_errors();
}

#[when("the patch is merged")]
fn merge_patch(merge_world: &MergeWorld) -> Result<()> {
    let customer = customer_of(merge_world)?;
    let document = merge_world.document.take().unwrap_or_default();
    let patch = customer_patch(Value::Object(document))?;
    let rules = customer_rules();
    let mut hooks = RecordingHooks::refusing(merge_world.refused.take().unwrap_or_default());
    let mut merger = Merger::new(merge_world.take_options()).with_hooks(&mut hooks);
    if merge_world.validated.take().unwrap_or(false) {
        merger = merger.with_validator(&rules);
    }
    let outcome = merger.merged(&customer, patch).map(|updated| {
        merge_world.customer.set(updated);
    });
    merge_world.hooks.set(hooks);
    merge_world.outcome.set(outcome);
    Ok(())
}

#[then("the merge succeeds")]
fn merge_succeeds(merge_world: &MergeWorld) -> Result<()> {
    let outcome = merge_world
        .outcome
        .take()
        .ok_or_else(|| anyhow!("merge result missing"))?;
    outcome.map_err(|err| anyhow!("merge failed: {err}"))
}

#[then("the merge fails at {paths}")]
fn merge_fails(merge_world: &MergeWorld, paths: String) -> Result<()> {
    let err = merge_world
        .outcome
        .with_ref(|outcome| outcome.clone().err())
        .ok_or_else(|| anyhow!("merge result missing"))?
        .ok_or_else(|| anyhow!("expected the merge to fail"))?;
    let found: Vec<String> = err.failing_paths().iter().map(ToString::to_string).collect();
    let expected: Vec<&str> = unquote(&paths).split(", ").collect();
    ensure!(found == expected, "failing paths {found:?}, expected {expected:?}: {err}");
    Ok(())
}

#[then("the customer {field} is {value}")]
fn customer_field_is(merge_world: &MergeWorld, field: String, value: String) -> Result<()> {
    let customer = customer_of(merge_world)?;
    let actual = customer_field(&customer, &field)?;
    let expected = optional_text(&value).into_present();
    ensure!(actual == expected, "{field} is {actual:?}, expected {expected:?}");
    Ok(())
}

#[then("the customer has no address")]
fn address_detached(merge_world: &MergeWorld) -> Result<()> {
    let customer = customer_of(merge_world)?;
    ensure!(customer.address.is_none(), "address still attached");
    Ok(())
}

#[then("the customer is unchanged")]
fn customer_unchanged(merge_world: &MergeWorld) -> Result<()> {
    let customer = customer_of(merge_world)?;
    ensure!(customer == sample_customer(), "customer changed: {customer:?}");
    Ok(())
}

#[then("the lines are {lines}")]
fn lines_are(merge_world: &MergeWorld, lines: String) -> Result<()> {
    let customer = customer_of(merge_world)?;
    let found: Vec<String> = customer
        .lines
        .iter()
        .map(|entry| format!("{}x{}", entry.sku, entry.quantity))
        .collect();
    let expected: Vec<&str> = unquote(&lines)
        .split(", ")
        .filter(|entry| !entry.is_empty())
        .collect();
    ensure!(found == expected, "lines are {found:?}, expected {expected:?}");
    Ok(())
}

#[then("the hooks {action} {path}")]
fn hooks_saw(merge_world: &MergeWorld, action: String, path: String) -> Result<()> {
    let seen = merge_world
        .hooks
        .with_ref(|hooks| match action.as_str() {
            "created" => Ok(hooks.created.clone()),
            "detached" => Ok(hooks.detached.clone()),
            other => Err(anyhow!("unknown hook action '{other}'")),
        })
        .ok_or_else(|| anyhow!("hooks missing"))??;
    let wanted = unquote(&path);
    ensure!(seen.iter().any(|entry| entry == wanted), "hooks saw {seen:?}");
    Ok(())
}
