//! Unit tests for error paths and aggregation behaviour.

use rstest::rstest;
use std::sync::Arc;

use super::{MergeError, ValidationFailure};
use crate::FieldPath;

fn validation_at(path: &str) -> MergeError {
    MergeError::validation(FieldPath::parse(path), ValidationFailure::new("rejected"))
}

#[rstest]
#[case::validation(validation_at("address.zipcode"), "address.zipcode")]
#[case::type_error(MergeError::type_error(FieldPath::parse("name"), "required"), "name")]
#[case::detach(
    MergeError::detach_not_supported(FieldPath::parse("owner"), "required association"),
    "owner"
)]
fn field_errors_expose_their_path(#[case] err: MergeError, #[case] expected: &str) {
    let path = err.path().map(ToString::to_string);
    assert_eq!(path.as_deref(), Some(expected));
    assert!(err.is_field_level());
}

#[test]
fn validation_display_names_the_full_path() {
    let err = validation_at("address.zipcode");
    assert_eq!(
        err.to_string(),
        "validation failed for 'address.zipcode': rejected"
    );
}

#[test]
fn config_errors_have_no_path() {
    let err = MergeError::config(figment::Error::from("boom"));
    assert!(err.path().is_none());
    assert!(!err.is_field_level());
}

fn run_aggregate_tests<F>(name: &str, runner: F)
where
    F: Fn(Vec<Arc<MergeError>>) -> MergeError,
{
    assert_single_owned(name, &runner);
    assert_single_shared(name, &runner);
    assert_multi_entry(name, &runner);
}

fn assert_single_owned<F>(name: &str, runner: &F)
where
    F: Fn(Vec<Arc<MergeError>>) -> MergeError,
{
    let outcome = runner(vec![Arc::new(validation_at("email"))]);
    assert!(
        matches!(outcome, MergeError::ValidationFailed { .. }),
        "{name}: expected ValidationFailed, got {outcome:?}"
    );
}

fn assert_single_shared<F>(name: &str, runner: &F)
where
    F: Fn(Vec<Arc<MergeError>>) -> MergeError,
{
    let shared = Arc::new(validation_at("email"));
    let outcome = runner(vec![Arc::clone(&shared)]);
    match outcome {
        MergeError::Aggregate(aggregate) => {
            assert_eq!(
                aggregate.len(),
                1,
                "{name}: expected single aggregate entry"
            );
        }
        other => panic!("{name}: expected Aggregate, got {other:?}"),
    }
}

fn assert_multi_entry<F>(name: &str, runner: &F)
where
    F: Fn(Vec<Arc<MergeError>>) -> MergeError,
{
    let first = Arc::new(validation_at("email"));
    let second = Arc::new(validation_at("address.city"));
    let outcome = runner(vec![first, second]);
    let paths: Vec<String> = outcome
        .failing_paths()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(paths, ["email", "address.city"], "{name}: paths differ");
    match outcome {
        MergeError::Aggregate(aggregate) => {
            let display = aggregate.to_string();
            assert_eq!(aggregate.iter().count(), 2, "{name}: borrowed iteration failed");
            let owned: Vec<_> = aggregate.into_iter().collect();
            assert_eq!(owned.len(), 2, "{name}: owned iteration failed");
            let entries: Vec<&str> = display.lines().collect();
            assert_eq!(entries.len(), 2, "{name}: one line per failure");
            assert!(
                entries.iter().all(|entry| entry.starts_with("  - validation failed")),
                "{name}: unexpected entries {entries:?}"
            );
        }
        other => panic!("{name}: expected Aggregate, got {other:?}"),
    }
}

#[test]
fn aggregate_panics_on_empty() {
    let empty: Vec<Arc<MergeError>> = vec![];
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        MergeError::aggregate(empty)
    }));
    assert!(result.is_err());
}

#[test]
fn try_aggregate_none_on_empty() {
    assert!(MergeError::try_aggregate(Vec::<Arc<MergeError>>::new()).is_none());
}

#[test]
fn both_aggregate_behaviours() {
    run_aggregate_tests("try_aggregate", |v| {
        MergeError::try_aggregate(v).map_or_else(
            || panic!("expected error aggregation to yield a value"),
            |err| err,
        )
    });
    run_aggregate_tests("aggregate", MergeError::aggregate);
}
