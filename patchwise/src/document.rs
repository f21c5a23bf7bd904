//! JSON merge documents for untyped records.
//!
//! Feed ingestion often lands records as raw [`serde_json::Value`]s with no
//! DTO to derive on. These helpers apply a JSON merge document directly:
//! objects merge key by key, `null` removes the key and any other value
//! replaces the target wholesale.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{FieldPath, MergeError, PatchResult, path::Segment, presence::kind};

/// How object patches treat targets that are not objects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DocumentMode {
    /// Replace a non-object target with an empty object before merging.
    #[default]
    Lenient,
    /// Reject object patches aimed at scalars or arrays.
    Strict,
}

/// Apply `patch` onto `target` in lenient mode.
///
/// # Examples
///
/// ```rust
/// use patchwise::document::merge_patch;
/// use serde_json::json;
///
/// let mut record = json!({"name": "Ada", "address": {"city": "X", "zip": "1"}});
/// merge_patch(&mut record, json!({"address": {"city": "Y", "zip": null}}));
/// assert_eq!(record, json!({"name": "Ada", "address": {"city": "Y"}}));
/// ```
pub fn merge_patch(target: &mut Value, patch: Value) {
    // Lenient merges never fail.
    merge_document(target, patch, DocumentMode::Lenient).unwrap_or_default();
}

/// Apply `patch` onto `target` using `mode`.
///
/// # Errors
///
/// In [`DocumentMode::Strict`], returns [`MergeError::UnknownFieldShape`]
/// naming the path of the first scalar or array that an object patch was
/// aimed at. Keys merged before the failure stay applied.
///
/// # Examples
///
/// ```rust
/// use patchwise::document::{DocumentMode, merge_document};
/// use serde_json::json;
///
/// let mut record = json!({"address": "Main Street"});
/// let err = merge_document(&mut record, json!({"address": {"city": "Y"}}), DocumentMode::Strict)
///     .expect_err("scalar cannot take an object patch");
/// assert_eq!(err.path().map(ToString::to_string).as_deref(), Some("address"));
/// ```
pub fn merge_document(target: &mut Value, patch: Value, mode: DocumentMode) -> PatchResult<()> {
    let mut path = FieldPath::root();
    merge_value(target, patch, mode, &mut path)
}

fn merge_value(
    target: &mut Value,
    patch: Value,
    mode: DocumentMode,
    path: &mut FieldPath,
) -> PatchResult<()> {
    match patch {
        Value::Object(map) => merge_object(target, map, mode, path),
        other => {
            *target = other;
            Ok(())
        }
    }
}

fn merge_object(
    target: &mut Value,
    map: Map<String, Value>,
    mode: DocumentMode,
    path: &mut FieldPath,
) -> PatchResult<()> {
    if !target.is_object() {
        if mode == DocumentMode::Strict && !target.is_null() {
            return Err(Arc::new(MergeError::unknown_shape(
                path.clone(),
                "an object",
                kind(target),
            )));
        }
        *target = Value::Object(Map::new());
    }

    let Some(target_map) = target.as_object_mut() else {
        return Ok(());
    };

    for (key, value) in map {
        if value.is_null() {
            target_map.remove(&key);
            continue;
        }
        path.push(Segment::Field(key.clone()));
        let outcome = match target_map.get_mut(&key) {
            Some(existing) => merge_value(existing, value, mode, path),
            None => {
                let mut fresh = Value::Null;
                let merged = merge_value(&mut fresh, value, mode, path);
                target_map.insert(key, fresh);
                merged
            }
        };
        path.pop();
        outcome?;
    }
    Ok(())
}
