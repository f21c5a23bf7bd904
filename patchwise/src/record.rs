//! The [`PartialRecord`] trait implemented by partial-update DTOs.
//!
//! Implementations are normally generated by `#[derive(PartialRecord)]`;
//! the derive resolves every field through the helpers in
//! [`crate::engine`] so the merge walk stays uniform across record types.

use std::{fmt, hash::Hash};

use crate::{FieldPath, MergeContext, OptionalValue, PatchResult};

/// A DTO whose fields carry presence-aware values for a target entity.
///
/// # Examples
///
/// ```rust
/// use patchwise::{OptionalValue, PartialRecord};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Customer {
///     email: String,
///     nickname: Option<String>,
/// }
///
/// #[derive(Default, PartialRecord)]
/// #[patch(target = Customer)]
/// struct CustomerPatch {
///     #[patch(required)]
///     email: OptionalValue<String>,
///     nickname: OptionalValue<String>,
/// }
///
/// let patch = CustomerPatch {
///     nickname: OptionalValue::Null,
///     ..CustomerPatch::default()
/// };
/// let paths: Vec<String> = patch.present_paths().iter().map(ToString::to_string).collect();
/// assert_eq!(paths, ["nickname"]);
/// ```
pub trait PartialRecord: Sized {
    /// Entity type the record is merged into.
    type Target;

    /// Identity used to match collection elements, or [`NoIdentity`].
    type Key: Clone + Eq + Hash + fmt::Debug + fmt::Display;

    /// Resolve every field of `self` onto `target`.
    ///
    /// # Errors
    ///
    /// Returns the first field failure, or in collect-all mode any failure
    /// that cannot be attributed to a single field.
    fn merge_into(self, target: &mut Self::Target, cx: &mut MergeContext<'_>) -> PatchResult<()>;

    /// Identity carried by this partial element, when it has one.
    fn identity(&self) -> Option<Self::Key> {
        None
    }

    /// Identity of an existing target element.
    fn target_identity(target: &Self::Target) -> Option<Self::Key> {
        let _ = target;
        None
    }

    /// Returns `true` when every field is [`OptionalValue::Unset`].
    fn is_unset(&self) -> bool;

    /// Append the path of every non-`Unset` leaf below `base` to `out`.
    fn collect_present_paths(&self, base: &FieldPath, out: &mut Vec<FieldPath>);

    /// Paths of every non-`Unset` leaf, in declaration order.
    ///
    /// A nested record that is present but carries no fields of its own is
    /// reported by its own path.
    fn present_paths(&self) -> Vec<FieldPath> {
        let mut out = Vec::new();
        self.collect_present_paths(&FieldPath::root(), &mut out);
        out
    }
}

/// Key type for records that are never matched by identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoIdentity {}

impl fmt::Display for NoIdentity {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

/// Record `path` when `value` is not `Unset`.
pub fn present_leaf<T>(value: &OptionalValue<T>, path: FieldPath, out: &mut Vec<FieldPath>) {
    if !value.is_unset() {
        out.push(path);
    }
}

/// Record the present paths of a nested record field.
pub fn present_nested<P: PartialRecord>(
    value: &OptionalValue<P>,
    path: FieldPath,
    out: &mut Vec<FieldPath>,
) {
    match value {
        OptionalValue::Unset => {}
        OptionalValue::Null => out.push(path),
        OptionalValue::Present(record) => record_paths(record, path, out),
    }
}

/// Record the present paths of a collection field, element by element.
pub fn present_collection<P: PartialRecord>(
    value: &OptionalValue<Vec<P>>,
    path: FieldPath,
    out: &mut Vec<FieldPath>,
) {
    match value {
        OptionalValue::Unset => {}
        OptionalValue::Present(items) if !items.is_empty() => {
            for (position, item) in items.iter().enumerate() {
                record_paths(item, path.index(position), out);
            }
        }
        OptionalValue::Null | OptionalValue::Present(_) => out.push(path),
    }
}

fn record_paths<P: PartialRecord>(record: &P, path: FieldPath, out: &mut Vec<FieldPath>) {
    if record.is_unset() {
        out.push(path);
    } else {
        record.collect_present_paths(&path, out);
    }
}
