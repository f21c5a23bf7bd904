//! Failures gathered by a collect-all merge.

use std::{error::Error, fmt, slice, sync::Arc, vec};

use super::MergeError;
use crate::FieldPath;

/// Every failure recorded by one collect-all merge, in walk order.
///
/// # Examples
///
/// ```
/// use patchwise::{FieldPath, MergeError, ValidationFailure};
///
/// let err = MergeError::aggregate(vec![
///     MergeError::type_error(FieldPath::parse("name"), "field does not admit null"),
///     MergeError::validation(FieldPath::parse("email"), ValidationFailure::new("missing '@'")),
/// ]);
/// let MergeError::Aggregate(failures) = err else {
///     unreachable!("two failures are aggregated");
/// };
/// let paths: Vec<String> = failures.paths().map(ToString::to_string).collect();
/// assert_eq!(paths, ["name", "email"]);
/// ```
#[derive(Debug)]
pub struct AggregatedErrors(Vec<Arc<MergeError>>);

impl AggregatedErrors {
    /// Wrap failures recorded during a walk.
    #[must_use]
    pub const fn new(failures: Vec<Arc<MergeError>>) -> Self {
        Self(failures)
    }

    /// The recorded failures.
    #[must_use = "iterators should be consumed to inspect failures"]
    pub fn iter(&self) -> slice::Iter<'_, Arc<MergeError>> {
        self.0.iter()
    }

    /// Field paths of the recorded failures, expanding nested aggregates.
    #[must_use = "iterators should be consumed to inspect failures"]
    pub fn paths(&self) -> impl Iterator<Item = &FieldPath> {
        self.0.iter().flat_map(|failure| failure.failing_paths())
    }

    /// Number of recorded failures.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when nothing was recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// One failure per line; each message already names its field.
impl fmt::Display for AggregatedErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut failures = self.0.iter();
        if let Some(first) = failures.next() {
            write!(f, "  - {first}")?;
        }
        for failure in failures {
            write!(f, "\n  - {failure}")?;
        }
        Ok(())
    }
}

impl Error for AggregatedErrors {}

impl<'a> IntoIterator for &'a AggregatedErrors {
    type Item = &'a Arc<MergeError>;
    type IntoIter = slice::Iter<'a, Arc<MergeError>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for AggregatedErrors {
    type Item = Arc<MergeError>;
    type IntoIter = vec::IntoIter<Arc<MergeError>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
