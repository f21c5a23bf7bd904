//! Constructors and aggregation helpers for `MergeError`.

use std::sync::Arc;

use super::{AggregatedErrors, MergeError, ValidationFailure};
use crate::FieldPath;

impl MergeError {
    /// Tries to build a [`MergeError`] from an iterator of errors.
    ///
    /// The iterator is consumed eagerly. It returns:
    /// * `None` when no errors are supplied;
    /// * the inner error when a single [`Arc`] is uniquely owned;
    /// * [`Self::Aggregate`] containing that single [`Arc`] when the error is already shared; and
    /// * [`Self::Aggregate`] combining every error for two or more inputs.
    #[must_use]
    pub fn try_aggregate<I, E>(errors: I) -> Option<Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Self>>,
    {
        let mut arcs: Vec<Arc<Self>> = errors.into_iter().map(Into::into).collect();
        if arcs.is_empty() {
            return None;
        }
        Some(if arcs.len() == 1 {
            let last = arcs.pop()?;
            match Arc::try_unwrap(last) {
                Ok(err) => err,
                Err(shared) => Self::Aggregate(Box::new(AggregatedErrors::new(vec![shared]))),
            }
        } else {
            Self::Aggregate(Box::new(AggregatedErrors::new(arcs)))
        })
    }

    /// Build a [`MergeError`] from at least one error.
    ///
    /// # Panics
    ///
    /// Panics if `errors` is empty. Use [`MergeError::try_aggregate`] when the
    /// list may be empty.
    #[must_use]
    #[track_caller]
    pub fn aggregate<I, E>(errors: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Self>>,
    {
        Self::try_aggregate(errors).map_or_else(
            || panic!("aggregate requires at least one error"),
            |err| err,
        )
    }

    /// Construct a [`MergeError::ValidationFailed`].
    #[must_use]
    pub const fn validation(path: FieldPath, cause: ValidationFailure) -> Self {
        Self::ValidationFailed { path, cause }
    }

    /// Construct a [`MergeError::TypeError`].
    #[must_use]
    pub fn type_error(path: FieldPath, message: impl Into<String>) -> Self {
        Self::TypeError {
            path,
            message: message.into(),
        }
    }

    /// Construct a [`MergeError::InvalidValue`].
    #[must_use]
    pub fn invalid_value(path: FieldPath, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            path,
            message: message.into(),
        }
    }

    /// Construct a [`MergeError::UnknownFieldShape`].
    #[must_use]
    pub fn unknown_shape(
        path: FieldPath,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::UnknownFieldShape {
            path,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Construct a [`MergeError::DetachNotSupported`].
    #[must_use]
    pub fn detach_not_supported(path: FieldPath, reason: impl Into<String>) -> Self {
        Self::DetachNotSupported {
            path,
            reason: reason.into(),
        }
    }

    /// Construct a [`MergeError::Config`] from a [`figment::Error`].
    ///
    /// # Examples
    ///
    /// ```
    /// use patchwise::MergeError;
    /// let e = MergeError::config(figment::Error::from("boom"));
    /// assert!(matches!(e, MergeError::Config(_)));
    /// ```
    #[must_use]
    pub fn config(source: figment::Error) -> Self {
        Self::Config(Box::new(source))
    }
}
