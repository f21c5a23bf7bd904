//! Primary error enum for merge flows.

use figment::Error as FigmentError;
use thiserror::Error;

use super::aggregate::AggregatedErrors;
use crate::FieldPath;

/// Reason a validator rejected a present value.
///
/// # Examples
///
/// ```rust
/// use patchwise::ValidationFailure;
///
/// let cause = ValidationFailure::new("must contain '@'");
/// assert_eq!(cause.to_string(), "must contain '@'");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationFailure {
    message: String,
}

impl ValidationFailure {
    /// Build a failure carrying a human-readable explanation.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The explanation supplied by the validator.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Reason an association hook refused to detach a nested record.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct DetachRefusal {
    reason: String,
}

impl DetachRefusal {
    /// Build a refusal carrying a human-readable explanation.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The explanation supplied by the hook.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Errors that abort a merge.
///
/// Every field-level variant carries the dotted [`FieldPath`] of the field
/// that failed, so callers can point their own callers at the exact input.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MergeError {
    /// A field received a state its schema does not admit.
    #[error("type error at '{path}': {message}")]
    TypeError {
        /// Field that received the state.
        path: FieldPath,
        /// Human-readable explanation.
        message: String,
    },

    /// A value was itself a missing or null marker.
    #[error("invalid value at '{path}': {message}")]
    InvalidValue {
        /// Field that received the value.
        path: FieldPath,
        /// Human-readable explanation.
        message: String,
    },

    /// The partial input does not correspond to any resolution rule.
    #[error("unknown field shape at '{path}': expected {expected}, found {found}")]
    UnknownFieldShape {
        /// Field whose shape was not recognised.
        path: FieldPath,
        /// Shape the engine was prepared to resolve.
        expected: String,
        /// Shape found in the input.
        found: String,
    },

    /// A collaborator validator rejected a present value.
    #[error("validation failed for '{path}': {cause}")]
    ValidationFailed {
        /// Field that failed validation.
        path: FieldPath,
        /// Reason reported by the validator.
        #[source]
        cause: ValidationFailure,
    },

    /// `Null` was supplied for an association that cannot be detached.
    #[error("'{path}' does not support detachment: {reason}")]
    DetachNotSupported {
        /// Association that could not be detached.
        path: FieldPath,
        /// Reason the detachment was refused.
        reason: String,
    },

    /// A collection was supplied without a configured merge strategy.
    #[error("no collection strategy configured for '{path}'")]
    MissingCollectionStrategy {
        /// Collection field lacking a strategy.
        path: FieldPath,
    },

    /// Merge options could not be loaded.
    #[error("failed to load merge options: {0}")]
    Config(#[from] Box<FigmentError>),

    /// Multiple errors were collected during a single merge.
    #[error("multiple merge errors:\n{0}")]
    Aggregate(Box<AggregatedErrors>),
}

impl MergeError {
    /// The field path attached to a field-level error.
    ///
    /// Returns `None` for configuration failures and aggregates.
    #[must_use]
    pub const fn path(&self) -> Option<&FieldPath> {
        match self {
            Self::TypeError { path, .. }
            | Self::InvalidValue { path, .. }
            | Self::UnknownFieldShape { path, .. }
            | Self::ValidationFailed { path, .. }
            | Self::DetachNotSupported { path, .. }
            | Self::MissingCollectionStrategy { path } => Some(path),
            Self::Config(_) | Self::Aggregate(_) => None,
        }
    }

    /// Every field path reported by this error, expanding aggregates.
    #[must_use]
    pub fn failing_paths(&self) -> Vec<&FieldPath> {
        match self {
            Self::Aggregate(failures) => failures.paths().collect(),
            other => other.path().into_iter().collect(),
        }
    }

    /// Returns `true` for errors attached to a single field.
    ///
    /// Collect-all merges record these and continue with the next field.
    #[must_use]
    pub const fn is_field_level(&self) -> bool {
        self.path().is_some()
    }
}
