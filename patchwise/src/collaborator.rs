//! Collaborator seams invoked by the merge engine.
//!
//! The engine owns none of the business rules: validators decide whether a
//! present scalar is acceptable and association hooks observe (or refuse)
//! the creation and detachment of nested records.

use std::{any::Any, collections::HashMap, fmt};

use crate::{DetachRefusal, FieldPath, ValidationFailure};

/// Type-erased view of a present scalar handed to a [`Validator`].
#[derive(Clone, Copy)]
pub struct FieldValue<'a> {
    value: &'a dyn Any,
    type_name: &'static str,
}

impl<'a> FieldValue<'a> {
    /// Wrap a borrowed value.
    #[must_use]
    pub fn new<T: Any>(value: &'a T) -> Self {
        Self {
            value,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Borrow the value as `T`, if that is its concrete type.
    #[must_use]
    pub fn downcast<T: Any>(&self) -> Option<&'a T> {
        self.value.downcast_ref::<T>()
    }

    /// Name of the concrete type, for diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Checks present scalars before they are written to the target.
///
/// A rejection aborts the merge of the record and is reported as
/// [`crate::MergeError::ValidationFailed`] at `path`.
pub trait Validator {
    /// Accept or reject `value` for the field at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationFailure`] describing why the value is rejected.
    fn validate(&self, path: &FieldPath, value: FieldValue<'_>) -> Result<(), ValidationFailure>;
}

/// Validator that accepts every value.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl Validator for AcceptAll {
    fn validate(&self, _path: &FieldPath, _value: FieldValue<'_>) -> Result<(), ValidationFailure> {
        Ok(())
    }
}

type Rule = Box<dyn Fn(FieldValue<'_>) -> Result<(), ValidationFailure> + Send + Sync>;

/// Registry of typed validation rules keyed by dotted field path.
///
/// Rules are matched against [`FieldPath::schema_key`], so a rule for
/// `lines.sku` applies to every element of the `lines` collection.
///
/// # Examples
///
/// ```rust
/// use patchwise::{FieldPath, FieldValue, Rules, ValidationFailure, Validator};
///
/// let rules = Rules::new().rule("email", |email: &String| {
///     if email.contains('@') {
///         Ok(())
///     } else {
///         Err(ValidationFailure::new("must contain '@'"))
///     }
/// });
///
/// let path = FieldPath::parse("email");
/// let bad = String::from("not-an-email");
/// assert!(rules.validate(&path, FieldValue::new(&bad)).is_err());
/// ```
#[derive(Default)]
pub struct Rules {
    rules: HashMap<String, Vec<Rule>>,
}

impl Rules {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `check` for the field at `path`.
    ///
    /// A value whose concrete type is not `T` is rejected so mismatched
    /// registrations surface instead of passing silently.
    #[must_use]
    pub fn rule<T, F>(mut self, path: impl Into<String>, check: F) -> Self
    where
        T: Any,
        F: Fn(&T) -> Result<(), ValidationFailure> + Send + Sync + 'static,
    {
        let rule: Rule = Box::new(move |value: FieldValue<'_>| {
            value.downcast::<T>().map_or_else(
                || {
                    Err(ValidationFailure::new(format!(
                        "rule expects {}, field holds {}",
                        std::any::type_name::<T>(),
                        value.type_name()
                    )))
                },
                &check,
            )
        });
        self.rules.entry(path.into()).or_default().push(rule);
        self
    }

    /// Number of field paths with at least one rule.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` when no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<_> = self.rules.keys().collect();
        paths.sort();
        f.debug_struct("Rules").field("paths", &paths).finish()
    }
}

impl Validator for Rules {
    fn validate(&self, path: &FieldPath, value: FieldValue<'_>) -> Result<(), ValidationFailure> {
        self.rules
            .get(&path.schema_key())
            .map_or(Ok(()), |rules| rules.iter().try_for_each(|rule| rule(value)))
    }
}

/// Persistence-side hooks for nested associations.
///
/// `created` runs after a missing nested record has been built by its
/// factory; `detach` runs before an existing nested record is removed in
/// response to an explicit null.
pub trait AssociationHooks {
    /// Observe the creation of a nested record at `path`.
    fn created(&mut self, path: &FieldPath) {
        let _ = path;
    }

    /// Approve the removal of the nested record at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`DetachRefusal`] when the association cannot be removed;
    /// the merge then fails with [`crate::MergeError::DetachNotSupported`].
    fn detach(&mut self, path: &FieldPath) -> Result<(), DetachRefusal> {
        let _ = path;
        Ok(())
    }
}

/// Hooks that observe nothing and approve every detachment.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl AssociationHooks for NoHooks {}

#[cfg(test)]
mod tests {
    use super::{FieldValue, Rules, Validator};
    use crate::{FieldPath, ValidationFailure};

    fn min_length(len: usize) -> impl Fn(&String) -> Result<(), ValidationFailure> {
        move |value: &String| {
            if value.len() >= len {
                Ok(())
            } else {
                Err(ValidationFailure::new(format!("shorter than {len}")))
            }
        }
    }

    #[test]
    fn rules_apply_to_every_collection_element() {
        let rules = Rules::new().rule("lines.sku", min_length(3));
        let path = FieldPath::root().child("lines").index(4).child("sku");
        let short = String::from("ab");
        let err = rules
            .validate(&path, FieldValue::new(&short))
            .expect_err("short sku must fail");
        assert_eq!(err.message(), "shorter than 3");
    }

    #[test]
    fn rules_run_in_registration_order() {
        let rules = Rules::new()
            .rule("name", min_length(2))
            .rule("name", |value: &String| {
                if value.chars().all(char::is_alphabetic) {
                    Ok(())
                } else {
                    Err(ValidationFailure::new("letters only"))
                }
            });
        let path = FieldPath::parse("name");
        let digits = String::from("1234");
        let err = rules
            .validate(&path, FieldValue::new(&digits))
            .expect_err("digits must fail the second rule");
        assert_eq!(err.message(), "letters only");
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn mismatched_rule_type_is_rejected() {
        let rules = Rules::new().rule("age", |_: &u8| Ok(()));
        let path = FieldPath::parse("age");
        let err = rules
            .validate(&path, FieldValue::new(&String::from("ten")))
            .expect_err("type mismatch must fail");
        assert!(err.message().contains("u8"));
    }

    #[test]
    fn unregistered_paths_pass() {
        let rules = Rules::new();
        assert!(rules.is_empty());
        let path = FieldPath::parse("anything");
        assert!(rules.validate(&path, FieldValue::new(&1_u32)).is_ok());
    }
}
