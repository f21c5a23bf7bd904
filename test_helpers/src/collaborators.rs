//! Recording collaborators for merge tests.

use std::collections::BTreeSet;

use patchwise::{AssociationHooks, DetachRefusal, FieldPath, Rules, ValidationFailure};

/// Association hooks that record every call and can refuse detachments.
///
/// # Examples
///
/// ```
/// use patchwise::{AssociationHooks, FieldPath};
/// use patchwise_test_helpers::collaborators::RecordingHooks;
///
/// let mut hooks = RecordingHooks::refusing(["address"]);
/// assert!(hooks.detach(&FieldPath::parse("address")).is_err());
/// assert!(hooks.detached.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RecordingHooks {
    /// Paths of created nested records, in call order.
    pub created: Vec<String>,
    /// Paths of detached nested records, in call order.
    pub detached: Vec<String>,
    refused: BTreeSet<String>,
}

impl RecordingHooks {
    /// Hooks that approve every detachment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hooks that refuse to detach the records at `paths`.
    #[must_use]
    pub fn refusing<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            refused: paths.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

impl AssociationHooks for RecordingHooks {
    fn created(&mut self, path: &FieldPath) {
        self.created.push(path.to_string());
    }

    fn detach(&mut self, path: &FieldPath) -> Result<(), DetachRefusal> {
        let rendered = path.to_string();
        if self.refused.contains(&rendered) {
            return Err(DetachRefusal::new("association is pinned"));
        }
        self.detached.push(rendered);
        Ok(())
    }
}

/// Validation rules for the customer fixtures.
///
/// - `email` must contain `@`;
/// - `address.zipcode` must be five ASCII digits;
/// - `lines.quantity` must be positive.
#[must_use]
pub fn customer_rules() -> Rules {
    Rules::new()
        .rule("email", |email: &String| {
            if email.contains('@') {
                Ok(())
            } else {
                Err(ValidationFailure::new("must contain '@'"))
            }
        })
        .rule("address.zipcode", |zipcode: &String| {
            if zipcode.len() == 5 && zipcode.bytes().all(|byte| byte.is_ascii_digit()) {
                Ok(())
            } else {
                Err(ValidationFailure::new("must be five digits"))
            }
        })
        .rule("lines.quantity", |quantity: &u32| {
            if *quantity > 0 {
                Ok(())
            } else {
                Err(ValidationFailure::new("must be positive"))
            }
        })
}
