//! The structural merge engine.
//!
//! [`Merger`] walks a [`PartialRecord`] against its target entity and
//! resolves each field according to its presence state:
//!
//! * `Unset` leaves the target field untouched;
//! * `Null` clears a nullable scalar, detaches a nested record or empties a
//!   collection;
//! * `Present` overwrites a scalar after validation, recurses into a nested
//!   record (creating it first when missing) or applies the configured
//!   [`CollectionStrategy`](crate::CollectionStrategy).
//!
//! The free functions in this module are the per-field rules used by the
//! `PartialRecord` derive.

use std::{any::Any, sync::Arc};

use tracing::{debug, debug_span, trace, warn};

use crate::{
    AcceptAll, AssociationHooks, CollectionStrategy, ErrorMode, FieldPath, FieldValue,
    MergeError, MergeOptions, NoHooks, OptionalValue, PartialRecord, PatchResult,
    ValidationResultExt, Validator, collection, path::Segment,
};

/// Builds a missing nested record at the given path.
pub type Factory<T> = fn(&FieldPath) -> PatchResult<T>;

/// Factory that builds `T::default()`.
///
/// # Errors
///
/// Never fails.
pub fn default_factory<T: Default>(_path: &FieldPath) -> PatchResult<T> {
    Ok(T::default())
}

/// State carried through one merge call.
pub struct MergeContext<'a> {
    options: &'a MergeOptions,
    validator: &'a dyn Validator,
    hooks: &'a mut dyn AssociationHooks,
    path: FieldPath,
    depth: usize,
    errors: Vec<Arc<MergeError>>,
}

impl<'a> MergeContext<'a> {
    pub(crate) fn new(
        options: &'a MergeOptions,
        validator: &'a dyn Validator,
        hooks: &'a mut dyn AssociationHooks,
    ) -> Self {
        Self {
            options,
            validator,
            hooks,
            path: FieldPath::root(),
            depth: 0,
            errors: Vec::new(),
        }
    }

    /// Path of the field currently being resolved.
    #[must_use]
    pub const fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Options for this merge call.
    #[must_use]
    pub const fn options(&self) -> &MergeOptions {
        self.options
    }

    /// Number of nested records entered above the current field.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Whether resolved values are still written to the target.
    ///
    /// Becomes `false` once collect-all mode records a failure. The rest of
    /// the walk then validates fields without writing them.
    #[must_use]
    pub const fn is_writing(&self) -> bool {
        self.errors.is_empty()
    }

    /// Resolve the field `name` of the current record.
    ///
    /// In [`ErrorMode::CollectAll`] a field-level failure is recorded and
    /// the walk continues with `Ok(())`, validating without writing.
    ///
    /// # Errors
    ///
    /// Returns the failure produced by `resolve` in fail-fast mode.
    pub fn field<F>(&mut self, name: &str, resolve: F) -> PatchResult<()>
    where
        F: FnOnce(&mut Self) -> PatchResult<()>,
    {
        self.scoped(Segment::Field(name.to_owned()), resolve)
    }

    pub(crate) fn element<F>(&mut self, segment: Segment, resolve: F) -> PatchResult<()>
    where
        F: FnOnce(&mut Self) -> PatchResult<()>,
    {
        self.scoped(segment, resolve)
    }

    fn scoped<F>(&mut self, segment: Segment, resolve: F) -> PatchResult<()>
    where
        F: FnOnce(&mut Self) -> PatchResult<()>,
    {
        self.path.push(segment);
        let outcome = match resolve(self) {
            Err(err) if self.options.mode == ErrorMode::CollectAll && err.is_field_level() => {
                trace!(field = %self.path, error = %err, "recorded field failure");
                if self.errors.is_empty() {
                    debug!(field = %self.path, "writes suspended after first failure");
                }
                self.errors.push(err);
                Ok(())
            }
            other => other,
        };
        self.path.pop();
        outcome
    }

    /// Merge `patch` into the nested record `target`.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::UnknownFieldShape`] when the configured
    /// `max_depth` would be exceeded, or any failure from the nested walk.
    pub fn descend<P: PartialRecord>(&mut self, patch: P, target: &mut P::Target) -> PatchResult<()> {
        if let Some(limit) = self.options.max_depth
            && self.depth >= limit
        {
            return Err(Arc::new(MergeError::unknown_shape(
                self.path.clone(),
                format!("at most {limit} nested levels"),
                "a deeper nested record",
            )));
        }
        self.depth += 1;
        let outcome = patch.merge_into(target, self);
        self.depth -= 1;
        outcome
    }

    /// Run the validator against a present value at the current path.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::ValidationFailed`] when the validator rejects
    /// the value.
    pub fn validate<T: Any>(&self, value: &T) -> PatchResult<()> {
        self.validator
            .validate(&self.path, FieldValue::new(value))
            .at_path(&self.path)
    }

    /// Notify the hooks that a nested record was created at the current path.
    pub fn created(&mut self) {
        debug!(field = %self.path, "created nested record");
        self.hooks.created(&self.path);
    }

    /// Ask the hooks to detach the nested record at the current path.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::DetachNotSupported`] when the hooks refuse.
    pub fn detach(&mut self) -> PatchResult<()> {
        self.hooks.detach(&self.path).map_err(|refusal| {
            Arc::new(MergeError::detach_not_supported(
                self.path.clone(),
                refusal.reason(),
            ))
        })?;
        debug!(field = %self.path, "detached nested record");
        Ok(())
    }

    /// Strategy configured for the collection at the current path.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::MissingCollectionStrategy`] when none is
    /// configured.
    pub fn collection_strategy(&self) -> PatchResult<CollectionStrategy> {
        self.options
            .collection_strategy(&self.path.schema_key())
            .ok_or_else(|| {
                Arc::new(MergeError::MissingCollectionStrategy {
                    path: self.path.clone(),
                })
            })
    }

    fn resolved(&self, action: &'static str) {
        trace!(field = %self.path, action, "resolved field");
    }

    fn finish(self, outcome: PatchResult<()>) -> PatchResult<()> {
        outcome?;
        MergeError::try_aggregate(self.errors).map_or(Ok(()), |err| Err(Arc::new(err)))
    }
}

/// Resolve a nullable scalar field.
///
/// # Errors
///
/// Returns [`MergeError::ValidationFailed`] when a present value is rejected.
pub fn merge_nullable<T: Any>(
    target: &mut Option<T>,
    patch: OptionalValue<T>,
    cx: &mut MergeContext<'_>,
) -> PatchResult<()> {
    match patch {
        OptionalValue::Unset => cx.resolved("kept"),
        OptionalValue::Null => {
            if cx.is_writing() {
                *target = None;
            }
            cx.resolved("cleared");
        }
        OptionalValue::Present(value) => {
            cx.validate(&value)?;
            if cx.is_writing() {
                *target = Some(value);
            }
            cx.resolved("overwritten");
        }
    }
    Ok(())
}

/// Resolve a scalar field that does not admit null.
///
/// # Errors
///
/// Returns [`MergeError::TypeError`] for `Null` and
/// [`MergeError::ValidationFailed`] when a present value is rejected.
pub fn merge_required<T: Any>(
    target: &mut T,
    patch: OptionalValue<T>,
    cx: &mut MergeContext<'_>,
) -> PatchResult<()> {
    match patch {
        OptionalValue::Unset => cx.resolved("kept"),
        OptionalValue::Null => {
            return Err(Arc::new(MergeError::type_error(
                cx.path().clone(),
                "field does not admit null",
            )));
        }
        OptionalValue::Present(value) => {
            cx.validate(&value)?;
            if cx.is_writing() {
                *target = value;
            }
            cx.resolved("overwritten");
        }
    }
    Ok(())
}

/// Resolve a detachable nested record.
///
/// A missing record is built by `create` and only attached, with a
/// [`AssociationHooks::created`] notification, once its fields merged
/// cleanly.
///
/// # Errors
///
/// Returns [`MergeError::DetachNotSupported`] when the hooks refuse a
/// detachment, or any failure from the factory or the nested walk.
pub fn merge_nested<P: PartialRecord>(
    target: &mut Option<P::Target>,
    patch: OptionalValue<P>,
    cx: &mut MergeContext<'_>,
    create: Factory<P::Target>,
) -> PatchResult<()> {
    match patch {
        OptionalValue::Unset => {
            cx.resolved("kept");
            Ok(())
        }
        OptionalValue::Null => {
            if target.is_some() && cx.is_writing() {
                cx.detach()?;
                *target = None;
            }
            cx.resolved("detached");
            Ok(())
        }
        OptionalValue::Present(nested) => {
            cx.resolved("merged");
            if let Some(existing) = target.as_mut() {
                return cx.descend(nested, existing);
            }
            let mut record = create(cx.path())?;
            cx.descend(nested, &mut record)?;
            if cx.is_writing() {
                cx.created();
                *target = Some(record);
            }
            Ok(())
        }
    }
}

/// Resolve a nested record that must always exist.
///
/// # Errors
///
/// Returns [`MergeError::DetachNotSupported`] for `Null`, or any failure
/// from the nested walk.
pub fn merge_association<P: PartialRecord>(
    target: &mut P::Target,
    patch: OptionalValue<P>,
    cx: &mut MergeContext<'_>,
) -> PatchResult<()> {
    match patch {
        OptionalValue::Unset => {
            cx.resolved("kept");
            Ok(())
        }
        OptionalValue::Null => Err(Arc::new(MergeError::detach_not_supported(
            cx.path().clone(),
            "required association",
        ))),
        OptionalValue::Present(nested) => {
            cx.resolved("merged");
            cx.descend(nested, target)
        }
    }
}

/// Resolve a collection of nested records.
///
/// `Null` asks the hooks to detach every element before emptying the
/// collection.
///
/// # Errors
///
/// Returns [`MergeError::MissingCollectionStrategy`] when a present patch
/// has no configured strategy, [`MergeError::DetachNotSupported`] when the
/// hooks refuse to release an element, or any failure from an element.
pub fn merge_collection<P: PartialRecord>(
    target: &mut Vec<P::Target>,
    patch: OptionalValue<Vec<P>>,
    cx: &mut MergeContext<'_>,
    create: Factory<P::Target>,
) -> PatchResult<()> {
    match patch {
        OptionalValue::Unset => {
            cx.resolved("kept");
            Ok(())
        }
        OptionalValue::Null => {
            if cx.is_writing() {
                collection::release::<P>(target, cx)?;
                if cx.is_writing() {
                    target.clear();
                }
            }
            cx.resolved("emptied");
            Ok(())
        }
        OptionalValue::Present(entries) => {
            let strategy = cx.collection_strategy()?;
            collection::apply(strategy, target, entries, cx, create)
        }
    }
}

/// Applies partial records to entities.
///
/// # Examples
///
/// ```rust
/// use patchwise::{Merger, MergeOptions, OptionalValue, PartialRecord};
///
/// #[derive(Clone, Debug, Default, PartialEq)]
/// struct Profile {
///     bio: Option<String>,
/// }
///
/// #[derive(Default, PartialRecord)]
/// #[patch(target = Profile)]
/// struct ProfilePatch {
///     bio: OptionalValue<String>,
/// }
///
/// let original = Profile { bio: Some("hello".into()) };
/// let patch = ProfilePatch { bio: OptionalValue::Null };
/// let updated = Merger::new(MergeOptions::default())
///     .merged(&original, patch)
///     .expect("merge succeeds");
/// assert_eq!(updated.bio, None);
/// assert_eq!(original.bio.as_deref(), Some("hello"));
/// ```
pub struct Merger<'a> {
    options: MergeOptions,
    validator: &'a dyn Validator,
    hooks: Option<&'a mut dyn AssociationHooks>,
}

impl Default for Merger<'_> {
    fn default() -> Self {
        Self::new(MergeOptions::default())
    }
}

impl<'a> Merger<'a> {
    /// Create a merger that accepts every value and uses no hooks.
    #[must_use]
    pub fn new(options: MergeOptions) -> Self {
        Self {
            options,
            validator: &AcceptAll,
            hooks: None,
        }
    }

    /// Validate present scalars with `validator`.
    #[must_use]
    pub fn with_validator(mut self, validator: &'a dyn Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Notify `hooks` of created and detached nested records.
    #[must_use]
    pub fn with_hooks(mut self, hooks: &'a mut dyn AssociationHooks) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Options used by this merger.
    #[must_use]
    pub const fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Merge `patch` into `target` in place.
    ///
    /// Fields resolved before a failure stay applied. Nothing is written
    /// after it: fail-fast mode stops, and collect-all mode only validates
    /// the remaining fields. Use [`Merger::merged`] when `target` must
    /// remain untouched on failure.
    ///
    /// # Errors
    ///
    /// Returns the first failure in fail-fast mode, or every failure wrapped
    /// in [`MergeError::Aggregate`] in collect-all mode.
    pub fn apply<P: PartialRecord>(&mut self, target: &mut P::Target, patch: P) -> PatchResult<()> {
        let span = debug_span!("patchwise.merge", record = std::any::type_name::<P>());
        let _entered = span.enter();
        let mut fallback = NoHooks;
        let hooks: &mut dyn AssociationHooks = match self.hooks {
            Some(ref mut attached) => &mut **attached,
            None => &mut fallback,
        };
        let mut cx = MergeContext::new(&self.options, self.validator, hooks);
        let walked = patch.merge_into(target, &mut cx);
        let outcome = cx.finish(walked);
        if let Err(err) = &outcome {
            warn!(error = %err, "merge failed");
        }
        outcome
    }

    /// Merge `patch` into a clone of `target` and return the result.
    ///
    /// # Errors
    ///
    /// As [`Merger::apply`]; `target` is never modified.
    pub fn merged<P>(&mut self, target: &P::Target, patch: P) -> PatchResult<P::Target>
    where
        P: PartialRecord,
        P::Target: Clone,
    {
        let mut updated = target.clone();
        self.apply(&mut updated, patch)?;
        Ok(updated)
    }
}

/// Merge `patch` into `target` with default options and no collaborators.
///
/// # Errors
///
/// Returns the first failing field.
pub fn merge<P: PartialRecord>(target: &mut P::Target, patch: P) -> PatchResult<()> {
    Merger::default().apply(target, patch)
}
