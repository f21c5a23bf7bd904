//! Merge strategies for collections of nested records.
//!
//! There is no universally correct way to patch a sequence, so the engine
//! never picks one: every collection field needs a [`CollectionStrategy`]
//! registered in [`crate::MergeOptions`] under its dotted schema path.

use std::{collections::HashSet, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    MergeContext, MergeError, PartialRecord, PatchResult, engine::Factory, path::Segment,
};

/// How a present collection patch is applied to the target collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStrategy {
    /// Drop existing elements and build one fresh element per patch entry.
    ///
    /// Every dropped element is released through the association hooks.
    Replace,
    /// Build one fresh element per patch entry and append it.
    Append,
    /// Merge patch entry `i` into element `i`; extra entries are appended.
    Positional,
    /// Match entries to elements by identity and merge matches in place.
    ///
    /// Unmatched entries are inserted as fresh elements.
    Keyed {
        /// Also drop target elements that no patch entry matched.
        #[serde(default)]
        remove_unmatched: bool,
    },
}

impl CollectionStrategy {
    /// Keyed matching that keeps unmatched target elements.
    #[must_use]
    pub const fn keyed() -> Self {
        Self::Keyed {
            remove_unmatched: false,
        }
    }

    /// Keyed matching that drops unmatched target elements.
    #[must_use]
    pub const fn keyed_exclusive() -> Self {
        Self::Keyed {
            remove_unmatched: true,
        }
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Append => "append",
            Self::Positional => "positional",
            Self::Keyed { .. } => "keyed",
        }
    }
}

pub(crate) fn apply<P: PartialRecord>(
    strategy: CollectionStrategy,
    target: &mut Vec<P::Target>,
    patches: Vec<P>,
    cx: &mut MergeContext<'_>,
    create: Factory<P::Target>,
) -> PatchResult<()> {
    tracing::trace!(
        field = %cx.path(),
        strategy = strategy.name(),
        entries = patches.len(),
        "merging collection"
    );
    match strategy {
        CollectionStrategy::Replace => replace(target, patches, cx, create),
        CollectionStrategy::Append => append(target, patches, cx, create),
        CollectionStrategy::Positional => positional(target, patches, cx, create),
        CollectionStrategy::Keyed { remove_unmatched } => {
            keyed(target, patches, cx, create, remove_unmatched)
        }
    }
}

// Builds an element for `patch`. `None` means the element is dropped: one
// of its fields failed, or an earlier failure suspended writes.
fn fresh<P: PartialRecord>(
    patch: P,
    cx: &mut MergeContext<'_>,
    create: Factory<P::Target>,
) -> PatchResult<Option<P::Target>> {
    let mut element = create(cx.path())?;
    cx.descend(patch, &mut element)?;
    if !cx.is_writing() {
        return Ok(None);
    }
    cx.created();
    Ok(Some(element))
}

/// Ask the hooks to detach every element of `elements`.
///
/// Elements are addressed by identity when they carry one, else by index.
pub(crate) fn release<P: PartialRecord>(
    elements: &[P::Target],
    cx: &mut MergeContext<'_>,
) -> PatchResult<()> {
    for (position, element) in elements.iter().enumerate() {
        let segment = P::target_identity(element)
            .map_or(Segment::Index(position), |key| Segment::Key(key.to_string()));
        cx.element(segment, MergeContext::detach)?;
    }
    Ok(())
}

// The target is only replaced once every element has been built and every
// old element released.
fn replace<P: PartialRecord>(
    target: &mut Vec<P::Target>,
    patches: Vec<P>,
    cx: &mut MergeContext<'_>,
    create: Factory<P::Target>,
) -> PatchResult<()> {
    let mut rebuilt = Vec::with_capacity(patches.len());
    for (position, patch) in patches.into_iter().enumerate() {
        cx.element(Segment::Index(position), |scope| {
            if let Some(element) = fresh(patch, scope, create)? {
                rebuilt.push(element);
            }
            Ok(())
        })?;
    }
    if cx.is_writing() {
        release::<P>(target, cx)?;
        if cx.is_writing() {
            *target = rebuilt;
        }
    }
    Ok(())
}

fn append<P: PartialRecord>(
    target: &mut Vec<P::Target>,
    patches: Vec<P>,
    cx: &mut MergeContext<'_>,
    create: Factory<P::Target>,
) -> PatchResult<()> {
    for patch in patches {
        let position = target.len();
        cx.element(Segment::Index(position), |scope| {
            if let Some(element) = fresh(patch, scope, create)? {
                target.push(element);
            }
            Ok(())
        })?;
    }
    Ok(())
}

fn positional<P: PartialRecord>(
    target: &mut Vec<P::Target>,
    patches: Vec<P>,
    cx: &mut MergeContext<'_>,
    create: Factory<P::Target>,
) -> PatchResult<()> {
    for (position, patch) in patches.into_iter().enumerate() {
        cx.element(Segment::Index(position), |scope| {
            if let Some(existing) = target.get_mut(position) {
                return scope.descend(patch, existing);
            }
            if let Some(element) = fresh(patch, scope, create)? {
                target.push(element);
            }
            Ok(())
        })?;
    }
    Ok(())
}

fn keyed<P: PartialRecord>(
    target: &mut Vec<P::Target>,
    patches: Vec<P>,
    cx: &mut MergeContext<'_>,
    create: Factory<P::Target>,
    remove_unmatched: bool,
) -> PatchResult<()> {
    let mut seen = HashSet::with_capacity(patches.len());
    for (position, patch) in patches.into_iter().enumerate() {
        let Some(key) = patch.identity() else {
            cx.element(Segment::Index(position), |scope| {
                Err(Arc::new(MergeError::unknown_shape(
                    scope.path().clone(),
                    "a collection entry carrying its key",
                    "an entry without a key",
                )))
            })?;
            continue;
        };
        let matched = target
            .iter()
            .position(|element| P::target_identity(element).as_ref() == Some(&key));
        cx.element(Segment::Key(key.to_string()), |scope| {
            if let Some(existing) = matched.and_then(|index| target.get_mut(index)) {
                return scope.descend(patch, existing);
            }
            if let Some(element) = fresh(patch, scope, create)? {
                target.push(element);
            }
            Ok(())
        })?;
        seen.insert(key);
    }
    if remove_unmatched && cx.is_writing() {
        remove_stale::<P>(target, &seen, cx)?;
    }
    Ok(())
}

// Elements without an identity cannot be matched, so they are kept. Each
// stale key is released once, however many elements share it.
fn remove_stale<P: PartialRecord>(
    target: &mut Vec<P::Target>,
    seen: &HashSet<P::Key>,
    cx: &mut MergeContext<'_>,
) -> PatchResult<()> {
    let mut queued = HashSet::new();
    let stale: Vec<P::Key> = target
        .iter()
        .filter_map(P::target_identity)
        .filter(|key| !seen.contains(key) && queued.insert(key.clone()))
        .collect();
    for key in stale {
        cx.element(Segment::Key(key.to_string()), MergeContext::detach)?;
    }
    if cx.is_writing() {
        target.retain(|element| {
            P::target_identity(element).is_none_or(|key| !queued.contains(&key))
        });
    }
    Ok(())
}
