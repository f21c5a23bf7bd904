//! Caller-supplied merge configuration.
//!
//! [`MergeOptions`] can be assembled with builder methods or loaded through
//! [`figment`] from defaults, an optional `patchwise.toml` and
//! `PATCHWISE_*` environment variables.

use std::{collections::BTreeMap, sync::Arc};

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

use crate::{CollectionStrategy, MergeError, PatchResult};

/// Prefix for environment variables read by [`MergeOptions::figment`].
pub const ENV_PREFIX: &str = "PATCHWISE_";

/// File name read by [`MergeOptions::figment`] when the `toml` feature is on.
pub const CONFIG_FILE: &str = "patchwise.toml";

/// How the engine reacts to a failing field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMode {
    /// Stop at the first failing field and report it.
    #[default]
    FailFast,
    /// Keep checking the remaining fields and report every failure.
    ///
    /// Fields resolved before the first failure stay applied. Later fields
    /// are validated but never written. Use [`crate::Merger::merged`] when
    /// the target must stay untouched on failure.
    CollectAll,
}

/// Configuration for one merge call.
///
/// # Examples
///
/// ```rust
/// use patchwise::{CollectionStrategy, ErrorMode, MergeOptions};
///
/// let options = MergeOptions::default()
///     .with_mode(ErrorMode::CollectAll)
///     .with_collection("lines", CollectionStrategy::keyed());
/// assert_eq!(
///     options.collection_strategy("lines"),
///     Some(CollectionStrategy::keyed())
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Reaction to failing fields.
    pub mode: ErrorMode,
    /// Collection strategies keyed by dotted schema path (`orders.lines`).
    pub collections: BTreeMap<String, CollectionStrategy>,
    /// Maximum nesting depth the engine will descend into.
    pub max_depth: Option<usize>,
}

impl MergeOptions {
    /// Set the error mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ErrorMode) -> Self {
        self.mode = mode;
        self
    }

    /// Register the strategy used for the collection at `path`.
    #[must_use]
    pub fn with_collection(mut self, path: impl Into<String>, strategy: CollectionStrategy) -> Self {
        self.collections.insert(path.into(), strategy);
        self
    }

    /// Limit how deeply nested records may be merged.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Strategy configured for the collection at the dotted schema `path`.
    #[must_use]
    pub fn collection_strategy(&self, path: &str) -> Option<CollectionStrategy> {
        self.collections.get(path).copied()
    }

    /// Layered configuration sources for merge options.
    ///
    /// Defaults come first, then `patchwise.toml` in the working directory
    /// (with the `toml` feature), then `PATCHWISE_*` environment variables.
    /// Nested keys in environment variables are separated by `__`, so
    /// `PATCHWISE_COLLECTIONS__LINES=replace` configures the `lines`
    /// collection.
    #[must_use]
    pub fn figment() -> Figment {
        file_layer(Figment::from(Serialized::defaults(Self::default())))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extract options from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Config`] when the sources cannot be extracted
    /// into [`MergeOptions`].
    pub fn from_figment(figment: &Figment) -> PatchResult<Self> {
        figment
            .extract()
            .map_err(|err| Arc::new(MergeError::config(err)))
    }

    /// Load options from [`MergeOptions::figment`].
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Config`] when a source is malformed.
    pub fn load() -> PatchResult<Self> {
        Self::from_figment(&Self::figment())
    }
}

#[cfg(feature = "toml")]
fn file_layer(figment: Figment) -> Figment {
    use figment::providers::{Format, Toml};
    figment.merge(Toml::file(CONFIG_FILE))
}

#[cfg(not(feature = "toml"))]
fn file_layer(figment: Figment) -> Figment {
    figment
}
