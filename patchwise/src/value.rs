//! The tri-state [`OptionalValue`] carried by partial-update documents.
//!
//! A field in a partial update is either absent from the input
//! ([`OptionalValue::Unset`]), explicitly cleared ([`OptionalValue::Null`]),
//! or supplied with a value ([`OptionalValue::Present`]). The three states
//! live in one closed enum rather than in nested `Option<Option<T>>`
//! wrappers.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    fmt,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{FieldPath, MergeError};

/// State tag of an [`OptionalValue`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Presence {
    /// The field was not part of the input.
    Unset,
    /// The field was supplied as null.
    Null,
    /// The field was supplied with a value.
    Present,
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unset => "unset",
            Self::Null => "null",
            Self::Present => "present",
        })
    }
}

/// A field value that distinguishes absent, null, and present.
///
/// # Examples
///
/// ```rust
/// use patchwise::OptionalValue;
///
/// let email = OptionalValue::of(String::from("a@x.com"))?;
/// assert!(email.is_present());
///
/// let cleared: OptionalValue<String> = OptionalValue::null();
/// assert!(cleared.is_null());
/// assert_eq!(cleared.value_or(String::from("fallback")), "fallback");
/// # Ok::<_, patchwise::MergeError>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OptionalValue<T> {
    /// The field was never part of the input.
    #[default]
    Unset,
    /// The field was explicitly supplied as null or empty.
    Null,
    /// The field was supplied with a concrete value.
    Present(T),
}

impl<T> OptionalValue<T> {
    /// State for a field that was not supplied.
    #[must_use]
    pub const fn unset() -> Self {
        Self::Unset
    }

    /// State for a field explicitly supplied as null.
    ///
    /// Whether a field admits null is a property of the partial record's
    /// schema: fields declared `#[patch(required)]` reject this state when
    /// merged.
    #[must_use]
    pub const fn null() -> Self {
        Self::Null
    }

    /// Wrap `value` without checking for nested null markers.
    ///
    /// Prefer [`OptionalValue::of`] at construction boundaries; this
    /// constructor exists for generic composition.
    #[must_use]
    pub const fn present(value: T) -> Self {
        Self::Present(value)
    }

    /// Wrap `value`, rejecting values that are themselves missing markers.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::InvalidValue`] when `value` is `None`, an
    /// unset or null [`OptionalValue`], or JSON `null`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use patchwise::{MergeError, OptionalValue};
    ///
    /// assert!(OptionalValue::of(4_u8).is_ok());
    /// let nested = OptionalValue::of(None::<u8>);
    /// assert!(matches!(nested, Err(MergeError::InvalidValue { .. })));
    /// ```
    pub fn of(value: T) -> Result<Self, MergeError>
    where
        T: NullMarker,
    {
        if value.is_null_marker() {
            return Err(MergeError::invalid_value(
                FieldPath::root(),
                "value is itself a missing or null marker; use `null()` or `unset()`",
            ));
        }
        Ok(Self::Present(value))
    }

    /// Returns `true` when the field was not supplied.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Returns `true` when the field was supplied as null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` when the field was supplied with a value.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// The state tag of this value.
    #[must_use]
    pub const fn state(&self) -> Presence {
        match self {
            Self::Unset => Presence::Unset,
            Self::Null => Presence::Null,
            Self::Present(_) => Presence::Present,
        }
    }

    /// The contained value when present, otherwise `default`.
    ///
    /// Unset and null are indistinguishable here; check them first when the
    /// difference matters.
    #[must_use]
    pub fn value_or(self, default: T) -> T {
        match self {
            Self::Present(value) => value,
            Self::Unset | Self::Null => default,
        }
    }

    /// Borrow the contained value.
    #[must_use]
    pub const fn as_ref(&self) -> OptionalValue<&T> {
        match self {
            Self::Unset => OptionalValue::Unset,
            Self::Null => OptionalValue::Null,
            Self::Present(value) => OptionalValue::Present(value),
        }
    }

    /// The contained value when present.
    #[must_use]
    pub const fn as_present(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Unset | Self::Null => None,
        }
    }

    /// Consume the wrapper, returning the value when present.
    #[must_use]
    pub fn into_present(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Unset | Self::Null => None,
        }
    }

    /// Map the contained value, preserving unset and null.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> OptionalValue<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Unset => OptionalValue::Unset,
            Self::Null => OptionalValue::Null,
            Self::Present(value) => OptionalValue::Present(f(value)),
        }
    }

    /// Chain a computation that may itself produce any state.
    #[must_use]
    pub fn and_then<U, F>(self, f: F) -> OptionalValue<U>
    where
        F: FnOnce(T) -> OptionalValue<U>,
    {
        match self {
            Self::Unset => OptionalValue::Unset,
            Self::Null => OptionalValue::Null,
            Self::Present(value) => f(value),
        }
    }

    /// Convert into the `Option<Option<T>>` idiom.
    ///
    /// `Unset` becomes `None`, `Null` becomes `Some(None)` and
    /// `Present(v)` becomes `Some(Some(v))`.
    #[must_use]
    pub fn into_option(self) -> Option<Option<T>> {
        match self {
            Self::Unset => None,
            Self::Null => Some(None),
            Self::Present(value) => Some(Some(value)),
        }
    }
}

impl<U> OptionalValue<OptionalValue<U>> {
    /// Collapse a doubly wrapped value to one level.
    ///
    /// An outer unset or null wins outright; an outer present yields the
    /// inner value as-is. Apply this once at construction boundaries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use patchwise::OptionalValue;
    ///
    /// let doubled = OptionalValue::present(OptionalValue::present(3));
    /// assert_eq!(doubled.flatten(), OptionalValue::present(3));
    ///
    /// let outer_null: OptionalValue<OptionalValue<i32>> = OptionalValue::null();
    /// assert_eq!(outer_null.flatten(), OptionalValue::null());
    /// ```
    #[must_use]
    pub fn flatten(self) -> OptionalValue<U> {
        match self {
            Self::Unset => OptionalValue::Unset,
            Self::Null => OptionalValue::Null,
            Self::Present(inner) => inner,
        }
    }
}

impl<U> OptionalValue<Option<U>> {
    /// Collapse a present `Option` to one level, treating `None` as null.
    #[must_use]
    pub fn flatten_option(self) -> OptionalValue<U> {
        match self {
            Self::Unset => OptionalValue::Unset,
            Self::Null | Self::Present(None) => OptionalValue::Null,
            Self::Present(Some(value)) => OptionalValue::Present(value),
        }
    }
}

impl<T> From<Option<T>> for OptionalValue<T> {
    /// A supplied `Option`: `None` is null, `Some(v)` is present.
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Present)
    }
}

impl<T> From<Option<Option<T>>> for OptionalValue<T> {
    fn from(value: Option<Option<T>>) -> Self {
        match value {
            None => Self::Unset,
            Some(None) => Self::Null,
            Some(Some(inner)) => Self::Present(inner),
        }
    }
}

impl<T: Serialize> Serialize for OptionalValue<T> {
    /// Writes `Null` and `Unset` as a serialised none.
    ///
    /// Pair with `#[serde(skip_serializing_if = "OptionalValue::is_unset")]`
    /// so unset fields stay absent from the output.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Present(value) => serializer.serialize_some(value),
            Self::Unset | Self::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OptionalValue<T> {
    /// Reads a supplied null as `Null` and any other value as `Present`.
    ///
    /// Absent keys never reach this impl when the field carries
    /// `#[serde(default)]`; they take the [`Default`] state, `Unset`.
    /// Without that attribute serde treats a missing key as null.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer)
            .map(|value| value.map_or(Self::Null, Self::Present))
    }
}

/// Values that can stand for "missing" or "null" themselves.
///
/// [`OptionalValue::of`] consults this trait to reject double wrapping.
/// Plain data types use the default `false`; implement the trait with an
/// empty body for domain scalars:
///
/// ```rust
/// use patchwise::{NullMarker, OptionalValue};
///
/// #[derive(Debug, PartialEq)]
/// struct Email(String);
///
/// impl NullMarker for Email {}
///
/// assert!(OptionalValue::of(Email("a@x.com".into())).is_ok());
/// ```
pub trait NullMarker {
    /// Returns `true` when the value itself denotes absence or null.
    fn is_null_marker(&self) -> bool {
        false
    }
}

macro_rules! plain_values {
    ($($ty:ty),* $(,)?) => {
        $(impl NullMarker for $ty {})*
    };
}

plain_values!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
    (),
);

impl NullMarker for &str {}

impl<T> NullMarker for Vec<T> {}

impl<T> NullMarker for BTreeSet<T> {}

impl<T, S> NullMarker for HashSet<T, S> {}

impl<K, V> NullMarker for BTreeMap<K, V> {}

impl<K, V, S> NullMarker for HashMap<K, V, S> {}

impl<T: NullMarker> NullMarker for Box<T> {
    fn is_null_marker(&self) -> bool {
        (**self).is_null_marker()
    }
}

impl<T> NullMarker for Option<T> {
    fn is_null_marker(&self) -> bool {
        self.is_none()
    }
}

impl<T> NullMarker for OptionalValue<T> {
    fn is_null_marker(&self) -> bool {
        !self.is_present()
    }
}

impl NullMarker for serde_json::Value {
    fn is_null_marker(&self) -> bool {
        self.is_null()
    }
}
