//! Raw presence maps produced by wire deserializers.
//!
//! A [`PresenceMap`] keeps the three wire states apart: a key that is
//! missing is `Unset`, a key holding `null` is `Null` and any other value is
//! `Present`. Formats that cannot express null, such as HTML form payloads,
//! never produce `Null`; ambiguous empty values are treated as `Unset`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{FieldPath, MergeError, OptionalValue, PatchResult};

/// Field presence captured from a partial-update payload.
///
/// # Examples
///
/// ```rust
/// use patchwise::{OptionalValue, PresenceMap};
/// use serde_json::json;
///
/// let map = PresenceMap::from_json(json!({"email": null, "age": 41}))
///     .expect("payload is an object");
/// assert!(map.field("email").is_null());
/// assert!(map.field("nickname").is_unset());
/// assert_eq!(map.decode::<u8>("age").expect("age is a number"), OptionalValue::Present(41));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PresenceMap {
    entries: Map<String, Value>,
    base: FieldPath,
}

impl PresenceMap {
    /// Wrap a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::UnknownFieldShape`] when `payload` is not an
    /// object.
    pub fn from_json(payload: Value) -> PatchResult<Self> {
        match payload {
            Value::Object(entries) => Ok(Self {
                entries,
                base: FieldPath::root(),
            }),
            other => Err(Arc::new(MergeError::unknown_shape(
                FieldPath::root(),
                "an object",
                kind(&other),
            ))),
        }
    }

    /// Build a map from form-encoded pairs.
    ///
    /// Keys containing `.` address nested records, so `address.city=Y`
    /// becomes a nested `address` map. Empty values are skipped, leaving the
    /// field `Unset`. Later pairs overwrite earlier ones.
    pub fn from_form<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut entries = Map::new();
        for (key, raw) in pairs {
            let text = raw.into();
            if text.is_empty() {
                tracing::trace!(key = key.as_ref(), "skipping empty form value");
                continue;
            }
            insert_dotted(&mut entries, key.as_ref(), Value::String(text));
        }
        Self {
            entries,
            base: FieldPath::root(),
        }
    }

    /// Path of this map relative to the payload root.
    #[must_use]
    pub const fn base(&self) -> &FieldPath {
        &self.base
    }

    /// Returns `true` when `name` was supplied, even as null.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names of every supplied field.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Presence state of the raw value stored under `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> OptionalValue<&Value> {
        match self.entries.get(name) {
            None => OptionalValue::Unset,
            Some(Value::Null) => OptionalValue::Null,
            Some(value) => OptionalValue::Present(value),
        }
    }

    /// Decode the value stored under `name` into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::TypeError`] at the field path when a present
    /// value does not deserialize into `T`.
    pub fn decode<T: DeserializeOwned>(&self, name: &str) -> PatchResult<OptionalValue<T>> {
        match self.field(name) {
            OptionalValue::Unset => Ok(OptionalValue::Unset),
            OptionalValue::Null => Ok(OptionalValue::Null),
            OptionalValue::Present(value) => serde_json::from_value(value.clone())
                .map(OptionalValue::Present)
                .map_err(|err| {
                    Arc::new(MergeError::type_error(
                        self.base.child(name),
                        err.to_string(),
                    ))
                }),
        }
    }

    /// The nested map stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::UnknownFieldShape`] when a present value is not
    /// an object.
    pub fn nested(&self, name: &str) -> PatchResult<OptionalValue<Self>> {
        match self.field(name) {
            OptionalValue::Unset => Ok(OptionalValue::Unset),
            OptionalValue::Null => Ok(OptionalValue::Null),
            OptionalValue::Present(Value::Object(entries)) => Ok(OptionalValue::Present(Self {
                entries: entries.clone(),
                base: self.base.child(name),
            })),
            OptionalValue::Present(other) => Err(Arc::new(MergeError::unknown_shape(
                self.base.child(name),
                "an object",
                kind(other),
            ))),
        }
    }

    /// Deserialize the whole map into a presence-aware DTO.
    ///
    /// The DTO must mark its `OptionalValue` fields `#[serde(default)]` so
    /// missing keys stay `Unset`.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::TypeError`] at the map's base path when the
    /// entries do not deserialize into `P`.
    pub fn decode_record<P: DeserializeOwned>(self) -> PatchResult<P> {
        let base = self.base;
        serde_json::from_value(Value::Object(self.entries))
            .map_err(|err| Arc::new(MergeError::type_error(base, err.to_string())))
    }

    /// Consume the map, returning the raw entries.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.entries
    }
}

fn insert_dotted(entries: &mut Map<String, Value>, key: &str, value: Value) {
    match key.split_once('.') {
        None => {
            entries.insert(key.to_owned(), value);
        }
        Some((head, rest)) => {
            let slot = entries
                .entry(head.to_owned())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(nested) = slot {
                insert_dotted(nested, rest, value);
            }
        }
    }
}

/// Article-prefixed JSON type name used in shape errors.
pub(crate) const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::PresenceMap;
    use crate::{MergeError, OptionalValue};
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn non_object_payloads_are_rejected() {
        let err = PresenceMap::from_json(json!([1, 2])).expect_err("arrays are not records");
        assert!(matches!(
            err.as_ref(),
            MergeError::UnknownFieldShape { found, .. } if found == "an array"
        ));
    }

    #[rstest]
    #[case::missing("nickname", OptionalValue::Unset)]
    #[case::null("email", OptionalValue::Null)]
    #[case::present("name", OptionalValue::Present(String::from("Ada")))]
    fn decode_preserves_three_states(
        #[case] name: &str,
        #[case] expected: OptionalValue<String>,
    ) {
        let map = PresenceMap::from_json(json!({"name": "Ada", "email": null}))
            .expect("payload is an object");
        assert_eq!(map.decode::<String>(name).expect("decodes"), expected);
    }

    #[test]
    fn decode_failures_name_the_nested_path() {
        let map = PresenceMap::from_json(json!({"address": {"zipcode": [1]}}))
            .expect("payload is an object");
        let address = map
            .nested("address")
            .expect("address is an object")
            .into_present()
            .expect("address is present");
        let err = address
            .decode::<String>("zipcode")
            .expect_err("array is not a string");
        assert_eq!(
            err.path().map(ToString::to_string).as_deref(),
            Some("address.zipcode")
        );
    }

    #[test]
    fn form_payloads_never_produce_null() {
        let map = PresenceMap::from_form([
            ("email", ""),
            ("name", "Ada"),
            ("address.city", "Y"),
            ("address.street", ""),
        ]);
        assert!(map.field("email").is_unset());
        assert!(map.keys().all(|key| !map.field(key).is_null()));
        let address = map
            .nested("address")
            .expect("address is an object")
            .into_present()
            .expect("address is present");
        assert!(address.field("street").is_unset());
        assert_eq!(
            address.decode::<String>("city").expect("city decodes"),
            OptionalValue::Present(String::from("Y"))
        );
    }
}
