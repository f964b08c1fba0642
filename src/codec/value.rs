//! Wire value helpers shared by the union types.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::error::CodecError;

/// A field that is logically a collection but may arrive on the wire as
/// either a single object or an array.
///
/// Decoding accepts both shapes. Encoding emits a bare object when the
/// collection holds exactly one element, unless the `always_array` policy
/// flag is set, in which case an array is emitted regardless of length.
/// The flag itself never appears on the wire; it is applied by constructors
/// or by a registry adjuster after decode.
#[derive(Debug, Clone, PartialEq)]
pub struct OneOrMany<T> {
    items: Vec<T>,
    always_array: bool,
}

impl<T> OneOrMany<T> {
    /// Creates an empty collection with single-element encoding.
    pub fn new() -> Self {
        OneOrMany {
            items: Vec::new(),
            always_array: false,
        }
    }

    /// Creates an empty collection that always encodes as an array.
    pub fn always_array() -> Self {
        OneOrMany {
            items: Vec::new(),
            always_array: true,
        }
    }

    /// Sets the encoding policy: `true` forces array output even for a
    /// single element.
    pub fn set_always_array(&mut self, always: bool) {
        self.always_array = always;
    }

    /// Returns the current encoding policy.
    pub fn is_always_array(&self) -> bool {
        self.always_array
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(items: Vec<T>) -> Self {
        OneOrMany {
            items,
            always_array: false,
        }
    }
}

impl<T> From<T> for OneOrMany<T> {
    fn from(item: T) -> Self {
        OneOrMany {
            items: vec![item],
            always_array: false,
        }
    }
}

impl<T: Serialize> Serialize for OneOrMany<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if !self.always_array && self.items.len() == 1 {
            self.items[0].serialize(serializer)
        } else {
            self.items.serialize(serializer)
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OneOrMany<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr<T> {
            Many(Vec<T>),
            One(T),
        }

        let repr = Repr::deserialize(deserializer)?;
        Ok(match repr {
            Repr::Many(items) => OneOrMany {
                items,
                always_array: false,
            },
            Repr::One(item) => OneOrMany {
                items: vec![item],
                always_array: false,
            },
        })
    }
}

/// Serializes `payload` to a JSON object and injects the discriminator tag.
///
/// The payload must serialize to an object (or to null, for unit variants
/// that carry only their tag).
pub(crate) fn tagged_object<P: Serialize>(
    tag_field: &str,
    tag: &str,
    payload: &P,
) -> Result<Value, CodecError> {
    let mut value = serde_json::to_value(payload)?;
    match value {
        Value::Object(ref mut map) => {
            map.insert(tag_field.to_string(), Value::String(tag.to_string()));
        }
        Value::Null => {
            let mut map = serde_json::Map::new();
            map.insert(tag_field.to_string(), Value::String(tag.to_string()));
            value = Value::Object(map);
        }
        other => {
            return Err(CodecError::malformed(format!(
                "tagged value '{}' must serialize to an object, got {}",
                tag, other
            )));
        }
    }
    Ok(value)
}

/// Decodes a derived payload struct from a tagged object, ignoring the
/// discriminator field itself.
pub(crate) fn payload_from_value<P: DeserializeOwned>(value: &Value) -> Result<P, CodecError> {
    Ok(serde_json::from_value(value.clone())?)
}
