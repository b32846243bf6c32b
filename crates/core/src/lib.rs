//! # Core Utilities for Attest
//!
//! This crate provides common serde helpers for the Attest crates and is not
//! intended to be used directly.
//!
//! W3C data models routinely allow a property to be either a bare string or an
//! object (`issuer`, relationship entries in a controller document), or
//! either a single value or an array (`credentialSchema`). [`Kind`] and
//! [`Quota`] capture those two shapes.

use serde::{Deserialize, Serialize};

/// `Kind` allows serde to serialize/deserialize a string or an object.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Kind<T> {
    /// Simple string value
    String(String),

    /// Complex object value
    Object(T),
}

impl<T: Default> Default for Kind<T> {
    fn default() -> Self {
        Self::String(String::new())
    }
}

impl<T> Kind<T> {
    /// Returns `true` if the value is a bare string.
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Returns `true` if the value is an object.
    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// The string value, if any.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Object(_) => None,
        }
    }

    /// The object value, if any.
    pub const fn as_object(&self) -> Option<&T> {
        match self {
            Self::String(_) => None,
            Self::Object(o) => Some(o),
        }
    }
}

impl<T> From<String> for Kind<T> {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T> From<&str> for Kind<T> {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// `Quota` allows serde to serialize/deserialize a single object or a set of
/// objects.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Quota<T> {
    /// Single object
    One(T),

    /// Set of objects
    Many(Vec<T>),
}

impl<T: Default> Default for Quota<T> {
    fn default() -> Self {
        Self::One(T::default())
    }
}

impl<T> Quota<T> {
    /// Returns `true` if the quota is a single object.
    pub const fn is_one(&self) -> bool {
        matches!(self, Self::One(_))
    }

    /// Returns `true` if the quota contains an array of objects.
    pub const fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }

    /// Iterate over the contained values regardless of shape.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            Self::One(one) => std::slice::from_ref(one).iter(),
            Self::Many(many) => many.iter(),
        }
    }

    /// Number of contained values.
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(many) => many.len(),
        }
    }

    /// Returns `true` when an array form holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into a `Vec`.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(one) => vec![one],
            Self::Many(many) => many,
        }
    }
}

impl<T> From<Vec<T>> for Quota<T> {
    fn from(value: Vec<T>) -> Self {
        Self::Many(value)
    }
}

impl<'a, T> IntoIterator for &'a Quota<T> {
    type IntoIter = std::slice::Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
    struct Issuer {
        id: String,
    }

    #[test]
    fn kind_either_shape() {
        let kind: Kind<Issuer> = serde_json::from_value(json!("did:web:a.com")).expect("string");
        assert_eq!(kind.as_string(), Some("did:web:a.com"));

        let kind: Kind<Issuer> =
            serde_json::from_value(json!({"id": "did:web:a.com"})).expect("object");
        assert_eq!(kind.as_object().map(|i| i.id.as_str()), Some("did:web:a.com"));
    }

    #[test]
    fn quota_iterates_both_shapes() {
        let one: Quota<String> = serde_json::from_value(json!("a")).expect("one");
        assert_eq!(one.iter().count(), 1);

        let many: Quota<String> = serde_json::from_value(json!(["a", "b"])).expect("many");
        assert_eq!(many.into_vec(), vec!["a".to_string(), "b".to_string()]);

        let empty: Quota<String> = serde_json::from_value(json!([])).expect("empty");
        assert!(empty.is_empty());
    }
}
