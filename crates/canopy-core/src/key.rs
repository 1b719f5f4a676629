//! Host-facing node identifiers.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Stable identifier of a node, compared as text.
///
/// Hosts may supply ids as strings or numbers; numbers are coerced to their
/// decimal text so that `42` and `"42"` name the same node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeKey(String);

impl NodeKey {
    /// Create a key from anything convertible to text.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The key as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for NodeKey {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl From<i64> for NodeKey {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

struct NodeKeyVisitor;

impl Visitor<'_> for NodeKeyVisitor {
    type Value = NodeKey;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or numeric node id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<NodeKey, E> {
        Ok(NodeKey::from(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<NodeKey, E> {
        Ok(NodeKey(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<NodeKey, E> {
        Ok(NodeKey::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<NodeKey, E> {
        Ok(NodeKey::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<NodeKey, E> {
        // Integral floats print without a fraction, matching `String(1.0) == "1"`.
        if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
            Ok(NodeKey::from(v as i64))
        } else {
            Ok(NodeKey(v.to_string()))
        }
    }
}

impl<'de> Deserialize<'de> for NodeKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeKeyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_and_text_ids_compare_equal() {
        let from_number: NodeKey = serde_json::from_str("42").unwrap();
        let from_text: NodeKey = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(from_number, from_text);
        assert_eq!(from_number, NodeKey::from(42u64));
    }

    #[test]
    fn test_integral_float_id() {
        let key: NodeKey = serde_json::from_str("7.0").unwrap();
        assert_eq!(key.as_str(), "7");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&NodeKey::new("a.b")).unwrap();
        assert_eq!(json, "\"a.b\"");
    }

    #[test]
    fn test_map_keys_deserialize() {
        let map: std::collections::BTreeMap<NodeKey, bool> =
            serde_json::from_str(r#"{"1": true, "x": false}"#).unwrap();
        assert_eq!(map.get(&NodeKey::from("1")), Some(&true));
        assert_eq!(map.get(&NodeKey::from("x")), Some(&false));
    }
}
