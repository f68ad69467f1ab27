use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Canonical dish identifier.
///
/// Backend endpoints hand out the same dish with numeric ids in some
/// payloads and string ids (Mongo object ids, stringified numbers) in
/// others. Every id is normalized to its string form when it is parsed,
/// so `DishId::from(42)` and `DishId::from("42")` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DishId(String);

impl DishId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An id that cannot address any dish (e.g. a recommendation entry
    /// the backend sent without `dish_id`).
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DishId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DishId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DishId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&String> for DishId {
    fn from(value: &String) -> Self {
        Self::new(value.as_str())
    }
}

impl From<i64> for DishId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for DishId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<i32> for DishId {
    fn from(value: i32) -> Self {
        Self(value.to_string())
    }
}

impl From<&DishId> for DishId {
    fn from(value: &DishId) -> Self {
        value.clone()
    }
}

impl AsRef<str> for DishId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for DishId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DishId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DishIdVisitor)
    }
}

struct DishIdVisitor;

impl<'de> Visitor<'de> for DishIdVisitor {
    type Value = DishId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a dish id as a string or an integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<DishId, E> {
        Ok(DishId::new(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<DishId, E> {
        Ok(DishId::new(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<DishId, E> {
        Ok(DishId::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<DishId, E> {
        Ok(DishId::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<DishId, E> {
        // `42.0` is the same dish as `42`.
        if v.fract() == 0.0 && v.is_finite() && v.abs() < i64::MAX as f64 {
            Ok(DishId::from(v as i64))
        } else {
            Err(E::invalid_value(de::Unexpected::Float(v), &self))
        }
    }
}
