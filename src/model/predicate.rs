//! Edge payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::PropertyMap;
use crate::{Error, Result};

/// The predicate of a triplet. `kind` is the mandatory edge type, `hash`
/// makes the predicate addressable through the predicate map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Predicate {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(flatten)]
    pub properties: PropertyMap,
}

impl Predicate {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into(), ..Self::default() }
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn validate(&self) -> Result<()> {
        if self.kind.trim().is_empty() {
            return Err(Error::Validation("predicate is missing a type".into()));
        }
        if matches!(&self.hash, Some(h) if h.trim().is_empty()) {
            return Err(Error::Validation("predicate hash must not be empty".into()));
        }
        Ok(())
    }

    /// Set a free-form property. `type` and `hash` identify the edge and
    /// cannot be edited in place.
    pub fn set_property(&mut self, name: &str, value: Value) -> Result<()> {
        if name == "type" || name == "hash" {
            return Err(Error::Validation(format!("predicate property '{name}' is read-only")));
        }
        self.properties.insert(name.to_string(), value);
        Ok(())
    }
}
