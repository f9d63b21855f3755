//! Subject–predicate–object triplets, the durable unit of topology.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Node, Predicate};
use crate::{Error, Result};

/// A stored edge. Endpoints carry the node snapshot at write time; only the
/// hashes take part in identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triplet {
    pub subject: Node,
    pub predicate: Predicate,
    pub object: Node,
}

/// Identity of a triplet: `(subject.hash, predicate.type, object.hash)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TripletKey {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl std::fmt::Display for TripletKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -[{}]-> {}", self.subject, self.predicate, self.object)
    }
}

impl Triplet {
    pub fn new(subject: Node, predicate: Predicate, object: Node) -> Self {
        Self { subject, predicate, object }
    }

    /// Shorthand for a triplet between bare hashes.
    pub fn link(subject: &str, kind: &str, object: &str) -> Self {
        Self::new(Node::new(subject), Predicate::new(kind), Node::new(object))
    }

    pub fn key(&self) -> TripletKey {
        TripletKey {
            subject: self.subject.hash.clone(),
            predicate: self.predicate.kind.clone(),
            object: self.object.hash.clone(),
        }
    }

    /// Structural completeness: both endpoints hashed, predicate typed.
    pub fn validate(&self) -> Result<()> {
        self.subject
            .validate()
            .map_err(|_| Error::Validation("triplet subject is missing a hash".into()))?;
        self.object
            .validate()
            .map_err(|_| Error::Validation("triplet object is missing a hash".into()))?;
        self.predicate.validate()
    }

    /// Build a triplet from untyped JSON, reporting the first structural
    /// problem as a validation error rather than a serde message.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::Validation("triplet must be an object".into()))?;
        for field in ["subject", "predicate", "object"] {
            if !obj.contains_key(field) {
                return Err(Error::Validation(format!("triplet is missing '{field}'")));
            }
        }
        for end in ["subject", "object"] {
            match obj[end].get("hash") {
                Some(Value::String(_)) => {}
                Some(other) => {
                    return Err(Error::Validation(format!("{end}.hash must be a string, got {other}")));
                }
                None => return Err(Error::Validation(format!("triplet {end} is missing a hash"))),
            }
        }
        match obj["predicate"].get("type") {
            Some(Value::String(_)) => {}
            Some(other) => {
                return Err(Error::Validation(format!("predicate.type must be a string, got {other}")));
            }
            None => return Err(Error::Validation("predicate is missing a type".into())),
        }
        let triplet: Triplet = serde_json::from_value(value.clone())
            .map_err(|e| Error::Validation(format!("malformed triplet: {e}")))?;
        triplet.validate()?;
        Ok(triplet)
    }
}

/// Partial triplet used for store queries. Unset fields match anything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TripletPattern {
    pub subject: Option<String>,
    pub predicate_type: Option<String>,
    pub predicate_hash: Option<String>,
    pub object: Option<String>,
}

impl TripletPattern {
    /// Matches every triplet.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn subject(mut self, hash: impl Into<String>) -> Self {
        self.subject = Some(hash.into());
        self
    }

    pub fn predicate_type(mut self, kind: impl Into<String>) -> Self {
        self.predicate_type = Some(kind.into());
        self
    }

    pub fn predicate_hash(mut self, hash: impl Into<String>) -> Self {
        self.predicate_hash = Some(hash.into());
        self
    }

    pub fn object(mut self, hash: impl Into<String>) -> Self {
        self.object = Some(hash.into());
        self
    }

    /// Exact-key pattern for an existing triplet.
    pub fn for_key(key: &TripletKey) -> Self {
        Self::any()
            .subject(key.subject.clone())
            .predicate_type(key.predicate.clone())
            .object(key.object.clone())
    }

    pub fn matches(&self, t: &Triplet) -> bool {
        self.subject.as_ref().is_none_or(|s| *s == t.subject.hash)
            && self.predicate_type.as_ref().is_none_or(|k| *k == t.predicate.kind)
            && self
                .predicate_hash
                .as_ref()
                .is_none_or(|h| t.predicate.hash.as_ref() == Some(h))
            && self.object.as_ref().is_none_or(|o| *o == t.object.hash)
    }
}
