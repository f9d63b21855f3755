//! Derived edge view.

use serde::Serialize;

use super::{Predicate, TripletKey};

/// One edge as the layout engine and renderer see it. Links are rebuilt from
/// the triplet store after every mutation and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    /// Subject node hash.
    pub source: String,
    /// Object node hash.
    pub target: String,
    pub predicate: Predicate,
}

impl Link {
    pub fn key(&self) -> TripletKey {
        TripletKey {
            subject: self.source.clone(),
            predicate: self.predicate.kind.clone(),
            object: self.target.clone(),
        }
    }

    pub fn touches(&self, hash: &str) -> bool {
        self.source == hash || self.target == hash
    }
}
