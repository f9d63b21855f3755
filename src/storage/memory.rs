//! In-memory triplet store.
//!
//! This is the reference implementation of `TripletStore`.
//! Records live in an insertion-ordered map protected by a RwLock, with
//! subject and object adjacency lists for the common single-endpoint queries.
//!
//! ## Limitations
//!
//! - **No persistence**: contents vanish with the process.
//! - **No uniqueness enforcement**: `put` appends; callers check first.
//!
//! Use this backend for:
//! - Testing the graph model and restart protocol
//! - Embedding the diagram where topology does not need to outlive the view

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::TripletStore;
use crate::model::{Triplet, TripletKey, TripletPattern};
use crate::Result;

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory triplet storage. Cloning shares the same records.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    /// sequence number → triplet, in insertion order
    records: RwLock<BTreeMap<u64, Triplet>>,
    /// subject hash → sequence numbers
    by_subject: RwLock<HashMap<String, Vec<u64>>>,
    /// object hash → sequence numbers
    by_object: RwLock<HashMap<String, Vec<u64>>>,
    next_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn candidates(&self, pattern: &TripletPattern) -> Option<Vec<u64>> {
        if let Some(s) = &pattern.subject {
            return Some(self.inner.by_subject.read().get(s).cloned().unwrap_or_default());
        }
        if let Some(o) = &pattern.object {
            return Some(self.inner.by_object.read().get(o).cloned().unwrap_or_default());
        }
        None
    }

    fn unlink(index: &mut HashMap<String, Vec<u64>>, hash: &str, seq: u64) {
        if let Some(seqs) = index.get_mut(hash) {
            seqs.retain(|s| *s != seq);
            if seqs.is_empty() {
                index.remove(hash);
            }
        }
    }
}

// ============================================================================
// TripletStore impl
// ============================================================================

#[async_trait]
impl TripletStore for MemoryStore {
    async fn get(&self, pattern: &TripletPattern) -> Result<Vec<Triplet>> {
        let records = self.inner.records.read();
        let found = match self.candidates(pattern) {
            Some(mut seqs) => {
                seqs.sort_unstable();
                seqs.iter()
                    .filter_map(|seq| records.get(seq))
                    .filter(|t| pattern.matches(t))
                    .cloned()
                    .collect()
            }
            None => records.values().filter(|t| pattern.matches(t)).cloned().collect(),
        };
        Ok(found)
    }

    async fn put(&self, triplet: Triplet) -> Result<()> {
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
        self.inner.by_subject.write().entry(triplet.subject.hash.clone()).or_default().push(seq);
        self.inner.by_object.write().entry(triplet.object.hash.clone()).or_default().push(seq);
        self.inner.records.write().insert(seq, triplet);
        Ok(())
    }

    async fn del(&self, triplet: &Triplet) -> Result<bool> {
        let key: TripletKey = triplet.key();
        let mut records = self.inner.records.write();
        let doomed: Vec<u64> = records
            .iter()
            .filter(|(_, t)| t.key() == key)
            .map(|(seq, _)| *seq)
            .collect();

        let mut by_subject = self.inner.by_subject.write();
        let mut by_object = self.inner.by_object.write();
        for seq in &doomed {
            records.remove(seq);
            Self::unlink(&mut by_subject, &key.subject, *seq);
            Self::unlink(&mut by_object, &key.object, *seq);
        }
        Ok(!doomed.is_empty())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.inner.records.read().len() as u64)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, Predicate};

    #[tokio::test]
    async fn test_put_and_get_by_pattern() {
        let db = MemoryStore::new();
        db.put(Triplet::link("a", "knows", "b")).await.unwrap();
        db.put(Triplet::link("a", "likes", "c")).await.unwrap();
        db.put(Triplet::link("b", "knows", "c")).await.unwrap();

        assert_eq!(db.get(&TripletPattern::any()).await.unwrap().len(), 3);
        assert_eq!(db.get(&TripletPattern::any().subject("a")).await.unwrap().len(), 2);
        assert_eq!(db.get(&TripletPattern::any().object("c")).await.unwrap().len(), 2);
        assert_eq!(db.get(&TripletPattern::any().predicate_type("knows")).await.unwrap().len(), 2);
        assert_eq!(
            db.get(&TripletPattern::any().subject("a").predicate_type("knows")).await.unwrap().len(),
            1
        );
        assert!(db.get(&TripletPattern::any().subject("z")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_preserves_insertion_order() {
        let db = MemoryStore::new();
        for obj in ["x", "y", "z"] {
            db.put(Triplet::link("a", "r", obj)).await.unwrap();
        }
        let objs: Vec<String> = db
            .get(&TripletPattern::any().subject("a"))
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.object.hash)
            .collect();
        assert_eq!(objs, vec!["x", "y", "z"]);
    }

    #[tokio::test]
    async fn test_del_by_key() {
        let db = MemoryStore::new();
        db.put(Triplet::link("a", "knows", "b")).await.unwrap();
        db.put(Triplet::link("a", "likes", "b")).await.unwrap();

        assert!(db.del(&Triplet::link("a", "knows", "b")).await.unwrap());
        assert!(!db.del(&Triplet::link("a", "knows", "b")).await.unwrap());
        assert_eq!(db.count().await.unwrap(), 1);
        assert!(db.get(&TripletPattern::any().predicate_type("knows")).await.unwrap().is_empty());
        assert_eq!(db.get(&TripletPattern::any().subject("a")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_contains_and_predicate_hash() {
        let db = MemoryStore::new();
        let t = Triplet::new(Node::new("a"), Predicate::new("r").with_hash("p1"), Node::new("b"));
        db.put(t.clone()).await.unwrap();

        assert!(db.contains(&t.key()).await.unwrap());
        assert!(!db.contains(&Triplet::link("b", "r", "a").key()).await.unwrap());
        let hit = db.get(&TripletPattern::any().predicate_hash("p1")).await.unwrap();
        assert_eq!(hit, vec![t]);
    }

    #[tokio::test]
    async fn test_incident_dedupes_self_loop() {
        let db = MemoryStore::new();
        db.put(Triplet::link("a", "self", "a")).await.unwrap();
        db.put(Triplet::link("a", "r", "b")).await.unwrap();
        db.put(Triplet::link("c", "r", "a")).await.unwrap();
        db.put(Triplet::link("b", "r", "c")).await.unwrap();

        assert_eq!(db.incident("a").await.unwrap().len(), 3);
    }

    proptest::proptest! {
        #[test]
        fn prop_indices_agree_with_scan(ops in proptest::collection::vec((proptest::bool::ANY, 0usize..4, 0usize..4), 0..40)) {
            const HASHES: [&str; 4] = ["a", "b", "c", "d"];
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let db = MemoryStore::new();
                let mut model: Vec<TripletKey> = Vec::new();
                for (put, s, o) in ops {
                    let t = Triplet::link(HASHES[s], "r", HASHES[o]);
                    if put {
                        model.push(t.key());
                        db.put(t).await.unwrap();
                    } else {
                        let key = t.key();
                        model.retain(|k| *k != key);
                        db.del(&t).await.unwrap();
                    }
                }
                assert_eq!(db.count().await.unwrap(), model.len() as u64);
                for h in HASHES {
                    let via_index: Vec<TripletKey> =
                        db.get(&TripletPattern::any().subject(h)).await.unwrap().iter().map(Triplet::key).collect();
                    let expected: Vec<TripletKey> = model.iter().filter(|k| k.subject == h).cloned().collect();
                    assert_eq!(via_index, expected);
                    let via_object = db.get(&TripletPattern::any().object(h)).await.unwrap().len();
                    assert_eq!(via_object, model.iter().filter(|k| k.object == h).count());
                }
            });
        }
    }

    #[tokio::test]
    async fn test_clones_share_records() {
        let db = MemoryStore::new();
        let other = db.clone();
        db.put(Triplet::link("a", "r", "b")).await.unwrap();
        assert_eq!(other.count().await.unwrap(), 1);
    }
}
