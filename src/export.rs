//! Graph save/load: serialize a diagram as a JSON payload.
//!
//! ```text
//! GraphModel → save_graph() → {triplets, nodes, groups}
//!   → persist anywhere → load_graph() → GraphModel
//! ```
//!
//! Triplets come from the store, so the payload holds exactly what is
//! persisted. Node entries carry positions only; node attributes travel with
//! the triplet endpoints.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::graph::GraphModel;
use crate::layout::LayoutEngine;
use crate::model::{Group, GroupChildren, GroupData, Node, Triplet, TripletKey, TripletPattern};
use crate::render::Renderer;
use crate::storage::TripletStore;
use crate::{Error, Result};

/// Saved position of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub hash: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// One saved group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: String,
    #[serde(default)]
    pub data: GroupData,
    #[serde(default)]
    pub children: GroupChildren,
}

impl From<&Group> for GroupRecord {
    fn from(g: &Group) -> Self {
        GroupRecord {
            id: g.id.clone(),
            data: g.data.clone(),
            children: GroupChildren { nodes: g.leaves.clone(), groups: g.groups.clone() },
        }
    }
}

/// The full save payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphPayload {
    #[serde(default)]
    pub triplets: Vec<Triplet>,
    #[serde(default)]
    pub nodes: Vec<NodePosition>,
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
}

impl GraphPayload {
    /// Parse a payload, reporting malformed triplets as validation errors.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(json)?;
        let obj = raw
            .as_object()
            .ok_or_else(|| Error::Validation("graph payload must be an object".into()))?;

        let triplets = match obj.get("triplets") {
            None => Vec::new(),
            Some(Value::Array(items)) => items.iter().map(Triplet::from_value).collect::<Result<_>>()?,
            Some(_) => return Err(Error::Validation("'triplets' must be an array".into())),
        };
        let nodes = match obj.get("nodes") {
            None => Vec::new(),
            Some(v) => serde_json::from_value(v.clone())?,
        };
        let groups = match obj.get("groups") {
            None => Vec::new(),
            Some(v) => serde_json::from_value(v.clone())?,
        };
        Ok(GraphPayload { triplets, nodes, groups })
    }
}

impl<S: TripletStore, E: LayoutEngine, R: Renderer> GraphModel<S, E, R> {
    /// Snapshot of the store, node positions and groups.
    pub async fn export_payload(&self) -> Result<GraphPayload> {
        let triplets = self.store.get(&TripletPattern::any()).await?;
        let nodes = self
            .nodes
            .iter()
            .map(|n| NodePosition { hash: n.hash.clone(), x: n.x, y: n.y })
            .collect();
        let groups = self.groups.iter().map(GroupRecord::from).collect();
        Ok(GraphPayload { triplets, nodes, groups })
    }

    /// Serialize the graph as JSON.
    pub async fn save_graph(&self) -> Result<String> {
        let payload = self.export_payload().await?;
        tracing::debug!(
            triplets = payload.triplets.len(),
            nodes = payload.nodes.len(),
            groups = payload.groups.len(),
            "graph saved"
        );
        Ok(serde_json::to_string(&payload)?)
    }

    /// Merge a saved payload into this graph.
    ///
    /// Triplets already stored are skipped. A predicate hash claimed by two
    /// different triplets rejects the whole payload. Saved positions are
    /// applied and the engine is rebound without running the simulation.
    pub async fn load_graph(&mut self, json: &str) -> Result<()> {
        let payload = GraphPayload::from_json(json)?;
        {
            let mut hashes: HashMap<&str, TripletKey> = HashMap::new();
            for t in &payload.triplets {
                t.validate()?;
                if let Some(hash) = t.predicate.hash.as_deref() {
                    let key = t.key();
                    match hashes.get(hash) {
                        Some(first) if *first != key => {
                            return Err(Error::Validation(format!("predicate hash {hash} used by {first} and {key}")));
                        }
                        Some(_) => {}
                        None => {
                            hashes.insert(hash, key);
                        }
                    }
                }
                self.check_predicate_hash(t, None).await?;
            }
        }
        for n in &payload.nodes {
            if n.hash.trim().is_empty() {
                return Err(Error::Validation("saved node is missing a hash".into()));
            }
        }

        self.halt();
        let mut skipped = 0usize;
        for t in payload.triplets {
            if self.store.contains(&t.key()).await? {
                tracing::warn!(triplet = %t.key(), "triplet already stored, skipping");
                skipped += 1;
                continue;
            }
            self.store.put(t.clone()).await?;
            for end in [t.subject, t.object] {
                if !self.node_index.contains_key(&end.hash) {
                    self.insert_node(end);
                }
            }
        }

        for pos in &payload.nodes {
            match self.node_index.get(&pos.hash) {
                Some(&i) => self.nodes[i].move_to(pos.x, pos.y),
                None => self.insert_node(Node::new(pos.hash.clone()).at(pos.x, pos.y)),
            }
        }
        self.rebuild_links().await?;
        self.restore_groups(&payload.groups);

        tracing::debug!(nodes = self.nodes.len(), links = self.links.len(), groups = self.groups.len(), skipped, "graph loaded");
        self.restart().layout(None, true)
    }

    fn restore_groups(&mut self, records: &[GroupRecord]) {
        for rec in records {
            if !self.group_index.contains_key(&rec.id) {
                self.group_index.insert(rec.id.clone(), self.groups.len());
                self.groups.push(Group::new(rec.id.clone(), rec.data.clone()));
            }
        }
        for rec in records {
            for hash in &rec.children.nodes {
                let Some(&i) = self.node_index.get(hash) else {
                    tracing::warn!(group = %rec.id, hash = %hash, "saved group names an unknown node");
                    continue;
                };
                self.detach_node(hash);
                self.nodes[i].parent = Some(rec.id.clone());
                if let Some(g) = self.group_mut(&rec.id) {
                    g.leaves.push(hash.clone());
                }
            }
            for child in &rec.children.groups {
                if child == &rec.id || !self.group_index.contains_key(child) || self.is_ancestor(child, &rec.id) {
                    tracing::warn!(group = %rec.id, child = %child, "saved group names an invalid subgroup");
                    continue;
                }
                self.detach_group(child);
                if let Some(c) = self.group_mut(child) {
                    c.parent = Some(rec.id.clone());
                }
                if let Some(g) = self.group_mut(&rec.id) {
                    g.groups.push(child.clone());
                }
            }
        }
        self.prune_groups();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphOptions;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_save_payload_shape() {
        let mut g = GraphModel::open_memory(GraphOptions::default());
        g.add_node(Node::new("n1"), true).unwrap();
        g.add_node(Node::new("n2"), true).unwrap();
        g.add_triplet(Triplet::link("n1", "rel", "n2"), true).await.unwrap();

        let saved: Value = serde_json::from_str(&g.save_graph().await.unwrap()).unwrap();
        assert_eq!(saved["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(saved["nodes"][0]["hash"], json!("n1"));
        assert_eq!(saved["triplets"].as_array().unwrap().len(), 1);
        assert_eq!(saved["triplets"][0]["subject"]["hash"], json!("n1"));
        assert_eq!(saved["triplets"][0]["predicate"]["type"], json!("rel"));
        assert_eq!(saved["triplets"][0]["object"]["hash"], json!("n2"));
        assert_eq!(saved["groups"], json!([]));
    }

    #[test]
    fn test_payload_rejects_malformed_triplet() {
        let json = r#"{"triplets": [{"subject": {"hash": "a"}, "predicate": {}, "object": {"hash": "b"}}]}"#;
        assert!(matches!(GraphPayload::from_json(json), Err(Error::Validation(_))));
        assert!(matches!(GraphPayload::from_json("[]"), Err(Error::Validation(_))));
        assert!(matches!(GraphPayload::from_json("{"), Err(Error::Serialization(_))));
    }

    #[tokio::test]
    async fn test_load_skips_stored_triplets() {
        let mut g = GraphModel::open_memory(GraphOptions::default());
        g.add_triplet(Triplet::link("a", "rel", "b"), true).await.unwrap();
        let json = r#"{
            "triplets": [
                {"subject": {"hash": "a"}, "predicate": {"type": "rel"}, "object": {"hash": "b"}},
                {"subject": {"hash": "b"}, "predicate": {"type": "rel"}, "object": {"hash": "c"}}
            ],
            "nodes": [{"hash": "c", "x": 40, "y": 60}, {"hash": "lonely", "x": 5, "y": 5}],
            "groups": [{"id": "g", "data": {"text": "G"}, "children": {"nodes": ["b", "c"]}}]
        }"#;
        g.load_graph(json).await.unwrap();

        assert_eq!(g.links().len(), 2);
        assert_eq!(g.nodes().len(), 4);
        assert_eq!(g.get_node("c").unwrap().center(), crate::model::Point::new(40.0, 60.0));
        assert_eq!(g.get_group("g").unwrap().leaves, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(g.get_group("g").unwrap().data.text.as_deref(), Some("G"));
    }

    #[tokio::test]
    async fn test_load_rejects_shared_predicate_hash() {
        let mut g = GraphModel::open_memory(GraphOptions::default());
        let clash = r#"{"triplets": [
            {"subject": {"hash": "a"}, "predicate": {"type": "rel", "hash": "p1"}, "object": {"hash": "b"}},
            {"subject": {"hash": "a"}, "predicate": {"type": "other", "hash": "p1"}, "object": {"hash": "c"}}
        ]}"#;
        assert!(matches!(g.load_graph(clash).await, Err(Error::Validation(_))));
        assert!(g.nodes().is_empty());

        let t = Triplet::new(Node::new("a"), crate::model::Predicate::new("rel").with_hash("p1"), Node::new("b"));
        g.add_triplet(t, true).await.unwrap();
        let taken = r#"{"triplets": [
            {"subject": {"hash": "x"}, "predicate": {"type": "rel", "hash": "p1"}, "object": {"hash": "y"}}
        ]}"#;
        assert!(matches!(g.load_graph(taken).await, Err(Error::Validation(_))));
        assert!(g.get_node("x").is_none());
        assert_eq!(g.store().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_load_drops_cyclic_subgroups() {
        let mut g = GraphModel::open_memory(GraphOptions::default());
        let json = r#"{
            "nodes": [{"hash": "a", "x": 0, "y": 0}, {"hash": "b", "x": 10, "y": 0}],
            "groups": [
                {"id": "outer", "children": {"nodes": ["a"], "groups": ["inner"]}},
                {"id": "inner", "children": {"nodes": ["b"], "groups": ["outer"]}}
            ]
        }"#;
        g.load_graph(json).await.unwrap();

        assert_eq!(g.get_group("inner").unwrap().parent.as_deref(), Some("outer"));
        assert_eq!(g.get_group("outer").unwrap().parent, None);
        assert!(g.get_group("inner").unwrap().groups.is_empty());
        assert_eq!(g.get_group("outer").unwrap().groups, vec!["inner".to_string()]);
    }
}
