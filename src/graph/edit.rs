//! Batch property edits on nodes and edges.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::GraphModel;
use crate::layout::LayoutEngine;
use crate::model::{Node, Triplet, TripletPattern};
use crate::render::Renderer;
use crate::storage::TripletStore;
use crate::{Error, Result};

/// A single item or a list. Lists are tried first, so a JSON array is always
/// read as many values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<T> for OneOrMany<T> {
    fn from(v: T) -> Self {
        OneOrMany::One(v)
    }
}

impl<T> OneOrMany<T> {
    pub fn len(&self) -> usize {
        match self {
            OneOrMany::One(_) => 1,
            OneOrMany::Many(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `{property, id, value}`: set `property` on every target.
///
/// | id | value | meaning |
/// |----|-------|---------|
/// | one | one | set it |
/// | many | one | broadcast the value |
/// | one | many | set the list as the value |
/// | many | many | pair positionally, lengths must match |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditAction {
    pub property: String,
    pub id: OneOrMany<String>,
    pub value: OneOrMany<Value>,
}

impl EditAction {
    pub fn new(property: impl Into<String>, id: impl Into<OneOrMany<String>>, value: impl Into<OneOrMany<Value>>) -> Self {
        Self { property: property.into(), id: id.into(), value: value.into() }
    }

    /// Expand into `(id, value)` pairs.
    pub fn pairs(&self) -> Result<Vec<(String, Value)>> {
        match (&self.id, &self.value) {
            (OneOrMany::One(id), OneOrMany::One(v)) => Ok(vec![(id.clone(), v.clone())]),
            (OneOrMany::One(id), OneOrMany::Many(vs)) => Ok(vec![(id.clone(), Value::Array(vs.clone()))]),
            (OneOrMany::Many(ids), OneOrMany::One(v)) => Ok(ids.iter().map(|id| (id.clone(), v.clone())).collect()),
            (OneOrMany::Many(ids), OneOrMany::Many(vs)) => {
                if ids.len() != vs.len() {
                    return Err(Error::Validation(format!(
                        "edit of '{}' has {} ids but {} values",
                        self.property,
                        ids.len(),
                        vs.len()
                    )));
                }
                Ok(ids.iter().cloned().zip(vs.iter().cloned()).collect())
            }
        }
    }
}

/// Edits that move or pin nodes have to reach the engine.
fn touches_layout(property: &str) -> bool {
    matches!(property, "x" | "y" | "width" | "height" | "fixed")
}

impl<S: TripletStore, E: LayoutEngine, R: Renderer> GraphModel<S, E, R> {
    /// Apply an edit to nodes. Every value is checked before any node
    /// changes; unknown ids are logged and skipped.
    pub fn edit_node(&mut self, action: EditAction) -> Result<()> {
        let mut staged: Vec<(usize, Node)> = Vec::new();
        for (hash, value) in action.pairs()? {
            let Some(&i) = self.node_index.get(&hash) else {
                tracing::warn!(hash = %hash, property = %action.property, "edit of unknown node skipped");
                continue;
            };
            let mut node = self.nodes[i].clone();
            node.set_property(&action.property, value)?;
            staged.push((i, node));
        }
        if staged.is_empty() {
            return Ok(());
        }

        let relayout = touches_layout(&action.property);
        if relayout {
            self.halt();
        }
        let count = staged.len();
        for (i, node) in staged {
            self.nodes[i] = node;
        }
        tracing::debug!(property = %action.property, count, "nodes edited");
        if relayout {
            self.restart().layout(None, true)
        } else {
            self.restart().styles();
            Ok(())
        }
    }

    /// Apply an edit to edges addressed by predicate hash and persist it.
    /// If a write fails, edges already rewritten are put back.
    pub async fn edit_edge(&mut self, action: EditAction) -> Result<()> {
        let mut staged: Vec<(Triplet, Triplet)> = Vec::new();
        for (hash, value) in action.pairs()? {
            let Some(old) = self.store.get(&TripletPattern::any().predicate_hash(&hash)).await?.into_iter().next() else {
                tracing::warn!(predicate = %hash, property = %action.property, "edit of unknown edge skipped");
                continue;
            };
            let mut new = old.clone();
            new.predicate.set_property(&action.property, value)?;
            staged.push((old, new));
        }
        if staged.is_empty() {
            return Ok(());
        }

        self.halt();
        let count = staged.len();
        for (done, (old, new)) in staged.iter().enumerate() {
            if let Err(err) = self.replace_stored(old, new.clone()).await {
                // put back the edges already rewritten, newest first
                for (old, new) in staged[..done].iter().rev() {
                    if let Err(undo) = self.replace_stored(new, old.clone()).await {
                        tracing::error!(triplet = %old.key(), error = %undo, "could not roll back edge edit");
                    }
                }
                return Err(self.recover(err).await);
            }
        }
        self.rebuild_links().await?;
        tracing::debug!(property = %action.property, count, "edges edited");
        self.restart().layout(None, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphOptions;
    use crate::model::Predicate;
    use serde_json::json;

    fn graph() -> GraphModel {
        let mut g = GraphModel::open_memory(GraphOptions::default());
        g.add_node(["a", "b", "c"].map(Node::new), true).unwrap();
        g
    }

    #[test]
    fn test_pairs() {
        let broadcast = EditAction::new("color", OneOrMany::Many(vec!["a".into(), "b".into()]), json!("red"));
        assert_eq!(broadcast.pairs().unwrap().len(), 2);

        let positional = EditAction::new(
            "color",
            OneOrMany::Many(vec!["a".into(), "b".into()]),
            OneOrMany::Many(vec![json!("red"), json!("blue")]),
        );
        assert_eq!(positional.pairs().unwrap()[1], ("b".to_string(), json!("blue")));

        let mismatch = EditAction::new("color", OneOrMany::Many(vec!["a".into()]), OneOrMany::Many(vec![json!(1), json!(2)]));
        assert!(matches!(mismatch.pairs(), Err(Error::Validation(_))));

        let list = EditAction::new("tags", "a".to_string(), OneOrMany::Many(vec![json!("x"), json!("y")]));
        assert_eq!(list.pairs().unwrap(), vec![("a".to_string(), json!(["x", "y"]))]);
    }

    #[test]
    fn test_deserialize_action() {
        let a: EditAction = serde_json::from_value(json!({"property": "color", "id": ["a", "b"], "value": "red"})).unwrap();
        assert_eq!(a.id, OneOrMany::Many(vec!["a".into(), "b".into()]));
        assert_eq!(a.value, OneOrMany::One(json!("red")));
    }

    #[test]
    fn test_edit_node_broadcast() {
        let mut g = graph();
        g.edit_node(EditAction::new("color", OneOrMany::Many(vec!["a".into(), "c".into()]), json!("red"))).unwrap();
        assert_eq!(g.get_node("a").unwrap().color.as_deref(), Some("red"));
        assert_eq!(g.get_node("b").unwrap().color, None);
        assert_eq!(g.get_node("c").unwrap().color.as_deref(), Some("red"));
    }

    #[test]
    fn test_edit_node_is_all_or_nothing() {
        let mut g = graph();
        let bad = EditAction::new(
            "x",
            OneOrMany::Many(vec!["a".into(), "b".into()]),
            OneOrMany::Many(vec![json!(10), json!("wide")]),
        );
        assert!(matches!(g.edit_node(bad), Err(Error::Validation(_))));
        assert_eq!(g.get_node("a").unwrap().x, 0.0);
    }

    #[test]
    fn test_edit_node_position_reaches_engine() {
        let mut g = graph();
        g.edit_node(EditAction::new("x", "b".to_string(), json!(120.0))).unwrap();
        assert_eq!(g.get_node("b").unwrap().x, 120.0);
        assert_eq!(g.layout().node_bounds()[1].center().x, 120.0);
    }

    #[test]
    fn test_edit_unknown_node_skipped() {
        let mut g = graph();
        g.edit_node(EditAction::new("color", "ghost".to_string(), json!("red"))).unwrap();
    }

    #[tokio::test]
    async fn test_edit_edge_persists() {
        let mut g = graph();
        let t = Triplet::new(Node::new("a"), Predicate::new("rel").with_hash("p1"), Node::new("b"));
        g.add_triplet(t, true).await.unwrap();
        g.edit_edge(EditAction::new("weight", "p1".to_string(), json!(3))).await.unwrap();

        assert_eq!(g.get_predicate("p1").unwrap().get("weight"), Some(&json!(3)));
        let stored = g.store().get(&TripletPattern::any().predicate_hash("p1")).await.unwrap();
        assert_eq!(stored[0].predicate.get("weight"), Some(&json!(3)));

        let err = g.edit_edge(EditAction::new("type", "p1".to_string(), json!("other"))).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
