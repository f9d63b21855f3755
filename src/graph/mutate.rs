//! Node and triplet mutations.

use super::{GraphModel, NodeBatch};
use crate::layout::LayoutEngine;
use crate::model::{Triplet, TripletPattern};
use crate::render::Renderer;
use crate::storage::TripletStore;
use crate::{Error, Result};

impl<S: TripletStore, E: LayoutEngine, R: Renderer> GraphModel<S, E, R> {
    /// Add one node or a batch. The whole batch is validated before anything
    /// changes; hashes already present are skipped.
    pub fn add_node(&mut self, nodes: impl Into<NodeBatch>, prevent_layout: bool) -> Result<()> {
        let NodeBatch(nodes) = nodes.into();
        for node in &nodes {
            node.validate()?;
        }

        self.halt();
        let mut added = 0usize;
        for node in nodes {
            if self.node_index.contains_key(&node.hash) {
                tracing::debug!(hash = %node.hash, "node already present, skipping");
                continue;
            }
            self.insert_node(node);
            added += 1;
        }
        tracing::debug!(added, total = self.nodes.len(), "nodes added");
        self.restart().layout(None, prevent_layout)
    }

    /// Persist a triplet, adding its endpoints to the model if needed.
    pub async fn add_triplet(&mut self, triplet: Triplet, prevent_layout: bool) -> Result<()> {
        triplet.validate()?;
        let key = triplet.key();
        if self.store.contains(&key).await? {
            return Err(Error::duplicate(&key));
        }
        self.check_predicate_hash(&triplet, None).await?;

        self.halt();
        self.store.put(triplet.clone()).await?;
        for end in [triplet.subject, triplet.object] {
            if !self.node_index.contains_key(&end.hash) {
                self.insert_node(end);
            }
        }
        self.rebuild_links().await?;
        tracing::debug!(triplet = %key, "triplet added");
        self.restart().layout(None, prevent_layout)
    }

    /// Delete the triplet with this key. Absent triplets are a no-op.
    pub async fn remove_triplet(&mut self, triplet: &Triplet, prevent_layout: bool) -> Result<()> {
        let key = triplet.key();
        if !self.store.contains(&key).await? {
            tracing::debug!(triplet = %key, "triplet not stored, nothing to remove");
            return Ok(());
        }

        self.halt();
        self.store.del(triplet).await?;
        self.rebuild_links().await?;
        tracing::debug!(triplet = %key, "triplet removed");
        self.restart().layout(None, prevent_layout)
    }

    /// Replace the stored triplet whose predicate carries the same hash.
    ///
    /// Endpoint changes relayout the graph; predicate-only changes rebind in
    /// place. A failed write leaves the old triplet stored.
    pub async fn update_triplet(&mut self, triplet: Triplet) -> Result<()> {
        triplet.validate()?;
        let Some(hash) = triplet.predicate.hash.clone() else {
            return Err(Error::Validation("update_triplet needs a predicate hash".into()));
        };
        let Some(old) = self.store.get(&TripletPattern::any().predicate_hash(&hash)).await?.into_iter().next() else {
            tracing::warn!(predicate = %hash, "no stored triplet with this predicate hash");
            return Ok(());
        };

        let key = triplet.key();
        let old_key = old.key();
        if key != old_key && self.store.contains(&key).await? {
            return Err(Error::duplicate(&key));
        }
        self.check_predicate_hash(&triplet, Some(&old_key)).await?;
        let moved = old_key.subject != key.subject || old_key.object != key.object;

        self.halt();
        if let Err(err) = self.replace_stored(&old, triplet.clone()).await {
            return Err(self.recover(err).await);
        }
        for end in [triplet.subject, triplet.object] {
            if !self.node_index.contains_key(&end.hash) {
                self.insert_node(end);
            }
        }
        self.rebuild_links().await?;
        tracing::debug!(from = %old_key, to = %key, "triplet updated");
        self.restart().layout(None, !moved)
    }

    /// Remove a node, every triplet touching it, its group membership and
    /// the constraints naming it. Unknown hashes are logged and ignored.
    pub async fn remove_node(&mut self, hash: &str) -> Result<()> {
        let Some(&index) = self.node_index.get(hash) else {
            tracing::warn!(hash, "cannot remove unknown node");
            return Ok(());
        };

        self.halt();
        let incident = self.store.incident(hash).await?;
        for t in &incident {
            if let Err(err) = self.store.del(t).await {
                // the node stays; links follow whatever the store still holds
                return Err(self.recover(err).await);
            }
        }

        self.detach_node(hash);
        self.prune_groups();
        self.nodes.remove(index);
        self.reindex_nodes();
        let constraints = self.constraints.forget_node(hash);
        if self.drag.as_ref().is_some_and(|d| d.hash == hash) {
            self.drag = None;
            self.renderer.clear_guides();
        }

        self.rebuild_links().await?;
        tracing::debug!(hash, triplets = incident.len(), constraints, "node removed");
        self.restart().layout(None, false)
    }
}
