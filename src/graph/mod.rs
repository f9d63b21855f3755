//! # Graph Model
//!
//! [`GraphModel`] owns the nodes, the link cache, the groups and the
//! constraints of one diagram, together with the id indices that are the only
//! supported lookup path. Every mutation goes through it, and every mutation
//! follows the same sequence:
//!
//! ```text
//! validate → stop simulation → mutate (await store) → rebuild links → restart
//! ```
//!
//! Operations are split across submodules: `mutate` (nodes and triplets),
//! `groups`, `edit`, `select`.

mod mutate;
mod groups;
mod edit;
mod select;

use hashbrown::HashMap;

use crate::alignment::AlignmentEngine;
use crate::config::GraphOptions;
use crate::constraint::{Constraint, ConstraintManager};
use crate::interaction::DragState;
use crate::layout::adapter::{build_scene, SceneSource};
use crate::layout::{EngineScene, HeadlessEngine, LayoutAdapter, LayoutEngine};
use crate::model::{Group, Link, Node, Predicate, Triplet, TripletKey, TripletPattern};
use crate::render::{NullRenderer, Renderer, SceneView};
use crate::restart::RestartProtocol;
use crate::storage::{MemoryStore, TripletStore};
use crate::{Error, Result};

pub use edit::{EditAction, OneOrMany};
pub use select::{Boundary, Selection};

// ============================================================================
// Node batches
// ============================================================================

/// One node or many, for `add_node`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeBatch(pub Vec<Node>);

impl From<Node> for NodeBatch {
    fn from(node: Node) -> Self {
        NodeBatch(vec![node])
    }
}

impl From<Vec<Node>> for NodeBatch {
    fn from(nodes: Vec<Node>) -> Self {
        NodeBatch(nodes)
    }
}

impl<const N: usize> From<[Node; N]> for NodeBatch {
    fn from(nodes: [Node; N]) -> Self {
        NodeBatch(nodes.into())
    }
}

// ============================================================================
// GraphModel
// ============================================================================

/// One diagram instance.
pub struct GraphModel<S = MemoryStore, E = HeadlessEngine, R = NullRenderer> {
    pub(crate) store: S,
    pub(crate) layout: LayoutAdapter<E>,
    pub(crate) renderer: R,
    pub(crate) options: GraphOptions,
    pub(crate) alignment: AlignmentEngine,

    pub(crate) nodes: Vec<Node>,
    pub(crate) links: Vec<Link>,
    pub(crate) groups: Vec<Group>,
    pub(crate) constraints: ConstraintManager,

    pub(crate) node_index: HashMap<String, usize>,
    pub(crate) predicate_map: HashMap<String, Predicate>,
    pub(crate) group_index: HashMap<String, usize>,

    pub(crate) protocol: RestartProtocol,
    pub(crate) drag: Option<DragState>,
    pub(crate) suppress_click: bool,
    pub(crate) next_group_seq: u64,
}

/// In-memory graph for testing and embedding.
impl GraphModel<MemoryStore, HeadlessEngine, NullRenderer> {
    pub fn open_memory(options: GraphOptions) -> Self {
        Self::new(MemoryStore::new(), HeadlessEngine::new(), NullRenderer, options)
    }
}

impl<S: TripletStore, E: LayoutEngine, R: Renderer> GraphModel<S, E, R> {
    /// Create a graph over the given collaborators.
    pub fn new(store: S, engine: E, renderer: R, options: GraphOptions) -> Self {
        let layout = LayoutAdapter::new(engine, &options);
        let alignment = AlignmentEngine::new(options.snap_to_alignment, options.snap_threshold);
        Self {
            store,
            layout,
            renderer,
            options,
            alignment,
            nodes: Vec::new(),
            links: Vec::new(),
            groups: Vec::new(),
            constraints: ConstraintManager::new(),
            node_index: HashMap::new(),
            predicate_map: HashMap::new(),
            group_index: HashMap::new(),
            protocol: RestartProtocol::new(),
            drag: None,
            suppress_click: false,
            next_group_seq: 1,
        }
    }

    /// Build a graph whose model mirrors what is already in the store.
    pub async fn open(store: S, engine: E, renderer: R, options: GraphOptions) -> Result<Self> {
        let mut graph = Self::new(store, engine, renderer, options);
        let triplets = graph.store.get(&TripletPattern::any()).await?;
        for t in triplets {
            for end in [t.subject, t.object] {
                if !graph.node_index.contains_key(&end.hash) {
                    graph.insert_node(end);
                }
            }
        }
        graph.rebuild_links().await?;
        graph.restart().layout(None, false)?;
        Ok(graph)
    }

    /// Stop the simulation, clear drag visuals and release the store.
    pub async fn close(mut self) -> Result<()> {
        self.layout.stop();
        self.renderer.clear_guides();
        self.store.shutdown().await
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn options(&self) -> &GraphOptions {
        &self.options
    }

    /// Engine switches apply on the next `handle_disconnects`, snapping on
    /// the next drag.
    pub fn options_mut(&mut self) -> &mut GraphOptions {
        &mut self.options
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn layout(&self) -> &LayoutAdapter<E> {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut LayoutAdapter<E> {
        &mut self.layout
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Derived edges. Only reflects a store mutation after it was awaited.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn constraints(&self) -> &[Constraint] {
        self.constraints.constraints()
    }

    pub fn get_node(&self, hash: &str) -> Option<&Node> {
        self.node_index.get(hash).map(|&i| &self.nodes[i])
    }

    pub fn get_group(&self, id: &str) -> Option<&Group> {
        self.group_index.get(id).map(|&i| &self.groups[i])
    }

    pub fn get_predicate(&self, hash: &str) -> Option<&Predicate> {
        self.predicate_map.get(hash)
    }

    /// Every addressable predicate, in link order.
    pub fn predicates(&self) -> Vec<&Predicate> {
        self.links
            .iter()
            .filter_map(|l| l.predicate.hash.as_deref())
            .filter_map(|h| self.predicate_map.get(h))
            .collect()
    }

    /// Position of a node in the bound array for this restart cycle.
    pub fn node_position(&self, hash: &str) -> Option<usize> {
        self.node_index.get(hash).copied()
    }

    // ========================================================================
    // Internal bookkeeping
    // ========================================================================

    fn render_parts(&mut self) -> (&mut R, SceneView<'_>) {
        (&mut self.renderer, SceneView { nodes: &self.nodes, links: &self.links, groups: &self.groups })
    }

    /// Let the renderer diff against the current data.
    pub(crate) fn bind_renderer(&mut self) {
        let (renderer, view) = self.render_parts();
        renderer.bind(view);
    }

    /// Move rendered visuals to the current geometry.
    pub(crate) fn update_renderer(&mut self) {
        let (renderer, view) = self.render_parts();
        renderer.update_positions(view);
    }

    pub(crate) fn scene(&self) -> EngineScene {
        build_scene(
            &SceneSource {
                nodes: &self.nodes,
                links: &self.links,
                groups: &self.groups,
                node_index: &self.node_index,
                group_index: &self.group_index,
                constraints: &self.constraints,
            },
            &self.options,
        )
    }

    /// Stop the simulation before touching bound arrays.
    pub(crate) fn halt(&mut self) {
        self.layout.stop();
        self.protocol.interrupt();
    }

    pub(crate) fn insert_node(&mut self, mut node: Node) {
        if node.width > 0.0 && node.height > 0.0 {
            node.sized = true;
        }
        node.refresh_bounds();
        self.node_index.insert(node.hash.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    pub(crate) fn reindex_nodes(&mut self) {
        self.node_index = self.nodes.iter().enumerate().map(|(i, n)| (n.hash.clone(), i)).collect();
    }

    pub(crate) fn reindex_groups(&mut self) {
        self.group_index = self.groups.iter().enumerate().map(|(i, g)| (g.id.clone(), i)).collect();
    }

    /// Regenerate links and the predicate map from the store.
    pub(crate) async fn rebuild_links(&mut self) -> Result<()> {
        let triplets = self.store.get(&TripletPattern::any()).await?;
        let mut links = Vec::with_capacity(triplets.len());
        let mut predicates = HashMap::new();
        for t in triplets {
            if !self.node_index.contains_key(&t.subject.hash) || !self.node_index.contains_key(&t.object.hash) {
                tracing::warn!(triplet = %t.key(), "stored triplet references an unknown node");
                continue;
            }
            // first stored match, the same one update_triplet and edit_edge pick
            if let Some(h) = &t.predicate.hash {
                predicates.entry(h.clone()).or_insert_with(|| t.predicate.clone());
            }
            links.push(Link { source: t.subject.hash, target: t.object.hash, predicate: t.predicate });
        }
        tracing::debug!(links = links.len(), "link cache rebuilt");
        self.links = links;
        self.predicate_map = predicates;
        Ok(())
    }

    /// Resync the link cache after a failed store write and hand the write
    /// error back. A rebuild failure is logged; the write error wins.
    pub(crate) async fn recover(&mut self, err: Error) -> Error {
        if let Err(rebuild) = self.rebuild_links().await {
            tracing::error!(error = %rebuild, "link cache rebuild failed after store error");
        }
        err
    }

    /// Swap `old` for `new` in the store. If `new` cannot be written, `old`
    /// is put back before the error is returned.
    pub(crate) async fn replace_stored(&self, old: &Triplet, new: Triplet) -> Result<()> {
        self.store.del(old).await?;
        if let Err(err) = self.store.put(new).await {
            if let Err(restore) = self.store.put(old.clone()).await {
                tracing::error!(triplet = %old.key(), error = %restore, "could not restore triplet");
            }
            return Err(err);
        }
        Ok(())
    }

    /// Reject `triplet` if its predicate hash is carried by a stored triplet
    /// with another key. `own` names a key that may keep the hash.
    pub(crate) async fn check_predicate_hash(&self, triplet: &Triplet, own: Option<&TripletKey>) -> Result<()> {
        let Some(hash) = triplet.predicate.hash.as_deref() else {
            return Ok(());
        };
        let key = triplet.key();
        let holders = self.store.get(&TripletPattern::any().predicate_hash(hash)).await?;
        match holders.iter().map(Triplet::key).find(|k| *k != key && own != Some(k)) {
            Some(other) => Err(Error::Validation(format!("predicate hash {hash} already belongs to {other}"))),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Constraints
    // ========================================================================

    /// Add a constraint. Unknown node ids are logged and ignored.
    pub fn create_constraint(&mut self, constraint: Constraint, prevent_layout: bool) -> Result<bool> {
        match self.constraints.create(constraint, &self.node_index) {
            Ok(false) => Ok(false),
            Ok(true) => {
                self.halt();
                self.restart().layout(None, prevent_layout)?;
                Ok(true)
            }
            Err(e @ crate::Error::Reference(_)) => {
                tracing::warn!(error = %e, "constraint not created");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Remove a constraint. Unknown node ids are logged and ignored.
    pub fn remove_constraint(&mut self, constraint: &Constraint, prevent_layout: bool) -> Result<bool> {
        match self.constraints.remove(constraint, &self.node_index) {
            Ok(false) => Ok(false),
            Ok(true) => {
                self.halt();
                self.restart().layout(None, prevent_layout)?;
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(error = %e, "constraint not removed");
                Ok(false)
            }
        }
    }
}
