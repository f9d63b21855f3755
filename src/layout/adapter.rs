//! Uniform surface over a [`LayoutEngine`].
//!
//! The adapter translates the id-keyed model into the index form the
//! simulation binds to, picks link lengths according to the configured
//! strategy, and enforces stop-before-load.

use hashbrown::{HashMap, HashSet};

use super::{EdgeRoute, EngineGroup, EngineLink, EngineNode, EngineScene, EngineSettings, LayoutEngine, LinkLengthStrategy};
use crate::config::GraphOptions;
use crate::constraint::ConstraintManager;
use crate::model::{Bounds, Group, Link, Node, Point, Size};
use crate::{Error, Result};

/// Wraps the engine and remembers how it was configured.
pub struct LayoutAdapter<E> {
    engine: E,
    settings: EngineSettings,
    loaded: usize,
}

impl<E: LayoutEngine> LayoutAdapter<E> {
    pub fn new(mut engine: E, options: &GraphOptions) -> Self {
        let settings = Self::settings_for(options);
        engine.configure(&settings);
        Self { engine, settings, loaded: 0 }
    }

    fn settings_for(options: &GraphOptions) -> EngineSettings {
        EngineSettings {
            size: Size::new(options.width, options.height),
            margin: options.margin,
            avoid_overlaps: options.avoid_overlaps,
            handle_disconnected: options.handle_disconnected,
            flow: match options.layout {
                LinkLengthStrategy::FlowLayout { axis, separation } => Some((axis, separation)),
                _ => None,
            },
        }
    }

    /// Push the current options to the engine.
    pub fn reconfigure(&mut self, options: &GraphOptions) {
        self.settings = Self::settings_for(options);
        self.engine.configure(&self.settings);
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Number of nodes in the currently bound scene.
    pub fn loaded_nodes(&self) -> usize {
        self.loaded
    }

    /// Bind a scene. Fails if the simulation is still ticking.
    pub fn load(&mut self, scene: EngineScene) -> Result<()> {
        if self.engine.is_running() {
            return Err(Error::Protocol("cannot rebind layout arrays while the simulation is running".into()));
        }
        self.loaded = scene.nodes.len();
        tracing::debug!(
            nodes = scene.nodes.len(),
            links = scene.links.len(),
            groups = scene.groups.len(),
            constraints = scene.constraints.len(),
            "layout scene bound"
        );
        self.engine.load(scene);
        Ok(())
    }

    pub fn start(&mut self) {
        self.engine.start();
    }

    pub fn stop(&mut self) {
        if self.engine.is_running() {
            self.engine.stop();
        }
    }

    pub fn resume(&mut self) {
        self.engine.resume();
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn tick(&mut self) -> bool {
        self.engine.tick()
    }

    pub fn set_node_sizes(&mut self, sizes: &[Size]) {
        self.engine.set_node_sizes(sizes);
    }

    pub fn set_group_padding(&mut self, padding: f64) {
        self.engine.set_group_padding(padding);
    }

    pub fn move_node(&mut self, index: usize, to: Point) {
        if index < self.loaded {
            self.engine.move_node(index, to);
        }
    }

    pub fn set_fixed(&mut self, index: usize, fixed: bool) {
        if index < self.loaded {
            self.engine.set_fixed(index, fixed);
        }
    }

    pub fn node_bounds(&self) -> Vec<Bounds> {
        self.engine.node_bounds()
    }

    pub fn group_bounds(&self) -> Vec<Bounds> {
        self.engine.group_bounds()
    }

    pub fn route_edges(&mut self) -> Vec<EdgeRoute> {
        self.engine.route_edges()
    }
}

// ============================================================================
// Scene building
// ============================================================================

/// Borrowed model state needed to build a scene.
pub struct SceneSource<'a> {
    pub nodes: &'a [Node],
    pub links: &'a [Link],
    pub groups: &'a [Group],
    pub node_index: &'a HashMap<String, usize>,
    pub group_index: &'a HashMap<String, usize>,
    pub constraints: &'a ConstraintManager,
}

/// Resolve ids to indices and compute link lengths.
pub fn build_scene(src: &SceneSource<'_>, options: &GraphOptions) -> EngineScene {
    let nodes = src
        .nodes
        .iter()
        .map(|n| EngineNode { center: n.center(), size: n.size(), fixed: n.fixed })
        .collect();

    let mut links = Vec::with_capacity(src.links.len());
    let mut resolved_links = Vec::with_capacity(src.links.len());
    for link in src.links {
        match (src.node_index.get(&link.source), src.node_index.get(&link.target)) {
            (Some(&s), Some(&t)) => {
                links.push(EngineLink { source: s, target: t, length: 0.0 });
                resolved_links.push(link);
            }
            _ => tracing::warn!(link = %link.key(), "link endpoint not bound, skipping"),
        }
    }
    let lengths = link_lengths(src.nodes.len(), &links, &resolved_links, options);
    for (link, length) in links.iter_mut().zip(lengths) {
        link.length = length;
    }

    let groups = src
        .groups
        .iter()
        .map(|g| EngineGroup {
            leaves: g.leaves.iter().filter_map(|h| src.node_index.get(h).copied()).collect(),
            groups: g.groups.iter().filter_map(|id| src.group_index.get(id).copied()).collect(),
            padding: options.group_pad,
        })
        .collect();

    EngineScene { nodes, links, groups, constraints: src.constraints.resolve(src.node_index) }
}

/// Ideal length per link under the configured strategy.
pub fn link_lengths(node_count: usize, links: &[EngineLink], source: &[&Link], options: &GraphOptions) -> Vec<f64> {
    let base: Vec<f64> = source.iter().map(|l| options.link_distance.resolve(l)).collect();
    match options.layout {
        LinkLengthStrategy::LinkDistance | LinkLengthStrategy::FlowLayout { .. } => base,
        LinkLengthStrategy::JaccardLinkLengths { weight } => {
            let mut neighbours: Vec<HashSet<usize>> = vec![HashSet::new(); node_count];
            for l in links {
                if l.source != l.target {
                    neighbours[l.source].insert(l.target);
                    neighbours[l.target].insert(l.source);
                }
            }
            links
                .iter()
                .zip(base)
                .map(|(l, ideal)| {
                    let a = &neighbours[l.source];
                    let b = &neighbours[l.target];
                    let shared = a.intersection(b).count();
                    let union = a.len() + b.len() - shared;
                    let similarity = if union == 0 { 0.0 } else { shared as f64 / union as f64 };
                    ideal * (1.0 + weight * (1.0 - similarity))
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Setting;
    use crate::layout::HeadlessEngine;
    use crate::model::Predicate;

    fn link(s: &str, t: &str) -> Link {
        Link { source: s.into(), target: t.into(), predicate: Predicate::new("r") }
    }

    fn index(hashes: &[&str]) -> HashMap<String, usize> {
        hashes.iter().enumerate().map(|(i, h)| (h.to_string(), i)).collect()
    }

    #[test]
    fn test_load_refused_while_running() {
        let opts = GraphOptions::default();
        let mut adapter = LayoutAdapter::new(HeadlessEngine::new(), &opts);
        adapter.load(EngineScene::default()).unwrap();
        adapter.start();
        assert!(matches!(adapter.load(EngineScene::default()), Err(Error::Protocol(_))));
        adapter.stop();
        assert!(adapter.load(EngineScene::default()).is_ok());
    }

    #[test]
    fn test_settings_follow_options() {
        let opts = GraphOptions { margin: 4.0, width: 300.0, ..GraphOptions::default() };
        let mut adapter = LayoutAdapter::new(HeadlessEngine::new(), &opts);
        assert_eq!(adapter.settings().margin, 4.0);
        assert_eq!(adapter.engine().settings().margin, 4.0);
        assert_eq!(adapter.settings().size, Size::new(300.0, 600.0));

        adapter.reconfigure(&GraphOptions { margin: 0.0, ..opts });
        assert_eq!(adapter.engine().settings().margin, 0.0);
    }

    #[test]
    fn test_constant_and_computed_link_distance() {
        let links = [link("a", "b"), link("b", "c")];
        let refs: Vec<&Link> = links.iter().collect();
        let engine_links = [
            EngineLink { source: 0, target: 1, length: 0.0 },
            EngineLink { source: 1, target: 2, length: 0.0 },
        ];

        let opts = GraphOptions::default().with_link_distance(42.0);
        assert_eq!(link_lengths(3, &engine_links, &refs, &opts), vec![42.0, 42.0]);

        let opts = GraphOptions::default()
            .with_link_distance(Setting::computed(|l: &Link| if l.source == "a" { 10.0 } else { 20.0 }));
        assert_eq!(link_lengths(3, &engine_links, &refs, &opts), vec![10.0, 20.0]);
    }

    #[test]
    fn test_jaccard_lengths() {
        // triangle a-b-c plus a pendant d on c
        let links = [link("a", "b"), link("b", "c"), link("a", "c"), link("c", "d")];
        let refs: Vec<&Link> = links.iter().collect();
        let idx = index(&["a", "b", "c", "d"]);
        let engine_links: Vec<EngineLink> = links
            .iter()
            .map(|l| EngineLink { source: idx[&l.source], target: idx[&l.target], length: 0.0 })
            .collect();
        let mut opts = GraphOptions::default().with_link_distance(100.0);
        opts.layout = LinkLengthStrategy::JaccardLinkLengths { weight: 1.0 };

        let lengths = link_lengths(4, &engine_links, &refs, &opts);
        // a:{b,c} b:{a,c} share c, union {a,b,c} -> similarity 1/3
        assert!((lengths[0] - 100.0 * (1.0 + 2.0 / 3.0)).abs() < 1e-9);
        // c:{a,b,d} d:{c} share nothing -> similarity 0
        assert!((lengths[3] - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_build_scene_resolves_ids() {
        let nodes = vec![Node::new("a"), Node::new("b"), Node::new("c")];
        let links = vec![link("a", "c"), link("a", "ghost")];
        let mut g = Group::new("g", Default::default());
        g.leaves = vec!["b".into(), "c".into()];
        let groups = vec![g];
        let node_index = index(&["a", "b", "c"]);
        let group_index = index(&["g"]);
        let constraints = ConstraintManager::new();
        let src = SceneSource {
            nodes: &nodes,
            links: &links,
            groups: &groups,
            node_index: &node_index,
            group_index: &group_index,
            constraints: &constraints,
        };
        let scene = build_scene(&src, &GraphOptions::default());
        assert_eq!(scene.nodes.len(), 3);
        assert_eq!(scene.links.len(), 1);
        assert_eq!((scene.links[0].source, scene.links[0].target), (0, 2));
        assert_eq!(scene.groups[0].leaves, vec![1, 2]);
        assert_eq!(scene.groups[0].padding, 20.0);
    }
}
