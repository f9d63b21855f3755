//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use weave_graph::alignment::Guides;
use weave_graph::layout::EdgeRoute;
use weave_graph::render::SceneView;
use weave_graph::{GraphModel, GraphOptions, HeadlessEngine, MemoryStore, Renderer};

/// Renderer that records what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub binds: usize,
    pub bound_nodes: usize,
    pub position_updates: usize,
    pub routes: Vec<EdgeRoute>,
    pub route_draws: usize,
    pub guides: Option<Guides>,
    pub guide_clears: usize,
}

impl Renderer for RecordingRenderer {
    fn bind(&mut self, scene: SceneView<'_>) {
        self.binds += 1;
        self.bound_nodes = scene.nodes.len();
    }

    fn update_positions(&mut self, _scene: SceneView<'_>) {
        self.position_updates += 1;
    }

    fn draw_routes(&mut self, routes: &[EdgeRoute]) {
        self.route_draws += 1;
        self.routes = routes.to_vec();
    }

    fn show_guides(&mut self, guides: &Guides) {
        self.guides = Some(guides.clone());
    }

    fn clear_guides(&mut self) {
        self.guides = None;
        self.guide_clears += 1;
    }
}

pub type RecordedGraph = GraphModel<MemoryStore, HeadlessEngine, RecordingRenderer>;

pub fn recorded_graph(options: GraphOptions, ticks: u32) -> RecordedGraph {
    GraphModel::new(MemoryStore::new(), HeadlessEngine::new().converge_after(ticks), RecordingRenderer::default(), options)
}
