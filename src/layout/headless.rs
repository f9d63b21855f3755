//! Headless layout engine.
//!
//! This is the reference implementation of `LayoutEngine`. It does not
//! simulate forces: each tick projects node positions onto the alignment,
//! separation and flow constraints, and the run converges after a fixed
//! number of ticks. Edges are routed as straight segments clipped to the
//! endpoint boxes grown by the configured margin.
//!
//! Use this engine for:
//! - Testing the restart protocol and constraint plumbing
//! - Embedding the model where positions come from the user, not physics

use super::{EdgeRoute, EngineGroup, EngineLink, EngineNode, EngineScene, EngineSettings, LayoutEngine};
use crate::constraint::ResolvedConstraint;
use crate::model::{Axis, Bounds, Point, Size};

const DEFAULT_CONVERGENCE_TICKS: u32 = 30;

/// Deterministic, physics-free engine.
#[derive(Debug, Clone)]
pub struct HeadlessEngine {
    settings: EngineSettings,
    nodes: Vec<EngineNode>,
    links: Vec<EngineLink>,
    groups: Vec<EngineGroup>,
    constraints: Vec<ResolvedConstraint>,
    group_padding: f64,
    running: bool,
    ticks: u32,
    converge_after: u32,
    loads: u32,
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self {
            settings: EngineSettings::default(),
            nodes: Vec::new(),
            links: Vec::new(),
            groups: Vec::new(),
            constraints: Vec::new(),
            group_padding: 0.0,
            running: false,
            ticks: 0,
            converge_after: DEFAULT_CONVERGENCE_TICKS,
            loads: 0,
        }
    }

    /// Converge after `ticks` steps (at least one).
    pub fn converge_after(mut self, ticks: u32) -> Self {
        self.converge_after = ticks.max(1);
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn nodes(&self) -> &[EngineNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[EngineLink] {
        &self.links
    }

    pub fn groups(&self) -> &[EngineGroup] {
        &self.groups
    }

    pub fn constraints(&self) -> &[ResolvedConstraint] {
        &self.constraints
    }

    /// How many scenes have been bound.
    pub fn loads(&self) -> u32 {
        self.loads
    }

    fn coord(&self, i: usize, axis: Axis) -> f64 {
        self.nodes[i].center.along(axis)
    }

    fn shift(&mut self, i: usize, axis: Axis, delta: f64) {
        let c = &mut self.nodes[i].center;
        match axis {
            Axis::X => c.x += delta,
            Axis::Y => c.y += delta,
        }
    }

    fn separate(&mut self, axis: Axis, gap: f64, left: usize, right: usize, equality: bool) {
        if left >= self.nodes.len() || right >= self.nodes.len() || left == right {
            return;
        }
        let d = self.coord(right, axis) - self.coord(left, axis);
        let violation = gap - d;
        if violation <= 0.0 && !equality {
            return;
        }
        match (self.nodes[left].fixed, self.nodes[right].fixed) {
            (false, false) => {
                self.shift(left, axis, -violation / 2.0);
                self.shift(right, axis, violation / 2.0);
            }
            (true, false) => self.shift(right, axis, violation),
            (false, true) => self.shift(left, axis, -violation),
            (true, true) => {}
        }
    }

    fn align(&mut self, axis: Axis, offsets: &[(usize, f64)]) {
        let members: Vec<(usize, f64)> =
            offsets.iter().copied().filter(|(i, _)| *i < self.nodes.len()).collect();
        if members.len() < 2 {
            return;
        }
        let anchor = members.iter().find(|(i, _)| self.nodes[*i].fixed);
        let target = match anchor {
            Some(&(i, off)) => self.coord(i, axis) - off,
            None => members.iter().map(|&(i, off)| self.coord(i, axis) - off).sum::<f64>() / members.len() as f64,
        };
        for (i, off) in members {
            if !self.nodes[i].fixed {
                let delta = target + off - self.coord(i, axis);
                self.shift(i, axis, delta);
            }
        }
    }

    fn project(&mut self) {
        let constraints = std::mem::take(&mut self.constraints);
        for c in &constraints {
            match c {
                ResolvedConstraint::Alignment { axis, offsets } => self.align(*axis, offsets),
                ResolvedConstraint::Separation { axis, gap, left, right, equality } => {
                    self.separate(*axis, *gap, *left, *right, *equality)
                }
            }
        }
        self.constraints = constraints;

        if let Some((axis, separation)) = self.settings.flow {
            let links = self.links.clone();
            for l in links {
                self.separate(axis, separation, l.source, l.target, false);
            }
        }
    }

    fn group_box(&self, g: usize, depth: usize) -> Option<Bounds> {
        if depth > self.groups.len() {
            return None;
        }
        let group = &self.groups[g];
        let leaves = group
            .leaves
            .iter()
            .filter_map(|&i| self.nodes.get(i))
            .map(|n| Bounds::centered(n.center, n.size));
        let subgroups = group
            .groups
            .iter()
            .filter(|&&sg| sg < self.groups.len())
            .filter_map(|&sg| self.group_box(sg, depth + 1));
        let inner = leaves.chain(subgroups).reduce(|a, b| a.union(&b))?;
        let pad = if self.group_padding > 0.0 { self.group_padding } else { group.padding };
        Some(inner.inflate(pad))
    }
}

impl LayoutEngine for HeadlessEngine {
    fn configure(&mut self, settings: &EngineSettings) {
        self.settings = *settings;
    }

    fn load(&mut self, scene: EngineScene) {
        self.nodes = scene.nodes;
        self.links = scene.links;
        self.groups = scene.groups;
        self.constraints = scene.constraints;
        self.loads += 1;
    }

    fn set_node_sizes(&mut self, sizes: &[Size]) {
        for (node, size) in self.nodes.iter_mut().zip(sizes) {
            node.size = *size;
        }
    }

    fn set_group_padding(&mut self, padding: f64) {
        self.group_padding = padding;
    }

    fn start(&mut self) {
        self.ticks = 0;
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn resume(&mut self) {
        self.running = true;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.project();
        self.ticks += 1;
        if self.ticks >= self.converge_after {
            self.running = false;
            return true;
        }
        false
    }

    fn move_node(&mut self, index: usize, to: Point) {
        if let Some(n) = self.nodes.get_mut(index) {
            n.center = to;
        }
    }

    fn set_fixed(&mut self, index: usize, fixed: bool) {
        if let Some(n) = self.nodes.get_mut(index) {
            n.fixed = fixed;
        }
    }

    fn node_bounds(&self) -> Vec<Bounds> {
        self.nodes.iter().map(|n| Bounds::centered(n.center, n.size)).collect()
    }

    fn group_bounds(&self) -> Vec<Bounds> {
        (0..self.groups.len()).map(|g| self.group_box(g, 0).unwrap_or_default()).collect()
    }

    fn route_edges(&mut self) -> Vec<EdgeRoute> {
        self.links
            .iter()
            .enumerate()
            .filter(|(_, l)| l.source < self.nodes.len() && l.target < self.nodes.len())
            .map(|(i, l)| {
                let s = &self.nodes[l.source];
                let t = &self.nodes[l.target];
                let margin = self.settings.margin;
                let from = Bounds::centered(s.center, s.size).inflate(margin).ray_exit(t.center);
                let to = Bounds::centered(t.center, t.size).inflate(margin).ray_exit(s.center);
                EdgeRoute { link: i, points: vec![from, to] }
            })
            .collect()
    }
}
