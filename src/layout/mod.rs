//! # Layout Engine Trait
//!
//! The force simulation is an external collaborator. The graph model talks
//! to it through [`LayoutEngine`] and only through [`LayoutAdapter`], which
//! refuses to swap the bound arrays while the engine is running.
//!
//! ## Implementations
//!
//! | Engine | Module | Description |
//! |--------|--------|-------------|
//! | `HeadlessEngine` | `headless` | Deterministic constraint projection, straight-line routing |

pub mod adapter;
pub mod headless;

use serde::{Deserialize, Serialize};

use crate::constraint::ResolvedConstraint;
use crate::model::{Axis, Bounds, Point, Size};

pub use adapter::LayoutAdapter;
pub use headless::HeadlessEngine;

// ============================================================================
// Link-length strategy
// ============================================================================

/// How ideal link lengths are derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LinkLengthStrategy {
    /// `link_distance` per link, constant or computed.
    #[default]
    LinkDistance,
    /// Directed links flow along `axis`, targets at least `separation` after sources.
    FlowLayout { axis: Axis, separation: f64 },
    /// Lengths scaled by neighbourhood dissimilarity: nodes sharing few
    /// neighbours sit further apart.
    JaccardLinkLengths { weight: f64 },
}

// ============================================================================
// Engine-side data (index form)
// ============================================================================

/// A node as the simulation sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineNode {
    pub center: Point,
    pub size: Size,
    pub fixed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineLink {
    pub source: usize,
    pub target: usize,
    pub length: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineGroup {
    pub leaves: Vec<usize>,
    pub groups: Vec<usize>,
    pub padding: f64,
}

/// Everything the simulation binds to for one restart cycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineScene {
    pub nodes: Vec<EngineNode>,
    pub links: Vec<EngineLink>,
    pub groups: Vec<EngineGroup>,
    pub constraints: Vec<ResolvedConstraint>,
}

/// Simulation-wide switches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub size: Size,
    /// Clearance between routed edge ends and node boxes.
    pub margin: f64,
    pub avoid_overlaps: bool,
    pub handle_disconnected: bool,
    /// `Some((axis, separation))` when links must flow in one direction.
    pub flow: Option<(Axis, f64)>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            size: Size::new(900.0, 600.0),
            margin: 10.0,
            avoid_overlaps: true,
            handle_disconnected: true,
            flow: None,
        }
    }
}

/// Polyline for one link, in link order.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRoute {
    pub link: usize,
    pub points: Vec<Point>,
}

// ============================================================================
// LayoutEngine Trait
// ============================================================================

/// Contract with the constraint-based force simulation.
///
/// The simulation owns node geometry between `start` and convergence. `load`
/// replaces the bound arrays and must only be called while stopped;
/// `move_node`, `set_fixed` and the sizing calls do not reshape the arrays and
/// are allowed at any time.
pub trait LayoutEngine {
    fn configure(&mut self, settings: &EngineSettings);

    /// Bind a new scene. Node indices in links, groups and constraints refer
    /// to positions in `scene.nodes`.
    fn load(&mut self, scene: EngineScene);

    /// Measured sizes, one per loaded node.
    fn set_node_sizes(&mut self, sizes: &[Size]);

    fn set_group_padding(&mut self, padding: f64);

    fn start(&mut self);

    fn stop(&mut self);

    /// Continue after `stop` without resetting the cooling schedule.
    fn resume(&mut self);

    fn is_running(&self) -> bool;

    /// Advance one step. Returns true once the layout has converged.
    fn tick(&mut self) -> bool;

    fn move_node(&mut self, index: usize, to: Point);

    fn set_fixed(&mut self, index: usize, fixed: bool);

    /// Current node boxes, in loaded order.
    fn node_bounds(&self) -> Vec<Bounds>;

    /// Current group boxes, in loaded order.
    fn group_bounds(&self) -> Vec<Bounds>;

    /// Route every loaded link around node boxes.
    fn route_edges(&mut self) -> Vec<EdgeRoute>;
}
