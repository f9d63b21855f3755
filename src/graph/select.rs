//! Rubber-band selection.

use serde::{Deserialize, Serialize};

use super::GraphModel;
use crate::layout::LayoutEngine;
use crate::model::{Bounds, TripletKey};
use crate::render::Renderer;
use crate::storage::TripletStore;

/// Selection rectangle. Corners may be given in any order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Boundary {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "X")]
    pub max_x: f64,
    #[serde(rename = "Y")]
    pub max_y: f64,
}

impl Boundary {
    pub fn new(x: f64, y: f64, max_x: f64, max_y: f64) -> Self {
        Self { x, y, max_x, max_y }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x.min(self.max_x), self.y.min(self.max_y), self.x.max(self.max_x), self.y.max(self.max_y))
    }
}

/// Ids of everything inside a boundary.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Selection {
    pub nodes: Vec<String>,
    pub links: Vec<TripletKey>,
    pub groups: Vec<String>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty() && self.groups.is_empty()
    }
}

impl<S: TripletStore, E: LayoutEngine, R: Renderer> GraphModel<S, E, R> {
    /// Nodes whose centre lies inside, links with both ends selected, and
    /// groups whose box lies entirely inside.
    pub fn select_by_coords(&self, boundary: Boundary) -> Selection {
        let area = boundary.bounds();
        let nodes: Vec<String> = self
            .nodes
            .iter()
            .filter(|n| area.contains_point(n.center()))
            .map(|n| n.hash.clone())
            .collect();
        let links = self
            .links
            .iter()
            .filter(|l| nodes.contains(&l.source) && nodes.contains(&l.target))
            .map(|l| l.key())
            .collect();
        let groups = self
            .groups
            .iter()
            .filter(|g| g.bounds.width() > 0.0 && area.contains(&g.bounds))
            .map(|g| g.id.clone())
            .collect();
        Selection { nodes, links, groups }
    }
}
