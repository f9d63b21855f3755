//! # Drag-time Alignment
//!
//! Invoked once per drag-move with the dragged node's proposed centre. The
//! engine holds no state between calls: buckets, runs and guides are rebuilt
//! every time and discarded on drag end.
//!
//! ```text
//! proposed centre ─┬─ AlignGrid::find(X) ─┐
//!                  ├─ AlignGrid::find(Y) ─┼─ snapped centre + guide lines
//!                  └─ distribute(axis without a hit) ─ dimension annotations
//! ```

pub mod grid;
pub mod distribution;

use crate::model::{Axis, Bounds, Point, Segment, Size, Span};

pub use distribution::{Dimension, DistributionHit};
pub use grid::{AlignGrid, AlignHit, AlignKind};

/// A straight alignment guide through every aligned node.
#[derive(Debug, Clone, PartialEq)]
pub struct GuideLine {
    pub axis: Axis,
    pub kind: AlignKind,
    pub segment: Segment,
    /// Other nodes sharing the line.
    pub nodes: usize,
}

/// Everything drawn for one drag-move.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Guides {
    pub lines: Vec<GuideLine>,
    pub dimensions: Vec<Dimension>,
}

impl Guides {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.dimensions.is_empty()
    }
}

/// Result of one drag-move: where the node goes and what to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DragFrame {
    pub position: Point,
    pub snapped_x: bool,
    pub snapped_y: bool,
    pub guides: Guides,
}

/// Stateless snap calculator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentEngine {
    pub enabled: bool,
    pub threshold: f64,
}

impl Default for AlignmentEngine {
    fn default() -> Self {
        Self { enabled: true, threshold: 10.0 }
    }
}

impl AlignmentEngine {
    pub fn new(enabled: bool, threshold: f64) -> Self {
        Self { enabled, threshold: threshold.max(0.0) }
    }

    /// Compute the frame for a node of `size` proposed at `proposed`, given
    /// the boxes of every other node.
    pub fn align(&self, proposed: Point, size: Size, others: &[Bounds]) -> DragFrame {
        let mut frame = DragFrame { position: proposed, snapped_x: false, snapped_y: false, guides: Guides::default() };
        if !self.enabled || others.is_empty() {
            return frame;
        }

        let grid = AlignGrid::build(others);
        let hit_x = grid.find(Axis::X, proposed.x, size.width / 2.0, self.threshold);
        let hit_y = grid.find(Axis::Y, proposed.y, size.height / 2.0, self.threshold);

        if let Some(h) = &hit_x {
            frame.position.x = h.snapped;
            frame.snapped_x = true;
        }
        if let Some(h) = &hit_y {
            frame.position.y = h.snapped;
            frame.snapped_y = true;
        }

        for axis in [Axis::X, Axis::Y] {
            let snapped = match axis {
                Axis::X => frame.snapped_x,
                Axis::Y => frame.snapped_y,
            };
            if snapped {
                continue;
            }
            let dragged = Bounds::centered(frame.position, size);
            if let Some(hit) = distribution::distribute(axis, &dragged, others, self.threshold) {
                match axis {
                    Axis::X => {
                        frame.position.x = hit.snapped;
                        frame.snapped_x = true;
                    }
                    Axis::Y => {
                        frame.position.y = hit.snapped;
                        frame.snapped_y = true;
                    }
                }
                frame.guides.dimensions.extend(hit.dimensions);
            }
        }

        let dragged = Bounds::centered(frame.position, size);
        for hit in [hit_x, hit_y].into_iter().flatten() {
            frame.guides.lines.push(guide_line(&hit, &dragged));
        }
        frame
    }
}

/// Guide through the bucket coordinate, spanning every aligned extent and
/// the dragged node at its final position.
fn guide_line(hit: &AlignHit, dragged: &Bounds) -> GuideLine {
    let span = hit
        .extents
        .iter()
        .fold(dragged.span(hit.axis.cross()), |acc: Span, s| acc.merge(s));
    GuideLine { axis: hit.axis, kind: hit.kind, segment: Segment::across(hit.axis, hit.line, span), nodes: hit.extents.len() }
}
