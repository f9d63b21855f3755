//! Coordinate buckets for edge and centre alignment.

use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::model::{Axis, Bounds, Span};

/// Cross-axis extents of the nodes sharing one coordinate.
pub type Extents = SmallVec<[Span; 4]>;

/// Which part of the dragged node lines up with the bucket coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlignKind {
    Center,
    /// Left or top edge.
    Leading,
    /// Right or bottom edge.
    Trailing,
}

/// A winning bucket for one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignHit {
    pub axis: Axis,
    pub kind: AlignKind,
    /// Bucket coordinate the guide is drawn on.
    pub line: f64,
    /// New centre of the dragged node on `axis`.
    pub snapped: f64,
    pub extents: Extents,
}

/// Four coordinate buckets: edges and centres, per axis.
#[derive(Debug, Clone, Default)]
pub struct AlignGrid {
    grid_x: BTreeMap<i64, Extents>,
    grid_y: BTreeMap<i64, Extents>,
    grid_cx: BTreeMap<i64, Extents>,
    grid_cy: BTreeMap<i64, Extents>,
}

fn key(v: f64) -> i64 {
    v.round() as i64
}

impl AlignGrid {
    pub fn build<'a>(boxes: impl IntoIterator<Item = &'a Bounds>) -> Self {
        let mut grid = AlignGrid::default();
        for b in boxes {
            let ys = b.span(Axis::Y);
            let xs = b.span(Axis::X);
            grid.grid_x.entry(key(b.x)).or_default().push(ys);
            grid.grid_x.entry(key(b.max_x)).or_default().push(ys);
            grid.grid_y.entry(key(b.y)).or_default().push(xs);
            grid.grid_y.entry(key(b.max_y)).or_default().push(xs);
            grid.grid_cx.entry(key(b.mid(Axis::X))).or_default().push(ys);
            grid.grid_cy.entry(key(b.mid(Axis::Y))).or_default().push(xs);
        }
        grid
    }

    pub fn edges(&self, axis: Axis) -> &BTreeMap<i64, Extents> {
        match axis {
            Axis::X => &self.grid_x,
            Axis::Y => &self.grid_y,
        }
    }

    pub fn centers(&self, axis: Axis) -> &BTreeMap<i64, Extents> {
        match axis {
            Axis::X => &self.grid_cx,
            Axis::Y => &self.grid_cy,
        }
    }

    /// Best alignment for a node centred at `p` with half-extent `offset`.
    ///
    /// Candidates are searched centre first, then leading edge, then
    /// trailing edge, nearest key first within each. The bucket holding the
    /// most nodes wins; a later candidate only replaces an earlier one with
    /// strictly more nodes.
    pub fn find(&self, axis: Axis, p: f64, offset: f64, threshold: f64) -> Option<AlignHit> {
        let lookups = [
            (AlignKind::Center, self.centers(axis), p, 0.0),
            (AlignKind::Leading, self.edges(axis), p - offset, offset),
            (AlignKind::Trailing, self.edges(axis), p + offset, -offset),
        ];

        let mut best: Option<AlignHit> = None;
        for (kind, buckets, at, shift) in lookups {
            for (line, extents) in nearest(buckets, at, threshold) {
                if best.as_ref().is_none_or(|b| extents.len() > b.extents.len()) {
                    best = Some(AlignHit { axis, kind, line, snapped: line + shift, extents: extents.clone() });
                }
            }
        }
        best
    }
}

/// Buckets whose key lies within `threshold` of `at`, nearest first.
fn nearest(buckets: &BTreeMap<i64, Extents>, at: f64, threshold: f64) -> Vec<(f64, &Extents)> {
    let lo = (at - threshold).ceil() as i64;
    let hi = (at + threshold).floor() as i64;
    if lo > hi {
        return Vec::new();
    }
    let mut hits: Vec<(f64, &Extents)> = buckets.range(lo..=hi).map(|(k, v)| (*k as f64, v)).collect();
    hits.sort_by(|a, b| (a.0 - at).abs().total_cmp(&(b.0 - at).abs()));
    hits
}
