//! Equal-gap distribution along one axis.
//!
//! Nodes sharing the dragged node's cross-axis band, widened by the snap
//! threshold on both sides, form a run. Overlapping
//! members merge into clusters, the gaps between consecutive clusters are
//! bucketed by size, and the dragged node may snap to repeat one of those gaps
//! next to its neighbouring cluster, or to split the space between two
//! neighbours evenly.

use std::collections::BTreeMap;

use crate::model::{Axis, Bounds, Segment, Span};

/// Distance between a box and the measurement line drawn beside it.
pub const DIMENSION_OFFSET: f64 = 12.0;

/// A measured gap: two projection lines leading off the boxes and the
/// measurement line between them.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub axis: Axis,
    pub gap: f64,
    pub measure: Segment,
    pub projections: [Segment; 2],
}

/// Distribution snap for one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionHit {
    pub axis: Axis,
    /// New centre of the dragged node on `axis`.
    pub snapped: f64,
    pub gap: f64,
    /// True when the node was centred between two neighbours rather than
    /// repeating an existing gap.
    pub midpoint: bool,
    pub dimensions: Vec<Dimension>,
}

/// Merged run member: its extent on the distribution axis and the far
/// cross-axis edge where projection lines start.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cluster {
    span: Span,
    cross_end: f64,
}

impl Cluster {
    fn center(&self) -> f64 {
        (self.span.start + self.span.end) / 2.0
    }
}

fn clusters(axis: Axis, band: Span, threshold: f64, others: &[Bounds]) -> Vec<Cluster> {
    let cross = axis.cross();
    let band = Span::new(band.start - threshold, band.end + threshold);
    let mut members: Vec<&Bounds> = others.iter().filter(|b| b.span(cross).overlaps(&band)).collect();
    members.sort_by(|a, b| a.min(axis).total_cmp(&b.min(axis)));

    let mut out: Vec<Cluster> = Vec::new();
    for b in members {
        let span = b.span(axis);
        match out.last_mut() {
            Some(last) if last.span.overlaps(&span) => {
                last.span = last.span.merge(&span);
                last.cross_end = last.cross_end.max(b.max(cross));
            }
            _ => out.push(Cluster { span, cross_end: b.max(cross) }),
        }
    }
    out
}

/// Dimension for the gap `[start, end]` between boxes whose far cross edges
/// are `a_cross` and `b_cross`.
fn dimension(axis: Axis, start: f64, end: f64, a_cross: f64, b_cross: f64) -> Dimension {
    let cross = axis.cross();
    let line = a_cross.max(b_cross) + DIMENSION_OFFSET;
    Dimension {
        axis,
        gap: end - start,
        measure: Segment::across(cross, line, Span::new(start, end)),
        projections: [
            Segment::across(axis, start, Span::new(a_cross, line)),
            Segment::across(axis, end, Span::new(b_cross, line)),
        ],
    }
}

/// Look for a distribution snap for `dragged` along `axis`.
pub fn distribute(axis: Axis, dragged: &Bounds, others: &[Bounds], threshold: f64) -> Option<DistributionHit> {
    let cross = axis.cross();
    let runs = clusters(axis, dragged.span(cross), threshold, others);
    if runs.is_empty() {
        return None;
    }

    // gap size → indices of the cluster that starts each gap
    let mut gaps: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, pair) in runs.windows(2).enumerate() {
        let gap = pair[1].span.start - pair[0].span.end;
        if gap > 0.0 {
            gaps.entry(gap.round() as i64).or_default().push(i);
        }
    }

    let center = dragged.mid(axis);
    let half = (dragged.max(axis) - dragged.min(axis)) / 2.0;
    let dragged_cross = dragged.max(cross);
    let before = runs.iter().rposition(|c| c.center() < center);
    let after = runs.iter().position(|c| c.center() > center);

    let exact_gap = |i: usize| runs[i + 1].span.start - runs[i].span.end;
    let pick = |current: f64| {
        let lo = (current - threshold).ceil() as i64;
        let hi = (current + threshold).floor() as i64;
        if lo > hi {
            return None;
        }
        let mut best: Option<(f64, &Vec<usize>)> = None;
        for (k, members) in gaps.range(lo..=hi) {
            if *k <= 0 {
                continue;
            }
            if best.is_none_or(|(_, b)| members.len() > b.len()) {
                best = Some((exact_gap(members[0]), members));
            }
        }
        best
    };

    let existing = |members: &Vec<usize>| -> Vec<Dimension> {
        members
            .iter()
            .map(|&i| {
                let (a, b) = (runs[i], runs[i + 1]);
                dimension(axis, a.span.end, b.span.start, a.cross_end, b.cross_end)
            })
            .collect()
    };

    let mut candidates: Vec<DistributionHit> = Vec::new();
    if let Some(i) = before {
        let prev = runs[i];
        let current = dragged.min(axis) - prev.span.end;
        if let Some((gap, members)) = pick(current).filter(|_| current + threshold >= 0.0) {
            let start = prev.span.end + gap;
            let mut dimensions = existing(members);
            dimensions.push(dimension(axis, prev.span.end, start, prev.cross_end, dragged_cross));
            candidates.push(DistributionHit { axis, snapped: start + half, gap, midpoint: false, dimensions });
        }
    }
    if let Some(j) = after {
        let next = runs[j];
        let current = next.span.start - dragged.max(axis);
        if let Some((gap, members)) = pick(current).filter(|_| current + threshold >= 0.0) {
            let end = next.span.start - gap;
            let mut dimensions = existing(members);
            dimensions.push(dimension(axis, end, next.span.start, dragged_cross, next.cross_end));
            candidates.push(DistributionHit { axis, snapped: end - half, gap, midpoint: false, dimensions });
        }
    }

    if let Some(hit) = candidates
        .into_iter()
        .min_by(|a, b| (a.snapped - center).abs().total_cmp(&(b.snapped - center).abs()))
    {
        return Some(hit);
    }

    // Between two neighbours with no repeatable gap: split the space evenly.
    let (i, j) = (before?, after?);
    let (prev, next) = (runs[i], runs[j]);
    let room = next.span.start - prev.span.end;
    if room < 2.0 * half {
        return None;
    }
    let mid = (prev.span.end + next.span.start) / 2.0;
    if (mid - center).abs() > threshold {
        return None;
    }
    let gap = (room - 2.0 * half) / 2.0;
    Some(DistributionHit {
        axis,
        snapped: mid,
        gap,
        midpoint: true,
        dimensions: vec![
            dimension(axis, prev.span.end, mid - half, prev.cross_end, dragged_cross),
            dimension(axis, mid + half, next.span.start, dragged_cross, next.cross_end),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Point, Size};

    fn square(x: f64, y: f64) -> Bounds {
        Bounds::centered(Point::new(x, y), Size::new(20.0, 20.0))
    }

    #[test]
    fn test_continues_gap_below_column() {
        let others = [square(0.0, 0.0), square(0.0, 50.0), square(0.0, 120.0)];
        let hit = distribute(Axis::Y, &square(0.0, 185.0), &others, 20.0).unwrap();
        assert_eq!(hit.snapped, 170.0);
        assert_eq!(hit.gap, 30.0);
        assert!(!hit.midpoint);
        // the existing 30 gap plus the new one
        assert_eq!(hit.dimensions.len(), 2);
        assert_eq!(hit.dimensions[1].gap, 30.0);
    }

    #[test]
    fn test_no_snap_far_away() {
        let others = [square(0.0, 0.0), square(0.0, 50.0), square(0.0, 120.0)];
        assert!(distribute(Axis::Y, &square(0.0, 500.0), &others, 20.0).is_none());
    }

    #[test]
    fn test_ignores_nodes_outside_band() {
        let others = [square(0.0, 0.0), square(0.0, 50.0), square(300.0, 120.0)];
        // only the first two share the column; their gap is 30, so 20+30+10 = 110 from 50
        let hit = distribute(Axis::Y, &square(0.0, 105.0), &others, 10.0).unwrap();
        assert_eq!(hit.snapped, 100.0);
    }

    #[test]
    fn test_band_widened_by_threshold() {
        let others = [square(0.0, 0.0), square(0.0, 50.0), square(0.0, 120.0)];
        // flush against the column's right edge: no strict overlap on x
        let hit = distribute(Axis::Y, &square(20.0, 172.0), &others, 20.0).unwrap();
        assert_eq!(hit.snapped, 170.0);
        assert_eq!(hit.gap, 30.0);
        // beyond the widened band the column is out of reach
        assert!(distribute(Axis::Y, &square(41.0, 172.0), &others, 20.0).is_none());
    }

    #[test]
    fn test_overlapping_members_merge() {
        // two stacked boxes overlapping on y act as one cluster
        let others = [square(0.0, 0.0), square(5.0, 10.0), square(0.0, 60.0)];
        // cluster [-10, 20], next [50, 70]: gap 30
        let hit = distribute(Axis::Y, &square(0.0, 112.0), &others, 5.0).unwrap();
        assert_eq!(hit.snapped, 110.0);
    }

    #[test]
    fn test_gap_above_neighbour() {
        let others = [square(100.0, 0.0), square(150.0, 0.0)];
        // horizontal run [90,110] [140,160] gap 30; dragged left of both
        let hit = distribute(Axis::X, &square(52.0, 0.0), &others, 5.0).unwrap();
        assert_eq!(hit.snapped, 50.0);
        let d = hit.dimensions.last().unwrap();
        assert_eq!(d.measure, Segment::new(Point::new(60.0, 22.0), Point::new(90.0, 22.0)));
    }

    #[test]
    fn test_midpoint_split() {
        let others = [square(0.0, 0.0), square(0.0, 100.0)];
        // single gap 80 cannot be repeated inside 80; centre between at 50
        let hit = distribute(Axis::Y, &square(0.0, 47.0), &others, 5.0).unwrap();
        assert!(hit.midpoint);
        assert_eq!(hit.snapped, 50.0);
        assert_eq!(hit.gap, 30.0);
        assert_eq!(hit.dimensions.len(), 2);
    }
}
