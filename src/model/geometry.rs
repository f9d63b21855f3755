//! Planar geometry shared by the model, the layout adapter and the alignment engine.

use serde::{Deserialize, Serialize};

/// Layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// The perpendicular axis.
    pub fn cross(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// A point in diagram coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}

/// Width and height of a rendered box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn along(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }
}

/// Axis-aligned bounding box. `x..max_x` horizontally, `y..max_y` vertically.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "X")]
    pub max_x: f64,
    #[serde(rename = "Y")]
    pub max_y: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, max_x: f64, max_y: f64) -> Self {
        Self { x, y, max_x, max_y }
    }

    /// Box of the given size centred on `center`.
    pub fn centered(center: Point, size: Size) -> Self {
        let hw = size.width / 2.0;
        let hh = size.height / 2.0;
        Self::new(center.x - hw, center.y - hh, center.x + hw, center.y + hh)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.y
    }

    pub fn center(&self) -> Point {
        Point::new((self.x + self.max_x) / 2.0, (self.y + self.max_y) / 2.0)
    }

    /// Leading edge on `axis` (left or top).
    pub fn min(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Trailing edge on `axis` (right or bottom).
    pub fn max(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.max_x,
            Axis::Y => self.max_y,
        }
    }

    pub fn mid(&self, axis: Axis) -> f64 {
        (self.min(axis) + self.max(axis)) / 2.0
    }

    /// Extent on `axis` as an interval.
    pub fn span(&self, axis: Axis) -> Span {
        Span::new(self.min(axis), self.max(axis))
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.max_x && p.y >= self.y && p.y <= self.max_y
    }

    pub fn contains(&self, other: &Bounds) -> bool {
        other.x >= self.x && other.max_x <= self.max_x && other.y >= self.y && other.max_y <= self.max_y
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    pub fn inflate(&self, pad: f64) -> Bounds {
        Bounds::new(self.x - pad, self.y - pad, self.max_x + pad, self.max_y + pad)
    }

    /// Point where the ray from the centre towards `target` leaves the box.
    pub fn ray_exit(&self, target: Point) -> Point {
        let c = self.center();
        let dx = target.x - c.x;
        let dy = target.y - c.y;
        if dx == 0.0 && dy == 0.0 {
            return c;
        }
        let hw = self.width() / 2.0;
        let hh = self.height() / 2.0;
        let tx = if dx != 0.0 { hw / dx.abs() } else { f64::INFINITY };
        let ty = if dy != 0.0 { hh / dy.abs() } else { f64::INFINITY };
        let t = tx.min(ty).min(1.0);
        Point::new(c.x + dx * t, c.y + dy * t)
    }
}

/// Closed interval on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl Span {
    pub fn new(start: f64, end: f64) -> Self {
        if start <= end { Self { start, end } } else { Self { start: end, end: start } }
    }

    /// Strict overlap: touching intervals do not overlap.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn merge(&self, other: &Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// Straight line segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    pub fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    /// Segment at fixed `position` on `axis`, running along the cross axis.
    /// A guide at `x = 10` spanning y 0..40 is `Segment::across(Axis::X, 10.0, span(0, 40))`.
    pub fn across(axis: Axis, position: f64, span: Span) -> Self {
        match axis {
            Axis::X => Segment::new(Point::new(position, span.start), Point::new(position, span.end)),
            Axis::Y => Segment::new(Point::new(span.start, position), Point::new(span.end, position)),
        }
    }

    pub fn length(&self) -> f64 {
        let dx = self.to.x - self.from.x;
        let dy = self.to.y - self.from.y;
        (dx * dx + dy * dy).sqrt()
    }
}
