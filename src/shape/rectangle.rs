//! The rectangle primitive and its dateline-aware relation algorithm.

use super::range::{LongitudeRange, Range};
use super::{Point, SpatialRelation};
use approx::AbsDiffEq;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An axis-aligned rectangle. `min_y <= max_y` always holds; in a geographic
/// context `min_x > max_x` is the dateline-crossing encoding (the span runs
/// eastward from `min_x`, wraps past ±180º, and ends at `max_x`).
///
/// Construct through [SpatialContext](crate::context::SpatialContext), which
/// normalizes the coordinates first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rectangle {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
    geo: bool,
}

impl Rectangle {
    pub(crate) fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64, geo: bool) -> Self {
        debug_assert!(min_y <= max_y, "Rectangle y-interval [{min_y},{max_y}] is inverted");
        Rectangle {
            min_x,
            max_x,
            min_y,
            max_y,
            geo,
        }
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn crosses_dateline(&self) -> bool {
        self.geo && self.min_x > self.max_x
    }

    /// Width of the x-span; circular (wrapped widths add a full turn) for
    /// geographic rectangles.
    pub fn width(&self) -> f64 {
        if self.geo {
            self.lon_range().width()
        } else {
            self.max_x - self.min_x
        }
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn has_area(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// Center point; for a dateline-crossing span the midpoint lies on the
    /// far side of the globe.
    pub fn center(&self) -> Point {
        let x = if self.geo {
            self.lon_range().center()
        } else {
            self.min_x + (self.max_x - self.min_x) / 2.0
        };
        Point::new(x, self.min_y + self.height() / 2.0)
    }

    pub(crate) fn lon_range(&self) -> LongitudeRange {
        LongitudeRange::new(self.min_x, self.max_x)
    }

    fn y_range(&self) -> Range {
        Range::new(self.min_y, self.max_y)
    }

    fn same_x_span(&self, other: &Rectangle) -> bool {
        if self.geo || other.geo {
            self.lon_range() == other.lon_range()
        } else {
            self.min_x == other.min_x && self.max_x == other.max_x
        }
    }

    /// Relation of `self` to `other`: per-axis interval relations combined
    /// conjunctively. The x-axis splits dateline-crossing spans into their
    /// non-wrapping sub-intervals and pairs them up, so crossing and
    /// non-crossing rectangles compare correctly.
    pub fn relate(&self, other: &Rectangle) -> SpatialRelation {
        let y_rel = self.y_range().relate(&other.y_range());
        if y_rel == SpatialRelation::Disjoint {
            return SpatialRelation::Disjoint;
        }
        // a degenerate point box does not know its context; longitude
        // semantics win if either side is geographic
        let x_rel = if self.geo || other.geo {
            self.lon_range().relate(&other.lon_range())
        } else {
            Range::new(self.min_x, self.max_x).relate(&Range::new(other.min_x, other.max_x))
        };
        if x_rel == SpatialRelation::Disjoint {
            return SpatialRelation::Disjoint;
        }
        if x_rel == y_rel {
            return x_rel;
        }
        // equal spans on one axis: the other axis decides
        if self.same_x_span(other) {
            return y_rel;
        }
        if self.min_y == other.min_y && self.max_y == other.max_y {
            return x_rel;
        }
        SpatialRelation::Intersects
    }

    /// Containment test for a point (edges inclusive). `Contains` or
    /// `Disjoint`; a point cannot partially overlap.
    pub fn relate_point(&self, p: &Point) -> SpatialRelation {
        if self.contains_y(p.y) && self.contains_x(p.x) {
            SpatialRelation::Contains
        } else {
            SpatialRelation::Disjoint
        }
    }

    pub(crate) fn contains_x(&self, x: f64) -> bool {
        if self.geo {
            self.lon_range().contains_value(x)
        } else {
            self.min_x <= x && x <= self.max_x
        }
    }

    pub(crate) fn contains_y(&self, y: f64) -> bool {
        self.min_y <= y && y <= self.max_y
    }

    pub(crate) fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }

    /// The point of this rectangle closest to `p`, per-axis. On the
    /// longitude circle the nearer of the two x-edges is chosen by circular
    /// separation.
    pub(crate) fn nearest_point_to(&self, p: &Point) -> Point {
        let y = p.y.clamp(self.min_y, self.max_y);
        let x = if self.contains_x(p.x) {
            p.x
        } else if self.geo {
            let to_min = circular_delta(p.x, self.min_x);
            let to_max = circular_delta(p.x, self.max_x);
            if to_min <= to_max {
                self.min_x
            } else {
                self.max_x
            }
        } else {
            p.x.clamp(self.min_x, self.max_x)
        };
        Point::new(x, y)
    }
}

/// Separation of two longitudes along the shorter way around, in degrees.
fn circular_delta(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % 360.0;
    d.min(360.0 - d)
}

impl PartialEq for Rectangle {
    fn eq(&self, other: &Self) -> bool {
        self.geo == other.geo
            && self.min_y == other.min_y
            && self.max_y == other.max_y
            && self.same_x_span(other)
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect({},{} {},{})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

impl AbsDiffEq for Rectangle {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.min_x.abs_diff_eq(&other.min_x, epsilon)
            && self.max_x.abs_diff_eq(&other.max_x, epsilon)
            && self.min_y.abs_diff_eq(&other.min_y, epsilon)
            && self.max_y.abs_diff_eq(&other.max_y, epsilon)
    }
}
