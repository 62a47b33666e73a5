//! The circle primitive.
//!
//! Boundary policy: the disc is closed. A point at distance exactly equal to
//! the radius is inside the circle, and every comparison below sticks to that
//! in both relate directions.

use super::{Point, Rectangle, SpatialRelation};
use crate::distance::DistanceCalculator;
use std::fmt;

/// A circle around `center` with `radius` in the owning context's distance
/// units. The enclosing rectangle is computed once at construction through
/// the context's calculator; it may cross the dateline, and circles reaching
/// a pole get a full-width longitude span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    center: Point,
    radius: f64,
    calculator: DistanceCalculator,
    bbox: Rectangle,
}

impl Circle {
    pub(crate) fn new(
        center: Point,
        radius: f64,
        calculator: DistanceCalculator,
        bbox: Rectangle,
    ) -> Self {
        Circle {
            center,
            radius,
            calculator,
            bbox,
        }
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn bounding_box(&self) -> Rectangle {
        self.bbox
    }

    pub fn has_area(&self) -> bool {
        self.radius > 0.0
    }

    fn distance_to(&self, p: &Point) -> f64 {
        self.calculator.distance(&self.center, p)
    }

    /// `Contains` iff the point lies on the closed disc, else `Disjoint`.
    pub fn relate_point(&self, p: &Point) -> SpatialRelation {
        if self.distance_to(p) <= self.radius {
            SpatialRelation::Contains
        } else {
            SpatialRelation::Disjoint
        }
    }

    /// Circle/circle relation from the center separation against the radius
    /// sum and difference.
    pub fn relate_circle(&self, other: &Circle) -> SpatialRelation {
        let d = self.distance_to(&other.center);
        if d > self.radius + other.radius {
            SpatialRelation::Disjoint
        } else if d + other.radius <= self.radius {
            SpatialRelation::Contains
        } else if d + self.radius <= other.radius {
            SpatialRelation::Within
        } else {
            SpatialRelation::Intersects
        }
    }

    /// Circle/rectangle relation: the enclosing boxes give the cheap
    /// answers, then the calculator decides the rest — nearest rectangle
    /// point beyond the radius means disjoint, all four corners inside
    /// means contains.
    pub fn relate_rectangle(&self, r: &Rectangle) -> SpatialRelation {
        let bbox_rel = self.bbox.relate(r);
        match bbox_rel {
            SpatialRelation::Disjoint | SpatialRelation::Within => bbox_rel,
            SpatialRelation::Contains if self.bbox == *r => {
                // the rectangle is exactly the enclosing box, which the
                // circle only touches from inside
                SpatialRelation::Within
            }
            _ => {
                let nearest = r.nearest_point_to(&self.center);
                if self.distance_to(&nearest) > self.radius {
                    return SpatialRelation::Disjoint;
                }
                let all_corners_in = r
                    .corners()
                    .iter()
                    .all(|c| self.distance_to(c) <= self.radius);
                if all_corners_in {
                    SpatialRelation::Contains
                } else {
                    SpatialRelation::Intersects
                }
            }
        }
    }
}

impl fmt::Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circle({} d={})", self.center, self.radius)
    }
}
