//! Shape primitives and the relation algebra over them.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod circle;
pub mod collection;
pub mod point;
pub mod range;
pub mod rectangle;

pub use circle::Circle;
pub use collection::ShapeCollection;
pub use point::Point;
pub use range::{LongitudeRange, Range};
pub use rectangle::Rectangle;

/// Topological relation between two shapes, as seen from the left-hand
/// shape: `a.relate(b) == Contains` means `b` lies inside `a`.
///
/// `Contains` and `Within` are exact inverses under [transpose](Self::transpose);
/// a shape relates to an equal-extent shape as `Contains` by convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpatialRelation {
    Contains,
    Within,
    Intersects,
    Disjoint,
}

impl SpatialRelation {
    /// The relation as seen from the other shape.
    pub fn transpose(self) -> Self {
        match self {
            SpatialRelation::Contains => SpatialRelation::Within,
            SpatialRelation::Within => SpatialRelation::Contains,
            other => other,
        }
    }

    /// Merge the relations of two shapes to a common target, as if the two
    /// were one combined shape. `Contains` absorbs everything; agreement is
    /// kept; any other mix can only mean partial overlap.
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (SpatialRelation::Contains, _) | (_, SpatialRelation::Contains) => {
                SpatialRelation::Contains
            }
            (a, b) if a == b => a,
            _ => SpatialRelation::Intersects,
        }
    }

    /// True unless the shapes have no common point.
    pub fn intersects(self) -> bool {
        self != SpatialRelation::Disjoint
    }
}

impl fmt::Display for SpatialRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpatialRelation::Contains => "CONTAINS",
            SpatialRelation::Within => "WITHIN",
            SpatialRelation::Intersects => "INTERSECTS",
            SpatialRelation::Disjoint => "DISJOINT",
        };
        write!(f, "{name}")
    }
}

/// The closed set of shape kinds. Relation and bounding-box logic matches
/// exhaustively, so a new shape kind fails to compile until every algorithm
/// handles it.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point(Point),
    Rect(Rectangle),
    Circle(Circle),
    Collection(ShapeCollection),
}

impl Shape {
    /// The smallest dateline-aware rectangle enclosing this shape.
    pub fn bounding_box(&self) -> Rectangle {
        match self {
            Shape::Point(p) => Rectangle::new(p.x, p.x, p.y, p.y, false),
            Shape::Rect(r) => *r,
            Shape::Circle(c) => c.bounding_box(),
            Shape::Collection(c) => c.bounding_box(),
        }
    }

    pub fn center(&self) -> Point {
        match self {
            Shape::Point(p) => *p,
            Shape::Rect(r) => r.center(),
            Shape::Circle(c) => c.center(),
            Shape::Collection(c) => c.bounding_box().center(),
        }
    }

    pub fn has_area(&self) -> bool {
        match self {
            Shape::Point(_) => false,
            Shape::Rect(r) => r.has_area(),
            Shape::Circle(c) => c.has_area(),
            Shape::Collection(c) => c.shapes().iter().any(Shape::has_area),
        }
    }

    /// Relation of `self` to `other`. Satisfies
    /// `a.relate(b) == b.relate(a).transpose()` for every shape pair.
    pub fn relate(&self, other: &Shape) -> SpatialRelation {
        match (self, other) {
            (Shape::Point(a), Shape::Point(b)) => {
                if a == b {
                    SpatialRelation::Contains
                } else {
                    SpatialRelation::Disjoint
                }
            }
            // a point can only be contained or apart; ask the other shape
            (Shape::Point(_), _) => other.relate(self).transpose(),
            (Shape::Rect(r), Shape::Point(p)) => r.relate_point(p),
            (Shape::Rect(a), Shape::Rect(b)) => a.relate(b),
            (Shape::Rect(_), Shape::Circle(_)) | (Shape::Rect(_), Shape::Collection(_)) => {
                other.relate(self).transpose()
            }
            (Shape::Circle(c), Shape::Point(p)) => c.relate_point(p),
            (Shape::Circle(c), Shape::Rect(r)) => c.relate_rectangle(r),
            (Shape::Circle(a), Shape::Circle(b)) => a.relate_circle(b),
            (Shape::Circle(_), Shape::Collection(_)) => other.relate(self).transpose(),
            (Shape::Collection(c), _) => c.relate(other),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Point(p) => p.fmt(f),
            Shape::Rect(r) => r.fmt(f),
            Shape::Circle(c) => c.fmt(f),
            Shape::Collection(c) => c.fmt(f),
        }
    }
}

impl From<Point> for Shape {
    fn from(p: Point) -> Self {
        Shape::Point(p)
    }
}

impl From<Rectangle> for Shape {
    fn from(r: Rectangle) -> Self {
        Shape::Rect(r)
    }
}

impl From<Circle> for Shape {
    fn from(c: Circle) -> Self {
        Shape::Circle(c)
    }
}

impl From<ShapeCollection> for Shape {
    fn from(c: ShapeCollection) -> Self {
        Shape::Collection(c)
    }
}
