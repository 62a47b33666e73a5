//! An ordered aggregate of shapes with a conservative relation algorithm.

use super::range::{aggregate_longitude, LongitudeRange};
use super::{Rectangle, Shape, SpatialRelation};
use crate::context::SpatialContext;
use crate::{InvalidShapeSnafu, Result};
use snafu::ensure;
use std::fmt;
use std::sync::Arc;

/// A non-empty ordered sequence of shapes sharing one context.
///
/// The aggregate bounding box is computed once at construction: latitude by
/// a min/max sweep, longitude by the gap algorithm (the largest uncovered
/// arc of the circle is excluded, its complement is the span), which makes
/// the result independent of member order.
#[derive(Debug, Clone)]
pub struct ShapeCollection {
    shapes: Vec<Shape>,
    ctx: Arc<SpatialContext>,
    bbox: Rectangle,
    relate_contains_short_circuits: bool,
}

impl ShapeCollection {
    /// Build a collection that may short-circuit `relate` on the first
    /// containing member (valid when members do not overlap, and harmless
    /// otherwise; see [relate](Self::relate)).
    pub fn new(shapes: Vec<Shape>, ctx: &Arc<SpatialContext>) -> Result<Self> {
        Self::with_contains_short_circuit(shapes, ctx, true)
    }

    /// As [new](Self::new), but with explicit control over the contains
    /// short-circuit. Disabling it makes `relate` visit every member; the
    /// final relation is the same either way, only found later.
    pub fn with_contains_short_circuit(
        shapes: Vec<Shape>,
        ctx: &Arc<SpatialContext>,
        enabled: bool,
    ) -> Result<Self> {
        ensure!(
            !shapes.is_empty(),
            InvalidShapeSnafu {
                description: "a shape collection must have at least one member",
            }
        );
        let bbox = Self::compute_bounding_box(&shapes, ctx);
        Ok(ShapeCollection {
            shapes,
            ctx: Arc::clone(ctx),
            bbox,
            relate_contains_short_circuits: enabled,
        })
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        false // construction rejects empty collections
    }

    pub fn context(&self) -> &Arc<SpatialContext> {
        &self.ctx
    }

    pub fn relate_contains_short_circuits(&self) -> bool {
        self.relate_contains_short_circuits
    }

    pub fn bounding_box(&self) -> Rectangle {
        self.bbox
    }

    fn compute_bounding_box(shapes: &[Shape], ctx: &Arc<SpatialContext>) -> Rectangle {
        let boxes: Vec<Rectangle> = shapes.iter().map(Shape::bounding_box).collect();
        let min_y = boxes.iter().map(Rectangle::min_y).fold(f64::INFINITY, f64::min);
        let max_y = boxes
            .iter()
            .map(Rectangle::max_y)
            .fold(f64::NEG_INFINITY, f64::max);

        if ctx.is_geo() {
            let spans: Vec<LongitudeRange> =
                boxes.iter().map(Rectangle::lon_range).collect();
            let lon = aggregate_longitude(&spans);
            Rectangle::new(lon.min, lon.max, min_y, max_y, true)
        } else {
            let min_x = boxes.iter().map(Rectangle::min_x).fold(f64::INFINITY, f64::min);
            let max_x = boxes
                .iter()
                .map(Rectangle::max_x)
                .fold(f64::NEG_INFINITY, f64::max);
            Rectangle::new(min_x, max_x, min_y, max_y, false)
        }
    }

    /// Conservative relation of the whole collection to `other`.
    ///
    /// Any member containing `other` makes the collection contain it; all
    /// members disjoint makes it disjoint; all members within `other` makes
    /// the collection within it. Anything else is reported as the
    /// conservative `Intersects`.
    pub fn relate(&self, other: &Shape) -> SpatialRelation {
        let bbox_rel = Shape::Rect(self.bbox).relate(other);
        if bbox_rel == SpatialRelation::Disjoint || bbox_rel == SpatialRelation::Within {
            // the aggregate box is a superset of every member
            return bbox_rel;
        }
        let mut combined: Option<SpatialRelation> = None;
        for shape in &self.shapes {
            let rel = shape.relate(other);
            if rel == SpatialRelation::Contains && self.relate_contains_short_circuits {
                return SpatialRelation::Contains;
            }
            combined = Some(match combined {
                None => rel,
                Some(so_far) => so_far.combine(rel),
            });
        }
        combined.expect("collection is never empty")
    }
}

impl PartialEq for ShapeCollection {
    fn eq(&self, other: &Self) -> bool {
        self.shapes == other.shapes
    }
}

impl fmt::Display for ShapeCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShapeCollection(")?;
        for (i, s) in self.shapes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            s.fmt(f)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SpatialContext;
    use crate::shape::LongitudeRange;

    fn rects(
        ctx: &Arc<SpatialContext>,
        spans: &[(f64, f64)],
        min_y: f64,
        max_y: f64,
    ) -> Vec<Shape> {
        spans
            .iter()
            .map(|&(min_x, max_x)| {
                Shape::Rect(ctx.make_rect(min_x, max_x, min_y, max_y).expect("rect"))
            })
            .collect()
    }

    fn validate_world(r1_x: (f64, f64), r2_x: (f64, f64)) {
        let ctx = SpatialContext::geo();
        let shapes = rects(&ctx, &[r1_x, r2_x], -10.0, 10.0);
        let flipped: Vec<Shape> = shapes.iter().rev().cloned().collect();

        for members in [shapes, flipped] {
            let collection = ShapeCollection::new(members, &ctx).expect("collection");
            let bbox = collection.bounding_box();
            assert_eq!(bbox.lon_range(), LongitudeRange::WORLD, "bbox {bbox}");
            assert_eq!(bbox.min_y(), -10.0);
            assert_eq!(bbox.max_y(), 10.0);
        }
    }

    #[test]
    fn test_bbox_world_scenarios() {
        validate_world((-180.0, 180.0), (0.0, 180.0));
        validate_world((-180.0, 0.0), (0.0, 180.0));
        validate_world((-90.0, 90.0), (90.0, -90.0));
    }

    #[test]
    fn test_bbox_partial_coverage() {
        let ctx = SpatialContext::geo();
        let shapes = rects(&ctx, &[(-170.0, -160.0), (160.0, 170.0)], -10.0, 20.0);
        let collection = ShapeCollection::new(shapes, &ctx).expect("collection");
        let bbox = collection.bounding_box();
        assert!(bbox.crosses_dateline());
        assert_eq!(bbox.min_x(), 160.0);
        assert_eq!(bbox.max_x(), -160.0);
        assert_eq!(bbox.min_y(), -10.0);
        assert_eq!(bbox.max_y(), 20.0);
    }

    #[test]
    fn test_planar_bbox_is_min_max_sweep() {
        let ctx = SpatialContext::planar();
        let shapes = rects(&ctx, &[(0.0, 10.0), (40.0, 50.0)], -5.0, 5.0);
        let collection = ShapeCollection::new(shapes, &ctx).expect("collection");
        let bbox = collection.bounding_box();
        assert_eq!(
            (bbox.min_x(), bbox.max_x(), bbox.min_y(), bbox.max_y()),
            (0.0, 50.0, -5.0, 5.0)
        );
    }

    #[test]
    fn test_empty_collection_fails() {
        let ctx = SpatialContext::geo();
        assert!(ShapeCollection::new(Vec::new(), &ctx).is_err());
    }

    #[test]
    fn test_relate_contains_short_circuit() {
        let ctx = SpatialContext::geo();
        let shapes = rects(&ctx, &[(0.0, 40.0), (100.0, 120.0)], -20.0, 20.0);
        let collection = ShapeCollection::new(shapes, &ctx).expect("collection");
        let query = Shape::Rect(ctx.make_rect(10.0, 20.0, -5.0, 5.0).expect("rect"));
        assert_eq!(collection.relate(&query), SpatialRelation::Contains);
        assert_eq!(
            query.relate(&Shape::Collection(collection)),
            SpatialRelation::Within
        );
    }

    #[test]
    fn test_relate_contains_without_short_circuit() {
        let ctx = SpatialContext::geo();
        let shapes = rects(&ctx, &[(0.0, 40.0), (30.0, 50.0)], -20.0, 20.0);
        let collection =
            ShapeCollection::with_contains_short_circuit(shapes, &ctx, false).expect("collection");
        // overlapping members; the second intersects the query but the
        // first already contains it
        let query = Shape::Rect(ctx.make_rect(10.0, 35.0, -5.0, 5.0).expect("rect"));
        assert_eq!(collection.relate(&query), SpatialRelation::Contains);
    }

    #[test]
    fn test_relate_all_disjoint() {
        let ctx = SpatialContext::geo();
        let shapes = rects(&ctx, &[(0.0, 10.0), (30.0, 40.0)], -10.0, 10.0);
        let collection = ShapeCollection::new(shapes, &ctx).expect("collection");
        let query = Shape::Rect(ctx.make_rect(15.0, 25.0, -5.0, 5.0).expect("rect"));
        assert_eq!(collection.relate(&query), SpatialRelation::Disjoint);
    }

    #[test]
    fn test_relate_all_within() {
        let ctx = SpatialContext::geo();
        let shapes = rects(&ctx, &[(0.0, 10.0), (20.0, 30.0)], -10.0, 10.0);
        let collection = ShapeCollection::new(shapes, &ctx).expect("collection");
        let query = Shape::Rect(ctx.make_rect(-5.0, 35.0, -15.0, 15.0).expect("rect"));
        assert_eq!(collection.relate(&query), SpatialRelation::Within);
        assert_eq!(
            query.relate(&Shape::Collection(collection)),
            SpatialRelation::Contains
        );
    }

    #[test]
    fn test_relate_mixed_is_intersects() {
        let ctx = SpatialContext::geo();
        let shapes = rects(&ctx, &[(0.0, 10.0), (30.0, 40.0)], -10.0, 10.0);
        let collection = ShapeCollection::new(shapes, &ctx).expect("collection");
        // covers the first member, misses the second
        let query = Shape::Rect(ctx.make_rect(-5.0, 15.0, -15.0, 15.0).expect("rect"));
        assert_eq!(collection.relate(&query), SpatialRelation::Intersects);
    }

    #[test]
    fn test_nested_collection() {
        let ctx = SpatialContext::geo();
        let inner_shapes = rects(&ctx, &[(0.0, 10.0)], -10.0, 10.0);
        let inner = ShapeCollection::new(inner_shapes, &ctx).expect("collection");
        let outer = ShapeCollection::new(
            vec![Shape::Collection(inner)],
            &ctx,
        )
        .expect("collection");
        let query = Shape::Rect(ctx.make_rect(2.0, 8.0, -5.0, 5.0).expect("rect"));
        assert_eq!(outer.relate(&query), SpatialRelation::Contains);
    }
}
