//! Randomized exerciser for the relation algorithms.
//!
//! Generates a target rectangle and a candidate shape per trial, biased to
//! land near a shared reference point half of the time, and checks the
//! invariants that hold for every shape pair:
//!
//! (a) the two relate directions are exact transposes of each other;
//! (b) a point inside the candidate relates to the target consistently with
//!     the reported relation;
//! (c) disjoint bounding boxes imply disjoint shapes.
//!
//! Failures print the RNG seed; pin it via `SPATIAL_SHAPES_TEST_SEED` to
//! replay a run.

// each suite uses a different subset of these helpers
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spatial_shapes::{Point, Rectangle, Shape, SpatialContext, SpatialRelation};
use std::sync::Arc;

/// A generated candidate shape plus one point guaranteed to lie inside it.
pub struct GeneratedShape {
    pub shape: Shape,
    pub inside_point: Point,
}

/// A point with integer coordinates, optionally biased near another point.
/// Integer coordinates provoke the exact-equality edge cases.
pub fn random_point(rng: &mut StdRng, ctx: &Arc<SpatialContext>, near: Option<&Point>) -> Point {
    let wb = ctx.world_bounds();
    let (x, y) = match near {
        Some(p) => (
            p.x + rng.gen_range(-6..=6) as f64,
            p.y + rng.gen_range(-6..=6) as f64,
        ),
        None => (
            rng.gen_range(wb.min_x() as i64..=wb.max_x() as i64) as f64,
            rng.gen_range(wb.min_y() as i64..=wb.max_y() as i64) as f64,
        ),
    };
    let (x, y) = if ctx.is_geo() {
        (x, y) // make_point wraps these
    } else {
        (
            x.clamp(wb.min_x(), wb.max_x()),
            y.clamp(wb.min_y(), wb.max_y()),
        )
    };
    ctx.make_point(x, y).expect("generated point")
}

/// A rectangle around a random (or given) center; geographic spans wrap
/// through `make_rect`, so dateline-crossing rectangles come up routinely.
pub fn random_rectangle(
    rng: &mut StdRng,
    ctx: &Arc<SpatialContext>,
    near: Option<&Point>,
) -> Rectangle {
    let wb = ctx.world_bounds();
    if ctx.is_geo() && rng.gen_ratio(1, 20) {
        let hh = rng.gen_range(0..=90) as f64;
        return ctx.make_rect(-180.0, 180.0, -hh, hh).expect("world-wide rect");
    }
    let center = random_point(rng, ctx, near);
    let hw = rng.gen_range(0..=60) as f64;
    let hh = rng.gen_range(0..=30) as f64;
    if ctx.is_geo() {
        ctx.make_rect(
            center.x - hw,
            center.x + hw,
            (center.y - hh).max(-90.0),
            (center.y + hh).min(90.0),
        )
        .expect("generated rect")
    } else {
        ctx.make_rect(
            (center.x - hw).max(wb.min_x()),
            (center.x + hw).min(wb.max_x()),
            (center.y - hh).max(wb.min_y()),
            (center.y + hh).min(wb.max_y()),
        )
        .expect("generated rect")
    }
}

/// An integer-coordinate point inside the rectangle, dateline-aware.
/// Assumes integer rectangle corners, which is what the generators above
/// produce.
pub fn random_point_in(rng: &mut StdRng, ctx: &Arc<SpatialContext>, r: &Rectangle) -> Point {
    let y = rng.gen_range(r.min_y().ceil() as i64..=r.max_y().floor() as i64) as f64;
    let x = if r.crosses_dateline() {
        let offset = rng.gen_range(0..=r.width() as i64) as f64;
        ctx.norm_x(r.min_x() + offset)
    } else {
        ctx.norm_x(rng.gen_range(r.min_x().ceil() as i64..=r.max_x().floor() as i64) as f64)
    };
    Point::new(x, y)
}

pub struct RelationTester {
    ctx: Arc<SpatialContext>,
    rng: StdRng,
    seed: u64,
}

impl RelationTester {
    pub fn new(ctx: Arc<SpatialContext>) -> Self {
        let seed = std::env::var("SPATIAL_SHAPES_TEST_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(rand::random);
        println!("relation tester seed: {seed}");
        RelationTester {
            ctx,
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Run `trials` rounds of generate-and-relate against random target
    /// rectangles.
    pub fn test_relate_with_rectangle<F>(&mut self, trials: usize, mut generate: F)
    where
        F: FnMut(&mut StdRng, &Arc<SpatialContext>, Option<&Point>) -> GeneratedShape,
    {
        for trial in 0..trials {
            let reference = random_point(&mut self.rng, &self.ctx, None);
            let target = random_rectangle(&mut self.rng, &self.ctx, Some(&reference));
            let near = if self.rng.gen_bool(0.5) {
                Some(reference)
            } else {
                None
            };
            let generated = generate(&mut self.rng, &self.ctx, near.as_ref());
            let shape = &generated.shape;
            let target_shape = Shape::Rect(target);

            let rel = shape.relate(&target_shape);
            let transposed = target_shape.relate(shape);
            assert_eq!(
                rel,
                transposed.transpose(),
                "relate not symmetric for {shape} vs {target} (seed {} trial {trial})",
                self.seed
            );

            if shape.bounding_box().relate(&target) == SpatialRelation::Disjoint {
                assert_eq!(
                    rel,
                    SpatialRelation::Disjoint,
                    "disjoint bounding boxes but {rel} for {shape} vs {target} (seed {} trial {trial})",
                    self.seed
                );
            }

            let inside = Shape::Point(generated.inside_point);
            assert_eq!(
                shape.relate(&inside),
                SpatialRelation::Contains,
                "generator broke its contract: {} not inside {shape} (seed {} trial {trial})",
                generated.inside_point,
                self.seed
            );
            match rel {
                SpatialRelation::Within => {
                    assert_eq!(
                        target_shape.relate(&inside),
                        SpatialRelation::Contains,
                        "{shape} within {target} but {} outside it (seed {} trial {trial})",
                        generated.inside_point,
                        self.seed
                    );
                }
                SpatialRelation::Disjoint => {
                    assert_eq!(
                        target_shape.relate(&inside),
                        SpatialRelation::Disjoint,
                        "{shape} disjoint from {target} but {} inside it (seed {} trial {trial})",
                        generated.inside_point,
                        self.seed
                    );
                }
                SpatialRelation::Contains | SpatialRelation::Intersects => {
                    // a single inside point cannot refute either of these
                }
            }
        }
    }
}
