//! A geodetic/planar shape model backing spatial filtering in a search engine.
//!
//! The entry point is [SpatialContext](context::SpatialContext): it fixes the
//! distance unit, the distance calculator, and the world bounds once, and acts
//! as the factory for every shape. Shapes answer the two questions the
//! indexing and query layers care about: `bounding_box()` and `relate(other)`.
//!
//! Geographic contexts handle antimeridian ("dateline") wraparound throughout:
//! a rectangle with `min_x > max_x` spans eastward from `min_x`, wraps past
//! ±180º, and ends at `max_x`.

use snafu::{Backtrace, Snafu};

pub mod context;
pub mod distance;
pub mod shape;

pub use context::{DistanceUnit, SpatialContext};
pub use distance::DistanceCalculator;
pub use shape::{
    Circle, LongitudeRange, Point, Range, Rectangle, Shape, ShapeCollection, SpatialRelation,
};

pub type Result<T> = std::result::Result<T, SpatialError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SpatialError {
    /// Invalid unit/calculator/world-bounds combination. Fatal at startup.
    #[snafu(display("Invalid spatial configuration: {description}"))]
    Configuration {
        description: String,
        backtrace: Backtrace,
    },
    /// Malformed text input to the shape grammar. The input is rejected
    /// wholesale, never partially parsed.
    #[snafu(display("Could not parse shape from {input:?}: {description}"))]
    ShapeParse {
        input: String,
        description: String,
        backtrace: Backtrace,
    },
    /// Programmatic shape construction with coordinates that violate the
    /// shape's invariants or the context's world bounds.
    #[snafu(display("Invalid shape: {description}"))]
    InvalidShape {
        description: String,
        backtrace: Backtrace,
    },
    /// Construction of a shape kind this context variant does not support.
    #[snafu(display("Unsupported operation: {description}"))]
    Unsupported {
        description: String,
        backtrace: Backtrace,
    },
}
