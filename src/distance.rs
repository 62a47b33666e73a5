//! Distance strategies consulted by circles and world-bounds defaulting.

use crate::shape::Point;

/// Latitudes closer to a pole than this get a full-width longitude span.
const POLE_EPSILON: f64 = 1e-9;

/// Strategy for measuring the distance between two points and for deriving
/// the half-widths of a circle's enclosing rectangle.
///
/// `Euclidean` is the flat-plane model with unitless coordinates;
/// `Haversine` is the great-circle model over (lon, lat) degrees on a sphere
/// of the given radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistanceCalculator {
    Euclidean,
    Haversine { sphere_radius: f64 },
}

impl DistanceCalculator {
    /// Distance between two points, in the calculator's linear units.
    pub fn distance(&self, from: &Point, to: &Point) -> f64 {
        match self {
            DistanceCalculator::Euclidean => {
                ((from.x - to.x).powi(2) + (from.y - to.y).powi(2)).sqrt()
            }
            DistanceCalculator::Haversine { sphere_radius } => {
                haversine_angle(from, to) * sphere_radius
            }
        }
    }

    /// Half-widths `(dx, dy)` of the axis-aligned box enclosing a circle of
    /// `distance` around `center`.
    ///
    /// For the spherical model the Y half-width is the angular radius in
    /// degrees and the X half-width grows with `1/cos(lat)`; a span that
    /// reaches 180º means the box wraps the full longitude range. Callers
    /// must still widen the X span to the whole world when the Y span
    /// touches a pole.
    pub fn bounding_deltas(&self, center: &Point, distance: f64) -> (f64, f64) {
        match self {
            DistanceCalculator::Euclidean => (distance, distance),
            DistanceCalculator::Haversine { sphere_radius } => {
                let angular_deg = (distance / sphere_radius).to_degrees();
                if angular_deg >= 180.0 {
                    // reaches the antipode; nothing left to bound
                    return (180.0, 180.0);
                }
                let cos_lat = center.y.to_radians().cos();
                let dx = if cos_lat <= POLE_EPSILON {
                    180.0
                } else {
                    (angular_deg / cos_lat).min(180.0)
                };
                (dx, angular_deg)
            }
        }
    }
}

/// Central angle between two (lon, lat) degree points, in radians.
///
/// Standard haversine formula; `atan2` keeps it stable for antipodal points.
fn haversine_angle(a: &Point, b: &Point) -> f64 {
    let lat_a = a.y.to_radians();
    let lat_b = b.y.to_radians();
    let d_lat = (b.y - a.y).to_radians();
    let d_lon = (b.x - a.x).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt())
}
