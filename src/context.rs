//! The spatial context: distance unit, calculator and world-bounds policy,
//! coordinate normalization, and the factory for every shape.

use crate::distance::DistanceCalculator;
use crate::shape::{Circle, Point, Rectangle, Shape, ShapeCollection};
use crate::{
    ConfigurationSnafu, InvalidShapeSnafu, Result, ShapeParseSnafu, UnsupportedSnafu,
};
use serde::{Deserialize, Serialize};
use snafu::{ensure, OptionExt};
use std::fmt;
use std::sync::Arc;

/// Mean Earth radius in kilometers (IUGG).
pub const EARTH_MEAN_RADIUS_KM: f64 = 6371.0087714;
const KM_TO_MILES: f64 = 0.621371192;

/// The unit distances are measured in. Geographic units fix the spherical
/// model; `Euclidean` selects the unitless flat plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistanceUnit {
    Kilometers,
    Miles,
    Euclidean,
}

impl DistanceUnit {
    /// Mean Earth radius in this unit; `None` for the planar unit.
    pub fn earth_radius(&self) -> Option<f64> {
        match self {
            DistanceUnit::Kilometers => Some(EARTH_MEAN_RADIUS_KM),
            DistanceUnit::Miles => Some(EARTH_MEAN_RADIUS_KM * KM_TO_MILES),
            DistanceUnit::Euclidean => None,
        }
    }

    pub fn is_geo(&self) -> bool {
        !matches!(self, DistanceUnit::Euclidean)
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "miles",
            DistanceUnit::Euclidean => "u",
        };
        write!(f, "{name}")
    }
}

/// Holds the distance unit, the distance calculator, and the world bounds.
/// Immutable once constructed and shared by reference (`Arc`) among all
/// shapes it creates; safe for unlimited concurrent readers.
///
/// Every shape is built through the factory methods here so that raw
/// coordinates are normalized exactly once, on the way in.
#[derive(Debug, Clone)]
pub struct SpatialContext {
    unit: DistanceUnit,
    calculator: DistanceCalculator,
    world_bounds: Rectangle,
}

impl SpatialContext {
    /// A geographic context: kilometers, haversine, world [-180,180]x[-90,90].
    pub fn geo() -> Arc<Self> {
        Self::new(DistanceUnit::Kilometers, None, None).expect("geo defaults are valid")
    }

    /// A flat-plane context: unitless, euclidean, unbounded world.
    pub fn planar() -> Arc<Self> {
        Self::new(DistanceUnit::Euclidean, None, None).expect("planar defaults are valid")
    }

    /// Build a context from a unit plus optional calculator and world
    /// bounds overrides. Fails with [Configuration](crate::SpatialError::Configuration)
    /// on mismatched unit/calculator pairs, dateline-crossing world bounds,
    /// or geographic world bounds other than [-180,180]x[-90,90].
    pub fn new(
        unit: DistanceUnit,
        calculator: Option<DistanceCalculator>,
        world_bounds: Option<Rectangle>,
    ) -> Result<Arc<Self>> {
        let calculator = match calculator {
            Some(c) => {
                match (unit.is_geo(), &c) {
                    (true, DistanceCalculator::Euclidean) => {
                        return ConfigurationSnafu {
                            description: format!(
                                "unit {unit} needs a spherical calculator, not a euclidean one"
                            ),
                        }
                        .fail();
                    }
                    (false, DistanceCalculator::Haversine { .. }) => {
                        return ConfigurationSnafu {
                            description:
                                "the euclidean unit cannot use a spherical calculator".to_string(),
                        }
                        .fail();
                    }
                    _ => c,
                }
            }
            None => match unit.earth_radius() {
                Some(radius) => DistanceCalculator::Haversine {
                    sphere_radius: radius,
                },
                None => DistanceCalculator::Euclidean,
            },
        };

        let default_bounds = if unit.is_geo() {
            Rectangle::new(-180.0, 180.0, -90.0, 90.0, true)
        } else {
            Rectangle::new(-f64::MAX, f64::MAX, -f64::MAX, f64::MAX, false)
        };
        let mut ctx = SpatialContext {
            unit,
            calculator,
            world_bounds: default_bounds,
        };

        if let Some(bounds) = world_bounds {
            // rebuild through make_rect so the same normalization applies
            let bounds = ctx
                .make_rect(bounds.min_x(), bounds.max_x(), bounds.min_y(), bounds.max_y())
                .map_err(|e| {
                    ConfigurationSnafu {
                        description: format!("world bounds are not a valid rectangle: {e}"),
                    }
                    .build()
                })?;
            ensure!(
                !bounds.crosses_dateline(),
                ConfigurationSnafu {
                    description: format!("world bounds must not cross the dateline: {bounds}"),
                }
            );
            if ctx.is_geo() {
                ensure!(
                    bounds == ctx.world_bounds,
                    ConfigurationSnafu {
                        description: format!(
                            "geographic world bounds must be [-180,180]x[-90,90], got {bounds}"
                        ),
                    }
                );
            }
            ctx.world_bounds = bounds;
        }

        log::debug!(
            "spatial context ready: unit={}, world bounds={}",
            ctx.unit,
            ctx.world_bounds
        );
        Ok(Arc::new(ctx))
    }

    pub fn unit(&self) -> DistanceUnit {
        self.unit
    }

    pub fn calculator(&self) -> DistanceCalculator {
        self.calculator
    }

    pub fn world_bounds(&self) -> Rectangle {
        self.world_bounds
    }

    /// Geospatial (degrees on a sphere) or plain 2D?
    pub fn is_geo(&self) -> bool {
        self.unit.is_geo()
    }

    /// Normalize an x-coordinate: wrap longitude into [-180, 180) when
    /// geographic, identity otherwise. Idempotent.
    pub fn norm_x(&self, x: f64) -> f64 {
        if self.is_geo() {
            norm_lon_deg(x)
        } else {
            x
        }
    }

    /// Normalize a y-coordinate: fold latitude into [-90, 90] (reflecting
    /// over the poles) when geographic, identity otherwise. Idempotent.
    pub fn norm_y(&self, y: f64) -> f64 {
        if self.is_geo() {
            norm_lat_deg(y)
        } else {
            y
        }
    }

    fn verify_x(&self, x: f64) -> Result<()> {
        ensure!(
            x.is_finite(),
            InvalidShapeSnafu {
                description: format!("x must be finite, got {x}"),
            }
        );
        ensure!(
            self.is_geo() || (self.world_bounds.min_x() <= x && x <= self.world_bounds.max_x()),
            InvalidShapeSnafu {
                description: format!("x {x} outside world bounds {}", self.world_bounds),
            }
        );
        Ok(())
    }

    fn verify_y(&self, y: f64) -> Result<()> {
        ensure!(
            y.is_finite(),
            InvalidShapeSnafu {
                description: format!("y must be finite, got {y}"),
            }
        );
        ensure!(
            self.world_bounds.min_y() <= y && y <= self.world_bounds.max_y()
                || self.is_geo(), // geo y-values wrap instead
            InvalidShapeSnafu {
                description: format!("y {y} outside world bounds {}", self.world_bounds),
            }
        );
        Ok(())
    }

    /// Construct a point; the coordinates are normalized first.
    pub fn make_point(&self, x: f64, y: f64) -> Result<Point> {
        self.verify_x(x)?;
        self.verify_y(y)?;
        Ok(Point::new(self.norm_x(x), self.norm_y(y)))
    }

    /// Construct a rectangle; the coordinates are normalized first.
    ///
    /// Geographic x-spans keep `min_x > max_x` as the dateline-crossing
    /// encoding (never silently swapped); a raw width of 360º or more
    /// becomes the full world span, and raw `min_x == max_x` stays a
    /// zero-width span. A planar `min_x > max_x` is unsupported.
    pub fn make_rect(&self, min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Result<Rectangle> {
        for v in [min_x, max_x, min_y, max_y] {
            ensure!(
                v.is_finite(),
                InvalidShapeSnafu {
                    description: format!("rectangle coordinates must be finite, got {v}"),
                }
            );
        }
        ensure!(
            min_y <= max_y,
            InvalidShapeSnafu {
                description: format!("min_y {min_y} must not exceed max_y {max_y}"),
            }
        );
        if self.is_geo() {
            ensure!(
                -90.0 <= min_y && max_y <= 90.0,
                InvalidShapeSnafu {
                    description: format!(
                        "rectangle y-interval [{min_y},{max_y}] exceeds the latitude domain"
                    ),
                }
            );
            let (min_x, max_x) = if min_x == max_x {
                let x = norm_lon_deg(min_x);
                (x, x)
            } else if max_x - min_x >= 360.0 {
                (-180.0, 180.0)
            } else {
                // min prefers -180, max prefers +180, so that world-spanning
                // rectangles stay non-crossing
                let norm_min = norm_lon_deg(min_x);
                let norm_max = match norm_lon_deg(max_x) {
                    v if v == -180.0 => 180.0,
                    v => v,
                };
                (norm_min, norm_max)
            };
            Ok(Rectangle::new(min_x, max_x, min_y, max_y, true))
        } else {
            ensure!(
                min_x <= max_x,
                UnsupportedSnafu {
                    description: format!(
                        "x-interval [{min_x},{max_x}] wraps, which a planar context cannot express"
                    ),
                }
            );
            self.verify_x(min_x)?;
            self.verify_x(max_x)?;
            self.verify_y(min_y)?;
            self.verify_y(max_y)?;
            Ok(Rectangle::new(min_x, max_x, min_y, max_y, false))
        }
    }

    /// Construct a circle from raw center coordinates.
    pub fn make_circle(&self, x: f64, y: f64, distance: f64) -> Result<Circle> {
        let center = self.make_point(x, y)?;
        self.make_circle_at(center, distance)
    }

    /// Construct a circle around an already-normalized center. `distance`
    /// is in this context's units; the enclosing rectangle is derived here,
    /// once.
    pub fn make_circle_at(&self, center: Point, distance: f64) -> Result<Circle> {
        ensure!(
            distance.is_finite() && distance >= 0.0,
            InvalidShapeSnafu {
                description: format!("circle radius must be non-negative, got {distance}"),
            }
        );
        let (dx, dy) = self.calculator.bounding_deltas(&center, distance);
        let bbox = if self.is_geo() {
            let min_y = center.y - dy;
            let max_y = center.y + dy;
            if max_y >= 90.0 || min_y <= -90.0 {
                // reaches a pole: every longitude is covered
                self.make_rect(-180.0, 180.0, min_y.max(-90.0), max_y.min(90.0))?
            } else if dx >= 180.0 {
                self.make_rect(-180.0, 180.0, min_y, max_y)?
            } else {
                self.make_rect(center.x - dx, center.x + dx, min_y, max_y)?
            }
        } else {
            Rectangle::new(center.x - dx, center.x + dx, center.y - dy, center.y + dy, false)
        };
        Ok(Circle::new(center, distance, self.calculator, bbox))
    }

    /// Construct a collection over shapes made by this context.
    pub fn make_collection(ctx: &Arc<Self>, shapes: Vec<Shape>) -> Result<ShapeCollection> {
        ShapeCollection::new(shapes, ctx)
    }

    /// Read a shape from its minimal text form:
    ///
    /// - `"X Y"` — point
    /// - `"lat,lon"` — point, latitude first
    /// - `"minX minY maxX maxY"` — rectangle
    /// - `"Circle(<point> <radius>)"` with `<radius>` optionally keyed as
    ///   `d=<radius>` or `distance=<radius>` — circle
    ///
    /// Anything else, including trailing tokens, is a parse error.
    pub fn read_shape(&self, text: &str) -> Result<Shape> {
        let trimmed = text.trim();
        ensure!(
            !trimmed.is_empty(),
            ShapeParseSnafu {
                input: text,
                description: "empty input",
            }
        );
        if trimmed.chars().next().is_some_and(char::is_alphabetic) {
            let body = trimmed
                .strip_prefix("Circle(")
                .and_then(|rest| rest.strip_suffix(')'))
                .context(ShapeParseSnafu {
                    input: text,
                    description: "only Circle(...) is recognized as a keyword shape",
                })?;
            return self.read_circle(body, text);
        }
        if trimmed.contains(',') {
            return Ok(Shape::Point(self.read_lat_lon_point(trimmed, text)?));
        }
        let numbers: Vec<f64> = trimmed
            .split_whitespace()
            .map(|token| parse_number(token, text))
            .collect::<Result<_>>()?;
        match numbers[..] {
            [x, y] => Ok(Shape::Point(self.make_point(x, y)?)),
            // text order is minX minY maxX maxY
            [min_x, min_y, max_x, max_y] => {
                Ok(Shape::Rect(self.make_rect(min_x, max_x, min_y, max_y)?))
            }
            _ => ShapeParseSnafu {
                input: text,
                description: format!("expected 2 or 4 numbers, got {}", numbers.len()),
            }
            .fail(),
        }
    }

    fn read_circle(&self, body: &str, input: &str) -> Result<Shape> {
        let mut tokens = body.split_whitespace();
        let first = tokens.next().context(ShapeParseSnafu {
            input,
            description: "missing circle center",
        })?;
        let center = if first.contains(',') {
            self.read_lat_lon_point(first, input)?
        } else {
            let x = parse_number(first, input)?;
            let y_token = tokens.next().context(ShapeParseSnafu {
                input,
                description: "missing y coordinate of circle center",
            })?;
            self.make_point(x, parse_number(y_token, input)?)?
        };
        let distance_token = tokens.next().context(ShapeParseSnafu {
            input,
            description: "missing circle distance",
        })?;
        let distance = match distance_token.split_once('=') {
            Some(("d" | "distance", value)) => parse_number(value, input)?,
            Some((key, _)) => {
                return ShapeParseSnafu {
                    input,
                    description: format!("unknown arg: {key}"),
                }
                .fail()
            }
            None => parse_number(distance_token, input)?,
        };
        if let Some(extra) = tokens.next() {
            return ShapeParseSnafu {
                input,
                description: format!("extra argument: {extra}"),
            }
            .fail();
        }
        Ok(Shape::Circle(self.make_circle_at(center, distance)?))
    }

    /// Parse a `"lat,lon"` pair (latitude first) into a point.
    fn read_lat_lon_point(&self, token: &str, input: &str) -> Result<Point> {
        let (lat_str, lon_str) = token.split_once(',').context(ShapeParseSnafu {
            input,
            description: "expected lat,lon",
        })?;
        ensure!(
            !lon_str.contains(','),
            ShapeParseSnafu {
                input,
                description: "expected exactly one comma in a lat,lon pair",
            }
        );
        let lat = parse_number(lat_str.trim(), input)?;
        let lon = parse_number(lon_str.trim(), input)?;
        self.make_point(lon, lat)
    }

    /// Canonical rectangle text: `"minX minY maxX maxY"` with exactly six
    /// fractional digits. Round-trips through [read_shape](Self::read_shape).
    pub fn write_rect(&self, rect: &Rectangle) -> String {
        format!(
            "{:.6} {:.6} {:.6} {:.6}",
            rect.min_x(),
            rect.min_y(),
            rect.max_x(),
            rect.max_y()
        )
    }
}

fn parse_number(token: &str, input: &str) -> Result<f64> {
    token.parse::<f64>().map_err(|_| {
        ShapeParseSnafu {
            input,
            description: format!("invalid number {token:?}"),
        }
        .build()
    })
}

/// Wrap a longitude into [-180, 180).
fn norm_lon_deg(lon: f64) -> f64 {
    if (-180.0..180.0).contains(&lon) {
        return lon;
    }
    let off = (lon + 180.0) % 360.0;
    if off < 0.0 {
        off + 180.0
    } else {
        off - 180.0
    }
}

/// Fold a latitude into [-90, 90], reflecting over the poles.
fn norm_lat_deg(lat: f64) -> f64 {
    if (-90.0..=90.0).contains(&lat) {
        return lat;
    }
    let off = ((lat + 90.0) % 360.0).abs();
    (if off <= 180.0 { off } else { 360.0 - off }) - 90.0
}
