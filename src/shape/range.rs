//! 1-D interval arithmetic: plain linear ranges and circular longitude
//! ranges over the [-180, 180) wraparound domain.

use super::SpatialRelation;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A linear closed interval. `min <= max` always.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        debug_assert!(min <= max, "Range [{min},{max}] is inverted");
        Range { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn center(&self) -> f64 {
        self.min + self.width() / 2.0
    }

    pub fn contains_value(&self, v: f64) -> bool {
        self.min <= v && v <= self.max
    }

    pub fn contains_range(&self, other: &Range) -> bool {
        self.min <= other.min && other.max <= self.max
    }

    pub fn expand_to(&self, other: &Range) -> Range {
        Range {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Interval relation of `self` to `other`: `Contains` when `other` lies
    /// inside `self` (equal intervals included), `Within` for the converse.
    pub fn relate(&self, other: &Range) -> SpatialRelation {
        if other.min > self.max || other.max < self.min {
            SpatialRelation::Disjoint
        } else if self.contains_range(other) {
            SpatialRelation::Contains
        } else if other.contains_range(self) {
            SpatialRelation::Within
        } else {
            SpatialRelation::Intersects
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.min, self.max)
    }
}

/// A closed arc on the longitude circle. Endpoints lie in [-180, 180];
/// `min > max` encodes a span that wraps past the dateline.
///
/// Equality is by arc, not by representation: a zero-width arc at +180 and
/// one at -180 are the same arc, and every full-circle representation equals
/// [`LongitudeRange::WORLD`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LongitudeRange {
    pub min: f64,
    pub max: f64,
}

impl LongitudeRange {
    pub const WORLD: LongitudeRange = LongitudeRange {
        min: -180.0,
        max: 180.0,
    };

    pub fn new(min: f64, max: f64) -> Self {
        debug_assert!(
            (-180.0..=180.0).contains(&min) && (-180.0..=180.0).contains(&max),
            "LongitudeRange [{min},{max}] endpoints out of the degree domain"
        );
        LongitudeRange { min, max }
    }

    pub fn crosses_dateline(&self) -> bool {
        self.min > self.max
    }

    /// Arc width in degrees; wrapped spans add the full turn back in.
    pub fn width(&self) -> f64 {
        let w = self.max - self.min;
        if w >= 0.0 {
            w
        } else {
            w + 360.0
        }
    }

    pub fn is_full_world(&self) -> bool {
        self.width() >= 360.0
    }

    /// Midpoint of the arc, normalized into [-180, 180).
    pub fn center(&self) -> f64 {
        let mid = self.min + self.width() / 2.0;
        if mid >= 180.0 {
            mid - 360.0
        } else {
            mid
        }
    }

    pub fn contains_value(&self, v: f64) -> bool {
        if self.is_full_world() {
            return true;
        }
        if self.crosses_dateline() {
            v >= self.min || v <= self.max
        } else {
            // ±180 denote the same meridian
            (self.min <= v && v <= self.max)
                || (v == -180.0 && self.max == 180.0)
                || (v == 180.0 && self.min == -180.0)
        }
    }

    pub fn contains_range(&self, other: &LongitudeRange) -> bool {
        if self.is_full_world() {
            return true;
        }
        if other.is_full_world() {
            return false;
        }
        other
            .segments()
            .iter()
            .all(|seg| self.segments().iter().any(|s| covers(s, seg)))
    }

    /// Arc relation with the same orientation as [Range::relate].
    pub fn relate(&self, other: &LongitudeRange) -> SpatialRelation {
        if self.contains_range(other) {
            SpatialRelation::Contains
        } else if other.contains_range(self) {
            SpatialRelation::Within
        } else if self.overlaps(other) {
            SpatialRelation::Intersects
        } else {
            SpatialRelation::Disjoint
        }
    }

    fn overlaps(&self, other: &LongitudeRange) -> bool {
        for a in self.segments().iter() {
            for b in other.segments().iter() {
                // the ±360 shifts catch touching across the dateline itself
                for shift in [-360.0, 0.0, 360.0] {
                    if a.min <= b.max + shift && b.min + shift <= a.max {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// The one or two non-wrapping sub-intervals making up this arc.
    pub fn segments(&self) -> Vec<Range> {
        if self.crosses_dateline() {
            vec![Range::new(self.min, 180.0), Range::new(-180.0, self.max)]
        } else {
            vec![Range::new(self.min, self.max)]
        }
    }
}

/// Segment coverage with the ±180 meridian identified: a zero-width segment
/// at -180 sits inside [170, 180] and vice versa.
fn covers(outer: &Range, seg: &Range) -> bool {
    [-360.0, 0.0, 360.0].iter().any(|shift| {
        outer.contains_range(&Range {
            min: seg.min + shift,
            max: seg.max + shift,
        })
    })
}

impl PartialEq for LongitudeRange {
    fn eq(&self, other: &Self) -> bool {
        if self.is_full_world() && other.is_full_world() {
            return true;
        }
        // compare start-of-arc with ±180 identified, plus the arc width
        let canon = |v: f64| if v == 180.0 { -180.0 } else { v };
        canon(self.min) == canon(other.min) && self.width() == other.width()
    }
}

impl fmt::Display for LongitudeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}º,{}º]", self.min, self.max)
    }
}

/// Aggregate longitude span of a set of arcs, via the gap algorithm: merge
/// every non-wrapping sub-interval around the circle, find each maximal
/// uncovered gap, and drop the largest one — its complement is the result.
/// No gap left means the spans cover the whole circle.
///
/// The spans are merged as a set, so the result does not depend on input
/// order.
pub fn aggregate_longitude(spans: &[LongitudeRange]) -> LongitudeRange {
    assert!(!spans.is_empty(), "cannot aggregate zero longitude spans");
    if spans.iter().any(LongitudeRange::is_full_world) {
        return LongitudeRange::WORLD;
    }

    let sorted: Vec<Range> = spans
        .iter()
        .flat_map(|s| s.segments())
        .sorted_by(|a, b| a.min.total_cmp(&b.min).then(a.max.total_cmp(&b.max)))
        .collect();

    let mut merged: Vec<Range> = Vec::with_capacity(sorted.len());
    for seg in sorted {
        match merged.last_mut() {
            Some(last) if seg.min <= last.max => last.max = last.max.max(seg.max),
            _ => merged.push(seg),
        }
    }

    // gaps between neighbours, plus the wrap-around gap from the last
    // segment back to the first
    let mut largest_start = merged[merged.len() - 1].max;
    let mut largest_width = merged[0].min + 360.0 - largest_start;
    for (a, b) in merged.iter().tuple_windows() {
        let width = b.min - a.max;
        if width > largest_width {
            largest_width = width;
            largest_start = a.max;
        }
    }

    if largest_width <= 0.0 {
        log::debug!("longitude spans cover the whole circle");
        return LongitudeRange::WORLD;
    }

    let gap_end = largest_start + largest_width;
    let min = if gap_end >= 180.0 {
        gap_end - 360.0
    } else {
        gap_end
    };
    LongitudeRange::new(min, largest_start)
}
