//! The "GEOMETRY" Engine - Arc-Length Parameterized Centerline
//!
//! A track centerline is an ordered polyline whose points carry their
//! cumulative arc-length `m` from the start line. This module provides the
//! two spatial queries the animation layer is built on:
//! - Distance Resolver: absolute distance → interpolated 2D coordinate
//!   (multi-lap wraparound, O(log n) segment lookup)
//! - Nearest-Point Query: pixel coordinate → closest centerline point
//!   (hit-testing, O(n) scan)

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

// ============================================================================
// DATA MODEL
// ============================================================================

/// A single sample point on a track centerline.
///
/// `x`/`y` are normalized coordinates in `[0, 1]`; `m` is the cumulative
/// arc-length from the start line. Within a [`Centerline`], points are
/// sorted by non-decreasing `m` and the last point's `m` equals the total
/// track length. Monotonicity is an input-validity precondition of the
/// external track loader, not re-checked at query time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Cumulative arc-length from track start
    pub m: f64,

    /// Normalized x coordinate in [0, 1]
    pub x: f64,

    /// Normalized y coordinate in [0, 1]
    pub y: f64,
}

impl TrackPoint {
    /// Creates a new track point.
    pub fn new(m: f64, x: f64, y: f64) -> Self {
        Self { m, x, y }
    }

    /// Returns the normalized position as a 2D point.
    #[inline]
    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Returns the position scaled to pixel space.
    #[inline]
    pub fn to_pixels(&self, width: f64, height: f64) -> Point2<f64> {
        Point2::new(self.x * width, self.y * height)
    }
}

/// Track metadata and centerline as delivered by the external track loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackData {
    /// Human-readable track name
    pub track: String,

    /// Stable track identifier
    pub track_id: String,

    /// Total track length (same unit as TrackPoint.m)
    pub total_length: f64,

    /// Ordered centerline points
    pub centerline: Vec<TrackPoint>,
}

impl TrackData {
    /// Parses a TrackData document from its JSON wire format.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ============================================================================
// QUERY RESULTS
// ============================================================================

/// Result of resolving an absolute distance to a coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPoint {
    /// Normalized x coordinate
    pub x: f64,

    /// Normalized y coordinate
    pub y: f64,

    /// Index of the segment's lower endpoint
    pub segment_index: usize,

    /// Interpolation parameter within the segment, in [0, 1] for
    /// monotonic centerlines
    pub segment_t: f64,
}

impl ResolvedPoint {
    /// The origin resolution returned for an empty centerline.
    pub fn origin() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            segment_index: 0,
            segment_t: 0.0,
        }
    }
}

/// Result of a nearest-point query, in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestPoint {
    /// The closest centerline point (normalized coordinates)
    pub point: TrackPoint,

    /// Euclidean pixel distance from the query coordinate
    pub distance: f64,

    /// Index of the closest point within the centerline
    pub index: usize,
}

// ============================================================================
// CENTERLINE
// ============================================================================

/// An ordered, arc-length-parameterized track centerline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Centerline {
    points: Vec<TrackPoint>,
}

impl Centerline {
    /// Creates a centerline from an ordered point list.
    pub fn new(points: Vec<TrackPoint>) -> Self {
        Self { points }
    }

    /// Returns the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the centerline holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the underlying points.
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// Total track length: the last point's cumulative arc-length.
    pub fn total_length(&self) -> f64 {
        self.points.last().map(|p| p.m).unwrap_or(0.0)
    }

    /// Wraps an absolute distance into `[0, total)`.
    ///
    /// Correct for negative inputs, so callers can query lap offsets behind
    /// the start line as well as arbitrarily many laps ahead.
    fn wrap_distance(&self, m: f64, total: f64) -> f64 {
        ((m % total) + total) % total
    }

    /// Resolves an absolute arc-length distance to a 2D coordinate.
    ///
    /// Multi-lap distances wrap seamlessly: `m`, `m + total`, `m - total`
    /// all resolve to the same point. Degenerate centerlines never panic:
    /// an empty centerline resolves to the origin, a single point or a
    /// zero-length track collapses every query onto the first point.
    pub fn point_at_distance(&self, m: f64) -> ResolvedPoint {
        let first = match self.points.first() {
            Some(p) => p,
            None => return ResolvedPoint::origin(),
        };

        let total = self.total_length();
        if total <= 0.0 || self.points.len() < 2 {
            return ResolvedPoint {
                x: first.x,
                y: first.y,
                segment_index: 0,
                segment_t: 0.0,
            };
        }

        let wrapped = self.wrap_distance(m, total);

        // Binary search for the segment [a, b) with a.m <= wrapped < b.m.
        // partition_point returns the first index whose m exceeds wrapped.
        let upper = self.points.partition_point(|p| p.m <= wrapped);
        let index = upper.saturating_sub(1).min(self.points.len() - 2);

        let a = self.points[index];
        let b = self.points[index + 1];

        let span = b.m - a.m;
        let denom = if span > 0.0 { span } else { 1.0 };
        let t = (wrapped - a.m) / denom;

        ResolvedPoint {
            x: crate::interpolation::lerp(a.x, b.x, t),
            y: crate::interpolation::lerp(a.y, b.y, t),
            segment_index: index,
            segment_t: t,
        }
    }

    /// Finds the centerline point closest to a pixel-space coordinate.
    ///
    /// Linear scan over all points; adequate for the few-thousand-point
    /// centerlines produced by track loaders. An empty centerline yields a
    /// sentinel with infinite distance.
    pub fn nearest_point(&self, x: f64, y: f64, width: f64, height: f64) -> NearestPoint {
        let query = Point2::new(x, y);

        let mut best = NearestPoint {
            point: TrackPoint::new(0.0, 0.0, 0.0),
            distance: f64::INFINITY,
            index: 0,
        };

        for (index, point) in self.points.iter().enumerate() {
            let distance = nalgebra::distance(&point.to_pixels(width, height), &query);
            if distance < best.distance {
                best = NearestPoint {
                    point: *point,
                    distance,
                    index,
                };
            }
        }

        best
    }
}

impl From<TrackData> for Centerline {
    fn from(data: TrackData) -> Self {
        Self::new(data.centerline)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn straight_track() -> Centerline {
        Centerline::new(vec![
            TrackPoint::new(0.0, 0.0, 0.0),
            TrackPoint::new(100.0, 1.0, 0.0),
        ])
    }

    fn square_track() -> Centerline {
        // 4 sides of length 100 in m-space
        Centerline::new(vec![
            TrackPoint::new(0.0, 0.0, 0.0),
            TrackPoint::new(100.0, 1.0, 0.0),
            TrackPoint::new(200.0, 1.0, 1.0),
            TrackPoint::new(300.0, 0.0, 1.0),
            TrackPoint::new(400.0, 0.0, 0.0),
        ])
    }

    #[test]
    fn test_empty_centerline_resolves_to_origin() {
        let cl = Centerline::default();

        for m in [-250.0, 0.0, 1.0, 1e9] {
            let p = cl.point_at_distance(m);
            assert_eq!(p, ResolvedPoint::origin());
        }
    }

    #[test]
    fn test_single_point_collapses_queries() {
        let cl = Centerline::new(vec![TrackPoint::new(0.0, 0.3, 0.7)]);

        let p = cl.point_at_distance(1234.5);
        assert_eq!(p.x, 0.3);
        assert_eq!(p.y, 0.7);
        assert_eq!(p.segment_index, 0);
    }

    #[test]
    fn test_zero_length_track_collapses_queries() {
        let cl = Centerline::new(vec![
            TrackPoint::new(0.0, 0.2, 0.2),
            TrackPoint::new(0.0, 0.8, 0.8),
        ]);

        let p = cl.point_at_distance(50.0);
        assert_eq!(p.x, 0.2);
        assert_eq!(p.y, 0.2);
    }

    #[test]
    fn test_midpoint_interpolation_exact() {
        let cl = straight_track();

        let p = cl.point_at_distance(50.0);
        assert_eq!(p.x, 0.5);
        assert_eq!(p.y, 0.0);
        assert_eq!(p.segment_index, 0);
        assert_eq!(p.segment_t, 0.5);
    }

    #[test]
    fn test_boundary_exactness() {
        let cl = square_track();

        let start = cl.point_at_distance(0.0);
        assert_eq!(start.x, 0.0);
        assert_eq!(start.y, 0.0);

        // The total length wraps back onto the start line
        let lap = cl.point_at_distance(400.0);
        assert_relative_eq!(lap.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(lap.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_distance_wraps_backward() {
        let cl = square_track();

        // -100 is the same point as +300
        let back = cl.point_at_distance(-100.0);
        let fwd = cl.point_at_distance(300.0);
        assert_relative_eq!(back.x, fwd.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, fwd.y, epsilon = 1e-12);
    }

    #[test]
    fn test_multi_lap_wraparound() {
        let cl = square_track();

        let one = cl.point_at_distance(150.0);
        let three_laps_on = cl.point_at_distance(150.0 + 3.0 * 400.0);
        assert_relative_eq!(one.x, three_laps_on.x, epsilon = 1e-9);
        assert_relative_eq!(one.y, three_laps_on.y, epsilon = 1e-9);
        assert_eq!(one.segment_index, three_laps_on.segment_index);
    }

    #[test]
    fn test_segment_lookup_lands_in_correct_segment() {
        let cl = square_track();

        assert_eq!(cl.point_at_distance(50.0).segment_index, 0);
        assert_eq!(cl.point_at_distance(100.0).segment_index, 1);
        assert_eq!(cl.point_at_distance(250.0).segment_index, 2);
        assert_eq!(cl.point_at_distance(399.9).segment_index, 3);
    }

    #[test]
    fn test_nearest_point_basic() {
        let cl = square_track();

        // Query right on top of the third point, scaled to a 1000x600 view
        let hit = cl.nearest_point(1000.0, 600.0, 1000.0, 600.0);
        assert_eq!(hit.index, 2);
        assert_relative_eq!(hit.distance, 0.0, epsilon = 1e-12);

        // Query near the start line
        let near_start = cl.nearest_point(10.0, 5.0, 1000.0, 600.0);
        assert!(near_start.index == 0 || near_start.index == 4);
        assert!(near_start.distance < 20.0);
    }

    #[test]
    fn test_nearest_point_empty_sentinel() {
        let cl = Centerline::default();

        let miss = cl.nearest_point(500.0, 300.0, 1000.0, 600.0);
        assert_eq!(miss.distance, f64::INFINITY);
        assert_eq!(miss.index, 0);
    }

    #[test]
    fn test_track_data_wire_format() {
        let json = r#"{
            "track": "Monza",
            "trackId": "monza",
            "totalLength": 400.0,
            "centerline": [
                { "m": 0.0, "x": 0.0, "y": 0.0 },
                { "m": 400.0, "x": 1.0, "y": 1.0 }
            ]
        }"#;

        let data = TrackData::from_json(json).unwrap();
        assert_eq!(data.track_id, "monza");
        assert_eq!(data.centerline.len(), 2);

        let cl: Centerline = data.into();
        assert_eq!(cl.total_length(), 400.0);
    }

    // Strategy: monotonic centerlines built from positive segment spans
    fn arb_centerline() -> impl Strategy<Value = Centerline> {
        prop::collection::vec((0.1f64..50.0, 0.0f64..1.0, 0.0f64..1.0), 2..20).prop_map(
            |segments| {
                let mut m = 0.0;
                let points = segments
                    .into_iter()
                    .map(|(span, x, y)| {
                        let point = TrackPoint::new(m, x, y);
                        m += span;
                        point
                    })
                    .collect::<Vec<_>>();
                // Close the loop back at the start coordinates
                let mut points = points;
                let first = points[0];
                points.push(TrackPoint::new(m, first.x, first.y));
                Centerline::new(points)
            },
        )
    }

    proptest! {
        #[test]
        fn prop_wraparound_idempotence(cl in arb_centerline(), m in -500.0f64..500.0, k in -3i32..=3) {
            let total = cl.total_length();
            let base = cl.point_at_distance(m);
            let shifted = cl.point_at_distance(m + k as f64 * total);

            prop_assert!((base.x - shifted.x).abs() < 1e-6);
            prop_assert!((base.y - shifted.y).abs() < 1e-6);
        }

        #[test]
        fn prop_resolution_stays_on_unit_square(cl in arb_centerline(), m in -500.0f64..500.0) {
            let p = cl.point_at_distance(m);
            prop_assert!(p.x >= 0.0 && p.x <= 1.0);
            prop_assert!(p.y >= 0.0 && p.y <= 1.0);
            prop_assert!(p.segment_t >= 0.0 && p.segment_t <= 1.0);
        }
    }
}
