//! Footprint outline built from five anatomical landmarks.

use insole_kernel::geometry::curves::ClosedPath2d;
use insole_kernel::geometry::point::Point2d;
use insole_kernel::default_tolerance;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::params::AnthropometricParams;

/// Landmark positions on one side of the foot, in meters.
///
/// `y` values are half-widths; the outer side is mirrored to `-y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmarks {
    pub heel: Point2d,
    pub rear_arch: Point2d,
    pub fore_arch: Point2d,
    pub forefoot: Point2d,
    pub toe: Point2d,
}

impl Landmarks {
    pub fn from_params(params: &AnthropometricParams) -> Self {
        let (l, w, h) = params.outline_m();
        Self {
            heel: Point2d::new(-l / 2.0, h / 2.0),
            rear_arch: Point2d::new(-l / 8.0, w / 2.5),
            fore_arch: Point2d::new(l / 8.0, w / 3.0),
            forefoot: Point2d::new(l / 2.0 - l / 8.0, w / 4.0),
            toe: Point2d::new(l / 2.0, 0.0),
        }
    }

    /// The three cubic spans from heel to toe as `[start, c1, c2, end]`,
    /// on the `+y` side.
    fn half_outline(&self, length: f64) -> [[Point2d; 4]; 3] {
        let Landmarks {
            heel,
            rear_arch,
            fore_arch,
            forefoot,
            toe,
        } = *self;
        let step = length / 8.0;
        let run = forefoot - fore_arch;
        let to_toe = Point2d::new(run.x * 0.25, run.y * 0.25);
        [
            [
                heel,
                Point2d::new(heel.x + step, heel.y),
                Point2d::new(rear_arch.x - step, rear_arch.y),
                rear_arch,
            ],
            [rear_arch, Point2d::new(rear_arch.x + step, rear_arch.y), fore_arch, forefoot],
            [forefoot, forefoot + to_toe, Point2d::new(toe.x, forefoot.y / 2.0), toe],
        ]
    }
}

/// A closed footprint outline: six cubic spans and the straight heel edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourCurve {
    pub path: ClosedPath2d,
    /// Inset this outline was built with (mm).
    pub offset_mm: f64,
}

impl ContourCurve {
    /// Build the outline for `params`, contracted by `offset_mm`.
    ///
    /// The outer side (`y < 0`) runs heel to toe, the inner side runs back,
    /// and a straight segment joins the two heel points. The result is
    /// counter-clockwise.
    #[instrument(skip(params), fields(length = params.foot_length, width = params.foot_width))]
    pub fn build(params: &AnthropometricParams, offset_mm: f64) -> Self {
        let landmarks = Landmarks::from_params(params);
        let (length, _, _) = params.outline_m();
        let half = landmarks.half_outline(length);
        let mirror = |p: &Point2d| Point2d::new(p.x, -p.y);

        let mut path = ClosedPath2d::new();
        for [a, b, c, d] in &half {
            path.cubic(mirror(a), mirror(b), mirror(c), mirror(d));
        }
        for [a, b, c, d] in half.iter().rev() {
            path.cubic(*d, *c, *b, *a);
        }
        path.line(landmarks.heel, mirror(&landmarks.heel));

        let (sx, sy) = contraction(params, offset_mm);
        let path = path.map_points(|p| p.scaled_about(&Point2d::ORIGIN, sx, sy));
        debug!(offset_mm, sx, sy, "built contour");
        Self { path, offset_mm }
    }

    /// Closed polyline with the start point repeated at the end.
    pub fn points(&self, divisions: usize) -> Vec<Point2d> {
        self.path.path(divisions)
    }

    /// Polyline without the closing duplicate, as the extruder expects.
    pub fn sample(&self, divisions: usize) -> Vec<Point2d> {
        self.path.sample(divisions)
    }

    pub fn is_closed(&self) -> bool {
        self.path.is_closed(default_tolerance().coincidence)
    }
}

/// Per-axis scale factors `(longitudinal, lateral)` for an inset of `offset_mm`.
pub fn contraction(params: &AnthropometricParams, offset_mm: f64) -> (f64, f64) {
    let factor = |extent_mm: f64| {
        if extent_mm > 0.0 {
            ((extent_mm - offset_mm) / extent_mm).max(0.0)
        } else {
            0.0
        }
    };
    (factor(params.foot_length), factor(params.foot_width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use insole_tessellation::triangulate::signed_area;

    fn params() -> AnthropometricParams {
        AnthropometricParams::default()
    }

    #[test]
    fn test_contour_closes_and_has_seven_segments() {
        let c = ContourCurve::build(&params(), 0.0);
        assert!(c.is_closed());
        assert_eq!(c.path.segments.len(), 7);
        let pts = c.points(10);
        assert_eq!(pts.first(), pts.last());
    }

    #[test]
    fn test_landmark_extremes() {
        let c = ContourCurve::build(&params(), 0.0);
        let pts = c.sample(20);
        let min_x = pts.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = pts.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        assert_relative_eq!(min_x, -0.125);
        assert_relative_eq!(max_x, 0.125);
        // outer side first
        assert!(pts[5].y < 0.0);
        assert_relative_eq!(c.path.start_point().unwrap().y, -0.035);
    }

    #[test]
    fn test_counter_clockwise() {
        let c = ContourCurve::build(&params(), 0.0);
        assert!(signed_area(&c.sample(20)) > 0.0);
    }

    #[test]
    fn test_offset_contracts() {
        let p = params();
        let outer = ContourCurve::build(&p, 0.0);
        let inner = ContourCurve::build(&p, 15.0);
        let outer_start = outer.path.start_point().unwrap();
        let inner_start = inner.path.start_point().unwrap();
        assert_relative_eq!(inner_start.x, outer_start.x * 0.94);
        assert_relative_eq!(inner_start.y, outer_start.y * 0.85);
        assert!(signed_area(&inner.sample(20)) < signed_area(&outer.sample(20)));
    }

    #[test]
    fn test_offset_beyond_width_collapses() {
        let (sx, sy) = contraction(&params(), 120.0);
        assert_eq!(sy, 0.0);
        assert_relative_eq!(sx, 130.0 / 250.0);
        assert!(ContourCurve::build(&params(), 120.0).is_closed());
    }
}
