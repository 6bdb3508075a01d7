use serde::{Deserialize, Serialize};

use super::point::{Point2d, Point3d};
use super::vector::Vec3;

/// A planar cubic Bezier segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier2d {
    pub start: Point2d,
    pub control1: Point2d,
    pub control2: Point2d,
    pub end: Point2d,
}

impl CubicBezier2d {
    pub fn new(start: Point2d, control1: Point2d, control2: Point2d, end: Point2d) -> Self {
        Self {
            start,
            control1,
            control2,
            end,
        }
    }

    /// Evaluate with the Bernstein form at `t` in [0, 1].
    pub fn point_at(&self, t: f64) -> Point2d {
        let u = 1.0 - t;
        let b0 = u * u * u;
        let b1 = 3.0 * u * u * t;
        let b2 = 3.0 * u * t * t;
        let b3 = t * t * t;
        Point2d::new(
            b0 * self.start.x + b1 * self.control1.x + b2 * self.control2.x + b3 * self.end.x,
            b0 * self.start.y + b1 * self.control1.y + b2 * self.control2.y + b3 * self.end.y,
        )
    }

    pub fn map_points(&self, f: impl Fn(&Point2d) -> Point2d) -> Self {
        Self::new(f(&self.start), f(&self.control1), f(&self.control2), f(&self.end))
    }
}

/// One piece of a planar path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathSegment {
    Cubic(CubicBezier2d),
    Line { start: Point2d, end: Point2d },
}

impl PathSegment {
    pub fn start(&self) -> Point2d {
        match self {
            PathSegment::Cubic(c) => c.start,
            PathSegment::Line { start, .. } => *start,
        }
    }

    pub fn end(&self) -> Point2d {
        match self {
            PathSegment::Cubic(c) => c.end,
            PathSegment::Line { end, .. } => *end,
        }
    }

    pub fn map_points(&self, f: impl Fn(&Point2d) -> Point2d) -> Self {
        match self {
            PathSegment::Cubic(c) => PathSegment::Cubic(c.map_points(f)),
            PathSegment::Line { start, end } => PathSegment::Line {
                start: f(start),
                end: f(end),
            },
        }
    }

    /// Points after the segment start, ending at the segment end.
    /// Cubics are divided into `divisions` steps, lines contribute only their end.
    fn sample_tail(&self, divisions: usize, out: &mut Vec<Point2d>) {
        match self {
            PathSegment::Cubic(c) => {
                for i in 1..=divisions {
                    out.push(c.point_at(i as f64 / divisions as f64));
                }
            }
            PathSegment::Line { end, .. } => out.push(*end),
        }
    }
}

/// A chain of segments that is expected to end where it starts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClosedPath2d {
    pub segments: Vec<PathSegment>,
}

impl ClosedPath2d {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub fn cubic(&mut self, start: Point2d, control1: Point2d, control2: Point2d, end: Point2d) {
        self.push(PathSegment::Cubic(CubicBezier2d::new(start, control1, control2, end)));
    }

    pub fn line(&mut self, start: Point2d, end: Point2d) {
        self.push(PathSegment::Line { start, end });
    }

    pub fn start_point(&self) -> Option<Point2d> {
        self.segments.first().map(PathSegment::start)
    }

    pub fn end_point(&self) -> Option<Point2d> {
        self.segments.last().map(PathSegment::end)
    }

    /// True when the chain is non-empty, each segment starts where the previous
    /// one ended, and the last end meets the first start (within `tol`).
    pub fn is_closed(&self, tol: f64) -> bool {
        let (Some(first), Some(last)) = (self.start_point(), self.end_point()) else {
            return false;
        };
        let chained = self
            .segments
            .windows(2)
            .all(|w| w[0].end().distance_to(&w[1].start()) <= tol);
        chained && first.distance_to(&last) <= tol
    }

    /// Apply `f` to every endpoint and control point.
    pub fn map_points(&self, f: impl Fn(&Point2d) -> Point2d) -> Self {
        Self {
            segments: self.segments.iter().map(|s| s.map_points(&f)).collect(),
        }
    }

    /// Polyline including the repeated start point at the end.
    pub fn path(&self, divisions: usize) -> Vec<Point2d> {
        let mut out = Vec::new();
        let Some(first) = self.start_point() else {
            return out;
        };
        out.push(first);
        for segment in &self.segments {
            segment.sample_tail(divisions.max(1), &mut out);
        }
        out
    }

    /// Polyline with the closing duplicate dropped, ready for extrusion.
    pub fn sample(&self, divisions: usize) -> Vec<Point2d> {
        let mut points = self.path(divisions);
        let closes = match (points.first(), points.last()) {
            (Some(first), Some(last)) => points.len() > 1 && first.distance_to(last) < 1e-12,
            _ => false,
        };
        if closes {
            points.pop();
        }
        points
    }
}

/// Open centripetal Catmull-Rom spline through a sequence of 3D points.
///
/// Ends are extended by reflecting the neighbouring control point, so the
/// curve passes through the first and last point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatmullRom3d {
    pub points: Vec<Point3d>,
}

#[derive(Debug, Clone, Copy)]
struct CubicPoly {
    c0: f64,
    c1: f64,
    c2: f64,
    c3: f64,
}

impl CubicPoly {
    fn nonuniform(x0: f64, x1: f64, x2: f64, x3: f64, dt0: f64, dt1: f64, dt2: f64) -> Self {
        let t1 = ((x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1) * dt1;
        let t2 = ((x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2) * dt1;
        Self {
            c0: x1,
            c1: t1,
            c2: -3.0 * x1 + 3.0 * x2 - 2.0 * t1 - t2,
            c3: 2.0 * x1 - 2.0 * x2 + t1 + t2,
        }
    }

    fn value(&self, t: f64) -> f64 {
        self.c0 + t * (self.c1 + t * (self.c2 + t * self.c3))
    }

    fn derivative(&self, t: f64) -> f64 {
        self.c1 + t * (2.0 * self.c2 + 3.0 * t * self.c3)
    }
}

impl CatmullRom3d {
    pub fn new(points: Vec<Point3d>) -> Self {
        Self { points }
    }

    /// Locate the span containing global parameter `t` and build its
    /// per-axis polynomials. Returns `None` with fewer than two points.
    fn span(&self, t: f64) -> Option<([CubicPoly; 3], f64)> {
        let l = self.points.len();
        if l < 2 {
            return None;
        }
        let p = (l - 1) as f64 * t.clamp(0.0, 1.0);
        let mut index = p.floor() as usize;
        if index >= l - 1 {
            index = l - 2;
        }
        let weight = p - index as f64;

        let p1 = self.points[index];
        let p2 = self.points[index + 1];
        let p0 = if index > 0 {
            self.points[index - 1]
        } else {
            p1 + (p1 - p2)
        };
        let p3 = if index + 2 < l {
            self.points[index + 2]
        } else {
            p2 + (p2 - p1)
        };

        let mut dt0 = (p1 - p0).length_squared().powf(0.25);
        let mut dt1 = (p2 - p1).length_squared().powf(0.25);
        let mut dt2 = (p3 - p2).length_squared().powf(0.25);
        if dt1 < 1e-4 {
            dt1 = 1.0;
        }
        if dt0 < 1e-4 {
            dt0 = dt1;
        }
        if dt2 < 1e-4 {
            dt2 = dt1;
        }

        let polys = [
            CubicPoly::nonuniform(p0.x, p1.x, p2.x, p3.x, dt0, dt1, dt2),
            CubicPoly::nonuniform(p0.y, p1.y, p2.y, p3.y, dt0, dt1, dt2),
            CubicPoly::nonuniform(p0.z, p1.z, p2.z, p3.z, dt0, dt1, dt2),
        ];
        Some((polys, weight))
    }

    pub fn point_at(&self, t: f64) -> Option<Point3d> {
        let (polys, w) = self.span(t)?;
        Some(Point3d::new(polys[0].value(w), polys[1].value(w), polys[2].value(w)))
    }

    /// Unit tangent at `t`, `None` where the curve is stationary.
    pub fn tangent_at(&self, t: f64) -> Option<Vec3> {
        let (polys, w) = self.span(t)?;
        Vec3::new(
            polys[0].derivative(w),
            polys[1].derivative(w),
            polys[2].derivative(w),
        )
        .normalized()
    }

    /// `divisions + 1` evenly parameterized samples from start to end.
    pub fn sample(&self, divisions: usize) -> Vec<Point3d> {
        let divisions = divisions.max(1);
        (0..=divisions)
            .filter_map(|i| self.point_at(i as f64 / divisions as f64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> ClosedPath2d {
        let a = Point2d::new(0.0, 0.0);
        let b = Point2d::new(1.0, 0.0);
        let c = Point2d::new(1.0, 1.0);
        let d = Point2d::new(0.0, 1.0);
        let mut path = ClosedPath2d::new();
        path.cubic(a, a.lerp(&b, 0.3), a.lerp(&b, 0.7), b);
        path.cubic(b, b.lerp(&c, 0.3), b.lerp(&c, 0.7), c);
        path.cubic(c, c.lerp(&d, 0.3), c.lerp(&d, 0.7), d);
        path.line(d, a);
        path
    }

    #[test]
    fn test_bezier_endpoints() {
        let bez = CubicBezier2d::new(
            Point2d::new(0.0, 0.0),
            Point2d::new(1.0, 2.0),
            Point2d::new(3.0, 2.0),
            Point2d::new(4.0, 0.0),
        );
        assert_eq!(bez.point_at(0.0), bez.start);
        assert!(bez.point_at(1.0).distance_to(&bez.end) < 1e-12);
        let mid = bez.point_at(0.5);
        assert!((mid.x - 2.0).abs() < 1e-12);
        assert!((mid.y - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_closed_path_sampling() {
        let path = square();
        assert!(path.is_closed(1e-12));
        let closed = path.path(4);
        // 1 start + 3 cubics * 4 + 1 line end
        assert_eq!(closed.len(), 14);
        assert_eq!(closed.first(), closed.last());
        let open = path.sample(4);
        assert_eq!(open.len(), 13);
    }

    #[test]
    fn test_open_chain_is_not_closed() {
        let mut path = square();
        path.segments.pop();
        assert!(!path.is_closed(1e-9));
        assert!(!ClosedPath2d::new().is_closed(1e-9));
    }

    #[test]
    fn test_catmull_rom_interpolates_control_points() {
        let pts = vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
            Point3d::new(2.0, 0.5, 0.0),
            Point3d::new(3.0, 0.0, 0.0),
        ];
        let spline = CatmullRom3d::new(pts.clone());
        for (i, p) in pts.iter().enumerate() {
            let t = i as f64 / 3.0;
            let q = spline.point_at(t).unwrap();
            assert!(q.distance_to(p) < 1e-9, "t={t}: {q:?} vs {p:?}");
        }
        assert_eq!(spline.sample(30).len(), 31);
        let tangent = spline.tangent_at(0.0).unwrap();
        assert!(tangent.x > 0.0);
    }

    #[test]
    fn test_catmull_rom_needs_two_points() {
        let spline = CatmullRom3d::new(vec![Point3d::ORIGIN]);
        assert!(spline.point_at(0.5).is_none());
        assert!(spline.sample(5).is_empty());
    }
}
