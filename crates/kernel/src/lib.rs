pub mod geometry;

pub use geometry::curves::{CatmullRom3d, ClosedPath2d, CubicBezier2d, PathSegment};
pub use geometry::point::{Point2d, Point3d};
pub use geometry::transform::{BoundingBox, Transform};
pub use geometry::vector::Vec3;

/// Tolerance configuration for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Points closer than this are considered coincident (meters).
    pub coincidence: f64,
    /// Areas below this are considered degenerate (square meters).
    pub area: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            coincidence: 1e-9,
            area: 1e-14,
        }
    }
}

impl Tolerance {
    pub fn points_coincident(&self, a: &Point2d, b: &Point2d) -> bool {
        a.distance_to(b) < self.coincidence
    }

    pub fn is_zero_length(&self, length: f64) -> bool {
        length.abs() < self.coincidence
    }
}

pub fn default_tolerance() -> Tolerance {
    Tolerance::default()
}

/// Convert a length in millimeters to meters, the unit all geometry is built in.
pub fn mm_to_m(mm: f64) -> f64 {
    mm / 1000.0
}

/// Convert a length in meters back to millimeters.
pub fn m_to_mm(m: f64) -> f64 {
    m * 1000.0
}
