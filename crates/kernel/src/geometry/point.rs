use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

use super::vector::Vec3;

/// A point in 3D Euclidean space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3d {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        (*self - *other).length()
    }

    pub fn midpoint(&self, other: &Self) -> Self {
        self.lerp(other, 0.5)
    }

    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            x: self.x + t * (other.x - self.x),
            y: self.y + t * (other.y - self.y),
            z: self.z + t * (other.z - self.z),
        }
    }

    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn from_f32(p: [f32; 3]) -> Self {
        Self::new(p[0] as f64, p[1] as f64, p[2] as f64)
    }
}

impl Add<Vec3> for Point3d {
    type Output = Point3d;
    fn add(self, rhs: Vec3) -> Self::Output {
        Point3d::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3d {
    type Output = Vec3;
    fn sub(self, rhs: Self) -> Self::Output {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// A point in the 2D insole plane: `x` runs heel to toe, `y` across the foot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2d {
    pub x: f64,
    pub y: f64,
}

impl Point2d {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self::new(self.x + t * (other.x - self.x), self.y + t * (other.y - self.y))
    }

    /// Scale independently along each axis about `center`.
    pub fn scaled_about(&self, center: &Self, sx: f64, sy: f64) -> Self {
        Self::new(
            center.x + (self.x - center.x) * sx,
            center.y + (self.y - center.y) * sy,
        )
    }

    /// Lift onto the plane `z = height` of the insole frame.
    pub fn at_height(&self, height: f64) -> Point3d {
        Point3d::new(self.x, self.y, height)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point2d {
    type Output = Point2d;
    fn add(self, rhs: Self) -> Self::Output {
        Point2d::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2d {
    type Output = Point2d;
    fn sub(self, rhs: Self) -> Self::Output {
        Point2d::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_sub_gives_vector() {
        let v = Point3d::new(3.0, 4.0, 5.0) - Point3d::new(1.0, 1.0, 1.0);
        assert_eq!(v, Vec3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn test_midpoint() {
        let m = Point3d::ORIGIN.midpoint(&Point3d::new(2.0, 4.0, 6.0));
        assert!((m.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_scaled_about_keeps_center_fixed() {
        let c = Point2d::new(1.0, 1.0);
        assert_eq!(c.scaled_about(&c, 0.3, 0.7), c);
        let p = Point2d::new(3.0, -1.0).scaled_about(&c, 0.5, 0.5);
        assert!((p.x - 2.0).abs() < 1e-12);
        assert!((p.y - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_at_height() {
        let p = Point2d::new(0.1, -0.02).at_height(0.005);
        assert_eq!(p, Point3d::new(0.1, -0.02, 0.005));
    }
}
