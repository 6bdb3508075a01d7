//! Frame conventions and conversions from `nalgebra` placements.
//!
//! The insole frame has x along the foot (heel at `-L/2`), y across it and
//! z up. The scene frame is Y-up with X across the foot and Z along it.

use std::fmt;

use insole_kernel::geometry::transform::Transform;
use insole_kernel::geometry::vector::Vec3;
use nalgebra::{Isometry3, Matrix4};
use serde::{Deserialize, Serialize};

/// A coordinate axis, ordered X, Y, Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn component(self, v: &Vec3) -> f64 {
        v.component(self.index())
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

/// Fixed rotation taking insole coordinates `(x, y, z)` to scene `(Z, X, Y)`.
pub fn insole_to_scene() -> Transform {
    Transform::from_columns(Vec3::Z, Vec3::X, Vec3::Y, Vec3::ZERO)
}

/// Copy a homogeneous `nalgebra` matrix into a kernel transform.
pub fn transform_from_matrix(matrix: &Matrix4<f64>) -> Transform {
    let mut m = [0.0; 16];
    // both are column-major
    m.copy_from_slice(matrix.as_slice());
    Transform { m }
}

pub fn transform_from_isometry(iso: &Isometry3<f64>) -> Transform {
    transform_from_matrix(&iso.to_homogeneous())
}
