//! Closed-form height fields applied to layer vertices.
//!
//! Every field is evaluated in the insole frame, in meters, and only moves
//! vertices along z.

use std::f64::consts::{FRAC_PI_2, PI};

use insole_kernel::mm_to_m;
use insole_tessellation::TriangleMesh;
use tracing::{debug, instrument};

use crate::params::AnthropometricParams;

/// A z-displacement as a function of a vertex's local `(x, y)`.
pub trait DeformationField {
    fn displacement(&self, x: f64, y: f64) -> f64;
}

/// Rewrite every vertex's z with `field` and recompute normals.
#[instrument(skip(field, mesh), fields(vertices = mesh.vertex_count()))]
pub fn apply(field: &dyn DeformationField, mesh: &mut TriangleMesh) {
    mesh.displace_z(|x, y| field.displacement(x, y));
    mesh.compute_vertex_normals();
    debug!("applied deformation");
}

/// `sin` bump over the whole length: 0 at both ends, 1 at the middle.
fn length_bump(x: f64, length: f64) -> f64 {
    ((x + length / 2.0) / length * PI).sin()
}

/// Bump over the central third: 0 at `-L/3` and `+L/3`, 1 at the middle.
/// Zero outside.
fn arch_factor(x: f64, length: f64) -> f64 {
    let third = length / 3.0;
    if x > -third && x < third {
        ((x + third) / (2.0 * third) * PI).sin()
    } else {
        0.0
    }
}

/// Lateral falloff: 1 on the long axis, 0 at `|y| >= W/2`.
fn width_factor(y: f64, width: f64) -> f64 {
    if width <= 0.0 {
        return 0.0;
    }
    ((y / (width / 2.0)).clamp(-1.0, 1.0) * FRAC_PI_2).cos()
}

/// Gentle longitudinal curvature of the base layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseCurvature {
    pub length: f64,
    /// Curvature amplitude, a tenth of the arch height.
    pub k: f64,
}

impl BaseCurvature {
    pub fn new(params: &AnthropometricParams) -> Self {
        Self {
            length: mm_to_m(params.foot_length),
            k: mm_to_m(params.arch_height) * 0.1,
        }
    }
}

impl DeformationField for BaseCurvature {
    fn displacement(&self, x: f64, _y: f64) -> f64 {
        if self.length <= 0.0 {
            return 0.0;
        }
        let third = self.length / 3.0;
        let mut dz = length_bump(x, self.length) * self.k;
        if x.abs() < third {
            dz += (x / third * FRAC_PI_2).cos() * 2.0 * self.k;
        }
        dz
    }
}

/// Raised arch under the midfoot, scaled by the support level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchSupport {
    pub length: f64,
    pub width: f64,
    /// Peak lift on the long axis.
    pub amplitude: f64,
}

impl ArchSupport {
    pub fn new(params: &AnthropometricParams) -> Self {
        Self {
            length: mm_to_m(params.foot_length),
            width: mm_to_m(params.foot_width),
            amplitude: mm_to_m(params.arch_height) * params.strength() * 0.5,
        }
    }
}

impl DeformationField for ArchSupport {
    fn displacement(&self, x: f64, y: f64) -> f64 {
        if self.length <= 0.0 {
            return 0.0;
        }
        arch_factor(x, self.length) * width_factor(y, self.width) * self.amplitude
    }
}

/// Thicker heel and forefoot zones, thinner midfoot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CushionContour {
    pub length: f64,
}

impl CushionContour {
    pub const RAISE: f64 = 0.0005;
    pub const DIP: f64 = 0.0003;

    pub fn new(params: &AnthropometricParams) -> Self {
        Self {
            length: mm_to_m(params.foot_length),
        }
    }
}

impl DeformationField for CushionContour {
    fn displacement(&self, x: f64, _y: f64) -> f64 {
        let third = self.length / 3.0;
        if x.abs() > third {
            Self::RAISE
        } else if x.abs() < third {
            -Self::DIP
        } else {
            0.0
        }
    }
}

/// Curvature and width swelling of the stand-in foot.
///
/// Unlike the other fields this also widens the mesh, so it is applied
/// through [`FootCurvature::deform`] instead of [`apply`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootCurvature {
    pub length: f64,
    pub k: f64,
}

impl FootCurvature {
    pub fn new(params: &AnthropometricParams) -> Self {
        Self {
            length: mm_to_m(params.foot_length),
            k: mm_to_m(params.arch_height) * 0.1,
        }
    }

    pub fn swelling(&self, x: f64) -> f64 {
        if self.length <= 0.0 {
            return 1.0;
        }
        1.0 + 0.1 * length_bump(x, self.length)
    }

    pub fn deform(&self, mesh: &mut TriangleMesh) {
        for i in 0..mesh.vertex_count() {
            let mut p = mesh.position(i);
            p.z += self.displacement(p.x, p.y);
            p.y *= self.swelling(p.x);
            mesh.set_position(i, p);
        }
        mesh.compute_vertex_normals();
    }
}

impl DeformationField for FootCurvature {
    fn displacement(&self, x: f64, _y: f64) -> f64 {
        if self.length <= 0.0 {
            return 0.0;
        }
        (x / self.length * PI).cos() * 2.0 * self.k + length_bump(x, self.length) * 0.5 * self.k
    }
}
