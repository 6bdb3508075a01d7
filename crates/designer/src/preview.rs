//! Visual aids: the support grid over the arch and a stand-in foot.

use insole_kernel::geometry::point::Point2d;
use insole_kernel::geometry::transform::Transform;
use insole_kernel::mm_to_m;
use insole_tessellation::TriangleMesh;
use insole_tessellation::primitives::grid_plane;
use insole_tessellation::revolve::lathe_x;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::GeometryConfig;
use crate::deform::{self, ArchSupport, FootCurvature};
use crate::error::DesignError;
use crate::frame::insole_to_scene;
use crate::params::AnthropometricParams;

/// Foot radius at eleven even stations from heel to toe, as fractions of
/// the foot width.
pub const FOOT_PROFILE: [f64; 11] = [0.0, 0.4, 0.35, 0.4, 0.5, 0.6, 0.7, 0.8, 0.6, 0.4, 0.0];

/// A mesh in the insole frame and its placement into the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedMesh {
    pub mesh: TriangleMesh,
    pub placement: Transform,
}

impl PlacedMesh {
    fn lifted(mesh: TriangleMesh, height: f64) -> Self {
        Self {
            mesh,
            placement: Transform::translation(0.0, 0.0, height).then(&insole_to_scene()),
        }
    }

    pub fn to_scene(&self) -> TriangleMesh {
        self.mesh.transformed(&self.placement)
    }
}

/// A grid spanning the foot, raised in the midfoot by the full supported
/// arch height and resting at `stack_height`.
#[instrument(skip(params, config))]
pub fn support_grid(
    params: &AnthropometricParams,
    config: &GeometryConfig,
    stack_height: f64,
) -> Result<PlacedMesh, DesignError> {
    let (length, width, _) = params.outline_m();
    let mut mesh = grid_plane(length, width, config.grid_segments, config.grid_segments)?;
    let lift = ArchSupport {
        length,
        width,
        amplitude: mm_to_m(params.arch_height) * params.strength(),
    };
    deform::apply(&lift, &mut mesh);
    debug!(vertices = mesh.vertex_count(), "built support grid");
    Ok(PlacedMesh::lifted(mesh, stack_height))
}

/// Lathe profile `(x, radius)` of the stand-in foot, heel first.
pub fn foot_profile(params: &AnthropometricParams) -> Vec<Point2d> {
    let (length, width, _) = params.outline_m();
    let last = (FOOT_PROFILE.len() - 1) as f64;
    FOOT_PROFILE
        .iter()
        .enumerate()
        .map(|(i, r)| Point2d::new(-length / 2.0 + length * i as f64 / last, width * r))
        .collect()
}

/// A revolved, curved foot whose lowest point rests on `stack_height`.
#[instrument(skip(params, config))]
pub fn foot_preview(
    params: &AnthropometricParams,
    config: &GeometryConfig,
    stack_height: f64,
) -> Result<PlacedMesh, DesignError> {
    let mut mesh = lathe_x(&foot_profile(params), config.foot_segments)?;
    FootCurvature::new(params).deform(&mut mesh);
    let lowest = mesh.bounding_box().min.z;
    debug!(vertices = mesh.vertex_count(), lowest, "built foot preview");
    Ok(PlacedMesh::lifted(mesh, stack_height - lowest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_grid_peak_and_rim() {
        let params = AnthropometricParams::default();
        let grid = support_grid(&params, &GeometryConfig::default(), 0.009).unwrap();
        let local = grid.mesh.bounding_box();
        assert_abs_diff_eq!(local.min.z, 0.0, epsilon = 1e-6);
        // 15 segments never hit x = 0 exactly, so the peak is a bit under 25 mm
        assert!(local.max.z > 0.02 && local.max.z <= 0.025 + 1e-6);
        assert_abs_diff_eq!(grid.to_scene().bounding_box().min.y, 0.009, epsilon = 1e-6);
    }

    #[test]
    fn test_foot_rests_on_stack() {
        let params = AnthropometricParams::default();
        let foot = foot_preview(&params, &GeometryConfig::preview(), 0.009).unwrap();
        let scene = foot.to_scene().bounding_box();
        assert_abs_diff_eq!(scene.min.y, 0.009, epsilon = 1e-6);
        assert_abs_diff_eq!(scene.size().z, 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_profile_runs_heel_to_toe() {
        let p = foot_profile(&AnthropometricParams::default());
        assert_eq!(p.len(), 11);
        assert_abs_diff_eq!(p[0].x, -0.125, epsilon = 1e-12);
        assert_abs_diff_eq!(p[10].x, 0.125, epsilon = 1e-12);
        assert_abs_diff_eq!(p[7].y, 0.08, epsilon = 1e-12);
    }
}
