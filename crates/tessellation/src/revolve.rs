use std::f64::consts::TAU;

use insole_kernel::geometry::point::{Point2d, Point3d};
use insole_kernel::geometry::vector::Vec3;
use tracing::{debug, instrument};

use crate::error::SweepError;
use crate::mesh::TriangleMesh;

/// Revolve a profile a full turn around the X axis.
///
/// Each profile point is `(x, radius)`; the surface point at angle `phi` is
/// `(x, radius cos phi, radius sin phi)`. The profile should run in +X
/// so the winding faces outward. Profile ends with zero radius close the
/// surface onto the axis.
#[instrument(skip(profile), fields(points = profile.len()))]
pub fn lathe_x(profile: &[Point2d], segments: usize) -> Result<TriangleMesh, SweepError> {
    if profile.len() < 2 {
        return Err(SweepError::InsufficientPath {
            min: 2,
            actual: profile.len(),
        });
    }
    if segments < 3 {
        return Err(SweepError::InsufficientSegments {
            min: 3,
            actual: segments,
        });
    }
    if let Some(p) = profile.iter().find(|p| !p.is_finite() || p.y < 0.0) {
        return Err(SweepError::InvalidDimension {
            name: "profile radius",
            value: p.y,
        });
    }

    let segs = segments as u32;
    let mut mesh = TriangleMesh::new();
    for p in profile {
        for j in 0..segs {
            let phi = j as f64 / segs as f64 * TAU;
            let (s, c) = phi.sin_cos();
            mesh.add_vertex(Point3d::new(p.x, p.y * c, p.y * s), Vec3::new(0.0, c, s));
        }
    }

    for i in 0..(profile.len() as u32 - 1) {
        for j in 0..segs {
            let k = (j + 1) % segs;
            let a = i * segs + j;
            let b = (i + 1) * segs + j;
            let c = (i + 1) * segs + k;
            let d = i * segs + k;
            mesh.add_triangle(a, d, b);
            mesh.add_triangle(b, d, c);
        }
    }

    mesh.compute_vertex_normals();
    debug!(triangles = mesh.triangle_count(), "revolved profile");
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_spindle_has_positive_volume() {
        let profile = [
            Point2d::new(-1.0, 0.0),
            Point2d::new(-0.5, 0.4),
            Point2d::new(0.5, 0.4),
            Point2d::new(1.0, 0.0),
        ];
        let mesh = lathe_x(&profile, 24).unwrap();
        assert_eq!(mesh.triangle_count(), 3 * 24 * 2);
        assert!(mesh.signed_volume() > 0.0);
        let bb = mesh.bounding_box();
        assert!((bb.size().x - 2.0).abs() < 1e-6);
        assert!((bb.max.y - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_negative_radius() {
        let profile = [Point2d::new(0.0, 1.0), Point2d::new(1.0, -1.0)];
        assert!(matches!(lathe_x(&profile, 8), Err(SweepError::InvalidDimension { .. })));
        assert!(matches!(
            lathe_x(&profile[..1], 8),
            Err(SweepError::InsufficientPath { .. })
        ));
    }
}
