use std::f64::consts::TAU;

use insole_kernel::geometry::point::Point3d;
use insole_kernel::geometry::vector::Vec3;
use tracing::debug;

use crate::error::SweepError;
use crate::mesh::TriangleMesh;

fn check_positive(name: &'static str, value: f64) -> Result<f64, SweepError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SweepError::InvalidDimension { name, value })
    }
}

fn check_radius(name: &'static str, value: f64) -> Result<f64, SweepError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SweepError::InvalidDimension { name, value })
    }
}

/// Closed truncated cone along Z, centered on the origin.
///
/// The bottom circle sits at `z = -height / 2` and the top at `+height / 2`.
/// A cap with zero radius is skipped.
pub fn frustum(
    radius_top: f64,
    radius_bottom: f64,
    height: f64,
    radial_segments: usize,
) -> Result<TriangleMesh, SweepError> {
    let rt = check_radius("top radius", radius_top)?;
    let rb = check_radius("bottom radius", radius_bottom)?;
    let h = check_positive("height", height)?;
    if rt == 0.0 && rb == 0.0 {
        return Err(SweepError::InvalidDimension {
            name: "radius",
            value: 0.0,
        });
    }
    if radial_segments < 3 {
        return Err(SweepError::InsufficientSegments {
            min: 3,
            actual: radial_segments,
        });
    }

    let segs = radial_segments as u32;
    let slope = (rb - rt) / h;
    let around = |j: u32| -> (f64, f64) { (j as f64 / segs as f64 * TAU).sin_cos() };
    let mut mesh = TriangleMesh::new();

    for (radius, z) in [(rb, -h / 2.0), (rt, h / 2.0)] {
        for j in 0..segs {
            let (s, c) = around(j);
            let normal = Vec3::new(c, s, slope).normalized().unwrap_or(Vec3::Z);
            mesh.add_vertex(Point3d::new(radius * c, radius * s, z), normal);
        }
    }
    for j in 0..segs {
        let k = (j + 1) % segs;
        let (a, b, c, d) = (j, segs + j, segs + k, k);
        mesh.add_triangle(a, d, b);
        mesh.add_triangle(b, d, c);
    }

    for (radius, z, up) in [(rb, -h / 2.0, false), (rt, h / 2.0, true)] {
        if radius <= 0.0 {
            continue;
        }
        let normal = if up { Vec3::Z } else { -Vec3::Z };
        let center = mesh.add_vertex(Point3d::new(0.0, 0.0, z), normal);
        let first = mesh.vertex_count() as u32;
        for j in 0..segs {
            let (s, c) = around(j);
            mesh.add_vertex(Point3d::new(radius * c, radius * s, z), normal);
        }
        for j in 0..segs {
            let k = (j + 1) % segs;
            if up {
                mesh.add_triangle(center, first + j, first + k);
            } else {
                mesh.add_triangle(center, first + k, first + j);
            }
        }
    }

    debug!(rt, rb, h, triangles = mesh.triangle_count(), "built frustum");
    Ok(mesh)
}

pub fn cylinder(radius: f64, height: f64, radial_segments: usize) -> Result<TriangleMesh, SweepError> {
    frustum(radius, radius, height, radial_segments)
}

/// Right triangular prism running along X, centered on the origin.
///
/// The cross-section spans `width` in Y on the base `z = 0` and rises to
/// `height` over the `+Y` edge.
pub fn wedge_prism(width: f64, length: f64, height: f64) -> Result<TriangleMesh, SweepError> {
    let w = check_positive("width", width)? / 2.0;
    let l = check_positive("length", length)? / 2.0;
    let h = check_positive("height", height)?;

    let low = |x: f64| Point3d::new(x, -w, 0.0);
    let base = |x: f64| Point3d::new(x, w, 0.0);
    let high = |x: f64| Point3d::new(x, w, h);

    let mut mesh = TriangleMesh::new();
    // bottom
    mesh.add_flat_quad(low(-l), base(-l), base(l), low(l));
    // vertical side
    mesh.add_flat_quad(base(-l), high(-l), high(l), base(l));
    // slope
    mesh.add_flat_quad(low(-l), low(l), high(l), high(-l));
    // ends
    mesh.add_flat_triangle(low(-l), high(-l), base(-l));
    mesh.add_flat_triangle(low(l), base(l), high(l));
    Ok(mesh)
}

/// Flat grid in the XY plane centered on the origin, facing +Z.
pub fn grid_plane(
    size_x: f64,
    size_y: f64,
    segments_x: usize,
    segments_y: usize,
) -> Result<TriangleMesh, SweepError> {
    let sx = check_positive("grid length", size_x)?;
    let sy = check_positive("grid width", size_y)?;
    if segments_x == 0 || segments_y == 0 {
        return Err(SweepError::InsufficientSegments {
            min: 1,
            actual: segments_x.min(segments_y),
        });
    }

    let mut mesh = TriangleMesh::new();
    let columns = segments_x as u32 + 1;
    for j in 0..=segments_y {
        let y = -sy / 2.0 + sy * j as f64 / segments_y as f64;
        for i in 0..=segments_x {
            let x = -sx / 2.0 + sx * i as f64 / segments_x as f64;
            mesh.add_vertex(Point3d::new(x, y, 0.0), Vec3::Z);
        }
    }
    for j in 0..segments_y as u32 {
        for i in 0..segments_x as u32 {
            let a = j * columns + i;
            let b = a + 1;
            let c = a + columns + 1;
            let d = a + columns;
            mesh.add_triangle(a, b, c);
            mesh.add_triangle(a, c, d);
        }
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cylinder_volume_and_bounds() {
        let mesh = cylinder(1.0, 2.0, 64).unwrap();
        let expected = std::f64::consts::PI * 2.0;
        assert!((mesh.signed_volume() - expected).abs() / expected < 0.01);
        let bb = mesh.bounding_box();
        assert!((bb.min.z + 1.0).abs() < 1e-6);
        assert!((bb.max.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_frustum_cone_skips_apex_cap() {
        let mesh = frustum(0.0, 1.0, 1.0, 16).unwrap();
        // sides + bottom cap only
        assert_eq!(mesh.triangle_count(), 16 * 2 + 16);
        assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn test_wedge_volume() {
        let mesh = wedge_prism(2.0, 3.0, 1.0).unwrap();
        assert!((mesh.signed_volume() - 3.0).abs() < 1e-5);
        let bb = mesh.bounding_box();
        assert!(bb.min.z.abs() < 1e-9);
        assert!((bb.max.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_grid_counts() {
        let mesh = grid_plane(2.0, 1.0, 15, 15).unwrap();
        assert_eq!(mesh.vertex_count(), 16 * 16);
        assert_eq!(mesh.triangle_count(), 15 * 15 * 2);
        assert!((mesh.normal(0).z - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_invalid_sizes() {
        assert!(cylinder(1.0, 0.0, 8).is_err());
        assert!(frustum(0.0, 0.0, 1.0, 8).is_err());
        assert!(wedge_prism(1.0, f64::NAN, 1.0).is_err());
        assert!(grid_plane(1.0, 1.0, 0, 4).is_err());
    }
}
