use std::f64::consts::TAU;

use insole_kernel::geometry::curves::CatmullRom3d;
use insole_kernel::geometry::point::Point3d;
use insole_kernel::geometry::vector::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::SweepError;
use crate::mesh::TriangleMesh;

/// Configuration for tube generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TubeConfig {
    /// Radius of the tube.
    pub radius: f64,
    /// Number of segments around the circumference.
    pub radial_segments: usize,
    /// Whether to cap the ends of the tube.
    pub capped: bool,
}

impl Default for TubeConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            radial_segments: 8,
            capped: true,
        }
    }
}

impl TubeConfig {
    #[must_use]
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    #[must_use]
    pub fn with_radial_segments(mut self, segments: usize) -> Self {
        self.radial_segments = segments;
        self
    }

    #[must_use]
    pub fn uncapped(mut self) -> Self {
        self.capped = false;
        self
    }
}

/// Orthonormal frame carried along a sweep path.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub tangent: Vec3,
    pub normal: Vec3,
    pub binormal: Vec3,
}

/// Sweep a circular section along a spline sampled in `tubular_segments` steps.
pub fn tube_along_spline(
    spline: &CatmullRom3d,
    tubular_segments: usize,
    config: &TubeConfig,
) -> Result<TriangleMesh, SweepError> {
    if tubular_segments == 0 {
        return Err(SweepError::InsufficientSegments { min: 1, actual: 0 });
    }
    tube_from_polyline(&spline.sample(tubular_segments), config)
}

/// Sweep a circular section along a polyline.
#[instrument(skip(path), fields(points = path.len()))]
pub fn tube_from_polyline(path: &[Point3d], config: &TubeConfig) -> Result<TriangleMesh, SweepError> {
    if path.len() < 2 {
        return Err(SweepError::InsufficientPath {
            min: 2,
            actual: path.len(),
        });
    }
    if !(config.radius.is_finite() && config.radius > 0.0) {
        return Err(SweepError::InvalidDimension {
            name: "radius",
            value: config.radius,
        });
    }
    if config.radial_segments < 3 {
        return Err(SweepError::InsufficientSegments {
            min: 3,
            actual: config.radial_segments,
        });
    }

    let frames = rotation_minimizing_frames(path).ok_or(SweepError::InsufficientPath {
        min: 2,
        actual: path.len(),
    })?;
    let segs = config.radial_segments as u32;
    let mut mesh = TriangleMesh::new();

    let ring_offset = |frame: &Frame, j: u32| -> Vec3 {
        let angle = j as f64 / segs as f64 * TAU;
        frame.normal * angle.cos() + frame.binormal * angle.sin()
    };

    for (p, frame) in path.iter().zip(&frames) {
        for j in 0..segs {
            let dir = ring_offset(frame, j);
            mesh.add_vertex(*p + dir * config.radius, dir);
        }
    }

    for i in 0..(path.len() as u32 - 1) {
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

    if config.capped {
        let ends = [(0usize, -1.0f64), (path.len() - 1, 1.0)];
        for (index, sign) in ends {
            let frame = &frames[index];
            let normal = frame.tangent * sign;
            let center = mesh.add_vertex(path[index], normal);
            let first = mesh.vertex_count() as u32;
            for j in 0..segs {
                mesh.add_vertex(path[index] + ring_offset(frame, j) * config.radius, normal);
            }
            for j in 0..segs {
                let k = (j + 1) % segs;
                if sign < 0.0 {
                    mesh.add_triangle(center, first + k, first + j);
                } else {
                    mesh.add_triangle(center, first + j, first + k);
                }
            }
        }
    }

    debug!(triangles = mesh.triangle_count(), "swept tube");
    Ok(mesh)
}

/// Frames along `path` propagated by the double reflection method, so the
/// section does not twist. `None` if the path has no non-degenerate segment.
pub fn rotation_minimizing_frames(path: &[Point3d]) -> Option<Vec<Frame>> {
    let n = path.len();
    let tangent_at = |i: usize| -> Option<Vec3> {
        let seg_in = if i > 0 { (path[i] - path[i - 1]).normalized() } else { None };
        let seg_out = if i + 1 < n { (path[i + 1] - path[i]).normalized() } else { None };
        match (seg_in, seg_out) {
            (Some(a), Some(b)) => (a + b).normalized().or(Some(a)),
            (a, b) => a.or(b),
        }
    };

    let t0 = (0..n).find_map(tangent_at)?;
    let initial_normal = if t0.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    let n0 = (initial_normal - t0 * initial_normal.dot(&t0)).normalized()?;

    let mut frames = Vec::with_capacity(n);
    frames.push(Frame {
        tangent: t0,
        normal: n0,
        binormal: t0.cross(&n0),
    });

    for i in 1..n {
        let prev = frames[i - 1];
        let ti = tangent_at(i).unwrap_or(prev.tangent);

        let v1 = path[i] - path[i - 1];
        let c1 = v1.dot(&v1);
        if c1 < 1e-30 {
            frames.push(Frame { tangent: ti, ..prev });
            continue;
        }

        let r_l = prev.normal - v1 * (2.0 * v1.dot(&prev.normal) / c1);
        let t_l = prev.tangent - v1 * (2.0 * v1.dot(&prev.tangent) / c1);

        let v2 = ti - t_l;
        let c2 = v2.dot(&v2);
        let ni = if c2 < 1e-30 {
            r_l
        } else {
            r_l - v2 * (2.0 * v2.dot(&r_l) / c2)
        };

        frames.push(Frame {
            tangent: ti,
            normal: ni,
            binormal: ti.cross(&ni),
        });
    }

    Some(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight(len: f64, steps: usize) -> Vec<Point3d> {
        (0..=steps)
            .map(|i| Point3d::new(0.0, 0.0, len * i as f64 / steps as f64))
            .collect()
    }

    #[test]
    fn test_straight_tube_is_a_cylinder() {
        let config = TubeConfig::default().with_radius(0.5).with_radial_segments(32);
        let mesh = tube_from_polyline(&straight(2.0, 4), &config).unwrap();
        let expected = std::f64::consts::PI * 0.25 * 2.0;
        let vol = mesh.signed_volume();
        assert!(vol > 0.0);
        assert!((vol - expected).abs() / expected < 0.02, "volume {vol}");
        let bb = mesh.bounding_box();
        assert!((bb.max.x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_frames_stay_orthonormal_on_a_bend() {
        let path: Vec<Point3d> = (0..=20)
            .map(|i| {
                let a = i as f64 / 20.0 * std::f64::consts::FRAC_PI_2;
                Point3d::new(a.cos(), a.sin(), 0.1 * a)
            })
            .collect();
        let frames = rotation_minimizing_frames(&path).unwrap();
        for f in &frames {
            assert!((f.normal.length() - 1.0).abs() < 1e-9);
            assert!(f.normal.dot(&f.tangent).abs() < 1e-9);
            assert!(f.binormal.dot(&f.normal).abs() < 1e-9);
        }
    }

    #[test]
    fn test_uncapped_has_no_cap_vertices() {
        let config = TubeConfig::default().with_radius(0.1).uncapped();
        let mesh = tube_from_polyline(&straight(1.0, 3), &config).unwrap();
        assert_eq!(mesh.vertex_count(), 4 * 8);
        assert_eq!(mesh.triangle_count(), 3 * 8 * 2);
    }

    #[test]
    fn test_rejects_degenerate_input() {
        let config = TubeConfig::default();
        assert!(matches!(
            tube_from_polyline(&[Point3d::ORIGIN], &config),
            Err(SweepError::InsufficientPath { .. })
        ));
        assert!(matches!(
            tube_from_polyline(&straight(1.0, 2), &config.with_radius(0.0)),
            Err(SweepError::InvalidDimension { .. })
        ));
        assert!(matches!(
            tube_from_polyline(&[Point3d::ORIGIN, Point3d::ORIGIN], &config),
            Err(SweepError::InsufficientPath { .. })
        ));
    }
}
