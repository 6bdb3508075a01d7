use std::f64::consts::FRAC_PI_2;

use insole_kernel::geometry::curves::ClosedPath2d;
use insole_kernel::geometry::point::Point2d;
use insole_kernel::geometry::vector::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{ExtrudeError, check_dimension};
use crate::mesh::TriangleMesh;
use crate::triangulate::{ensure_counter_clockwise, triangulate_polygon};

/// Controls for turning a planar outline into a slab.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtrudeSettings {
    /// Slab height along +Z.
    pub thickness: f64,
    /// Vertical extent of each rounded edge. Clamped to half the thickness.
    pub bevel_thickness: f64,
    /// How far the caps are inset from the outline.
    pub bevel_size: f64,
    /// Steps in each quarter-circle bevel profile; 0 disables the bevel.
    pub bevel_segments: usize,
    /// Divisions per curved path segment.
    pub curve_segments: usize,
}

impl ExtrudeSettings {
    pub fn flat(thickness: f64, curve_segments: usize) -> Self {
        Self {
            thickness,
            bevel_thickness: 0.0,
            bevel_size: 0.0,
            bevel_segments: 0,
            curve_segments,
        }
    }
}

/// Sample `path` and extrude the resulting polygon.
pub fn extrude_path(path: &ClosedPath2d, settings: &ExtrudeSettings) -> Result<TriangleMesh, ExtrudeError> {
    if settings.curve_segments == 0 {
        return Err(ExtrudeError::InsufficientSegments { actual: 0 });
    }
    extrude_polygon(&path.sample(settings.curve_segments), settings)
}

/// Extrude a closed polygon in the XY plane so the solid spans `z in [0, thickness]`.
///
/// Side walls sit on the outline. With a bevel, the walls bend inward in a
/// quarter-circle at top and bottom and the caps are inset by `bevel_size`.
#[instrument(skip(outline), fields(points = outline.len()))]
pub fn extrude_polygon(outline: &[Point2d], settings: &ExtrudeSettings) -> Result<TriangleMesh, ExtrudeError> {
    if outline.len() < 3 {
        return Err(ExtrudeError::InsufficientProfile {
            min: 3,
            actual: outline.len(),
        });
    }
    if settings.curve_segments == 0 {
        return Err(ExtrudeError::InsufficientSegments { actual: 0 });
    }
    let invalid = |name, value| ExtrudeError::InvalidDimension { name, value };
    let thickness = check_dimension("thickness", settings.thickness, invalid)?;
    let bevel_thickness = check_dimension("bevel thickness", settings.bevel_thickness, invalid)?;
    let bevel_size = check_dimension("bevel size", settings.bevel_size, invalid)?;
    if let Some(p) = outline.iter().find(|p| !p.is_finite()) {
        return Err(ExtrudeError::InvalidDimension {
            name: "outline coordinate",
            value: if p.x.is_finite() { p.y } else { p.x },
        });
    }

    let mut polygon = without_repeats(outline);
    if polygon.len() < 3 {
        return Err(ExtrudeError::InsufficientProfile {
            min: 3,
            actual: polygon.len(),
        });
    }
    ensure_counter_clockwise(&mut polygon);

    let rings = bevel_rings(
        thickness,
        bevel_thickness.min(thickness / 2.0),
        bevel_size,
        settings.bevel_segments,
    );
    let inward = miter_directions(&polygon);
    let inset = |amount: f64| -> Vec<Point2d> {
        polygon
            .iter()
            .zip(&inward)
            .map(|(p, d)| Point2d::new(p.x + d.x * amount, p.y + d.y * amount))
            .collect()
    };

    let mut mesh = TriangleMesh::new();
    let n = polygon.len() as u32;

    // Side walls: one vertex ring per bevel step, bottom to top.
    if thickness > 0.0 {
        let mut ring_starts = Vec::with_capacity(rings.len());
        for &(amount, z) in &rings {
            ring_starts.push(mesh.vertex_count() as u32);
            for p in inset(amount) {
                mesh.add_vertex(p.at_height(z), Vec3::ZERO);
            }
        }
        for pair in ring_starts.windows(2) {
            let (lower, upper) = (pair[0], pair[1]);
            for i in 0..n {
                let j = (i + 1) % n;
                mesh.add_triangle(lower + i, lower + j, upper + j);
                mesh.add_triangle(lower + i, upper + j, upper + i);
            }
        }
        mesh.compute_vertex_normals();
    }

    // Caps share one triangulation of the inset outline.
    let cap = inset(rings[0].0);
    let triangles = triangulate_polygon(&cap);

    let bottom = mesh.vertex_count() as u32;
    for p in &cap {
        mesh.add_vertex(p.at_height(0.0), -Vec3::Z);
    }
    for t in &triangles {
        mesh.add_triangle(bottom + t[0] as u32, bottom + t[2] as u32, bottom + t[1] as u32);
    }

    let top = mesh.vertex_count() as u32;
    for p in &cap {
        mesh.add_vertex(p.at_height(thickness), Vec3::Z);
    }
    for t in &triangles {
        mesh.add_triangle(top + t[0] as u32, top + t[1] as u32, top + t[2] as u32);
    }

    debug!(
        rings = rings.len(),
        triangles = mesh.triangle_count(),
        "extruded outline"
    );
    Ok(mesh)
}

/// `(inset, z)` pairs from the bottom cap edge to the top cap edge.
fn bevel_rings(thickness: f64, bevel_thickness: f64, bevel_size: f64, segments: usize) -> Vec<(f64, f64)> {
    if segments == 0 || (bevel_thickness <= 0.0 && bevel_size <= 0.0) {
        return vec![(0.0, 0.0), (0.0, thickness)];
    }

    let profile: Vec<(f64, f64)> = (0..=segments)
        .map(|k| {
            let theta = k as f64 / segments as f64 * FRAC_PI_2;
            (
                bevel_size * (1.0 - theta.sin()),
                bevel_thickness * (1.0 - theta.cos()),
            )
        })
        .collect();

    let mut rings: Vec<(f64, f64)> = profile.clone();
    for &(amount, dz) in profile.iter().rev() {
        let ring = (amount, thickness - dz);
        // bevels meet in the middle when the bevel takes half the slab
        let duplicate = rings
            .last()
            .is_some_and(|last| (last.1 - ring.1).abs() < 1e-12 && (last.0 - ring.0).abs() < 1e-12);
        if !duplicate {
            rings.push(ring);
        }
    }
    rings
}

/// Unit-ish inward offset per vertex of a counter-clockwise polygon, scaled
/// so that offset edges stay parallel to the input edges (miter join).
/// Drop points that coincide with their predecessor, wrapping around.
fn without_repeats(outline: &[Point2d]) -> Vec<Point2d> {
    let mut points: Vec<Point2d> = Vec::with_capacity(outline.len());
    for p in outline {
        if points.last().is_none_or(|q| q.distance_to(p) > 1e-12) {
            points.push(*p);
        }
    }
    while points.len() > 1 && points[0].distance_to(&points[points.len() - 1]) <= 1e-12 {
        points.pop();
    }
    points
}

fn miter_directions(polygon: &[Point2d]) -> Vec<Point2d> {
    let n = polygon.len();
    let edge_normal = |a: Point2d, b: Point2d| -> Option<Point2d> {
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let len = (dx * dx + dy * dy).sqrt();
        (len > 1e-15).then(|| Point2d::new(-dy / len, dx / len))
    };

    (0..n)
        .map(|i| {
            let prev = polygon[(i + n - 1) % n];
            let curr = polygon[i];
            let next = polygon[(i + 1) % n];
            let n1 = edge_normal(prev, curr);
            let n2 = edge_normal(curr, next);
            match (n1, n2) {
                (Some(a), Some(b)) => {
                    let sum = Point2d::new(a.x + b.x, a.y + b.y);
                    let len = (sum.x * sum.x + sum.y * sum.y).sqrt();
                    if len < 1e-9 {
                        return a;
                    }
                    let m = Point2d::new(sum.x / len, sum.y / len);
                    // limit spikes at sharp corners
                    let scale = 1.0 / (m.x * a.x + m.y * a.y).max(0.25);
                    Point2d::new(m.x * scale, m.y * scale)
                }
                (Some(a), None) | (None, Some(a)) => a,
                (None, None) => Point2d::ORIGIN,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rectangle(w: f64, h: f64) -> Vec<Point2d> {
        vec![
            Point2d::new(-w / 2.0, -h / 2.0),
            Point2d::new(w / 2.0, -h / 2.0),
            Point2d::new(w / 2.0, h / 2.0),
            Point2d::new(-w / 2.0, h / 2.0),
        ]
    }

    #[test]
    fn test_flat_box_volume() {
        let mesh = extrude_polygon(&rectangle(2.0, 1.0), &ExtrudeSettings::flat(0.5, 12)).unwrap();
        assert!((mesh.signed_volume() - 1.0).abs() < 1e-5);
        let bb = mesh.bounding_box();
        assert!(bb.min.z.abs() < 1e-9);
        assert!((bb.max.z - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_clockwise_input_is_reoriented() {
        let mut pts = rectangle(2.0, 1.0);
        pts.reverse();
        let mesh = extrude_polygon(&pts, &ExtrudeSettings::flat(0.5, 12)).unwrap();
        assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn test_bevel_stays_inside_slab() {
        let settings = ExtrudeSettings {
            thickness: 0.004,
            bevel_thickness: 0.01,
            bevel_size: 0.0005,
            bevel_segments: 3,
            curve_segments: 20,
        };
        let mesh = extrude_polygon(&rectangle(0.2, 0.08), &settings).unwrap();
        let bb = mesh.bounding_box();
        assert!(bb.min.z >= -1e-9);
        assert!(bb.max.z <= 0.004 + 1e-7);
        assert!((bb.max.x - 0.1).abs() < 1e-6);
        assert!(mesh.signed_volume() > 0.0);
        assert!(mesh.signed_volume() < 0.2 * 0.08 * 0.004);
    }

    #[test]
    fn test_bevel_rings_merge_at_half_thickness() {
        let rings = bevel_rings(1.0, 0.5, 0.1, 2);
        assert_eq!(rings.len(), 5);
        assert!((rings[2].1 - 0.5).abs() < 1e-12);
        assert!((rings[0].0 - 0.1).abs() < 1e-12);
        assert!((rings[4].1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_thickness_is_double_sided() {
        let mesh = extrude_polygon(&rectangle(1.0, 1.0), &ExtrudeSettings::flat(0.0, 8)).unwrap();
        assert_eq!(mesh.triangle_count(), 4);
        assert!(mesh.bounding_box().size().z.abs() < 1e-12);
    }

    #[test]
    fn test_repeated_points_are_dropped() {
        let r = rectangle(2.0, 1.0);
        let pts = vec![r[0], r[0], r[1], r[2], r[2], r[2], r[3], r[0]];
        let mesh = extrude_polygon(&pts, &ExtrudeSettings::flat(0.5, 12)).unwrap();
        let clean = extrude_polygon(&r, &ExtrudeSettings::flat(0.5, 12)).unwrap();
        assert_eq!(mesh.triangle_count(), clean.triangle_count());
        assert!((mesh.signed_volume() - 1.0).abs() < 1e-5);

        let collapsed = vec![r[0], r[0], r[1], r[1]];
        assert_eq!(
            extrude_polygon(&collapsed, &ExtrudeSettings::flat(0.5, 12)),
            Err(ExtrudeError::InsufficientProfile { min: 3, actual: 2 })
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        let pts = rectangle(1.0, 1.0);
        assert_eq!(
            extrude_polygon(&pts[..2], &ExtrudeSettings::flat(1.0, 8)),
            Err(ExtrudeError::InsufficientProfile { min: 3, actual: 2 })
        );
        assert!(matches!(
            extrude_polygon(&pts, &ExtrudeSettings::flat(-1.0, 8)),
            Err(ExtrudeError::InvalidDimension { name: "thickness", .. })
        ));
        assert!(matches!(
            extrude_polygon(&pts, &ExtrudeSettings::flat(1.0, 0)),
            Err(ExtrudeError::InsufficientSegments { .. })
        ));
    }
}
