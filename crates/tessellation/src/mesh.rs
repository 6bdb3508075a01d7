use insole_kernel::geometry::point::Point3d;
use insole_kernel::geometry::transform::{BoundingBox, Transform};
use insole_kernel::geometry::vector::Vec3;
use serde::{Deserialize, Serialize};

/// An indexed triangle mesh in the layout renderers consume directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    /// Vertex positions [x, y, z, x, y, z, ...]
    pub positions: Vec<f32>,
    /// Vertex normals [nx, ny, nz, ...]
    pub normals: Vec<f32>,
    /// Triangle indices [i0, i1, i2, ...]
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn add_vertex(&mut self, pos: Point3d, normal: Vec3) -> u32 {
        let idx = self.vertex_count() as u32;
        self.positions.extend_from_slice(&[pos.x as f32, pos.y as f32, pos.z as f32]);
        self.normals.extend_from_slice(&normal.to_f32_array());
        idx
    }

    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    /// Add a triangle with its own three vertices, all carrying the face normal.
    pub fn add_flat_triangle(&mut self, a: Point3d, b: Point3d, c: Point3d) {
        let normal = (b - a).cross(&(c - a)).normalized().unwrap_or(Vec3::Z);
        let i0 = self.add_vertex(a, normal);
        let i1 = self.add_vertex(b, normal);
        let i2 = self.add_vertex(c, normal);
        self.add_triangle(i0, i1, i2);
    }

    /// Planar quad `a b c d` (counter-clockwise seen from outside) as two flat triangles.
    pub fn add_flat_quad(&mut self, a: Point3d, b: Point3d, c: Point3d, d: Point3d) {
        let normal = (c - a).cross(&(d - b)).normalized().unwrap_or(Vec3::Z);
        let i0 = self.add_vertex(a, normal);
        let i1 = self.add_vertex(b, normal);
        let i2 = self.add_vertex(c, normal);
        let i3 = self.add_vertex(d, normal);
        self.add_triangle(i0, i1, i2);
        self.add_triangle(i0, i2, i3);
    }

    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.vertex_count() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|idx| idx + offset));
    }

    pub fn position(&self, index: usize) -> Point3d {
        let i = index * 3;
        Point3d::from_f32([self.positions[i], self.positions[i + 1], self.positions[i + 2]])
    }

    pub fn set_position(&mut self, index: usize, p: Point3d) {
        let i = index * 3;
        self.positions[i] = p.x as f32;
        self.positions[i + 1] = p.y as f32;
        self.positions[i + 2] = p.z as f32;
    }

    pub fn normal(&self, index: usize) -> Vec3 {
        let i = index * 3;
        Vec3::new(
            self.normals[i] as f64,
            self.normals[i + 1] as f64,
            self.normals[i + 2] as f64,
        )
    }

    pub fn triangle(&self, t: usize) -> [Point3d; 3] {
        let i = t * 3;
        [
            self.position(self.indices[i] as usize),
            self.position(self.indices[i + 1] as usize),
            self.position(self.indices[i + 2] as usize),
        ]
    }

    pub fn points(&self) -> impl Iterator<Item = Point3d> + '_ {
        (0..self.vertex_count()).map(|i| self.position(i))
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bb = BoundingBox::empty();
        for p in self.points() {
            bb.expand(&p);
        }
        bb
    }

    pub fn is_finite(&self) -> bool {
        self.positions.iter().all(|v| v.is_finite())
    }

    /// Recompute smooth per-vertex normals from the triangles that use each
    /// vertex, weighted by triangle area. Vertices used only by degenerate
    /// triangles keep a zero normal.
    pub fn compute_vertex_normals(&mut self) {
        let mut acc = vec![Vec3::ZERO; self.vertex_count()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (pa, pb, pc) = (self.position(a), self.position(b), self.position(c));
            let face = (pb - pa).cross(&(pc - pa));
            acc[a] += face;
            acc[b] += face;
            acc[c] += face;
        }
        self.normals = acc
            .iter()
            .flat_map(|n| n.normalized().unwrap_or(Vec3::ZERO).to_f32_array())
            .collect();
    }

    /// Rewrite each vertex's height as `z + displacement(x, y)`.
    /// Normals are stale afterwards; callers recompute them.
    pub fn displace_z(&mut self, displacement: impl Fn(f64, f64) -> f64) {
        for i in 0..self.vertex_count() {
            let p = self.position(i);
            self.set_position(i, Point3d::new(p.x, p.y, p.z + displacement(p.x, p.y)));
        }
    }

    /// Copy of the mesh with every vertex mapped through `transform`.
    /// Normals are re-normalized, which is exact for rotations and uniform scales.
    pub fn transformed(&self, transform: &Transform) -> TriangleMesh {
        let mut out = self.clone();
        out.apply_transform(transform);
        out
    }

    pub fn apply_transform(&mut self, transform: &Transform) {
        for i in 0..self.vertex_count() {
            let p = transform.transform_point(&self.position(i));
            self.set_position(i, p);
        }
        for i in 0..self.normals.len() / 3 {
            let n = transform
                .transform_vector(&self.normal(i))
                .normalized()
                .unwrap_or(Vec3::ZERO);
            self.normals[i * 3..i * 3 + 3].copy_from_slice(&n.to_f32_array());
        }
    }

    /// Total signed volume by the divergence theorem; positive for closed
    /// meshes with outward-facing winding.
    pub fn signed_volume(&self) -> f64 {
        (0..self.triangle_count())
            .map(|t| {
                let [a, b, c] = self.triangle(t);
                a.to_vec3().dot(&b.to_vec3().cross(&c.to_vec3())) / 6.0
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tetrahedron() -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        let o = mesh.add_vertex(Point3d::new(0.0, 0.0, 0.0), Vec3::ZERO);
        let x = mesh.add_vertex(Point3d::new(1.0, 0.0, 0.0), Vec3::ZERO);
        let y = mesh.add_vertex(Point3d::new(0.0, 1.0, 0.0), Vec3::ZERO);
        let z = mesh.add_vertex(Point3d::new(0.0, 0.0, 1.0), Vec3::ZERO);
        mesh.add_triangle(o, y, x);
        mesh.add_triangle(o, x, z);
        mesh.add_triangle(o, z, y);
        mesh.add_triangle(x, y, z);
        mesh
    }

    #[test]
    fn test_merge_offsets_indices() {
        let mut a = unit_tetrahedron();
        let b = unit_tetrahedron();
        a.merge(&b);
        assert_eq!(a.vertex_count(), 8);
        assert_eq!(a.triangle_count(), 8);
        assert!(a.indices[12..].iter().all(|&i| i >= 4));
    }

    #[test]
    fn test_signed_volume_of_tetrahedron() {
        let mesh = unit_tetrahedron();
        assert!((mesh.signed_volume() - 1.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_vertex_normals_point_outward() {
        let mut mesh = unit_tetrahedron();
        mesh.compute_vertex_normals();
        let n = mesh.normal(3);
        // apex sits on +Z; its normal leans outward
        assert!(n.z > 0.0);
        assert!((n.length() - 1.0).abs() < 1e-6);
        let origin_normal = mesh.normal(0);
        assert!(origin_normal.x < 0.0 && origin_normal.y < 0.0 && origin_normal.z < 0.0);
    }

    #[test]
    fn test_displace_and_bounds() {
        let mut mesh = unit_tetrahedron();
        mesh.displace_z(|_, _| 0.5);
        let bb = mesh.bounding_box();
        assert!((bb.min.z - 0.5).abs() < 1e-6);
        assert!((bb.max.z - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_transformed_keeps_unit_normals() {
        let mut mesh = unit_tetrahedron();
        mesh.compute_vertex_normals();
        let moved = mesh.transformed(
            &Transform::uniform_scaling(3.0).then(&Transform::translation(1.0, 2.0, 3.0)),
        );
        assert!((moved.normal(3).length() - 1.0).abs() < 1e-6);
        let p = moved.position(1);
        assert!((p.x - 4.0).abs() < 1e-6);
        assert!((moved.signed_volume() - 27.0 / 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_flat_quad_normal() {
        let mut mesh = TriangleMesh::new();
        mesh.add_flat_quad(
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(1.0, 1.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        );
        assert_eq!(mesh.triangle_count(), 2);
        assert!((mesh.normal(0).z - 1.0).abs() < 1e-9);
    }
}
