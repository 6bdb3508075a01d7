//! Binary STL writer.
//!
//! Layout:
//! - 80 bytes: header (name, optional color marker, zero padding)
//! - 4 bytes: u32 LE triangle count
//! - Per triangle (50 bytes each): normal, three vertices (f32 LE), u16 attribute

use insole_tessellation::TriangleMesh;
use tracing::{debug, instrument};

use super::binary::COLOR_MARKER;
use super::{HEADER_LEN, PREAMBLE_LEN, RECORD_LEN};

/// Longest header name that still leaves room for the color marker inside
/// the scanned window.
const MAX_NAME_WITH_COLOR: usize = 56;

fn header(name: &str, default_color: Option<[u8; 4]>) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    let limit = if default_color.is_some() {
        MAX_NAME_WITH_COLOR
    } else {
        HEADER_LEN
    };
    let name = name.as_bytes();
    let len = name.len().min(limit);
    header[..len].copy_from_slice(&name[..len]);
    if let Some(rgba) = default_color {
        let at = len;
        header[at..at + 6].copy_from_slice(&COLOR_MARKER);
        header[at + 6..at + 10].copy_from_slice(&rgba);
    }
    header
}

fn vertex(mesh: &TriangleMesh, index: u32) -> [f32; 3] {
    let i = index as usize * 3;
    [mesh.positions[i], mesh.positions[i + 1], mesh.positions[i + 2]]
}

fn face_normal(v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) -> [f32; 3] {
    let e1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
    let e2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
    let nx = e1[1] * e2[2] - e1[2] * e2[1];
    let ny = e1[2] * e2[0] - e1[0] * e2[2];
    let nz = e1[0] * e2[1] - e1[1] * e2[0];
    let len = (nx * nx + ny * ny + nz * nz).sqrt();
    if len > 1e-20 {
        [nx / len, ny / len, nz / len]
    } else {
        [0.0, 0.0, 0.0]
    }
}

/// Pack an RGB triple in [0, 1] into a 5-5-5 attribute word (high bit clear).
pub fn pack_color(rgb: [f32; 3]) -> u16 {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 31.0).round() as u16;
    channel(rgb[0]) | (channel(rgb[1]) << 5) | (channel(rgb[2]) << 10)
}

fn write(mesh: &TriangleMesh, header: [u8; HEADER_LEN], attribute: impl Fn(usize) -> u16) -> Vec<u8> {
    let tri_count = mesh.triangle_count();
    let mut buf = Vec::with_capacity(PREAMBLE_LEN + tri_count * RECORD_LEN);
    buf.extend_from_slice(&header);
    buf.extend_from_slice(&(tri_count as u32).to_le_bytes());

    for (t, tri) in mesh.indices.chunks_exact(3).enumerate() {
        let (v0, v1, v2) = (vertex(mesh, tri[0]), vertex(mesh, tri[1]), vertex(mesh, tri[2]));
        for c in face_normal(v0, v1, v2) {
            buf.extend_from_slice(&c.to_le_bytes());
        }
        for v in [v0, v1, v2] {
            for c in v {
                buf.extend_from_slice(&c.to_le_bytes());
            }
        }
        buf.extend_from_slice(&attribute(t).to_le_bytes());
    }
    buf
}

/// Encode `mesh` as binary STL with a plain header and zero attributes.
#[instrument(skip(mesh), fields(triangles = mesh.triangle_count()))]
pub fn encode_binary(mesh: &TriangleMesh, header_name: &str) -> Vec<u8> {
    let buf = write(mesh, header(header_name, None), |_| 0);
    debug!(bytes = buf.len(), "encoded binary mesh");
    buf
}

/// Encode `mesh` with the header color marker and per-facet colors.
///
/// Facets beyond the end of `face_colors`, or with `None`, are flagged to
/// use `default_color`.
#[instrument(skip(mesh, face_colors), fields(triangles = mesh.triangle_count()))]
pub fn encode_binary_colored(
    mesh: &TriangleMesh,
    header_name: &str,
    default_color: [u8; 4],
    face_colors: &[Option<[f32; 3]>],
) -> Vec<u8> {
    let buf = write(mesh, header(header_name, Some(default_color)), |t| {
        match face_colors.get(t).copied().flatten() {
            Some(rgb) => pack_color(rgb),
            None => 0x8000,
        }
    });
    debug!(bytes = buf.len(), "encoded colored binary mesh");
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stl::binary::{header_default_color, unpack_color};

    #[test]
    fn test_header_layout() {
        let h = header("insole", None);
        assert_eq!(&h[..6], b"insole");
        assert!(h[6..].iter().all(|&b| b == 0));
        assert!(header_default_color(&h).is_none());

        let long = "x".repeat(200);
        let h = header(&long, Some([10, 20, 30, 40]));
        assert!(header_default_color(&h).is_some());
    }

    #[test]
    fn test_pack_unpack_roundtrip_on_grid() {
        let rgb = [1.0, 0.0, 16.0 / 31.0];
        assert_eq!(unpack_color(pack_color(rgb), [0.0; 3]), rgb);
        assert_eq!(pack_color([0.0; 3]), 0);
        assert_eq!(pack_color([2.0, -1.0, 0.0]), 0x001F);
    }
}
