//! Stereolithography meshes: binary and text decoding, binary encoding.

pub mod ascii;
pub mod binary;
pub mod encode;

use insole_kernel::geometry::point::Point3d;
use insole_kernel::geometry::transform::BoundingBox;
use insole_tessellation::TriangleMesh;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::errors::FormatError;

/// Fixed binary header length.
pub const HEADER_LEN: usize = 80;
/// Header plus the little-endian triangle count.
pub const PREAMBLE_LEN: usize = HEADER_LEN + 4;
/// Normal, three vertices and the attribute word.
pub const RECORD_LEN: usize = 50;

/// How a buffer was decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encoding {
    Binary,
    Text,
}

/// A flat, non-indexed mesh exactly as stored in the file.
///
/// Three vertices per triangle in file order; every vertex repeats its
/// triangle's normal. Colors, when present, run parallel to `positions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMeshData {
    pub triangle_count: usize,
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub colors: Option<Vec<f32>>,
    /// RGBA default from the header color marker.
    pub default_color: Option<[f32; 4]>,
    pub encoding: Encoding,
}

impl RawMeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn position(&self, index: usize) -> Point3d {
        let i = index * 3;
        Point3d::from_f32([self.positions[i], self.positions[i + 1], self.positions[i + 2]])
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bb = BoundingBox::empty();
        for i in 0..self.vertex_count() {
            bb.expand(&self.position(i));
        }
        bb
    }

    /// One mesh vertex per stored corner; file normals are kept as-is.
    /// A trailing partial triangle is left unindexed.
    pub fn to_triangle_mesh(&self) -> TriangleMesh {
        let mut mesh = TriangleMesh {
            positions: self.positions.clone(),
            normals: self.normals.clone(),
            indices: Vec::with_capacity(self.vertex_count()),
        };
        for t in 0..(self.vertex_count() / 3) as u32 {
            mesh.add_triangle(t * 3, t * 3 + 1, t * 3 + 2);
        }
        mesh
    }
}

/// Binary when the buffer length matches the declared triangle count exactly.
pub fn detect_encoding(bytes: &[u8]) -> Result<Encoding, FormatError> {
    if bytes.len() < PREAMBLE_LEN {
        return Err(FormatError::TooShort {
            len: bytes.len(),
            required: PREAMBLE_LEN,
        });
    }
    let count = binary::triangle_count_field(bytes);
    if binary::expected_len(count) == bytes.len() as u64 {
        Ok(Encoding::Binary)
    } else {
        Ok(Encoding::Text)
    }
}

/// Decode an STL buffer in either encoding.
#[instrument(skip(bytes), fields(len = bytes.len()))]
pub fn parse(bytes: &[u8]) -> Result<RawMeshData, FormatError> {
    let mesh = match detect_encoding(bytes)? {
        Encoding::Binary => binary::parse_binary(bytes)?,
        Encoding::Text => ascii::parse_text(bytes)?,
    };
    info!(
        encoding = ?mesh.encoding,
        triangles = mesh.triangle_count,
        colored = mesh.colors.is_some(),
        "parsed mesh"
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_encoding_by_length() {
        let mut bytes = vec![0u8; PREAMBLE_LEN + RECORD_LEN];
        bytes[80] = 1;
        assert_eq!(detect_encoding(&bytes), Ok(Encoding::Binary));
        bytes.push(b'\n');
        assert_eq!(detect_encoding(&bytes), Ok(Encoding::Text));
    }

    #[test]
    fn test_short_buffer_rejected() {
        assert_eq!(
            parse(b"solid x"),
            Err(FormatError::TooShort {
                len: 7,
                required: PREAMBLE_LEN
            })
        );
    }

    #[test]
    fn test_zero_triangles_binary() {
        let bytes = vec![0u8; PREAMBLE_LEN];
        let mesh = parse(&bytes).unwrap();
        assert_eq!(mesh.encoding, Encoding::Binary);
        assert_eq!(mesh.triangle_count, 0);
        assert!(mesh.positions.is_empty());
        assert!(mesh.bounding_box().is_empty());
    }
}
