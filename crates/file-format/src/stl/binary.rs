use tracing::{debug, instrument};

use super::{Encoding, HEADER_LEN, PREAMBLE_LEN, RECORD_LEN, RawMeshData};
use crate::errors::FormatError;

/// Header color marker: big-endian word `COLO` followed by `0x52 0x33`.
pub const COLOR_MARKER: [u8; 6] = [0x43, 0x4F, 0x4C, 0x4F, 0x52, 0x33];
/// Marker start offsets scanned in the header, exclusive upper bound.
pub const COLOR_SCAN_END: usize = HEADER_LEN - 12;

/// Set in a packed attribute word when the facet uses the header default color.
const DEFAULT_COLOR_BIT: u16 = 0x8000;

pub(crate) fn triangle_count_field(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]])
}

/// Total buffer length implied by a triangle count. Computed in `u64` so no
/// declared count can overflow.
pub fn expected_len(triangles: u32) -> u64 {
    PREAMBLE_LEN as u64 + triangles as u64 * RECORD_LEN as u64
}

fn read_f32(data: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

/// Find the header color marker and return the RGBA default that follows it.
/// The first match wins.
pub fn header_default_color(header: &[u8]) -> Option<[f32; 4]> {
    (0..COLOR_SCAN_END.min(header.len().saturating_sub(9))).find_map(|i| {
        if header[i..i + 6] == COLOR_MARKER {
            let c = &header[i + 6..i + 10];
            Some([
                c[0] as f32 / 255.0,
                c[1] as f32 / 255.0,
                c[2] as f32 / 255.0,
                c[3] as f32 / 255.0,
            ])
        } else {
            None
        }
    })
}

/// Decode a 5-5-5 packed attribute word, falling back to `default` when the
/// high bit is set.
pub fn unpack_color(word: u16, default: [f32; 3]) -> [f32; 3] {
    if word & DEFAULT_COLOR_BIT != 0 {
        return default;
    }
    [
        (word & 0x1F) as f32 / 31.0,
        ((word >> 5) & 0x1F) as f32 / 31.0,
        ((word >> 10) & 0x1F) as f32 / 31.0,
    ]
}

/// Decode a binary buffer. Bytes past the declared records are ignored.
#[instrument(skip(bytes), fields(len = bytes.len()))]
pub fn parse_binary(bytes: &[u8]) -> Result<RawMeshData, FormatError> {
    if bytes.len() < PREAMBLE_LEN {
        return Err(FormatError::TooShort {
            len: bytes.len(),
            required: PREAMBLE_LEN,
        });
    }
    let triangles = triangle_count_field(bytes);
    let expected = expected_len(triangles);
    if (bytes.len() as u64) < expected {
        return Err(FormatError::Truncated {
            triangles,
            expected,
            actual: bytes.len(),
        });
    }

    let default_color = header_default_color(&bytes[..HEADER_LEN]);
    let count = triangles as usize;
    let mut positions = Vec::with_capacity(count * 9);
    let mut normals = Vec::with_capacity(count * 9);
    let mut colors = default_color.map(|_| Vec::with_capacity(count * 9));

    for record in bytes[PREAMBLE_LEN..].chunks_exact(RECORD_LEN).take(count) {
        let normal = [read_f32(record, 0), read_f32(record, 4), read_f32(record, 8)];
        for v in 0..3 {
            let base = 12 + v * 12;
            positions.extend_from_slice(&[
                read_f32(record, base),
                read_f32(record, base + 4),
                read_f32(record, base + 8),
            ]);
            normals.extend_from_slice(&normal);
        }
        if let (Some(colors), Some(rgba)) = (colors.as_mut(), default_color) {
            let rgb = unpack_color(read_u16(record, 48), [rgba[0], rgba[1], rgba[2]]);
            for _ in 0..3 {
                colors.extend_from_slice(&rgb);
            }
        }
    }

    debug!(triangles = count, colored = colors.is_some(), "decoded binary records");
    Ok(RawMeshData {
        triangle_count: count,
        positions,
        normals,
        colors,
        default_color,
        encoding: Encoding::Binary,
    })
}
