//! Flat-shaded isometric SVG previews of scene-frame meshes.

use std::fmt::Write;

use insole_kernel::geometry::point::Point3d;
use insole_tessellation::TriangleMesh;

/// Isometric projection of a Y-up scene point onto the page: `(right, down)`.
fn project(p: &Point3d) -> (f64, f64) {
    let yaw: f64 = 0.8;
    let pitch: f64 = 0.6;
    let (sy, cy) = yaw.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    let right = p.x * cy - p.z * sy;
    let toward = p.x * sy + p.z * cy;
    let up = p.y * cp + toward * sp;
    (right, -up)
}

/// Depth along the viewing direction; larger is farther away.
fn depth(p: &Point3d) -> f64 {
    let yaw: f64 = 0.8;
    let (sy, cy) = yaw.sin_cos();
    -(p.x * sy + p.z * cy)
}

struct Face {
    corners: [(f64, f64); 3],
    depth: f64,
    brightness: f64,
    color: (f64, f64, f64),
}

/// Render several meshes into one picture, each with its own base color.
pub fn scene_to_svg(parts: &[(&TriangleMesh, (f64, f64, f64))], width: f64, height: f64, title: &str) -> String {
    let light = (0.3_f64, 0.8_f64, 0.5_f64);
    let light_len = (light.0 * light.0 + light.1 * light.1 + light.2 * light.2).sqrt();

    let mut faces = Vec::new();
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
    for (mesh, color) in parts {
        for t in 0..mesh.triangle_count() {
            let tri = mesh.triangle(t);
            let n = (tri[1] - tri[0]).cross(&(tri[2] - tri[0]));
            let n_len = n.length().max(1e-12);
            let dot = (n.x * light.0 + n.y * light.1 + n.z * light.2) / (n_len * light_len);
            let corners = tri.map(|p| project(&p));
            for (x, y) in corners {
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);
            }
            faces.push(Face {
                corners,
                depth: tri.iter().map(depth).sum::<f64>() / 3.0,
                brightness: 0.3 + 0.7 * dot.abs().min(1.0),
                color: *color,
            });
        }
    }

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" style=\"background:#1a1a2e\">\n\
         <text x=\"{}\" y=\"20\" font-family=\"monospace\" font-size=\"13\" fill=\"#8892b0\" text-anchor=\"middle\">{title}</text>\n",
        width / 2.0
    );
    if faces.is_empty() {
        svg.push_str("</svg>\n");
        return svg;
    }

    let padding = 40.0;
    let avail_w = width - 2.0 * padding;
    let avail_h = height - 2.0 * padding - 25.0;
    let data_w = (max_x - min_x).max(1e-6);
    let data_h = (max_y - min_y).max(1e-6);
    let scale = (avail_w / data_w).min(avail_h / data_h);
    let offset_x = padding + (avail_w - data_w * scale) / 2.0;
    let offset_y = padding + 25.0 + (avail_h - data_h * scale) / 2.0;
    let page = |(x, y): (f64, f64)| ((x - min_x) * scale + offset_x, (y - min_y) * scale + offset_y);

    // painter's algorithm: far faces first
    faces.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    let stroke_width = if faces.len() > 2000 { 0.1 } else { 0.3 };

    for face in &faces {
        let [(x0, y0), (x1, y1), (x2, y2)] = face.corners.map(page);
        let b = face.brightness;
        let (r, g, bl) = (
            (face.color.0 * 255.0 * b) as u8,
            (face.color.1 * 255.0 * b) as u8,
            (face.color.2 * 255.0 * b) as u8,
        );
        let _ = writeln!(
            svg,
            "  <polygon points=\"{x0:.1},{y0:.1} {x1:.1},{y1:.1} {x2:.1},{y2:.1}\" \
             fill=\"rgb({r},{g},{bl})\" stroke=\"#222240\" stroke-width=\"{stroke_width}\"/>"
        );
    }

    let _ = writeln!(
        svg,
        "  <text x=\"{}\" y=\"{}\" font-family=\"monospace\" font-size=\"10\" fill=\"#5a6080\" \
         text-anchor=\"middle\">{} triangles</text>",
        width / 2.0,
        height - 8.0,
        faces.len()
    );
    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use insole_tessellation::primitives::cylinder;

    #[test]
    fn test_one_polygon_per_triangle() {
        let mesh = cylinder(1.0, 2.0, 12).unwrap();
        let svg = scene_to_svg(&[(&mesh, (0.4, 0.6, 0.9))], 400.0, 300.0, "cylinder");
        assert_eq!(svg.matches("<polygon").count(), mesh.triangle_count());
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_empty_scene() {
        let svg = scene_to_svg(&[], 100.0, 100.0, "nothing");
        assert!(!svg.contains("<polygon"));
    }
}
