use insole_kernel::geometry::point::Point2d;
use tracing::{debug, warn};

/// Signed area of a polygon by the shoelace formula; positive when the
/// vertices run counter-clockwise.
pub fn signed_area(points: &[Point2d]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        twice += a.x * b.y - b.x * a.y;
    }
    twice / 2.0
}

/// Reverse the vertex order of a clockwise polygon. Returns whether it flipped.
pub fn ensure_counter_clockwise(points: &mut [Point2d]) -> bool {
    if signed_area(points) < 0.0 {
        points.reverse();
        true
    } else {
        false
    }
}

/// Triangulate a simple counter-clockwise polygon by ear clipping.
///
/// Triangles come back counter-clockwise as index triples into `points`.
/// If clipping stalls (self-intersecting input) the remainder is fanned.
pub fn triangulate_polygon(points: &[Point2d]) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);

    while remaining.len() > 3 {
        let len = remaining.len();
        let ear = (0..len).find(|&i| {
            let prev = remaining[(i + len - 1) % len];
            let curr = remaining[i];
            let next = remaining[(i + 1) % len];
            is_ear(points, &remaining, prev, curr, next)
        });

        match ear {
            Some(i) => {
                let prev = remaining[(i + len - 1) % len];
                let next = remaining[(i + 1) % len];
                triangles.push([prev, remaining[i], next]);
                remaining.remove(i);
            }
            None => {
                warn!(
                    remaining = remaining.len(),
                    "ear clipping stalled, fanning the remainder"
                );
                break;
            }
        }
    }

    if remaining.len() >= 3 {
        for i in 1..remaining.len() - 1 {
            triangles.push([remaining[0], remaining[i], remaining[i + 1]]);
        }
    }

    debug!(vertices = n, triangles = triangles.len(), "triangulated polygon");
    triangles
}

fn cross(o: Point2d, a: Point2d, b: Point2d) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn is_ear(points: &[Point2d], remaining: &[usize], prev: usize, curr: usize, next: usize) -> bool {
    let (a, b, c) = (points[prev], points[curr], points[next]);

    // reflex or degenerate corner
    if cross(a, b, c) <= 0.0 {
        return false;
    }

    remaining
        .iter()
        .filter(|&&idx| idx != prev && idx != curr && idx != next)
        .all(|&idx| !point_in_triangle(points[idx], a, b, c))
}

fn point_in_triangle(p: Point2d, a: Point2d, b: Point2d, c: Point2d) -> bool {
    let d1 = cross(a, b, p);
    let d2 = cross(b, c, p);
    let d3 = cross(c, a, p);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;

    !(has_neg && has_pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shape() -> Vec<Point2d> {
        vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(2.0, 0.0),
            Point2d::new(2.0, 1.0),
            Point2d::new(1.0, 1.0),
            Point2d::new(1.0, 2.0),
            Point2d::new(0.0, 2.0),
        ]
    }

    fn triangles_area(points: &[Point2d], tris: &[[usize; 3]]) -> f64 {
        tris.iter()
            .map(|t| cross(points[t[0]], points[t[1]], points[t[2]]) / 2.0)
            .sum()
    }

    #[test]
    fn test_signed_area_orientation() {
        let mut pts = l_shape();
        assert!((signed_area(&pts) - 3.0).abs() < 1e-12);
        pts.reverse();
        assert!((signed_area(&pts) + 3.0).abs() < 1e-12);
        assert!(ensure_counter_clockwise(&mut pts));
        assert!(!ensure_counter_clockwise(&mut pts));
    }

    #[test]
    fn test_concave_polygon_covers_area() {
        let pts = l_shape();
        let tris = triangulate_polygon(&pts);
        assert_eq!(tris.len(), pts.len() - 2);
        assert!((triangles_area(&pts, &tris) - 3.0).abs() < 1e-12);
        for t in &tris {
            assert!(cross(pts[t[0]], pts[t[1]], pts[t[2]]) > 0.0);
        }
    }

    #[test]
    fn test_too_few_points() {
        assert!(triangulate_polygon(&[Point2d::ORIGIN, Point2d::new(1.0, 0.0)]).is_empty());
    }
}
