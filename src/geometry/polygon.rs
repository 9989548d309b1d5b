use super::vector::Vector2d;




/**
 * A convex polygon vertex together with a label for the edge that starts at
 * that vertex (and ends at the next vertex, cyclically). Labels let a
 * clipped Voronoi cell remember which neighbor produced each of its edges.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabeledVertex<L> {
    pub position: Vector2d,
    pub label: L,
}




// ============================================================================
/// Signed area of a polygon (positive for counter-clockwise vertex order).
pub fn signed_area(vertices: &[Vector2d]) -> f64 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for i in 0..n {
        twice_area += vertices[i].cross(vertices[(i + 1) % n]);
    }
    0.5 * twice_area
}

pub fn area(vertices: &[Vector2d]) -> f64 {
    signed_area(vertices).abs()
}

/// Area-weighted centroid of a simple polygon. Returns `None` if the polygon
/// has zero area.
pub fn centroid(vertices: &[Vector2d]) -> Option<Vector2d> {
    let n = vertices.len();
    if n < 3 {
        return None;
    }

    // Triangles are formed relative to the first vertex to limit round-off
    // for polygons far from the origin.
    let origin = vertices[0];
    let mut twice_area = 0.0;
    let mut moment = Vector2d::default();

    for i in 1..n - 1 {
        let a = vertices[i] - origin;
        let b = vertices[i + 1] - origin;
        let w = a.cross(b);
        twice_area += w;
        moment += (a + b) * w;
    }
    if twice_area == 0.0 {
        return None;
    }
    Some(origin + moment / (3.0 * twice_area))
}

/// Return the lower-left and upper-right corners of the polygon's bounding
/// box.
pub fn bounding_box(vertices: &[Vector2d]) -> (Vector2d, Vector2d) {
    let mut lo = Vector2d::new(f64::INFINITY, f64::INFINITY);
    let mut hi = Vector2d::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for v in vertices {
        lo.x = lo.x.min(v.x);
        lo.y = lo.y.min(v.y);
        hi.x = hi.x.max(v.x);
        hi.y = hi.y.max(v.y);
    }
    (lo, hi)
}

pub fn boxes_overlap(a: (Vector2d, Vector2d), b: (Vector2d, Vector2d)) -> bool {
    a.0.x <= b.1.x && b.0.x <= a.1.x && a.0.y <= b.1.y && b.0.y <= a.1.y
}




// ============================================================================
/**
 * Clip a convex polygon against the half-plane `{x : (x - point) . normal <=
 * 0}`. Surviving edges keep their labels; the edge created along the clip
 * line gets `label`. The input polygon is left untouched if it lies entirely
 * inside the half-plane.
 */
pub fn clip_labeled<L: Copy>(
    polygon: &[LabeledVertex<L>],
    point: Vector2d,
    normal: Vector2d,
    label: L,
) -> Vec<LabeledVertex<L>> {
    let n = polygon.len();
    let distance: Vec<f64> = polygon.iter().map(|v| (v.position - point).dot(normal)).collect();

    if distance.iter().all(|&d| d <= 0.0) {
        return polygon.to_vec();
    }

    let mut result = Vec::with_capacity(n + 1);

    for i in 0..n {
        let j = (i + 1) % n;
        let a = polygon[i];
        let b = polygon[j];
        let (da, db) = (distance[i], distance[j]);

        match (da <= 0.0, db <= 0.0) {
            (true, true) => result.push(a),
            (true, false) => {
                result.push(a);
                let t = da / (da - db);
                let crossing = a.position + (b.position - a.position) * t;
                result.push(LabeledVertex { position: crossing, label });
            }
            (false, true) => {
                let t = da / (da - db);
                let crossing = a.position + (b.position - a.position) * t;
                result.push(LabeledVertex { position: crossing, label: a.label });
            }
            (false, false) => {}
        }
    }
    result
}

/**
 * Remove vertices whose outgoing edge is shorter than `tolerance`. The edge
 * preceding a removed vertex is extended to the next vertex.
 */
pub fn drop_short_edges<L: Copy>(polygon: Vec<LabeledVertex<L>>, tolerance: f64) -> Vec<LabeledVertex<L>> {
    let mut polygon = polygon;
    let mut i = 0;

    while i < polygon.len() && polygon.len() > 3 {
        let j = (i + 1) % polygon.len();
        if polygon[i].position.distance(polygon[j].position) < tolerance {
            polygon.remove(i);
        } else {
            i += 1;
        }
    }
    polygon
}

/**
 * Intersect two convex, counter-clockwise polygons (Sutherland-Hodgman). The
 * result is empty if they do not overlap.
 */
pub fn intersect_convex(subject: &[Vector2d], clip: &[Vector2d]) -> Vec<Vector2d> {
    let mut current: Vec<LabeledVertex<()>> = subject
        .iter()
        .map(|&position| LabeledVertex { position, label: () })
        .collect();

    let m = clip.len();
    for k in 0..m {
        if current.len() < 3 {
            return Vec::new();
        }
        let a = clip[k];
        let b = clip[(k + 1) % m];
        let outward = Vector2d::new(b.y - a.y, a.x - b.x);
        current = clip_labeled(&current, a, outward, ());
    }

    if current.len() < 3 {
        Vec::new()
    } else {
        current.into_iter().map(|v| v.position).collect()
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use approx::assert_relative_eq;

    fn square(x0: f64, y0: f64, side: f64) -> Vec<Vector2d> {
        vec![
            Vector2d::new(x0, y0),
            Vector2d::new(x0 + side, y0),
            Vector2d::new(x0 + side, y0 + side),
            Vector2d::new(x0, y0 + side),
        ]
    }

    #[test]
    fn unit_square_has_unit_area_and_central_centroid() {
        let s = square(0.0, 0.0, 1.0);
        assert_relative_eq!(signed_area(&s), 1.0);
        assert_eq!(centroid(&s), Some(Vector2d::new(0.5, 0.5)));
    }

    #[test]
    fn clipping_labels_the_new_edge() {
        let s: Vec<_> = square(0.0, 0.0, 1.0)
            .into_iter()
            .map(|position| LabeledVertex { position, label: 0 })
            .collect();
        let clipped = clip_labeled(&s, Vector2d::new(0.5, 0.0), Vector2d::new(1.0, 0.0), 7);
        let vertices: Vec<_> = clipped.iter().map(|v| v.position).collect();
        assert_relative_eq!(area(&vertices), 0.5);
        assert_eq!(clipped.iter().filter(|v| v.label == 7).count(), 1);
    }

    #[test]
    fn overlapping_squares_intersect_in_a_quarter() {
        let a = square(0.0, 0.0, 1.0);
        let b = square(0.5, 0.5, 1.0);
        assert_relative_eq!(area(&intersect_convex(&a, &b)), 0.25, epsilon = 1e-14);
        assert!(intersect_convex(&a, &square(2.0, 2.0, 1.0)).is_empty());
    }

    #[test]
    fn short_edges_are_removed() {
        let mut s: Vec<_> = square(0.0, 0.0, 1.0)
            .into_iter()
            .map(|position| LabeledVertex { position, label: 0 })
            .collect();
        s.insert(2, LabeledVertex { position: Vector2d::new(1.0, 1.0 - 1e-14), label: 1 });
        let cleaned = drop_short_edges(s, 1e-10);
        assert_eq!(cleaned.len(), 4);
    }
}
