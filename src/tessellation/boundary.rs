use serde::{Deserialize, Serialize};
use crate::geometry::Vector2d;




#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryKind {
    /// Walls on all four sides; points outside the box are invalid.
    Rigid,
    /// Opposite sides are identified; points leaving one side re-enter on
    /// the other.
    Periodic,
}




#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]

/**
 * The rectangular outer boundary of the computational domain
 */
pub struct OuterBoundary {
    pub lower_left: Vector2d,
    pub upper_right: Vector2d,
    pub kind: BoundaryKind,
}




/**
 * The convex hull of the region owned by this process in a domain-decomposed
 * run. Vertices are in counter-clockwise order.
 */
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessHull {
    vertices: Vec<Vector2d>,
}




// ============================================================================
impl OuterBoundary {

    pub fn rigid(lower_left: Vector2d, upper_right: Vector2d) -> Self {
        Self { lower_left, upper_right, kind: BoundaryKind::Rigid }
    }

    pub fn periodic(lower_left: Vector2d, upper_right: Vector2d) -> Self {
        Self { lower_left, upper_right, kind: BoundaryKind::Periodic }
    }

    pub fn is_periodic(&self) -> bool {
        self.kind == BoundaryKind::Periodic
    }

    pub fn size(&self) -> Vector2d {
        self.upper_right - self.lower_left
    }

    /// The larger of the two side lengths, used to set length tolerances.
    pub fn scale(&self) -> f64 {
        let s = self.size();
        s.x.max(s.y)
    }

    /// Determine whether a point lies strictly inside the box.
    pub fn contains(&self, p: Vector2d) -> bool {
        p.x > self.lower_left.x && p.x < self.upper_right.x &&
        p.y > self.lower_left.y && p.y < self.upper_right.y
    }

    /**
     * Map a point into the box by periodic translation. The point is
     * returned unchanged for a rigid boundary.
     */
    pub fn wrap(&self, p: Vector2d) -> Vector2d {
        if !self.is_periodic() {
            return p;
        }
        let s = self.size();
        let x = self.lower_left.x + (p.x - self.lower_left.x).rem_euclid(s.x);
        let y = self.lower_left.y + (p.y - self.lower_left.y).rem_euclid(s.y);
        Vector2d::new(x, y)
    }

    /**
     * The translations under which the domain tiles the plane: just the zero
     * vector for a rigid box, or the nine nearest lattice vectors for a
     * periodic one (the zero vector first).
     */
    pub fn periodic_shifts(&self) -> Vec<Vector2d> {
        if !self.is_periodic() {
            return vec![Vector2d::default()];
        }
        let s = self.size();
        let mut shifts = vec![Vector2d::default()];
        for i in -1..=1 {
            for j in -1..=1 {
                if i != 0 || j != 0 {
                    shifts.push(Vector2d::new(i as f64 * s.x, j as f64 * s.y));
                }
            }
        }
        shifts
    }

    /// Distance between two points, taking the nearest periodic image.
    pub fn min_image_distance(&self, a: Vector2d, b: Vector2d) -> f64 {
        self.periodic_shifts()
            .into_iter()
            .map(|s| a.distance(b + s))
            .fold(f64::INFINITY, f64::min)
    }
}




// ============================================================================
impl ProcessHull {

    pub fn new(vertices: Vec<Vector2d>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Vector2d] {
        &self.vertices
    }

    pub fn contains(&self, p: Vector2d) -> bool {
        let n = self.vertices.len();
        (0..n).all(|k| {
            let a = self.vertices[k];
            let b = self.vertices[(k + 1) % n];
            (b - a).cross(p - a) >= 0.0
        })
    }

    /// Distance from a point to the nearest hull edge.
    pub fn distance_to_edge(&self, p: Vector2d) -> f64 {
        let n = self.vertices.len();
        (0..n)
            .map(|k| segment_distance(p, self.vertices[k], self.vertices[(k + 1) % n]))
            .fold(f64::INFINITY, f64::min)
    }
}

fn segment_distance(p: Vector2d, a: Vector2d, b: Vector2d) -> f64 {
    let ab = b - a;
    let len2 = ab.dot(ab);
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
