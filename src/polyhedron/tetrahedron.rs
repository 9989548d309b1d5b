use crate::geometry::Vector3d;




/**
 * A tetrahedron given by its four vertex positions. Volume and centroid are
 * computed on demand.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tetrahedron {
    pub vertices: [Vector3d; 4],
}




// ============================================================================
impl Tetrahedron {

    pub fn new(a: Vector3d, b: Vector3d, c: Vector3d, d: Vector3d) -> Self {
        Self { vertices: [a, b, c, d] }
    }

    /**
     * Signed volume; positive when (b - a, c - a, d - a) is a right-handed
     * triple.
     */
    pub fn signed_volume(&self) -> f64 {
        let [a, b, c, d] = self.vertices;
        (b - a).dot((c - a).cross(d - a)) / 6.0
    }

    /**
     * Unsigned volume. Faces are shared between two cells, so a face's vertex
     * order can be outward for at most one of them.
     */
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    pub fn center(&self) -> Vector3d {
        let [a, b, c, d] = self.vertices;
        (a + b + c + d) * 0.25
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn unit_tetrahedron_has_volume_one_sixth() {
        let t = Tetrahedron::new(
            Vector3d::new(0.0, 0.0, 0.0),
            Vector3d::new(1.0, 0.0, 0.0),
            Vector3d::new(0.0, 1.0, 0.0),
            Vector3d::new(0.0, 0.0, 1.0),
        );
        assert_eq!(t.signed_volume(), 1.0 / 6.0);
        assert_eq!(t.center(), Vector3d::new(0.25, 0.25, 0.25));
    }

    #[test]
    fn swapping_two_vertices_flips_the_sign_only() {
        let a = Vector3d::new(0.0, 0.0, 0.0);
        let b = Vector3d::new(1.0, 0.0, 0.0);
        let c = Vector3d::new(0.0, 1.0, 0.0);
        let d = Vector3d::new(0.0, 0.0, 1.0);
        let t = Tetrahedron::new(a, c, b, d);
        assert!(t.signed_volume() < 0.0);
        assert_eq!(t.volume(), 1.0 / 6.0);
    }
}
