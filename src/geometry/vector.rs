use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use serde::{Deserialize, Serialize};




#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]

/**
 * A 2D vector, used for mesh points, velocities, and polygon vertices
 */
pub struct Vector2d {
    pub x: f64,
    pub y: f64,
}




#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]

/**
 * A 3D vector, used for polyhedral cell vertices
 */
pub struct Vector3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}




// ============================================================================
impl Vector2d {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(&self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// The z-component of the 3D cross product.
    pub fn cross(&self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn norm(&self) -> f64 {
        self.dot(*self).sqrt()
    }

    pub fn distance(&self, other: Self) -> f64 {
        (*self - other).norm()
    }

    /// Return the unit vector along this one, or `None` if its length is
    /// zero.
    pub fn normalized(&self) -> Option<Self> {
        let n = self.norm();
        if n > 0.0 && n.is_finite() {
            Some(*self / n)
        } else {
            None
        }
    }

    /// Rotate by 90 degrees counter-clockwise.
    pub fn perp(&self) -> Self {
        Self::new(-self.y, self.x)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Vector3d {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn norm(&self) -> f64 {
        self.dot(*self).sqrt()
    }

    /// Return the bit patterns of the three components. Two vectors with the
    /// same key are identical positions.
    pub fn bit_key(&self) -> [u64; 3] {
        [self.x.to_bits(), self.y.to_bits(), self.z.to_bits()]
    }
}




// ============================================================================
impl Add for Vector2d {
    type Output = Self;
    fn add(self, v: Self) -> Self {
        Self::new(self.x + v.x, self.y + v.y)
    }
}

impl Sub for Vector2d {
    type Output = Self;
    fn sub(self, v: Self) -> Self {
        Self::new(self.x - v.x, self.y - v.y)
    }
}

impl Mul<f64> for Vector2d {
    type Output = Self;
    fn mul(self, a: f64) -> Self {
        Self::new(self.x * a, self.y * a)
    }
}

impl Mul<Vector2d> for f64 {
    type Output = Vector2d;
    fn mul(self, v: Vector2d) -> Vector2d {
        v * self
    }
}

impl Div<f64> for Vector2d {
    type Output = Self;
    fn div(self, a: f64) -> Self {
        Self::new(self.x / a, self.y / a)
    }
}

impl Neg for Vector2d {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl AddAssign for Vector2d {
    fn add_assign(&mut self, v: Self) {
        self.x += v.x;
        self.y += v.y;
    }
}

impl SubAssign for Vector2d {
    fn sub_assign(&mut self, v: Self) {
        self.x -= v.x;
        self.y -= v.y;
    }
}




// ============================================================================
impl Add for Vector3d {
    type Output = Self;
    fn add(self, v: Self) -> Self {
        Self::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl Sub for Vector3d {
    type Output = Self;
    fn sub(self, v: Self) -> Self {
        Self::new(self.x - v.x, self.y - v.y, self.z - v.z)
    }
}

impl Mul<f64> for Vector3d {
    type Output = Self;
    fn mul(self, a: f64) -> Self {
        Self::new(self.x * a, self.y * a, self.z * a)
    }
}

impl Div<f64> for Vector3d {
    type Output = Self;
    fn div(self, a: f64) -> Self {
        Self::new(self.x / a, self.y / a, self.z / a)
    }
}

impl AddAssign for Vector3d {
    fn add_assign(&mut self, v: Self) {
        self.x += v.x;
        self.y += v.y;
        self.z += v.z;
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{Vector2d, Vector3d};

    #[test]
    fn vector2d_arithmetic_works() {
        let a = Vector2d::new(1.0, 2.0);
        let b = Vector2d::new(3.0, -1.0);
        assert_eq!(a + b, Vector2d::new(4.0, 1.0));
        assert_eq!(a - b, Vector2d::new(-2.0, 3.0));
        assert_eq!(a * 2.0, Vector2d::new(2.0, 4.0));
        assert_eq!(a.dot(b), 1.0);
        assert_eq!(a.cross(b), -7.0);
        assert_eq!(Vector2d::new(3.0, 4.0).norm(), 5.0);
    }

    #[test]
    fn zero_vector_has_no_direction() {
        assert!(Vector2d::default().normalized().is_none());
        assert_eq!(Vector2d::new(0.0, 2.0).normalized(), Some(Vector2d::new(0.0, 1.0)));
    }

    #[test]
    fn vector3d_cross_product_is_right_handed() {
        let x = Vector3d::new(1.0, 0.0, 0.0);
        let y = Vector3d::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(y), Vector3d::new(0.0, 0.0, 1.0));
    }
}
