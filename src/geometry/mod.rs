pub mod polygon;
pub mod vector;

pub use vector::{Vector2d, Vector3d};
