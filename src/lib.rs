//! Voronoi-AMR is the adaptive mesh refinement layer of a moving-mesh
//! finite-volume code for the Euler equations of gas dynamics. Cells are the
//! Voronoi regions of a set of mesh points which move with the flow; the
//! mesh is refined by inserting new points into selected cells and coarsened
//! by removing points, with the conserved content of the affected cells
//! either redistributed exactly (the conservative schemes) or recomputed
//! from the primitive state. The crate also supplies the ghost states needed
//! by a flux calculator at the outer boundary, and the tetrahedral
//! decomposition used to measure polyhedral cells in 3D.

pub mod amr;
pub mod error;
pub mod geometry;
pub mod ghost;
pub mod hydro;
pub mod polyhedron;
pub mod tessellation;

pub use error::Error;
