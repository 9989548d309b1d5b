//! Decomposition of polyhedral cells into tetrahedra, used to compute the
//! volume and center of mass of a 3D cell bounded by planar faces.

pub mod repository;
pub mod tetrahedron;

use std::collections::HashSet;
use rayon::prelude::*;
use crate::error::Error;
use crate::geometry::Vector3d;

pub use repository::{VertexRef, VertexRepository};
pub use tetrahedron::Tetrahedron;

/// Tetrahedra below this volume are left out of the center-of-mass average.
pub const DEGENERATE_VOLUME: f64 = 1e-30;




/**
 * One planar side of a polyhedral cell: an ordered loop of at least three
 * vertex handles. Faces may be degenerate (near-zero area) before the mesh
 * has been optimized.
 */
#[derive(Clone, Debug)]
pub struct Face {
    pub vertices: Vec<VertexRef>,
}




#[derive(Clone, Copy, Debug, PartialEq)]

/**
 * Volume and center of mass of a polyhedral cell
 */
pub struct CellDimensions {
    pub volume: f64,
    pub center_of_mass: Vector3d,
}




// ============================================================================
impl Face {
    pub fn new(vertices: Vec<VertexRef>) -> Self {
        debug_assert!(vertices.len() >= 3, "a face needs at least three vertices");
        Self { vertices }
    }
}




// ============================================================================
/**
 * Return the unweighted average of the distinct vertices of a cell. A vertex
 * shared by several faces is counted once.
 */
pub fn vertex_average(cell: &[&Face]) -> Option<Vector3d> {
    let mut considered = HashSet::new();
    let mut sum = Vector3d::default();

    for face in cell {
        for vertex in &face.vertices {
            if considered.insert(vertex) {
                sum += vertex.position();
            }
        }
    }

    if considered.is_empty() {
        None
    } else {
        Some(sum / considered.len() as f64)
    }
}

/**
 * Split a cell into tetrahedra that all share the cell's vertex average as
 * their apex. Each face is fan-triangulated from its first vertex:
 * `(v0, v1, v2), (v0, v2, v3), ..., (v0, v[n-2], v[n-1])`.
 */
pub fn split_cell(cell: &[&Face]) -> Vec<Tetrahedron> {
    let center = match vertex_average(cell) {
        Some(c) => c,
        None => return Vec::new(),
    };
    let expected: usize = cell.iter().map(|f| f.vertices.len().saturating_sub(1)).sum();
    let mut tetrahedra = Vec::with_capacity(expected);

    for face in cell {
        let v = &face.vertices;
        for i in 1..v.len().saturating_sub(1) {
            tetrahedra.push(Tetrahedron::new(
                center,
                v[0].position(),
                v[i].position(),
                v[i + 1].position(),
            ));
        }
    }
    tetrahedra
}

/**
 * Compute the volume and center of mass of a cell. Tetrahedra thinner than
 * `DEGENERATE_VOLUME` still count toward the volume but are skipped in the
 * center-of-mass average. A cell with no volume is a geometry error.
 */
pub fn cell_dimensions(cell: &[&Face]) -> Result<CellDimensions, Error> {
    let tetrahedra = split_cell(cell);

    let volume: f64 = tetrahedra.iter().map(Tetrahedron::volume).sum();

    if !volume.is_finite() || volume <= DEGENERATE_VOLUME {
        return Err(Error::DegeneratePolyhedron(volume));
    }

    let mut weighted = Vector3d::default();

    for t in &tetrahedra {
        let v = t.volume();
        if v < DEGENERATE_VOLUME {
            continue;
        }
        weighted += t.center() * v;
    }

    Ok(CellDimensions {
        volume,
        center_of_mass: weighted / volume,
    })
}

/**
 * Compute the dimensions of many cells in parallel. Cells are independent,
 * so one failing cell does not affect the others.
 */
pub fn cell_dimensions_par(cells: &[Vec<&Face>]) -> Vec<Result<CellDimensions, Error>> {
    cells.par_iter().map(|cell| cell_dimensions(cell)).collect()
}
