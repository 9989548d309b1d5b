//! The moving-mesh tessellation interface consumed by the AMR and ghost-state
//! code, plus a reference implementation for small meshes.

pub mod boundary;
pub mod logger;
pub mod voronoi;

use std::f64::consts::PI;
use crate::error::Error;
use crate::geometry::Vector2d;

pub use boundary::{BoundaryKind, OuterBoundary, ProcessHull};
pub use logger::BinLogger;
pub use voronoi::VoronoiMesh;




#[derive(Clone, Copy, Debug, PartialEq)]

/**
 * A face between two mesh cells. Either neighbor may be a ghost point (an
 * index at or beyond `Tessellation::point_count`).
 */
pub struct Edge {
    pub vertices: (Vector2d, Vector2d),
    pub neighbors: (usize, usize),
}




#[derive(Clone, Copy, Debug, PartialEq, Eq)]

/**
 * How a ghost point relates to a real mesh point
 */
pub enum GhostKind {
    /// Mirror image of `original` across a rigid wall.
    Reflected { original: usize },
    /// Periodic image of `original`, a genuine interior point reached by
    /// wrapping around the domain.
    Periodic { original: usize },
}




// ============================================================================
impl Edge {
    pub fn length(&self) -> f64 {
        self.vertices.0.distance(self.vertices.1)
    }

    pub fn midpoint(&self) -> Vector2d {
        (self.vertices.0 + self.vertices.1) * 0.5
    }

    /// Return the neighbor on the other side of this edge from `index`.
    pub fn other(&self, index: usize) -> usize {
        if self.neighbors.0 == index {
            self.neighbors.1
        } else {
            self.neighbors.0
        }
    }
}

impl GhostKind {
    pub fn original(&self) -> usize {
        match *self {
            GhostKind::Reflected { original } => original,
            GhostKind::Periodic { original } => original,
        }
    }
}




// ============================================================================
/**
 * A 2D tessellation of the domain into one cell per mesh point. Indices
 * below `point_count` are real points; indices from `point_count` up to
 * `total_point_count` are ghost points created by the outer boundary.
 */
pub trait Tessellation: Send + Sync {

    /// Number of real mesh points.
    fn point_count(&self) -> usize;

    /// Number of real plus ghost points.
    fn total_point_count(&self) -> usize;

    /// Position of a real or ghost point.
    fn mesh_point(&self, index: usize) -> Vector2d;

    fn edge_count(&self) -> usize;

    fn edge(&self, index: usize) -> &Edge;

    /// Indices of the edges bounding a real cell.
    fn cell_edges(&self, index: usize) -> &[usize];

    fn volume(&self, index: usize) -> f64;

    /// Center of mass of a real cell.
    fn cell_cm(&self, index: usize) -> Vector2d;

    /// Vertices of a real cell in counter-clockwise order.
    fn cell_vertices(&self, index: usize) -> Vec<Vector2d>;

    /// `None` for real points.
    fn ghost_kind(&self, index: usize) -> Option<GhostKind>;

    /**
     * Rebuild the tessellation from a new set of real points, all of which
     * must lie inside the outer boundary.
     */
    fn update(&mut self, points: Vec<Vector2d>) -> Result<(), Error>;

    /// The real point a ghost stands for, or the index itself for a real
    /// point.
    fn original_index(&self, index: usize) -> usize {
        self.ghost_kind(index).map_or(index, |g| g.original())
    }

    /// Radius of the disk with the same area as the cell.
    fn width(&self, index: usize) -> f64 {
        (self.volume(index) / PI).sqrt()
    }

    fn mesh_points(&self) -> Vec<Vector2d> {
        (0..self.point_count()).map(|i| self.mesh_point(i)).collect()
    }

    /// All neighbors (real and ghost) of a real cell.
    fn neighbors(&self, index: usize) -> Vec<usize> {
        self.cell_edges(index)
            .iter()
            .map(|&e| self.edge(e).other(index))
            .collect()
    }

    /**
     * Real cells sharing an edge with `index`, with periodic images mapped to
     * their original and wall mirrors dropped. Sorted and free of duplicates.
     */
    fn real_neighbors(&self, index: usize) -> Vec<usize> {
        let mut result: Vec<usize> = self
            .neighbors(index)
            .into_iter()
            .filter_map(|n| match self.ghost_kind(n) {
                None => Some(n),
                Some(GhostKind::Periodic { original }) => Some(original),
                Some(GhostKind::Reflected { .. }) => None,
            })
            .filter(|&n| n != index)
            .collect();
        result.sort_unstable();
        result.dedup();
        result
    }

    /// Append points to the mesh; new points get the next indices in order.
    fn insert_points(&mut self, points: &[Vector2d]) -> Result<(), Error> {
        let mut all = self.mesh_points();
        all.extend_from_slice(points);
        self.update(all)
    }

    /**
     * Remove the given points and compact the rest. Returns the old-to-new
     * index map (`None` for erased points).
     */
    fn erase_points(&mut self, erase: &[usize]) -> Result<Vec<Option<usize>>, Error> {
        let remap = compaction_map(self.point_count(), erase);
        let points = self
            .mesh_points()
            .into_iter()
            .zip(&remap)
            .filter_map(|(p, r)| r.map(|_| p))
            .collect();
        self.update(points)?;
        Ok(remap)
    }
}

/**
 * Build the old-to-new index map for removing `erase` from `0..len`.
 * Surviving indices keep their relative order.
 */
pub fn compaction_map(len: usize, erase: &[usize]) -> Vec<Option<usize>> {
    let mut keep = vec![true; len];
    for &i in erase {
        if i < len {
            keep[i] = false;
        }
    }
    let mut next = 0;
    keep.into_iter()
        .map(|k| {
            if k {
                next += 1;
                Some(next - 1)
            } else {
                None
            }
        })
        .collect()
}

/**
 * Apply an old-to-new index map to a per-point array, dropping entries of
 * erased points.
 */
pub fn compact<T>(values: &mut Vec<T>, remap: &[Option<usize>]) {
    let mut index = 0;
    values.retain(|_| {
        let keep = remap[index].is_some();
        index += 1;
        keep
    });
}

/**
 * Return the indices of edges with exactly one real neighbor, together with
 * which side the ghost is on (1 if `neighbors.0` is the ghost, 2 otherwise).
 */
pub fn outer_edges(tess: &dyn Tessellation) -> Vec<(usize, u8)> {
    let n = tess.point_count();
    (0..tess.edge_count())
        .filter_map(|e| {
            let (a, b) = tess.edge(e).neighbors;
            match (a >= n, b >= n) {
                (true, false) => Some((e, 1)),
                (false, true) => Some((e, 2)),
                _ => None,
            }
        })
        .collect()
}
