pub mod rigid_wall;

use std::collections::BTreeMap;
use crate::hydro::ComputationalCell;
use crate::tessellation::{Edge, Tessellation};

pub use crate::tessellation::outer_edges;
pub use rigid_wall::RigidWallGenerator;




/// A trait for an object that supplies hydrodynamic states for the ghost
/// points across the outer boundary of a tessellation.
///
pub trait GhostPointGenerator: Send + Sync {
    /// Return a state for every ghost point adjacent to a real cell, keyed by
    /// the ghost's mesh point index.
    ///
    fn ghost_states(
        &self,
        tess: &dyn Tessellation,
        cells: &[ComputationalCell],
        time: f64,
    ) -> BTreeMap<usize, ComputationalCell>;

    /// Return the slope pair (x and y derivatives) to use for a ghost point
    /// when reconstructing across `edge`.
    ///
    fn ghost_gradient(
        &self,
        tess: &dyn Tessellation,
        cells: &[ComputationalCell],
        gradients: &[(ComputationalCell, ComputationalCell)],
        ghost_index: usize,
        time: f64,
        edge: &Edge,
    ) -> (ComputationalCell, ComputationalCell);
}
