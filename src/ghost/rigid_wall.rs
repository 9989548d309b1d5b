use std::collections::BTreeMap;
use rayon::prelude::*;
use crate::hydro::ComputationalCell;
use crate::tessellation::{outer_edges, Edge, GhostKind, Tessellation};
use super::GhostPointGenerator;




/**
 * Ghost states for reflecting walls: the ghost carries the adjacent interior
 * state with its velocity component normal to the wall reversed. Ghosts
 * which are periodic images of interior points copy that point's state
 * unchanged.
 */
#[derive(Clone, Copy, Debug, Default)]
pub struct RigidWallGenerator;




// ============================================================================
impl RigidWallGenerator {

    /**
     * Return the ghost index of an outer edge and the state to give it.
     * `side` is 1 when the ghost is the edge's first neighbor and 2 when it
     * is the second.
     */
    fn ghost_state(tess: &dyn Tessellation, cells: &[ComputationalCell], edge: &Edge, side: u8) -> (usize, ComputationalCell) {
        let (ghost, interior) = if side == 1 {
            (edge.neighbors.0, edge.neighbors.1)
        } else {
            (edge.neighbors.1, edge.neighbors.0)
        };

        match tess.ghost_kind(ghost) {
            Some(GhostKind::Periodic { original }) => (ghost, cells[original].clone()),
            _ => {
                let normal = (tess.mesh_point(ghost) - tess.mesh_point(interior))
                    .normalized()
                    .unwrap_or_default();
                (ghost, cells[interior].reflect(normal))
            }
        }
    }
}

impl GhostPointGenerator for RigidWallGenerator {

    fn ghost_states(&self, tess: &dyn Tessellation, cells: &[ComputationalCell], _time: f64) -> BTreeMap<usize, ComputationalCell> {
        outer_edges(tess)
            .into_par_iter()
            .map(|(e, side)| Self::ghost_state(tess, cells, tess.edge(e), side))
            .collect()
    }

    fn ghost_gradient(
        &self,
        tess: &dyn Tessellation,
        cells: &[ComputationalCell],
        _gradients: &[(ComputationalCell, ComputationalCell)],
        ghost_index: usize,
        _time: f64,
        _edge: &Edge,
    ) -> (ComputationalCell, ComputationalCell) {
        let zero = cells[tess.original_index(ghost_index)].zeroed();
        (zero.clone(), zero)
    }
}
