//! Adaptive refinement of a moving mesh: splitting cells by inserting new
//! mesh points and merging cells by removing points, while keeping the
//! per-point primitive and conserved arrays consistent with the mesh.

pub mod config;
pub mod conservative;
pub mod interpolation;
pub mod non_conservative;
pub mod placement;
pub mod redistribution;
pub mod selector;
pub mod updater;

use std::collections::BTreeSet;
use log::debug;
use crate::error::Error;
use crate::hydro::{self, ComputationalCell, EquationOfState, Extensive};
use crate::tessellation::{OuterBoundary, ProcessHull, Tessellation};

pub use config::{AmrConfig, PlacementScheme};
pub use conservative::{ConservativeAmr, ConservativeAmrOld, SplitScheme};
pub use non_conservative::NonConservativeAmr;
pub use placement::{NewPointPlacer, Placement};
pub use selector::{resolve_conflicts, CellsToRefine, CellsToRemove, ThresholdRefine, ThresholdRemove};
pub use updater::{AmrCellUpdater, AmrExtensiveUpdater, SimpleAmrCellUpdater, SimpleAmrExtensiveUpdater};




// ============================================================================
/**
 * The state handed to an AMR pass by the simulation: the mesh, its outer
 * boundary, one primitive and one conserved state per mesh point, the
 * equation of state, and the simulation time.
 */
pub struct Simulation {
    pub tess: Box<dyn Tessellation>,
    pub boundary: OuterBoundary,
    pub cells: Vec<ComputationalCell>,
    pub extensives: Vec<Extensive>,
    pub eos: Box<dyn EquationOfState>,
    pub time: f64,
}

impl Simulation {

    /**
     * Bundle a mesh with its primitive states, computing the conserved
     * content of each cell from its primitive state and volume.
     */
    pub fn new(
        tess: Box<dyn Tessellation>,
        boundary: OuterBoundary,
        cells: Vec<ComputationalCell>,
        eos: Box<dyn EquationOfState>,
    ) -> Result<Self, Error> {
        if cells.len() != tess.point_count() {
            return Err(Error::LengthMismatch {
                points: tess.point_count(),
                cells: cells.len(),
                extensives: cells.len(),
            });
        }
        let extensives = cells
            .iter()
            .enumerate()
            .map(|(i, c)| hydro::primitive_to_conserved(c, eos.as_ref(), tess.volume(i)))
            .collect();

        Ok(Self { tess, boundary, cells, extensives, eos, time: 0.0 })
    }

    /// Sum of the conserved content over all cells.
    pub fn total_extensive(&self) -> Extensive {
        total_extensive(&self.extensives)
    }
}

pub fn total_extensive(extensives: &[Extensive]) -> Extensive {
    extensives.iter().fold(Extensive::default(), |mut total, u| {
        total += u;
        total
    })
}




// ============================================================================
/**
 * One AMR scheme. A pass refines and then removes cells, resizing the
 * primitive and conserved arrays in place so that entry `i` always describes
 * mesh point `i`.
 */
pub trait Amr: Send + Sync {

    fn refine(
        &self,
        tess: &mut dyn Tessellation,
        boundary: &OuterBoundary,
        cells: &mut Vec<ComputationalCell>,
        eos: &dyn EquationOfState,
        extensives: &mut Vec<Extensive>,
        time: f64,
    ) -> Result<(), Error>;

    fn remove(
        &self,
        tess: &mut dyn Tessellation,
        boundary: &OuterBoundary,
        cells: &mut Vec<ComputationalCell>,
        extensives: &mut Vec<Extensive>,
        eos: &dyn EquationOfState,
        time: f64,
    ) -> Result<(), Error>;

    /// Run a full refine-then-remove pass on a simulation.
    fn step(&self, sim: &mut Simulation) -> Result<(), Error> {
        self.refine(sim.tess.as_mut(), &sim.boundary, &mut sim.cells, sim.eos.as_ref(), &mut sim.extensives, sim.time)?;
        self.remove(sim.tess.as_mut(), &sim.boundary, &mut sim.cells, &mut sim.extensives, sim.eos.as_ref(), sim.time)
    }
}




// ============================================================================
/**
 * The selection half of an AMR scheme, shared by every driver: the injected
 * selectors, the point placer, the optional process hull, and the removal
 * floor.
 */
pub(crate) struct AmrPolicy {
    pub refine: Box<dyn CellsToRefine>,
    pub remove: Box<dyn CellsToRemove>,
    pub placer: NewPointPlacer,
    pub hull: Option<ProcessHull>,
    pub min_point_count: usize,
}

impl AmrPolicy {

    pub fn new(refine: Box<dyn CellsToRefine>, remove: Box<dyn CellsToRemove>) -> Self {
        let config = AmrConfig::default();
        Self {
            refine,
            remove,
            placer: NewPointPlacer::from_config(&config),
            hull: None,
            min_point_count: config.min_point_count,
        }
    }

    pub fn configure(&mut self, config: &AmrConfig) {
        self.placer = NewPointPlacer::from_config(config);
        self.min_point_count = config.min_point_count;
    }

    /// Whether a cell is too close to the process hull to be changed here.
    fn near_hull(&self, tess: &dyn Tessellation, index: usize) -> bool {
        self.hull.as_ref().map_or(false, |hull| {
            let p = tess.mesh_point(index);
            !hull.contains(p) || hull.distance_to_edge(p) < tess.width(index)
        })
    }

    /**
     * Ask the refinement selector for candidates and place their new points.
     * Candidates that cannot be placed are dropped.
     */
    pub fn placement(
        &self,
        tess: &dyn Tessellation,
        boundary: &OuterBoundary,
        cells: &[ComputationalCell],
        time: f64,
    ) -> Placement {
        let mut candidates = self.refine.to_refine(tess, cells, time);
        candidates.sort_unstable();
        candidates.dedup();
        candidates.retain(|&i| i < tess.point_count() && !self.near_hull(tess, i));
        self.placer.place(&candidates, tess, boundary, self.hull.as_ref())
    }

    /**
     * Ask the removal selector for candidates and reduce them to a set that
     * can be removed together: no two neighbors, none near the process hull,
     * none without a real neighbor to absorb it, and enough points left
     * over. Returned in ascending order.
     */
    pub fn removal_candidates(&self, tess: &dyn Tessellation, cells: &[ComputationalCell], time: f64) -> Vec<usize> {
        let (indices, merits) = self.remove.to_remove(tess, cells, time);

        let (indices, merits): (Vec<usize>, Vec<f64>) = indices
            .into_iter()
            .zip(merits.into_iter().chain(std::iter::repeat(0.0)))
            .filter(|&(i, _)| i < tess.point_count())
            .filter(|&(i, _)| !self.near_hull(tess, i) && !tess.real_neighbors(i).is_empty())
            .unzip();

        let mut accepted = resolve_conflicts(tess, &indices, &merits);
        let room = tess.point_count().saturating_sub(self.min_point_count.max(1));
        accepted.truncate(room);
        accepted.sort_unstable();

        debug!("accepted {} of {} removal candidates", accepted.len(), indices.len());
        accepted
    }
}




// ============================================================================
/**
 * Indices touched by inserting (and moving) points. `parents[j]` is the cell
 * split by new point `old_count + j`. `affected` lists, in the new mesh, every
 * cell whose polygon may have changed.
 */
pub(crate) struct Refinement {
    pub old_count: usize,
    pub parents: Vec<usize>,
    pub affected: Vec<usize>,
}

/**
 * Indices touched by erasing points. `neighbors[j]` lists (in new indices)
 * the surviving real neighbors of the `j`-th removed point; `affected` is
 * their union.
 */
pub(crate) struct Removal {
    pub removed: Vec<usize>,
    pub remap: Vec<Option<usize>>,
    pub neighbors: Vec<Vec<usize>>,
    pub affected: Vec<usize>,
}

pub(crate) fn validate_lengths(
    tess: &dyn Tessellation,
    cells: &[ComputationalCell],
    extensives: &[Extensive],
) -> Result<(), Error> {
    if cells.len() != tess.point_count() || extensives.len() != tess.point_count() {
        Err(Error::LengthMismatch {
            points: tess.point_count(),
            cells: cells.len(),
            extensives: extensives.len(),
        })
    } else {
        Ok(())
    }
}

/**
 * Move and insert points according to a placement and rebuild the mesh.
 * Existing points keep their indices; new points are appended in placement
 * order.
 */
pub(crate) fn refine_mesh(tess: &mut dyn Tessellation, placement: &Placement) -> Result<Refinement, Error> {
    let old_count = tess.point_count();
    let mut affected = BTreeSet::new();
    let mut points = tess.mesh_points();

    for &(i, p) in &placement.moved {
        affected.extend(tess.real_neighbors(i));
        points[i] = p;
    }
    points.extend(placement.new_points.iter().map(|&(_, p)| p));
    tess.update(points)?;

    let changed = placement.moved
        .iter()
        .map(|&(i, _)| i)
        .chain(old_count..tess.point_count());

    for c in changed {
        affected.insert(c);
        affected.extend(tess.real_neighbors(c));
    }
    let parents: Vec<usize> = placement.new_points.iter().map(|&(i, _)| i).collect();
    affected.extend(parents.iter().copied());

    Ok(Refinement {
        old_count,
        parents,
        affected: affected.into_iter().collect(),
    })
}

/**
 * Erase the given points (which must not neighbor one another) and rebuild
 * the mesh, recording where each removed point's neighbors ended up.
 */
pub(crate) fn remove_from_mesh(tess: &mut dyn Tessellation, removed: &[usize]) -> Result<Removal, Error> {
    let old_neighbors: Vec<Vec<usize>> = removed.iter().map(|&r| tess.real_neighbors(r)).collect();
    let remap = tess.erase_points(removed)?;

    let neighbors: Vec<Vec<usize>> = old_neighbors
        .into_iter()
        .map(|list| list.into_iter().filter_map(|n| remap[n]).collect())
        .collect();

    let affected: BTreeSet<usize> = neighbors.iter().flatten().copied().collect();

    Ok(Removal {
        removed: removed.to_vec(),
        remap,
        neighbors,
        affected: affected.into_iter().collect(),
    })
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::geometry::Vector2d;
    use crate::hydro::IdealGas;
    use crate::tessellation::VoronoiMesh;
    use crate::tessellation::voronoi::test::perturbed_grid;

    fn refine_nothing(_: &dyn Tessellation, _: &[ComputationalCell], _: f64) -> Vec<usize> {
        vec![]
    }

    fn remove_everything(tess: &dyn Tessellation, _: &[ComputationalCell], _: f64) -> (Vec<usize>, Vec<f64>) {
        (0..tess.point_count()).map(|i| (i, i as f64)).unzip()
    }

    fn simulation() -> Simulation {
        let boundary = OuterBoundary::rigid(Vector2d::new(0.0, 0.0), Vector2d::new(1.0, 1.0));
        let mesh = VoronoiMesh::new(perturbed_grid(4, 0.2), boundary.clone()).unwrap();
        let cells = vec![ComputationalCell::new(1.0, 1.0, Vector2d::default()); 16];
        Simulation::new(Box::new(mesh), boundary, cells, Box::new(IdealGas::new(1.4))).unwrap()
    }

    #[test]
    fn simulation_sizes_the_conserved_array() {
        let sim = simulation();
        assert_eq!(sim.extensives.len(), 16);
        assert!((sim.total_extensive().mass - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_arrays_are_rejected() {
        let sim = simulation();
        let result = validate_lengths(sim.tess.as_ref(), &sim.cells[1..], &sim.extensives);
        assert!(matches!(result, Err(Error::LengthMismatch { points: 16, cells: 15, extensives: 16 })));
    }

    #[test]
    fn refinement_lists_new_points_and_their_neighbors() {
        let mut sim = simulation();
        let p = sim.tess.mesh_point(5) + Vector2d::new(0.03, 0.0);
        let placement = Placement { new_points: vec![(5, p)], moved: vec![] };
        let refinement = refine_mesh(sim.tess.as_mut(), &placement).unwrap();

        assert_eq!(refinement.old_count, 16);
        assert_eq!(refinement.parents, vec![5]);
        assert!(refinement.affected.contains(&5));
        assert!(refinement.affected.contains(&16));
        assert!(sim.tess.real_neighbors(16).iter().all(|n| refinement.affected.contains(n)));
    }

    #[test]
    fn removal_maps_neighbors_to_new_indices() {
        let mut sim = simulation();
        let before: Vec<Vector2d> = sim.tess.real_neighbors(5).iter().map(|&n| sim.tess.mesh_point(n)).collect();
        let removal = remove_from_mesh(sim.tess.as_mut(), &[5]).unwrap();
        let after: Vec<Vector2d> = removal.neighbors[0].iter().map(|&n| sim.tess.mesh_point(n)).collect();

        assert_eq!(sim.tess.point_count(), 15);
        assert_eq!(before, after);
        assert_eq!(removal.remap[5], None);
    }

    #[test]
    fn removal_stops_at_the_minimum_point_count() {
        let mut sim = simulation();
        let config = AmrConfig { min_point_count: 6, ..AmrConfig::default() };
        let amr = NonConservativeAmr::new(refine_nothing, remove_everything).with_config(&config);

        for _ in 0..16 {
            amr.step(&mut sim).unwrap();
            assert!(sim.tess.point_count() >= config.min_point_count);
            assert_eq!(sim.cells.len(), sim.tess.point_count());
            assert_eq!(sim.extensives.len(), sim.tess.point_count());
        }
        assert_eq!(sim.tess.point_count(), config.min_point_count);
    }

    #[test]
    fn truncated_removal_keeps_the_highest_merits() {
        let sim = simulation();
        let corners = |_: &dyn Tessellation, _: &[ComputationalCell], _: f64| (vec![0, 3, 12, 15], vec![0.1, 0.4, 0.3, 0.2]);
        let mut policy = AmrPolicy::new(Box::new(refine_nothing), Box::new(corners));
        policy.configure(&AmrConfig { min_point_count: 14, ..AmrConfig::default() });

        assert_eq!(policy.removal_candidates(sim.tess.as_ref(), &sim.cells, 0.0), vec![3, 12]);
    }
}
