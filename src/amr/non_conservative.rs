use log::info;
use crate::error::Error;
use crate::hydro::{ComputationalCell, EquationOfState, Extensive};
use crate::tessellation::{compact, OuterBoundary, ProcessHull, Tessellation};
use super::config::AmrConfig;
use super::placement::NewPointPlacer;
use super::selector::{CellsToRefine, CellsToRemove};
use super::updater::{AmrExtensiveUpdater, SimpleAmrExtensiveUpdater};
use super::{refine_mesh, remove_from_mesh, validate_lengths, Amr, AmrPolicy};




/**
 * AMR which keeps the primitive state fixed and recomputes the conserved
 * content of every reshaped cell from it. A new cell starts with its
 * parent's primitive state; a removed cell's content is discarded. Totals
 * are not conserved.
 */
pub struct NonConservativeAmr {
    policy: AmrPolicy,
    extensive_updater: Box<dyn AmrExtensiveUpdater>,
}




// ============================================================================
impl NonConservativeAmr {

    pub fn new<R, D>(refine: R, remove: D) -> Self
    where
        R: CellsToRefine + 'static,
        D: CellsToRemove + 'static,
    {
        Self {
            policy: AmrPolicy::new(Box::new(refine), Box::new(remove)),
            extensive_updater: Box::new(SimpleAmrExtensiveUpdater),
        }
    }

    pub fn with_config(mut self, config: &AmrConfig) -> Self {
        self.policy.configure(config);
        self
    }

    pub fn with_placement(mut self, placer: NewPointPlacer) -> Self {
        self.policy.placer = placer;
        self
    }

    pub fn with_process_hull(mut self, hull: ProcessHull) -> Self {
        self.policy.hull = Some(hull);
        self
    }

    pub fn with_extensive_updater<U: AmrExtensiveUpdater + 'static>(mut self, updater: U) -> Self {
        self.extensive_updater = Box::new(updater);
        self
    }

    fn recompute(
        &self,
        tess: &dyn Tessellation,
        cells: &[ComputationalCell],
        extensives: &mut [Extensive],
        eos: &dyn EquationOfState,
        indices: &[usize],
    ) {
        for &i in indices {
            extensives[i] = self.extensive_updater.primitive_to_extensive(&cells[i], eos, tess.volume(i));
        }
    }
}

impl Amr for NonConservativeAmr {

    fn refine(
        &self,
        tess: &mut dyn Tessellation,
        boundary: &OuterBoundary,
        cells: &mut Vec<ComputationalCell>,
        eos: &dyn EquationOfState,
        extensives: &mut Vec<Extensive>,
        time: f64,
    ) -> Result<(), Error> {
        validate_lengths(tess, cells, extensives)?;

        let placement = self.policy.placement(tess, boundary, cells, time);

        if placement.is_empty() {
            return Ok(());
        }
        let refinement = refine_mesh(tess, &placement)?;

        for &parent in &refinement.parents {
            cells.push(cells[parent].clone());
            extensives.push(Extensive::default());
        }
        self.recompute(tess, cells, extensives, eos, &refinement.affected);

        info!("refined {} cells ({} cells recomputed)", refinement.parents.len(), refinement.affected.len());
        Ok(())
    }

    fn remove(
        &self,
        tess: &mut dyn Tessellation,
        _boundary: &OuterBoundary,
        cells: &mut Vec<ComputationalCell>,
        extensives: &mut Vec<Extensive>,
        eos: &dyn EquationOfState,
        time: f64,
    ) -> Result<(), Error> {
        validate_lengths(tess, cells, extensives)?;

        let candidates = self.policy.removal_candidates(tess, cells, time);

        if candidates.is_empty() {
            return Ok(());
        }
        let removal = remove_from_mesh(tess, &candidates)?;

        compact(cells, &removal.remap);
        compact(extensives, &removal.remap);
        self.recompute(tess, cells, extensives, eos, &removal.affected);

        info!("removed {} cells ({} cells recomputed)", removal.removed.len(), removal.affected.len());
        Ok(())
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::amr::Simulation;
    use crate::geometry::Vector2d;
    use crate::hydro::{self, IdealGas};
    use crate::tessellation::VoronoiMesh;
    use crate::tessellation::voronoi::test::perturbed_grid;
    use approx::assert_relative_eq;

    fn simulation() -> Simulation {
        let boundary = OuterBoundary::rigid(Vector2d::new(0.0, 0.0), Vector2d::new(1.0, 1.0));
        let mesh = VoronoiMesh::new(perturbed_grid(4, 0.3), boundary.clone()).unwrap();
        let cells = (0..mesh.point_count())
            .map(|i| ComputationalCell::new(1.0 + i as f64, 1.0, Vector2d::new(0.1, 0.0)))
            .collect();
        Simulation::new(Box::new(mesh), boundary, cells, Box::new(IdealGas::new(1.4))).unwrap()
    }

    #[test]
    fn new_cells_copy_the_parent_state() {
        let mut sim = simulation();
        let amr = NonConservativeAmr::new(
            |_: &dyn Tessellation, _: &[ComputationalCell], _: f64| vec![5, 10],
            |_: &dyn Tessellation, _: &[ComputationalCell], _: f64| (vec![0], vec![1.0]),
        );
        let parent_five = sim.cells[5].clone();
        amr.step(&mut sim).unwrap();

        assert_eq!(sim.tess.point_count(), 17);
        assert_eq!(sim.cells.len(), 17);
        assert_eq!(sim.extensives.len(), 17);

        // index 5 became 4, and the first new point (old index 16) became 15
        assert_eq!(sim.cells[4], parent_five);
        assert_eq!(sim.cells[15], parent_five);

        for i in 0..sim.tess.point_count() {
            let u = hydro::primitive_to_conserved(&sim.cells[i], sim.eos.as_ref(), sim.tess.volume(i));
            assert_relative_eq!(u.mass, sim.extensives[i].mass, max_relative = 1e-12);
            assert_relative_eq!(u.energy, sim.extensives[i].energy, max_relative = 1e-12);
        }
    }

    #[test]
    fn removal_discards_content_without_conserving_totals() {
        let mut sim = simulation();
        let before = sim.total_extensive();
        let amr = NonConservativeAmr::new(
            |_: &dyn Tessellation, _: &[ComputationalCell], _: f64| vec![],
            |_: &dyn Tessellation, _: &[ComputationalCell], _: f64| (vec![0], vec![1.0]),
        );
        amr.step(&mut sim).unwrap();

        assert_eq!(sim.tess.point_count(), 15);
        assert!((sim.total_extensive().mass - before.mass).abs() > 1e-3);

        for i in 0..sim.tess.point_count() {
            let u = hydro::primitive_to_conserved(&sim.cells[i], sim.eos.as_ref(), sim.tess.volume(i));
            assert_relative_eq!(u.mass, sim.extensives[i].mass, max_relative = 1e-12);
        }
    }
}
