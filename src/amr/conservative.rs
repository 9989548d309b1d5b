use log::{debug, info, warn};
use crate::error::Error;
use crate::geometry::Vector2d;
use crate::ghost::{GhostPointGenerator, RigidWallGenerator};
use crate::hydro::{ComputationalCell, EquationOfState, Extensive};
use crate::tessellation::{compact, OuterBoundary, ProcessHull, Tessellation};
use super::config::AmrConfig;
use super::interpolation::LinearReconstruction;
use super::placement::NewPointPlacer;
use super::redistribution::{self, Transfer};
use super::selector::{CellsToRefine, CellsToRemove};
use super::updater::{AmrCellUpdater, AmrExtensiveUpdater, SimpleAmrCellUpdater, SimpleAmrExtensiveUpdater};
use super::{refine_mesh, remove_from_mesh, validate_lengths, Amr, AmrPolicy};




#[derive(Clone, Copy, Debug, PartialEq, Eq)]

/**
 * How the content of an old cell is apportioned among the new cells that
 * cover it after a split
 */
pub enum SplitScheme {
    /// Integrate a limited linear reconstruction over each overlap.
    Linear,
    /// Share by overlap area alone.
    PiecewiseConstant,
}




/**
 * AMR which conserves the total mass, momentum, energy, and tracer mass.
 * New and reshaped cells get their conserved content by transfer from the
 * old cells they overlap; a removed cell's content goes to the cells that
 * take over its area.
 */
pub struct ConservativeAmr {
    policy: AmrPolicy,
    cell_updater: Box<dyn AmrCellUpdater>,
    extensive_updater: Box<dyn AmrExtensiveUpdater>,
    ghosts: Box<dyn GhostPointGenerator>,
    scheme: SplitScheme,
}




/**
 * Conservative AMR using the older volume-fraction split in place of the
 * linear reconstruction
 */
pub struct ConservativeAmrOld {
    inner: ConservativeAmr,
}




// ============================================================================
impl ConservativeAmr {

    pub fn new<R, D>(refine: R, remove: D) -> Self
    where
        R: CellsToRefine + 'static,
        D: CellsToRemove + 'static,
    {
        Self {
            policy: AmrPolicy::new(Box::new(refine), Box::new(remove)),
            cell_updater: Box::new(SimpleAmrCellUpdater),
            extensive_updater: Box::new(SimpleAmrExtensiveUpdater),
            ghosts: Box::new(RigidWallGenerator),
            scheme: SplitScheme::Linear,
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

    pub fn with_cell_updater<U: AmrCellUpdater + 'static>(mut self, updater: U) -> Self {
        self.cell_updater = Box::new(updater);
        self
    }

    pub fn with_extensive_updater<U: AmrExtensiveUpdater + 'static>(mut self, updater: U) -> Self {
        self.extensive_updater = Box::new(updater);
        self
    }

    /// Set the ghost states used when reconstructing next to the boundary.
    pub fn with_ghost_generator<G: GhostPointGenerator + 'static>(mut self, ghosts: G) -> Self {
        self.ghosts = Box::new(ghosts);
        self
    }

    pub fn with_split_scheme(mut self, scheme: SplitScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /**
     * The transfers out of old cell `m` into each new cell it overlaps.
     * With linear reconstruction, each portion is the reconstructed state at
     * the overlap centroid times the overlap area; if that would leave the
     * donor unphysical the volume-fraction split is used instead.
     */
    #[allow(clippy::too_many_arguments)]
    fn donor_transfers(
        &self,
        m: usize,
        overlaps: &[(usize, redistribution::Overlap)],
        old_volume: f64,
        cells: &[ComputationalCell],
        extensives: &[Extensive],
        reconstruction: Option<&LinearReconstruction>,
        eos: &dyn EquationOfState,
    ) -> (Vec<Transfer>, bool) {
        let fraction = |k: usize, area: f64| Transfer {
            from: m,
            to: k,
            amount: extensives[m].clone() * (area / old_volume),
        };

        if let Some(reconstruction) = reconstruction {
            let linear: Vec<Transfer> = overlaps
                .iter()
                .map(|&(k, o)| Transfer {
                    from: m,
                    to: k,
                    amount: self.extensive_updater.primitive_to_extensive(
                        &reconstruction.evaluate(cells, m, o.centroid),
                        eos,
                        o.area,
                    ),
                })
                .collect();

            let mut remainder = extensives[m].clone();
            for t in &linear {
                remainder -= &t.amount;
            }
            if remainder.is_physical() && linear.iter().all(|t| t.amount.is_physical()) {
                return (linear, false);
            }
        }
        let flat = overlaps.iter().map(|&(k, o)| fraction(k, o.area)).collect();
        (flat, reconstruction.is_some())
    }
}

impl Amr for ConservativeAmr {

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

        let old_polygons: Vec<Vec<Vector2d>> = (0..tess.point_count()).map(|i| tess.cell_vertices(i)).collect();
        let old_volumes: Vec<f64> = (0..tess.point_count()).map(|i| tess.volume(i)).collect();
        let reconstruction = match self.scheme {
            SplitScheme::Linear => Some(LinearReconstruction::new(tess, cells, &self.ghosts.ghost_states(tess, cells, time))),
            SplitScheme::PiecewiseConstant => None,
        };

        let refinement = refine_mesh(tess, &placement)?;

        for &parent in &refinement.parents {
            cells.push(cells[parent].clone());
            extensives.push(extensives[parent].zero_like());
        }

        let shifts = boundary.periodic_shifts();
        let new_polygons: Vec<(usize, Vec<Vector2d>)> = refinement.affected
            .iter()
            .map(|&k| (k, tess.cell_vertices(k)))
            .collect();

        let mut transfers = Vec::new();
        let mut fallbacks = 0;

        for &m in refinement.affected.iter().filter(|&&m| m < refinement.old_count) {
            let overlaps: Vec<_> = new_polygons
                .iter()
                .filter(|(k, _)| *k != m)
                .filter_map(|(k, polygon)| redistribution::overlap(&old_polygons[m], polygon, &shifts).map(|o| (*k, o)))
                .collect();

            let (donated, fell_back) = self.donor_transfers(
                m,
                &overlaps,
                old_volumes[m],
                cells,
                extensives,
                reconstruction.as_ref(),
                eos,
            );
            if fell_back {
                fallbacks += 1;
            }
            transfers.extend(donated);
        }
        if fallbacks > 0 {
            debug!("{} donor cells fell back to the volume-fraction split", fallbacks);
        }

        redistribution::exchange(extensives, &transfers);

        for &k in &refinement.affected {
            cells[k] = self.cell_updater.extensive_to_primitive(&extensives[k], eos, tess.volume(k), &cells[k])?;
        }
        info!(
            "refined {} cells ({} points moved, {} cells updated)",
            refinement.parents.len(),
            placement.moved.len(),
            refinement.affected.len()
        );
        Ok(())
    }

    fn remove(
        &self,
        tess: &mut dyn Tessellation,
        boundary: &OuterBoundary,
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

        let old: Vec<(Vec<Vector2d>, Vector2d)> = candidates
            .iter()
            .map(|&r| (tess.cell_vertices(r), tess.mesh_point(r)))
            .collect();

        let removal = remove_from_mesh(tess, &candidates)?;
        let donated: Vec<Extensive> = removal.removed.iter().map(|&r| extensives[r].clone()).collect();

        compact(extensives, &removal.remap);
        compact(cells, &removal.remap);

        for (j, amount) in donated.iter().enumerate() {
            let (polygon, position) = &old[j];
            let receivers = &removal.neighbors[j];

            match redistribution::split_by_overlap(amount, polygon, receivers, tess, boundary) {
                Some(parts) => {
                    for (a, part) in parts {
                        extensives[a] += &part;
                    }
                }
                None => match redistribution::nearest_point(tess, boundary, *position, receivers) {
                    Some(a) => {
                        warn!("removed cell at {:?} overlaps no neighbor; merging into nearest point {}", position, a);
                        extensives[a] += amount;
                    }
                    None => warn!("removed cell at {:?} has no surviving point to merge into", position),
                },
            }
        }

        for &a in &removal.affected {
            cells[a] = self.cell_updater.extensive_to_primitive(&extensives[a], eos, tess.volume(a), &cells[a])?;
        }
        info!("removed {} cells ({} cells updated)", removal.removed.len(), removal.affected.len());
        Ok(())
    }
}




// ============================================================================
impl ConservativeAmrOld {

    pub fn new<R, D>(refine: R, remove: D) -> Self
    where
        R: CellsToRefine + 'static,
        D: CellsToRemove + 'static,
    {
        Self {
            inner: ConservativeAmr::new(refine, remove).with_split_scheme(SplitScheme::PiecewiseConstant),
        }
    }

    pub fn with_config(self, config: &AmrConfig) -> Self {
        Self { inner: self.inner.with_config(config) }
    }

    pub fn with_placement(self, placer: NewPointPlacer) -> Self {
        Self { inner: self.inner.with_placement(placer) }
    }

    pub fn with_process_hull(self, hull: ProcessHull) -> Self {
        Self { inner: self.inner.with_process_hull(hull) }
    }

    pub fn with_cell_updater<U: AmrCellUpdater + 'static>(self, updater: U) -> Self {
        Self { inner: self.inner.with_cell_updater(updater) }
    }

    pub fn with_extensive_updater<U: AmrExtensiveUpdater + 'static>(self, updater: U) -> Self {
        Self { inner: self.inner.with_extensive_updater(updater) }
    }
}

impl Amr for ConservativeAmrOld {

    fn refine(
        &self,
        tess: &mut dyn Tessellation,
        boundary: &OuterBoundary,
        cells: &mut Vec<ComputationalCell>,
        eos: &dyn EquationOfState,
        extensives: &mut Vec<Extensive>,
        time: f64,
    ) -> Result<(), Error> {
        self.inner.refine(tess, boundary, cells, eos, extensives, time)
    }

    fn remove(
        &self,
        tess: &mut dyn Tessellation,
        boundary: &OuterBoundary,
        cells: &mut Vec<ComputationalCell>,
        extensives: &mut Vec<Extensive>,
        eos: &dyn EquationOfState,
        time: f64,
    ) -> Result<(), Error> {
        self.inner.remove(tess, boundary, cells, extensives, eos, time)
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::amr::{total_extensive, Simulation, PlacementScheme};
    use crate::hydro::{self, IdealGas};
    use crate::tessellation::VoronoiMesh;
    use crate::tessellation::voronoi::test::perturbed_grid;
    use approx::assert_relative_eq;

    fn refine_center(_: &dyn Tessellation, _: &[ComputationalCell], _: f64) -> Vec<usize> {
        vec![12]
    }

    fn refine_nothing(_: &dyn Tessellation, _: &[ComputationalCell], _: f64) -> Vec<usize> {
        vec![]
    }

    fn remove_nothing(_: &dyn Tessellation, _: &[ComputationalCell], _: f64) -> (Vec<usize>, Vec<f64>) {
        (vec![], vec![])
    }

    fn remove_corner(_: &dyn Tessellation, _: &[ComputationalCell], _: f64) -> (Vec<usize>, Vec<f64>) {
        (vec![0], vec![1.0])
    }

    fn simulation(boundary: OuterBoundary) -> Simulation {
        let mesh = VoronoiMesh::new(perturbed_grid(5, 0.3), boundary.clone()).unwrap();
        let cells = (0..mesh.point_count())
            .map(|i| {
                let p = mesh.mesh_point(i);
                ComputationalCell::new(1.0 + p.x, 1.0 + 2.0 * p.y, Vector2d::new(p.y, -p.x)).with_tracer("ye", p.x * p.y)
            })
            .collect();
        Simulation::new(Box::new(mesh), boundary, cells, Box::new(IdealGas::new(5.0 / 3.0))).unwrap()
    }

    fn unit_box() -> OuterBoundary {
        OuterBoundary::rigid(Vector2d::new(0.0, 0.0), Vector2d::new(1.0, 1.0))
    }

    fn assert_conserved(before: &Extensive, after: &Extensive) {
        assert_relative_eq!(before.mass, after.mass, max_relative = 1e-10);
        assert_relative_eq!(before.energy, after.energy, max_relative = 1e-10);
        assert_relative_eq!(before.momentum.x, after.momentum.x, epsilon = 1e-12);
        assert_relative_eq!(before.momentum.y, after.momentum.y, epsilon = 1e-12);
        assert_relative_eq!(before.tracers["ye"], after.tracers["ye"], max_relative = 1e-10);
    }

    fn assert_consistent(sim: &Simulation) {
        for i in 0..sim.tess.point_count() {
            let u = hydro::primitive_to_conserved(&sim.cells[i], sim.eos.as_ref(), sim.tess.volume(i));
            assert_relative_eq!(u.mass, sim.extensives[i].mass, max_relative = 1e-9);
            assert_relative_eq!(u.energy, sim.extensives[i].energy, max_relative = 1e-9);
        }
    }

    #[test]
    fn linear_split_conserves_totals() {
        let mut sim = simulation(unit_box());
        let before = sim.total_extensive();
        let amr = ConservativeAmr::new(refine_center, remove_nothing);

        amr.step(&mut sim).unwrap();

        assert_eq!(sim.tess.point_count(), 26);
        assert_eq!(sim.cells.len(), 26);
        assert_conserved(&before, &sim.total_extensive());
        assert_consistent(&sim);
    }

    #[test]
    fn arepo_split_on_a_periodic_mesh_conserves_totals() {
        let boundary = OuterBoundary::periodic(Vector2d::new(0.0, 0.0), Vector2d::new(1.0, 1.0));
        let mut sim = simulation(boundary);
        let before = sim.total_extensive();
        let config = AmrConfig { placement: PlacementScheme::Arepo, ..AmrConfig::default() };
        let amr = ConservativeAmr::new(refine_center, remove_corner).with_config(&config);

        amr.step(&mut sim).unwrap();

        assert_eq!(sim.tess.point_count(), 25);
        assert_conserved(&before, &sim.total_extensive());
        assert_consistent(&sim);
    }

    #[test]
    fn removed_content_goes_to_the_neighbors() {
        let mut sim = simulation(unit_box());
        let removed_mass = sim.extensives[0].mass;
        let neighbors = sim.tess.real_neighbors(0);
        let neighbor_mass: f64 = neighbors.iter().map(|&n| sim.extensives[n].mass).sum();
        let amr = ConservativeAmrOld::new(refine_nothing, remove_corner);

        amr.step(&mut sim).unwrap();

        let after: f64 = neighbors.iter().map(|&n| sim.extensives[n - 1].mass).sum();
        assert_eq!(sim.tess.point_count(), 24);
        assert_relative_eq!(after, neighbor_mass + removed_mass, max_relative = 1e-12);
        assert_consistent(&sim);
    }

    #[test]
    fn hull_blocks_removal_near_its_edge() {
        let mut sim = simulation(unit_box());
        let hull = ProcessHull::new(vec![
            Vector2d::new(0.0, 0.0),
            Vector2d::new(1.0, 0.0),
            Vector2d::new(1.0, 1.0),
            Vector2d::new(0.0, 1.0),
        ]);
        let amr = ConservativeAmr::new(refine_nothing, remove_corner).with_process_hull(hull);
        amr.step(&mut sim).unwrap();
        assert_eq!(sim.tess.point_count(), 25);
    }

    #[test]
    fn totals_helper_sums_every_cell() {
        let sim = simulation(unit_box());
        assert_eq!(total_extensive(&sim.extensives).mass, sim.total_extensive().mass);
    }
}
