use std::collections::BTreeSet;
use crate::hydro::{ComputationalCell, Field};
use crate::tessellation::Tessellation;




/// A trait for a policy that picks the cells to split on this step.
///
pub trait CellsToRefine: Send + Sync {
    fn to_refine(&self, tess: &dyn Tessellation, cells: &[ComputationalCell], time: f64) -> Vec<usize>;
}

/// A trait for a policy that picks the cells to merge away on this step. The
/// second vector holds one merit per candidate; when two candidates are
/// neighbors only the one with the higher merit is removed.
///
pub trait CellsToRemove: Send + Sync {
    fn to_remove(&self, tess: &dyn Tessellation, cells: &[ComputationalCell], time: f64) -> (Vec<usize>, Vec<f64>);
}




impl<F> CellsToRefine for F
where
    F: Fn(&dyn Tessellation, &[ComputationalCell], f64) -> Vec<usize> + Send + Sync,
{
    fn to_refine(&self, tess: &dyn Tessellation, cells: &[ComputationalCell], time: f64) -> Vec<usize> {
        self(tess, cells, time)
    }
}

impl<F> CellsToRemove for F
where
    F: Fn(&dyn Tessellation, &[ComputationalCell], f64) -> (Vec<usize>, Vec<f64>) + Send + Sync,
{
    fn to_remove(&self, tess: &dyn Tessellation, cells: &[ComputationalCell], time: f64) -> (Vec<usize>, Vec<f64>) {
        self(tess, cells, time)
    }
}




#[derive(Clone, Debug)]

/**
 * Refine every cell where `field` exceeds `threshold`, as long as the cell
 * is larger than `min_volume`.
 */
pub struct ThresholdRefine {
    pub field: Field,
    pub threshold: f64,
    pub min_volume: f64,
}




#[derive(Clone, Debug)]

/**
 * Remove every cell where `field` is below `threshold` and the cell is
 * smaller than `max_volume`. Cells further below the threshold have higher
 * merit.
 */
pub struct ThresholdRemove {
    pub field: Field,
    pub threshold: f64,
    pub max_volume: f64,
}




// ============================================================================
impl CellsToRefine for ThresholdRefine {
    fn to_refine(&self, tess: &dyn Tessellation, cells: &[ComputationalCell], _time: f64) -> Vec<usize> {
        (0..tess.point_count())
            .filter(|&i| cells[i].get(&self.field) > self.threshold && tess.volume(i) > self.min_volume)
            .collect()
    }
}

impl CellsToRemove for ThresholdRemove {
    fn to_remove(&self, tess: &dyn Tessellation, cells: &[ComputationalCell], _time: f64) -> (Vec<usize>, Vec<f64>) {
        (0..tess.point_count())
            .filter(|&i| cells[i].get(&self.field) < self.threshold && tess.volume(i) < self.max_volume)
            .map(|i| (i, self.threshold - cells[i].get(&self.field)))
            .unzip()
    }
}




// ============================================================================
/**
 * Choose a subset of removal candidates in which no two are neighbors.
 * Candidates are taken greedily in order of descending merit (ties go to the
 * lower index), and a candidate is skipped if a neighbor was already taken.
 * The accepted candidates are returned in the order they were taken.
 */
pub fn resolve_conflicts(tess: &dyn Tessellation, candidates: &[usize], merits: &[f64]) -> Vec<usize> {
    let mut order: Vec<(usize, f64)> = candidates
        .iter()
        .copied()
        .zip(merits.iter().copied().chain(std::iter::repeat(0.0)))
        .collect();

    order.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut accepted = Vec::new();
    let mut taken = BTreeSet::new();

    for (candidate, _) in order {
        if taken.contains(&candidate) {
            continue;
        }
        if tess.real_neighbors(candidate).iter().any(|n| taken.contains(n)) {
            continue;
        }
        taken.insert(candidate);
        accepted.push(candidate);
    }
    accepted
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::geometry::Vector2d;
    use crate::tessellation::{OuterBoundary, VoronoiMesh};
    use crate::tessellation::voronoi::test::perturbed_grid;

    fn mesh() -> VoronoiMesh {
        let boundary = OuterBoundary::rigid(Vector2d::new(0.0, 0.0), Vector2d::new(1.0, 1.0));
        VoronoiMesh::new(perturbed_grid(3, 0.0), boundary).unwrap()
    }

    fn cells(tess: &dyn Tessellation) -> Vec<ComputationalCell> {
        (0..tess.point_count())
            .map(|i| ComputationalCell::new(1.0 + i as f64, 1.0, Vector2d::default()))
            .collect()
    }

    #[test]
    fn higher_merit_wins_a_conflict() {
        let mesh = mesh();
        assert!(mesh.real_neighbors(4).contains(&5));
        assert_eq!(resolve_conflicts(&mesh, &[4, 5], &[0.3, 0.7]), vec![5]);
        assert_eq!(resolve_conflicts(&mesh, &[4, 5], &[0.7, 0.3]), vec![4]);
    }

    #[test]
    fn separated_candidates_are_all_kept() {
        let mesh = mesh();
        let mut accepted = resolve_conflicts(&mesh, &[0, 8, 2], &[0.1, 0.2, 0.3]);
        accepted.sort_unstable();
        assert_eq!(accepted, vec![0, 2, 8]);
    }

    #[test]
    fn chain_of_conflicts_is_resolved_greedily() {
        let mesh = mesh();
        assert_eq!(resolve_conflicts(&mesh, &[3, 4, 5], &[0.5, 0.6, 0.5]), vec![4]);
        assert_eq!(resolve_conflicts(&mesh, &[3, 4, 5], &[0.5, 0.4, 0.5]), vec![3, 5]);
    }

    #[test]
    fn threshold_selectors_pick_by_field_value() {
        let mesh = mesh();
        let cells = cells(&mesh);

        let refine = ThresholdRefine { field: Field::Density, threshold: 7.5, min_volume: 0.0 };
        assert_eq!(refine.to_refine(&mesh, &cells, 0.0), vec![7, 8]);

        let remove = ThresholdRemove { field: Field::Density, threshold: 2.5, max_volume: 1.0 };
        let (indices, merits) = remove.to_remove(&mesh, &cells, 0.0);
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(merits, vec![1.5, 0.5]);
    }

    #[test]
    fn closures_are_selectors() {
        let mesh = mesh();
        let cells = cells(&mesh);
        let refine = |tess: &dyn Tessellation, _: &[ComputationalCell], _: f64| vec![tess.point_count() - 1];
        assert_eq!(refine.to_refine(&mesh, &cells, 0.0), vec![8]);
    }
}
