use std::collections::BTreeMap;
use rayon::prelude::*;
use crate::geometry::Vector2d;
use crate::hydro::ComputationalCell;
use crate::tessellation::{GhostKind, Tessellation};




/// Determinant below which the least-squares system is treated as singular
/// (relative to the squared cell width).
const SINGULAR_DETERMINANT: f64 = 1e-12;

/// Vertex excursions smaller than this do not engage the limiter.
const LIMITER_TOLERANCE: f64 = 1e-12;




/**
 * A limited, piecewise-linear reconstruction of the primitive fields over
 * the cells of a tessellation. Slopes are stored as a pair of cells holding
 * the x and y derivatives of each field.
 */
pub struct LinearReconstruction {
    centers: Vec<Vector2d>,
    slopes: Vec<(ComputationalCell, ComputationalCell)>,
}




// ============================================================================
impl LinearReconstruction {

    /**
     * Compute slopes for every real cell from its neighbors' states.
     * `ghosts` supplies the state of each ghost point adjacent to the mesh.
     */
    pub fn new(
        tess: &dyn Tessellation,
        cells: &[ComputationalCell],
        ghosts: &BTreeMap<usize, ComputationalCell>,
    ) -> Self {
        let slopes = (0..tess.point_count())
            .into_par_iter()
            .map(|i| limited_slopes(tess, cells, ghosts, i))
            .collect();
        let centers = (0..tess.point_count()).map(|i| tess.cell_cm(i)).collect();
        Self { centers, slopes }
    }

    /// The state of cell `index` extrapolated to the point `at`.
    pub fn evaluate(&self, cells: &[ComputationalCell], index: usize, at: Vector2d) -> ComputationalCell {
        interpolate(&cells[index], &self.slopes[index], self.centers[index], at)
    }
}




// ============================================================================
/**
 * Evaluate the linear profile `cell + slopes . (at - center)` field by
 * field.
 */
pub fn interpolate(
    cell: &ComputationalCell,
    slopes: &(ComputationalCell, ComputationalCell),
    center: Vector2d,
    at: Vector2d,
) -> ComputationalCell {
    let d = at - center;
    let mut result = cell.clone();

    for field in cell.fields() {
        let value = cell.get(&field) + slopes.0.get(&field) * d.x + slopes.1.get(&field) * d.y;
        result.set(&field, value);
    }
    result
}

/**
 * Position standing in for the center of a neighbor of a real cell. Periodic
 * images carry their original's centroid along with the shift; wall mirrors
 * use the mirrored mesh point.
 */
fn neighbor_center(tess: &dyn Tessellation, n: usize) -> Vector2d {
    match tess.ghost_kind(n) {
        None => tess.cell_cm(n),
        Some(GhostKind::Periodic { original }) => {
            tess.cell_cm(original) + (tess.mesh_point(n) - tess.mesh_point(original))
        }
        Some(GhostKind::Reflected { .. }) => tess.mesh_point(n),
    }
}

fn neighbor_state<'a>(
    tess: &dyn Tessellation,
    cells: &'a [ComputationalCell],
    ghosts: &'a BTreeMap<usize, ComputationalCell>,
    n: usize,
) -> &'a ComputationalCell {
    if n < tess.point_count() {
        &cells[n]
    } else {
        ghosts.get(&n).unwrap_or(&cells[tess.original_index(n)])
    }
}

/**
 * Least-squares gradient of every field of cell `index`, limited with the
 * Barth-Jespersen condition: the reconstructed value at each vertex of the
 * cell stays within the range of the cell and its neighbors.
 */
pub fn limited_slopes(
    tess: &dyn Tessellation,
    cells: &[ComputationalCell],
    ghosts: &BTreeMap<usize, ComputationalCell>,
    index: usize,
) -> (ComputationalCell, ComputationalCell) {
    let cell = &cells[index];
    let center = tess.cell_cm(index);
    let neighbors: Vec<(Vector2d, &ComputationalCell)> = tess
        .neighbors(index)
        .into_iter()
        .map(|n| (neighbor_center(tess, n) - center, neighbor_state(tess, cells, ghosts, n)))
        .collect();

    let (mut a11, mut a12, mut a22) = (0.0, 0.0, 0.0);

    for (d, _) in &neighbors {
        a11 += d.x * d.x;
        a12 += d.x * d.y;
        a22 += d.y * d.y;
    }
    let det = a11 * a22 - a12 * a12;
    let width = tess.width(index);

    let mut slope_x = cell.zeroed();
    let mut slope_y = cell.zeroed();

    if !det.is_finite() || det.abs() <= SINGULAR_DETERMINANT * width.powi(4) {
        return (slope_x, slope_y);
    }
    let vertices = tess.cell_vertices(index);

    for field in cell.fields() {
        let f0 = cell.get(&field);
        let (mut b1, mut b2) = (0.0, 0.0);
        let (mut fmin, mut fmax) = (f0, f0);

        for (d, state) in &neighbors {
            let df = state.get(&field) - f0;
            b1 += d.x * df;
            b2 += d.y * df;
            fmin = fmin.min(f0 + df);
            fmax = fmax.max(f0 + df);
        }
        let gx = (a22 * b1 - a12 * b2) / det;
        let gy = (a11 * b2 - a12 * b1) / det;

        let tolerance = LIMITER_TOLERANCE * f0.abs().max(fmax - fmin).max(f64::MIN_POSITIVE);
        let phi = vertices
            .iter()
            .map(|v| {
                let delta = gx * (v.x - center.x) + gy * (v.y - center.y);
                if delta > tolerance {
                    ((fmax - f0) / delta).min(1.0)
                } else if delta < -tolerance {
                    ((fmin - f0) / delta).min(1.0)
                } else {
                    1.0
                }
            })
            .fold(1.0, f64::min);

        slope_x.set(&field, gx * phi);
        slope_y.set(&field, gy * phi);
    }
    (slope_x, slope_y)
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::tessellation::{OuterBoundary, VoronoiMesh};
    use crate::tessellation::voronoi::test::perturbed_grid;
    use approx::assert_relative_eq;

    fn mesh() -> VoronoiMesh {
        let boundary = OuterBoundary::periodic(Vector2d::new(0.0, 0.0), Vector2d::new(1.0, 1.0));
        VoronoiMesh::new(perturbed_grid(5, 0.3), boundary).unwrap()
    }

    #[test]
    fn uniform_state_has_zero_slopes() {
        let mesh = mesh();
        let cells = vec![ComputationalCell::new(1.0, 2.0, Vector2d::new(0.3, 0.1)); mesh.point_count()];
        let ghosts = BTreeMap::new();

        for i in 0..mesh.point_count() {
            let (sx, sy) = limited_slopes(&mesh, &cells, &ghosts, i);
            assert_eq!(sx.density, 0.0);
            assert_eq!(sy.pressure, 0.0);
        }
    }

    #[test]
    fn reconstructed_values_stay_within_neighbor_bounds() {
        let mesh = mesh();
        let cells: Vec<_> = (0..mesh.point_count())
            .map(|i| {
                let p = mesh.cell_cm(i);
                ComputationalCell::new(1.0 + (6.0 * p.x).sin().abs(), 1.0, Vector2d::default())
            })
            .collect();
        let reconstruction = LinearReconstruction::new(&mesh, &cells, &BTreeMap::new());

        for i in 0..mesh.point_count() {
            let neighbors = mesh.real_neighbors(i);
            let lo = neighbors.iter().map(|&n| cells[n].density).fold(cells[i].density, f64::min);
            let hi = neighbors.iter().map(|&n| cells[n].density).fold(cells[i].density, f64::max);

            for v in mesh.cell_vertices(i) {
                let rho = reconstruction.evaluate(&cells, i, v).density;
                assert!(rho >= lo - 1e-10 && rho <= hi + 1e-10);
            }
        }
    }

    #[test]
    fn interpolation_is_linear_in_the_offset() {
        let cell = ComputationalCell::new(1.0, 1.0, Vector2d::default()).with_tracer("ye", 0.5);
        let mut sx = cell.zeroed();
        let mut sy = cell.zeroed();
        sx.density = 2.0;
        sy.set(&crate::hydro::Field::Tracer("ye".into()), -1.0);

        let value = interpolate(&cell, &(sx, sy), Vector2d::new(0.5, 0.5), Vector2d::new(0.75, 0.25));
        assert_relative_eq!(value.density, 1.5);
        assert_relative_eq!(value.tracers["ye"], 0.75);
    }
}
