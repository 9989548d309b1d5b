use crate::geometry::Vector2d;
use crate::geometry::polygon;
use crate::hydro::Extensive;
use crate::tessellation::{OuterBoundary, Tessellation};




/// Overlaps smaller than this fraction of the donor area are ignored.
const NEGLIGIBLE_OVERLAP: f64 = 1e-14;




/**
 * The common area of two cells and its centroid, in the coordinates of the
 * first cell.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Overlap {
    pub area: f64,
    pub centroid: Vector2d,
}




/**
 * Conserved content moving from one cell to another
 */
#[derive(Clone, Debug)]
pub struct Transfer {
    pub from: usize,
    pub to: usize,
    pub amount: Extensive,
}




// ============================================================================
/**
 * Intersect an old cell polygon with a new one, summing over the periodic
 * images of the new polygon given by `shifts`. Returns `None` if the cells
 * do not overlap.
 */
pub fn overlap(donor: &[Vector2d], receiver: &[Vector2d], shifts: &[Vector2d]) -> Option<Overlap> {
    let donor_area = polygon::area(donor);
    let donor_box = polygon::bounding_box(donor);
    let (lo, hi) = polygon::bounding_box(receiver);

    let mut area = 0.0;
    let mut moment = Vector2d::default();

    for &shift in shifts {
        if !polygon::boxes_overlap(donor_box, (lo + shift, hi + shift)) {
            continue;
        }
        let image: Vec<Vector2d> = receiver.iter().map(|&v| v + shift).collect();
        let piece = polygon::intersect_convex(donor, &image);

        if let Some(c) = polygon::centroid(&piece) {
            let a = polygon::area(&piece);
            area += a;
            moment += c * a;
        }
    }

    if area > NEGLIGIBLE_OVERLAP * donor_area {
        Some(Overlap { area, centroid: moment / area })
    } else {
        None
    }
}

/**
 * Apply a list of transfers. Each one is subtracted from its source and
 * added to its destination, so the total is unchanged.
 */
pub fn exchange(extensives: &mut [Extensive], transfers: &[Transfer]) {
    for t in transfers {
        extensives[t.to] += &t.amount;
        extensives[t.from] -= &t.amount;
    }
}

/**
 * Split the content of a removed cell among the cells that take over its
 * area, in proportion to the area each one takes. Returns `None` if none of
 * them overlaps the removed cell.
 */
pub fn split_by_overlap(
    amount: &Extensive,
    removed_polygon: &[Vector2d],
    receivers: &[usize],
    tess: &dyn Tessellation,
    boundary: &OuterBoundary,
) -> Option<Vec<(usize, Extensive)>> {
    let shifts = boundary.periodic_shifts();
    let weights: Vec<(usize, f64)> = receivers
        .iter()
        .filter_map(|&a| overlap(removed_polygon, &tess.cell_vertices(a), &shifts).map(|o| (a, o.area)))
        .collect();
    let total: f64 = weights.iter().map(|w| w.1).sum();

    if total > 0.0 {
        Some(weights.into_iter().map(|(a, w)| (a, amount.clone() * (w / total))).collect())
    } else {
        None
    }
}

/**
 * The point among `candidates` (or among all points, if there are none)
 * nearest to `p`.
 */
pub fn nearest_point(tess: &dyn Tessellation, boundary: &OuterBoundary, p: Vector2d, candidates: &[usize]) -> Option<usize> {
    let all: Vec<usize>;
    let pool = if candidates.is_empty() {
        all = (0..tess.point_count()).collect();
        &all
    } else {
        candidates
    };
    pool.iter()
        .copied()
        .min_by(|&a, &b| {
            let da = boundary.min_image_distance(tess.mesh_point(a), p);
            let db = boundary.min_image_distance(tess.mesh_point(b), p);
            da.total_cmp(&db)
        })
}
