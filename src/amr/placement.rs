use log::debug;
use crate::geometry::Vector2d;
use crate::tessellation::{OuterBoundary, ProcessHull, Tessellation};
use super::config::{AmrConfig, PlacementScheme};




/**
 * The outcome of placing new points for a set of refined cells. Each new
 * point is paired with the index of the cell it splits. `moved` lists
 * existing points that take a new position as part of the split.
 */
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Placement {
    pub new_points: Vec<(usize, Vector2d)>,
    pub moved: Vec<(usize, Vector2d)>,
}




/**
 * Computes where the new mesh points of refined cells go, dropping any
 * candidate that is outside the domain, too close to an existing point, or
 * too close to the process hull.
 */
#[derive(Clone, Debug)]
pub struct NewPointPlacer {
    scheme: PlacementScheme,
    min_separation: f64,
    split_offset: f64,
}




// ============================================================================
impl Placement {
    pub fn is_empty(&self) -> bool {
        self.new_points.is_empty()
    }
}




// ============================================================================
impl NewPointPlacer {

    pub fn new(scheme: PlacementScheme) -> Self {
        Self::from_config(&AmrConfig { placement: scheme, ..AmrConfig::default() })
    }

    pub fn from_config(config: &AmrConfig) -> Self {
        Self {
            scheme: config.placement,
            min_separation: config.min_separation,
            split_offset: config.split_offset,
        }
    }

    pub fn scheme(&self) -> PlacementScheme {
        self.scheme
    }

    /**
     * Place one new point for each of the given cells. Candidates are
     * processed in order, and later candidates must also keep their distance
     * from points accepted earlier in the same pass.
     */
    pub fn place(
        &self,
        candidates: &[usize],
        tess: &dyn Tessellation,
        boundary: &OuterBoundary,
        hull: Option<&ProcessHull>,
    ) -> Placement {
        let mut placement = Placement::default();
        let mut accepted = Vec::new();

        for &parent in candidates {
            let split = match self.scheme {
                PlacementScheme::FarthestNeighbor => self.split_toward_farthest(parent, tess, boundary, hull, &accepted),
                PlacementScheme::Arepo => self.split_about_centroid(parent, tess, boundary, hull, &accepted),
            };
            if let Some((new_point, moved)) = split {
                accepted.push(new_point);
                placement.new_points.push((parent, new_point));

                if let Some(p) = moved {
                    accepted.push(p);
                    placement.moved.push((parent, p));
                }
            }
        }
        debug!("placed {} of {} refinement candidates", placement.new_points.len(), candidates.len());
        placement
    }

    /**
     * Check a proposed position for a point belonging to the cell `parent`.
     * Returns the position (wrapped into the box if the boundary is periodic)
     * or `None` if it must be rejected. `anchor` is where the parent point
     * itself will be after the split, if that is not the position being
     * checked; `accepted` holds points already placed in this pass.
     */
    #[allow(clippy::too_many_arguments)]
    pub fn accept_candidate(
        &self,
        candidate: Vector2d,
        anchor: Option<Vector2d>,
        parent: usize,
        tess: &dyn Tessellation,
        boundary: &OuterBoundary,
        hull: Option<&ProcessHull>,
        accepted: &[Vector2d],
    ) -> Option<Vector2d> {
        let p = boundary.wrap(candidate);

        if !p.is_finite() || !boundary.contains(p) {
            return None;
        }

        let width = tess.width(parent);
        let min_distance = self.min_separation * width;

        if let Some(hull) = hull {
            if !hull.contains(p) || hull.distance_to_edge(p) < width {
                return None;
            }
        }

        let too_close = |q: Vector2d| boundary.min_image_distance(p, q) < min_distance;

        if anchor.map_or(false, &too_close) {
            return None;
        }
        if tess.neighbors(parent).into_iter().any(|n| too_close(tess.mesh_point(n))) {
            return None;
        }
        if accepted.iter().any(|&q| too_close(q)) {
            return None;
        }
        Some(p)
    }

    fn farthest_neighbor_direction(&self, parent: usize, tess: &dyn Tessellation) -> Option<Vector2d> {
        let p = tess.mesh_point(parent);
        tess.neighbors(parent)
            .into_iter()
            .map(|n| tess.mesh_point(n) - p)
            .max_by(|a, b| a.norm().total_cmp(&b.norm()))
            .and_then(|d| d.normalized())
    }

    fn split_toward_farthest(
        &self,
        parent: usize,
        tess: &dyn Tessellation,
        boundary: &OuterBoundary,
        hull: Option<&ProcessHull>,
        accepted: &[Vector2d],
    ) -> Option<(Vector2d, Option<Vector2d>)> {
        let p = tess.mesh_point(parent);
        let direction = self.farthest_neighbor_direction(parent, tess)?;
        let candidate = p + direction * (self.split_offset * tess.width(parent));
        let new_point = self.accept_candidate(candidate, Some(p), parent, tess, boundary, hull, accepted)?;
        Some((new_point, None))
    }

    /**
     * Put the parent and the new point on opposite sides of the cell
     * centroid, along the line from the centroid to the parent point.
     */
    fn split_about_centroid(
        &self,
        parent: usize,
        tess: &dyn Tessellation,
        boundary: &OuterBoundary,
        hull: Option<&ProcessHull>,
        accepted: &[Vector2d],
    ) -> Option<(Vector2d, Option<Vector2d>)> {
        let p = tess.mesh_point(parent);
        let c = tess.cell_cm(parent);
        let width = tess.width(parent);
        let delta = self.split_offset * width;

        let direction = if p.distance(c) > 1e-9 * width {
            (p - c).normalized()?
        } else {
            -self.farthest_neighbor_direction(parent, tess)?
        };

        let moved = self.accept_candidate(c + direction * delta, None, parent, tess, boundary, hull, accepted)?;
        let new_point = self.accept_candidate(c - direction * delta, Some(moved), parent, tess, boundary, hull, accepted)?;
        Some((new_point, Some(moved)))
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::tessellation::VoronoiMesh;
    use crate::tessellation::voronoi::test::perturbed_grid;

    fn unit_box() -> OuterBoundary {
        OuterBoundary::rigid(Vector2d::new(0.0, 0.0), Vector2d::new(1.0, 1.0))
    }

    #[test]
    fn candidates_outside_the_box_are_rejected() {
        let mesh = VoronoiMesh::new(perturbed_grid(3, 0.2), unit_box()).unwrap();
        let placer = NewPointPlacer::new(PlacementScheme::FarthestNeighbor);
        let anchor = Some(mesh.mesh_point(5));
        let outside = placer.accept_candidate(Vector2d::new(1.2, 0.5), anchor, 5, &mesh, &unit_box(), None, &[]);
        assert_eq!(outside, None);
    }

    #[test]
    fn candidates_near_existing_points_are_rejected() {
        let mesh = VoronoiMesh::new(perturbed_grid(3, 0.0), unit_box()).unwrap();
        let placer = NewPointPlacer::new(PlacementScheme::FarthestNeighbor);
        let anchor = Some(mesh.mesh_point(4));
        let near_neighbor = mesh.mesh_point(5) - Vector2d::new(1e-3, 0.0);
        let fine = mesh.mesh_point(4) + Vector2d::new(0.05, 0.05);

        assert_eq!(placer.accept_candidate(near_neighbor, anchor, 4, &mesh, &unit_box(), None, &[]), None);
        assert_eq!(placer.accept_candidate(fine, anchor, 4, &mesh, &unit_box(), None, &[]), Some(fine));
        assert_eq!(placer.accept_candidate(fine, anchor, 4, &mesh, &unit_box(), None, &[fine]), None);
    }

    #[test]
    fn periodic_candidates_are_wrapped() {
        let boundary = OuterBoundary::periodic(Vector2d::new(0.0, 0.0), Vector2d::new(1.0, 1.0));
        let mesh = VoronoiMesh::new(perturbed_grid(3, 0.0), boundary.clone()).unwrap();
        let placer = NewPointPlacer::new(PlacementScheme::FarthestNeighbor);
        let anchor = Some(mesh.mesh_point(3));
        let wrapped = placer
            .accept_candidate(Vector2d::new(-0.02, 0.5), anchor, 3, &mesh, &boundary, None, &[])
            .unwrap();
        assert!((wrapped.x - 0.98).abs() < 1e-12);
    }

    #[test]
    fn farthest_neighbor_split_stays_inside_the_parent_cell() {
        let mesh = VoronoiMesh::new(perturbed_grid(4, 0.3), unit_box()).unwrap();
        let placer = NewPointPlacer::new(PlacementScheme::FarthestNeighbor);
        let placement = placer.place(&[5, 6], &mesh, &unit_box(), None);

        assert_eq!(placement.new_points.len(), 2);
        assert!(placement.moved.is_empty());

        for (parent, p) in placement.new_points {
            let offset = p.distance(mesh.mesh_point(parent));
            assert!((offset - 0.25 * mesh.width(parent)).abs() < 1e-12);
        }
    }

    #[test]
    fn arepo_split_is_symmetric_about_the_centroid() {
        let mesh = VoronoiMesh::new(perturbed_grid(4, 0.3), unit_box()).unwrap();
        let placer = NewPointPlacer::new(PlacementScheme::Arepo);
        let placement = placer.place(&[5], &mesh, &unit_box(), None);

        assert_eq!(placement.new_points.len(), 1);
        assert_eq!(placement.moved.len(), 1);

        let c = mesh.cell_cm(5);
        let (_, new_point) = placement.new_points[0];
        let (_, moved) = placement.moved[0];
        let midpoint = (new_point + moved) * 0.5;
        assert!(midpoint.distance(c) < 1e-12);
    }

    #[test]
    fn hull_excludes_candidates_near_its_edge() {
        let mesh = VoronoiMesh::new(perturbed_grid(4, 0.0), unit_box()).unwrap();
        let hull = ProcessHull::new(vec![
            Vector2d::new(0.0, 0.0),
            Vector2d::new(0.45, 0.0),
            Vector2d::new(0.45, 1.0),
            Vector2d::new(0.0, 1.0),
        ]);
        let placer = NewPointPlacer::new(PlacementScheme::FarthestNeighbor);
        let placement = placer.place(&[5, 6], &mesh, &unit_box(), Some(&hull));
        assert!(placement.is_empty());
    }
}
