use std::collections::HashMap;
use log::debug;
use rayon::prelude::*;
use crate::error::Error;
use crate::geometry::Vector2d;
use crate::geometry::polygon::{self, LabeledVertex};
use super::{BoundaryKind, Edge, GhostKind, OuterBoundary, Tessellation};




/// Edges shorter than this fraction of the domain size are merged away.
const SHORT_EDGE_FRACTION: f64 = 1e-9;

/// Points closer than this fraction of the domain size are coincident.
const COINCIDENT_FRACTION: f64 = 1e-12;




/**
 * Identifies what produced one edge of a clipped cell: one of the four box
 * walls (bottom, right, top, left), or the bisector with a (possibly
 * shifted) copy of another mesh point.
 */
#[derive(Clone, Copy, Debug, PartialEq)]
enum Label {
    Wall(u8),
    Image { index: usize, shift: Vector2d },
}




/**
 * A Voronoi tessellation of a rectangular box, built by clipping each cell
 * against the bisectors of its nearest sites. Cell construction is
 * independent per point and runs on the rayon pool. The cost is quadratic in
 * the number of points, so this is suited to tests and small problems.
 */
#[derive(Clone, Debug)]
pub struct VoronoiMesh {
    boundary: OuterBoundary,
    points: Vec<Vector2d>,
    real_count: usize,
    ghosts: Vec<GhostKind>,
    edges: Vec<Edge>,
    cell_edges: Vec<Vec<usize>>,
    volumes: Vec<f64>,
    centroids: Vec<Vector2d>,
    polygons: Vec<Vec<Vector2d>>,
}




// ============================================================================
impl VoronoiMesh {

    pub fn new(points: Vec<Vector2d>, boundary: OuterBoundary) -> Result<Self, Error> {
        let mut mesh = Self {
            boundary,
            points: Vec::new(),
            real_count: 0,
            ghosts: Vec::new(),
            edges: Vec::new(),
            cell_edges: Vec::new(),
            volumes: Vec::new(),
            centroids: Vec::new(),
            polygons: Vec::new(),
        };
        mesh.build(points)?;
        Ok(mesh)
    }

    pub fn boundary(&self) -> &OuterBoundary {
        &self.boundary
    }

    fn validate(&self, points: &[Vector2d]) -> Result<(), Error> {
        let tolerance = COINCIDENT_FRACTION * self.boundary.scale();

        for (i, p) in points.iter().enumerate() {
            if !p.is_finite() || !self.boundary.contains(*p) {
                return Err(Error::PointOutsideBoundary(p.x, p.y));
            }
            for (j, q) in points.iter().enumerate().skip(i + 1) {
                if self.boundary.min_image_distance(*p, *q) <= tolerance {
                    return Err(Error::CoincidentPoints(i, j));
                }
            }
        }
        Ok(())
    }

    fn initial_polygon(&self, p: Vector2d) -> Vec<LabeledVertex<Label>> {
        let (lo, hi) = match self.boundary.kind {
            BoundaryKind::Rigid => (self.boundary.lower_left, self.boundary.upper_right),
            BoundaryKind::Periodic => (p - self.boundary.size(), p + self.boundary.size()),
        };
        vec![
            LabeledVertex { position: lo, label: Label::Wall(0) },
            LabeledVertex { position: Vector2d::new(hi.x, lo.y), label: Label::Wall(1) },
            LabeledVertex { position: hi, label: Label::Wall(2) },
            LabeledVertex { position: Vector2d::new(lo.x, hi.y), label: Label::Wall(3) },
        ]
    }

    /**
     * Clip the initial polygon of point `i` by the bisectors of all other
     * sites (and their periodic images), nearest first. Sites farther than
     * twice the current cell radius cannot cut the cell and end the search.
     */
    fn build_cell(&self, points: &[Vector2d], i: usize) -> Result<Vec<LabeledVertex<Label>>, Error> {
        let p = points[i];
        let shifts = self.boundary.periodic_shifts();

        let mut sites: Vec<(f64, Label, Vector2d)> = Vec::with_capacity(points.len() * shifts.len());

        for (j, q) in points.iter().enumerate() {
            for &shift in &shifts {
                if j == i && shift == Vector2d::default() {
                    continue;
                }
                let image = *q + shift;
                sites.push((p.distance(image), Label::Image { index: j, shift }, image));
            }
        }
        sites.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut cell = self.initial_polygon(p);

        for (distance, label, image) in sites {
            let radius = cell
                .iter()
                .map(|v| v.position.distance(p))
                .fold(0.0, f64::max);

            if distance > 2.0 * radius {
                break;
            }
            cell = polygon::clip_labeled(&cell, (p + image) * 0.5, image - p, label);
        }

        let cell = polygon::drop_short_edges(cell, SHORT_EDGE_FRACTION * self.boundary.scale());

        if self.boundary.is_periodic() && cell.iter().any(|v| matches!(v.label, Label::Wall(_))) {
            return Err(Error::UnboundedCell(i));
        }
        Ok(cell)
    }

    /**
     * Mirror image of `p` across one of the box walls, numbered as in
     * `Label::Wall`.
     */
    fn reflect_across_wall(&self, p: Vector2d, side: u8) -> Vector2d {
        let lo = self.boundary.lower_left;
        let hi = self.boundary.upper_right;
        match side {
            0 => Vector2d::new(p.x, 2.0 * lo.y - p.y),
            1 => Vector2d::new(2.0 * hi.x - p.x, p.y),
            2 => Vector2d::new(p.x, 2.0 * hi.y - p.y),
            _ => Vector2d::new(2.0 * lo.x - p.x, p.y),
        }
    }

    fn build(&mut self, points: Vec<Vector2d>) -> Result<(), Error> {
        self.validate(&points)?;

        let cells = (0..points.len())
            .into_par_iter()
            .map(|i| self.build_cell(&points, i))
            .collect::<Result<Vec<_>, Error>>()?;

        let n = points.len();
        let mut all_points = points;
        let mut ghosts = Vec::new();
        let mut edges = Vec::new();
        let mut cell_edges = vec![Vec::new(); n];
        let mut shared: HashMap<(usize, usize), usize> = HashMap::new();
        let mut volumes = Vec::with_capacity(n);
        let mut centroids = Vec::with_capacity(n);
        let mut polygons = Vec::with_capacity(n);

        for (i, cell) in cells.iter().enumerate() {
            let vertices: Vec<Vector2d> = cell.iter().map(|v| v.position).collect();
            let volume = polygon::signed_area(&vertices);

            if !volume.is_finite() || volume <= 0.0 {
                return Err(Error::DegenerateCell { index: i, volume });
            }
            let centroid = polygon::centroid(&vertices).ok_or(Error::DegenerateCell { index: i, volume })?;

            for k in 0..cell.len() {
                let segment = (cell[k].position, cell[(k + 1) % cell.len()].position);

                let edge_index = match cell[k].label {
                    Label::Image { index: j, shift } if shift == Vector2d::default() => {
                        let key = (i.min(j), i.max(j));
                        if let Some(&e) = shared.get(&key) {
                            e
                        } else {
                            edges.push(Edge { vertices: segment, neighbors: (i, j) });
                            shared.insert(key, edges.len() - 1);
                            edges.len() - 1
                        }
                    }
                    Label::Image { index: j, shift } => {
                        all_points.push(all_points[j] + shift);
                        ghosts.push(GhostKind::Periodic { original: j });
                        edges.push(Edge { vertices: segment, neighbors: (i, all_points.len() - 1) });
                        edges.len() - 1
                    }
                    Label::Wall(side) => {
                        all_points.push(self.reflect_across_wall(all_points[i], side));
                        ghosts.push(GhostKind::Reflected { original: i });
                        edges.push(Edge { vertices: segment, neighbors: (i, all_points.len() - 1) });
                        edges.len() - 1
                    }
                };
                cell_edges[i].push(edge_index);
            }
            volumes.push(volume);
            centroids.push(centroid);
            polygons.push(vertices);
        }

        debug!("built voronoi mesh: {} points, {} ghosts, {} edges", n, ghosts.len(), edges.len());

        self.points = all_points;
        self.real_count = n;
        self.ghosts = ghosts;
        self.edges = edges;
        self.cell_edges = cell_edges;
        self.volumes = volumes;
        self.centroids = centroids;
        self.polygons = polygons;
        Ok(())
    }
}




// ============================================================================
impl Tessellation for VoronoiMesh {

    fn point_count(&self) -> usize {
        self.real_count
    }

    fn total_point_count(&self) -> usize {
        self.points.len()
    }

    fn mesh_point(&self, index: usize) -> Vector2d {
        self.points[index]
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn edge(&self, index: usize) -> &Edge {
        &self.edges[index]
    }

    fn cell_edges(&self, index: usize) -> &[usize] {
        &self.cell_edges[index]
    }

    /// Ghost points report the volume of the cell they stand for.
    fn volume(&self, index: usize) -> f64 {
        self.volumes[self.original_index(index)]
    }

    fn cell_cm(&self, index: usize) -> Vector2d {
        self.centroids[index]
    }

    fn cell_vertices(&self, index: usize) -> Vec<Vector2d> {
        self.polygons[index].clone()
    }

    fn ghost_kind(&self, index: usize) -> Option<GhostKind> {
        if index < self.real_count {
            None
        } else {
            self.ghosts.get(index - self.real_count).copied()
        }
    }

    fn update(&mut self, points: Vec<Vector2d>) -> Result<(), Error> {
        self.build(points)
    }
}
