use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use log::info;
use crate::error::Error;
use crate::geometry::Vector2d;
use super::Tessellation;




/**
 * Writes tessellation snapshots in a flat binary layout of little-endian
 * 32-bit integers and 64-bit floats:
 *
 * - edge count
 * - for each edge, the x coordinates of its two vertices
 * - for each edge, the y coordinates of its two vertices
 * - for each edge, its two neighbor indices
 * - point count
 * - for each point, its x and y coordinates
 * - for each point, the length of its edge list followed by the edge indices
 */
#[derive(Clone, Debug)]
pub struct BinLogger {
    path: PathBuf,
}




// ============================================================================
impl BinLogger {

    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a snapshot of the tessellation to this logger's file.
    pub fn output(&self, tess: &dyn Tessellation) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        Self::write_to(tess, &mut writer)?;
        writer.flush()?;
        info!("write {}", self.path.display());
        Ok(())
    }

    /// Read back the mesh point positions from a snapshot file.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Vec<Vector2d>, Error> {
        let mut reader = BufReader::new(File::open(path)?);
        Ok(Self::read_points_from(&mut reader)?)
    }

    pub fn write_to<W: Write>(tess: &dyn Tessellation, w: &mut W) -> io::Result<()> {
        let edges: Vec<_> = (0..tess.edge_count()).map(|e| tess.edge(e)).collect();

        write_int(w, edges.len())?;

        for edge in &edges {
            write_double(w, edge.vertices.0.x)?;
            write_double(w, edge.vertices.1.x)?;
        }
        for edge in &edges {
            write_double(w, edge.vertices.0.y)?;
            write_double(w, edge.vertices.1.y)?;
        }
        for edge in &edges {
            write_int(w, edge.neighbors.0)?;
            write_int(w, edge.neighbors.1)?;
        }

        write_int(w, tess.point_count())?;

        for i in 0..tess.point_count() {
            let p = tess.mesh_point(i);
            write_double(w, p.x)?;
            write_double(w, p.y)?;
        }
        for i in 0..tess.point_count() {
            let indices = tess.cell_edges(i);
            write_int(w, indices.len())?;
            for &e in indices {
                write_int(w, e)?;
            }
        }
        Ok(())
    }

    /**
     * Read the mesh point positions from a snapshot, skipping over the edge
     * section (four doubles and two integers per edge).
     */
    pub fn read_points_from<R: Read>(r: &mut R) -> io::Result<Vec<Vector2d>> {
        let edge_count = read_count(r)?;
        let edge_bytes = edge_count as u64 * (4 * 8 + 2 * 4);

        if io::copy(&mut r.by_ref().take(edge_bytes), &mut io::sink())? != edge_bytes {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "snapshot edge section is truncated"));
        }

        let point_count = read_count(r)?;
        let mut points = Vec::new();

        for _ in 0..point_count {
            let x = read_double(r)?;
            let y = read_double(r)?;
            points.push(Vector2d::new(x, y));
        }
        Ok(points)
    }
}




// ============================================================================
fn write_int<W: Write>(w: &mut W, value: usize) -> io::Result<()> {
    let value = i32::try_from(value).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    w.write_all(&value.to_le_bytes())
}

fn write_double<W: Write>(w: &mut W, value: f64) -> io::Result<()> {
    w.write_all(&value.to_le_bytes())
}

fn read_count<R: Read>(r: &mut R) -> io::Result<usize> {
    let mut bytes = [0u8; 4];
    r.read_exact(&mut bytes)?;
    usize::try_from(i32::from_le_bytes(bytes)).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn read_double<R: Read>(r: &mut R) -> io::Result<f64> {
    let mut bytes = [0u8; 8];
    r.read_exact(&mut bytes)?;
    Ok(f64::from_le_bytes(bytes))
}
