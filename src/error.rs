use std::error;
use std::fmt;
use std::io;




#[derive(Debug)]

/**
 * Error to represent invalid mesh geometry, unphysical hydrodynamics data
 * produced by a mesh update, or a failed snapshot I/O operation.
 */
pub enum Error {
    DegenerateCell { index: usize, volume: f64 },
    DegeneratePolyhedron(f64),
    NegativeMassDensity(f64),
    NegativeGasPressure(f64),
    CoincidentPoints(usize, usize),
    PointOutsideBoundary(f64, f64),
    UnboundedCell(usize),
    LengthMismatch { points: usize, cells: usize, extensives: usize },
    Io(io::Error),
}




// ============================================================================
impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        use Error::*;

        match self {
            DegenerateCell { index, volume } => write!(fmt, "degenerate cell {} with volume {:e}", index, volume),
            DegeneratePolyhedron(v) => write!(fmt, "polyhedron has no valid centroid (volume {:e})", v),
            NegativeMassDensity(d) => write!(fmt, "negative mass density: {}", d),
            NegativeGasPressure(p) => write!(fmt, "negative gas pressure: {}", p),
            CoincidentPoints(a, b) => write!(fmt, "mesh points {} and {} coincide", a, b),
            PointOutsideBoundary(x, y) => write!(fmt, "mesh point ({}, {}) is outside the outer boundary", x, y),
            UnboundedCell(i) => write!(fmt, "cell {} is not closed by its neighbors", i),
            LengthMismatch { points, cells, extensives } => write!(
                fmt,
                "array lengths disagree: {} points, {} cells, {} extensives",
                points, cells, extensives
            ),
            Io(e) => write!(fmt, "i/o error: {}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
