use crate::error::Error;
use crate::hydro::{self, ComputationalCell, EquationOfState, Extensive};




/**
 * Recovers a cell's primitive state after the AMR has changed its conserved
 * content or its volume.
 */
pub trait AmrCellUpdater: Send + Sync {
    /// `old_cell` supplies any field that cannot be derived from the
    /// extensive alone.
    fn extensive_to_primitive(
        &self,
        extensive: &Extensive,
        eos: &dyn EquationOfState,
        volume: f64,
        old_cell: &ComputationalCell,
    ) -> Result<ComputationalCell, Error>;
}

/**
 * Computes the conserved content of a cell (or a piece of one) from its
 * primitive state.
 */
pub trait AmrExtensiveUpdater: Send + Sync {
    fn primitive_to_extensive(&self, cell: &ComputationalCell, eos: &dyn EquationOfState, volume: f64) -> Extensive;
}




/// Plain conversion through the equation of state.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleAmrCellUpdater;

/// Plain conversion through the equation of state.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleAmrExtensiveUpdater;




// ============================================================================
impl AmrCellUpdater for SimpleAmrCellUpdater {
    fn extensive_to_primitive(
        &self,
        extensive: &Extensive,
        eos: &dyn EquationOfState,
        volume: f64,
        old_cell: &ComputationalCell,
    ) -> Result<ComputationalCell, Error> {
        hydro::conserved_to_primitive(extensive, eos, volume, old_cell)
    }
}

impl AmrExtensiveUpdater for SimpleAmrExtensiveUpdater {
    fn primitive_to_extensive(&self, cell: &ComputationalCell, eos: &dyn EquationOfState, volume: f64) -> Extensive {
        hydro::primitive_to_conserved(cell, eos, volume)
    }
}
