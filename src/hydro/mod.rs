pub mod cell;
pub mod eos;
pub mod extensive;

use crate::error::Error;

pub use cell::{ComputationalCell, Field, TracerMap};
pub use eos::{EquationOfState, IdealGas};
pub use extensive::Extensive;




// ============================================================================
/**
 * Convert the primitive state of a cell of the given volume into its
 * conserved content.
 */
pub fn primitive_to_conserved(cell: &ComputationalCell, eos: &dyn EquationOfState, volume: f64) -> Extensive {
    let mass = cell.density * volume;
    let vsq = cell.velocity.dot(cell.velocity);
    let e = eos.dp2e(cell.density, cell.pressure, &cell.tracers);

    Extensive {
        mass,
        momentum: cell.velocity * mass,
        energy: mass * (0.5 * vsq + e),
        tracers: cell.tracers.iter().map(|(k, t)| (k.clone(), t * mass)).collect(),
    }
}

/**
 * Recover the primitive state of a cell from its conserved content. Tracer
 * concentrations are taken from `old_cell` when they cannot be derived (the
 * extensive carries no such tracer).
 */
pub fn conserved_to_primitive(
    extensive: &Extensive,
    eos: &dyn EquationOfState,
    volume: f64,
    old_cell: &ComputationalCell,
) -> Result<ComputationalCell, Error> {
    let density = extensive.mass / volume;

    if extensive.mass <= 0.0 || volume <= 0.0 || !density.is_finite() {
        return Err(Error::NegativeMassDensity(density));
    }

    let velocity = extensive.momentum / extensive.mass;
    let e = extensive.thermal_energy() / extensive.mass;
    let mut tracers = old_cell.tracers.clone();

    for (name, m) in &extensive.tracers {
        tracers.insert(name.clone(), m / extensive.mass);
    }
    let pressure = eos.de2p(density, e, &tracers);

    if pressure < 0.0 {
        return Err(Error::NegativeGasPressure(pressure));
    }

    Ok(ComputationalCell {
        density,
        pressure,
        velocity,
        tracers,
    })
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::geometry::Vector2d;
    use approx::assert_relative_eq;

    #[test]
    fn primitive_round_trips_through_conserved() {
        let eos = IdealGas::new(1.4);
        let cell = ComputationalCell::new(2.0, 3.0, Vector2d::new(0.5, -1.0)).with_tracer("ye", 0.3);
        let u = primitive_to_conserved(&cell, &eos, 0.25);
        assert_relative_eq!(u.mass, 0.5);
        assert_relative_eq!(u.tracers["ye"], 0.15);

        let p = conserved_to_primitive(&u, &eos, 0.25, &ComputationalCell::default()).unwrap();
        assert_relative_eq!(p.density, 2.0, epsilon = 1e-12);
        assert_relative_eq!(p.pressure, 3.0, epsilon = 1e-12);
        assert_relative_eq!(p.velocity.y, -1.0, epsilon = 1e-12);
        assert_relative_eq!(p.tracers["ye"], 0.3, epsilon = 1e-12);
    }

    #[test]
    fn underivable_tracers_come_from_the_old_cell() {
        let eos = IdealGas::new(1.4);
        let old = ComputationalCell::new(1.0, 1.0, Vector2d::default()).with_tracer("metal", 0.02);
        let u = primitive_to_conserved(&ComputationalCell::new(1.0, 1.0, Vector2d::default()), &eos, 1.0);
        let p = conserved_to_primitive(&u, &eos, 1.0, &old).unwrap();
        assert_eq!(p.tracers.get("metal"), Some(&0.02));
    }

    #[test]
    fn massless_content_is_rejected() {
        let eos = IdealGas::new(1.4);
        let u = Extensive::default();
        assert!(matches!(
            conserved_to_primitive(&u, &eos, 1.0, &ComputationalCell::default()),
            Err(Error::NegativeMassDensity(_))
        ));
    }
}
