use super::cell::TracerMap;




/**
 * Closure relation between pressure and specific internal energy. Tracers are
 * passed so that composition-dependent models can be plugged in.
 */
pub trait EquationOfState: Send + Sync {
    /// Specific internal energy from density and pressure.
    fn dp2e(&self, density: f64, pressure: f64, tracers: &TracerMap) -> f64;

    /// Pressure from density and specific internal energy.
    fn de2p(&self, density: f64, energy: f64, tracers: &TracerMap) -> f64;

    /// Adiabatic sound speed from density and pressure.
    fn dp2c(&self, density: f64, pressure: f64, tracers: &TracerMap) -> f64;
}




/**
 * The gamma-law ideal gas
 */
#[derive(Clone, Copy, Debug)]
pub struct IdealGas {
    gamma_law_index: f64,
}




// ============================================================================
impl IdealGas {
    pub fn new(gamma_law_index: f64) -> Self {
        Self { gamma_law_index }
    }

    pub fn gamma_law_index(&self) -> f64 {
        self.gamma_law_index
    }
}

impl EquationOfState for IdealGas {
    fn dp2e(&self, density: f64, pressure: f64, _: &TracerMap) -> f64 {
        pressure / density / (self.gamma_law_index - 1.0)
    }

    fn de2p(&self, density: f64, energy: f64, _: &TracerMap) -> f64 {
        energy * density * (self.gamma_law_index - 1.0)
    }

    fn dp2c(&self, density: f64, pressure: f64, _: &TracerMap) -> f64 {
        (self.gamma_law_index * pressure / density).sqrt()
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ideal_gas_conversions_are_inverse() {
        let eos = IdealGas::new(5.0 / 3.0);
        let t = TracerMap::new();
        let e = eos.dp2e(2.0, 3.0, &t);
        assert_relative_eq!(e, 2.25, epsilon = 1e-12);
        assert_relative_eq!(eos.de2p(2.0, e, &t), 3.0, epsilon = 1e-12);
        assert_relative_eq!(eos.dp2c(1.0, 0.6, &t), 1.0, epsilon = 1e-12);
    }
}
