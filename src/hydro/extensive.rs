use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};
use serde::{Deserialize, Serialize};
use crate::geometry::Vector2d;
use super::cell::TracerMap;




#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]

/**
 * The conserved (extensive) content of one mesh cell: total mass, momentum,
 * energy (kinetic plus internal), and tracer masses.
 */
pub struct Extensive {
    pub mass: f64,
    pub momentum: Vector2d,
    pub energy: f64,
    pub tracers: TracerMap,
}




// ============================================================================
impl Extensive {

    /**
     * Return an all-zero extensive with the same tracer names as this one.
     */
    pub fn zero_like(&self) -> Self {
        Self {
            mass: 0.0,
            momentum: Vector2d::default(),
            energy: 0.0,
            tracers: self.tracers.keys().map(|k| (k.clone(), 0.0)).collect(),
        }
    }

    /**
     * The energy left after subtracting the bulk kinetic energy.
     */
    pub fn thermal_energy(&self) -> f64 {
        if self.mass > 0.0 {
            self.energy - 0.5 * self.momentum.dot(self.momentum) / self.mass
        } else {
            self.energy
        }
    }

    /**
     * Whether this content could describe a physical cell (positive mass and
     * internal energy).
     */
    pub fn is_physical(&self) -> bool {
        self.mass > 0.0 && self.thermal_energy() > 0.0
    }
}




// ============================================================================
impl AddAssign<&Extensive> for Extensive {
    fn add_assign(&mut self, u: &Extensive) {
        self.mass += u.mass;
        self.momentum += u.momentum;
        self.energy += u.energy;
        for (name, value) in &u.tracers {
            *self.tracers.entry(name.clone()).or_insert(0.0) += value;
        }
    }
}

impl SubAssign<&Extensive> for Extensive {
    fn sub_assign(&mut self, u: &Extensive) {
        self.mass -= u.mass;
        self.momentum -= u.momentum;
        self.energy -= u.energy;
        for (name, value) in &u.tracers {
            *self.tracers.entry(name.clone()).or_insert(0.0) -= value;
        }
    }
}

impl Add<Extensive> for Extensive {
    type Output = Extensive;
    fn add(mut self, u: Self) -> Extensive {
        self += &u;
        self
    }
}

impl Sub<Extensive> for Extensive {
    type Output = Self;
    fn sub(mut self, u: Self) -> Self {
        self -= &u;
        self
    }
}

impl Mul<f64> for Extensive {
    type Output = Self;
    fn mul(mut self, a: f64) -> Self {
        self.mass *= a;
        self.momentum = self.momentum * a;
        self.energy *= a;
        self.tracers.values_mut().for_each(|t| *t *= a);
        self
    }
}

impl Div<f64> for Extensive {
    type Output = Self;
    fn div(self, a: f64) -> Self {
        self * (1.0 / a)
    }
}
