use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::geometry::Vector2d;




/// Named passive scalars carried by a cell, e.g. a composition fraction.
pub type TracerMap = BTreeMap<String, f64>;




#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]

/**
 * The primitive (intensive) hydrodynamic state of one mesh point
 */
pub struct ComputationalCell {
    pub density: f64,
    pub pressure: f64,
    pub velocity: Vector2d,
    pub tracers: TracerMap,
}




#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]

/**
 * Identifies one scalar component of a `ComputationalCell`
 */
pub enum Field {
    Density,
    Pressure,
    VelocityX,
    VelocityY,
    Tracer(String),
}




// ============================================================================
impl ComputationalCell {

    pub fn new(density: f64, pressure: f64, velocity: Vector2d) -> Self {
        Self {
            density,
            pressure,
            velocity,
            tracers: TracerMap::new(),
        }
    }

    pub fn with_tracer(mut self, name: &str, value: f64) -> Self {
        self.tracers.insert(name.to_string(), value);
        self
    }

    /**
     * Return a copy with the velocity component along the unit vector
     * `normal` reversed: `v' = v - 2 (v . n) n`.
     */
    pub fn reflect(&self, normal: Vector2d) -> Self {
        let mut cell = self.clone();
        cell.velocity -= normal * (2.0 * self.velocity.dot(normal));
        cell
    }

    /**
     * Return a copy with every scalar set to zero. Tracer names are kept.
     */
    pub fn zeroed(&self) -> Self {
        Self {
            density: 0.0,
            pressure: 0.0,
            velocity: Vector2d::default(),
            tracers: self.tracers.keys().map(|k| (k.clone(), 0.0)).collect(),
        }
    }

    /**
     * List the scalar fields of this cell in a fixed order: the four flow
     * variables followed by the tracers in name order.
     */
    pub fn fields(&self) -> Vec<Field> {
        let mut fields = vec![Field::Density, Field::Pressure, Field::VelocityX, Field::VelocityY];
        fields.extend(self.tracers.keys().cloned().map(Field::Tracer));
        fields
    }

    /// Missing tracers read as zero.
    pub fn get(&self, field: &Field) -> f64 {
        match field {
            Field::Density => self.density,
            Field::Pressure => self.pressure,
            Field::VelocityX => self.velocity.x,
            Field::VelocityY => self.velocity.y,
            Field::Tracer(name) => self.tracers.get(name).copied().unwrap_or(0.0),
        }
    }

    pub fn set(&mut self, field: &Field, value: f64) {
        match field {
            Field::Density => self.density = value,
            Field::Pressure => self.pressure = value,
            Field::VelocityX => self.velocity.x = value,
            Field::VelocityY => self.velocity.y = value,
            Field::Tracer(name) => {
                self.tracers.insert(name.clone(), value);
            }
        }
    }
}
