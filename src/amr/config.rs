use serde::{Deserialize, Serialize};




#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]

/**
 * Where a refined cell's new mesh point goes
 */
pub enum PlacementScheme {
    /// Offset from the parent point toward its farthest neighbor.
    FarthestNeighbor,
    /// Parent and new point placed symmetrically about the parent cell's
    /// centroid, pulling the mesh toward regular cells.
    Arepo,
}




#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]

/**
 * Tunable parameters of the AMR pass. Lengths are fractions of the refined
 * cell's width, `sqrt(V / pi)`.
 */
pub struct AmrConfig {
    pub placement: PlacementScheme,

    /// Smallest allowed distance from a new point to any existing point.
    pub min_separation: f64,

    /// Distance a new point is placed from the parent point (or, for the
    /// Arepo scheme, from the cell centroid).
    pub split_offset: f64,

    /// Removal never shrinks the mesh below this many points.
    pub min_point_count: usize,
}




// ============================================================================
impl Default for AmrConfig {
    fn default() -> Self {
        Self {
            placement: PlacementScheme::FarthestNeighbor,
            min_separation: 0.1,
            split_offset: 0.25,
            min_point_count: 4,
        }
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn config_survives_cbor_encoding() {
        let config = AmrConfig { placement: PlacementScheme::Arepo, ..AmrConfig::default() };
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&config, &mut bytes).unwrap();
        let decoded: AmrConfig = ciborium::de::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(decoded, config);
    }
}
