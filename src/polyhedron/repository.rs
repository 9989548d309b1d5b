use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;
use crate::geometry::Vector3d;




/**
 * A shared handle to a vertex owned by a `VertexRepository`. Two handles
 * compare equal only if they point at the same repository slot, so identity
 * (not coordinate value) decides equality.
 */
#[derive(Clone, Debug)]
pub struct VertexRef(Arc<Vector3d>);




/**
 * A deduplicating store of polyhedron vertices. Requesting the same position
 * twice returns two handles to the same vertex.
 */
#[derive(Default)]
pub struct VertexRepository {
    vertices: HashMap<[u64; 3], VertexRef>,
}




// ============================================================================
impl VertexRef {

    /// Make a free-standing handle that belongs to no repository.
    pub fn detached(position: Vector3d) -> Self {
        Self(Arc::new(position))
    }

    pub fn position(&self) -> Vector3d {
        *self.0
    }
}

impl Deref for VertexRef {
    type Target = Vector3d;

    fn deref(&self) -> &Vector3d {
        &self.0
    }
}

impl PartialEq for VertexRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for VertexRef {}

impl Hash for VertexRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state)
    }
}




// ============================================================================
impl VertexRepository {

    pub fn new() -> Self {
        Self::default()
    }

    /**
     * Return the handle for the given position, creating it if this exact
     * position has not been seen before.
     */
    pub fn get(&mut self, position: Vector3d) -> VertexRef {
        self.vertices
            .entry(position.bit_key())
            .or_insert_with(|| VertexRef::detached(position))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn repository_deduplicates_identical_positions() {
        let mut repo = VertexRepository::new();
        let a = repo.get(Vector3d::new(1.0, 2.0, 3.0));
        let b = repo.get(Vector3d::new(1.0, 2.0, 3.0));
        let c = repo.get(Vector3d::new(1.0, 2.0, 4.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn detached_handles_compare_by_identity() {
        let p = Vector3d::new(0.0, 0.0, 0.0);
        assert_ne!(VertexRef::detached(p), VertexRef::detached(p));
    }
}
