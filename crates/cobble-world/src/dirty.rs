use std::collections::HashSet;

use cobble_core::types::ChunkCoord;

/// Chunks whose blocks changed since their mesh was last built.
#[derive(Debug, Default, Clone)]
pub struct DirtySet {
    coords: HashSet<ChunkCoord>,
}

impl DirtySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent; marking an already-dirty chunk is a no-op.
    pub fn mark(&mut self, coord: ChunkCoord) -> bool {
        self.coords.insert(coord)
    }

    pub fn contains(&self, coord: &ChunkCoord) -> bool {
        self.coords.contains(coord)
    }

    /// Take every dirty coordinate, leaving the set empty.
    pub fn drain(&mut self) -> Vec<ChunkCoord> {
        self.coords.drain().collect()
    }

    pub fn clear(&mut self) {
        self.coords.clear();
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;

    #[test]
    fn test_mark_idempotent() {
        let mut set = DirtySet::new();
        assert!(set.mark(IVec3::ZERO));
        assert!(!set.mark(IVec3::ZERO));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_drain_empties() {
        let mut set = DirtySet::new();
        set.mark(IVec3::ZERO);
        set.mark(IVec3::X);
        let drained = set.drain();
        assert_eq!(drained.len(), 2);
        assert!(set.is_empty());
        assert!(set.drain().is_empty());
    }
}
