use std::collections::HashMap;

use cobble_core::math::{cell_to_chunk, cell_to_local};
use cobble_core::types::{CellCoord, ChunkCoord};
use cobble_core::Block;
use glam::{IVec2, IVec3};

use crate::chunk::Chunk;
use crate::culling::BlockLookup;

/// Spatial container for all loaded chunks, keyed by chunk coordinate.
///
/// A secondary index maps each chunk column (x, z) to the sorted chunk
/// heights loaded in it.
#[derive(Debug)]
pub struct ChunkMap {
    chunks: HashMap<ChunkCoord, Chunk>,
    columns: HashMap<IVec2, Vec<i32>>,
    block_size: f32,
}

impl ChunkMap {
    pub fn new(block_size: f32) -> Self {
        Self {
            chunks: HashMap::new(),
            columns: HashMap::new(),
            block_size,
        }
    }

    pub fn block_size(&self) -> f32 {
        self.block_size
    }

    /// Get the chunk at `coord`, creating an empty one if absent.
    pub fn get_or_create(&mut self, coord: ChunkCoord) -> &mut Chunk {
        if !self.chunks.contains_key(&coord) {
            let heights = self.columns.entry(IVec2::new(coord.x, coord.z)).or_default();
            if let Err(at) = heights.binary_search(&coord.y) {
                heights.insert(at, coord.y);
            }
        }
        let block_size = self.block_size;
        self.chunks
            .entry(coord)
            .or_insert_with(|| Chunk::new(coord, block_size))
    }

    pub fn get(&self, coord: &ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(coord)
    }

    pub fn get_mut(&mut self, coord: &ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(coord)
    }

    pub fn contains(&self, coord: &ChunkCoord) -> bool {
        self.chunks.contains_key(coord)
    }

    pub fn remove(&mut self, coord: &ChunkCoord) -> Option<Chunk> {
        let removed = self.chunks.remove(coord)?;
        let key = IVec2::new(coord.x, coord.z);
        if let Some(heights) = self.columns.get_mut(&key) {
            heights.retain(|&y| y != coord.y);
            if heights.is_empty() {
                self.columns.remove(&key);
            }
        }
        Some(removed)
    }

    /// Loaded chunks in the chunk column `(x, z)`, bottom to top.
    pub fn column(&self, x: i32, z: i32) -> impl Iterator<Item = &Chunk> + '_ {
        self.columns
            .get(&IVec2::new(x, z))
            .into_iter()
            .flatten()
            .filter_map(move |&y| self.chunks.get(&IVec3::new(x, y, z)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChunkCoord, &Chunk)> {
        self.chunks.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&ChunkCoord, &mut Chunk)> {
        self.chunks.iter_mut()
    }

    pub fn coords(&self) -> impl Iterator<Item = &ChunkCoord> {
        self.chunks.keys()
    }

    pub fn loaded_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.columns.clear();
    }

    pub fn block_at_cell_mut(&mut self, cell: CellCoord) -> Option<&mut Block> {
        self.chunks
            .get_mut(&cell_to_chunk(cell))
            .and_then(|chunk| chunk.get_local_mut(cell_to_local(cell)))
    }
}

impl BlockLookup for ChunkMap {
    fn block_at_cell(&self, cell: CellCoord) -> Option<&Block> {
        self.chunks
            .get(&cell_to_chunk(cell))
            .and_then(|chunk| chunk.get_local(cell_to_local(cell)))
    }
}
