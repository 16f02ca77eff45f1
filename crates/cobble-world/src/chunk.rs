use std::collections::HashMap;

use cobble_core::constants::CHUNK_MAX_LOCAL;
use cobble_core::math::{cell_to_local, chunk_bounds, position_to_cell};
use cobble_core::types::{ChunkCoord, LocalCoord};
use cobble_core::{Aabb, Block};
use glam::Vec3;

use crate::mesh::ChunkMesh;

/// A 16x16x16 region of the block grid: its blocks, its fixed world bounds
/// and the merged mesh built from them (if any geometry exists).
#[derive(Debug)]
pub struct Chunk {
    /// Chunk coordinate in chunk-space.
    pub coord: ChunkCoord,
    blocks: HashMap<LocalCoord, Block>,
    bounds: Aabb,
    block_size: f32,
    mesh: Option<ChunkMesh>,
}

impl Chunk {
    /// Create an empty chunk. Bounds are fixed from the coordinate and never
    /// change afterwards.
    pub fn new(coord: ChunkCoord, block_size: f32) -> Self {
        Self {
            coord,
            blocks: HashMap::new(),
            bounds: chunk_bounds(coord, block_size),
            block_size,
            mesh: None,
        }
    }

    /// Local offset of a world position inside this chunk's grid.
    pub fn local_of(&self, position: Vec3) -> LocalCoord {
        cell_to_local(position_to_cell(position, self.block_size))
    }

    /// Store a block at its cell. Returns the block it replaced.
    pub fn insert(&mut self, block: Block) -> Option<Block> {
        let local = self.local_of(block.position);
        self.blocks.insert(local, block)
    }

    pub fn remove(&mut self, local: LocalCoord) -> Option<Block> {
        self.blocks.remove(&local)
    }

    pub fn get_local(&self, local: LocalCoord) -> Option<&Block> {
        self.blocks.get(&local)
    }

    pub fn get_local_mut(&mut self, local: LocalCoord) -> Option<&mut Block> {
        self.blocks.get_mut(&local)
    }

    /// Block occupying the cell that contains `position`, if that cell
    /// belongs to this chunk.
    pub fn get_world(&self, position: Vec3) -> Option<&Block> {
        let cell = position_to_cell(position, self.block_size);
        if cobble_core::math::cell_to_chunk(cell) != self.coord {
            return None;
        }
        self.blocks.get(&cell_to_local(cell))
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    pub fn blocks_with_local(&self) -> impl Iterator<Item = (&LocalCoord, &Block)> {
        self.blocks.iter()
    }

    /// Remove every block matching `pred`, returning the removed blocks.
    pub fn drain_where(&mut self, mut pred: impl FnMut(&Block) -> bool) -> Vec<Block> {
        let doomed: Vec<LocalCoord> = self
            .blocks
            .iter()
            .filter(|(_, b)| pred(b))
            .map(|(local, _)| *local)
            .collect();
        doomed
            .into_iter()
            .filter_map(|local| self.blocks.remove(&local))
            .collect()
    }

    /// Overwrite the derived face sets produced by the resolver.
    pub fn apply_faces(&mut self, faces: &[(LocalCoord, cobble_core::FaceSet)]) {
        for (local, set) in faces {
            if let Some(block) = self.blocks.get_mut(local) {
                block.visible_faces = *set;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn mesh(&self) -> Option<&ChunkMesh> {
        self.mesh.as_ref()
    }

    pub fn set_mesh(&mut self, mesh: Option<ChunkMesh>) {
        self.mesh = mesh;
    }

    /// Release the merged mesh. The chunk keeps its blocks.
    pub fn dispose_mesh(&mut self) {
        self.mesh = None;
    }

    /// Whether a local coordinate touches a face of the chunk.
    pub fn is_on_boundary(local: LocalCoord) -> bool {
        [local.x, local.y, local.z]
            .iter()
            .any(|&v| v == 0 || v == CHUNK_MAX_LOCAL)
    }
}
