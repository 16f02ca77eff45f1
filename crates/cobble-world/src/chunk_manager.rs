use cobble_core::constants::{CHUNK_MAX_LOCAL, CHUNK_SIZE};
use cobble_core::math::{cell_to_chunk, cell_to_local, position_to_cell};
use cobble_core::types::{CellCoord, ChunkCoord};
use cobble_core::{Aabb, Block, BlockRegistry, WorldConfig};
use glam::{IVec3, Vec3};
use log::{debug, info, warn};

use crate::chunk::Chunk;
use crate::chunk_map::ChunkMap;
use crate::culling::{resolve_chunk_at, BlockLookup};
use crate::dirty::DirtySet;
use crate::geometry::ShapeCache;
use crate::mesh::build_chunk_mesh;
use crate::render_list::{self, RenderCamera, RenderSink};

/// Summary of one dirty-chunk pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildStats {
    /// Chunks whose faces and mesh were recomputed.
    pub rebuilt: usize,
    /// Rebuilt chunks that ended up with no drawable geometry.
    pub empty_meshes: usize,
    /// Chunks dropped because they no longer hold any block.
    pub dropped: usize,
    pub vertices: usize,
    pub triangles: usize,
}

/// Owner of all placed blocks, partitioned into chunks.
///
/// Edits mark chunks dirty; `process_dirty_chunks` recomputes face
/// visibility and merged meshes for exactly those chunks, once per frame.
/// All operations run on the caller's thread and must not overlap.
pub struct ChunkManager {
    config: WorldConfig,
    registry: BlockRegistry,
    chunks: ChunkMap,
    dirty: DirtySet,
    shapes: ShapeCache,
}

impl ChunkManager {
    pub fn new(config: WorldConfig, registry: BlockRegistry) -> Self {
        let block_size = config.block_size;
        Self {
            config,
            registry,
            chunks: ChunkMap::new(block_size),
            dirty: DirtySet::new(),
            shapes: ShapeCache::new(block_size),
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn block_size(&self) -> f32 {
        self.config.block_size
    }

    /// Mark the chunk owning `cell` dirty, plus each existing face neighbor
    /// chunk the cell borders.
    fn mark_cell_dirty(&mut self, cell: CellCoord) {
        let coord = cell_to_chunk(cell);
        let local = cell_to_local(cell);
        self.dirty.mark(coord);
        for axis in 0..3 {
            let step = if local[axis] == 0 {
                -1
            } else if local[axis] == CHUNK_MAX_LOCAL {
                1
            } else {
                continue;
            };
            let mut neighbor = coord;
            neighbor[axis] += step;
            if self.chunks.contains(&neighbor) {
                self.dirty.mark(neighbor);
            }
        }
    }

    /// Place a block in the cell containing its position. Returns the block
    /// it replaced, if any.
    pub fn add_block(&mut self, block: Block) -> Option<Block> {
        if self.registry.get(block.kind).is_none() {
            warn!(
                "block at {:?} has unknown type {:?}; treated as invisible and non-colliding",
                block.position, block.kind
            );
        }
        let cell = block.cell(self.block_size());
        let replaced = self.chunks.get_or_create(cell_to_chunk(cell)).insert(block);
        self.mark_cell_dirty(cell);
        replaced
    }

    /// Remove whatever occupies the cell of `block`. Nothing is marked when
    /// the cell was already empty.
    pub fn remove_block(&mut self, block: &Block) -> Option<Block> {
        self.remove_block_at_cell(block.cell(self.block_size()))
    }

    pub fn remove_block_at_cell(&mut self, cell: CellCoord) -> Option<Block> {
        let removed = self
            .chunks
            .get_mut(&cell_to_chunk(cell))
            .and_then(|chunk| chunk.remove(cell_to_local(cell)))?;
        self.mark_cell_dirty(cell);
        Some(removed)
    }

    /// Change a placed block in place (rotation, shape, type). Faces are
    /// recomputed on the next pass. A block moved out of its cell is
    /// re-homed. Returns false if the cell is empty.
    pub fn edit_block(&mut self, cell: CellCoord, edit: impl FnOnce(&mut Block)) -> bool {
        let Some(block) = self.chunks.block_at_cell_mut(cell) else {
            return false;
        };
        edit(block);
        let edited = *block;
        let new_cell = edited.cell(self.block_size());
        if new_cell != cell {
            self.remove_block_at_cell(cell);
            self.add_block(edited);
        } else {
            self.mark_cell_dirty(cell);
        }
        true
    }

    /// Remove every block matching `pred`. Returns how many were removed.
    pub fn remove_blocks_where(&mut self, mut pred: impl FnMut(&Block) -> bool) -> usize {
        let block_size = self.block_size();
        let mut removed_cells = Vec::new();
        for (_, chunk) in self.chunks.iter_mut() {
            for block in chunk.drain_where(&mut pred) {
                removed_cells.push(block.cell(block_size));
            }
        }
        for cell in &removed_cells {
            self.mark_cell_dirty(*cell);
        }
        if !removed_cells.is_empty() {
            info!("removed {} blocks", removed_cells.len());
        }
        removed_cells.len()
    }

    pub fn block_at_cell(&self, cell: CellCoord) -> Option<&Block> {
        self.chunks.block_at_cell(cell)
    }

    pub fn block_at_world(&self, position: Vec3) -> Option<&Block> {
        self.block_at_cell(position_to_cell(position, self.block_size()))
    }

    /// Every block whose cell has the same x/z as the world point, any
    /// height, bottom to top. Only the loaded chunks of that chunk column are
    /// visited, one keyed lookup per local height.
    pub fn blocks_in_column(&self, x: f32, z: f32) -> impl Iterator<Item = &Block> + '_ {
        let cell = position_to_cell(Vec3::new(x, 0.0, z), self.block_size());
        let column = cell_to_chunk(cell);
        let local = cell_to_local(cell);
        self.chunks.column(column.x, column.z).flat_map(move |chunk| {
            (0..CHUNK_SIZE)
                .filter_map(move |ly| chunk.get_local(IVec3::new(local.x, ly, local.z)))
        })
    }

    /// Append every block whose centre lies within `radius` of `position`.
    ///
    /// Chunks whose bounds miss the query box are skipped wholesale. `out`
    /// is not cleared; the caller owns and reuses it.
    pub fn blocks_around(&self, position: Vec3, radius: f32, out: &mut Vec<Block>) {
        let query = Aabb::from_center_half_extents(position, Vec3::splat(radius));
        let radius_sq = radius * radius;
        for (_, chunk) in self.chunks.iter() {
            if !chunk.bounds().touches(&query) {
                continue;
            }
            out.extend(
                chunk
                    .blocks()
                    .filter(|b| b.position.distance_squared(position) <= radius_sq)
                    .copied(),
            );
        }
    }

    pub fn all_blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.chunks.iter().flat_map(|(_, chunk)| chunk.blocks())
    }

    pub fn block_count(&self) -> usize {
        self.chunks.iter().map(|(_, c)| c.len()).sum()
    }

    pub fn chunk(&self, coord: &ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(coord)
    }

    pub fn chunks(&self) -> &ChunkMap {
        &self.chunks
    }

    pub fn is_dirty(&self, coord: &ChunkCoord) -> bool {
        self.dirty.contains(coord)
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    /// Counts for debug display: (loaded, meshed, dirty).
    pub fn chunk_counts(&self) -> (usize, usize, usize) {
        let meshed = self.chunks.iter().filter(|(_, c)| c.mesh().is_some()).count();
        (self.chunks.loaded_count(), meshed, self.dirty.len())
    }

    /// Recompute faces and meshes for every dirty chunk, then clear the set.
    pub fn process_dirty_chunks(&mut self) -> RebuildStats {
        let mut stats = RebuildStats::default();
        let coords = self.dirty.drain();
        for coord in coords {
            let empty = match self.chunks.get_mut(&coord) {
                Some(chunk) => {
                    chunk.dispose_mesh();
                    chunk.is_empty()
                }
                None => continue,
            };
            if empty {
                self.chunks.remove(&coord);
                stats.dropped += 1;
                continue;
            }

            let faces = resolve_chunk_at(&self.chunks, &self.registry, coord);
            let Some(chunk) = self.chunks.get_mut(&coord) else {
                continue;
            };
            chunk.apply_faces(&faces);
            let mesh = build_chunk_mesh(chunk, &self.registry, &mut self.shapes);
            match &mesh {
                Some(m) => {
                    stats.vertices += m.vertex_count();
                    stats.triangles += m.triangle_count();
                }
                None => stats.empty_meshes += 1,
            }
            chunk.set_mesh(mesh);
            stats.rebuilt += 1;
        }
        if stats.rebuilt > 0 || stats.dropped > 0 {
            debug!(
                "rebuilt {} chunks ({} empty, {} dropped): {} vertices, {} triangles",
                stats.rebuilt, stats.empty_meshes, stats.dropped, stats.vertices, stats.triangles
            );
        }
        stats
    }

    /// Chunks that would be drawn from `camera` this frame.
    pub fn visible_chunks(&self, camera: &RenderCamera) -> Vec<ChunkCoord> {
        render_list::visible_chunks(&self.chunks, camera, self.config.render_distance)
    }

    /// Submit visible chunk meshes to the renderer. Returns the count sent.
    pub fn render(&self, camera: &RenderCamera, sink: &mut impl RenderSink) -> usize {
        let submitted =
            render_list::submit_visible(&self.chunks, camera, self.config.render_distance, sink);
        debug!("submitted {submitted} of {} chunks", self.chunks.loaded_count());
        submitted
    }

    /// Bulk insert without per-block neighbor marking, then rebuild every
    /// touched chunk in one pass. Returns the number of blocks inserted.
    pub fn load_initial_blocks(&mut self, blocks: impl IntoIterator<Item = Block>) -> usize {
        let block_size = self.block_size();
        let mut count = 0;
        for block in blocks {
            let coord = cell_to_chunk(block.cell(block_size));
            self.chunks.get_or_create(coord).insert(block);
            count += 1;
        }
        let coords: Vec<ChunkCoord> = self.chunks.coords().copied().collect();
        for coord in coords {
            self.dirty.mark(coord);
        }
        let stats = self.process_dirty_chunks();
        info!(
            "loaded {count} blocks into {} chunks ({} meshed)",
            self.chunks.loaded_count(),
            stats.rebuilt - stats.empty_meshes
        );
        count
    }

    /// Drop every chunk and its mesh.
    pub fn clear(&mut self) {
        let loaded = self.chunks.loaded_count();
        for (_, chunk) in self.chunks.iter_mut() {
            chunk.dispose_mesh();
        }
        self.chunks.clear();
        self.dirty.clear();
        self.shapes.clear();
        info!("cleared world ({loaded} chunks)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cobble_core::types::BlockTypeId;
    use cobble_core::BlockFace;

    const STONE: BlockTypeId = BlockTypeId(3);

    fn manager() -> ChunkManager {
        ChunkManager::new(
            WorldConfig::default(),
            BlockRegistry::builtin().expect("builtin registry"),
        )
    }

    fn stone(cell: IVec3) -> Block {
        Block::at_cell(cell, STONE, 1.0, 4.0)
    }

    #[test]
    fn test_add_marks_owner_only_for_interior() {
        let mut m = manager();
        m.add_block(stone(IVec3::new(16, 0, 0)));
        m.add_block(stone(IVec3::new(0, 0, 0)));
        m.process_dirty_chunks();
        m.add_block(stone(IVec3::new(8, 8, 8)));
        assert!(m.is_dirty(&IVec3::ZERO));
        assert!(!m.is_dirty(&IVec3::new(1, 0, 0)));
    }

    #[test]
    fn test_add_on_boundary_marks_existing_neighbor() {
        let mut m = manager();
        m.add_block(stone(IVec3::new(16, 5, 5)));
        m.add_block(stone(IVec3::new(8, 5, 5)));
        m.process_dirty_chunks();
        m.add_block(stone(IVec3::new(15, 5, 5)));
        assert!(m.is_dirty(&IVec3::ZERO));
        assert!(m.is_dirty(&IVec3::new(1, 0, 0)));
        // Missing neighbors are never created just to be marked.
        assert!(!m.is_dirty(&IVec3::new(0, -1, 0)));
        assert_eq!(m.dirty_count(), 2);
    }

    #[test]
    fn test_remove_missing_marks_nothing() {
        let mut m = manager();
        assert!(m.remove_block(&stone(IVec3::new(3, 3, 3))).is_none());
        assert_eq!(m.dirty_count(), 0);
    }

    #[test]
    fn test_lookup_and_remove() {
        let mut m = manager();
        let b = stone(IVec3::new(-3, 2, 40));
        m.add_block(b);
        assert_eq!(m.block_at_world(b.position).map(|x| x.kind), Some(STONE));
        assert_eq!(m.block_at_cell(IVec3::new(-3, 2, 40)).map(|x| x.kind), Some(STONE));
        let removed = m.remove_block(&b).expect("block removed");
        assert_eq!(removed.kind, STONE);
        assert!(m.block_at_world(b.position).is_none());
    }

    #[test]
    fn test_process_clears_dirty_and_meshes() {
        let mut m = manager();
        m.add_block(stone(IVec3::new(1, 1, 1)));
        let stats = m.process_dirty_chunks();
        assert_eq!(stats.rebuilt, 1);
        assert_eq!(m.dirty_count(), 0);
        assert!(m.chunk(&IVec3::ZERO).and_then(|c| c.mesh()).is_some());
        assert_eq!(m.process_dirty_chunks(), RebuildStats::default());
    }

    #[test]
    fn test_empty_chunk_dropped_after_last_removal() {
        let mut m = manager();
        let b = stone(IVec3::new(1, 1, 1));
        m.add_block(b);
        m.process_dirty_chunks();
        m.remove_block(&b);
        let stats = m.process_dirty_chunks();
        assert_eq!(stats.dropped, 1);
        assert!(m.chunk(&IVec3::ZERO).is_none());
    }

    #[test]
    fn test_edit_block_rotation_redirties() {
        let mut m = manager();
        m.add_block(stone(IVec3::new(4, 4, 4)));
        m.process_dirty_chunks();
        let edited = m.edit_block(IVec3::new(4, 4, 4), |b| b.rotation_y = 90.0);
        assert!(edited);
        assert!(m.is_dirty(&IVec3::ZERO));
        assert!(!m.edit_block(IVec3::new(9, 9, 9), |b| b.rotation_y = 90.0));
    }

    #[test]
    fn test_edit_block_moving_cell_rehomes() {
        let mut m = manager();
        m.add_block(stone(IVec3::new(4, 4, 4)));
        m.edit_block(IVec3::new(4, 4, 4), |b| b.position.x += 4.0);
        assert!(m.block_at_cell(IVec3::new(4, 4, 4)).is_none());
        assert!(m.block_at_cell(IVec3::new(5, 4, 4)).is_some());
        assert_eq!(m.block_count(), 1);
    }

    #[test]
    fn test_blocks_in_column() {
        let mut m = manager();
        for y in [-20, 0, 3, 40] {
            m.add_block(stone(IVec3::new(2, y, 2)));
        }
        m.add_block(stone(IVec3::new(3, 0, 2)));
        let column: Vec<_> = m.blocks_in_column(9.0, 9.0).collect();
        assert_eq!(column.len(), 4);
        let heights: Vec<i32> = column.iter().map(|b| b.cell(4.0).y).collect();
        assert_eq!(heights, vec![-20, 0, 3, 40]);
    }

    #[test]
    fn test_blocks_in_column_dense_world() {
        let mut m = manager();
        let cells = (-20..20).flat_map(|x| {
            (-20..20).flat_map(move |z| (-18..18).map(move |y| IVec3::new(x, y, z)))
        });
        m.load_initial_blocks(cells.map(stone));
        for (x, z) in [(-20, -20), (-1, 0), (0, -1), (15, 16), (19, 19)] {
            let wx = (x as f32 + 0.5) * 4.0;
            let wz = (z as f32 + 0.5) * 4.0;
            let heights: Vec<i32> = m
                .blocks_in_column(wx, wz)
                .map(|b| {
                    let cell = b.cell(4.0);
                    assert_eq!((cell.x, cell.z), (x, z));
                    cell.y
                })
                .collect();
            assert_eq!(heights, (-18..18).collect::<Vec<_>>());
        }
        assert_eq!(m.blocks_in_column(200.0, 0.0).count(), 0);
    }

    #[test]
    fn test_blocks_around_appends_within_radius() {
        let mut m = manager();
        m.add_block(stone(IVec3::new(0, 0, 0)));
        m.add_block(stone(IVec3::new(1, 0, 0)));
        m.add_block(stone(IVec3::new(10, 0, 0)));
        m.add_block(stone(IVec3::new(-1, 0, 0)));
        let mut out = vec![stone(IVec3::new(99, 99, 99))];
        m.blocks_around(Vec3::new(2.0, 2.0, 2.0), 5.0, &mut out);
        // Existing contents are kept; blocks at x-centres -2, 2 and 6 qualify.
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn test_remove_blocks_where() {
        let mut m = manager();
        m.add_block(stone(IVec3::new(0, 0, 0)));
        m.add_block(Block::at_cell(IVec3::new(20, 0, 0), BlockTypeId(0), 1.0, 4.0));
        m.process_dirty_chunks();
        let removed = m.remove_blocks_where(|b| b.kind == STONE);
        assert_eq!(removed, 1);
        assert!(m.is_dirty(&IVec3::ZERO));
        assert!(!m.is_dirty(&IVec3::new(1, 0, 0)));
    }

    #[test]
    fn test_load_initial_blocks_resolves_faces() {
        let mut m = manager();
        let blocks = (0..3).map(|x| stone(IVec3::new(x, 0, 0)));
        assert_eq!(m.load_initial_blocks(blocks), 3);
        assert_eq!(m.dirty_count(), 0);
        let middle = m.block_at_cell(IVec3::new(1, 0, 0)).expect("middle block");
        assert!(!middle.visible_faces.contains(BlockFace::Left));
        assert!(!middle.visible_faces.contains(BlockFace::Right));
        assert_eq!(m.chunk_counts(), (1, 1, 0));
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut m = manager();
        m.load_initial_blocks((0..10).map(|x| stone(IVec3::new(x * 20, 0, 0))));
        m.add_block(stone(IVec3::new(1, 1, 1)));
        m.clear();
        assert_eq!(m.chunk_counts(), (0, 0, 0));
        assert_eq!(m.all_blocks().count(), 0);
    }
}
