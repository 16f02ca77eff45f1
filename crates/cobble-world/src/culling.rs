use cobble_core::constants::FULL_HEIGHT;
use cobble_core::types::{CellCoord, ChunkCoord, LocalCoord};
use cobble_core::{Block, BlockFace, BlockRegistry, FaceSet, ALL_FACES};

/// Read access to blocks by grid cell, across chunk boundaries.
pub trait BlockLookup {
    fn block_at_cell(&self, cell: CellCoord) -> Option<&Block>;
}

/// Whether the block in a neighboring cell hides the face pointing at it.
fn occludes(registry: &BlockRegistry, neighbor: Option<&Block>) -> bool {
    neighbor.is_some_and(|n| {
        n.shape.is_full() && registry.get(n.kind).is_some_and(|def| def.is_occluder())
    })
}

/// Visible faces of one block.
///
/// Only visible full blocks take part in culling; every other block gets an
/// empty set and is drawn from its whole shape geometry. A face is hidden
/// when the cell it points at (after the block's Y rotation) holds a solid
/// full-height full block. The top of a short block is always visible.
pub fn resolve_block(
    lookup: &impl BlockLookup,
    registry: &BlockRegistry,
    block: &Block,
    block_size: f32,
) -> FaceSet {
    let Some(def) = registry.get(block.kind) else {
        return FaceSet::EMPTY;
    };
    if !def.visible || !block.shape.is_full() {
        return FaceSet::EMPTY;
    }

    let cell = block.cell(block_size);
    let short = def.height < FULL_HEIGHT;
    let mut faces = FaceSet::EMPTY;
    for face in ALL_FACES {
        if short && face == BlockFace::Top {
            faces.insert(face);
            continue;
        }
        let neighbor = lookup.block_at_cell(cell + face.rotated_offset(block.rotation_y));
        if !occludes(registry, neighbor) {
            faces.insert(face);
        }
    }
    faces
}

/// Face sets for every block of a chunk. Pure: reads the lookup, writes
/// nothing, so running it twice on unchanged data yields the same result.
pub fn resolve_chunk(
    lookup: &impl BlockLookup,
    registry: &BlockRegistry,
    blocks: impl Iterator<Item = (LocalCoord, Block)>,
    block_size: f32,
) -> Vec<(LocalCoord, FaceSet)> {
    blocks
        .map(|(local, block)| (local, resolve_block(lookup, registry, &block, block_size)))
        .collect()
}

/// Convenience for callers that hold a chunk map: resolve by chunk coordinate.
pub fn resolve_chunk_at(
    map: &crate::chunk_map::ChunkMap,
    registry: &BlockRegistry,
    coord: ChunkCoord,
) -> Vec<(LocalCoord, FaceSet)> {
    match map.get(&coord) {
        Some(chunk) => resolve_chunk(
            map,
            registry,
            chunk.blocks_with_local().map(|(l, b)| (*l, *b)),
            map.block_size(),
        ),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cobble_core::math::cell_to_chunk;
    use cobble_core::types::BlockTypeId;
    use cobble_core::BlockShape;
    use glam::IVec3;

    use crate::chunk_map::ChunkMap;

    const BS: f32 = 4.0;
    const STONE: BlockTypeId = BlockTypeId(3);
    const WATER: BlockTypeId = BlockTypeId(6);
    const BARRIER: BlockTypeId = BlockTypeId(7);
    const CARPET: BlockTypeId = BlockTypeId(8);

    fn registry() -> BlockRegistry {
        BlockRegistry::builtin().expect("builtin registry")
    }

    fn place(map: &mut ChunkMap, block: Block) {
        let chunk = cell_to_chunk(block.cell(BS));
        map.get_or_create(chunk).insert(block);
    }

    fn full(cell: IVec3, kind: BlockTypeId, registry: &BlockRegistry) -> Block {
        Block::at_cell(cell, kind, registry.height(kind), BS)
    }

    #[test]
    fn test_isolated_block_shows_all_faces() {
        let reg = registry();
        let mut map = ChunkMap::new(BS);
        let b = full(IVec3::new(3, 3, 3), STONE, &reg);
        place(&mut map, b);
        assert_eq!(resolve_block(&map, &reg, &b, BS), FaceSet::ALL);
    }

    #[test]
    fn test_adjacent_blocks_hide_shared_faces() {
        let reg = registry();
        let mut map = ChunkMap::new(BS);
        let a = full(IVec3::new(3, 3, 3), STONE, &reg);
        let b = full(IVec3::new(4, 3, 3), STONE, &reg);
        place(&mut map, a);
        place(&mut map, b);
        let fa = resolve_block(&map, &reg, &a, BS);
        let fb = resolve_block(&map, &reg, &b, BS);
        assert!(!fa.contains(BlockFace::Right));
        assert!(!fb.contains(BlockFace::Left));
        assert_eq!(fa.len(), 5);
    }

    #[test]
    fn test_culling_across_chunk_boundary() {
        let reg = registry();
        let mut map = ChunkMap::new(BS);
        let a = full(IVec3::new(15, 0, 0), STONE, &reg);
        let b = full(IVec3::new(16, 0, 0), STONE, &reg);
        place(&mut map, a);
        place(&mut map, b);
        assert!(!resolve_block(&map, &reg, &a, BS).contains(BlockFace::Right));
        assert!(!resolve_block(&map, &reg, &b, BS).contains(BlockFace::Left));
    }

    #[test]
    fn test_non_occluding_neighbors_keep_face() {
        let reg = registry();
        let mut map = ChunkMap::new(BS);
        let a = full(IVec3::new(3, 3, 3), STONE, &reg);
        place(&mut map, a);
        place(&mut map, full(IVec3::new(4, 3, 3), WATER, &reg));
        place(&mut map, full(IVec3::new(2, 3, 3), BARRIER, &reg));
        place(&mut map, full(IVec3::new(3, 4, 3), CARPET, &reg));
        place(
            &mut map,
            Block::at_cell_shaped(IVec3::new(3, 3, 4), STONE, BlockShape::SlabBottom, 1.0, BS),
        );
        let faces = resolve_block(&map, &reg, &a, BS);
        assert!(faces.contains(BlockFace::Right), "water does not occlude");
        assert!(faces.contains(BlockFace::Left), "invisible barrier does not occlude");
        assert!(faces.contains(BlockFace::Top), "short carpet does not occlude");
        assert!(faces.contains(BlockFace::Front), "slab does not occlude");
    }

    #[test]
    fn test_short_block_top_always_visible() {
        let reg = registry();
        let mut map = ChunkMap::new(BS);
        let carpet = full(IVec3::new(3, 3, 3), CARPET, &reg);
        place(&mut map, carpet);
        place(&mut map, full(IVec3::new(3, 4, 3), STONE, &reg));
        assert!(resolve_block(&map, &reg, &carpet, BS).contains(BlockFace::Top));
    }

    #[test]
    fn test_rotation_redirects_neighbor_check() {
        let reg = registry();
        let mut map = ChunkMap::new(BS);
        let rotated = full(IVec3::new(3, 3, 3), STONE, &reg).with_rotation(90.0);
        place(&mut map, rotated);
        // After a quarter turn the local Right face points at world -Z.
        place(&mut map, full(IVec3::new(3, 3, 2), STONE, &reg));
        let faces = resolve_block(&map, &reg, &rotated, BS);
        assert!(!faces.contains(BlockFace::Right));
        assert!(faces.contains(BlockFace::Back));
    }

    #[test]
    fn test_non_full_and_invisible_get_empty_set() {
        let reg = registry();
        let map = ChunkMap::new(BS);
        let pillar = Block::at_cell_shaped(IVec3::ZERO, STONE, BlockShape::Pillar, 1.0, BS);
        assert!(resolve_block(&map, &reg, &pillar, BS).is_empty());
        let barrier = full(IVec3::ZERO, BARRIER, &reg);
        assert!(resolve_block(&map, &reg, &barrier, BS).is_empty());
        let unknown = Block::at_cell(IVec3::ZERO, BlockTypeId(999), 1.0, BS);
        assert!(resolve_block(&map, &reg, &unknown, BS).is_empty());
    }

    #[test]
    fn test_resolve_chunk_idempotent() {
        let reg = registry();
        let mut map = ChunkMap::new(BS);
        for x in 0..4 {
            for z in 0..4 {
                place(&mut map, full(IVec3::new(x, 0, z), STONE, &reg));
            }
        }
        let mut first = resolve_chunk_at(&map, &reg, IVec3::ZERO);
        let mut second = resolve_chunk_at(&map, &reg, IVec3::ZERO);
        first.sort_by_key(|(l, _)| (l.x, l.y, l.z));
        second.sort_by_key(|(l, _)| (l.x, l.y, l.z));
        assert_eq!(first, second);
        assert_eq!(first.len(), 16);
    }

    #[test]
    fn test_resolve_missing_chunk_is_empty() {
        let reg = registry();
        let map = ChunkMap::new(BS);
        assert!(resolve_chunk_at(&map, &reg, IVec3::new(9, 9, 9)).is_empty());
    }
}
