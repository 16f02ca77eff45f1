use crate::aabb::Aabb;
use crate::constants::CHUNK_SIZE;
use crate::types::{CellCoord, ChunkCoord, LocalCoord};
use glam::{IVec3, Vec3};

/// Convert a world-space position to the block cell containing it.
pub fn position_to_cell(position: Vec3, block_size: f32) -> CellCoord {
    (position / block_size).floor().as_ivec3()
}

/// World-space position of a cell's minimum corner.
pub fn cell_min_corner(cell: CellCoord, block_size: f32) -> Vec3 {
    cell.as_vec3() * block_size
}

/// Convert a block-grid cell to its containing chunk coordinate.
pub fn cell_to_chunk(cell: CellCoord) -> ChunkCoord {
    IVec3::new(
        cell.x.div_euclid(CHUNK_SIZE),
        cell.y.div_euclid(CHUNK_SIZE),
        cell.z.div_euclid(CHUNK_SIZE),
    )
}

/// Convert a block-grid cell to its local offset within a chunk.
pub fn cell_to_local(cell: CellCoord) -> LocalCoord {
    IVec3::new(
        cell.x.rem_euclid(CHUNK_SIZE),
        cell.y.rem_euclid(CHUNK_SIZE),
        cell.z.rem_euclid(CHUNK_SIZE),
    )
}

/// Convert a chunk coordinate and local offset back to a block-grid cell.
pub fn chunk_local_to_cell(chunk: ChunkCoord, local: LocalCoord) -> CellCoord {
    chunk * CHUNK_SIZE + local
}

/// Chunk containing a world-space position.
pub fn position_to_chunk(position: Vec3, block_size: f32) -> ChunkCoord {
    cell_to_chunk(position_to_cell(position, block_size))
}

/// World-space box enclosing every cell a chunk can hold.
pub fn chunk_bounds(chunk: ChunkCoord, block_size: f32) -> Aabb {
    let extent = CHUNK_SIZE as f32 * block_size;
    let min = chunk.as_vec3() * extent;
    Aabb::new(min, min + Vec3::splat(extent))
}

/// Quarter turns (0..4) closest to an angle in degrees.
pub fn quarter_turns(degrees: f32) -> u8 {
    ((degrees / 90.0).round() as i32).rem_euclid(4) as u8
}

/// Rotate an integer offset about +Y by a number of quarter turns.
///
/// Matches `Quat::from_rotation_y(turns * 90°)`: +X maps to -Z, +Z maps to +X.
pub fn rotate_offset_y(offset: IVec3, turns: u8) -> IVec3 {
    let mut v = offset;
    for _ in 0..(turns % 4) {
        v = IVec3::new(v.z, v.y, -v.x);
    }
    v
}
