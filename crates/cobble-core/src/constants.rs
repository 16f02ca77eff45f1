//! Single source of truth for shared constants.
//! Tunable values (block size, step height, fall speed) live in
//! [`crate::config`]; only the structural grid constants are fixed here.

/// Side length of a chunk in blocks.
pub const CHUNK_SIZE: i32 = 16;

/// Largest local coordinate on any axis of a chunk.
pub const CHUNK_MAX_LOCAL: i32 = CHUNK_SIZE - 1;

/// Default world-space edge length of one block.
pub const DEFAULT_BLOCK_SIZE: f32 = 4.0;

/// Height multiplier at or above which a block fully covers its cell.
pub const FULL_HEIGHT: f32 = 1.0;
