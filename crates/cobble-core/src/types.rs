use glam::IVec3;
use serde::{Deserialize, Serialize};

/// Newtype for block type identifiers, resolved through a
/// [`BlockRegistry`](crate::block_type::BlockRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockTypeId(pub u16);

/// Chunk coordinate in chunk-space (each unit = CHUNK_SIZE blocks).
pub type ChunkCoord = IVec3;

/// World coordinate in block-grid space: `floor(position / block_size)`.
pub type CellCoord = IVec3;

/// Offset of a cell inside its chunk, each axis in `0..CHUNK_SIZE`.
pub type LocalCoord = IVec3;
