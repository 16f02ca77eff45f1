//! Shared types for the cobble voxel world: grid constants, coordinate
//! math, block model, block-type registry and configuration.

pub mod aabb;
pub mod block;
pub mod block_type;
pub mod config;
pub mod constants;
pub mod error;
pub mod face;
pub mod math;
pub mod types;

pub use aabb::Aabb;
pub use block::{Block, BlockDescriptor, BlockShape};
pub use block_type::{BlockRegistry, BlockTypeDef};
pub use config::{PhysicsConfig, WorldConfig};
pub use error::ConfigError;
pub use face::{BlockFace, FaceSet, ALL_FACES};
pub use types::{BlockTypeId, CellCoord, ChunkCoord, LocalCoord};
