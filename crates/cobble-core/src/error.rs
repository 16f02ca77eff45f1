use thiserror::Error;

use crate::types::BlockTypeId;

/// Errors raised while loading configuration or block-type data.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse world config RON: {0}")]
    WorldParseError(String),

    #[error("Failed to parse physics config RON: {0}")]
    PhysicsParseError(String),

    #[error("Failed to parse block types RON: {0}")]
    BlockTypeParseError(String),

    #[error("Duplicate block type id {0:?}")]
    DuplicateBlockType(BlockTypeId),

    #[error("Block type {id:?} has non-positive height {height}")]
    InvalidHeight { id: BlockTypeId, height: f32 },

    #[error("Invalid config value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f32 },
}
