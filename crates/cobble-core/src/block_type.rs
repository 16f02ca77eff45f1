use std::collections::HashMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::BlockTypeId;

const BUILTIN_BLOCKS: &str = include_str!("../../../data/blocks.ron");

fn default_true() -> bool {
    true
}

/// A single block type definition loaded from RON data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockTypeDef {
    /// Stable type id referenced by placed blocks.
    pub id: BlockTypeId,
    /// Human-readable name for editor display.
    pub name: String,
    /// Texture path handed to the renderer as-is.
    #[serde(default)]
    pub texture: String,
    /// Height multiplier of the block size. 1.0 fills the cell.
    pub height: f32,
    /// Whether characters collide with and stand on this type.
    #[serde(default = "default_true")]
    pub has_collision: bool,
    /// Whether the type produces any geometry.
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl BlockTypeDef {
    /// Solid full-cell types are the only ones that hide a neighbor's face.
    pub fn is_occluder(&self) -> bool {
        self.visible && self.has_collision && self.height >= crate::constants::FULL_HEIGHT
    }
}

/// Block type definitions indexed by id.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    types: Vec<BlockTypeDef>,
    index: HashMap<BlockTypeId, usize>,
}

impl BlockRegistry {
    /// Build a registry, rejecting duplicate ids and non-positive heights.
    pub fn new(types: Vec<BlockTypeDef>) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(types.len());
        for (i, def) in types.iter().enumerate() {
            if def.height.is_nan() || def.height <= 0.0 {
                return Err(ConfigError::InvalidHeight {
                    id: def.id,
                    height: def.height,
                });
            }
            if index.insert(def.id, i).is_some() {
                return Err(ConfigError::DuplicateBlockType(def.id));
            }
        }
        Ok(Self { types, index })
    }

    /// Parse a RON list of block type definitions.
    pub fn from_ron_str(ron_str: &str) -> Result<Self, ConfigError> {
        let options = ron::Options::default();
        let types: Vec<BlockTypeDef> = options
            .from_str(ron_str)
            .map_err(|e| ConfigError::BlockTypeParseError(e.to_string()))?;
        let registry = Self::new(types)?;
        info!("loaded {} block types", registry.len());
        Ok(registry)
    }

    /// The registry embedded in the crate (`data/blocks.ron`).
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_ron_str(BUILTIN_BLOCKS)
    }

    /// Look up a type. Unknown ids return None; callers treat that as an
    /// invisible, non-colliding block.
    pub fn get(&self, id: BlockTypeId) -> Option<&BlockTypeDef> {
        self.index.get(&id).map(|&i| &self.types[i])
    }

    pub fn find_by_name(&self, name: &str) -> Option<&BlockTypeDef> {
        self.types.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Height multiplier for a type, 1.0 when unknown.
    pub fn height(&self, id: BlockTypeId) -> f32 {
        self.get(id).map_or(crate::constants::FULL_HEIGHT, |t| t.height)
    }

    pub fn has_collision(&self, id: BlockTypeId) -> bool {
        self.get(id).is_some_and(|t| t.has_collision)
    }

    pub fn is_visible(&self, id: BlockTypeId) -> bool {
        self.get(id).is_some_and(|t| t.visible)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockTypeDef> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
