use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::aabb::Aabb;
use crate::face::FaceSet;
use crate::math::{cell_min_corner, position_to_cell, quarter_turns};
use crate::types::{BlockTypeId, CellCoord};

/// Geometric shape of a placed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlockShape {
    /// Cube filling the cell footprint. The only shape that takes part in
    /// face culling.
    #[default]
    FullBlock,
    SlabBottom,
    SlabTop,
    /// Half-depth wall along the local X axis.
    VerticalSlab,
    /// Octagonal column.
    Pillar,
    /// Ramp rising from local -Z to +Z.
    Wedge,
    /// Triangular prism filling the local -X/-Z corner.
    CornerWedge,
}

impl BlockShape {
    pub fn is_full(self) -> bool {
        self == BlockShape::FullBlock
    }
}

/// A placed block. Plain value; the chunk that holds it owns the only copy
/// that matters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    /// World-space centre of the block's model.
    pub position: Vec3,
    pub kind: BlockTypeId,
    pub shape: BlockShape,
    /// Geometry rotation about +Y in degrees.
    pub rotation_y: f32,
    /// UV rotation of the side faces in degrees.
    pub texture_rotation_y: f32,
    /// UV rotation of the top face in degrees.
    pub top_texture_rotation_y: f32,
    /// Derived by the face resolver. Never persisted.
    pub visible_faces: FaceSet,
}

impl Block {
    pub fn new(position: Vec3, kind: BlockTypeId, shape: BlockShape) -> Self {
        Self {
            position,
            kind,
            shape,
            rotation_y: 0.0,
            texture_rotation_y: 0.0,
            top_texture_rotation_y: 0.0,
            visible_faces: FaceSet::ALL,
        }
    }

    /// Full block resting on the floor of `cell`.
    pub fn at_cell(cell: CellCoord, kind: BlockTypeId, height: f32, block_size: f32) -> Self {
        Self::at_cell_shaped(cell, kind, BlockShape::FullBlock, height, block_size)
    }

    /// Block of any shape placed in `cell`. Slabs sit in the lower or upper
    /// half of the block's height span.
    pub fn at_cell_shaped(
        cell: CellCoord,
        kind: BlockTypeId,
        shape: BlockShape,
        height: f32,
        block_size: f32,
    ) -> Self {
        let corner = cell_min_corner(cell, block_size);
        let span = height * block_size;
        let y = match shape {
            BlockShape::SlabBottom => span * 0.25,
            BlockShape::SlabTop => span * 0.75,
            _ => span * 0.5,
        };
        let position = corner + Vec3::new(block_size * 0.5, y, block_size * 0.5);
        Self::new(position, kind, shape)
    }

    pub fn with_rotation(mut self, rotation_y: f32) -> Self {
        self.rotation_y = rotation_y;
        self
    }

    pub fn with_texture_rotation(mut self, side: f32, top: f32) -> Self {
        self.texture_rotation_y = side;
        self.top_texture_rotation_y = top;
        self
    }

    /// Voxel cell holding this block.
    pub fn cell(&self, block_size: f32) -> CellCoord {
        position_to_cell(self.position, block_size)
    }

    /// Half extents of the block's box before rotation.
    pub fn half_extents(&self, height: f32, block_size: f32) -> Vec3 {
        let half = block_size * 0.5;
        let half_height = height * block_size * 0.5;
        match self.shape {
            BlockShape::SlabBottom | BlockShape::SlabTop => Vec3::new(half, half_height * 0.5, half),
            BlockShape::VerticalSlab => {
                let quarter = block_size * 0.25;
                if quarter_turns(self.rotation_y) % 2 == 1 {
                    Vec3::new(quarter, half_height, half)
                } else {
                    Vec3::new(half, half_height, quarter)
                }
            }
            _ => Vec3::new(half, half_height, half),
        }
    }

    /// World-space collision box for this block given its type's height.
    pub fn collision_bounds(&self, height: f32, block_size: f32) -> Aabb {
        Aabb::from_center_half_extents(self.position, self.half_extents(height, block_size))
    }
}

/// Serializable description of a block for external save/load code.
/// Face visibility is left out; it is recomputed after loading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockDescriptor {
    pub position: Vec3,
    pub kind: BlockTypeId,
    #[serde(default)]
    pub shape: BlockShape,
    #[serde(default)]
    pub rotation_y: f32,
    #[serde(default)]
    pub texture_rotation_y: f32,
    #[serde(default)]
    pub top_texture_rotation_y: f32,
}

impl From<&Block> for BlockDescriptor {
    fn from(block: &Block) -> Self {
        Self {
            position: block.position,
            kind: block.kind,
            shape: block.shape,
            rotation_y: block.rotation_y,
            texture_rotation_y: block.texture_rotation_y,
            top_texture_rotation_y: block.top_texture_rotation_y,
        }
    }
}

impl Block {
    pub fn from_descriptor(desc: &BlockDescriptor) -> Self {
        Self::new(desc.position, desc.kind, desc.shape)
            .with_rotation(desc.rotation_y)
            .with_texture_rotation(desc.texture_rotation_y, desc.top_texture_rotation_y)
    }
}
