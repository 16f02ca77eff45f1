use glam::{IVec3, Vec3};

use crate::math::{quarter_turns, rotate_offset_y};

/// One of the six faces of a cube-shaped block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlockFace {
    Top = 0,
    Bottom = 1,
    /// +Z
    Front = 2,
    /// -Z
    Back = 3,
    /// +X
    Right = 4,
    /// -X
    Left = 5,
}

/// All six faces in bit order.
pub const ALL_FACES: [BlockFace; 6] = [
    BlockFace::Top,
    BlockFace::Bottom,
    BlockFace::Front,
    BlockFace::Back,
    BlockFace::Right,
    BlockFace::Left,
];

impl BlockFace {
    /// Unrotated neighbor offset for this face. Y-up convention.
    pub fn offset(self) -> IVec3 {
        match self {
            BlockFace::Top => IVec3::new(0, 1, 0),
            BlockFace::Bottom => IVec3::new(0, -1, 0),
            BlockFace::Front => IVec3::new(0, 0, 1),
            BlockFace::Back => IVec3::new(0, 0, -1),
            BlockFace::Right => IVec3::new(1, 0, 0),
            BlockFace::Left => IVec3::new(-1, 0, 0),
        }
    }

    pub fn normal(self) -> Vec3 {
        self.offset().as_vec3()
    }

    pub fn opposite(self) -> BlockFace {
        match self {
            BlockFace::Top => BlockFace::Bottom,
            BlockFace::Bottom => BlockFace::Top,
            BlockFace::Front => BlockFace::Back,
            BlockFace::Back => BlockFace::Front,
            BlockFace::Right => BlockFace::Left,
            BlockFace::Left => BlockFace::Right,
        }
    }

    /// Neighbor offset once the owning block is rotated about Y.
    /// The rotation is snapped to quarter turns, same as the geometry.
    pub fn rotated_offset(self, rotation_y_deg: f32) -> IVec3 {
        rotate_offset_y(self.offset(), quarter_turns(rotation_y_deg))
    }

    pub fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Compact set of visible faces, one bit per [`BlockFace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FaceSet(u8);

impl FaceSet {
    pub const EMPTY: FaceSet = FaceSet(0);
    pub const ALL: FaceSet = FaceSet(0b0011_1111);

    pub fn contains(self, face: BlockFace) -> bool {
        self.0 & face.bit() != 0
    }

    pub fn insert(&mut self, face: BlockFace) {
        self.0 |= face.bit();
    }

    pub fn remove(&mut self, face: BlockFace) {
        self.0 &= !face.bit();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = BlockFace> {
        ALL_FACES.into_iter().filter(move |f| self.contains(*f))
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl FromIterator<BlockFace> for FaceSet {
    fn from_iter<I: IntoIterator<Item = BlockFace>>(iter: I) -> Self {
        let mut set = FaceSet::EMPTY;
        for face in iter {
            set.insert(face);
        }
        set
    }
}
