//! Local-space geometry for every block shape.
//!
//! Geometry is centred on the block's model origin (the block position) and
//! built unrotated; the mesh builder applies the block's Y rotation when it
//! merges the geometry into a chunk. Results are cached per shape, face set,
//! height and texture rotation, so a chunk full of identical blocks builds
//! each variant once.

use std::collections::HashMap;

use cobble_core::math::quarter_turns;
use cobble_core::{BlockFace, BlockShape, FaceSet};
use glam::Vec3;

use crate::mesh::MeshVertex;

const BASE_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Chamfer of the octagonal pillar, as a fraction of the half width.
const PILLAR_CHAMFER: f32 = 0.414;

/// Unrotated geometry of one block variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeGeometry {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl ShapeGeometry {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3, uv: [f32; 2]) -> u32 {
        self.vertices.push(MeshVertex::new(position, normal, uv));
        (self.vertices.len() - 1) as u32
    }

    /// Corners must be counter-clockwise seen from outside.
    fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3, uvs: [[f32; 2]; 4]) {
        let base = self.vertices.len() as u32;
        for (corner, uv) in corners.into_iter().zip(uvs) {
            self.push_vertex(corner, normal, uv);
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    fn push_triangle(&mut self, corners: [Vec3; 3], normal: Vec3, uvs: [[f32; 2]; 3]) {
        let base = self.vertices.len() as u32;
        for (corner, uv) in corners.into_iter().zip(uvs) {
            self.push_vertex(corner, normal, uv);
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
}

/// Quad UVs rotated by whole quarter turns.
pub fn rotated_uvs(rotation_deg: f32) -> [[f32; 2]; 4] {
    let steps = quarter_turns(rotation_deg) as usize;
    std::array::from_fn(|i| BASE_UVS[(i + steps) % 4])
}

/// Counter-clockwise corners of one face of a box with half extents `h`.
fn box_face_corners(face: BlockFace, h: Vec3) -> [Vec3; 4] {
    let (x, y, z) = (h.x, h.y, h.z);
    match face {
        BlockFace::Top => [
            Vec3::new(-x, y, z),
            Vec3::new(x, y, z),
            Vec3::new(x, y, -z),
            Vec3::new(-x, y, -z),
        ],
        BlockFace::Bottom => [
            Vec3::new(-x, -y, -z),
            Vec3::new(x, -y, -z),
            Vec3::new(x, -y, z),
            Vec3::new(-x, -y, z),
        ],
        BlockFace::Front => [
            Vec3::new(-x, -y, z),
            Vec3::new(x, -y, z),
            Vec3::new(x, y, z),
            Vec3::new(-x, y, z),
        ],
        BlockFace::Back => [
            Vec3::new(x, -y, -z),
            Vec3::new(-x, -y, -z),
            Vec3::new(-x, y, -z),
            Vec3::new(x, y, -z),
        ],
        BlockFace::Right => [
            Vec3::new(x, -y, z),
            Vec3::new(x, -y, -z),
            Vec3::new(x, y, -z),
            Vec3::new(x, y, z),
        ],
        BlockFace::Left => [
            Vec3::new(-x, -y, -z),
            Vec3::new(-x, -y, z),
            Vec3::new(-x, y, z),
            Vec3::new(-x, y, -z),
        ],
    }
}

/// Box with the given faces. Sides and top take their own UV rotation;
/// the bottom is never rotated.
fn build_box(faces: FaceSet, half: Vec3, side_rot: f32, top_rot: f32) -> ShapeGeometry {
    let side_uvs = rotated_uvs(side_rot);
    let top_uvs = rotated_uvs(top_rot);
    let mut geom = ShapeGeometry::default();
    for face in faces.iter() {
        let uvs = match face {
            BlockFace::Top => top_uvs,
            BlockFace::Bottom => BASE_UVS,
            _ => side_uvs,
        };
        geom.push_quad(box_face_corners(face, half), face.normal(), uvs);
    }
    geom
}

fn build_pillar(half: f32, half_height: f32) -> ShapeGeometry {
    let c = half * PILLAR_CHAMFER;
    let ring: [(f32, f32); 8] = [
        (-half + c, -half),
        (half - c, -half),
        (half, -half + c),
        (half, half - c),
        (half - c, half),
        (-half + c, half),
        (-half, half - c),
        (-half, -half + c),
    ];
    let top: Vec<Vec3> = ring.iter().map(|&(x, z)| Vec3::new(x, half_height, z)).collect();
    let bottom: Vec<Vec3> = ring.iter().map(|&(x, z)| Vec3::new(x, -half_height, z)).collect();
    let cap_uv = |p: Vec3| [(p.x + half) / (2.0 * half), (p.z + half) / (2.0 * half)];

    let mut geom = ShapeGeometry::default();
    // The ring winds clockwise seen from above, so the top fan reverses it.
    for i in 1..7 {
        let (a, b, d) = (top[0], top[i + 1], top[i]);
        geom.push_triangle([a, b, d], Vec3::Y, [cap_uv(a), cap_uv(b), cap_uv(d)]);
        let (a, b, d) = (bottom[0], bottom[i], bottom[i + 1]);
        geom.push_triangle([a, b, d], Vec3::NEG_Y, [cap_uv(a), cap_uv(b), cap_uv(d)]);
    }
    for i in 0..8 {
        let j = (i + 1) % 8;
        let mid = (bottom[i] + bottom[j]) * 0.5;
        let normal = Vec3::new(mid.x, 0.0, mid.z).normalize_or_zero();
        geom.push_quad([bottom[i], top[i], top[j], bottom[j]], normal, [
            [0.0, 0.0],
            [0.0, 1.0],
            [1.0, 1.0],
            [1.0, 0.0],
        ]);
    }
    geom
}

/// Ramp rising from local -Z (floor) to +Z (full height).
fn build_wedge(half: f32, half_height: f32, side_rot: f32) -> ShapeGeometry {
    let (h, hh) = (half, half_height);
    let v0 = Vec3::new(-h, -hh, h);
    let v1 = Vec3::new(h, -hh, h);
    let v2 = Vec3::new(-h, hh, h);
    let v3 = Vec3::new(h, hh, h);
    let v4 = Vec3::new(-h, -hh, -h);
    let v5 = Vec3::new(h, -hh, -h);
    let side_uvs = rotated_uvs(side_rot);

    let mut geom = ShapeGeometry::default();
    geom.push_quad([v4, v5, v1, v0], Vec3::NEG_Y, BASE_UVS);
    geom.push_quad([v0, v1, v3, v2], Vec3::Z, side_uvs);
    geom.push_triangle([v4, v0, v2], Vec3::NEG_X, [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
    geom.push_triangle([v1, v5, v3], Vec3::X, [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
    let slope = (v2 - v4).cross(v3 - v4).normalize_or_zero();
    geom.push_quad([v4, v2, v3, v5], slope, [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]);
    geom
}

/// Triangular prism filling the local -X/-Z corner.
fn build_corner_wedge(half: f32, half_height: f32, side_rot: f32, top_rot: f32) -> ShapeGeometry {
    let (h, hh) = (half, half_height);
    let bc = Vec3::new(-h, -hh, -h);
    let bx = Vec3::new(h, -hh, -h);
    let bz = Vec3::new(-h, -hh, h);
    let tc = Vec3::new(-h, hh, -h);
    let tx = Vec3::new(h, hh, -h);
    let tz = Vec3::new(-h, hh, h);
    let side_uvs = rotated_uvs(side_rot);
    let top_uvs = rotated_uvs(top_rot);

    let mut geom = ShapeGeometry::default();
    geom.push_triangle([bc, bx, bz], Vec3::NEG_Y, [BASE_UVS[0], BASE_UVS[1], BASE_UVS[3]]);
    geom.push_triangle([tc, tz, tx], Vec3::Y, [top_uvs[0], top_uvs[3], top_uvs[1]]);
    geom.push_quad([bx, bc, tc, tx], Vec3::NEG_Z, side_uvs);
    geom.push_quad([bc, bz, tz, tc], Vec3::NEG_X, side_uvs);
    let diagonal = Vec3::new(1.0, 0.0, 1.0).normalize();
    geom.push_quad([bz, bx, tx, tz], diagonal, side_uvs);
    geom
}

/// Build local geometry for a block variant. `faces` only applies to
/// [`BlockShape::FullBlock`]; other shapes always emit every surface.
pub fn build_shape(
    shape: BlockShape,
    faces: FaceSet,
    height: f32,
    block_size: f32,
    side_rot: f32,
    top_rot: f32,
) -> ShapeGeometry {
    let half = block_size * 0.5;
    let half_height = height * block_size * 0.5;
    match shape {
        BlockShape::FullBlock => build_box(faces, Vec3::new(half, half_height, half), side_rot, top_rot),
        BlockShape::SlabBottom | BlockShape::SlabTop => build_box(
            FaceSet::ALL,
            Vec3::new(half, half_height * 0.5, half),
            side_rot,
            top_rot,
        ),
        BlockShape::VerticalSlab => build_box(
            FaceSet::ALL,
            Vec3::new(half, half_height, block_size * 0.25),
            side_rot,
            top_rot,
        ),
        BlockShape::Pillar => build_pillar(half, half_height),
        BlockShape::Wedge => build_wedge(half, half_height, side_rot),
        BlockShape::CornerWedge => build_corner_wedge(half, half_height, side_rot, top_rot),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ShapeKey {
    shape: BlockShape,
    faces: u8,
    height_bits: u32,
    side_turns: u8,
    top_turns: u8,
}

/// Cache of built shape geometry for one block size.
#[derive(Debug, Default)]
pub struct ShapeCache {
    block_size: f32,
    entries: HashMap<ShapeKey, ShapeGeometry>,
}

impl ShapeCache {
    pub fn new(block_size: f32) -> Self {
        Self {
            block_size,
            entries: HashMap::new(),
        }
    }

    pub fn get_or_build(
        &mut self,
        shape: BlockShape,
        faces: FaceSet,
        height: f32,
        side_rot: f32,
        top_rot: f32,
    ) -> &ShapeGeometry {
        let faces = if shape.is_full() { faces } else { FaceSet::ALL };
        let key = ShapeKey {
            shape,
            faces: faces.bits(),
            height_bits: height.to_bits(),
            side_turns: quarter_turns(side_rot),
            top_turns: quarter_turns(top_rot),
        };
        let block_size = self.block_size;
        self.entries
            .entry(key)
            .or_insert_with(|| build_shape(shape, faces, height, block_size, side_rot, top_rot))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BS: f32 = 4.0;

    /// Every triangle's winding must agree with its vertex normal.
    fn assert_outward(geom: &ShapeGeometry) {
        for tri in geom.indices.chunks(3) {
            let p: Vec<Vec3> = tri
                .iter()
                .map(|&i| Vec3::from_array(geom.vertices[i as usize].position))
                .collect();
            let n = Vec3::from_array(geom.vertices[tri[0] as usize].normal);
            let winding = (p[1] - p[0]).cross(p[2] - p[0]);
            assert!(winding.dot(n) > 0.0, "triangle {p:?} winds against normal {n:?}");
        }
    }

    #[test]
    fn test_rotated_uvs() {
        assert_eq!(rotated_uvs(0.0), BASE_UVS);
        assert_eq!(rotated_uvs(90.0)[0], BASE_UVS[1]);
        assert_eq!(rotated_uvs(-90.0)[0], BASE_UVS[3]);
        assert_eq!(rotated_uvs(360.0), BASE_UVS);
    }

    #[test]
    fn test_full_block_face_count() {
        let geom = build_shape(BlockShape::FullBlock, FaceSet::ALL, 1.0, BS, 0.0, 0.0);
        assert_eq!(geom.vertices.len(), 24);
        assert_eq!(geom.indices.len(), 36);
        let top_only: FaceSet = [BlockFace::Top].into_iter().collect();
        let geom = build_shape(BlockShape::FullBlock, top_only, 1.0, BS, 0.0, 0.0);
        assert_eq!(geom.vertices.len(), 4);
    }

    #[test]
    fn test_full_block_height_multiplier() {
        let geom = build_shape(BlockShape::FullBlock, FaceSet::ALL, 0.5, BS, 0.0, 0.0);
        let max_y = geom.vertices.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max);
        assert!((max_y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_face_set_is_empty() {
        let geom = build_shape(BlockShape::FullBlock, FaceSet::EMPTY, 1.0, BS, 0.0, 0.0);
        assert!(geom.is_empty());
    }

    #[test]
    fn test_all_shapes_wind_outward() {
        for shape in [
            BlockShape::FullBlock,
            BlockShape::SlabBottom,
            BlockShape::SlabTop,
            BlockShape::VerticalSlab,
            BlockShape::Pillar,
            BlockShape::Wedge,
            BlockShape::CornerWedge,
        ] {
            let geom = build_shape(shape, FaceSet::ALL, 1.0, BS, 90.0, 180.0);
            assert!(!geom.is_empty(), "{shape:?} has no geometry");
            assert_outward(&geom);
        }
    }

    #[test]
    fn test_shapes_stay_inside_cell() {
        for shape in [BlockShape::Pillar, BlockShape::Wedge, BlockShape::CornerWedge] {
            let geom = build_shape(shape, FaceSet::ALL, 1.0, BS, 0.0, 0.0);
            for v in &geom.vertices {
                for c in v.position {
                    assert!(c.abs() <= 2.0 + 1e-5, "{shape:?} vertex outside cell: {c}");
                }
            }
        }
    }

    #[test]
    fn test_cache_reuses_variants() {
        let mut cache = ShapeCache::new(BS);
        cache.get_or_build(BlockShape::Pillar, FaceSet::EMPTY, 1.0, 0.0, 0.0);
        cache.get_or_build(BlockShape::Pillar, FaceSet::ALL, 1.0, 360.0, 0.0);
        assert_eq!(cache.len(), 1, "pillar ignores faces and full-turn rotation");
        cache.get_or_build(BlockShape::Pillar, FaceSet::ALL, 0.5, 0.0, 0.0);
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
