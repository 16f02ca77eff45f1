use std::collections::BTreeMap;

use cobble_core::math::quarter_turns;
use cobble_core::types::BlockTypeId;
use cobble_core::{Block, BlockRegistry};
use glam::{Quat, Vec3};

use crate::chunk::Chunk;
use crate::geometry::{ShapeCache, ShapeGeometry};

/// Vertex layout handed to the renderer. Tightly packed for direct upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: Vec3, normal: Vec3, uv: [f32; 2]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv,
        }
    }
}

/// All geometry of one material inside a chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPart {
    pub material: BlockTypeId,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshPart {
    fn new(material: BlockTypeId) -> Self {
        Self {
            material,
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Append local-space geometry placed at `origin` and turned by `rotation`.
    fn append(&mut self, geometry: &ShapeGeometry, origin: Vec3, rotation: Quat) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(geometry.vertices.iter().map(|v| {
            let position = origin + rotation * Vec3::from_array(v.position);
            let normal = rotation * Vec3::from_array(v.normal);
            MeshVertex::new(position, normal, v.uv)
        }));
        self.indices.extend(geometry.indices.iter().map(|i| base + i));
    }

    /// Raw vertex bytes for GPU upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Merged geometry of a chunk, one part per material, ordered by material id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChunkMesh {
    pub parts: Vec<MeshPart>,
}

impl ChunkMesh {
    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(|p| p.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(|p| p.indices.len() / 3).sum()
    }

    pub fn part(&self, material: BlockTypeId) -> Option<&MeshPart> {
        self.parts.iter().find(|p| p.material == material)
    }
}

/// Merge every visible block of a chunk into a single mesh.
///
/// Full blocks contribute only the faces in their face set; other shapes
/// contribute their whole cached geometry. Returns None when nothing is
/// drawable.
pub fn build_chunk_mesh(
    chunk: &Chunk,
    registry: &BlockRegistry,
    cache: &mut ShapeCache,
) -> Option<ChunkMesh> {
    // Stable block order keeps rebuilds of unchanged chunks identical.
    let mut ordered: Vec<(&cobble_core::LocalCoord, &Block)> = chunk.blocks_with_local().collect();
    ordered.sort_by_key(|(local, _)| (local.y, local.z, local.x));

    let mut parts: BTreeMap<BlockTypeId, MeshPart> = BTreeMap::new();
    for (_, block) in ordered {
        let Some(def) = registry.get(block.kind) else {
            continue;
        };
        if !def.visible {
            continue;
        }
        let faces = if block.shape.is_full() {
            if block.visible_faces.is_empty() {
                continue;
            }
            block.visible_faces
        } else {
            cobble_core::FaceSet::ALL
        };
        let geometry = cache.get_or_build(
            block.shape,
            faces,
            def.height,
            block.texture_rotation_y,
            block.top_texture_rotation_y,
        );
        if geometry.is_empty() {
            continue;
        }
        let turns = quarter_turns(block.rotation_y);
        let rotation = Quat::from_rotation_y((turns as f32 * 90.0).to_radians());
        parts
            .entry(block.kind)
            .or_insert_with(|| MeshPart::new(block.kind))
            .append(geometry, block.position, rotation);
    }

    if parts.is_empty() {
        return None;
    }
    Some(ChunkMesh {
        parts: parts.into_values().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cobble_core::{BlockFace, BlockShape, FaceSet};
    use glam::IVec3;

    const BS: f32 = 4.0;

    fn registry() -> BlockRegistry {
        BlockRegistry::builtin().expect("builtin registry")
    }

    #[test]
    fn test_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 32);
    }

    #[test]
    fn test_empty_chunk_has_no_mesh() {
        let chunk = Chunk::new(IVec3::ZERO, BS);
        let mut cache = ShapeCache::new(BS);
        assert!(build_chunk_mesh(&chunk, &registry(), &mut cache).is_none());
    }

    #[test]
    fn test_fully_hidden_block_has_no_mesh() {
        let mut chunk = Chunk::new(IVec3::ZERO, BS);
        let mut block = Block::at_cell(IVec3::new(1, 1, 1), BlockTypeId(0), 1.0, BS);
        block.visible_faces = FaceSet::EMPTY;
        chunk.insert(block);
        let mut cache = ShapeCache::new(BS);
        assert!(build_chunk_mesh(&chunk, &registry(), &mut cache).is_none());
    }

    #[test]
    fn test_one_quad_per_visible_face() {
        let mut chunk = Chunk::new(IVec3::ZERO, BS);
        let mut block = Block::at_cell(IVec3::new(1, 1, 1), BlockTypeId(0), 1.0, BS);
        block.visible_faces = [BlockFace::Top, BlockFace::Left].into_iter().collect();
        chunk.insert(block);
        let mut cache = ShapeCache::new(BS);
        let mesh = build_chunk_mesh(&chunk, &registry(), &mut cache).expect("two faces");
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 4);
    }

    #[test]
    fn test_parts_grouped_by_material() {
        let mut chunk = Chunk::new(IVec3::ZERO, BS);
        chunk.insert(Block::at_cell(IVec3::new(0, 0, 0), BlockTypeId(3), 1.0, BS));
        chunk.insert(Block::at_cell(IVec3::new(4, 0, 0), BlockTypeId(1), 1.0, BS));
        chunk.insert(Block::at_cell(IVec3::new(8, 0, 0), BlockTypeId(3), 1.0, BS));
        let mut cache = ShapeCache::new(BS);
        let mesh = build_chunk_mesh(&chunk, &registry(), &mut cache).expect("geometry");
        let materials: Vec<_> = mesh.parts.iter().map(|p| p.material).collect();
        assert_eq!(materials, vec![BlockTypeId(1), BlockTypeId(3)]);
        assert_eq!(mesh.part(BlockTypeId(3)).map(|p| p.vertices.len()), Some(48));
    }

    #[test]
    fn test_invisible_and_unknown_types_skipped() {
        let mut chunk = Chunk::new(IVec3::ZERO, BS);
        // 7 is the invisible barrier in the builtin registry.
        chunk.insert(Block::at_cell(IVec3::new(0, 0, 0), BlockTypeId(7), 1.0, BS));
        chunk.insert(Block::at_cell(IVec3::new(2, 0, 0), BlockTypeId(999), 1.0, BS));
        let mut cache = ShapeCache::new(BS);
        assert!(build_chunk_mesh(&chunk, &registry(), &mut cache).is_none());
    }

    #[test]
    fn test_non_full_shape_ignores_face_set() {
        let mut chunk = Chunk::new(IVec3::ZERO, BS);
        let mut pillar =
            Block::at_cell_shaped(IVec3::new(2, 0, 2), BlockTypeId(3), BlockShape::Pillar, 1.0, BS);
        pillar.visible_faces = FaceSet::EMPTY;
        chunk.insert(pillar);
        let mut cache = ShapeCache::new(BS);
        let mesh = build_chunk_mesh(&chunk, &registry(), &mut cache).expect("pillar geometry");
        assert!(mesh.vertex_count() > 0);
    }

    #[test]
    fn test_vertices_positioned_in_world_space() {
        let mut chunk = Chunk::new(IVec3::new(1, 0, 0), BS);
        let block = Block::at_cell(IVec3::new(16, 0, 0), BlockTypeId(0), 1.0, BS);
        chunk.insert(block);
        let mut cache = ShapeCache::new(BS);
        let mesh = build_chunk_mesh(&chunk, &registry(), &mut cache).expect("geometry");
        for v in &mesh.parts[0].vertices {
            let p = Vec3::from_array(v.position);
            assert!(p.x >= 64.0 - 1e-4 && p.x <= 68.0 + 1e-4, "x out of cell: {p:?}");
            assert!(p.y >= -1e-4 && p.y <= 4.0 + 1e-4, "y out of cell: {p:?}");
        }
    }

    #[test]
    fn test_vertex_bytes_length() {
        let mut chunk = Chunk::new(IVec3::ZERO, BS);
        chunk.insert(Block::at_cell(IVec3::ZERO, BlockTypeId(0), 1.0, BS));
        let mut cache = ShapeCache::new(BS);
        let mesh = build_chunk_mesh(&chunk, &registry(), &mut cache).expect("geometry");
        let part = &mesh.parts[0];
        assert_eq!(part.vertex_bytes().len(), part.vertices.len() * 32);
        assert_eq!(part.index_bytes().len(), part.indices.len() * 4);
    }
}
