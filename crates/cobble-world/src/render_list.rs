use cobble_core::math::position_to_chunk;
use cobble_core::types::ChunkCoord;
use cobble_core::Aabb;
use glam::{Mat4, Vec3};

use crate::chunk_map::ChunkMap;
use crate::frustum::Frustum;
use crate::mesh::ChunkMesh;

/// Camera state needed to pick which chunks to draw.
#[derive(Debug, Clone, Copy)]
pub struct RenderCamera {
    pub position: Vec3,
    pub frustum: Frustum,
}

impl RenderCamera {
    pub fn new(position: Vec3, view_projection: &Mat4) -> Self {
        Self {
            position,
            frustum: Frustum::from_view_projection(view_projection),
        }
    }
}

/// Receiver of the chunk meshes selected for drawing this frame.
pub trait RenderSink {
    fn submit(&mut self, coord: ChunkCoord, mesh: &ChunkMesh, bounds: &Aabb);
}

impl RenderSink for Vec<ChunkCoord> {
    fn submit(&mut self, coord: ChunkCoord, _mesh: &ChunkMesh, _bounds: &Aabb) {
        self.push(coord);
    }
}

/// Whether a chunk lies in the horizontal square window around the camera.
pub fn within_render_distance(camera_chunk: ChunkCoord, coord: ChunkCoord, distance: i32) -> bool {
    (coord.x - camera_chunk.x).abs() <= distance && (coord.z - camera_chunk.z).abs() <= distance
}

/// Meshed chunks that pass the distance window and then the frustum,
/// sorted by coordinate.
pub fn visible_chunks(
    map: &ChunkMap,
    camera: &RenderCamera,
    render_distance: i32,
) -> Vec<ChunkCoord> {
    let camera_chunk = position_to_chunk(camera.position, map.block_size());
    let mut list: Vec<ChunkCoord> = map
        .iter()
        .filter(|(coord, chunk)| {
            chunk.mesh().is_some()
                && within_render_distance(camera_chunk, **coord, render_distance)
                && camera.frustum.intersects_aabb(&chunk.bounds())
        })
        .map(|(coord, _)| *coord)
        .collect();
    list.sort_by_key(|c| (c.x, c.y, c.z));
    list
}

/// Submit every visible chunk's mesh to `sink`. Returns the number submitted.
pub fn submit_visible(
    map: &ChunkMap,
    camera: &RenderCamera,
    render_distance: i32,
    sink: &mut impl RenderSink,
) -> usize {
    let list = visible_chunks(map, camera, render_distance);
    let mut submitted = 0;
    for coord in &list {
        if let Some(chunk) = map.get(coord) {
            if let Some(mesh) = chunk.mesh() {
                sink.submit(*coord, mesh, &chunk.bounds());
                submitted += 1;
            }
        }
    }
    submitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;

    use crate::mesh::ChunkMesh;

    const BS: f32 = 4.0;

    fn top_down_camera(position: Vec3) -> RenderCamera {
        // Looking straight down with a wide far plane sees every chunk below.
        let view = Mat4::look_at_rh(position, position - Vec3::Y, Vec3::NEG_Z);
        let proj = Mat4::perspective_rh(170f32.to_radians(), 1.0, 0.1, 10_000.0);
        RenderCamera::new(position, &(proj * view))
    }

    fn meshed_map(coords: &[IVec3]) -> ChunkMap {
        let mut map = ChunkMap::new(BS);
        for &c in coords {
            map.get_or_create(c).set_mesh(Some(ChunkMesh::default()));
        }
        map
    }

    #[test]
    fn test_window_is_square_on_xz() {
        assert!(within_render_distance(IVec3::ZERO, IVec3::new(2, 9, -2), 2));
        assert!(!within_render_distance(IVec3::ZERO, IVec3::new(3, 0, 0), 2));
        assert!(!within_render_distance(IVec3::ZERO, IVec3::new(0, 0, -3), 2));
    }

    #[test]
    fn test_distance_window_applied() {
        let map = meshed_map(&[IVec3::new(0, -1, 0), IVec3::new(1, -1, 1), IVec3::new(5, -1, 0)]);
        let camera = top_down_camera(Vec3::new(32.0, 200.0, 32.0));
        let visible = visible_chunks(&map, &camera, 2);
        assert_eq!(visible, vec![IVec3::new(0, -1, 0), IVec3::new(1, -1, 1)]);
    }

    #[test]
    fn test_frustum_applied() {
        let map = meshed_map(&[IVec3::new(0, 0, 0), IVec3::new(0, 10, 0)]);
        // Camera at y=300 looking down: the chunk spanning y 640..704 is behind it.
        let camera = top_down_camera(Vec3::new(32.0, 300.0, 32.0));
        let visible = visible_chunks(&map, &camera, 8);
        assert_eq!(visible, vec![IVec3::ZERO]);
    }

    #[test]
    fn test_unmeshed_chunks_skipped() {
        let mut map = meshed_map(&[IVec3::ZERO]);
        map.get_or_create(IVec3::new(1, 0, 0));
        let camera = top_down_camera(Vec3::new(32.0, 300.0, 32.0));
        let mut sink: Vec<ChunkCoord> = Vec::new();
        let submitted = submit_visible(&map, &camera, 8, &mut sink);
        assert_eq!(submitted, 1);
        assert_eq!(sink, vec![IVec3::ZERO]);
    }
}
