use cobble_core::Aabb;
use glam::{Mat4, Vec3, Vec4};

/// View frustum as six inward-facing planes: left, right, bottom, top,
/// near, far. Each plane is `(normal, d)` with `dot(normal, p) + d >= 0`
/// inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract planes from a view-projection matrix (Gribb-Hartmann).
    /// Assumes glam's 0..1 clip depth, so the near plane is row 2 alone.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let row0 = vp.row(0);
        let row1 = vp.row(1);
        let row2 = vp.row(2);
        let row3 = vp.row(3);

        Self {
            planes: [
                Self::normalize_plane(row3 + row0),
                Self::normalize_plane(row3 - row0),
                Self::normalize_plane(row3 + row1),
                Self::normalize_plane(row3 - row1),
                Self::normalize_plane(row2),
                Self::normalize_plane(row3 - row2),
            ],
        }
    }

    #[inline]
    fn normalize_plane(plane: Vec4) -> Vec4 {
        let normal_length = plane.truncate().length();
        if normal_length > 0.0001 {
            plane / normal_length
        } else {
            plane
        }
    }

    /// True if the box is at least partially inside every plane.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let (min, max) = (aabb.min, aabb.max);
        for plane in &self.planes {
            // Corner furthest along the plane normal.
            let p_vertex = Vec3::new(
                if plane.x > 0.0 { max.x } else { min.x },
                if plane.y > 0.0 { max.y } else { min.y },
                if plane.z > 0.0 { max.z } else { min.z },
            );
            if plane.truncate().dot(p_vertex) + plane.w < 0.0 {
                return false;
            }
        }
        true
    }
}
