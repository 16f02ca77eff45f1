//! Collision predicates supplied by collaborators outside the block grid.
//!
//! The resolver only ever asks yes/no questions of buildings and interior
//! props; it never looks at their geometry beyond the bounds used for
//! support heights.

use cobble_core::Aabb;
use glam::Vec3;

/// A building with its own precise collision mesh.
pub trait BuildingCollider {
    fn collides_with_mesh(&self, bounds: &Aabb) -> bool;
    /// World bounds; the top counts as walkable support.
    fn bounds(&self) -> Aabb;
}

/// Furniture and other props placed inside or around buildings.
pub trait InteriorCollider {
    fn has_collision(&self) -> bool;
    /// 3D props test against their mesh and can be stood on. Flat props use
    /// the 2D footprint test only.
    fn is_3d(&self) -> bool;
    fn collides_with_mesh(&self, bounds: &Aabb) -> bool;
    fn collides_2d(&self, center: Vec3, radius: f32) -> bool;
    fn bounds(&self) -> Aabb;
}

/// Solid box standing in for a building mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxBuilding {
    pub bounds: Aabb,
}

impl BuildingCollider for BoxBuilding {
    fn collides_with_mesh(&self, bounds: &Aabb) -> bool {
        self.bounds.intersects(bounds)
    }

    fn bounds(&self) -> Aabb {
        self.bounds
    }
}

/// Solid 3D prop (tables, crates) collided by its bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxProp {
    pub bounds: Aabb,
    pub has_collision: bool,
}

impl InteriorCollider for BoxProp {
    fn has_collision(&self) -> bool {
        self.has_collision
    }

    fn is_3d(&self) -> bool {
        true
    }

    fn collides_with_mesh(&self, bounds: &Aabb) -> bool {
        self.bounds.intersects(bounds)
    }

    fn collides_2d(&self, center: Vec3, radius: f32) -> bool {
        self.bounds.overlaps_xz(center.x, center.z, radius)
    }

    fn bounds(&self) -> Aabb {
        self.bounds
    }
}

/// Billboard prop (doors, posters) with a rectangular footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatProp {
    pub position: Vec3,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub scale: Vec3,
    pub has_collision: bool,
}

impl FlatProp {
    fn half_width(&self) -> f32 {
        self.width * self.scale.x * 0.5
    }

    // Flat props get a deeper footprint than their art so characters cannot
    // clip through them edge-on.
    fn half_depth(&self) -> f32 {
        self.depth * self.scale.z * 0.8
    }
}

impl InteriorCollider for FlatProp {
    fn has_collision(&self) -> bool {
        self.has_collision
    }

    fn is_3d(&self) -> bool {
        false
    }

    fn collides_with_mesh(&self, bounds: &Aabb) -> bool {
        self.bounds().intersects(bounds)
    }

    fn collides_2d(&self, center: Vec3, radius: f32) -> bool {
        let dx = (center.x - self.position.x).abs();
        let dz = (center.z - self.position.z).abs();
        dx <= self.half_width() + radius && dz <= self.half_depth() + radius
    }

    fn bounds(&self) -> Aabb {
        let half = Vec3::new(
            self.half_width(),
            self.height * self.scale.y * 0.5,
            self.half_depth(),
        );
        Aabb::from_center_half_extents(self.position, half)
    }
}

/// Everything outside the block grid a character can bump into this tick.
#[derive(Clone, Copy, Default)]
pub struct Collidables<'a> {
    pub buildings: &'a [&'a dyn BuildingCollider],
    pub interiors: &'a [&'a dyn InteriorCollider],
}

impl<'a> Collidables<'a> {
    pub fn new(
        buildings: &'a [&'a dyn BuildingCollider],
        interiors: &'a [&'a dyn InteriorCollider],
    ) -> Self {
        Self {
            buildings,
            interiors,
        }
    }

    /// No buildings and no props.
    pub fn none() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn door() -> FlatProp {
        FlatProp {
            position: Vec3::new(0.0, 1.0, 0.0),
            width: 2.0,
            height: 2.0,
            depth: 0.5,
            scale: Vec3::ONE,
            has_collision: true,
        }
    }

    #[test]
    fn test_flat_prop_rectangle() {
        let d = door();
        // half width 1.0, half depth 0.4
        assert!(d.collides_2d(Vec3::new(1.2, 0.0, 0.0), 0.2));
        assert!(!d.collides_2d(Vec3::new(1.3, 0.0, 0.0), 0.2));
        assert!(d.collides_2d(Vec3::new(0.0, 0.0, 0.6), 0.2));
        assert!(!d.collides_2d(Vec3::new(0.0, 0.0, 0.7), 0.2));
    }

    #[test]
    fn test_box_building_mesh_test() {
        let b = BoxBuilding {
            bounds: Aabb::new(Vec3::ZERO, Vec3::splat(10.0)),
        };
        let inside = Aabb::from_center_half_extents(Vec3::splat(5.0), Vec3::ONE);
        let outside = Aabb::from_center_half_extents(Vec3::splat(20.0), Vec3::ONE);
        assert!(b.collides_with_mesh(&inside));
        assert!(!b.collides_with_mesh(&outside));
    }

    #[test]
    fn test_collidables_none_is_empty() {
        let c = Collidables::none();
        assert!(c.buildings.is_empty());
        assert!(c.interiors.is_empty());
    }
}
