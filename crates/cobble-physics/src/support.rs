//! Support height queries: what a character standing at (x, z) rests on.

use cobble_core::math::{position_to_cell, quarter_turns};
use cobble_core::{Block, BlockRegistry, BlockShape, PhysicsConfig};
use cobble_world::ChunkManager;
use glam::{IVec3, Quat, Vec3};

use crate::collidable::Collidables;

/// Walkable top of one block under a square footprint of half-size `radius`
/// around (x, z), or `None` when the footprint misses the block.
pub fn block_support_top(
    block: &Block,
    registry: &BlockRegistry,
    block_size: f32,
    x: f32,
    z: f32,
    radius: f32,
) -> Option<f32> {
    if !registry.has_collision(block.kind) {
        return None;
    }
    let height = registry.height(block.kind);
    let bounds = block.collision_bounds(height, block_size);
    if !bounds.overlaps_xz(x, z, radius) {
        return None;
    }
    match block.shape {
        BlockShape::Wedge => {
            let local = to_block_local(block, x, z);
            let half = block_size * 0.5;
            // Ramp rises along local +Z; take the highest point under the footprint.
            let v = (local.z + radius).clamp(-half, half);
            let t = (v + half) / block_size;
            Some(bounds.min.y + t * (bounds.max.y - bounds.min.y))
        }
        BlockShape::CornerWedge => {
            let local = to_block_local(block, x, z);
            let half = block_size * 0.5;
            let inside = local.x >= -half && local.z >= -half && local.x + local.z <= 0.0;
            inside.then_some(bounds.max.y)
        }
        _ => Some(bounds.max.y),
    }
}

// World (x, z) expressed in the block's unrotated frame.
fn to_block_local(block: &Block, x: f32, z: f32) -> Vec3 {
    let turns = quarter_turns(block.rotation_y);
    let angle = turns as f32 * std::f32::consts::FRAC_PI_2;
    let offset = Vec3::new(x - block.position.x, 0.0, z - block.position.z);
    Quat::from_rotation_y(-angle) * offset
}

/// Support lookups over the block grid and the external collidables.
pub struct SupportQuery<'w> {
    world: &'w ChunkManager,
    collidables: &'w Collidables<'w>,
    config: &'w PhysicsConfig,
}

impl<'w> SupportQuery<'w> {
    pub fn new(
        world: &'w ChunkManager,
        collidables: &'w Collidables<'w>,
        config: &'w PhysicsConfig,
    ) -> Self {
        Self {
            world,
            collidables,
            config,
        }
    }

    /// Highest support at or below `ceiling` under the footprint. Falls back
    /// to the configured ground height when nothing qualifies.
    pub fn highest_support(&self, x: f32, z: f32, ceiling: f32, radius: f32) -> f32 {
        self.best_support(x, z, radius, |top| top <= ceiling)
    }

    /// Support the feet already rest on: tops no higher than `foot` plus the
    /// strict tolerance.
    pub fn strict_support(&self, x: f32, z: f32, foot: f32, radius: f32) -> f32 {
        let limit = foot + self.config.strict_support_tolerance;
        self.best_support(x, z, radius, |top| top <= limit)
    }

    fn best_support(&self, x: f32, z: f32, radius: f32, accept: impl Fn(f32) -> bool) -> f32 {
        let mut best: Option<f32> = None;
        let mut consider = |top: f32| {
            if accept(top) && best.map_or(true, |b| top > b) {
                best = Some(top);
            }
        };

        let registry = self.world.registry();
        let block_size = self.world.block_size();
        let min_cell = position_to_cell(Vec3::new(x - radius, 0.0, z - radius), block_size);
        let max_cell = position_to_cell(Vec3::new(x + radius, 0.0, z + radius), block_size);
        for cx in min_cell.x..=max_cell.x {
            for cz in min_cell.z..=max_cell.z {
                let column_x = (cx as f32 + 0.5) * block_size;
                let column_z = (cz as f32 + 0.5) * block_size;
                for block in self.world.blocks_in_column(column_x, column_z) {
                    if let Some(top) = block_support_top(block, registry, block_size, x, z, radius) {
                        if !self.is_covered(block, top) {
                            consider(top);
                        }
                    }
                }
            }
        }

        for building in self.collidables.buildings {
            let bounds = building.bounds();
            if bounds.overlaps_xz(x, z, radius) {
                consider(bounds.max.y);
            }
        }
        for interior in self.collidables.interiors {
            if !interior.has_collision() || !interior.is_3d() {
                continue;
            }
            let bounds = interior.bounds();
            if bounds.overlaps_xz(x, z, radius) {
                consider(bounds.max.y);
            }
        }

        best.unwrap_or(self.config.ground_fallback_y)
    }

    // A top with a solid block resting directly on it is not walkable.
    fn is_covered(&self, block: &Block, top: f32) -> bool {
        let registry = self.world.registry();
        let block_size = self.world.block_size();
        let above = block.cell(block_size) + IVec3::Y;
        self.world.block_at_cell(above).is_some_and(|b| {
            registry.has_collision(b.kind)
                && b.collision_bounds(registry.height(b.kind), block_size).min.y <= top + 1e-4
        })
    }
}
