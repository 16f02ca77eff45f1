use cobble_core::{Aabb, Block, PhysicsConfig};
use cobble_world::ChunkManager;
use glam::Vec3;
use log::trace;

use crate::collidable::Collidables;
use crate::component::PhysicsComponent;
use crate::support::SupportQuery;

/// Resolves one character's movement against the block grid and the
/// external collidables, one tick at a time.
///
/// Holds a scratch buffer for nearby-block queries, so one instance must not
/// be shared across concurrent updates.
pub struct CharacterPhysics {
    config: PhysicsConfig,
    nearby: Vec<Block>,
}

impl CharacterPhysics {
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            nearby: Vec::new(),
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Advance `component` by one tick toward `desired` (x/z used, scaled by
    /// speed and `dt`). Returns whether the position changed.
    pub fn update(
        &mut self,
        component: &mut PhysicsComponent,
        desired: Vec3,
        dt: f32,
        world: &ChunkManager,
        collidables: &Collidables,
    ) -> bool {
        let original = component.position;
        let move_amount = component.speed * dt;
        let dx = desired.x * move_amount;
        let dz = desired.z * move_amount;

        if dx != 0.0 {
            let candidate = component.position + Vec3::new(dx, 0.0, 0.0);
            if self.try_step(component, candidate, world, collidables) {
                component.position.x = candidate.x;
            } else {
                trace!("x move to {:.3} blocked", candidate.x);
            }
        }
        if dz != 0.0 {
            let candidate = component.position + Vec3::new(0.0, 0.0, dz);
            if self.try_step(component, candidate, world, collidables) {
                component.position.z = candidate.z;
            } else {
                trace!("z move to {:.3} blocked", candidate.z);
            }
        }

        self.settle_vertical(component, original, dt, world, collidables);

        component.is_moving =
            component.position.x != original.x || component.position.z != original.z;
        self.animate(component, desired, dt);

        let moved = !component.position.abs_diff_eq(original, 0.001);
        if moved {
            component.update_bounds();
        }
        moved
    }

    // Step-height gate followed by the overlap test.
    fn try_step(
        &mut self,
        component: &PhysicsComponent,
        candidate: Vec3,
        world: &ChunkManager,
        collidables: &Collidables,
    ) -> bool {
        let foot = component.foot_y();
        let support = SupportQuery::new(world, collidables, &self.config).highest_support(
            candidate.x,
            candidate.z,
            component.head_y(),
            component.size.x * 0.5,
        );
        if support - foot > self.config.max_step_height {
            trace!("step of {:.3} too tall", support - foot);
            return false;
        }
        self.can_move_to(candidate, component, world, collidables)
    }

    fn settle_vertical(
        &self,
        component: &mut PhysicsComponent,
        original: Vec3,
        dt: f32,
        world: &ChunkManager,
        collidables: &Collidables,
    ) {
        let half = component.half_extents();
        let foot = original.y - half.y;
        let head = original.y + half.y;
        let ox = half.x * self.config.support_sample_scale;
        let oz = half.z * self.config.support_sample_scale;
        let samples = [
            (0.0, 0.0),
            (ox, 0.0),
            (-ox, 0.0),
            (0.0, oz),
            (0.0, -oz),
            (ox, oz),
            (ox, -oz),
            (-ox, oz),
            (-ox, -oz),
        ];

        let query = SupportQuery::new(world, collidables, &self.config);
        let (x, z) = (component.position.x, component.position.z);
        let max_support = samples
            .iter()
            .map(|(sx, sz)| {
                query.highest_support(x + sx, z + sz, head, self.config.point_check_radius)
            })
            .fold(f32::NEG_INFINITY, f32::max);

        let support = if max_support - foot <= self.config.max_step_height {
            max_support
        } else {
            trace!("sampled support {max_support:.3} out of reach, using centre");
            query.highest_support(x, z, foot + self.config.max_step_height, half.x)
        };

        let target = support + half.y;
        let fallen = component.position.y - self.config.fall_speed * dt;
        component.position.y = target.max(fallen);
        component.is_grounded = component.position.y <= target + self.config.grounded_epsilon;
    }

    fn animate(&self, component: &mut PhysicsComponent, desired: Vec3, dt: f32) {
        if component.is_moving {
            component.walk_animation_timer += dt;
            component.wobble_angle = (component.walk_animation_timer
                * self.config.wobble_frequency)
                .sin()
                * self.config.wobble_amplitude_deg;
            if desired.x != 0.0 || desired.z != 0.0 {
                component.facing_rotation_y = desired.x.atan2(desired.z).to_degrees();
            }
        } else {
            if component.wobble_angle.abs() > self.config.wobble_rest_threshold {
                component.wobble_angle *= (1.0 - dt * self.config.wobble_decay_rate).max(0.0);
            } else {
                component.wobble_angle = 0.0;
            }
            component.walk_animation_timer = 0.0;
        }
    }

    /// Whether the character's box fits at `candidate`. Blocks low enough to
    /// step onto never block.
    pub fn can_move_to(
        &mut self,
        candidate: Vec3,
        component: &PhysicsComponent,
        world: &ChunkManager,
        collidables: &Collidables,
    ) -> bool {
        let half = component.half_extents();
        let shrink = self.config.collision_shrink_3d;
        let body = Aabb::from_center_half_extents(
            candidate,
            Vec3::new(half.x - shrink, half.y, half.z - shrink),
        );
        let foot = candidate.y - half.y;

        self.nearby.clear();
        world.blocks_around(candidate, world.config().collision_query_radius, &mut self.nearby);
        let registry = world.registry();
        let block_size = world.block_size();
        for block in &self.nearby {
            if !registry.has_collision(block.kind) {
                continue;
            }
            let bounds = block.collision_bounds(registry.height(block.kind), block_size);
            if !bounds.intersects(&body) {
                continue;
            }
            if bounds.max.y - foot <= self.config.max_step_height {
                continue;
            }
            trace!("blocked by block at {}", block.position);
            return false;
        }

        if collidables
            .buildings
            .iter()
            .any(|b| b.collides_with_mesh(&body))
        {
            trace!("blocked by building");
            return false;
        }

        let radius_2d = (half.x - self.config.collision_shrink_2d).max(0.0);
        for interior in collidables.interiors {
            if !interior.has_collision() {
                continue;
            }
            let hit = if interior.is_3d() {
                interior.collides_with_mesh(&body)
            } else {
                interior.collides_2d(candidate, radius_2d)
            };
            if hit {
                trace!("blocked by interior prop");
                return false;
            }
        }
        true
    }

    /// Same test as [`can_move_to`](Self::can_move_to), for spawn and
    /// teleport checks.
    pub fn is_position_valid(
        &mut self,
        position: Vec3,
        component: &PhysicsComponent,
        world: &ChunkManager,
        collidables: &Collidables,
    ) -> bool {
        self.can_move_to(position, component, world, collidables)
    }

    /// Ground the character's feet already rest on at `position`.
    pub fn ground_below(
        &self,
        position: Vec3,
        component: &PhysicsComponent,
        world: &ChunkManager,
        collidables: &Collidables,
    ) -> f32 {
        let half = component.half_extents();
        SupportQuery::new(world, collidables, &self.config).strict_support(
            position.x,
            position.z,
            position.y - half.y,
            half.x,
        )
    }
}
