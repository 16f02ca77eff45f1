use cobble_core::Aabb;
use glam::Vec3;

/// Per-character movement state, mutated in place by
/// [`CharacterPhysics::update`](crate::resolver::CharacterPhysics::update).
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsComponent {
    /// Centre of the character's box.
    pub position: Vec3,
    /// Full extents of the character's box.
    pub size: Vec3,
    /// Horizontal speed in units per second.
    pub speed: f32,
    /// Owned by callers; the resolver never reads or clears it.
    pub velocity: Vec3,
    pub is_grounded: bool,
    pub is_moving: bool,
    pub walk_animation_timer: f32,
    /// Cosmetic sway in degrees.
    pub wobble_angle: f32,
    pub facing_rotation_y: f32,
    pub bounds: Aabb,
}

impl PhysicsComponent {
    pub fn new(position: Vec3, size: Vec3, speed: f32) -> Self {
        let mut component = Self {
            position,
            size,
            speed,
            velocity: Vec3::ZERO,
            is_grounded: false,
            is_moving: false,
            walk_animation_timer: 0.0,
            wobble_angle: 0.0,
            facing_rotation_y: 0.0,
            bounds: Aabb::default(),
        };
        component.update_bounds();
        component
    }

    pub fn half_extents(&self) -> Vec3 {
        self.size * 0.5
    }

    pub fn foot_y(&self) -> f32 {
        self.position.y - self.size.y * 0.5
    }

    pub fn head_y(&self) -> f32 {
        self.position.y + self.size.y * 0.5
    }

    pub fn update_bounds(&mut self) {
        self.bounds = Aabb::from_center_half_extents(self.position, self.half_extents());
    }

    /// Place the character so its feet rest at `ground_y`.
    pub fn stand_on(&mut self, ground_y: f32) {
        self.position.y = ground_y + self.size.y * 0.5;
        self.update_bounds();
    }
}
