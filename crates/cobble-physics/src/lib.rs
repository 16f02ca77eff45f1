//! Character movement against the block grid: step climbing, multi-point
//! support and collision with buildings and interior props.

pub mod collidable;
pub mod component;
pub mod resolver;
pub mod support;

pub use collidable::{
    BoxBuilding, BoxProp, BuildingCollider, Collidables, FlatProp, InteriorCollider,
};
pub use component::PhysicsComponent;
pub use resolver::CharacterPhysics;
pub use support::SupportQuery;
