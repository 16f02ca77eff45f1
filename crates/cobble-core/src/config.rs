//! World and physics tuning loaded from RON.
//!
//! Every field has a default, so a config file only needs to name the values
//! it changes. Configs are handed to the chunk manager and the physics
//! resolver at construction and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_BLOCK_SIZE;
use crate::error::ConfigError;

/// Grid and culling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World-space edge length of one block.
    pub block_size: f32,
    /// Horizontal render distance in chunks around the camera's chunk.
    pub render_distance: i32,
    /// Radius of the block query the physics resolver issues per check.
    pub collision_query_radius: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            render_distance: 8,
            collision_query_radius: 10.0,
        }
    }
}

impl WorldConfig {
    pub fn from_ron_str(ron_str: &str) -> Result<Self, ConfigError> {
        let options = ron::Options::default();
        let config: Self = options
            .from_str(ron_str)
            .map_err(|e| ConfigError::WorldParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size.is_nan() || self.block_size <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "block_size",
                value: self.block_size,
            });
        }
        if self.render_distance < 0 {
            return Err(ConfigError::InvalidValue {
                field: "render_distance",
                value: self.render_distance as f32,
            });
        }
        Ok(())
    }

    /// World-space edge length of one chunk.
    pub fn chunk_extent(&self) -> f32 {
        crate::constants::CHUNK_SIZE as f32 * self.block_size
    }
}

/// Character movement and support tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Tallest rise a character climbs without jumping.
    pub max_step_height: f32,
    /// Downward speed while falling, units per second.
    pub fall_speed: f32,
    /// Feet within this distance above support count as grounded.
    pub grounded_epsilon: f32,
    /// Fraction of the half extents used for the off-centre support samples.
    pub support_sample_scale: f32,
    /// Footprint radius of each support sample.
    pub point_check_radius: f32,
    /// Slack above the feet allowed by the strict support query.
    pub strict_support_tolerance: f32,
    /// Shrink applied to the character box before 3D overlap tests.
    pub collision_shrink_3d: f32,
    /// Shrink applied to the half width for 2D prop tests.
    pub collision_shrink_2d: f32,
    /// Support height when nothing is underneath.
    pub ground_fallback_y: f32,
    pub wobble_amplitude_deg: f32,
    pub wobble_frequency: f32,
    pub wobble_decay_rate: f32,
    pub wobble_rest_threshold: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_step_height: 1.1,
            fall_speed: 25.0,
            grounded_epsilon: 0.1,
            support_sample_scale: 0.9,
            point_check_radius: 0.1,
            strict_support_tolerance: 0.01,
            collision_shrink_3d: 0.2,
            collision_shrink_2d: 0.8,
            ground_fallback_y: -1000.0,
            wobble_amplitude_deg: 5.0,
            wobble_frequency: 6.0,
            wobble_decay_rate: 10.0,
            wobble_rest_threshold: 0.1,
        }
    }
}

impl PhysicsConfig {
    pub fn from_ron_str(ron_str: &str) -> Result<Self, ConfigError> {
        let options = ron::Options::default();
        let config: Self = options
            .from_str(ron_str)
            .map_err(|e| ConfigError::PhysicsParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("max_step_height", self.max_step_height),
            ("fall_speed", self.fall_speed),
            ("grounded_epsilon", self.grounded_epsilon),
            ("point_check_radius", self.point_check_radius),
            ("collision_shrink_3d", self.collision_shrink_3d),
        ];
        for (field, value) in non_negative {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        Ok(())
    }
}
