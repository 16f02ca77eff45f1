use cobble_core::types::BlockTypeId;
use cobble_core::{Block, BlockShape};
use glam::{IVec3, Vec3};

const GRASS: BlockTypeId = BlockTypeId(0);
const COBBLESTONE: BlockTypeId = BlockTypeId(1);
const STONE: BlockTypeId = BlockTypeId(3);

/// Terrain layout generated for a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    FlatTerrain,
    TerracedHills,
    ScatteredPillars,
}

/// Configuration for a single benchmark scene.
pub struct SceneConfig {
    pub name: &'static str,
    pub kind: SceneKind,
    /// Cells per side of the square terrain, centred on the origin.
    pub extent: i32,
    /// Characters simulated each frame.
    pub crowd: u32,
    /// Blocks toggled per frame to force chunk rebuilds.
    pub edits_per_frame: u32,
}

/// Return the standard suite of benchmark scenes.
pub fn standard_scenes() -> Vec<SceneConfig> {
    vec![
        SceneConfig {
            name: "flat-64",
            kind: SceneKind::FlatTerrain,
            extent: 64,
            crowd: 32,
            edits_per_frame: 4,
        },
        SceneConfig {
            name: "flat-160",
            kind: SceneKind::FlatTerrain,
            extent: 160,
            crowd: 64,
            edits_per_frame: 8,
        },
        SceneConfig {
            name: "terraces-96",
            kind: SceneKind::TerracedHills,
            extent: 96,
            crowd: 64,
            edits_per_frame: 8,
        },
        SceneConfig {
            name: "pillars-96",
            kind: SceneKind::ScatteredPillars,
            extent: 96,
            crowd: 64,
            edits_per_frame: 8,
        },
    ]
}

// Deterministic per-cell hash in 0..100.
fn cell_hash(x: i32, z: i32, salt: u32) -> u32 {
    let h = (x as u32).wrapping_mul(73_856_093) ^ (z as u32).wrapping_mul(19_349_663) ^ salt;
    h.wrapping_mul(2_654_435_761) % 100
}

/// Terrace height in cells for the hills scene.
fn terrace_height(x: i32, z: i32) -> i32 {
    ((x.div_euclid(8) + z.div_euclid(8)).rem_euclid(4)).min(3)
}

/// Generate every block of the scene's terrain.
pub fn generate_blocks(config: &SceneConfig, block_size: f32) -> Vec<Block> {
    let half = config.extent / 2;
    let mut blocks = Vec::new();
    for x in -half..config.extent - half {
        for z in -half..config.extent - half {
            match config.kind {
                SceneKind::FlatTerrain => {
                    blocks.push(Block::at_cell(IVec3::new(x, 0, z), GRASS, 1.0, block_size));
                }
                SceneKind::TerracedHills => {
                    let top = terrace_height(x, z);
                    for y in 0..top {
                        let cell = IVec3::new(x, y, z);
                        blocks.push(Block::at_cell(cell, COBBLESTONE, 1.0, block_size));
                    }
                    let cell = IVec3::new(x, top, z);
                    blocks.push(Block::at_cell(cell, GRASS, 1.0, block_size));
                }
                SceneKind::ScatteredPillars => {
                    blocks.push(Block::at_cell(IVec3::new(x, 0, z), GRASS, 1.0, block_size));
                    if cell_hash(x, z, 0x5eed) < 6 {
                        let height = 1 + cell_hash(x, z, 0xbeef) as i32 % 3;
                        for y in 1..=height {
                            let cell = IVec3::new(x, y, z);
                            blocks.push(Block::at_cell_shaped(
                                cell,
                                STONE,
                                BlockShape::Pillar,
                                1.0,
                                block_size,
                            ));
                        }
                    }
                }
            }
        }
    }
    blocks
}

/// Cell toggled by edit `index` of `frame`, one layer above the terrain.
pub fn edit_cell(config: &SceneConfig, frame: u32, index: u32) -> IVec3 {
    let span = config.extent.max(1) as u32;
    let seed = frame.wrapping_mul(7919).wrapping_add(index.wrapping_mul(31_337));
    let x = (seed % span) as i32 - config.extent / 2;
    let z = ((seed / span) % span) as i32 - config.extent / 2;
    let ground = match config.kind {
        SceneKind::TerracedHills => terrace_height(x, z),
        _ => 0,
    };
    IVec3::new(x, ground + 1, z)
}

/// Spawn point and walking direction for character `index`.
pub fn crowd_member(config: &SceneConfig, index: u32, block_size: f32) -> (Vec3, Vec3) {
    let angle = index as f32 * 2.399_963; // golden angle
    let radius = (config.extent as f32 * 0.35) * block_size * ((index % 7) as f32 + 1.0) / 7.0;
    let position = Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
    let direction = Vec3::new(-angle.sin(), 0.0, angle.cos());
    (position, direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_scene_block_count() {
        let config = SceneConfig {
            name: "t",
            kind: SceneKind::FlatTerrain,
            extent: 10,
            crowd: 0,
            edits_per_frame: 0,
        };
        assert_eq!(generate_blocks(&config, 4.0).len(), 100);
    }

    #[test]
    fn test_terraces_stay_in_range() {
        for x in -20..20 {
            for z in -20..20 {
                assert!((0..=3).contains(&terrace_height(x, z)));
            }
        }
    }

    #[test]
    fn test_edit_cell_within_extent() {
        let config = &standard_scenes()[0];
        for frame in 0..50 {
            let cell = edit_cell(config, frame, 3);
            assert!(cell.x >= -config.extent / 2 && cell.x < config.extent / 2);
            assert!(cell.z >= -config.extent / 2 && cell.z < config.extent / 2);
            assert_eq!(cell.y, 1);
        }
    }
}
