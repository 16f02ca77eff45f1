use std::time::Instant;

use cobble_core::{Block, BlockRegistry, ConfigError, PhysicsConfig, WorldConfig};
use cobble_physics::{CharacterPhysics, Collidables, PhysicsComponent};
use cobble_world::ChunkManager;
use glam::Vec3;

use crate::scenes::{self, SceneConfig};

const STONE: cobble_core::types::BlockTypeId = cobble_core::types::BlockTypeId(3);
const FRAME_DT: f32 = 1.0 / 60.0;

/// Timing data for a single benchmark run.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TimingSeries {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

/// Result of a single scene benchmark.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkResult {
    pub scene_name: String,
    pub block_count: usize,
    pub chunk_count: usize,
    pub frame_count: u32,
    /// Bulk load including the first full rebuild.
    pub load_ms: f64,
    pub rebuild: TimingSeries,
    pub physics: TimingSeries,
    /// Column queries around every crowd member, the lookup support runs on.
    #[serde(default)]
    pub columns: TimingSeries,
}

/// Runs the headless world benchmarks.
pub struct BenchmarkRunner {
    world_config: WorldConfig,
    physics_config: PhysicsConfig,
    registry: BlockRegistry,
    frame_count: u32,
}

impl BenchmarkRunner {
    pub fn new(frame_count: u32) -> Result<Self, ConfigError> {
        let registry = BlockRegistry::builtin()?;
        log::info!("Loaded {} block types", registry.len());
        Ok(Self {
            world_config: WorldConfig::default(),
            physics_config: PhysicsConfig::default(),
            registry,
            frame_count,
        })
    }

    /// Run a single benchmark scene and return timing results.
    pub fn run_scene(&self, config: &SceneConfig) -> BenchmarkResult {
        log::info!(
            "Running scene '{}' ({}x{} cells)...",
            config.name,
            config.extent,
            config.extent
        );

        let block_size = self.world_config.block_size;
        let mut world = ChunkManager::new(self.world_config.clone(), self.registry.clone());
        let blocks = scenes::generate_blocks(config, block_size);

        let load_start = Instant::now();
        let block_count = world.load_initial_blocks(blocks);
        let load_ms = load_start.elapsed().as_secs_f64() * 1000.0;
        let (chunk_count, meshed, _) = world.chunk_counts();
        log::info!(
            "  Loaded {block_count} blocks into {chunk_count} chunks ({meshed} meshed) in {load_ms:.2}ms"
        );

        let mut crowd = spawn_crowd(config, &world, &self.physics_config);
        let mut physics = CharacterPhysics::new(self.physics_config.clone());
        let collidables = Collidables::none();

        let mut rebuild_times = Vec::with_capacity(self.frame_count as usize);
        let mut physics_times = Vec::with_capacity(self.frame_count as usize);
        let mut column_times = Vec::with_capacity(self.frame_count as usize);

        for frame in 0..self.frame_count {
            for index in 0..config.edits_per_frame {
                let cell = scenes::edit_cell(config, frame, index);
                if world.remove_block_at_cell(cell).is_none() {
                    world.add_block(Block::at_cell(cell, STONE, 1.0, block_size));
                }
            }

            let rebuild_start = Instant::now();
            world.process_dirty_chunks();
            rebuild_times.push(rebuild_start.elapsed().as_secs_f64() * 1000.0);

            let physics_start = Instant::now();
            for (component, direction) in crowd.iter_mut() {
                physics.update(component, *direction, FRAME_DT, &world, &collidables);
            }
            physics_times.push(physics_start.elapsed().as_secs_f64() * 1000.0);

            let column_start = Instant::now();
            let hits = query_columns(&world, &crowd);
            column_times.push(column_start.elapsed().as_secs_f64() * 1000.0);
            std::hint::black_box(hits);
        }

        let rebuild = TimingSeries::from_samples(&rebuild_times);
        let physics = TimingSeries::from_samples(&physics_times);
        let columns = TimingSeries::from_samples(&column_times);
        log::info!(
            "  Done: rebuild mean={:.3}ms p95={:.3}ms, physics mean={:.3}ms p95={:.3}ms, columns mean={:.3}ms",
            rebuild.mean_ms,
            rebuild.p95_ms,
            physics.mean_ms,
            physics.p95_ms,
            columns.mean_ms
        );

        BenchmarkResult {
            scene_name: config.name.to_string(),
            block_count,
            chunk_count,
            frame_count: self.frame_count,
            load_ms,
            rebuild,
            physics,
            columns,
        }
    }
}

/// Walk the 3x3 block columns around each character. Returns blocks seen.
fn query_columns(world: &ChunkManager, crowd: &[(PhysicsComponent, Vec3)]) -> usize {
    let step = world.block_size();
    let mut hits = 0;
    for (component, _) in crowd {
        for dx in -1..=1 {
            for dz in -1..=1 {
                let x = component.position.x + dx as f32 * step;
                let z = component.position.z + dz as f32 * step;
                hits += world.blocks_in_column(x, z).count();
            }
        }
    }
    hits
}

fn spawn_crowd(
    config: &SceneConfig,
    world: &ChunkManager,
    physics_config: &PhysicsConfig,
) -> Vec<(PhysicsComponent, Vec3)> {
    let block_size = world.block_size();
    let query = CharacterPhysics::new(physics_config.clone());
    (0..config.crowd)
        .map(|index| {
            let (spawn, direction) = scenes::crowd_member(config, index, block_size);
            let mut component = PhysicsComponent::new(spawn, Vec3::new(3.0, 4.0, 3.0), 6.0);
            component.stand_on(1000.0);
            let ground =
                query.ground_below(component.position, &component, world, &Collidables::none());
            component.stand_on(ground);
            (component, direction)
        })
        .collect()
}

impl TimingSeries {
    /// Summarise frame times in milliseconds. Empty input yields all zeros.
    pub fn from_samples(times: &[f64]) -> Self {
        let mut sorted = times.to_vec();
        sorted.sort_by(f64::total_cmp);
        let (Some(&min_ms), Some(&max_ms)) = (sorted.first(), sorted.last()) else {
            return Self {
                mean_ms: 0.0,
                median_ms: 0.0,
                p95_ms: 0.0,
                p99_ms: 0.0,
                min_ms: 0.0,
                max_ms: 0.0,
            };
        };
        let n = sorted.len();
        let median_ms = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) * 0.5
        } else {
            sorted[n / 2]
        };
        let percentile = |p: f64| sorted[((n as f64 * p).ceil() as usize).min(n - 1)];
        Self {
            mean_ms: sorted.iter().sum::<f64>() / n as f64,
            median_ms,
            p95_ms: percentile(0.95),
            p99_ms: percentile(0.99),
            min_ms,
            max_ms,
        }
    }
}
