//! Chunked block storage with incremental face culling, mesh merging and
//! render-list selection.

pub mod chunk;
pub mod chunk_manager;
pub mod chunk_map;
pub mod culling;
pub mod dirty;
pub mod frustum;
pub mod geometry;
pub mod mesh;
pub mod render_list;

pub use chunk::Chunk;
pub use chunk_manager::{ChunkManager, RebuildStats};
pub use chunk_map::ChunkMap;
pub use culling::BlockLookup;
pub use frustum::Frustum;
pub use mesh::{ChunkMesh, MeshPart, MeshVertex};
pub use render_list::{RenderCamera, RenderSink};
