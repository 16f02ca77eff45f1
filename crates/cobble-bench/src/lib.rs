//! Headless timing harness for the block world: bulk load, incremental
//! rebuild and character physics per frame.

pub mod report;
pub mod runner;
pub mod scenes;
