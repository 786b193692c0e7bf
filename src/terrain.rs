//! Procedural mountain terrain for the rescue grid

pub mod grid;
pub mod mountain;

pub use grid::{Cell, TerrainGrid, TerrainSummary};
pub use mountain::{Mountain, generate_mountain, micro_mountain};
