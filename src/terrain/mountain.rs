//! Micro-mountain terrain generation and the stranded person's location
//!
//! The mountain is a patchwork of 3x3 micro-mountains. Each block has a peak in its
//! centre, edge cells one lower and corner cells two lower:
//!
//! ```text
//! p-2  p-1  p-2
//! p-1   p   p-1
//! p-2  p-1  p-2
//! ```
//!
//! Densities are drawn independently per cell. Blocks on the right and bottom border are
//! cut down when the side length is not a multiple of three.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::grid::{Cell, TerrainGrid};
use crate::{
    Result,
    config::{MAX_DENSITY, TerrainConfig},
    types::StateId,
};

/// Side length of a micro-mountain block
pub const BLOCK: usize = 3;
/// Lowest peak height
pub const MIN_PEAK: u32 = 2;
/// Highest peak height
pub const MAX_PEAK: u32 = 20;

/// Drop from the peak for each position of a block
const FALLOFF: [[u32; BLOCK]; BLOCK] = [[2, 1, 2], [1, 0, 1], [2, 1, 2]];

/// Generate one full 3x3 micro-mountain.
///
/// Draws the peak first, then one density per cell in row-major order.
pub fn micro_mountain<R: Rng>(rng: &mut R) -> [[Cell; BLOCK]; BLOCK] {
    let peak = rng.random_range(MIN_PEAK..=MAX_PEAK);
    let mut block = [[Cell::default(); BLOCK]; BLOCK];
    for (row, falloffs) in FALLOFF.iter().enumerate() {
        for (column, &drop) in falloffs.iter().enumerate() {
            block[row][column] = Cell::new(peak - drop, rng.random_range(0..=MAX_DENSITY));
        }
    }
    block
}

/// Tile micro-mountains into a `size x size` grid.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidSize`] when `size` is 0.
pub fn generate_mountain<R: Rng>(size: usize, rng: &mut R) -> Result<TerrainGrid> {
    let mut rows = vec![Vec::with_capacity(size); size];
    let blocks = size.div_ceil(BLOCK);
    for block_row in 0..blocks {
        for block_column in 0..blocks {
            let block = micro_mountain(rng);
            let top = block_row * BLOCK;
            let left = block_column * BLOCK;
            let height = BLOCK.min(size - top);
            let width = BLOCK.min(size - left);
            for (offset, block_cells) in block.iter().take(height).enumerate() {
                rows[top + offset].extend_from_slice(&block_cells[..width]);
            }
        }
    }
    TerrainGrid::from_rows(rows)
}

/// A generated mountain together with where the stranded person is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mountain {
    pub grid: TerrainGrid,
    pub stranded: StateId,
}

impl Mountain {
    /// Generate terrain and stranded location from one RNG.
    ///
    /// With a seed in the config the result is reproducible.
    pub fn generate(config: &TerrainConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self::generate_with(config.size, &mut rng)
    }

    pub fn generate_with<R: Rng>(size: usize, rng: &mut R) -> Result<Self> {
        let grid = generate_mountain(size, rng)?;
        let stranded = StateId::from_index(rng.random_range(0..grid.num_states()));
        Ok(Self { grid, stranded })
    }
}
