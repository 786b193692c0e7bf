//! Generate command - build a mountain and write its transition dataset

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::{
    cli::output::{format_heights, format_number, print_kv, print_section},
    config::{DEFAULT_FOUND_BONUS, TerrainConfig},
    mdp::MdpDataset,
    terrain::Mountain,
    types::StateId,
};

/// Contents of the `--stranded-out` file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrandedLocation {
    pub size: usize,
    pub stranded: StateId,
    pub seed: Option<u64>,
}

#[derive(Parser, Debug)]
#[command(about = "Generate a mountain and its transition dataset")]
pub struct GenerateArgs {
    /// Grid side length (the grid is size x size)
    pub size: usize,

    /// Output file for the transition dataset
    #[arg(long, short = 'o', default_value = "mdp.csv")]
    pub output: PathBuf,

    /// Random seed for terrain and stranded location
    #[arg(long)]
    pub seed: Option<u64>,

    /// Reward bonus for entering the stranded person's cell
    #[arg(long, default_value_t = DEFAULT_FOUND_BONUS)]
    pub bonus: f64,

    /// Optional CSV of row,column,height,density for heat maps
    #[arg(long)]
    pub terrain_out: Option<PathBuf>,

    /// Optional JSON file recording the stranded state id
    #[arg(long)]
    pub stranded_out: Option<PathBuf>,

    /// Print the height map
    #[arg(long, default_value_t = false)]
    pub show_terrain: bool,
}

pub fn execute(args: GenerateArgs) -> Result<()> {
    let mut config = TerrainConfig::new(args.size).with_found_bonus(args.bonus);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let mountain = Mountain::generate(&config).context("failed to generate terrain")?;
    let dataset = MdpDataset::build(&mountain.grid, mountain.stranded, config.found_bonus)
        .context("failed to build transition dataset")?;
    if dataset.is_empty() {
        eprintln!("Warning: a 1x1 grid has no legal moves; the dataset is empty");
    }

    dataset
        .save(&args.output)
        .with_context(|| format!("failed to write dataset to {}", args.output.display()))?;

    print_section("Mountain Generated");
    let summary = mountain.grid.summary();
    print_kv("Grid", &format!("{0}x{0}", args.size));
    print_kv("Stranded state", &mountain.stranded.to_string());
    print_kv("Max height", &summary.max_height.to_string());
    print_kv("Max density", &summary.max_density.to_string());
    print_kv("Records", &format_number(dataset.len()));
    print_kv("Dataset", &args.output.display().to_string());

    if args.show_terrain {
        println!("\n{}", format_heights(&mountain.grid));
    }

    if let Some(path) = &args.terrain_out {
        mountain
            .grid
            .save_csv(path)
            .with_context(|| format!("failed to write terrain to {}", path.display()))?;
        print_kv("Terrain", &path.display().to_string());
    }

    if let Some(path) = &args.stranded_out {
        let location = StrandedLocation {
            size: args.size,
            stranded: mountain.stranded,
            seed: args.seed,
        };
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &location)?;
        print_kv("Stranded file", &path.display().to_string());
    }

    Ok(())
}
