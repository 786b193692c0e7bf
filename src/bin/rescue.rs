//! Mountain rescue CLI
//!
//! This CLI provides a unified interface for:
//! - Generating a mountain and its transition dataset
//! - Learning a policy with Q-learning or value iteration
//! - Evaluating a policy against a random legal baseline

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rescue")]
#[command(version, about = "Search-and-rescue planning on a mountain grid", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate terrain and write the transition dataset
    Generate(mountain_rescue::cli::commands::generate::GenerateArgs),

    /// Learn a policy (Q-learning or value iteration)
    Learn(mountain_rescue::cli::commands::learn::LearnArgs),

    /// Evaluate a policy against a random legal baseline
    Evaluate(mountain_rescue::cli::commands::evaluate::EvaluateArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => mountain_rescue::cli::commands::generate::execute(args),
        Commands::Learn(args) => mountain_rescue::cli::commands::learn::execute(args),
        Commands::Evaluate(args) => mountain_rescue::cli::commands::evaluate::execute(args),
    }
}
