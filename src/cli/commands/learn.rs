//! Learn command - solve a transition dataset and write the greedy policy

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use crate::{
    cli::output::{format_number, print_kv, print_policy_grid, print_section},
    config::{QLearningConfig, ValueIterationConfig, load_json},
    mdp::MdpDataset,
    pipeline::{JsonlObserver, ProgressObserver},
    ports::Solver,
    q_learning::QLearningSolver,
    value_iteration::ValueIterationSolver,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SolverKind {
    /// Model-free sweeps over the transition records
    QLearning,
    /// Model-based Gauss-Seidel Bellman sweeps
    ValueIteration,
}

#[derive(Parser, Debug)]
#[command(about = "Learn a policy from a transition dataset")]
pub struct LearnArgs {
    /// Solver to run
    #[arg(value_enum)]
    pub solver: SolverKind,

    /// Transition dataset (s,a,r,sp,d CSV)
    pub dataset: PathBuf,

    /// Output file for the policy (one action code per line)
    pub policy: PathBuf,

    /// JSON file with the solver's configuration; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Discount factor (0.0-1.0)
    #[arg(long)]
    pub discount: Option<f64>,

    /// Maximum number of sweeps
    #[arg(long)]
    pub max_epochs: Option<usize>,

    /// Q-learning step size (0.0-1.0]
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Q-learning: an update smaller than this counts as stable
    #[arg(long)]
    pub stability_epsilon: Option<f64>,

    /// Q-learning: seed for the initial Q-table
    #[arg(long)]
    pub seed: Option<u64>,

    /// Value iteration: stop once the largest utility change falls below this
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Optional path for writing the run summary as JSON
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Optional file for JSONL per-epoch observations
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Show progress bar
    #[arg(long, default_value_t = false)]
    pub progress: bool,

    /// Print the policy as a grid of arrows
    #[arg(long, default_value_t = false)]
    pub show_policy: bool,
}

fn q_learning_config(args: &LearnArgs) -> Result<QLearningConfig> {
    let mut config = match &args.config {
        Some(path) => load_json(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => QLearningConfig::default(),
    };
    if let Some(learning_rate) = args.learning_rate {
        config = config.with_learning_rate(learning_rate);
    }
    if let Some(discount) = args.discount {
        config = config.with_discount(discount);
    }
    if let Some(max_epochs) = args.max_epochs {
        config = config.with_max_epochs(max_epochs);
    }
    if let Some(epsilon) = args.stability_epsilon {
        config = config.with_stability_epsilon(epsilon);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if args.threshold.is_some() {
        eprintln!("Warning: --threshold only applies to value iteration; ignoring it");
    }
    Ok(config)
}

fn value_iteration_config(args: &LearnArgs) -> Result<ValueIterationConfig> {
    let mut config = match &args.config {
        Some(path) => load_json(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ValueIterationConfig::default(),
    };
    if let Some(discount) = args.discount {
        config = config.with_discount(discount);
    }
    if let Some(max_epochs) = args.max_epochs {
        config = config.with_max_epochs(max_epochs);
    }
    if let Some(threshold) = args.threshold {
        config = config.with_convergence_threshold(threshold);
    }
    if args.learning_rate.is_some() || args.stability_epsilon.is_some() || args.seed.is_some()
    {
        eprintln!(
            "Warning: --learning-rate, --stability-epsilon and --seed only apply to Q-learning; ignoring them"
        );
    }
    Ok(config)
}

fn build_solver(args: &LearnArgs, dataset: &MdpDataset) -> Result<Box<dyn Solver>> {
    let solver: Box<dyn Solver> = match args.solver {
        SolverKind::QLearning => {
            let config = q_learning_config(args)?;
            Box::new(QLearningSolver::new(dataset, config)?)
        }
        SolverKind::ValueIteration => {
            let config = value_iteration_config(args)?;
            Box::new(ValueIterationSolver::new(dataset, config)?)
        }
    };
    Ok(solver)
}

pub fn execute(args: LearnArgs) -> Result<()> {
    let dataset = MdpDataset::load(&args.dataset)
        .with_context(|| format!("failed to read dataset {}", args.dataset.display()))?;

    let mut solver = build_solver(&args, &dataset)?;
    if args.progress {
        solver.add_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("failed to open observations file {}", path.display()))?;
        solver.add_observer(Box::new(observer));
    }

    let report = solver
        .solve()
        .with_context(|| format!("{} failed", solver.name()))?;
    let policy = solver.policy()?;

    policy
        .save(&args.policy)
        .with_context(|| format!("failed to write policy to {}", args.policy.display()))?;

    print_section(&format!("{} Finished", report.solver));
    print_kv("Records", &format_number(dataset.len()));
    print_kv("States", &format_number(report.num_states));
    print_kv("Epochs", &report.epochs_run.to_string());
    print_kv("Converged", if report.converged { "yes" } else { "no" });
    if let Some(delta) = report.final_delta() {
        print_kv("Final max delta", &format!("{delta:.6}"));
    }
    print_kv("Time", &format!("{:.3}s", report.elapsed_secs));
    print_kv("Policy", &args.policy.display().to_string());

    if args.show_policy {
        println!();
        print_policy_grid(&policy)?;
    }

    if let Some(path) = &args.summary {
        report
            .save(path)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        print_kv("Summary", &path.display().to_string());
    }

    Ok(())
}
