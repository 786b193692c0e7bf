//! Evaluate command - compare a policy with a random legal baseline

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    Error,
    cli::output::{create_spinner, format_number, print_kv, print_section, print_subsection},
    config::EvaluationConfig,
    evaluation::{EvaluationReport, PolicyEvaluator},
    mdp::MdpDataset,
    policy::Policy,
    types::StateId,
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a policy against a random baseline")]
pub struct EvaluateArgs {
    /// Transition dataset (s,a,r,sp,d CSV)
    pub dataset: PathBuf,

    /// Policy file (one action code per line)
    pub policy: PathBuf,

    /// Stranded person's state id, used to report the rescue rate
    pub stranded: Option<usize>,

    /// Number of Monte-Carlo rollouts per policy
    #[arg(long, short = 't', default_value_t = 100_000)]
    pub trials: usize,

    /// Steps per rollout (defaults to half the number of states)
    #[arg(long)]
    pub horizon: Option<usize>,

    /// Random seed for start states and the baseline policy
    #[arg(long)]
    pub seed: Option<u64>,

    /// Optional path for exporting the comparison as JSON
    #[arg(long)]
    pub export: Option<PathBuf>,
}

fn stranded_state(value: usize, num_states: usize) -> Result<StateId, Error> {
    if !(1..=num_states).contains(&value) {
        return Err(Error::Usage {
            message: format!("stranded state {value} is outside 1..={num_states}"),
        });
    }
    StateId::new(value)
}

fn check_policy_size(policy: &Policy, num_states: usize) -> Result<(), Error> {
    if policy.num_states() != num_states {
        return Err(Error::Usage {
            message: format!(
                "policy covers {} states but the dataset has {num_states}",
                policy.num_states()
            ),
        });
    }
    Ok(())
}

fn print_report(report: &EvaluationReport) {
    print_subsection(&format!("{} policy", report.label));
    print_kv("Mean reward", &format!("{:.3}", report.mean_reward));
    print_kv(
        "95% CI",
        &format!(
            "{:.3} .. {:.3}",
            report.mean_reward - report.ci95_half_width,
            report.mean_reward + report.ci95_half_width
        ),
    );
    print_kv("Std dev", &format!("{:.3}", report.std_dev));
    if let Some(rate) = report.rescue_rate {
        print_kv("Rescue rate", &format!("{:.1}%", rate * 100.0));
    }
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let dataset = MdpDataset::load(&args.dataset)
        .with_context(|| format!("failed to read dataset {}", args.dataset.display()))?;
    let policy = Policy::load(&args.policy)
        .with_context(|| format!("failed to read policy {}", args.policy.display()))?;

    let mut config = EvaluationConfig::default().with_trials(args.trials);
    if let Some(horizon) = args.horizon {
        config = config.with_horizon(horizon);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(value) = args.stranded {
        config = config.with_stranded(stranded_state(value, dataset.num_states())?);
    }

    let evaluator = PolicyEvaluator::new(&dataset, config)?;
    check_policy_size(&policy, evaluator.num_states())?;

    let spinner = create_spinner("Running rollouts...")?;
    let comparison = evaluator.compare(&policy);
    spinner.finish_and_clear();
    let comparison = comparison.context("evaluation failed")?;

    print_section("Policy Evaluation");
    print_kv("Trials", &format_number(comparison.policy.trials));
    print_kv("Horizon", &comparison.policy.horizon.to_string());
    print_kv("Seed", &evaluator.seed().to_string());
    print_report(&comparison.policy);
    print_report(&comparison.baseline);

    print_subsection("Comparison");
    print_kv("Difference", &format!("{:.3}", comparison.difference));

    if let Some(path) = &args.export {
        comparison
            .save(path)
            .with_context(|| format!("failed to export evaluation to {}", path.display()))?;
        print_kv("Exported", &path.display().to_string());
    }

    Ok(())
}
