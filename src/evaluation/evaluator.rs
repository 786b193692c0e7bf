//! Rollout-based evaluation of deterministic policies

use std::{collections::HashMap, fs::File, path::Path};

use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::{
    distribution::{ContinuousCDF, Normal},
    statistics::Statistics,
};

use crate::{
    Error, Result,
    config::EvaluationConfig,
    mdp::{ActionIndex, MdpDataset},
    policy::Policy,
    types::{Action, StateId},
};

/// Rollouts simulated by one parallel task
pub const TRIALS_PER_CHUNK: usize = 4096;

/// Summary of one policy's rollouts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Name shown in reports ("policy", "random", ...)
    pub label: String,
    pub trials: usize,
    /// Steps per rollout
    pub horizon: usize,
    /// Mean total reward over all rollouts
    pub mean_reward: f64,
    /// Sample standard deviation of the per-rollout totals
    pub std_dev: f64,
    /// Half-width of the 95% normal-approximation confidence interval of the mean
    pub ci95_half_width: f64,
    /// Fraction of rollouts that reached the stranded state, when it is known
    pub rescue_rate: Option<f64>,
}

/// A policy measured against a random legal baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyComparison {
    pub policy: EvaluationReport,
    pub baseline: EvaluationReport,
    /// `policy.mean_reward - baseline.mean_reward`
    pub difference: f64,
}

impl PolicyComparison {
    /// Save the comparison as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|source| Error::io(format!("create {}", path.display()), source))?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

/// Per-chunk accumulation
struct ChunkOutcome {
    totals: Vec<f64>,
    rescued: usize,
}

/// Simulates fixed-length rollouts over a dataset's transition lookup
#[derive(Debug, Clone)]
pub struct PolicyEvaluator {
    transitions: HashMap<(StateId, Action), (f64, StateId)>,
    num_states: usize,
    config: EvaluationConfig,
    seed: u64,
}

impl PolicyEvaluator {
    /// Build the `(s, a) -> (r, sp)` lookup.
    ///
    /// Without a configured seed a fresh one is drawn here, so repeated calls on the
    /// same evaluator stay reproducible.
    ///
    /// # Errors
    ///
    /// [`Error::DatasetInconsistency`] when the origin states are not exactly `1..=N`.
    pub fn new(dataset: &MdpDataset, config: EvaluationConfig) -> Result<Self> {
        config.validate()?;
        if dataset.is_empty() {
            return Err(Error::EmptyDataset);
        }
        let num_states = ActionIndex::from_records(dataset.records()).check_contiguous()?;

        let transitions = dataset
            .records()
            .iter()
            .map(|record| ((record.s, record.a), (record.r, record.sp)))
            .collect();
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());

        Ok(Self {
            transitions,
            num_states,
            config,
            seed,
        })
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn horizon(&self) -> usize {
        self.config.horizon_for(self.num_states)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Reward and successor of `action` in `state`.
    ///
    /// # Errors
    ///
    /// [`Error::IllegalPolicyAction`] when the dataset has no such record.
    pub fn step(&self, state: StateId, action: Action) -> Result<(f64, StateId)> {
        self.transitions
            .get(&(state, action))
            .copied()
            .ok_or(Error::IllegalPolicyAction { state, action })
    }

    /// Total reward of one rollout and whether it entered the stranded state
    fn rollout(&self, policy: &Policy, start: StateId, horizon: usize) -> Result<(f64, bool)> {
        let mut state = start;
        let mut total = 0.0;
        let mut rescued = false;

        for _ in 0..horizon {
            let action = policy.action(state).ok_or(Error::MissingPolicyState { state })?;
            let (reward, next) = self.step(state, action)?;
            total += reward;
            rescued |= self.config.stranded == Some(next);
            state = next;
        }

        Ok((total, rescued))
    }

    fn run_chunk(&self, policy: &Policy, seed: u64, chunk: usize) -> Result<ChunkOutcome> {
        let trials = self.config.trials;
        let count = TRIALS_PER_CHUNK.min(trials - chunk * TRIALS_PER_CHUNK);
        let horizon = self.horizon();
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(chunk as u64));

        let mut outcome = ChunkOutcome {
            totals: Vec::with_capacity(count),
            rescued: 0,
        };
        for _ in 0..count {
            let start = StateId::from_index(rng.random_range(0..self.num_states));
            let (total, rescued) = self.rollout(policy, start, horizon)?;
            outcome.totals.push(total);
            outcome.rescued += usize::from(rescued);
        }
        Ok(outcome)
    }

    /// Run the configured number of rollouts with the evaluator's seed.
    pub fn evaluate(&self, policy: &Policy, label: &str) -> Result<EvaluationReport> {
        self.evaluate_seeded(policy, label, self.seed)
    }

    /// Run the configured number of rollouts with an explicit seed.
    ///
    /// Results depend only on `seed`, not on how many threads rayon uses.
    pub fn evaluate_seeded(
        &self,
        policy: &Policy,
        label: &str,
        seed: u64,
    ) -> Result<EvaluationReport> {
        let trials = self.config.trials;
        let chunks = trials.div_ceil(TRIALS_PER_CHUNK);

        let outcomes = (0..chunks)
            .into_par_iter()
            .map(|chunk| self.run_chunk(policy, seed, chunk))
            .collect::<Result<Vec<_>>>()?;

        let rescued: usize = outcomes.iter().map(|outcome| outcome.rescued).sum();
        let totals: Vec<f64> = outcomes.into_iter().flat_map(|outcome| outcome.totals).collect();

        let (mean_reward, std_dev, ci95_half_width) = summarize(&totals)?;
        let rescue_rate = self.config.stranded.map(|_| rescued as f64 / trials as f64);

        Ok(EvaluationReport {
            label: label.to_string(),
            trials,
            horizon: self.horizon(),
            mean_reward,
            std_dev,
            ci95_half_width,
            rescue_rate,
        })
    }

    /// Exact mean rollout reward over a uniform start state.
    ///
    /// This is the value the Monte-Carlo estimate converges to.
    pub fn expected_return(&self, policy: &Policy) -> Result<f64> {
        let horizon = self.horizon();
        let mut sum = 0.0;
        for start in StateId::all(self.num_states) {
            sum += self.rollout(policy, start, horizon)?.0;
        }
        Ok(sum / self.num_states as f64)
    }

    /// Evaluate `policy` and a random legal baseline drawn for the same grid.
    ///
    /// The baseline policy and its rollouts use seeds derived from the evaluator's seed.
    pub fn compare(&self, policy: &Policy) -> Result<PolicyComparison> {
        let mut baseline_rng = StdRng::seed_from_u64(self.seed.wrapping_add(1));
        let baseline_policy = Policy::random_baseline(self.num_states, &mut baseline_rng)?;

        let policy = self.evaluate_seeded(policy, "policy", self.seed)?;
        let baseline =
            self.evaluate_seeded(&baseline_policy, "random", self.seed.wrapping_add(2))?;
        let difference = policy.mean_reward - baseline.mean_reward;

        Ok(PolicyComparison {
            policy,
            baseline,
            difference,
        })
    }
}

/// Mean, sample standard deviation and 95% confidence half-width
fn summarize(totals: &[f64]) -> Result<(f64, f64, f64)> {
    let mean = totals.mean();
    if totals.len() < 2 {
        return Ok((mean, 0.0, 0.0));
    }

    let std_dev = totals.std_dev();
    let z = Normal::new(0.0, 1.0)
        .map_err(|e| Error::Statistics {
            message: e.to_string(),
        })?
        .inverse_cdf(0.975);
    let half_width = z * std_dev / (totals.len() as f64).sqrt();
    Ok((mean, std_dev, half_width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mdp::TransitionRecord,
        terrain::{Cell, TerrainGrid},
    };

    /// Flat 2x2 grid, stranded in the bottom-right corner
    fn corner_dataset() -> MdpDataset {
        let grid = TerrainGrid::uniform(2, Cell::new(0, 0)).unwrap();
        MdpDataset::build(&grid, StateId::new(4).unwrap(), 50.0).unwrap()
    }

    fn toward_corner() -> Policy {
        Policy::new(vec![Action::Right, Action::Down, Action::Right, Action::Up])
    }

    fn config() -> EvaluationConfig {
        EvaluationConfig::default()
            .with_trials(10_000)
            .with_seed(7)
            .with_stranded(StateId::new(4).unwrap())
    }

    #[test]
    fn test_expected_return_by_hand() {
        let evaluator = PolicyEvaluator::new(&corner_dataset(), config()).unwrap();
        assert_eq!(evaluator.horizon(), 2);

        // Starts 1..4 give 47, 46, 45, 46.
        let expected = evaluator.expected_return(&toward_corner()).unwrap();
        assert!((expected - 46.0).abs() < 1e-12);
    }

    #[test]
    fn test_monte_carlo_close_to_exact_and_always_rescues() {
        let evaluator = PolicyEvaluator::new(&corner_dataset(), config()).unwrap();
        let report = evaluator.evaluate(&toward_corner(), "policy").unwrap();

        assert_eq!(report.trials, 10_000);
        assert!((report.mean_reward - 46.0).abs() < 0.1);
        assert!(report.std_dev > 0.0);
        assert!(report.ci95_half_width < 0.1);
        assert_eq!(report.rescue_rate, Some(1.0));
    }

    #[test]
    fn test_rescue_rate_absent_without_stranded_state() {
        let config = EvaluationConfig::default().with_trials(100).with_seed(1);
        let evaluator = PolicyEvaluator::new(&corner_dataset(), config).unwrap();
        let report = evaluator.evaluate(&toward_corner(), "policy").unwrap();
        assert_eq!(report.rescue_rate, None);
    }

    #[test]
    fn test_illegal_action_is_reported_with_state() {
        let evaluator = PolicyEvaluator::new(&corner_dataset(), config()).unwrap();
        let policy = Policy::new(vec![Action::Up, Action::Down, Action::Right, Action::Up]);

        let err = evaluator.expected_return(&policy).unwrap_err();
        assert!(matches!(
            err,
            Error::IllegalPolicyAction { state, action: Action::Up } if state.get() == 1
        ));
        assert!(evaluator.evaluate(&policy, "bad").is_err());
    }

    #[test]
    fn test_short_policy_is_missing_states() {
        let evaluator = PolicyEvaluator::new(&corner_dataset(), config()).unwrap();
        let policy = Policy::new(vec![Action::Right, Action::Down]);

        let err = evaluator.expected_return(&policy).unwrap_err();
        assert!(matches!(err, Error::MissingPolicyState { .. }));
    }

    #[test]
    fn test_same_seed_same_report() {
        let dataset = corner_dataset();
        let a = PolicyEvaluator::new(&dataset, config()).unwrap();
        let b = PolicyEvaluator::new(&dataset, config()).unwrap();

        assert_eq!(
            a.compare(&toward_corner()).unwrap(),
            b.compare(&toward_corner()).unwrap()
        );
    }

    #[test]
    fn test_trials_not_a_multiple_of_chunk_size() {
        let config = config().with_trials(TRIALS_PER_CHUNK + 3);
        let evaluator = PolicyEvaluator::new(&corner_dataset(), config).unwrap();
        let report = evaluator.evaluate(&toward_corner(), "policy").unwrap();
        assert_eq!(report.trials, TRIALS_PER_CHUNK + 3);
    }

    #[test]
    fn test_comparison_difference_is_subtraction() {
        let evaluator = PolicyEvaluator::new(&corner_dataset(), config()).unwrap();
        let comparison = evaluator.compare(&toward_corner()).unwrap();

        assert_eq!(comparison.baseline.label, "random");
        assert_eq!(
            comparison.difference,
            comparison.policy.mean_reward - comparison.baseline.mean_reward
        );
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let result = PolicyEvaluator::new(&MdpDataset::from_records(Vec::new()), config());
        assert!(matches!(result, Err(Error::EmptyDataset)));
    }

    #[test]
    fn test_state_gap_is_a_dataset_inconsistency() {
        let record = |s: usize, a: Action, sp: usize| TransitionRecord {
            s: StateId::new(s).unwrap(),
            a,
            r: -1.0,
            sp: StateId::new(sp).unwrap(),
            d: 0,
        };
        let dataset = MdpDataset::from_records(vec![
            record(1, Action::Right, 2),
            record(2, Action::Left, 1),
            record(4, Action::Up, 2),
        ]);

        let result = PolicyEvaluator::new(&dataset, config());
        assert!(matches!(result, Err(Error::DatasetInconsistency { .. })));
    }

    #[test]
    fn test_single_trial_has_zero_spread() {
        let config = config().with_trials(1);
        let evaluator = PolicyEvaluator::new(&corner_dataset(), config).unwrap();
        let report = evaluator.evaluate(&toward_corner(), "policy").unwrap();
        assert_eq!(report.std_dev, 0.0);
        assert_eq!(report.ci95_half_width, 0.0);
    }
}
