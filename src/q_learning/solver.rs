//! Q-learning solver: epoch loop, stopping rule and greedy policy extraction

use std::{collections::BTreeMap, time::Instant};

use rand::{SeedableRng, rngs::StdRng};

use super::q_table::QTable;
use crate::{
    Error, Result,
    config::QLearningConfig,
    mdp::{ActionIndex, MdpDataset, TransitionRecord},
    policy::Policy,
    ports::{EpochSummary, Observer, SolveReport, Solver, solver::notify},
};

/// Q-learning over a fixed dataset
///
/// Owns its Q-table and action index; the dataset records are copied in at
/// construction and replayed in dataset order every epoch.
pub struct QLearningSolver {
    config: QLearningConfig,
    records: Vec<TransitionRecord>,
    index: ActionIndex,
    q_table: QTable,
    observers: Vec<Box<dyn Observer>>,
}

impl QLearningSolver {
    /// Create a solver with a randomly initialized Q-table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyDataset`] for a dataset without records, or
    /// [`Error::InvalidConfiguration`] for out-of-range hyper-parameters.
    pub fn new(dataset: &MdpDataset, config: QLearningConfig) -> Result<Self> {
        config.validate()?;
        if dataset.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let index = ActionIndex::from_records(dataset.records());
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let mut q_table = QTable::new(config.learning_rate, config.discount);
        q_table.randomize(&index, &mut rng);

        Ok(Self {
            config,
            records: dataset.records().to_vec(),
            index,
            q_table,
            observers: Vec::new(),
        })
    }

    /// Add an observer to the solver
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    /// Distinct origin states; also the stable-update target per epoch
    pub fn num_states(&self) -> usize {
        self.index.num_states()
    }

    /// One sweep over the records. Returns the summary and whether the stopping rule fired.
    fn run_epoch(&mut self, epoch: usize) -> (EpochSummary, bool) {
        let target = self.index.num_states();
        let mut stable = 0;
        let mut max_delta: f64 = 0.0;
        let mut converged = false;

        for record in &self.records {
            let Some(delta) = self.q_table.q_learning_update(record, &self.index) else {
                continue;
            };
            max_delta = max_delta.max(delta);
            if delta < self.config.stability_epsilon {
                stable += 1;
            }
            if stable == target {
                converged = true;
                break;
            }
        }

        let summary = EpochSummary {
            epoch,
            max_delta,
            stable_updates: Some(stable),
        };
        (summary, converged)
    }
}

impl Solver for QLearningSolver {
    fn name(&self) -> &str {
        "Q-Learning"
    }

    fn add_observer(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    fn solve(&mut self) -> Result<SolveReport> {
        let start = Instant::now();
        let max_epochs = self.config.max_epochs;
        notify(&mut self.observers, |o| o.on_solve_start("Q-Learning", max_epochs))?;

        let mut epochs = Vec::new();
        let mut converged = false;
        for epoch in 0..max_epochs {
            let (summary, done) = self.run_epoch(epoch);
            notify(&mut self.observers, |o| o.on_epoch_end(&summary))?;
            epochs.push(summary);
            if done {
                converged = true;
                break;
            }
        }

        let report = SolveReport {
            solver: self.name().to_string(),
            num_states: self.index.num_states(),
            epochs_run: epochs.len(),
            converged,
            epochs,
            elapsed_secs: start.elapsed().as_secs_f64(),
        };
        notify(&mut self.observers, |o| o.on_solve_end(&report))?;
        Ok(report)
    }

    /// Arg-max over each state's known actions, ties to the lowest action code.
    fn policy(&self) -> Result<Policy> {
        self.index.check_contiguous()?;
        let mut greedy = BTreeMap::new();
        for (state, actions) in self.index.iter() {
            let action = self
                .q_table
                .greedy_action(state, actions)
                .ok_or(Error::MissingPolicyState { state })?;
            greedy.insert(state, action);
        }
        Policy::from_map(&greedy)
    }
}
