//! Gauss-Seidel value iteration solver

use std::time::Instant;

use crate::{
    Error, Result,
    config::ValueIterationConfig,
    mdp::{MdpDataset, MdpModel},
    policy::Policy,
    ports::{EpochSummary, Observer, SolveReport, Solver, solver::notify},
    types::{Action, StateId},
};

/// Weight applied to the utility of a congested successor
pub const CONGESTED_WEIGHT: f64 = 0.5;

/// Slip weight `T(s')` for a successor with obstacle `density`.
///
/// Not a probability distribution; see the module docs.
pub fn transition_weight(density: u8, max_density: u8) -> f64 {
    if density >= max_density.saturating_sub(1) {
        CONGESTED_WEIGHT
    } else {
        1.0
    }
}

/// Value iteration over a validated [`MdpModel`]
///
/// Owns its utility table and policy; utilities start at zero.
pub struct ValueIterationSolver {
    config: ValueIterationConfig,
    model: MdpModel,
    utilities: Vec<f64>,
    policy: Vec<Option<Action>>,
    observers: Vec<Box<dyn Observer>>,
}

impl ValueIterationSolver {
    /// Build the per-state model and a zeroed utility table.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::EmptyDataset`] / [`Error::DatasetInconsistency`] from model
    /// validation and [`Error::InvalidConfiguration`] from the config.
    pub fn new(dataset: &MdpDataset, config: ValueIterationConfig) -> Result<Self> {
        config.validate()?;
        let model = MdpModel::from_dataset(dataset)?;
        let num_states = model.num_states();
        Ok(Self {
            config,
            model,
            utilities: vec![0.0; num_states],
            policy: vec![None; num_states],
            observers: Vec::new(),
        })
    }

    /// Add an observer to the solver
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn model(&self) -> &MdpModel {
        &self.model
    }

    /// Current utility of every state, index `i` holding state `i + 1`
    pub fn utilities(&self) -> &[f64] {
        &self.utilities
    }

    pub fn utility(&self, state: StateId) -> Option<f64> {
        self.utilities.get(state.index()).copied()
    }

    /// Best `(utility, action)` for `state` given the current table.
    ///
    /// Ties keep the lowest action code.
    fn backup(&self, state: StateId) -> Result<(f64, Action)> {
        let mut best: Option<(f64, Action)> = None;
        for (action, reward, next) in self.model.moves(state) {
            let density = self.model.density(next).ok_or_else(|| {
                Error::inconsistent(format!("successor state {next} has no density"))
            })?;
            let weight = transition_weight(density, self.config.max_density);
            let value = reward + self.config.discount * weight * self.utilities[next.index()];
            match best {
                Some((best_value, _)) if value <= best_value => {}
                _ => best = Some((value, action)),
            }
        }
        best.ok_or_else(|| Error::inconsistent(format!("state {state} has no actions")))
    }

    /// One in-place sweep in ascending state order; returns the largest change.
    fn sweep(&mut self) -> Result<f64> {
        let mut max_delta: f64 = 0.0;
        for state in StateId::all(self.model.num_states()) {
            let (value, action) = self.backup(state)?;
            let slot = &mut self.utilities[state.index()];
            max_delta = max_delta.max((value - *slot).abs());
            *slot = value;
            self.policy[state.index()] = Some(action);
        }
        Ok(max_delta)
    }
}

impl Solver for ValueIterationSolver {
    fn name(&self) -> &str {
        "Value Iteration"
    }

    fn add_observer(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    fn solve(&mut self) -> Result<SolveReport> {
        let start = Instant::now();
        let max_epochs = self.config.max_epochs;
        notify(&mut self.observers, |o| o.on_solve_start("Value Iteration", max_epochs))?;

        let mut epochs = Vec::new();
        let mut converged = false;
        for epoch in 0..max_epochs {
            let max_delta = self.sweep()?;
            let summary = EpochSummary {
                epoch,
                max_delta,
                stable_updates: None,
            };
            notify(&mut self.observers, |o| o.on_epoch_end(&summary))?;
            epochs.push(summary);
            if max_delta < self.config.convergence_threshold {
                converged = true;
                break;
            }
        }

        let report = SolveReport {
            solver: self.name().to_string(),
            num_states: self.model.num_states(),
            epochs_run: epochs.len(),
            converged,
            epochs,
            elapsed_secs: start.elapsed().as_secs_f64(),
        };
        notify(&mut self.observers, |o| o.on_solve_end(&report))?;
        Ok(report)
    }

    /// Policy recorded by the last sweep, or the greedy policy of the current
    /// utilities before any sweep has run.
    fn policy(&self) -> Result<Policy> {
        let actions = StateId::all(self.model.num_states())
            .map(|state| match self.policy[state.index()] {
                Some(action) => Ok(action),
                None => self.backup(state).map(|(_, action)| action),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Policy::new(actions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mdp::TransitionRecord,
        terrain::{Cell, TerrainGrid},
    };

    fn state(value: usize) -> StateId {
        StateId::new(value).unwrap()
    }

    #[test]
    fn test_transition_weight_thresholds() {
        assert_eq!(transition_weight(0, 3), 1.0);
        assert_eq!(transition_weight(1, 3), 1.0);
        assert_eq!(transition_weight(2, 3), 0.5);
        assert_eq!(transition_weight(3, 3), 0.5);
    }

    #[test]
    fn test_congested_successor_halves_future_value() {
        // Two states; state 2 is congested. Rewards: 1 -> 2 pays 4, 2 -> 1 pays 2.
        let records = vec![
            TransitionRecord {
                s: state(1),
                a: Action::Right,
                r: 4.0,
                sp: state(2),
                d: 0,
            },
            TransitionRecord {
                s: state(2),
                a: Action::Left,
                r: 2.0,
                sp: state(1),
                d: 3,
            },
        ];
        let dataset = MdpDataset::from_records(records);
        let config = ValueIterationConfig::default()
            .with_discount(0.5)
            .with_max_epochs(2)
            .with_convergence_threshold(0.0);
        let mut solver = ValueIterationSolver::new(&dataset, config).unwrap();
        solver.solve().unwrap();
        // Sweep 1: U1 = 4 + 0.5*0.5*0 = 4, U2 = 2 + 0.5*1.0*4 = 4.
        // Sweep 2: U1 = 4 + 0.5*0.5*4 = 5, U2 = 2 + 0.5*1.0*5 = 4.5.
        assert!((solver.utility(state(1)).unwrap() - 5.0).abs() < 1e-12);
        assert!((solver.utility(state(2)).unwrap() - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_first_sweep_is_gauss_seidel() {
        let grid = TerrainGrid::uniform(3, Cell::new(0, 0)).unwrap();
        let dataset = MdpDataset::build(&grid, state(5), 50.0).unwrap();
        let config = ValueIterationConfig::default()
            .with_discount(0.5)
            .with_max_epochs(1);
        let mut solver = ValueIterationSolver::new(&dataset, config).unwrap();
        let report = solver.solve().unwrap();
        // U2 = 49 from entering the target, then U3 = -2 + 0.5 * 49 sees the new U2.
        assert_eq!(solver.utility(state(2)), Some(49.0));
        assert_eq!(solver.utility(state(3)), Some(22.5));
        assert_eq!(report.final_delta(), Some(59.0));
    }

    #[test]
    fn test_policy_before_solve_is_total() {
        let grid = TerrainGrid::uniform(3, Cell::new(1, 1)).unwrap();
        let dataset = MdpDataset::build(&grid, state(1), 50.0).unwrap();
        let solver = ValueIterationSolver::new(&dataset, ValueIterationConfig::default()).unwrap();
        let policy = solver.policy().unwrap();
        assert_eq!(policy.num_states(), 9);
        // With zero utilities the best move from 2 is straight into the target.
        assert_eq!(policy.action(state(2)), Some(Action::Left));
    }

    #[test]
    fn test_inconsistent_dataset_rejected() {
        let dataset = MdpDataset::from_records(vec![TransitionRecord {
            s: state(1),
            a: Action::Right,
            r: 1.0,
            sp: state(2),
            d: 0,
        }]);
        let result = ValueIterationSolver::new(&dataset, ValueIterationConfig::default());
        assert!(matches!(result, Err(Error::DatasetInconsistency { .. })));
    }
}
