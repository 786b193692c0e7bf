//! Solver port - one interface over Q-learning and value iteration

use serde::{Deserialize, Serialize};

use super::observer::Observer;
use crate::{Result, policy::Policy};

/// What happened during one sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochSummary {
    /// Zero-based epoch number
    pub epoch: usize,
    /// Largest absolute value change in the sweep
    pub max_delta: f64,
    /// Updates counted as stable (Q-learning only)
    pub stable_updates: Option<usize>,
}

/// Outcome of a full solver run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveReport {
    /// Solver name
    pub solver: String,
    /// Number of states in the produced policy
    pub num_states: usize,
    /// Sweeps actually run
    pub epochs_run: usize,
    /// Whether the early-stop rule fired before the epoch budget ran out
    pub converged: bool,
    /// Per-epoch history
    pub epochs: Vec<EpochSummary>,
    /// Wall time of the run in seconds
    pub elapsed_secs: f64,
}

impl SolveReport {
    /// Largest change in the last sweep
    pub fn final_delta(&self) -> Option<f64> {
        self.epochs.last().map(|epoch| epoch.max_delta)
    }

    /// Save the report as pretty JSON
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)
            .map_err(|source| crate::Error::io(format!("create {}", path.display()), source))?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

/// Unified interface for the two solvers
///
/// A solver owns its value tables. Running it twice continues from where the previous
/// run stopped; nothing is shared with other solver instances.
pub trait Solver: Send {
    /// Solver name, for reports and progress output.
    fn name(&self) -> &str;

    /// Attach an observer for subsequent runs.
    fn add_observer(&mut self, observer: Box<dyn Observer>);

    /// Run until the early-stop rule fires or the epoch budget is spent.
    fn solve(&mut self) -> Result<SolveReport>;

    /// Greedy policy from the current tables.
    fn policy(&self) -> Result<Policy>;
}

/// Notify every observer, stopping at the first error
pub(crate) fn notify<F>(observers: &mut [Box<dyn Observer>], mut event: F) -> Result<()>
where
    F: FnMut(&mut dyn Observer) -> Result<()>,
{
    for observer in observers.iter_mut() {
        event(observer.as_mut())?;
    }
    Ok(())
}
