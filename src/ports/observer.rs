//! Observer port - watching solver runs epoch by epoch

use super::solver::{EpochSummary, SolveReport};
use crate::Result;

/// Observer trait for monitoring a solver run
///
/// # Event Sequence
///
/// 1. `on_solve_start(solver, max_epochs)` - once, before the first sweep
/// 2. `on_epoch_end(summary)` - after every sweep, including a sweep cut short by the
///    early-stop rule
/// 3. `on_solve_end(report)` - once, after the last sweep
///
/// # Examples
///
/// ```no_run
/// use mountain_rescue::ports::{EpochSummary, Observer};
///
/// struct DeltaLog(Vec<f64>);
///
/// impl Observer for DeltaLog {
///     fn on_epoch_end(&mut self, summary: &EpochSummary) -> mountain_rescue::Result<()> {
///         self.0.push(summary.max_delta);
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called once before the first sweep.
    fn on_solve_start(&mut self, _solver: &str, _max_epochs: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each sweep over the states or records.
    fn on_epoch_end(&mut self, _summary: &EpochSummary) -> Result<()> {
        Ok(())
    }

    /// Called once when the run finishes, converged or not.
    fn on_solve_end(&mut self, _report: &SolveReport) -> Result<()> {
        Ok(())
    }
}
