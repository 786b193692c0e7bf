//! Ports (trait boundaries) between the solvers and their surroundings.
//!
//! Solvers implement [`Solver`] so the CLI can drive either algorithm through one
//! interface; observers implement [`Observer`] to watch a run without coupling the
//! solver loop to progress bars or output files.

pub mod observer;
pub mod solver;

pub use observer::Observer;
pub use solver::{EpochSummary, SolveReport, Solver};
