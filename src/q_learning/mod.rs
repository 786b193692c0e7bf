//! Model-free Q-learning over the transition dataset
//!
//! The learner never simulates: it replays every transition record in dataset order,
//! once per epoch, applying the off-policy TD update
//!
//! ```text
//! Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
//! ```
//!
//! where the max runs over the actions `s'` has in the dataset. Records whose successor
//! never appears as an origin state are skipped, which treats such states as absorbing.
//!
//! ## Stopping rule
//!
//! An update is *stable* when it changes its Q-value by less than the stability
//! epsilon. The run stops as soon as the number of stable updates within the current
//! epoch reaches the number of distinct states. This is a heuristic: it depends on the
//! record order and does not prove the table has reached the fixed point.
//!
//! ## Usage Example
//!
//! ```no_run
//! use mountain_rescue::{
//!     config::QLearningConfig,
//!     mdp::MdpDataset,
//!     ports::Solver,
//!     q_learning::QLearningSolver,
//! };
//!
//! let dataset = MdpDataset::load("data/10_mountain_data.csv")?;
//! let mut solver = QLearningSolver::new(&dataset, QLearningConfig::default().with_seed(7))?;
//! let report = solver.solve()?;
//! let policy = solver.policy()?;
//! # Ok::<(), mountain_rescue::Error>(())
//! ```

pub mod q_table;
pub mod solver;

pub use q_table::QTable;
pub use solver::QLearningSolver;
