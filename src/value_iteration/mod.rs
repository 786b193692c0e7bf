//! Model-based value iteration with a density-dependent slip weight
//!
//! Each sweep applies the Bellman backup to every state in ascending id order,
//! Gauss-Seidel style: utilities are updated in place, so later states in a sweep
//! already see the new values of earlier ones.
//!
//! ```text
//! U(s) ← max_a [ R(s,a) + γ · T(s') · U(s') ],   s' = next(s,a)
//! ```
//!
//! ## Known modeling quirk
//!
//! `T(s')` is 0.5 when the successor's obstacle density is at least `max_density - 1`
//! and 1.0 otherwise. It scales the successor's utility directly: the missing half of
//! the probability mass is *not* assigned to any other outcome, so this is not a proper
//! stochastic transition model. The formula is kept as is so results stay comparable
//! with existing policies; do not read the utilities as expected returns of a real
//! slipping agent.

pub mod solver;

pub use solver::{CONGESTED_WEIGHT, ValueIterationSolver, transition_weight};
