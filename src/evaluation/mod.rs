//! Monte-Carlo policy evaluation
//!
//! A rollout starts in a uniformly drawn state and follows the policy for a fixed
//! number of steps, summing the rewards of the dataset records it uses. Transitions
//! are deterministic, so the only randomness is the start state; the mean over many
//! rollouts estimates [`PolicyEvaluator::expected_return`].
//!
//! Trials are split into fixed-size chunks that run in parallel, each with its own
//! RNG seeded from the base seed and the chunk index.

pub mod evaluator;

pub use evaluator::{EvaluationReport, PolicyComparison, PolicyEvaluator, TRIALS_PER_CHUNK};
