//! Search-and-rescue planning on a mountain grid
//!
//! This crate provides:
//! - Terrain generation from tiled 3x3 micro-mountains
//! - A deterministic MDP transition dataset built from the terrain and a stranded
//!   person's location
//! - Two solvers over that dataset: model-free Q-learning and model-based value
//!   iteration with a density-dependent slip weight
//! - Monte-Carlo evaluation of a policy against a random legal baseline
//!
//! Data flows one way: terrain, dataset, solver, policy, evaluator. Files between the
//! stages are plain CSV (`s,a,r,sp,d`) and one action code per line.

pub mod cli;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod mdp;
pub mod pipeline;
pub mod policy;
pub mod ports;
pub mod q_learning;
pub mod terrain;
pub mod types;
pub mod value_iteration;

pub use error::{Error, Result};
pub use evaluation::{EvaluationReport, PolicyComparison, PolicyEvaluator};
pub use mdp::{MdpDataset, TransitionRecord};
pub use policy::Policy;
pub use ports::{Observer, SolveReport, Solver};
pub use q_learning::QLearningSolver;
pub use terrain::{Cell, Mountain, TerrainGrid};
pub use types::{Action, StateId};
pub use value_iteration::ValueIterationSolver;
