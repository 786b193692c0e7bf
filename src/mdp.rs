//! MDP construction: grid geometry, the transition dataset and validated per-state maps

pub mod dataset;
pub mod geometry;
pub mod model;

pub use dataset::{MdpDataset, TransitionRecord, transition_reward};
pub use geometry::{grid_side, legal_actions, successor};
pub use model::{ActionIndex, MdpModel};
