//! CLI command implementations

pub mod evaluate;
pub mod generate;
pub mod learn;
