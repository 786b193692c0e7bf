//! CLI infrastructure for the mountain rescue toolkit
//!
//! This module provides the command-line interface for generating terrain datasets,
//! learning policies from them and evaluating those policies.

pub mod commands;
pub mod output;
