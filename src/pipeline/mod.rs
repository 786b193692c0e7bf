//! Solver pipeline adapters
//!
//! Observers that plug into the [`Observer`] port: a progress bar for interactive
//! runs and a JSONL epoch log for later analysis.

pub mod observers;

pub use observers::{EpochObservation, JsonlObserver, ProgressObserver};

pub use crate::ports::{Observer, Solver};
