//! Observer adapters for solver runs
//!
//! Observers collect progress and per-epoch data without coupling solver code to an
//! output format.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::{EpochSummary, Observer, SolveReport},
};

/// One line of a JSONL epoch log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochObservation {
    /// Solver that produced the epoch
    pub solver: String,
    pub epoch: usize,
    pub max_delta: f64,
    pub stable_updates: Option<usize>,
}

/// Progress bar observer - shows sweeps done and the latest largest change
#[derive(Default)]
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Observer for ProgressObserver {
    fn on_solve_start(&mut self, solver: &str, max_epochs: usize) -> Result<()> {
        let pb = ProgressBar::new(max_epochs as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {prefix} {bar:40.cyan/blue} {pos}/{len} epochs ({msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        pb.set_prefix(solver.to_string());
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_epoch_end(&mut self, summary: &EpochSummary) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(summary.epoch as u64 + 1);
            pb.set_message(format!("max delta {:.5}", summary.max_delta));
        }
        Ok(())
    }

    fn on_solve_end(&mut self, report: &SolveReport) -> Result<()> {
        if let Some(pb) = self.progress_bar.take() {
            let status = if report.converged {
                "converged"
            } else {
                "epoch budget spent"
            };
            pb.finish_with_message(status);
        }
        Ok(())
    }
}

/// JSONL observer - writes one [`EpochObservation`] per line
pub struct JsonlObserver {
    writer: BufWriter<File>,
    solver: String,
}

impl JsonlObserver {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|source| Error::io(format!("create {}", path.display()), source))?;
        Ok(Self {
            writer: BufWriter::new(file),
            solver: String::new(),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_solve_start(&mut self, solver: &str, _max_epochs: usize) -> Result<()> {
        self.solver = solver.to_string();
        Ok(())
    }

    fn on_epoch_end(&mut self, summary: &EpochSummary) -> Result<()> {
        let observation = EpochObservation {
            solver: self.solver.clone(),
            epoch: summary.epoch,
            max_delta: summary.max_delta,
            stable_updates: summary.stable_updates,
        };

        serde_json::to_writer(&mut self.writer, &observation)?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_solve_end(&mut self, _report: &SolveReport) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
