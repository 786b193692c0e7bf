//! Transition dataset: one record per legal (state, action) pair
//!
//! The dataset is the explicit, deterministic transition function of the rescue MDP.
//! It is written as CSV with the header `s,a,r,sp,d`.

use std::{
    collections::BTreeSet,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use super::geometry::{legal_actions, successor};
use crate::{
    Error, Result,
    terrain::{Cell, TerrainGrid},
    types::{Action, StateId},
};

/// One row of the transition table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Origin state
    pub s: StateId,
    /// Action taken
    pub a: Action,
    /// Reward for the move
    pub r: f64,
    /// Successor state
    pub sp: StateId,
    /// Obstacle density of the origin cell
    pub d: u8,
}

/// Reward for moving into `successor` with `action`.
///
/// `height + density + action cost`, plus `found_bonus` when the move arrives at the
/// stranded person. Leaving the stranded person's cell earns nothing extra.
pub fn transition_reward(action: Action, successor: Cell, found: bool, found_bonus: f64) -> f64 {
    let bonus = if found { found_bonus } else { 0.0 };
    f64::from(successor.height) + f64::from(successor.density) + action.cost() + bonus
}

/// The full transition table of one generated mountain
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MdpDataset {
    records: Vec<TransitionRecord>,
}

impl MdpDataset {
    /// Enumerate every legal (state, action) pair of `grid`, row-major.
    ///
    /// Pure function of the grid and the stranded location.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSize`] if the grid is not square; the neighbour offsets assume it.
    /// - [`Error::InvalidState`] if `stranded` lies outside the grid.
    pub fn build(grid: &TerrainGrid, stranded: StateId, found_bonus: f64) -> Result<Self> {
        let rows = grid.rows();
        let columns = grid.columns();
        if !grid.is_square() {
            return Err(Error::InvalidSize { rows, columns });
        }
        if stranded.get() > grid.num_states() {
            return Err(Error::InvalidState {
                value: stranded.get(),
            });
        }

        let mut records = Vec::with_capacity(4 * rows * columns);
        for row in 0..rows {
            for column in 0..columns {
                let state = StateId::from_cell(row, column, columns);
                let origin = grid.get(row, column).ok_or(Error::InvalidSize { rows, columns })?;
                for action in legal_actions(row, column, rows, columns) {
                    let next = successor(state, action, rows)
                        .ok_or(Error::InvalidSize { rows, columns })?;
                    let target = grid.cell(next).ok_or(Error::InvalidSize { rows, columns })?;
                    records.push(TransitionRecord {
                        s: state,
                        a: action,
                        r: transition_reward(action, target, next == stranded, found_bonus),
                        sp: next,
                        d: origin.density,
                    });
                }
            }
        }
        Ok(Self { records })
    }

    pub fn from_records(records: Vec<TransitionRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct origin states
    pub fn num_states(&self) -> usize {
        self.records
            .iter()
            .map(|record| record.s)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Parse a `s,a,r,sp,d` CSV stream
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let records = csv_reader
            .deserialize()
            .collect::<std::result::Result<Vec<TransitionRecord>, csv::Error>>()?;
        Ok(Self { records })
    }

    /// Write the dataset as CSV with a `s,a,r,sp,d` header
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        if self.records.is_empty() {
            csv_writer.write_record(["s", "a", "r", "sp", "d"])?;
        }
        for record in &self.records {
            csv_writer.serialize(record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|source| Error::io(format!("open dataset {}", path.display()), source))?;
        Self::read_csv(BufReader::new(file))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|source| Error::io(format!("create dataset {}", path.display()), source))?;
        self.write_csv(BufWriter::new(file))
    }
}
