//! Deterministic policies: one action per state
//!
//! Policy files hold one integer action code per line, one line per state, in
//! ascending state order.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    mdp::{grid_side, legal_actions},
    types::{Action, StateId},
};

/// A total map from states `1..=N` to actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    actions: Vec<Action>,
}

impl Policy {
    /// Policy whose action for state `i + 1` is `actions[i]`
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    /// Build from a state-keyed map that must cover exactly `1..=N`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingPolicyState`] for the first missing state id.
    pub fn from_map(map: &BTreeMap<StateId, Action>) -> Result<Self> {
        let mut actions = Vec::with_capacity(map.len());
        for (expected, (state, action)) in StateId::all(map.len()).zip(map) {
            if *state != expected {
                return Err(Error::MissingPolicyState { state: expected });
            }
            actions.push(*action);
        }
        Ok(Self { actions })
    }

    /// Random but legal policy for a square grid with `num_states` cells.
    ///
    /// Each state draws one of its legal actions uniformly.
    pub fn random_baseline<R: Rng>(num_states: usize, rng: &mut R) -> Result<Self> {
        let side = grid_side(num_states)?;
        let mut actions = Vec::with_capacity(num_states);
        for row in 0..side {
            for column in 0..side {
                let legal = legal_actions(row, column, side, side);
                let action = legal
                    .choose(rng)
                    .copied()
                    .ok_or(Error::InvalidSize {
                        rows: side,
                        columns: side,
                    })?;
                actions.push(action);
            }
        }
        Ok(Self { actions })
    }

    pub fn num_states(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Action for `state`, if the policy covers it
    pub fn action(&self, state: StateId) -> Option<Action> {
        self.actions.get(state.index()).copied()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// `(state, action)` pairs in ascending state order
    pub fn iter(&self) -> impl Iterator<Item = (StateId, Action)> + '_ {
        self.actions
            .iter()
            .enumerate()
            .map(|(index, action)| (StateId::from_index(index), *action))
    }

    /// Parse one action code per line. Trailing blank lines are ignored.
    pub fn read<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines().collect::<std::io::Result<Vec<String>>>()?;
        while lines.last().is_some_and(|line| line.trim().is_empty()) {
            lines.pop();
        }
        let actions = lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                line.trim()
                    .parse::<u8>()
                    .ok()
                    .and_then(|code| Action::try_from(code).ok())
                    .ok_or_else(|| Error::MalformedPolicy {
                        line: index + 1,
                        content: line.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { actions })
    }

    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        for action in &self.actions {
            writeln!(writer, "{}", action.code())?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|source| Error::io(format!("open policy {}", path.display()), source))?;
        Self::read(BufReader::new(file))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|source| Error::io(format!("create policy {}", path.display()), source))?;
        self.write(BufWriter::new(file))
    }

    /// Arrow grid, one text row per grid row
    pub fn render_grid(&self) -> Result<String> {
        let side = grid_side(self.actions.len())?;
        let mut out = String::with_capacity(self.actions.len() * 2);
        for row in self.actions.chunks(side) {
            let line: Vec<String> = row.iter().map(|a| a.arrow().to_string()).collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }
        Ok(out)
    }
}
