//! Newtype wrappers for states and actions of the rescue grid.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A state identifier: the 1-based, row-major index of a grid cell.
///
/// `state = row * columns + column + 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct StateId(usize);

impl StateId {
    /// Create a state id, validating it is at least 1.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidState`] for 0.
    pub fn new(value: usize) -> Result<Self, crate::Error> {
        if value >= 1 {
            Ok(StateId(value))
        } else {
            Err(crate::Error::InvalidState { value })
        }
    }

    /// State id of the cell at `(row, column)` in a grid with `columns` columns.
    pub fn from_cell(row: usize, column: usize, columns: usize) -> Self {
        StateId(row * columns + column + 1)
    }

    /// State id for a zero-based index.
    pub fn from_index(index: usize) -> Self {
        StateId(index + 1)
    }

    /// Get the inner value.
    pub fn get(self) -> usize {
        self.0
    }

    /// Zero-based index, for dense tables.
    pub fn index(self) -> usize {
        self.0 - 1
    }

    /// `(row, column)` of this state in a grid with `columns` columns.
    pub fn cell(self, columns: usize) -> (usize, usize) {
        let index = self.index();
        (index / columns, index % columns)
    }

    /// Iterate `1..=count` as state ids.
    pub fn all(count: usize) -> impl Iterator<Item = StateId> {
        (1..=count).map(StateId)
    }
}

impl TryFrom<usize> for StateId {
    type Error = crate::Error;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        StateId::new(value)
    }
}

impl From<StateId> for usize {
    fn from(state: StateId) -> Self {
        state.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the four cardinal moves. Codes match the dataset and policy files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Action {
    Up = 1,
    Right = 2,
    Down = 3,
    Left = 4,
}

impl Action {
    /// Number of actions
    pub const COUNT: usize = 4;

    /// All actions in ascending code order
    pub const ALL: [Action; Action::COUNT] =
        [Action::Up, Action::Right, Action::Down, Action::Left];

    /// Numeric code (1-4)
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Zero-based column for dense per-action tables
    pub fn index(self) -> usize {
        self as usize - 1
    }

    /// Fixed fuel cost added to the reward of every move in this direction.
    ///
    /// Climbing is the most expensive and descending the cheapest, independent of the
    /// actual height difference between the two cells.
    pub fn cost(self) -> f64 {
        match self {
            Action::Up => -3.0,
            Action::Right | Action::Left => -2.0,
            Action::Down => -1.0,
        }
    }

    /// Lower-case name
    pub fn name(self) -> &'static str {
        match self {
            Action::Up => "up",
            Action::Right => "right",
            Action::Down => "down",
            Action::Left => "left",
        }
    }

    /// Arrow glyph used in policy grid views
    pub fn arrow(self) -> char {
        match self {
            Action::Up => '↑',
            Action::Right => '→',
            Action::Down => '↓',
            Action::Left => '←',
        }
    }
}

impl TryFrom<u8> for Action {
    type Error = crate::Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Action::Up),
            2 => Ok(Action::Right),
            3 => Ok(Action::Down),
            4 => Ok(Action::Left),
            _ => Err(crate::Error::InvalidAction { code }),
        }
    }
}

impl From<Action> for u8 {
    fn from(action: Action) -> Self {
        action.code()
    }
}

impl FromStr for Action {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "u" => Ok(Action::Up),
            "right" | "r" => Ok(Action::Right),
            "down" | "d" => Ok(Action::Down),
            "left" | "l" => Ok(Action::Left),
            other => {
                let code = other
                    .parse::<u8>()
                    .map_err(|_| crate::Error::InvalidAction { code: 0 })?;
                Action::try_from(code)
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}
