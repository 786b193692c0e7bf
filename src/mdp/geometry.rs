//! Boundary rules and neighbour offsets of the square rescue grid

use crate::{
    Error, Result,
    types::{Action, StateId},
};

/// Actions that stay inside the grid from `(row, column)`, in ascending code order.
///
/// Up is illegal on the top row, Down on the bottom row, Left on the leftmost column
/// and Right on the rightmost column.
pub fn legal_actions(row: usize, column: usize, rows: usize, columns: usize) -> Vec<Action> {
    Action::ALL
        .into_iter()
        .filter(|action| match action {
            Action::Up => row > 0,
            Action::Right => column + 1 < columns,
            Action::Down => row + 1 < rows,
            Action::Left => column > 0,
        })
        .collect()
}

/// Successor state of `state` under `action` using fixed offsets.
///
/// The vertical offset is the row count, which equals the column count only on a
/// square grid. Returns `None` when the offset would leave the id range below 1.
pub fn successor(state: StateId, action: Action, rows: usize) -> Option<StateId> {
    let value = state.get();
    let next = match action {
        Action::Up => value.checked_sub(rows)?,
        Action::Right => value + 1,
        Action::Down => value + rows,
        Action::Left => value - 1,
    };
    StateId::new(next).ok()
}

/// Side length of a square grid with `num_states` cells.
///
/// # Errors
///
/// Returns [`Error::InvalidSize`] when `num_states` is 0 or not a perfect square.
pub fn grid_side(num_states: usize) -> Result<usize> {
    let side = (num_states as f64).sqrt().round() as usize;
    if num_states == 0 || side * side != num_states {
        return Err(Error::InvalidSize {
            rows: num_states,
            columns: 1,
        });
    }
    Ok(side)
}
