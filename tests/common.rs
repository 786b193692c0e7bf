//! Shared fixtures for the mountain rescue test suite.
//!
//! The main fixture is a flat 3x3 grid (height 0, density 0 everywhere) with the
//! stranded person in the centre, state 5. Every reward is then just the action cost,
//! plus 50 for entering state 5, so fixed points and rollout returns can be worked
//! out by hand.

#![allow(dead_code)]

use mountain_rescue::{
    Action, MdpDataset, Policy, StateId,
    terrain::{Cell, TerrainGrid},
};

pub const FOUND_BONUS: f64 = 50.0;

/// Value-iteration fixed point of the centre fixture with discount 0.5, states 1..=9
pub const CENTRE_UTILITIES_HALF_DISCOUNT: [f64; 9] =
    [30.5, 64.0, 30.5, 63.0, 30.0, 63.0, 29.0, 62.0, 29.0];

pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

pub fn state(id: usize) -> StateId {
    StateId::new(id).unwrap()
}

pub fn flat_grid(size: usize) -> TerrainGrid {
    TerrainGrid::uniform(size, Cell::new(0, 0)).unwrap()
}

/// Flat 3x3 grid, stranded person at state 5
pub fn centre_dataset() -> MdpDataset {
    MdpDataset::build(&flat_grid(3), state(5), FOUND_BONUS).unwrap()
}

/// Greedy policy of the centre fixture: every state heads for state 5 or, once
/// there, steps down to come back up
pub fn toward_centre_policy() -> Policy {
    use Action::*;
    Policy::new(vec![Down, Down, Down, Right, Down, Left, Right, Up, Left])
}

/// Most expensive legal action everywhere: up where possible, otherwise a
/// sideways move along the top row
pub fn expensive_policy() -> Policy {
    use Action::*;
    Policy::new(vec![Right, Left, Left, Up, Up, Up, Up, Up, Up])
}
