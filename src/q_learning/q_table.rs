//! Q-table implementation for temporal difference learning

use std::collections::HashMap;

use rand::Rng;

use crate::{
    mdp::{ActionIndex, TransitionRecord},
    types::{Action, StateId},
};

/// Q-table mapping (state, action) pairs to Q-values
///
/// Only pairs present in the dataset are stored.
#[derive(Debug, Clone)]
pub struct QTable {
    /// Q-values: (state, action) -> Q-value
    q_values: HashMap<(StateId, Action), f64>,
    /// Learning rate α
    learning_rate: f64,
    /// Discount factor γ
    discount_factor: f64,
}

impl QTable {
    /// Create an empty Q-table
    pub fn new(learning_rate: f64, discount_factor: f64) -> Self {
        Self {
            q_values: HashMap::new(),
            learning_rate,
            discount_factor,
        }
    }

    /// Fill every known (state, action) pair with a small random value in `[0, 1)`.
    ///
    /// Pairs are visited in ascending order so a seeded RNG gives the same table.
    pub fn randomize<R: Rng>(&mut self, index: &ActionIndex, rng: &mut R) {
        for (state, actions) in index.iter() {
            for &action in actions {
                self.q_values.insert((state, action), rng.random::<f64>());
            }
        }
    }

    /// Get Q-value for a state-action pair (0.0 if never stored)
    pub fn get(&self, state: StateId, action: Action) -> f64 {
        self.q_values
            .get(&(state, action))
            .copied()
            .unwrap_or_default()
    }

    /// Set Q-value for a state-action pair
    pub fn set(&mut self, state: StateId, action: Action, value: f64) {
        self.q_values.insert((state, action), value);
    }

    /// Maximum Q-value over the given actions, `None` if there are none
    pub fn max_q<'a, I>(&self, state: StateId, actions: I) -> Option<f64>
    where
        I: IntoIterator<Item = &'a Action>,
    {
        actions
            .into_iter()
            .map(|&action| self.get(state, action))
            .reduce(f64::max)
    }

    /// Greedy action among `actions`; ties go to the first (lowest code) action
    pub fn greedy_action<'a, I>(&self, state: StateId, actions: I) -> Option<Action>
    where
        I: IntoIterator<Item = &'a Action>,
    {
        let mut best: Option<(Action, f64)> = None;
        for &action in actions {
            let value = self.get(state, action);
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((action, value)),
            }
        }
        best.map(|(action, _)| action)
    }

    /// Q-learning update for one transition record.
    ///
    /// Returns the absolute change, or `None` when the successor has no known actions
    /// and the update is skipped.
    pub fn q_learning_update(
        &mut self,
        record: &TransitionRecord,
        index: &ActionIndex,
    ) -> Option<f64> {
        let next_actions = index.actions(record.sp)?;
        let max_next_q = self.max_q(record.sp, next_actions)?;
        let current_q = self.get(record.s, record.a);
        let td_target = record.r + self.discount_factor * max_next_q;
        let td_error = td_target - current_q;
        let new_q = current_q + self.learning_rate * td_error;
        self.set(record.s, record.a, new_q);
        Some((new_q - current_q).abs())
    }

    /// Get total number of Q-values stored
    pub fn size(&self) -> usize {
        self.q_values.len()
    }
}
