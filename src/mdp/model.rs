//! Per-state views of the transition dataset

use std::collections::{BTreeMap, BTreeSet};

use super::dataset::{MdpDataset, TransitionRecord};
use crate::{
    Error, Result,
    types::{Action, StateId},
};

/// Which actions each origin state has in the dataset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionIndex {
    actions: BTreeMap<StateId, BTreeSet<Action>>,
}

impl ActionIndex {
    pub fn from_records(records: &[TransitionRecord]) -> Self {
        let mut actions: BTreeMap<StateId, BTreeSet<Action>> = BTreeMap::new();
        for record in records {
            actions.entry(record.s).or_default().insert(record.a);
        }
        Self { actions }
    }

    /// Known actions of `state`, or `None` if it never appears as an origin
    pub fn actions(&self, state: StateId) -> Option<&BTreeSet<Action>> {
        self.actions.get(&state)
    }

    pub fn contains(&self, state: StateId) -> bool {
        self.actions.contains_key(&state)
    }

    pub fn num_states(&self) -> usize {
        self.actions.len()
    }

    /// `(state, actions)` pairs in ascending state order
    pub fn iter(&self) -> impl Iterator<Item = (StateId, &BTreeSet<Action>)> {
        self.actions.iter().map(|(state, actions)| (*state, actions))
    }

    /// Check that the origin states are exactly `1..=N` and return `N`.
    pub fn check_contiguous(&self) -> Result<usize> {
        for (expected, state) in StateId::all(self.actions.len()).zip(self.actions.keys()) {
            if *state != expected {
                return Err(Error::inconsistent(format!(
                    "state ids are not contiguous: expected state {expected}, found state {state}"
                )));
            }
        }
        Ok(self.actions.len())
    }
}

/// Validated model of the MDP used by value iteration.
///
/// Holds the action set, reward, single successor and density of every state, all
/// derived from the dataset once.
#[derive(Debug, Clone)]
pub struct MdpModel {
    actions: ActionIndex,
    rewards: BTreeMap<StateId, BTreeMap<Action, f64>>,
    next_states: BTreeMap<StateId, BTreeMap<Action, StateId>>,
    densities: BTreeMap<StateId, u8>,
    num_states: usize,
}

impl MdpModel {
    /// Derive and validate the per-state maps.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyDataset`] when there are no records.
    /// - [`Error::DatasetInconsistency`] for duplicate (state, action) records, a state
    ///   with two different densities, map sizes that disagree, state ids with gaps, or
    ///   a successor that never appears as an origin.
    pub fn from_dataset(dataset: &MdpDataset) -> Result<Self> {
        if dataset.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let mut rewards: BTreeMap<StateId, BTreeMap<Action, f64>> = BTreeMap::new();
        let mut next_states: BTreeMap<StateId, BTreeMap<Action, StateId>> = BTreeMap::new();
        let mut densities: BTreeMap<StateId, u8> = BTreeMap::new();

        for record in dataset.records() {
            if rewards.entry(record.s).or_default().insert(record.a, record.r).is_some() {
                return Err(Error::inconsistent(format!(
                    "duplicate record for state {}, action {}",
                    record.s, record.a
                )));
            }
            next_states.entry(record.s).or_default().insert(record.a, record.sp);
            match densities.insert(record.s, record.d) {
                Some(previous) if previous != record.d => {
                    return Err(Error::inconsistent(format!(
                        "state {} has densities {previous} and {}",
                        record.s, record.d
                    )));
                }
                _ => {}
            }
        }

        let actions = ActionIndex::from_records(dataset.records());
        let counts = [
            actions.num_states(),
            rewards.len(),
            next_states.len(),
            densities.len(),
        ];
        if counts.iter().any(|&count| count != counts[0]) {
            return Err(Error::inconsistent(format!(
                "state counts differ: {} with actions, {} with rewards, {} with successors, {} with densities",
                counts[0], counts[1], counts[2], counts[3]
            )));
        }
        let num_states = actions.check_contiguous()?;

        for (state, successors) in &next_states {
            for (action, next) in successors {
                if !densities.contains_key(next) {
                    return Err(Error::inconsistent(format!(
                        "state {state}, action {action} leads to state {next}, which has no outgoing records"
                    )));
                }
            }
        }

        Ok(Self {
            actions,
            rewards,
            next_states,
            densities,
            num_states,
        })
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn action_index(&self) -> &ActionIndex {
        &self.actions
    }

    /// `(action, reward, successor)` for every legal action of `state`, ascending by action
    pub fn moves(&self, state: StateId) -> impl Iterator<Item = (Action, f64, StateId)> + '_ {
        let rewards = self.rewards.get(&state);
        let successors = self.next_states.get(&state);
        rewards
            .into_iter()
            .flatten()
            .filter_map(move |(action, reward)| {
                let next = successors?.get(action)?;
                Some((*action, *reward, *next))
            })
    }

    pub fn reward(&self, state: StateId, action: Action) -> Option<f64> {
        self.rewards.get(&state)?.get(&action).copied()
    }

    pub fn next_state(&self, state: StateId, action: Action) -> Option<StateId> {
        self.next_states.get(&state)?.get(&action).copied()
    }

    pub fn density(&self, state: StateId) -> Option<u8> {
        self.densities.get(&state).copied()
    }
}
