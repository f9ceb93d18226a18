//! Complementation, minimization and trimming.
//!
//! These operations assume a deterministic automaton; complementation also
//! needs a complete one. Minimization and trimming return fresh automata
//! with states renumbered in breadth-first order from the initial state,
//! which therefore lands at index 0.

mod complement;
mod minimize;
mod trim;

pub use complement::complement;
pub use minimize::minimize;
pub use trim::trim;

use crate::automaton::{Automaton, StateId};
use std::collections::VecDeque;

/// Every state with a transition or default towards another, per state.
fn edges(automaton: &Automaton) -> impl Iterator<Item = (StateId, StateId)> + '_ {
    automaton.states().iter().enumerate().flat_map(|(from, state)| {
        state
            .transitions()
            .iter()
            .map(|t| t.target)
            .chain(state.default_target())
            .map(move |to| (from, to))
    })
}

/// States reachable from `seeds` over `adjacency`, in breadth-first order.
fn breadth_first(adjacency: &[Vec<StateId>], seeds: impl IntoIterator<Item = StateId>) -> Vec<StateId> {
    let mut seen = vec![false; adjacency.len()];
    let mut order = Vec::new();
    let mut queue = VecDeque::new();
    for seed in seeds {
        if !seen[seed] {
            seen[seed] = true;
            queue.push_back(seed);
        }
    }
    while let Some(id) = queue.pop_front() {
        order.push(id);
        for &next in &adjacency[id] {
            if !seen[next] {
                seen[next] = true;
                queue.push_back(next);
            }
        }
    }
    order
}

/// Forward adjacency lists, targets in transition order.
fn forward(automaton: &Automaton) -> Vec<Vec<StateId>> {
    let mut adjacency = vec![Vec::new(); automaton.state_count()];
    for (from, to) in edges(automaton) {
        adjacency[from].push(to);
    }
    adjacency
}

/// Reverse adjacency lists.
fn backward(automaton: &Automaton) -> Vec<Vec<StateId>> {
    let mut adjacency = vec![Vec::new(); automaton.state_count()];
    for (from, to) in edges(automaton) {
        adjacency[to].push(from);
    }
    adjacency
}

/// States reachable from an initial state, in breadth-first order.
pub fn accessible(automaton: &Automaton) -> Vec<StateId> {
    breadth_first(&forward(automaton), automaton.initial_states())
}

/// States from which a final state is reachable.
pub fn co_accessible(automaton: &Automaton) -> Vec<StateId> {
    let mut states = breadth_first(&backward(automaton), automaton.final_states());
    states.sort_unstable();
    states
}

impl Automaton {
    /// See [`complement`].
    pub fn complement(&mut self) -> crate::automaton::Result<()> {
        complement(self)
    }

    /// See [`minimize`].
    pub fn minimize(&self) -> crate::automaton::Result<Automaton> {
        minimize(self)
    }

    /// See [`trim`].
    pub fn trim(&self) -> Automaton {
        trim(self)
    }
}
