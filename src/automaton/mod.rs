//! Automata over symbolic labels.
//!
//! An [`Automaton`] is a vector of [`State`]s addressed by [`StateId`]. Each
//! state owns a list of labelled transitions and at most one *default*
//! transition, taken on every input that matches none of the labels. The
//! default keeps automata complete without enumerating the alphabet.
//!
//! Reading an atom `x` from a state yields the targets of every transition
//! whose label contains `x`, or the default target when there is none. A
//! [`Label::Universal`] transition therefore shadows the default.

mod combine;
mod error;

pub use error::{AutomatonError, Result};

use crate::label::Label;
use rustc_hash::FxHashSet;

/// Index of a state in its automaton.
pub type StateId = usize;

/// Initial and final flags of a new state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateFlags {
    /// The state is initial.
    pub initial: bool,
    /// The state is final.
    pub is_final: bool,
}

impl StateFlags {
    /// Neither initial nor final.
    pub const NONE: StateFlags = StateFlags {
        initial: false,
        is_final: false,
    };
    /// Initial only.
    pub const INITIAL: StateFlags = StateFlags {
        initial: true,
        is_final: false,
    };
    /// Final only.
    pub const FINAL: StateFlags = StateFlags {
        initial: false,
        is_final: true,
    };
    /// Both initial and final.
    pub const INITIAL_FINAL: StateFlags = StateFlags {
        initial: true,
        is_final: true,
    };
}

/// A labelled transition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Transition {
    /// Set of atoms accepted by the transition.
    pub label: Label,
    /// Destination state.
    pub target: StateId,
}

/// A state and its outgoing transitions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct State {
    transitions: Vec<Transition>,
    default: Option<StateId>,
    initial: bool,
    is_final: bool,
}

impl State {
    fn new(flags: StateFlags) -> Self {
        Self {
            transitions: Vec::new(),
            default: None,
            initial: flags.initial,
            is_final: flags.is_final,
        }
    }

    /// Labelled transitions, in insertion order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Target of the default transition.
    pub fn default_target(&self) -> Option<StateId> {
        self.default
    }

    /// Whether the state is initial.
    pub fn is_initial(&self) -> bool {
        self.initial
    }

    /// Whether the state is final.
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Whether one of the transitions is labelled [`Label::Universal`].
    pub fn has_universal(&self) -> bool {
        self.transitions.iter().any(|t| t.label.is_universal())
    }

    /// Target of the first `Universal` transition.
    pub fn universal_target(&self) -> Option<StateId> {
        self.transitions
            .iter()
            .find(|t| t.label.is_universal())
            .map(|t| t.target)
    }

    /// Targets reached on the atom `atom`.
    pub fn successors(&self, atom: &Label) -> Result<Vec<StateId>> {
        let mut targets = Vec::new();
        for t in &self.transitions {
            if atom.member(&t.label)? {
                targets.push(t.target);
            }
        }
        if targets.is_empty() {
            targets.extend(self.default);
        }
        Ok(targets)
    }

    pub(crate) fn toggle_final(&mut self) {
        self.is_final = !self.is_final;
    }

    fn push(&mut self, label: Label, target: StateId) {
        let transition = Transition { label, target };
        if !self.transitions.contains(&transition) {
            self.transitions.push(transition);
        }
    }
}

/// A finite-state automaton over [`Label`]s.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Automaton {
    states: Vec<State>,
}

impl Automaton {
    /// An automaton without states. It accepts nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty automaton with room for `capacity` states.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            states: Vec::with_capacity(capacity),
        }
    }

    /// Append a state and return its index.
    pub fn new_state(&mut self, flags: StateFlags) -> StateId {
        self.states.push(State::new(flags));
        self.states.len() - 1
    }

    /// Add a transition. A `None` label sets the default transition.
    ///
    /// Adding an existing transition again is a no-op.
    pub fn add_transition(
        &mut self,
        from: StateId,
        label: Option<Label>,
        to: StateId,
    ) -> Result<()> {
        self.check(to)?;
        let state = self.state_mut(from)?;
        match label {
            Some(label) => state.push(label, to),
            None => match state.default {
                Some(existing) if existing != to => {
                    return Err(AutomatonError::DuplicateDefault {
                        state: from,
                        existing,
                    })
                }
                _ => state.default = Some(to),
            },
        }
        Ok(())
    }

    /// Set or clear the initial flag.
    pub fn set_initial(&mut self, id: StateId, initial: bool) -> Result<()> {
        self.state_mut(id)?.initial = initial;
        Ok(())
    }

    /// Set or clear the final flag.
    pub fn set_final(&mut self, id: StateId, is_final: bool) -> Result<()> {
        self.state_mut(id)?.is_final = is_final;
        Ok(())
    }

    /// All states.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// The state at `id`.
    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(id)
    }

    fn state_mut(&mut self, id: StateId) -> Result<&mut State> {
        self.states
            .get_mut(id)
            .ok_or(AutomatonError::UnknownState(id))
    }

    fn check(&self, id: StateId) -> Result<()> {
        if id < self.states.len() {
            Ok(())
        } else {
            Err(AutomatonError::UnknownState(id))
        }
    }

    /// Number of states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Number of labelled and default transitions.
    pub fn transition_count(&self) -> usize {
        self.states
            .iter()
            .map(|s| s.transitions.len() + usize::from(s.default.is_some()))
            .sum()
    }

    /// True when there are no states.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Indices of the initial states.
    pub fn initial_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.initial)
            .map(|(i, _)| i)
    }

    /// Indices of the final states.
    pub fn final_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_final)
            .map(|(i, _)| i)
    }

    /// Distinct transition labels, in order of first appearance.
    pub fn alphabet(&self) -> Vec<Label> {
        let mut seen = FxHashSet::default();
        let mut labels = Vec::new();
        for t in self.states.iter().flat_map(|s| &s.transitions) {
            if seen.insert(&t.label) {
                labels.push(t.label.clone());
            }
        }
        labels
    }

    /// Run a sequence of atoms through the automaton.
    pub fn accepts(&self, input: &[Label]) -> Result<bool> {
        let mut current: Vec<StateId> = self.initial_states().collect();
        for atom in input {
            let mut next = Vec::new();
            for &id in &current {
                next.extend(self.states[id].successors(atom)?);
            }
            next.sort_unstable();
            next.dedup();
            if next.is_empty() {
                return Ok(false);
            }
            current = next;
        }
        Ok(current.iter().any(|&id| self.states[id].is_final))
    }

    /// At most one initial state, and the labels leaving each state are
    /// pairwise disjoint.
    pub fn is_deterministic(&self) -> Result<bool> {
        if self.initial_states().nth(1).is_some() {
            return Ok(false);
        }
        for state in &self.states {
            let transitions = &state.transitions;
            for (i, a) in transitions.iter().enumerate() {
                for b in &transitions[i + 1..] {
                    if a.label.intersect(&b.label)?.is_some() {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }

    /// The first state that may block on some input, if any.
    ///
    /// `Some(None)` for an automaton without states.
    pub(crate) fn blocking_state(&self) -> Option<Option<StateId>> {
        if self.states.is_empty() {
            return Some(None);
        }
        self.states
            .iter()
            .position(|s| s.default.is_none() && !s.has_universal())
            .map(Some)
    }

    /// Every state has a default or a `Universal` transition.
    pub fn is_complete(&self) -> bool {
        self.blocking_state().is_none()
    }

    /// Clear every initial flag, then mark `id` initial.
    pub(crate) fn make_sole_initial(&mut self, id: StateId) {
        for state in &mut self.states {
            state.initial = false;
        }
        self.states[id].initial = true;
    }

    pub(crate) fn states_mut(&mut self) -> &mut [State] {
        &mut self.states
    }

    /// Add a transition between states known to exist. A second default
    /// replaces the first.
    pub(crate) fn push_transition(&mut self, from: StateId, label: Option<Label>, to: StateId) {
        let state = &mut self.states[from];
        match label {
            Some(label) => state.push(label, to),
            None => state.default = Some(to),
        }
    }
}
