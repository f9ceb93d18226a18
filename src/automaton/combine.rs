//! Structural combinators: union, concatenation and the `A*` loops.
//!
//! All of them merge the outgoing transitions of several states into one.
//! With default transitions in play this is not a plain concatenation of
//! transition lists: a label matched on one side only must still reach the
//! other side's default target, and two different defaults cannot share the
//! single default slot. [`merge`] takes care of both.

use super::{Automaton, Result, State, StateFlags, StateId, Transition};
use crate::label::Label;
use log::trace;

/// Outgoing transitions of one state, detached from it.
#[derive(Debug, Clone, Default)]
struct Outgoing {
    transitions: Vec<Transition>,
    default: Option<StateId>,
}

impl Outgoing {
    fn of(state: &State) -> Self {
        Self {
            transitions: state.transitions.clone(),
            default: state.default,
        }
    }

    fn self_loop(state: StateId) -> Self {
        Self {
            transitions: vec![Transition {
                label: Label::Universal,
                target: state,
            }],
            default: None,
        }
    }

    fn labels(&self) -> impl Iterator<Item = &Label> {
        self.transitions.iter().map(|t| &t.label)
    }

    fn push(&mut self, label: Label, target: StateId) {
        let transition = Transition { label, target };
        if !self.transitions.contains(&transition) {
            self.transitions.push(transition);
        }
    }

    fn install(self, state: &mut State) {
        state.transitions = self.transitions;
        state.default = self.default;
    }
}

/// `label` minus every label of `removed`, as disjoint pieces.
fn subtract_all<'a>(
    label: &Label,
    removed: impl IntoIterator<Item = &'a Label>,
) -> Result<Vec<Label>> {
    let mut pieces = vec![label.clone()];
    for r in removed {
        let mut next = Vec::with_capacity(pieces.len());
        for piece in &pieces {
            next.extend(piece.difference(r)?);
        }
        pieces = next;
        if pieces.is_empty() {
            break;
        }
    }
    Ok(pieces)
}

/// Outgoing transitions of a state reading like `x` and `y` at once.
fn merge(x: Outgoing, y: Outgoing) -> Result<Outgoing> {
    let mut merged = Outgoing::default();
    for (side, other) in [(&x, &y), (&y, &x)] {
        for t in &side.transitions {
            merged.push(t.label.clone(), t.target);
            if let Some(default) = other.default {
                for piece in subtract_all(&t.label, other.labels())? {
                    merged.push(piece, default);
                }
            }
        }
    }

    if merged.labels().any(Label::is_universal) {
        return Ok(merged);
    }
    match (x.default, y.default) {
        (Some(a), Some(b)) if a != b => {
            // Spell out the labels neither side reads, so both defaults fire.
            let rest = subtract_all(&Label::Universal, x.labels().chain(y.labels()))?;
            trace!("materialized {} rest labels for defaults {} and {}", rest.len(), a, b);
            for piece in rest {
                merged.push(piece.clone(), a);
                merged.push(piece, b);
            }
        }
        (a, b) => merged.default = a.or(b),
    }
    Ok(merged)
}

impl Automaton {
    /// Move the states of `other` to the end of `self`; returns the index of
    /// its first state.
    fn append(&mut self, other: Automaton) -> StateId {
        let offset = self.states.len();
        self.states.extend(other.states.into_iter().map(|mut state| {
            for t in &mut state.transitions {
                t.target += offset;
            }
            if let Some(d) = state.default.as_mut() {
                *d += offset;
            }
            state
        }));
        offset
    }

    /// Merge the outgoing transitions of `ids`, clearing their initial flag.
    ///
    /// Returns the merged transitions and whether one of the states is final.
    fn absorb_initials(&mut self, ids: &[StateId]) -> Result<(Outgoing, bool)> {
        let mut outgoing = Outgoing::default();
        let mut is_final = false;
        for &id in ids {
            let state = &mut self.states[id];
            state.initial = false;
            is_final |= state.is_final;
            outgoing = merge(outgoing, Outgoing::of(state))?;
        }
        Ok((outgoing, is_final))
    }

    /// Language union. Consumes both operands.
    ///
    /// A fresh initial state reads like every initial state of both
    /// operands, which keep their transitions but lose their initial flag.
    pub fn union(self, other: Automaton) -> Result<Automaton> {
        if self.is_empty() {
            return Ok(other);
        }
        if other.is_empty() {
            return Ok(self);
        }

        let mut result = Automaton::with_capacity(1 + self.state_count() + other.state_count());
        let fresh = result.new_state(StateFlags::INITIAL);
        result.append(self);
        result.append(other);

        let initials: Vec<StateId> = result.initial_states().filter(|&id| id != fresh).collect();
        let (outgoing, is_final) = result.absorb_initials(&initials)?;
        let state = &mut result.states[fresh];
        outgoing.install(state);
        state.is_final = is_final;
        Ok(result)
    }

    /// Language concatenation. Consumes both operands.
    ///
    /// Every final state of `self` is identified with the initial state of
    /// `other` and takes over its finality. An operand without states
    /// yields an automaton without states.
    pub fn concatenate(self, other: Automaton) -> Result<Automaton> {
        if self.is_empty() || other.is_empty() {
            return Ok(Automaton::new());
        }

        let mut result = self;
        let finals: Vec<StateId> = result.final_states().collect();
        let offset = result.append(other);
        let initials: Vec<StateId> = result.initial_states().filter(|&id| id >= offset).collect();
        let (start, start_final) = result.absorb_initials(&initials)?;

        for id in finals {
            let state = &mut result.states[id];
            let merged = merge(Outgoing::of(state), start.clone())?;
            merged.install(state);
            state.is_final = start_final;
        }
        Ok(result)
    }

    /// `A* . L`: a `Universal` self-loop on every initial state.
    pub fn prefix_with_everything(&mut self) -> Result<()> {
        let initials: Vec<StateId> = self.initial_states().collect();
        self.add_universal_loops(&initials)
    }

    /// `L . A*`: a `Universal` self-loop on every final state.
    pub fn suffix_with_everything(&mut self) -> Result<()> {
        let finals: Vec<StateId> = self.final_states().collect();
        self.add_universal_loops(&finals)
    }

    fn add_universal_loops(&mut self, ids: &[StateId]) -> Result<()> {
        for &id in ids {
            let state = &mut self.states[id];
            let merged = merge(Outgoing::of(state), Outgoing::self_loop(id))?;
            merged.install(state);
        }
        Ok(())
    }
}
