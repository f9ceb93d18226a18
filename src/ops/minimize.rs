use super::accessible;
use crate::automaton::{Automaton, AutomatonError, Result, State, StateFlags, StateId};
use crate::label::Label;
use crate::refine::BiAlphabet;
use log::debug;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Target reached on anything the explicit labels do not read.
fn otherwise(state: &State) -> Option<StateId> {
    state.universal_target().or(state.default_target())
}

/// Where `state` goes on each piece of the global alphabet, then on
/// everything else.
fn row(state: &State, alphabet: &BiAlphabet, pieces: &[Label]) -> Vec<Option<StateId>> {
    let fallback = otherwise(state);
    pieces
        .iter()
        .map(|piece| {
            state
                .transitions()
                .iter()
                .find(|t| !t.label.is_universal() && alphabet.covers(&t.label, piece))
                .map(|t| t.target)
                .or(fallback)
        })
        .chain(std::iter::once(fallback))
        .collect()
}

/// The minimal deterministic automaton accepting the same language.
///
/// Moore's partition refinement over the accessible states. State
/// signatures are computed over a refinement of the whole alphabet, so two
/// states spelling the same behaviour with different labels still merge.
/// Each merged state keeps the labels of its first member.
pub fn minimize(automaton: &Automaton) -> Result<Automaton> {
    if !automaton.is_deterministic()? {
        return Err(AutomatonError::NotDeterministic);
    }
    let states = accessible(automaton);
    if states.is_empty() {
        return Ok(Automaton::new());
    }

    let alphabet = BiAlphabet::from_labels(
        states
            .iter()
            .flat_map(|&id| automaton.states()[id].transitions())
            .map(|t| &t.label),
    )?;
    let pieces = alphabet.readable();
    let rows: FxHashMap<StateId, Vec<Option<StateId>>> = states
        .iter()
        .map(|&id| (id, row(&automaton.states()[id], &alphabet, &pieces)))
        .collect();

    let mut class: FxHashMap<StateId, usize> = states
        .iter()
        .map(|&id| (id, usize::from(automaton.states()[id].is_final())))
        .collect();
    let mut class_count = 0;
    loop {
        let mut signatures: FxHashMap<(usize, Vec<Option<usize>>), usize> = FxHashMap::default();
        let mut next = FxHashMap::default();
        for &id in &states {
            let signature = (
                class[&id],
                rows[&id]
                    .iter()
                    .map(|target| target.map(|t| class[&t]))
                    .collect::<Vec<_>>(),
            );
            let fresh = signatures.len();
            next.insert(id, *signatures.entry(signature).or_insert(fresh));
        }
        class = next;
        if signatures.len() == class_count {
            break;
        }
        class_count = signatures.len();
    }

    // Rebuild in breadth-first order from the initial class.
    let mut representative: FxHashMap<usize, StateId> = FxHashMap::default();
    for &id in &states {
        representative.entry(class[&id]).or_insert(id);
    }
    let mut result = Automaton::with_capacity(class_count);
    let mut renumber: FxHashMap<usize, StateId> = FxHashMap::default();
    let mut queue = VecDeque::new();
    let start = class[&states[0]];
    let mut number = |c: usize, result: &mut Automaton, queue: &mut VecDeque<usize>| {
        *renumber.entry(c).or_insert_with(|| {
            let state = &automaton.states()[representative[&c]];
            queue.push_back(c);
            result.new_state(StateFlags {
                initial: false,
                is_final: state.is_final(),
            })
        })
    };
    let initial = number(start, &mut result, &mut queue);
    result.make_sole_initial(initial);

    while let Some(c) = queue.pop_front() {
        let from = number(c, &mut result, &mut queue);
        let state = &automaton.states()[representative[&c]];
        let fallback = otherwise(state).map(|t| class[&t]);
        for t in state.transitions() {
            if t.label.is_universal() {
                continue;
            }
            let target = class[&t.target];
            if Some(target) != fallback {
                let to = number(target, &mut result, &mut queue);
                result.push_transition(from, Some(t.label.clone()), to);
            }
        }
        if let Some(target) = fallback {
            let to = number(target, &mut result, &mut queue);
            result.push_transition(from, None, to);
        }
    }

    debug!(
        "minimized {} states into {}",
        automaton.state_count(),
        result.state_count()
    );
    Ok(result)
}
