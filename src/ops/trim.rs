use super::{accessible, co_accessible};
use crate::automaton::{Automaton, StateFlags, StateId};
use log::trace;

/// Keep the states that are both reachable from an initial state and able
/// to reach a final one.
///
/// Transitions and defaults towards dropped states disappear, so trimming a
/// complete automaton usually makes it incomplete. A state that keeps its
/// default cannot lose a labelled transition that way: the atoms it read
/// would fall through to the default. Those transitions are sent to a
/// single non-final sink instead. When no state survives the result has no
/// states at all.
pub fn trim(automaton: &Automaton) -> Automaton {
    let useful = co_accessible(automaton);
    let kept: Vec<StateId> = accessible(automaton)
        .into_iter()
        .filter(|id| useful.binary_search(id).is_ok())
        .collect();

    let mut renumber = vec![None; automaton.state_count()];
    let mut result = Automaton::with_capacity(kept.len());
    for &old in &kept {
        let state = &automaton.states()[old];
        renumber[old] = Some(result.new_state(StateFlags {
            initial: state.is_initial(),
            is_final: state.is_final(),
        }));
    }

    let mut sink = None;
    for &old in &kept {
        let (state, from) = (&automaton.states()[old], renumber[old]);
        let Some(from) = from else { continue };
        let default = state.default_target().and_then(|d| renumber[d]);
        for t in state.transitions() {
            let to = match (renumber[t.target], default) {
                (Some(to), _) => to,
                (None, Some(_)) => {
                    *sink.get_or_insert_with(|| result.new_state(StateFlags::NONE))
                }
                (None, None) => continue,
            };
            result.push_transition(from, Some(t.label.clone()), to);
        }
        if let Some(to) = default {
            result.push_transition(from, None, to);
        }
    }

    trace!(
        "trimmed {} states down to {}",
        automaton.state_count(),
        result.state_count()
    );
    result
}
