//! Powerset construction over symbolic alphabets.
//!
//! Both variants build one output state per *frontier element*, a sorted
//! set of input states, memoized so that no set is expanded twice. Every
//! output state gets a default transition to the image of the set under
//! "nothing matched", so the result is deterministic and complete and
//! carries no `Universal` label. Labels whose image equals the default
//! image are left to the default.
//!
//! - [`determinize_disjoint`] reads the automaton's alphabet as it is and
//!   requires it to be pairwise disjoint, without `Universal`.
//! - [`determinize_general`] refines the labels leaving each frontier
//!   element with a [`BiAlphabet`] first.
//!
//! [`determinize`] picks the cheaper one.

use crate::automaton::{Automaton, Result, State, StateFlags, StateId};
use crate::label::Label;
use crate::refine::BiAlphabet;
use log::debug;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// A sorted, deduplicated set of input states.
type Frontier = Vec<StateId>;

/// Disjoint input classes of one frontier element.
enum Classes<'a> {
    Global(&'a [Label]),
    Local(BiAlphabet),
}

impl Classes<'_> {
    fn pieces(&self) -> Vec<Label> {
        match self {
            Classes::Global(alphabet) => alphabet.to_vec(),
            Classes::Local(bi) => bi.readable(),
        }
    }

    fn covers(&self, original: &Label, piece: &Label) -> bool {
        match self {
            Classes::Global(_) => original == piece,
            Classes::Local(bi) => bi.covers(original, piece),
        }
    }
}

struct Powerset<'a> {
    input: &'a Automaton,
    output: Automaton,
    memo: FxHashMap<Frontier, StateId>,
    worklist: VecDeque<(Frontier, StateId)>,
}

impl<'a> Powerset<'a> {
    fn new(input: &'a Automaton) -> Self {
        let mut powerset = Self {
            input,
            output: Automaton::new(),
            memo: FxHashMap::default(),
            worklist: VecDeque::new(),
        };
        let start = frontier(input.initial_states());
        let id = powerset.intern(start);
        powerset.output.make_sole_initial(id);
        powerset
    }

    fn intern(&mut self, set: Frontier) -> StateId {
        if let Some(&id) = self.memo.get(&set) {
            return id;
        }
        let is_final = set
            .iter()
            .any(|&s| self.input.states()[s].is_final());
        let id = self.output.new_state(StateFlags {
            initial: false,
            is_final,
        });
        self.memo.insert(set.clone(), id);
        self.worklist.push_back((set, id));
        id
    }

    fn run<F>(mut self, mut classes: F) -> Result<Automaton>
    where
        F: FnMut(&[&State]) -> Result<Classes<'a>>,
    {
        let input = self.input;
        while let Some((set, id)) = self.worklist.pop_front() {
            let states: Vec<&State> = set.iter().map(|&s| &input.states()[s]).collect();

            let mut universal_targets = Vec::new();
            let mut fallback = Vec::new();
            for state in &states {
                let mut has_universal = false;
                for t in state.transitions() {
                    if t.label.is_universal() {
                        universal_targets.push(t.target);
                        has_universal = true;
                    }
                }
                if !has_universal {
                    fallback.extend(state.default_target());
                }
            }
            fallback.extend(universal_targets.iter().copied());
            let fallback = frontier(fallback);
            let fallback_id = self.intern(fallback.clone());
            self.output.add_transition(id, None, fallback_id)?;

            if states.iter().all(|s| s.transitions().is_empty()) {
                continue;
            }
            let classes = classes(&states)?;
            for piece in classes.pieces() {
                let mut image = universal_targets.clone();
                for state in &states {
                    let before = image.len();
                    image.extend(
                        state
                            .transitions()
                            .iter()
                            .filter(|t| !t.label.is_universal() && classes.covers(&t.label, &piece))
                            .map(|t| t.target),
                    );
                    if image.len() == before && !state.has_universal() {
                        image.extend(state.default_target());
                    }
                }
                let image = frontier(image);
                if image == fallback {
                    continue;
                }
                let target = self.intern(image);
                self.output.add_transition(id, Some(piece), target)?;
            }
        }
        Ok(self.output)
    }
}

fn frontier(states: impl IntoIterator<Item = StateId>) -> Frontier {
    let mut set: Frontier = states.into_iter().collect();
    set.sort_unstable();
    set.dedup();
    set
}

/// Powerset construction for an automaton whose labels are pairwise
/// disjoint and contain no `Universal`.
///
/// The disjointness is not checked; see [`determinize`].
pub fn determinize_disjoint(input: &Automaton) -> Result<Automaton> {
    let alphabet = input.alphabet();
    Powerset::new(input).run(|_| Ok(Classes::Global(&alphabet)))
}

/// Powerset construction refining the labels of every frontier element.
pub fn determinize_general(input: &Automaton) -> Result<Automaton> {
    Powerset::new(input).run(|states| {
        let labels = states
            .iter()
            .flat_map(|s| s.transitions())
            .map(|t| &t.label);
        Ok(Classes::Local(BiAlphabet::from_labels(labels)?))
    })
}

/// Whether `labels` are pairwise disjoint and contain no `Universal`.
pub fn is_disjoint_alphabet(labels: &[Label]) -> Result<bool> {
    for (i, a) in labels.iter().enumerate() {
        if a.is_universal() {
            return Ok(false);
        }
        for b in &labels[i + 1..] {
            if a.intersect(b)?.is_some() {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// An equivalent deterministic and complete automaton with a single
/// initial state at index 0.
pub fn determinize(input: &Automaton) -> Result<Automaton> {
    let alphabet = input.alphabet();
    let output = if is_disjoint_alphabet(&alphabet)? {
        determinize_disjoint(input)?
    } else {
        determinize_general(input)?
    };
    debug!(
        "determinized {} states into {} ({} labels)",
        input.state_count(),
        output.state_count(),
        alphabet.len()
    );
    Ok(output)
}

impl Automaton {
    /// See [`determinize`].
    pub fn determinize(&self) -> Result<Automaton> {
        determinize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &str) -> Label {
        Label::parse(s).unwrap()
    }

    /// `A*` then an adjective then a feminine adjective, nondeterministic.
    fn overlapping() -> Automaton {
        let mut a = Automaton::new();
        let q0 = a.new_state(StateFlags::INITIAL);
        let q1 = a.new_state(StateFlags::NONE);
        let q2 = a.new_state(StateFlags::FINAL);
        a.add_transition(q0, Some(Label::Universal), q0).unwrap();
        a.add_transition(q0, Some(label("<A>")), q1).unwrap();
        a.add_transition(q1, Some(label("<A:f>")), q2).unwrap();
        a
    }

    #[test]
    fn test_general_path_preserves_language() {
        let nfa = overlapping();
        let dfa = determinize(&nfa).unwrap();
        assert!(dfa.is_deterministic().unwrap());
        assert!(dfa.is_complete());
        assert_eq!(dfa.initial_states().collect::<Vec<_>>(), vec![0]);

        let samples = [
            vec![label("<beau.A:ms>"), label("<belle.A:fs>")],
            vec![label("<le.DET>"), label("<beau.A:ms>"), label("<belle.A:fs>")],
            vec![label("<belle.A:fs>"), label("<beau.A:ms>")],
            vec![label("<belle.A:fs>")],
            vec![],
        ];
        for sample in &samples {
            assert_eq!(
                nfa.accepts(sample).unwrap(),
                dfa.accepts(sample).unwrap(),
                "{:?}",
                sample
            );
        }
    }

    #[test]
    fn test_disjoint_path() {
        let mut nfa = Automaton::new();
        let q0 = nfa.new_state(StateFlags::INITIAL);
        let q1 = nfa.new_state(StateFlags::FINAL);
        let q2 = nfa.new_state(StateFlags::FINAL);
        nfa.add_transition(q0, Some(label("<DET>")), q1).unwrap();
        nfa.add_transition(q0, Some(label("<DET>")), q2).unwrap();
        nfa.add_transition(q2, Some(label("<N:ms>")), q2).unwrap();
        assert!(is_disjoint_alphabet(&nfa.alphabet()).unwrap());

        let dfa = determinize_disjoint(&nfa).unwrap();
        assert!(dfa.is_deterministic().unwrap());
        assert!(dfa
            .accepts(&[label("<le.DET>"), label("<chat.N:ms>")])
            .unwrap());
        assert!(!dfa.accepts(&[label("<chat.N:ms>")]).unwrap());
    }

    #[test]
    fn test_empty_input_gives_trash_state() {
        let dfa = determinize(&Automaton::new()).unwrap();
        assert_eq!(dfa.state_count(), 1);
        assert!(dfa.is_complete());
        assert!(!dfa.accepts(&[]).unwrap());
    }

    #[test]
    fn test_defaults_are_followed() {
        let mut nfa = Automaton::new();
        let q0 = nfa.new_state(StateFlags::INITIAL);
        let q1 = nfa.new_state(StateFlags::FINAL);
        nfa.add_transition(q0, Some(label("<A>")), q0).unwrap();
        nfa.add_transition(q0, None, q1).unwrap();
        let dfa = determinize(&nfa).unwrap();
        assert!(dfa.accepts(&[label("<x.?>")]).unwrap());
        assert!(dfa
            .accepts(&[label("<beau.A:ms>"), label("<x.?>")])
            .unwrap());
        assert!(!dfa.accepts(&[label("<beau.A:ms>")]).unwrap());
    }
}
