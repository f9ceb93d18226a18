//! Synchronized product of two automata.
//!
//! Output states are pairs of input states, expanded once each from a
//! worklist. For a pair, the labels leaving both states are refined
//! together into a [`BiAlphabet`]; each readable piece is then matched by at
//! most one transition on each side, or falls back to that side's
//! `Universal` or default target.

use crate::automaton::{Automaton, AutomatonError, Result, State, StateFlags, StateId};
use crate::label::Label;
use crate::refine::BiAlphabet;
use log::debug;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

type Pair = (StateId, StateId);

struct Product<'a> {
    a: &'a Automaton,
    b: &'a Automaton,
    output: Automaton,
    memo: FxHashMap<Pair, StateId>,
    worklist: VecDeque<(Pair, StateId)>,
}

impl<'a> Product<'a> {
    fn new(a: &'a Automaton, b: &'a Automaton) -> Self {
        Self {
            a,
            b,
            output: Automaton::new(),
            memo: FxHashMap::default(),
            worklist: VecDeque::new(),
        }
    }

    fn intern(&mut self, (qa, qb): Pair) -> StateId {
        if let Some(&id) = self.memo.get(&(qa, qb)) {
            return id;
        }
        let (sa, sb) = (&self.a.states()[qa], &self.b.states()[qb]);
        let id = self.output.new_state(StateFlags {
            initial: sa.is_initial() && sb.is_initial(),
            is_final: sa.is_final() && sb.is_final(),
        });
        self.memo.insert((qa, qb), id);
        self.worklist.push_back(((qa, qb), id));
        id
    }

    /// Seed the worklist with the pair of initial states.
    fn start(&mut self) -> bool {
        match (
            self.a.initial_states().next(),
            self.b.initial_states().next(),
        ) {
            (Some(qa), Some(qb)) => {
                self.intern((qa, qb));
                true
            }
            _ => false,
        }
    }
}

/// Target reached on anything the explicit labels do not read.
fn otherwise(state: &State) -> Option<StateId> {
    state.universal_target().or(state.default_target())
}

/// Target of the non-`Universal` transition covering `piece`, if any.
fn matching(state: &State, alphabet: &BiAlphabet, piece: &Label) -> Option<StateId> {
    state
        .transitions()
        .iter()
        .find(|t| !t.label.is_universal() && alphabet.covers(&t.label, piece))
        .map(|t| t.target)
}

/// The product automaton of two deterministic automata.
///
/// The result accepts a sequence iff both operands do. An operand without
/// an initial state yields an automaton without states.
///
/// Operands need not be complete. An atom that one side reads neither
/// explicitly nor through a default blocks that side, and the product
/// blocks with it. Trimmed grammars are intersected this way.
pub fn intersect(a: &Automaton, b: &Automaton) -> Result<Automaton> {
    if !a.is_deterministic()? || !b.is_deterministic()? {
        return Err(AutomatonError::NotDeterministic);
    }

    let mut product = Product::new(a, b);
    if !product.start() {
        return Ok(Automaton::new());
    }

    while let Some(((qa, qb), id)) = product.worklist.pop_front() {
        let (sa, sb) = (&a.states()[qa], &b.states()[qb]);
        let (other_a, other_b) = (otherwise(sa), otherwise(sb));

        let labels = sa.transitions().iter().chain(sb.transitions()).map(|t| &t.label);
        let alphabet = BiAlphabet::from_labels(labels)?;
        for piece in alphabet.readable() {
            let (ta, tb) = (
                matching(sa, &alphabet, &piece),
                matching(sb, &alphabet, &piece),
            );
            if ta.is_none() && tb.is_none() {
                // Left to the default pair below.
                continue;
            }
            if let (Some(ta), Some(tb)) = (ta.or(other_a), tb.or(other_b)) {
                let target = product.intern((ta, tb));
                product.output.add_transition(id, Some(piece), target)?;
            }
        }
        if let (Some(ta), Some(tb)) = (other_a, other_b) {
            let target = product.intern((ta, tb));
            product.output.add_transition(id, None, target)?;
        }
    }

    debug!(
        "intersected {} and {} states into {}",
        a.state_count(),
        b.state_count(),
        product.output.state_count()
    );
    Ok(product.output)
}

/// Product of a text automaton, whose labels are atoms, with a
/// deterministic grammar.
///
/// The text may be nondeterministic. Each text transition is matched by
/// membership against the grammar's labels rather than by refinement.
pub fn intersect_with_text(text: &Automaton, grammar: &Automaton) -> Result<Automaton> {
    if !grammar.is_deterministic()? {
        return Err(AutomatonError::NotDeterministic);
    }

    let mut product = Product::new(text, grammar);
    if !product.start() {
        return Ok(Automaton::new());
    }
    // A text may have several initial states; all pair with the grammar's.
    if let Some(qg) = grammar.initial_states().next() {
        for qt in text.initial_states().skip(1) {
            product.intern((qt, qg));
        }
    }

    while let Some(((qt, qg), id)) = product.worklist.pop_front() {
        let (st, sg) = (&text.states()[qt], &grammar.states()[qg]);
        for t in st.transitions() {
            let mut target = None;
            for g in sg.transitions() {
                if !g.label.is_universal() && t.label.member(&g.label)? {
                    target = Some(g.target);
                    break;
                }
            }
            if let Some(tg) = target.or_else(|| otherwise(sg)) {
                let next = product.intern((t.target, tg));
                product.output.add_transition(id, Some(t.label.clone()), next)?;
            }
        }
    }
    Ok(product.output)
}

impl Automaton {
    /// See [`intersect`].
    pub fn intersect(&self, other: &Automaton) -> Result<Automaton> {
        intersect(self, other)
    }
}
