//! Compiling a split rule into a grammar automaton.
//!
//! With main constraint `R1 _ R2` and side constraints `Ci,1 _ Ci,2`, a
//! sequence is forbidden when some split point has `A* R1` on its left,
//! `R2 A*` on its right, and no side constraint matching on both sides.
//! For every subset `S` of the side constraints the forbidden sequences
//! that fail exactly the left halves in `S` and the right halves outside
//! `S` are
//!
//! ```text
//! (A* R1 \ U{i in S} A* Ci,1) . (R2 A* \ U{i not in S} Ci,2 A*)
//! ```
//!
//! The grammar is the complement of the union of these over every `S`.

use super::error::Result;
use super::rule::{Constraint, ElagRule};
use crate::automaton::Automaton;
use log::{debug, info, warn};

/// Determinize and trim both contexts.
fn prepare(constraint: Constraint) -> Result<Constraint> {
    Ok(Constraint {
        left: constraint.left.determinize()?.trim(),
        right: constraint.right.determinize()?.trim(),
    })
}

/// Union with `more`, then determinize and minimize.
fn add(accumulated: Automaton, more: Automaton) -> Result<Automaton> {
    Ok(accumulated.union(more)?.determinize()?.minimize()?)
}

/// `context \ language`, where `language` has its loops already added.
fn subtract(context: &Automaton, language: Automaton) -> Result<Automaton> {
    let mut excluded = language.determinize()?.minimize()?;
    excluded.complement()?;
    let remaining = excluded.trim().intersect(context)?;
    Ok(remaining.trim().minimize()?)
}

/// The forbidden sequences of side constraint subset `set`.
fn combination(
    sides: &[Constraint],
    set: usize,
    anything_r1: &Automaton,
    r2_anything: &Automaton,
) -> Result<Automaton> {
    let mut lefts = Automaton::new();
    let mut rights = Automaton::new();
    for (i, side) in sides.iter().enumerate() {
        if set & (1 << i) != 0 {
            lefts = add(lefts, side.left.clone())?;
        } else {
            rights = add(rights, side.right.clone())?;
        }
    }

    lefts.prefix_with_everything()?;
    let left = subtract(anything_r1, lefts)?;
    rights.suffix_with_everything()?;
    let right = subtract(r2_anything, rights)?;
    debug!(
        "combination {:#b}: {} left states, {} right states",
        set,
        left.state_count(),
        right.state_count()
    );

    let joined = left.concatenate(right)?.trim();
    Ok(joined.determinize()?.trim().minimize()?)
}

impl ElagRule {
    /// Compile the rule into the deterministic automaton of the sequences
    /// it allows. Consumes the rule.
    ///
    /// A rule that allows nothing compiles to an automaton without states;
    /// this is logged as a warning, not returned as an error.
    pub fn compile(self) -> Result<Automaton> {
        let ElagRule { name, main, sides } = self;
        info!(
            "compiling {} ({} context{})",
            name,
            sides.len() + 1,
            if sides.is_empty() { "" } else { "s" }
        );

        let main = prepare(main)?;
        let sides = sides.into_iter().map(prepare).collect::<Result<Vec<_>>>()?;

        let mut anything_r1 = main.left;
        anything_r1.prefix_with_everything()?;
        let anything_r1 = anything_r1.determinize()?.minimize()?;
        let mut r2_anything = main.right;
        r2_anything.suffix_with_everything()?;
        let r2_anything = r2_anything.determinize()?.minimize()?;
        debug!(
            "{}: A*.R1 has {} states, R2.A* has {}",
            name,
            anything_r1.state_count(),
            r2_anything.state_count()
        );

        let mut forbidden = Automaton::new();
        for set in 0..(1usize << sides.len()) {
            let part = combination(&sides, set, &anything_r1, &r2_anything)?;
            forbidden = add(forbidden, part)?;
        }

        forbidden.complement()?;
        let grammar = forbidden.trim();
        if grammar.is_empty() {
            warn!("grammar {} forbids everything", name);
        }
        info!("grammar {} compiled ({} states)", name, grammar.state_count());
        Ok(grammar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::StateFlags;
    use crate::label::Label;

    fn label(s: &str) -> Label {
        Label::parse(s).unwrap()
    }

    fn word(tokens: &[&str]) -> Vec<Label> {
        tokens.iter().map(|t| label(t)).collect()
    }

    fn single(symbol: &str) -> Automaton {
        let mut a = Automaton::new();
        let q0 = a.new_state(StateFlags::INITIAL);
        let q1 = a.new_state(StateFlags::FINAL);
        a.add_transition(q0, Some(label(symbol)), q1).unwrap();
        a
    }

    #[test]
    fn test_main_constraint_only() {
        // Forbid a determiner followed by a verb.
        let rule = ElagRule {
            name: "no-det-v".to_string(),
            main: Constraint {
                left: single("<DET>"),
                right: single("<V>"),
            },
            sides: Vec::new(),
        };
        let grammar = rule.compile().unwrap();
        assert!(grammar.is_deterministic().unwrap());
        assert!(grammar
            .accepts(&word(&["<le.DET>", "<chat.N:ms>"]))
            .unwrap());
        assert!(grammar.accepts(&[]).unwrap());
        assert!(!grammar
            .accepts(&word(&["<le.DET>", "<ferme.V:P3s>"]))
            .unwrap());
        assert!(!grammar
            .accepts(&word(&["<il.PRO>", "<le.DET>", "<ferme.V:P3s>", "<bien.ADV>"]))
            .unwrap());
    }

    #[test]
    fn test_rule_forbidding_everything() {
        // The empty context on both sides matches every split point.
        let empty = || {
            let mut a = Automaton::new();
            a.new_state(StateFlags::INITIAL_FINAL);
            a
        };
        let rule = ElagRule {
            name: "all".to_string(),
            main: Constraint {
                left: empty(),
                right: empty(),
            },
            sides: Vec::new(),
        };
        assert!(rule.compile().unwrap().is_empty());
    }
}
