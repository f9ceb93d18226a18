//! Splitting a rule automaton into its constraints.
//!
//! A rule reads, from its initial state, one main constraint
//! `<!> R1 <!> R2 <!>` and any number of side constraints
//! `<=> C1 <=> C2 <=>`. Side constraints share their opening `<=>`; each
//! middle `<=>` destination starts a separate constraint.

use super::error::{Result, RuleError};
use crate::automaton::{Automaton, StateFlags, StateId};
use crate::label::{GrammarSymbols, Marker};
use crate::serialization::load_fst2;
use log::debug;
use std::path::Path;

/// Maximum number of side constraints of one rule.
pub const MAX_SIDE_CONSTRAINTS: usize = 16;

/// Left and right context of a constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    /// What precedes the split point.
    pub left: Automaton,
    /// What follows the split point.
    pub right: Automaton,
}

/// A rule split into its main and side constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElagRule {
    /// Name used in messages, usually the rule file.
    pub name: String,
    /// The `<!> .. <!> .. <!>` part.
    pub main: Constraint,
    /// The `<=> .. <=> .. <=>` parts, in order of their middle state.
    pub sides: Vec<Constraint>,
}

/// Copies the part of `source` reachable from a start state without
/// crossing delimiters.
struct Copier<'a> {
    source: &'a Automaton,
    dest: Automaton,
    renumber: Vec<Option<StateId>>,
    pending: Vec<StateId>,
}

impl<'a> Copier<'a> {
    fn new(source: &'a Automaton, start: StateId) -> Self {
        let mut copier = Self {
            source,
            dest: Automaton::new(),
            renumber: vec![None; source.state_count()],
            pending: Vec::new(),
        };
        let id = copier.dest.new_state(StateFlags::INITIAL);
        copier.renumber[start] = Some(id);
        copier.pending.push(start);
        copier
    }

    fn visit(&mut self, q: StateId) -> StateId {
        match self.renumber[q] {
            Some(id) => id,
            None => {
                let id = self.dest.new_state(StateFlags::NONE);
                self.renumber[q] = Some(id);
                self.pending.push(q);
                id
            }
        }
    }

    /// Walk the source, calling `delimiter` on every transition labelled
    /// with `marker` instead of copying it.
    fn run<F>(mut self, marker: Marker, mut delimiter: F) -> Result<Automaton>
    where
        F: FnMut(&mut Automaton, StateId, StateId) -> Result<()>,
    {
        let source = self.source;
        while let Some(q) = self.pending.pop() {
            let from = self.visit(q);
            let state = &source.states()[q];
            for t in state.transitions() {
                if t.label.as_marker() == Some(marker) {
                    delimiter(&mut self.dest, from, t.target)?;
                } else {
                    let to = self.visit(t.target);
                    self.dest.push_transition(from, Some(t.label.clone()), to);
                }
            }
            if let Some(target) = state.default_target() {
                let to = self.visit(target);
                self.dest.push_transition(from, None, to);
            }
        }
        Ok(self.dest)
    }
}

/// Copy from `start` up to the `marker` transitions, which must all lead
/// to one state. States reading `marker` become final.
fn part(
    rule: &str,
    source: &Automaton,
    start: StateId,
    marker: Marker,
) -> Result<(Automaton, StateId)> {
    let mut end = None;
    let copy = Copier::new(source, start).run(marker, |dest, from, target| {
        if end.is_some_and(|e| e != target) {
            return Err(RuleError::NondeterministicMarkers {
                rule: rule.to_string(),
                marker,
            });
        }
        end = Some(target);
        dest.set_final(from, true)?;
        Ok(())
    })?;
    let end = end.ok_or_else(|| RuleError::MissingDelimiter {
        rule: rule.to_string(),
        marker,
    })?;
    Ok((copy, end))
}

/// Copy from `start` up to the `<=>` transitions leading to `middle`.
/// Other `<=>` transitions are dropped.
fn left_side_part(rule: &str, source: &Automaton, start: StateId, middle: StateId) -> Result<Automaton> {
    let mut found = false;
    let copy = Copier::new(source, start).run(Marker::Side, |dest, from, target| {
        if target == middle {
            found = true;
            dest.set_final(from, true)?;
        }
        Ok(())
    })?;
    if !found {
        return Err(RuleError::MissingDelimiter {
            rule: rule.to_string(),
            marker: Marker::Side,
        });
    }
    Ok(copy)
}

/// States reached by a middle `<=>`: the destination of a `<=>` leaving a
/// state other than `initial`, that is neither final nor the state after
/// the opening `<=>`.
fn middle_states(rule: &str, automaton: &Automaton, initial: StateId) -> Result<Vec<StateId>> {
    let side = Some(Marker::Side);
    let opening = automaton.states()[initial]
        .transitions()
        .iter()
        .find(|t| t.label.as_marker() == side);
    let Some(opening) = opening else {
        return Ok(Vec::new());
    };
    if opening.target == initial {
        return Err(RuleError::IllegalCycle {
            rule: rule.to_string(),
        });
    }

    let mut middles = Vec::new();
    for (q, state) in automaton.states().iter().enumerate() {
        if q == initial {
            continue;
        }
        for t in state.transitions() {
            if t.label.as_marker() == side
                && t.target != opening.target
                && !automaton.states()[t.target].is_final()
                && !middles.contains(&t.target)
            {
                middles.push(t.target);
            }
        }
    }
    if middles.is_empty() {
        return Err(RuleError::NoMiddleDelimiter {
            rule: rule.to_string(),
        });
    }
    if middles.len() > MAX_SIDE_CONSTRAINTS {
        return Err(RuleError::TooManySideConstraints {
            rule: rule.to_string(),
            count: middles.len(),
            max: MAX_SIDE_CONSTRAINTS,
        });
    }
    Ok(middles)
}

/// Check that `end` closes a part.
fn closing(rule: &str, automaton: &Automaton, end: StateId, marker: Marker) -> Result<()> {
    if automaton.states()[end].is_final() {
        Ok(())
    } else {
        Err(RuleError::UnterminatedConstraint {
            rule: rule.to_string(),
            marker,
        })
    }
}

impl ElagRule {
    /// Split a rule automaton into its constraints.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] naming the rule when the delimiters are
    /// missing, misplaced or ambiguous.
    pub fn split(name: impl Into<String>, automaton: &Automaton) -> Result<ElagRule> {
        let name = name.into();
        let rule = name.as_str();
        let initial = automaton
            .initial_states()
            .next()
            .ok_or_else(|| RuleError::MissingMainMarker {
                rule: rule.to_string(),
            })?;
        let middles = middle_states(rule, automaton, initial)?;

        let mut main = None;
        let mut sides: Option<Vec<Constraint>> = None;
        let state = &automaton.states()[initial];
        for t in state.transitions() {
            match t.label.as_marker() {
                Some(Marker::Main) => {
                    if main.is_some() {
                        return Err(RuleError::TooManyMainMarkers {
                            rule: rule.to_string(),
                        });
                    }
                    let (left, middle) = part(rule, automaton, t.target, Marker::Main)?;
                    let (right, end) = part(rule, automaton, middle, Marker::Main)?;
                    closing(rule, automaton, end, Marker::Main)?;
                    main = Some(Constraint { left, right });
                }
                Some(Marker::Side) => {
                    if sides.is_some() {
                        return Err(RuleError::NondeterministicMarkers {
                            rule: rule.to_string(),
                            marker: Marker::Side,
                        });
                    }
                    let mut parts = Vec::with_capacity(middles.len());
                    for &middle in &middles {
                        let left = left_side_part(rule, automaton, t.target, middle)?;
                        let (right, end) = part(rule, automaton, middle, Marker::Side)?;
                        closing(rule, automaton, end, Marker::Side)?;
                        parts.push(Constraint { left, right });
                    }
                    sides = Some(parts);
                }
                None => {
                    return Err(RuleError::MissingLeftDelimiter {
                        rule: rule.to_string(),
                        symbol: t.label.to_string(),
                    })
                }
            }
        }
        if state.default_target().is_some() {
            return Err(RuleError::MissingLeftDelimiter {
                rule: rule.to_string(),
                symbol: "<def>".to_string(),
            });
        }

        let main = main.ok_or_else(|| RuleError::MissingMainMarker {
            rule: rule.to_string(),
        })?;
        let sides = sides.unwrap_or_default();
        debug!("rule '{}' split into 1 main and {} side constraints", rule, sides.len());
        Ok(ElagRule { name, main, sides })
    }

    /// Load and split a rule `.fst2` file.
    pub fn load(path: impl AsRef<Path>) -> Result<ElagRule> {
        let path = path.as_ref();
        let automaton = load_fst2(path, &GrammarSymbols)?;
        ElagRule::split(path.display().to_string(), &automaton)
    }

    /// `R1 . R2`: the automaton locating the main constraint in a text.
    pub fn locate_automaton(&self) -> Result<Automaton> {
        let located = self
            .main
            .left
            .clone()
            .concatenate(self.main.right.clone())?;
        Ok(located)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::Label;

    fn label(s: &str) -> Label {
        Label::parse(s).unwrap()
    }

    /// A chain of states reading `symbols`, the last one final.
    fn chain(symbols: &[&str]) -> Automaton {
        let mut a = Automaton::new();
        let mut q = a.new_state(StateFlags::INITIAL);
        for (i, s) in symbols.iter().enumerate() {
            let flags = if i + 1 == symbols.len() {
                StateFlags::FINAL
            } else {
                StateFlags::NONE
            };
            let next = a.new_state(flags);
            a.add_transition(q, Some(label(s)), next).unwrap();
            q = next;
        }
        a
    }

    #[test]
    fn test_main_constraint() {
        let a = chain(&["<!>", "<DET>", "<!>", "<N>", "<!>"]);
        let rule = ElagRule::split("det-n", &a).unwrap();
        assert!(rule.sides.is_empty());
        assert!(rule.main.left.accepts(&[label("<le.DET>")]).unwrap());
        assert!(rule.main.right.accepts(&[label("<chat.N:ms>")]).unwrap());
        assert!(rule
            .main
            .left
            .alphabet()
            .iter()
            .all(|l| l.as_marker().is_none()));

        let located = rule.locate_automaton().unwrap();
        assert!(located
            .accepts(&[label("<le.DET>"), label("<chat.N:ms>")])
            .unwrap());
    }

    #[test]
    fn test_side_constraints() {
        // <!> DET <!> N <!>  and  <=> PRO <=> V <=>
        let mut a = chain(&["<!>", "<DET>", "<!>", "<N>", "<!>"]);
        let s1 = a.new_state(StateFlags::NONE);
        let s2 = a.new_state(StateFlags::NONE);
        let s3 = a.new_state(StateFlags::NONE);
        let s4 = a.new_state(StateFlags::NONE);
        let end = a.new_state(StateFlags::FINAL);
        a.add_transition(0, Some(label("<=>")), s1).unwrap();
        a.add_transition(s1, Some(label("<PRO>")), s2).unwrap();
        a.add_transition(s2, Some(label("<=>")), s3).unwrap();
        a.add_transition(s3, Some(label("<V>")), s4).unwrap();
        a.add_transition(s4, Some(label("<=>")), end).unwrap();

        let rule = ElagRule::split("with-side", &a).unwrap();
        assert_eq!(rule.sides.len(), 1);
        let side = &rule.sides[0];
        assert!(side.left.accepts(&[label("<il.PRO>")]).unwrap());
        assert!(side.right.accepts(&[label("<mange.V:P3s>")]).unwrap());
    }

    #[test]
    fn test_delimiter_errors() {
        assert!(matches!(
            ElagRule::split("r", &chain(&["<DET>"])),
            Err(RuleError::MissingLeftDelimiter { .. })
        ));
        assert!(matches!(
            ElagRule::split("r", &chain(&["<!>", "<DET>", "<!>", "<N>"])),
            Err(RuleError::MissingDelimiter {
                marker: Marker::Main,
                ..
            })
        ));
        assert!(matches!(
            ElagRule::split("r", &Automaton::new()),
            Err(RuleError::MissingMainMarker { .. })
        ));

        let unterminated = chain(&["<!>", "<DET>", "<!>", "<N>", "<!>", "<A>"]);
        assert!(matches!(
            ElagRule::split("r", &unterminated),
            Err(RuleError::UnterminatedConstraint { .. })
        ));
    }

    #[test]
    fn test_side_without_main() {
        let a = chain(&["<=>", "<PRO>", "<=>", "<V>", "<=>"]);
        assert!(matches!(
            ElagRule::split("r", &a),
            Err(RuleError::MissingMainMarker { .. })
        ));
    }

    #[test]
    fn test_side_cycle() {
        let mut a = chain(&["<!>", "<DET>", "<!>", "<N>", "<!>"]);
        a.add_transition(0, Some(label("<=>")), 0).unwrap();
        assert!(matches!(
            ElagRule::split("r", &a),
            Err(RuleError::IllegalCycle { .. })
        ));
    }
}
