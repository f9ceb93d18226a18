//! ELAG disambiguation rules.
//!
//! A rule is an automaton whose initial state opens a main constraint
//! `<!> R1 <!> R2 <!>` and, optionally, side constraints
//! `<=> C1 <=> C2 <=>`. It forbids the sequences where `R1` is immediately
//! followed by `R2`, unless one of the side constraints also matches
//! around that point with `C1` on the left and `C2` on the right.
//!
//! - [`ElagRule::split`] extracts the constraints,
//! - [`ElagRule::compile`] turns them into a grammar: the deterministic
//!   automaton of the sequences the rule allows,
//! - [`compile_rules`] compiles a list of rules and intersects the results
//!   into a few grammar files,
//! - [`apply_grammars`] filters a text automaton through grammars.
//!
//! # Example
//!
//! ```rust
//! use elag::prelude::*;
//!
//! // <!> <DET> <!> <V> <!>: a determiner never precedes a verb.
//! let mut rule = Automaton::new();
//! let mut q = rule.new_state(StateFlags::INITIAL);
//! for symbol in ["<!>", "<DET>", "<!>", "<V>", "<!>"] {
//!     let next = rule.new_state(StateFlags::NONE);
//!     rule.add_transition(q, Some(Label::parse(symbol).unwrap()), next).unwrap();
//!     q = next;
//! }
//! rule.set_final(q, true).unwrap();
//!
//! let grammar = ElagRule::split("det-v", &rule).unwrap().compile().unwrap();
//! let det = Label::parse("<le.DET>").unwrap();
//! let verb = Label::parse("<ferme.V:P3s>").unwrap();
//! let noun = Label::parse("<ferme.N:fs>").unwrap();
//! assert!(grammar.accepts(&[det.clone(), noun]).unwrap());
//! assert!(!grammar.accepts(&[det, verb]).unwrap());
//! ```

mod apply;
mod batch;
mod compile;
mod config;
mod error;
mod rule;

pub use apply::{apply_grammars, grammar_files, load_grammars};
pub use batch::{compile_rule_file, compile_rules, BatchReport};
pub use config::{CompilerConfig, DEFAULT_MAX_GRAMMAR_STATES};
pub use error::{Result, RuleError};
pub use rule::{Constraint, ElagRule, MAX_SIDE_CONSTRAINTS};
