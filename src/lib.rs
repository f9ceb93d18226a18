//! # elag
//!
//! Finite-state automata over symbolic morphological labels, and the ELAG
//! disambiguation-rule compiler built on them.
//!
//! Transition labels are not flat symbols but sets of *atoms* (a word form
//! with its grammatical code): "every adjective", "feminine nouns",
//! "singular verbs but *être*", "anything". Determinization and
//! intersection refine the labels leaving each state into pairwise disjoint
//! pieces on demand, then proceed as over a finite alphabet.
//!
//! ## Example
//!
//! ```rust
//! use elag::prelude::*;
//!
//! // An adjective then a feminine adjective, or any word then a noun.
//! let mut a = Automaton::new();
//! let q0 = a.new_state(StateFlags::INITIAL);
//! let q1 = a.new_state(StateFlags::NONE);
//! let q2 = a.new_state(StateFlags::FINAL);
//! a.add_transition(q0, Some(Label::parse("<A>").unwrap()), q1).unwrap();
//! a.add_transition(q0, Some(Label::parse("<.>").unwrap()), q1).unwrap();
//! a.add_transition(q1, Some(Label::parse("<A:f>").unwrap()), q2).unwrap();
//! a.add_transition(q1, Some(Label::parse("<N>").unwrap()), q2).unwrap();
//!
//! let d = a.determinize().unwrap();
//! assert!(d.is_deterministic().unwrap());
//! assert!(d.is_complete());
//!
//! let words = [
//!     Label::parse("<petite.A:fs>").unwrap(),
//!     Label::parse("<maison.N:fs>").unwrap(),
//! ];
//! assert_eq!(a.accepts(&words).unwrap(), d.accepts(&words).unwrap());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod automaton;
pub mod determinize;
pub mod elag;
pub mod intersection;
pub mod label;
pub mod ops;
pub mod refine;
pub mod serialization;

/// CLI interface and utilities
#[cfg(feature = "cli")]
pub mod cli;

/// Common imports for convenient usage
pub mod prelude {
    pub use crate::automaton::{Automaton, AutomatonError, State, StateFlags, StateId, Transition};
    pub use crate::elag::{
        apply_grammars, compile_rules, BatchReport, CompilerConfig, Constraint, ElagRule,
        RuleError,
    };
    pub use crate::label::{
        Code, GrammarSymbols, Label, LabelParseError, Symbol, SymbolLoader, TextSymbols,
    };
    pub use crate::refine::BiAlphabet;
    pub use crate::serialization::{
        AutomatonSerializer, Fst2Serializer, NamedAutomaton, SerializationError,
    };

    #[cfg(feature = "serialization")]
    pub use crate::serialization::{BincodeSerializer, JsonSerializer};
}
