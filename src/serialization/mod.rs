//! Automaton serialization support.
//!
//! Automata are stored in bundles of named automata. Three formats are
//! available:
//!
//! - [`Fst2Serializer`]: the line-oriented text layout shared with the
//!   grammar toolchain (`.fst2`, `.elg`), with a symbol table at the end,
//! - [`BincodeSerializer`]: compact binary, through serde,
//! - [`JsonSerializer`]: human-readable, through serde.
//!
//! Reading always goes through a [`SymbolLoader`], which decides which
//! labels the automaton may carry: a text automaton loaded with
//! [`TextSymbols`](crate::label::TextSymbols) is rejected if it contains
//! anything but atoms.
//!
//! # Example
//!
//! ```rust
//! use elag::prelude::*;
//! use elag::serialization::{AutomatonSerializer, Fst2Serializer, NamedAutomaton};
//!
//! let mut a = Automaton::new();
//! let q0 = a.new_state(StateFlags::INITIAL);
//! let q1 = a.new_state(StateFlags::FINAL);
//! a.add_transition(q0, Some(Label::parse("<ADV>").unwrap()), q1).unwrap();
//!
//! let mut buffer = Vec::new();
//! Fst2Serializer::serialize(&[NamedAutomaton::new("adverb", a)], &mut buffer).unwrap();
//! let loaded = Fst2Serializer::deserialize(&buffer[..], &GrammarSymbols).unwrap();
//! assert_eq!(loaded[0].name, "adverb");
//! ```

use crate::automaton::Automaton;
use crate::label::{LabelParseError, SymbolLoader};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

mod fst2_impl;

#[cfg(feature = "serialization")]
mod bincode_impl;
#[cfg(feature = "serialization")]
mod json_impl;

pub use self::fst2_impl::Fst2Serializer;

#[cfg(feature = "serialization")]
pub use self::bincode_impl::BincodeSerializer;
#[cfg(feature = "serialization")]
pub use self::json_impl::JsonSerializer;

/// An automaton and the name it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct NamedAutomaton {
    /// Name of the automaton.
    pub name: String,
    /// The automaton.
    pub automaton: Automaton,
}

impl NamedAutomaton {
    /// Pair an automaton with its name.
    pub fn new(name: impl Into<String>, automaton: Automaton) -> Self {
        Self {
            name: name.into(),
            automaton,
        }
    }
}

/// Trait for reading and writing bundles of automata.
pub trait AutomatonSerializer {
    /// Write a bundle of automata.
    ///
    /// # Errors
    ///
    /// Returns an error if an automaton cannot be expressed in the format or
    /// writing fails.
    fn serialize<W: Write>(automata: &[NamedAutomaton], writer: W) -> Result<(), SerializationError>;

    /// Read a bundle of automata, checking every label with `loader`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails, the data is malformed, or a label
    /// is rejected by the loader. No partial bundle is returned.
    fn deserialize<R: Read, L: SymbolLoader>(
        reader: R,
        loader: &L,
    ) -> Result<Vec<NamedAutomaton>, SerializationError>;
}

/// Errors that can occur during serialization/deserialization.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// I/O error
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// Error during bincode serialization
    #[cfg(feature = "serialization")]
    #[error("Bincode error")]
    Bincode(#[from] bincode::Error),

    /// Error during JSON serialization
    #[cfg(feature = "serialization")]
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// Malformed text layout
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was expected.
        message: String,
    },

    /// The header announces a different number of automata
    #[error("header announces {expected} automata but {found} were found")]
    AutomatonCountMismatch {
        /// Count from the header.
        expected: usize,
        /// Automata actually read.
        found: usize,
    },

    /// A transition leads past the last state
    #[error("automaton '{name}' has {count} states but a transition leads to state {state}")]
    StateCountMismatch {
        /// Automaton name.
        name: String,
        /// Number of states read.
        count: usize,
        /// Offending destination.
        state: usize,
    },

    /// A transition references a missing symbol table entry
    #[error("symbol {index} is not in the symbol table ({size} entries)")]
    UnknownSymbol {
        /// Offending index.
        index: usize,
        /// Size of the symbol table.
        size: usize,
    },

    /// The layout has room for a single initial state
    #[error("automaton '{0}' has several initial states")]
    MultipleInitialStates(String),

    /// The layout requires an initial state
    #[error("automaton '{0}' has no initial state")]
    NoInitialState(String),

    /// A label was rejected
    #[error("symbol '{symbol}': {source}")]
    Label {
        /// The symbol as written.
        symbol: String,
        /// Why it was rejected.
        #[source]
        source: LabelParseError,
    },
}

/// Read a bundle from a file with serializer `S`.
pub fn load_file<S, L>(path: impl AsRef<Path>, loader: &L) -> Result<Vec<NamedAutomaton>, SerializationError>
where
    S: AutomatonSerializer,
    L: SymbolLoader,
{
    let file = File::open(path)?;
    S::deserialize(BufReader::new(file), loader)
}

/// Write a bundle to a file with serializer `S`.
pub fn save_file<S>(path: impl AsRef<Path>, automata: &[NamedAutomaton]) -> Result<(), SerializationError>
where
    S: AutomatonSerializer,
{
    let mut writer = BufWriter::new(File::create(path)?);
    S::serialize(automata, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Read the first automaton of an `.fst2` or `.elg` file.
pub fn load_fst2<L: SymbolLoader>(path: impl AsRef<Path>, loader: &L) -> Result<Automaton, SerializationError> {
    load_file::<Fst2Serializer, L>(path, loader)?
        .into_iter()
        .next()
        .map(|named| named.automaton)
        .ok_or(SerializationError::AutomatonCountMismatch {
            expected: 1,
            found: 0,
        })
}

/// Write one automaton as an `.fst2` or `.elg` file.
pub fn save_fst2(path: impl AsRef<Path>, name: &str, automaton: &Automaton) -> Result<(), SerializationError> {
    save_file::<Fst2Serializer>(path, &[NamedAutomaton::new(name, automaton.clone())])
}

/// Re-check the labels of deserialized automata with `loader`.
///
/// Serde formats store labels structurally; this makes them obey the same
/// vocabulary rules as the text layout. A stored label must also be the
/// one its text parses back to, so a `Negated` exclusion list that is not
/// sorted and deduplicated is rejected.
#[cfg(feature = "serialization")]
fn validate<L: SymbolLoader>(automata: &[NamedAutomaton], loader: &L) -> Result<(), SerializationError> {
    use crate::label::Symbol;

    for named in automata {
        let automaton = &named.automaton;
        for state in automaton.states() {
            for t in state.transitions() {
                let symbol = t.label.to_string();
                match loader.load(&symbol) {
                    Ok(Symbol::Label(parsed)) if parsed == t.label => {}
                    Ok(Symbol::Label(_)) => {
                        return Err(SerializationError::Label {
                            symbol,
                            source: LabelParseError::NotAllowed {
                                symbol: t.label.to_string(),
                                reason: "not in canonical form",
                            },
                        })
                    }
                    Ok(_) => {
                        return Err(SerializationError::Label {
                            symbol,
                            source: LabelParseError::NotAllowed {
                                symbol: t.label.to_string(),
                                reason: "not a label",
                            },
                        })
                    }
                    Err(source) => return Err(SerializationError::Label { symbol, source }),
                }
                if t.target >= automaton.state_count() {
                    return Err(SerializationError::StateCountMismatch {
                        name: named.name.clone(),
                        count: automaton.state_count(),
                        state: t.target,
                    });
                }
            }
            if let Some(target) = state.default_target() {
                if target >= automaton.state_count() {
                    return Err(SerializationError::StateCountMismatch {
                        name: named.name.clone(),
                        count: automaton.state_count(),
                        state: target,
                    });
                }
            }
        }
    }
    Ok(())
}
