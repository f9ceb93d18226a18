//! Errors of rule splitting, compilation and batch processing.

use crate::automaton::AutomatonError;
use crate::label::Marker;
use crate::serialization::SerializationError;
use thiserror::Error;

/// Errors raised while turning a rule automaton into a grammar.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The initial state has no `<!>` transition.
    #[error("rule '{rule}': symbol '<!>' not found")]
    MissingMainMarker {
        /// Rule name.
        rule: String,
    },

    /// More than one `<!> .. <!> .. <!>` part.
    #[error("rule '{rule}': too many '<!>' parts")]
    TooManyMainMarkers {
        /// Rule name.
        rule: String,
    },

    /// A middle or closing delimiter is missing.
    #[error("rule '{rule}': middle or end delimiter '{marker}' missing")]
    MissingDelimiter {
        /// Rule name.
        rule: String,
        /// The delimiter looked for.
        marker: Marker,
    },

    /// The closing delimiter does not lead to a final state.
    #[error("rule '{rule}': '{marker}' part does not end in a final state")]
    UnterminatedConstraint {
        /// Rule name.
        rule: String,
        /// The delimiter of the part.
        marker: Marker,
    },

    /// The initial state reads something other than a delimiter.
    #[error("rule '{rule}': left delimiter '<!>' or '<=>' missing before '{symbol}'")]
    MissingLeftDelimiter {
        /// Rule name.
        rule: String,
        /// The label found instead.
        symbol: String,
    },

    /// An opening `<=>` loops back to the initial state.
    #[error("rule '{rule}': illegal cycle on the initial state")]
    IllegalCycle {
        /// Rule name.
        rule: String,
    },

    /// Side constraints without a middle `<=>`.
    #[error("rule '{rule}': middle delimiter '<=>' not found")]
    NoMiddleDelimiter {
        /// Rule name.
        rule: String,
    },

    /// More side constraints than the compiler enumerates.
    #[error("rule '{rule}': {count} side constraints, at most {max} are supported")]
    TooManySideConstraints {
        /// Rule name.
        rule: String,
        /// Side constraints found.
        count: usize,
        /// Supported maximum.
        max: usize,
    },

    /// Delimiters of one part lead to different states.
    #[error("rule '{rule}': '{marker}' delimiters lead to different states")]
    NondeterministicMarkers {
        /// Rule name.
        rule: String,
        /// The delimiter.
        marker: Marker,
    },

    /// An automaton operation failed.
    #[error(transparent)]
    Automaton(#[from] AutomatonError),

    /// Loading or saving an automaton failed.
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// Reading a rule list or writing an index failed.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

/// Result type for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;
