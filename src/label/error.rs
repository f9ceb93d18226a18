//! Errors of the label algebra and of the label text syntax.

use thiserror::Error;

/// Errors raised by label algebra operations and code construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlgebraError {
    /// A rule delimiter was combined with a non-atomic label.
    #[error("marker '{0}' cannot be combined with a non-atomic label")]
    MarkerInAlgebra(String),

    /// An atom was required.
    #[error("expected an atomic label, found '{0}'")]
    NotAnAtom(String),

    /// The code's features contradict each other or are malformed.
    #[error("invalid code '{code}': {reason}")]
    InvalidCode {
        /// The offending code, as written.
        code: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The category is neither a closed tag nor `A`, `N`, `V`.
    #[error("unknown category in '{0}'")]
    UnknownCategory(String),
}

/// Errors raised while reading a symbol in the label text syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelParseError {
    /// A `<...>` or `{...}` group was not closed.
    #[error("unterminated label '{0}'")]
    Unterminated(String),

    /// An empty symbol.
    #[error("empty label")]
    Empty,

    /// `{inflected,lemma.CODE}` without a comma or a code.
    #[error("malformed lexical entry '{0}'")]
    MalformedEntry(String),

    /// A negation list without a code.
    #[error("negated label '{0}' has no code")]
    MissingCode(String),

    /// Atoms and negated labels must carry a complete code.
    #[error("label '{0}' requires a complete code")]
    IncompleteCode(String),

    /// The code inside the label is invalid.
    #[error(transparent)]
    Code(#[from] AlgebraError),

    /// The loader does not accept this kind of symbol.
    #[error("symbol '{symbol}' is not allowed here: {reason}")]
    NotAllowed {
        /// The rejected symbol.
        symbol: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}
