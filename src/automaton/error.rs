//! Errors of automaton construction and of the algebraic operations.

use super::StateId;
use crate::label::AlgebraError;
use thiserror::Error;

/// Errors raised by automaton construction and operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    /// The operation requires a deterministic automaton.
    #[error("automaton is not deterministic")]
    NotDeterministic,

    /// The operation requires a complete automaton.
    #[error("automaton is not complete")]
    Incomplete {
        /// The first state found lacking a default, `None` for an
        /// automaton without states.
        state: Option<StateId>,
    },

    /// A state index past the end of the automaton.
    #[error("unknown state {0}")]
    UnknownState(StateId),

    /// A state got two default transitions with different targets.
    #[error("state {state} already has a default transition to {existing}")]
    DuplicateDefault {
        /// The state.
        state: StateId,
        /// Target of its existing default.
        existing: StateId,
    },

    /// A label algebra precondition failed.
    #[error(transparent)]
    Algebra(#[from] AlgebraError),
}

/// Result alias for automaton operations.
pub type Result<T> = std::result::Result<T, AutomatonError>;
