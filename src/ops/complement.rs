use crate::automaton::{Automaton, AutomatonError, Result};

/// Flip the final flag of every state, in place.
///
/// The automaton must be deterministic and complete, otherwise the flipped
/// automaton would not accept the complementary language.
pub fn complement(automaton: &mut Automaton) -> Result<()> {
    if let Some(state) = automaton.blocking_state() {
        return Err(AutomatonError::Incomplete { state });
    }
    if !automaton.is_deterministic()? {
        return Err(AutomatonError::NotDeterministic);
    }
    for state in automaton.states_mut() {
        state.toggle_final();
    }
    Ok(())
}
