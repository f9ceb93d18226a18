//! Bincode serializer for compact binary format.

use super::{validate, AutomatonSerializer, NamedAutomaton, SerializationError};
use crate::label::SymbolLoader;
use std::io::{Read, Write};

/// Bincode serializer for compact binary format.
///
/// Stores the automata structurally, labels included, so loading skips the
/// label syntax. Labels are still checked against the loader afterwards.
pub struct BincodeSerializer;

impl AutomatonSerializer for BincodeSerializer {
    fn serialize<W: Write>(automata: &[NamedAutomaton], mut writer: W) -> Result<(), SerializationError> {
        bincode::serialize_into(&mut writer, automata)?;
        Ok(())
    }

    fn deserialize<R: Read, L: SymbolLoader>(
        mut reader: R,
        loader: &L,
    ) -> Result<Vec<NamedAutomaton>, SerializationError> {
        let automata: Vec<NamedAutomaton> = bincode::deserialize_from(&mut reader)?;
        validate(&automata, loader)?;
        Ok(automata)
    }
}
