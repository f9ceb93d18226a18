//! JSON serializer for human-readable format.

use super::{validate, AutomatonSerializer, NamedAutomaton, SerializationError};
use crate::label::SymbolLoader;
use std::io::{Read, Write};

/// JSON serializer for human-readable format.
///
/// Useful for inspecting compiled grammars by hand.
pub struct JsonSerializer;

impl AutomatonSerializer for JsonSerializer {
    fn serialize<W: Write>(automata: &[NamedAutomaton], mut writer: W) -> Result<(), SerializationError> {
        serde_json::to_writer_pretty(&mut writer, automata)?;
        Ok(())
    }

    fn deserialize<R: Read, L: SymbolLoader>(
        mut reader: R,
        loader: &L,
    ) -> Result<Vec<NamedAutomaton>, SerializationError> {
        let automata: Vec<NamedAutomaton> = serde_json::from_reader(&mut reader)?;
        validate(&automata, loader)?;
        Ok(automata)
    }
}
