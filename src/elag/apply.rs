//! Disambiguating text automata with compiled grammars.

use super::error::{Result, RuleError};
use crate::automaton::Automaton;
use crate::intersection::intersect_with_text;
use crate::label::GrammarSymbols;
use crate::serialization::load_fst2;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Keep the paths of `text` that every grammar allows.
///
/// The text is intersected with each grammar in turn and trimmed. An empty
/// result means the text was rejected; the remaining grammars are then
/// skipped. A surviving text is determinized, trimmed and minimized.
pub fn apply_grammars(text: &Automaton, grammars: &[Automaton]) -> Result<Automaton> {
    let mut current = text.clone();
    for (i, grammar) in grammars.iter().enumerate() {
        current = intersect_with_text(&current, grammar)?.trim();
        debug!("after grammar {}: {} states", i, current.state_count());
        if current.is_empty() {
            info!("text rejected by grammar {}", i);
            return Ok(current);
        }
    }
    Ok(current.determinize()?.trim().minimize()?)
}

/// Grammar files named in an index written by
/// [`compile_rules`](super::compile_rules): the `<file>` lines.
pub fn grammar_files(index: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let contents = fs::read_to_string(index)?;
    let mut files = Vec::new();
    for line in contents.lines() {
        let Some(rest) = line.strip_prefix('<') else {
            continue;
        };
        let file = rest.strip_suffix('>').ok_or_else(|| {
            RuleError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("delimiter '>' not found in '{}'", line),
            ))
        })?;
        files.push(PathBuf::from(file));
    }
    Ok(files)
}

/// Load every grammar listed in an index.
pub fn load_grammars(index: impl AsRef<Path>) -> Result<Vec<Automaton>> {
    let grammars = grammar_files(index)?
        .iter()
        .map(|file| load_fst2(file, &GrammarSymbols))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    info!("{} grammar(s) loaded", grammars.len());
    Ok(grammars)
}
