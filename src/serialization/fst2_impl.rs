//! The `.fst2` text layout.
//!
//! ```text
//! 0000000001
//! -1 name
//! : 1 1 2 2
//! t
//! : 3 0
//! f
//! %<E>
//! %<A:f>
//! %<def>
//! %<N>
//! f
//! ```
//!
//! A ten-digit automaton count, then each automaton: a `-N name` header,
//! one line per state (`t` final, `:` otherwise) followed by
//! `symbol destination` pairs, and an `f` terminator. The shared symbol
//! table comes last, one `%symbol` per line, closed by `f`. Symbol 0 is
//! always `<E>`; the default transition is written with `<def>`. State 0
//! is the initial state.

use super::{AutomatonSerializer, NamedAutomaton, SerializationError};
use crate::automaton::{Automaton, StateFlags, StateId};
use crate::label::{Label, Symbol, SymbolLoader};
use rustc_hash::FxHashMap;
use std::io::{BufRead, BufReader, Read, Write};

const EPSILON: &str = "<E>";
const DEFAULT: &str = "<def>";

/// Reads and writes the `.fst2` text layout.
pub struct Fst2Serializer;

/// Symbol table built while writing.
struct Symbols {
    index: FxHashMap<String, usize>,
    entries: Vec<String>,
}

impl Symbols {
    fn new() -> Self {
        let mut symbols = Self {
            index: FxHashMap::default(),
            entries: Vec::new(),
        };
        symbols.get(EPSILON.to_string());
        symbols
    }

    fn get(&mut self, symbol: String) -> usize {
        if let Some(&i) = self.index.get(&symbol) {
            return i;
        }
        let i = self.entries.len();
        self.index.insert(symbol.clone(), i);
        self.entries.push(symbol);
        i
    }

    fn label(&mut self, label: &Label) -> usize {
        self.get(label.to_string())
    }
}

/// The initial state of a non-empty automaton, to be written as state 0.
fn initial_state(named: &NamedAutomaton) -> Result<StateId, SerializationError> {
    let mut initials = named.automaton.initial_states();
    match (initials.next(), initials.next()) {
        (Some(q), None) => Ok(q),
        (Some(_), Some(_)) => Err(SerializationError::MultipleInitialStates(named.name.clone())),
        (None, _) => Err(SerializationError::NoInitialState(named.name.clone())),
    }
}

fn write_automaton<W: Write>(
    writer: &mut W,
    number: usize,
    named: &NamedAutomaton,
    symbols: &mut Symbols,
) -> Result<(), SerializationError> {
    writeln!(writer, "-{} {}", number, named.name)?;
    let automaton = &named.automaton;
    if !automaton.is_empty() {
        let initial = initial_state(named)?;
        // Swap the initial state with state 0.
        let position = |q: StateId| match q {
            0 => initial,
            q if q == initial => 0,
            q => q,
        };
        for q in 0..automaton.state_count() {
            let state = &automaton.states()[position(q)];
            let mut line = String::from(if state.is_final() { "t " } else { ": " });
            for t in state.transitions() {
                line.push_str(&format!("{} {} ", symbols.label(&t.label), position(t.target)));
            }
            if let Some(target) = state.default_target() {
                let index = symbols.get(DEFAULT.to_string());
                line.push_str(&format!("{} {} ", index, position(target)));
            }
            writeln!(writer, "{}", line)?;
        }
    }
    writeln!(writer, "f ")?;
    Ok(())
}

impl AutomatonSerializer for Fst2Serializer {
    fn serialize<W: Write>(automata: &[NamedAutomaton], mut writer: W) -> Result<(), SerializationError> {
        let mut symbols = Symbols::new();
        // Automata go first, so the table is complete once they are written.
        let mut body = Vec::new();
        for (i, named) in automata.iter().enumerate() {
            write_automaton(&mut body, i + 1, named, &mut symbols)?;
        }

        writeln!(writer, "{:010}", automata.len())?;
        writer.write_all(&body)?;
        for symbol in &symbols.entries {
            writeln!(writer, "%{}", symbol)?;
        }
        writeln!(writer, "f")?;
        Ok(())
    }

    fn deserialize<R: Read, L: SymbolLoader>(
        reader: R,
        loader: &L,
    ) -> Result<Vec<NamedAutomaton>, SerializationError> {
        let mut lines = Lines::new(BufReader::new(reader));

        let (line, header) = lines.expect("automaton count")?;
        let expected: usize = header.trim().parse().map_err(|_| SerializationError::Parse {
            line,
            message: format!("expected an automaton count, found '{}'", header),
        })?;

        let mut raw = Vec::new();
        loop {
            let (line, text) = lines.expect("automaton header or symbol table")?;
            if let Some(header) = text.strip_prefix('-') {
                let name = header.split_once(' ').map(|(_, name)| name).unwrap_or_default();
                raw.push(read_states(&mut lines, name.to_string())?);
            } else if let Some(symbol) = text.strip_prefix('%') {
                let mut table = vec![(line, symbol.to_string())];
                loop {
                    let (line, text) = lines.expect("symbol or 'f'")?;
                    match text.strip_prefix('%') {
                        Some(symbol) => table.push((line, symbol.to_string())),
                        None if text.trim() == "f" => break,
                        None => {
                            return Err(SerializationError::Parse {
                                line,
                                message: format!("expected a symbol, found '{}'", text),
                            })
                        }
                    }
                }
                let symbols = load_symbols(&table, loader)?;
                if raw.len() != expected {
                    return Err(SerializationError::AutomatonCountMismatch {
                        expected,
                        found: raw.len(),
                    });
                }
                return raw.into_iter().map(|r| r.build(&symbols)).collect();
            } else {
                return Err(SerializationError::Parse {
                    line,
                    message: format!("unexpected line '{}'", text),
                });
            }
        }
    }
}

/// Numbered lines of the input.
struct Lines<B> {
    inner: std::io::Lines<B>,
    number: usize,
}

impl<B: BufRead> Lines<B> {
    fn new(reader: B) -> Self {
        Self {
            inner: reader.lines(),
            number: 0,
        }
    }

    fn expect(&mut self, what: &str) -> Result<(usize, String), SerializationError> {
        self.number += 1;
        match self.inner.next() {
            Some(line) => Ok((self.number, line?)),
            None => Err(SerializationError::Parse {
                line: self.number,
                message: format!("unexpected end of input, expected {}", what),
            }),
        }
    }
}

/// An automaton whose symbols are still table indices.
struct RawAutomaton {
    name: String,
    /// Final flag and `(line, symbol, destination)` triples per state.
    states: Vec<(bool, Vec<(usize, usize, usize)>)>,
}

fn read_states<B: BufRead>(lines: &mut Lines<B>, name: String) -> Result<RawAutomaton, SerializationError> {
    let mut states = Vec::new();
    loop {
        let (line, text) = lines.expect("state or 'f'")?;
        let parse_error = |message: String| SerializationError::Parse { line, message };
        let mut fields = text.split_whitespace();
        let is_final = match fields.next() {
            Some("f") => return Ok(RawAutomaton { name, states }),
            Some("t") => true,
            Some(":") => false,
            other => {
                return Err(parse_error(format!(
                    "expected 't', ':' or 'f', found '{}'",
                    other.unwrap_or_default()
                )))
            }
        };
        let numbers = fields
            .map(|field| {
                field
                    .parse::<usize>()
                    .map_err(|_| parse_error(format!("'{}' is not a number", field)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if numbers.len() % 2 != 0 {
            return Err(parse_error("symbol without destination".to_string()));
        }
        let transitions = numbers.chunks(2).map(|pair| (line, pair[0], pair[1])).collect();
        states.push((is_final, transitions));
    }
}

fn load_symbols<L: SymbolLoader>(
    table: &[(usize, String)],
    loader: &L,
) -> Result<Vec<(usize, Symbol)>, SerializationError> {
    table
        .iter()
        .map(|(line, text)| {
            loader
                .load(text)
                .map(|symbol| (*line, symbol))
                .map_err(|source| SerializationError::Label {
                    symbol: text.clone(),
                    source,
                })
        })
        .collect()
}

impl RawAutomaton {
    fn build(self, symbols: &[(usize, Symbol)]) -> Result<NamedAutomaton, SerializationError> {
        let count = self.states.len();
        let mut automaton = Automaton::with_capacity(count);
        for (q, (is_final, _)) in self.states.iter().enumerate() {
            automaton.new_state(StateFlags {
                initial: q == 0,
                is_final: *is_final,
            });
        }
        for (q, (_, transitions)) in self.states.into_iter().enumerate() {
            for (line, index, target) in transitions {
                if target >= count {
                    return Err(SerializationError::StateCountMismatch {
                        name: self.name,
                        count,
                        state: target,
                    });
                }
                let (_, symbol) = symbols.get(index).ok_or(SerializationError::UnknownSymbol {
                    index,
                    size: symbols.len(),
                })?;
                let label = match symbol {
                    Symbol::Label(label) => Some(label.clone()),
                    Symbol::Default => None,
                    Symbol::Epsilon => {
                        return Err(SerializationError::Parse {
                            line,
                            message: "epsilon transitions are not supported".to_string(),
                        })
                    }
                };
                automaton
                    .add_transition(q, label, target)
                    .map_err(|e| SerializationError::Parse {
                        line,
                        message: e.to_string(),
                    })?;
            }
        }
        Ok(NamedAutomaton::new(self.name, automaton))
    }
}
