//! Text syntax of labels and transition symbols.
//!
//! | syntax | meaning |
//! |--------|---------|
//! | `<.>` | [`Label::Universal`] |
//! | `<def>` | default transition |
//! | `<E>` | epsilon, symbol 0 of every table |
//! | `<CODE>` | [`Label::Code`] or [`Label::Partial`] |
//! | `<form.CODE>` | [`Label::Atom`] |
//! | `<!f1!f2.CODE>` | [`Label::Negated`] |
//! | `{inflected,form.CODE}` | [`Label::Atom`] from a dictionary entry |
//! | `<!>`, `<=>` | rule delimiters |
//! | `,` or `\,` | punctuation atom |
//! | `7` | digit atom |
//! | `token` | unknown word |
//!
//! Inside forms, `\` escapes the next character.

use super::code::{Code, Marker};
use super::error::LabelParseError;
use super::tagset::ClosedTag;
use super::Label;
use std::fmt;

/// What a symbol table entry stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// The empty word. Never attached to a transition.
    Epsilon,
    /// The default transition of a state.
    Default,
    /// A proper label.
    Label(Label),
}

impl Symbol {
    /// Parse a symbol in the full grammar syntax.
    pub fn parse(text: &str) -> Result<Symbol, LabelParseError> {
        match text {
            "" => Err(LabelParseError::Empty),
            "<E>" => Ok(Symbol::Epsilon),
            "<def>" => Ok(Symbol::Default),
            _ => parse_label(text).map(Symbol::Label),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Epsilon => f.write_str("<E>"),
            Symbol::Default => f.write_str("<def>"),
            Symbol::Label(label) => label.fmt(f),
        }
    }
}

impl Label {
    /// Parse a label in the grammar syntax.
    pub fn parse(text: &str) -> Result<Label, LabelParseError> {
        match Symbol::parse(text)? {
            Symbol::Label(label) => Ok(label),
            _ => Err(LabelParseError::NotAllowed {
                symbol: text.to_string(),
                reason: "not a label",
            }),
        }
    }
}

/// Turns symbol table entries into symbols.
///
/// Grammars and texts share one file layout but not one vocabulary: a text
/// automaton only carries atoms.
pub trait SymbolLoader {
    /// Parse one symbol table entry.
    fn load(&self, text: &str) -> Result<Symbol, LabelParseError>;
}

/// Accepts the whole label syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrammarSymbols;

impl SymbolLoader for GrammarSymbols {
    fn load(&self, text: &str) -> Result<Symbol, LabelParseError> {
        Symbol::parse(text)
    }
}

/// Accepts atoms only, as found in text automata.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSymbols;

impl SymbolLoader for TextSymbols {
    fn load(&self, text: &str) -> Result<Symbol, LabelParseError> {
        let not_allowed = |reason| LabelParseError::NotAllowed {
            symbol: text.to_string(),
            reason,
        };
        match Symbol::parse(text)? {
            Symbol::Epsilon => Ok(Symbol::Epsilon),
            Symbol::Default => Err(not_allowed("text automata have no default transitions")),
            Symbol::Label(label) if label.as_marker().is_some() => {
                Err(not_allowed("rule delimiters only occur in grammars"))
            }
            Symbol::Label(label) if label.is_atom() => Ok(Symbol::Label(label)),
            Symbol::Label(_) => Err(not_allowed("text automata only carry atoms")),
        }
    }
}

fn parse_label(text: &str) -> Result<Label, LabelParseError> {
    if let Some(rest) = text.strip_prefix('<') {
        let inner = rest
            .strip_suffix('>')
            .ok_or_else(|| LabelParseError::Unterminated(text.to_string()))?;
        return parse_angle(text, inner);
    }
    if let Some(rest) = text.strip_prefix('{') {
        let inner = rest
            .strip_suffix('}')
            .ok_or_else(|| LabelParseError::Unterminated(text.to_string()))?;
        return parse_entry(text, inner);
    }
    Ok(parse_token(text))
}

fn parse_angle(text: &str, inner: &str) -> Result<Label, LabelParseError> {
    match inner {
        "." => return Ok(Label::Universal),
        "!" => return Ok(Label::marker(Marker::Main)),
        "=" => return Ok(Label::marker(Marker::Side)),
        "" => return Err(LabelParseError::Empty),
        _ => {}
    }

    if let Some(negation) = inner.strip_prefix('!') {
        let dot = last_unescaped(negation, '.')
            .ok_or_else(|| LabelParseError::MissingCode(text.to_string()))?;
        let code = Code::parse(&negation[dot + 1..])?;
        let forms = split_unescaped(&negation[..dot], '!');
        if forms.iter().any(String::is_empty) {
            return Err(LabelParseError::Empty);
        }
        return Label::negated(code, forms)
            .map_err(|_| LabelParseError::IncompleteCode(text.to_string()));
    }

    match last_unescaped(inner, '.') {
        None => Ok(Label::from_code(Code::parse(inner)?)),
        Some(0) => Err(LabelParseError::Empty),
        Some(dot) => {
            let code = Code::parse(&inner[dot + 1..])?;
            Label::atom(unescape(&inner[..dot]), code)
                .map_err(|_| LabelParseError::IncompleteCode(text.to_string()))
        }
    }
}

fn parse_entry(text: &str, inner: &str) -> Result<Label, LabelParseError> {
    let malformed = || LabelParseError::MalformedEntry(text.to_string());
    let comma = first_unescaped(inner, ',').ok_or_else(malformed)?;
    let rest = &inner[comma + 1..];
    let dot = last_unescaped(rest, '.').ok_or_else(malformed)?;
    let lemma = unescape(&rest[..dot]);
    // `{le,.DET}` keeps the inflected form as lemma.
    let form = if lemma.is_empty() {
        unescape(&inner[..comma])
    } else {
        lemma
    };
    if form.is_empty() {
        return Err(malformed());
    }
    let code = Code::parse(&rest[dot + 1..])?;
    Label::atom(form, code).map_err(|_| LabelParseError::IncompleteCode(text.to_string()))
}

fn parse_token(text: &str) -> Label {
    let mut chars = text.chars();
    let token = match (chars.next(), chars.next(), chars.next()) {
        (Some('\\'), Some(c), None) => return punctuation(c),
        (Some(c), None, _) if c.is_ascii_digit() => {
            return Label::Atom {
                form: c.to_string(),
                code: Code::closed(ClosedTag::DIGIT),
            }
        }
        (Some(c), None, _) if is_punctuation(c) => return punctuation(c),
        _ => text,
    };
    Label::Atom {
        form: token.to_string(),
        code: Code::closed(ClosedTag::UNKNOWN),
    }
}

fn punctuation(c: char) -> Label {
    Label::Atom {
        form: c.to_string(),
        code: Code::closed(ClosedTag::PUNCTUATION),
    }
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '«' | '»' | '…' | '–' | '—' | '¿' | '¡' | '§')
}

/// Byte offsets of the unescaped occurrences of `target`.
fn unescaped_positions(text: &str, target: char) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == target {
            positions.push(i);
        }
    }
    positions
}

fn first_unescaped(text: &str, target: char) -> Option<usize> {
    unescaped_positions(text, target).first().copied()
}

fn last_unescaped(text: &str, target: char) -> Option<usize> {
    unescaped_positions(text, target).last().copied()
}

fn split_unescaped(text: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut start = 0;
    for at in unescaped_positions(text, separator) {
        parts.push(unescape(&text[start..at]));
        start = at + separator.len_utf8();
    }
    parts.push(unescape(&text[start..]));
    parts
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut escaped = false;
    for c in text.chars() {
        if escaped || c != '\\' {
            out.push(c);
            escaped = false;
        } else {
            escaped = true;
        }
    }
    out
}

fn escape(form: &str) -> String {
    let mut out = String::with_capacity(form.len());
    for c in form.chars() {
        if matches!(c, '\\' | '!' | '>' | '<') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Universal => f.write_str("<.>"),
            Label::Atom { code, .. } if code.as_marker().is_some() => {
                write!(f, "<{}>", code)
            }
            Label::Atom { form, code } => write!(f, "<{}.{}>", escape(form), code),
            Label::Code(code) | Label::Partial(code) => write!(f, "<{}>", code),
            Label::Negated { code, excluded } => {
                f.write_str("<")?;
                for form in excluded {
                    write!(f, "!{}", escape(form))?;
                }
                write!(f, ".{}>", code)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(text: &str) -> String {
        Symbol::parse(text).unwrap().to_string()
    }

    #[test]
    fn test_special_symbols() {
        assert_eq!(Symbol::parse("<E>").unwrap(), Symbol::Epsilon);
        assert_eq!(Symbol::parse("<def>").unwrap(), Symbol::Default);
        assert_eq!(Label::parse("<.>").unwrap(), Label::Universal);
        assert_eq!(Label::parse("<!>").unwrap(), Label::marker(Marker::Main));
        assert_eq!(Label::parse("<=>").unwrap(), Label::marker(Marker::Side));
    }

    #[test]
    fn test_codes_and_atoms() {
        assert!(matches!(Label::parse("<A:f>").unwrap(), Label::Partial(_)));
        assert!(matches!(Label::parse("<A:fs>").unwrap(), Label::Code(_)));
        assert!(matches!(Label::parse("<le.DET:ms>").unwrap(), Label::Atom { .. }));
        assert_eq!(display("<etc..ADV>"), "<etc..ADV>");
        assert_eq!(display("<N+Hum:ms>"), "<N:ms>");
    }

    #[test]
    fn test_negated_forms_are_sorted() {
        assert_eq!(display("<!z!a!z.N:fp>"), "<!a!z.N:fp>");
        assert_eq!(
            Label::parse("<!a.N:f>"),
            Err(LabelParseError::IncompleteCode("<!a.N:f>".to_string()))
        );
        assert!(matches!(
            Label::parse("<!a!b>"),
            Err(LabelParseError::MissingCode(_))
        ));
    }

    #[test]
    fn test_dictionary_entries() {
        let label = Label::parse("{grandes,grand.A:fp}").unwrap();
        assert_eq!(label.to_string(), "<grand.A:fp>");
        assert_eq!(
            Label::parse("{le,.DET:ms}").unwrap().to_string(),
            "<le.DET:ms>"
        );
        assert!(matches!(
            Label::parse("{grand.A:fp}"),
            Err(LabelParseError::MalformedEntry(_))
        ));
    }

    #[test]
    fn test_bare_tokens() {
        assert_eq!(display(","), "<,.PNC>");
        assert_eq!(display("\\!"), "<\\!.PNC>");
        assert_eq!(display("7"), "<7.CHFA>");
        assert_eq!(display("bonjour"), "<bonjour.?>");
    }

    #[test]
    fn test_escaped_forms_survive_display() {
        for text in ["<\\!.PNC>", "<a\\>b.?>", "<!\\!x!y.N:ms>", "<...PNC>"] {
            let label = Label::parse(text).unwrap();
            assert_eq!(Label::parse(&label.to_string()).unwrap(), label, "{}", text);
        }
    }

    #[test]
    fn test_text_loader_rejects_sets() {
        assert!(TextSymbols.load("<A>").is_err());
        assert!(TextSymbols.load("<!>").is_err());
        assert!(TextSymbols.load("<def>").is_err());
        assert!(TextSymbols.load("<.>").is_err());
        assert!(TextSymbols.load("{chat,chat.N:ms}").is_ok());
        assert!(GrammarSymbols.load("<A>").is_ok());
    }
}
