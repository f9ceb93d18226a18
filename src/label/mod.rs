//! Symbolic transition labels and their set algebra.
//!
//! A [`Label`] denotes a set of *atoms*: pairs of a word form and a complete
//! grammatical [`Code`]. The five label kinds are closed under the
//! operations below:
//!
//! - [`Label::member`]: does a label match an atom,
//! - [`Label::finer_than`]: set inclusion,
//! - [`Label::intersect`]: set intersection, `None` when disjoint,
//! - [`Label::difference`]: set difference as a list of pairwise disjoint
//!   labels whose union is exactly `a \ b`.
//!
//! Rule delimiters (`<!>`, `<=>`) are atoms of a marker category that the
//! algebra does not model: comparing one with anything but another atom is
//! an [`AlgebraError::MarkerInAlgebra`].
//!
//! # Example
//!
//! ```
//! use elag::label::Label;
//!
//! let adjectives = Label::parse("<A>").unwrap();
//! let feminine = Label::parse("<A:f>").unwrap();
//! let rest = adjectives.difference(&feminine).unwrap();
//! assert_eq!(rest, vec![Label::parse("<A:m>").unwrap()]);
//! ```

pub mod code;
mod error;
pub mod syntax;
pub mod tagset;

pub use code::{Category, Code, Gender, Marker, Number, Person, Tense};
pub use error::{AlgebraError, LabelParseError};
pub use syntax::{GrammarSymbols, Symbol, SymbolLoader, TextSymbols};
pub use tagset::ClosedTag;

/// Result alias for label algebra operations.
pub type Result<T> = std::result::Result<T, AlgebraError>;

/// A set of atoms, in one of five shapes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Label {
    /// Exactly one word form with a complete code.
    Atom {
        /// The word form.
        form: String,
        /// Its complete code.
        code: Code,
    },
    /// Every atom.
    Universal,
    /// Every atom whose code is exactly this complete code.
    Code(Code),
    /// Every atom of a complete code except the listed forms.
    Negated {
        /// The complete code.
        code: Code,
        /// Excluded forms, sorted and deduplicated, never empty.
        excluded: Vec<String>,
    },
    /// Every atom whose code refines this incomplete code.
    Partial(Code),
}

impl Label {
    /// An atom. The code must be complete.
    pub fn atom(form: impl Into<String>, code: Code) -> Result<Label> {
        let form = form.into();
        if !code.is_complete() {
            return Err(AlgebraError::InvalidCode {
                code: code.to_string(),
                reason: "atoms carry a complete code",
            });
        }
        Ok(Label::Atom { form, code })
    }

    /// The rule delimiter atom for a marker.
    pub fn marker(marker: Marker) -> Label {
        Label::Atom {
            form: marker.symbol().to_string(),
            code: Code::marker(marker),
        }
    }

    /// `Code` when the code is complete, `Partial` otherwise.
    pub fn from_code(code: Code) -> Label {
        if code.is_complete() {
            Label::Code(code)
        } else {
            Label::Partial(code)
        }
    }

    /// Every atom of a complete code but the given forms.
    ///
    /// An empty exclusion list yields the plain [`Label::Code`].
    pub fn negated<I, S>(code: Code, forms: I) -> Result<Label>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !code.is_complete() {
            return Err(AlgebraError::InvalidCode {
                code: code.to_string(),
                reason: "negated labels carry a complete code",
            });
        }
        let mut excluded: Vec<String> = forms.into_iter().map(Into::into).collect();
        excluded.sort();
        excluded.dedup();
        Ok(Self::negated_sorted(code, excluded))
    }

    fn negated_sorted(code: Code, excluded: Vec<String>) -> Label {
        if excluded.is_empty() {
            Label::Code(code)
        } else {
            Label::Negated { code, excluded }
        }
    }

    /// The code the label is built on, if any.
    pub fn code(&self) -> Option<&Code> {
        match self {
            Label::Atom { code, .. }
            | Label::Code(code)
            | Label::Negated { code, .. }
            | Label::Partial(code) => Some(code),
            Label::Universal => None,
        }
    }

    /// True for [`Label::Atom`].
    pub fn is_atom(&self) -> bool {
        matches!(self, Label::Atom { .. })
    }

    /// True for [`Label::Universal`].
    pub fn is_universal(&self) -> bool {
        matches!(self, Label::Universal)
    }

    /// The marker this label stands for, if it is a rule delimiter.
    pub fn as_marker(&self) -> Option<Marker> {
        match self {
            Label::Atom { code, .. } => code.as_marker(),
            _ => None,
        }
    }

    fn is_marker(&self) -> bool {
        self.code().and_then(Code::as_marker).is_some()
    }

    fn check_markers(&self, other: &Label) -> Result<()> {
        for (marker, against) in [(self, other), (other, self)] {
            if marker.is_marker() && !against.is_atom() {
                return Err(AlgebraError::MarkerInAlgebra(marker.to_string()));
            }
        }
        Ok(())
    }

    /// Whether the atom `self` is matched by `label`.
    pub fn member(&self, label: &Label) -> Result<bool> {
        let (form, code) = match self {
            Label::Atom { form, code } => (form, code),
            other => return Err(AlgebraError::NotAnAtom(other.to_string())),
        };
        self.check_markers(label)?;
        Ok(match label {
            Label::Universal => true,
            Label::Atom { .. } => self == label,
            Label::Code(c) => code == c,
            Label::Negated { code: c, excluded } => code == c && excluded.binary_search(form).is_err(),
            Label::Partial(p) => code.refines(p),
        })
    }

    /// Whether every atom matched by `self` is matched by `other`. Reflexive.
    pub fn finer_than(&self, other: &Label) -> Result<bool> {
        self.check_markers(other)?;
        Ok(match (self, other) {
            (_, Label::Universal) => true,
            (Label::Universal, _) => false,
            (Label::Atom { .. }, _) => self.member(other)?,
            (_, Label::Atom { .. }) => false,

            (Label::Code(c), Label::Code(d)) => c == d,
            (Label::Code(_), Label::Negated { .. }) => false,
            (Label::Code(c), Label::Partial(p)) => c.refines(p),

            (Label::Negated { code: c, .. }, Label::Code(d)) => c == d,
            (Label::Negated { code: c, excluded: e }, Label::Negated { code: d, excluded: f }) => {
                c == d && f.iter().all(|form| e.binary_search(form).is_ok())
            }
            (Label::Negated { code: c, .. }, Label::Partial(p)) => c.refines(p),

            (Label::Partial(p), Label::Partial(q)) => p.refines(q),
            (Label::Partial(_), _) => false,
        })
    }

    /// The intersection of two labels, `None` when they are disjoint.
    ///
    /// When one operand is finer than the other, the finer one is returned.
    pub fn intersect(&self, other: &Label) -> Result<Option<Label>> {
        self.check_markers(other)?;
        Ok(match (self, other) {
            (Label::Universal, x) | (x, Label::Universal) => Some(x.clone()),
            (Label::Atom { .. }, x) => self.member(x)?.then(|| self.clone()),
            (x, Label::Atom { .. }) => other.member(x)?.then(|| other.clone()),

            (Label::Code(c), Label::Code(d)) => (c == d).then(|| self.clone()),
            (Label::Code(c), Label::Negated { code: d, .. }) => (c == d).then(|| other.clone()),
            (Label::Negated { code: c, .. }, Label::Code(d)) => (c == d).then(|| self.clone()),
            (Label::Code(c) | Label::Negated { code: c, .. }, Label::Partial(p)) => {
                c.refines(p).then(|| self.clone())
            }
            (Label::Partial(p), Label::Code(c) | Label::Negated { code: c, .. }) => {
                c.refines(p).then(|| other.clone())
            }

            (Label::Negated { code: c, excluded: e }, Label::Negated { code: d, excluded: f }) => {
                (c == d).then(|| {
                    let mut excluded: Vec<String> = e.iter().chain(f.iter()).cloned().collect();
                    excluded.sort();
                    excluded.dedup();
                    Label::Negated {
                        code: c.clone(),
                        excluded,
                    }
                })
            }

            (Label::Partial(p), Label::Partial(q)) => p.merge(q).map(Label::from_code),
        })
    }

    /// `self \ other` as pairwise disjoint labels.
    ///
    /// Empty when `self` is finer than `other`, `[self]` when they are
    /// disjoint.
    pub fn difference(&self, other: &Label) -> Result<Vec<Label>> {
        self.check_markers(other)?;
        if other.is_universal() || self.finer_than(other)? {
            return Ok(Vec::new());
        }
        if self.intersect(other)?.is_none() {
            return Ok(vec![self.clone()]);
        }

        // Overlapping, and `self` is strictly larger than the intersection.
        Ok(match (self, other) {
            (Label::Universal, Label::Atom { form, code }) => {
                let mut pieces = complement(code);
                pieces.push(Label::negated_sorted(code.clone(), vec![form.clone()]));
                pieces
            }
            (Label::Universal, Label::Code(c) | Label::Partial(c)) => complement(c),
            (Label::Universal, Label::Negated { code, excluded }) => {
                let mut pieces = complement(code);
                pieces.extend(atoms(code, excluded));
                pieces
            }

            (Label::Code(c), Label::Atom { form, .. }) => {
                vec![Label::negated_sorted(c.clone(), vec![form.clone()])]
            }
            (Label::Code(c), Label::Negated { excluded, .. }) => atoms(c, excluded).collect(),

            (Label::Negated { code, excluded }, Label::Atom { form, .. }) => {
                let mut excluded = excluded.clone();
                if let Err(at) = excluded.binary_search(form) {
                    excluded.insert(at, form.clone());
                }
                vec![Label::negated_sorted(code.clone(), excluded)]
            }
            (Label::Negated { code, excluded: e }, Label::Negated { excluded: g, .. }) => {
                let kept: Vec<String> = g
                    .iter()
                    .filter(|form| e.binary_search(form).is_err())
                    .cloned()
                    .collect();
                atoms(code, &kept).collect()
            }

            (Label::Partial(p), Label::Atom { form, code }) => {
                let mut pieces = split(p, code);
                pieces.push(Label::negated_sorted(code.clone(), vec![form.clone()]));
                pieces
            }
            (Label::Partial(p), Label::Code(c) | Label::Partial(c)) => split(p, c),
            (Label::Partial(p), Label::Negated { code, excluded }) => {
                let mut pieces = split(p, code);
                pieces.extend(atoms(code, excluded));
                pieces
            }

            // Every remaining pair is either disjoint or ordered by inclusion.
            _ => unreachable!("overlapping labels {} and {} without a difference rule", self, other),
        })
    }
}

fn atoms<'a>(code: &'a Code, forms: &'a [String]) -> impl Iterator<Item = Label> + 'a {
    forms.iter().map(move |form| Label::Atom {
        form: form.clone(),
        code: code.clone(),
    })
}

fn split(general: &Code, removed: &Code) -> Vec<Label> {
    general
        .split_off(removed)
        .into_iter()
        .map(Label::from_code)
        .collect()
}

/// `Universal \ code` over the tagset.
fn complement(removed: &Code) -> Vec<Label> {
    let mut pieces = Vec::new();
    for entry in Code::tagset() {
        if entry.category() != removed.category() {
            pieces.push(Label::from_code(entry));
        } else if entry.category().is_inflected() {
            pieces.extend(split(&entry, removed));
        }
    }
    pieces
}
