//! Grammatical codes: a category plus inflectional features.
//!
//! A [`Code`] denotes the set of *complete* codes that refine it. Complete
//! codes are the points of the alphabet (an atom always carries one); an
//! incomplete code such as `A:f` ("adjective, feminine, any number") denotes
//! every complete code containing its feature letters.
//!
//! Only the inflected categories carry features:
//!
//! | category | features, in order |
//! |----------|--------------------|
//! | `A`, `N` | gender `m f`, number `s p` |
//! | `V`      | tense `P I J F C S T Y K G W`, person `1 2 3`, gender, number |
//!
//! Verb features are constrained: `G` and `W` stand alone, the past
//! participle `K` takes gender and number but no person, finite tenses take
//! person and number but no gender. A gender without tense therefore implies
//! `K`, and codes are normalized accordingly so that structurally different
//! codes always denote different sets.

use super::error::AlgebraError;
use super::tagset::ClosedTag;
use std::fmt;

/// Grammatical category of a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Category {
    /// `A`
    Adjective,
    /// `N`
    Noun,
    /// `V`
    Verb,
    /// An opaque tag of the closed tagset.
    Closed(ClosedTag),
    /// Rule delimiter; lies outside the label algebra.
    Marker(Marker),
}

impl Category {
    /// True for `A`, `N` and `V`.
    pub fn is_inflected(self) -> bool {
        matches!(self, Category::Adjective | Category::Noun | Category::Verb)
    }
}

/// Delimiters recognised by the rule splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Marker {
    /// `<!>`: opens, splits and closes the main constraint.
    Main,
    /// `<=>`: opens, splits and closes a side constraint.
    Side,
}

impl Marker {
    /// The marker's one-character spelling.
    pub fn symbol(self) -> char {
        match self {
            Marker::Main => '!',
            Marker::Side => '=',
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.symbol())
    }
}

/// Verb tenses and moods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Tense {
    /// `P`
    Present,
    /// `I`
    Imperfect,
    /// `J`
    SimplePast,
    /// `F`
    Future,
    /// `C`
    Conditional,
    /// `S`
    Subjunctive,
    /// `T`
    ImperfectSubjunctive,
    /// `Y`
    Imperative,
    /// `K`
    PastParticiple,
    /// `G`
    PresentParticiple,
    /// `W`
    Infinitive,
}

impl Tense {
    /// Every tense, in tagset order.
    pub const ALL: [Tense; 11] = [
        Tense::Present,
        Tense::Imperfect,
        Tense::SimplePast,
        Tense::Future,
        Tense::Conditional,
        Tense::Subjunctive,
        Tense::ImperfectSubjunctive,
        Tense::Imperative,
        Tense::PastParticiple,
        Tense::PresentParticiple,
        Tense::Infinitive,
    ];

    /// Tag letter.
    pub fn letter(self) -> char {
        match self {
            Tense::Present => 'P',
            Tense::Imperfect => 'I',
            Tense::SimplePast => 'J',
            Tense::Future => 'F',
            Tense::Conditional => 'C',
            Tense::Subjunctive => 'S',
            Tense::ImperfectSubjunctive => 'T',
            Tense::Imperative => 'Y',
            Tense::PastParticiple => 'K',
            Tense::PresentParticiple => 'G',
            Tense::Infinitive => 'W',
        }
    }

    fn from_letter(c: char) -> Option<Tense> {
        Tense::ALL.iter().copied().find(|t| t.letter() == c)
    }

    /// Conjugated tenses, inflected for person and number.
    pub fn is_finite(self) -> bool {
        !matches!(
            self,
            Tense::PastParticiple | Tense::PresentParticiple | Tense::Infinitive
        )
    }

    /// Whether complete codes of this tense carry the given dimension.
    fn carries(self, dim: Dimension) -> bool {
        match dim {
            Dimension::Tense => true,
            Dimension::Person => self.is_finite(),
            Dimension::Gender => self == Tense::PastParticiple,
            Dimension::Number => self.is_finite() || self == Tense::PastParticiple,
        }
    }
}

/// Grammatical person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Person {
    /// `1`
    First,
    /// `2`
    Second,
    /// `3`
    Third,
}

impl Person {
    /// Every person.
    pub const ALL: [Person; 3] = [Person::First, Person::Second, Person::Third];

    /// Tag letter.
    pub fn letter(self) -> char {
        match self {
            Person::First => '1',
            Person::Second => '2',
            Person::Third => '3',
        }
    }
}

/// Grammatical gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Gender {
    /// `m`
    Masculine,
    /// `f`
    Feminine,
}

impl Gender {
    /// Every gender.
    pub const ALL: [Gender; 2] = [Gender::Masculine, Gender::Feminine];

    /// Tag letter.
    pub fn letter(self) -> char {
        match self {
            Gender::Masculine => 'm',
            Gender::Feminine => 'f',
        }
    }
}

/// Grammatical number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Number {
    /// `s`
    Singular,
    /// `p`
    Plural,
}

impl Number {
    /// Every number.
    pub const ALL: [Number; 2] = [Number::Singular, Number::Plural];

    /// Tag letter.
    pub fn letter(self) -> char {
        match self {
            Number::Singular => 's',
            Number::Plural => 'p',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Tense,
    Person,
    Gender,
    Number,
}

impl Dimension {
    const ORDER: [Dimension; 4] = [
        Dimension::Tense,
        Dimension::Person,
        Dimension::Gender,
        Dimension::Number,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feature {
    Tense(Tense),
    Person(Person),
    Gender(Gender),
    Number(Number),
}

impl Feature {
    fn values(dim: Dimension) -> Vec<Feature> {
        match dim {
            Dimension::Tense => Tense::ALL.iter().map(|&t| Feature::Tense(t)).collect(),
            Dimension::Person => Person::ALL.iter().map(|&p| Feature::Person(p)).collect(),
            Dimension::Gender => Gender::ALL.iter().map(|&g| Feature::Gender(g)).collect(),
            Dimension::Number => Number::ALL.iter().map(|&n| Feature::Number(n)).collect(),
        }
    }
}

/// A grammatical code, complete or partial.
///
/// Always valid and normalized once constructed: contradictory feature
/// combinations are rejected by [`Code::parse`] and [`Code::merge`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Code {
    category: Category,
    tense: Option<Tense>,
    person: Option<Person>,
    gender: Option<Gender>,
    number: Option<Number>,
}

impl Code {
    fn bare(category: Category) -> Self {
        Self {
            category,
            tense: None,
            person: None,
            gender: None,
            number: None,
        }
    }

    /// The featureless code of a category.
    pub fn category_only(category: Category) -> Self {
        Self::bare(category)
    }

    /// A closed-tagset code.
    pub fn closed(tag: ClosedTag) -> Self {
        Self::bare(Category::Closed(tag))
    }

    /// The code carried by a rule delimiter.
    pub fn marker(marker: Marker) -> Self {
        Self::bare(Category::Marker(marker))
    }

    /// An adjective or noun code.
    pub fn nominal(
        category: Category,
        gender: Option<Gender>,
        number: Option<Number>,
    ) -> Result<Self, AlgebraError> {
        let code = Self {
            gender,
            number,
            ..Self::bare(category)
        };
        code.validated()
    }

    /// A verb code.
    pub fn verb(
        tense: Option<Tense>,
        person: Option<Person>,
        gender: Option<Gender>,
        number: Option<Number>,
    ) -> Result<Self, AlgebraError> {
        let code = Self {
            category: Category::Verb,
            tense,
            person,
            gender,
            number,
        };
        code.validated()
    }

    /// Parse a code such as `N:fs`, `V:K`, `PRO:3ms` or `ADV`.
    ///
    /// Semantic suffixes (`N+z1:ms`) are dropped. Feature letters of
    /// inflected categories may appear in any order but at most once per
    /// dimension.
    pub fn parse(text: &str) -> Result<Self, AlgebraError> {
        let stripped = strip_semantic_features(text);
        if let Some(tag) = ClosedTag::lookup(&stripped) {
            return Ok(Self::closed(tag));
        }

        let (head, features) = match stripped.split_once(':') {
            Some((head, features)) => (head, features),
            None => (stripped.as_str(), ""),
        };
        let category = match head {
            "A" => Category::Adjective,
            "N" => Category::Noun,
            "V" => Category::Verb,
            _ => return Err(AlgebraError::UnknownCategory(text.to_string())),
        };

        let mut code = Self::bare(category);
        for c in features.chars() {
            let feature = match c {
                'm' => Feature::Gender(Gender::Masculine),
                'f' => Feature::Gender(Gender::Feminine),
                's' => Feature::Number(Number::Singular),
                'p' => Feature::Number(Number::Plural),
                '1' => Feature::Person(Person::First),
                '2' => Feature::Person(Person::Second),
                '3' => Feature::Person(Person::Third),
                other => match Tense::from_letter(other) {
                    Some(t) => Feature::Tense(t),
                    None => {
                        return Err(AlgebraError::InvalidCode {
                            code: text.to_string(),
                            reason: "unknown feature letter",
                        })
                    }
                },
            };
            if code.feature(feature_dimension(feature)).is_some() {
                return Err(AlgebraError::InvalidCode {
                    code: text.to_string(),
                    reason: "feature given twice",
                });
            }
            code = code.with(feature);
        }

        code.validated().map_err(|_| AlgebraError::InvalidCode {
            code: text.to_string(),
            reason: "contradictory features",
        })
    }

    fn validated(self) -> Result<Self, AlgebraError> {
        let code = self.normalized();
        if code.is_valid() {
            Ok(code)
        } else {
            Err(AlgebraError::InvalidCode {
                code: code.to_string(),
                reason: "contradictory features",
            })
        }
    }

    /// The code's category.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Tense, for verbs.
    pub fn tense(&self) -> Option<Tense> {
        self.tense
    }

    /// Person, for verbs.
    pub fn person(&self) -> Option<Person> {
        self.person
    }

    /// Gender, for adjectives, nouns and participles.
    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    /// Number.
    pub fn number(&self) -> Option<Number> {
        self.number
    }

    /// Marker carried by this code, if it is a rule delimiter.
    pub fn as_marker(&self) -> Option<Marker> {
        match self.category {
            Category::Marker(m) => Some(m),
            _ => None,
        }
    }

    /// Whether the code is a point of the alphabet.
    pub fn is_complete(&self) -> bool {
        match self.category {
            Category::Adjective | Category::Noun => self.gender.is_some() && self.number.is_some(),
            Category::Verb => match self.tense {
                Some(Tense::PresentParticiple | Tense::Infinitive) => true,
                Some(Tense::PastParticiple) => self.gender.is_some() && self.number.is_some(),
                Some(_) => self.person.is_some() && self.number.is_some(),
                None => false,
            },
            Category::Closed(_) | Category::Marker(_) => true,
        }
    }

    fn is_valid(&self) -> bool {
        match self.category {
            Category::Adjective | Category::Noun => self.tense.is_none() && self.person.is_none(),
            Category::Verb => match self.tense {
                Some(Tense::PresentParticiple | Tense::Infinitive) => {
                    self.person.is_none() && self.gender.is_none() && self.number.is_none()
                }
                Some(Tense::PastParticiple) => self.person.is_none(),
                Some(_) => self.gender.is_none(),
                None => !(self.person.is_some() && self.gender.is_some()),
            },
            Category::Closed(_) | Category::Marker(_) => {
                self.tense.is_none()
                    && self.person.is_none()
                    && self.gender.is_none()
                    && self.number.is_none()
            }
        }
    }

    fn normalized(mut self) -> Self {
        if self.category == Category::Verb && self.tense.is_none() && self.gender.is_some() {
            self.tense = Some(Tense::PastParticiple);
        }
        self
    }

    fn feature(&self, dim: Dimension) -> Option<Feature> {
        match dim {
            Dimension::Tense => self.tense.map(Feature::Tense),
            Dimension::Person => self.person.map(Feature::Person),
            Dimension::Gender => self.gender.map(Feature::Gender),
            Dimension::Number => self.number.map(Feature::Number),
        }
    }

    fn with(&self, feature: Feature) -> Self {
        let mut code = self.clone();
        match feature {
            Feature::Tense(t) => code.tense = Some(t),
            Feature::Person(p) => code.person = Some(p),
            Feature::Gender(g) => code.gender = Some(g),
            Feature::Number(n) => code.number = Some(n),
        }
        code
    }

    /// True when every complete code refining `self` also refines `general`.
    ///
    /// Reflexive. Codes of different categories never refine each other.
    pub fn refines(&self, general: &Code) -> bool {
        if self.category != general.category {
            return false;
        }
        Dimension::ORDER.iter().all(|&dim| match general.feature(dim) {
            None => true,
            Some(f) => self.feature(dim) == Some(f),
        })
    }

    /// Merge the features of two codes of the same category.
    ///
    /// `None` when the categories differ, a dimension carries two different
    /// values, or the merged features contradict each other.
    pub fn merge(&self, other: &Code) -> Option<Code> {
        if self.category != other.category {
            return None;
        }
        let mut merged = self.clone();
        for dim in Dimension::ORDER {
            match (self.feature(dim), other.feature(dim)) {
                (Some(a), Some(b)) if a != b => return None,
                (None, Some(b)) => merged = merged.with(b),
                _ => {}
            }
        }
        merged.validated().ok()
    }

    /// Every complete code refining this one.
    pub fn completions(&self) -> Vec<Code> {
        complete_codes(self.category)
            .into_iter()
            .filter(|c| c.refines(self))
            .collect()
    }

    /// `self \ other` as pairwise disjoint codes.
    ///
    /// Dimensions are split progressively in tense, person, gender, number
    /// order: when `other` fixes a dimension that `self` leaves open, every
    /// alternative value is emitted, together with the verb codes whose
    /// tense does not carry that dimension at all, and `self` is narrowed to
    /// `other`'s value until it refines `other`.
    pub fn split_off(&self, other: &Code) -> Vec<Code> {
        if self.merge(other).is_none() {
            return vec![self.clone()];
        }

        let mut pieces = Vec::new();
        let mut current = self.clone();
        for dim in Dimension::ORDER {
            if current.refines(other) {
                break;
            }
            let wanted = match (current.feature(dim), other.feature(dim)) {
                (None, Some(wanted)) => wanted,
                _ => continue,
            };

            for alternative in Feature::values(dim) {
                if alternative == wanted {
                    continue;
                }
                if let Ok(piece) = current.with(alternative).validated() {
                    pieces.push(piece);
                }
            }

            if current.category == Category::Verb && current.tense.is_none() {
                for tense in Tense::ALL {
                    if tense.carries(dim) {
                        continue;
                    }
                    if let Ok(piece) = current.with(Feature::Tense(tense)).validated() {
                        pieces.push(piece);
                    }
                }
            }

            current = current.with(wanted).normalized();
        }
        pieces
    }

    /// Top-level entries of the tagset: every closed tag, plus the bare
    /// inflected categories.
    pub fn tagset() -> Vec<Code> {
        let mut codes: Vec<Code> = ClosedTag::all().map(Code::closed).collect();
        codes.push(Self::bare(Category::Adjective));
        codes.push(Self::bare(Category::Noun));
        codes.push(Self::bare(Category::Verb));
        codes
    }
}

fn feature_dimension(feature: Feature) -> Dimension {
    match feature {
        Feature::Tense(_) => Dimension::Tense,
        Feature::Person(_) => Dimension::Person,
        Feature::Gender(_) => Dimension::Gender,
        Feature::Number(_) => Dimension::Number,
    }
}

fn strip_semantic_features(text: &str) -> String {
    match text.find('+') {
        None => text.to_string(),
        Some(start) => {
            let rest = &text[start..];
            let end = rest.find(':').unwrap_or(rest.len());
            format!("{}{}", &text[..start], &rest[end..])
        }
    }
}

fn complete_codes(category: Category) -> Vec<Code> {
    match category {
        Category::Adjective | Category::Noun => {
            let mut codes = Vec::with_capacity(4);
            for g in Gender::ALL {
                for n in Number::ALL {
                    codes.push(Code {
                        gender: Some(g),
                        number: Some(n),
                        ..Code::bare(category)
                    });
                }
            }
            codes
        }
        Category::Verb => {
            let mut codes = Vec::with_capacity(54);
            for t in Tense::ALL {
                let base = Code {
                    tense: Some(t),
                    ..Code::bare(Category::Verb)
                };
                match t {
                    Tense::PresentParticiple | Tense::Infinitive => codes.push(base),
                    Tense::PastParticiple => {
                        for g in Gender::ALL {
                            for n in Number::ALL {
                                codes.push(base.with(Feature::Gender(g)).with(Feature::Number(n)));
                            }
                        }
                    }
                    _ => {
                        for p in Person::ALL {
                            for n in Number::ALL {
                                codes.push(base.with(Feature::Person(p)).with(Feature::Number(n)));
                            }
                        }
                    }
                }
            }
            codes
        }
        Category::Closed(_) | Category::Marker(_) => vec![Code::bare(category)],
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = match self.category {
            Category::Adjective => "A",
            Category::Noun => "N",
            Category::Verb => "V",
            Category::Closed(tag) => return f.write_str(tag.as_str()),
            Category::Marker(m) => return write!(f, "{}", m.symbol()),
        };
        f.write_str(head)?;
        let letters: String = [
            self.tense.map(Tense::letter),
            self.person.map(Person::letter),
            self.gender.map(Gender::letter),
            self.number.map(Number::letter),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !letters.is_empty() {
            write!(f, ":{}", letters)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> Code {
        Code::parse(s).unwrap()
    }

    fn covers_exactly(pieces: &[Code], expected: &[Code]) -> bool {
        let mut covered: Vec<Code> = pieces.iter().flat_map(|p| p.completions()).collect();
        let total = covered.len();
        covered.sort();
        covered.dedup();
        let mut expected = expected.to_vec();
        expected.sort();
        covered.len() == total && covered == expected
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(code("N:fs").to_string(), "N:fs");
        assert_eq!(code("N:sf").to_string(), "N:fs");
        assert_eq!(code("V:P3s").to_string(), "V:P3s");
        assert_eq!(code("PRO:3ms").to_string(), "PRO:3ms");
        assert_eq!(code("A").to_string(), "A");
        assert_eq!(code("N+z1:mp").to_string(), "N:mp");
    }

    #[test]
    fn test_gender_without_tense_becomes_participle() {
        assert_eq!(code("V:f").to_string(), "V:Kf");
        assert!(code("V:f").refines(&code("V:K")));
    }

    #[test]
    fn test_parse_rejects_contradictions() {
        assert!(Code::parse("V:G3s").is_err());
        assert!(Code::parse("V:K1s").is_err());
        assert!(Code::parse("V:Pm").is_err());
        assert!(Code::parse("V:3m").is_err());
        assert!(Code::parse("N:mf").is_err());
        assert!(Code::parse("N:P").is_err());
        assert!(Code::parse("ZZZ").is_err());
    }

    #[test]
    fn test_completeness() {
        assert!(code("N:ms").is_complete());
        assert!(!code("N:m").is_complete());
        assert!(code("V:W").is_complete());
        assert!(code("V:P1p").is_complete());
        assert!(code("V:Kfp").is_complete());
        assert!(!code("V:P1").is_complete());
        assert!(!code("V:3s").is_complete());
        assert!(code("ADV").is_complete());
    }

    #[test]
    fn test_completion_counts() {
        assert_eq!(code("A").completions().len(), 4);
        assert_eq!(code("V").completions().len(), 54);
        assert_eq!(code("V:3").completions().len(), 16);
        assert_eq!(code("V:s").completions().len(), 8 * 3 + 2);
    }

    #[test]
    fn test_merge() {
        assert_eq!(code("A:m").merge(&code("A:s")), Some(code("A:ms")));
        assert_eq!(code("A:m").merge(&code("A:f")), None);
        assert_eq!(code("V:K").merge(&code("V:3")), None);
        assert_eq!(code("V:3").merge(&code("V:s")), Some(code("V:3s")));
        assert_eq!(code("A").merge(&code("N")), None);
    }

    #[test]
    fn test_split_nominal() {
        let pieces = code("A").split_off(&code("A:fs"));
        assert!(covers_exactly(
            &pieces,
            &[code("A:ms"), code("A:mp"), code("A:fp")]
        ));
    }

    #[test]
    fn test_split_verb_keeps_personless_tenses() {
        let pieces = code("V:s").split_off(&code("V:3"));
        let mut expected = code("V:s").completions();
        expected.retain(|c| !c.refines(&code("V:3")));
        assert!(covers_exactly(&pieces, &expected));
        assert!(pieces.contains(&code("V:Ks")));
    }

    #[test]
    fn test_split_every_verb_pair_is_exact() {
        let partials = [
            "V", "V:P", "V:K", "V:3", "V:s", "V:f", "V:1s", "V:Kp", "V:P3", "V:Ys", "V:Kms",
            "V:G", "V:I2p",
        ];
        for a in partials {
            for b in partials {
                let (a, b) = (code(a), code(b));
                let pieces = a.split_off(&b);
                let mut expected = a.completions();
                expected.retain(|c| !c.refines(&b));
                assert!(
                    covers_exactly(&pieces, &expected),
                    "{} minus {} gave {:?}",
                    a,
                    b,
                    pieces.iter().map(|p| p.to_string()).collect::<Vec<_>>()
                );
            }
        }
    }
}
