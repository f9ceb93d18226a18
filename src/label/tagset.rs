//! The closed part of the French ELAG tagset.
//!
//! Closed tags are opaque: they carry no decomposable features, so a code
//! built on one of them is always complete. The inflected categories `A`,
//! `N` and `V` are modelled separately in [`super::code`].

/// Every closed tag, in tagset order.
///
/// `?` marks unknown words and `CHFA` single digits; both are produced by
/// the text symbol loader.
pub const CLOSED_TAGS: &[&str] = &[
    "ADV", "CONJC", "CONJS", "DET", "DET:fp", "DET:fs", "DET:mp", "DET:ms", "INTJ", "PFX", "PNC",
    "PPV", "PPV:1p", "PPV:1s", "PPV:2p", "PPV:2s", "PPV:3fp", "PPV:3fs", "PPV:3mp", "PPV:3ms",
    "PPV:3p", "PPV:3s", "PREP", "PRO", "PRO:1p", "PRO:1s", "PRO:2p", "PRO:2s", "PRO:3fp",
    "PRO:3fs", "PRO:3mp", "PRO:3ms", "PRO:3p", "PRO:3s", "PRO:fp", "PRO:fs", "PRO:mp", "PRO:ms",
    "XI", "XI:1s", "XV", "CHFA", "?",
];

/// Index of a closed tag in [`CLOSED_TAGS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ClosedTag(u8);

impl ClosedTag {
    /// Tag of punctuation symbols.
    pub const PUNCTUATION: ClosedTag = ClosedTag(10);
    /// Tag of single digits.
    pub const DIGIT: ClosedTag = ClosedTag(41);
    /// Tag of words missing from the dictionaries.
    pub const UNKNOWN: ClosedTag = ClosedTag(42);

    /// Look a tag up by its exact spelling.
    pub fn lookup(tag: &str) -> Option<ClosedTag> {
        CLOSED_TAGS
            .iter()
            .position(|t| *t == tag)
            .map(|i| ClosedTag(i as u8))
    }

    /// All closed tags, in tagset order.
    pub fn all() -> impl Iterator<Item = ClosedTag> {
        (0..CLOSED_TAGS.len()).map(|i| ClosedTag(i as u8))
    }

    /// The tag spelling.
    pub fn as_str(self) -> &'static str {
        CLOSED_TAGS[self.0 as usize]
    }
}
