//! Local refinement of a symbolic alphabet into disjoint classes.
//!
//! Powerset construction needs a partition of the input alphabet. Symbolic
//! labels overlap (`<A>` contains `<A:f>`, `<.>` contains everything), so a
//! [`BiAlphabet`] maps every label collected from a set of states to its
//! *developed* sub-labels: pieces that are, across the whole table, either
//! identical or disjoint, and whose union is the original label.
//!
//! The table is built per frontier element and thrown away afterwards.

use crate::label::{AlgebraError, Label};
use log::trace;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::{smallvec, SmallVec};

#[derive(Debug, Clone)]
struct Entry {
    original: Label,
    developed: SmallVec<[Label; 4]>,
}

/// Labels reachable from a state set, refined into disjoint sub-labels.
#[derive(Debug, Clone, Default)]
pub struct BiAlphabet {
    entries: Vec<Entry>,
    index: FxHashMap<Label, usize>,
}

impl BiAlphabet {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect `labels` and refine them.
    pub fn from_labels<'a, I>(labels: I) -> Result<Self, AlgebraError>
    where
        I: IntoIterator<Item = &'a Label>,
    {
        let mut alphabet = Self::new();
        for label in labels {
            alphabet.insert(label);
        }
        alphabet.refine()?;
        Ok(alphabet)
    }

    /// Add a label, developed as itself. Returns `false` if already present.
    pub fn insert(&mut self, label: &Label) -> bool {
        if self.index.contains_key(label) {
            return false;
        }
        self.index.insert(label.clone(), self.entries.len());
        self.entries.push(Entry {
            original: label.clone(),
            developed: smallvec![label.clone()],
        });
        true
    }

    /// Number of original labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no label was collected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The original labels, in insertion order.
    pub fn originals(&self) -> impl Iterator<Item = &Label> {
        self.entries.iter().map(|e| &e.original)
    }

    /// Developed sub-labels of an original label.
    pub fn developed(&self, original: &Label) -> Option<&[Label]> {
        self.index
            .get(original)
            .map(|&i| self.entries[i].developed.as_slice())
    }

    /// Whether the readable label `piece` is part of `original`.
    pub fn covers(&self, original: &Label, piece: &Label) -> bool {
        original.is_universal()
            || self
                .developed(original)
                .map_or(false, |developed| developed.contains(piece))
    }

    /// Every distinct developed sub-label except `Universal`.
    pub fn readable(&self) -> Vec<Label> {
        let mut seen = FxHashSet::default();
        let mut readable = Vec::new();
        for label in self.entries.iter().flat_map(|e| &e.developed) {
            if !label.is_universal() && seen.insert(label) {
                readable.push(label.clone());
            }
        }
        readable
    }

    /// Split overlapping sub-labels until every pair is identical or
    /// disjoint.
    ///
    /// `Universal` overlaps everything and is never split; callers treat it
    /// separately. Pairs are examined in insertion order and the scan
    /// restarts after every split.
    pub fn refine(&mut self) -> Result<(), AlgebraError> {
        let mut splits = 0usize;
        while let Some((a, b, common)) = self.find_overlap()? {
            // Split `b` first so that `a`'s position stays valid when both
            // belong to the same entry.
            self.split(b, &common)?;
            self.split(a, &common)?;
            splits += 1;
        }
        if splits > 0 {
            trace!("refined {} labels with {} splits", self.entries.len(), splits);
        }
        Ok(())
    }

    fn positions(&self) -> Vec<(usize, usize)> {
        self.entries
            .iter()
            .enumerate()
            .flat_map(|(i, e)| (0..e.developed.len()).map(move |j| (i, j)))
            .collect()
    }

    fn at(&self, (i, j): (usize, usize)) -> &Label {
        &self.entries[i].developed[j]
    }

    /// First pair of distinct overlapping sub-labels, with their
    /// intersection.
    #[allow(clippy::type_complexity)]
    fn find_overlap(&self) -> Result<Option<((usize, usize), (usize, usize), Label)>, AlgebraError> {
        let positions = self.positions();
        for (n, &p) in positions.iter().enumerate() {
            let x = self.at(p);
            if x.is_universal() {
                continue;
            }
            for &q in &positions[n + 1..] {
                let y = self.at(q);
                if x == y || y.is_universal() || (x.is_atom() && y.is_atom()) {
                    continue;
                }
                if let Some(common) = x.intersect(y)? {
                    return Ok(Some((p, q, common)));
                }
            }
        }
        Ok(None)
    }

    /// Replace the sub-label at `position` by `common` and the rest of it.
    fn split(&mut self, (i, j): (usize, usize), common: &Label) -> Result<(), AlgebraError> {
        let label = &self.entries[i].developed[j];
        if label == common {
            return Ok(());
        }
        let rest = label.difference(common)?;
        let developed = &mut self.entries[i].developed;
        developed.remove(j);
        let mut at = j;
        for piece in std::iter::once(common.clone()).chain(rest) {
            if !developed.contains(&piece) {
                developed.insert(at, piece);
                at += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &str) -> Label {
        Label::parse(s).unwrap()
    }

    fn refined(labels: &[&str]) -> BiAlphabet {
        let labels: Vec<Label> = labels.iter().map(|s| label(s)).collect();
        BiAlphabet::from_labels(&labels).unwrap()
    }

    #[test]
    fn test_nested_labels() {
        let bi = refined(&["<A>", "<A:f>"]);
        assert_eq!(
            bi.developed(&label("<A>")).unwrap(),
            &[label("<A:f>"), label("<A:m>")]
        );
        assert_eq!(bi.developed(&label("<A:f>")).unwrap(), &[label("<A:f>")]);
        assert_eq!(bi.readable(), vec![label("<A:f>"), label("<A:m>")]);
    }

    #[test]
    fn test_crossing_labels() {
        let bi = refined(&["<A:f>", "<A:s>"]);
        let readable = bi.readable();
        assert_eq!(readable.len(), 3);
        assert!(readable.contains(&label("<A:fs>")));
        assert!(readable.contains(&label("<A:fp>")));
        assert!(readable.contains(&label("<A:ms>")));
        assert!(bi.covers(&label("<A:f>"), &label("<A:fs>")));
        assert!(bi.covers(&label("<A:s>"), &label("<A:fs>")));
        assert!(!bi.covers(&label("<A:s>"), &label("<A:fp>")));
    }

    #[test]
    fn test_atoms_and_negations() {
        let bi = refined(&["<N:ms>", "<chat.N:ms>", "<!chien.N:ms>"]);
        let readable = bi.readable();
        assert!(readable.contains(&label("<chat.N:ms>")));
        assert!(readable.contains(&label("<chien.N:ms>")));
        assert!(readable.contains(&label("<!chat!chien.N:ms>")));
        assert_eq!(readable.len(), 3);
    }

    #[test]
    fn test_universal_is_left_alone() {
        let bi = refined(&["<.>", "<ADV>"]);
        assert_eq!(bi.developed(&Label::Universal).unwrap(), &[Label::Universal]);
        assert_eq!(bi.readable(), vec![label("<ADV>")]);
        assert!(bi.covers(&Label::Universal, &label("<ADV>")));
    }

    #[test]
    fn test_readable_labels_are_disjoint() {
        let bi = refined(&["<V>", "<V:3>", "<V:s>", "<V:K>", "<V:Kf>", "<V:P3s>"]);
        let readable = bi.readable();
        for (i, x) in readable.iter().enumerate() {
            for y in &readable[i + 1..] {
                assert_eq!(x.intersect(y).unwrap(), None, "{} and {}", x, y);
            }
        }
    }
}
