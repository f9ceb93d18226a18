//! Property-based tests for the automaton operations.
//!
//! Random small automata over a fixed label sample are checked against
//! `accepts` on random atom sequences: determinization, complement,
//! intersection, union, minimization and trimming must all agree with the
//! language they are supposed to compute.

use elag::prelude::*;
use proptest::prelude::*;

// ============================================================================
// Test Data Generators
// ============================================================================

const LABELS: &[&str] = &[
    "<.>",
    "<A>",
    "<A:f>",
    "<N>",
    "<N:fs>",
    "<V>",
    "<V:P3s>",
    "<DET>",
    "<porte.N:fs>",
    "<!porte.N:fs>",
    "<ferme.V:P3s>",
];

const ATOMS: &[&str] = &[
    "<porte.N:fs>",
    "<maison.N:fs>",
    "<chats.N:mp>",
    "<ferme.V:P3s>",
    "<porte.V:P3s>",
    "<petite.A:fs>",
    "<grands.A:mp>",
    "<le.DET>",
    "<bien.ADV>",
];

/// (from, label or default, to), final flags
type Shape = (Vec<(usize, Option<usize>, usize)>, Vec<bool>);

fn shape_strategy() -> impl Strategy<Value = Shape> {
    (1usize..5).prop_flat_map(|n| {
        (
            prop::collection::vec(
                (0..n, prop::option::weighted(0.85, 0..LABELS.len()), 0..n),
                0..10,
            ),
            prop::collection::vec(any::<bool>(), n),
        )
    })
}

fn build((transitions, finals): &Shape) -> Automaton {
    let mut a = Automaton::new();
    for (i, &is_final) in finals.iter().enumerate() {
        let flags = match (i == 0, is_final) {
            (true, true) => StateFlags::INITIAL_FINAL,
            (true, false) => StateFlags::INITIAL,
            (false, true) => StateFlags::FINAL,
            (false, false) => StateFlags::NONE,
        };
        a.new_state(flags);
    }
    for &(from, label, to) in transitions {
        let label = label.map(|i| Label::parse(LABELS[i]).unwrap());
        // A second default on a state is rejected; keep the first one.
        let _ = a.add_transition(from, label, to);
    }
    a
}

fn automaton_strategy() -> impl Strategy<Value = Automaton> {
    shape_strategy().prop_map(|shape| build(&shape))
}

fn word_strategy() -> impl Strategy<Value = Vec<Label>> {
    prop::collection::vec(
        prop::sample::select(ATOMS).prop_map(|s| Label::parse(s).unwrap()),
        0..5,
    )
}

fn words_strategy() -> impl Strategy<Value = Vec<Vec<Label>>> {
    prop::collection::vec(word_strategy(), 1..12)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn prop_determinize_preserves_language(a in automaton_strategy(), words in words_strategy()) {
        let d = a.determinize().unwrap();
        prop_assert!(d.is_deterministic().unwrap());
        prop_assert!(d.is_complete());
        for w in &words {
            prop_assert_eq!(a.accepts(w).unwrap(), d.accepts(w).unwrap());
        }
    }

    #[test]
    fn prop_complement_flips_acceptance(a in automaton_strategy(), words in words_strategy()) {
        let d = a.determinize().unwrap();
        let mut c = d.clone();
        c.complement().unwrap();
        for w in &words {
            prop_assert_eq!(c.accepts(w).unwrap(), !d.accepts(w).unwrap());
        }

        c.complement().unwrap();
        for w in &words {
            prop_assert_eq!(c.accepts(w).unwrap(), d.accepts(w).unwrap());
        }
    }

    #[test]
    fn prop_intersection(
        a in automaton_strategy(),
        b in automaton_strategy(),
        words in words_strategy(),
    ) {
        let da = a.determinize().unwrap();
        let db = b.determinize().unwrap();
        let both = da.intersect(&db).unwrap();
        let same = da.intersect(&da).unwrap();
        let partial = da.trim().intersect(&db.trim()).unwrap();
        for w in &words {
            let expected = a.accepts(w).unwrap() && b.accepts(w).unwrap();
            prop_assert_eq!(both.accepts(w).unwrap(), expected);
            prop_assert_eq!(partial.accepts(w).unwrap(), expected);
            prop_assert_eq!(same.accepts(w).unwrap(), a.accepts(w).unwrap());
        }
    }

    #[test]
    fn prop_union(
        a in automaton_strategy(),
        b in automaton_strategy(),
        words in words_strategy(),
    ) {
        let either = a.clone().union(b.clone()).unwrap();
        for w in &words {
            let expected = a.accepts(w).unwrap() || b.accepts(w).unwrap();
            prop_assert_eq!(either.accepts(w).unwrap(), expected);
        }
    }

    #[test]
    fn prop_minimize_is_idempotent(a in automaton_strategy(), words in words_strategy()) {
        let d = a.determinize().unwrap();
        let m = d.minimize().unwrap();
        let mm = m.minimize().unwrap();
        prop_assert!(m.state_count() <= d.state_count());
        prop_assert_eq!(m.state_count(), mm.state_count());
        for w in &words {
            prop_assert_eq!(m.accepts(w).unwrap(), d.accepts(w).unwrap());
            prop_assert_eq!(mm.accepts(w).unwrap(), d.accepts(w).unwrap());
        }
    }

    #[test]
    fn prop_trim_preserves_language(a in automaton_strategy(), words in words_strategy()) {
        let d = a.determinize().unwrap();
        let t = d.trim();
        prop_assert!(t.state_count() <= d.state_count());
        for w in &words {
            prop_assert_eq!(t.accepts(w).unwrap(), d.accepts(w).unwrap());
        }
    }

    #[test]
    fn prop_trim_keeps_default_semantics(a in automaton_strategy(), words in words_strategy()) {
        // Raw automata carry defaults next to labels whose targets may die.
        let t = a.trim();
        prop_assert!(t.state_count() <= a.state_count());
        for w in &words {
            prop_assert_eq!(t.accepts(w).unwrap(), a.accepts(w).unwrap());
        }

        let mut c = a.determinize().unwrap();
        c.complement().unwrap();
        let tc = c.trim();
        for w in &words {
            prop_assert_eq!(tc.accepts(w).unwrap(), c.accepts(w).unwrap());
        }
    }
}
