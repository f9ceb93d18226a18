//! End-to-end tests of rule compilation, batch compilation and grammar
//! application.

use elag::prelude::*;
use elag::serialization::{load_fst2, save_fst2};
use proptest::prelude::*;
use std::fs;
use std::path::Path;

fn label(s: &str) -> Label {
    Label::parse(s).unwrap()
}

fn words(tokens: &[&str]) -> Vec<Label> {
    tokens.iter().map(|t| label(t)).collect()
}

/// A chain of states reading `symbols`, the last one final.
fn chain(symbols: &[&str]) -> Automaton {
    let mut a = Automaton::new();
    let mut q = a.new_state(StateFlags::INITIAL);
    for s in symbols {
        let next = a.new_state(StateFlags::NONE);
        a.add_transition(q, Some(label(s)), next).unwrap();
        q = next;
    }
    a.set_final(q, true).unwrap();
    a
}

/// `<!> <DET> <!> <.> <!>` with the side constraint `<=> <DET> <=> <N> <=>`:
/// a determiner is followed by a noun or by nothing.
const DET_N_RULE: &str = "0000000001\n\
-1 det-n\n\
: 1 1 4 5 \n\
: 2 2 \n\
: 1 3 \n\
: 3 4 \n\
: 1 9 \n\
: 2 6 \n\
: 4 7 \n\
: 5 8 \n\
: 4 9 \n\
t \n\
f \n\
%<E>\n\
%<!>\n\
%<DET>\n\
%<.>\n\
%<=>\n\
%<N>\n\
f\n";

const DET: &str = "<le.DET>";
const NOUN: &str = "<chat.N:ms>";
const VERB: &str = "<mange.V:P3s>";
const ADJ: &str = "<petit.A:ms>";

#[test]
fn test_main_constraint_rule() {
    let rule = chain(&["<!>", "<DET>", "<!>", "<V>", "<!>"]);
    let grammar = ElagRule::split("det-v", &rule).unwrap().compile().unwrap();

    assert!(grammar.is_deterministic().unwrap());
    assert!(grammar.accepts(&[]).unwrap());
    assert!(grammar.accepts(&words(&[DET, NOUN, VERB])).unwrap());
    assert!(grammar.accepts(&words(&[VERB, DET])).unwrap());
    assert!(!grammar.accepts(&words(&[DET, VERB])).unwrap());
    assert!(!grammar.accepts(&words(&[NOUN, DET, VERB, ADJ])).unwrap());
}

#[test]
fn test_main_constraint_rule_transitions() {
    let rule = chain(&["<!>", "<DET>", "<!>", "<V>", "<!>"]);
    let grammar = ElagRule::split("det-v", &rule).unwrap().compile().unwrap();
    assert!(grammar.is_deterministic().unwrap());
    assert_eq!(grammar.state_count(), 3);
    assert_eq!(grammar.initial_states().collect::<Vec<_>>(), vec![0]);

    // 0: nothing pending, 1: after a determiner, 2: blocks a verb there.
    let expected: [(bool, [(&str, &[StateId]); 3]); 3] = [
        (true, [(DET, &[1]), (VERB, &[0]), (NOUN, &[0])]),
        (true, [(DET, &[1]), (VERB, &[2]), (NOUN, &[0])]),
        (false, [(DET, &[]), (VERB, &[]), (NOUN, &[])]),
    ];
    for (id, (is_final, row)) in expected.iter().enumerate() {
        let state = grammar.state(id).unwrap();
        assert_eq!(state.is_final(), *is_final, "state {}", id);
        for (atom, targets) in row {
            assert_eq!(
                state.successors(&label(atom)).unwrap(),
                targets.to_vec(),
                "state {} on {}",
                id,
                atom
            );
        }
    }
}

#[test]
fn test_side_constraint_rule() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("det-n.fst2");
    fs::write(&path, DET_N_RULE).unwrap();

    let rule = ElagRule::load(&path).unwrap();
    assert_eq!(rule.sides.len(), 1);
    let grammar = rule.compile().unwrap();

    assert!(grammar.accepts(&[]).unwrap());
    assert!(grammar.accepts(&words(&[DET])).unwrap());
    assert!(grammar.accepts(&words(&[DET, NOUN])).unwrap());
    assert!(grammar.accepts(&words(&[VERB])).unwrap());
    assert!(grammar.accepts(&words(&[VERB, DET, NOUN, ADJ])).unwrap());
    assert!(!grammar.accepts(&words(&[DET, VERB])).unwrap());
    assert!(!grammar.accepts(&words(&[DET, NOUN, DET, ADJ])).unwrap());
}

#[test]
fn test_two_side_constraints() {
    // After a determiner: a noun, or an adjective.
    let mut rule = chain(&["<!>", "<DET>", "<!>", "<.>", "<!>"]);
    let end = rule.final_states().next().unwrap();
    let open = rule.new_state(StateFlags::NONE);
    rule.add_transition(0, Some(label("<=>")), open).unwrap();
    for right in ["<N>", "<A>"] {
        let left = rule.new_state(StateFlags::NONE);
        let middle = rule.new_state(StateFlags::NONE);
        let after = rule.new_state(StateFlags::NONE);
        rule.add_transition(open, Some(label("<DET>")), left).unwrap();
        rule.add_transition(left, Some(label("<=>")), middle).unwrap();
        rule.add_transition(middle, Some(label(right)), after).unwrap();
        rule.add_transition(after, Some(label("<=>")), end).unwrap();
    }

    let rule = ElagRule::split("det-n-or-a", &rule).unwrap();
    assert_eq!(rule.sides.len(), 2);
    let grammar = rule.compile().unwrap();
    assert!(grammar.accepts(&words(&[DET, NOUN])).unwrap());
    assert!(grammar.accepts(&words(&[DET, ADJ, NOUN])).unwrap());
    assert!(!grammar.accepts(&words(&[DET, VERB])).unwrap());
}

#[test]
fn test_rule_errors() {
    let missing = chain(&["<!>", "<DET>", "<!>", "<V>"]);
    assert!(matches!(
        ElagRule::split("r", &missing),
        Err(RuleError::MissingDelimiter { .. })
    ));

    let two_mains = {
        let mut a = chain(&["<!>", "<DET>", "<!>", "<V>", "<!>"]);
        let other = a.new_state(StateFlags::NONE);
        a.add_transition(0, Some(label("<!>")), other).unwrap();
        a
    };
    assert!(ElagRule::split("r", &two_mains).is_err());
}

fn write_rule(dir: &Path, name: &str, rule: &Automaton) {
    save_fst2(dir.join(format!("{}.fst2", name)), name, rule).unwrap();
}

#[test]
fn test_batch_compilation_and_application() {
    let dir = tempfile::tempdir().unwrap();
    write_rule(
        dir.path(),
        "det-v",
        &chain(&["<!>", "<DET>", "<!>", "<V>", "<!>"]),
    );
    write_rule(
        dir.path(),
        "v-v",
        &chain(&["<!>", "<V>", "<!>", "<V>", "<!>"]),
    );
    write_rule(dir.path(), "broken", &chain(&["<!>", "<DET>", "<!>", "<V>"]));
    write_rule(dir.path(), "all", &chain(&["<!>", "<!>", "<!>"]));

    let list = dir.path().join("rules.lst");
    fs::write(&list, "det-v.fst2\nbroken.fst2\n\nall.fst2\nv-v.fst2\n").unwrap();
    let output = dir.path().join("grammar.rul");
    let config = CompilerConfig {
        max_grammar_states: 1,
        write_locate_automata: true,
        ..CompilerConfig::default()
    };

    let report = compile_rules(&list, &output, &config).unwrap();
    assert_eq!(report.compiled, vec!["det-v.fst2", "v-v.fst2"]);
    assert_eq!(report.degenerate, vec!["all.fst2"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "broken.fst2");
    assert!(!report.is_success());
    assert_eq!(report.outputs.len(), 2);
    assert!(dir.path().join("det-v-conc.fst2").exists());

    let index = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = index.lines().collect();
    assert_eq!(lines[0], "\tdet-v.fst2");
    assert!(lines[1].starts_with('<') && lines[1].ends_with("grammar.rul-0.elg>"));
    assert_eq!(lines[2], "\tv-v.fst2");

    // le / ferme read as a noun or a verb / mange.
    let mut text = Automaton::new();
    let q0 = text.new_state(StateFlags::INITIAL);
    let q1 = text.new_state(StateFlags::NONE);
    let q2 = text.new_state(StateFlags::NONE);
    let q3 = text.new_state(StateFlags::FINAL);
    text.add_transition(q0, Some(label(DET)), q1).unwrap();
    text.add_transition(q1, Some(label("<ferme.N:fs>")), q2).unwrap();
    text.add_transition(q1, Some(label("<ferme.V:P3s>")), q2).unwrap();
    text.add_transition(q2, Some(label(VERB)), q3).unwrap();

    let grammars = elag::elag::load_grammars(&output).unwrap();
    assert_eq!(grammars.len(), 2);
    let result = apply_grammars(&text, &grammars).unwrap();
    assert!(result
        .accepts(&words(&[DET, "<ferme.N:fs>", VERB]))
        .unwrap());
    assert!(!result
        .accepts(&words(&[DET, "<ferme.V:P3s>", VERB]))
        .unwrap());
}

#[test]
fn test_compiled_rule_is_reused() {
    let dir = tempfile::tempdir().unwrap();
    let rule = chain(&["<!>", "<DET>", "<!>", "<V>", "<!>"]);
    write_rule(dir.path(), "det-v", &rule);

    // A stand-in grammar under the .elg name is picked up unchanged.
    let stand_in = chain(&["<ADV>"]);
    save_fst2(dir.path().join("det-v.elg"), "det-v", &stand_in).unwrap();

    let config = CompilerConfig::default();
    let reused = elag::elag::compile_rule_file(&dir.path().join("det-v"), &config).unwrap();
    assert_eq!(reused.state_count(), stand_in.state_count());

    let config = CompilerConfig {
        reuse_compiled_rules: false,
        ..CompilerConfig::default()
    };
    let compiled = elag::elag::compile_rule_file(&dir.path().join("det-v"), &config).unwrap();
    assert!(!compiled.accepts(&words(&[DET, VERB])).unwrap());

    let loaded = load_fst2(dir.path().join("det-v.elg"), &GrammarSymbols).unwrap();
    assert!(loaded.accepts(&words(&["<bien.ADV>"])).unwrap());
}

// ============================================================================
// Compiled grammars against the definition of a rule
// ============================================================================

const CONTEXT_LABELS: &[&str] = &["<A>", "<N>", "<V>", "<DET>", "<.>", "<A:f>", "<N:fs>"];

const TEXT_ATOMS: &[&str] = &[
    "<petite.A:fs>",
    "<grand.A:ms>",
    "<porte.N:fs>",
    "<chat.N:ms>",
    "<mange.V:P3s>",
    "<le.DET>",
];

fn context_strategy() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(CONTEXT_LABELS), 0..3)
}

fn constraint_strategy() -> impl Strategy<Value = (Vec<&'static str>, Vec<&'static str>)> {
    (context_strategy(), context_strategy())
}

/// Whether some split point of `sentence` has the main constraint around
/// it and no side constraint.
fn forbidden(sentence: &[Label], main: &Constraint, sides: &[Constraint]) -> bool {
    let n = sentence.len();
    let left = |c: &Automaton, k: usize| (0..=k).any(|j| c.accepts(&sentence[j..k]).unwrap());
    let right = |c: &Automaton, k: usize| (k..=n).any(|m| c.accepts(&sentence[k..m]).unwrap());
    (0..=n).any(|k| {
        left(&main.left, k)
            && right(&main.right, k)
            && !sides
                .iter()
                .any(|side| left(&side.left, k) && right(&side.right, k))
    })
}

fn constraint((left, right): &(Vec<&str>, Vec<&str>)) -> Constraint {
    Constraint {
        left: chain(left),
        right: chain(right),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn prop_compiled_grammar_matches_rule_definition(
        main in constraint_strategy(),
        sides in prop::collection::vec(constraint_strategy(), 0..3),
        sentences in prop::collection::vec(
            prop::collection::vec(prop::sample::select(TEXT_ATOMS), 0..5),
            1..10,
        ),
    ) {
        let main = constraint(&main);
        let sides: Vec<Constraint> = sides.iter().map(constraint).collect();
        let rule = ElagRule {
            name: "random".to_string(),
            main: main.clone(),
            sides: sides.clone(),
        };
        let grammar = rule.compile().unwrap();

        for tokens in &sentences {
            let sentence = words(tokens);
            prop_assert_eq!(
                grammar.accepts(&sentence).unwrap(),
                !forbidden(&sentence, &main, &sides),
                "{:?}",
                tokens
            );
        }
    }
}
