//! Determinization and rule compilation benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use elag::determinize::{determinize_disjoint, determinize_general};
use elag::prelude::*;

const OVERLAPPING: &[&str] = &["<.>", "<A>", "<A:f>", "<A:fs>", "<N>", "<N:p>", "<V>", "<V:K>"];
const DISJOINT: &[&str] = &["<A:fs>", "<A:mp>", "<N:fs>", "<N:mp>", "<V:W>", "<DET>", "<ADV>"];

/// `n` states, each reading every label towards the next two states.
fn ladder(n: usize, labels: &[&str]) -> Automaton {
    let labels: Vec<Label> = labels.iter().map(|s| Label::parse(s).unwrap()).collect();
    let mut a = Automaton::with_capacity(n);
    for i in 0..n {
        let flags = match (i == 0, i + 1 == n) {
            (true, _) => StateFlags::INITIAL,
            (false, true) => StateFlags::FINAL,
            (false, false) => StateFlags::NONE,
        };
        a.new_state(flags);
    }
    for i in 0..n {
        for (k, label) in labels.iter().enumerate() {
            let target = (i + 1 + k % 2).min(n - 1);
            a.add_transition(i, Some(label.clone()), target).unwrap();
        }
    }
    a
}

fn bench_determinize(c: &mut Criterion) {
    let mut group = c.benchmark_group("determinize");
    for n in [4, 8, 16] {
        let overlapping = ladder(n, OVERLAPPING);
        group.bench_with_input(BenchmarkId::new("general", n), &overlapping, |b, a| {
            b.iter(|| determinize_general(black_box(a)).unwrap());
        });

        let disjoint = ladder(n, DISJOINT);
        group.bench_with_input(BenchmarkId::new("disjoint", n), &disjoint, |b, a| {
            b.iter(|| determinize_disjoint(black_box(a)).unwrap());
        });
    }
    group.finish();
}

fn rule(symbols: &[&str], side: Option<(&str, &str)>) -> Automaton {
    let mut a = Automaton::new();
    let mut q = a.new_state(StateFlags::INITIAL);
    for s in symbols {
        let next = a.new_state(StateFlags::NONE);
        a.add_transition(q, Some(Label::parse(s).unwrap()), next).unwrap();
        q = next;
    }
    a.set_final(q, true).unwrap();
    if let Some((left, right)) = side {
        let mut p = 0;
        for s in ["<=>", left, "<=>", right, "<=>"] {
            let next = a.new_state(StateFlags::NONE);
            a.add_transition(p, Some(Label::parse(s).unwrap()), next).unwrap();
            p = next;
        }
        a.set_final(p, true).unwrap();
    }
    a
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_rule");
    let main_only = rule(&["<!>", "<DET>", "<!>", "<V>", "<!>"], None);
    group.bench_function("main_only", |b| {
        b.iter(|| {
            ElagRule::split("det-v", black_box(&main_only))
                .unwrap()
                .compile()
                .unwrap()
        });
    });

    let with_side = rule(&["<!>", "<DET>", "<!>", "<.>", "<!>"], Some(("<DET>", "<N>")));
    group.bench_function("one_side_constraint", |b| {
        b.iter(|| {
            ElagRule::split("det-n", black_box(&with_side))
                .unwrap()
                .compile()
                .unwrap()
        });
    });
    group.finish();
}

criterion_group!(benches, bench_determinize, bench_compile);
criterion_main!(benches);
