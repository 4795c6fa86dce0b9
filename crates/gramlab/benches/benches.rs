use std::{env, fs, path::PathBuf};

use criterion::{criterion_group, criterion_main, Criterion};
use gramlab::{FirstFollow, Grammar, LL1Analysis, ShiftReduceAnalysis};

criterion_main!(benches);
criterion_group!(benches, bench_arithmetic, bench_misc, bench_precedence);

fn bench_arithmetic(c: &mut Criterion) {
    bench_analysis(c, "arithmetic");
    bench_analysis(c, "ll1_arithmetic");
}

fn bench_misc(c: &mut Criterion) {
    bench_analysis(c, "epsilon");
    bench_analysis(c, "lr1_not_lalr");
    bench_analysis(c, "ambiguous");
    bench_analysis(c, "balanced");
}

// A left-recursive ladder of binary operators, one nonterminal per level.
fn bench_precedence(c: &mut Criterion) {
    const OPERATORS: &str = "+-*/%^&|";
    let grammar = Grammar::define(|g| {
        let levels: Vec<char> = ('A'..='Z').take(OPERATORS.len() + 1).collect();
        for (op, level) in OPERATORS.chars().zip(levels.windows(2)) {
            let (head, next) = (level[0], level[1]);
            g.rule(head, &format!("{}{}{}", head, op, next))?;
            g.rule(head, &next.to_string())?;
        }
        let last = levels[levels.len() - 1];
        g.rule(last, "(A)")?;
        g.rule(last, "i")?;
        Ok(())
    })
    .unwrap();

    bench_grammar(c, "precedence", &grammar);
}

fn bench_analysis(c: &mut Criterion, grammar_name: &str) {
    let project_root = env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .expect("missing environment variable: `CARGO_MANIFEST_DIR'");
    let source =
        fs::read_to_string(project_root.join(format!("tests/grammars/{}.grammar", grammar_name)))
            .unwrap();
    let grammar = Grammar::parse(&source).unwrap();
    bench_grammar(c, grammar_name, &grammar);
}

fn bench_grammar(c: &mut Criterion, grammar_name: &str, grammar: &Grammar) {
    let mut group = c.benchmark_group(grammar_name);
    group.bench_function("FirstFollow", |b| {
        b.iter(|| FirstFollow::new(grammar));
    });
    group.bench_function("LR1", |b| {
        b.iter(|| ShiftReduceAnalysis::new(grammar));
    });
    group.bench_function("LL1", |b| {
        b.iter(|| LL1Analysis::new(grammar));
    });
    group.finish();
}
