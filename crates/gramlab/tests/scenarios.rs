use gramlab::{
    analyze_ll1, analyze_shift_reduce,
    runtime::{ParseError, StepAction},
    AnalysisError, Grammar, GrammarError, ShiftReduceAnalysis, Symbol,
};

const EXPRESSION: &str = "\
E->E+T
E->T
T->T*F
T->F
F->(E)
F->id
";

const LL1_EXPRESSION: &str = "\
E->TX
X->+TX
X->ϵ
T->FY
Y->*FY
Y->ϵ
F->(E)
F->id
";

fn show(set: Option<&gramlab::SymbolSet>) -> Vec<String> {
    set.unwrap().iter().map(|s| s.to_string()).collect()
}

#[test]
fn expression_grammar_accepts() {
    let analysis = analyze_shift_reduce(EXPRESSION).unwrap();
    let outcome = analysis.parse("id+id*id");
    assert!(outcome.accepted, "{}", outcome.message);

    let steps = outcome.trace.steps();
    assert_eq!(steps[0].input, "id+id*id$");
    assert_eq!(steps[0].stack.len(), 1);
    assert_eq!(steps[0].action, StepAction::Shift);
    assert_eq!(outcome.trace.last().unwrap().action, StepAction::Accept);
    assert!(steps
        .iter()
        .any(|step| step.action == StepAction::Reduce("T->T*F".into())));
}

#[test]
fn epsilon_grammar() {
    let source = "S->AB\nA->a\nA->ϵ\nB->b";
    let analysis = analyze_ll1(source).unwrap();
    let sets = analysis.sets();
    assert_eq!(show(sets.first('A')), ["a", "ϵ"]);
    assert_eq!(show(sets.follow('A')), ["b"]);
    assert_eq!(show(sets.first('B')), ["b"]);

    let table = analysis.table();
    let cell = |head, t| table.entry(head, Symbol::Terminal(t)).map(|p| p.to_string());
    assert_eq!(cell('A', 'a').as_deref(), Some("A->a"));
    assert_eq!(cell('A', 'b').as_deref(), Some("A->ϵ"));
    assert_eq!(cell('B', 'b').as_deref(), Some("B->b"));

    let outcome = analysis.parse("b");
    assert!(outcome.accepted, "{}", outcome.message);
    let labels: Vec<String> = outcome
        .trace
        .steps()
        .iter()
        .map(|step| step.action.to_string())
        .collect();
    assert_eq!(labels, ["Apply S->AB", "Apply A->ϵ", "Apply B->b", "Match", "Accept"]);
}

#[test]
fn expression_grammar_rejects() {
    let analysis = analyze_shift_reduce(EXPRESSION).unwrap();
    let outcome = analysis.parse("id+");
    assert!(!outcome.accepted);
    assert!(matches!(
        outcome.error,
        Some(ParseError::NoAction { ref symbol, .. }) if symbol == "$"
    ));
    assert!(outcome.message.starts_with("no action"), "{}", outcome.message);

    let last = outcome.trace.last().unwrap();
    assert_eq!(last.input, "$");
    assert!(matches!(last.action, StepAction::Reject(..)));
}

#[test]
fn syntax_error() {
    let err = analyze_shift_reduce("E->E+T\nE T").err().unwrap();
    assert!(matches!(
        err,
        AnalysisError::Grammar(GrammarError::Syntax { line: 2, .. })
    ));
    assert!(matches!(
        analyze_ll1("").err().unwrap(),
        AnalysisError::Grammar(GrammarError::Empty)
    ));
}

#[test]
fn unknown_input_symbol() {
    let analysis = analyze_shift_reduce(EXPRESSION).unwrap();
    let outcome = analysis.parse("id-id");
    assert_eq!(
        outcome.error,
        Some(ParseError::UnknownSymbol {
            symbol: '-',
            position: 2,
        })
    );
}

#[test]
fn ll1_expression_grammar() {
    let analysis = analyze_ll1(LL1_EXPRESSION).unwrap();
    let outcome = analysis.parse("id+id*id");
    assert!(outcome.accepted, "{}", outcome.message);

    let outcome = analysis.parse("id+*id");
    assert!(matches!(
        outcome.error,
        Some(ParseError::NoProduction { ref nonterminal, ref lookahead })
            if nonterminal == "T" && lookahead == "*"
    ));
}

#[test]
fn ll1_conflicts() {
    let conflict = |source: &str| match analyze_ll1(source) {
        Err(AnalysisError::NotLL1(err)) => (err.head, err.terminal),
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    };
    assert_eq!(conflict("S->a\nS->a"), ('S', Symbol::Terminal('a')));
    assert_eq!(conflict("S->aAa\nA->a\nA->ϵ"), ('A', Symbol::Terminal('a')));
    assert_eq!(conflict(EXPRESSION), ('E', Symbol::Terminal('(')));
}

#[test]
fn deterministic_states() {
    let first = analyze_shift_reduce(EXPRESSION).unwrap();
    let second = analyze_shift_reduce(EXPRESSION).unwrap();
    assert_eq!(first.automaton().len(), second.automaton().len());
    assert_eq!(
        first.automaton().display(first.grammar()).to_string(),
        second.automaton().display(second.grammar()).to_string()
    );
    assert_eq!(first.table().to_string(), second.table().to_string());
}

#[test]
fn ambiguous_grammar_is_reported_not_fixed() {
    let analysis = analyze_shift_reduce("E->E+E\nE->a").unwrap();
    assert!(!analysis.table().overwrites().is_empty());
    assert!(analysis.parse("a+a+a").accepted);
}

#[test]
fn start_symbol_exhausted() {
    let source: String = ('A'..='Z')
        .map(|ch| format!("{}->{}\n", ch, ch.to_ascii_lowercase()))
        .collect();
    assert!(Grammar::parse(&source).is_ok());
    assert!(matches!(
        analyze_shift_reduce(&source).err().unwrap(),
        AnalysisError::Grammar(GrammarError::StartSymbolExhausted)
    ));
    // the LL(1) analysis does not augment the grammar.
    assert!(analyze_ll1(&source).is_ok());
}

#[test]
fn lookahead_past_nullable_symbol() {
    let analysis = analyze_shift_reduce("S->ABc\nA->a\nB->b\nB->").unwrap();
    assert_eq!(show(analysis.sets().follow('A')), ["b", "c"]);
    assert_eq!(show(analysis.sets().follow('B')), ["c"]);

    for input in ["ac", "abc"] {
        let outcome = analysis.parse(input);
        assert!(outcome.accepted, "{:?}: {}", input, outcome.message);
    }
    assert!(!analysis.parse("a").accepted);
}

#[test]
fn grammar_built_in_code() {
    let grammar = Grammar::define(|g| {
        g.rule('E', "E+T")?;
        g.rule('E', "T")?;
        g.rule('T', "(E)")?;
        g.rule('T', "i")?;
        Ok(())
    })
    .unwrap();
    let parsed = Grammar::parse("E->E+T\nE->T\nT->(E)\nT->i").unwrap();
    assert_eq!(grammar.to_string(), parsed.to_string());

    let analysis = ShiftReduceAnalysis::new(&grammar).unwrap();
    assert!(analysis.parse("(i+i)+i").accepted);
    assert!(analysis.table().overwrites().is_empty());
}
