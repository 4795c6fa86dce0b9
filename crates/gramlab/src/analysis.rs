//! Entry points that run a whole analysis from grammar text.

use crate::{
    first_follow::FirstFollow,
    grammar::{Grammar, GrammarError, Symbol},
    ll1::{LL1ConflictError, LL1Table},
    lr1::{Automaton, StateID},
    table::ParsingTable,
};
use gramlab_runtime::{
    ParseOptions, ParseOutcome, PredictiveEngine, ShiftReduceEngine, StackEntry,
};

pub type ShiftReduceOutcome = ParseOutcome<StackEntry<StateID, Symbol>>;
pub type PredictiveOutcome = ParseOutcome<Symbol>;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AnalysisError {
    #[error("failed to read the grammar")]
    Grammar(
        #[from]
        #[source]
        GrammarError,
    ),

    #[error("grammar is not LL(1): conflict at ({}, {})", .0.head, .0.terminal)]
    NotLL1(
        #[from]
        #[source]
        LL1ConflictError,
    ),
}

/// The artifacts of the shift-reduce analysis of a grammar.
#[derive(Debug)]
pub struct ShiftReduceAnalysis {
    grammar: Grammar,
    sets: FirstFollow,
    automaton: Automaton,
    table: ParsingTable,
}

impl ShiftReduceAnalysis {
    /// Analyze an already parsed grammar.
    ///
    /// The FIRST/FOLLOW sets are solved on the grammar as written, and the
    /// automaton is built on its augmented form.
    pub fn new(grammar: &Grammar) -> Result<Self, GrammarError> {
        let sets = FirstFollow::new(grammar);
        let grammar = grammar.augment()?;
        let automaton = Automaton::build(&grammar, &sets);
        let table = ParsingTable::generate(&grammar, &automaton);
        Ok(Self {
            grammar,
            sets,
            automaton,
            table,
        })
    }

    /// The augmented grammar the automaton is built on.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn sets(&self) -> &FirstFollow {
        &self.sets
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    pub fn table(&self) -> &ParsingTable {
        &self.table
    }

    pub fn parse(&self, input: &str) -> ShiftReduceOutcome {
        run_shift_reduce_parse(&self.table, input)
    }
}

/// The artifacts of the LL(1) analysis of a grammar.
#[derive(Debug)]
pub struct LL1Analysis {
    grammar: Grammar,
    sets: FirstFollow,
    table: LL1Table,
}

impl LL1Analysis {
    pub fn new(grammar: &Grammar) -> Result<Self, LL1ConflictError> {
        let sets = FirstFollow::new(grammar);
        let table = LL1Table::generate(grammar, &sets)?;
        Ok(Self {
            grammar: grammar.clone(),
            sets,
            table,
        })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn sets(&self) -> &FirstFollow {
        &self.sets
    }

    pub fn table(&self) -> &LL1Table {
        &self.table
    }

    pub fn parse(&self, input: &str) -> PredictiveOutcome {
        run_predictive_parse(&self.table, self.grammar.start_symbol(), input)
    }
}

/// Read the grammar text and compile its canonical LR(1) table.
pub fn analyze_shift_reduce(source: &str) -> Result<ShiftReduceAnalysis, AnalysisError> {
    let grammar = Grammar::parse(source)?;
    Ok(ShiftReduceAnalysis::new(&grammar)?)
}

/// Read the grammar text and compile its LL(1) table.
pub fn analyze_ll1(source: &str) -> Result<LL1Analysis, AnalysisError> {
    let grammar = Grammar::parse(source)?;
    Ok(LL1Analysis::new(&grammar)?)
}

pub fn run_shift_reduce_parse(table: &ParsingTable, input: &str) -> ShiftReduceOutcome {
    run_shift_reduce_parse_with(table, input, ParseOptions::default())
}

pub fn run_shift_reduce_parse_with(
    table: &ParsingTable,
    input: &str,
    options: ParseOptions,
) -> ShiftReduceOutcome {
    let outcome = ShiftReduceEngine::with_options(table, options).parse(input);
    tracing::debug!(
        "shift-reduce parse of {:?}: {} ({} step(s))",
        input,
        outcome.message,
        outcome.trace.len()
    );
    outcome
}

pub fn run_predictive_parse(table: &LL1Table, start: char, input: &str) -> PredictiveOutcome {
    run_predictive_parse_with(table, start, input, ParseOptions::default())
}

pub fn run_predictive_parse_with(
    table: &LL1Table,
    start: char,
    input: &str,
    options: ParseOptions,
) -> PredictiveOutcome {
    let outcome =
        PredictiveEngine::with_options(table, options).parse(Symbol::NonTerminal(start), input);
    tracing::debug!(
        "predictive parse of {:?}: {} ({} step(s))",
        input,
        outcome.message,
        outcome.trace.len()
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_reduce_smoketest() {
        let analysis = analyze_shift_reduce("S->aS\nS->b").unwrap();
        assert_eq!(analysis.grammar().augmented_start(), Some('Z'));
        assert_eq!(analysis.automaton().len(), analysis.table().num_states());
        assert!(analysis.sets().first('Z').is_none());

        let outcome = analysis.parse("aab");
        assert!(outcome.accepted, "{}", outcome.message);
        assert!(outcome.error.is_none());
    }

    #[test]
    fn ll1_smoketest() {
        let analysis = analyze_ll1("S->aS\nS->b").unwrap();
        let outcome = analysis.parse("ab");
        assert!(outcome.accepted, "{}", outcome.message);
        assert_eq!(analysis.table().start_symbol(), 'S');
    }

    #[test]
    fn errors() {
        assert!(matches!(
            analyze_shift_reduce("S"),
            Err(AnalysisError::Grammar(GrammarError::Syntax { .. }))
        ));
        assert!(matches!(
            analyze_ll1("S->a\nS->a"),
            Err(AnalysisError::NotLL1(LL1ConflictError { head: 'S', .. }))
        ));
    }

    #[test]
    fn ll1_conflict_message() {
        let err = analyze_ll1("S->Aa\nA->a\nA->").unwrap_err();
        assert_eq!(err.to_string(), "grammar is not LL(1): conflict at (A, a)");
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "conflict at (A, a): `A->a' and `A->ϵ'");
    }

    #[test]
    fn step_limit() {
        let analysis = analyze_shift_reduce("S->aS\nS->b").unwrap();
        let outcome =
            run_shift_reduce_parse_with(analysis.table(), "aaab", ParseOptions::new().max_steps(3));
        assert!(!outcome.accepted);
        assert_eq!(outcome.trace.len(), 4);
    }
}
