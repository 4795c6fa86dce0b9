//! The implementation of the table-driven parse engines.
//!
//! Both engines run a whole input string to completion and record one
//! [`Step`] per transition. A rejected string is an ordinary outcome: the
//! engines never return `Err`, they close the trace with a rejection step.

use crate::definition::{PredictiveTable, ShiftReduceAction, ShiftReduceTable};
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ParseOptions {
    /// The number of steps after which a run is abandoned.
    pub max_steps: usize,
}

impl ParseOptions {
    pub const DEFAULT_MAX_STEPS: usize = 10_000;

    pub const fn new() -> Self {
        Self {
            max_steps: Self::DEFAULT_MAX_STEPS,
        }
    }

    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// The reason a parse run rejected its input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown input symbol `{symbol}' at position {position}")]
    UnknownSymbol { symbol: char, position: usize },

    #[error("no action for state {state} on `{symbol}'")]
    NoAction { state: String, symbol: String },

    #[error("stack underflow while applying {rule}")]
    StackUnderflow { rule: String },

    #[error("mismatch: expected `{expected}' but found `{found}'")]
    Mismatch { expected: String, found: String },

    #[error("no production for `{nonterminal}' on `{lookahead}'")]
    NoProduction {
        nonterminal: String,
        lookahead: String,
    },

    #[error("no goto from state {state} on `{symbol}'")]
    NoGoto { state: String, symbol: String },

    #[error("parse did not finish within {limit} steps")]
    StepLimitExceeded { limit: usize },
}

/// An entry of the shift-reduce stack, which alternates states and symbols.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum StackEntry<TState, TSym> {
    State(TState),
    Symbol(TSym),
}

impl<TState: fmt::Display, TSym: fmt::Display> fmt::Display for StackEntry<TState, TSym> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State(state) => fmt::Display::fmt(state, f),
            Self::Symbol(symbol) => fmt::Display::fmt(symbol, f),
        }
    }
}

/// The label of a recorded transition.
#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    Shift,
    Reduce(String),
    Apply(String),
    Match,
    Accept,
    Reject(ParseError),
}

impl fmt::Display for StepAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shift => f.write_str("Shift"),
            Self::Reduce(rule) => write!(f, "Reduce by {}", rule),
            Self::Apply(rule) => write!(f, "Apply {}", rule),
            Self::Match => f.write_str("Match"),
            Self::Accept => f.write_str("Accept"),
            Self::Reject(err) => write!(f, "Error: {}", err),
        }
    }
}

/// A configuration of the engine right before a transition.
#[derive(Debug, Clone)]
pub struct Step<E> {
    pub stack: Vec<E>,
    /// The input not consumed yet, including the end marker.
    pub input: String,
    pub action: StepAction,
}

impl<E: fmt::Display> fmt::Display for Step<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.stack.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", entry)?;
        }
        write!(f, "\t{}\t{}", self.input, self.action)
    }
}

/// The ordered record of a single parse run.
#[derive(Debug, Clone)]
pub struct Trace<E> {
    steps: Vec<Step<E>>,
}

impl<E> Default for Trace<E> {
    fn default() -> Self {
        Self { steps: vec![] }
    }
}

impl<E> Trace<E> {
    pub fn steps(&self) -> &[Step<E>] {
        &self.steps[..]
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last(&self) -> Option<&Step<E>> {
        self.steps.last()
    }

    fn push(&mut self, stack: Vec<E>, input: String, action: StepAction) {
        self.steps.push(Step {
            stack,
            input,
            action,
        });
    }
}

impl<E: fmt::Display> fmt::Display for Trace<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "STACK\tINPUT\tACTION")?;
        for step in &self.steps {
            writeln!(f, "{}", step)?;
        }
        Ok(())
    }
}

/// The result of a parse run.
#[derive(Debug, Clone)]
pub struct ParseOutcome<E> {
    pub accepted: bool,
    pub message: String,
    /// The reason of the rejection, if any.
    pub error: Option<ParseError>,
    pub trace: Trace<E>,
}

impl<E> ParseOutcome<E> {
    fn accept(trace: Trace<E>) -> Self {
        Self {
            accepted: true,
            message: "input accepted".into(),
            error: None,
            trace,
        }
    }

    fn reject(mut trace: Trace<E>, stack: Vec<E>, input: String, error: ParseError) -> Self {
        trace.push(stack, input, StepAction::Reject(error.clone()));
        Self {
            accepted: false,
            message: error.to_string(),
            error: Some(error),
            trace,
        }
    }
}

/// The shift-reduce stack machine driven by a [`ShiftReduceTable`].
#[derive(Debug)]
pub struct ShiftReduceEngine<T> {
    table: T,
    options: ParseOptions,
}

impl<T> ShiftReduceEngine<T>
where
    T: ShiftReduceTable,
{
    pub fn new(table: T) -> Self {
        Self::with_options(table, ParseOptions::default())
    }

    pub fn with_options(table: T, options: ParseOptions) -> Self {
        Self { table, options }
    }

    pub fn parse(&self, input: &str) -> ParseOutcome<StackEntry<T::State, T::Symbol>> {
        let table = &self.table;
        let mut trace = Trace::default();
        let mut stack = vec![StackEntry::State(table.initial_state())];

        let tokens = match tokenize(input, |ch| table.terminal(ch), table.end_marker()) {
            Ok(tokens) => tokens,
            Err(err) => return ParseOutcome::reject(trace, stack, raw_input(input), err),
        };

        let mut pos = 0;
        loop {
            let remaining = remaining(&tokens[pos..]);
            if trace.len() >= self.options.max_steps {
                let err = ParseError::StepLimitExceeded {
                    limit: self.options.max_steps,
                };
                return ParseOutcome::reject(trace, stack, remaining, err);
            }

            let lookahead = tokens[pos];
            let current = match top_state(&stack) {
                Some(current) => current,
                None => {
                    let err = ParseError::StackUnderflow {
                        rule: "the next action".into(),
                    };
                    return ParseOutcome::reject(trace, stack, remaining, err);
                }
            };

            let action = match table.action(current, lookahead) {
                Some(action) => action,
                None => {
                    let err = ParseError::NoAction {
                        state: current.to_string(),
                        symbol: lookahead.to_string(),
                    };
                    return ParseOutcome::reject(trace, stack, remaining, err);
                }
            };

            match action {
                ShiftReduceAction::Accept => {
                    trace.push(stack, remaining, StepAction::Accept);
                    return ParseOutcome::accept(trace);
                }

                ShiftReduceAction::Shift(next) => {
                    trace.push(stack.clone(), remaining, StepAction::Shift);
                    stack.push(StackEntry::Symbol(lookahead));
                    stack.push(StackEntry::State(next));
                    pos += 1;
                }

                ShiftReduceAction::Reduce(rule) => {
                    let rule = table.rule(rule);
                    let label = rule.to_string();

                    // every symbol on the stack is paired with a state.
                    let n = 2 * rule.body.len();
                    if stack.len() <= n {
                        let err = ParseError::StackUnderflow { rule: label };
                        return ParseOutcome::reject(trace, stack, remaining, err);
                    }
                    let snapshot = stack.clone();
                    stack.truncate(stack.len() - n);

                    let next = top_state(&stack).and_then(|top| table.goto(top, rule.head));
                    let next = match next {
                        Some(next) => next,
                        None => {
                            let err = ParseError::NoGoto {
                                state: top_state(&stack)
                                    .map_or_else(|| "<none>".into(), |top| top.to_string()),
                                symbol: rule.head.to_string(),
                            };
                            return ParseOutcome::reject(trace, snapshot, remaining, err);
                        }
                    };
                    stack.push(StackEntry::Symbol(rule.head));
                    stack.push(StackEntry::State(next));
                    trace.push(snapshot, remaining, StepAction::Reduce(label));
                }
            }
        }
    }
}

/// The predictive (LL(1)) stack machine driven by a [`PredictiveTable`].
#[derive(Debug)]
pub struct PredictiveEngine<T> {
    table: T,
    options: ParseOptions,
}

impl<T> PredictiveEngine<T>
where
    T: PredictiveTable,
{
    pub fn new(table: T) -> Self {
        Self::with_options(table, ParseOptions::default())
    }

    pub fn with_options(table: T, options: ParseOptions) -> Self {
        Self { table, options }
    }

    pub fn parse(&self, start: T::Symbol, input: &str) -> ParseOutcome<T::Symbol> {
        let table = &self.table;
        let end = table.end_marker();
        let mut trace = Trace::default();
        let mut stack = vec![end, start];

        let tokens = match tokenize(input, |ch| table.terminal(ch), end) {
            Ok(tokens) => tokens,
            Err(err) => return ParseOutcome::reject(trace, stack, raw_input(input), err),
        };

        let mut pos = 0;
        loop {
            let remaining = remaining(&tokens[pos..]);
            if trace.len() >= self.options.max_steps {
                let err = ParseError::StepLimitExceeded {
                    limit: self.options.max_steps,
                };
                return ParseOutcome::reject(trace, stack, remaining, err);
            }

            let lookahead = tokens[pos];
            let top = match stack.last() {
                Some(&top) => top,
                None => {
                    let err = ParseError::StackUnderflow {
                        rule: "the next expansion".into(),
                    };
                    return ParseOutcome::reject(trace, stack, remaining, err);
                }
            };

            if top == end && lookahead == end {
                trace.push(stack, remaining, StepAction::Accept);
                return ParseOutcome::accept(trace);
            }

            if top == end || !table.is_nonterminal(top) {
                if top != lookahead {
                    let err = ParseError::Mismatch {
                        expected: top.to_string(),
                        found: lookahead.to_string(),
                    };
                    return ParseOutcome::reject(trace, stack, remaining, err);
                }
                trace.push(stack.clone(), remaining, StepAction::Match);
                stack.pop();
                pos += 1;
                continue;
            }

            let rule = match table.predict(top, lookahead) {
                Some(rule) => table.rule(rule),
                None => {
                    let err = ParseError::NoProduction {
                        nonterminal: top.to_string(),
                        lookahead: lookahead.to_string(),
                    };
                    return ParseOutcome::reject(trace, stack, remaining, err);
                }
            };
            trace.push(stack.clone(), remaining, StepAction::Apply(rule.to_string()));
            stack.pop();
            stack.extend(rule.body.iter().rev().copied());
        }
    }
}

/// Convert the input string into terminal symbols followed by the end marker.
///
/// Whitespace is skipped; `position` of an unknown symbol counts symbols only.
fn tokenize<S, F>(input: &str, terminal: F, end: S) -> Result<Vec<S>, ParseError>
where
    F: Fn(char) -> Option<S>,
{
    let mut tokens = Vec::with_capacity(input.len() + 1);
    for (position, symbol) in input.chars().filter(|ch| !ch.is_whitespace()).enumerate() {
        let token = terminal(symbol).ok_or(ParseError::UnknownSymbol { symbol, position })?;
        tokens.push(token);
    }
    tokens.push(end);
    Ok(tokens)
}

fn remaining<S: fmt::Display>(tokens: &[S]) -> String {
    tokens.iter().map(ToString::to_string).collect()
}

fn raw_input(input: &str) -> String {
    let mut raw: String = input.chars().filter(|ch| !ch.is_whitespace()).collect();
    raw.push('$');
    raw
}

fn top_state<TState: Copy, TSym>(stack: &[StackEntry<TState, TSym>]) -> Option<TState> {
    match stack.last()? {
        StackEntry::State(state) => Some(*state),
        StackEntry::Symbol(..) => None,
    }
}
