//! Parse table definitions.

use std::fmt;

/// The trait for abstracting a compiled shift-reduce (LR) parse table.
pub trait ShiftReduceTable {
    /// The number to identify the state of the automaton.
    type State: Copy + fmt::Display;

    /// The number to identify the terminal/nonterminal symbols.
    type Symbol: Copy + PartialEq + fmt::Display;

    /// The identifier of a production rule referenced by reduce actions.
    type Rule: Copy;

    /// Return the initial state number.
    fn initial_state(&self) -> Self::State;

    /// Return the symbol appended to the input as the end marker.
    fn end_marker(&self) -> Self::Symbol;

    /// Map an input character to a terminal symbol, if the grammar knows it.
    fn terminal(&self, ch: char) -> Option<Self::Symbol>;

    /// Return the action corresponding to the specified state number and
    /// lookahead symbol, or `None` for an empty cell.
    fn action(
        &self,
        current: Self::State,
        lookahead: Self::Symbol,
    ) -> Option<ShiftReduceAction<Self::State, Self::Rule>>;

    /// Return the destination of the goto entry for a nonterminal symbol.
    fn goto(&self, current: Self::State, symbol: Self::Symbol) -> Option<Self::State>;

    /// Return the production rule referenced by a reduce action.
    fn rule(&self, rule: Self::Rule) -> Rule<'_, Self::Symbol>;
}

impl<T: ?Sized> ShiftReduceTable for &T
where
    T: ShiftReduceTable,
{
    type State = T::State;
    type Symbol = T::Symbol;
    type Rule = T::Rule;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn end_marker(&self) -> Self::Symbol {
        (**self).end_marker()
    }

    fn terminal(&self, ch: char) -> Option<Self::Symbol> {
        (**self).terminal(ch)
    }

    fn action(
        &self,
        current: Self::State,
        lookahead: Self::Symbol,
    ) -> Option<ShiftReduceAction<Self::State, Self::Rule>> {
        (**self).action(current, lookahead)
    }

    fn goto(&self, current: Self::State, symbol: Self::Symbol) -> Option<Self::State> {
        (**self).goto(current, symbol)
    }

    fn rule(&self, rule: Self::Rule) -> Rule<'_, Self::Symbol> {
        (**self).rule(rule)
    }
}

/// The trait for abstracting a compiled LL(1) predictive table.
pub trait PredictiveTable {
    type Symbol: Copy + PartialEq + fmt::Display;
    type Rule: Copy;

    fn end_marker(&self) -> Self::Symbol;

    fn terminal(&self, ch: char) -> Option<Self::Symbol>;

    fn is_nonterminal(&self, symbol: Self::Symbol) -> bool;

    /// Return the production to expand `head` with when `lookahead` is the
    /// current input symbol.
    fn predict(&self, head: Self::Symbol, lookahead: Self::Symbol) -> Option<Self::Rule>;

    fn rule(&self, rule: Self::Rule) -> Rule<'_, Self::Symbol>;
}

impl<T: ?Sized> PredictiveTable for &T
where
    T: PredictiveTable,
{
    type Symbol = T::Symbol;
    type Rule = T::Rule;

    fn end_marker(&self) -> Self::Symbol {
        (**self).end_marker()
    }

    fn terminal(&self, ch: char) -> Option<Self::Symbol> {
        (**self).terminal(ch)
    }

    fn is_nonterminal(&self, symbol: Self::Symbol) -> bool {
        (**self).is_nonterminal(symbol)
    }

    fn predict(&self, head: Self::Symbol, lookahead: Self::Symbol) -> Option<Self::Rule> {
        (**self).predict(head, lookahead)
    }

    fn rule(&self, rule: Self::Rule) -> Rule<'_, Self::Symbol> {
        (**self).rule(rule)
    }
}

/// An entry of a shift-reduce table as seen by the engine.
#[derive(Debug, Copy, Clone, PartialEq)]
#[non_exhaustive]
pub enum ShiftReduceAction<TState, TRule> {
    /// Read a lookahead symbol and transition to the specified state.
    Shift(TState),

    /// Reduce to the specified production rule.
    Reduce(TRule),

    Accept,
}

/// A borrowed view of a production rule.
#[derive(Debug, Copy, Clone)]
pub struct Rule<'a, TSym> {
    pub head: TSym,
    pub body: &'a [TSym],
}

// `"A->aB"`, or `"A->ϵ"` for the empty body.
impl<TSym: fmt::Display> fmt::Display for Rule<'_, TSym> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->", self.head)?;
        if self.body.is_empty() {
            return f.write_str("ϵ");
        }
        for symbol in self.body {
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}
