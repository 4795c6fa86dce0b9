//! The shift-reduce action/goto table.

use crate::{
    grammar::{Grammar, Production, Symbol},
    lr1::{Automaton, StateID},
    types::Map,
};
use gramlab_runtime::{Rule, ShiftReduceAction, ShiftReduceTable};
use std::fmt;

/// An entry of the action/goto table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    Shift(StateID),
    /// Reduce by the production at the specified index.
    Reduce(usize),
    Goto(StateID),
    Accept,
}

// `s3`, `r2`, `5` (goto) or `Accept`.
impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shift(id) => write!(f, "s{}", id),
            Self::Reduce(production) => write!(f, "r{}", production),
            Self::Goto(id) => write!(f, "{}", id),
            Self::Accept => f.write_str("Accept"),
        }
    }
}

/// A table cell whose earlier entry was replaced by a later, different one.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Overwrite {
    pub state: StateID,
    pub symbol: Symbol,
    pub previous: Action,
    pub current: Action,
}

impl fmt::Display for Overwrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "state {} on `{}': `{}' overwritten by `{}'",
            self.state, self.symbol, self.previous, self.current
        )
    }
}

/// The shift-reduce table compiled from a canonical LR(1) automaton.
///
/// Conflicting entries are not resolved: the entry written last wins, and
/// every replacement is recorded in [`ParsingTable::overwrites`].
#[derive(Debug)]
pub struct ParsingTable {
    productions: Vec<Production>,
    terminals: Vec<char>,
    nonterminals: Vec<char>,
    rows: Vec<Map<Symbol, Action>>,
    overwrites: Vec<Overwrite>,
}

impl ParsingTable {
    /// Compile the table of an augmented grammar.
    pub fn generate(g: &Grammar, automaton: &Automaton) -> Self {
        let mut table = Self {
            productions: g.productions().to_vec(),
            terminals: g.terminals().collect(),
            nonterminals: g.nonterminals().collect(),
            rows: Vec::with_capacity(automaton.len()),
            overwrites: vec![],
        };

        for state in automaton.states() {
            let mut row = Map::default();
            for item in state.items().items() {
                let production = g.production(item.production);

                match item.next_symbol(g) {
                    None if Some(production.head()) == g.augmented_start() => {
                        table.write(&mut row, state.id(), Symbol::EndMarker, Action::Accept);
                    }

                    None => {
                        let index = g
                            .find_production(production.head(), production.body())
                            .unwrap_or(item.production);
                        for lookahead in &item.lookahead {
                            table.write(&mut row, state.id(), *lookahead, Action::Reduce(index));
                        }
                    }

                    Some(symbol) => {
                        let target = match state.transition(symbol) {
                            Some(target) => target,
                            None => continue,
                        };
                        let action = match symbol {
                            Symbol::NonTerminal(..) => Action::Goto(target),
                            _ => Action::Shift(target),
                        };
                        table.write(&mut row, state.id(), symbol, action);
                    }
                }
            }
            table.rows.push(row);
        }

        tracing::debug!(
            "compiled {} row(s), {} overwritten cell(s)",
            table.rows.len(),
            table.overwrites.len()
        );

        table
    }

    fn write(
        &mut self,
        row: &mut Map<Symbol, Action>,
        state: StateID,
        symbol: Symbol,
        action: Action,
    ) {
        if let Some(previous) = row.insert(symbol, action) {
            if previous != action {
                let overwrite = Overwrite {
                    state,
                    symbol,
                    previous,
                    current: action,
                };
                tracing::warn!("conflict: {}", overwrite);
                self.overwrites.push(overwrite);
            }
        }
    }

    /// Return the entry at the specified cell.
    pub fn get(&self, state: StateID, symbol: Symbol) -> Option<Action> {
        self.rows.get(state.into_raw())?.get(&symbol).copied()
    }

    /// The columns of the table: terminals, `$` and then nonterminals.
    pub fn columns(&self) -> Vec<Symbol> {
        self.terminals
            .iter()
            .map(|t| Symbol::Terminal(*t))
            .chain(Some(Symbol::EndMarker))
            .chain(self.nonterminals.iter().map(|n| Symbol::NonTerminal(*n)))
            .collect()
    }

    pub fn num_states(&self) -> usize {
        self.rows.len()
    }

    /// The replaced cells, in the order they were detected.
    pub fn overwrites(&self) -> &[Overwrite] {
        &self.overwrites[..]
    }

    pub fn production(&self, index: usize) -> &Production {
        &self.productions[index]
    }
}

// Tab-separated rows, headed by `State` and the columns.
impl fmt::Display for ParsingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self.columns();

        f.write_str("State")?;
        for column in &columns {
            write!(f, "\t{}", column)?;
        }
        writeln!(f)?;

        for (i, row) in self.rows.iter().enumerate() {
            write!(f, "{}", i)?;
            for column in &columns {
                f.write_str("\t")?;
                if let Some(action) = row.get(column) {
                    write!(f, "{}", action)?;
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl ShiftReduceTable for ParsingTable {
    type State = StateID;
    type Symbol = Symbol;
    type Rule = usize;

    fn initial_state(&self) -> StateID {
        StateID::START
    }

    fn end_marker(&self) -> Symbol {
        Symbol::EndMarker
    }

    fn terminal(&self, ch: char) -> Option<Symbol> {
        self.terminals.contains(&ch).then_some(Symbol::Terminal(ch))
    }

    fn action(
        &self,
        current: StateID,
        lookahead: Symbol,
    ) -> Option<ShiftReduceAction<StateID, usize>> {
        match self.get(current, lookahead)? {
            Action::Shift(next) => Some(ShiftReduceAction::Shift(next)),
            Action::Reduce(production) => Some(ShiftReduceAction::Reduce(production)),
            Action::Accept => Some(ShiftReduceAction::Accept),
            Action::Goto(..) => None,
        }
    }

    fn goto(&self, current: StateID, symbol: Symbol) -> Option<StateID> {
        match self.get(current, symbol)? {
            Action::Goto(next) => Some(next),
            _ => None,
        }
    }

    fn rule(&self, rule: usize) -> Rule<'_, Symbol> {
        let production = &self.productions[rule];
        Rule {
            head: production.head_symbol(),
            body: production.body(),
        }
    }
}
