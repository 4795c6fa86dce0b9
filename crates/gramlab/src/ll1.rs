//! The LL(1) predictive table.

use crate::{
    first_follow::FirstFollow,
    grammar::{Grammar, Production, Symbol},
    types::Map,
};
use gramlab_runtime::{PredictiveTable, Rule};
use std::fmt;

/// Two productions compete for the same cell of the predictive table.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("conflict at ({head}, {terminal}): `{existing}' and `{incoming}'")]
pub struct LL1ConflictError {
    pub head: char,
    pub terminal: Symbol,
    pub existing: Production,
    pub incoming: Production,
}

#[derive(Debug)]
pub struct LL1Table {
    productions: Vec<Production>,
    terminals: Vec<char>,
    nonterminals: Vec<char>,
    start: char,
    cells: Map<char, Map<Symbol, usize>>,
}

impl LL1Table {
    /// Compile the table, aborting at the first cell written twice.
    pub fn generate(g: &Grammar, sets: &FirstFollow) -> Result<Self, LL1ConflictError> {
        let mut table = Self {
            productions: g.productions().to_vec(),
            terminals: g.terminals().collect(),
            nonterminals: g.nonterminals().collect(),
            start: g.start_symbol(),
            cells: g.nonterminals().map(|n| (n, Map::default())).collect(),
        };

        for (index, production) in g.productions().iter().enumerate() {
            let first = sets.first_of_sequence(production.body());
            for terminal in first.iter().filter(|s| **s != Symbol::Epsilon) {
                table.insert(production.head(), *terminal, index)?;
            }

            if first.contains(&Symbol::Epsilon) {
                let follow = sets.follow(production.head()).into_iter().flatten();
                for terminal in follow {
                    table.insert(production.head(), *terminal, index)?;
                }
            }
        }

        tracing::debug!(
            "compiled LL(1) table with {} entr(ies)",
            table.cells.values().map(|row| row.len()).sum::<usize>()
        );

        Ok(table)
    }

    fn insert(
        &mut self,
        head: char,
        terminal: Symbol,
        index: usize,
    ) -> Result<(), LL1ConflictError> {
        let row = self.cells.entry(head).or_default();
        if let Some(&existing) = row.get(&terminal) {
            return Err(LL1ConflictError {
                head,
                terminal,
                existing: self.productions[existing].clone(),
                incoming: self.productions[index].clone(),
            });
        }
        tracing::trace!("M[{}, {}] = {}", head, terminal, self.productions[index]);
        row.insert(terminal, index);
        Ok(())
    }

    /// Return the index of the production at the specified cell.
    pub fn get(&self, head: char, lookahead: Symbol) -> Option<usize> {
        self.cells.get(&head)?.get(&lookahead).copied()
    }

    /// Return the production at the specified cell.
    pub fn entry(&self, head: char, lookahead: Symbol) -> Option<&Production> {
        self.get(head, lookahead).map(|index| &self.productions[index])
    }

    pub fn production(&self, index: usize) -> &Production {
        &self.productions[index]
    }

    pub fn start_symbol(&self) -> char {
        self.start
    }
}

// Tab-separated rows, headed by `Non-Terminal`, the terminals and `$`.
impl fmt::Display for LL1Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<Symbol> = self
            .terminals
            .iter()
            .map(|t| Symbol::Terminal(*t))
            .chain(Some(Symbol::EndMarker))
            .collect();

        f.write_str("Non-Terminal")?;
        for column in &columns {
            write!(f, "\t{}", column)?;
        }
        writeln!(f)?;

        for nonterminal in &self.nonterminals {
            write!(f, "{}", nonterminal)?;
            for column in &columns {
                f.write_str("\t")?;
                if let Some(production) = self.entry(*nonterminal, *column) {
                    write!(f, "{}", production)?;
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl PredictiveTable for LL1Table {
    type Symbol = Symbol;
    type Rule = usize;

    fn end_marker(&self) -> Symbol {
        Symbol::EndMarker
    }

    fn terminal(&self, ch: char) -> Option<Symbol> {
        self.terminals.contains(&ch).then_some(Symbol::Terminal(ch))
    }

    fn is_nonterminal(&self, symbol: Symbol) -> bool {
        symbol.is_nonterminal()
    }

    fn predict(&self, head: Symbol, lookahead: Symbol) -> Option<usize> {
        self.get(head.as_char()?, lookahead)
    }

    fn rule(&self, rule: usize) -> Rule<'_, Symbol> {
        let production = &self.productions[rule];
        Rule {
            head: production.head_symbol(),
            body: production.body(),
        }
    }
}
