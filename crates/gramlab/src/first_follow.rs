//! Calculation of FIRST and FOLLOW sets.

use crate::{
    grammar::{Grammar, Symbol},
    types::{Map, Set},
    util::{display_fn, join},
};
use std::{collections::BTreeSet, fmt};

/// A set of symbols, iterated in the reporting order of [`Symbol`].
pub type SymbolSet = BTreeSet<Symbol>;

/// The FIRST and FOLLOW sets of every nonterminal in a grammar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirstFollow {
    first: Map<char, SymbolSet>,
    follow: Map<char, SymbolSet>,
}

impl FirstFollow {
    /// Calculate the sets of the specified grammar.
    pub fn new(grammar: &Grammar) -> Self {
        let mut sets = Self::default();
        sets.solve(grammar);
        sets
    }

    /// Run both solvers until they reach the fixpoint, and return the number
    /// of passes taken.
    ///
    /// Every set only grows, so solving again with the same grammar changes
    /// nothing and takes a single pass per solver.
    pub fn solve(&mut self, grammar: &Grammar) -> usize {
        for nonterminal in grammar.nonterminals() {
            self.first.entry(nonterminal).or_default();
            self.follow.entry(nonterminal).or_default();
        }

        let mut first_passes = 0;
        loop {
            first_passes += 1;
            let before = total_len(&self.first);
            for nonterminal in grammar.nonterminals() {
                let mut visiting = Set::default();
                self.compute_first(grammar, nonterminal, &mut visiting);
            }
            if total_len(&self.first) == before {
                break;
            }
        }
        tracing::debug!("FIRST sets converged after {} pass(es)", first_passes);

        let mut follow_passes = 0;
        loop {
            follow_passes += 1;
            let before = total_len(&self.follow);
            for nonterminal in grammar.nonterminals() {
                let mut visiting = Set::default();
                self.compute_follow(grammar, nonterminal, &mut visiting);
            }
            if total_len(&self.follow) == before {
                break;
            }
        }
        tracing::debug!("FOLLOW sets converged after {} pass(es)", follow_passes);

        first_passes + follow_passes
    }

    fn compute_first(
        &mut self,
        grammar: &Grammar,
        nonterminal: char,
        visiting: &mut Set<char>,
    ) -> SymbolSet {
        // A symbol under calculation (including itself) contributes the
        // partial set computed so far.
        if !visiting.insert(nonterminal) {
            return self.first(nonterminal).cloned().unwrap_or_default();
        }

        let mut added = SymbolSet::new();
        for (_, production) in grammar.productions_of(nonterminal) {
            let mut nullable = true;
            for symbol in production.body() {
                let first = match symbol {
                    Symbol::NonTerminal(n) => self.compute_first(grammar, *n, visiting),
                    symbol => self.first_of(*symbol),
                };
                added.extend(first.iter().filter(|s| **s != Symbol::Epsilon));
                if !first.contains(&Symbol::Epsilon) {
                    nullable = false;
                    break;
                }
            }
            if nullable {
                added.insert(Symbol::Epsilon);
            }
        }

        let first = self.first.entry(nonterminal).or_default();
        first.extend(added);
        first.clone()
    }

    fn compute_follow(
        &mut self,
        grammar: &Grammar,
        nonterminal: char,
        visiting: &mut Set<char>,
    ) -> SymbolSet {
        if !visiting.insert(nonterminal) {
            return self.follow(nonterminal).cloned().unwrap_or_default();
        }

        let mut added = SymbolSet::new();
        if nonterminal == grammar.start_symbol() {
            added.insert(Symbol::EndMarker);
        }

        for production in grammar.productions() {
            let body = production.body();
            for (i, symbol) in body.iter().enumerate() {
                if *symbol != Symbol::NonTerminal(nonterminal) {
                    continue;
                }
                let rest = self.first_of_sequence(&body[i + 1..]);
                added.extend(rest.iter().filter(|s| **s != Symbol::Epsilon));
                if rest.contains(&Symbol::Epsilon)
                    && production.head() != nonterminal
                    && grammar.is_nonterminal(production.head())
                {
                    let follow = self.compute_follow(grammar, production.head(), visiting);
                    added.extend(follow);
                }
            }
        }

        let follow = self.follow.entry(nonterminal).or_default();
        follow.extend(added);
        follow.clone()
    }

    /// Return the FIRST set of a nonterminal, if it is known.
    pub fn first(&self, nonterminal: char) -> Option<&SymbolSet> {
        self.first.get(&nonterminal)
    }

    /// Return the FOLLOW set of a nonterminal, if it is known.
    pub fn follow(&self, nonterminal: char) -> Option<&SymbolSet> {
        self.follow.get(&nonterminal)
    }

    /// Iterate over the FIRST sets in the first-seen order of nonterminals.
    pub fn first_sets(&self) -> impl Iterator<Item = (char, &SymbolSet)> + '_ {
        self.first.iter().map(|(n, set)| (*n, set))
    }

    pub fn follow_sets(&self) -> impl Iterator<Item = (char, &SymbolSet)> + '_ {
        self.follow.iter().map(|(n, set)| (*n, set))
    }

    /// Return the FIRST set of a single symbol.
    pub fn first_of(&self, symbol: Symbol) -> SymbolSet {
        match symbol {
            Symbol::NonTerminal(n) => self.first(n).cloned().unwrap_or_default(),
            symbol => Some(symbol).into_iter().collect(),
        }
    }

    /// Return the FIRST set of a sequence of symbols. The empty sequence
    /// yields `{ϵ}`.
    pub fn first_of_sequence(&self, symbols: &[Symbol]) -> SymbolSet {
        let mut result = SymbolSet::new();
        for symbol in symbols {
            let first = self.first_of(*symbol);
            let nullable = first.contains(&Symbol::Epsilon);
            result.extend(first.into_iter().filter(|s| *s != Symbol::Epsilon));
            if !nullable {
                return result;
            }
        }
        result.insert(Symbol::Epsilon);
        result
    }

    /// Return the union of `FIRST(prefix a)` for each `a` in `lookaheads`.
    pub fn first_with_lookaheads(&self, prefix: &[Symbol], lookaheads: &SymbolSet) -> SymbolSet {
        let mut result = self.first_of_sequence(prefix);
        if result.remove(&Symbol::Epsilon) {
            result.extend(lookaheads.iter().copied());
        }
        result
    }

    pub fn display_first(&self) -> impl fmt::Display + '_ {
        display_sets("FIRST", &self.first)
    }

    pub fn display_follow(&self) -> impl fmt::Display + '_ {
        display_sets("FOLLOW", &self.follow)
    }
}

impl fmt::Display for FirstFollow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.display_first(), self.display_follow())
    }
}

// `FIRST(A) = { a, ϵ }`
fn display_sets<'a>(label: &'a str, sets: &'a Map<char, SymbolSet>) -> impl fmt::Display + 'a {
    display_fn(move |f| {
        for (nonterminal, set) in sets {
            write!(f, "{}({}) = {{ ", label, nonterminal)?;
            join(f, set, ", ")?;
            writeln!(f, " }}")?;
        }
        Ok(())
    })
}

fn total_len(sets: &Map<char, SymbolSet>) -> usize {
    sets.values().map(|set| set.len()).sum()
}
