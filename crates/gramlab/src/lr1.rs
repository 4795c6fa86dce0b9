//! The implementation of the canonical LR(1) automaton.

use crate::{
    first_follow::{FirstFollow, SymbolSet},
    grammar::{Grammar, Symbol},
    types::Map,
    util::{display_fn, join},
};
use std::{collections::BTreeMap, fmt};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct StateID {
    raw: usize,
}

impl StateID {
    /// The state built from the closure of the augmented start item.
    pub const START: Self = Self::from_raw(0);

    #[inline]
    pub const fn from_raw(raw: usize) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn into_raw(self) -> usize {
        self.raw
    }
}

impl fmt::Display for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

/// The LR(0) part of an item: a production and the position of the marker.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemCore {
    pub production: usize,
    pub dot: usize,
}

/// An LR(1) item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub production: usize,
    pub dot: usize,
    pub lookahead: SymbolSet,
}

impl Item {
    pub fn core(&self) -> ItemCore {
        ItemCore {
            production: self.production,
            dot: self.dot,
        }
    }

    /// Return the symbol right after the marker, if any.
    pub fn next_symbol(&self, g: &Grammar) -> Option<Symbol> {
        g.production(self.production).body().get(self.dot).copied()
    }

    pub fn is_complete(&self, g: &Grammar) -> bool {
        self.dot >= g.production(self.production).body().len()
    }

    // `"A->a.B , $|b"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            let production = g.production(self.production);
            let (seen, unseen) = production.body().split_at(self.dot);
            write!(f, "{}->", production.head())?;
            join(f, seen, "")?;
            f.write_str(".")?;
            join(f, unseen, "")?;
            f.write_str(" , ")?;
            join(f, &self.lookahead, "|")
        })
    }
}

/// The key identifying an item set regardless of the item order.
pub type ItemSetKey = BTreeMap<ItemCore, SymbolSet>;

/// A set of LR(1) items, kept in insertion order.
///
/// Items sharing the same core are stored once with the union of their
/// lookaheads.
#[derive(Debug, Clone, Default)]
pub struct ItemSet {
    items: Vec<Item>,
    cores: Map<ItemCore, usize>,
}

impl ItemSet {
    /// Add the lookaheads to the item with the specified core, inserting the
    /// item if it does not exist. Return whether the set has changed.
    pub fn insert(&mut self, core: ItemCore, lookahead: SymbolSet) -> bool {
        match self.cores.get(&core) {
            Some(&i) => {
                let item = &mut self.items[i];
                let before = item.lookahead.len();
                item.lookahead.extend(lookahead);
                item.lookahead.len() != before
            }
            None => {
                self.cores.insert(core, self.items.len());
                self.items.push(Item {
                    production: core.production,
                    dot: core.dot,
                    lookahead,
                });
                true
            }
        }
    }

    pub fn get(&self, core: &ItemCore) -> Option<&Item> {
        self.cores.get(core).map(|i| &self.items[*i])
    }

    pub fn items(&self) -> &[Item] {
        &self.items[..]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn key(&self) -> ItemSetKey {
        self.items
            .iter()
            .map(|item| (item.core(), item.lookahead.clone()))
            .collect()
    }

    /// Whether both sets contain the same items with the same lookaheads,
    /// ignoring the order.
    pub fn same_items(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .items
                .iter()
                .all(|item| other.get(&item.core()) == Some(item))
    }
}

/// Expand the item set until every item `[A -> α.Bβ, L]` is accompanied by
/// `[B -> .γ, FIRST(βL)]` for all productions of `B`.
pub fn closure(g: &Grammar, sets: &FirstFollow, mut items: ItemSet) -> ItemSet {
    let mut changed = true;
    while changed {
        changed = false;

        let mut added: Map<ItemCore, SymbolSet> = Map::default();
        for item in &items.items {
            let body = g.production(item.production).body();

            // [A -> ... . B beta]
            let (head, beta) = match &body[item.dot..] {
                [Symbol::NonTerminal(head), beta @ ..] => (*head, beta),
                _ => continue,
            };

            let lookahead = sets.first_with_lookaheads(beta, &item.lookahead);
            for (production, _) in g.productions_of(head) {
                added
                    .entry(ItemCore { production, dot: 0 })
                    .or_default()
                    .extend(lookahead.iter().copied());
            }
        }

        for (core, lookahead) in added {
            changed |= items.insert(core, lookahead);
        }
    }
    items
}

/// Advance the marker over `symbol` in every item expecting it, and return
/// the closure of the result. The set is empty when no item expects `symbol`.
pub fn goto(g: &Grammar, sets: &FirstFollow, items: &ItemSet, symbol: Symbol) -> ItemSet {
    let mut kernel = ItemSet::default();
    for item in &items.items {
        if item.next_symbol(g) == Some(symbol) {
            kernel.insert(
                ItemCore {
                    production: item.production,
                    dot: item.dot + 1,
                },
                item.lookahead.clone(),
            );
        }
    }
    if kernel.is_empty() {
        return kernel;
    }
    closure(g, sets, kernel)
}

#[derive(Debug)]
pub struct State {
    id: StateID,
    items: ItemSet,
    transitions: Map<Symbol, StateID>,
}

impl State {
    pub fn id(&self) -> StateID {
        self.id
    }

    pub fn items(&self) -> &ItemSet {
        &self.items
    }

    /// Return the destination of the transition labeled with `symbol`.
    pub fn transition(&self, symbol: Symbol) -> Option<StateID> {
        self.transitions.get(&symbol).copied()
    }

    pub fn transitions(&self) -> impl Iterator<Item = (Symbol, StateID)> + '_ {
        self.transitions.iter().map(|(symbol, id)| (*symbol, *id))
    }
}

/// The collection of canonical LR(1) states of an augmented grammar.
#[derive(Debug)]
pub struct Automaton {
    states: Vec<State>,
    index: Map<ItemSetKey, StateID>,
}

impl Automaton {
    /// Build the automaton, numbering the states in creation order.
    ///
    /// `g` must be augmented: the initial state is the closure of the item
    /// `[S' -> .S, $]` of the first production.
    pub fn build(g: &Grammar, sets: &FirstFollow) -> Self {
        debug_assert!(g.augmented_start().is_some(), "the grammar is not augmented");

        let mut initial = ItemSet::default();
        initial.insert(
            ItemCore {
                production: 0,
                dot: 0,
            },
            Some(Symbol::EndMarker).into_iter().collect(),
        );
        let initial = closure(g, sets, initial);

        let mut automaton = Self {
            states: vec![],
            index: Map::default(),
        };
        automaton.push(initial);

        let symbols: Vec<Symbol> = g.symbols().collect();
        let mut current = 0;
        while current < automaton.states.len() {
            for &symbol in &symbols {
                let next = goto(g, sets, &automaton.states[current].items, symbol);
                if next.is_empty() {
                    continue;
                }
                let id = match automaton.find(&next) {
                    Some(id) => id,
                    None => automaton.push(next),
                };
                automaton.states[current].transitions.insert(symbol, id);
            }

            tracing::trace!(
                "state {}: {} item(s), {} transition(s)",
                current,
                automaton.states[current].items.len(),
                automaton.states[current].transitions.len()
            );
            current += 1;
        }

        tracing::debug!("built {} LR(1) state(s)", automaton.states.len());

        automaton
    }

    fn push(&mut self, items: ItemSet) -> StateID {
        let id = StateID::from_raw(self.states.len());
        self.index.insert(items.key(), id);
        self.states.push(State {
            id,
            items,
            transitions: Map::default(),
        });
        id
    }

    pub fn states(&self) -> &[State] {
        &self.states[..]
    }

    pub fn state(&self, id: StateID) -> &State {
        &self.states[id.into_raw()]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Find the state holding the same items as `items`.
    pub fn find(&self, items: &ItemSet) -> Option<StateID> {
        self.index.get(&items.key()).copied()
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for (i, state) in self.states.iter().enumerate() {
                if i > 0 {
                    writeln!(f)?;
                }
                writeln!(f, "Item {}:", state.id)?;
                for item in state.items.items() {
                    writeln!(f, "  {}", item.display(g))?;
                }
            }
            Ok(())
        })
    }
}
