//! Grammar types.

use crate::types::{Map, Set};
use std::fmt;

/// The characters accepted as the whole body of an epsilon production.
pub const EPSILON_MARKERS: [char; 2] = ['ϵ', 'ε'];

/// The separator between the head and the body of a production.
const ARROW: &str = "->";

/// An atomic grammar element.
///
/// The variant order is significant: sets of symbols are reported in the
/// order `$`, terminals, nonterminals, `ϵ`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// Reserved symbol that means the end of input (`$`).
    EndMarker,
    Terminal(char),
    NonTerminal(char),
    /// Reserved symbol that means the empty string.
    Epsilon,
}

impl Symbol {
    /// Classify a character appearing in a production body.
    ///
    /// Only `A`..=`Z` name nonterminals; any other letter, including a
    /// non-ASCII uppercase one, is a terminal.
    pub fn classify(ch: char) -> Self {
        if ch.is_ascii_uppercase() {
            Self::NonTerminal(ch)
        } else {
            Self::Terminal(ch)
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(..))
    }

    pub fn is_nonterminal(&self) -> bool {
        matches!(self, Self::NonTerminal(..))
    }

    /// Return the character of a terminal or nonterminal symbol.
    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Terminal(ch) | Self::NonTerminal(ch) => Some(*ch),
            Self::EndMarker | Self::Epsilon => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndMarker => f.write_str("$"),
            Self::Terminal(ch) | Self::NonTerminal(ch) => write!(f, "{}", ch),
            Self::Epsilon => f.write_str("ϵ"),
        }
    }
}

/// The type that represents a production rule in grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    head: char,
    body: Vec<Symbol>,
}

impl Production {
    pub fn new(head: char, body: Vec<Symbol>) -> Self {
        Self { head, body }
    }

    /// Return the left-hand side of this production.
    pub fn head(&self) -> char {
        self.head
    }

    pub fn head_symbol(&self) -> Symbol {
        Symbol::NonTerminal(self.head)
    }

    /// Return the right-hand side of this production.
    pub fn body(&self) -> &[Symbol] {
        &self.body[..]
    }

    pub fn is_epsilon(&self) -> bool {
        self.body.is_empty()
    }
}

// `"A->aB"`, or `"A->ϵ"` for the empty body.
impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.head, ARROW)?;
        if self.body.is_empty() {
            return f.write_str("ϵ");
        }
        for symbol in &self.body {
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum GrammarError {
    #[error("syntax error at line {line}: {reason}")]
    Syntax { line: usize, reason: String },

    #[error("the grammar has no production")]
    Empty,

    #[error("no uppercase letter is left for the augmented start symbol")]
    StartSymbolExhausted,
}

/// The grammar definition used to derive the parsing tables.
#[derive(Debug, Clone)]
pub struct Grammar {
    productions: Vec<Production>,
    terminals: Set<char>,
    nonterminals: Set<char>,
    start_symbol: char,
    augmented_start: Option<char>,
    // production -> the first index it appears at.
    lookup: Map<Production, usize>,
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## terminals:")?;
        for terminal in &self.terminals {
            writeln!(f, "{}", terminal)?;
        }

        writeln!(f, "\n## nonterminals:")?;
        if let Some(augmented) = self.augmented_start {
            writeln!(f, "{} (augmented start)", augmented)?;
        }
        for nonterminal in &self.nonterminals {
            write!(f, "{}", nonterminal)?;
            if *nonterminal == self.start_symbol {
                write!(f, " (start)")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## productions:")?;
        for (i, production) in self.productions.iter().enumerate() {
            writeln!(f, "{}: {}", i, production)?;
        }

        Ok(())
    }
}

impl Grammar {
    /// Read the grammar text, one production `A->body` per line.
    pub fn parse(source: &str) -> Result<Grammar, GrammarError> {
        Self::define(|g| {
            for (i, line) in source.lines().enumerate() {
                let line: String = line.chars().filter(|ch| !ch.is_whitespace()).collect();
                if line.is_empty() {
                    continue;
                }
                g.push_line(i + 1, &line)?;
            }
            Ok(())
        })
    }

    /// Define a grammar using the specified function.
    pub fn define<F>(f: F) -> Result<Self, GrammarError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarError>,
    {
        let mut def = GrammarDef {
            productions: vec![],
            terminals: Set::default(),
            nonterminals: Set::default(),
        };
        f(&mut def)?;
        def.end()
    }

    /// Create the augmented grammar, which prepends `S'->S` with a fresh
    /// nonterminal `S'` chosen by scanning `Z` down to `A`.
    pub fn augment(&self) -> Result<Grammar, GrammarError> {
        let augmented = ('A'..='Z')
            .rev()
            .find(|ch| !self.nonterminals.contains(ch) && Some(*ch) != self.augmented_start)
            .ok_or(GrammarError::StartSymbolExhausted)?;

        let mut productions = Vec::with_capacity(self.productions.len() + 1);
        productions.push(Production::new(
            augmented,
            vec![Symbol::NonTerminal(self.start_symbol)],
        ));
        productions.extend(self.productions.iter().cloned());

        tracing::debug!(
            "augment the grammar with `{}{}{}'",
            augmented,
            ARROW,
            self.start_symbol
        );

        Ok(Grammar {
            lookup: build_lookup(&productions),
            productions,
            terminals: self.terminals.clone(),
            nonterminals: self.nonterminals.clone(),
            start_symbol: self.start_symbol,
            augmented_start: Some(augmented),
        })
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions[..]
    }

    pub fn production(&self, index: usize) -> &Production {
        &self.productions[index]
    }

    /// Enumerate the productions headed by `head`, in definition order.
    pub fn productions_of(&self, head: char) -> impl Iterator<Item = (usize, &Production)> + '_ {
        self.productions
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.head == head)
    }

    /// Find the first production with the identical head and body.
    pub fn find_production(&self, head: char, body: &[Symbol]) -> Option<usize> {
        // The key is rebuilt only for the hashed lookup.
        self.lookup
            .get(&Production::new(head, body.to_vec()))
            .copied()
    }

    /// The terminal symbols, in first-seen order.
    pub fn terminals(&self) -> impl Iterator<Item = char> + '_ {
        self.terminals.iter().copied()
    }

    /// The nonterminal symbols, in first-seen order. The augmented start
    /// symbol is not included.
    pub fn nonterminals(&self) -> impl Iterator<Item = char> + '_ {
        self.nonterminals.iter().copied()
    }

    pub fn is_terminal(&self, ch: char) -> bool {
        self.terminals.contains(&ch)
    }

    pub fn is_nonterminal(&self, ch: char) -> bool {
        self.nonterminals.contains(&ch)
    }

    /// The head of the first production in the source text.
    pub fn start_symbol(&self) -> char {
        self.start_symbol
    }

    pub fn augmented_start(&self) -> Option<char> {
        self.augmented_start
    }

    /// All grammar symbols, nonterminals first and then terminals.
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.nonterminals
            .iter()
            .map(|ch| Symbol::NonTerminal(*ch))
            .chain(self.terminals.iter().map(|ch| Symbol::Terminal(*ch)))
    }

    /// The nonterminals that appear in some body but head no production.
    pub fn undefined_nonterminals(&self) -> impl Iterator<Item = char> + '_ {
        self.nonterminals
            .iter()
            .copied()
            .filter(move |n| self.productions.iter().all(|p| p.head != *n))
    }
}

/// The contextural values for building a `Grammar`.
#[derive(Debug)]
pub struct GrammarDef {
    productions: Vec<Production>,
    terminals: Set<char>,
    nonterminals: Set<char>,
}

impl GrammarDef {
    /// Specify a production rule into this grammar.
    ///
    /// `body` is read one character per symbol; an empty string or a lone
    /// epsilon marker denotes the empty body.
    pub fn rule(&mut self, head: char, body: &str) -> Result<(), GrammarError> {
        let line = self.productions.len() + 1;
        let body: String = body.chars().filter(|ch| !ch.is_whitespace()).collect();
        self.push_rule(line, head, &body)
    }

    fn push_line(&mut self, line: usize, text: &str) -> Result<(), GrammarError> {
        let (head, body) = match text.split(ARROW).collect::<Vec<_>>()[..] {
            [head, body] => (head, body),
            _ => {
                return Err(GrammarError::Syntax {
                    line,
                    reason: format!("expected exactly one `{}' in `{}'", ARROW, text),
                })
            }
        };

        let mut chars = head.chars();
        let head = match (chars.next(), chars.next()) {
            (Some(ch), None) => ch,
            _ => {
                return Err(GrammarError::Syntax {
                    line,
                    reason: format!("the head `{}' must be a single symbol", head),
                })
            }
        };

        self.push_rule(line, head, body)
    }

    fn push_rule(&mut self, line: usize, head: char, body: &str) -> Result<(), GrammarError> {
        if !head.is_ascii_uppercase() {
            return Err(GrammarError::Syntax {
                line,
                reason: format!("the head `{}' must be an uppercase letter", head),
            });
        }

        let mut symbols = vec![];
        let is_epsilon = match body.chars().collect::<Vec<_>>()[..] {
            [] => true,
            [ch] => EPSILON_MARKERS.contains(&ch),
            _ => false,
        };
        if !is_epsilon {
            for ch in body.chars() {
                if EPSILON_MARKERS.contains(&ch) {
                    return Err(GrammarError::Syntax {
                        line,
                        reason: format!("`{}' must be the whole body", ch),
                    });
                }
                if ch == '$' {
                    return Err(GrammarError::Syntax {
                        line,
                        reason: "`$' is reserved for the end marker".into(),
                    });
                }
                symbols.push(Symbol::classify(ch));
            }
        }

        self.nonterminals.insert(head);
        for symbol in &symbols {
            match symbol {
                Symbol::Terminal(ch) => {
                    self.terminals.insert(*ch);
                }
                Symbol::NonTerminal(ch) => {
                    self.nonterminals.insert(*ch);
                }
                Symbol::EndMarker | Symbol::Epsilon => (),
            }
        }

        let production = Production::new(head, symbols);
        tracing::trace!("production {}: {}", self.productions.len(), production);
        self.productions.push(production);

        Ok(())
    }

    fn end(self) -> Result<Grammar, GrammarError> {
        let start_symbol = self
            .productions
            .first()
            .map(|p| p.head)
            .ok_or(GrammarError::Empty)?;

        Ok(Grammar {
            lookup: build_lookup(&self.productions),
            productions: self.productions,
            terminals: self.terminals,
            nonterminals: self.nonterminals,
            start_symbol,
            augmented_start: None,
        })
    }
}

fn build_lookup(productions: &[Production]) -> Map<Production, usize> {
    let mut lookup = Map::default();
    for (i, production) in productions.iter().enumerate() {
        lookup.entry(production.clone()).or_insert(i);
    }
    lookup
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoketest() {
        let grammar = Grammar::parse(
            "E -> E+T\n\
             E->T\n\
             \n\
             T->T*F\n\
             T->F\n\
             F->(E)\n\
             F->i\n",
        )
        .unwrap();

        assert_eq!(grammar.productions().len(), 6);
        assert_eq!(grammar.start_symbol(), 'E');
        assert_eq!(grammar.nonterminals().collect::<String>(), "ETF");
        assert_eq!(grammar.terminals().collect::<String>(), "+*()i");
        assert_eq!(grammar.production(0).to_string(), "E->E+T");
        assert_eq!(
            grammar.symbols().map(|s| s.to_string()).collect::<String>(),
            "ETF+*()i"
        );
        assert_eq!(grammar.productions_of('T').count(), 2);
        assert_eq!(grammar.undefined_nonterminals().count(), 0);
    }

    #[test]
    fn epsilon_body() {
        let grammar = Grammar::parse("S->AB\nA->a\nA->ϵ\nA->ε\nA->\nB->b").unwrap();
        for i in 2..=4 {
            assert!(grammar.production(i).is_epsilon());
            assert_eq!(grammar.production(i).to_string(), "A->ϵ");
        }
        assert!(!grammar.terminals().any(|t| EPSILON_MARKERS.contains(&t)));

        // duplicates keep their own index but resolve to the first one.
        assert_eq!(grammar.find_production('A', &[]), Some(2));
        assert_eq!(
            grammar.find_production('A', &[Symbol::Terminal('a')]),
            Some(1)
        );
        assert_eq!(grammar.find_production('A', &[Symbol::Terminal('b')]), None);
    }

    #[test]
    fn syntax_errors() {
        let cases = [
            ("S->a\nSa", 2),
            ("S->a->b", 1),
            ("SA->a", 1),
            ("s->a", 1),
            ("->a", 1),
            ("S->aϵ", 1),
            ("S->a$", 1),
        ];
        for (source, expected) in cases {
            match Grammar::parse(source) {
                Err(GrammarError::Syntax { line, .. }) => assert_eq!(line, expected, "{}", source),
                other => panic!("unexpected result for {:?}: {:?}", source, other),
            }
        }
    }

    #[test]
    fn non_ascii_uppercase_is_terminal() {
        let grammar = Grammar::parse("S->Äb").unwrap();
        assert_eq!(
            grammar.production(0).body(),
            [Symbol::Terminal('Ä'), Symbol::Terminal('b')]
        );
        assert_eq!(grammar.terminals().collect::<String>(), "Äb");
        assert!(!grammar.is_nonterminal('Ä'));

        assert!(matches!(
            Grammar::parse("Ä->a"),
            Err(GrammarError::Syntax { line: 1, .. })
        ));
    }

    #[test]
    fn empty_grammar() {
        assert_eq!(Grammar::parse("  \n\n").unwrap_err(), GrammarError::Empty);
    }

    #[test]
    fn define_with_builder() {
        let grammar = Grammar::define(|g| {
            g.rule('S', "a S")?;
            g.rule('S', "")?;
            Ok(())
        })
        .unwrap();
        assert_eq!(grammar.production(0).to_string(), "S->aS");
        assert!(grammar.production(1).is_epsilon());

        let err = Grammar::define(|g| g.rule('s', "a")).unwrap_err();
        assert!(matches!(err, GrammarError::Syntax { line: 1, .. }));
    }

    #[test]
    fn augment() {
        let grammar = Grammar::parse("S->aS\nS->b").unwrap();
        let augmented = grammar.augment().unwrap();
        assert_eq!(augmented.augmented_start(), Some('Z'));
        assert_eq!(augmented.production(0).to_string(), "Z->S");
        assert_eq!(augmented.production(2).to_string(), "S->b");
        assert_eq!(augmented.nonterminals().collect::<String>(), "S");
        assert_eq!(
            augmented.find_production('S', &[Symbol::Terminal('b')]),
            Some(2)
        );

        let grammar = Grammar::parse("Z->Y\nY->a").unwrap();
        let augmented = grammar.augment().unwrap();
        assert_eq!(augmented.production(0).to_string(), "X->Z");
    }

    #[test]
    fn augment_exhausted() {
        let source: String = ('A'..='Z')
            .map(|ch| format!("{}->{}\n", ch, ch.to_ascii_lowercase()))
            .collect();
        let grammar = Grammar::parse(&source).unwrap();
        assert_eq!(
            grammar.augment().unwrap_err(),
            GrammarError::StartSymbolExhausted
        );
    }

    #[test]
    fn undefined_nonterminal() {
        let grammar = Grammar::parse("S->aB").unwrap();
        assert_eq!(grammar.undefined_nonterminals().collect::<String>(), "B");
    }

    #[test]
    fn symbol_order() {
        let mut symbols = vec![
            Symbol::Epsilon,
            Symbol::NonTerminal('A'),
            Symbol::Terminal('b'),
            Symbol::EndMarker,
            Symbol::Terminal('a'),
        ];
        symbols.sort();
        assert_eq!(
            symbols.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            ["$", "a", "b", "A", "ϵ"]
        );
    }
}
