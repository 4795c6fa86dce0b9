//! Grammar analysis: FIRST/FOLLOW sets, canonical LR(1) automata, and the
//! shift-reduce and LL(1) tables driving the parse engines.

pub mod analysis;
pub mod first_follow;
pub mod grammar;
pub mod ll1;
pub mod lr1;
pub mod table;
pub mod types;
pub mod util;

pub use crate::{
    analysis::{
        analyze_ll1, analyze_shift_reduce, run_predictive_parse, run_predictive_parse_with,
        run_shift_reduce_parse, run_shift_reduce_parse_with, AnalysisError, LL1Analysis,
        PredictiveOutcome, ShiftReduceAnalysis, ShiftReduceOutcome,
    },
    first_follow::{FirstFollow, SymbolSet},
    grammar::{Grammar, GrammarError, Production, Symbol},
    ll1::{LL1ConflictError, LL1Table},
    lr1::{Automaton, StateID},
    table::{Action, Overwrite, ParsingTable},
};
pub use gramlab_runtime as runtime;
