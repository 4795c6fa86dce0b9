//! Table-driven parse engines for `gramlab` parse tables.

pub mod definition;
pub mod engine;

pub use crate::{
    definition::{PredictiveTable, Rule, ShiftReduceAction, ShiftReduceTable},
    engine::{
        ParseError, ParseOptions, ParseOutcome, PredictiveEngine, ShiftReduceEngine, StackEntry,
        Step, StepAction, Trace,
    },
};
