use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use gramlab::{
    runtime::ParseOptions, run_predictive_parse_with, run_shift_reduce_parse_with, Grammar,
    LL1Analysis, ShiftReduceAnalysis,
};
use std::{
    fmt::Write as _,
    fs,
    io::{self, Read as _},
    path::PathBuf,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Canonical LR(1) automaton and shift-reduce table.
    #[value(name = "lr1")]
    LR1,
    /// LL(1) predictive table.
    #[value(name = "ll1")]
    LL1,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The path of grammar file, one production `A->body` per line.
    /// Read from stdin when omitted or `-'.
    grammar: Option<PathBuf>,

    /// The kind of the table to compile.
    #[arg(long, value_enum, default_value = "lr1")]
    mode: Mode,

    /// The string to parse with the compiled table.
    #[arg(long)]
    input: Option<String>,

    /// Dump the canonical LR(1) item sets.
    #[arg(long)]
    states: bool,

    /// The number of steps after which a parse run is abandoned.
    #[arg(long, default_value_t = ParseOptions::DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Write the report into the file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    tracing::trace!("CLI args = {:?}", args);

    let source = match &args.grammar {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("failed to read the grammar file {}", path.display()))?,
        _ => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("failed to read the grammar from stdin")?;
            source
        }
    };

    let grammar = Grammar::parse(&source).context("failed to read the grammar")?;

    let undefined: Vec<char> = grammar.undefined_nonterminals().collect();
    if !undefined.is_empty() {
        eprintln!(
            "[warning] The following nonterminals have no associated production: {:?}",
            undefined
        );
    }

    let options = ParseOptions::new().max_steps(args.max_steps);
    let mut report = String::new();
    match args.mode {
        Mode::LR1 => {
            let analysis = ShiftReduceAnalysis::new(&grammar)?;

            let overwrites = analysis.table().overwrites();
            if !overwrites.is_empty() {
                let suffix = if overwrites.len() == 1 { "" } else { "s" };
                eprintln!(
                    "[warning] {} table cell{} overwritten by a conflicting action:",
                    overwrites.len(),
                    suffix
                );
                for overwrite in overwrites {
                    eprintln!("  {}", overwrite);
                }
            }

            writeln!(report, "{}", analysis.grammar())?;
            writeln!(report, "{}", analysis.sets())?;
            if args.states {
                writeln!(report, "{}", analysis.automaton().display(analysis.grammar()))?;
            }
            write!(report, "{}", analysis.table())?;

            if let Some(input) = &args.input {
                let outcome = run_shift_reduce_parse_with(analysis.table(), input, options);
                writeln!(report, "\n{}", outcome.trace)?;
                writeln!(report, "{}", summary(outcome.accepted, &outcome.message))?;
            }
        }

        Mode::LL1 => {
            let analysis = LL1Analysis::new(&grammar).context("grammar is not LL(1)")?;

            writeln!(report, "{}", analysis.grammar())?;
            writeln!(report, "{}", analysis.sets())?;
            write!(report, "{}", analysis.table())?;

            if let Some(input) = &args.input {
                let outcome = run_predictive_parse_with(
                    analysis.table(),
                    grammar.start_symbol(),
                    input,
                    options,
                );
                writeln!(report, "\n{}", outcome.trace)?;
                writeln!(report, "{}", summary(outcome.accepted, &outcome.message))?;
            }
        }
    }

    match &args.output {
        Some(path) => fs::write(path, report).with_context(|| {
            anyhow::anyhow!("failed to write the report to {}", path.display())
        })?,
        None => print!("{}", report),
    }

    Ok(())
}

fn summary(accepted: bool, message: &str) -> String {
    if accepted {
        "ACCEPTED".to_owned()
    } else {
        format!("REJECTED: {}", message)
    }
}
