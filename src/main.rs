//! Exhaustive expression evaluation - prints every result and its digest.
//!
//! Compile-time knobs live in `params.rs`.

mod params;

use std::fs;
use std::io::{self, Read, Write};
use std::time::Instant;

use clap::Parser;
use color_eyre::eyre::{bail, WrapErr};
use log::{info, warn};

use ebe::batch;
use ebe::{BitWidth, Config, Expression, OutputTarget, Verbosity};

use params::*;

#[derive(Parser)]
#[command(name = "ebe")]
#[command(about = "Evaluate an expression over every variable assignment and fingerprint the results")]
struct Args {
    /// Expression to evaluate; several words are joined with spaces
    #[arg(allow_hyphen_values = true)]
    expr: Vec<String>,

    /// Width in bits of every variable and intermediate value (1..=32)
    #[arg(short, long = "bits", value_name = "BITS", default_value_t = BitWidth::DEFAULT_BITS)]
    bits: u32,

    /// Output file, `-` for stdout
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
    output: OutputTarget,

    /// More logging (repeat for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, short_alias = 's')]
    quiet: bool,

    /// Fingerprint one expression per line of FILE (`-` for stdin)
    #[arg(long, value_name = "FILE", conflicts_with = "expr")]
    batch: Option<String>,

    /// Print expressions grouped by digest (batch mode)
    #[arg(long, requires = "batch")]
    group: bool,
}

// =============================================================================
// SINGLE EXPRESSION
// =============================================================================

fn report(expr: &Expression, config: &Config) {
    info!("Raw input: {}", expr.raw());
    info!("Cleaned input: {}", expr.cleaned());
    info!("Parsed input: {}", expr);
    info!("Variables: {}, slots: {}", expr.variable_count(), expr.slots());
    for var in expr.variables() {
        info!("  {} <- {} ({}x)", var.name, var.original, var.occurrences);
    }
    info!("max_bits: {}", config.width);
}

fn run_single(config: &Config, raw: &str) -> color_eyre::Result<()> {
    if raw.trim().is_empty() {
        bail!("no expression given (pass EXPR or --batch FILE)");
    }

    let mut expr = Expression::parse(raw).wrap_err_with(|| format!("Failed to parse {:?}", raw))?;
    report(&expr, config);

    let mut sink = config.output.open()?;
    let fingerprint = expr.fingerprint(config.width, &mut *sink)?;
    writeln!(sink, "{}", fingerprint)?;
    sink.flush()?;

    info!(
        "Combinations: {}, undefined: {}",
        fingerprint.combinations(),
        fingerprint.undefined()
    );
    Ok(())
}

// =============================================================================
// BATCH
// =============================================================================

fn read_source(source: &str) -> color_eyre::Result<String> {
    if source == STDIN_SOURCE {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        Ok(input)
    } else {
        fs::read_to_string(source).wrap_err_with(|| format!("Failed to read {}", source))
    }
}

fn run_batch(config: &Config, source: &str, group: bool) -> color_eyre::Result<()> {
    let expressions = batch::read_expressions(&read_source(source)?);
    info!(
        "Batch: {} expressions, max_bits: {}, multithread: {}",
        expressions.len(),
        config.width,
        USE_MULTITHREAD
    );

    let entries = batch::run(&expressions, config.width, USE_MULTITHREAD);

    let mut sink = config.output.open()?;
    for entry in &entries {
        if let Ok(summary) = &entry.result {
            writeln!(sink, "{}\t{}\t{}", summary.fingerprint, summary.canonical, entry.raw)?;
        }
    }

    if group {
        let groups = batch::group(&entries);
        writeln!(sink)?;
        for g in &groups {
            writeln!(sink, "{} ({} expressions)", g.fingerprint, g.members.len())?;
            for &i in &g.members {
                writeln!(sink, "\t{}", entries[i].raw)?;
            }
        }
        info!("Behaviour classes: {}", groups.len());
    }
    sink.flush()?;

    let failed = entries.iter().filter(|e| e.result.is_err()).count();
    if failed > 0 {
        warn!("{} of {} expressions failed", failed, entries.len());
    }
    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let verbosity = Verbosity::from_flags(args.quiet, args.verbose);
    let config = Config::new(args.bits, args.output, verbosity)?;

    simplelog::TermLogger::init(
        config.verbosity.level_filter(),
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = Instant::now();

    match &args.batch {
        Some(source) => run_batch(&config, source, args.group)?,
        None => run_single(&config, &args.expr.join(" "))?,
    }

    info!("Done in {:.3} s", time_total.elapsed().as_secs_f64());
    Ok(())
}
