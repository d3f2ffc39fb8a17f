//! anchor-lint CLI
//!
//! Checks regex patterns for anchors that can never match.

use anchor_lint::config::{Config, OutputFormat};
use anchor_lint::report::{render_json, render_text};
use anchor_lint::{HostFragments, HostPiece, NoHost, Problem, Reconciler, Severity, inspect_with};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "anchor-lint",
    version,
    about = "Find regex anchors in positions where they can never match"
)]
struct Cli {
    /// Patterns to check (read from stdin, one per line, when omitted)
    patterns: Vec<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Flags every pattern starts with, e.g. "x"
    #[arg(long)]
    flags: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Severity attached to problems
    #[arg(long)]
    severity: Option<Severity>,

    /// Treat PATTERNS as one pattern split into host source pieces:
    /// string literal contents alternating with the host code between them
    #[arg(long)]
    fragments: bool,

    /// With --fragments: the pieces form a conditional expression
    #[arg(long, requires = "fragments")]
    conditional: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(cli) {
        Ok(true) => ExitCode::from(1),
        Ok(false) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Returns whether any problem was found.
fn run(cli: Cli) -> Result<bool> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::load_default()?,
    };
    config.merge_cli(
        cli.flags.clone(),
        cli.format.map(OutputFormat::from),
        cli.severity,
        cli.no_color,
    );
    if !config.output.color {
        colored::control::set_override(false);
    }

    if cli.fragments {
        let pieces: Vec<HostPiece> = cli
            .patterns
            .iter()
            .enumerate()
            .map(|(i, piece)| {
                if i % 2 == 0 {
                    HostPiece::Literal(piece.clone())
                } else {
                    HostPiece::Code(piece.clone())
                }
            })
            .collect();
        let mut host = HostFragments::new("cli", &pieces);
        if cli.conditional {
            host = host.in_conditional(true);
        }
        let text = host.text().to_string();
        return check(&config, &host, &[text]);
    }

    let patterns = if cli.patterns.is_empty() {
        std::io::stdin()
            .lock()
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .context("reading patterns from stdin")?
    } else {
        cli.patterns.clone()
    };
    check(&config, &NoHost, &patterns)
}

fn check<R: Reconciler>(config: &Config, reconciler: &R, patterns: &[String]) -> Result<bool> {
    let flags = config.regex_flags()?;
    let mut any = false;
    for pattern in patterns {
        let mut problems: Vec<Problem> = inspect_with(reconciler, pattern, flags)
            .with_context(|| format!("parsing {:?}", pattern))?;
        for problem in &mut problems {
            problem.severity = config.severity;
        }
        any |= !problems.is_empty();
        match config.output.format {
            OutputFormat::Text => print!("{}", render_text(pattern, &problems, config.output.color)),
            OutputFormat::Json => println!("{}", render_json(pattern, &problems)?),
        }
    }
    Ok(any)
}
