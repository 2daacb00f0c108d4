//! Keeprow CLI - flag active businesses in a registry CSV
//!
//! ```bash
//! keeprow                              # businesses.csv → businesses_to_keep.csv
//! keeprow --rules rules.json           # use a custom rule set
//! keeprow --print-rules                # show the effective rule set
//! keeprow --list-predicates            # show available rule predicates
//! ```
//!
//! Every flag is optional; settings come from `KEEPROW_*` environment
//! variables (or `.env`) first, and flags override them.

use clap::Parser;
use keeprow::config::{parse_delimiter, parse_log_level};
use keeprow::logs::{self, log_error, log_success};
use keeprow::{load_rule_set, rules_description, run, PipelineError, Settings};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "keeprow")]
#[command(about = "Flag business records that show evidence of an active business", long_about = None)]
struct Cli {
    /// Input CSV file (default: businesses.csv)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output CSV file (default: businesses_to_keep.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Rule set JSON file (default: built-in rules)
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// CSV delimiter (auto-detect if not specified)
    #[arg(short, long)]
    delimiter: Option<String>,

    /// Log level: debug, info, warning, error
    #[arg(long)]
    log_level: Option<String>,

    /// Print the effective rule set and exit
    #[arg(long)]
    print_rules: bool,

    /// Print available rule predicates and exit
    #[arg(long)]
    list_predicates: bool,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = execute(cli) {
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn execute(cli: Cli) -> Result<(), PipelineError> {
    let settings = resolve_settings(&cli)?;
    logs::set_level(settings.log_level);

    if cli.list_predicates {
        println!("{}", rules_description());
        return Ok(());
    }

    if cli.print_rules {
        let rules = load_rule_set(&settings)?;
        println!("{}", rules.to_json()?);
        return Ok(());
    }

    let summary = run(&settings)?;

    log_success(format!(
        "Done: {} of {} businesses kept → {}",
        summary.kept,
        summary.rows,
        summary.output.display()
    ));
    Ok(())
}

fn resolve_settings(cli: &Cli) -> Result<Settings, PipelineError> {
    apply_flags(cli, Settings::from_env()?)
}

/// Flags win over whatever the environment resolved.
fn apply_flags(cli: &Cli, mut settings: Settings) -> Result<Settings, PipelineError> {
    if let Some(ref input) = cli.input {
        settings.input = input.clone();
    }
    if let Some(ref output) = cli.output {
        settings.output = output.clone();
    }
    if let Some(ref rules) = cli.rules {
        settings.rules = Some(rules.clone());
    }
    if let Some(ref delimiter) = cli.delimiter {
        settings.delimiter = Some(parse_delimiter("--delimiter", delimiter)?);
    }
    if let Some(ref level) = cli.log_level {
        settings.log_level = parse_log_level("--log-level", level)?;
    }

    Ok(settings)
}
