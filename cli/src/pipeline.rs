//! High-level pipeline: load → classify → write.
//!
//! # Example
//!
//! ```rust,ignore
//! use keeprow::{run, Settings};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let summary = run(&Settings::default())?;
//!     println!("Kept {} of {} businesses", summary.kept, summary.rows);
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::path::PathBuf;

use crate::classifier::Classifier;
use crate::config::Settings;
use crate::error::{PipelineResult, RulesResult};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::parser::{delimiter_byte, load_csv, ParseResult};
use crate::rules::{default_rules, RuleSet};
use crate::writer::write_csv;

/// Outcome of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub encoding: String,
    pub delimiter: char,
    pub rows: usize,
    pub kept: usize,
    pub dropped: usize,
}

/// The rule set named by the settings, or the built-in one.
pub fn load_rule_set(settings: &Settings) -> RulesResult<RuleSet> {
    match settings.rules {
        Some(ref path) => {
            log_info(format!("📐 Loading rules from {}", path.display()));
            RuleSet::from_file(path)
        }
        None => {
            log_info("📐 Using built-in rules");
            Ok(default_rules())
        }
    }
}

/// Run the whole pipeline with the configured rule set.
pub fn run(settings: &Settings) -> PipelineResult<RunSummary> {
    let rules = load_rule_set(settings)?;
    if !rules.description.is_empty() {
        log_info_indent(rules.description.as_str(), 1);
    }
    log_info_indent(format!("Root rule: {}", rules.rule.summary()), 1);

    let parsed = load_input(settings)?;

    let classifier = Classifier::compile(&rules, &parsed.schema)?;
    log_success("Rules compiled against input columns");

    classify_and_write(settings, parsed, &classifier)
}

/// Run the pipeline with a caller-built classifier.
pub fn run_with_classifier(settings: &Settings, classifier: &Classifier) -> PipelineResult<RunSummary> {
    let parsed = load_input(settings)?;
    classify_and_write(settings, parsed, classifier)
}

fn load_input(settings: &Settings) -> PipelineResult<ParseResult> {
    log_info(format!("📖 Reading {}", settings.input.display()));
    let parsed = load_csv(&settings.input, settings.delimiter)?;

    log_success(format!("Detected encoding: {}", parsed.encoding));
    log_success(format!(
        "Separator: '{}'{}",
        parsed.delimiter.escape_default(),
        if settings.delimiter.is_none() { " (auto-detected)" } else { "" }
    ));
    log_success(format!(
        "Read {} rows, {} columns",
        parsed.records.len(),
        parsed.schema.len()
    ));

    if parsed.records.is_empty() {
        log_warning("Input has a header but no rows");
    }

    Ok(parsed)
}

fn classify_and_write(
    settings: &Settings,
    parsed: ParseResult,
    classifier: &Classifier,
) -> PipelineResult<RunSummary> {
    log_info("⚙️  Classifying records...");
    let decisions = classifier.classify_all(&parsed.schema, &parsed.records);

    let kept = decisions.iter().filter(|d| d.keep).count();
    let dropped = decisions.len() - kept;
    log_success(format!("Keep: {}, drop: {}", kept, dropped));

    log_info(format!("💾 Writing {}", settings.output.display()));
    write_csv(
        &settings.output,
        &parsed.schema,
        &parsed.records,
        &decisions,
        delimiter_byte(parsed.delimiter)?,
        &settings.keep_column,
    )?;
    log_success(format!("Wrote {} rows", decisions.len()));

    Ok(RunSummary {
        input: settings.input.clone(),
        output: settings.output.clone(),
        encoding: parsed.encoding,
        delimiter: parsed.delimiter,
        rows: decisions.len(),
        kept,
        dropped,
    })
}
