//! # Keeprow - flag active businesses in registry exports
//!
//! Keeprow reads a CSV of business records, decides for each one whether it
//! shows enough evidence of being an active business, and writes the same
//! CSV with a `Keep row` column of `True`/`False`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Loader    │────▶│ Classifier  │────▶│   Writer    │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (rule set)  │     │ (+Keep row) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use keeprow::{run, Settings};
//!
//! let summary = run(&Settings::from_env()?)?;
//! println!("Kept {} of {}", summary.kept, summary.rows);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Schema, BusinessRecord, Decision
//! - [`config`] - Settings from environment and flags
//! - [`logs`] - Leveled console logging
//! - [`parser`] - CSV loading with auto-detection
//! - [`rules`] - Rule predicates, rule sets, compilation
//! - [`validation`] - Rule set schema validation
//! - [`classifier`] - Records to decisions
//! - [`writer`] - Decisions to CSV
//! - [`pipeline`] - End-to-end run

// Core modules
pub mod error;
pub mod models;
pub mod config;
pub mod logs;

// Loading
pub mod parser;

// Rules
pub mod rules;
pub mod validation;
pub mod classifier;

// Output
pub mod writer;

pub mod pipeline;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{
    ConfigError,
    LoadError,
    PipelineError,
    RulesError,
    WriteError,
};

pub use models::{BusinessRecord, Decision, Schema, KEEP_COLUMN};

pub use config::Settings;

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    load_csv,
    parse_bytes,
    parse_str,
    ParseResult,
};

pub use rules::{
    default_rules,
    rules_description,
    CompiledRule,
    KeepRule,
    MissingColumns,
    Rule,
    RuleSet,
};

pub use validation::{is_valid_rule_set, validate_rule_set};

pub use classifier::Classifier;

pub use writer::{write_csv, write_to};

pub use pipeline::{load_rule_set, run, run_with_classifier, RunSummary};
