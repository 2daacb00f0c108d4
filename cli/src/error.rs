//! Error types for the keeprow pipeline.
//!
//! - [`LoadError`] - reading and parsing the input CSV
//! - [`RulesError`] - loading, validating and compiling a rule set
//! - [`ConfigError`] - resolving settings from the environment
//! - [`WriteError`] - writing the output CSV
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Loader Errors
// =============================================================================

/// Errors while loading a CSV file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Input path does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File has no header line.
    #[error("CSV file is empty")]
    EmptyFile,

    /// Failed to decode the file contents.
    #[error("Failed to decode content as {0}")]
    Encoding(String),

    /// A row has a different number of fields than the header.
    #[error("Malformed row at line {line}: expected {expected} fields, found {found}")]
    Malformed {
        line: u64,
        expected: u64,
        found: u64,
    },

    /// Any other CSV syntax error.
    #[error("Invalid CSV format: {0}")]
    Parse(String),
}

// =============================================================================
// Rule Set Errors
// =============================================================================

/// Errors while loading or compiling a rule set.
#[derive(Debug, Error)]
pub enum RulesError {
    /// Failed to read the rule file.
    #[error("Failed to read rule file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rule file is not valid JSON or does not match the rule model.
    #[error("Invalid rule JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Rule file violates the rule set schema.
    #[error("Rule set failed validation: {}", .errors.join("; "))]
    Schema { errors: Vec<String> },

    /// A rule references a column the input does not have.
    #[error("Rule references unknown column '{0}'")]
    UnknownColumn(String),

    /// A `matches` rule carries an invalid regex.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A date rule carries an unparseable threshold date.
    #[error("Invalid threshold date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    /// A weight or threshold is out of range.
    #[error("Invalid value for '{field}': {message}")]
    InvalidWeight { field: String, message: String },

    /// The registry file of a `registry_match` rule could not be used.
    #[error("Registry {}: {message}", .path.display())]
    Registry { path: PathBuf, message: String },
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while resolving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration variable is set but empty.
    #[error("Missing value for {0}")]
    MissingValue(String),

    /// A configuration variable holds an unusable value.
    #[error("Invalid value for {name}: '{value}' ({message})")]
    InvalidValue {
        name: String,
        value: String,
        message: String,
    },
}

// =============================================================================
// Writer Errors
// =============================================================================

/// Errors while writing the output CSV.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to create or flush the output file.
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization error.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Decisions do not line up with records.
    #[error("Got {decisions} decisions for {records} records")]
    DecisionMismatch { records: usize, decisions: usize },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::pipeline::run`]. Every variant
/// is fatal.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input could not be loaded.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Rule set could not be loaded or compiled.
    #[error("Rules error: {0}")]
    Rules(#[from] RulesError),

    /// Settings could not be resolved.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Output could not be written.
    #[error("Write error: {0}")]
    Write(#[from] WriteError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for rule set operations.
pub type RulesResult<T> = Result<T, RulesError>;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for writer operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
