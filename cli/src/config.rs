//! Runtime settings.
//!
//! Resolved once at startup from the environment (after `.env` is loaded by
//! `main`), then overridden by CLI flags. Read-only afterwards.

use std::path::PathBuf;

use crate::error::{ConfigError, ConfigResult};
use crate::logs::LogLevel;
use crate::models::KEEP_COLUMN;

pub const ENV_INPUT_CSV: &str = "KEEPROW_INPUT_CSV";
pub const ENV_OUTPUT_CSV: &str = "KEEPROW_OUTPUT_CSV";
pub const ENV_RULES: &str = "KEEPROW_RULES";
pub const ENV_DELIMITER: &str = "KEEPROW_DELIMITER";
pub const ENV_LOG_LEVEL: &str = "KEEPROW_LOG_LEVEL";
pub const ENV_KEEP_COLUMN: &str = "KEEPROW_KEEP_COLUMN";

pub const DEFAULT_INPUT_CSV: &str = "businesses.csv";
pub const DEFAULT_OUTPUT_CSV: &str = "businesses_to_keep.csv";

/// Settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Rule set file; the built-in rules apply when absent
    pub rules: Option<PathBuf>,
    /// Overrides delimiter detection
    pub delimiter: Option<char>,
    pub log_level: LogLevel,
    /// Name of the appended decision column
    pub keep_column: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_CSV),
            output: PathBuf::from(DEFAULT_OUTPUT_CSV),
            rules: None,
            delimiter: None,
            log_level: LogLevel::Info,
            keep_column: KEEP_COLUMN.to_string(),
        }
    }
}

impl Settings {
    /// Resolve settings from process environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve settings through an arbitrary variable lookup.
    ///
    /// Unset variables fall back to defaults; variables that are set but
    /// empty are an error. Only the delimiter is read untrimmed, so a literal
    /// TAB counts as a value.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_raw = |name: &str| -> ConfigResult<Option<String>> {
            match lookup(name) {
                None => Ok(None),
                Some(v) if v.is_empty() => Err(ConfigError::MissingValue(name.to_string())),
                Some(v) => Ok(Some(v)),
            }
        };
        let get = |name: &str| -> ConfigResult<Option<String>> {
            match get_raw(name)? {
                Some(v) if v.trim().is_empty() => Err(ConfigError::MissingValue(name.to_string())),
                other => Ok(other),
            }
        };

        let mut settings = Settings::default();

        if let Some(v) = get(ENV_INPUT_CSV)? {
            settings.input = PathBuf::from(v.trim());
        }
        if let Some(v) = get(ENV_OUTPUT_CSV)? {
            settings.output = PathBuf::from(v.trim());
        }
        if let Some(v) = get(ENV_RULES)? {
            settings.rules = Some(PathBuf::from(v.trim()));
        }
        if let Some(v) = get_raw(ENV_DELIMITER)? {
            settings.delimiter = Some(parse_delimiter(ENV_DELIMITER, &v)?);
        }
        if let Some(v) = get(ENV_LOG_LEVEL)? {
            settings.log_level = parse_log_level(ENV_LOG_LEVEL, v.trim())?;
        }
        if let Some(v) = get(ENV_KEEP_COLUMN)? {
            settings.keep_column = v;
        }

        Ok(settings)
    }
}

/// Parse a single-character delimiter; `\t` and `tab` mean TAB.
pub fn parse_delimiter(name: &str, value: &str) -> ConfigResult<char> {
    let normalized = match value {
        "\\t" | "tab" | "TAB" => "\t",
        other => other,
    };

    let mut chars = normalized.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && c != '"' && c != '\n' && c != '\r' => Ok(c),
        _ => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
            message: "expected a single ASCII character".to_string(),
        }),
    }
}

pub fn parse_log_level(name: &str, value: &str) -> ConfigResult<LogLevel> {
    value.parse().map_err(|message| ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
        message,
    })
}
