//! Rule set definition
//!
//! A rule set is the JSON document that decides "Keep row". It is checked
//! against the embedded rule set schema before being deserialized.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use super::activity::ActivityRule;
use super::predicate::Rule;
use crate::error::{RulesError, RulesResult};
use crate::validation::validate_rule_set;

/// How rules treat columns the input file does not have
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingColumns {
    /// Compilation fails with an unknown column error
    #[default]
    Error,
    /// The column reads as empty on every row
    TreatAsEmpty,
}

/// A complete rule set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub description: String,

    /// Column identifying a business in logs (row position otherwise)
    #[serde(default)]
    pub id_column: Option<String>,

    #[serde(default)]
    pub missing_columns: MissingColumns,

    /// Root predicate
    pub rule: Rule,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl RuleSet {
    pub fn new(rule: Rule) -> Self {
        Self {
            version: default_version(),
            description: String::new(),
            id_column: None,
            missing_columns: MissingColumns::default(),
            rule,
        }
    }

    /// Parse and validate a rule set from a JSON string
    pub fn from_json(json: &str) -> RulesResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Validate and deserialize a rule set from a JSON value
    pub fn from_value(value: Value) -> RulesResult<Self> {
        validate_rule_set(&value).map_err(|errors| RulesError::Schema { errors })?;
        Ok(serde_json::from_value(value)?)
    }

    /// Read a rule set file
    pub fn from_file(path: &Path) -> RulesResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| RulesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> RulesResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Rule set used when none is configured.
///
/// Keeps a business with a name, a street address and an online activity
/// score above 0.2. Columns missing from the input read as empty.
pub fn default_rules() -> RuleSet {
    RuleSet {
        version: default_version(),
        description: "Named business with a street address and measurable online activity"
            .to_string(),
        id_column: Some("Name".to_string()),
        missing_columns: MissingColumns::TreatAsEmpty,
        rule: Rule::All {
            rules: vec![
                Rule::NonEmpty {
                    column: "Name".to_string(),
                },
                Rule::NonEmpty {
                    column: "Street 1".to_string(),
                },
                Rule::ActivityScore(ActivityRule::default()),
            ],
        },
    }
}
