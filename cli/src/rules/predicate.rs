//! Rule predicates
//!
//! The serializable predicate tree a rule set is written in. Rules name
//! columns; [`super::compiled`] resolves them against an input header.

use serde::{Deserialize, Serialize};

use super::activity::ActivityRule;
use super::registry::RegistryRule;

/// A predicate over one business record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Trimmed value is not empty
    NonEmpty { column: String },

    /// Trimmed value equals one of the listed values
    OneOf {
        column: String,
        values: Vec<String>,
        #[serde(default = "default_case_insensitive")]
        case_insensitive: bool,
    },

    /// Regex matches somewhere in the value
    Matches { column: String, pattern: String },

    /// Value parses as a number >= `min`
    NumberAtLeast { column: String, min: f64 },

    /// Value parses as a number <= `max`
    NumberAtMost { column: String, max: f64 },

    /// Value parses as a date on or after `date` (YYYY-MM-DD)
    DateOnOrAfter {
        column: String,
        date: String,
        #[serde(default = "default_date_formats")]
        formats: Vec<String>,
    },

    /// Value parses as a date strictly before `date` (YYYY-MM-DD)
    DateBefore {
        column: String,
        date: String,
        #[serde(default = "default_date_formats")]
        formats: Vec<String>,
    },

    /// Online activity score above a threshold
    ActivityScore(ActivityRule),

    /// Fuzzy name/address match against a local registry file
    RegistryMatch(RegistryRule),

    /// Every child rule passes
    All { rules: Vec<Rule> },

    /// At least one child rule passes
    Any { rules: Vec<Rule> },

    /// The child rule fails
    Not { rule: Box<Rule> },
}

fn default_case_insensitive() -> bool {
    true
}

pub(crate) fn default_date_formats() -> Vec<String> {
    vec![
        "%Y-%m-%d".to_string(),
        "%m/%d/%Y".to_string(),
        "%Y/%m/%d".to_string(),
    ]
}

impl Rule {
    /// Columns of the input file this rule reads, in first-seen order.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Rule::NonEmpty { column }
            | Rule::OneOf { column, .. }
            | Rule::Matches { column, .. }
            | Rule::NumberAtLeast { column, .. }
            | Rule::NumberAtMost { column, .. }
            | Rule::DateOnOrAfter { column, .. }
            | Rule::DateBefore { column, .. } => push_unique(out, column),
            Rule::ActivityScore(a) => {
                push_unique(out, &a.reviews_column);
                push_unique(out, &a.rating_column);
                push_unique(out, &a.photos_column);
            }
            Rule::RegistryMatch(r) => {
                push_unique(out, &r.name_column);
                push_unique(out, &r.address_column);
            }
            Rule::All { rules } | Rule::Any { rules } => {
                for rule in rules {
                    rule.collect_columns(out);
                }
            }
            Rule::Not { rule } => rule.collect_columns(out),
        }
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        match self {
            Rule::NonEmpty { column } => format!("'{}' is not empty", column),
            Rule::OneOf { column, values, .. } => {
                format!("'{}' in [{}]", column, values.join(", "))
            }
            Rule::Matches { column, pattern } => format!("'{}' matches /{}/", column, pattern),
            Rule::NumberAtLeast { column, min } => format!("'{}' >= {}", column, min),
            Rule::NumberAtMost { column, max } => format!("'{}' <= {}", column, max),
            Rule::DateOnOrAfter { column, date, .. } => format!("'{}' on or after {}", column, date),
            Rule::DateBefore { column, date, .. } => format!("'{}' before {}", column, date),
            Rule::ActivityScore(a) => format!("activity score > {}", a.threshold),
            Rule::RegistryMatch(r) => {
                format!("registry match in {} (>= {})", r.registry.display(), r.threshold)
            }
            Rule::All { rules } => format!("all of {} rules", rules.len()),
            Rule::Any { rules } => format!("any of {} rules", rules.len()),
            Rule::Not { rule } => format!("not ({})", rule.summary()),
        }
    }
}

fn push_unique<'a>(out: &mut Vec<&'a str>, column: &'a str) {
    if !out.contains(&column) {
        out.push(column);
    }
}

/// Catalogue of predicates, printed by `--list-predicates`
pub fn rules_description() -> String {
    r#"Available rule predicates:

| Type | Passes when | Parameters |
|------|-------------|------------|
| non_empty | trimmed value is not empty | column |
| one_of | trimmed value equals a listed value | column, values, case_insensitive (default true) |
| matches | regex matches the value | column, pattern |
| number_at_least | value is a number >= min ("1,200+" reads as 1200) | column, min |
| number_at_most | value is a number <= max | column, max |
| date_on_or_after | value is a date >= date | column, date (YYYY-MM-DD), formats |
| date_before | value is a date < date | column, date (YYYY-MM-DD), formats |
| activity_score | review/photo/rating activity score > threshold | reviews_column, rating_column, photos_column, expected_visibility (default 1.0), threshold (default 0.2) |
| registry_match | a registry row matches name + address | registry (CSV path), name_column, address_column, registry_name_column, registry_address_column, name_weight (0.25), address_weight (0.75), threshold (0.85) |
| all | every child passes (empty: true) | rules |
| any | some child passes (empty: false) | rules |
| not | child fails | rule |

Example rule set:
{
  "version": "1.0",
  "description": "Registered and reviewed",
  "id_column": "Name",
  "rule": {
    "type": "all",
    "rules": [
      {"type": "non_empty", "column": "Name"},
      {"type": "one_of", "column": "Status", "values": ["Active", "Activa"]},
      {"type": "date_on_or_after", "column": "Registered", "date": "2015-01-01"}
    ]
  }
}"#
    .to_string()
}
