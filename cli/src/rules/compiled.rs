//! Rule compilation and evaluation
//!
//! A [`Rule`] names columns; a [`CompiledRule`] holds resolved column
//! indices, parsed regexes and dates, and loaded registries, so evaluating a
//! row never fails.

use chrono::{DateTime, NaiveDate};
use regex::Regex;

use super::activity::activity_score;
use super::predicate::Rule;
use super::registry::Registry;
use super::ruleset::MissingColumns;
use crate::error::{RulesError, RulesResult};
use crate::models::{BusinessRecord, Schema};

/// Decides whether a record shows enough evidence to keep.
///
/// Implemented by compiled rule sets and by any `Fn(&BusinessRecord) -> bool`.
pub trait KeepRule {
    fn keep(&self, record: &BusinessRecord) -> bool;

    fn describe(&self) -> String {
        "custom rule".to_string()
    }
}

impl<F> KeepRule for F
where
    F: Fn(&BusinessRecord) -> bool,
{
    fn keep(&self, record: &BusinessRecord) -> bool {
        self(record)
    }
}

/// A column reference resolved against a schema
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Column {
    At(usize),
    /// Not in the input; reads as empty
    Absent,
}

impl Column {
    fn read<'a>(&self, record: &'a BusinessRecord) -> &'a str {
        match self {
            Column::At(i) => record.value(*i).unwrap_or(""),
            Column::Absent => "",
        }
    }
}

/// A rule ready to evaluate against rows of one schema
#[derive(Debug, Clone)]
pub enum CompiledRule {
    NonEmpty(Column),
    OneOf {
        column: Column,
        values: Vec<String>,
        case_insensitive: bool,
    },
    Matches {
        column: Column,
        regex: Regex,
    },
    NumberAtLeast {
        column: Column,
        min: f64,
    },
    NumberAtMost {
        column: Column,
        max: f64,
    },
    DateOnOrAfter {
        column: Column,
        date: NaiveDate,
        formats: Vec<String>,
    },
    DateBefore {
        column: Column,
        date: NaiveDate,
        formats: Vec<String>,
    },
    Activity {
        reviews: Column,
        rating: Column,
        photos: Column,
        expected_visibility: f64,
        threshold: f64,
    },
    Registry {
        name: Column,
        address: Column,
        registry: Registry,
    },
    All(Vec<CompiledRule>),
    Any(Vec<CompiledRule>),
    Not(Box<CompiledRule>),
}

impl CompiledRule {
    /// Resolve `rule` against `schema`.
    pub fn compile(rule: &Rule, schema: &Schema, policy: MissingColumns) -> RulesResult<Self> {
        let col = |name: &str| resolve_column(schema, name, policy);

        Ok(match rule {
            Rule::NonEmpty { column } => CompiledRule::NonEmpty(col(column)?),
            Rule::OneOf {
                column,
                values,
                case_insensitive,
            } => CompiledRule::OneOf {
                column: col(column)?,
                values: values
                    .iter()
                    .map(|v| fold(v.trim(), *case_insensitive))
                    .collect(),
                case_insensitive: *case_insensitive,
            },
            Rule::Matches { column, pattern } => CompiledRule::Matches {
                column: col(column)?,
                regex: Regex::new(pattern).map_err(|e| RulesError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?,
            },
            Rule::NumberAtLeast { column, min } => CompiledRule::NumberAtLeast {
                column: col(column)?,
                min: finite("min", *min)?,
            },
            Rule::NumberAtMost { column, max } => CompiledRule::NumberAtMost {
                column: col(column)?,
                max: finite("max", *max)?,
            },
            Rule::DateOnOrAfter {
                column,
                date,
                formats,
            } => CompiledRule::DateOnOrAfter {
                column: col(column)?,
                date: threshold_date(date)?,
                formats: formats.clone(),
            },
            Rule::DateBefore {
                column,
                date,
                formats,
            } => CompiledRule::DateBefore {
                column: col(column)?,
                date: threshold_date(date)?,
                formats: formats.clone(),
            },
            Rule::ActivityScore(a) => CompiledRule::Activity {
                reviews: col(&a.reviews_column)?,
                rating: col(&a.rating_column)?,
                photos: col(&a.photos_column)?,
                expected_visibility: positive("expected_visibility", a.expected_visibility)?,
                threshold: unit_interval("threshold", a.threshold)?,
            },
            Rule::RegistryMatch(r) => {
                non_negative("name_weight", r.name_weight)?;
                non_negative("address_weight", r.address_weight)?;
                unit_interval("threshold", r.threshold)?;
                CompiledRule::Registry {
                    name: col(&r.name_column)?,
                    address: col(&r.address_column)?,
                    registry: Registry::load(r)?,
                }
            }
            Rule::All { rules } => CompiledRule::All(compile_all(rules, schema, policy)?),
            Rule::Any { rules } => CompiledRule::Any(compile_all(rules, schema, policy)?),
            Rule::Not { rule } => CompiledRule::Not(Box::new(Self::compile(rule, schema, policy)?)),
        })
    }

    /// Evaluate against one record.
    pub fn evaluate(&self, record: &BusinessRecord) -> bool {
        match self {
            CompiledRule::NonEmpty(column) => !column.read(record).trim().is_empty(),
            CompiledRule::OneOf {
                column,
                values,
                case_insensitive,
            } => {
                let value = fold(column.read(record).trim(), *case_insensitive);
                values.iter().any(|v| *v == value)
            }
            CompiledRule::Matches { column, regex } => regex.is_match(column.read(record)),
            CompiledRule::NumberAtLeast { column, min } => {
                parse_number(column.read(record)).is_some_and(|n| n >= *min)
            }
            CompiledRule::NumberAtMost { column, max } => {
                parse_number(column.read(record)).is_some_and(|n| n <= *max)
            }
            CompiledRule::DateOnOrAfter {
                column,
                date,
                formats,
            } => parse_date(column.read(record), formats).is_some_and(|d| d >= *date),
            CompiledRule::DateBefore {
                column,
                date,
                formats,
            } => parse_date(column.read(record), formats).is_some_and(|d| d < *date),
            CompiledRule::Activity {
                reviews,
                rating,
                photos,
                expected_visibility,
                threshold,
            } => {
                let score = activity_score(
                    reviews.read(record),
                    rating.read(record),
                    photos.read(record),
                    *expected_visibility,
                );
                score > *threshold
            }
            CompiledRule::Registry {
                name,
                address,
                registry,
            } => registry.has_match(name.read(record), address.read(record)),
            CompiledRule::All(rules) => rules.iter().all(|r| r.evaluate(record)),
            CompiledRule::Any(rules) => rules.iter().any(|r| r.evaluate(record)),
            CompiledRule::Not(rule) => !rule.evaluate(record),
        }
    }
}

impl KeepRule for CompiledRule {
    fn keep(&self, record: &BusinessRecord) -> bool {
        self.evaluate(record)
    }

    fn describe(&self) -> String {
        "compiled rule set".to_string()
    }
}

fn compile_all(rules: &[Rule], schema: &Schema, policy: MissingColumns) -> RulesResult<Vec<CompiledRule>> {
    rules
        .iter()
        .map(|r| CompiledRule::compile(r, schema, policy))
        .collect()
}

fn resolve_column(schema: &Schema, name: &str, policy: MissingColumns) -> RulesResult<Column> {
    match (schema.position(name), policy) {
        (Some(i), _) => Ok(Column::At(i)),
        (None, MissingColumns::TreatAsEmpty) => Ok(Column::Absent),
        (None, MissingColumns::Error) => Err(RulesError::UnknownColumn(name.to_string())),
    }
}

fn fold(value: &str, case_insensitive: bool) -> String {
    if case_insensitive {
        value.to_lowercase()
    } else {
        value.to_string()
    }
}

fn threshold_date(date: &str) -> RulesResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| RulesError::InvalidDate(date.to_string()))
}

fn finite(field: &str, value: f64) -> RulesResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(field, "must be a finite number"))
    }
}

fn positive(field: &str, value: f64) -> RulesResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(field, "must be greater than 0"))
    }
}

fn non_negative(field: &str, value: f64) -> RulesResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(invalid(field, "must be 0 or greater"))
    }
}

fn unit_interval(field: &str, value: f64) -> RulesResult<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(invalid(field, "must be between 0 and 1"))
    }
}

fn invalid(field: &str, message: &str) -> RulesError {
    RulesError::InvalidWeight {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Parse a count or measure as written in listing exports.
///
/// Accepts thousands separators and a trailing `+` ("1,200+" is 1200).
pub fn parse_number(value: &str) -> Option<f64> {
    let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.strip_suffix('+').unwrap_or(&cleaned).trim();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a date, trying RFC 3339 first and then each format.
///
/// Values with a trailing time part (`2021-03-04 10:00`) are retried on
/// their first token.
pub fn parse_date(value: &str, formats: &[String]) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    let try_formats = |s: &str| {
        formats
            .iter()
            .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
    };

    try_formats(value).or_else(|| {
        value
            .split_whitespace()
            .next()
            .filter(|first| *first != value)
            .and_then(try_formats)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::predicate::default_date_formats;
    use crate::rules::ActivityRule;

    fn schema() -> Schema {
        Schema::new(vec![
            "Name".into(),
            "Status".into(),
            "Registered".into(),
            "Reviews count".into(),
        ])
    }

    fn row(values: &[&str]) -> BusinessRecord {
        BusinessRecord::new(0, values.iter().map(|v| v.to_string()).collect())
    }

    fn compile(rule: Rule) -> CompiledRule {
        CompiledRule::compile(&rule, &schema(), MissingColumns::Error).unwrap()
    }

    #[test]
    fn test_non_empty_trims() {
        let rule = compile(Rule::NonEmpty { column: "Name".into() });
        assert!(rule.evaluate(&row(&["Petco", "", "", ""])));
        assert!(!rule.evaluate(&row(&["   ", "", "", ""])));
    }

    #[test]
    fn test_one_of_case_folding() {
        let rule = compile(Rule::OneOf {
            column: "Status".into(),
            values: vec!["Active ".into(), "ACTIVA".into()],
            case_insensitive: true,
        });
        assert!(rule.evaluate(&row(&["", " active", "", ""])));
        assert!(rule.evaluate(&row(&["", "Activa", "", ""])));
        assert!(!rule.evaluate(&row(&["", "Inactive", "", ""])));

        let strict = compile(Rule::OneOf {
            column: "Status".into(),
            values: vec!["Active".into()],
            case_insensitive: false,
        });
        assert!(!strict.evaluate(&row(&["", "active", "", ""])));
    }

    #[test]
    fn test_matches() {
        let rule = compile(Rule::Matches {
            column: "Name".into(),
            pattern: r"(?i)\b(closed|cerrado)\b".into(),
        });
        assert!(rule.evaluate(&row(&["Bodega (CERRADO)", "", "", ""])));
        assert!(!rule.evaluate(&row(&["Bodega Central", "", "", ""])));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = CompiledRule::compile(
            &Rule::Matches { column: "Name".into(), pattern: "(".into() },
            &schema(),
            MissingColumns::Error,
        )
        .unwrap_err();
        assert!(matches!(err, RulesError::InvalidPattern { .. }));
    }

    #[test]
    fn test_number_bounds() {
        let at_least = compile(Rule::NumberAtLeast { column: "Reviews count".into(), min: 10.0 });
        assert!(at_least.evaluate(&row(&["", "", "", "1,200+"])));
        assert!(at_least.evaluate(&row(&["", "", "", "10"])));
        assert!(!at_least.evaluate(&row(&["", "", "", "9"])));
        assert!(!at_least.evaluate(&row(&["", "", "", "n/a"])));

        let at_most = compile(Rule::NumberAtMost { column: "Reviews count".into(), max: 10.0 });
        assert!(at_most.evaluate(&row(&["", "", "", "3"])));
        assert!(!at_most.evaluate(&row(&["", "", "", ""])));
    }

    #[test]
    fn test_date_thresholds() {
        let after = compile(Rule::DateOnOrAfter {
            column: "Registered".into(),
            date: "2015-01-01".into(),
            formats: default_date_formats(),
        });
        assert!(after.evaluate(&row(&["", "", "2015-01-01", ""])));
        assert!(after.evaluate(&row(&["", "", "03/14/2019", ""])));
        assert!(after.evaluate(&row(&["", "", "2020-06-01T12:00:00Z", ""])));
        assert!(after.evaluate(&row(&["", "", "2016-02-03 08:30", ""])));
        assert!(!after.evaluate(&row(&["", "", "2014-12-31", ""])));
        assert!(!after.evaluate(&row(&["", "", "someday", ""])));

        let before = compile(Rule::DateBefore {
            column: "Registered".into(),
            date: "2015-01-01".into(),
            formats: default_date_formats(),
        });
        assert!(before.evaluate(&row(&["", "", "2014-12-31", ""])));
        assert!(!before.evaluate(&row(&["", "", "2015-01-01", ""])));
    }

    #[test]
    fn test_invalid_threshold_date() {
        let err = CompiledRule::compile(
            &Rule::DateBefore {
                column: "Registered".into(),
                date: "01/01/2015".into(),
                formats: default_date_formats(),
            },
            &schema(),
            MissingColumns::Error,
        )
        .unwrap_err();
        assert!(matches!(err, RulesError::InvalidDate(_)));
    }

    #[test]
    fn test_combinators() {
        let name = Rule::NonEmpty { column: "Name".into() };
        let status = Rule::NonEmpty { column: "Status".into() };

        let all = compile(Rule::All { rules: vec![name.clone(), status.clone()] });
        let any = compile(Rule::Any { rules: vec![name.clone(), status] });
        let not = compile(Rule::Not { rule: Box::new(name) });
        let record = row(&["Petco", "", "", ""]);

        assert!(!all.evaluate(&record));
        assert!(any.evaluate(&record));
        assert!(!not.evaluate(&record));
    }

    #[test]
    fn test_empty_combinators() {
        let record = row(&["", "", "", ""]);
        assert!(compile(Rule::All { rules: vec![] }).evaluate(&record));
        assert!(!compile(Rule::Any { rules: vec![] }).evaluate(&record));
    }

    #[test]
    fn test_unknown_column_policy() {
        let rule = Rule::NonEmpty { column: "Phone".into() };

        let err = CompiledRule::compile(&rule, &schema(), MissingColumns::Error).unwrap_err();
        assert!(matches!(err, RulesError::UnknownColumn(ref c) if c == "Phone"));

        let lenient = CompiledRule::compile(&rule, &schema(), MissingColumns::TreatAsEmpty).unwrap();
        assert!(!lenient.evaluate(&row(&["Petco", "", "", ""])));
    }

    #[test]
    fn test_activity_rule_threshold_is_strict() {
        let rule = Rule::ActivityScore(ActivityRule {
            rating_column: "Status".into(),
            photos_column: "Registered".into(),
            ..ActivityRule::default()
        });
        let compiled = compile(rule);

        // 100 reviews -> 0.6 * 100/300 = 0.2, not above the threshold
        assert!(!compiled.evaluate(&row(&["", "", "", "100"])));
        assert!(compiled.evaluate(&row(&["", "", "", "101"])));
    }

    #[test]
    fn test_activity_rule_rejects_bad_threshold() {
        let rule = Rule::ActivityScore(ActivityRule {
            threshold: 1.5,
            ..ActivityRule::default()
        });
        let err = CompiledRule::compile(&rule, &schema(), MissingColumns::TreatAsEmpty).unwrap_err();
        assert!(matches!(err, RulesError::InvalidWeight { .. }));
    }

    #[test]
    fn test_closure_is_keep_rule() {
        let rule = |r: &BusinessRecord| r.value(0) == Some("keep");
        assert!(rule.keep(&row(&["keep", "", "", ""])));
        assert!(!rule.keep(&row(&["drop", "", "", ""])));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("708+"), Some(708.0));
        assert_eq!(parse_number(" 1,234 "), Some(1234.0));
        assert_eq!(parse_number("4.5"), Some(4.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("+"), None);
        assert_eq!(parse_number("NaN"), None);
    }
}
