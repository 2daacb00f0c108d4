//! JSON Schema validation for rule set documents.
//!
//! The rule set schema (Draft 7) is embedded at compile time from
//! `schemas/rules.schema.json`. Validation runs before deserialization so a
//! broken rule file reports every violation at once instead of serde's
//! first error.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use keeprow::validation::validate_rule_set;
//!
//! let rules = json!({ "rule": { "type": "non_empty", "column": "Name" } });
//! assert!(validate_rule_set(&rules).is_ok());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

static RULES_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/rules.schema.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON value against a Draft 7 schema.
///
/// Returns every violation message.
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick boolean check.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// The embedded rule set schema.
pub fn rules_schema() -> &'static Value {
    &RULES_SCHEMA
}

/// Validate a rule set document.
pub fn validate_rule_set(data: &Value) -> Result<(), Vec<String>> {
    validate(&RULES_SCHEMA, data)
}

/// Quick check against the rule set schema.
pub fn is_valid_rule_set(data: &Value) -> bool {
    is_valid(&RULES_SCHEMA, data)
}
