//! Configurable keep rules
//!
//! This module provides:
//! - `predicate`: the serializable rule tree
//! - `ruleset`: rule set documents (JSON) and the built-in default
//! - `compiled`: rules resolved against an input header, ready to evaluate
//! - `activity`: online activity score
//! - `registry`: fuzzy match against a local registry CSV
//!
//! ## Usage Flow
//!
//! ```text
//! rules.json → RuleSet::from_file → CompiledRule::compile(schema) → evaluate(record)
//! ```

pub mod activity;
pub mod compiled;
pub mod predicate;
pub mod registry;
pub mod ruleset;

pub use activity::{activity_score, ActivityRule};
pub use compiled::{parse_date, parse_number, Column, CompiledRule, KeepRule};
pub use predicate::{rules_description, Rule};
pub use registry::{Candidate, Registry, RegistryRule};
pub use ruleset::{default_rules, MissingColumns, RuleSet};
