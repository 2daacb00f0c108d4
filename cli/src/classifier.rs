//! Record classifier.
//!
//! Wraps a [`KeepRule`] and turns records into [`Decision`]s, one per record,
//! in input order.

use crate::error::{RulesError, RulesResult};
use crate::logs::log_debug;
use crate::models::{BusinessRecord, Decision, Schema};
use crate::rules::{CompiledRule, KeepRule, MissingColumns, RuleSet};

pub struct Classifier {
    rule: Box<dyn KeepRule>,
    id_column: Option<String>,
}

impl Classifier {
    /// Compile a rule set against an input schema.
    pub fn compile(rules: &RuleSet, schema: &Schema) -> RulesResult<Self> {
        if let Some(ref id) = rules.id_column {
            if rules.missing_columns == MissingColumns::Error && !schema.contains(id) {
                return Err(RulesError::UnknownColumn(id.clone()));
            }
        }

        let compiled = CompiledRule::compile(&rules.rule, schema, rules.missing_columns)?;
        Ok(Self {
            rule: Box::new(compiled),
            id_column: rules.id_column.clone(),
        })
    }

    /// Use a caller-supplied rule.
    pub fn from_rule(rule: impl KeepRule + 'static) -> Self {
        Self {
            rule: Box::new(rule),
            id_column: None,
        }
    }

    pub fn with_id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = Some(column.into());
        self
    }

    pub fn describe(&self) -> String {
        self.rule.describe()
    }

    pub fn classify(&self, record: &BusinessRecord) -> Decision {
        Decision::new(record.position(), self.rule.keep(record))
    }

    /// Classify every record, logging each decision at debug level.
    pub fn classify_all(&self, schema: &Schema, records: &[BusinessRecord]) -> Vec<Decision> {
        records
            .iter()
            .map(|record| {
                let decision = self.classify(record);
                log_debug(format!(
                    "{} → {}",
                    record.identity(schema, self.id_column.as_deref()),
                    decision.as_str()
                ));
                decision
            })
            .collect()
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("rule", &self.rule.describe())
            .field("id_column", &self.id_column)
            .finish()
    }
}
