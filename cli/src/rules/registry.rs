//! Registry match
//!
//! Loads a local CSV of official registry entries and fuzzy-matches a
//! record's name and address against it. Similarities are Indel ratios
//! (`2 * LCS / (len1 + len2)`) on lowercased, trimmed text, so every score
//! and the threshold live on a `0..=1` scale.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RulesError, RulesResult};
use crate::logs::log_info_indent;
use crate::parser::load_csv;

/// Parameters of a `registry_match` rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryRule {
    /// Registry CSV path
    pub registry: PathBuf,

    #[serde(default = "default_name_column")]
    pub name_column: String,

    #[serde(default = "default_address_column")]
    pub address_column: String,

    #[serde(default = "default_registry_name_column")]
    pub registry_name_column: String,

    #[serde(default = "default_registry_address_column")]
    pub registry_address_column: String,

    #[serde(default = "default_name_weight")]
    pub name_weight: f64,

    #[serde(default = "default_address_weight")]
    pub address_weight: f64,

    #[serde(default = "default_registry_threshold")]
    pub threshold: f64,

    /// Registry delimiter (auto-detect when absent)
    #[serde(default)]
    pub delimiter: Option<char>,
}

fn default_name_column() -> String {
    "Name".to_string()
}

fn default_address_column() -> String {
    "Street 1".to_string()
}

fn default_registry_name_column() -> String {
    "name".to_string()
}

fn default_registry_address_column() -> String {
    "address".to_string()
}

fn default_name_weight() -> f64 {
    0.25
}

fn default_address_weight() -> f64 {
    0.75
}

fn default_registry_threshold() -> f64 {
    0.85
}

impl RegistryRule {
    pub fn new(registry: impl Into<PathBuf>) -> Self {
        Self {
            registry: registry.into(),
            name_column: default_name_column(),
            address_column: default_address_column(),
            registry_name_column: default_registry_name_column(),
            registry_address_column: default_registry_address_column(),
            name_weight: default_name_weight(),
            address_weight: default_address_weight(),
            threshold: default_registry_threshold(),
            delimiter: None,
        }
    }
}

/// One registry entry, normalized for comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub address: String,
}

impl Candidate {
    pub fn new(name: &str, address: &str) -> Self {
        Self {
            name: normalize(name),
            address: normalize(address),
        }
    }
}

/// Loaded registry plus match weights
#[derive(Debug, Clone)]
pub struct Registry {
    candidates: Vec<Candidate>,
    name_weight: f64,
    address_weight: f64,
    threshold: f64,
}

impl Registry {
    pub fn new(candidates: Vec<Candidate>, name_weight: f64, address_weight: f64, threshold: f64) -> Self {
        Self {
            candidates,
            name_weight,
            address_weight,
            threshold,
        }
    }

    /// Load the registry file named by a rule.
    pub fn load(rule: &RegistryRule) -> RulesResult<Self> {
        let path = rule.registry.as_path();
        let parsed = load_csv(path, rule.delimiter).map_err(|e| registry_error(path, e.to_string()))?;

        let name_idx = parsed
            .schema
            .position(&rule.registry_name_column)
            .ok_or_else(|| registry_error(path, format!("missing column '{}'", rule.registry_name_column)))?;
        let address_idx = parsed
            .schema
            .position(&rule.registry_address_column)
            .ok_or_else(|| registry_error(path, format!("missing column '{}'", rule.registry_address_column)))?;

        let candidates: Vec<Candidate> = parsed
            .records
            .iter()
            .map(|r| Candidate::new(r.value(name_idx).unwrap_or(""), r.value(address_idx).unwrap_or("")))
            .collect();

        log_info_indent(
            format!("Loaded {} registry entries from {}", candidates.len(), path.display()),
            1,
        );

        Ok(Self::new(candidates, rule.name_weight, rule.address_weight, rule.threshold))
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Weighted similarity of a record against one candidate.
    pub fn score(&self, name: &str, address: &str, candidate: &Candidate) -> f64 {
        let name = normalize(name);
        let address = normalize(address);
        self.score_normalized(&name, &address, candidate)
    }

    fn score_normalized(&self, name: &str, address: &str, candidate: &Candidate) -> f64 {
        let name_score = if name.is_empty() {
            0.0
        } else {
            similarity(name, &candidate.name)
        };
        let address_score = if address.is_empty() || candidate.address.is_empty() {
            0.0
        } else {
            similarity(address, &candidate.address)
        };

        self.name_weight * name_score + self.address_weight * address_score
    }

    /// First candidate scoring at or above the threshold.
    pub fn find_match(&self, name: &str, address: &str) -> Option<&Candidate> {
        let name = normalize(name);
        let address = normalize(address);

        self.candidates
            .iter()
            .find(|c| self.score_normalized(&name, &address, c) >= self.threshold)
    }

    pub fn has_match(&self, name: &str, address: &str) -> bool {
        self.find_match(name, address).is_some()
    }
}

/// Indel similarity of two normalized strings.
pub fn similarity(a: &str, b: &str) -> f64 {
    rapidfuzz::fuzz::ratio(a.chars(), b.chars())
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn registry_error(path: &Path, message: String) -> RulesError {
    RulesError::Registry {
        path: path.to_path_buf(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn registry() -> Registry {
        Registry::new(
            vec![
                Candidate::new("PETCO ANIMAL SUPPLIES INC", "65 Ave De Diego, San Juan"),
                Candidate::new("Condal LLC", "201 Calle Tetuan, San Juan"),
            ],
            0.25,
            0.75,
            0.85,
        )
    }

    #[test]
    fn test_exact_address_and_close_name_match() {
        let reg = registry();
        let hit = reg.find_match("Condal LLC", "201 calle tetuan, san juan");
        assert_eq!(hit.map(|c| c.name.as_str()), Some("condal llc"));
    }

    #[test]
    fn test_name_alone_cannot_reach_threshold() {
        let reg = registry();
        // A perfect name gives at most 0.25
        assert!(!reg.has_match("Condal LLC", ""));
        let score = reg.score("Condal LLC", "", &Candidate::new("Condal LLC", "x"));
        assert!((score - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_is_indel_ratio() {
        // 2 * 6 / (10 + 6); edit-distance normalization would give 0.6
        assert!((similarity("condal llc", "condal") - 0.75).abs() < 1e-9);
        assert!((similarity("petco", "petco") - 1.0).abs() < 1e-9);
        assert!(similarity("abc", "xyz").abs() < 1e-9);
    }

    #[test]
    fn test_length_mismatched_name_scores_by_ratio() {
        let reg = Registry::new(Vec::new(), 1.0, 0.0, 0.75);
        let cand = Candidate::new("Condal LLC", "");
        let score = reg.score("Condal", "", &cand);
        assert!((score - 0.75).abs() < 1e-9);

        let reg = Registry::new(vec![cand], 1.0, 0.0, 0.7);
        assert!(reg.has_match("CONDAL", ""));
    }

    #[test]
    fn test_unrelated_business_does_not_match() {
        let reg = registry();
        assert!(!reg.has_match("Panadería La Esquina", "12 Calle Sol, Ponce"));
    }

    #[test]
    fn test_empty_candidate_address_scores_zero() {
        let reg = registry();
        let cand = Candidate::new("Condal LLC", "");
        let score = reg.score("Condal LLC", "201 Calle Tetuan", &cand);
        assert!((score - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_load_from_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "name,address\nCondal LLC,201 Calle Tetuan\n").unwrap();

        let reg = Registry::load(&RegistryRule::new(file.path())).unwrap();
        assert_eq!(reg.len(), 1);
        assert!(reg.has_match("condal llc", "201 Calle Tetuan"));
    }

    #[test]
    fn test_load_requires_columns() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "corp,addr\nCondal LLC,201 Calle Tetuan\n").unwrap();

        let err = Registry::load(&RegistryRule::new(file.path())).unwrap_err();
        assert!(err.to_string().contains("missing column 'name'"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Registry::load(&RegistryRule::new(dir.path().join("registry.csv"))).unwrap_err();
        assert!(matches!(err, RulesError::Registry { .. }));
    }
}
