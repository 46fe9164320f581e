use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hygiene status for canonicalization attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HygieneStatus {
    /// The input was already in canonical order.
    Ok,
    /// The input was accepted but had to be reordered; the source text was
    /// not canonical.
    Ambiguous,
    /// The input was invalid and must be rejected.
    Invalid,
}

/// Stable warning code emitted by canonicalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HygieneWarning(String);

impl HygieneWarning {
    /// Creates a warning from a literal code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the warning code.
    pub fn code(&self) -> &str {
        &self.0
    }
}

/// Hygiene reports produced during canonicalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HygieneReport {
    /// Overall hygiene status.
    pub status: HygieneStatus,
    /// Stable warning codes, each listed once.
    pub warnings: Vec<HygieneWarning>,
    /// Structure counts (`dictionaries`, `arrays`, `keys`, `reordered_dictionaries`).
    pub metrics: BTreeMap<String, u64>,
}

impl HygieneReport {
    pub(crate) fn new() -> Self {
        let metrics = ["arrays", "dictionaries", "keys", "reordered_dictionaries"]
            .into_iter()
            .map(|name| (name.to_string(), 0))
            .collect();
        Self {
            status: HygieneStatus::Ok,
            warnings: vec![],
            metrics,
        }
    }

    pub(crate) fn bump(&mut self, metric: &str, by: u64) {
        *self.metrics.entry(metric.to_string()).or_insert(0) += by;
    }

    pub(crate) fn warn_once(&mut self, code: &str) {
        if !self.warnings.iter().any(|w| w.code() == code) {
            self.warnings.push(HygieneWarning::new(code));
        }
    }
}
