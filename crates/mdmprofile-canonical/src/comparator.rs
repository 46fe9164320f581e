//! Ordering-diff suppression for scope-like substructures.
//!
//! The lifecycle framework hands over the prior and proposed values of a
//! resource's attributes. Inside each configured substructure (`scope` and
//! `exclusions` by default), identifier-list fields are compared as sets; any
//! other key must be deep-equal. When the substructure is equivalent the old
//! value is kept, so a reordered ID list never shows up as a change.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::value::{Dictionary, Document, Value, ValueKind};

/// Substructures compared when no configuration is given.
pub const DEFAULT_SCOPE_NAMES: [&str; 2] = ["scope", "exclusions"];

/// Suffix that marks identifier-list fields by default.
pub const DEFAULT_ID_FIELD_SUFFIX: &str = "_ids";

/// Selects which keys inside a substructure carry identifier lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdFieldMatcher {
    names: BTreeSet<String>,
    suffix: Option<String>,
}

impl Default for IdFieldMatcher {
    fn default() -> Self {
        Self::suffix(DEFAULT_ID_FIELD_SUFFIX)
    }
}

impl IdFieldMatcher {
    /// Matches keys ending in `suffix`.
    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self {
            names: BTreeSet::new(),
            suffix: Some(suffix.into()),
        }
    }

    /// Matches exactly the given key names.
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            suffix: None,
        }
    }

    /// Adds an explicit key name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    /// True when `key` is an identifier-list field.
    pub fn matches(&self, key: &str) -> bool {
        self.names.contains(key)
            || self
                .suffix
                .as_deref()
                .is_some_and(|suffix| !suffix.is_empty() && key.ends_with(suffix))
    }
}

/// Comparator settings, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparatorConfig {
    /// Top-level substructures to compare.
    pub scope_names: Vec<String>,
    /// Explicit identifier-list key names.
    pub id_field_names: Vec<String>,
    /// Suffix marking identifier-list keys; `null` disables suffix matching.
    pub id_field_suffix: Option<String>,
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self {
            scope_names: DEFAULT_SCOPE_NAMES.iter().map(|s| s.to_string()).collect(),
            id_field_names: Vec::new(),
            id_field_suffix: Some(DEFAULT_ID_FIELD_SUFFIX.to_string()),
        }
    }
}

/// An identifier-list field whose value is not a list of integers. Soft: the
/// comparison cannot confirm equivalence, but nothing is aborted.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaMismatch {
    /// The field is not an array.
    #[error("identifier list '{field}' is a {found}, not an array")]
    NotAnArray {
        /// Field name.
        field: String,
        /// Kind found.
        found: ValueKind,
    },
    /// An element is not an integer.
    #[error("identifier list '{field}' has a {found} at index {index}")]
    NonInteger {
        /// Field name.
        field: String,
        /// Element position.
        index: usize,
        /// Kind found.
        found: ValueKind,
    },
}

/// Outcome of comparing one substructure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Equivalence {
    /// Old and new are deep-equal.
    Identical,
    /// Only identifier-list order differs in the named fields.
    OrderingOnly {
        /// Fields whose order differs.
        fields: Vec<String>,
    },
    /// A real change at `key`.
    Differs {
        /// First differing key.
        key: String,
    },
    /// Identifier lists could not be read as integer lists.
    Unconfirmed {
        /// Why.
        mismatches: Vec<SchemaMismatch>,
    },
}

impl Equivalence {
    /// True for [`Equivalence::Identical`] and [`Equivalence::OrderingOnly`].
    pub fn is_equivalent(&self) -> bool {
        matches!(self, Equivalence::Identical | Equivalence::OrderingOnly { .. })
    }
}

impl fmt::Display for Equivalence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Equivalence::Identical => write!(f, "identical"),
            Equivalence::OrderingOnly { fields } => {
                write!(f, "ordering only ({})", fields.join(", "))
            }
            Equivalence::Differs { key } => write!(f, "differs at '{}'", key),
            Equivalence::Unconfirmed { mismatches } => {
                let reasons: Vec<String> = mismatches.iter().map(|m| m.to_string()).collect();
                write!(f, "unconfirmed: {}", reasons.join("; "))
            }
        }
    }
}

/// Result of [`Comparator::suppress`] over a whole attribute document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuppressionOutcome {
    /// Per-name decisions, for names whose value changed.
    pub decisions: BTreeMap<String, Equivalence>,
    /// Names whose proposed value was replaced by the old one.
    pub suppressed: Vec<String>,
    /// The proposed document with suppressed names rewritten to their old
    /// values; `None` when nothing was suppressed.
    pub document: Option<Document>,
}

/// Decides whether scope-like substructures changed beyond ID ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparator {
    scope_names: Vec<String>,
    matcher: IdFieldMatcher,
}

impl Default for Comparator {
    fn default() -> Self {
        Self::from_config(&ComparatorConfig::default())
    }
}

impl Comparator {
    /// Creates a comparator for explicit names and matcher.
    pub fn new<I, S>(scope_names: I, matcher: IdFieldMatcher) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scope_names: scope_names.into_iter().map(Into::into).collect(),
            matcher,
        }
    }

    /// Creates a comparator from configuration.
    pub fn from_config(config: &ComparatorConfig) -> Self {
        let matcher = IdFieldMatcher {
            names: config.id_field_names.iter().cloned().collect(),
            suffix: config.id_field_suffix.clone(),
        };
        Self::new(config.scope_names.iter().cloned(), matcher)
    }

    /// Substructure names this comparator looks at.
    pub fn scope_names(&self) -> &[String] {
        &self.scope_names
    }

    /// The identifier-list selector.
    pub fn matcher(&self) -> &IdFieldMatcher {
        &self.matcher
    }

    /// Compares two versions of one substructure.
    ///
    /// The key sets must match. Identifier-list fields are compared sorted;
    /// every other key must be deep-equal. A genuine difference anywhere wins
    /// over a schema mismatch.
    pub fn compare_substructure(&self, old: &Dictionary, new: &Dictionary) -> Equivalence {
        let old_keys: BTreeSet<&String> = old.keys().collect();
        let new_keys: BTreeSet<&String> = new.keys().collect();
        if let Some(key) = old_keys.symmetric_difference(&new_keys).next() {
            return Equivalence::Differs {
                key: key.to_string(),
            };
        }

        let mut reordered = Vec::new();
        let mut mismatches = Vec::new();
        for key in old_keys {
            let (old_value, new_value) = (&old[key.as_str()], &new[key.as_str()]);
            if old_value == new_value {
                continue;
            }
            if !self.matcher.matches(key) {
                return Equivalence::Differs {
                    key: key.to_string(),
                };
            }
            match (id_list(key, old_value), id_list(key, new_value)) {
                (Ok(mut old_ids), Ok(mut new_ids)) => {
                    if old_ids.len() != new_ids.len() {
                        return Equivalence::Differs {
                            key: key.to_string(),
                        };
                    }
                    old_ids.sort_unstable();
                    new_ids.sort_unstable();
                    if old_ids != new_ids {
                        return Equivalence::Differs {
                            key: key.to_string(),
                        };
                    }
                    reordered.push(key.to_string());
                }
                (old_ids, new_ids) => {
                    mismatches.extend(old_ids.err());
                    mismatches.extend(new_ids.err());
                }
            }
        }

        if !mismatches.is_empty() {
            Equivalence::Unconfirmed { mismatches }
        } else if reordered.is_empty() {
            Equivalence::Identical
        } else {
            Equivalence::OrderingOnly { fields: reordered }
        }
    }

    /// Applies the comparison to each configured name of an attribute
    /// document. A substructure is either a dictionary or a one-element array
    /// holding a dictionary; a name missing on one side is never suppressed.
    pub fn suppress(&self, old: &Document, new: &Document) -> SuppressionOutcome {
        let mut decisions = BTreeMap::new();
        let mut suppressed = Vec::new();
        let mut document = new.clone();

        for name in &self.scope_names {
            let (old_value, new_value) = (old.get(name), new.get(name));
            if old_value == new_value {
                continue;
            }
            let decision = match (
                old_value.and_then(substructure),
                new_value.and_then(substructure),
            ) {
                (Some(old_map), Some(new_map)) => self.compare_substructure(old_map, new_map),
                _ => Equivalence::Differs { key: name.clone() },
            };
            if decision.is_equivalent() {
                if let Some(old_value) = old_value {
                    document.insert(name.clone(), old_value.clone());
                    suppressed.push(name.clone());
                }
            }
            decisions.insert(name.clone(), decision);
        }

        tracing::debug!(
            op = "suppress_ordering_diff",
            compared = decisions.len(),
            suppressed = ?suppressed,
            "ordering diff check complete"
        );

        let document = if suppressed.is_empty() {
            None
        } else {
            Some(document)
        };
        SuppressionOutcome {
            decisions,
            suppressed,
            document,
        }
    }
}

/// Returns the proposed document with ID-ordering-only changes in the named
/// substructures rewritten to their old values, or `None` when nothing is
/// suppressed and the new document should pass through.
pub fn suppress_ordering_diff(
    old: &Document,
    new: &Document,
    scope_names: &BTreeSet<String>,
) -> Option<Document> {
    Comparator::new(scope_names.iter().cloned(), IdFieldMatcher::default())
        .suppress(old, new)
        .document
}

fn substructure(value: &Value) -> Option<&Dictionary> {
    match value {
        Value::Dictionary(map) => Some(map),
        Value::Array(items) if items.len() == 1 => items[0].as_dictionary(),
        _ => None,
    }
}

fn id_list(field: &str, value: &Value) -> Result<Vec<i64>, SchemaMismatch> {
    let items = value.as_array().ok_or_else(|| SchemaMismatch::NotAnArray {
        field: field.to_string(),
        found: value.kind(),
    })?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_integer().ok_or_else(|| SchemaMismatch::NonInteger {
                field: field.to_string(),
                index,
                found: item.kind(),
            })
        })
        .collect()
}
