use crate::decode::{decode_value, DecodeError};
use crate::encoder::{encode_plist, DEFAULT_INDENT};
use crate::hygiene::{HygieneReport, HygieneStatus};
use crate::path::Path;
use crate::value::{Dictionary, Value};

/// Error returned when canonicalization fails.
#[derive(thiserror::Error, Debug)]
pub enum CanonicalizationError {
    /// A string or key holds a character XML 1.0 cannot carry.
    #[error("value at {path} cannot be encoded: {reason}")]
    Unencodable {
        /// Location of the offending value.
        path: String,
        /// What made it unencodable.
        reason: String,
    },
    /// Raw input could not be decoded before canonicalization.
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
}

/// A value whose dictionaries all have keys in ascending byte order.
///
/// Only the canonicalizer constructs these, so holding one means the sort has
/// already happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalDocument(Value);

impl CanonicalDocument {
    /// Borrows the canonical value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Returns the root dictionary, if the root is one.
    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        self.0.as_dictionary()
    }

    /// Consumes the wrapper.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Encodes with the default tab indent.
    pub fn to_plist_string(&self) -> String {
        encode_plist(&self.0, DEFAULT_INDENT)
    }
}

/// Result of canonicalization.
#[derive(Debug)]
pub struct CanonicalizationResult {
    /// Key-sorted document.
    pub document: CanonicalDocument,
    /// Canonical UTF-8 XML bytes for the document.
    pub bytes: Vec<u8>,
    /// Hygiene report describing what had to change.
    pub report: HygieneReport,
}

/// Canonicalizer that emits deterministic property-list bytes.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    indent: String,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Canonicalizer {
    /// Creates a canonicalizer that indents with one tab per level.
    pub fn new() -> Self {
        Self {
            indent: DEFAULT_INDENT.to_string(),
        }
    }

    /// Creates a canonicalizer with a custom indent unit.
    pub fn with_indent(indent: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
        }
    }

    /// Indent unit written per nesting level.
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// Produces the canonical document, its bytes and a hygiene report.
    pub fn canonicalize(&self, value: &Value) -> Result<CanonicalizationResult, CanonicalizationError> {
        self.canonicalize_with_report(value).map_err(|(err, _)| err)
    }

    /// Like [`Canonicalizer::canonicalize`], returning the report even on error.
    pub fn canonicalize_with_report(
        &self,
        value: &Value,
    ) -> Result<CanonicalizationResult, (CanonicalizationError, HygieneReport)> {
        let mut report = HygieneReport::new();

        let sorted = match rebuild(value, Path::root(), &mut report) {
            Ok(sorted) => sorted,
            Err(err) => {
                report.status = HygieneStatus::Invalid;
                tracing::warn!(op = "canonicalize", error = %err, "canonicalization failed");
                return Err((err, report));
            }
        };

        if report.metrics.get("reordered_dictionaries").copied().unwrap_or(0) > 0 {
            report.status = HygieneStatus::Ambiguous;
            report.warn_once("UnsortedKeys");
        }

        let bytes = encode_plist(&sorted, &self.indent).into_bytes();
        tracing::debug!(
            op = "canonicalize",
            status = ?report.status,
            bytes = bytes.len(),
            "canonicalized document"
        );

        Ok(CanonicalizationResult {
            document: CanonicalDocument(sorted),
            bytes,
            report,
        })
    }

    /// Decodes raw property-list bytes and canonicalizes them.
    pub fn canonicalize_bytes(&self, raw: &[u8]) -> Result<CanonicalizationResult, CanonicalizationError> {
        let value = decode_value(raw)?;
        self.canonicalize(&value)
    }
}

/// Canonicalizes `value` with the default settings.
pub fn canonicalize(value: &Value) -> Result<CanonicalDocument, CanonicalizationError> {
    Canonicalizer::new()
        .canonicalize(value)
        .map(|result| result.document)
}

/// Canonical text of `value` with the default indent. Emits no trace event,
/// so composite operations can call it per item and log once themselves.
pub(crate) fn canonical_text(value: &Value) -> Result<String, CanonicalizationError> {
    let sorted = rebuild(value, Path::root(), &mut HygieneReport::new())?;
    Ok(encode_plist(&sorted, DEFAULT_INDENT))
}

/// Rebuilds `value` with every dictionary's keys in ascending order. Array
/// order is preserved.
fn rebuild(value: &Value, path: Path, report: &mut HygieneReport) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Dictionary(map) => {
            report.bump("dictionaries", 1);
            report.bump("keys", map.len() as u64);

            let mut keys: Vec<&String> = map.keys().collect();
            let already_sorted = keys.windows(2).all(|pair| pair[0] <= pair[1]);
            if !already_sorted {
                report.bump("reordered_dictionaries", 1);
                keys.sort();
            }

            let mut sorted = Dictionary::with_capacity(map.len());
            for key in keys {
                let child_path = path.push_field(key);
                check_text(key, &child_path)?;
                let child = rebuild(&map[key.as_str()], child_path, report)?;
                sorted.insert(key.clone(), child);
            }
            Ok(Value::Dictionary(sorted))
        }
        Value::Array(items) => {
            report.bump("arrays", 1);
            items
                .iter()
                .enumerate()
                .map(|(idx, item)| rebuild(item, path.push_index(idx), report))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        Value::String(s) => {
            check_text(s, &path)?;
            Ok(Value::String(s.clone()))
        }
        Value::Integer(_) | Value::Boolean(_) => Ok(value.clone()),
    }
}

fn check_text(text: &str, path: &Path) -> Result<(), CanonicalizationError> {
    match text.chars().find(|c| !is_xml_char(*c)) {
        Some(c) => Err(CanonicalizationError::Unencodable {
            path: path.to_string(),
            reason: format!("character U+{:04X} is not allowed in XML", c as u32),
        }),
        None => Ok(()),
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}
