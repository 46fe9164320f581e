//! XML property-list decoding into [`Value`] trees.

use regex::Regex;
use std::sync::OnceLock;

use crate::path::Path;
use crate::value::{Dictionary, Document, Value, ValueKind};

/// Error returned when raw bytes cannot be turned into a document.
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    /// The input is not a well-formed XML property list.
    #[error("malformed property list: {0}")]
    Malformed(String),
    /// The root value is not a dictionary.
    #[error("expected a dictionary at the document root, found {found}")]
    RootKind {
        /// Kind found at the root.
        found: ValueKind,
    },
    /// A value kind outside the supported set (real, data, date, uid).
    #[error("unsupported value kind '{kind}' at {path}")]
    UnsupportedKind {
        /// Location of the value.
        path: String,
        /// Property-list element name.
        kind: &'static str,
    },
    /// An integer that does not fit in a signed 64-bit value.
    #[error("integer out of range at {path}")]
    IntegerOutOfRange {
        /// Location of the value: a key path, or a byte offset when the
        /// literal is too wide for the XML reader itself.
        path: String,
    },
    /// A recognized field carries the wrong value kind.
    #[error("field '{field}' must be a {expected}, found {found}")]
    FieldKind {
        /// Field location.
        field: String,
        /// Kind the field requires.
        expected: ValueKind,
        /// Kind present in the input.
        found: ValueKind,
    },
}

/// Decodes an XML property list whose root is a dictionary.
pub fn decode_document(raw: &[u8]) -> Result<Document, DecodeError> {
    match decode_value(raw)? {
        Value::Dictionary(map) => Ok(map),
        other => Err(DecodeError::RootKind {
            found: other.kind(),
        }),
    }
}

/// Decodes an XML property list with any root kind.
pub fn decode_value(raw: &[u8]) -> Result<Value, DecodeError> {
    let parsed = plist::Value::from_reader_xml(raw).map_err(|err| {
        match out_of_range_literal(raw) {
            Some(offset) => DecodeError::IntegerOutOfRange {
                path: format!("byte offset {offset}"),
            },
            None => DecodeError::Malformed(err.to_string()),
        }
    })?;
    convert(parsed, Path::root())
}

fn integer_literal() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<integer>\s*([+-]?[0-9]+)\s*</integer>").expect("invalid regex"))
}

/// Offset of the first decimal `<integer>` the reader cannot hold. The reader
/// accepts `i64` and `u64`; anything wider fails before conversion.
fn out_of_range_literal(raw: &[u8]) -> Option<usize> {
    let text = std::str::from_utf8(raw).ok()?;
    integer_literal().captures_iter(text).find_map(|caps| {
        let literal = caps.get(1)?;
        let digits = literal.as_str();
        let fits = digits.parse::<i64>().is_ok() || digits.parse::<u64>().is_ok();
        (!fits).then_some(literal.start())
    })
}

fn convert(value: plist::Value, path: Path) -> Result<Value, DecodeError> {
    match value {
        plist::Value::Dictionary(dict) => {
            let mut map = Dictionary::with_capacity(dict.len());
            for (key, child) in dict {
                let child = convert(child, path.push_field(&key))?;
                map.insert(key, child);
            }
            Ok(Value::Dictionary(map))
        }
        plist::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| convert(item, path.push_index(idx)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        plist::Value::String(s) => Ok(Value::String(s)),
        plist::Value::Boolean(b) => Ok(Value::Boolean(b)),
        plist::Value::Integer(n) => n
            .as_signed()
            .map(Value::Integer)
            .ok_or_else(|| DecodeError::IntegerOutOfRange {
                path: path.to_string(),
            }),
        other => Err(DecodeError::UnsupportedKind {
            path: path.to_string(),
            kind: plist_kind_name(&other),
        }),
    }
}

fn plist_kind_name(value: &plist::Value) -> &'static str {
    match value {
        plist::Value::Real(_) => "real",
        plist::Value::Data(_) => "data",
        plist::Value::Date(_) => "date",
        _ => "uid",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_real_values_with_path() {
        let raw = br#"<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0">
<dict>
	<key>Outer</key>
	<dict>
		<key>Ratio</key>
		<real>1.5</real>
	</dict>
</dict>
</plist>"#;
        match decode_document(raw) {
            Err(DecodeError::UnsupportedKind { path, kind }) => {
                assert_eq!(path, "Outer.Ratio");
                assert_eq!(kind, "real");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn rejects_non_dictionary_root() {
        let raw = br#"<plist version="1.0"><array><integer>1</integer></array></plist>"#;
        assert!(matches!(
            decode_document(raw),
            Err(DecodeError::RootKind {
                found: ValueKind::Array
            })
        ));
    }

    fn integer_plist(literal: &str) -> String {
        format!(
            "<plist version=\"1.0\">\n<dict>\n\t<key>Count</key>\n\t<integer>{literal}</integer>\n</dict>\n</plist>\n"
        )
    }

    #[test]
    fn integer_bounds_are_accepted() {
        for (literal, expected) in [
            ("9223372036854775807", i64::MAX),
            ("-9223372036854775808", i64::MIN),
        ] {
            let doc = decode_document(integer_plist(literal).as_bytes()).unwrap();
            assert_eq!(doc["Count"], Value::Integer(expected));
        }
    }

    #[test]
    fn integers_above_i64_are_out_of_range() {
        for literal in ["9223372036854775808", "18446744073709551615"] {
            match decode_document(integer_plist(literal).as_bytes()) {
                Err(DecodeError::IntegerOutOfRange { path }) => assert_eq!(path, "Count"),
                other => panic!("unexpected result for {}: {:?}", literal, other),
            }
        }
    }

    #[test]
    fn integers_beyond_the_reader_are_out_of_range() {
        for literal in ["-9223372036854775809", "18446744073709551616"] {
            let raw = integer_plist(literal);
            let offset = raw.find(literal).unwrap();
            match decode_document(raw.as_bytes()) {
                Err(DecodeError::IntegerOutOfRange { path }) => {
                    assert_eq!(path, format!("byte offset {}", offset))
                }
                other => panic!("unexpected result for {}: {:?}", literal, other),
            }
        }
    }

    #[test]
    fn malformed_input_is_reported() {
        let raw = b"<plist version=\"1.0\"><dict><key>a</key>";
        assert!(matches!(
            decode_document(raw),
            Err(DecodeError::Malformed(_))
        ));
    }
}
