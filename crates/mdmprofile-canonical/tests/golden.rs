use std::collections::BTreeMap;

use mdmprofile_canonical::{
    canonicalize, decode_value, Canonicalizer, Dictionary, Digest, DigestAlg, HygieneReport,
    HygieneStatus, HygieneWarning, ValidationError, Value,
};
use serde_json::json;

fn value_from_json(json: serde_json::Value) -> Value {
    serde_json::from_value(json).unwrap()
}

#[test]
fn digest_serializes_to_golden_json() {
    let digest = Digest {
        alg: DigestAlg::Sha256,
        b64: "Zm9vYmFy".into(),
    };

    assert_eq!(
        serde_json::to_string(&digest).unwrap(),
        r#"{"alg":"sha-256","b64":"Zm9vYmFy"}"#
    );
}

#[test]
fn hygiene_report_matches_expected_shape() {
    let report = HygieneReport {
        status: HygieneStatus::Ambiguous,
        warnings: vec![HygieneWarning::new("UnsortedKeys")],
        metrics: BTreeMap::new(),
    };

    let serialized = serde_json::to_value(&report).unwrap();
    let expected = json!({
        "status": "Ambiguous",
        "warnings": ["UnsortedKeys"],
        "metrics": {}
    });

    assert_eq!(serialized, expected);
}

#[test]
fn canonicalizer_produces_ordered_bytes() {
    let mut nested = Dictionary::new();
    nested.insert("nested".into(), Value::Boolean(true));
    let mut root = Dictionary::new();
    root.insert("b".into(), Value::Integer(1));
    root.insert("a".into(), Value::Dictionary(nested));
    let result = Canonicalizer::new()
        .canonicalize(&Value::Dictionary(root))
        .unwrap();

    let expected = concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
        "<plist version=\"1.0\">\n",
        "<dict>\n",
        "\t<key>a</key>\n",
        "\t<dict>\n",
        "\t\t<key>nested</key>\n",
        "\t\t<true/>\n",
        "\t</dict>\n",
        "\t<key>b</key>\n",
        "\t<integer>1</integer>\n",
        "</dict>\n",
        "</plist>\n",
    );
    assert_eq!(String::from_utf8(result.bytes).unwrap(), expected);
    assert_eq!(result.report.status, HygieneStatus::Ambiguous);
    assert_eq!(result.report.warnings, vec![HygieneWarning::new("UnsortedKeys")]);
    assert_eq!(result.report.metrics["reordered_dictionaries"], 1);
    assert_eq!(result.report.metrics["dictionaries"], 2);
    assert_eq!(result.report.metrics["keys"], 3);
}

#[test]
fn arrays_keep_order_but_their_dictionaries_are_sorted() {
    let mut element = Dictionary::new();
    element.insert("z".into(), Value::Integer(1));
    element.insert("y".into(), Value::Integer(2));
    let mut root = Dictionary::new();
    root.insert(
        "list".into(),
        Value::Array(vec![Value::Dictionary(element), 3.into(), "x".into()]),
    );
    let document = canonicalize(&Value::Dictionary(root)).unwrap();

    let list = document.as_dictionary().unwrap()["list"].as_array().unwrap();
    let first: Vec<&String> = list[0].as_dictionary().unwrap().keys().collect();
    assert_eq!(first, vec!["y", "z"]);
    assert_eq!(list[1], Value::Integer(3));
    assert_eq!(list[2], Value::String("x".into()));
}

#[test]
fn canonical_document_text_matches_result_bytes() {
    let value = value_from_json(json!({"k": ["a", {"b": false}], "e": {}}));
    let result = Canonicalizer::new().canonicalize(&value).unwrap();
    assert_eq!(result.document.to_plist_string().into_bytes(), result.bytes);
}

#[test]
fn escaped_and_multi_line_strings_survive_a_round_trip() {
    let mut map = Dictionary::new();
    map.insert("Script".into(), Value::String("#!/bin/sh\nif [ 1 < 2 ]; then echo \"a & b\"; fi\n".into()));
    map.insert("Empty".into(), Value::String(String::new()));
    let value = Value::Dictionary(map);

    let result = Canonicalizer::new().canonicalize(&value).unwrap();
    let decoded = decode_value(&result.bytes).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn custom_indent_is_used_per_level() {
    let value = value_from_json(json!({"a": {"b": 1}}));
    let result = Canonicalizer::with_indent("  ").canonicalize(&value).unwrap();
    let text = String::from_utf8(result.bytes).unwrap();
    assert!(text.contains("\n  <dict>\n    <key>b</key>\n    <integer>1</integer>\n  </dict>\n"));
}

#[test]
fn canonicalize_bytes_reorders_decoded_input() {
    let raw = br#"<plist version="1.0"><dict><key>z</key><integer>1</integer><key>a</key><false/></dict></plist>"#;
    let result = Canonicalizer::new().canonicalize_bytes(raw).unwrap();
    let keys: Vec<&String> = result.document.as_dictionary().unwrap().keys().collect();
    assert_eq!(keys, vec!["a", "z"]);
}

#[test]
fn digest_ignores_key_order_but_not_array_order() {
    let a = value_from_json(json!({"x": 1, "y": [1, 2]}));
    let b = value_from_json(json!({"y": [1, 2], "x": 1}));
    let c = value_from_json(json!({"x": 1, "y": [2, 1]}));

    let digest_a = Digest::of_value(&a).unwrap();
    assert_eq!(digest_a, Digest::of_value(&b).unwrap());
    assert_ne!(digest_a, Digest::of_value(&c).unwrap());
    assert_eq!(digest_a.alg, DigestAlg::Sha256);
    assert_eq!(digest_a.b64.len(), 43);
}

#[test]
fn digest_new_validates_encoding() {
    let computed = Digest::of_value(&Value::Integer(7)).unwrap();
    assert_eq!(
        Digest::new(DigestAlg::Sha256, computed.b64.clone()).unwrap(),
        computed
    );

    for bad in ["Zm9vYmFy", "not base64url!", ""] {
        assert_eq!(
            Digest::new(DigestAlg::Sha256, bad),
            Err(ValidationError::PatternMismatch {
                field: "digest",
                value: bad.to_string(),
            })
        );
    }
}
