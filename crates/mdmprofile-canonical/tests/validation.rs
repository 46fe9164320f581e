mod common;

use common::{profile_with_payloads, wifi_payload, wifi_profile, HEADER};
use mdmprofile_canonical::{
    check_resource, parse_profile, payload_scope, validate_distribution, validate_level,
    Comparator, Document, Equivalence, ProfileResource, ResourceError, ValidationError,
    ValidationWarning, ValueKind, SELF_SERVICE_METHOD,
};
use serde_json::json;

fn doc(json: serde_json::Value) -> Document {
    serde_json::from_value(json).unwrap()
}

fn canonical_profile(scope: &str) -> String {
    parse_profile(wifi_profile(scope).as_bytes())
        .unwrap()
        .to_canonical_string()
        .unwrap()
}

fn resource(level: &str, payloads: String) -> ProfileResource {
    ProfileResource {
        name: "wifi".into(),
        level: level.into(),
        distribution_method: Some("Install Automatically/Prompt Users to Install".into()),
        has_self_service: false,
        payloads,
        attributes: doc(json!({"scope": {"computer_group_ids": [1, 2, 3]}})),
    }
}

#[test]
fn level_mismatch_names_both_values() {
    let profile = parse_profile(wifi_profile("System").as_bytes()).unwrap();
    let err = validate_level(&profile, "User").unwrap_err();
    assert_eq!(
        err,
        ValidationError::LevelMismatch {
            level: "User".into(),
            payload_scope: "System".into(),
        }
    );
    let message = err.to_string();
    assert!(message.contains("User"));
    assert!(message.contains("System"));
}

#[test]
fn matching_level_passes() {
    let profile = parse_profile(wifi_profile("User").as_bytes()).unwrap();
    assert_eq!(validate_level(&profile, "User"), Ok(()));
}

#[test]
fn payload_scope_falls_back_to_payload_items() {
    let item = wifi_payload("A", "a").replace(
        "<key>AutoJoin</key>",
        "<key>PayloadScope</key><string>User</string>\n            <key>AutoJoin</key>",
    );
    let text = profile_with_payloads(&[item], "System").replace(
        "    <key>PayloadScope</key>\n    <string>System</string>\n",
        "",
    );
    let profile = parse_profile(text.as_bytes()).unwrap();
    assert!(!profile.overflow.contains_key("PayloadScope"));
    assert_eq!(payload_scope(&profile), Ok("User"));
}

#[test]
fn missing_or_mistyped_payload_scope_is_an_error() {
    let bare = format!(
        "{}<plist version=\"1.0\">\n<dict>\n\t<key>PayloadType</key>\n\t<string>Configuration</string>\n</dict>\n</plist>\n",
        HEADER
    );
    let profile = parse_profile(bare.as_bytes()).unwrap();
    assert_eq!(
        validate_level(&profile, "System"),
        Err(ValidationError::MissingPayloadScope)
    );

    let typed = bare.replace(
        "</dict>",
        "\t<key>PayloadScope</key>\n\t<integer>1</integer>\n</dict>",
    );
    let profile = parse_profile(typed.as_bytes()).unwrap();
    assert_eq!(
        payload_scope(&profile),
        Err(ValidationError::PayloadScopeKind {
            found: ValueKind::Integer
        })
    );
}

#[test]
fn self_service_method_requires_block() {
    assert_eq!(
        validate_distribution(SELF_SERVICE_METHOD, false),
        Err(ValidationError::SelfServiceRequired)
    );
    assert_eq!(validate_distribution(SELF_SERVICE_METHOD, true), Ok(None));
}

#[test]
fn block_without_self_service_method_only_warns() {
    let method = "Install Automatically/Prompt Users to Install";
    assert_eq!(
        validate_distribution(method, true),
        Ok(Some(ValidationWarning::SelfServiceUnused {
            method: method.into()
        }))
    );
    assert_eq!(validate_distribution(method, false), Ok(None));
}

#[test]
fn check_resource_passes_and_suppresses_reordered_scope() {
    let mut proposed = resource("System", canonical_profile("System"));
    proposed.has_self_service = true;
    let prior = doc(json!({"scope": {"computer_group_ids": [3, 2, 1]}}));

    let report = check_resource(Some(&prior), &proposed, &Comparator::default()).unwrap();
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.attributes["scope"], prior["scope"]);
    let suppression = report.suppression.unwrap();
    assert_eq!(
        suppression.decisions["scope"],
        Equivalence::OrderingOnly {
            fields: vec!["computer_group_ids".into()]
        }
    );
}

#[test]
fn check_resource_on_create_skips_suppression() {
    let proposed = resource("System", canonical_profile("System"));
    let report = check_resource(None, &proposed, &Comparator::default()).unwrap();
    assert!(report.suppression.is_none());
    assert_eq!(report.attributes, proposed.attributes);
    assert!(report.warnings.is_empty());
}

#[test]
fn check_resource_prefixes_errors_with_resource_name() {
    let proposed = resource("User", canonical_profile("System"));
    let err = check_resource(None, &proposed, &Comparator::default()).unwrap_err();
    assert!(matches!(
        err,
        ResourceError::Validation {
            source: ValidationError::LevelMismatch { .. },
            ..
        }
    ));
    assert!(err.to_string().starts_with("in 'mdmprofile.wifi': 'level' attribute (User)"));
}

#[test]
fn check_resource_rejects_non_canonical_text() {
    let proposed = resource("System", wifi_profile("System"));
    let err = check_resource(None, &proposed, &Comparator::default()).unwrap_err();
    match err {
        ResourceError::Formatting { resource, source } => {
            assert_eq!(resource, "wifi");
            assert!(source.to_string().starts_with("line 5:"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn distribution_is_checked_before_the_plist() {
    let mut proposed = resource("System", "not a plist".into());
    proposed.distribution_method = Some(SELF_SERVICE_METHOD.into());
    let err = check_resource(None, &proposed, &Comparator::default()).unwrap_err();
    assert!(matches!(
        err,
        ResourceError::Validation {
            source: ValidationError::SelfServiceRequired,
            ..
        }
    ));

    proposed.has_self_service = true;
    let err = check_resource(None, &proposed, &Comparator::default()).unwrap_err();
    assert!(matches!(err, ResourceError::Decode { .. }));
}
