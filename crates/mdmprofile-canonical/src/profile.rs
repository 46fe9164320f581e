//! Typed projection of a configuration profile.
//!
//! Recognized keys land in typed fields; everything else is kept, in source
//! order, in an overflow dictionary so unknown keys survive a round trip.

use serde::Serialize;

use crate::canonicalizer::{canonical_text, CanonicalizationError, Canonicalizer};
use crate::decode::{decode_document, DecodeError};
use crate::path::Path;
use crate::validation::ValidationError;
use crate::value::{Dictionary, Document, Value, ValueKind};

const PAYLOAD_CONTENT: &str = "PayloadContent";
const PAYLOAD_DISPLAY_NAME: &str = "PayloadDisplayName";
const PAYLOAD_IDENTIFIER: &str = "PayloadIdentifier";
const PAYLOAD_TYPE: &str = "PayloadType";
const PAYLOAD_UUID: &str = "PayloadUUID";
const PAYLOAD_VERSION: &str = "PayloadVersion";
const PAYLOAD_ORGANIZATION: &str = "PayloadOrganization";
const PAYLOAD_ENABLED: &str = "PayloadEnabled";

/// A configuration profile: the outer "Configuration" dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// `PayloadDisplayName`
    pub display_name: Option<String>,
    /// `PayloadIdentifier`
    pub identifier: Option<String>,
    /// `PayloadType`
    pub payload_type: Option<String>,
    /// `PayloadUUID`
    pub uuid: Option<String>,
    /// `PayloadVersion`
    pub version: Option<i64>,
    /// `PayloadContent`; `None` when the key is absent.
    pub payload_content: Option<Vec<PayloadItem>>,
    /// Every other top-level key.
    pub overflow: Dictionary,
}

/// One entry of a profile's `PayloadContent` array.
///
/// Type-specific settings, including `PayloadType`, `PayloadVersion` and any
/// nested `PayloadContent`, live in the overflow dictionary. The typed fields
/// are the ones the server rewrites, which is why extraction leaves them out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadItem {
    /// `PayloadDisplayName`
    pub display_name: Option<String>,
    /// `PayloadOrganization`
    pub organization: Option<String>,
    /// `PayloadIdentifier`
    pub identifier: Option<String>,
    /// `PayloadUUID`
    pub uuid: Option<String>,
    /// `PayloadEnabled`
    pub enabled: Option<bool>,
    /// Every other key of the payload.
    pub overflow: Dictionary,
}

/// What a store read hands back to the caller for persisting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    /// `PayloadIdentifier` of the profile.
    pub identifier: Option<String>,
    /// `PayloadDisplayName` of the profile.
    pub display_name: Option<String>,
    /// Extracted payloads, canonical and sorted.
    pub payloads: Vec<String>,
    /// The raw plist text as received.
    pub plist: String,
}

/// Errors from the composite profile operations.
#[derive(thiserror::Error, Debug)]
pub enum ProfileError {
    /// The plist could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// A payload could not be re-encoded.
    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),
    /// The profile shape is wrong for the operation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Profile {
    /// Payload items, empty when `PayloadContent` is absent.
    pub fn payloads(&self) -> &[PayloadItem] {
        self.payload_content.as_deref().unwrap_or(&[])
    }

    /// Builds a profile from an already-decoded document.
    pub fn from_document(mut doc: Document) -> Result<Self, DecodeError> {
        let root = Path::root();
        let display_name = take_string(&mut doc, PAYLOAD_DISPLAY_NAME, &root)?;
        let identifier = take_string(&mut doc, PAYLOAD_IDENTIFIER, &root)?;
        let payload_type = take_string(&mut doc, PAYLOAD_TYPE, &root)?;
        let uuid = take_string(&mut doc, PAYLOAD_UUID, &root)?;
        let version = take_integer(&mut doc, PAYLOAD_VERSION, &root)?;

        let content_path = root.push_field(PAYLOAD_CONTENT);
        let payload_content = match doc.shift_remove(PAYLOAD_CONTENT) {
            None => None,
            Some(Value::Array(items)) => Some(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(idx, item)| {
                        let item_path = content_path.push_index(idx);
                        match item {
                            Value::Dictionary(map) => PayloadItem::from_dictionary(map, &item_path),
                            other => Err(DecodeError::FieldKind {
                                field: item_path.to_string(),
                                expected: ValueKind::Dictionary,
                                found: other.kind(),
                            }),
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Some(other) => {
                return Err(DecodeError::FieldKind {
                    field: content_path.to_string(),
                    expected: ValueKind::Array,
                    found: other.kind(),
                })
            }
        };

        Ok(Self {
            display_name,
            identifier,
            payload_type,
            uuid,
            version,
            payload_content,
            overflow: doc,
        })
    }

    /// Re-projects typed fields and overflow back into a document.
    pub fn to_document(&self) -> Document {
        let mut doc = Dictionary::new();
        put(&mut doc, PAYLOAD_DISPLAY_NAME, self.display_name.clone().map(Value::String));
        put(&mut doc, PAYLOAD_IDENTIFIER, self.identifier.clone().map(Value::String));
        put(&mut doc, PAYLOAD_TYPE, self.payload_type.clone().map(Value::String));
        put(&mut doc, PAYLOAD_UUID, self.uuid.clone().map(Value::String));
        put(&mut doc, PAYLOAD_VERSION, self.version.map(Value::Integer));
        put(
            &mut doc,
            PAYLOAD_CONTENT,
            self.payload_content.as_ref().map(|items| {
                Value::Array(
                    items
                        .iter()
                        .map(|item| Value::Dictionary(item.to_document()))
                        .collect(),
                )
            }),
        );
        for (key, value) in &self.overflow {
            doc.insert(key.clone(), value.clone());
        }
        doc
    }

    /// Canonical plist text for the whole profile.
    pub fn to_canonical_string(&self) -> Result<String, CanonicalizationError> {
        let result = Canonicalizer::new().canonicalize(&Value::Dictionary(self.to_document()))?;
        Ok(result.document.to_plist_string())
    }
}

impl PayloadItem {
    fn from_dictionary(mut map: Dictionary, path: &Path) -> Result<Self, DecodeError> {
        Ok(Self {
            display_name: take_string(&mut map, PAYLOAD_DISPLAY_NAME, path)?,
            organization: take_string(&mut map, PAYLOAD_ORGANIZATION, path)?,
            identifier: take_string(&mut map, PAYLOAD_IDENTIFIER, path)?,
            uuid: take_string(&mut map, PAYLOAD_UUID, path)?,
            enabled: take_bool(&mut map, PAYLOAD_ENABLED, path)?,
            overflow: map,
        })
    }

    /// Re-projects typed fields and overflow back into a document.
    pub fn to_document(&self) -> Document {
        let mut doc = Dictionary::new();
        put(&mut doc, PAYLOAD_DISPLAY_NAME, self.display_name.clone().map(Value::String));
        put(&mut doc, PAYLOAD_ORGANIZATION, self.organization.clone().map(Value::String));
        put(&mut doc, PAYLOAD_IDENTIFIER, self.identifier.clone().map(Value::String));
        put(&mut doc, PAYLOAD_UUID, self.uuid.clone().map(Value::String));
        put(&mut doc, PAYLOAD_ENABLED, self.enabled.map(Value::Boolean));
        for (key, value) in &self.overflow {
            doc.insert(key.clone(), value.clone());
        }
        doc
    }

    /// Canonical plist text of the overflow dictionary alone.
    pub fn to_payload_string(&self) -> Result<String, CanonicalizationError> {
        let result = Canonicalizer::new().canonicalize(&Value::Dictionary(self.overflow.clone()))?;
        Ok(result.document.to_plist_string())
    }
}

/// Decodes a profile. Zero or many payloads are accepted here; the count is
/// checked by [`crate::validation::validate_payload_count`].
pub fn parse_profile(raw: &[u8]) -> Result<Profile, DecodeError> {
    let result = decode_document(raw).and_then(Profile::from_document);
    match &result {
        Ok(profile) => tracing::debug!(
            op = "parse_profile",
            payloads = profile.payloads().len(),
            overflow_keys = profile.overflow.len(),
            "parsed profile"
        ),
        Err(err) => tracing::debug!(op = "parse_profile", error = %err, "profile decode failed"),
    }
    result
}

/// Decodes a standalone payload dictionary.
pub fn parse_payload(raw: &[u8]) -> Result<PayloadItem, DecodeError> {
    let result =
        decode_document(raw).and_then(|map| PayloadItem::from_dictionary(map, &Path::root()));
    match &result {
        Ok(item) => tracing::debug!(
            op = "parse_payload",
            overflow_keys = item.overflow.len(),
            "parsed payload"
        ),
        Err(err) => tracing::debug!(op = "parse_payload", error = %err, "payload decode failed"),
    }
    result
}

/// Encodes each payload's overflow dictionary as a canonical standalone plist
/// and returns the texts sorted, so payload order in the source array does not
/// matter.
pub fn extract_payloads(profile: &Profile) -> Result<Vec<String>, CanonicalizationError> {
    let mut payloads = profile
        .payloads()
        .iter()
        .map(|item| canonical_text(&Value::Dictionary(item.overflow.clone())))
        .collect::<Result<Vec<_>, _>>()?;
    payloads.sort();
    tracing::debug!(op = "extract_payloads", count = payloads.len(), "extracted payloads");
    Ok(payloads)
}

/// Normalizes profile text to the first extracted payload, for storing a
/// single-payload attribute.
pub fn extract_single_payload(raw: &[u8]) -> Result<String, ProfileError> {
    let profile = parse_profile(raw)?;
    extract_payloads(&profile)?
        .into_iter()
        .next()
        .ok_or(ProfileError::Validation(ValidationError::PayloadCount { found: 0 }))
}

/// Parses profile text and collects what a store read persists.
pub fn summarize_profile(plist: &str) -> Result<ProfileSummary, ProfileError> {
    let profile = parse_profile(plist.as_bytes())?;
    let payloads = extract_payloads(&profile)?;
    Ok(ProfileSummary {
        identifier: profile.identifier,
        display_name: profile.display_name,
        payloads,
        plist: plist.to_string(),
    })
}

fn put(doc: &mut Dictionary, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        doc.insert(key.to_string(), value);
    }
}

fn take_string(map: &mut Dictionary, key: &str, path: &Path) -> Result<Option<String>, DecodeError> {
    match map.shift_remove(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(field_kind(path, key, ValueKind::String, &other)),
    }
}

fn take_integer(map: &mut Dictionary, key: &str, path: &Path) -> Result<Option<i64>, DecodeError> {
    match map.shift_remove(key) {
        None => Ok(None),
        Some(Value::Integer(n)) => Ok(Some(n)),
        Some(other) => Err(field_kind(path, key, ValueKind::Integer, &other)),
    }
}

fn take_bool(map: &mut Dictionary, key: &str, path: &Path) -> Result<Option<bool>, DecodeError> {
    match map.shift_remove(key) {
        None => Ok(None),
        Some(Value::Boolean(b)) => Ok(Some(b)),
        Some(other) => Err(field_kind(path, key, ValueKind::Boolean, &other)),
    }
}

fn field_kind(path: &Path, key: &str, expected: ValueKind, found: &Value) -> DecodeError {
    DecodeError::FieldKind {
        field: path.push_field(key).to_string(),
        expected,
        found: found.kind(),
    }
}
