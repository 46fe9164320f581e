//! Canonical form, equivalence and validation for configuration profiles.
//!
//! A profile is an XML property list. Two serializations of the same profile
//! can differ in key order, identifier-list order, whitespace and
//! server-assigned metadata. This crate decodes profiles into a typed
//! projection, rewrites them into one canonical text form, decides whether two
//! versions of a scope differ beyond ID ordering, and checks the cross-field
//! and formatting rules a profile resource must satisfy.
//!
//! Every operation is a pure function over borrowed input.
//!
#![deny(missing_docs)]

/// Canonicalization into sorted-key documents and canonical bytes.
pub mod canonicalizer;
/// Ordering-diff suppression for scope-like substructures.
pub mod comparator;
/// XML property-list decoding.
pub mod decode;
/// Structural content digests.
pub mod digest;
/// Canonical XML property-list writer.
pub mod encoder;
/// Whitespace validation of serialized plists.
pub mod formatting;
/// Hygiene report types emitted during canonicalization.
pub mod hygiene;
/// Value locations for error messages.
pub mod path;
/// Typed profile projection and payload extraction.
pub mod profile;
/// Resource-level pre-commit checks.
pub mod resource;
/// Cross-field validation.
pub mod validation;
/// The property-list value model.
pub mod value;

pub use canonicalizer::{
    canonicalize, CanonicalDocument, CanonicalizationError, CanonicalizationResult, Canonicalizer,
};
pub use comparator::{
    suppress_ordering_diff, Comparator, ComparatorConfig, Equivalence, IdFieldMatcher,
    SchemaMismatch, SuppressionOutcome,
};
pub use decode::{decode_document, decode_value, DecodeError};
pub use digest::{Digest, DigestAlg, DigestError};
pub use encoder::encode_plist;
pub use formatting::{check_indentation, check_indentation_with, FormattingError};
pub use hygiene::{HygieneReport, HygieneStatus, HygieneWarning};
pub use profile::{
    extract_payloads, extract_single_payload, parse_payload, parse_profile, summarize_profile,
    PayloadItem, Profile, ProfileError, ProfileSummary,
};
pub use resource::{check_resource, ProfileResource, ResourceDiffReport, ResourceError};
pub use validation::{
    payload_scope, validate_distribution, validate_level, validate_payload_count, ValidationError,
    ValidationWarning, SELF_SERVICE_METHOD,
};
pub use value::{Dictionary, Document, Value, ValueKind};
