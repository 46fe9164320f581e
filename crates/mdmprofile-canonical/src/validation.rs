//! Cross-field checks between the resource wrapper and the embedded profile.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::profile::Profile;
use crate::value::{Value, ValueKind};

/// Distribution method that requires a self-service block.
pub const SELF_SERVICE_METHOD: &str = "Make Available in Self Service";

/// Key holding the install scope inside a profile.
pub const PAYLOAD_SCOPE_KEY: &str = "PayloadScope";

/// Validation errors. Never corrected silently.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// When a value does not match the required pattern.
    #[error("{field} ('{value}') is not allowed")]
    PatternMismatch {
        /// Field name that failed validation.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// The declared level and the embedded `PayloadScope` disagree.
    #[error("'level' attribute ({level}) does not match the 'PayloadScope' in the plist ({payload_scope})")]
    LevelMismatch {
        /// Level declared on the resource.
        level: String,
        /// Scope found in the plist.
        payload_scope: String,
    },
    /// No `PayloadScope` key on the profile or any payload.
    #[error("no 'PayloadScope' key found in the plist")]
    MissingPayloadScope,
    /// `PayloadScope` is present but not a string.
    #[error("'PayloadScope' must be a string, found {found}")]
    PayloadScopeKind {
        /// Kind present in the plist.
        found: ValueKind,
    },
    /// Self-service distribution declared without the block.
    #[error("'self_service' block is required when 'distribution_method' is set to 'Make Available in Self Service'")]
    SelfServiceRequired,
    /// The profile does not carry exactly one payload.
    #[error("profile must contain a PayloadContent array with exactly one payload (found {found} payloads)")]
    PayloadCount {
        /// Number of payloads found.
        found: usize,
    },
}

/// Non-fatal findings: the data is harmless but probably a mistake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// A self-service block is present but the method does not use it.
    SelfServiceUnused {
        /// The declared distribution method.
        method: String,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::SelfServiceUnused { method } => write!(
                f,
                "'self_service' block is not meaningful when 'distribution_method' is set to '{}'",
                method
            ),
        }
    }
}

/// Finds the profile's install scope: the root `PayloadScope` first, then
/// each payload's in order.
pub fn payload_scope(profile: &Profile) -> Result<&str, ValidationError> {
    let found = profile.overflow.get(PAYLOAD_SCOPE_KEY).or_else(|| {
        profile
            .payloads()
            .iter()
            .find_map(|item| item.overflow.get(PAYLOAD_SCOPE_KEY))
    });
    match found {
        Some(Value::String(scope)) => Ok(scope),
        Some(other) => Err(ValidationError::PayloadScopeKind {
            found: other.kind(),
        }),
        None => Err(ValidationError::MissingPayloadScope),
    }
}

/// Requires the embedded `PayloadScope` to equal the declared level.
pub fn validate_level(profile: &Profile, declared_level: &str) -> Result<(), ValidationError> {
    let result = payload_scope(profile).and_then(|scope| {
        if scope == declared_level {
            Ok(())
        } else {
            Err(ValidationError::LevelMismatch {
                level: declared_level.to_string(),
                payload_scope: scope.to_string(),
            })
        }
    });
    match &result {
        Ok(()) => tracing::debug!(op = "validate_level", level = declared_level, "level matches"),
        Err(err) => tracing::debug!(op = "validate_level", level = declared_level, error = %err, "level rejected"),
    }
    result
}

/// Checks the distribution method against the presence of a self-service
/// block. Missing block with the self-service method is an error; a block
/// with any other method is a warning.
pub fn validate_distribution(
    method: &str,
    has_self_service: bool,
) -> Result<Option<ValidationWarning>, ValidationError> {
    let uses_self_service = method == SELF_SERVICE_METHOD;
    let result = match (uses_self_service, has_self_service) {
        (true, false) => Err(ValidationError::SelfServiceRequired),
        (false, true) => Ok(Some(ValidationWarning::SelfServiceUnused {
            method: method.to_string(),
        })),
        _ => Ok(None),
    };
    match &result {
        Ok(Some(warning)) => tracing::warn!(op = "validate_distribution", %warning),
        Ok(None) => tracing::debug!(op = "validate_distribution", method, "distribution consistent"),
        Err(err) => tracing::debug!(op = "validate_distribution", method, error = %err, "distribution rejected"),
    }
    result
}

/// Requires exactly one entry in `PayloadContent`.
pub fn validate_payload_count(profile: &Profile) -> Result<(), ValidationError> {
    match profile.payloads().len() {
        1 => Ok(()),
        found => Err(ValidationError::PayloadCount { found }),
    }
}
