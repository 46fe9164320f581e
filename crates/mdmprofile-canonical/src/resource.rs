//! Pre-commit checks for a profile resource.
//!
//! Runs, in order: distribution method, level, plist formatting, then
//! ordering-diff suppression over the resource attributes. The first error
//! stops the run; warnings are collected.

use serde::Serialize;

use crate::comparator::{Comparator, SuppressionOutcome};
use crate::decode::DecodeError;
use crate::formatting::{check_indentation, FormattingError};
use crate::profile::parse_profile;
use crate::validation::{validate_distribution, validate_level, ValidationError, ValidationWarning};
use crate::value::Document;

/// Proposed state of a profile resource, as the lifecycle framework sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileResource {
    /// Resource name.
    pub name: String,
    /// Declared install level (`System` or `User`).
    pub level: String,
    /// Declared distribution method, if set.
    pub distribution_method: Option<String>,
    /// Whether a self-service block is configured.
    pub has_self_service: bool,
    /// Plist text of the profile.
    pub payloads: String,
    /// Remaining attributes, including `scope` and `exclusions`.
    pub attributes: Document,
}

/// Error raised by [`check_resource`], prefixed with the resource name.
#[derive(thiserror::Error, Debug)]
pub enum ResourceError {
    /// A cross-field check failed.
    #[error("in 'mdmprofile.{resource}': {source}")]
    Validation {
        /// Resource name.
        resource: String,
        /// Underlying error.
        source: ValidationError,
    },
    /// The plist could not be decoded.
    #[error("in 'mdmprofile.{resource}': error decoding plist data: {source}")]
    Decode {
        /// Resource name.
        resource: String,
        /// Underlying error.
        source: DecodeError,
    },
    /// The plist text is not canonically formatted.
    #[error("in 'mdmprofile.{resource}': {source}")]
    Formatting {
        /// Resource name.
        resource: String,
        /// Underlying error.
        source: FormattingError,
    },
}

/// Everything the checks produced for a resource that passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDiffReport {
    /// Non-fatal findings.
    pub warnings: Vec<ValidationWarning>,
    /// Suppression decisions; `None` on create.
    pub suppression: Option<SuppressionOutcome>,
    /// Attributes to commit: the proposed ones, with suppressed names
    /// rewritten to their prior values.
    pub attributes: Document,
}

/// Runs every pre-commit check for `proposed`. `prior` holds the attributes
/// currently in state, absent on create.
pub fn check_resource(
    prior: Option<&Document>,
    proposed: &ProfileResource,
    comparator: &Comparator,
) -> Result<ResourceDiffReport, ResourceError> {
    let result = run_checks(prior, proposed, comparator);
    match &result {
        Ok(report) => tracing::info!(
            op = "check_resource",
            resource = %proposed.name,
            warnings = report.warnings.len(),
            suppressed = report.suppression.as_ref().map_or(0, |s| s.suppressed.len()),
            "resource checks passed"
        ),
        Err(err) => tracing::warn!(
            op = "check_resource",
            resource = %proposed.name,
            error = %err,
            "resource checks failed"
        ),
    }
    result
}

fn run_checks(
    prior: Option<&Document>,
    proposed: &ProfileResource,
    comparator: &Comparator,
) -> Result<ResourceDiffReport, ResourceError> {
    let resource = || proposed.name.clone();
    let mut warnings = Vec::new();

    if let Some(method) = &proposed.distribution_method {
        let warning = validate_distribution(method, proposed.has_self_service).map_err(|source| {
            ResourceError::Validation {
                resource: resource(),
                source,
            }
        })?;
        warnings.extend(warning);
    }

    let profile =
        parse_profile(proposed.payloads.as_bytes()).map_err(|source| ResourceError::Decode {
            resource: resource(),
            source,
        })?;
    validate_level(&profile, &proposed.level).map_err(|source| ResourceError::Validation {
        resource: resource(),
        source,
    })?;

    check_indentation(&proposed.payloads).map_err(|source| ResourceError::Formatting {
        resource: resource(),
        source,
    })?;

    let suppression = prior.map(|old| comparator.suppress(old, &proposed.attributes));
    let attributes = suppression
        .as_ref()
        .and_then(|outcome| outcome.document.clone())
        .unwrap_or_else(|| proposed.attributes.clone());

    Ok(ResourceDiffReport {
        warnings,
        suppression,
        attributes,
    })
}
