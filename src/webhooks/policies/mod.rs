//! Validation policies for Deployment admission requests.
//!
//! Each policy is a pure function from the validation context to a result.
//! `validate_all` runs the configured policies in order and the first veto
//! wins; adding a rule means adding a function to `POLICIES`.

pub mod replicas;

use k8s_openapi::api::apps::v1::Deployment;

/// Result of a validation check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the validation passed
    pub allowed: bool,
    /// Reason for denial (if not allowed)
    pub reason: Option<String>,
    /// Detailed message (if not allowed)
    pub message: Option<String>,
}

impl ValidationResult {
    /// Create an allowed result
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
            message: None,
        }
    }

    /// Create a denied result
    pub fn denied(reason: &str, message: &str) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.to_string()),
            message: Some(message.to_string()),
        }
    }
}

/// Context for validation
pub struct ValidationContext<'a> {
    /// The Deployment being validated
    pub deployment: &'a Deployment,
    /// Whether this is a dry-run request
    pub dry_run: bool,
    /// The namespace of the resource
    pub namespace: Option<&'a str>,
}

/// A validation policy: pure, deterministic, no I/O
pub type Policy = fn(&ValidationContext<'_>) -> ValidationResult;

/// Ordered list of policies to enforce
const POLICIES: &[Policy] = &[replicas::validate];

/// Run all validation policies; the first denial wins
pub fn validate_all(ctx: &ValidationContext<'_>) -> ValidationResult {
    for policy in POLICIES {
        let result = policy(ctx);
        if !result.allowed {
            return result;
        }
    }

    ValidationResult::allowed()
}
