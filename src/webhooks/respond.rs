//! Admission response assembly.
//!
//! Builds the outbound `AdmissionReview` envelope, echoing the request UID
//! and type meta, and serializes it for the wire. Serialization failures
//! degrade to a minimal well-formed deny envelope rather than an empty or
//! truncated body, so the API server always receives something it can
//! correlate.

use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview};
use serde::Serialize;
use tracing::error;

use super::policies::ValidationResult;

/// Build the response review for a validation outcome.
///
/// kube-rs deny() only sets status.message, so denial reasons are
/// formatted as "[reason] message".
pub fn build_review(
    request: &AdmissionRequest<DynamicObject>,
    result: &ValidationResult,
) -> AdmissionReview<DynamicObject> {
    let response = AdmissionResponse::from(request);
    if result.allowed {
        response.into_review()
    } else {
        let reason = result.reason.as_deref().unwrap_or("ValidationFailed");
        let message = result.message.as_deref().unwrap_or("Validation failed");
        response
            .deny(format!("[{}] {}", reason, message))
            .into_review()
    }
}

/// Build a deny review for a request that decoded far enough to carry a UID
pub fn deny_review(
    request: &AdmissionRequest<DynamicObject>,
    reason: &str,
    message: &str,
) -> AdmissionReview<DynamicObject> {
    AdmissionResponse::from(request)
        .deny(format!("[{}] {}", reason, message))
        .into_review()
}

/// Serialize a review for the wire.
///
/// Falls back to a minimal deny envelope carrying the response UID if
/// encoding the full review fails.
pub fn to_wire(review: &AdmissionReview<DynamicObject>) -> Vec<u8> {
    match serde_json::to_vec(review) {
        Ok(body) => body,
        Err(e) => {
            error!(error = %e, "Failed to serialize admission response, sending fallback deny");
            let uid = review
                .response
                .as_ref()
                .map(|r| r.uid.as_str())
                .unwrap_or("");
            fallback_deny(uid, "internal error serializing admission response")
        }
    }
}

#[derive(Serialize)]
struct FallbackStatus<'a> {
    message: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FallbackResponse<'a> {
    uid: &'a str,
    allowed: bool,
    status: FallbackStatus<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FallbackReview<'a> {
    api_version: &'a str,
    kind: &'a str,
    response: FallbackResponse<'a>,
}

/// Minimal well-formed deny envelope used when normal serialization fails
pub fn fallback_deny(uid: &str, message: &str) -> Vec<u8> {
    let review = FallbackReview {
        api_version: "admission.k8s.io/v1",
        kind: "AdmissionReview",
        response: FallbackResponse {
            uid,
            allowed: false,
            status: FallbackStatus { message },
        },
    };
    // A borrowed struct of plain strings cannot fail to encode
    serde_json::to_vec(&review).unwrap_or_default()
}
