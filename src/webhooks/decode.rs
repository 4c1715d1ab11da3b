//! Admission review decoding.
//!
//! Decoding happens in two stages: the outer `AdmissionReview` envelope,
//! then the embedded object selected by the declared group/kind. Both
//! stages fail closed - a payload that cannot be decoded is surfaced as a
//! `DecodeError`, never replaced with a defaulted object.

use k8s_openapi::api::apps::v1::Deployment;
use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionReview};
use thiserror::Error;
use tracing::debug;

/// API group of the resource this webhook validates
pub const DEPLOYMENT_GROUP: &str = "apps";
/// Kind of the resource this webhook validates
pub const DEPLOYMENT_KIND: &str = "Deployment";

/// Errors raised while decoding an admission review
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The request body is not a valid AdmissionReview envelope
    #[error("Invalid AdmissionReview envelope: {0}")]
    Envelope(#[from] serde_json::Error),

    /// The envelope carries no request payload
    #[error("AdmissionReview has no request payload: {0}")]
    MissingRequest(String),

    /// The declared kind is not apps/Deployment
    #[error(
        "Unexpected resource kind: expected {DEPLOYMENT_GROUP}/{DEPLOYMENT_KIND}, got {group}/{kind}"
    )]
    KindMismatch { group: String, kind: String },

    /// The request has no embedded object
    #[error("Admission request has no object payload")]
    MissingObject,

    /// The embedded object does not decode as a Deployment
    #[error("Invalid Deployment object: {0}")]
    Object(#[source] serde_json::Error),
}

/// Decode the outer AdmissionReview envelope into a typed request.
///
/// The object payload stays dynamic at this stage so the UID is available
/// even when the embedded object later turns out to be garbage.
pub fn parse_review(body: &[u8]) -> Result<AdmissionRequest<DynamicObject>, DecodeError> {
    let review: AdmissionReview<DynamicObject> = serde_json::from_slice(body)?;
    review
        .try_into()
        .map_err(|e: kube::core::admission::ConvertAdmissionReviewError| {
            DecodeError::MissingRequest(e.to_string())
        })
}

/// Decode the embedded object of an admission request as a Deployment.
///
/// Checks the declared group/kind before touching the payload, and requires
/// the object to be present: an absent object is a decode failure, not an
/// implicit zero-replica Deployment.
pub fn extract_deployment(
    request: &AdmissionRequest<DynamicObject>,
) -> Result<Deployment, DecodeError> {
    let gvk = &request.kind;
    if gvk.group != DEPLOYMENT_GROUP || gvk.kind != DEPLOYMENT_KIND {
        return Err(DecodeError::KindMismatch {
            group: gvk.group.clone(),
            kind: gvk.kind.clone(),
        });
    }

    let object = request.object.as_ref().ok_or(DecodeError::MissingObject)?;

    debug!(
        name = ?object.metadata.name,
        namespace = ?object.metadata.namespace,
        "Decoding embedded Deployment"
    );

    let value = serde_json::to_value(object).map_err(DecodeError::Object)?;
    serde_json::from_value(value).map_err(DecodeError::Object)
}
