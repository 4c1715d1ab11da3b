//! Admission webhook server.
//!
//! Provides the HTTPS endpoint for the Deployment validating webhook.
//!
//! To enable the webhook:
//! 1. Deploy cert-manager (or provision certificates another way)
//! 2. Create a ValidatingWebhookConfiguration pointing at /validate-deployment
//! 3. Mount the TLS certificate secret to the pod at /etc/webhook/certs/
//!
//! The handler is a straight-line pipeline over request-scoped data: decode
//! the envelope, extract the Deployment, validate, respond. Decode failures
//! fail closed with a deny response carrying a diagnostic message.

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use kube::core::admission::{AdmissionResponse, Operation};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::health::HealthState;
use crate::webhooks::decode;
use crate::webhooks::policies::{ValidationContext, ValidationResult, validate_all};
use crate::webhooks::respond;

/// Shared state for webhook handlers
pub struct WebhookState {
    pub health: Arc<HealthState>,
}

impl WebhookState {
    pub fn new(health: Arc<HealthState>) -> Self {
        Self { health }
    }
}

/// Create the webhook router
pub fn create_webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/validate-deployment", post(validate_deployment))
        .with_state(state)
}

/// Validate a Deployment admission webhook handler
///
/// Takes the raw body so malformed payloads are mapped by the decoder into
/// deterministic responses instead of extractor rejections.
async fn validate_deployment(
    State(state): State<Arc<WebhookState>>,
    body: Bytes,
) -> impl IntoResponse {
    let request = match decode::parse_review(&body) {
        Ok(request) => request,
        Err(e) => {
            error!(error = %e, "Failed to decode admission review envelope");
            state.health.metrics.record_decode_error();
            let review =
                AdmissionResponse::invalid(format!("Invalid AdmissionReview: {}", e)).into_review();
            return (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "application/json")],
                respond::to_wire(&review),
            );
        }
    };

    let uid = request.uid.clone();
    debug!(
        uid = %uid,
        operation = ?request.operation,
        namespace = ?request.namespace,
        name = ?request.name,
        "Processing admission request"
    );

    // DELETE operations are always allowed (there is no object to inspect)
    if request.operation == Operation::Delete {
        info!(uid = %uid, "Admission request allowed (DELETE)");
        state.health.metrics.record_decision(true);
        let review = respond::build_review(&request, &ValidationResult::allowed());
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            respond::to_wire(&review),
        );
    }

    // Decode the embedded Deployment; failures deny rather than falling
    // through to validation with a defaulted object
    let deployment = match decode::extract_deployment(&request) {
        Ok(deployment) => deployment,
        Err(e) => {
            error!(uid = %uid, error = %e, "Failed to decode embedded Deployment, denying");
            state.health.metrics.record_decode_error();
            let review = respond::deny_review(&request, "DecodeFailed", &e.to_string());
            return (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                respond::to_wire(&review),
            );
        }
    };

    let ctx = ValidationContext {
        deployment: &deployment,
        dry_run: request.dry_run,
        namespace: request.namespace.as_deref(),
    };

    let result = validate_all(&ctx);
    state.health.metrics.record_decision(result.allowed);

    if result.allowed {
        info!(uid = %uid, "Admission request allowed");
    } else {
        warn!(
            uid = %uid,
            reason = ?result.reason,
            message = ?result.message,
            "Admission request denied"
        );
    }

    let review = respond::build_review(&request, &result);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        respond::to_wire(&review),
    )
}

/// Errors that can occur when running the webhook server
#[derive(Error, Debug)]
pub enum WebhookError {
    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),

    /// Server error
    #[error("Webhook server error: {0}")]
    Server(String),
}

/// Run the webhook server with TLS
///
/// Binds to the configured address and serves the /validate-deployment
/// endpoint. TLS certificates are loaded from the configured paths; a
/// missing or unreadable pair is a startup error.
pub async fn run_webhook_server(
    config: &Config,
    state: Arc<WebhookState>,
) -> Result<(), WebhookError> {
    use axum_server::tls_rustls::RustlsConfig;
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let app = create_webhook_router(state);

    let tls = RustlsConfig::from_pem_file(
        PathBuf::from(&config.cert_path),
        PathBuf::from(&config.key_path),
    )
    .await
    .map_err(|e| WebhookError::TlsConfig(e.to_string()))?;

    let addr = SocketAddr::new(config.bind_addr, config.port);
    info!(addr = %addr, "Webhook server listening with TLS");

    axum_server::bind_rustls(addr, tls)
        .serve(app.into_make_service())
        .await
        .map_err(|e| WebhookError::Server(e.to_string()))?;

    Ok(())
}
