//! Webhook module for validating Deployment admission requests.
//!
//! Each request runs a linear, stateless pipeline:
//! decode the `AdmissionReview` envelope, extract the embedded Deployment,
//! apply the validation policies, and respond with the request UID echoed.

pub mod decode;
pub mod policies;
pub mod respond;
mod server;

pub use policies::{ValidationContext, ValidationResult};
pub use server::{WebhookError, WebhookState, create_webhook_router, run_webhook_server};
