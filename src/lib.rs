//! deployment-webhook library crate
//!
//! This module exports the webhook pipeline, configuration, and health
//! endpoints.

pub mod config;
pub mod health;
pub mod webhooks;

pub use config::Config;
pub use health::HealthState;
pub use webhooks::{WebhookError, WebhookState, run_webhook_server};
