//! deployment-webhook - A Kubernetes validating admission webhook for
//! Deployment replica counts.
//!
//! This is the main entry point that:
//! - Initializes structured logging
//! - Loads the webhook configuration from the environment
//! - Starts the health server and the TLS webhook server

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{error, info};

use deployment_webhook::config::Config;
use deployment_webhook::health::{HealthState, run_health_server};
use deployment_webhook::webhooks::{WebhookState, run_webhook_server};

/// Grace period for in-flight admission requests to complete during shutdown
const SHUTDOWN_GRACE_PERIOD_SECS: u64 = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("deployment_webhook=info".parse()?),
        )
        .json()
        .init();

    info!("Starting deployment-webhook");

    let config = Config::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        cert_path = %config.cert_path,
        key_path = %config.key_path,
        "Loaded webhook configuration"
    );

    // Create shared health state
    let health_state = Arc::new(HealthState::new());

    // Start health server immediately (probes should work before TLS is up)
    let health_handle = {
        let health_state = health_state.clone();
        tokio::spawn(async move {
            if let Err(e) = run_health_server(health_state).await {
                error!("Health server error: {}", e);
            }
        })
    };

    let webhook_state = Arc::new(WebhookState::new(health_state.clone()));

    health_state.set_ready(true).await;

    // Run the webhook server in the foreground so TLS/bind failures abort
    // startup with a non-zero exit code.
    tokio::select! {
        result = run_webhook_server(&config, webhook_state) => {
            if let Err(e) = result {
                error!("Webhook server error: {}", e);
                return Err(e.into());
            }
        }
        result = health_handle => {
            if let Err(e) = result {
                error!("Health server task panicked: {}", e);
            }
        }
        // Handle graceful shutdown on SIGTERM or SIGINT
        _ = shutdown_signal() => {
            info!("Received shutdown signal, initiating graceful shutdown...");

            // Mark as not ready so the control plane stops routing to us
            health_state.set_ready(false).await;
            info!("Marked webhook as not ready");

            // Give in-flight admission requests time to complete
            info!(
                "Waiting {}s for in-flight admission requests to complete...",
                SHUTDOWN_GRACE_PERIOD_SECS
            );
            tokio::time::sleep(Duration::from_secs(SHUTDOWN_GRACE_PERIOD_SECS)).await;

            info!("Grace period complete, shutting down");
        }
    }

    info!("Webhook stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// Note: Signal handler setup failures are fatal - the webhook cannot shut
/// down gracefully without them. Using expect() here is intentional.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
