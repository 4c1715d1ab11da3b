//! Webhook configuration.
//!
//! All settings are read from the environment with sensible defaults.
//! Invalid values are startup errors; the process must not come up with a
//! half-understood configuration.

use std::net::{IpAddr, Ipv4Addr};

use thiserror::Error;

/// Default webhook server port
pub const DEFAULT_PORT: u16 = 8443;
/// Default path to webhook TLS certificate
pub const DEFAULT_CERT_PATH: &str = "/etc/webhook/certs/tls.crt";
/// Default path to webhook TLS private key
pub const DEFAULT_KEY_PATH: &str = "/etc/webhook/certs/tls.key";

/// Errors raised while loading the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// WEBHOOK_BIND_ADDR is not a valid IP address
    #[error("Invalid WEBHOOK_BIND_ADDR '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },

    /// WEBHOOK_PORT is not a valid port number
    #[error("Invalid WEBHOOK_PORT '{value}': {source}")]
    InvalidPort {
        value: String,
        source: std::num::ParseIntError,
    },
}

/// Runtime configuration for the webhook server
#[derive(Clone, Debug)]
pub struct Config {
    /// Address the TLS listener binds to
    pub bind_addr: IpAddr,
    /// Port the TLS listener binds to
    pub port: u16,
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: String,
    /// Path to the TLS private key file (PEM format)
    pub key_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            cert_path: DEFAULT_CERT_PATH.to_string(),
            key_path: DEFAULT_KEY_PATH.to_string(),
        }
    }
}

impl Config {
    /// Load the configuration from the process environment.
    ///
    /// Recognized variables: `WEBHOOK_BIND_ADDR`, `WEBHOOK_PORT`,
    /// `WEBHOOK_CERT_PATH`, `WEBHOOK_KEY_PATH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_addr = match lookup("WEBHOOK_BIND_ADDR") {
            Some(value) => value
                .parse()
                .map_err(|source| ConfigError::InvalidBindAddr { value, source })?,
            None => defaults.bind_addr,
        };

        let port = match lookup("WEBHOOK_PORT") {
            Some(value) => value
                .parse()
                .map_err(|source| ConfigError::InvalidPort { value, source })?,
            None => defaults.port,
        };

        let cert_path = lookup("WEBHOOK_CERT_PATH").unwrap_or(defaults.cert_path);
        let key_path = lookup("WEBHOOK_KEY_PATH").unwrap_or(defaults.key_path);

        Ok(Self {
            bind_addr,
            port,
            cert_path,
            key_path,
        })
    }
}
