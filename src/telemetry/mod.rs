//! Telemetry capability
//!
//! The monitoring vendor is reached through the [`Telemetry`] trait. A
//! [`NullTelemetry`] is chosen when telemetry is disabled or unconfigured, so
//! callers never have to ask whether a vendor is present. Application code
//! talks to telemetry through [`Monitor`], which swallows and logs every
//! failure.

mod bootstrap;
mod datadog;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::User;
use crate::config::TelemetryConfig;

pub use bootstrap::*;
pub use datadog::*;

/// Telemetry failures. These never reach the user.
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("telemetry is not initialized")]
    NotInitialized,

    #[error("missing client token")]
    MissingCredentials,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("intake rejected the payload with status {0}")]
    Rejected(u16),

    #[error("vendor error: {0}")]
    Vendor(String),
}

/// User context attached to telemetry events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl TelemetryUser {
    /// The placeholder used while nobody is signed in
    pub fn anonymous() -> Self {
        Self {
            id: "anonymous".to_string(),
            name: "Anonymous User".to_string(),
            email: "anonymous@example.com".to_string(),
        }
    }

    /// Build the context for a signed-in identity
    pub fn from_user(user: &User) -> Self {
        Self {
            id: if user.id.is_empty() {
                "anonymous".to_string()
            } else {
                user.id.clone()
            },
            name: user
                .display_name()
                .unwrap_or("Unknown User")
                .to_string(),
            email: user
                .email
                .clone()
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "unknown@example.com".to_string()),
        }
    }
}

/// The capability set of a monitoring vendor
#[async_trait]
pub trait Telemetry: Send + Sync {
    /// Short vendor name used in logs
    fn vendor(&self) -> &'static str;

    /// Start the vendor SDK
    async fn init(&self, config: &TelemetryConfig) -> Result<(), TelemetryError>;

    /// Replace the current user context
    async fn set_user(&self, user: &TelemetryUser) -> Result<(), TelemetryError>;

    /// Record a named user or system action
    async fn record_action(&self, name: &str, context: Value) -> Result<(), TelemetryError>;

    /// Record an error with the place it came from
    async fn record_error(
        &self,
        message: &str,
        source: &str,
        context: Value,
    ) -> Result<(), TelemetryError>;
}

/// Telemetry that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTelemetry;

#[async_trait]
impl Telemetry for NullTelemetry {
    fn vendor(&self) -> &'static str {
        "none"
    }

    async fn init(&self, _config: &TelemetryConfig) -> Result<(), TelemetryError> {
        Ok(())
    }

    async fn set_user(&self, _user: &TelemetryUser) -> Result<(), TelemetryError> {
        Ok(())
    }

    async fn record_action(&self, _name: &str, _context: Value) -> Result<(), TelemetryError> {
        Ok(())
    }

    async fn record_error(
        &self,
        _message: &str,
        _source: &str,
        _context: Value,
    ) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// Pick the telemetry implementation for a configuration
pub fn select(config: &TelemetryConfig) -> Arc<dyn Telemetry> {
    if config.enabled && !config.client_token.is_empty() {
        log::debug!("telemetry: using vendor intake at {}", config.intake_url());
        Arc::new(DatadogTelemetry::new())
    } else {
        if config.enabled {
            log::warn!("telemetry enabled without a client token, using the null implementation");
        }
        Arc::new(NullTelemetry)
    }
}

/// Best-effort front end over a [`Telemetry`] implementation.
///
/// No method returns an error; failures are logged at `warn`.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<dyn Telemetry>,
}

impl Monitor {
    /// Wrap a telemetry implementation
    pub fn new(inner: Arc<dyn Telemetry>) -> Self {
        Self { inner }
    }

    /// A monitor backed by [`NullTelemetry`]
    pub fn disabled() -> Self {
        Self::new(Arc::new(NullTelemetry))
    }

    /// Build the monitor selected by the configuration
    pub fn from_config(config: &TelemetryConfig) -> Self {
        Self::new(select(config))
    }

    /// Name of the vendor behind this monitor
    pub fn vendor(&self) -> &'static str {
        self.inner.vendor()
    }

    /// Initialize the vendor. Returns whether it succeeded.
    pub async fn init(&self, config: &TelemetryConfig) -> bool {
        match self.inner.init(config).await {
            Ok(()) => {
                log::info!("telemetry initialized (service {}, env {})", config.service, config.env);
                true
            }
            Err(e) => {
                log::warn!("failed to initialize telemetry: {}", e);
                false
            }
        }
    }

    /// Mirror the current identity into the vendor
    pub async fn set_user(&self, user: &TelemetryUser) {
        if let Err(e) = self.inner.set_user(user).await {
            log::warn!("failed to set telemetry user {}: {}", user.id, e);
        }
    }

    /// Record an action
    pub async fn action(&self, name: &str, context: Value) {
        if let Err(e) = self.inner.record_action(name, context).await {
            log::warn!("failed to record telemetry action {}: {}", name, e);
        }
    }

    /// Record an error
    pub async fn error(&self, message: &str, source: &str, context: Value) {
        if let Err(e) = self.inner.record_error(message, source, context).await {
            log::warn!("failed to record telemetry error from {}: {}", source, e);
        }
    }

    /// Record an action without waiting for the vendor
    pub fn track(&self, name: &str, context: Value) {
        let monitor = self.clone();
        let name = name.to_string();
        tokio::spawn(async move { monitor.action(&name, context).await });
    }

    /// Record an error without waiting for the vendor
    pub fn track_error(&self, message: &str, source: &str, context: Value) {
        let monitor = self.clone();
        let message = message.to_string();
        let source = source.to_string();
        tokio::spawn(async move { monitor.error(&message, &source, context).await });
    }
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("vendor", &self.inner.vendor())
            .finish()
    }
}
