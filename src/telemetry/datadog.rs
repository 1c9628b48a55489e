//! Telemetry over the vendor's browser log intake
//!
//! The intake authenticates with the public client token passed as the
//! `dd-api-key` query parameter.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::RwLock;

use super::{Telemetry, TelemetryError, TelemetryUser};
use crate::config::TelemetryConfig;

/// Intake settings captured at `init`
#[derive(Debug, Clone)]
struct Intake {
    url: String,
    client_token: String,
    application_id: String,
    service: String,
    tags: String,
}

/// Ships actions and errors as JSON log entries to the vendor intake
pub struct DatadogTelemetry {
    client: Client,
    intake: RwLock<Option<Intake>>,
    user: RwLock<TelemetryUser>,
}

impl DatadogTelemetry {
    /// Create an uninitialized client
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Create an uninitialized client using an existing HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            intake: RwLock::new(None),
            user: RwLock::new(TelemetryUser::anonymous()),
        }
    }

    /// The user context currently attached to events
    pub fn current_user(&self) -> TelemetryUser {
        self.user
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn intake(&self) -> Result<Intake, TelemetryError> {
        self.intake
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(TelemetryError::NotInitialized)
    }

    async fn ship(&self, status: &str, message: &str, attributes: Value) -> Result<(), TelemetryError> {
        let intake = self.intake()?;
        let user = self.current_user();

        let entry = json!([{
            "ddsource": "findora",
            "service": intake.service,
            "ddtags": intake.tags,
            "status": status,
            "message": message,
            "application_id": intake.application_id,
            "usr": user,
            "attributes": attributes,
        }]);

        let response = self
            .client
            .post(&intake.url)
            .query(&[
                ("dd-api-key", intake.client_token.as_str()),
                ("ddsource", "findora"),
            ])
            .json(&entry)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TelemetryError::Rejected(response.status().as_u16()));
        }

        Ok(())
    }
}

impl Default for DatadogTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Telemetry for DatadogTelemetry {
    fn vendor(&self) -> &'static str {
        "datadog"
    }

    async fn init(&self, config: &TelemetryConfig) -> Result<(), TelemetryError> {
        if config.client_token.is_empty() {
            return Err(TelemetryError::MissingCredentials);
        }

        let intake = Intake {
            url: config.intake_url(),
            client_token: config.client_token.clone(),
            application_id: config.application_id.clone(),
            service: config.service.clone(),
            tags: format!("env:{},version:{}", config.env, config.version),
        };

        *self.intake.write().unwrap_or_else(|e| e.into_inner()) = Some(intake);
        Ok(())
    }

    async fn set_user(&self, user: &TelemetryUser) -> Result<(), TelemetryError> {
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = user.clone();
        Ok(())
    }

    async fn record_action(&self, name: &str, context: Value) -> Result<(), TelemetryError> {
        self.ship("info", name, json!({ "action": { "name": name, "context": context } }))
            .await
    }

    async fn record_error(
        &self,
        message: &str,
        source: &str,
        context: Value,
    ) -> Result<(), TelemetryError> {
        self.ship(
            "error",
            message,
            json!({ "error": { "source": source, "message": message, "context": context } }),
        )
        .await
    }
}
