//! Configuration for the Findora client
//!
//! All values are read from environment variables (a `.env` file is honoured).
//! A missing or unparsable value falls back to its default; loading never fails.

use std::env;
use std::time::Duration;

/// Default backend URL, a local Supabase stack.
pub const DEFAULT_SUPABASE_URL: &str = "http://localhost:54321";

/// Default telemetry vendor site.
pub const DEFAULT_DATADOG_SITE: &str = "datadoghq.com";

/// Configuration options for the Findora client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Whether sessions returned by the auth service are kept by the client
    pub persist_session: bool,

    /// The request timeout
    pub request_timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            persist_session: true,
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ClientOptions {
    /// Set whether to persist the session
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }
}

/// Settings for the telemetry vendor
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryConfig {
    /// Explicit enable/disable toggle
    pub enabled: bool,
    /// Vendor application id
    pub application_id: String,
    /// Vendor client token; telemetry stays on the null implementation without one
    pub client_token: String,
    /// Vendor site, e.g. `datadoghq.eu`
    pub site: String,
    /// Overrides the intake URL derived from `site`
    pub intake_url: Option<String>,
    /// Service name attached to every event
    pub service: String,
    /// Deployment environment
    pub env: String,
    /// Application version
    pub version: String,
    /// How long the bootstrap waits before initializing the vendor
    pub init_delay: Duration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            application_id: String::new(),
            client_token: String::new(),
            site: DEFAULT_DATADOG_SITE.to_string(),
            intake_url: None,
            service: "object-recovery".to_string(),
            env: "production".to_string(),
            version: "1.0.0".to_string(),
            init_delay: Duration::from_millis(100),
        }
    }
}

impl TelemetryConfig {
    /// The browser log intake endpoint for the configured site.
    ///
    /// Subdomain dots of the site become dashes: `us3.datadoghq.com` is served
    /// by `browser-intake-us3-datadoghq.com`.
    pub fn intake_url(&self) -> String {
        if let Some(url) = &self.intake_url {
            return url.clone();
        }
        let host = match self.site.rsplit_once('.') {
            Some((domain, tld)) => format!("{}.{}", domain.replace('.', "-"), tld),
            None => self.site.clone(),
        };
        format!("https://browser-intake-{}/api/v2/logs", host)
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL
    pub supabase_url: String,
    /// Backend anonymous API key
    pub supabase_anon_key: String,
    /// HTTP client options
    pub client: ClientOptions,
    /// Telemetry settings
    pub telemetry: TelemetryConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let telemetry_defaults = TelemetryConfig::default();
        let client_defaults = ClientOptions::default();

        let request_timeout = get("FINDORA_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .or(client_defaults.request_timeout);

        let init_delay = get("FINDORA_TELEMETRY_DELAY_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(telemetry_defaults.init_delay);

        let telemetry = TelemetryConfig {
            enabled: get("FINDORA_ENABLE_TELEMETRY")
                .map(|v| parse_flag(&v))
                .unwrap_or(telemetry_defaults.enabled),
            application_id: get("FINDORA_DATADOG_APPLICATION_ID").unwrap_or_default(),
            client_token: get("FINDORA_DATADOG_CLIENT_TOKEN").unwrap_or_default(),
            site: get("FINDORA_DATADOG_SITE").unwrap_or(telemetry_defaults.site),
            intake_url: get("FINDORA_DATADOG_INTAKE_URL"),
            service: get("FINDORA_DATADOG_SERVICE").unwrap_or(telemetry_defaults.service),
            env: get("FINDORA_ENV").unwrap_or(telemetry_defaults.env),
            version: get("FINDORA_APP_VERSION").unwrap_or(telemetry_defaults.version),
            init_delay,
        };

        Self {
            supabase_url: get("FINDORA_SUPABASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_SUPABASE_URL.to_string()),
            supabase_anon_key: get("FINDORA_SUPABASE_ANON_KEY").unwrap_or_default(),
            client: ClientOptions {
                request_timeout,
                ..client_defaults
            },
            telemetry,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::from_lookup(|_| None);

        assert_eq!(config.supabase_url, DEFAULT_SUPABASE_URL);
        assert!(config.supabase_anon_key.is_empty());
        assert_eq!(config.client.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.telemetry, TelemetryConfig::default());
        assert_eq!(
            config.telemetry.intake_url(),
            "https://browser-intake-datadoghq.com/api/v2/logs"
        );
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("FINDORA_SUPABASE_URL", "https://abc.supabase.co/"),
            ("FINDORA_SUPABASE_ANON_KEY", "anon"),
            ("FINDORA_ENABLE_TELEMETRY", "TRUE"),
            ("FINDORA_DATADOG_CLIENT_TOKEN", "pub123"),
            ("FINDORA_DATADOG_SITE", "datadoghq.eu"),
            ("FINDORA_TELEMETRY_DELAY_MS", "250"),
        ]));

        assert_eq!(config.supabase_url, "https://abc.supabase.co");
        assert_eq!(config.supabase_anon_key, "anon");
        assert!(config.telemetry.enabled);
        assert_eq!(config.telemetry.client_token, "pub123");
        assert_eq!(config.telemetry.init_delay, Duration::from_millis(250));
        assert_eq!(
            config.telemetry.intake_url(),
            "https://browser-intake-datadoghq.eu/api/v2/logs"
        );
    }

    #[test]
    fn test_intake_host_for_regional_sites() {
        let mut telemetry = TelemetryConfig::default();

        telemetry.site = "us3.datadoghq.com".to_string();
        assert_eq!(telemetry.intake_url(), "https://browser-intake-us3-datadoghq.com/api/v2/logs");

        telemetry.site = "ddog-gov.com".to_string();
        assert_eq!(telemetry.intake_url(), "https://browser-intake-ddog-gov.com/api/v2/logs");

        telemetry.intake_url = Some("http://localhost:8080/logs".to_string());
        assert_eq!(telemetry.intake_url(), "http://localhost:8080/logs");
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("FINDORA_ENABLE_TELEMETRY", "maybe"),
            ("FINDORA_TELEMETRY_DELAY_MS", "soon"),
            ("FINDORA_REQUEST_TIMEOUT_SECS", "-3"),
            ("FINDORA_DATADOG_SITE", "  "),
        ]));

        assert!(!config.telemetry.enabled);
        assert_eq!(config.telemetry.init_delay, Duration::from_millis(100));
        assert_eq!(config.client.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.telemetry.site, DEFAULT_DATADOG_SITE);
    }
}
