//! Findora client library
//!
//! Typed access to the Findora lost-and-found backend (auth, tables, RPC and
//! object storage) together with the application logic built on top of it:
//! the session store, route guards, page view models and telemetry.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod guard;
pub mod items;
pub mod postgrest;
pub mod profiles;
pub mod routes;
pub mod setup;
pub mod shutdown;
pub mod storage;
pub mod telemetry;
pub mod ui;
pub mod views;

use reqwest::Client;
use serde::Serialize;

use crate::auth::Auth;
use crate::config::{ClientOptions, Config};
use crate::fetch::ApiContext;
use crate::items::ItemsApi;
use crate::postgrest::{PostgrestClient, RpcBuilder};
use crate::profiles::ProfilesApi;
use crate::storage::StorageClient;
use crate::telemetry::Monitor;

/// The main entry point for the Findora backend
#[derive(Clone)]
pub struct Findora {
    /// The base URL for the backend
    pub url: String,
    /// The anonymous API key
    pub key: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Auth client for sessions and sign-in
    pub auth: Auth,
    /// Client options
    pub options: ClientOptions,
    /// Receives backend request telemetry when attached
    monitor: Option<Monitor>,
}

impl Findora {
    /// Create a new client
    ///
    /// # Example
    ///
    /// ```
    /// use findora::Findora;
    ///
    /// let findora = Findora::new("https://your-project-url.supabase.co", "your-anon-key");
    /// ```
    pub fn new(url: &str, key: &str) -> Self {
        Self::new_with_options(url, key, ClientOptions::default())
    }

    /// Create a new client with custom options
    pub fn new_with_options(url: &str, key: &str, options: ClientOptions) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().unwrap_or_else(|e| {
            log::warn!("falling back to a default HTTP client: {}", e);
            Client::new()
        });

        let url = url.trim_end_matches('/');
        let auth = Auth::new(url, key, http_client.clone(), options.clone());

        Self {
            url: url.to_string(),
            key: key.to_string(),
            http_client,
            auth,
            options,
            monitor: None,
        }
    }

    /// Create a client from loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new_with_options(&config.supabase_url, &config.supabase_anon_key, config.client.clone())
    }

    /// Report backend requests to telemetry
    pub fn with_monitor(mut self, monitor: Monitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Get a reference to the auth client
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    fn api(&self) -> ApiContext {
        ApiContext {
            client: self.http_client.clone(),
            key: self.key.clone(),
            token: self.auth.access_token(),
            monitor: self.monitor.clone(),
        }
    }

    /// Create a client for a table, authorized as the current identity
    pub fn from(&self, table: &str) -> PostgrestClient {
        PostgrestClient::new(&self.url, table, self.api())
    }

    /// Call a stored procedure
    pub fn rpc<T: Serialize>(&self, function: &str, params: T) -> RpcBuilder<T> {
        let url = format!("{}/rest/v1/rpc/{}", self.url, function);
        RpcBuilder::new(url, self.api(), params)
    }

    /// Get a storage client, authorized as the current identity
    pub fn storage(&self) -> StorageClient {
        StorageClient::new(&self.url, self.api())
    }

    /// Lost item records
    pub fn items(&self) -> ItemsApi<'_> {
        ItemsApi::new(self)
    }

    /// Profile records
    pub fn profiles(&self) -> ProfilesApi<'_> {
        ProfilesApi::new(self)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::app::{App, AppContext};
    pub use crate::auth::{SessionSnapshot, SessionStore};
    pub use crate::config::{ClientOptions, Config};
    pub use crate::error::Error;
    pub use crate::guard::{AdminCheck, AdminGate, GuardOutcome};
    pub use crate::items::{LostItem, NewLostItem, RecencyFilter};
    pub use crate::routes::Route;
    pub use crate::telemetry::Monitor;
    pub use crate::ui::{Navigator, Notifier, Toast};
    pub use crate::views::ViewState;
    pub use crate::Findora;
}
