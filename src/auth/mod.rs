//! Authentication against the backend's auth service

mod session;
mod store;
mod types;

use reqwest::Client;
use serde_json::json;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

use crate::config::ClientOptions;
use crate::error::Error;
use crate::fetch::{Fetch, CLIENT_INFO};

pub use session::*;
pub use store::*;
pub use types::*;

/// Client for the auth service
#[derive(Clone)]
pub struct Auth {
    /// The base URL for the backend
    url: String,

    /// The anonymous API key
    key: String,

    /// HTTP client used for requests
    client: Client,

    /// The current session
    session: Arc<RwLock<Option<Session>>>,

    /// Auth event fan-out
    events: broadcast::Sender<AuthStateChange>,

    /// Client options
    options: ClientOptions,
}

impl Auth {
    /// Create a new Auth client
    pub(crate) fn new(url: &str, key: &str, client: Client, options: ClientOptions) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
            session: Arc::new(RwLock::new(None)),
            events,
            options,
        }
    }

    fn get_auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    fn store_session(&self, session: Option<Session>) {
        if session.is_some() && !self.options.persist_session {
            return;
        }
        *self.session.write().unwrap_or_else(|e| e.into_inner()) = session;
    }

    fn emit(&self, event: AuthChangeEvent, session: Option<Session>) {
        log::debug!("auth event: {}", event.as_str());
        // No receivers is fine; nobody is listening yet.
        let _ = self.events.send(AuthStateChange { event, session });
    }

    /// Subscribe to auth state transitions
    pub fn on_auth_state_change(&self) -> broadcast::Receiver<AuthStateChange> {
        self.events.subscribe()
    }

    /// Sign up a new user with email, password and a display name
    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<SignUpResponse, Error> {
        let url = self.get_auth_url("/signup");

        let body = json!({
            "email": email,
            "password": password,
            "data": { "name": name },
        });

        let value = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", CLIENT_INFO)
            .on_error(Error::Auth)
            .json(&body)?
            .execute::<serde_json::Value>()
            .await?;

        // With auto-confirm the service answers with a full session,
        // otherwise with the bare user awaiting confirmation.
        if value.get("access_token").is_some() {
            let session = serde_json::from_value::<Session>(value)?.stamp_expiry();
            let user = session.user.clone();
            self.store_session(Some(session.clone()));
            self.emit(AuthChangeEvent::SignedIn, Some(session.clone()));
            return Ok(SignUpResponse {
                user: Some(user),
                session: Some(session),
            });
        }

        let user_value = value.get("user").cloned().unwrap_or(value);
        let user = serde_json::from_value::<User>(user_value).ok();

        Ok(SignUpResponse { user, session: None })
    }

    /// Sign in a user with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, Error> {
        let url = self.get_auth_url("/token?grant_type=password");

        let body = json!({
            "email": email,
            "password": password,
        });

        let session = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", CLIENT_INFO)
            .on_error(Error::Auth)
            .json(&body)?
            .execute::<Session>()
            .await?
            .stamp_expiry();

        self.store_session(Some(session.clone()));
        self.emit(AuthChangeEvent::SignedIn, Some(session.clone()));

        Ok(session)
    }

    /// Sign out the current user.
    ///
    /// Without a session this only clears local state and emits the event.
    pub async fn sign_out(&self) -> Result<(), Error> {
        let url = self.get_auth_url("/logout");

        if let Some(token) = self.access_token() {
            Fetch::post(&self.client, &url)
                .header("apikey", &self.key)
                .header("X-Client-Info", CLIENT_INFO)
                .bearer_auth(&token)
                .on_error(Error::Auth)
                .execute_empty()
                .await?;
        }

        self.store_session(None);
        self.emit(AuthChangeEvent::SignedOut, None);

        Ok(())
    }

    /// Get the user data for the currently authenticated user
    pub async fn get_user(&self) -> Result<User, Error> {
        let url = self.get_auth_url("/user");

        let token = self.access_token().ok_or(Error::NotSignedIn)?;

        let user = Fetch::get(&self.client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", CLIENT_INFO)
            .bearer_auth(&token)
            .on_error(Error::Auth)
            .execute::<User>()
            .await?;

        Ok(user)
    }

    /// Get the current session. An expired session counts as none.
    pub fn get_session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .filter(|s| !s.is_expired())
    }

    /// Exchange the stored refresh token for a new session.
    ///
    /// Works on an expired session as long as a refresh token is held.
    pub async fn refresh_session(&self) -> Result<Session, Error> {
        let refresh_token = self
            .session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| s.refresh_token.clone())
            .filter(|token| !token.is_empty())
            .ok_or(Error::NotSignedIn)?;

        let url = self.get_auth_url("/token?grant_type=refresh_token");

        let session = Fetch::post(&self.client, &url)
            .header("apikey", &self.key)
            .header("X-Client-Info", CLIENT_INFO)
            .on_error(Error::Auth)
            .json(&json!({ "refresh_token": refresh_token }))?
            .execute::<Session>()
            .await?
            .stamp_expiry();

        self.store_session(Some(session.clone()));
        self.emit(AuthChangeEvent::TokenRefreshed, Some(session.clone()));

        Ok(session)
    }

    /// Restore a previously obtained session without emitting an event
    pub fn set_session(&self, session: Session) {
        self.store_session(Some(session));
    }

    /// The access token of the current session
    pub fn access_token(&self) -> Option<String> {
        self.get_session().map(|s| s.access_token)
    }
}
