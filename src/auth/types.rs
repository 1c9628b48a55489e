//! Types for authentication and user management

use serde::{Deserialize, Serialize};

use super::Session;

/// User data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user ID
    pub id: String,

    /// The user's email address
    #[serde(default)]
    pub email: Option<String>,

    /// The app metadata
    #[serde(default)]
    pub app_metadata: serde_json::Value,

    /// The user metadata; `name` holds the display name given at sign-up
    #[serde(default)]
    pub user_metadata: serde_json::Value,

    /// The user's role
    #[serde(default)]
    pub role: Option<String>,

    /// The creation time
    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    /// The display name from user metadata, if any
    pub fn display_name(&self) -> Option<&str> {
        self.user_metadata
            .get("name")
            .and_then(|v| v.as_str())
            .filter(|name| !name.is_empty())
    }
}

/// Result of a sign-up.
///
/// When email confirmation is required the auth service returns the user
/// without a session.
#[derive(Debug, Clone)]
pub struct SignUpResponse {
    pub user: Option<User>,
    pub session: Option<Session>,
}

/// Auth state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChangeEvent {
    SignedIn,
    SignedOut,
    /// A new access token replaced the current one; the identity is unchanged
    TokenRefreshed,
}

impl AuthChangeEvent {
    /// Convert the event to its wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthChangeEvent::SignedIn => "SIGNED_IN",
            AuthChangeEvent::SignedOut => "SIGNED_OUT",
            AuthChangeEvent::TokenRefreshed => "TOKEN_REFRESHED",
        }
    }
}

/// An auth event together with the session after the transition
#[derive(Debug, Clone)]
pub struct AuthStateChange {
    pub event: AuthChangeEvent,
    pub session: Option<Session>,
}
