//! Error handling for the Findora client

use std::fmt;
use thiserror::Error;

/// Unified error type for the Findora client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Authentication errors reported by the auth service
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Table or RPC errors reported by the data backend
    #[error("Database error: {0}")]
    Database(String),

    /// Object storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Input rejected before any request was issued
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation needs a signed-in identity
    #[error("Not signed in")]
    NotSignedIn,

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new database error
    pub fn database<T: fmt::Display>(msg: T) -> Self {
        Error::Database(msg.to_string())
    }

    /// Create a new storage error
    pub fn storage<T: fmt::Display>(msg: T) -> Self {
        Error::Storage(msg.to_string())
    }

    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// The text shown to the user in a notification.
    ///
    /// Backend-reported errors show the backend's own message without the
    /// category prefix.
    pub fn user_message(&self) -> String {
        match self {
            Error::Auth(msg)
            | Error::Database(msg)
            | Error::Storage(msg)
            | Error::Validation(msg)
            | Error::General(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_strips_category() {
        assert_eq!(Error::auth("Invalid login credentials").user_message(), "Invalid login credentials");
        assert_eq!(Error::NotSignedIn.user_message(), "Not signed in");
        assert_eq!(Error::database("boom").to_string(), "Database error: boom");
    }
}
