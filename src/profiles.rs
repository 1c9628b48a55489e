//! Profile records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::Findora;

pub const PROFILES_TABLE: &str = "profiles";

/// Public profile of an identity; `id` is the identity id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Upsert payload keyed by `id`
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub id: String,
    pub full_name: String,
    pub phone: String,
    pub updated_at: DateTime<Utc>,
}

/// Profile table operations
pub struct ProfilesApi<'a> {
    client: &'a Findora,
}

impl<'a> ProfilesApi<'a> {
    pub(crate) fn new(client: &'a Findora) -> Self {
        Self { client }
    }

    /// The profile for an identity; `None` when it was never saved
    pub async fn get(&self, user_id: &str) -> Result<Option<Profile>, Error> {
        self.client
            .from(PROFILES_TABLE)
            .select("*")
            .eq("id", user_id)
            .single()
            .await
    }

    /// Create or replace the profile for `update.id`
    pub async fn upsert(&self, update: &ProfileUpdate) -> Result<(), Error> {
        self.client
            .from(PROFILES_TABLE)
            .upsert(update)
            .on_conflict("id")
            .execute::<serde_json::Value>()
            .await?;
        Ok(())
    }
}
