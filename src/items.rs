//! Lost item records and search filtering

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::Findora;

/// Table holding lost items
pub const LOST_ITEMS_TABLE: &str = "lost_items";

/// Bucket holding item images
pub const LOST_ITEMS_BUCKET: &str = "lost-items";

/// How far back the recent filter reaches
pub const RECENT_WINDOW_DAYS: i64 = 7;

/// A found object awaiting its owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LostItem {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub place_found: String,
    pub location_to_collect: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Identity that registered the item
    #[serde(default)]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a lost item; the backend assigns id and timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewLostItem {
    pub name: String,
    pub phone: String,
    pub place_found: String,
    pub location_to_collect: String,
    pub image_url: Option<String>,
    pub user_id: Option<String>,
}

/// Recency filter applied on top of the search term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecencyFilter {
    #[default]
    All,
    /// Only items created within the last seven days
    Recent,
    AllItems,
}

impl LostItem {
    fn matches_term(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.place_found.to_lowercase().contains(needle)
    }
}

/// Filter a fetched item list by search term and recency.
///
/// The term matches case-insensitively against the item name and the place
/// it was found; a blank term keeps every item. `Recent` keeps items created
/// at or after `now - 7 days`. Order is preserved.
pub fn filter_items(
    items: &[LostItem],
    term: &str,
    filter: RecencyFilter,
    now: DateTime<Utc>,
) -> Vec<LostItem> {
    let needle = term.trim().to_lowercase();
    let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);

    items
        .iter()
        .filter(|item| needle.is_empty() || item.matches_term(&needle))
        .filter(|item| filter != RecencyFilter::Recent || item.created_at >= cutoff)
        .cloned()
        .collect()
}

/// Lost item table operations
pub struct ItemsApi<'a> {
    client: &'a Findora,
}

impl<'a> ItemsApi<'a> {
    pub(crate) fn new(client: &'a Findora) -> Self {
        Self { client }
    }

    /// Every item, newest first
    pub async fn list(&self) -> Result<Vec<LostItem>, Error> {
        self.client
            .from(LOST_ITEMS_TABLE)
            .select("*")
            .order("created_at", false)
            .execute()
            .await
    }

    /// Items registered by one identity, newest first
    pub async fn list_by_owner(&self, user_id: &str) -> Result<Vec<LostItem>, Error> {
        self.client
            .from(LOST_ITEMS_TABLE)
            .select("*")
            .eq("user_id", user_id)
            .order("created_at", false)
            .execute()
            .await
    }

    /// Insert one item; the stored row when the backend sends it back
    pub async fn insert(&self, item: &NewLostItem) -> Result<Option<LostItem>, Error> {
        let rows: Vec<LostItem> = self.client.from(LOST_ITEMS_TABLE).insert(item).execute().await?;
        Ok(rows.into_iter().next())
    }

    /// Delete one item by id
    pub async fn delete(&self, item_id: &str) -> Result<(), Error> {
        self.client
            .from(LOST_ITEMS_TABLE)
            .delete()
            .eq("id", item_id)
            .execute()
            .await
    }
}
