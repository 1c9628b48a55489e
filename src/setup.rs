//! Backend bootstrap helpers
//!
//! Failures are reported through the log and a `false` result; the helpers
//! never fail the caller.

use serde_json::Value;

use crate::items::{LOST_ITEMS_BUCKET, LOST_ITEMS_TABLE};
use crate::storage::FileOptions;
use crate::ui::{Notifier, Toast};
use crate::Findora;

/// Object written by the storage permission probe, relative to the identity's folder
pub const PERMISSION_PROBE_FILE: &str = "test-permission.txt";

/// Make sure the public image bucket exists
pub async fn setup_lost_items_bucket(client: &Findora) -> bool {
    match client.storage().ensure_bucket(LOST_ITEMS_BUCKET).await {
        Ok(created) => {
            if !created {
                log::debug!("{} bucket already exists", LOST_ITEMS_BUCKET);
            }
            true
        }
        Err(e) => {
            log::error!("Error setting up {} bucket: {}", LOST_ITEMS_BUCKET, e);
            false
        }
    }
}

/// Check that the current identity may read the item table
pub async fn check_lost_items_access(client: &Findora) -> bool {
    let result = client
        .from(LOST_ITEMS_TABLE)
        .select("*")
        .limit(1)
        .execute::<Value>()
        .await;

    match result {
        Ok(_) => {
            log::info!("{} table access verified", LOST_ITEMS_TABLE);
            true
        }
        Err(e) => {
            log::error!("Error accessing {} table: {}", LOST_ITEMS_TABLE, e);
            false
        }
    }
}

/// Probe whether the identity may write into its image folder.
///
/// Writes a small object (upsert) and removes it again.
pub async fn test_storage_upload(client: &Findora, user_id: &str) -> bool {
    if user_id.is_empty() {
        log::warn!("No user id provided for storage upload test");
        return false;
    }

    let probe = format!("{}/{}", user_id, PERMISSION_PROBE_FILE);
    let storage = client.storage();
    let bucket = storage.from(LOST_ITEMS_BUCKET);

    let options = FileOptions::new()
        .with_content_type("text/plain")
        .with_upsert(true);
    if let Err(e) = bucket.upload(&probe, b"test".to_vec(), options).await {
        log::error!("Storage upload test failed: {}", e);
        return false;
    }

    if let Err(e) = bucket.remove(&[probe.as_str()]).await {
        log::warn!("Could not remove storage probe {}: {}", probe, e);
    }
    log::info!("Storage upload test successful");
    true
}

/// Startup checks: the image bucket and read access to the item table.
///
/// Restricted table access is reported to the user as a warning.
pub async fn initialize_system(client: &Findora, notifier: &dyn Notifier) {
    if !setup_lost_items_bucket(client).await {
        log::warn!("{} bucket setup incomplete", LOST_ITEMS_BUCKET);
    }

    if !check_lost_items_access(client).await {
        notifier.notify(Toast::warning(
            "Database access is restricted. Some features may not work correctly.",
        ));
    }

    log::info!("System initialization completed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_setup_bucket_reports_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/storage/v1/bucket"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
            .mount(&server)
            .await;

        let client = Findora::new(&server.uri(), "anon");
        assert!(!setup_lost_items_bucket(&client).await);
    }

    #[tokio::test]
    async fn test_setup_bucket_existing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/storage/v1/bucket"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "lost-items", "name": "lost-items", "public": true }
            ])))
            .mount(&server)
            .await;

        let client = Findora::new(&server.uri(), "anon");
        assert!(setup_lost_items_bucket(&client).await);
    }

    #[tokio::test]
    async fn test_check_access() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/lost_items"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = Findora::new(&server.uri(), "anon");
        assert!(check_lost_items_access(&client).await);
    }

    #[tokio::test]
    async fn test_check_access_blocked() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/lost_items"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "permission denied for table lost_items"
            })))
            .mount(&server)
            .await;

        let client = Findora::new(&server.uri(), "anon");
        assert!(!check_lost_items_access(&client).await);
    }

    #[tokio::test]
    async fn test_storage_probe_writes_and_removes() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/storage/v1/object/lost-items/u-1/test-permission.txt"))
            .and(header("x-upsert", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Key": "lost-items/u-1/test-permission.txt"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/storage/v1/object/lost-items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = Findora::new(&server.uri(), "anon");
        assert!(test_storage_upload(&client, "u-1").await);
    }

    #[tokio::test]
    async fn test_storage_probe_denied() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "message": "new row violates row-level security policy"
            })))
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = Findora::new(&server.uri(), "anon");
        assert!(!test_storage_upload(&client, "u-1").await);
        assert!(!test_storage_upload(&client, "").await);
    }
}
