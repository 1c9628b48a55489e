//! Object storage for item images

mod types;

use reqwest::Method;
use serde_json::json;
use std::path::Path;

use crate::error::Error;
use crate::fetch::ApiContext;

pub use types::*;

/// Client for the storage service
pub struct StorageClient {
    /// The base URL for the backend
    url: String,

    /// Credentials and HTTP client
    api: ApiContext,
}

/// Client for a specific storage bucket
pub struct BucketClient<'a> {
    /// Reference to the storage client
    storage: &'a StorageClient,

    /// The bucket ID
    bucket_id: String,
}

impl StorageClient {
    pub(crate) fn new(url: &str, api: ApiContext) -> Self {
        Self {
            url: url.to_string(),
            api,
        }
    }

    /// Get the base URL for storage operations
    fn get_url(&self, path: &str) -> String {
        format!("{}/storage/v1{}", self.url, path)
    }

    /// Get a client for a specific bucket
    pub fn from(&self, bucket_id: &str) -> BucketClient<'_> {
        BucketClient {
            storage: self,
            bucket_id: bucket_id.to_string(),
        }
    }

    /// Get all buckets
    pub async fn list_buckets(&self) -> Result<Vec<Bucket>, Error> {
        let url = self.get_url("/bucket");

        self.api
            .request(Method::GET, &url)
            .on_error(Error::Storage)
            .execute::<Vec<Bucket>>()
            .await
    }

    /// Create a new bucket
    pub async fn create_bucket(&self, id: &str, public: bool) -> Result<(), Error> {
        let url = self.get_url("/bucket");

        let body = json!({
            "id": id,
            "name": id,
            "public": public,
        });

        self.api
            .request(Method::POST, &url)
            .on_error(Error::Storage)
            .json(&body)?
            .execute_empty()
            .await
    }

    /// Create a public bucket unless one with that name exists.
    ///
    /// Returns whether the bucket had to be created.
    pub async fn ensure_bucket(&self, id: &str) -> Result<bool, Error> {
        let buckets = self.list_buckets().await?;
        if buckets.iter().any(|b| b.name == id) {
            return Ok(false);
        }

        self.create_bucket(id, true).await?;
        log::info!("Created {} bucket successfully", id);
        Ok(true)
    }
}

impl<'a> BucketClient<'a> {
    /// Upload a file to the bucket
    pub async fn upload(&self, path: &str, file_data: Vec<u8>, options: FileOptions) -> Result<UploadResponse, Error> {
        let url = self.storage.get_url(&format!("/object/{}/{}", self.bucket_id, path));

        let file_name = Path::new(path)
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());

        let text = self
            .storage
            .api
            .request(Method::POST, &url)
            .header("Cache-Control", &format!("max-age={}", options.cache_control))
            .header("x-upsert", &options.upsert.to_string())
            .file("file", &file_name, file_data, options.content_type.as_deref())
            .on_error(Error::Storage)
            .execute_text()
            .await?;

        Ok(serde_json::from_str(&text).unwrap_or_default())
    }

    /// Delete files in the bucket
    pub async fn remove(&self, paths: &[&str]) -> Result<(), Error> {
        let url = self.storage.get_url(&format!("/object/{}", self.bucket_id));

        let body = json!({
            "prefixes": paths
        });

        self.storage
            .api
            .request(Method::DELETE, &url)
            .on_error(Error::Storage)
            .json(&body)?
            .execute_empty()
            .await
    }

    /// Get the public URL for a file
    pub fn get_public_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.storage.url, self.bucket_id, path)
    }
}
