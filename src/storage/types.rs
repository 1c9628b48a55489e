//! Types for storage operations

use serde::{Deserialize, Serialize};

/// A storage bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bucket {
    /// The bucket ID
    pub id: String,

    /// The bucket name
    pub name: String,

    /// Owner user ID
    #[serde(default)]
    pub owner: Option<String>,

    /// Whether the bucket is public
    #[serde(default)]
    pub public: Option<bool>,

    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Options for uploading a file
#[derive(Debug, Clone)]
pub struct FileOptions {
    /// Cache-Control max-age in seconds
    pub cache_control: String,

    /// MIME type of the file
    pub content_type: Option<String>,

    /// Overwrite an existing object at the same path
    pub upsert: bool,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            cache_control: "3600".to_string(),
            content_type: None,
            upsert: false,
        }
    }
}

impl FileOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the content type
    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    /// Set whether to overwrite an existing object
    pub fn with_upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }
}

/// Response to a successful upload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    /// `<bucket>/<path>` of the stored object
    #[serde(rename = "Key", default)]
    pub key: Option<String>,

    /// Object id
    #[serde(rename = "Id", default)]
    pub id: Option<String>,
}
