use serde_json::json;
use std::path::Path;
use uuid::Uuid;

use crate::app::AppContext;
use crate::auth::User;
use crate::error::Error;
use crate::items::{LostItem, NewLostItem, LOST_ITEMS_BUCKET};
use crate::routes::Route;
use crate::setup::test_storage_upload;
use crate::storage::FileOptions;
use crate::ui::Toast;

/// An image picked by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    /// Extension of the original file name, `bin` when it has none
    pub fn extension(&self) -> &str {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .unwrap_or("bin")
    }
}

/// The lost item form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub name: String,
    pub phone: String,
    pub place_found: String,
    pub location_to_collect: String,
    pub image: Option<ImageFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPermission {
    Checking,
    Granted,
    Denied,
}

/// Registering a found item
pub struct UploadView {
    ctx: AppContext,
    permission: UploadPermission,
    submitting: bool,
}

impl UploadView {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            permission: UploadPermission::Checking,
            submitting: false,
        }
    }

    pub fn permission(&self) -> UploadPermission {
        self.permission
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Probe storage write access for the identity.
    ///
    /// Without an identity there is nothing to probe and the view stays
    /// usable; `submit` will send the user to the login page.
    pub async fn check_permission(&mut self, identity: Option<&User>) -> UploadPermission {
        self.permission = match identity {
            None => UploadPermission::Granted,
            Some(user) => {
                self.probe(
                    user,
                    Toast::warning(
                        "You don't have permission to upload files. Please try refreshing the page or contact support.",
                    ),
                )
                .await
            }
        };
        self.permission
    }

    /// Run the probe again after a denial
    pub async fn retry_permission(&mut self, identity: &User) -> UploadPermission {
        self.permission = UploadPermission::Checking;
        self.permission = self
            .probe(
                identity,
                Toast::error("Still having permission issues. Please try logging out and back in."),
            )
            .await;
        self.permission
    }

    async fn probe(&self, user: &User, denied: Toast) -> UploadPermission {
        if test_storage_upload(&self.ctx.client, &user.id).await {
            UploadPermission::Granted
        } else {
            self.ctx.notifier.notify(denied);
            UploadPermission::Denied
        }
    }

    /// Upload the image and register the item.
    ///
    /// Resolves to the stored row when the backend returned one.
    pub async fn submit(&mut self, identity: Option<&User>, form: &UploadForm) -> Result<Option<LostItem>, Error> {
        let Some(user) = identity else {
            self.ctx
                .notifier
                .notify(Toast::error("You must be logged in to upload an item"));
            self.ctx.navigator.navigate(Route::Login);
            return Err(Error::NotSignedIn);
        };

        let Some(image) = &form.image else {
            self.ctx
                .notifier
                .notify(Toast::error("Please upload an image of the item"));
            return Err(Error::validation("Please upload an image of the item"));
        };

        self.submitting = true;
        let result = self.store(user, form, image).await;
        self.submitting = false;

        match result {
            Ok(item) => {
                self.ctx.notifier.notify(Toast::success("Item uploaded successfully!"));
                self.ctx.monitor.track(
                    "item_uploaded",
                    json!({ "item_id": item.as_ref().map(|i| i.id.as_str()), "user_id": user.id }),
                );
                self.ctx.navigator.navigate(Route::Search);
                Ok(item)
            }
            Err(e) => {
                log::error!("Error uploading item: {}", e);
                self.ctx.notifier.notify(Toast::error(e.user_message()));
                self.ctx.monitor.track_error(
                    &e.to_string(),
                    "upload",
                    json!({ "user_id": user.id }),
                );
                Err(e)
            }
        }
    }

    async fn store(&self, user: &User, form: &UploadForm, image: &ImageFile) -> Result<Option<LostItem>, Error> {
        let object_path = format!("{}/{}.{}", user.id, Uuid::new_v4(), image.extension());

        let storage = self.ctx.client.storage();
        let bucket = storage.from(LOST_ITEMS_BUCKET);

        let mut options = FileOptions::new();
        if let Some(content_type) = &image.content_type {
            options = options.with_content_type(content_type);
        }
        bucket.upload(&object_path, image.bytes.clone(), options).await?;
        log::debug!("uploaded item image to {}", object_path);

        let item = NewLostItem {
            name: form.name.clone(),
            phone: form.phone.clone(),
            place_found: form.place_found.clone(),
            location_to_collect: form.location_to_collect.clone(),
            image_url: Some(bucket.get_public_url(&object_path)),
            user_id: Some(user.id.clone()),
        };

        self.ctx.client.items().insert(&item).await
    }
}
