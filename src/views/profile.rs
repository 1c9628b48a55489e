use chrono::Utc;

use super::{list_state, ViewState};
use crate::app::AppContext;
use crate::auth::User;
use crate::error::Error;
use crate::guard::check_is_admin;
use crate::items::LostItem;
use crate::profiles::{Profile, ProfileUpdate};
use crate::ui::Toast;

/// The signed-in identity's profile and posted items
pub struct ProfileView {
    ctx: AppContext,
    user_id: Option<String>,
    profile: Option<Profile>,
    items: Vec<LostItem>,
    loading: bool,
    show_admin_banner: bool,
}

impl ProfileView {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            user_id: None,
            profile: None,
            items: Vec::new(),
            loading: true,
            show_admin_banner: false,
        }
    }

    pub async fn load(&mut self, identity: &User) -> Result<(), Error> {
        self.user_id = Some(identity.id.clone());
        self.loading = true;
        let result = self.fetch(identity).await;
        self.loading = false;

        match result {
            Ok((profile, items)) => {
                self.profile = profile;
                self.items = items;
            }
            Err(e) => {
                log::error!("Error loading profile data: {}", e);
                self.ctx.notifier.notify(Toast::error(e.user_message()));
                return Err(e);
            }
        }

        self.show_admin_banner = check_is_admin(&self.ctx.client, &identity.id).await;
        Ok(())
    }

    async fn fetch(&self, identity: &User) -> Result<(Option<Profile>, Vec<LostItem>), Error> {
        let profile = self.ctx.client.profiles().get(&identity.id).await?;
        let items = self.ctx.client.items().list_by_owner(&identity.id).await?;
        Ok((profile, items))
    }

    /// Save name and phone for the loaded identity
    pub async fn update(&mut self, full_name: &str, phone: &str) -> Result<(), Error> {
        let Some(user_id) = self.user_id.clone() else {
            return Err(Error::NotSignedIn);
        };

        let update = ProfileUpdate {
            id: user_id.clone(),
            full_name: full_name.to_string(),
            phone: phone.to_string(),
            updated_at: Utc::now(),
        };

        match self.ctx.client.profiles().upsert(&update).await {
            Ok(()) => {
                let avatar_url = self.profile.as_ref().and_then(|p| p.avatar_url.clone());
                self.profile = Some(Profile {
                    id: user_id,
                    full_name: Some(update.full_name),
                    phone: Some(update.phone),
                    avatar_url,
                });
                self.ctx.notifier.notify(Toast::success("Profile updated successfully"));
                Ok(())
            }
            Err(e) => {
                log::error!("Error updating profile: {}", e);
                self.ctx.notifier.notify(Toast::error(e.user_message()));
                Err(e)
            }
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn show_admin_banner(&self) -> bool {
        self.show_admin_banner
    }

    pub fn items(&self) -> ViewState<Vec<LostItem>> {
        list_state(self.loading, &self.items, "You haven't posted any lost items yet")
    }
}
