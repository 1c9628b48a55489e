use crate::app::AppContext;
use crate::auth::User;
use crate::guard::check_is_admin;

/// Landing page. Only decides whether to point administrators at the dashboard.
pub struct HomeView {
    ctx: AppContext,
    show_admin_banner: bool,
}

impl HomeView {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            show_admin_banner: false,
        }
    }

    pub async fn load(&mut self, identity: Option<&User>) {
        self.show_admin_banner = match identity {
            Some(user) => check_is_admin(&self.ctx.client, &user.id).await,
            None => false,
        };
    }

    pub fn show_admin_banner(&self) -> bool {
        self.show_admin_banner
    }
}
