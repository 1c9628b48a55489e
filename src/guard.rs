//! Route guards
//!
//! Identity-guarded routes only look at the session snapshot. Admin-guarded
//! routes additionally ask the backend's `is_admin` predicate, once per
//! [`AdminGate`]. Create a new gate for every page visit; results are never
//! carried across navigations. Any failure of the predicate counts as "not
//! an administrator".

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::auth::SessionSnapshot;
use crate::error::Error;
use crate::routes::{Access, Route};
use crate::ui::{Notifier, Toast};
use crate::Findora;

/// What a guarded page should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Show a placeholder; the decision is not made yet
    Pending,
    /// Send the user elsewhere
    Redirect(Route),
    /// Render the protected content
    Allow,
}

/// Remote administrator predicate
#[async_trait]
pub trait AdminCheck: Send + Sync {
    async fn is_admin(&self, user_id: &str) -> Result<bool, Error>;
}

#[async_trait]
impl AdminCheck for Findora {
    async fn is_admin(&self, user_id: &str) -> Result<bool, Error> {
        if user_id.is_empty() {
            return Ok(false);
        }

        let result: Option<bool> = self
            .rpc("is_admin", json!({ "user_id": user_id }))
            .execute()
            .await?;
        Ok(result.unwrap_or(false))
    }
}

/// Ask the predicate, treating every error as a negative answer
pub async fn check_is_admin<C: AdminCheck + ?Sized>(checker: &C, user_id: &str) -> bool {
    match checker.is_admin(user_id).await {
        Ok(is_admin) => is_admin,
        Err(e) => {
            log::error!("Error checking admin status: {}", e);
            false
        }
    }
}

/// Guard for routes that need a signed-in identity
pub fn require_identity(snapshot: &SessionSnapshot) -> GuardOutcome {
    if snapshot.loading {
        GuardOutcome::Pending
    } else if !snapshot.has_identity() {
        GuardOutcome::Redirect(Route::Login)
    } else {
        GuardOutcome::Allow
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminStatus {
    Unchecked,
    Granted,
    Denied,
}

/// Guard for routes that need an administrator
pub struct AdminGate<C: AdminCheck + ?Sized> {
    checker: Arc<C>,
    notifier: Arc<dyn Notifier>,
    status: AdminStatus,
}

impl<C: AdminCheck + ?Sized> AdminGate<C> {
    pub fn new(checker: Arc<C>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            checker,
            notifier,
            status: AdminStatus::Unchecked,
        }
    }

    pub fn status(&self) -> AdminStatus {
        self.status
    }

    /// The decision for the current state, without issuing the check
    pub fn outcome(&self, snapshot: &SessionSnapshot) -> GuardOutcome {
        if snapshot.loading {
            return GuardOutcome::Pending;
        }
        if !snapshot.has_identity() {
            return GuardOutcome::Redirect(Route::Login);
        }
        match self.status {
            AdminStatus::Unchecked => GuardOutcome::Pending,
            AdminStatus::Granted => GuardOutcome::Allow,
            AdminStatus::Denied => GuardOutcome::Redirect(Route::Home),
        }
    }

    /// Issue the predicate check once the identity has resolved.
    ///
    /// The check runs at most once per gate.
    pub async fn verify(&mut self, snapshot: &SessionSnapshot) -> GuardOutcome {
        if snapshot.loading {
            return GuardOutcome::Pending;
        }
        let Some(user) = snapshot.identity() else {
            return GuardOutcome::Redirect(Route::Login);
        };

        if self.status == AdminStatus::Unchecked {
            if check_is_admin(self.checker.as_ref(), &user.id).await {
                self.status = AdminStatus::Granted;
            } else {
                log::warn!("admin access denied for {}", user.id);
                self.status = AdminStatus::Denied;
                self.notifier
                    .notify(Toast::error("You don't have permission to access this page"));
            }
        }

        self.outcome(snapshot)
    }
}

/// Decide whether `route` may be shown for the session
pub async fn authorize<C: AdminCheck + ?Sized>(
    route: Route,
    snapshot: &SessionSnapshot,
    checker: Arc<C>,
    notifier: Arc<dyn Notifier>,
) -> GuardOutcome {
    match route.access() {
        Access::Public => GuardOutcome::Allow,
        Access::SignedIn => require_identity(snapshot),
        Access::Admin => AdminGate::new(checker, notifier).verify(snapshot).await,
    }
}
