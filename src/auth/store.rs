//! Application-wide view of the signed-in identity

use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

use super::{Auth, AuthChangeEvent, AuthStateChange, Session, User};
use crate::app::AppContext;
use crate::error::Error;
use crate::routes::Route;
use crate::shutdown::Shutdown;
use crate::telemetry::{Monitor, TelemetryUser};
use crate::ui::{Navigator, Notifier, Toast};

#[derive(Debug)]
struct SessionState {
    loading: bool,
    session: Option<Session>,
}

/// Point-in-time copy of the session state
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub loading: bool,
    pub session: Option<Session>,
}

impl SessionSnapshot {
    /// A resolved snapshot with the given session
    pub fn resolved(session: Option<Session>) -> Self {
        Self {
            loading: false,
            session,
        }
    }

    pub fn identity(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn has_identity(&self) -> bool {
        self.session.is_some()
    }
}

/// Holds the current identity and mirrors auth transitions into the
/// application: telemetry user context, notifications and navigation.
///
/// Cloning is cheap; clones share state.
#[derive(Clone)]
pub struct SessionStore {
    auth: Auth,
    state: Arc<RwLock<SessionState>>,
    monitor: Monitor,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl SessionStore {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            auth: ctx.client.auth().clone(),
            state: Arc::new(RwLock::new(SessionState {
                loading: true,
                session: None,
            })),
            monitor: ctx.monitor.clone(),
            notifier: ctx.notifier.clone(),
            navigator: ctx.navigator.clone(),
        }
    }

    /// Load the existing session and clear the loading flag
    pub async fn initialize(&self) {
        let session = self.auth.get_session();
        let mut state = self.state.write().await;
        state.session = session;
        state.loading = false;
        log::debug!("session store initialized (signed in: {})", state.session.is_some());
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot {
            loading: state.loading,
            session: state.session.clone(),
        }
    }

    pub async fn identity(&self) -> Option<User> {
        self.state.read().await.session.as_ref().map(|s| s.user.clone())
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), Error> {
        match self.auth.sign_in(email, password).await {
            Ok(_) => Ok(()),
            Err(e) => {
                log::error!("Error signing in: {}", e);
                self.notifier.notify(Toast::error(e.user_message()));
                Err(e)
            }
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<(), Error> {
        match self.auth.sign_up(email, password, name).await {
            Ok(_) => {
                self.notifier.notify(Toast::success(
                    "Signup successful! Please check your email for verification.",
                ));
                Ok(())
            }
            Err(e) => {
                log::error!("Error signing up: {}", e);
                self.notifier.notify(Toast::error(e.user_message()));
                Err(e)
            }
        }
    }

    pub async fn sign_out(&self) -> Result<(), Error> {
        match self.auth.sign_out().await {
            Ok(()) => Ok(()),
            Err(e) => {
                log::error!("Error signing out: {}", e);
                self.notifier.notify(Toast::error(e.user_message()));
                Err(e)
            }
        }
    }

    /// Apply one auth transition
    pub async fn apply(&self, change: AuthStateChange) {
        log::info!("Auth event: {}", change.event.as_str());
        {
            let mut state = self.state.write().await;
            state.session = change.session.clone();
            state.loading = false;
        }

        match change.event {
            AuthChangeEvent::SignedIn => {
                let Some(session) = change.session else {
                    return;
                };
                self.monitor
                    .set_user(&TelemetryUser::from_user(&session.user))
                    .await;
                self.notifier.notify(Toast::success("Signed in successfully"));
                tokio::task::yield_now().await;
                self.navigator.navigate(Route::Home);
            }
            AuthChangeEvent::SignedOut => {
                self.monitor.set_user(&TelemetryUser::anonymous()).await;
                self.notifier.notify(Toast::info("Signed out"));
                tokio::task::yield_now().await;
                self.navigator.navigate(Route::Login);
            }
            AuthChangeEvent::TokenRefreshed => {}
        }
    }

    /// Apply auth transitions in the background until shutdown
    pub fn listen(&self, shutdown: Shutdown) -> JoinHandle<()> {
        let mut events = self.auth.on_auth_state_change();
        let store = self.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    received = events.recv() => match received {
                        Ok(change) => store.apply(change).await,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            log::warn!("session store missed {} auth events", skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            log::debug!("session listener stopped");
        })
    }
}
