//! Application wiring
//!
//! [`AppContext`] carries the capabilities every page needs. [`App`] builds
//! one from configuration and owns the background tasks bound to the
//! application lifetime.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::auth::SessionStore;
use crate::config::Config;
use crate::setup::initialize_system;
use crate::shutdown::Shutdown;
use crate::telemetry::{spawn_bootstrap, Monitor};
use crate::ui::{Navigator, Notifier};
use crate::Findora;

/// Capabilities passed explicitly to the session store and the views
#[derive(Clone)]
pub struct AppContext {
    pub client: Findora,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
    pub monitor: Monitor,
}

impl AppContext {
    pub fn new(
        client: Findora,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        monitor: Monitor,
    ) -> Self {
        Self {
            client,
            notifier,
            navigator,
            monitor,
        }
    }
}

/// A running application
pub struct App {
    pub ctx: AppContext,
    pub session: SessionStore,
    pub config: Config,
    shutdown: Shutdown,
    telemetry: Option<JoinHandle<bool>>,
    listener: Option<JoinHandle<()>>,
    startup: Option<JoinHandle<()>>,
}

impl App {
    /// Build the client and session store, then start the telemetry
    /// bootstrap, the auth listener and the backend startup checks in the
    /// background.
    pub async fn start(
        config: Config,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let monitor = Monitor::from_config(&config.telemetry);
        Self::start_with_monitor(config, notifier, navigator, monitor).await
    }

    /// Like [`App::start`] with an explicit telemetry monitor
    pub async fn start_with_monitor(
        config: Config,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        monitor: Monitor,
    ) -> Self {
        let client = Findora::from_config(&config).with_monitor(monitor.clone());
        let ctx = AppContext::new(client, notifier, navigator, monitor.clone());

        let session = SessionStore::new(&ctx);
        session.initialize().await;

        let shutdown = Shutdown::new();
        let telemetry = spawn_bootstrap(monitor, config.telemetry.clone(), shutdown.clone());
        let listener = session.listen(shutdown.clone());
        let startup = spawn_startup_checks(&ctx, shutdown.clone());

        log::debug!("application started against {}", config.supabase_url);

        Self {
            ctx,
            session,
            config,
            shutdown,
            telemetry: Some(telemetry),
            listener: Some(listener),
            startup: Some(startup),
        }
    }

    pub fn client(&self) -> &Findora {
        &self.ctx.client
    }

    /// Stop background tasks and wait for them to finish.
    ///
    /// Returns whether telemetry was initialized.
    pub async fn shutdown(mut self) -> bool {
        self.shutdown.trigger();

        if let Some(startup) = self.startup.take() {
            if let Err(e) = startup.await {
                log::warn!("startup checks ended abnormally: {}", e);
            }
        }

        if let Some(listener) = self.listener.take() {
            if let Err(e) = listener.await {
                log::warn!("session listener ended abnormally: {}", e);
            }
        }

        match self.telemetry.take() {
            Some(handle) => handle.await.unwrap_or_else(|e| {
                log::warn!("telemetry bootstrap ended abnormally: {}", e);
                false
            }),
            None => false,
        }
    }
}

/// Run the bucket and table checks without blocking startup
fn spawn_startup_checks(ctx: &AppContext, shutdown: Shutdown) -> JoinHandle<()> {
    let client = ctx.client.clone();
    let notifier = ctx.notifier.clone();

    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown.cancelled() => {
                log::debug!("startup checks cancelled");
            }
            _ = initialize_system(&client, notifier.as_ref()) => {}
        }
    })
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}
