//! Deferred telemetry initialization

use tokio::task::JoinHandle;

use super::Monitor;
use crate::config::TelemetryConfig;
use crate::shutdown::Shutdown;

/// Initialize telemetry in the background after `config.init_delay`.
///
/// The task never blocks the caller. It resolves to whether the vendor was
/// initialized; a triggered shutdown before the delay elapses skips init.
pub fn spawn_bootstrap(
    monitor: Monitor,
    config: TelemetryConfig,
    shutdown: Shutdown,
) -> JoinHandle<bool> {
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown.cancelled() => {
                log::debug!("telemetry bootstrap cancelled before init");
                return false;
            }
            _ = tokio::time::sleep(config.init_delay) => {}
        }

        if !config.enabled {
            log::debug!("telemetry disabled, skipping vendor init");
            return false;
        }

        monitor.init(&config).await
    })
}
