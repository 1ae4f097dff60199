//! Forecast Cleanup Task
//!
//! Background task that periodically reclaims expired forecasts.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::service::WeatherCacheService;

/// Spawns a background task that periodically cleans up expired forecasts.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between cleanup runs. A store failure is logged and the next run is
/// attempted on schedule.
///
/// # Arguments
/// * `service` - shared forecast cache service
/// * `cleanup_interval_secs` - Interval in seconds between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cleanup_handle = spawn_cleanup_task(state.service.clone(), 3600);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(
    service: Arc<WeatherCacheService>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting forecast cleanup task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            // The service logs the removal count itself
            if let Err(err) = service.cleanup_old_forecasts().await {
                error!("Forecast cleanup failed: {}", err);
            }
        }
    })
}
