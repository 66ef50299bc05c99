//! Background collection of idle sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::SessionStore;

/// How often the registry is swept.
pub const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(1);

/// How long a session may go without access before it is evicted.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Collector timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcConfig {
    /// Time between sweeps.
    pub interval: Duration,
    /// Idle time after which a session is evicted.
    pub idle_timeout: Duration,
}

impl GcConfig {
    pub fn new(interval: Duration, idle_timeout: Duration) -> Self {
        Self {
            interval,
            idle_timeout,
        }
    }
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_GC_INTERVAL,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

/// Spawn the collector task.
///
/// The task sweeps `store` every `config.interval` until `cancel` fires.
/// A failed sweep is logged and the loop carries on.
pub fn spawn_collector<C>(
    store: Arc<SessionStore<C>>,
    config: GcConfig,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    C: Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = time::interval(config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        tracing::debug!(
            interval_ms = config.interval.as_millis() as u64,
            idle_timeout_secs = config.idle_timeout.as_secs(),
            "Session collector started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let now = time::Instant::now().into_std();
                    match store.sweep(now, config.idle_timeout) {
                        Ok(evicted) if !evicted.is_empty() => {
                            tracing::debug!(count = evicted.len(), remaining = store.count(), "Sweep finished");
                        }
                        Ok(_) => {}
                        Err(e) => tracing::error!("Session sweep failed: {}", e),
                    }
                }
            }
        }

        tracing::debug!("Session collector stopped");
    })
}
