//! Periodic cleanup of expired sessions.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::persistence::SessionPersistence;
use crate::store::SessionStore;

/// Handle to the background cleanup task.
///
/// The task ticks on a fixed interval, independent of request traffic. The
/// first tick fires immediately. Each pass runs on the blocking pool so a slow
/// backend never stalls request handlers, and passes never overlap because the
/// loop awaits one before waiting for the next tick.
pub struct CleanupTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl CleanupTask {
    /// Spawn the cleanup loop using the store's configured interval.
    pub fn spawn<P>(store: SessionStore<P>) -> Self
    where
        P: SessionPersistence + 'static,
    {
        let period = store.config().cleanup_interval;
        Self::spawn_with(store, period, CancellationToken::new())
    }

    /// Spawn the cleanup loop with an explicit period and cancellation token.
    pub fn spawn_with<P>(store: SessionStore<P>, period: Duration, cancel: CancellationToken) -> Self
    where
        P: SessionPersistence + 'static,
    {
        let period = if period.is_zero() {
            Duration::from_secs(1)
        } else {
            period
        };
        let handle = tokio::spawn(run(store, period, cancel.clone()));
        Self { cancel, handle }
    }

    /// Token that stops the loop when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the loop has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the loop and wait for the in-flight pass, if any, to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Session cleanup task did not shut down cleanly");
        }
    }
}

async fn run<P>(store: SessionStore<P>, period: Duration, cancel: CancellationToken)
where
    P: SessionPersistence + 'static,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(interval_secs = period.as_secs(), "Session cleanup task started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let store = store.clone();
                match tokio::task::spawn_blocking(move || store.cleanup_now()).await {
                    Ok(Ok(removed)) => debug!(removed, "Session cleanup pass finished"),
                    Ok(Err(e)) => warn!(error = %e, "Session cleanup pass failed"),
                    Err(e) => warn!(error = %e, "Session cleanup pass panicked"),
                }
            }
        }
    }

    info!("Session cleanup task stopped");
}
