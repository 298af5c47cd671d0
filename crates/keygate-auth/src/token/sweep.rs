//! Periodic expired-token sweep with an explicit shutdown signal.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::TokenService;

/// Drives [`TokenService::sweep_expired`] on a fixed interval.
///
/// Active eviction bounds memory growth from tokens nobody ever
/// re-validates; the lazy check on validation alone would never reclaim
/// them.
pub struct SweepTask {
    /// The service whose expired records are evicted.
    service: Arc<dyn TokenService>,
    /// Tick interval.
    interval: Duration,
}

impl std::fmt::Debug for SweepTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepTask")
            .field("interval", &self.interval)
            .finish()
    }
}

impl SweepTask {
    /// Creates a sweep task over the given service.
    pub fn new(service: Arc<dyn TokenService>, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// Spawns the sweep loop — runs until the handle signals shutdown.
    pub fn spawn(self) -> SweepHandle {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; consume it so the loop
            // waits a full interval before the first pass.
            ticker.tick().await;

            info!(interval_secs = self.interval.as_secs(), "Token sweep started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let now = Utc::now().timestamp();
                        let evicted = self.service.sweep_expired(now);
                        if evicted > 0 {
                            info!(evicted, "Token sweep evicted expired tokens");
                        } else {
                            debug!("Token sweep found nothing to evict");
                        }
                    }
                    changed = cancel_rx.changed() => {
                        // A closed channel means the handle is gone; nobody
                        // can signal shutdown anymore, so stop the loop.
                        if changed.is_err() || *cancel_rx.borrow() {
                            info!("Token sweep received shutdown signal");
                            break;
                        }
                    }
                }
            }
        });

        SweepHandle {
            cancel: cancel_tx,
            handle,
        }
    }
}

/// Handle for stopping a running sweep deterministically during teardown.
#[derive(Debug)]
pub struct SweepHandle {
    /// Shutdown signal sender.
    cancel: watch::Sender<bool>,
    /// The spawned sweep loop.
    handle: JoinHandle<()>,
}

impl SweepHandle {
    /// Signals shutdown and waits for the sweep loop to exit.
    pub async fn shutdown(self) {
        let _ = self.cancel.send(true);
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;

    use crate::token::OpaqueTokenService;

    use super::*;

    #[tokio::test]
    async fn test_sweep_evicts_then_shuts_down() {
        let service = Arc::new(OpaqueTokenService::new(ChronoDuration::seconds(-5)));
        service.generate("alice").await.unwrap();
        service.generate("bob").await.unwrap();
        assert_eq!(service.active_tokens(), 2);

        let sweep = SweepTask::new(
            service.clone() as Arc<dyn TokenService>,
            Duration::from_millis(20),
        )
        .spawn();

        tokio::time::sleep(Duration::from_millis(100)).await;
        sweep.shutdown().await;

        assert_eq!(service.active_tokens(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_before_first_tick() {
        let service = Arc::new(OpaqueTokenService::new(ChronoDuration::hours(2)));
        let sweep = SweepTask::new(
            service.clone() as Arc<dyn TokenService>,
            Duration::from_secs(600),
        )
        .spawn();

        // Must return promptly even though no tick ever fires.
        sweep.shutdown().await;
    }

    #[tokio::test]
    async fn test_loop_exits_when_sender_is_dropped() {
        let service = Arc::new(OpaqueTokenService::new(ChronoDuration::hours(2)));
        let SweepHandle { cancel, handle } = SweepTask::new(
            service.clone() as Arc<dyn TokenService>,
            Duration::from_secs(600),
        )
        .spawn();

        // Dropping the sender without an explicit shutdown (as when the
        // handle itself is dropped) must still end the loop, well before
        // any tick fires.
        drop(cancel);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
