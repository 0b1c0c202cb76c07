use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::error::Chain;
use super::Registry;
use crate::dictionary::Dictionary;

impl<D: Dictionary + 'static> Registry<D> {
    /// Spawns a task calling [`Registry::save_all`] every `interval`.
    ///
    /// Cancellation is observed between saves only; a save in progress always
    /// finishes, and no final save happens on cancellation. Failures are
    /// logged and the loop keeps going.
    ///
    /// Returns `None` for a zero interval, for an interval too large to
    /// schedule, and when autosave was already started on this registry.
    ///
    /// Must be called from within a tokio runtime.
    pub fn autosave(
        self: &Arc<Self>,
        interval: Duration,
        token: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        if interval.is_zero() {
            return None;
        }

        let Some(start) = Instant::now().checked_add(interval) else {
            log::error!("autosave: interval {:?} is too large, autosave disabled", interval);
            return None;
        };

        if self.autosave_started.swap(true, Ordering::SeqCst) {
            log::warn!("autosave: already running");
            return None;
        }

        let registry = Arc::clone(self);

        Some(tokio::spawn(async move {
            let mut ticker = interval_at(start, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let registry = Arc::clone(&registry);
                        match tokio::task::spawn_blocking(move || registry.save_all()).await {
                            Ok(Ok(())) => log::debug!("autosave: done"),
                            Ok(Err(e)) => log::error!("autosave: {}", Chain(&e)),
                            Err(e) => log::error!("autosave: save task failed: {}", e),
                        }
                    }
                }
            }

            log::debug!("autosave: stopped");
        }))
    }
}
