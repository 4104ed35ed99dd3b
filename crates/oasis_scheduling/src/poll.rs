// --- File: crates/oasis_scheduling/src/poll.rs ---
//! A cancellable refresh ticker.
//!
//! Cross-client convergence is poll-and-diff: something re-reads the booking
//! feed every few seconds. The ticker is owned and stopped by whichever
//! component started it; there is no free-running module-level timer.

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

pub struct RefreshTicker {
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshTicker {
    /// Starts a ticker invoking `on_tick` every `period` until stopped.
    pub fn start<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick of tokio's interval fires immediately; skip it
            // so `on_tick` runs one full period after start.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => on_tick(),
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            debug!("refresh ticker stopped");
                            break;
                        }
                    }
                }
            }
        });
        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Stops the ticker and waits for the task to finish.
    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for RefreshTicker {
    fn drop(&mut self) {
        // Owner went away without an explicit stop; don't leave the task running.
        if let Some(handle) = self.handle.take() {
            let _ = self.shutdown.send(true);
            handle.abort();
        }
    }
}
