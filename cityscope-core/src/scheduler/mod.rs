//! Owned periodic tasks.
//!
//! A [`PeriodicTask`] runs a job once after an initial delay and then on every
//! period tick until it is stopped. The handle owns the tokio task: dropping
//! it aborts the task, and [`PeriodicTask::stop`] waits for it to exit.

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Handle to a running periodic job.
pub struct PeriodicTask {
    name: String,
    stop_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Spawn `job` on the current tokio runtime.
    ///
    /// The job receives the zero-based run number. Ticks that fall due while a
    /// run is still in progress are delayed rather than fired back to back.
    /// Stopping interrupts a run at its next suspension point.
    ///
    /// # Panics
    /// Panics if `period` is zero or if called outside a tokio runtime.
    pub fn spawn<F, Fut>(
        name: impl Into<String>,
        initial_delay: Duration,
        period: Duration,
        mut job: F,
    ) -> Self
    where
        F: FnMut(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task_name = name.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + initial_delay, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut run: u64 = 0;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = stop_rx.changed() => break,
                }

                debug!(task = %task_name, run, "Running periodic task");
                tokio::select! {
                    _ = job(run) => {}
                    _ = stop_rx.changed() => {
                        warn!(task = %task_name, run, "Periodic task stopped mid-run");
                        break;
                    }
                }
                run += 1;
            }

            debug!(task = %task_name, "Periodic task exited");
        });

        info!(
            task = %name,
            delay_secs = initial_delay.as_secs(),
            period_secs = period.as_secs(),
            "Periodic task scheduled"
        );

        Self { name, stop_tx, handle: Some(handle) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the task is still scheduled.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the task and wait for it to exit.
    pub async fn stop(mut self) {
        let _ = self.stop_tx.send(true);
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(task = %self.name, error = %e, "Periodic task ended abnormally");
            }
        }
        info!(task = %self.name, "Periodic task stopped");
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
