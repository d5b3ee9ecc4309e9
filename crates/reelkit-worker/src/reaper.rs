//! Periodic cleanup of old terminal jobs.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use metrics::counter;
use tokio::time::interval;
use tracing::{error, info};

use reelkit_store::JobStore;

use crate::config::WorkerConfig;

/// Deletes terminal jobs past the retention window on its own timer,
/// independent of dispatcher activity. Sweep failures are logged, never
/// fatal.
pub struct Reaper {
    store: Arc<dyn JobStore>,
    sweep_interval: Duration,
    retention: Duration,
}

impl Reaper {
    pub fn new(config: &WorkerConfig, store: Arc<dyn JobStore>) -> Self {
        Self {
            store,
            sweep_interval: config.reaper_interval,
            retention: config.retention,
        }
    }

    /// Run the sweep loop indefinitely. Spawn as a background task; abort
    /// the task to stop it.
    pub async fn run(&self) {
        info!(
            interval = ?self.sweep_interval,
            retention = ?self.retention,
            "Starting reaper"
        );

        let mut ticker = interval(self.sweep_interval);
        loop {
            ticker.tick().await;
            match self.sweep_once().await {
                Ok(0) => {}
                Ok(deleted) => info!("Reaped {} terminal jobs", deleted),
                Err(e) => error!("Reaper sweep failed: {:#}", e),
            }
        }
    }

    /// One sweep: delete terminal jobs older than the retention window.
    pub async fn sweep_once(&self) -> anyhow::Result<usize> {
        let deleted = self
            .store
            .delete_terminal_older_than(self.retention)
            .await
            .context("delete terminal jobs")?;
        if deleted > 0 {
            counter!("reelkit_jobs_reaped_total").increment(deleted as u64);
        }
        Ok(deleted)
    }
}
