//! Worker configuration.

use std::time::Duration;

/// Configuration for the dispatcher, reaper, and job service.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum jobs processed concurrently
    pub max_concurrent_jobs: usize,
    /// Poll interval while all slots are busy
    pub busy_poll: Duration,
    /// Poll interval while the queue is empty
    pub idle_poll: Duration,
    /// Hard deadline per handler invocation
    pub job_timeout: Duration,
    /// How long shutdown waits for in-flight jobs to drain
    pub shutdown_timeout: Duration,
    /// How often the reaper sweeps
    pub reaper_interval: Duration,
    /// Terminal jobs older than this are deleted
    pub retention: Duration,
    /// Retry budget assigned to newly submitted jobs
    pub default_max_retries: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 3,
            busy_poll: Duration::from_secs(5),
            idle_poll: Duration::from_secs(10),
            job_timeout: Duration::from_secs(3600), // 1 hour
            shutdown_timeout: Duration::from_secs(30),
            reaper_interval: Duration::from_secs(3600),
            retention: Duration::from_secs(7 * 24 * 3600), // 7 days
            default_max_retries: 3,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_concurrent_jobs: env_parse("REELKIT_MAX_JOBS", defaults.max_concurrent_jobs),
            busy_poll: env_secs("REELKIT_BUSY_POLL_SECS", defaults.busy_poll),
            idle_poll: env_secs("REELKIT_IDLE_POLL_SECS", defaults.idle_poll),
            job_timeout: env_secs("REELKIT_JOB_TIMEOUT_SECS", defaults.job_timeout),
            shutdown_timeout: env_secs("REELKIT_SHUTDOWN_TIMEOUT_SECS", defaults.shutdown_timeout),
            reaper_interval: env_secs("REELKIT_REAPER_INTERVAL_SECS", defaults.reaper_interval),
            retention: env_secs("REELKIT_RETENTION_SECS", defaults.retention),
            default_max_retries: env_parse("REELKIT_MAX_RETRIES", defaults.default_max_retries),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
