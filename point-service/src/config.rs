//! Configuration for the point service

use std::env;
use std::time::Duration;

/// Configuration for the point service
#[derive(Debug, Clone)]
pub struct PointServiceConfig {
    /// Simulated latency of every store call, in milliseconds
    pub store_latency_ms: u64,
    /// Upper bound on waiting for an account lock, unbounded when `None`
    pub lock_timeout_ms: Option<u64>,
    /// Log every appended history record
    pub history_logging: bool,
}

impl Default for PointServiceConfig {
    fn default() -> Self {
        Self {
            store_latency_ms: env::var("STORE_LATENCY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            lock_timeout_ms: env::var("LOCK_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok()),
            history_logging: env::var("HISTORY_LOGGING")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

impl PointServiceConfig {
    /// Create a new configuration using environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create a new configuration with custom values
    pub fn new(store_latency_ms: u64, lock_timeout_ms: Option<u64>, history_logging: bool) -> Self {
        Self {
            store_latency_ms,
            lock_timeout_ms,
            history_logging,
        }
    }

    /// Store latency as a duration
    pub fn store_latency(&self) -> Duration {
        Duration::from_millis(self.store_latency_ms)
    }

    /// Lock timeout as a duration
    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }
}
