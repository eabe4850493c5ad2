//! Worker process configuration.

use std::time::Duration;

use clientpulse_ai::SentimentConfig;

/// Configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Postgres connection string.
    pub database_url: String,
    /// Interval between full sweeps (default: 24h).
    pub sweep_interval: Duration,
    /// Per-client jitter window applied within a sweep (default: 60s).
    pub sweep_jitter: Duration,
    /// Queue poll interval when a queue is idle (default: 1s).
    pub poll_interval: Duration,
    /// Claim lease duration; an unacked job becomes claimable again
    /// after this long (default: 5m).
    pub lease: Duration,
    /// Delivery attempts before a job is dead-lettered (default: 3).
    pub max_attempts: i16,
    /// Concurrent consumers for the health-score queue (default: 4).
    pub health_workers: usize,
    /// Concurrent consumers for the sentiment queue (default: 2).
    pub sentiment_workers: usize,
    /// Concurrent consumers for the alerts queue (default: 1).
    pub alert_workers: usize,
    /// Classifier API settings.
    pub sentiment: SentimentConfig,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                                         |
    /// |-----------------------|-------------------------------------------------|
    /// | `DATABASE_URL`        | `postgresql://localhost:5432/clientpulse`       |
    /// | `SWEEP_INTERVAL_SECS` | `86400`                                         |
    /// | `SWEEP_JITTER_SECS`   | `60`                                            |
    /// | `POLL_INTERVAL_MS`    | `1000`                                          |
    /// | `LEASE_SECS`          | `300`                                           |
    /// | `MAX_ATTEMPTS`        | `3`                                             |
    /// | `HEALTH_WORKERS`      | `4`                                             |
    /// | `SENTIMENT_WORKERS`   | `2`                                             |
    /// | `ALERT_WORKERS`       | `1`                                             |
    ///
    /// The `AI_*` variables are documented on
    /// [`SentimentConfig::from_env`].
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost:5432/clientpulse".into());

        let sweep_interval_secs: u64 = std::env::var("SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "86400".into())
            .parse()
            .expect("SWEEP_INTERVAL_SECS must be a valid u64");

        let sweep_jitter_secs: u64 = std::env::var("SWEEP_JITTER_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("SWEEP_JITTER_SECS must be a valid u64");

        let poll_interval_ms: u64 = std::env::var("POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "1000".into())
            .parse()
            .expect("POLL_INTERVAL_MS must be a valid u64");

        let lease_secs: u64 = std::env::var("LEASE_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("LEASE_SECS must be a valid u64");

        let max_attempts: i16 = std::env::var("MAX_ATTEMPTS")
            .unwrap_or_else(|_| "3".into())
            .parse()
            .expect("MAX_ATTEMPTS must be a valid i16");

        let health_workers: usize = std::env::var("HEALTH_WORKERS")
            .unwrap_or_else(|_| "4".into())
            .parse()
            .expect("HEALTH_WORKERS must be a valid usize");

        let sentiment_workers: usize = std::env::var("SENTIMENT_WORKERS")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("SENTIMENT_WORKERS must be a valid usize");

        let alert_workers: usize = std::env::var("ALERT_WORKERS")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("ALERT_WORKERS must be a valid usize");

        Self {
            database_url,
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            sweep_jitter: Duration::from_secs(sweep_jitter_secs),
            poll_interval: Duration::from_millis(poll_interval_ms),
            lease: Duration::from_secs(lease_secs),
            max_attempts,
            health_workers,
            sentiment_workers,
            alert_workers,
            sentiment: SentimentConfig::from_env(),
        }
    }
}
