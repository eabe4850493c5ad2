//! Periodic full-sweep scheduler.
//!
//! On startup and then once per interval, enqueues one health-score
//! recomputation per active client. The trigger epoch (the sweep's
//! interval-aligned timestamp) is baked into each job's dedupe key, so
//! a scheduler restart mid-sweep re-enqueues nothing that already made
//! it in. Per-client jitter spreads the jobs across a short window so
//! a sweep does not land on the database as one spike.

use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use clientpulse_core::queue::{
    recompute_key, sweep_epoch, sweep_jitter, HealthScoreJob, HEALTH_SCORE_QUEUE,
};
use clientpulse_core::types::Timestamp;
use clientpulse_db::repositories::{ClientRepo, QueueRepo};
use clientpulse_db::DbPool;

/// Outcome of one sweep.
#[derive(Debug, Default)]
pub struct SweepStats {
    /// Jobs newly enqueued by this sweep.
    pub enqueued: u64,
    /// Jobs skipped because an earlier run of the same sweep already
    /// enqueued them.
    pub deduped: u64,
}

pub struct SweepScheduler {
    pool: DbPool,
    interval: Duration,
    jitter: Duration,
    max_attempts: i16,
}

impl SweepScheduler {
    pub fn new(pool: DbPool, interval: Duration, jitter: Duration, max_attempts: i16) -> Self {
        Self {
            pool,
            interval,
            jitter,
            max_attempts,
        }
    }

    /// Run sweeps until `cancel` fires. The first sweep happens
    /// immediately on startup; epoch-keyed dedupe makes that safe
    /// across restarts.
    pub async fn run(self, cancel: CancellationToken) {
        let mut tick = tokio::time::interval(self.interval);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tick.tick() => {}
            }

            match self.run_once(Utc::now()).await {
                Ok(stats) => {
                    tracing::info!(
                        enqueued = stats.enqueued,
                        deduped = stats.deduped,
                        "sweep finished"
                    );
                }
                Err(e) => {
                    // Leave the failed sweep to the next tick; its
                    // epoch key keeps a partial run resumable.
                    tracing::error!(error = %e, "sweep failed");
                }
            }
        }

        tracing::info!("sweep scheduler stopped");
    }

    /// Enqueue one recomputation per active client for the sweep
    /// containing `now`.
    pub async fn run_once(&self, now: Timestamp) -> anyhow::Result<SweepStats> {
        let epoch = sweep_epoch(now, self.interval);
        let client_ids = ClientRepo::list_active_ids(&self.pool).await?;
        tracing::info!(epoch = %epoch, clients = client_ids.len(), "sweep starting");

        let mut stats = SweepStats::default();
        for client_id in client_ids {
            let job = HealthScoreJob {
                client_id,
                trigger_epoch: epoch.clone(),
            };
            let payload = serde_json::to_value(&job)?;
            let key = recompute_key(client_id, &epoch);
            let delay = sweep_jitter(self.jitter);
            let inserted = QueueRepo::enqueue(
                &self.pool,
                HEALTH_SCORE_QUEUE,
                &payload,
                delay,
                Some(&key),
                self.max_attempts,
            )
            .await?;
            match inserted {
                Some(_) => stats.enqueued += 1,
                None => stats.deduped += 1,
            }
        }

        Ok(stats)
    }
}
