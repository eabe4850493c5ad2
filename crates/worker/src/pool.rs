//! Generic queue consumer pool.
//!
//! A [`WorkerPool`] runs N identical consumer loops against one queue.
//! Each loop polls on an interval, drains every runnable job it can
//! claim, and goes back to sleep. Failure routing lives here, not in
//! handlers: a transient error with attempts remaining is re-queued
//! with exponential backoff, anything else is dead-lettered.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use clientpulse_core::retry::{delay_for_attempt, BackoffConfig};
use clientpulse_core::CoreError;
use clientpulse_db::models::queue_job::QueueJob;
use clientpulse_db::repositories::QueueRepo;
use clientpulse_db::DbPool;

/// One queue's processing logic.
///
/// Handlers return a JSON result on success (logged, not stored) and
/// a [`CoreError`] on failure; the pool decides retry vs dead-letter
/// from the error class.
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// The queue this handler consumes.
    fn queue(&self) -> &'static str;

    /// Process one claimed job.
    async fn handle(&self, pool: &DbPool, job: &QueueJob) -> Result<serde_json::Value, CoreError>;
}

/// A fixed-size pool of consumer loops for one queue.
pub struct WorkerPool {
    pool: DbPool,
    handler: Arc<dyn JobHandler>,
    workers: usize,
    poll_interval: Duration,
    lease: Duration,
    backoff: BackoffConfig,
}

impl WorkerPool {
    pub fn new(
        pool: DbPool,
        handler: Arc<dyn JobHandler>,
        workers: usize,
        poll_interval: Duration,
        lease: Duration,
    ) -> Self {
        Self {
            pool,
            handler,
            workers,
            poll_interval,
            lease,
            backoff: BackoffConfig::default(),
        }
    }

    /// Spawn the consumer loops. Each loop runs until `cancel` fires,
    /// finishing its in-flight job first.
    pub fn spawn(self, cancel: CancellationToken) -> Vec<JoinHandle<()>> {
        (0..self.workers)
            .map(|worker_idx| {
                let pool = self.pool.clone();
                let handler = Arc::clone(&self.handler);
                let poll_interval = self.poll_interval;
                let lease = self.lease;
                let backoff = self.backoff.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    consumer_loop(pool, handler, poll_interval, lease, backoff, cancel, worker_idx)
                        .await;
                })
            })
            .collect()
    }
}

async fn consumer_loop(
    pool: DbPool,
    handler: Arc<dyn JobHandler>,
    poll_interval: Duration,
    lease: Duration,
    backoff: BackoffConfig,
    cancel: CancellationToken,
    worker_idx: usize,
) {
    let queue = handler.queue();
    tracing::info!(queue, worker_idx, "consumer started");

    let mut tick = tokio::time::interval(poll_interval);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tick.tick() => {}
        }

        // Drain: keep claiming until the queue is empty or shutdown.
        while !cancel.is_cancelled() {
            match QueueRepo::claim_next(&pool, queue, lease).await {
                Ok(Some(job)) => {
                    process_job(&pool, handler.as_ref(), &backoff, &job).await;
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(queue, worker_idx, error = %e, "claim failed");
                    break;
                }
            }
        }
    }

    tracing::info!(queue, worker_idx, "consumer stopped");
}

async fn process_job(
    pool: &DbPool,
    handler: &dyn JobHandler,
    backoff: &BackoffConfig,
    job: &QueueJob,
) {
    let queue = handler.queue();
    match handler.handle(pool, job).await {
        Ok(result) => {
            if let Err(e) = QueueRepo::complete(pool, job.id).await {
                // The lease will expire and the job will be
                // redelivered; handlers are idempotent, so this is
                // only noise.
                tracing::warn!(queue, job_id = job.id, error = %e, "ack failed");
                return;
            }
            tracing::info!(
                queue,
                job_id = job.id,
                attempt = job.attempts,
                result = %result,
                "job completed"
            );
        }
        Err(e) => {
            // attempts was incremented at claim, so it is the number
            // of the delivery that just failed.
            let retryable = e.is_transient() && job.attempts < job.max_attempts;
            let route = if retryable {
                let delay = delay_for_attempt(job.attempts as u32, backoff);
                tracing::warn!(
                    queue,
                    job_id = job.id,
                    attempt = job.attempts,
                    max_attempts = job.max_attempts,
                    delay_secs = delay.as_secs(),
                    error = %e,
                    "job failed, retrying"
                );
                QueueRepo::retry_later(pool, job.id, &e.to_string(), delay).await
            } else {
                tracing::error!(
                    queue,
                    job_id = job.id,
                    attempt = job.attempts,
                    error = %e,
                    "job failed terminally, dead-lettering"
                );
                QueueRepo::dead_letter(pool, job.id, &e.to_string()).await
            };
            if let Err(e) = route {
                tracing::warn!(queue, job_id = job.id, error = %e, "failure routing failed");
            }
        }
    }
}
