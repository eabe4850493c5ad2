//! Repository for the `queue_jobs` table: the durable work queue.
//!
//! Delivery is at-least-once. A claim takes a lease
//! (`lease_expires_at`); a job whose lease expires without an ack is
//! claimable again. `attempts` is incremented at claim time so crashed
//! workers consume attempts the same way explicit failures do. Uses
//! `SELECT FOR UPDATE SKIP LOCKED` so concurrent workers never
//! double-claim.

use std::time::Duration;

use sqlx::PgPool;

use clientpulse_core::types::DbId;

use crate::models::queue_job::QueueJob;
use crate::models::status::QueueJobStatus;

/// Column list for `queue_jobs` queries.
const COLUMNS: &str = "\
    id, queue, payload, status_id, attempts, max_attempts, dedupe_key, \
    run_at, lease_expires_at, last_error, created_at, updated_at";

/// Lease-based queue operations.
pub struct QueueRepo;

impl QueueRepo {
    /// Enqueue a job, optionally delayed and deduplicated.
    ///
    /// A `dedupe_key` already present in this queue makes the insert a
    /// no-op. Returns the new job ID, or `None` when deduplicated.
    pub async fn enqueue(
        pool: &PgPool,
        queue: &str,
        payload: &serde_json::Value,
        delay: Duration,
        dedupe_key: Option<&str>,
        max_attempts: i16,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO queue_jobs \
                 (queue, payload, status_id, max_attempts, dedupe_key, run_at) \
             VALUES ($1, $2, $3, $4, $5, NOW() + make_interval(secs => $6)) \
             ON CONFLICT (queue, dedupe_key) WHERE dedupe_key IS NOT NULL DO NOTHING \
             RETURNING id",
        )
        .bind(queue)
        .bind(payload)
        .bind(QueueJobStatus::Pending.id())
        .bind(max_attempts)
        .bind(dedupe_key)
        .bind(delay.as_secs_f64())
        .fetch_optional(pool)
        .await
    }

    /// Atomically claim the next runnable job in a queue and take a
    /// lease on it.
    ///
    /// Runnable means: due (`run_at` passed) and either pending, or
    /// running with an expired lease (redelivery). Jobs that have used
    /// all their attempts are left for [`Self::reap_expired`].
    pub async fn claim_next(
        pool: &PgPool,
        queue: &str,
        lease: Duration,
    ) -> Result<Option<QueueJob>, sqlx::Error> {
        let query = format!(
            "UPDATE queue_jobs \
             SET status_id = $2, attempts = attempts + 1, \
                 lease_expires_at = NOW() + make_interval(secs => $3), \
                 updated_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM queue_jobs \
                 WHERE queue = $1 \
                   AND run_at <= NOW() \
                   AND attempts < max_attempts \
                   AND (status_id = $4 \
                        OR (status_id = $2 AND lease_expires_at < NOW())) \
                 ORDER BY run_at ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QueueJob>(&query)
            .bind(queue)
            .bind(QueueJobStatus::Running.id())
            .bind(lease.as_secs_f64())
            .bind(QueueJobStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Acknowledge successful completion.
    pub async fn complete(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE queue_jobs \
             SET status_id = $2, lease_expires_at = NULL, last_error = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(QueueJobStatus::Completed.id())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Re-queue a transiently failed job for redelivery after a
    /// backoff delay.
    pub async fn retry_later(
        pool: &PgPool,
        id: DbId,
        error: &str,
        delay: Duration,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE queue_jobs \
             SET status_id = $2, lease_expires_at = NULL, last_error = $3, \
                 run_at = NOW() + make_interval(secs => $4), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(QueueJobStatus::Pending.id())
        .bind(error)
        .bind(delay.as_secs_f64())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Move a job to the dead-letter state, holding it for operator
    /// inspection. Terminal; nothing redelivers it.
    pub async fn dead_letter(pool: &PgPool, id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE queue_jobs \
             SET status_id = $2, lease_expires_at = NULL, last_error = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(QueueJobStatus::DeadLetter.id())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Dead-letter running jobs whose lease expired after their final
    /// attempt (a crashed worker spent the last delivery). Returns how
    /// many jobs were moved.
    pub async fn reap_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE queue_jobs \
             SET status_id = $1, lease_expires_at = NULL, \
                 last_error = 'lease expired after final attempt', updated_at = NOW() \
             WHERE status_id = $2 \
               AND lease_expires_at < NOW() \
               AND attempts >= max_attempts",
        )
        .bind(QueueJobStatus::DeadLetter.id())
        .bind(QueueJobStatus::Running.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Dead-lettered jobs for one queue, newest first.
    pub async fn list_dead_letter(
        pool: &PgPool,
        queue: &str,
        limit: i64,
    ) -> Result<Vec<QueueJob>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM queue_jobs \
             WHERE queue = $1 AND status_id = $2 \
             ORDER BY updated_at DESC \
             LIMIT $3"
        );
        sqlx::query_as::<_, QueueJob>(&query)
            .bind(queue)
            .bind(QueueJobStatus::DeadLetter.id())
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
