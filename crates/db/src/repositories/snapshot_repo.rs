//! Repository for the append-only `score_snapshots` table.

use clientpulse_core::health::HealthReport;
use clientpulse_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::snapshot::ScoreSnapshot;

/// Column list for `score_snapshots` queries.
const COLUMNS: &str = "\
    id, client_id, score, risk_level, \
    communication_score, sentiment_score, engagement_score, feedback_score, tenure_score, \
    idempotency_key, computed_at";

/// Append and history reads for score snapshots.
pub struct SnapshotRepo;

impl SnapshotRepo {
    /// The most recent snapshot for a client, if any.
    pub async fn find_latest(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<Option<ScoreSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM score_snapshots \
             WHERE client_id = $1 \
             ORDER BY computed_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, ScoreSnapshot>(&query)
            .bind(client_id)
            .fetch_optional(pool)
            .await
    }

    /// Recent history for a client, newest first.
    pub async fn list_recent(
        pool: &PgPool,
        client_id: DbId,
        limit: i64,
    ) -> Result<Vec<ScoreSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM score_snapshots \
             WHERE client_id = $1 \
             ORDER BY computed_at DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, ScoreSnapshot>(&query)
            .bind(client_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Whether a snapshot with this idempotency key already exists,
    /// i.e. this recomputation intent has already committed.
    pub async fn key_exists(pool: &PgPool, idempotency_key: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM score_snapshots WHERE idempotency_key = $1)",
        )
        .bind(idempotency_key)
        .fetch_one(pool)
        .await
    }

    /// Append one snapshot.
    ///
    /// `ON CONFLICT (idempotency_key) DO NOTHING` makes redelivered
    /// jobs effect-level exactly-once. Returns the new row ID, or
    /// `None` if this key was already recorded.
    pub async fn append(
        pool: &PgPool,
        client_id: DbId,
        report: &HealthReport,
        idempotency_key: &str,
        computed_at: Timestamp,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO score_snapshots \
                 (client_id, score, risk_level, \
                  communication_score, sentiment_score, engagement_score, \
                  feedback_score, tenure_score, idempotency_key, computed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (idempotency_key) DO NOTHING \
             RETURNING id",
        )
        .bind(client_id)
        .bind(report.score)
        .bind(report.risk_level.as_str())
        .bind(report.factors.communication)
        .bind(report.factors.sentiment)
        .bind(report.factors.engagement)
        .bind(report.factors.feedback)
        .bind(report.factors.tenure)
        .bind(idempotency_key)
        .bind(computed_at)
        .fetch_optional(pool)
        .await
    }
}
