//! Repository for the `clients` table.

use clientpulse_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::client::Client;
use crate::models::status::ClientStatus;

/// Column list for `clients` queries.
const COLUMNS: &str = "\
    id, tenant_id, name, status_id, health_score, risk_level, \
    last_contact_at, score_computed_at, created_at, updated_at";

/// Provides read and score-write access to clients.
pub struct ClientRepo;

impl ClientRepo {
    /// Find a client by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = $1");
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// IDs of every active client, for the scheduled sweep.
    pub async fn list_active_ids(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM clients WHERE status_id = $1 ORDER BY id")
            .bind(ClientStatus::Active.id())
            .fetch_all(pool)
            .await
    }

    /// Compare-and-set update of the current score.
    ///
    /// Applies only when this computation is newer than the one that
    /// produced the stored snapshot, so a slow recompute can never
    /// overwrite a fresher result. Returns `true` if this computation
    /// won.
    pub async fn update_health(
        pool: &PgPool,
        id: DbId,
        score: i32,
        risk_level: &str,
        computed_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE clients \
             SET health_score = $2, risk_level = $3, score_computed_at = $4, updated_at = NOW() \
             WHERE id = $1 \
               AND (score_computed_at IS NULL OR score_computed_at < $4)",
        )
        .bind(id)
        .bind(score)
        .bind(risk_level)
        .bind(computed_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
