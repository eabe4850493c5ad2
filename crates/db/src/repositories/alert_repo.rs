//! Repository for the `alerts` table.

use clientpulse_core::alert::AlertDraft;
use clientpulse_core::types::DbId;
use sqlx::PgPool;

use crate::models::alert::Alert;

/// Column list for `alerts` queries.
const COLUMNS: &str = "\
    id, client_id, kind, severity, title, message, metadata, \
    idempotency_key, action_taken, created_at";

/// Write access for the alert decision unit; `action_taken` updates
/// belong to external workflow tooling and have no method here.
pub struct AlertRepo;

impl AlertRepo {
    /// Persist a decided alert under the computation's idempotency
    /// key.
    ///
    /// `ON CONFLICT (idempotency_key) DO NOTHING` means a redelivered
    /// job cannot insert a second row for the same transition.
    /// Returns the new row ID, or `None` when the alert already
    /// exists (look it up with [`Self::find_id_by_key`]).
    pub async fn create(
        pool: &PgPool,
        client_id: DbId,
        draft: &AlertDraft,
        idempotency_key: &str,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO alerts \
                 (client_id, kind, severity, title, message, metadata, idempotency_key) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (idempotency_key) DO NOTHING \
             RETURNING id",
        )
        .bind(client_id)
        .bind(draft.kind.as_str())
        .bind(draft.severity.as_str())
        .bind(&draft.title)
        .bind(&draft.message)
        .bind(&draft.metadata)
        .bind(idempotency_key)
        .fetch_optional(pool)
        .await
    }

    /// ID of the alert created under an idempotency key, if any.
    pub async fn find_id_by_key(
        pool: &PgPool,
        idempotency_key: &str,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM alerts WHERE idempotency_key = $1")
            .bind(idempotency_key)
            .fetch_optional(pool)
            .await
    }

    /// Recent alerts for a client, newest first.
    pub async fn list_recent(
        pool: &PgPool,
        client_id: DbId,
        limit: i64,
    ) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alerts \
             WHERE client_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(client_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
