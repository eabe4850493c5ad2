//! Repository for the `ai_request_logs` audit table.
//!
//! Writes here are best-effort: the caller logs a warning on failure
//! and continues. Nothing in the pipeline depends on these rows.

use clientpulse_core::types::DbId;
use sqlx::PgPool;

/// Append-only AI usage audit.
pub struct AiRequestLogRepo;

impl AiRequestLogRepo {
    /// Record one classifier call, returning the generated ID.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        pool: &PgPool,
        tenant_id: DbId,
        request_type: &str,
        model: &str,
        tokens_used: i64,
        success: bool,
        error: Option<&str>,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO ai_request_logs \
                 (tenant_id, request_type, model, tokens_used, success, error) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(tenant_id)
        .bind(request_type)
        .bind(model)
        .bind(tokens_used)
        .bind(success)
        .bind(error)
        .fetch_one(pool)
        .await
    }
}
