//! Repository for the `interactions` table.

use clientpulse_core::types::DbId;
use sqlx::PgPool;

use crate::models::interaction::Interaction;

/// Column list for `interactions` queries.
const COLUMNS: &str =
    "id, client_id, kind, body, occurred_at, sentiment, sentiment_score, created_at";

/// Provides signal reads and sentiment back-fill for interactions.
pub struct InteractionRepo;

impl InteractionRepo {
    /// Find an interaction by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Interaction>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM interactions WHERE id = $1");
        sqlx::query_as::<_, Interaction>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The client's most recent interactions, newest first.
    pub async fn list_recent(
        pool: &PgPool,
        client_id: DbId,
        limit: i64,
    ) -> Result<Vec<Interaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM interactions \
             WHERE client_id = $1 \
             ORDER BY occurred_at DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Interaction>(&query)
            .bind(client_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Attach classifier output to an interaction.
    ///
    /// Sentiment is immutable once set: the update only fills NULL, so
    /// a redelivered classification job is a no-op. Returns `true` if
    /// the row was updated.
    pub async fn set_sentiment(
        pool: &PgPool,
        id: DbId,
        sentiment: &str,
        sentiment_score: f64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE interactions \
             SET sentiment = $2, sentiment_score = $3 \
             WHERE id = $1 AND sentiment IS NULL",
        )
        .bind(id)
        .bind(sentiment)
        .bind(sentiment_score)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
