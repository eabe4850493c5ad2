//! Repository for the `survey_responses` table.

use clientpulse_core::types::DbId;
use sqlx::PgPool;

use crate::models::survey::SurveyResponse;

/// Column list for `survey_responses` queries.
const COLUMNS: &str = "id, client_id, survey_type, score, submitted_at";

/// Read access to survey responses.
pub struct SurveyRepo;

impl SurveyRepo {
    /// The client's most recent survey responses, newest first.
    pub async fn list_recent(
        pool: &PgPool,
        client_id: DbId,
        limit: i64,
    ) -> Result<Vec<SurveyResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM survey_responses \
             WHERE client_id = $1 \
             ORDER BY submitted_at DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, SurveyResponse>(&query)
            .bind(client_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
