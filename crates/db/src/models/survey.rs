//! Survey response entity: one feedback submission.

use clientpulse_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `survey_responses` table. Immutable once created.
///
/// `score` is raw: 0-10 (NPS-style) or 1-5 (CSAT-style), with the
/// scale implied by magnitude at scoring time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SurveyResponse {
    pub id: DbId,
    pub client_id: DbId,
    pub survey_type: String,
    pub score: f64,
    pub submitted_at: Timestamp,
}
