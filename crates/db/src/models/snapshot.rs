//! Score snapshot entity: one immutable scoring result.

use clientpulse_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the append-only `score_snapshots` table.
///
/// Per client the sequence is strictly ordered by `computed_at`.
/// `idempotency_key` is unique across the table: a redelivered
/// recompute job inserts nothing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScoreSnapshot {
    pub id: DbId,
    pub client_id: DbId,
    pub score: i32,
    pub risk_level: String,
    pub communication_score: f64,
    pub sentiment_score: f64,
    pub engagement_score: f64,
    pub feedback_score: f64,
    pub tenure_score: f64,
    pub idempotency_key: String,
    pub computed_at: Timestamp,
}
