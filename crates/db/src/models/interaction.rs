//! Interaction entity: one recorded touchpoint (call, email, ticket).

use clientpulse_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `interactions` table.
///
/// Created by external event ingestion. `sentiment` and
/// `sentiment_score` start as NULL and are back-filled once by the
/// sentiment queue consumer; they are immutable afterwards.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Interaction {
    pub id: DbId,
    pub client_id: DbId,
    pub kind: String,
    pub body: Option<String>,
    pub occurred_at: Timestamp,
    pub sentiment: Option<String>,
    pub sentiment_score: Option<f64>,
    pub created_at: Timestamp,
}
