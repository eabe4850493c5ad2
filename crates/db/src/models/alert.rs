//! Alert entity: a derived decline notification.

use clientpulse_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `alerts` table.
///
/// Created only by the alert decision unit. `idempotency_key` is the
/// key of the computation that decided the alert, unique across the
/// table, so one score transition yields at most one row no matter
/// how often the job is redelivered. `action_taken` is flipped later
/// by external workflow tooling, never by this system.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Alert {
    pub id: DbId,
    pub client_id: DbId,
    pub kind: String,
    pub severity: String,
    pub title: String,
    pub message: String,
    pub metadata: serde_json::Value,
    pub idempotency_key: String,
    pub action_taken: bool,
    pub created_at: Timestamp,
}
