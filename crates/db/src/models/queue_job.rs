//! Durable queue job entity.

use clientpulse_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::status::StatusId;

/// A row from the `queue_jobs` table.
///
/// `attempts` counts deliveries, incremented at claim time, so a
/// worker crash (lease expiry) consumes an attempt the same way an
/// explicit failure does. `run_at` carries both the initial enqueue
/// delay and retry backoff.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QueueJob {
    pub id: DbId,
    pub queue: String,
    pub payload: serde_json::Value,
    pub status_id: StatusId,
    pub attempts: i16,
    pub max_attempts: i16,
    pub dedupe_key: Option<String>,
    pub run_at: Timestamp,
    pub lease_expires_at: Option<Timestamp>,
    pub last_error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
