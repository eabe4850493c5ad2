//! AI usage audit record. Best-effort telemetry, never load-bearing.

use clientpulse_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `ai_request_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AiRequestLog {
    pub id: DbId,
    pub tenant_id: DbId,
    pub request_type: String,
    pub model: String,
    pub tokens_used: i64,
    pub success: bool,
    pub error: Option<String>,
    pub created_at: Timestamp,
}
