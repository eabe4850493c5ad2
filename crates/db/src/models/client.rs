//! Client entity: one tracked account.

use clientpulse_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::status::StatusId;

/// A row from the `clients` table.
///
/// `health_score` / `risk_level` always mirror the most recent
/// score snapshot; `score_computed_at` is the compare-and-set guard
/// that serializes concurrent recomputations.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Client {
    pub id: DbId,
    pub tenant_id: DbId,
    pub name: String,
    pub status_id: StatusId,
    pub health_score: i32,
    pub risk_level: String,
    pub last_contact_at: Option<Timestamp>,
    pub score_computed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
