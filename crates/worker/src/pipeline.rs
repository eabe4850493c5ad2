//! The health recomputation pipeline: load signals, score, decide on
//! an alert, and commit.
//!
//! Ordering matters here. The idempotency key is checked before any
//! side effect, and the snapshot append (which burns the key) is the
//! final commit point. The client-row update is a compare-and-set on
//! `score_computed_at`, so two concurrent recomputations for the same
//! client cannot interleave their writes: the one that loses the CAS
//! discards its result entirely.

use chrono::Utc;
use serde_json::json;

use clientpulse_core::alert::{self, SnapshotView};
use clientpulse_core::health::{
    self, ClientSignals, InteractionSignal, RiskLevel, Sentiment, SurveySignal,
};
use clientpulse_core::queue::{alert_key, AlertJob, ALERTS_QUEUE};
use clientpulse_core::types::DbId;
use clientpulse_core::CoreError;
use clientpulse_db::repositories::{
    AlertRepo, ClientRepo, InteractionRepo, QueueRepo, SnapshotRepo, SurveyRepo,
};
use clientpulse_db::DbPool;

/// What one recomputation did.
#[derive(Debug, Clone, PartialEq)]
pub enum RecomputeOutcome {
    /// The score was computed and applied to the client row.
    Applied {
        score: i32,
        risk_level: RiskLevel,
        alerted: bool,
    },
    /// The score was computed and recorded in history, but a newer
    /// computation had already updated the client row.
    Superseded,
    /// This idempotency key was already committed; nothing was done.
    AlreadyApplied,
}

fn db_err(e: sqlx::Error) -> CoreError {
    CoreError::Transient(e.to_string())
}

/// Run one recomputation for a client under the given idempotency key.
pub async fn recompute_client(
    pool: &DbPool,
    client_id: DbId,
    idempotency_key: &str,
    max_attempts: i16,
) -> Result<RecomputeOutcome, CoreError> {
    if SnapshotRepo::key_exists(pool, idempotency_key)
        .await
        .map_err(db_err)?
    {
        return Ok(RecomputeOutcome::AlreadyApplied);
    }

    let client = ClientRepo::find_by_id(pool, client_id)
        .await
        .map_err(db_err)?
        .ok_or(CoreError::NotFound {
            entity: "client",
            id: client_id,
        })?;

    let interactions =
        InteractionRepo::list_recent(pool, client_id, health::SIGNAL_INTERACTION_LIMIT)
            .await
            .map_err(db_err)?;
    let surveys = SurveyRepo::list_recent(pool, client_id, health::SIGNAL_SURVEY_LIMIT)
        .await
        .map_err(db_err)?;

    let signals = ClientSignals {
        created_at: client.created_at,
        last_contact_at: client.last_contact_at,
        interactions: interactions
            .iter()
            .map(|i| InteractionSignal {
                occurred_at: i.occurred_at,
                sentiment: i.sentiment.as_deref().and_then(Sentiment::parse),
            })
            .collect(),
        surveys: surveys
            .iter()
            .map(|s| SurveySignal {
                submitted_at: s.submitted_at,
                score: s.score,
            })
            .collect(),
    };

    let now = Utc::now();
    let report = health::compute_health(&signals, now);

    let previous = match SnapshotRepo::find_latest(pool, client_id)
        .await
        .map_err(db_err)?
    {
        Some(snapshot) => {
            let risk_level = RiskLevel::parse(&snapshot.risk_level).ok_or_else(|| {
                CoreError::Validation(format!(
                    "snapshot {} has unknown risk level '{}'",
                    snapshot.id, snapshot.risk_level
                ))
            })?;
            Some(SnapshotView {
                score: snapshot.score,
                risk_level,
            })
        }
        None => None,
    };

    let applied = ClientRepo::update_health(
        pool,
        client_id,
        report.score,
        report.risk_level.as_str(),
        now,
    )
    .await
    .map_err(db_err)?;

    if !applied {
        // A newer computation won the CAS. The loser discards its
        // whole result: no row write, no alert, no history entry, so
        // the latest snapshot always matches the client row.
        tracing::debug!(client_id, "recomputation superseded by a newer score");
        return Ok(RecomputeOutcome::Superseded);
    }

    let mut alerted = false;
    if let Some(draft) = alert::evaluate(&client.name, previous, &report) {
        // The alert shares this computation's idempotency key: a
        // redelivery that crashed between the insert and the snapshot
        // append finds the existing row instead of inserting a second
        // one for the same transition.
        let inserted = AlertRepo::create(pool, client_id, &draft, idempotency_key)
            .await
            .map_err(db_err)?;
        let alert_id = match inserted {
            Some(id) => id,
            None => AlertRepo::find_id_by_key(pool, idempotency_key)
                .await
                .map_err(db_err)?
                .ok_or_else(|| {
                    CoreError::Internal(format!(
                        "alert row for key '{idempotency_key}' missing after conflict"
                    ))
                })?,
        };
        let job = AlertJob {
            kind: draft.kind.as_str().to_string(),
            data: json!({
                "alert_id": alert_id,
                "client_id": client_id,
                "severity": draft.severity.as_str(),
                "title": draft.title,
            }),
        };
        let payload = serde_json::to_value(&job)
            .map_err(|e| CoreError::Internal(format!("alert job serialization: {e}")))?;
        QueueRepo::enqueue(
            pool,
            ALERTS_QUEUE,
            &payload,
            std::time::Duration::ZERO,
            Some(&alert_key(idempotency_key)),
            max_attempts,
        )
        .await
        .map_err(db_err)?;
        tracing::info!(
            client_id,
            alert_id,
            kind = draft.kind.as_str(),
            severity = draft.severity.as_str(),
            "alert raised"
        );
        alerted = true;
    }

    SnapshotRepo::append(pool, client_id, &report, idempotency_key, now)
        .await
        .map_err(db_err)?;

    tracing::info!(
        client_id,
        score = report.score,
        risk_level = report.risk_level.as_str(),
        alerted,
        "health score applied"
    );

    Ok(RecomputeOutcome::Applied {
        score: report.score,
        risk_level: report.risk_level,
        alerted,
    })
}
