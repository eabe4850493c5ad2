//! Consumer for the health-score queue.

use async_trait::async_trait;
use serde_json::json;

use clientpulse_core::queue::{recompute_key, HealthScoreJob, HEALTH_SCORE_QUEUE};
use clientpulse_core::CoreError;
use clientpulse_db::models::queue_job::QueueJob;
use clientpulse_db::DbPool;

use crate::pipeline::{recompute_client, RecomputeOutcome};
use crate::pool::JobHandler;

pub struct HealthScoreHandler {
    /// Attempt budget for alert jobs the pipeline fans out.
    max_attempts: i16,
}

impl HealthScoreHandler {
    pub fn new(max_attempts: i16) -> Self {
        Self { max_attempts }
    }
}

fn outcome_json(outcome: &RecomputeOutcome) -> serde_json::Value {
    match outcome {
        RecomputeOutcome::Applied {
            score,
            risk_level,
            alerted,
        } => json!({
            "applied": true,
            "score": score,
            "risk_level": risk_level.as_str(),
            "alerted": alerted,
        }),
        RecomputeOutcome::Superseded => json!({ "applied": false, "superseded": true }),
        RecomputeOutcome::AlreadyApplied => json!({ "applied": false, "duplicate": true }),
    }
}

#[async_trait]
impl JobHandler for HealthScoreHandler {
    fn queue(&self) -> &'static str {
        HEALTH_SCORE_QUEUE
    }

    async fn handle(&self, pool: &DbPool, job: &QueueJob) -> Result<serde_json::Value, CoreError> {
        let payload: HealthScoreJob = serde_json::from_value(job.payload.clone())
            .map_err(|e| CoreError::Validation(format!("bad health-score payload: {e}")))?;

        let key = recompute_key(payload.client_id, &payload.trigger_epoch);
        let outcome = recompute_client(pool, payload.client_id, &key, self.max_attempts).await?;
        Ok(outcome_json(&outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clientpulse_core::health::RiskLevel;

    #[test]
    fn applied_outcome_reports_score_and_tier() {
        let value = outcome_json(&RecomputeOutcome::Applied {
            score: 38,
            risk_level: RiskLevel::Critical,
            alerted: true,
        });
        assert_eq!(value["applied"], true);
        assert_eq!(value["score"], 38);
        assert_eq!(value["risk_level"], "critical");
        assert_eq!(value["alerted"], true);
    }

    #[test]
    fn duplicate_and_superseded_outcomes_are_distinct() {
        assert_eq!(outcome_json(&RecomputeOutcome::Superseded)["superseded"], true);
        assert_eq!(outcome_json(&RecomputeOutcome::AlreadyApplied)["duplicate"], true);
    }
}
