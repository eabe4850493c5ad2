//! Consumer for the sentiment-analysis queue.
//!
//! Classifies one interaction's text, back-fills the interaction row,
//! and fans out an event-driven health recomputation so the new
//! signal is reflected promptly. The recomputation's trigger epoch is
//! derived from this job's ID, so every delivery (including the
//! duplicate paths) can re-enqueue it and dedupe against itself: the
//! fan-out survives a crash between the sentiment write and the
//! enqueue. Audit logging is best-effort and never fails the job.

use async_trait::async_trait;
use serde_json::json;

use clientpulse_ai::SentimentClient;
use clientpulse_core::queue::{
    event_epoch, recompute_key, HealthScoreJob, SentimentJob, HEALTH_SCORE_QUEUE, SENTIMENT_QUEUE,
};
use clientpulse_core::types::DbId;
use clientpulse_core::CoreError;
use clientpulse_db::models::queue_job::QueueJob;
use clientpulse_db::repositories::{AiRequestLogRepo, InteractionRepo, QueueRepo};
use clientpulse_db::DbPool;

use crate::pool::JobHandler;

/// `request_type` recorded in the AI audit log.
const REQUEST_TYPE: &str = "sentiment-analysis";

pub struct SentimentHandler {
    client: SentimentClient,
    /// Attempt budget for the recomputation jobs this handler fans out.
    max_attempts: i16,
}

impl SentimentHandler {
    pub fn new(client: SentimentClient, max_attempts: i16) -> Self {
        Self {
            client,
            max_attempts,
        }
    }

    async fn audit(
        &self,
        pool: &DbPool,
        tenant_id: DbId,
        tokens_used: i64,
        success: bool,
        error: Option<&str>,
    ) {
        let result = AiRequestLogRepo::insert(
            pool,
            tenant_id,
            REQUEST_TYPE,
            self.client.model(),
            tokens_used,
            success,
            error,
        )
        .await;
        if let Err(e) = result {
            tracing::warn!(tenant_id, error = %e, "AI audit log write failed");
        }
    }

    /// Enqueue the follow-up recomputation for the interaction's
    /// client. Idempotent per source job: the epoch comes from
    /// `source_job_id`, so a repeat call dedupes.
    async fn enqueue_recompute(
        &self,
        pool: &DbPool,
        client_id: DbId,
        source_job_id: DbId,
    ) -> Result<(), CoreError> {
        let epoch = event_epoch(source_job_id);
        let recompute = HealthScoreJob {
            client_id,
            trigger_epoch: epoch.clone(),
        };
        let payload = serde_json::to_value(&recompute)
            .map_err(|e| CoreError::Internal(format!("recompute job serialization: {e}")))?;
        QueueRepo::enqueue(
            pool,
            HEALTH_SCORE_QUEUE,
            &payload,
            std::time::Duration::ZERO,
            Some(&recompute_key(client_id, &epoch)),
            self.max_attempts,
        )
        .await
        .map_err(|e| CoreError::Transient(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl JobHandler for SentimentHandler {
    fn queue(&self) -> &'static str {
        SENTIMENT_QUEUE
    }

    async fn handle(&self, pool: &DbPool, job: &QueueJob) -> Result<serde_json::Value, CoreError> {
        let payload: SentimentJob = serde_json::from_value(job.payload.clone())
            .map_err(|e| CoreError::Validation(format!("bad sentiment payload: {e}")))?;

        let interaction = InteractionRepo::find_by_id(pool, payload.interaction_id)
            .await
            .map_err(|e| CoreError::Transient(e.to_string()))?
            .ok_or(CoreError::NotFound {
                entity: "interaction",
                id: payload.interaction_id,
            })?;

        // Sentiment is write-once; a redelivered job finds it set and
        // stops without another classifier call. The fan-out still
        // runs in case the previous delivery crashed before it; the
        // stable dedupe key makes it a no-op otherwise.
        if interaction.sentiment.is_some() {
            self.enqueue_recompute(pool, interaction.client_id, job.id)
                .await?;
            return Ok(json!({ "classified": false, "duplicate": true }));
        }

        let analysis = match self.client.analyze(&payload.text).await {
            Ok(analysis) => analysis,
            Err(e) => {
                self.audit(pool, payload.tenant_id, 0, false, Some(&e.to_string()))
                    .await;
                return Err(CoreError::Transient(e.to_string()));
            }
        };

        let degraded_note = analysis
            .degraded
            .then_some("unusable model reply, neutral fallback applied");
        self.audit(
            pool,
            payload.tenant_id,
            analysis.tokens_used,
            !analysis.degraded,
            degraded_note,
        )
        .await;

        let updated = InteractionRepo::set_sentiment(
            pool,
            interaction.id,
            analysis.sentiment.sentiment.as_str(),
            analysis.sentiment.score,
        )
        .await
        .map_err(|e| CoreError::Transient(e.to_string()))?;
        if !updated {
            // Lost a race with a concurrent delivery that already
            // wrote. Fan out anyway; the dedupe key absorbs it if the
            // winner got there first.
            self.enqueue_recompute(pool, interaction.client_id, job.id)
                .await?;
            return Ok(json!({ "classified": false, "duplicate": true }));
        }

        self.enqueue_recompute(pool, interaction.client_id, job.id)
            .await?;

        Ok(json!({
            "classified": true,
            "sentiment": analysis.sentiment.sentiment.as_str(),
            "score": analysis.sentiment.score,
            "degraded": analysis.degraded,
        }))
    }
}
