//! Consumer for the alerts queue.
//!
//! Alerts are persisted by the recomputation pipeline before the job
//! is enqueued; this consumer is the hand-off point to notification
//! channels (email, chat, webhooks). Those integrations live outside
//! this service, so delivery here is a structured log record.

use async_trait::async_trait;
use serde_json::json;

use clientpulse_core::alert::AlertKind;
use clientpulse_core::queue::{AlertJob, ALERTS_QUEUE};
use clientpulse_core::CoreError;
use clientpulse_db::models::queue_job::QueueJob;
use clientpulse_db::DbPool;

use crate::pool::JobHandler;

pub struct AlertDeliveryHandler;

#[async_trait]
impl JobHandler for AlertDeliveryHandler {
    fn queue(&self) -> &'static str {
        ALERTS_QUEUE
    }

    async fn handle(&self, _pool: &DbPool, job: &QueueJob) -> Result<serde_json::Value, CoreError> {
        let payload: AlertJob = serde_json::from_value(job.payload.clone())
            .map_err(|e| CoreError::Validation(format!("bad alert payload: {e}")))?;

        if !matches!(
            payload.kind.as_str(),
            k if k == AlertKind::HealthDecline.as_str() || k == AlertKind::ChurnRisk.as_str()
        ) {
            return Err(CoreError::Validation(format!(
                "unknown alert kind '{}'",
                payload.kind
            )));
        }

        tracing::info!(
            kind = %payload.kind,
            data = %payload.data,
            "alert handed off for delivery"
        );
        Ok(json!({ "delivered": true, "kind": payload.kind }))
    }
}
