//! Queue topology, job payloads, and idempotency keys.
//!
//! Three named work queues drive the pipeline. Delivery to a worker is
//! at-least-once; effect-level exactly-once comes from the idempotency
//! key built here, which ties a recomputation to its trigger epoch so
//! a redelivered job cannot append a second snapshot.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Queue names
// ---------------------------------------------------------------------------

/// Health-score recomputation queue.
pub const HEALTH_SCORE_QUEUE: &str = "health-score";

/// Sentiment classification back-fill queue.
pub const SENTIMENT_QUEUE: &str = "sentiment-analysis";

/// Alert delivery-side-effect queue.
pub const ALERTS_QUEUE: &str = "alerts";

/// Default delivery attempts before a job dead-letters.
pub const DEFAULT_MAX_ATTEMPTS: i16 = 3;

// ---------------------------------------------------------------------------
// Job payloads
// ---------------------------------------------------------------------------

/// Payload for one health-score recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScoreJob {
    pub client_id: DbId,
    /// Identifies the trigger intent; see [`sweep_epoch`] and
    /// [`adhoc_epoch`].
    pub trigger_epoch: String,
}

/// Payload for one sentiment classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentJob {
    pub interaction_id: DbId,
    pub text: String,
    pub tenant_id: DbId,
}

/// Payload for one alert delivery hand-off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertJob {
    pub kind: String,
    pub data: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Idempotency keys and trigger epochs
// ---------------------------------------------------------------------------

/// Stable idempotency key for one recomputation intent. Two jobs with
/// the same key are the same intent; the second snapshot append is a
/// no-op.
pub fn recompute_key(client_id: DbId, trigger_epoch: &str) -> String {
    format!("health-score:{client_id}:{trigger_epoch}")
}

/// Epoch label shared by every job of one scheduled sweep: the sweep
/// time truncated to the sweep interval. Re-running the same sweep
/// yields the same label, so clients cannot be double-enqueued.
pub fn sweep_epoch(now: Timestamp, interval: Duration) -> String {
    let secs = (interval.as_secs().max(1)) as i64;
    format!("sweep-{}", now.timestamp() / secs * secs)
}

/// Epoch label for a one-off on-demand trigger. Each call is a
/// distinct intent, but redeliveries of the resulting job still share
/// the key.
pub fn adhoc_epoch() -> String {
    format!("adhoc-{}", uuid::Uuid::new_v4())
}

/// Epoch label for an event-driven trigger, derived from the job that
/// raised the event. Deterministic on purpose: a redelivery of the
/// source job derives the same epoch, so re-enqueueing the follow-up
/// recomputation dedupes instead of duplicating the intent.
pub fn event_epoch(source_job_id: DbId) -> String {
    format!("event-{source_job_id}")
}

/// Dedupe key for the delivery job of an alert decided by the
/// computation holding `idempotency_key`. Stable across redeliveries
/// of that computation.
pub fn alert_key(idempotency_key: &str) -> String {
    format!("alert:{idempotency_key}")
}

/// Random enqueue delay in `[0, window]`, spreading one sweep's jobs
/// so the store and the classifier never see a synchronized burst.
pub fn sweep_jitter(window: Duration) -> Duration {
    if window.is_zero() {
        return Duration::ZERO;
    }
    let ms = rand::rng().random_range(0..=window.as_millis() as u64);
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn recompute_key_is_stable() {
        assert_eq!(
            recompute_key(7, "sweep-1700000000"),
            recompute_key(7, "sweep-1700000000"),
        );
    }

    #[test]
    fn recompute_key_distinguishes_clients_and_epochs() {
        assert_ne!(recompute_key(7, "sweep-0"), recompute_key(8, "sweep-0"));
        assert_ne!(recompute_key(7, "sweep-0"), recompute_key(7, "adhoc-x"));
    }

    #[test]
    fn sweep_epoch_constant_within_interval() {
        let interval = Duration::from_secs(86_400);
        let a = chrono::Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let b = a + chrono::Duration::hours(3);
        assert_eq!(sweep_epoch(a, interval), sweep_epoch(b, interval));
    }

    #[test]
    fn sweep_epoch_advances_across_intervals() {
        let interval = Duration::from_secs(86_400);
        let a = chrono::Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let b = a + chrono::Duration::days(1);
        assert_ne!(sweep_epoch(a, interval), sweep_epoch(b, interval));
    }

    #[test]
    fn adhoc_epochs_are_unique() {
        assert_ne!(adhoc_epoch(), adhoc_epoch());
    }

    #[test]
    fn event_epoch_is_deterministic_per_source_job() {
        // A redelivered source job must derive the same epoch, so its
        // follow-up recomputation dedupes instead of duplicating.
        assert_eq!(event_epoch(91), event_epoch(91));
        assert_ne!(event_epoch(91), event_epoch(92));
        assert_eq!(
            recompute_key(7, &event_epoch(91)),
            recompute_key(7, &event_epoch(91)),
        );
    }

    #[test]
    fn alert_key_is_stable_per_computation() {
        // Two deliveries of the same computation produce the same
        // alert dedupe key, so the delivery job enqueues once.
        let key = recompute_key(7, "sweep-1700000000");
        assert_eq!(alert_key(&key), alert_key(&key));
        assert_ne!(alert_key(&key), alert_key(&recompute_key(8, "sweep-1700000000")));
    }

    #[test]
    fn jitter_stays_within_window() {
        let window = Duration::from_secs(60);
        for _ in 0..200 {
            assert!(sweep_jitter(window) <= window);
        }
    }

    #[test]
    fn jitter_zero_window_is_zero() {
        assert_eq!(sweep_jitter(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn payload_wire_format_uses_snake_case_fields() {
        let job = HealthScoreJob {
            client_id: 42,
            trigger_epoch: "sweep-0".into(),
        };
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["client_id"], 42);
        assert_eq!(value["trigger_epoch"], "sweep-0");
    }
}
