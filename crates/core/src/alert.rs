//! Alert decision unit: trend comparison between consecutive snapshots.
//!
//! Pure: given the newly computed report and the immediately preceding
//! snapshot for the same client (if any), decides whether an alert
//! fires and constructs its payload. Persistence and delivery are the
//! caller's problem; this module has no side effects.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::health::{HealthFactors, HealthReport, RiskLevel};

/// Score drop (previous - current) that triggers an alert on its own,
/// independent of any tier change.
pub const SCORE_DROP_THRESHOLD: i32 = 15;

/// What kind of decline an alert describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    HealthDecline,
    ChurnRisk,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HealthDecline => "health_decline",
            Self::ChurnRisk => "churn_risk",
        }
    }
}

/// Alert severity. Only declines alert, so there is no "low".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    High,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// A previously persisted scoring result, as the decision unit sees it.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotView {
    pub score: i32,
    pub risk_level: RiskLevel,
}

/// An alert ready to be persisted by the caller.
#[derive(Debug, Clone, Serialize)]
pub struct AlertDraft {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    /// Previous/current score, the drop, and the factor breakdown,
    /// for downstream diagnosis.
    pub metadata: serde_json::Value,
}

/// Decide whether the transition `previous -> current` warrants an alert.
///
/// Triggers when the score dropped by at least
/// [`SCORE_DROP_THRESHOLD`], or when the risk tier changed to anything
/// other than healthy. The first-ever snapshot never alerts: with no
/// previous value there is no trend to report.
pub fn evaluate(
    client_name: &str,
    previous: Option<SnapshotView>,
    current: &HealthReport,
) -> Option<AlertDraft> {
    let previous = previous?;

    let drop = previous.score - current.score;
    let tier_worsened =
        current.risk_level != previous.risk_level && current.risk_level != RiskLevel::Healthy;

    if drop < SCORE_DROP_THRESHOLD && !tier_worsened {
        return None;
    }

    let (kind, severity) = if current.risk_level == RiskLevel::Critical {
        (AlertKind::ChurnRisk, AlertSeverity::Critical)
    } else {
        (AlertKind::HealthDecline, AlertSeverity::High)
    };

    Some(AlertDraft {
        kind,
        severity,
        title: format!("{client_name} health score declined"),
        message: format!(
            "Health score dropped from {} to {}. Risk level: {}",
            previous.score,
            current.score,
            current.risk_level.as_str()
        ),
        metadata: alert_metadata(previous.score, current.score, &current.factors),
    })
}

fn alert_metadata(
    previous_score: i32,
    current_score: i32,
    factors: &HealthFactors,
) -> serde_json::Value {
    json!({
        "previous_score": previous_score,
        "current_score": current_score,
        "score_drop": previous_score - current_score,
        "factors": factors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(score: i32) -> HealthReport {
        HealthReport {
            score,
            risk_level: RiskLevel::from_score(score),
            factors: HealthFactors {
                communication: 10.0,
                sentiment: 15.0,
                engagement: 10.0,
                feedback: 7.5,
                tenure: 7.0,
            },
        }
    }

    fn snapshot(score: i32) -> SnapshotView {
        SnapshotView {
            score,
            risk_level: RiskLevel::from_score(score),
        }
    }

    #[test]
    fn first_snapshot_never_alerts() {
        assert!(evaluate("Acme", None, &report(12)).is_none());
    }

    #[test]
    fn fifteen_point_drop_fires_health_decline() {
        let draft = evaluate("Acme", Some(snapshot(80)), &report(60)).expect("alert");
        assert_eq!(draft.kind, AlertKind::HealthDecline);
        assert_eq!(draft.severity, AlertSeverity::High);
        assert!(draft.message.contains("from 80 to 60"));
    }

    #[test]
    fn critical_tier_fires_churn_risk_regardless_of_delta() {
        // A 7-point drop is under the threshold, but the tier crossed
        // into critical.
        let draft = evaluate("Acme", Some(snapshot(45)), &report(38)).expect("alert");
        assert_eq!(draft.kind, AlertKind::ChurnRisk);
        assert_eq!(draft.severity, AlertSeverity::Critical);
    }

    #[test]
    fn tier_slip_to_at_risk_fires_despite_small_drop() {
        // 72 -> 65 is only a 7-point drop, but the tier worsened from
        // healthy to at_risk.
        let draft = evaluate("Acme", Some(snapshot(72)), &report(65)).expect("alert");
        assert_eq!(draft.kind, AlertKind::HealthDecline);
        assert_eq!(draft.severity, AlertSeverity::High);
    }

    #[test]
    fn small_drop_within_tier_stays_quiet() {
        assert!(evaluate("Acme", Some(snapshot(90)), &report(85)).is_none());
    }

    #[test]
    fn large_drop_within_healthy_tier_still_alerts() {
        let draft = evaluate("Acme", Some(snapshot(95)), &report(72)).expect("alert");
        assert_eq!(draft.kind, AlertKind::HealthDecline);
        assert_eq!(draft.severity, AlertSeverity::High);
    }

    #[test]
    fn recovery_to_healthy_is_not_an_alert() {
        // Tier changed, but the new tier is healthy.
        assert!(evaluate("Acme", Some(snapshot(60)), &report(75)).is_none());
    }

    #[test]
    fn score_increase_never_alerts_within_tier() {
        assert!(evaluate("Acme", Some(snapshot(42)), &report(65)).is_none());
    }

    #[test]
    fn metadata_carries_transition_and_factors() {
        let draft = evaluate("Acme", Some(snapshot(80)), &report(60)).expect("alert");
        assert_eq!(draft.metadata["previous_score"], 80);
        assert_eq!(draft.metadata["current_score"], 60);
        assert_eq!(draft.metadata["score_drop"], 20);
        assert_eq!(draft.metadata["factors"]["sentiment"], 15.0);
    }

    #[test]
    fn title_names_the_client() {
        let draft = evaluate("Globex", Some(snapshot(80)), &report(60)).expect("alert");
        assert_eq!(draft.title, "Globex health score declined");
    }
}
