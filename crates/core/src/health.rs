//! Health score engine: pure scoring over a bounded signal window.
//!
//! Given a client's recent interactions and survey responses plus an
//! explicit `now`, produces a 0-100 composite score, a risk tier, and
//! the per-factor breakdown. Deterministic for a given input snapshot:
//! no hidden state, no I/O, no clock reads.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Signal window bounds
// ---------------------------------------------------------------------------

/// How many recent interactions the signal reader fetches per client.
pub const SIGNAL_INTERACTION_LIMIT: i64 = 50;

/// How many recent survey responses the signal reader fetches per client.
pub const SIGNAL_SURVEY_LIMIT: i64 = 10;

// ---------------------------------------------------------------------------
// Factor constants
// ---------------------------------------------------------------------------

/// Window for the communication-frequency factor.
pub const COMMUNICATION_WINDOW_DAYS: i64 = 30;

/// Window for the short-horizon engagement factor.
pub const ENGAGEMENT_WINDOW_DAYS: i64 = 7;

/// Sentiment factor value when no interaction has sentiment attached.
/// The midpoint of the 0-30 range: an unscored client must not appear
/// artificially healthy or unhealthy.
pub const SENTIMENT_NEUTRAL_DEFAULT: f64 = 15.0;

/// Feedback factor value when no survey responses exist (midpoint of 0-15).
pub const FEEDBACK_NEUTRAL_DEFAULT: f64 = 7.5;

/// How many of the most recent survey responses feed the feedback factor.
pub const FEEDBACK_SURVEY_SAMPLE: usize = 3;

/// Raw survey values at or above this are treated as a 0-10 scale;
/// below it, as a 1-5 scale.
pub const SURVEY_SCALE_PIVOT: f64 = 5.0;

// ---------------------------------------------------------------------------
// Risk tier thresholds (policy constants, not derived)
// ---------------------------------------------------------------------------

/// Total score at or above which a client is healthy.
pub const HEALTHY_THRESHOLD: i32 = 70;

/// Total score at or above which a client is merely at risk; below
/// this the client is critical.
pub const AT_RISK_THRESHOLD: i32 = 40;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Categorical sentiment attached to an interaction by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Contribution of this label to the sentiment average.
    pub fn weight(self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Neutral => 0.5,
            Self::Negative => 0.0,
        }
    }

    /// Canonical lowercase label as stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }

    /// Parse a stored label. Returns `None` for anything unrecognized.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "positive" => Some(Self::Positive),
            "neutral" => Some(Self::Neutral),
            "negative" => Some(Self::Negative),
            _ => None,
        }
    }
}

/// Discretization of the health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Healthy,
    AtRisk,
    Critical,
}

impl RiskLevel {
    /// Classify a total score. Total function over all integers.
    pub fn from_score(score: i32) -> Self {
        if score >= HEALTHY_THRESHOLD {
            Self::Healthy
        } else if score >= AT_RISK_THRESHOLD {
            Self::AtRisk
        } else {
            Self::Critical
        }
    }

    /// Canonical snake_case label as stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::AtRisk => "at_risk",
            Self::Critical => "critical",
        }
    }

    /// Parse a stored label. Returns `None` for anything unrecognized.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "healthy" => Some(Self::Healthy),
            "at_risk" => Some(Self::AtRisk),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs and outputs
// ---------------------------------------------------------------------------

/// One interaction as the engine sees it.
#[derive(Debug, Clone)]
pub struct InteractionSignal {
    pub occurred_at: Timestamp,
    /// `None` until the sentiment classifier has back-filled it.
    pub sentiment: Option<Sentiment>,
}

/// One survey response as the engine sees it. `score` is raw: 0-10 or
/// 1-5 depending on the survey method, disambiguated by magnitude.
#[derive(Debug, Clone)]
pub struct SurveySignal {
    pub submitted_at: Timestamp,
    pub score: f64,
}

/// The bounded signal window for one client, most recent first.
#[derive(Debug, Clone)]
pub struct ClientSignals {
    pub created_at: Timestamp,
    pub last_contact_at: Option<Timestamp>,
    pub interactions: Vec<InteractionSignal>,
    pub surveys: Vec<SurveySignal>,
}

/// Per-factor breakdown. Each field is bounded by its stated range;
/// the factor bounds sum to exactly 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthFactors {
    /// Communication frequency, 0-25.
    pub communication: f64,
    /// Interaction sentiment, 0-30.
    pub sentiment: f64,
    /// Short-horizon engagement, 0-20.
    pub engagement: f64,
    /// Survey feedback, 0-15.
    pub feedback: f64,
    /// Relationship tenure, 0-10.
    pub tenure: f64,
}

impl HealthFactors {
    /// Total score: the factor sum rounded to the nearest integer.
    pub fn total(&self) -> i32 {
        (self.communication + self.sentiment + self.engagement + self.feedback + self.tenure)
            .round() as i32
    }
}

/// One computed scoring result.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub score: i32,
    pub risk_level: RiskLevel,
    pub factors: HealthFactors,
}

// ---------------------------------------------------------------------------
// Factor scoring
// ---------------------------------------------------------------------------

fn days_since(now: Timestamp, then: Timestamp) -> i64 {
    (now - then).num_days()
}

/// Communication frequency (0-25): bucketed count of interactions in
/// the last 30 days. Bucketing keeps outlier spikes from dominating.
pub fn communication_score(interactions: &[InteractionSignal], now: Timestamp) -> f64 {
    let recent = interactions
        .iter()
        .filter(|i| days_since(now, i.occurred_at) <= COMMUNICATION_WINDOW_DAYS)
        .count();

    match recent {
        n if n >= 10 => 25.0,
        n if n >= 5 => 20.0,
        n if n >= 2 => 15.0,
        n if n >= 1 => 10.0,
        _ => 0.0,
    }
}

/// Sentiment (0-30): average label weight over interactions that have
/// sentiment attached, scaled to the factor range. Defaults to the
/// midpoint when nothing has been classified yet.
pub fn sentiment_score(interactions: &[InteractionSignal]) -> f64 {
    let weights: Vec<f64> = interactions
        .iter()
        .filter_map(|i| i.sentiment.map(Sentiment::weight))
        .collect();

    if weights.is_empty() {
        return SENTIMENT_NEUTRAL_DEFAULT;
    }
    weights.iter().sum::<f64>() / weights.len() as f64 * 30.0
}

/// Recent engagement (0-20): a short-horizon early-warning signal
/// distinct from the 30-day communication factor. Falls back to
/// days-since-last-contact when the 7-day window is empty; a client
/// with no recorded contact at all counts as maximally stale.
pub fn engagement_score(
    interactions: &[InteractionSignal],
    last_contact_at: Option<Timestamp>,
    now: Timestamp,
) -> f64 {
    let last_week = interactions
        .iter()
        .filter(|i| days_since(now, i.occurred_at) <= ENGAGEMENT_WINDOW_DAYS)
        .count();

    if last_week >= 3 {
        return 20.0;
    }
    if last_week >= 1 {
        return 15.0;
    }

    match last_contact_at.map(|t| days_since(now, t)) {
        Some(d) if d <= 14 => 10.0,
        Some(d) if d <= 30 => 5.0,
        _ => 0.0,
    }
}

/// Feedback (0-15): average of the most recent survey scores, each
/// normalized to [0,1]. Values at or above [`SURVEY_SCALE_PIVOT`] are
/// read as a 0-10 scale, below it as a 1-5 scale.
pub fn feedback_score(surveys: &[SurveySignal]) -> f64 {
    if surveys.is_empty() {
        return FEEDBACK_NEUTRAL_DEFAULT;
    }

    let sample = &surveys[..surveys.len().min(FEEDBACK_SURVEY_SAMPLE)];
    let avg = sample
        .iter()
        .map(|s| {
            if s.score >= SURVEY_SCALE_PIVOT {
                s.score / 10.0
            } else {
                s.score / 5.0
            }
        })
        .sum::<f64>()
        / sample.len() as f64;

    avg * 15.0
}

/// Tenure (0-10): age of the relationship. Very new clients get a
/// floor of 5 so thin data does not read as churn risk.
pub fn tenure_score(created_at: Timestamp, now: Timestamp) -> f64 {
    match days_since(now, created_at) {
        d if d >= 90 => 10.0,
        d if d >= 30 => 7.0,
        _ => 5.0,
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Compute the full health report for one client's signal window.
pub fn compute_health(signals: &ClientSignals, now: Timestamp) -> HealthReport {
    let factors = HealthFactors {
        communication: communication_score(&signals.interactions, now),
        sentiment: sentiment_score(&signals.interactions),
        engagement: engagement_score(&signals.interactions, signals.last_contact_at, now),
        feedback: feedback_score(&signals.surveys),
        tenure: tenure_score(signals.created_at, now),
    };

    let score = factors.total();
    HealthReport {
        score,
        risk_level: RiskLevel::from_score(score),
        factors,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn interaction(days_ago: i64, sentiment: Option<Sentiment>) -> InteractionSignal {
        InteractionSignal {
            occurred_at: Utc::now() - Duration::days(days_ago),
            sentiment,
        }
    }

    fn survey(days_ago: i64, score: f64) -> SurveySignal {
        SurveySignal {
            submitted_at: Utc::now() - Duration::days(days_ago),
            score,
        }
    }

    fn interactions(count: usize, days_ago: i64) -> Vec<InteractionSignal> {
        (0..count).map(|_| interaction(days_ago, None)).collect()
    }

    // -- communication_score --------------------------------------------------

    #[test]
    fn communication_ten_or_more_is_max() {
        assert_eq!(communication_score(&interactions(10, 5), Utc::now()), 25.0);
    }

    #[test]
    fn communication_five_to_nine() {
        assert_eq!(communication_score(&interactions(5, 5), Utc::now()), 20.0);
    }

    #[test]
    fn communication_two_to_four() {
        assert_eq!(communication_score(&interactions(2, 5), Utc::now()), 15.0);
    }

    #[test]
    fn communication_single_interaction() {
        assert_eq!(communication_score(&interactions(1, 5), Utc::now()), 10.0);
    }

    #[test]
    fn communication_none_in_window() {
        // Plenty of interactions, all outside the 30-day window.
        assert_eq!(communication_score(&interactions(12, 45), Utc::now()), 0.0);
    }

    // -- sentiment_score ------------------------------------------------------

    #[test]
    fn sentiment_all_positive_is_max() {
        let list = vec![
            interaction(1, Some(Sentiment::Positive)),
            interaction(2, Some(Sentiment::Positive)),
        ];
        assert_eq!(sentiment_score(&list), 30.0);
    }

    #[test]
    fn sentiment_mixed_average() {
        let list = vec![
            interaction(1, Some(Sentiment::Positive)),
            interaction(2, Some(Sentiment::Negative)),
        ];
        assert_eq!(sentiment_score(&list), 15.0);
    }

    #[test]
    fn sentiment_unscored_interactions_are_skipped() {
        let list = vec![
            interaction(1, Some(Sentiment::Negative)),
            interaction(2, None),
            interaction(3, None),
        ];
        assert_eq!(sentiment_score(&list), 0.0);
    }

    #[test]
    fn sentiment_defaults_to_midpoint_when_nothing_classified() {
        let list = vec![interaction(1, None), interaction(2, None)];
        assert_eq!(sentiment_score(&list), SENTIMENT_NEUTRAL_DEFAULT);
    }

    // -- engagement_score -----------------------------------------------------

    #[test]
    fn engagement_three_in_last_week_is_max() {
        assert_eq!(engagement_score(&interactions(3, 2), None, Utc::now()), 20.0);
    }

    #[test]
    fn engagement_one_in_last_week() {
        assert_eq!(engagement_score(&interactions(1, 2), None, Utc::now()), 15.0);
    }

    #[test]
    fn engagement_falls_back_to_recent_contact() {
        let last_contact = Some(Utc::now() - Duration::days(10));
        assert_eq!(engagement_score(&[], last_contact, Utc::now()), 10.0);
    }

    #[test]
    fn engagement_falls_back_to_stale_contact() {
        let last_contact = Some(Utc::now() - Duration::days(25));
        assert_eq!(engagement_score(&[], last_contact, Utc::now()), 5.0);
    }

    #[test]
    fn engagement_zero_beyond_thirty_days() {
        let last_contact = Some(Utc::now() - Duration::days(60));
        assert_eq!(engagement_score(&[], last_contact, Utc::now()), 0.0);
    }

    #[test]
    fn engagement_zero_when_never_contacted() {
        assert_eq!(engagement_score(&[], None, Utc::now()), 0.0);
    }

    // -- feedback_score -------------------------------------------------------

    #[test]
    fn feedback_nps_scale_normalization() {
        // 9, 8, 9 on the 0-10 scale: avg(0.9, 0.8, 0.9) * 15 = 13.0
        let surveys = vec![survey(1, 9.0), survey(2, 8.0), survey(3, 9.0)];
        assert!((feedback_score(&surveys) - 13.0).abs() < 1e-9);
    }

    #[test]
    fn feedback_csat_scale_normalization() {
        // 4 on the 1-5 scale normalizes to 0.8 -> 12.0
        let surveys = vec![survey(1, 4.0)];
        assert!((feedback_score(&surveys) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn feedback_only_samples_three_most_recent() {
        // A fourth, terrible response must not affect the factor.
        let surveys = vec![survey(1, 10.0), survey(2, 10.0), survey(3, 10.0), survey(4, 0.0)];
        assert_eq!(feedback_score(&surveys), 15.0);
    }

    #[test]
    fn feedback_defaults_to_midpoint_without_responses() {
        assert_eq!(feedback_score(&[]), FEEDBACK_NEUTRAL_DEFAULT);
    }

    // -- tenure_score ---------------------------------------------------------

    #[test]
    fn tenure_tiers() {
        let now = Utc::now();
        assert_eq!(tenure_score(now - Duration::days(120), now), 10.0);
        assert_eq!(tenure_score(now - Duration::days(45), now), 7.0);
        assert_eq!(tenure_score(now - Duration::days(3), now), 5.0);
    }

    // -- risk tier ------------------------------------------------------------

    #[test]
    fn risk_tier_is_total_over_score_range() {
        for score in 0..=100 {
            let expected = if score >= 70 {
                RiskLevel::Healthy
            } else if score >= 40 {
                RiskLevel::AtRisk
            } else {
                RiskLevel::Critical
            };
            assert_eq!(RiskLevel::from_score(score), expected, "score {score}");
        }
    }

    #[test]
    fn risk_tier_boundaries() {
        assert_eq!(RiskLevel::from_score(70), RiskLevel::Healthy);
        assert_eq!(RiskLevel::from_score(69), RiskLevel::AtRisk);
        assert_eq!(RiskLevel::from_score(40), RiskLevel::AtRisk);
        assert_eq!(RiskLevel::from_score(39), RiskLevel::Critical);
    }

    // -- compute_health -------------------------------------------------------

    fn thriving_client() -> ClientSignals {
        let mut list = Vec::new();
        // 4 interactions in the last 7 days, 12 within 30 days, all positive.
        for d in [1, 2, 3, 5] {
            list.push(interaction(d, Some(Sentiment::Positive)));
        }
        for d in [10, 12, 14, 16, 18, 20, 22, 24] {
            list.push(interaction(d, Some(Sentiment::Positive)));
        }
        ClientSignals {
            created_at: Utc::now() - Duration::days(120),
            last_contact_at: Some(Utc::now() - Duration::days(1)),
            interactions: list,
            surveys: vec![survey(1, 9.0), survey(5, 8.0), survey(9, 9.0)],
        }
    }

    #[test]
    fn end_to_end_thriving_client_scores_98() {
        // communication 25 + sentiment 30 + engagement 20 + feedback 13 + tenure 10
        // = 98 after rounding (13.0 exactly from avg(0.9, 0.8, 0.9) * 15).
        let report = compute_health(&thriving_client(), Utc::now());
        assert_eq!(report.score, 98);
        assert_eq!(report.risk_level, RiskLevel::Healthy);
        assert_eq!(report.factors.communication, 25.0);
        assert_eq!(report.factors.sentiment, 30.0);
        assert_eq!(report.factors.engagement, 20.0);
        assert_eq!(report.factors.tenure, 10.0);
    }

    #[test]
    fn compute_is_deterministic_for_identical_signals() {
        let signals = thriving_client();
        let now = Utc::now();
        assert_eq!(compute_health(&signals, now), compute_health(&signals, now));
    }

    #[test]
    fn total_is_bounded_at_factor_maxima() {
        // Factor maxima sum to exactly 100: 25 + 30 + 20 + 15 + 10.
        let factors = HealthFactors {
            communication: 25.0,
            sentiment: 30.0,
            engagement: 20.0,
            feedback: 15.0,
            tenure: 10.0,
        };
        assert_eq!(factors.total(), 100);
    }

    #[test]
    fn silent_client_scores_low() {
        let signals = ClientSignals {
            created_at: Utc::now() - Duration::days(200),
            last_contact_at: Some(Utc::now() - Duration::days(90)),
            interactions: vec![],
            surveys: vec![],
        };
        // 0 + 15 (default) + 0 + 7.5 (default) + 10 = 32.5 -> 33
        let report = compute_health(&signals, Utc::now());
        assert_eq!(report.score, 33);
        assert_eq!(report.risk_level, RiskLevel::Critical);
    }

    // -- label round trips ----------------------------------------------------

    #[test]
    fn sentiment_labels_parse() {
        assert_eq!(Sentiment::parse("positive"), Some(Sentiment::Positive));
        assert_eq!(Sentiment::parse("shouty"), None);
    }

    #[test]
    fn risk_labels_parse() {
        assert_eq!(RiskLevel::parse("at_risk"), Some(RiskLevel::AtRisk));
        assert_eq!(RiskLevel::AtRisk.as_str(), "at_risk");
        assert_eq!(RiskLevel::parse("fine"), None);
    }
}
