//! Parsing and validation of model output.
//!
//! Chat models wrap JSON in prose and code fences more often than not,
//! so extraction takes the substring between the first `{` and the
//! last `}` before deserializing. Validation is strict: an unknown
//! sentiment label is an error, and the numeric score is clamped to
//! `[-1.0, 1.0]`.

use clientpulse_core::health::Sentiment;
use serde::Deserialize;

/// Raw deserialization target for the model's JSON reply.
#[derive(Debug, Deserialize)]
struct RawSentiment {
    sentiment: String,
    score: Option<f64>,
    reasoning: Option<String>,
}

/// A validated sentiment classification.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentResult {
    pub sentiment: Sentiment,
    /// Signed intensity in `[-1.0, 1.0]`.
    pub score: f64,
    pub reasoning: Option<String>,
}

impl SentimentResult {
    /// The fallback used when the model's reply is unusable.
    pub fn neutral() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            score: 0.0,
            reasoning: Some("Failed to analyze sentiment".to_string()),
        }
    }
}

/// Why a model reply could not be turned into a [`SentimentResult`].
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The reply contains no `{ ... }` span at all.
    #[error("no JSON object found in model output")]
    NoJson,

    /// The extracted span is not valid JSON of the expected shape.
    #[error("malformed JSON in model output: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The JSON parsed but carried an unknown sentiment label.
    #[error("unknown sentiment label: {0}")]
    UnknownLabel(String),
}

/// Parse one chat completion reply into a validated result.
pub fn parse_sentiment(content: &str) -> Result<SentimentResult, ParseError> {
    let json = extract_json(content).ok_or(ParseError::NoJson)?;
    let raw: RawSentiment = serde_json::from_str(json)?;
    let sentiment =
        Sentiment::parse(&raw.sentiment).ok_or_else(|| ParseError::UnknownLabel(raw.sentiment))?;
    Ok(SentimentResult {
        sentiment,
        score: raw.score.unwrap_or(0.0).clamp(-1.0, 1.0),
        reasoning: raw.reasoning,
    })
}

/// The substring from the first `{` to the last `}`, if both exist in
/// order.
fn extract_json(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&content[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json() {
        let result = parse_sentiment(r#"{"sentiment": "positive", "score": 0.8}"#)
            .expect("should parse bare JSON");
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(result.score, 0.8);
        assert_eq!(result.reasoning, None);
    }

    #[test]
    fn parses_json_wrapped_in_prose_and_fences() {
        let content = "Sure! Here is the analysis:\n```json\n\
                       {\"sentiment\": \"negative\", \"score\": -0.6, \"reasoning\": \"angry tone\"}\n\
                       ```\nLet me know if you need more.";
        let result = parse_sentiment(content).expect("should parse fenced JSON");
        assert_eq!(result.sentiment, Sentiment::Negative);
        assert_eq!(result.score, -0.6);
        assert_eq!(result.reasoning.as_deref(), Some("angry tone"));
    }

    #[test]
    fn missing_score_defaults_to_zero() {
        let result =
            parse_sentiment(r#"{"sentiment": "neutral"}"#).expect("should parse without score");
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn out_of_range_score_is_clamped() {
        let result = parse_sentiment(r#"{"sentiment": "positive", "score": 3.5}"#)
            .expect("should parse");
        assert_eq!(result.score, 1.0);
        let result = parse_sentiment(r#"{"sentiment": "negative", "score": -9.0}"#)
            .expect("should parse");
        assert_eq!(result.score, -1.0);
    }

    #[test]
    fn no_json_object_is_an_error() {
        assert!(matches!(
            parse_sentiment("the client seems happy"),
            Err(ParseError::NoJson)
        ));
        // Braces out of order.
        assert!(matches!(parse_sentiment("} oops {"), Err(ParseError::NoJson)));
    }

    #[test]
    fn unknown_label_is_an_error() {
        assert!(matches!(
            parse_sentiment(r#"{"sentiment": "ecstatic", "score": 1.0}"#),
            Err(ParseError::UnknownLabel(_))
        ));
    }

    #[test]
    fn truncated_json_is_malformed() {
        assert!(matches!(
            parse_sentiment(r#"{"sentiment": "positive", "sco}"#),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn neutral_fallback_shape() {
        let fallback = SentimentResult::neutral();
        assert_eq!(fallback.sentiment, Sentiment::Neutral);
        assert_eq!(fallback.score, 0.0);
        assert!(fallback.reasoning.is_some());
    }
}
