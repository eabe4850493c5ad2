//! Per-queue job handlers.

pub mod alerts;
pub mod health_score;
pub mod sentiment;

pub use alerts::AlertDeliveryHandler;
pub use health_score::HealthScoreHandler;
pub use sentiment::SentimentHandler;
