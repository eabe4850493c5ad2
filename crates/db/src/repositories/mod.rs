//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod ai_request_log_repo;
pub mod alert_repo;
pub mod client_repo;
pub mod interaction_repo;
pub mod queue_repo;
pub mod snapshot_repo;
pub mod survey_repo;

pub use ai_request_log_repo::AiRequestLogRepo;
pub use alert_repo::AlertRepo;
pub use client_repo::ClientRepo;
pub use interaction_repo::InteractionRepo;
pub use queue_repo::QueueRepo;
pub use snapshot_repo::SnapshotRepo;
pub use survey_repo::SurveyRepo;
