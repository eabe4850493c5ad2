//! Error taxonomy for the scoring pipeline.
//!
//! The classification here drives the queue's retry decision: only
//! [`CoreError::Transient`] failures are redelivered with backoff.
//! Everything else is permanent and dead-letters immediately.
//! Concurrency losses and unparseable classifier replies are not
//! errors at all: the pipeline reports the former as a discarded
//! outcome and the classifier client recovers the latter to a
//! neutral default.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Referenced entity does not exist. Permanent; never retried.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Bad input data surfaced by pure computation. Permanent.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Store or classifier I/O failure. Retried with backoff.
    #[error("Transient dependency failure: {0}")]
    Transient(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether the queue should redeliver the job after backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, CoreError::Transient(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_is_retryable() {
        assert!(CoreError::Transient("connection reset".into()).is_transient());
    }

    #[test]
    fn not_found_is_permanent() {
        let err = CoreError::NotFound {
            entity: "client",
            id: 42,
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn validation_is_permanent() {
        assert!(!CoreError::Validation("bad payload".into()).is_transient());
    }
}
