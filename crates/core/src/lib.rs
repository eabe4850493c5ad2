//! Pure domain logic for the ClientPulse scoring-and-alerting pipeline.
//!
//! This crate has zero internal dependencies and performs no I/O. It
//! holds the health score engine, the alert decision unit, the queue
//! topology and idempotency-key scheme, and the retry/backoff policy
//! shared by the `db` and `worker` crates.

pub mod alert;
pub mod error;
pub mod health;
pub mod queue;
pub mod retry;
pub mod types;

pub use error::CoreError;
