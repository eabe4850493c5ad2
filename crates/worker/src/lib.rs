//! Background worker: queue consumers, the recomputation pipeline,
//! the daily sweep scheduler, and the lease reaper.

pub mod config;
pub mod handlers;
pub mod pipeline;
pub mod pool;
pub mod reaper;
pub mod scheduler;
