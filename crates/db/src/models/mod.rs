//! Domain model structs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct
//! matching the database row. Status columns reference SMALLINT lookup
//! tables; the enums in [`status`] mirror their seed order.

pub mod ai_request_log;
pub mod alert;
pub mod client;
pub mod interaction;
pub mod queue_job;
pub mod snapshot;
pub mod status;
pub mod survey;
