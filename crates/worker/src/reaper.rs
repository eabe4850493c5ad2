//! Background reaper for jobs that crashed on their final attempt.
//!
//! The claim query redelivers expired-lease jobs that still have
//! attempts left, but a job whose lease expired after its last attempt
//! would otherwise sit in `running` forever. This loop moves those to
//! the dead-letter state.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use clientpulse_db::repositories::QueueRepo;
use clientpulse_db::DbPool;

/// How often the reaper scans for expired final-attempt leases.
pub const REAP_INTERVAL: Duration = Duration::from_secs(60);

/// Run the reaper until `cancel` fires.
pub async fn run(pool: DbPool, cancel: CancellationToken) {
    let mut tick = tokio::time::interval(REAP_INTERVAL);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tick.tick() => {}
        }

        match QueueRepo::reap_expired(&pool).await {
            Ok(0) => {}
            Ok(reaped) => {
                tracing::warn!(reaped, "dead-lettered jobs with expired final-attempt leases");
            }
            Err(e) => {
                tracing::warn!(error = %e, "reap scan failed");
            }
        }
    }

    tracing::info!("reaper stopped");
}
