use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clientpulse_ai::SentimentClient;
use clientpulse_worker::config::WorkerConfig;
use clientpulse_worker::handlers::{AlertDeliveryHandler, HealthScoreHandler, SentimentHandler};
use clientpulse_worker::pool::WorkerPool;
use clientpulse_worker::scheduler::SweepScheduler;
use clientpulse_worker::reaper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "clientpulse_worker=info,clientpulse_db=info,clientpulse_ai=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env();

    let pool = clientpulse_db::create_pool(&config.database_url)
        .await
        .context("failed to connect to database")?;
    clientpulse_db::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    let sentiment_client = SentimentClient::new(config.sentiment.clone())
        .context("failed to build sentiment client")?;

    let cancel = CancellationToken::new();
    let mut tasks = Vec::new();

    tasks.extend(
        WorkerPool::new(
            pool.clone(),
            Arc::new(HealthScoreHandler::new(config.max_attempts)),
            config.health_workers,
            config.poll_interval,
            config.lease,
        )
        .spawn(cancel.clone()),
    );
    tasks.extend(
        WorkerPool::new(
            pool.clone(),
            Arc::new(SentimentHandler::new(sentiment_client, config.max_attempts)),
            config.sentiment_workers,
            config.poll_interval,
            config.lease,
        )
        .spawn(cancel.clone()),
    );
    tasks.extend(
        WorkerPool::new(
            pool.clone(),
            Arc::new(AlertDeliveryHandler),
            config.alert_workers,
            config.poll_interval,
            config.lease,
        )
        .spawn(cancel.clone()),
    );

    let scheduler = SweepScheduler::new(
        pool.clone(),
        config.sweep_interval,
        config.sweep_jitter,
        config.max_attempts,
    );
    tasks.push(tokio::spawn(scheduler.run(cancel.clone())));
    tasks.push(tokio::spawn(reaper::run(pool.clone(), cancel.clone())));

    tracing::info!(
        health_workers = config.health_workers,
        sentiment_workers = config.sentiment_workers,
        alert_workers = config.alert_workers,
        "worker started"
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutdown signal received, draining");
    cancel.cancel();

    for task in tasks {
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "task join failed during shutdown");
        }
    }

    tracing::info!("worker stopped");
    Ok(())
}
